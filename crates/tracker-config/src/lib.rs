//! Configuration module for the retryable tracker.
//!
//! This module provides structures and utilities for managing tracker
//! configuration. Configuration is loaded from TOML; `${VAR}` and
//! `${VAR:-default}` placeholders are resolved from the environment before
//! parsing, and the result is validated.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Public retryables subgraph (L2 tickets).
pub const DEFAULT_RETRYABLES_SUBGRAPH_URL: &str =
	"https://api.thegraph.com/subgraphs/name/gvladika/arbitrum-retryables";
/// Public bridge subgraph (L1 submissions and deposits).
pub const DEFAULT_BRIDGE_SUBGRAPH_URL: &str =
	"https://api.thegraph.com/subgraphs/name/gvladika/arb-bridge-eth-nitro";

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Keep just the message, not the input dump
		ConfigError::Parse(err.message().to_string())
	}
}

/// Main configuration structure for the tracker.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
	/// Which index reader to use and how each one is configured.
	#[serde(default)]
	pub index: IndexConfig,
	/// Page sizes, caps and concurrency of the resolvers.
	#[serde(default)]
	pub resolver: ResolverConfig,
	/// Block explorer links used when rendering results.
	#[serde(default)]
	pub explorer: ExplorerConfig,
	/// Configuration for the HTTP server.
	pub api: Option<ApiConfig>,
}

/// Configuration for the index reader.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IndexConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Map of index implementation names to their raw configurations.
	pub implementations: HashMap<String, toml::Value>,
}

impl Default for IndexConfig {
	fn default() -> Self {
		let mut subgraph = toml::map::Map::new();
		subgraph.insert(
			"retryables_url".to_string(),
			toml::Value::String(DEFAULT_RETRYABLES_SUBGRAPH_URL.to_string()),
		);
		subgraph.insert(
			"bridge_url".to_string(),
			toml::Value::String(DEFAULT_BRIDGE_SUBGRAPH_URL.to_string()),
		);

		let mut implementations = HashMap::new();
		implementations.insert("subgraph".to_string(), toml::Value::Table(subgraph));

		Self {
			primary: "subgraph".to_string(),
			implementations,
		}
	}
}

/// Resolver limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResolverConfig {
	/// Number of pending tickets fetched per lookup.
	#[serde(default = "default_pending_page_size")]
	pub pending_page_size: u32,
	/// Hard cap on the number of latest deposit/direct results.
	///
	/// Protects the free public subgraph endpoints from heavy queries.
	#[serde(default = "default_max_results")]
	pub max_results: u32,
	/// Result count used when the caller does not ask for one.
	#[serde(default = "default_results")]
	pub default_results: u32,
	/// Number of records cross-referenced at once. 1 keeps lookups strictly
	/// sequential.
	#[serde(default = "default_lookup_concurrency")]
	pub lookup_concurrency: usize,
}

impl Default for ResolverConfig {
	fn default() -> Self {
		Self {
			pending_page_size: default_pending_page_size(),
			max_results: default_max_results(),
			default_results: default_results(),
			lookup_concurrency: default_lookup_concurrency(),
		}
	}
}

fn default_pending_page_size() -> u32 {
	20
}

fn default_max_results() -> u32 {
	5
}

fn default_results() -> u32 {
	20
}

fn default_lookup_concurrency() -> usize {
	1
}

/// Block explorer base URLs; a transaction hash is appended to each.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExplorerConfig {
	#[serde(default = "default_l1_tx_base_url")]
	pub l1_tx_base_url: String,
	#[serde(default = "default_l2_tx_base_url")]
	pub l2_tx_base_url: String,
}

impl Default for ExplorerConfig {
	fn default() -> Self {
		Self {
			l1_tx_base_url: default_l1_tx_base_url(),
			l2_tx_base_url: default_l2_tx_base_url(),
		}
	}
}

fn default_l1_tx_base_url() -> String {
	"https://etherscan.io/tx/".to_string()
}

fn default_l2_tx_base_url() -> String {
	"https://arbiscan.io/tx/".to_string()
}

/// Configuration for the HTTP server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
	/// Whether the server is enabled.
	#[serde(default)]
	pub enabled: bool,
	/// Host address to bind the server to.
	#[serde(default = "default_api_host")]
	pub host: String,
	/// Port to bind the server to.
	#[serde(default = "default_api_port")]
	pub port: u16,
}

impl Default for ApiConfig {
	fn default() -> Self {
		Self {
			enabled: true,
			host: default_api_host(),
			port: default_api_port(),
		}
	}
}

fn default_api_host() -> String {
	"127.0.0.1".to_string()
}

fn default_api_port() -> u16 {
	3000
}

/// Resolves environment variables in a string.
///
/// Replaces ${VAR_NAME} with the value of the environment variable VAR_NAME.
/// Supports default values with ${VAR_NAME:-default_value}.
///
/// Input strings are limited to 1MB.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 1024 * 1024;
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut result = String::with_capacity(input.len());
	let mut last_end = 0;

	for cap in re.captures_iter(input) {
		let (Some(full_match), Some(var_name)) = (cap.get(0), cap.get(1)) else {
			continue;
		};

		let value = match std::env::var(var_name.as_str()) {
			Ok(v) => v,
			Err(_) => match cap.get(2) {
				Some(default) => default.as_str().to_string(),
				None => {
					return Err(ConfigError::Validation(format!(
						"Environment variable '{}' not found",
						var_name.as_str()
					)))
				},
			},
		};

		result.push_str(&input[last_end..full_match.start()]);
		result.push_str(&value);
		last_end = full_match.end();
	}
	result.push_str(&input[last_end..]);

	Ok(result)
}

impl Config {
	/// Loads configuration from a file, resolving environment variables.
	pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		tracing::debug!("Loading configuration from {}", path.display());

		let content = tokio::fs::read_to_string(path).await.map_err(|e| {
			ConfigError::Io(std::io::Error::new(
				e.kind(),
				format!("Cannot read {}: {}", path.display(), e),
			))
		})?;
		content.parse()
	}

	/// Validates the configuration to ensure all required fields are properly set.
	fn validate(&self) -> Result<(), ConfigError> {
		if self.index.primary.is_empty() {
			return Err(ConfigError::Validation(
				"Index primary implementation cannot be empty".into(),
			));
		}
		if !self.index.implementations.contains_key(&self.index.primary) {
			return Err(ConfigError::Validation(format!(
				"Primary index '{}' not found in implementations",
				self.index.primary
			)));
		}

		let resolver = &self.resolver;
		if !(1..=1000).contains(&resolver.pending_page_size) {
			return Err(ConfigError::Validation(
				"pending_page_size must be between 1 and 1000".into(),
			));
		}
		if !(1..=1000).contains(&resolver.max_results) {
			return Err(ConfigError::Validation(
				"max_results must be between 1 and 1000".into(),
			));
		}
		if resolver.default_results == 0 {
			return Err(ConfigError::Validation(
				"default_results must be at least 1".into(),
			));
		}
		if !(1..=16).contains(&resolver.lookup_concurrency) {
			return Err(ConfigError::Validation(
				"lookup_concurrency must be between 1 and 16".into(),
			));
		}

		if self.explorer.l1_tx_base_url.is_empty() || self.explorer.l2_tx_base_url.is_empty() {
			return Err(ConfigError::Validation(
				"Explorer base URLs cannot be empty".into(),
			));
		}

		if let Some(ref api) = self.api {
			if api.enabled && api.host.is_empty() {
				return Err(ConfigError::Validation("API host cannot be empty".into()));
			}
		}

		Ok(())
	}
}

/// Parses configuration from a TOML string.
///
/// Environment variables are resolved and the configuration is validated
/// after parsing.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}
