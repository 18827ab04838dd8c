//! HTTP query executor.
//!
//! Posts `{"query": ...}` as JSON to the endpoint configured for each source
//! and decodes the GraphQL response. A single reqwest client is shared by
//! both endpoints.

use crate::{parse_response, QueryError, QueryExecutor, SubgraphSource};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Endpoints and transport settings for the HTTP executor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpExecutorConfig {
	/// GraphQL endpoint of the retryables subgraph.
	pub retryables_url: String,
	/// GraphQL endpoint of the bridge subgraph.
	pub bridge_url: String,
	/// Per-request timeout in seconds.
	#[serde(default = "default_timeout_seconds")]
	pub timeout_seconds: u64,
}

fn default_timeout_seconds() -> u64 {
	30
}

impl HttpExecutorConfig {
	/// Checks that both endpoints are absolute http(s) URLs.
	pub fn validate(&self) -> Result<(), QueryError> {
		for (name, url) in [
			("retryables_url", &self.retryables_url),
			("bridge_url", &self.bridge_url),
		] {
			if !(url.starts_with("http://") || url.starts_with("https://")) {
				return Err(QueryError::Configuration(format!(
					"{} must be an http(s) URL, got '{}'",
					name, url
				)));
			}
		}
		if self.timeout_seconds == 0 {
			return Err(QueryError::Configuration(
				"timeout_seconds must be greater than 0".into(),
			));
		}
		Ok(())
	}
}

/// Query executor that talks to the subgraphs over HTTP.
pub struct HttpQueryExecutor {
	client: reqwest::Client,
	config: HttpExecutorConfig,
}

impl HttpQueryExecutor {
	/// Creates an executor after validating its configuration.
	pub fn new(config: HttpExecutorConfig) -> Result<Self, QueryError> {
		config.validate()?;

		let client = reqwest::Client::builder()
			.timeout(Duration::from_secs(config.timeout_seconds))
			.build()
			.map_err(|e| QueryError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

		Ok(Self { client, config })
	}

	/// Endpoint URL for the given source.
	pub fn endpoint(&self, source: SubgraphSource) -> &str {
		match source {
			SubgraphSource::Retryables => &self.config.retryables_url,
			SubgraphSource::Bridge => &self.config.bridge_url,
		}
	}
}

#[async_trait]
impl QueryExecutor for HttpQueryExecutor {
	async fn execute(
		&self,
		source: SubgraphSource,
		query: &str,
	) -> Result<serde_json::Value, QueryError> {
		let url = self.endpoint(source);
		tracing::trace!(%source, query, "Sending subgraph query");

		let response = self
			.client
			.post(url)
			.json(&serde_json::json!({ "query": query }))
			.send()
			.await
			.map_err(|e| QueryError::Network(format!("Request to {} failed: {}", source, e)))?;

		let status = response.status();
		if !status.is_success() {
			return Err(QueryError::Network(format!(
				"{} subgraph answered with HTTP {}",
				source, status
			)));
		}

		let body = response.text().await.map_err(|e| {
			QueryError::Network(format!("Failed to read {} response: {}", source, e))
		})?;

		parse_response(&body)
	}
}
