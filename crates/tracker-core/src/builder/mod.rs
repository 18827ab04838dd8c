//! Builder for constructing a [`TicketTracker`] from configuration.
//!
//! Index readers are pluggable: the caller hands in a factory per
//! implementation name and the builder instantiates the one selected by
//! `[index] primary`.

use crate::{ResolverSettings, TicketTracker};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracker_config::Config;
use tracker_index::{IndexError, IndexReader};

/// Errors that can occur during tracker construction.
#[derive(Debug, Error)]
pub enum BuilderError {
	#[error("Configuration error: {0}")]
	Config(String),
	#[error("Missing required component: {0}")]
	MissingComponent(String),
}

/// Builder for constructing a TicketTracker with a pluggable index reader.
pub struct TrackerBuilder {
	config: Config,
}

impl TrackerBuilder {
	/// Creates a new TrackerBuilder with the given configuration.
	pub fn new(config: Config) -> Self {
		Self { config }
	}

	/// Builds the tracker using the factory registered for the primary index.
	pub fn build<F>(self, index_factories: &HashMap<String, F>) -> Result<TicketTracker, BuilderError>
	where
		F: Fn(&toml::Value) -> Result<Box<dyn IndexReader>, IndexError>,
	{
		let primary = &self.config.index.primary;

		for name in self.config.index.implementations.keys() {
			if name != primary {
				tracing::debug!(component = "index", implementation = %name, "Configured but not primary");
			}
		}

		let index_config = self
			.config
			.index
			.implementations
			.get(primary)
			.ok_or_else(|| {
				BuilderError::Config(format!(
					"Primary index '{}' has no configuration section",
					primary
				))
			})?;

		let factory = index_factories
			.get(primary)
			.ok_or_else(|| BuilderError::MissingComponent(format!("index '{}'", primary)))?;

		let index: Arc<dyn IndexReader> = match factory(index_config) {
			Ok(implementation) => {
				tracing::info!(component = "index", implementation = %primary, "Loaded");
				Arc::from(implementation)
			},
			Err(e) => {
				tracing::error!(
					component = "index",
					implementation = %primary,
					error = %e,
					"Failed to create index implementation"
				);
				return Err(BuilderError::Config(format!(
					"Failed to create index implementation '{}': {}",
					primary, e
				)));
			},
		};

		let settings = ResolverSettings::from(self.config.resolver.clone());
		tracing::info!(
			component = "resolver",
			pending_page_size = settings.pending_page_size,
			max_results = settings.max_results,
			lookup_concurrency = settings.lookup_concurrency,
			"Loaded"
		);

		Ok(TicketTracker::new(index, settings))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use tracker_index::get_all_implementations;

	fn factories() -> HashMap<String, tracker_index::IndexFactory> {
		get_all_implementations()
			.into_iter()
			.map(|(name, factory)| (name.to_string(), factory))
			.collect()
	}

	#[tokio::test]
	async fn test_builds_memory_tracker() {
		let config: Config = r#"
[index]
primary = "memory"
[index.implementations.memory]

[resolver]
max_results = 3
"#
		.parse()
		.unwrap();

		let tracker = TrackerBuilder::new(config).build(&factories()).unwrap();
		assert_eq!(tracker.settings().max_results, 3);

		let address = tracker_types::AccountAddress::parse(crate::fixtures::ALICE).unwrap();
		assert!(tracker.pending_for_address(&address).await.unwrap().is_empty());
	}

	#[test]
	fn test_default_config_builds_subgraph_tracker() {
		let result = TrackerBuilder::new(Config::default()).build(&factories());
		assert!(result.is_ok());
	}

	#[test]
	fn test_missing_factory() {
		let empty: HashMap<String, tracker_index::IndexFactory> = HashMap::new();
		let result = TrackerBuilder::new(Config::default()).build(&empty);
		assert!(matches!(result, Err(BuilderError::MissingComponent(_))));
	}

	#[test]
	fn test_factory_failure_is_config_error() {
		let config: Config = r#"
[index]
primary = "memory"
[index.implementations.memory]
fixture = "/nonexistent/fixture.json"
"#
		.parse()
		.unwrap();

		let result = TrackerBuilder::new(config).build(&factories());
		assert!(matches!(result, Err(BuilderError::Config(_))));
	}
}
