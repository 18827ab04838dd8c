//! Subgraph query execution for the retryable tracker.
//!
//! Two GraphQL endpoints are queried: the retryables subgraph, which indexes
//! L2 tickets, and the bridge subgraph, which indexes L1 submissions and
//! deposits. This crate sends a query to one of them and hands back the
//! decoded `data` object. Query strings are built by the [`queries`] module.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub mod http;
pub mod queries;

pub use http::{HttpExecutorConfig, HttpQueryExecutor};

/// Errors that can occur while executing a subgraph query.
#[derive(Debug, Error)]
pub enum QueryError {
	/// The request could not be sent or the endpoint answered with a failure status.
	#[error("Network error: {0}")]
	Network(String),
	/// The body was not JSON or carried no `data` object.
	#[error("Malformed response: {0}")]
	MalformedResponse(String),
	/// The executor could not be built from its configuration.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// The two indexes a query can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubgraphSource {
	/// L2 retryable tickets.
	Retryables,
	/// L1 bridge submissions and deposits.
	Bridge,
}

impl fmt::Display for SubgraphSource {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			SubgraphSource::Retryables => f.write_str("retryables"),
			SubgraphSource::Bridge => f.write_str("bridge"),
		}
	}
}

/// Trait defining the interface for query executors.
///
/// Implementations run one query per call: no retries and no caching.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
	/// Runs `query` against `source` and returns the response `data` object.
	async fn execute(
		&self,
		source: SubgraphSource,
		query: &str,
	) -> Result<serde_json::Value, QueryError>;
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
	#[serde(default)]
	data: Option<serde_json::Value>,
	#[serde(default)]
	errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
	message: String,
}

/// Extracts the `data` object from a GraphQL response body.
///
/// GraphQL `errors` that accompany a usable `data` object are logged and
/// otherwise ignored; without `data` they become part of the error message.
pub fn parse_response(body: &str) -> Result<serde_json::Value, QueryError> {
	let response: GraphQlResponse = serde_json::from_str(body)
		.map_err(|e| QueryError::MalformedResponse(format!("Invalid JSON: {}", e)))?;

	let messages = response
		.errors
		.unwrap_or_default()
		.into_iter()
		.map(|e| e.message)
		.collect::<Vec<_>>();

	match response.data {
		Some(data) if !data.is_null() => {
			if !messages.is_empty() {
				tracing::warn!(errors = ?messages, "Subgraph returned partial data");
			}
			Ok(data)
		},
		_ if !messages.is_empty() => Err(QueryError::MalformedResponse(format!(
			"Missing data field, errors: {}",
			messages.join("; ")
		))),
		_ => Err(QueryError::MalformedResponse(
			"Missing data field".to_string(),
		)),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn test_parse_response_returns_data() {
		let data = parse_response(r#"{"data": {"retryables": []}}"#).unwrap();
		assert_eq!(data, json!({"retryables": []}));
	}

	#[test]
	fn test_parse_response_keeps_partial_data() {
		let data =
			parse_response(r#"{"data": {"deposits": []}, "errors": [{"message": "slow"}]}"#)
				.unwrap();
		assert_eq!(data, json!({"deposits": []}));
	}

	#[test]
	fn test_parse_response_rejects_invalid_json() {
		let result = parse_response("<html>Bad Gateway</html>");
		assert!(matches!(result, Err(QueryError::MalformedResponse(_))));
	}

	#[test]
	fn test_parse_response_rejects_missing_data() {
		let result = parse_response(r#"{"something": 1}"#);
		assert!(matches!(result, Err(QueryError::MalformedResponse(_))));

		let result = parse_response(r#"{"data": null}"#);
		assert!(matches!(result, Err(QueryError::MalformedResponse(_))));
	}

	#[test]
	fn test_parse_response_reports_graphql_errors() {
		let err = parse_response(r#"{"errors": [{"message": "indexing_error"}]}"#).unwrap_err();
		assert!(err.to_string().contains("indexing_error"));
	}

	#[test]
	fn test_source_display() {
		assert_eq!(SubgraphSource::Retryables.to_string(), "retryables");
		assert_eq!(SubgraphSource::Bridge.to_string(), "bridge");
	}
}
