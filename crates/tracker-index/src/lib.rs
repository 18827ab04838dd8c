//! Index reader module for the retryable tracker.
//!
//! The resolvers never build queries themselves; they ask an [`IndexReader`]
//! for typed records. The `subgraph` implementation answers through the
//! GraphQL executor, the `memory` implementation from a fixture dataset.
//! Single-record lookups return `None` when the index has no match, which
//! callers treat as a data gap rather than a failure.

use async_trait::async_trait;
use thiserror::Error;
use tracker_subgraph::QueryError;
use tracker_types::{
	AccountAddress, DepositRecord, ImplementationRegistry, SubmissionRecord, Ticket,
};

/// Re-export implementations
pub mod implementations {
	pub mod memory;
	pub mod subgraph;
}

/// Errors that can occur while reading from an index.
#[derive(Debug, Error)]
pub enum IndexError {
	/// The underlying query failed.
	#[error(transparent)]
	Query(#[from] QueryError),
	/// The index answered with records that could not be decoded.
	#[error("Decode error: {0}")]
	Decode(String),
	/// The reader could not be built from its configuration.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Trait defining the typed lookups the resolvers need.
#[async_trait]
pub trait IndexReader: Send + Sync {
	/// Up to `first` unredeemed tickets whose timeout is after `now`.
	async fn pending_tickets(&self, first: u32, now: u64) -> Result<Vec<Ticket>, IndexError>;

	/// The ticket created by L2 transaction `tx_hash`.
	async fn ticket_by_creation_tx(&self, tx_hash: &str) -> Result<Option<Ticket>, IndexError>;

	/// The submission whose `retryableTicketID` equals `ticket_id`.
	async fn submission_by_ticket_id(
		&self,
		ticket_id: &str,
	) -> Result<Option<SubmissionRecord>, IndexError>;

	/// The submission made in L1 transaction `tx_hash`.
	async fn submission_by_tx_hash(
		&self,
		tx_hash: &str,
	) -> Result<Option<SubmissionRecord>, IndexError>;

	/// Up to `first` submissions sent by `sender`, in index order.
	async fn submissions_by_sender(
		&self,
		sender: &AccountAddress,
		first: u32,
	) -> Result<Vec<SubmissionRecord>, IndexError>;

	/// The deposit made in L1 transaction `tx_hash`.
	async fn deposit_by_tx_hash(&self, tx_hash: &str) -> Result<Option<DepositRecord>, IndexError>;

	/// Up to `first` deposits by `sender`, newest first.
	async fn deposits_by_sender(
		&self,
		sender: &AccountAddress,
		first: u32,
	) -> Result<Vec<DepositRecord>, IndexError>;
}

/// Type alias for index factory functions.
pub type IndexFactory = fn(&toml::Value) -> Result<Box<dyn IndexReader>, IndexError>;

/// Registry trait for index implementations.
pub trait IndexRegistry: ImplementationRegistry<Factory = IndexFactory> {}

/// Get all registered index implementations.
///
/// Returns a vector of (name, factory) tuples for all available index readers.
pub fn get_all_implementations() -> Vec<(&'static str, IndexFactory)> {
	use implementations::{memory, subgraph};

	vec![
		(subgraph::Registry::NAME, subgraph::Registry::factory()),
		(memory::Registry::NAME, memory::Registry::factory()),
	]
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_all_implementations_registered() {
		let names: Vec<_> = get_all_implementations()
			.into_iter()
			.map(|(name, _)| name)
			.collect();
		assert_eq!(names, vec!["subgraph", "memory"]);
	}

	#[test]
	fn test_query_error_is_transparent() {
		let err = IndexError::from(QueryError::Network("connection reset".into()));
		assert_eq!(err.to_string(), "Network error: connection reset");
	}
}
