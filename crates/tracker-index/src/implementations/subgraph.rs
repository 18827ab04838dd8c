//! Subgraph-backed index reader.
//!
//! Builds one GraphQL query per lookup, runs it through a [`QueryExecutor`]
//! and decodes the requested collection from the response `data` object.
//! Addresses are always sent in lowercase, the form the subgraphs store.

use crate::{IndexError, IndexFactory, IndexReader, IndexRegistry};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracker_subgraph::{
	queries, HttpExecutorConfig, HttpQueryExecutor, QueryExecutor, SubgraphSource,
};
use tracker_types::{
	truncate_id, AccountAddress, DepositRecord, ImplementationRegistry, SubmissionRecord, Ticket,
};

/// Index reader that answers lookups from the retryables and bridge subgraphs.
pub struct SubgraphIndex {
	executor: Arc<dyn QueryExecutor>,
}

impl SubgraphIndex {
	/// Creates a reader on top of the given executor.
	pub fn new(executor: Arc<dyn QueryExecutor>) -> Self {
		Self { executor }
	}

	async fn fetch<T: DeserializeOwned>(
		&self,
		source: SubgraphSource,
		collection: &str,
		query: String,
	) -> Result<Vec<T>, IndexError> {
		let mut data = self.executor.execute(source, &query).await?;

		let records = data
			.get_mut(collection)
			.map(serde_json::Value::take)
			.ok_or_else(|| {
				IndexError::Decode(format!(
					"{} subgraph response has no '{}' collection",
					source, collection
				))
			})?;

		serde_json::from_value(records).map_err(|e| {
			IndexError::Decode(format!(
				"Invalid '{}' records from {} subgraph: {}",
				collection, source, e
			))
		})
	}

	async fn fetch_one<T: DeserializeOwned>(
		&self,
		source: SubgraphSource,
		collection: &str,
		query: String,
	) -> Result<Option<T>, IndexError> {
		Ok(self
			.fetch(source, collection, query)
			.await?
			.into_iter()
			.next())
	}
}

#[async_trait]
impl IndexReader for SubgraphIndex {
	async fn pending_tickets(&self, first: u32, now: u64) -> Result<Vec<Ticket>, IndexError> {
		self.fetch(
			SubgraphSource::Retryables,
			queries::RETRYABLES_COLLECTION,
			queries::pending_tickets(first, now),
		)
		.await
	}

	async fn ticket_by_creation_tx(&self, tx_hash: &str) -> Result<Option<Ticket>, IndexError> {
		tracing::trace!(tx = %truncate_id(tx_hash), "Looking up ticket");
		self.fetch_one(
			SubgraphSource::Retryables,
			queries::RETRYABLES_COLLECTION,
			queries::ticket_by_creation_tx(tx_hash),
		)
		.await
	}

	async fn submission_by_ticket_id(
		&self,
		ticket_id: &str,
	) -> Result<Option<SubmissionRecord>, IndexError> {
		self.fetch_one(
			SubgraphSource::Bridge,
			queries::RETRYABLES_COLLECTION,
			queries::submission_by_ticket_id(ticket_id),
		)
		.await
	}

	async fn submission_by_tx_hash(
		&self,
		tx_hash: &str,
	) -> Result<Option<SubmissionRecord>, IndexError> {
		self.fetch_one(
			SubgraphSource::Bridge,
			queries::RETRYABLES_COLLECTION,
			queries::submission_by_tx_hash(tx_hash),
		)
		.await
	}

	async fn submissions_by_sender(
		&self,
		sender: &AccountAddress,
		first: u32,
	) -> Result<Vec<SubmissionRecord>, IndexError> {
		self.fetch(
			SubgraphSource::Bridge,
			queries::RETRYABLES_COLLECTION,
			queries::submissions_by_sender(&sender.to_lowercase_hex(), first),
		)
		.await
	}

	async fn deposit_by_tx_hash(&self, tx_hash: &str) -> Result<Option<DepositRecord>, IndexError> {
		self.fetch_one(
			SubgraphSource::Bridge,
			queries::DEPOSITS_COLLECTION,
			queries::deposit_by_tx_hash(tx_hash),
		)
		.await
	}

	async fn deposits_by_sender(
		&self,
		sender: &AccountAddress,
		first: u32,
	) -> Result<Vec<DepositRecord>, IndexError> {
		self.fetch(
			SubgraphSource::Bridge,
			queries::DEPOSITS_COLLECTION,
			queries::deposits_by_sender(&sender.to_lowercase_hex(), first),
		)
		.await
	}
}

/// Factory function to create a subgraph index reader from configuration.
///
/// Configuration parameters:
/// - `retryables_url`: GraphQL endpoint of the retryables subgraph
/// - `bridge_url`: GraphQL endpoint of the bridge subgraph
/// - `timeout_seconds` (optional): per-request timeout, default 30
pub fn create_index(config: &toml::Value) -> Result<Box<dyn IndexReader>, IndexError> {
	let executor_config: HttpExecutorConfig = config
		.clone()
		.try_into()
		.map_err(|e| IndexError::Configuration(format!("Invalid subgraph config: {}", e)))?;

	let executor = HttpQueryExecutor::new(executor_config)?;
	Ok(Box::new(SubgraphIndex::new(Arc::new(executor))))
}

/// Registry for the subgraph index implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "subgraph";
	type Factory = IndexFactory;

	fn factory() -> Self::Factory {
		create_index
	}
}

impl IndexRegistry for Registry {}
