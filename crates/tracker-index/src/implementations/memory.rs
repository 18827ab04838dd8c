//! In-memory index reader.
//!
//! Serves lookups from a fixed dataset, optionally loaded from a JSON fixture
//! file with `tickets`, `submissions` and `deposits` arrays in subgraph
//! shape. Filters mirror the subgraph queries: hashes and addresses match
//! case-insensitively, deposits come back newest first, and every list lookup
//! honours its page size. Useful for offline runs and tests.

use crate::{IndexError, IndexFactory, IndexReader, IndexRegistry};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracker_types::{
	AccountAddress, DepositRecord, ImplementationRegistry, SubmissionRecord, Ticket,
};

/// Records served by a [`MemoryIndex`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexDataset {
	#[serde(default)]
	pub tickets: Vec<Ticket>,
	#[serde(default)]
	pub submissions: Vec<SubmissionRecord>,
	#[serde(default)]
	pub deposits: Vec<DepositRecord>,
}

/// Configuration for the memory index.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryIndexConfig {
	/// JSON fixture to load; an empty dataset is used when absent.
	#[serde(default)]
	pub fixture: Option<PathBuf>,
}

/// Index reader over an immutable in-memory dataset.
pub struct MemoryIndex {
	dataset: IndexDataset,
}

impl MemoryIndex {
	/// Creates a reader serving the given records.
	pub fn new(dataset: IndexDataset) -> Self {
		Self { dataset }
	}

	/// Loads the dataset from a JSON fixture file.
	pub fn from_file(path: impl AsRef<Path>) -> Result<Self, IndexError> {
		let path = path.as_ref();
		let content = std::fs::read_to_string(path).map_err(|e| {
			IndexError::Configuration(format!("Cannot read fixture {}: {}", path.display(), e))
		})?;
		let dataset: IndexDataset = serde_json::from_str(&content).map_err(|e| {
			IndexError::Decode(format!("Invalid fixture {}: {}", path.display(), e))
		})?;

		tracing::debug!(
			tickets = dataset.tickets.len(),
			submissions = dataset.submissions.len(),
			deposits = dataset.deposits.len(),
			"Loaded index fixture from {}",
			path.display()
		);
		Ok(Self::new(dataset))
	}
}

fn same_hash(a: &str, b: &str) -> bool {
	a.eq_ignore_ascii_case(b)
}

#[async_trait]
impl IndexReader for MemoryIndex {
	async fn pending_tickets(&self, first: u32, now: u64) -> Result<Vec<Ticket>, IndexError> {
		Ok(self
			.dataset
			.tickets
			.iter()
			.filter(|ticket| ticket.is_pending(now))
			.take(first as usize)
			.cloned()
			.collect())
	}

	async fn ticket_by_creation_tx(&self, tx_hash: &str) -> Result<Option<Ticket>, IndexError> {
		Ok(self
			.dataset
			.tickets
			.iter()
			.find(|ticket| same_hash(&ticket.created_at_tx_hash, tx_hash))
			.cloned())
	}

	async fn submission_by_ticket_id(
		&self,
		ticket_id: &str,
	) -> Result<Option<SubmissionRecord>, IndexError> {
		Ok(self
			.dataset
			.submissions
			.iter()
			.find(|submission| same_hash(&submission.retryable_ticket_id, ticket_id))
			.cloned())
	}

	async fn submission_by_tx_hash(
		&self,
		tx_hash: &str,
	) -> Result<Option<SubmissionRecord>, IndexError> {
		Ok(self
			.dataset
			.submissions
			.iter()
			.find(|submission| same_hash(&submission.transaction_hash, tx_hash))
			.cloned())
	}

	async fn submissions_by_sender(
		&self,
		sender: &AccountAddress,
		first: u32,
	) -> Result<Vec<SubmissionRecord>, IndexError> {
		Ok(self
			.dataset
			.submissions
			.iter()
			.filter(|submission| sender.matches(&submission.sender))
			.take(first as usize)
			.cloned()
			.collect())
	}

	async fn deposit_by_tx_hash(&self, tx_hash: &str) -> Result<Option<DepositRecord>, IndexError> {
		Ok(self
			.dataset
			.deposits
			.iter()
			.find(|deposit| same_hash(&deposit.transaction_hash, tx_hash))
			.cloned())
	}

	async fn deposits_by_sender(
		&self,
		sender: &AccountAddress,
		first: u32,
	) -> Result<Vec<DepositRecord>, IndexError> {
		let mut deposits: Vec<DepositRecord> = self
			.dataset
			.deposits
			.iter()
			.filter(|deposit| sender.matches(&deposit.sender))
			.cloned()
			.collect();
		deposits.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
		deposits.truncate(first as usize);
		Ok(deposits)
	}
}

/// Factory function to create a memory index reader from configuration.
///
/// Configuration parameters:
/// - `fixture` (optional): path of a JSON dataset to serve
pub fn create_index(config: &toml::Value) -> Result<Box<dyn IndexReader>, IndexError> {
	let memory_config: MemoryIndexConfig = config
		.clone()
		.try_into()
		.map_err(|e| IndexError::Configuration(format!("Invalid memory config: {}", e)))?;

	match memory_config.fixture {
		Some(path) => Ok(Box::new(MemoryIndex::from_file(path)?)),
		None => Ok(Box::new(MemoryIndex::new(IndexDataset::default()))),
	}
}

/// Registry for the memory index implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "memory";
	type Factory = IndexFactory;

	fn factory() -> Self::Factory {
		create_index
	}
}

impl IndexRegistry for Registry {}
