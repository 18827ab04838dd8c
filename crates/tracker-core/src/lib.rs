//! Core lookup service for the retryable tracker.
//!
//! Neither subgraph holds the full story of a retryable ticket: the L2 ticket
//! lives in one index, the L1 submission and any bridge deposit in the other.
//! The resolvers in this crate stitch the records together by transaction
//! hash and filter them by account. [`TicketTracker`] bundles the three
//! resolvers behind a single service built from configuration.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracker_config::ResolverConfig;
use tracker_index::{IndexError, IndexReader};
use tracker_types::{current_timestamp, AccountAddress, ResolvedTicket};
use tracing::instrument;

pub mod builder;
pub mod resolvers;

pub use builder::{BuilderError, TrackerBuilder};

/// Errors that can occur while resolving tickets.
#[derive(Debug, Error)]
pub enum ResolveError {
	/// A lookup against the index failed.
	#[error(transparent)]
	Index(#[from] IndexError),
}

/// Limits applied by the resolvers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverSettings {
	/// Number of pending tickets read per lookup.
	pub pending_page_size: u32,
	/// Upper bound for the latest deposit and direct lists.
	pub max_results: u32,
	/// Count used when the caller does not request one.
	pub default_results: u32,
	/// Records cross-referenced at once.
	pub lookup_concurrency: usize,
}

impl ResolverSettings {
	/// Effective result count for a latest-tickets request.
	pub fn result_count(&self, requested: Option<u32>) -> u32 {
		requested
			.unwrap_or(self.default_results)
			.min(self.max_results)
	}

	pub(crate) fn concurrency(&self) -> usize {
		self.lookup_concurrency.max(1)
	}
}

impl Default for ResolverSettings {
	fn default() -> Self {
		ResolverConfig::default().into()
	}
}

impl From<ResolverConfig> for ResolverSettings {
	fn from(config: ResolverConfig) -> Self {
		Self {
			pending_page_size: config.pending_page_size,
			max_results: config.max_results,
			default_results: config.default_results,
			lookup_concurrency: config.lookup_concurrency,
		}
	}
}

/// Which latest-tickets list accompanies the pending list in a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LatestKind {
	/// Tickets created by bridge deposits.
	Deposits,
	/// Tickets sent straight to the inbox.
	Direct,
}

/// Pending tickets plus one list of latest tickets for an address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupReport {
	pub address: AccountAddress,
	pub pending: Vec<ResolvedTicket>,
	pub latest_kind: LatestKind,
	pub latest: Vec<ResolvedTicket>,
}

/// Service answering retryable-ticket lookups for an account.
pub struct TicketTracker {
	index: Arc<dyn IndexReader>,
	settings: ResolverSettings,
}

impl TicketTracker {
	/// Creates a tracker over the given index reader.
	pub fn new(index: Arc<dyn IndexReader>, settings: ResolverSettings) -> Self {
		Self { index, settings }
	}

	pub fn settings(&self) -> &ResolverSettings {
		&self.settings
	}

	/// Tickets created from `address` that can still be redeemed.
	#[instrument(skip(self), fields(address = %address))]
	pub async fn pending_for_address(
		&self,
		address: &AccountAddress,
	) -> Result<Vec<ResolvedTicket>, ResolveError> {
		resolvers::pending::resolve(
			self.index.as_ref(),
			address,
			&self.settings,
			current_timestamp(),
		)
		.await
	}

	/// Latest tickets created by bridge deposits from `address`, newest first.
	#[instrument(skip(self), fields(address = %address))]
	pub async fn latest_deposits(
		&self,
		address: &AccountAddress,
		count: Option<u32>,
	) -> Result<Vec<ResolvedTicket>, ResolveError> {
		let count = self.settings.result_count(count);
		resolvers::deposit::resolve(self.index.as_ref(), address, count, &self.settings).await
	}

	/// Latest tickets sent directly by `address`.
	#[instrument(skip(self), fields(address = %address))]
	pub async fn latest_direct(
		&self,
		address: &AccountAddress,
		count: Option<u32>,
	) -> Result<Vec<ResolvedTicket>, ResolveError> {
		let count = self.settings.result_count(count);
		resolvers::direct::resolve(self.index.as_ref(), address, count, &self.settings).await
	}

	/// Runs the pending pipeline alongside the chosen latest pipeline.
	pub async fn lookup(
		&self,
		address: &AccountAddress,
		latest_kind: LatestKind,
	) -> Result<LookupReport, ResolveError> {
		let latest = async {
			match latest_kind {
				LatestKind::Deposits => self.latest_deposits(address, None).await,
				LatestKind::Direct => self.latest_direct(address, None).await,
			}
		};

		let (pending, latest) = tokio::try_join!(self.pending_for_address(address), latest)?;

		tracing::info!(
			address = %address,
			pending = pending.len(),
			latest = latest.len(),
			kind = ?latest_kind,
			"Lookup complete"
		);

		Ok(LookupReport {
			address: *address,
			pending,
			latest_kind,
			latest,
		})
	}
}


#[cfg(test)]
mod tests {
	use super::fixtures::*;
	use super::*;

	fn tracker(index: tracker_index::implementations::memory::MemoryIndex) -> TicketTracker {
		TicketTracker::new(Arc::new(index), ResolverSettings::default())
	}

	#[test]
	fn test_result_count_defaults_and_caps() {
		let settings = ResolverSettings::default();
		assert_eq!(settings.result_count(None), 5);
		assert_eq!(settings.result_count(Some(3)), 3);
		assert_eq!(settings.result_count(Some(50)), 5);

		let generous = ResolverSettings {
			max_results: 100,
			..ResolverSettings::default()
		};
		assert_eq!(generous.result_count(None), 20);
	}

	#[tokio::test]
	async fn test_unknown_address_yields_empty_results() {
		let tracker = tracker(index(
			vec![ticket("0x1", "0xc1")],
			vec![submission("0xabc", BOB, "0xc1")],
			vec![deposit("0xdef", BOB, 10)],
		));
		let alice = AccountAddress::parse(ALICE).unwrap();

		assert!(tracker.pending_for_address(&alice).await.unwrap().is_empty());
		assert!(tracker.latest_deposits(&alice, None).await.unwrap().is_empty());
		assert!(tracker.latest_direct(&alice, None).await.unwrap().is_empty());
	}

	#[tokio::test]
	async fn test_lookup_combines_pending_and_latest() {
		let tracker = tracker(index(
			vec![ticket("0x1", "0xc1"), ticket("0x2", "0xc2")],
			vec![
				submission("0xa1", ALICE, "0xc1"),
				submission("0xa2", ALICE, "0xc2"),
			],
			vec![deposit("0xa2", ALICE, 10)],
		));
		let alice = AccountAddress::parse(ALICE).unwrap();

		let report = tracker.lookup(&alice, LatestKind::Deposits).await.unwrap();
		assert_eq!(report.pending.len(), 2);
		assert_eq!(report.latest_kind, LatestKind::Deposits);
		assert_eq!(report.latest.len(), 1);
		assert!(report.latest[0].is_deposit);

		let report = tracker.lookup(&alice, LatestKind::Direct).await.unwrap();
		assert_eq!(report.latest.len(), 2);
		assert!(report.latest.iter().all(|resolved| !resolved.is_deposit));
	}
}
