//! Latest tickets sent straight to the inbox.

use super::resolve_each;
use crate::{ResolveError, ResolverSettings};
use tracker_index::IndexReader;
use tracker_types::{truncate_id, AccountAddress, ResolvedTicket, SubmissionRecord};
use tracing::instrument;

/// Resolves up to `count` tickets from the submissions of `address`, in
/// index order.
#[instrument(skip(index, settings), fields(address = %address))]
pub async fn resolve(
	index: &dyn IndexReader,
	address: &AccountAddress,
	count: u32,
	settings: &ResolverSettings,
) -> Result<Vec<ResolvedTicket>, ResolveError> {
	let submissions = index.submissions_by_sender(address, count).await?;
	tracing::debug!(candidates = submissions.len(), "Fetched submissions");

	resolve_each(submissions, settings, |submission| {
		resolve_submission(index, submission)
	})
	.await
}

async fn resolve_submission(
	index: &dyn IndexReader,
	submission: SubmissionRecord,
) -> Result<Option<ResolvedTicket>, ResolveError> {
	match index
		.ticket_by_creation_tx(&submission.retryable_ticket_id)
		.await?
	{
		Some(ticket) => Ok(Some(ResolvedTicket::direct(ticket, submission))),
		None => {
			tracing::debug!(
				tx = %truncate_id(&submission.transaction_hash),
				"No ticket found for submission, skipping"
			);
			Ok(None)
		},
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::fixtures::*;
	use crate::TicketTracker;
	use std::sync::Arc;

	#[tokio::test]
	async fn test_source_order_and_cap() {
		let tickets = (1..=8)
			.map(|i| ticket(&format!("0x{}", i), &format!("0xc{}", i)))
			.collect();
		let submissions = (1..=8)
			.map(|i| submission(&format!("0xa{}", i), ALICE, &format!("0xc{}", i)))
			.collect();
		let tracker = TicketTracker::new(
			Arc::new(index(tickets, submissions, vec![])),
			ResolverSettings::default(),
		);
		let address = AccountAddress::parse(ALICE).unwrap();

		let resolved = tracker.latest_direct(&address, None).await.unwrap();

		let ids: Vec<_> = resolved.iter().map(|r| r.ticket.id.as_str()).collect();
		assert_eq!(ids, vec!["0x1", "0x2", "0x3", "0x4", "0x5"]);
		assert!(resolved.iter().all(|r| !r.is_deposit && r.deposit.is_none()));
	}

	#[tokio::test]
	async fn test_missing_ticket_is_skipped() {
		let index = index(
			vec![ticket("0x2", "0xc2")],
			vec![
				submission("0xa1", BOB, "0xc1"),
				submission("0xa2", BOB, "0xc2"),
			],
			vec![],
		);
		let address = AccountAddress::parse(&BOB.to_lowercase()).unwrap();

		let resolved = resolve(&index, &address, 5, &ResolverSettings::default())
			.await
			.unwrap();

		assert_eq!(resolved.len(), 1);
		assert_eq!(resolved[0].ticket.id, "0x2");
		assert_eq!(resolved[0].sender(), BOB);
	}
}
