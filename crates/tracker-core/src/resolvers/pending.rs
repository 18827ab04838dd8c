//! Pending tickets for an address.
//!
//! Pending tickets are listed globally, so each candidate is traced back to
//! its L1 submission and, when the submission came through the token bridge,
//! to the deposit. The ticket belongs to the address when the deposit sender
//! matches, or the submission sender when there is no deposit.

use super::resolve_each;
use crate::{ResolveError, ResolverSettings};
use tracker_index::IndexReader;
use tracker_types::{truncate_id, AccountAddress, ResolvedTicket, Ticket};
use tracing::instrument;

/// Resolves the pending tickets attributed to `address` as of `now`.
#[instrument(skip(index, settings), fields(address = %address))]
pub async fn resolve(
	index: &dyn IndexReader,
	address: &AccountAddress,
	settings: &ResolverSettings,
	now: u64,
) -> Result<Vec<ResolvedTicket>, ResolveError> {
	let candidates = index
		.pending_tickets(settings.pending_page_size, now)
		.await?;
	tracing::debug!(candidates = candidates.len(), "Fetched pending tickets");

	resolve_each(candidates, settings, |ticket| {
		resolve_ticket(index, address, ticket)
	})
	.await
}

async fn resolve_ticket(
	index: &dyn IndexReader,
	address: &AccountAddress,
	ticket: Ticket,
) -> Result<Option<ResolvedTicket>, ResolveError> {
	let Some(submission) = index
		.submission_by_ticket_id(&ticket.created_at_tx_hash)
		.await?
	else {
		tracing::debug!(
			ticket = %truncate_id(&ticket.id),
			"No submission found for pending ticket, skipping"
		);
		return Ok(None);
	};

	let resolved = match index
		.deposit_by_tx_hash(&submission.transaction_hash)
		.await?
	{
		Some(deposit) => ResolvedTicket::from_deposit(ticket, submission, deposit),
		None => ResolvedTicket::direct(ticket, submission),
	};

	Ok(address.matches(resolved.sender()).then_some(resolved))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::fixtures::*;

	async fn run(index: &dyn IndexReader, input: &str) -> Vec<ResolvedTicket> {
		let address = AccountAddress::parse(input).unwrap();
		resolve(index, &address, &ResolverSettings::default(), 1_700_000_000)
			.await
			.unwrap()
	}

	#[tokio::test]
	async fn test_direct_submission_is_not_a_deposit() {
		let sender = ALICE.to_lowercase();
		let index = index(
			vec![ticket("0x1", "0xc1")],
			vec![submission("0xabc", &sender, "0xc1")],
			vec![],
		);

		let resolved = run(&index, &sender).await;

		assert_eq!(resolved.len(), 1);
		assert_eq!(resolved[0].ticket.id, "0x1");
		assert_eq!(resolved[0].submission.transaction_hash, "0xabc");
		assert!(!resolved[0].is_deposit);
		assert!(resolved[0].deposit.is_none());
	}

	#[tokio::test]
	async fn test_address_case_does_not_matter() {
		let index = index(
			vec![ticket("0x1", "0xc1"), ticket("0x2", "0xc2")],
			vec![
				submission("0xa1", &ALICE.to_lowercase(), "0xc1"),
				submission("0xa2", ALICE, "0xc2"),
			],
			vec![deposit("0xa2", &ALICE.to_uppercase().replace("0X", "0x"), 10)],
		);

		let lower = run(&index, &ALICE.to_lowercase()).await;
		let checksummed = run(&index, ALICE).await;

		assert_eq!(lower.len(), 2);
		assert_eq!(lower, checksummed);
	}

	#[tokio::test]
	async fn test_missing_submission_is_skipped() {
		let index = index(
			vec![
				ticket("0x1", "0xc1"),
				ticket("0x2", "0xc2"),
				ticket("0x3", "0xc3"),
			],
			vec![
				submission("0xa1", ALICE, "0xc1"),
				submission("0xa3", ALICE, "0xc3"),
			],
			vec![],
		);

		let resolved = run(&index, ALICE).await;
		let ids: Vec<_> = resolved.iter().map(|r| r.ticket.id.as_str()).collect();
		assert_eq!(ids, vec!["0x1", "0x3"]);
	}

	#[tokio::test]
	async fn test_deposit_sender_decides_ownership() {
		// Submitted by a gateway on behalf of BOB, then one on behalf of ALICE.
		let index = index(
			vec![ticket("0x1", "0xc1"), ticket("0x2", "0xc2")],
			vec![
				submission("0xa1", ALICE, "0xc1"),
				submission("0xa2", BOB, "0xc2"),
			],
			vec![deposit("0xa1", BOB, 10), deposit("0xa2", ALICE, 11)],
		);

		let resolved = run(&index, ALICE).await;

		assert_eq!(resolved.len(), 1);
		assert_eq!(resolved[0].ticket.id, "0x2");
		assert!(resolved[0].is_deposit);
		assert_eq!(resolved[0].sender(), ALICE);
	}

	#[tokio::test]
	async fn test_expired_and_redeemed_tickets_are_ignored() {
		let mut expired = ticket("0x1", "0xc1");
		expired.timeout_timestamp = 1_600_000_000;
		let mut redeemed = ticket("0x2", "0xc2");
		redeemed.redeemed_at_timestamp = Some(1_650_000_000);

		let index = index(
			vec![expired, redeemed, ticket("0x3", "0xc3")],
			vec![
				submission("0xa1", ALICE, "0xc1"),
				submission("0xa2", ALICE, "0xc2"),
				submission("0xa3", ALICE, "0xc3"),
			],
			vec![],
		);

		let resolved = run(&index, ALICE).await;
		assert_eq!(resolved.len(), 1);
		assert_eq!(resolved[0].ticket.id, "0x3");
	}

	#[tokio::test]
	async fn test_concurrent_lookups_keep_order() {
		let tickets = (0..12)
			.map(|i| ticket(&format!("0x{:x}", i), &format!("0xc{:x}", i)))
			.collect();
		let submissions = (0..12)
			.map(|i| submission(&format!("0xa{:x}", i), ALICE, &format!("0xc{:x}", i)))
			.collect();
		let index = index(tickets, submissions, vec![]);
		let address = AccountAddress::parse(ALICE).unwrap();

		let sequential = resolve(&index, &address, &ResolverSettings::default(), 0)
			.await
			.unwrap();
		let concurrent = resolve(
			&index,
			&address,
			&ResolverSettings {
				lookup_concurrency: 4,
				..ResolverSettings::default()
			},
			0,
		)
		.await
		.unwrap();

		assert_eq!(sequential.len(), 12);
		assert_eq!(sequential, concurrent);
	}
}
