//! Latest tickets created by bridge deposits.

use super::resolve_each;
use crate::{ResolveError, ResolverSettings};
use tracker_index::IndexReader;
use tracker_types::{truncate_id, AccountAddress, DepositRecord, ResolvedTicket};
use tracing::instrument;

/// Resolves up to `count` tickets created by the newest deposits of
/// `address`, newest first.
#[instrument(skip(index, settings), fields(address = %address))]
pub async fn resolve(
	index: &dyn IndexReader,
	address: &AccountAddress,
	count: u32,
	settings: &ResolverSettings,
) -> Result<Vec<ResolvedTicket>, ResolveError> {
	let deposits = index.deposits_by_sender(address, count).await?;
	tracing::debug!(candidates = deposits.len(), "Fetched deposits");

	resolve_each(deposits, settings, |deposit| resolve_deposit(index, deposit)).await
}

async fn resolve_deposit(
	index: &dyn IndexReader,
	deposit: DepositRecord,
) -> Result<Option<ResolvedTicket>, ResolveError> {
	let Some(submission) = index
		.submission_by_tx_hash(&deposit.transaction_hash)
		.await?
	else {
		tracing::debug!(
			tx = %truncate_id(&deposit.transaction_hash),
			"No submission found for deposit, skipping"
		);
		return Ok(None);
	};

	let Some(ticket) = index
		.ticket_by_creation_tx(&submission.retryable_ticket_id)
		.await?
	else {
		tracing::debug!(
			tx = %truncate_id(&submission.retryable_ticket_id),
			"No ticket found for deposit submission, skipping"
		);
		return Ok(None);
	};

	Ok(Some(ResolvedTicket::from_deposit(ticket, submission, deposit)))
}
