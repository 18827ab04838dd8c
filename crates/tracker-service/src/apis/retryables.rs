//! Retryable lookups keyed by account address.

use super::ApiError;
use serde::Deserialize;
use tracker_core::{LatestKind, LookupReport, TicketTracker};
use tracker_types::{AccountAddress, ResolvedTicket};

/// Query parameters of the latest-tickets endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct CountParams {
	/// Requested number of results, capped by the tracker.
	pub count: Option<u32>,
}

/// Query parameters of the combined lookup endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupParams {
	#[serde(default)]
	pub only_deposits: bool,
}

pub async fn get_pending(
	address: &str,
	tracker: &TicketTracker,
) -> Result<Vec<ResolvedTicket>, ApiError> {
	let address = AccountAddress::parse(address)?;
	Ok(tracker.pending_for_address(&address).await?)
}

pub async fn get_latest(
	address: &str,
	kind: LatestKind,
	params: CountParams,
	tracker: &TicketTracker,
) -> Result<Vec<ResolvedTicket>, ApiError> {
	let address = AccountAddress::parse(address)?;
	let tickets = match kind {
		LatestKind::Deposits => tracker.latest_deposits(&address, params.count).await?,
		LatestKind::Direct => tracker.latest_direct(&address, params.count).await?,
	};
	Ok(tickets)
}

pub async fn get_lookup(
	address: &str,
	params: LookupParams,
	tracker: &TicketTracker,
) -> Result<LookupReport, ApiError> {
	let address = AccountAddress::parse(address)?;
	let kind = if params.only_deposits {
		LatestKind::Deposits
	} else {
		LatestKind::Direct
	};
	Ok(tracker.lookup(&address, kind).await?)
}
