//! Resolvers that cross-reference tickets, submissions and deposits.
//!
//! Each resolver reads a candidate list, then looks up the matching records
//! for every candidate. Candidates whose cross-reference is missing from the
//! index are skipped; the index is eventually consistent and a gap is not an
//! error. Output order always follows candidate order.

use crate::{ResolveError, ResolverSettings};
use futures::{stream, StreamExt, TryStreamExt};
use std::future::Future;
use tracker_types::ResolvedTicket;

pub mod deposit;
pub mod direct;
pub mod pending;

/// Resolves every candidate with at most `settings.lookup_concurrency`
/// lookups in flight, keeping candidate order and dropping gaps.
pub(crate) async fn resolve_each<T, F, Fut>(
	candidates: Vec<T>,
	settings: &ResolverSettings,
	resolve_one: F,
) -> Result<Vec<ResolvedTicket>, ResolveError>
where
	F: FnMut(T) -> Fut,
	Fut: Future<Output = Result<Option<ResolvedTicket>, ResolveError>>,
{
	let resolved: Vec<Option<ResolvedTicket>> = stream::iter(candidates)
		.map(resolve_one)
		.buffered(settings.concurrency())
		.try_collect()
		.await?;

	Ok(resolved.into_iter().flatten().collect())
}
