//! GraphQL query builders.
//!
//! Every lookup the resolvers perform has a builder here. Each one selects
//! the full field set of the record it returns, so the decoded records carry
//! the same shape regardless of which lookup produced them.

use std::fmt::Write;

/// Fields selected for tickets from the retryables subgraph.
pub const TICKET_FIELDS: &[&str] = &[
	"id",
	"status",
	"retryTxHash",
	"timeoutTimestamp",
	"createdAtTimestamp",
	"createdAtBlockNumber",
	"createdAtTxHash",
	"redeemedAtTimestamp",
	"isAutoRedeemed",
	"sequenceNum",
	"donatedGas",
	"gasDonor",
	"maxRefund",
	"submissionFeeRefund",
	"requestId",
	"l1BaseFee",
	"deposit",
	"callvalue",
	"gasFeeCap",
	"gasLimit",
	"maxSubmissionFee",
	"feeRefundAddress",
	"beneficiary",
	"retryTo",
	"retryData",
];

/// Fields selected for submissions from the bridge subgraph.
pub const SUBMISSION_FIELDS: &[&str] = &[
	"id",
	"sender",
	"isEthDeposit",
	"value",
	"destAddr",
	"retryableTicketID",
	"l2Calldata",
	"timestamp",
	"transactionHash",
	"blockCreatedAt",
];

/// Fields selected for deposits from the bridge subgraph.
pub const DEPOSIT_FIELDS: &[&str] = &[
	"id",
	"type",
	"sender",
	"receiver",
	"ethValue",
	"l1Token { id name symbol decimals registeredAtBlock }",
	"sequenceNumber",
	"l2TicketId",
	"tokenAmount",
	"isClassic",
	"timestamp",
	"transactionHash",
	"blockCreatedAt",
];

/// Name of the ticket and submission collections in both subgraphs.
pub const RETRYABLES_COLLECTION: &str = "retryables";
/// Name of the deposit collection in the bridge subgraph.
pub const DEPOSITS_COLLECTION: &str = "deposits";

enum Filter<'a> {
	Eq(&'a str, &'a str),
	IsNull(&'a str),
	Gt(&'a str, u64),
}

/// Escapes a value for use inside a GraphQL string literal.
pub fn escape_string(value: &str) -> String {
	let mut escaped = String::with_capacity(value.len());
	for c in value.chars() {
		match c {
			'"' => escaped.push_str("\\\""),
			'\\' => escaped.push_str("\\\\"),
			'\n' => escaped.push_str("\\n"),
			'\r' => escaped.push_str("\\r"),
			'\t' => escaped.push_str("\\t"),
			c if c.is_control() => {
				let _ = write!(escaped, "\\u{:04x}", c as u32);
			},
			c => escaped.push(c),
		}
	}
	escaped
}

fn collection_query(
	collection: &str,
	first: u32,
	filters: &[Filter<'_>],
	order_by_desc: Option<&str>,
	fields: &[&str],
) -> String {
	let conditions = filters
		.iter()
		.map(|filter| match filter {
			Filter::Eq(field, value) => format!("{}: \"{}\"", field, escape_string(value)),
			Filter::IsNull(field) => format!("{}: null", field),
			Filter::Gt(field, value) => format!("{}_gt: {}", field, value),
		})
		.collect::<Vec<_>>()
		.join(", ");

	let mut arguments = format!("first: {}, where: {{ {} }}", first, conditions);
	if let Some(field) = order_by_desc {
		let _ = write!(arguments, ", orderBy: {}, orderDirection: desc", field);
	}

	format!(
		"query {{ {}({}) {{ {} }} }}",
		collection,
		arguments,
		fields.join(" ")
	)
}

/// Unredeemed tickets whose timeout lies after `now` (retryables subgraph).
pub fn pending_tickets(first: u32, now: u64) -> String {
	collection_query(
		RETRYABLES_COLLECTION,
		first,
		&[
			Filter::IsNull("redeemedAtTimestamp"),
			Filter::Gt("timeoutTimestamp", now),
		],
		None,
		TICKET_FIELDS,
	)
}

/// The ticket created by the given L2 transaction (retryables subgraph).
pub fn ticket_by_creation_tx(tx_hash: &str) -> String {
	collection_query(
		RETRYABLES_COLLECTION,
		1,
		&[Filter::Eq("createdAtTxHash", tx_hash)],
		None,
		TICKET_FIELDS,
	)
}

/// The submission whose ticket was created by the given L2 transaction
/// (bridge subgraph).
pub fn submission_by_ticket_id(ticket_id: &str) -> String {
	collection_query(
		RETRYABLES_COLLECTION,
		1,
		&[Filter::Eq("retryableTicketID", ticket_id)],
		None,
		SUBMISSION_FIELDS,
	)
}

/// The submission made in the given L1 transaction (bridge subgraph).
pub fn submission_by_tx_hash(tx_hash: &str) -> String {
	collection_query(
		RETRYABLES_COLLECTION,
		1,
		&[Filter::Eq("transactionHash", tx_hash)],
		None,
		SUBMISSION_FIELDS,
	)
}

/// Submissions sent by `sender` in source order (bridge subgraph).
pub fn submissions_by_sender(sender: &str, first: u32) -> String {
	collection_query(
		RETRYABLES_COLLECTION,
		first,
		&[Filter::Eq("sender", sender)],
		None,
		SUBMISSION_FIELDS,
	)
}

/// The deposit made in the given L1 transaction (bridge subgraph).
pub fn deposit_by_tx_hash(tx_hash: &str) -> String {
	collection_query(
		DEPOSITS_COLLECTION,
		1,
		&[Filter::Eq("transactionHash", tx_hash)],
		None,
		DEPOSIT_FIELDS,
	)
}

/// Most recent deposits by `sender`, newest first (bridge subgraph).
pub fn deposits_by_sender(sender: &str, first: u32) -> String {
	collection_query(
		DEPOSITS_COLLECTION,
		first,
		&[Filter::Eq("sender", sender)],
		Some("timestamp"),
		DEPOSIT_FIELDS,
	)
}
