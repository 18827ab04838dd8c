//! Text and HTML rendering of resolved tickets.
//!
//! Every ticket is shown with explorer links for its L1 submission, its L2
//! creation and, once redeemed, its L2 redeem transaction.

use std::fmt::Write;
use tracker_config::ExplorerConfig;
use tracker_core::{LatestKind, LookupReport};
use tracker_types::{format_timestamp, DepositType, ResolvedTicket};

/// Shown in place of an empty list.
pub const NO_RESULTS: &str = "No retryables found";
/// Shown when the address input does not validate.
pub const INVALID_ADDRESS: &str = "Please enter a valid Ethereum address.";
/// Shown when the subgraphs could not be queried.
pub const LOAD_FAILED: &str = "Could not load results";

pub fn latest_title(kind: LatestKind) -> &'static str {
	match kind {
		LatestKind::Deposits => "Latest deposit retryables",
		LatestKind::Direct => "Latest direct retryables",
	}
}

fn tx_link(base_url: &str, hash: &str) -> String {
	format!("{}{}", base_url, hash)
}

fn deposit_summary(resolved: &ResolvedTicket) -> String {
	let Some(deposit) = &resolved.deposit else {
		return "no".to_string();
	};

	match deposit.deposit_type {
		DepositType::EthDeposit => match &deposit.eth_value {
			Some(value) => format!("ETH ({} wei)", value),
			None => "ETH".to_string(),
		},
		DepositType::TokenDeposit => {
			let symbol = deposit
				.l1_token
				.as_ref()
				.map(|token| token.symbol.clone().unwrap_or_else(|| token.id.clone()))
				.unwrap_or_else(|| "token".to_string());
			match &deposit.token_amount {
				Some(amount) => format!("{} {}", amount, symbol),
				None => symbol,
			}
		},
		DepositType::Unknown => "yes".to_string(),
	}
}

/// Renders a list of tickets as plain text.
pub fn tickets_text(tickets: &[ResolvedTicket], explorer: &ExplorerConfig) -> String {
	if tickets.is_empty() {
		return format!("{}\n", NO_RESULTS);
	}

	let mut out = String::new();
	for resolved in tickets {
		let ticket = &resolved.ticket;
		let _ = writeln!(out, "Ticket {} [{}]", ticket.id, ticket.status);
		let _ = writeln!(
			out,
			"  L1 submission: {}",
			tx_link(&explorer.l1_tx_base_url, resolved.l1_tx_hash())
		);
		let _ = writeln!(
			out,
			"  L2 creation:   {}",
			tx_link(&explorer.l2_tx_base_url, resolved.l2_creation_tx_hash())
		);
		if let Some(hash) = resolved.l2_final_tx_hash() {
			let _ = writeln!(
				out,
				"  L2 redeem:     {}",
				tx_link(&explorer.l2_tx_base_url, hash)
			);
		}
		let _ = writeln!(
			out,
			"  Timeout:       {}",
			format_timestamp(ticket.timeout_timestamp)
		);
		let _ = writeln!(out, "  Sender:        {}", resolved.sender());
		let _ = writeln!(out, "  Deposit:       {}", deposit_summary(resolved));
	}
	out
}

/// Renders a combined lookup as plain text.
pub fn report_text(report: &LookupReport, explorer: &ExplorerConfig) -> String {
	format!(
		"Retryables for {}\n\nPending retryables\n{}\n{}\n{}",
		report.address,
		tickets_text(&report.pending, explorer),
		latest_title(report.latest_kind),
		tickets_text(&report.latest, explorer)
	)
}

/// Escapes text for inclusion in HTML content and attribute values.
pub fn escape_html(input: &str) -> String {
	let mut escaped = String::with_capacity(input.len());
	for c in input.chars() {
		match c {
			'&' => escaped.push_str("&amp;"),
			'<' => escaped.push_str("&lt;"),
			'>' => escaped.push_str("&gt;"),
			'"' => escaped.push_str("&quot;"),
			'\'' => escaped.push_str("&#39;"),
			c => escaped.push(c),
		}
	}
	escaped
}

fn html_link(base_url: &str, hash: &str) -> String {
	let url = escape_html(&tx_link(base_url, hash));
	format!(
		"<a href=\"{}\" target=\"_blank\" rel=\"noopener\">{}</a>",
		url,
		escape_html(hash)
	)
}

/// Full record as pretty JSON, including deposit and token metadata.
fn record_json(resolved: &ResolvedTicket) -> String {
	serde_json::to_string_pretty(resolved).unwrap_or_default()
}

fn tickets_html(title: &str, tickets: &[ResolvedTicket], explorer: &ExplorerConfig) -> String {
	let mut out = format!("<section>\n<h2>{}</h2>\n", escape_html(title));
	if tickets.is_empty() {
		let _ = writeln!(out, "<p>{}</p>", NO_RESULTS);
		out.push_str("</section>\n");
		return out;
	}

	out.push_str("<table>\n<tr><th>L1 submission</th><th>L2 creation</th><th>L2 redeem</th><th>Status</th><th>Timeout</th><th>Sender</th><th>Deposit</th></tr>\n");
	for resolved in tickets {
		let redeem = resolved
			.l2_final_tx_hash()
			.map(|hash| html_link(&explorer.l2_tx_base_url, hash))
			.unwrap_or_else(|| "-".to_string());
		let _ = writeln!(
			out,
			"<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
			html_link(&explorer.l1_tx_base_url, resolved.l1_tx_hash()),
			html_link(&explorer.l2_tx_base_url, resolved.l2_creation_tx_hash()),
			redeem,
			escape_html(&resolved.ticket.status.to_string()),
			escape_html(&format_timestamp(resolved.ticket.timeout_timestamp)),
			escape_html(resolved.sender()),
			escape_html(&deposit_summary(resolved)),
		);
		let _ = writeln!(
			out,
			"<tr><td colspan=\"7\"><details><summary>Record</summary><pre>{}</pre></details></td></tr>",
			escape_html(&record_json(resolved))
		);
	}
	out.push_str("</table>\n</section>\n");
	out
}

/// What the results area of the page shows.
pub enum PageBody<'a> {
	/// Only the form.
	Empty,
	/// A message in place of results.
	Message(&'a str),
	/// A completed lookup.
	Report(&'a LookupReport),
}

/// Renders the lookup page.
pub fn page_html(
	address: &str,
	only_deposits: bool,
	body: PageBody<'_>,
	explorer: &ExplorerConfig,
) -> String {
	let mut out = String::from(
		"<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>Retryable tracker</title>\n</head>\n<body>\n<h1>Retryable tracker</h1>\n",
	);
	let _ = writeln!(
		out,
		"<form method=\"get\" action=\"/\">\n<input type=\"text\" name=\"address\" placeholder=\"0x...\" size=\"44\" value=\"{}\">\n<label><input type=\"checkbox\" name=\"onlyDeposits\" value=\"true\"{}> Only deposits</label>\n<button type=\"submit\">Look up</button>\n</form>",
		escape_html(address),
		if only_deposits { " checked" } else { "" }
	);

	match body {
		PageBody::Empty => {},
		PageBody::Message(message) => {
			let _ = writeln!(out, "<p class=\"error\">{}</p>", escape_html(message));
		},
		PageBody::Report(report) => {
			out.push_str(&tickets_html("Pending retryables", &report.pending, explorer));
			out.push_str(&tickets_html(
				latest_title(report.latest_kind),
				&report.latest,
				explorer,
			));
		},
	}

	out.push_str("</body>\n</html>\n");
	out
}
