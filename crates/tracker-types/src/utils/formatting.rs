//! String formatting utilities.
//!
//! Provides functions for formatting hashes and timestamps for display.

use chrono::{DateTime, SecondsFormat, Utc};

/// Truncates a hash for log output.
///
/// Shows only the first 10 characters followed by ".." for longer strings,
/// which keeps the `0x` prefix plus four bytes.
pub fn truncate_id(id: &str) -> String {
	match id.char_indices().nth(10) {
		Some((end, _)) => format!("{}..", &id[..end]),
		None => id.to_string(),
	}
}

/// Formats a UNIX timestamp (seconds) as an RFC 3339 UTC string.
///
/// Timestamps outside chrono's representable range fall back to the raw
/// number of seconds.
pub fn format_timestamp(seconds: u64) -> String {
	i64::try_from(seconds)
		.ok()
		.and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
		.map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true))
		.unwrap_or_else(|| seconds.to_string())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_truncate_id() {
		assert_eq!(truncate_id("0xabc"), "0xabc");
		assert_eq!(
			truncate_id("0x1234567890abcdef1234567890abcdef"),
			"0x12345678.."
		);
	}

	#[test]
	fn test_truncate_id_multibyte() {
		assert_eq!(truncate_id("0x1234567é-tail"), "0x1234567é..");
		assert_eq!(truncate_id("0x1234567é"), "0x1234567é");
	}

	#[test]
	fn test_format_timestamp() {
		assert_eq!(format_timestamp(0), "1970-01-01T00:00:00Z");
		assert_eq!(format_timestamp(1_700_000_000), "2023-11-14T22:13:20Z");
		assert_eq!(format_timestamp(u64::MAX), u64::MAX.to_string());
	}
}
