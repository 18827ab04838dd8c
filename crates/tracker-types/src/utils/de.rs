//! Serde helpers for subgraph scalars.
//!
//! Subgraphs encode `BigInt` values as decimal strings while `Int` values
//! arrive as JSON numbers. These helpers accept either form.

use serde::{de::Error, Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
	String(String),
	Number(u64),
}

impl StringOrNumber {
	fn into_u64<E: Error>(self) -> Result<u64, E> {
		match self {
			StringOrNumber::Number(n) => Ok(n),
			StringOrNumber::String(s) => s
				.trim()
				.parse::<u64>()
				.map_err(|e| E::custom(format!("Invalid integer '{}': {}", s, e))),
		}
	}
}

/// Deserializes a `u64` from a decimal string or a number.
pub fn u64_from_str_or_number<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
	D: Deserializer<'de>,
{
	StringOrNumber::deserialize(deserializer)?.into_u64()
}

/// Deserializes an optional `u64` from a decimal string, a number or `null`.
pub fn option_u64_from_str_or_number<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
	D: Deserializer<'de>,
{
	Option::<StringOrNumber>::deserialize(deserializer)?
		.map(StringOrNumber::into_u64)
		.transpose()
}
