//! Account address parsing and comparison.
//!
//! User input is accepted in the same shapes wallets produce: `0x` followed by
//! 40 hex digits, either in a single case or in EIP-55 mixed-case form. Mixed
//! case input must carry a valid checksum. Subgraphs store addresses in
//! lowercase, so every query uses the lowercase rendering.

use alloy_primitives::Address;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while validating an account address.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
	/// Input is not `0x` followed by 40 hex digits.
	#[error("Invalid address format: {0}")]
	Format(String),
	/// Mixed-case input whose EIP-55 checksum does not match.
	#[error("Invalid address checksum: {0}")]
	Checksum(String),
}

/// A validated 20-byte account address.
///
/// Equality is byte-wise, so two inputs that differ only in letter case
/// compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccountAddress(Address);

impl AccountAddress {
	/// Parses and validates user supplied input.
	pub fn parse(input: &str) -> Result<Self, AddressError> {
		let trimmed = input.trim();
		let digits = trimmed
			.strip_prefix("0x")
			.or_else(|| trimmed.strip_prefix("0X"))
			.ok_or_else(|| AddressError::Format(trimmed.to_string()))?;

		if digits.len() != 40 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
			return Err(AddressError::Format(trimmed.to_string()));
		}

		let has_lower = digits.chars().any(|c| c.is_ascii_lowercase());
		let has_upper = digits.chars().any(|c| c.is_ascii_uppercase());

		let address = if has_lower && has_upper {
			Address::parse_checksummed(format!("0x{}", digits), None)
				.map_err(|_| AddressError::Checksum(trimmed.to_string()))?
		} else {
			Address::from_str(digits).map_err(|_| AddressError::Format(trimmed.to_string()))?
		};

		Ok(Self(address))
	}

	/// Lowercase `0x`-prefixed form used in subgraph filters.
	pub fn to_lowercase_hex(&self) -> String {
		format!("0x{}", hex::encode(self.0.as_slice()))
	}

	/// EIP-55 checksummed form used for display.
	pub fn to_checksum(&self) -> String {
		self.0.to_checksum(None)
	}

	/// Compares against an address string as returned by a subgraph.
	///
	/// The comparison ignores letter case and does not require `other` to be
	/// a valid address; malformed strings simply never match.
	pub fn matches(&self, other: &str) -> bool {
		self.to_lowercase_hex().eq_ignore_ascii_case(other.trim())
	}
}

impl FromStr for AccountAddress {
	type Err = AddressError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(s)
	}
}

impl fmt::Display for AccountAddress {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.to_checksum())
	}
}

impl Serialize for AccountAddress {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str(&self.to_lowercase_hex())
	}
}

impl<'de> Deserialize<'de> for AccountAddress {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let s = String::deserialize(deserializer)?;
		Self::parse(&s).map_err(serde::de::Error::custom)
	}
}
