//! Records decoded from the retryables and bridge subgraphs.
//!
//! Field names follow the subgraph schemas (camelCase on the wire). `BigInt`
//! timestamps, block numbers and sequence numbers are decoded into `u64`;
//! token and fee amounts stay as decimal strings so no precision is lost.

use crate::utils::de::{option_u64_from_str_or_number, u64_from_str_or_number};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of an L2 retryable ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TicketStatus {
	Created,
	Redeemed,
	RedeemFailed,
	Expired,
	Canceled,
	#[serde(other)]
	Unknown,
}

impl fmt::Display for TicketStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Self::Created => "Created",
			Self::Redeemed => "Redeemed",
			Self::RedeemFailed => "RedeemFailed",
			Self::Expired => "Expired",
			Self::Canceled => "Canceled",
			Self::Unknown => "Unknown",
		};
		f.write_str(name)
	}
}

/// An L2 retryable ticket as indexed by the retryables subgraph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
	pub id: String,
	pub status: TicketStatus,
	#[serde(default)]
	pub retry_tx_hash: Option<String>,
	#[serde(deserialize_with = "u64_from_str_or_number")]
	pub timeout_timestamp: u64,
	#[serde(deserialize_with = "u64_from_str_or_number")]
	pub created_at_timestamp: u64,
	#[serde(default, deserialize_with = "option_u64_from_str_or_number")]
	pub created_at_block_number: Option<u64>,
	pub created_at_tx_hash: String,
	#[serde(default, deserialize_with = "option_u64_from_str_or_number")]
	pub redeemed_at_timestamp: Option<u64>,
	#[serde(default)]
	pub is_auto_redeemed: Option<bool>,
	#[serde(default, deserialize_with = "option_u64_from_str_or_number")]
	pub sequence_num: Option<u64>,
	#[serde(default)]
	pub donated_gas: Option<String>,
	#[serde(default)]
	pub gas_donor: Option<String>,
	#[serde(default)]
	pub max_refund: Option<String>,
	#[serde(default)]
	pub submission_fee_refund: Option<String>,
	#[serde(default)]
	pub request_id: Option<String>,
	#[serde(default)]
	pub l1_base_fee: Option<String>,
	#[serde(default)]
	pub deposit: Option<String>,
	#[serde(default)]
	pub callvalue: Option<String>,
	#[serde(default)]
	pub gas_fee_cap: Option<String>,
	#[serde(default)]
	pub gas_limit: Option<String>,
	#[serde(default)]
	pub max_submission_fee: Option<String>,
	#[serde(default)]
	pub fee_refund_address: Option<String>,
	#[serde(default)]
	pub beneficiary: Option<String>,
	#[serde(default)]
	pub retry_to: Option<String>,
	#[serde(default)]
	pub retry_data: Option<String>,
}

impl Ticket {
	/// A ticket is pending while unredeemed and before its timeout.
	pub fn is_pending(&self, now: u64) -> bool {
		self.redeemed_at_timestamp.is_none() && self.timeout_timestamp > now
	}
}

/// The L1 transaction that submitted a retryable, as indexed by the bridge
/// subgraph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
	pub id: String,
	pub sender: String,
	#[serde(default)]
	pub is_eth_deposit: bool,
	#[serde(default)]
	pub value: Option<String>,
	#[serde(default)]
	pub dest_addr: Option<String>,
	/// Hash of the L2 transaction that created the ticket.
	#[serde(rename = "retryableTicketID")]
	pub retryable_ticket_id: String,
	#[serde(default)]
	pub l2_calldata: Option<String>,
	#[serde(deserialize_with = "u64_from_str_or_number")]
	pub timestamp: u64,
	pub transaction_hash: String,
	#[serde(default, deserialize_with = "option_u64_from_str_or_number")]
	pub block_created_at: Option<u64>,
}

/// Kind of bridge deposit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DepositType {
	EthDeposit,
	TokenDeposit,
	#[serde(other)]
	Unknown,
}

/// Metadata of the L1 token moved by a deposit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenMetadata {
	pub id: String,
	#[serde(default)]
	pub name: Option<String>,
	#[serde(default)]
	pub symbol: Option<String>,
	#[serde(default)]
	pub decimals: Option<u32>,
	#[serde(default, deserialize_with = "option_u64_from_str_or_number")]
	pub registered_at_block: Option<u64>,
}

/// A token or ETH deposit through the bridge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositRecord {
	pub id: String,
	#[serde(rename = "type")]
	pub deposit_type: DepositType,
	pub sender: String,
	#[serde(default)]
	pub receiver: Option<String>,
	#[serde(default)]
	pub eth_value: Option<String>,
	#[serde(default)]
	pub l1_token: Option<TokenMetadata>,
	#[serde(default, deserialize_with = "option_u64_from_str_or_number")]
	pub sequence_number: Option<u64>,
	#[serde(default)]
	pub l2_ticket_id: Option<String>,
	#[serde(default)]
	pub token_amount: Option<String>,
	#[serde(default)]
	pub is_classic: bool,
	#[serde(deserialize_with = "u64_from_str_or_number")]
	pub timestamp: u64,
	pub transaction_hash: String,
	#[serde(default, deserialize_with = "option_u64_from_str_or_number")]
	pub block_created_at: Option<u64>,
}

/// A ticket merged with the records it was cross-referenced against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedTicket {
	pub ticket: Ticket,
	pub submission: SubmissionRecord,
	pub deposit: Option<DepositRecord>,
	pub is_deposit: bool,
}

impl ResolvedTicket {
	/// A ticket created by a message sent straight to the inbox.
	pub fn direct(ticket: Ticket, submission: SubmissionRecord) -> Self {
		Self {
			ticket,
			submission,
			deposit: None,
			is_deposit: false,
		}
	}

	/// A ticket created as a side effect of a bridge deposit.
	pub fn from_deposit(
		ticket: Ticket,
		submission: SubmissionRecord,
		deposit: DepositRecord,
	) -> Self {
		Self {
			ticket,
			submission,
			deposit: Some(deposit),
			is_deposit: true,
		}
	}

	/// Address the ticket is attributed to: the depositor for bridge
	/// deposits, the submitter otherwise.
	pub fn sender(&self) -> &str {
		match &self.deposit {
			Some(deposit) => &deposit.sender,
			None => &self.submission.sender,
		}
	}

	/// Hash of the L1 submission transaction.
	pub fn l1_tx_hash(&self) -> &str {
		&self.submission.transaction_hash
	}

	/// Hash of the L2 transaction that created the ticket.
	pub fn l2_creation_tx_hash(&self) -> &str {
		&self.ticket.created_at_tx_hash
	}

	/// Hash of the L2 redeem transaction, once there is one.
	pub fn l2_final_tx_hash(&self) -> Option<&str> {
		self.ticket.retry_tx_hash.as_deref()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	fn ticket_json() -> serde_json::Value {
		json!({
			"id": "0x1",
			"status": "Created",
			"retryTxHash": null,
			"timeoutTimestamp": "1900000000",
			"createdAtTimestamp": "1700000000",
			"createdAtBlockNumber": "150000000",
			"createdAtTxHash": "0xl2creation",
			"redeemedAtTimestamp": null,
			"isAutoRedeemed": false,
			"sequenceNum": "42",
			"donatedGas": null,
			"gasDonor": null,
			"maxRefund": null,
			"submissionFeeRefund": null,
			"requestId": "0x0000000000000000000000000000000000000000000000000000000000000001",
			"l1BaseFee": "20000000000",
			"deposit": "1000000000000000",
			"callvalue": "0",
			"gasFeeCap": "100000000",
			"gasLimit": "300000",
			"maxSubmissionFee": "4000000000000",
			"feeRefundAddress": "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed",
			"beneficiary": "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed",
			"retryTo": "0xfb6916095ca1df60bb79ce92ce3ea74c37c5d359",
			"retryData": "0x"
		})
	}

	#[test]
	fn test_ticket_decodes_subgraph_shape() {
		let ticket: Ticket = serde_json::from_value(ticket_json()).unwrap();

		assert_eq!(ticket.status, TicketStatus::Created);
		assert_eq!(ticket.timeout_timestamp, 1_900_000_000);
		assert_eq!(ticket.sequence_num, Some(42));
		assert_eq!(ticket.redeemed_at_timestamp, None);
		assert_eq!(ticket.retry_tx_hash, None);
		assert!(ticket.is_pending(1_800_000_000));
		assert!(!ticket.is_pending(1_900_000_000));
	}

	#[test]
	fn test_redeemed_ticket_is_not_pending() {
		let mut value = ticket_json();
		value["status"] = json!("Redeemed");
		value["redeemedAtTimestamp"] = json!("1700000100");
		value["retryTxHash"] = json!("0xredeem");

		let ticket: Ticket = serde_json::from_value(value).unwrap();
		assert_eq!(ticket.status, TicketStatus::Redeemed);
		assert!(!ticket.is_pending(0));
	}

	#[test]
	fn test_unknown_status_is_tolerated() {
		let mut value = ticket_json();
		value["status"] = json!("SomethingNew");

		let ticket: Ticket = serde_json::from_value(value).unwrap();
		assert_eq!(ticket.status, TicketStatus::Unknown);
		assert_eq!(ticket.status.to_string(), "Unknown");
	}

	#[test]
	fn test_deposit_decodes_token_metadata() {
		let deposit: DepositRecord = serde_json::from_value(json!({
			"id": "0xdep",
			"type": "TokenDeposit",
			"sender": "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed",
			"receiver": "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed",
			"ethValue": "0",
			"l1Token": {
				"id": "0x6b175474e89094c44da98b954eedeac495271d0f",
				"name": "Dai Stablecoin",
				"symbol": "DAI",
				"decimals": 18,
				"registeredAtBlock": "13000000"
			},
			"sequenceNumber": "7",
			"l2TicketId": "0xticket",
			"tokenAmount": "1000000000000000000",
			"isClassic": false,
			"timestamp": "1700000000",
			"transactionHash": "0xabc",
			"blockCreatedAt": "18000000"
		}))
		.unwrap();

		assert_eq!(deposit.deposit_type, DepositType::TokenDeposit);
		let token = deposit.l1_token.unwrap();
		assert_eq!(token.symbol.as_deref(), Some("DAI"));
		assert_eq!(token.decimals, Some(18));
		assert_eq!(token.registered_at_block, Some(13_000_000));
	}

	#[test]
	fn test_resolved_ticket_serializes_camel_case() {
		let ticket: Ticket = serde_json::from_value(ticket_json()).unwrap();
		let submission: SubmissionRecord = serde_json::from_value(json!({
			"id": "0xsub",
			"sender": "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed",
			"isEthDeposit": false,
			"value": "0",
			"destAddr": "0xfb6916095ca1df60bb79ce92ce3ea74c37c5d359",
			"retryableTicketID": "0xl2creation",
			"l2Calldata": "0x",
			"timestamp": "1700000000",
			"transactionHash": "0xabc",
			"blockCreatedAt": "18000000"
		}))
		.unwrap();

		let resolved = ResolvedTicket::direct(ticket, submission);
		assert!(!resolved.is_deposit);
		assert_eq!(resolved.l1_tx_hash(), "0xabc");
		assert_eq!(resolved.l2_creation_tx_hash(), "0xl2creation");
		assert_eq!(resolved.l2_final_tx_hash(), None);

		let value = serde_json::to_value(&resolved).unwrap();
		assert_eq!(value["isDeposit"], json!(false));
		assert_eq!(value["submission"]["retryableTicketID"], json!("0xl2creation"));
		assert!(value["deposit"].is_null());
	}
}
