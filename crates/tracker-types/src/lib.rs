//! Common types module for the retryable tracker.
//!
//! This module defines the records decoded from the retryables and bridge
//! subgraphs, the merged view produced by the resolvers, and the validated
//! account address every lookup is keyed by.

/// Validated account addresses.
pub mod address;
/// Subgraph record types and the resolved ticket view.
pub mod records;
/// Registry trait for named, self-registering implementations.
pub mod registry;
/// Utility functions shared across crates.
pub mod utils;

pub use address::{AccountAddress, AddressError};
pub use records::*;
pub use registry::ImplementationRegistry;
pub use utils::{current_timestamp, format_timestamp, truncate_id};
