//! Utility functions shared across the tracker crates.

pub mod de;
pub mod formatting;
pub mod helpers;

pub use formatting::{format_timestamp, truncate_id};
pub use helpers::current_timestamp;
