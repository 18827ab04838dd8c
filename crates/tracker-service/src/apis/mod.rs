//! JSON API handlers and their error type.

use axum::{
	http::StatusCode,
	response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracker_core::ResolveError;
use tracker_types::AddressError;

pub mod retryables;

/// Body returned with every API error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
	/// Error type/code
	pub error: String,
	/// Human-readable description
	pub message: String,
}

/// Errors surfaced by the API.
#[derive(Debug, Error)]
pub enum ApiError {
	/// The path did not carry a valid account address (400).
	#[error("Invalid address: {0}")]
	InvalidAddress(#[from] AddressError),
	/// The subgraphs could not be queried (502).
	#[error("Lookup failed: {0}")]
	Upstream(#[from] ResolveError),
}

impl ApiError {
	/// Get the HTTP status code for this error.
	pub fn status_code(&self) -> StatusCode {
		match self {
			ApiError::InvalidAddress(_) => StatusCode::BAD_REQUEST,
			ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
		}
	}

	/// Convert to ErrorResponse for JSON serialization.
	pub fn to_error_response(&self) -> ErrorResponse {
		match self {
			ApiError::InvalidAddress(e) => ErrorResponse {
				error: "INVALID_ADDRESS".to_string(),
				message: e.to_string(),
			},
			ApiError::Upstream(e) => ErrorResponse {
				error: "UPSTREAM_ERROR".to_string(),
				message: e.to_string(),
			},
		}
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		(self.status_code(), Json(self.to_error_response())).into_response()
	}
}
