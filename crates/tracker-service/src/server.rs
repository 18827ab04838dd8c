//! HTTP server for the retryable tracker.
//!
//! Serves the lookup page at `/` and JSON lookups under
//! `/api/retryables/{address}`.

use crate::apis::{
	retryables::{self, CountParams, LookupParams},
	ApiError,
};
use crate::render::{self, PageBody};
use axum::{
	extract::{Path, Query, State},
	http::StatusCode,
	response::{Html, IntoResponse, Json, Response},
	routing::get,
	Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tracker_config::{ApiConfig, ExplorerConfig};
use tracker_core::{LatestKind, LookupReport, TicketTracker};
use tracker_types::{AccountAddress, ResolvedTicket};

/// Shared application state for the server.
#[derive(Clone)]
pub struct AppState {
	/// Tracker answering the lookups.
	pub tracker: Arc<TicketTracker>,
	/// Explorer links used on the page.
	pub explorer: ExplorerConfig,
}

/// Query parameters of the lookup page.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageParams {
	address: Option<String>,
	only_deposits: Option<String>,
}

/// Builds the router with all routes and middleware.
pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/", get(handle_page))
		.nest(
			"/api",
			Router::new()
				.route("/retryables/{address}", get(handle_lookup))
				.route("/retryables/{address}/pending", get(handle_pending))
				.route("/retryables/{address}/deposits", get(handle_deposits))
				.route("/retryables/{address}/direct", get(handle_direct)),
		)
		.layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
		.with_state(state)
}

/// Starts the HTTP server and serves until the listener fails.
pub async fn start_server(
	api_config: ApiConfig,
	state: AppState,
) -> Result<(), Box<dyn std::error::Error>> {
	let app = router(state);

	let bind_address = format!("{}:{}", api_config.host, api_config.port);
	let listener = TcpListener::bind(&bind_address).await?;

	tracing::info!("Retryable tracker server starting on {}", bind_address);

	axum::serve(listener, app).await?;

	Ok(())
}

fn is_checked(value: &str) -> bool {
	matches!(value, "true" | "on" | "1")
}

/// Handles GET / requests.
///
/// Without an address only the form is shown. Invalid input and failed
/// lookups replace the results with a message; a page is never rendered
/// from partial results.
async fn handle_page(State(state): State<AppState>, Query(params): Query<PageParams>) -> Response {
	let only_deposits = params.only_deposits.as_deref().is_some_and(is_checked);
	let input = params.address.unwrap_or_default();
	let input = input.trim();

	if input.is_empty() {
		return Html(render::page_html("", only_deposits, PageBody::Empty, &state.explorer))
			.into_response();
	}

	let address = match AccountAddress::parse(input) {
		Ok(address) => address,
		Err(e) => {
			tracing::debug!("Rejected page lookup: {}", e);
			let page = render::page_html(
				input,
				only_deposits,
				PageBody::Message(render::INVALID_ADDRESS),
				&state.explorer,
			);
			return (StatusCode::BAD_REQUEST, Html(page)).into_response();
		},
	};

	let kind = if only_deposits {
		LatestKind::Deposits
	} else {
		LatestKind::Direct
	};

	match state.tracker.lookup(&address, kind).await {
		Ok(report) => Html(render::page_html(
			input,
			only_deposits,
			PageBody::Report(&report),
			&state.explorer,
		))
		.into_response(),
		Err(e) => {
			tracing::warn!("Page lookup failed: {}", e);
			let page = render::page_html(
				input,
				only_deposits,
				PageBody::Message(render::LOAD_FAILED),
				&state.explorer,
			);
			(StatusCode::BAD_GATEWAY, Html(page)).into_response()
		},
	}
}

/// Handles GET /api/retryables/{address} requests.
async fn handle_lookup(
	Path(address): Path<String>,
	Query(params): Query<LookupParams>,
	State(state): State<AppState>,
) -> Result<Json<LookupReport>, ApiError> {
	match retryables::get_lookup(&address, params, &state.tracker).await {
		Ok(report) => Ok(Json(report)),
		Err(e) => {
			tracing::warn!("Lookup request failed: {}", e);
			Err(e)
		},
	}
}

/// Handles GET /api/retryables/{address}/pending requests.
async fn handle_pending(
	Path(address): Path<String>,
	State(state): State<AppState>,
) -> Result<Json<Vec<ResolvedTicket>>, ApiError> {
	match retryables::get_pending(&address, &state.tracker).await {
		Ok(tickets) => Ok(Json(tickets)),
		Err(e) => {
			tracing::warn!("Pending request failed: {}", e);
			Err(e)
		},
	}
}

/// Handles GET /api/retryables/{address}/deposits requests.
async fn handle_deposits(
	Path(address): Path<String>,
	Query(params): Query<CountParams>,
	State(state): State<AppState>,
) -> Result<Json<Vec<ResolvedTicket>>, ApiError> {
	match retryables::get_latest(&address, LatestKind::Deposits, params, &state.tracker).await {
		Ok(tickets) => Ok(Json(tickets)),
		Err(e) => {
			tracing::warn!("Deposits request failed: {}", e);
			Err(e)
		},
	}
}

/// Handles GET /api/retryables/{address}/direct requests.
async fn handle_direct(
	Path(address): Path<String>,
	Query(params): Query<CountParams>,
	State(state): State<AppState>,
) -> Result<Json<Vec<ResolvedTicket>>, ApiError> {
	match retryables::get_latest(&address, LatestKind::Direct, params, &state.tracker).await {
		Ok(tickets) => Ok(Json(tickets)),
		Err(e) => {
			tracing::warn!("Direct request failed: {}", e);
			Err(e)
		},
	}
}
