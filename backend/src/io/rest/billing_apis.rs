//! # REST API for Billing
//!
//! Read-only billing snapshot with the derived write-gate state.
//! Checkout and customer-portal URLs come from the hosted billing
//! functions, not from here.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tracing::info;

use super::mappers::RanchMapper;
use super::AppState;

/// The ranch's billing snapshot plus whether writes are blocked
pub async fn get_billing(
    State(state): State<AppState>,
    Path(ranch_id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/ranches/{}/billing", ranch_id);

    let billing = match state.billing_service.get_billing(&ranch_id) {
        Ok(billing) => billing,
        Err(e) => return e.into_response(),
    };
    let read_only = match state.billing_service.is_read_only(&ranch_id) {
        Ok(read_only) => read_only,
        Err(e) => return e.into_response(),
    };

    (
        StatusCode::OK,
        Json(RanchMapper::billing_to_dto(billing, read_only)),
    )
        .into_response()
}
