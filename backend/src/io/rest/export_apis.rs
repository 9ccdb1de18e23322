//! # REST API for Herd Export
//!
//! Returns the assembled CSV content and filename; delivery (mail
//! composer, share sheet, browser download) is the client's concern.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tracing::info;

use super::AppState;
use crate::domain::commands::export::ExportHerdCommand;
use shared::ExportHerdResponse;

/// Export the herd as a one-worksheet CSV
pub async fn export_herd(
    State(state): State<AppState>,
    Path(ranch_id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/ranches/{}/export", ranch_id);

    match state.export_service.export_herd_csv(
        ExportHerdCommand { ranch_id },
        &state.herd_service,
        &state.ranch_service,
    ) {
        Ok(result) => (
            StatusCode::OK,
            Json(ExportHerdResponse {
                csv_content: result.csv_content,
                filename: result.filename,
                cow_count: result.cow_count,
                ranch_name: result.ranch_name,
            }),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}
