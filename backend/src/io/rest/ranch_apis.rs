//! # REST API for Ranch Management
//!
//! Endpoints for ranch lifecycle, pastures, and preset lists.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use tracing::info;

use super::mappers::RanchMapper;
use super::AppState;
use crate::domain::commands::ranches::{AddPastureCommand, CreateRanchCommand, DeleteRanchCommand};
use shared::{AddPastureRequest, CreateRanchRequest, DeleteResponse, PresetListResponse};

/// Query parameters for listing ranches.
#[derive(Deserialize, Debug)]
pub struct RanchListQuery {
    pub user_id: String,
}

/// Query parameters for owner-gated ranch deletion.
#[derive(Deserialize, Debug)]
pub struct DeleteRanchQuery {
    pub acting_user_id: String,
}

/// Create a ranch; the creator becomes its sole manager
pub async fn create_ranch(
    State(state): State<AppState>,
    Json(request): Json<CreateRanchRequest>,
) -> impl IntoResponse {
    info!("POST /api/ranches - name: {}", request.name);

    match state.ranch_service.create_ranch(CreateRanchCommand {
        name: request.name,
        owner_user_id: request.owner_user_id,
        owner_email: request.owner_email,
    }) {
        Ok(result) => (StatusCode::CREATED, Json(RanchMapper::to_dto(result.ranch))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Ranches the user is an accepted member of
pub async fn list_ranches(
    State(state): State<AppState>,
    Query(query): Query<RanchListQuery>,
) -> impl IntoResponse {
    info!("GET /api/ranches - user: {}", query.user_id);

    match state.ranch_service.list_ranches_for_user(&query.user_id) {
        Ok(ranches) => {
            (StatusCode::OK, Json(RanchMapper::to_ranch_list_dto(ranches))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Delete a ranch and everything beneath it; owner only
pub async fn delete_ranch(
    State(state): State<AppState>,
    Path(ranch_id): Path<String>,
    Query(query): Query<DeleteRanchQuery>,
) -> impl IntoResponse {
    info!("DELETE /api/ranches/{}", ranch_id);

    match state.ranch_service.delete_ranch(DeleteRanchCommand {
        ranch_id,
        acting_user_id: query.acting_user_id,
    }) {
        Ok(result) => (
            StatusCode::OK,
            Json(DeleteResponse {
                success_message: result.success_message,
            }),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Add a pasture
pub async fn add_pasture(
    State(state): State<AppState>,
    Path(ranch_id): Path<String>,
    Json(request): Json<AddPastureRequest>,
) -> impl IntoResponse {
    info!("POST /api/ranches/{}/pastures", ranch_id);

    match state.ranch_service.add_pasture(AddPastureCommand {
        ranch_id,
        name: request.name,
    }) {
        Ok(result) => (
            StatusCode::CREATED,
            Json(RanchMapper::pasture_to_dto(result.pasture)),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// List pastures
pub async fn list_pastures(
    State(state): State<AppState>,
    Path(ranch_id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/ranches/{}/pastures", ranch_id);

    match state.ranch_service.list_pastures(&ranch_id) {
        Ok(pastures) => {
            (StatusCode::OK, Json(RanchMapper::to_pasture_list_dto(pastures))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Delete a pasture; cows referencing it read as unassigned
pub async fn delete_pasture(
    State(state): State<AppState>,
    Path((ranch_id, pasture_id)): Path<(String, String)>,
) -> impl IntoResponse {
    info!("DELETE /api/ranches/{}/pastures/{}", ranch_id, pasture_id);

    match state.ranch_service.delete_pasture(&ranch_id, &pasture_id) {
        Ok(()) => (
            StatusCode::OK,
            Json(DeleteResponse {
                success_message: "Pasture deleted successfully".to_string(),
            }),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Ranch-scoped breed suggestions
pub async fn list_breeds(
    State(state): State<AppState>,
    Path(ranch_id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/ranches/{}/breeds", ranch_id);

    match state.ranch_service.list_breeds(&ranch_id) {
        Ok(labels) => (StatusCode::OK, Json(PresetListResponse { labels })).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Ranch-scoped medical label suggestions
pub async fn list_medical_presets(
    State(state): State<AppState>,
    Path(ranch_id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/ranches/{}/medical-presets", ranch_id);

    match state.ranch_service.list_medical_presets(&ranch_id) {
        Ok(labels) => (StatusCode::OK, Json(PresetListResponse { labels })).into_response(),
        Err(e) => e.into_response(),
    }
}
