//! # REST API for Herd Management
//!
//! Endpoints for cows, notes, medical issues, search, and lineage.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use tracing::info;

use super::mappers::CowMapper;
use super::AppState;
use crate::domain::commands::herd::{AddMedicalIssueCommand, AddNoteCommand, SearchCommand};
use crate::domain::search::SortKey;
use shared::{AddMedicalIssueRequest, AddNoteRequest, CreateCowRequest, DeleteResponse, UpdateCowRequest};

/// Query parameters for herd search.
#[derive(Deserialize, Debug)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub sort: Option<String>,
}

/// Create a new cow
pub async fn create_cow(
    State(state): State<AppState>,
    Path(ranch_id): Path<String>,
    Json(request): Json<CreateCowRequest>,
) -> impl IntoResponse {
    info!("POST /api/ranches/{}/cows", ranch_id);

    match state
        .herd_service
        .create_cow(CowMapper::to_create_command(ranch_id, request))
    {
        Ok(result) => (StatusCode::CREATED, Json(CowMapper::to_dto(result.cow))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Get a cow with its tags, notes, and medical issues
pub async fn get_cow(
    State(state): State<AppState>,
    Path((ranch_id, cow_id)): Path<(String, String)>,
) -> impl IntoResponse {
    info!("GET /api/ranches/{}/cows/{}", ranch_id, cow_id);

    match state.herd_service.get_cow(&ranch_id, &cow_id) {
        Ok(cow) => (StatusCode::OK, Json(CowMapper::to_dto(cow))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// List the herd, creation-descending
pub async fn list_cows(
    State(state): State<AppState>,
    Path(ranch_id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/ranches/{}/cows", ranch_id);

    match state.herd_service.list_cows(&ranch_id) {
        Ok(cows) => (StatusCode::OK, Json(CowMapper::to_cow_list_dto(cows))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Update a cow; a present `tags` array replaces the whole tag set
pub async fn update_cow(
    State(state): State<AppState>,
    Path((ranch_id, cow_id)): Path<(String, String)>,
    Json(request): Json<UpdateCowRequest>,
) -> impl IntoResponse {
    info!("PUT /api/ranches/{}/cows/{}", ranch_id, cow_id);

    match state
        .herd_service
        .update_cow(CowMapper::to_update_command(ranch_id, cow_id, request))
    {
        Ok(result) => (StatusCode::OK, Json(CowMapper::to_dto(result.cow))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Delete a cow and its dependent rows
pub async fn delete_cow(
    State(state): State<AppState>,
    Path((ranch_id, cow_id)): Path<(String, String)>,
) -> impl IntoResponse {
    info!("DELETE /api/ranches/{}/cows/{}", ranch_id, cow_id);

    match state.herd_service.delete_cow(&ranch_id, &cow_id) {
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

/// Append a note to a cow
pub async fn add_note(
    State(state): State<AppState>,
    Path((ranch_id, cow_id)): Path<(String, String)>,
    Json(request): Json<AddNoteRequest>,
) -> impl IntoResponse {
    info!("POST /api/ranches/{}/cows/{}/notes", ranch_id, cow_id);

    match state.herd_service.add_note(AddNoteCommand {
        ranch_id,
        cow_id,
        text: request.text,
    }) {
        Ok(note) => (StatusCode::CREATED, Json(CowMapper::note_to_dto(note))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Record a medical issue on a cow
pub async fn add_medical_issue(
    State(state): State<AppState>,
    Path((ranch_id, cow_id)): Path<(String, String)>,
    Json(request): Json<AddMedicalIssueRequest>,
) -> impl IntoResponse {
    info!("POST /api/ranches/{}/cows/{}/medical", ranch_id, cow_id);

    match state.herd_service.add_medical_issue(AddMedicalIssueCommand {
        ranch_id,
        cow_id,
        label: request.label,
    }) {
        Ok(issue) => (StatusCode::CREATED, Json(CowMapper::medical_to_dto(issue))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Search the herd: free text, medical labels, or a MM/YYYY-MM/YYYY
/// birth range
pub async fn search(
    State(state): State<AppState>,
    Path(ranch_id): Path<String>,
    Query(query): Query<SearchQuery>,
) -> impl IntoResponse {
    info!("GET /api/ranches/{}/search - query: {:?}", ranch_id, query);

    let command = SearchCommand {
        ranch_id,
        query: query.q.unwrap_or_default(),
        sort: query.sort.as_deref().and_then(SortKey::parse),
    };

    match state.herd_service.search(command) {
        Ok(result) => {
            (StatusCode::OK, Json(CowMapper::to_cow_list_dto(result.cows))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Resolve a tag number to the cow holding it
pub async fn resolve_by_tag(
    State(state): State<AppState>,
    Path((ranch_id, number)): Path<(String, String)>,
) -> impl IntoResponse {
    info!("GET /api/ranches/{}/tags/{}", ranch_id, number);

    match state.herd_service.resolve_by_tag(&ranch_id, &number) {
        Ok(Some(cow)) => (StatusCode::OK, Json(CowMapper::to_dto(cow))).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(shared::ErrorResponse {
                message: format!("no cow holds tag '{}'", number),
                number: None,
                cow_id: None,
            }),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Cows whose mother tag points at one of this cow's numbers
pub async fn list_calves(
    State(state): State<AppState>,
    Path((ranch_id, cow_id)): Path<(String, String)>,
) -> impl IntoResponse {
    info!("GET /api/ranches/{}/cows/{}/calves", ranch_id, cow_id);

    match state.herd_service.resolve_calves(&ranch_id, &cow_id) {
        Ok(calves) => (StatusCode::OK, Json(CowMapper::to_cow_list_dto(calves))).into_response(),
        Err(e) => e.into_response(),
    }
}
