//! # REST surface
//!
//! axum handlers over the domain services, one module per entity, plus
//! the DTO mappers. Handlers stay thin: map the request, call the
//! service, map the result; error interpretation lives in the
//! `IntoResponse` impl on `DomainError`.

pub mod billing_apis;
pub mod export_apis;
pub mod herd_apis;
pub mod mappers;
pub mod ranch_apis;
pub mod team_apis;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use tracing::error;

use crate::domain::{
    BillingService, DomainError, ExportService, HerdService, RanchService, TeamService,
};
use crate::storage::csv::CsvConnection;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub herd_service: HerdService<CsvConnection>,
    pub team_service: TeamService,
    pub ranch_service: RanchService,
    pub billing_service: BillingService,
    pub export_service: ExportService,
}

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route(
            "/ranches",
            post(ranch_apis::create_ranch).get(ranch_apis::list_ranches),
        )
        .route("/ranches/:ranch_id", delete(ranch_apis::delete_ranch))
        .route(
            "/ranches/:ranch_id/cows",
            get(herd_apis::list_cows).post(herd_apis::create_cow),
        )
        .route(
            "/ranches/:ranch_id/cows/:cow_id",
            get(herd_apis::get_cow)
                .put(herd_apis::update_cow)
                .delete(herd_apis::delete_cow),
        )
        .route("/ranches/:ranch_id/cows/:cow_id/notes", post(herd_apis::add_note))
        .route(
            "/ranches/:ranch_id/cows/:cow_id/medical",
            post(herd_apis::add_medical_issue),
        )
        .route(
            "/ranches/:ranch_id/cows/:cow_id/calves",
            get(herd_apis::list_calves),
        )
        .route("/ranches/:ranch_id/search", get(herd_apis::search))
        .route("/ranches/:ranch_id/tags/:number", get(herd_apis::resolve_by_tag))
        .route(
            "/ranches/:ranch_id/members",
            get(team_apis::list_members).post(team_apis::invite_member),
        )
        .route("/ranches/:ranch_id/members/accept", post(team_apis::accept_invite))
        .route(
            "/ranches/:ranch_id/members/:member_id",
            delete(team_apis::remove_member),
        )
        .route(
            "/ranches/:ranch_id/members/:member_id/role",
            put(team_apis::change_role),
        )
        .route(
            "/ranches/:ranch_id/members/:member_id/transfer",
            post(team_apis::transfer_ownership),
        )
        .route(
            "/ranches/:ranch_id/pastures",
            get(ranch_apis::list_pastures).post(ranch_apis::add_pasture),
        )
        .route(
            "/ranches/:ranch_id/pastures/:pasture_id",
            delete(ranch_apis::delete_pasture),
        )
        .route("/ranches/:ranch_id/breeds", get(ranch_apis::list_breeds))
        .route(
            "/ranches/:ranch_id/medical-presets",
            get(ranch_apis::list_medical_presets),
        )
        .route("/ranches/:ranch_id/billing", get(billing_apis::get_billing))
        .route("/ranches/:ranch_id/export", get(export_apis::export_herd));

    Router::new().nest("/api", api_routes).with_state(state)
}

impl IntoResponse for DomainError {
    fn into_response(self) -> Response {
        let status = match &self {
            DomainError::Validation(_) => StatusCode::BAD_REQUEST,
            DomainError::DuplicateTag { .. } => StatusCode::CONFLICT,
            DomainError::LastManager | DomainError::Authorization(_) => StatusCode::FORBIDDEN,
            DomainError::NotFound(_) => StatusCode::NOT_FOUND,
            DomainError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if let DomainError::Store(inner) = &self {
            error!("Store failure surfaced to the API: {:#}", inner);
        }

        let body = match &self {
            DomainError::DuplicateTag { number, cow_id } => shared::ErrorResponse {
                message: self.to_string(),
                number: Some(number.clone()),
                cow_id: Some(cow_id.clone()),
            },
            _ => shared::ErrorResponse {
                message: self.to_string(),
                number: None,
                cow_id: None,
            },
        };

        (status, Json(body)).into_response()
    }
}
