//! # REST API for Team Management
//!
//! Endpoints for invites, acceptance, role changes, removal, and
//! ownership transfer.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tracing::info;

use super::mappers::MemberMapper;
use super::AppState;
use crate::domain::commands::team::{
    AcceptInviteCommand, ChangeRoleCommand, InviteMemberCommand, RemoveMemberCommand,
    TransferOwnershipCommand,
};
use shared::{
    AcceptInviteRequest, ChangeRoleRequest, DeleteResponse, InviteMemberRequest,
    RemoveMemberRequest, TransferOwnershipRequest, TransferOwnershipResponse,
};

/// List the ranch's members
pub async fn list_members(
    State(state): State<AppState>,
    Path(ranch_id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/ranches/{}/members", ranch_id);

    match state.team_service.list_members(&ranch_id) {
        Ok(members) => {
            (StatusCode::OK, Json(MemberMapper::to_member_list_dto(members))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Invite a member by email, pending until accepted
pub async fn invite_member(
    State(state): State<AppState>,
    Path(ranch_id): Path<String>,
    Json(request): Json<InviteMemberRequest>,
) -> impl IntoResponse {
    info!("POST /api/ranches/{}/members - email: {}", ranch_id, request.email);

    match state.team_service.invite_member(InviteMemberCommand {
        ranch_id,
        acting_user_id: request.acting_user_id,
        email: request.email,
        role: MemberMapper::role_to_domain(request.role),
    }) {
        Ok(result) => {
            (StatusCode::CREATED, Json(MemberMapper::to_dto(result.member))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Bind a signed-in user to their pending invite
pub async fn accept_invite(
    State(state): State<AppState>,
    Path(ranch_id): Path<String>,
    Json(request): Json<AcceptInviteRequest>,
) -> impl IntoResponse {
    info!("POST /api/ranches/{}/members/accept", ranch_id);

    match state.team_service.accept_invite(AcceptInviteCommand {
        ranch_id,
        email: request.email,
        user_id: request.user_id,
    }) {
        Ok(result) => (StatusCode::OK, Json(MemberMapper::to_dto(result.member))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Change a member's role; demoting the last manager is rejected
pub async fn change_role(
    State(state): State<AppState>,
    Path((ranch_id, member_id)): Path<(String, String)>,
    Json(request): Json<ChangeRoleRequest>,
) -> impl IntoResponse {
    info!("PUT /api/ranches/{}/members/{}/role", ranch_id, member_id);

    match state.team_service.change_role(ChangeRoleCommand {
        ranch_id,
        acting_user_id: request.acting_user_id,
        member_id,
        new_role: MemberMapper::role_to_domain(request.role),
    }) {
        Ok(result) => (StatusCode::OK, Json(MemberMapper::to_dto(result.member))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Remove a member; removing the last manager is rejected
pub async fn remove_member(
    State(state): State<AppState>,
    Path((ranch_id, member_id)): Path<(String, String)>,
    Json(request): Json<RemoveMemberRequest>,
) -> impl IntoResponse {
    info!("DELETE /api/ranches/{}/members/{}", ranch_id, member_id);

    match state.team_service.remove_member(RemoveMemberCommand {
        ranch_id,
        acting_user_id: request.acting_user_id,
        member_id,
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

/// Transfer ranch ownership to another accepted member
pub async fn transfer_ownership(
    State(state): State<AppState>,
    Path((ranch_id, member_id)): Path<(String, String)>,
    Json(request): Json<TransferOwnershipRequest>,
) -> impl IntoResponse {
    info!("POST /api/ranches/{}/members/{}/transfer", ranch_id, member_id);

    match state.team_service.transfer_ownership(TransferOwnershipCommand {
        ranch_id,
        acting_user_id: request.acting_user_id,
        member_id,
    }) {
        Ok(result) => (
            StatusCode::OK,
            Json(TransferOwnershipResponse {
                new_owner: MemberMapper::to_dto(result.new_owner),
                previous_owner: result.previous_owner.map(MemberMapper::to_dto),
            }),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}
