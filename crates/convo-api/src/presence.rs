use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::error;

use convo_types::api::{JoinChannelRequest, MembersResponse};

use crate::state::AppState;
use crate::validation;

/// Idempotent join: repeating the same (channel, username) pair is a no-op.
pub async fn join_channel(
    State(state): State<AppState>,
    Path(channel_id): Path<String>,
    Json(req): Json<JoinChannelRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let username = validation::non_blank(&req.username)
        .ok_or(StatusCode::BAD_REQUEST)?
        .to_string();

    let db = state.db.clone();
    tokio::task::spawn_blocking(move || db.add_active_user(&channel_id, &username))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .map_err(|e| {
            error!("presence add failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    Ok(StatusCode::NO_CONTENT)
}

/// Idempotent leave: removing an absent member is a no-op, not an error.
pub async fn leave_channel(
    State(state): State<AppState>,
    Path((channel_id, username)): Path<(String, String)>,
) -> Result<impl IntoResponse, StatusCode> {
    let db = state.db.clone();
    tokio::task::spawn_blocking(move || db.remove_active_user(&channel_id, &username))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .map_err(|e| {
            error!("presence remove failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_members(
    State(state): State<AppState>,
    Path(channel_id): Path<String>,
) -> Result<impl IntoResponse, StatusCode> {
    let db = state.db.clone();
    let usernames = tokio::task::spawn_blocking(move || db.active_users(&channel_id))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .map_err(|e| {
            error!("presence listing failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    Ok(Json(MembersResponse { usernames }))
}
