use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::error;

use convo_types::api::CreateChannelRequest;
use convo_types::models::Channel;

use crate::state::AppState;
use crate::validation;

pub async fn create_channel(
    State(state): State<AppState>,
    Json(req): Json<CreateChannelRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let name = validation::non_blank(&req.name)
        .ok_or(StatusCode::BAD_REQUEST)?
        .to_string();

    // Run blocking DB insert off the async runtime
    let db = state.db.clone();
    let insert_name = name.clone();
    let id = tokio::task::spawn_blocking(move || db.create_channel(&insert_name))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .map_err(|e| {
            error!("create_channel failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    Ok((StatusCode::CREATED, Json(Channel { id, name })))
}

/// An unknown id is an explicit not-found, surfaced as 404 rather than a
/// storage fault.
pub async fn get_channel(
    State(state): State<AppState>,
    Path(channel_id): Path<String>,
) -> Result<impl IntoResponse, StatusCode> {
    let db = state.db.clone();
    let cid = channel_id.clone();
    let row = tokio::task::spawn_blocking(move || db.channel(&cid))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .map_err(|e| {
            error!("channel lookup failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(Channel {
        id: row.id,
        name: row.name,
    }))
}
