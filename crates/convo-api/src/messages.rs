use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::error;

use convo_db::wall_clock_timestamp;
use convo_types::api::SendMessageRequest;
use convo_types::models::Message;

use crate::state::AppState;
use crate::validation;

pub async fn send_message(
    State(state): State<AppState>,
    Path(channel_id): Path<String>,
    Json(req): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    // Blank input never reaches the store
    let username = validation::non_blank(&req.username)
        .ok_or(StatusCode::BAD_REQUEST)?
        .to_string();
    let text = validation::non_blank(&req.text)
        .ok_or(StatusCode::BAD_REQUEST)?
        .to_string();

    let timestamp = wall_clock_timestamp();

    let db = state.db.clone();
    let stored = Message {
        username,
        text,
        timestamp,
    };
    let row = stored.clone();
    tokio::task::spawn_blocking(move || {
        db.insert_message(&channel_id, &row.username, &row.text, &row.timestamp)
    })
    .await
    .map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?
    .map_err(|e| {
        error!("insert_message failed: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok((StatusCode::CREATED, Json(stored)))
}

/// Full ascending history. There is deliberately no limit and no cursor:
/// the result is unbounded, matching the store's no-pagination contract.
pub async fn list_messages(
    State(state): State<AppState>,
    Path(channel_id): Path<String>,
) -> Result<impl IntoResponse, StatusCode> {
    let db = state.db.clone();
    let rows = tokio::task::spawn_blocking(move || db.messages_for_channel(&channel_id))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .map_err(|e| {
            error!("message listing failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    let messages: Vec<Message> = rows
        .into_iter()
        .map(|row| Message {
            username: row.username,
            text: row.text,
            timestamp: row.timestamp,
        })
        .collect();

    Ok(Json(messages))
}
