use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::state::AppState;
use crate::{channels, messages, presence};

/// The core chat operations, one route per data-access call. No
/// authentication layer: every endpoint is public.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/channels", post(channels::create_channel))
        .route("/channels/{channel_id}", get(channels::get_channel))
        .route(
            "/channels/{channel_id}/messages",
            get(messages::list_messages).post(messages::send_message),
        )
        .route(
            "/channels/{channel_id}/members",
            get(presence::list_members).post(presence::join_channel),
        )
        .route(
            "/channels/{channel_id}/members/{username}",
            delete(presence::leave_channel),
        )
        .with_state(state)
}
