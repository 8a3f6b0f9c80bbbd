use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Message;

/// Commands sent FROM client TO server over a chat session socket.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ClientCommand {
    /// Pick the display name for this session
    SetUsername { username: String },

    /// Create a fresh channel named after the session's username and enter it
    CreateChannel,

    /// Enter an existing channel by its id (transient sessions address
    /// channels by name instead)
    JoinChannel { channel_id: String },

    /// Leave the current channel
    LeaveChannel,

    /// Post a message to the current channel
    SendMessage { text: String },
}

/// Events sent FROM server TO client over a chat session socket.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ServerEvent {
    /// Session context established; sent once on connect
    Ready { session_id: Uuid },

    /// Username accepted
    UsernameSet { username: String },

    /// The session entered a channel
    ChannelJoined { channel_id: String, name: String },

    /// The session left its channel
    ChannelLeft,

    /// Full redraw snapshot of the current channel
    Refresh {
        channel_name: String,
        messages: Vec<Message>,
        active_users: Vec<String>,
    },

    /// Inline validation/not-found message; the session stays open and the
    /// client is expected to correct its input and resubmit
    Error { message: String },
}
