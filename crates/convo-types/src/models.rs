use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Channel {
    pub id: String,
    pub name: String,
}

/// A chat message as it is listed back to clients. Timestamps are
/// server-local wall-clock strings at second precision
/// (`YYYY-MM-DD HH:MM:SS`); history ordering compares them
/// lexicographically.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub username: String,
    pub text: String,
    pub timestamp: String,
}
