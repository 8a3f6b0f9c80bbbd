use serde::{Deserialize, Serialize};

// -- Channels --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateChannelRequest {
    pub name: String,
}

// -- Messages --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SendMessageRequest {
    pub username: String,
    pub text: String,
}

// -- Presence --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JoinChannelRequest {
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct MembersResponse {
    pub usernames: Vec<String>,
}
