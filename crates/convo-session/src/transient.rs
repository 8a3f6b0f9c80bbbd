use convo_db::wall_clock_timestamp;
use convo_types::events::{ClientCommand, ServerEvent};
use convo_types::models::Message;

use crate::context::{JoinedChannel, SessionContext};

/// The intentionally simpler session mode: channels are plain names held
/// in the session, history lives in the context, and everything is lost
/// when the socket closes. Nothing in here touches SQLite and there is no
/// presence tracking.
pub struct TransientSession {
    pub ctx: SessionContext,
    channels: Vec<String>,
    history: Vec<Message>,
}

impl TransientSession {
    pub fn new() -> Self {
        Self {
            ctx: SessionContext::new(),
            channels: vec!["General".to_string()],
            history: Vec::new(),
        }
    }

    pub fn channels(&self) -> &[String] {
        &self.channels
    }

    pub fn handle(&mut self, cmd: ClientCommand) -> Vec<ServerEvent> {
        match cmd {
            ClientCommand::SetUsername { username } => {
                let trimmed = username.trim();
                if trimmed.is_empty() {
                    return vec![error_event("Please enter a valid username.")];
                }
                self.ctx.username = Some(trimmed.to_string());
                vec![ServerEvent::UsernameSet {
                    username: trimmed.to_string(),
                }]
            }

            ClientCommand::CreateChannel => {
                let Some(username) = self.ctx.username.clone() else {
                    return vec![error_event("Please enter a valid username.")];
                };
                self.enter(format!("Channel-{username}"))
            }

            // Transient sessions address channels by name; an unknown name
            // is added to the list rather than rejected.
            ClientCommand::JoinChannel { channel_id } => {
                let name = channel_id.trim().to_string();
                if name.is_empty() {
                    return vec![error_event("Invalid Channel ID.")];
                }
                self.enter(name)
            }

            ClientCommand::LeaveChannel => {
                if self.ctx.channel.take().is_none() {
                    return vec![];
                }
                vec![ServerEvent::ChannelLeft]
            }

            ClientCommand::SendMessage { text } => {
                let Some(username) = self.ctx.username.clone() else {
                    return vec![error_event("Please enter a valid username.")];
                };
                if self.ctx.channel.is_none() {
                    return vec![error_event("Join a channel first.")];
                }

                let trimmed = text.trim();
                if trimmed.is_empty() {
                    return vec![error_event("Message cannot be empty.")];
                }

                self.history.push(Message {
                    username,
                    text: trimmed.to_string(),
                    timestamp: wall_clock_timestamp(),
                });

                self.refresh().into_iter().collect()
            }
        }
    }

    /// Redraw snapshot. The history is one session-wide list, so every
    /// channel shows the same messages; active_users is always empty in
    /// this mode.
    pub fn refresh(&self) -> Option<ServerEvent> {
        let channel = self.ctx.channel.as_ref()?;
        Some(ServerEvent::Refresh {
            channel_name: channel.name.clone(),
            messages: self.history.clone(),
            active_users: Vec::new(),
        })
    }

    fn enter(&mut self, name: String) -> Vec<ServerEvent> {
        if !self.channels.contains(&name) {
            self.channels.push(name.clone());
        }
        self.ctx.channel = Some(JoinedChannel {
            id: name.clone(),
            name: name.clone(),
        });

        let mut events = vec![ServerEvent::ChannelJoined {
            channel_id: name.clone(),
            name,
        }];
        events.extend(self.refresh());
        events
    }
}

impl Default for TransientSession {
    fn default() -> Self {
        Self::new()
    }
}

fn error_event(message: &str) -> ServerEvent {
    ServerEvent::Error {
        message: message.to_string(),
    }
}
