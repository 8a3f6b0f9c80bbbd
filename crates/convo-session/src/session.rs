use std::sync::Arc;

use anyhow::Result;
use convo_db::{Database, wall_clock_timestamp};
use convo_types::events::{ClientCommand, ServerEvent};
use convo_types::models::Message;

use crate::context::{JoinedChannel, SessionContext};

/// A persistent-mode session: commands mutate the context and the SQLite
/// store. Validation and not-found problems come back as inline
/// [`ServerEvent::Error`]s; storage faults come back as `Err` and end the
/// session.
pub struct Session {
    pub ctx: SessionContext,
    db: Arc<Database>,
}

impl Session {
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            ctx: SessionContext::new(),
            db,
        }
    }

    pub async fn handle(&mut self, cmd: ClientCommand) -> Result<Vec<ServerEvent>> {
        match cmd {
            ClientCommand::SetUsername { username } => {
                let trimmed = username.trim();
                if trimmed.is_empty() {
                    return Ok(vec![error_event("Please enter a valid username.")]);
                }
                self.ctx.username = Some(trimmed.to_string());
                Ok(vec![ServerEvent::UsernameSet {
                    username: trimmed.to_string(),
                }])
            }

            ClientCommand::CreateChannel => {
                let Some(username) = self.ctx.username.clone() else {
                    return Ok(vec![error_event("Please enter a valid username.")]);
                };

                let name = format!("Channel-{username}");
                let create_name = name.clone();
                let creator = username.clone();
                let channel_id = self
                    .with_db(move |db| {
                        let id = db.create_channel(&create_name)?;
                        db.add_active_user(&id, &creator)?;
                        Ok(id)
                    })
                    .await?;

                self.ctx.channel = Some(JoinedChannel {
                    id: channel_id.clone(),
                    name: name.clone(),
                });

                let mut events = vec![ServerEvent::ChannelJoined {
                    channel_id,
                    name,
                }];
                events.extend(self.refresh().await?);
                Ok(events)
            }

            ClientCommand::JoinChannel { channel_id } => {
                let Some(username) = self.ctx.username.clone() else {
                    return Ok(vec![error_event("Please enter a valid username.")]);
                };

                let cid = channel_id.clone();
                let resolved = self.with_db(move |db| db.channel_name(&cid)).await?;
                let Some(name) = resolved else {
                    return Ok(vec![error_event("Invalid Channel ID.")]);
                };

                let cid = channel_id.clone();
                self.with_db(move |db| db.add_active_user(&cid, &username))
                    .await?;

                self.ctx.channel = Some(JoinedChannel {
                    id: channel_id.clone(),
                    name: name.clone(),
                });

                let mut events = vec![ServerEvent::ChannelJoined { channel_id, name }];
                events.extend(self.refresh().await?);
                Ok(events)
            }

            ClientCommand::LeaveChannel => {
                let Some(channel) = self.ctx.channel.take() else {
                    return Ok(vec![]);
                };
                if let Some(username) = self.ctx.username.clone() {
                    // The one place presence is ever removed
                    self.with_db(move |db| db.remove_active_user(&channel.id, &username))
                        .await?;
                }
                Ok(vec![ServerEvent::ChannelLeft])
            }

            ClientCommand::SendMessage { text } => {
                let (Some(username), Some(channel)) =
                    (self.ctx.username.clone(), self.ctx.channel.clone())
                else {
                    return Ok(vec![error_event("Join a channel first.")]);
                };

                let trimmed = text.trim().to_string();
                if trimmed.is_empty() {
                    return Ok(vec![error_event("Message cannot be empty.")]);
                }

                let timestamp = wall_clock_timestamp();
                self.with_db(move |db| {
                    db.insert_message(&channel.id, &username, &trimmed, &timestamp)
                })
                .await?;

                // Force an immediate redraw instead of waiting for the poll
                Ok(self.refresh().await?.into_iter().collect())
            }
        }
    }

    /// Redraw snapshot of the current channel, or `None` when the session
    /// has not joined one yet.
    pub async fn refresh(&self) -> Result<Option<ServerEvent>> {
        let Some(channel) = self.ctx.channel.clone() else {
            return Ok(None);
        };

        let cid = channel.id.clone();
        let (rows, active_users) = self
            .with_db(move |db| {
                Ok((db.messages_for_channel(&cid)?, db.active_users(&cid)?))
            })
            .await?;

        let messages = rows
            .into_iter()
            .map(|row| Message {
                username: row.username,
                text: row.text,
                timestamp: row.timestamp,
            })
            .collect();

        Ok(Some(ServerEvent::Refresh {
            channel_name: channel.name,
            messages,
            active_users,
        }))
    }

    /// Run a blocking rusqlite call off the async runtime.
    async fn with_db<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Database) -> Result<T> + Send + 'static,
    {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || f(&db)).await?
    }
}

fn error_event(message: &str) -> ServerEvent {
    ServerEvent::Error {
        message: message.to_string(),
    }
}
