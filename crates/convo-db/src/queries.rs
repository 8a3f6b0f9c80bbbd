use anyhow::Result;
use rand::Rng;
use rusqlite::{Connection, OptionalExtension};

use crate::Database;
use crate::models::{ChannelRow, MessageRow};

const CHANNEL_ID_LEN: usize = 8;
const CHANNEL_ID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Fixed-length channel id drawn uniformly from uppercase letters and
/// digits. Uniqueness rides on the channels PRIMARY KEY; there is no
/// collision retry, so a collision surfaces as a storage fault.
fn generate_channel_id() -> String {
    let mut rng = rand::rng();
    (0..CHANNEL_ID_LEN)
        .map(|_| CHANNEL_ID_ALPHABET[rng.random_range(0..CHANNEL_ID_ALPHABET.len())] as char)
        .collect()
}

impl Database {
    // -- Channels --

    pub fn create_channel(&self, name: &str) -> Result<String> {
        let channel_id = generate_channel_id();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO channels (id, name) VALUES (?1, ?2)",
                (&channel_id, name),
            )?;
            Ok(())
        })?;
        Ok(channel_id)
    }

    /// Resolve a channel id to its display name. Absent is `None`, never an
    /// error.
    pub fn channel_name(&self, channel_id: &str) -> Result<Option<String>> {
        self.with_conn(|conn| {
            let name = conn
                .query_row(
                    "SELECT name FROM channels WHERE id = ?1",
                    [channel_id],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(name)
        })
    }

    pub fn channel(&self, channel_id: &str) -> Result<Option<ChannelRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, name FROM channels WHERE id = ?1",
                    [channel_id],
                    |row| {
                        Ok(ChannelRow {
                            id: row.get(0)?,
                            name: row.get(1)?,
                        })
                    },
                )
                .optional()?;
            Ok(row)
        })
    }

    // -- Messages --

    /// Append one message. The caller supplies the timestamp and is
    /// responsible for rejecting blank input; the store itself places no
    /// constraint on text, size, or the referenced channel.
    pub fn insert_message(
        &self,
        channel_id: &str,
        username: &str,
        text: &str,
        timestamp: &str,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO messages (channel_id, username, message, timestamp)
                 VALUES (?1, ?2, ?3, ?4)",
                (channel_id, username, text, timestamp),
            )?;
            Ok(())
        })
    }

    /// Full history for a channel in ascending timestamp order, unbounded.
    /// Same-second ties come back in whatever order SQLite yields them.
    pub fn messages_for_channel(&self, channel_id: &str) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| query_messages(conn, channel_id))
    }

    // -- Presence --

    /// Idempotent add: a duplicate (channel, username) pair is a no-op.
    pub fn add_active_user(&self, channel_id: &str, username: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT OR IGNORE INTO active_users (channel_id, username) VALUES (?1, ?2)",
                (channel_id, username),
            )?;
            Ok(())
        })
    }

    /// Idempotent remove: deleting an absent member is a no-op.
    pub fn remove_active_user(&self, channel_id: &str, username: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "DELETE FROM active_users WHERE channel_id = ?1 AND username = ?2",
                (channel_id, username),
            )?;
            Ok(())
        })
    }

    pub fn active_users(&self, channel_id: &str) -> Result<Vec<String>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT username FROM active_users WHERE channel_id = ?1")?;
            let rows = stmt
                .query_map([channel_id], |row| row.get(0))?
                .collect::<std::result::Result<Vec<String>, _>>()?;
            Ok(rows)
        })
    }
}

fn query_messages(conn: &Connection, channel_id: &str) -> Result<Vec<MessageRow>> {
    let mut stmt = conn.prepare(
        "SELECT username, message, timestamp FROM messages
         WHERE channel_id = ?1
         ORDER BY timestamp ASC",
    )?;

    let rows = stmt
        .query_map([channel_id], |row| {
            Ok(MessageRow {
                username: row.get(0)?,
                text: row.get(1)?,
                timestamp: row.get(2)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use crate::Database;

    fn open_test_db(temp: &TempDir) -> Database {
        Database::open(&temp.path().join("test.db")).unwrap()
    }

    #[test]
    fn schema_creates_tables() {
        let temp = TempDir::new().unwrap();
        let db = open_test_db(&temp);

        let tables: Vec<String> = db
            .with_conn(|conn| {
                let rows = conn
                    .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")?
                    .query_map([], |row| row.get(0))?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .unwrap();

        assert!(tables.contains(&"channels".to_string()));
        assert!(tables.contains(&"messages".to_string()));
        assert!(tables.contains(&"active_users".to_string()));
    }

    #[test]
    fn create_resolve_roundtrip() {
        let temp = TempDir::new().unwrap();
        let db = open_test_db(&temp);

        let id = db.create_channel("Team A").unwrap();
        assert_eq!(id.len(), 8);
        assert!(id.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));

        assert_eq!(db.channel_name(&id).unwrap(), Some("Team A".to_string()));
    }

    #[test]
    fn resolve_unknown_channel_is_none_not_error() {
        let temp = TempDir::new().unwrap();
        let db = open_test_db(&temp);

        assert_eq!(db.channel_name("NONEXISTENT").unwrap(), None);
    }

    #[test]
    fn messages_list_in_timestamp_order() {
        let temp = TempDir::new().unwrap();
        let db = open_test_db(&temp);

        let id = db.create_channel("history").unwrap();
        db.insert_message(&id, "bob", "second", "2024-01-01 10:00:01")
            .unwrap();
        db.insert_message(&id, "alice", "first", "2024-01-01 10:00:00")
            .unwrap();
        db.insert_message(&id, "carol", "third", "2024-01-01 10:00:02")
            .unwrap();

        let messages = db.messages_for_channel(&id).unwrap();
        let texts: Vec<&str> = messages.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
    }

    #[test]
    fn store_accepts_message_for_unknown_channel() {
        // The REFERENCES clause is declared but unenforced; the store
        // performs no referential check at write time.
        let temp = TempDir::new().unwrap();
        let db = open_test_db(&temp);

        db.insert_message("GHOSTCH1", "alice", "hello?", "2024-01-01 10:00:00")
            .unwrap();
        assert_eq!(db.messages_for_channel("GHOSTCH1").unwrap().len(), 1);
    }

    #[test]
    fn join_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let db = open_test_db(&temp);

        let id = db.create_channel("presence").unwrap();
        db.add_active_user(&id, "alice").unwrap();
        db.add_active_user(&id, "alice").unwrap();

        assert_eq!(db.active_users(&id).unwrap(), vec!["alice".to_string()]);
    }

    #[test]
    fn leave_of_absent_member_is_noop() {
        let temp = TempDir::new().unwrap();
        let db = open_test_db(&temp);

        let id = db.create_channel("presence").unwrap();
        db.add_active_user(&id, "alice").unwrap();
        db.remove_active_user(&id, "bob").unwrap();

        assert_eq!(db.active_users(&id).unwrap(), vec!["alice".to_string()]);
    }

    #[test]
    fn two_joiners_see_each_other() {
        let temp = TempDir::new().unwrap();
        let db = open_test_db(&temp);

        let id = db.create_channel("shared").unwrap();
        db.add_active_user(&id, "alice").unwrap();
        db.add_active_user(&id, "bob").unwrap();

        let users = db.active_users(&id).unwrap();
        assert_eq!(users.len(), 2);
        assert!(users.contains(&"alice".to_string()));
        assert!(users.contains(&"bob".to_string()));
    }

    #[test]
    fn create_join_append_scenario() {
        let temp = TempDir::new().unwrap();
        let db = open_test_db(&temp);

        let id = db.create_channel("Channel-alice").unwrap();
        db.add_active_user(&id, "alice").unwrap();
        db.insert_message(&id, "alice", "hi", "2024-01-01 10:00:00")
            .unwrap();

        let messages = db.messages_for_channel(&id).unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].username, "alice");
        assert_eq!(messages[0].text, "hi");
        assert!(!messages[0].timestamp.is_empty());

        assert_eq!(db.active_users(&id).unwrap(), vec!["alice".to_string()]);
    }
}
