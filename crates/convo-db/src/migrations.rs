use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

/// Idempotent schema setup, run once when the database is opened.
pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS channels (
            id      TEXT PRIMARY KEY,
            name    TEXT
        );

        CREATE TABLE IF NOT EXISTS messages (
            channel_id  TEXT,
            username    TEXT,
            message     TEXT,
            timestamp   TEXT,
            FOREIGN KEY(channel_id) REFERENCES channels(id)
        );

        CREATE TABLE IF NOT EXISTS active_users (
            channel_id  TEXT,
            username    TEXT,
            PRIMARY KEY (channel_id, username),
            FOREIGN KEY(channel_id) REFERENCES channels(id)
        );
        ",
    )?;

    info!("Database schema ready");
    Ok(())
}
