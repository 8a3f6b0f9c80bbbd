/// Database row types — these map directly to SQLite rows.
/// Distinct from the convo-types API models to keep the DB layer
/// independent.

pub struct ChannelRow {
    pub id: String,
    pub name: String,
}

pub struct MessageRow {
    pub username: String,
    pub text: String,
    pub timestamp: String,
}
