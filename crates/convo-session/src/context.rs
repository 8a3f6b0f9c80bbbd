use uuid::Uuid;

/// Per-connection session state: created when a socket is accepted,
/// dropped when it closes. Every handler receives this explicitly; there
/// is no ambient per-tab state anywhere else.
#[derive(Debug)]
pub struct SessionContext {
    pub id: Uuid,
    pub username: Option<String>,
    pub channel: Option<JoinedChannel>,
}

#[derive(Debug, Clone)]
pub struct JoinedChannel {
    pub id: String,
    pub name: String,
}

impl SessionContext {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            username: None,
            channel: None,
        }
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}
