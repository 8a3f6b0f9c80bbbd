pub mod channels;
pub mod messages;
pub mod presence;
pub mod router;
pub mod state;
pub mod validation;

pub use router::router;
pub use state::{AppState, AppStateInner};
