pub mod connection;
pub mod context;
pub mod session;
pub mod transient;
