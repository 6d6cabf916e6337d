//! # miles-session — Connection lifecycle and session orchestration.
//!
//! - [`connection::ConnectionController`] — wallet connect state machine
//! - [`session::SessionState`] — owns ledger, aggregates, and eligibility
//! - [`config::AppConfig`] — application settings and product catalog

pub mod config;
pub mod connection;
pub mod session;

pub use config::AppConfig;
pub use connection::ConnectionController;
pub use session::{SessionSnapshot, SessionState};
