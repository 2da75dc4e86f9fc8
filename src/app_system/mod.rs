//! System wiring, configuration, startup, and shutdown.

pub mod config;
pub mod matchmaking_system;
pub mod tracing;

pub use config::*;
pub use matchmaking_system::*;
pub use self::tracing::*;
