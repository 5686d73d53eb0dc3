//! Telescene
//!
//! Scene-based conversation flows for Telegram bots. A [`Scenario`] routes
//! each update to the active scene of the sender, keeps per-user sessions in
//! a pluggable store and persists them only when a scene changed something.

pub mod config;
pub mod handlers;
pub mod state;
pub mod storage;
pub mod transport;
pub mod utils;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use config::Settings;
pub use state::{Context, Dispatch, ErasedSession, Scenario, Scene, SceneContext, Session, Wizard};
pub use storage::Store;
pub use transport::{InboundUpdate, TelegramUpdate};
pub use utils::errors::{ScenarioError, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
