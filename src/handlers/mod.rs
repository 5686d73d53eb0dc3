//! Bot handlers
//!
//! - Registration wizard scene
//! - Fallback handler for updates outside any scene

pub mod commands;
pub mod registration;

pub use commands::{handle_without_scene, HELP_TEXT};
pub use registration::{registration_wizard, Registration, REGISTRATION_SCENE};
