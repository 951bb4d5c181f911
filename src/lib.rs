// sitesync - keeps an in-memory settings model and a hand-editable
// static-site generator config document in sync via anchored patches.
//
// This is the library crate containing the core business logic and data
// structures. The binary crate (main.rs) provides the CLI entry point.

pub mod config;
pub mod logging;
pub mod models;
pub mod services;

// Re-export commonly used types for convenience
pub use config::SettingsManager;
pub use models::{DocumentText, FieldValue, NavEntry, SettingsModel, ValueKind};
pub use services::{
    FsDocumentStore, PresetLibrary, SyncError, SyncOrchestrator, SyncReport, SyncRequest,
};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
