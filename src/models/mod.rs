//! Data models for sitesync.
//!
//! - [`SettingsModel`]: the full structured configuration tree (theme,
//!   typography, navigation, feature toggles, post/home display, plugin
//!   wiring) owned by the settings/wizard subsystem
//! - [`FieldValue`] / [`ValueKind`]: one field's runtime value and the
//!   literal form it renders to in the config document
//! - [`DocumentText`]: immutable snapshot of the external config document
//!
//! # Architecture Note
//!
//! The models are designed to be:
//! - **Serializable**: the settings tree derives `Serialize`/`Deserialize`
//!   for YAML persistence
//! - **Read-only during a sync**: the patch pipeline receives an explicit
//!   snapshot plus field/value pairs; nothing here is mutated by this crate

pub mod document;
pub mod settings;

pub use document::DocumentText;
pub use settings::{
    Appearance, FieldValue, FontSource, LatexRenderer, NavEntry, SettingsModel, ValueKind,
};
