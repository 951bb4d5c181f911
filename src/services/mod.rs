//! Services module - the anchor-based patch pipeline.
//!
//! Framework-agnostic business logic with no UI dependencies. Components,
//! leaves first:
//!
//! - [`store`]: reads and writes the external config document as raw text
//!   (atomic writes, missing file is an expected state, not an error)
//! - [`validator`]: anchor exactly-once counts and a string/comment-aware
//!   bracket balance scan over document text
//! - [`presets`]: named preset bundles expanded into flat field/value pairs,
//!   with `${field.path}` interpolation from the live settings model
//! - [`patch`]: the rewrite core - one static rule table binding field paths
//!   to anchors, one generic rewrite primitive shared by full-preset and
//!   incremental flows
//! - [`sync`]: the orchestrator - read → expand → patch → validate →
//!   write-or-reject, with the guarantee that a patch failing validation
//!   never reaches disk
//!
//! # Design Philosophy
//!
//! - **Pure where possible**: validator and patch engine are functions of
//!   their inputs; only the store touches the filesystem
//! - **Explicit inputs**: every sync receives a settings snapshot and an
//!   explicit set of changes; nothing reads global state
//! - **Testable**: the store is a trait seam, so the write-never-happens
//!   guarantee is provable with a mock

pub mod patch;
pub mod presets;
pub mod store;
pub mod sync;
pub mod validator;

pub use patch::{FIELD_RULES, FieldRule, PatchEngine, PatchError, PatchOutcome};
pub use presets::{Preset, PresetError, PresetLibrary};
pub use store::{DEFAULT_DOCUMENT_NAME, DocumentStore, FsDocumentStore, StoreError};
pub use sync::{FieldUpdate, SyncError, SyncEvent, SyncOrchestrator, SyncReport, SyncRequest};
pub use validator::{ValidationProblem, ValidationResult, validate_anchors, validate_syntax};
