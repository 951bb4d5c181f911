//! The sync pipeline: read → expand → patch → validate → commit.
//!
//! One sync call runs to completion before the next starts; callers
//! serialize their own calls. A patched document that fails validation is
//! discarded before `write` is ever reached, so the on-disk document is
//! preserved exactly as it was on every hard failure.

use crate::models::{DocumentText, FieldValue, SettingsModel};
use crate::services::patch::{PatchEngine, PatchError};
use crate::services::presets::{PresetError, PresetLibrary};
use crate::services::store::{DocumentStore, StoreError};
use crate::services::validator::{self, ValidationResult};
use indexmap::IndexMap;
use tokio::sync::broadcast;

/// One explicit field edit, as produced by a settings-panel change.
#[derive(Debug, Clone)]
pub struct FieldUpdate {
    pub path: String,
    pub value: FieldValue,
}

/// What one sync call should apply: a preset, explicit field updates, or
/// both. Explicit updates win over preset values for the same field, so a
/// user's direct edit is never silently reverted by a preset applied in the
/// same call.
#[derive(Debug, Clone, Default)]
pub struct SyncRequest {
    pub preset: Option<String>,
    pub updates: Vec<FieldUpdate>,
}

impl SyncRequest {
    pub fn preset(name: impl Into<String>) -> Self {
        Self {
            preset: Some(name.into()),
            updates: Vec::new(),
        }
    }

    pub fn incremental(updates: Vec<FieldUpdate>) -> Self {
        Self {
            preset: None,
            updates,
        }
    }

    pub fn with_update(mut self, path: impl Into<String>, value: FieldValue) -> Self {
        self.updates.push(FieldUpdate {
            path: path.into(),
            value,
        });
        self
    }
}

/// Hard failures. Any of these aborts the sync with the previous document
/// untouched on disk.
#[derive(thiserror::Error, Debug)]
pub enum SyncError {
    /// The document has not been scaffolded yet; there is nothing to patch.
    #[error("Config document not found; scaffold it before syncing")]
    DocumentNotFound,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Preset(#[from] PresetError),

    #[error(transparent)]
    Patch(#[from] PatchError),

    /// The patched text failed the anchor or syntax checks. The single most
    /// important guarantee: a bad patch never reaches disk.
    #[error("Patched document failed validation: {}", .0.summary())]
    ValidationFailed(ValidationResult),
}

/// Successful sync: the freshly written document plus any fields that were
/// soft-skipped because their anchor is absent.
#[derive(Debug, Clone)]
pub struct SyncReport {
    pub document: DocumentText,
    pub skipped_fields: Vec<String>,
}

/// Fire-and-forget notifications for whatever watches the document.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    /// A successful write landed; the dev server may want to rebuild.
    RebuildRequested { path: String },
}

/// Coordinates store, preset resolver, patch engine, and validator for one
/// sync call at a time.
pub struct SyncOrchestrator<S: DocumentStore> {
    store: S,
    presets: PresetLibrary,
    engine: PatchEngine,
    events_tx: broadcast::Sender<SyncEvent>,
}

impl<S: DocumentStore> SyncOrchestrator<S> {
    pub fn new(store: S, presets: PresetLibrary) -> Self {
        let (events_tx, _) = broadcast::channel(16);
        Self {
            store,
            presets,
            engine: PatchEngine::new(),
            events_tx,
        }
    }

    /// Subscribe to post-write notifications. Events are never awaited by
    /// the pipeline; a sync succeeds whether or not anyone listens.
    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.events_tx.subscribe()
    }

    /// Run one sync. Terminal on the first hard failure; soft skips are
    /// collected and returned with the successful report.
    pub fn sync(
        &self,
        model: &SettingsModel,
        request: &SyncRequest,
    ) -> Result<SyncReport, SyncError> {
        // 1. Read
        let current = self.store.read()?.ok_or(SyncError::DocumentNotFound)?;

        // 2. Expand
        let pairs = self.expand(model, request)?;
        if pairs.is_empty() {
            tracing::debug!("Nothing to sync");
            return Ok(SyncReport {
                document: current,
                skipped_fields: Vec::new(),
            });
        }

        // 3. Patch
        let outcome = self.engine.apply(&current.contents, &pairs)?;

        // 4. Validate, short-circuiting on the first failing check
        let anchors = validator::validate_anchors(&outcome.text, &outcome.applied_anchors);
        if !anchors.is_valid() {
            tracing::error!("Anchor validation failed: {}", anchors.summary());
            return Err(SyncError::ValidationFailed(anchors));
        }
        let syntax = validator::validate_syntax(&outcome.text);
        if !syntax.is_valid() {
            tracing::error!("Syntax validation failed: {}", syntax.summary());
            return Err(SyncError::ValidationFailed(syntax));
        }

        // 5. Commit
        let document = self.store.write(&outcome.text)?;

        if !outcome.skipped_fields.is_empty() {
            tracing::warn!(
                "Sync wrote {} with {} field(s) skipped: {}",
                document.path,
                outcome.skipped_fields.len(),
                outcome.skipped_fields.join(", ")
            );
        } else {
            tracing::info!("Sync wrote {}", document.path);
        }

        // Fire-and-forget; it is fine if no one is listening.
        let _ = self.events_tx.send(SyncEvent::RebuildRequested {
            path: document.path.to_string(),
        });

        Ok(SyncReport {
            document,
            skipped_fields: outcome.skipped_fields,
        })
    }

    /// Validate the current on-disk document without patching or writing.
    /// Checks every rule anchor present in the rule set plus the balance
    /// scan; used by "check" callers before offering a sync.
    pub fn check(&self) -> Result<ValidationResult, SyncError> {
        let current = self.store.read()?.ok_or(SyncError::DocumentNotFound)?;

        // Only anchors that exist at all are held to exactly-once here;
        // absent anchors are the soft-skip case, not corruption.
        let present: Vec<&str> = crate::services::patch::FIELD_RULES
            .iter()
            .map(|r| r.anchor)
            .filter(|a| current.contents.contains(*a))
            .collect();

        let mut result = validator::validate_anchors(&current.contents, &present);
        let syntax = validator::validate_syntax(&current.contents);
        result.problems.extend(syntax.problems);
        Ok(result)
    }

    /// Merge preset expansion with explicit overrides; overrides win.
    fn expand(
        &self,
        model: &SettingsModel,
        request: &SyncRequest,
    ) -> Result<IndexMap<String, FieldValue>, SyncError> {
        let mut pairs = match &request.preset {
            Some(name) => self.presets.resolve(name, model)?,
            None => IndexMap::new(),
        };

        for update in &request.updates {
            pairs.insert(update.path.clone(), update.value.clone());
        }

        Ok(pairs)
    }
}
