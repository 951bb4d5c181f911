// sitesync CLI - applies presets and single-field edits to the generator
// config document from the command line. The wizard/settings-panel UI is a
// separate front end; this binary exercises the same library pipeline.

use anyhow::{Context, Result, bail};
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use sitesync::models::{FieldValue, ValueKind};
use sitesync::services::patch::rule_for_path;
use sitesync::services::sync::FieldUpdate;
use sitesync::{FsDocumentStore, PresetLibrary, SettingsManager, SyncOrchestrator, SyncRequest};

#[derive(Parser)]
#[command(name = sitesync::APP_NAME, version = sitesync::VERSION)]
#[command(about = "Sync settings into the static-site generator config via anchored patches")]
struct Cli {
    /// Managed project root; the config document lives one level above it
    #[arg(short, long)]
    project: Utf8PathBuf,

    /// Directory holding the persisted settings model
    #[arg(long, default_value = "sitesync-data")]
    config_dir: Utf8PathBuf,

    /// File name of the generator config document
    #[arg(long, default_value = sitesync::services::DEFAULT_DOCUMENT_NAME)]
    document: String,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Apply a named preset to the document
    ApplyPreset {
        /// Preset name (see `list-presets`)
        name: String,
    },

    /// Set one field to a new value
    Set {
        /// Dotted field path, e.g. site.pageTitle
        field: String,
        /// New value, parsed per the field's kind
        value: String,
    },

    /// Re-apply every managed field from the persisted settings model
    Reapply,

    /// Validate the current document without writing
    Check,

    /// List the available presets
    ListPresets,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let _guard = sitesync::logging::setup_logging("logs", "sitesync", cli.debug, cli.debug)
        .context("Failed to initialize logging")?;

    let settings = SettingsManager::new(&cli.config_dir)?;
    let model = settings.load_settings()?;

    let store = FsDocumentStore::new(&cli.project, &cli.document)?;
    let orchestrator = SyncOrchestrator::new(store, PresetLibrary::builtin());

    match cli.command {
        Command::ApplyPreset { name } => {
            let report = orchestrator.sync(&model, &SyncRequest::preset(name))?;
            report_outcome(&report);
        }
        Command::Set { field, value } => {
            let parsed = parse_field_value(&field, &value)?;
            let report = orchestrator.sync(
                &model,
                &SyncRequest::incremental(vec![FieldUpdate {
                    path: field,
                    value: parsed,
                }]),
            )?;
            report_outcome(&report);
        }
        Command::Reapply => {
            let updates = model
                .all_field_values(&sitesync::services::patch::rule_paths())
                .into_iter()
                .map(|(path, value)| FieldUpdate { path, value })
                .collect();
            let report = orchestrator.sync(&model, &SyncRequest::incremental(updates))?;
            report_outcome(&report);
        }
        Command::Check => {
            let result = orchestrator.check()?;
            if result.is_valid() {
                println!("Document is valid");
            } else {
                bail!("Document has problems: {}", result.summary());
            }
        }
        Command::ListPresets => {
            let library = PresetLibrary::builtin();
            for name in library.preset_names() {
                let preset = library.get(name).expect("listed preset exists");
                println!("{name} (v{}): {}", preset.version, preset.description);
            }
        }
    }

    Ok(())
}

fn report_outcome(report: &sitesync::SyncReport) {
    println!("Wrote {}", report.document.path);
    if !report.skipped_fields.is_empty() {
        println!(
            "Warning: {} field(s) skipped (anchor missing): {}",
            report.skipped_fields.len(),
            report.skipped_fields.join(", ")
        );
    }
}

/// Parse a CLI value string according to the field's rule kind. List fields
/// cannot be edited from the CLI; they come from the settings model.
fn parse_field_value(field: &str, raw: &str) -> Result<FieldValue> {
    let rule = rule_for_path(field)
        .with_context(|| format!("No such field: {field}"))?;

    let value = match rule.kind {
        ValueKind::Str => FieldValue::Str(raw.to_string()),
        ValueKind::Bool => FieldValue::Bool(
            raw.parse()
                .with_context(|| format!("{field} expects true or false, got {raw:?}"))?,
        ),
        ValueKind::Int => FieldValue::Int(
            raw.parse()
                .with_context(|| format!("{field} expects an integer, got {raw:?}"))?,
        ),
        ValueKind::NavList => bail!("{field} is a list field; edit it via the settings model"),
    };

    Ok(value)
}
