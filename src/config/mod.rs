use crate::models::SettingsModel;
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

/// Persists the settings model as YAML between sessions.
///
/// The wizard and settings panels own the model at runtime; this manager is
/// the seam where their edits survive a restart. The sync pipeline itself
/// never writes here.
#[derive(Debug, Clone)]
pub struct SettingsManager {
    config_dir: Utf8PathBuf,
    settings_path: Utf8PathBuf,
}

impl SettingsManager {
    /// Create a new SettingsManager rooted at the given configuration
    /// directory, creating the directory if needed.
    pub fn new<P: AsRef<Utf8Path>>(config_dir: P) -> Result<Self> {
        let config_dir = config_dir.as_ref().to_path_buf();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config directory: {}", config_dir))?;
        }

        Ok(Self {
            settings_path: config_dir.join("sitesync.yaml"),
            config_dir,
        })
    }

    /// Load the persisted settings model, or defaults if none exists yet.
    pub fn load_settings(&self) -> Result<SettingsModel> {
        if !self.settings_path.exists() {
            tracing::warn!(
                "Settings file not found at {}, using defaults",
                self.settings_path
            );
            return Ok(SettingsModel::default());
        }

        let file_contents = fs::read_to_string(&self.settings_path)
            .with_context(|| format!("Failed to read settings: {}", self.settings_path))?;

        let model: SettingsModel = serde_yaml_ng::from_str(&file_contents)
            .with_context(|| format!("Failed to parse settings: {}", self.settings_path))?;

        tracing::info!("Loaded settings from {}", self.settings_path);
        Ok(model)
    }

    /// Save the settings model.
    pub fn save_settings(&self, model: &SettingsModel) -> Result<()> {
        let yaml_string =
            serde_yaml_ng::to_string(model).context("Failed to serialize settings to YAML")?;

        fs::write(&self.settings_path, yaml_string)
            .with_context(|| format!("Failed to write settings: {}", self.settings_path))?;

        tracing::info!("Saved settings to {}", self.settings_path);
        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_settings_manager() -> (SettingsManager, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let config_path = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
        let manager = SettingsManager::new(&config_path).unwrap();
        (manager, temp_dir)
    }

    #[test]
    fn test_load_defaults_when_absent() {
        let (manager, _temp_dir) = create_test_settings_manager();
        let model = manager.load_settings().unwrap();
        assert_eq!(model.site.page_title, "My Site");
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let (manager, _temp_dir) = create_test_settings_manager();

        let mut model = SettingsModel::default();
        model.site.page_title = "Field Notes".to_string();
        model.features.comments = true;
        manager.save_settings(&model).unwrap();

        let loaded = manager.load_settings().unwrap();
        assert_eq!(loaded.site.page_title, "Field Notes");
        assert!(loaded.features.comments);
    }
}
