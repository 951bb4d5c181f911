//! Named preset bundles and their interpolation against the live model.
//!
//! Presets are read-only templates: resolving one produces a flat set of
//! (field path, value) pairs, the same shape an incremental edit has. A
//! preset never deletes fields outside its declared set.

use crate::models::{FieldValue, SettingsModel, ValueKind};
use crate::services::patch::rule_for_path;
use indexmap::IndexMap;
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

/// Built-in preset bundles, embedded at compile time.
const BUILTIN_PRESETS: &str = include_str!("../../assets/presets.yaml");

#[derive(Error, Debug)]
pub enum PresetError {
    /// The caller named a preset that has no rule table. A programming or
    /// config error, never silently defaulted.
    #[error("Unknown preset: {0}")]
    UnknownPreset(String),

    #[error("Preset {preset} targets unknown field {path}")]
    UnknownField { preset: String, path: String },

    #[error("Unknown placeholder ${{{placeholder}}} in preset {preset}")]
    UnknownPlaceholder { preset: String, placeholder: String },

    #[error("Placeholder ${{{placeholder}}} in preset {preset} is a list and cannot be embedded in a larger string")]
    ListInTemplate { preset: String, placeholder: String },

    #[error("Preset {preset} renders {path} as {got:?}, its rule expects {expected:?}")]
    ValueMismatch {
        preset: String,
        path: String,
        expected: ValueKind,
        got: ValueKind,
    },

    #[error("Failed to parse preset bundle: {0}")]
    Parse(#[from] serde_yaml_ng::Error),
}

/// One raw template value as it appears in the bundle YAML.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PresetValue {
    Bool(bool),
    Int(i64),
    Str(String),
}

/// A named, versioned bundle of target values.
#[derive(Debug, Clone, Deserialize)]
pub struct Preset {
    pub version: u32,
    #[serde(default)]
    pub description: String,
    pub values: IndexMap<String, PresetValue>,
}

/// All known presets, loaded once at startup and immutable afterwards.
pub struct PresetLibrary {
    presets: IndexMap<String, Preset>,
    placeholder: Regex,
}

impl PresetLibrary {
    /// The compiled-in bundle. Parsing it is infallible by construction;
    /// a malformed asset fails the test suite, not a user's sync.
    pub fn builtin() -> Self {
        Self::from_yaml(BUILTIN_PRESETS).expect("Invalid built-in preset bundle")
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, PresetError> {
        let presets: IndexMap<String, Preset> = serde_yaml_ng::from_str(yaml)?;
        Ok(Self {
            presets,
            placeholder: Regex::new(r"\$\{([A-Za-z][\w.]*)\}")
                .expect("Invalid placeholder regex"),
        })
    }

    pub fn preset_names(&self) -> Vec<&str> {
        self.presets.keys().map(String::as_str).collect()
    }

    pub fn get(&self, name: &str) -> Option<&Preset> {
        self.presets.get(name)
    }

    /// Expand a preset into concrete field/value pairs against the live
    /// model. Pure substitution, no recursion, no external state.
    pub fn resolve(
        &self,
        name: &str,
        model: &SettingsModel,
    ) -> Result<IndexMap<String, FieldValue>, PresetError> {
        let preset = self
            .presets
            .get(name)
            .ok_or_else(|| PresetError::UnknownPreset(name.to_string()))?;

        tracing::debug!(
            "Resolving preset {} v{} ({} fields)",
            name,
            preset.version,
            preset.values.len()
        );

        let mut resolved = IndexMap::new();
        for (path, template) in &preset.values {
            let rule = rule_for_path(path).ok_or_else(|| PresetError::UnknownField {
                preset: name.to_string(),
                path: path.clone(),
            })?;

            let value = match template {
                PresetValue::Bool(b) => FieldValue::Bool(*b),
                PresetValue::Int(i) => FieldValue::Int(*i),
                PresetValue::Str(s) => self.interpolate(name, s, model)?,
            };

            let value = coerce(value, rule.kind).map_err(|got| PresetError::ValueMismatch {
                preset: name.to_string(),
                path: path.clone(),
                expected: rule.kind,
                got,
            })?;

            resolved.insert(path.clone(), value);
        }

        Ok(resolved)
    }

    /// Substitute `${field.path}` placeholders from the model. A template
    /// that is exactly one placeholder passes the model value through
    /// unchanged (preserving lists and non-string kinds); anything else is
    /// string substitution of each placeholder's display form.
    fn interpolate(
        &self,
        preset: &str,
        template: &str,
        model: &SettingsModel,
    ) -> Result<FieldValue, PresetError> {
        if let Some(caps) = self.placeholder.captures(template.trim()) {
            let whole = caps.get(0).map_or("", |m| m.as_str());
            if whole == template.trim() {
                let path = &caps[1];
                return model
                    .field_value(path)
                    .ok_or_else(|| PresetError::UnknownPlaceholder {
                        preset: preset.to_string(),
                        placeholder: path.to_string(),
                    });
            }
        }

        let mut out = String::with_capacity(template.len());
        let mut last = 0usize;
        for caps in self.placeholder.captures_iter(template) {
            let m = caps.get(0).expect("match 0 always present");
            let path = &caps[1];
            let value =
                model
                    .field_value(path)
                    .ok_or_else(|| PresetError::UnknownPlaceholder {
                        preset: preset.to_string(),
                        placeholder: path.to_string(),
                    })?;
            if matches!(value, FieldValue::NavList(_)) {
                return Err(PresetError::ListInTemplate {
                    preset: preset.to_string(),
                    placeholder: path.to_string(),
                });
            }
            out.push_str(&template[last..m.start()]);
            out.push_str(&value.display_fragment());
            last = m.end();
        }
        out.push_str(&template[last..]);

        Ok(FieldValue::Str(out))
    }
}

/// Align a resolved value with its rule's kind. Strings from YAML templates
/// may stand in for booleans or integers ("true", "750"); anything else that
/// disagrees with the rule is handed back as the offending kind.
fn coerce(value: FieldValue, kind: ValueKind) -> Result<FieldValue, ValueKind> {
    if value.kind() == kind {
        return Ok(value);
    }

    if let FieldValue::Str(s) = &value {
        match kind {
            ValueKind::Bool => {
                if let Ok(b) = s.trim().parse::<bool>() {
                    return Ok(FieldValue::Bool(b));
                }
            }
            ValueKind::Int => {
                if let Ok(i) = s.trim().parse::<i64>() {
                    return Ok(FieldValue::Int(i));
                }
            }
            _ => {}
        }
    }

    Err(value.kind())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FontSource, NavEntry};

    #[test]
    fn test_builtin_bundle_parses() {
        let library = PresetLibrary::builtin();
        let names = library.preset_names();
        assert!(names.contains(&"standard"));
        assert!(names.contains(&"documentation"));
        assert!(names.contains(&"digital-garden"));
        assert_eq!(library.get("digital-garden").unwrap().version, 2);
    }

    #[test]
    fn test_unknown_preset_is_loud() {
        let library = PresetLibrary::builtin();
        let err = library
            .resolve("no-such-preset", &SettingsModel::default())
            .unwrap_err();
        assert!(matches!(err, PresetError::UnknownPreset(_)));
    }

    #[test]
    fn test_resolve_standard_interpolates_live_values() {
        let library = PresetLibrary::builtin();
        let mut model = SettingsModel::default();
        model.site.page_title = "My Garden".to_string();

        let resolved = library.resolve("standard", &model).unwrap();

        assert_eq!(
            resolved.get("site.pageTitle"),
            Some(&FieldValue::Str("My Garden".to_string()))
        );
        assert_eq!(
            resolved.get("theme.darkModeToggleButton"),
            Some(&FieldValue::Bool(true))
        );
        assert_eq!(
            resolved.get("theme.readerLineWidth"),
            Some(&FieldValue::Int(750))
        );
    }

    #[test]
    fn test_whole_placeholder_passes_lists_through() {
        let library = PresetLibrary::builtin();
        let mut model = SettingsModel::default();
        model.navigation.entries = vec![
            NavEntry { title: "Home".to_string(), url: "/".to_string() },
            NavEntry { title: "Tags".to_string(), url: "/tags".to_string() },
        ];

        let resolved = library.resolve("standard", &model).unwrap();
        match resolved.get("navigation.entries") {
            Some(FieldValue::NavList(entries)) => assert_eq!(entries.len(), 2),
            other => panic!("expected nav list, got {other:?}"),
        }
    }

    #[test]
    fn test_mixed_template_substitution() {
        let library = PresetLibrary::builtin();
        let mut model = SettingsModel::default();
        model.site.page_title = "Ferris".to_string();

        let resolved = library.resolve("documentation", &model).unwrap();
        assert_eq!(
            resolved.get("site.pageTitle"),
            Some(&FieldValue::Str("Ferris Docs".to_string()))
        );
    }

    #[test]
    fn test_cdn_font_indirection() {
        let library = PresetLibrary::builtin();
        let mut model = SettingsModel::default();
        model.typography.font_source = FontSource::Cdn;
        model.typography.custom_font_name = "Inter".to_string();

        let resolved = library.resolve("standard", &model).unwrap();
        assert_eq!(
            resolved.get("typography.bodyFont"),
            Some(&FieldValue::Str("Inter".to_string()))
        );
    }

    #[test]
    fn test_unknown_placeholder_is_loud() {
        let yaml = r#"
broken:
  version: 1
  values:
    site.pageTitle: "${no.suchField}"
"#;
        let library = PresetLibrary::from_yaml(yaml).unwrap();
        let err = library
            .resolve("broken", &SettingsModel::default())
            .unwrap_err();
        assert!(matches!(err, PresetError::UnknownPlaceholder { .. }));
    }

    #[test]
    fn test_unknown_target_field_is_loud() {
        let yaml = r#"
broken:
  version: 1
  values:
    site.noSuchField: "x"
"#;
        let library = PresetLibrary::from_yaml(yaml).unwrap();
        let err = library
            .resolve("broken", &SettingsModel::default())
            .unwrap_err();
        assert!(matches!(err, PresetError::UnknownField { .. }));
    }

    #[test]
    fn test_list_in_mixed_template_is_rejected() {
        let yaml = r#"
broken:
  version: 1
  values:
    site.pageTitle: "nav: ${navigation.entries}!"
"#;
        let library = PresetLibrary::from_yaml(yaml).unwrap();
        let err = library
            .resolve("broken", &SettingsModel::default())
            .unwrap_err();
        assert!(matches!(err, PresetError::ListInTemplate { .. }));
    }

    #[test]
    fn test_string_template_coerces_to_rule_kind() {
        let yaml = r#"
numbers:
  version: 1
  values:
    theme.readerLineWidth: "640"
    features.search: "true"
"#;
        let library = PresetLibrary::from_yaml(yaml).unwrap();
        let resolved = library
            .resolve("numbers", &SettingsModel::default())
            .unwrap();
        assert_eq!(
            resolved.get("theme.readerLineWidth"),
            Some(&FieldValue::Int(640))
        );
        assert_eq!(resolved.get("features.search"), Some(&FieldValue::Bool(true)));
    }
}
