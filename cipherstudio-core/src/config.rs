//! Configuration management
//!
//! Settings live in settings.json in the data directory, shared with the
//! desktop app:
//! ```json
//! {
//!   "editor": { "autosaveDelayMs": 1000 },
//!   "storage": { "namespace": "cipherstudio" },
//!   "preview": { "template": "react" },
//!   "workspace": { "activeProject": "default-project", "selectedFile": "App.jsx" }
//! }
//! ```
//! Fields the core does not manage are kept as-is when saving.

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Settings file name inside the data directory
pub const SETTINGS_FILE: &str = "settings.json";

/// Environment override for the autosave window
pub const AUTOSAVE_ENV: &str = "CIPHERSTUDIO_AUTOSAVE_MS";

const DEFAULT_AUTOSAVE_DELAY_MS: u64 = 1000;
const DEFAULT_NAMESPACE: &str = "cipherstudio";
const DEFAULT_PREVIEW_TEMPLATE: &str = "react";

fn default_autosave_delay_ms() -> u64 {
    DEFAULT_AUTOSAVE_DELAY_MS
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

fn default_template() -> String {
    DEFAULT_PREVIEW_TEMPLATE.to_string()
}

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    editor: EditorSettings,
    #[serde(default)]
    storage: StorageSettings,
    #[serde(default)]
    preview: PreviewSettings,
    #[serde(default)]
    workspace: WorkspaceSettings,
    #[serde(flatten)]
    other: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EditorSettings {
    #[serde(default = "default_autosave_delay_ms")]
    autosave_delay_ms: u64,
    #[serde(flatten)]
    other: Map<String, Value>,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            autosave_delay_ms: DEFAULT_AUTOSAVE_DELAY_MS,
            other: Map::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StorageSettings {
    #[serde(default = "default_namespace")]
    namespace: String,
    #[serde(flatten)]
    other: Map<String, Value>,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            other: Map::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PreviewSettings {
    #[serde(default = "default_template")]
    template: String,
    #[serde(flatten)]
    other: Map<String, Value>,
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            template: default_template(),
            other: Map::new(),
        }
    }
}

/// Where the presentation layer left off
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WorkspaceSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    active_project: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    selected_file: Option<String>,
    #[serde(flatten)]
    other: Map<String, Value>,
}

/// CipherStudio configuration (simplified view of settings)
#[derive(Debug, Clone)]
pub struct Config {
    /// Effective autosave window, including any environment override
    pub autosave_delay_ms: u64,
    pub namespace: String,
    pub preview_template: String,
    pub active_project: Option<String>,
    pub selected_file: Option<String>,
    /// Window as read from settings.json; this is what `save` writes back
    stored_autosave_delay_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_raw(&SettingsFile::default())
    }
}

impl Config {
    /// Load config from the data directory
    ///
    /// A missing or malformed settings file yields the defaults. The autosave
    /// window can be overridden with CIPHERSTUDIO_AUTOSAVE_MS.
    pub fn load(data_dir: &Path) -> Result<Self> {
        Self::load_with_override(data_dir, std::env::var(AUTOSAVE_ENV).ok().as_deref())
    }

    fn load_with_override(data_dir: &Path, autosave_override: Option<&str>) -> Result<Self> {
        let raw = read_settings(data_dir)?;
        let mut config = Self::from_raw(&raw);
        config.apply_autosave_override(autosave_override);
        Ok(config)
    }

    fn from_raw(raw: &SettingsFile) -> Self {
        let namespace = if raw.storage.namespace.trim().is_empty() {
            default_namespace()
        } else {
            raw.storage.namespace.clone()
        };
        let preview_template = if raw.preview.template.trim().is_empty() {
            default_template()
        } else {
            raw.preview.template.clone()
        };

        Self {
            autosave_delay_ms: raw.editor.autosave_delay_ms,
            namespace,
            preview_template,
            active_project: raw.workspace.active_project.clone(),
            selected_file: raw.workspace.selected_file.clone(),
            stored_autosave_delay_ms: raw.editor.autosave_delay_ms,
        }
    }

    /// Take the autosave window from an override value when it parses
    ///
    /// Only the effective window changes; the stored setting is untouched.
    fn apply_autosave_override(&mut self, value: Option<&str>) {
        if let Some(ms) = value.and_then(|v| v.trim().parse::<u64>().ok()) {
            self.autosave_delay_ms = ms;
        }
    }

    pub fn autosave_delay(&self) -> Duration {
        Duration::from_millis(self.autosave_delay_ms)
    }

    /// Save config to the data directory
    /// Preserves other settings that the core doesn't manage
    pub fn save(&self, data_dir: &Path) -> Result<()> {
        std::fs::create_dir_all(data_dir)?;
        let mut settings = read_settings(data_dir)?;

        settings.editor.autosave_delay_ms = self.stored_autosave_delay_ms;
        settings.storage.namespace = self.namespace.clone();
        settings.preview.template = self.preview_template.clone();
        settings.workspace.active_project = self.active_project.clone();
        settings.workspace.selected_file = self.selected_file.clone();

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(data_dir.join(SETTINGS_FILE), content)?;
        Ok(())
    }

    /// Remember the open project and file for the next run
    pub fn remember_position(&mut self, project: Option<&str>, file: &str) {
        self.active_project = project.map(str::to_string);
        self.selected_file = if file.is_empty() {
            None
        } else {
            Some(file.to_string())
        };
    }
}

fn read_settings(data_dir: &Path) -> Result<SettingsFile> {
    let settings_path = data_dir.join(SETTINGS_FILE);
    if !settings_path.exists() {
        return Ok(SettingsFile::default());
    }
    let content = std::fs::read_to_string(&settings_path)?;
    match serde_json::from_str(&content) {
        Ok(settings) => Ok(settings),
        Err(e) => {
            eprintln!("[cipherstudio] Ignoring malformed {}: {}", SETTINGS_FILE, e);
            Ok(SettingsFile::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_without_settings_file() {
        let dir = tempdir().unwrap();
        let raw = read_settings(dir.path()).unwrap();
        let config = Config::from_raw(&raw);
        assert_eq!(config.autosave_delay_ms, 1000);
        assert_eq!(config.namespace, "cipherstudio");
        assert_eq!(config.preview_template, "react");
        assert!(config.active_project.is_none());
    }

    #[test]
    fn test_reads_managed_fields() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join(SETTINGS_FILE),
            r#"{"editor":{"autosaveDelayMs":250},"preview":{"template":"vanilla"}}"#,
        )
        .unwrap();
        let config = Config::from_raw(&read_settings(dir.path()).unwrap());
        assert_eq!(config.autosave_delay(), Duration::from_millis(250));
        assert_eq!(config.preview_template, "vanilla");
        assert_eq!(config.namespace, "cipherstudio");
    }

    #[test]
    fn test_malformed_settings_fall_back_to_defaults() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(SETTINGS_FILE), "{ nope").unwrap();
        let config = Config::from_raw(&read_settings(dir.path()).unwrap());
        assert_eq!(config.autosave_delay_ms, 1000);
    }

    #[test]
    fn test_save_preserves_unmanaged_fields() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join(SETTINGS_FILE),
            r#"{"theme":"dark","editor":{"fontSize":14,"autosaveDelayMs":500}}"#,
        )
        .unwrap();

        let mut config = Config::from_raw(&read_settings(dir.path()).unwrap());
        config.remember_position(Some("project-1"), "App.jsx");
        config.save(dir.path()).unwrap();

        let content = std::fs::read_to_string(dir.path().join(SETTINGS_FILE)).unwrap();
        let value: Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["theme"], "dark");
        assert_eq!(value["editor"]["fontSize"], 14);
        assert_eq!(value["editor"]["autosaveDelayMs"], 500);
        assert_eq!(value["workspace"]["activeProject"], "project-1");
        assert_eq!(value["workspace"]["selectedFile"], "App.jsx");
    }

    #[test]
    fn test_autosave_override() {
        let mut config = Config::default();
        config.apply_autosave_override(Some("300"));
        assert_eq!(config.autosave_delay_ms, 300);
        config.apply_autosave_override(Some("soon"));
        assert_eq!(config.autosave_delay_ms, 300);
        config.apply_autosave_override(None);
        assert_eq!(config.autosave_delay_ms, 300);
    }

    #[test]
    fn test_autosave_override_is_not_persisted() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join(SETTINGS_FILE),
            r#"{"editor":{"autosaveDelayMs":1000}}"#,
        )
        .unwrap();

        let mut config = Config::load_with_override(dir.path(), Some("50")).unwrap();
        assert_eq!(config.autosave_delay_ms, 50);
        config.remember_position(Some("default-project"), "App.jsx");
        config.save(dir.path()).unwrap();

        let reloaded = Config::load_with_override(dir.path(), None).unwrap();
        assert_eq!(reloaded.autosave_delay_ms, 1000);
        assert_eq!(reloaded.active_project.as_deref(), Some("default-project"));
    }

    #[test]
    fn test_remember_empty_selection() {
        let mut config = Config::default();
        config.remember_position(None, "");
        assert!(config.active_project.is_none());
        assert!(config.selected_file.is_none());
    }
}
