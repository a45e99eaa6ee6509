use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{EchoError, Result};

/// Top-level configuration for Echo.
///
/// Loaded from `~/.echo/config.toml` by the CLI harness. The browser build
/// runs on `EchoConfig::default()`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EchoConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub resolver: ResolverConfig,
    #[serde(default)]
    pub insertion: InsertionConfig,
    #[serde(default)]
    pub toast: ToastConfig,
    #[serde(default)]
    pub bridge: BridgeConfig,
}

impl EchoConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: EchoConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| EchoError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Which `<input>` types count as single-line text fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Input types accepted when the field already holds focus.
    pub focus_input_types: Vec<String>,
    /// Input types eligible during the document scan. An `<input>` without
    /// a `type` attribute is treated as `text`.
    pub scan_input_types: Vec<String>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            focus_input_types: ["text", "search", "url", "tel", "email", "password"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            scan_input_types: vec!["text".to_string()],
        }
    }
}

/// What to do when a rich-text region has no usable range inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingRangePolicy {
    /// Insert after the region's last child.
    #[default]
    AppendToEnd,
    /// Treat the region as unusable and fall back to the clipboard.
    Reject,
}

impl std::fmt::Display for MissingRangePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MissingRangePolicy::AppendToEnd => write!(f, "append_to_end"),
            MissingRangePolicy::Reject => write!(f, "reject"),
        }
    }
}

/// Insertion behaviour.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InsertionConfig {
    pub missing_range: MissingRangePolicy,
}

/// On-page toast shown when the report falls back to the clipboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToastConfig {
    /// Message shown when no editable target exists.
    pub message: String,
    /// How long the toast stays fully visible, in milliseconds.
    pub display_ms: u64,
    /// Length of the slide-in animation; the exit plays it in reverse.
    pub animation_ms: u64,
    /// Keyframes name; scoped so it cannot collide with page styles.
    pub animation_name: String,
}

impl Default for ToastConfig {
    fn default() -> Self {
        Self {
            message: "No editable field found. The report was copied to the clipboard."
                .to_string(),
            display_ms: 3000,
            animation_ms: 300,
            animation_name: "echo-toast-slide-in".to_string(),
        }
    }
}

impl ToastConfig {
    pub fn display_duration(&self) -> Duration {
        Duration::from_millis(self.display_ms)
    }

    pub fn animation_duration(&self) -> Duration {
        Duration::from_millis(self.animation_ms)
    }
}

/// Control-surface side of the message channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// How long the sender waits for a response before giving up.
    pub response_timeout_ms: u64,
    /// Script injected into a tab that has no content script yet.
    pub content_script: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            response_timeout_ms: 5000,
            content_script: "content.js".to_string(),
        }
    }
}

impl BridgeConfig {
    pub fn response_timeout(&self) -> Duration {
        Duration::from_millis(self.response_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_config_default_values() {
        let config = EchoConfig::default();

        assert_eq!(config.general.log_level, "info");

        assert_eq!(
            config.resolver.focus_input_types,
            vec!["text", "search", "url", "tel", "email", "password"]
        );
        assert_eq!(config.resolver.scan_input_types, vec!["text"]);

        assert_eq!(
            config.insertion.missing_range,
            MissingRangePolicy::AppendToEnd
        );

        assert_eq!(config.toast.display_ms, 3000);
        assert_eq!(config.toast.animation_ms, 300);
        assert_eq!(config.toast.animation_name, "echo-toast-slide-in");
        assert!(config.toast.message.contains("clipboard"));

        assert_eq!(config.bridge.response_timeout_ms, 5000);
        assert_eq!(config.bridge.content_script, "content.js");
    }

    #[test]
    fn test_config_load_partial() {
        let content = r#"
[insertion]
missing_range = "reject"

[toast]
display_ms = 1500
animation_ms = 120
"#;
        let file = create_temp_config(content);
        let config = EchoConfig::load(file.path()).unwrap();

        assert_eq!(config.insertion.missing_range, MissingRangePolicy::Reject);
        assert_eq!(config.toast.display_ms, 1500);
        assert_eq!(config.toast.animation_ms, 120);
        // Unspecified fields keep their defaults.
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.resolver.scan_input_types, vec!["text"]);
    }

    #[test]
    fn test_config_load_or_default_missing_file() {
        let config = EchoConfig::load_or_default(Path::new("/does/not/exist/config.toml"));
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.toast.display_ms, 3000);
    }

    #[test]
    fn test_config_load_invalid_toml() {
        let file = create_temp_config("this is {{ not valid TOML");
        let result = EchoConfig::load(file.path());
        assert!(matches!(result, Err(EchoError::Config(_))));
    }

    #[test]
    fn test_config_load_unknown_policy() {
        let file = create_temp_config("[insertion]\nmissing_range = \"guess\"\n");
        assert!(EchoConfig::load(file.path()).is_err());
    }

    #[test]
    fn test_config_save_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub").join("dir").join("config.toml");

        let mut config = EchoConfig::default();
        config.bridge.response_timeout_ms = 750;
        config.save(&path).unwrap();

        assert!(path.exists());
        let reloaded = EchoConfig::load(&path).unwrap();
        assert_eq!(reloaded.bridge.response_timeout_ms, 750);
        assert_eq!(reloaded.insertion.missing_range, MissingRangePolicy::AppendToEnd);
    }

    #[test]
    fn test_config_empty_toml_uses_all_defaults() {
        let file = create_temp_config("");
        let config = EchoConfig::load(file.path()).unwrap();
        assert_eq!(config.toast.animation_name, "echo-toast-slide-in");
        assert_eq!(config.resolver.focus_input_types.len(), 6);
    }

    #[test]
    fn test_durations() {
        let config = EchoConfig::default();
        assert_eq!(config.toast.display_duration(), Duration::from_secs(3));
        assert_eq!(config.toast.animation_duration(), Duration::from_millis(300));
        assert_eq!(config.bridge.response_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_missing_range_policy_display() {
        assert_eq!(MissingRangePolicy::AppendToEnd.to_string(), "append_to_end");
        assert_eq!(MissingRangePolicy::Reject.to_string(), "reject");
    }
}
