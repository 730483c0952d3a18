//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/orgtree/orgtree.toml`
//! 3. Explicit config file (`--config <FILE>`)
//! 4. Environment variables: `ORGTREE_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::{RecordFormat, DEFAULT_INDENT};

/// Unified configuration for orgtree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Indentation unit written once per level (default: one tab)
    pub indent: String,
    /// Field delimiter of record files (default: ',')
    pub delimiter: char,
    /// Whether record files start with a header row (default: false)
    pub has_header: bool,
}

impl Default for Settings {
    fn default() -> Self {
        let format = RecordFormat::default();
        Self {
            indent: DEFAULT_INDENT.to_string(),
            delimiter: format.delimiter,
            has_header: format.has_header,
        }
    }
}

/// Raw settings for intermediate parsing (`None` means "not specified, inherit").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub indent: Option<String>,
    pub delimiter: Option<char>,
    pub has_header: Option<bool>,
}

/// Get the XDG config directory for orgtree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "orgtree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("orgtree.toml"))
}

/// Expand `~`, `$VAR` and `${VAR}` in a path.
pub fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    shellexpand::full(raw.as_ref())
        .map(|s| PathBuf::from(s.into_owned()))
        .unwrap_or_else(|_| path.to_path_buf())
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

/// Turn the two-character sequence `\t` into a tab, so env vars can carry one.
fn unescape_indent(value: &str) -> String {
    value.replace("\\t", "\t")
}

impl Settings {
    /// Record file options derived from these settings.
    pub fn record_format(&self) -> RecordFormat {
        RecordFormat {
            delimiter: self.delimiter,
            has_header: self.has_header,
        }
    }

    /// Overlay wins for every field it specifies.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            indent: overlay
                .indent
                .as_deref()
                .map(unescape_indent)
                .unwrap_or_else(|| self.indent.clone()),
            delimiter: overlay.delimiter.unwrap_or(self.delimiter),
            has_header: overlay.has_header.unwrap_or(self.has_header),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `config_file` - Optional explicit config file; it must exist if given
    pub fn load(config_file: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 3. Explicit config file
        if let Some(path) = config_file {
            let path = expand_path(path);
            if !path.exists() {
                return Err(ApplicationError::Config {
                    message: format!("config file not found: {}", path.display()),
                });
            }
            let raw = load_raw_settings(&path)?;
            current = current.merge_with(&raw);
        }

        // 4. Environment variables
        current = Self::apply_env_overrides(current)?;

        current.validate()?;
        Ok(current)
    }

    /// Apply ORGTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(Environment::with_prefix("ORGTREE"))
            .build()
            .map_err(config_err)?;

        if let Some(val) = env_value(config.get_string("indent"))? {
            settings.indent = unescape_indent(&val);
        }
        if let Some(val) = env_value(config.get_string("delimiter"))? {
            let mut chars = val.chars();
            settings.delimiter = match (chars.next(), chars.next()) {
                (Some(c), None) => c,
                _ => {
                    return Err(ApplicationError::Config {
                        message: format!("ORGTREE_DELIMITER must be a single character, got {val:?}"),
                    })
                }
            };
        }
        if let Some(val) = env_value(config.get_bool("has_header"))? {
            settings.has_header = val;
        }

        Ok(settings)
    }

    /// Reject settings the record parser cannot work with.
    pub fn validate(&self) -> Result<(), ApplicationError> {
        if self.delimiter == '"' || self.delimiter == '\n' || self.delimiter == '\r' {
            return Err(ApplicationError::Config {
                message: format!("unusable delimiter: {:?}", self.delimiter),
            });
        }
        Ok(())
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# orgtree configuration
#
# Locations (by precedence, lowest to highest):
#   Global:   ~/.config/orgtree/orgtree.toml
#   Explicit: orgtree --config <FILE>
#   Env:      ORGTREE_* environment variables (ORGTREE_INDENT accepts "\t")

# Indentation written once per hierarchy level
# indent = "\t"

# Field delimiter of record files
# delimiter = ","

# Skip the first row of record files
# has_header = false
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

/// An unset variable is `None`; a set but unparsable one is an error.
fn env_value<T>(result: Result<T, ConfigError>) -> Result<Option<T>, ApplicationError> {
    match result {
        Ok(val) => Ok(Some(val)),
        Err(ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(config_err(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_defaults_when_created_then_tab_comma_no_header() {
        let settings = Settings::default();
        assert_eq!(settings.indent, "\t");
        assert_eq!(settings.delimiter, ',');
        assert!(!settings.has_header);
        assert_eq!(settings.record_format(), RecordFormat::default());
    }

    #[test]
    fn given_partial_overlay_when_merging_then_only_specified_fields_change() {
        let base = Settings::default();
        let overlay = RawSettings {
            indent: Some("\\t\\t".into()),
            delimiter: None,
            has_header: Some(true),
        };
        let merged = base.merge_with(&overlay);
        assert_eq!(merged.indent, "\t\t");
        assert_eq!(merged.delimiter, ',');
        assert!(merged.has_header);
    }

    #[test]
    fn given_quote_delimiter_when_validating_then_errors() {
        let settings = Settings {
            delimiter: '"',
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn given_template_when_parsed_then_is_valid_toml() {
        let raw: RawSettings = toml::from_str(&Settings::template()).expect("template parses");
        assert!(raw.indent.is_none());
    }

    #[test]
    fn given_settings_when_serialized_then_round_trips_through_toml() {
        let settings = Settings {
            indent: "  ".into(),
            delimiter: ';',
            has_header: true,
        };
        let text = settings.to_toml().unwrap();
        let back: Settings = toml::from_str(&text).unwrap();
        assert_eq!(back, settings);
    }
}
