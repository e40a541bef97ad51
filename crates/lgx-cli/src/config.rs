//! # CLI Configuration
//!
//! Settings come from four layers, later layers winning:
//!
//! 1. built-in defaults;
//! 2. a YAML file (`--config`, or `.lgx/config.yaml` when present);
//! 3. environment variables `LGX_STATE_DIR` and `LGX_LOCALE`;
//! 4. the `--state-dir` flag.
//!
//! ```yaml
//! state_dir: .lgx/shipments
//! locale: es
//! theme: ansi
//! catalog: catalogs/custom.yaml
//! messages: messages/es-overrides.yaml
//! ```
//!
//! Relative `catalog` and `messages` paths are resolved against the config
//! file's directory first.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use lgx_catalog::{BuiltinCatalog, Locale, MessageTable, MilestoneCatalog, YamlCatalog};

use crate::theme::ThemeName;

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_PATH: &str = ".lgx/config.yaml";

/// Default location of session files.
pub const DEFAULT_STATE_DIR: &str = ".lgx/shipments";

pub const ENV_STATE_DIR: &str = "LGX_STATE_DIR";
pub const ENV_LOCALE: &str = "LGX_LOCALE";

/// Resolved CLI settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    /// Directory holding one `<shipment>.json` per session.
    pub state_dir: PathBuf,
    /// Display language.
    pub locale: Locale,
    /// Terminal styling.
    pub theme: ThemeName,
    /// YAML catalog replacing the built-in templates.
    pub catalog: Option<PathBuf>,
    /// YAML message table laid over the built-in table.
    pub messages: Option<PathBuf>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            state_dir: PathBuf::from(DEFAULT_STATE_DIR),
            locale: Locale::default(),
            theme: ThemeName::default(),
            catalog: None,
            messages: None,
        }
    }
}

impl CliConfig {
    /// Build the effective configuration from every layer.
    pub fn from_sources(config_path: Option<&Path>, state_dir_flag: Option<&Path>) -> Result<Self> {
        let mut config = match config_path {
            Some(path) => Self::load(path)?,
            None if Path::new(DEFAULT_CONFIG_PATH).is_file() => {
                Self::load(Path::new(DEFAULT_CONFIG_PATH))?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        if let Some(dir) = state_dir_flag {
            config.state_dir = dir.to_path_buf();
        }
        tracing::debug!(
            state_dir = %config.state_dir.display(),
            locale = %config.locale,
            "configuration resolved"
        );
        Ok(config)
    }

    /// Read a config file. Relative catalog and message paths are resolved
    /// against the file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let mut config: CliConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("invalid YAML in {}", path.display()))?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        config.catalog = config.catalog.map(|p| crate::resolve_path(&p, base));
        config.messages = config.messages.map(|p| crate::resolve_path(&p, base));
        Ok(config)
    }

    /// Apply environment overrides through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(ENV_STATE_DIR).filter(|v| !v.trim().is_empty()) {
            self.state_dir = PathBuf::from(dir);
        }
        if let Some(locale) = lookup(ENV_LOCALE).filter(|v| !v.trim().is_empty()) {
            self.locale = locale
                .parse()
                .with_context(|| format!("invalid {ENV_LOCALE}"))?;
        }
        Ok(())
    }

    /// The message table for the configured locale, with overrides applied.
    pub fn localizer(&self) -> Result<MessageTable> {
        let mut table = MessageTable::builtin(self.locale);
        if let Some(path) = &self.messages {
            let overlay = MessageTable::load(path)?;
            if overlay.locale != self.locale {
                tracing::warn!(
                    configured = %self.locale,
                    file = %overlay.locale,
                    "message table locale differs from configured locale"
                );
            }
            table.extend(overlay);
        }
        Ok(table)
    }

    /// The configured catalog, or the built-in one.
    pub fn catalog(&self) -> Result<Box<dyn MilestoneCatalog>> {
        match &self.catalog {
            Some(path) => Ok(Box::new(YamlCatalog::load(path)?)),
            None => Ok(Box::new(BuiltinCatalog)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lgx_catalog::Localizer;
    use lgx_core::{ShipmentDirection, TransportMode};

    #[test]
    fn defaults() {
        let c = CliConfig::default();
        assert_eq!(c.state_dir, PathBuf::from(".lgx/shipments"));
        assert_eq!(c.locale, Locale::En);
        assert_eq!(c.theme, ThemeName::Plain);
        assert!(c.catalog.is_none());
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let c: CliConfig = serde_yaml::from_str("locale: es\n").unwrap();
        assert_eq!(c.locale, Locale::Es);
        assert_eq!(c.state_dir, PathBuf::from(DEFAULT_STATE_DIR));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(serde_yaml::from_str::<CliConfig>("colour: blue\n").is_err());
    }

    #[test]
    fn env_overrides_file_values() {
        let mut c: CliConfig = serde_yaml::from_str("state_dir: from-file\nlocale: en\n").unwrap();
        c.apply_env(|key| match key {
            ENV_STATE_DIR => Some("from-env".to_string()),
            ENV_LOCALE => Some("es".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(c.state_dir, PathBuf::from("from-env"));
        assert_eq!(c.locale, Locale::Es);
    }

    #[test]
    fn bad_env_locale_is_an_error() {
        let mut c = CliConfig::default();
        let err = c
            .apply_env(|key| (key == ENV_LOCALE).then(|| "klingon".to_string()))
            .unwrap_err();
        assert!(format!("{err:#}").contains("LGX_LOCALE"));
    }

    #[test]
    fn flag_beats_env_and_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "state_dir: from-file\n").unwrap();
        let c = CliConfig::from_sources(Some(&path), Some(Path::new("from-flag"))).unwrap();
        assert_eq!(c.state_dir, PathBuf::from("from-flag"));
    }

    #[test]
    fn load_resolves_relative_paths_and_builds_collaborators() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("catalog.yaml"),
            "templates:\n  - { direction: export, mode: air, milestones: [{ id: pickup, category: transport }] }\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("messages.yaml"),
            "locale: en\nmessages:\n  milestone.pickup: Pickup at shipper\n",
        )
        .unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "catalog: catalog.yaml\nmessages: messages.yaml\ntheme: ansi\n").unwrap();

        let c = CliConfig::load(&path).unwrap();
        assert_eq!(c.catalog.as_deref(), Some(dir.path().join("catalog.yaml").as_path()));
        assert_eq!(c.theme, ThemeName::Ansi);

        let defs = c
            .catalog()
            .unwrap()
            .definitions(ShipmentDirection::Export, TransportMode::Air)
            .unwrap();
        assert_eq!(defs[0].id.as_str(), "pickup");
        let table = c.localizer().unwrap();
        assert_eq!(table.resolve("milestone.pickup"), "Pickup at shipper");
        assert_eq!(table.resolve("label.progress"), "Progress");
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = CliConfig::load(&dir.path().join("nope.yaml")).unwrap_err();
        assert!(err.to_string().contains("failed to read config"));
    }
}
