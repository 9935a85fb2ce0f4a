use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::catalog::HintSettings;
use crate::error::Error;
use crate::types::DisplayMode;

/// File name of the project config, looked up in the working directory.
pub const CONFIG_FILE: &str = ".bundlehints.toml";

/// Debug overrides, the `[debug]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DebugConfig {
    /// Answer `??? [id]` for items without a hint.
    pub show_unknown_ids: bool,
}

/// Settings loaded from `.bundlehints.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Item catalog path, relative to the config directory.
    pub catalog: PathBuf,
    /// Collections-tab hint mode.
    pub collections_tab_hints: DisplayMode,
    /// Debug overrides.
    pub debug: DebugConfig,
    /// Append `<Items in Bundle>` blocks to reports.
    pub list_items_in_bundle: bool,
    /// Prefer spoiler hints.
    pub show_spoilers: bool,
}

impl Default for Config {
    fn default() -> Self {
        return Self {
            catalog: PathBuf::from("catalog.toml"),
            collections_tab_hints: DisplayMode::default(),
            debug: DebugConfig::default(),
            list_items_in_bundle: false,
            show_spoilers: false,
        };
    }
}

impl Config {
    /// Hint settings derived from the config.
    pub const fn hint_settings(&self) -> HintSettings {
        return HintSettings {
            show_spoilers: self.show_spoilers,
            show_unknown_ids: self.debug.show_unknown_ids,
        };
    }

    /// Load config from `.bundlehints.toml` in the given root directory.
    /// Returns defaults if the file doesn't exist. Returns an error if the
    /// file exists but is malformed; a config the user wrote is never
    /// silently replaced by defaults.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if reading fails (other than not-found),
    /// or `Error::ParseFailed` if the TOML is malformed.
    pub fn load(root: &Path) -> Result<Self, Error> {
        let path = root.join(CONFIG_FILE);
        let content = match std::fs::read_to_string(&path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(Error::Io(e)),
            Ok(c) => c,
        };

        let mut config: Self = toml::from_str(&content).map_err(|e| {
            return Error::ParseFailed { file: path.clone(), reason: e.to_string() };
        })?;
        if config.catalog.is_relative() {
            config.catalog = root.join(&config.catalog);
        }
        tracing::debug!(path = %path.display(), "loaded config");
        return Ok(config);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.collections_tab_hints, DisplayMode::Unobtained);
        assert!(!config.show_spoilers);
        assert_eq!(config.catalog, PathBuf::from("catalog.toml"));
    }

    #[test]
    fn reads_every_key() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "catalog = \"data/items.toml\"\nshow_spoilers = true\ncollections_tab_hints = \"all\"\n\
             list_items_in_bundle = true\n\n[debug]\nshow_unknown_ids = true\n",
        )
        .unwrap();

        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.catalog, dir.path().join("data/items.toml"));
        assert_eq!(config.collections_tab_hints, DisplayMode::All);
        assert!(config.list_items_in_bundle);
        assert_eq!(config.hint_settings(), HintSettings { show_spoilers: true, show_unknown_ids: true });
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "collections_tab_hints = \"sometimes\"\n").unwrap();
        assert!(matches!(Config::load(dir.path()), Err(Error::ParseFailed { .. })));
    }
}
