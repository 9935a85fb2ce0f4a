//! Format-preserving edits of `.bundlehints.toml`.

use std::path::{Path, PathBuf};

use crate::config::CONFIG_FILE;
use crate::error;
use crate::types::DisplayMode;

/// Every key `config set` accepts, dotted for nested tables.
pub const KNOWN_KEYS: [&str; 5] = [
    "catalog",
    "collections_tab_hints",
    "debug.show_unknown_ids",
    "list_items_in_bundle",
    "show_spoilers",
];

/// Assign one setting in `.bundlehints.toml`, creating the file or the
/// `[debug]` table when needed. Comments and layout are preserved.
///
/// # Errors
///
/// Returns `Error::UnknownSetting` for unknown keys, `Error::InvalidSetting`
/// when the value has the wrong type, `Error::ParseFailed` if the existing
/// file isn't valid TOML, or `Error::Io` if writing fails.
pub fn set(root: &Path, key: &str, value: &str) -> Result<(), error::Error> {
    let item = parse_setting_value(key, value)?;
    let (config_path, mut doc) = read_config_doc(root)?;

    match key.split_once('.') {
        None => doc[key] = item,
        Some((table, field)) => {
            if !doc.contains_key(table) {
                doc[table] = toml_edit::Item::Table(toml_edit::Table::new());
            }
            doc[table][field] = item;
        },
    }

    std::fs::write(&config_path, doc.to_string())?;
    tracing::info!(key, value, path = %config_path.display(), "setting updated");
    return Ok(());
}

/// Validate a value for a key and turn it into a TOML item.
///
/// # Errors
///
/// Returns `Error::UnknownSetting` or `Error::InvalidSetting`.
fn parse_setting_value(key: &str, value: &str) -> Result<toml_edit::Item, error::Error> {
    let invalid = |expected: &'static str| {
        return error::Error::InvalidSetting { expected, key: key.to_string(), value: value.to_string() };
    };

    return match key {
        "catalog" => Ok(toml_edit::value(value)),
        "collections_tab_hints" => DisplayMode::parse(value)
            .map(|mode| return toml_edit::value(mode.as_str()))
            .ok_or_else(|| return invalid("off, unobtained, or all")),
        "debug.show_unknown_ids" | "list_items_in_bundle" | "show_spoilers" => value
            .parse::<bool>()
            .map(toml_edit::value)
            .map_err(|_err| return invalid("true or false")),
        _ => Err(error::Error::UnknownSetting { key: key.to_string() }),
    };
}

/// Parse `.bundlehints.toml` into a format-preserving document.
/// Returns an empty document if the file doesn't exist.
///
/// # Errors
///
/// Returns `Error::Io` on read failure or `Error::ParseFailed` on parse failure.
fn read_config_doc(root: &Path) -> Result<(PathBuf, toml_edit::DocumentMut), error::Error> {
    let config_path = root.join(CONFIG_FILE);
    let content = match std::fs::read_to_string(&config_path) {
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(error::Error::Io(e)),
        Ok(c) => c,
    };

    let doc: toml_edit::DocumentMut = content.parse().map_err(|e: toml_edit::TomlError| {
        return error::Error::ParseFailed { file: config_path.clone(), reason: e.to_string() };
    })?;

    return Ok((config_path, doc));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn set_creates_file_and_nested_table() {
        let dir = tempfile::tempdir().unwrap();
        set(dir.path(), "collections_tab_hints", "2").unwrap();
        set(dir.path(), "debug.show_unknown_ids", "true").unwrap();

        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.collections_tab_hints, DisplayMode::All);
        assert!(config.debug.show_unknown_ids);
    }

    #[test]
    fn set_preserves_comments() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "# spoilers are off for the stream\nshow_spoilers = false\n").unwrap();

        set(dir.path(), "show_spoilers", "true").unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("# spoilers are off for the stream"));
        assert!(content.contains("show_spoilers = true"));
    }

    #[test]
    fn rejects_unknown_keys_and_bad_values() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(set(dir.path(), "colour", "red"), Err(error::Error::UnknownSetting { .. })));
        assert!(matches!(
            set(dir.path(), "show_spoilers", "maybe"),
            Err(error::Error::InvalidSetting { .. })
        ));
        assert!(!dir.path().join(CONFIG_FILE).exists());
    }
}
