/// Crate-level error types for bundle-hints diagnostics.
use std::path::PathBuf;

/// All errors in bundle-hints carry enough context to produce a useful
/// diagnostic without a debugger. Each variant names the file, item, key, or
/// reason for failure.
///
/// None of these escape the parser, report builder, or hover controller:
/// those degrade to inline text or default behaviour and log instead.
#[allow(clippy::error_impl_error, reason = "crate-internal error type in binary")]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The configured item catalog does not exist on disk.
    #[error("catalog not found: {}", path.display())]
    CatalogNotFound {
        /// Path to the missing catalog file.
        path: PathBuf,
    },

    /// Two catalog entries share one identifier.
    #[error("duplicate item id in catalog: `{id}`")]
    DuplicateItem {
        /// The identifier declared more than once.
        id: String,
    },

    /// A bundle definition file or directory does not exist on disk.
    #[error("file not found: {}", path.display())]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// A setting value does not have the type the key expects.
    #[error("invalid value `{value}` for `{key}` (expected {expected})")]
    InvalidSetting {
        /// Human-readable description of the accepted values.
        expected: &'static str,
        /// Setting key being assigned.
        key: String,
        /// Rejected value as typed by the user.
        value: String,
    },

    /// A replay script parsed but describes an impossible page.
    #[error("invalid replay script: {reason}")]
    InvalidScript {
        /// What is wrong with the script.
        reason: String,
    },

    /// Underlying I/O error from the filesystem or stdin.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// JSON serialization failed.
    #[error("json: {0}")]
    Json(
        /// The wrapped JSON error.
        #[from]
        serde_json::Error,
    ),

    /// No catalog entry has the given display name.
    #[error("no item found matching name `{name}`")]
    NoItemMatchingName {
        /// Display name that failed reverse lookup.
        name: String,
    },

    /// A data file (catalog, replay script, settings) cannot be parsed.
    #[error("parse failed: {}: {reason}", file.display())]
    ParseFailed {
        /// File that failed to parse.
        file: PathBuf,
        /// Description of the parse failure.
        reason: String,
    },

    /// TOML deserialization failed.
    #[error("toml deserialize: {0}")]
    TomlDe(
        /// The wrapped TOML deserialization error.
        #[from]
        toml::de::Error,
    ),

    /// TOML serialization failed.
    #[error("toml serialize: {0}")]
    TomlSer(
        /// The wrapped TOML serialization error.
        #[from]
        toml::ser::Error,
    ),

    /// The catalog has no entry for an identifier.
    #[error("unknown item id: `{id}`")]
    UnknownItem {
        /// Identifier that has no catalog entry.
        id: String,
    },

    /// `config set` was given a key that is not a known setting.
    #[error("unknown setting: `{key}`")]
    UnknownSetting {
        /// Key that was not recognised.
        key: String,
    },

    /// The filesystem watcher could not be created or attached.
    #[error("watch failed: {reason}")]
    WatchFailed {
        /// Description of the watcher failure.
        reason: String,
    },
}
