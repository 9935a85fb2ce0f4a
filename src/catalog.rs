//! The two external collaborators the core consults: the item catalog and the
//! hint resolver. Both are traits so any host can inject its own; `TomlCatalog`
//! is the data-file implementation the CLI uses.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crate::error::Error;
use crate::types::Quality;

/// Category sentinel for "any egg".
pub const EGG_CATEGORY: &str = "-5";

/// Category sentinel for "any milk".
pub const MILK_CATEGORY: &str = "-6";

/// Display name used when the catalog has no entry for an identifier.
pub const UNKNOWN_ITEM_NAME: &str = "???";

/// Categories the bundle formats can address by a fixed literal name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WellKnownCategory {
    /// `EggCategory` in comma-delimited definitions.
    Egg,
    /// `MilkCategory` in comma-delimited definitions.
    Milk,
}

impl WellKnownCategory {
    /// Match the literal name used in comma-delimited definitions.
    pub fn from_literal(name: &str) -> Option<Self> {
        return match name {
            "EggCategory" => Some(Self::Egg),
            "MilkCategory" => Some(Self::Milk),
            _ => None,
        };
    }
}

/// Maps identifiers to display names and back.
pub trait ItemCatalog {
    /// Identifier of a well-known category.
    fn category_id(&self, category: WellKnownCategory) -> String {
        return match category {
            WellKnownCategory::Egg => EGG_CATEGORY.to_string(),
            WellKnownCategory::Milk => MILK_CATEGORY.to_string(),
        };
    }

    /// Reverse-resolve a display name. `None` when nothing matches.
    fn identifier_of(&self, display_name: &str) -> Option<String>;

    /// Display name for an identifier, optionally as a preserve of `preserve_sub_id`.
    ///
    /// # Errors
    ///
    /// Returns an error when the catalog cannot name the item.
    fn name_of(&self, identifier: &str, preserve_sub_id: Option<&str>) -> Result<String, Error>;
}

/// What the core asks the hint resolver about.
#[derive(Debug, Clone, Copy)]
pub struct HintQuery<'a> {
    /// Category number when the reference means "any item in category N".
    pub category_override: Option<i32>,
    /// Item identifier.
    pub identifier: &'a str,
    /// Preserve sub-identifier, if the item is a preserve.
    pub preserve_sub_id: Option<&'a str>,
    /// Requested quality tier.
    pub quality: Quality,
}

impl<'a> HintQuery<'a> {
    /// Query for a bundle ingredient reference.
    pub fn for_reference(reference: &'a crate::types::ItemReference) -> Self {
        return Self {
            category_override: reference.category_override,
            identifier: &reference.identifier,
            preserve_sub_id: reference.preserve_sub_id.as_deref(),
            quality: reference.quality,
        };
    }

    /// Query for a bare identifier at normal quality.
    pub fn for_identifier(identifier: &'a str) -> Self {
        return Self {
            category_override: None,
            identifier,
            preserve_sub_id: None,
            quality: Quality::Normal,
        };
    }
}

/// Produces "where to get it" text for items.
pub trait HintResolver {
    /// Hint text for the query. An empty string means no hint is defined.
    ///
    /// # Errors
    ///
    /// Returns an error when the resolver itself fails, as opposed to simply
    /// having no hint.
    fn hint_for(&self, query: &HintQuery<'_>) -> Result<String, Error>;
}

/// Switches that govern hint resolution but are owned by the host config.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HintSettings {
    /// Prefer the spoiler variant of a hint when one exists.
    pub show_spoilers: bool,
    /// Debug override: answer `??? [id]` instead of nothing for unknown items.
    pub show_unknown_ids: bool,
}

/// One `[[item]]` table of the catalog file.
#[derive(Debug, Clone, serde::Deserialize)]
struct CatalogEntry {
    #[serde(default)]
    hint: String,
    id: String,
    name: String,
    #[serde(default)]
    preserve_hints: BTreeMap<String, String>,
    #[serde(default)]
    preserve_name: Option<String>,
    #[serde(default)]
    quality_hints: BTreeMap<String, String>,
    #[serde(default)]
    spoiler_hint: Option<String>,
}

/// Raw TOML structure of a catalog file.
#[derive(serde::Deserialize)]
struct CatalogFile {
    #[serde(default)]
    item: Vec<CatalogEntry>,
}

/// Catalog and hint resolver backed by a TOML data file.
pub struct TomlCatalog {
    by_id: HashMap<String, CatalogEntry>,
    by_name: HashMap<String, String>,
    settings: HintSettings,
}

impl TomlCatalog {
    /// True when the catalog has no entries.
    pub fn is_empty(&self) -> bool {
        return self.by_id.is_empty();
    }

    /// Number of entries, categories included.
    pub fn len(&self) -> usize {
        return self.by_id.len();
    }

    /// Read a catalog file from disk.
    ///
    /// # Errors
    ///
    /// Returns `Error::CatalogNotFound` if the file doesn't exist, `Error::Io`
    /// for other read failures, and the errors of `TomlCatalog::parse`.
    pub fn load(path: &Path, settings: HintSettings) -> Result<Self, Error> {
        let content = match std::fs::read_to_string(path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::CatalogNotFound { path: path.to_path_buf() });
            },
            Err(e) => return Err(Error::Io(e)),
            Ok(c) => c,
        };
        let catalog = Self::parse(&content).map_err(|e| {
            return match e {
                Error::TomlDe(de) => Error::ParseFailed {
                    file: path.to_path_buf(),
                    reason: de.to_string(),
                },
                other => other,
            };
        })?;
        tracing::debug!(path = %path.display(), items = catalog.len(), "loaded catalog");
        return Ok(catalog.with_settings(settings));
    }

    /// Parse catalog TOML content with default hint settings.
    ///
    /// # Errors
    ///
    /// Returns `Error::TomlDe` for malformed TOML and `Error::DuplicateItem`
    /// when two entries share an id.
    pub fn parse(content: &str) -> Result<Self, Error> {
        let file: CatalogFile = toml::from_str(content)?;
        let mut by_id = HashMap::with_capacity(file.item.len());
        let mut by_name = HashMap::with_capacity(file.item.len());

        for entry in file.item {
            if by_id.contains_key(&entry.id) {
                return Err(Error::DuplicateItem { id: entry.id });
            }
            // First declaration wins when two items share a display name.
            by_name.entry(entry.name.clone()).or_insert_with(|| return entry.id.clone());
            by_id.insert(entry.id.clone(), entry);
        }

        return Ok(Self { by_id, by_name, settings: HintSettings::default() });
    }

    /// Replace the hint settings.
    #[must_use]
    pub fn with_settings(mut self, settings: HintSettings) -> Self {
        self.settings = settings;
        return self;
    }
}

impl ItemCatalog for TomlCatalog {
    fn identifier_of(&self, display_name: &str) -> Option<String> {
        return self.by_name.get(display_name).cloned();
    }

    fn name_of(&self, identifier: &str, preserve_sub_id: Option<&str>) -> Result<String, Error> {
        let entry = self
            .by_id
            .get(identifier)
            .ok_or_else(|| return Error::UnknownItem { id: identifier.to_string() })?;

        let (Some(sub_id), Some(template)) = (preserve_sub_id, entry.preserve_name.as_deref()) else {
            return Ok(entry.name.clone());
        };
        let sub_name = self.name_of(sub_id, None)?;
        return Ok(template.replace("{}", &sub_name));
    }
}

impl HintResolver for TomlCatalog {
    fn hint_for(&self, query: &HintQuery<'_>) -> Result<String, Error> {
        let key = query
            .category_override
            .map_or_else(|| return query.identifier.to_string(), |c| return c.to_string());

        let Some(entry) = self.by_id.get(&key) else {
            if self.settings.show_unknown_ids {
                return Ok(format!("{UNKNOWN_ITEM_NAME} [{key}]"));
            }
            return Ok(String::new());
        };

        if let Some(text) = entry.quality_hints.get(query.quality.name()) {
            return Ok(text.clone());
        }
        if let Some(text) =
            query.preserve_sub_id.and_then(|sub_id| return entry.preserve_hints.get(sub_id))
        {
            return Ok(text.clone());
        }
        if self.settings.show_spoilers
            && let Some(spoiler) = &entry.spoiler_hint
        {
            return Ok(spoiler.clone());
        }
        if entry.hint.is_empty() && self.settings.show_unknown_ids {
            return Ok(format!("{UNKNOWN_ITEM_NAME} [{key}]"));
        }
        return Ok(entry.hint.clone());
    }
}
