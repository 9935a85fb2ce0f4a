//! CLI commands for bundle-hints: report, hint, replay, config.

use std::io::Read as _;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::catalog::{HintQuery, HintResolver as _, HintSettings, ItemCatalog as _, TomlCatalog, WellKnownCategory};
use crate::config::Config;
use crate::error;
use crate::parser;
use crate::replay::{self, ReplayScript};
use crate::report::{self, ReportOptions};
use crate::settings;
use crate::types::{ItemReference, Quality};

/// Extensions read when a report is pointed at a directory.
const DEFINITION_EXTENSIONS: [&str; 2] = ["json", "txt"];

/// How command output is printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Machine-readable JSON.
    Json,
    /// Plain text.
    #[default]
    Text,
}

/// Everything `report` needs, gathered from flags and config.
#[derive(Debug, Clone)]
pub struct ReportRequest {
    /// Catalog path overriding the config.
    pub catalog: Option<PathBuf>,
    /// Output format.
    pub format: OutputFormat,
    /// Force the `<Items in Bundle>` blocks on.
    pub list_items: bool,
    /// Definitions file or directory; stdin when absent.
    pub path: Option<PathBuf>,
}

/// Show the effective configuration as TOML.
///
/// # Errors
///
/// Returns errors from config loading or TOML serialization.
pub fn config_show() -> Result<(), error::Error> {
    let config = Config::load(Path::new("."))?;
    print!("{}", toml::to_string_pretty(&config)?);
    return Ok(());
}

/// Assign one setting in `.bundlehints.toml`.
///
/// # Errors
///
/// Returns errors from key/value validation or file I/O.
pub fn config_set(key: &str, value: &str) -> Result<(), error::Error> {
    settings::set(Path::new("."), key, value)?;
    eprintln!("Set {key} = {value}");
    return Ok(());
}

/// Resolve one item by display name or `<id>` and print its hint.
///
/// # Errors
///
/// Returns `Error::NoItemMatchingName` if the name matches nothing, or
/// errors from config/catalog loading and lookup.
pub fn hint(item: &str, quality: u8, catalog_path: Option<&Path>) -> Result<(), error::Error> {
    let config = Config::load(Path::new("."))?;
    let catalog = load_catalog(&config, catalog_path, config.hint_settings())?;

    let identifier = if let Some(direct) = item.strip_prefix('<').and_then(|i| return i.strip_suffix('>')) {
        direct.to_string()
    } else if let Some(category) = WellKnownCategory::from_literal(item) {
        catalog.category_id(category)
    } else {
        catalog
            .identifier_of(item)
            .ok_or_else(|| return error::Error::NoItemMatchingName { name: item.to_string() })?
    };

    let reference = ItemReference::new(&identifier, Quality::from_tier(quality).unwrap_or_default())
        .ok_or_else(|| return error::Error::NoItemMatchingName { name: item.to_string() })?;
    let name = catalog.name_of(&reference.identifier, None)?;
    let text = catalog.hint_for(&HintQuery::for_reference(&reference))?;

    println!("{name} [{}]", reference.identifier);
    if text.is_empty() {
        println!("(no hint)");
    } else {
        println!("{text}");
    }
    return Ok(());
}

/// Load the item catalog named by the config, or by an explicit override.
///
/// # Errors
///
/// Returns `Error::CatalogNotFound` or catalog parse errors.
fn load_catalog(config: &Config, override_path: Option<&Path>, settings: HintSettings) -> Result<TomlCatalog, error::Error> {
    let path = override_path.unwrap_or(&config.catalog);
    let catalog = TomlCatalog::load(path, settings)?;
    if catalog.is_empty() {
        tracing::warn!(path = %path.display(), "catalog has no items; every ingredient will be unresolved");
    }
    return Ok(catalog);
}

/// Read bundle definitions from a file, every definition file under a
/// directory (sorted by path), or stdin.
///
/// # Errors
///
/// Returns `Error::FileNotFound` if the path doesn't exist, or `Error::Io`.
fn read_definitions(path: Option<&Path>) -> Result<String, error::Error> {
    let Some(path) = path else {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    };

    if !path.exists() {
        return Err(error::Error::FileNotFound { path: path.to_path_buf() });
    }
    if path.is_file() {
        return Ok(std::fs::read_to_string(path)?);
    }

    let mut texts = Vec::new();
    for entry in WalkDir::new(path)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| {
            return e.file_type().is_file()
                && e.path()
                    .extension()
                    .and_then(|ext| return ext.to_str())
                    .is_some_and(|ext| return DEFINITION_EXTENSIONS.contains(&ext));
        })
    {
        tracing::debug!(file = %entry.path().display(), "reading definitions");
        texts.push(std::fs::read_to_string(entry.path())?);
    }
    return Ok(texts.join("\n"));
}

/// Run a replay script and print its transcript.
///
/// # Errors
///
/// Returns errors from config/catalog loading, script parsing, or JSON output.
pub fn replay(script_path: &Path, format: OutputFormat) -> Result<(), error::Error> {
    let config = Config::load(Path::new("."))?;
    let catalog = load_catalog(&config, None, config.hint_settings())?;
    let script = ReplayScript::load(script_path)?;
    let steps = script.run(&catalog, config.collections_tab_hints)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&steps)?),
        OutputFormat::Text => print!("{}", replay::render_transcript(&steps)),
    }
    return Ok(());
}

/// Parse bundle definitions, resolve hints, and print the report.
///
/// Missing hints are reported as errors, so the unknown-id debug override is
/// forced off for the run.
///
/// # Errors
///
/// Returns errors from config/catalog loading, reading the definitions, or
/// JSON output. Problems inside the definitions never error.
pub fn report(request: &ReportRequest) -> Result<(), error::Error> {
    let config = Config::load(Path::new("."))?;
    let settings = HintSettings { show_unknown_ids: false, ..config.hint_settings() };
    let catalog = load_catalog(&config, request.catalog.as_deref(), settings)?;
    let raw = read_definitions(request.path.as_deref())?;

    let lines = parser::parse(&raw, &catalog);
    let options = ReportOptions { list_items_in_bundle: request.list_items || config.list_items_in_bundle };
    let built = report::build(&lines, &catalog, options);
    let summary = built.summary();

    match request.format {
        OutputFormat::Json => {
            let json = serde_json::json!({ "blocks": built.blocks, "summary": summary });
            println!("{}", serde_json::to_string_pretty(&json)?);
        },
        OutputFormat::Text => print!("{}", built.render()),
    }

    tracing::info!(
        bundles = summary.bundles,
        hinted = summary.hinted,
        missing = summary.missing,
        unresolved = summary.unresolved,
        "report complete"
    );
    if summary.has_errors() {
        eprintln!(
            "{} bundles: {} missing hints, {} unresolved names",
            summary.bundles, summary.missing, summary.unresolved
        );
    } else {
        eprintln!("{} bundles, all {} items hinted", summary.bundles, summary.hinted);
    }
    return Ok(());
}
