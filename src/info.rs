use std::path::PathBuf;

use serde::Serialize;

use crate::catalog::TomlCatalog;
use crate::config::{self, CONFIG_FILE};
use crate::settings::KNOWN_KEYS;

/// What `info` reports about the working directory.
struct CurrentState {
    /// Item count when the catalog loads.
    catalog_items: Option<usize>,
    /// Catalog path from the config.
    catalog_path: String,
    /// Whether `.bundlehints.toml` exists.
    config_found: bool,
    /// Collections-tab display mode in effect.
    display_mode: &'static str,
}

/// One bundle definition format, for the JSON document.
#[derive(Serialize)]
struct FormatInfo {
    /// Sample definition value.
    example: String,
    /// Format name.
    name: String,
}

/// The `info --json` document.
#[derive(Serialize)]
struct InfoJson {
    /// State of the working directory.
    current_state: StateJson,
    /// Accepted definition formats.
    formats: Vec<FormatInfo>,
    /// Keys accepted by `config set`.
    settings: Vec<String>,
    /// Crate version.
    version: String,
}

/// JSON view of [`CurrentState`].
#[derive(Serialize)]
struct StateJson {
    /// Item count when the catalog loads.
    catalog_items: Option<usize>,
    /// Catalog path from the config.
    catalog_path: String,
    /// Collections-tab display mode in effect.
    collections_tab_hints: String,
    /// Whether `.bundlehints.toml` exists.
    config_found: bool,
}

/// Output the bundle-hints reference document.
pub fn run(json: bool) {
    let root = PathBuf::from(".");
    let state = gather_state(&root);

    if json {
        print_json(&state);
    } else {
        print_markdown(&state);
    }
}

// ── State gathering ───────────────────────────────────────────────────

/// Inspect config and catalog without failing on either.
fn gather_state(root: &std::path::Path) -> CurrentState {
    let config_found = root.join(CONFIG_FILE).exists();
    let config = config::Config::load(root).unwrap_or_default();
    let catalog_items = TomlCatalog::load(&config.catalog, config.hint_settings())
        .ok()
        .map(|c| return c.len());

    return CurrentState {
        catalog_items,
        catalog_path: config.catalog.display().to_string(),
        config_found,
        display_mode: config.collections_tab_hints.as_str(),
    };
}

// ── Markdown output ───────────────────────────────────────────────────

/// Print the markdown reference followed by the current state.
fn print_markdown(state: &CurrentState) {
    let version = env!("CARGO_PKG_VERSION");
    print_markdown_header(version);
    print_markdown_state(state);
}

/// Print the static part of the reference.
fn print_markdown_header(version: &str) {
    print!(
        "\
# bundle-hints {version}

Resolve \"where to get it\" hints for community-center bundle ingredients and
report every ingredient that has none.

## Bundle Definition Lines

    \"Pantry/0\": \"Spring Crops/O 465 20/24 1 0 188 1 0/0/4\"          slash-delimited
    \"Pantry/1\": \"1 Parsnip, 5 GQ Pumpkin, [1 <176>|1 EggCategory]\"   comma-delimited
    // comment                                                    echoed into the report

Comma-delimited entries accept `SQ`/`GQ`/`IQ` quality markers, `[A|B]`
alternatives, `<id>` direct ids, and the `EggCategory`/`MilkCategory` literals.

## Commands

    bundle-hints report [PATH]            Parse definitions and list hints
    bundle-hints report PATH --watch      Re-run the report on every change
    bundle-hints hint <ITEM>              Hint for one item name or <id>
    bundle-hints replay <SCRIPT>          Replay hover/toggle events
    bundle-hints config show              Print the effective settings
    bundle-hints config set KEY VALUE     Edit {CONFIG_FILE}

## Settings ({CONFIG_FILE})

"
    );
    for key in KNOWN_KEYS {
        println!("    {key}");
    }
    print!(
        "\

## Current State

"
    );
}

/// Print config and catalog status lines.
fn print_markdown_state(state: &CurrentState) {
    if state.config_found {
        println!("Config:   {CONFIG_FILE} (found)");
    } else {
        println!("Config:   {CONFIG_FILE} (not found, using defaults)");
    }

    match state.catalog_items {
        Some(n) => println!("Catalog:  {} ({n} items)", state.catalog_path),
        None => println!("Catalog:  {} (not loaded)", state.catalog_path),
    }

    println!("Collections tab hints: {}", state.display_mode);
}

// ── JSON output ───────────────────────────────────────────────────────

/// Print the reference and state as one JSON document.
fn print_json(state: &CurrentState) {
    let info = InfoJson {
        current_state: StateJson {
            catalog_items: state.catalog_items,
            catalog_path: state.catalog_path.clone(),
            collections_tab_hints: state.display_mode.to_string(),
            config_found: state.config_found,
        },
        formats: vec![
            FormatInfo {
                example: "Spring Crops/O 465 20/24 1 0 188 1 0/0/4".to_string(),
                name: "slash-delimited".to_string(),
            },
            FormatInfo {
                example: "1 Parsnip, 5 GQ Pumpkin, [1 <176>|1 EggCategory]".to_string(),
                name: "comma-delimited".to_string(),
            },
        ],
        settings: KNOWN_KEYS.iter().map(|k| return (*k).to_string()).collect(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    // serde_json::to_string_pretty won't fail on this structure.
    let json = serde_json::to_string_pretty(&info).unwrap_or_default();
    println!("{json}");
}
