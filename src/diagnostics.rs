use crate::error::Error;
use crate::settings::KNOWN_KEYS;

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Render an error as valid markdown with bold headings and print to stderr.
pub fn print_error(e: &Error) {
    let md = render_error(e);
    for line in md.lines() {
        if line.starts_with('#') {
            eprintln!("{BOLD}{line}{RESET}");
        } else {
            eprintln!("{line}");
        }
    }
}

/// Render an error as a structured markdown diagnostic.
///
/// Each variant produces a block with what happened and, where the user can
/// do something about it, how to fix it.
pub fn render_error(e: &Error) -> String {
    return match e {
        Error::CatalogNotFound { path } => render_catalog_not_found(&path.display().to_string()),
        Error::DuplicateItem { id } => render_duplicate_item(id),
        Error::InvalidSetting { expected, key, value } => render_invalid_setting(key, value, expected),
        Error::NoItemMatchingName { name } => render_no_item_matching_name(name),
        Error::UnknownSetting { key } => render_unknown_setting(key),
        _ => render_generic(e),
    };
}

/// Render variants that need no arguments beyond the error itself.
fn render_generic(e: &Error) -> String {
    return match e {
        Error::FileNotFound { path } => format!("\
# Error: File Not Found

`{}` does not exist.
", path.display()),

        Error::InvalidScript { reason } => format!("\
# Error: Invalid Replay Script

{reason}
"),

        Error::ParseFailed { file, reason } => format!("\
# Error: Parse Failed

Could not parse `{}`: {reason}
", file.display()),

        Error::UnknownItem { id } => format!("\
# Error: Unknown Item

The catalog has no entry for id `{id}`.

## Fix

Add an `[[item]]` with `id = \"{id}\"` to the catalog.
"),

        Error::WatchFailed { reason } => format!("\
# Error: Watch Failed

{reason}
"),

        Error::Io(e) => format!("\
# Error: I/O

{e}
"),
        Error::Json(e) => format!("\
# Error: JSON Serialization

{e}
"),
        Error::TomlDe(e) => format!("\
# Error: Invalid TOML

{e}
"),
        Error::TomlSer(e) => format!("\
# Error: TOML Serialization

{e}
"),
        // Already handled in render_error, but need exhaustive match.
        _ => format!("\
# Error

{e}
"),
    };
}

/// Missing catalog, with a sample entry.
fn render_catalog_not_found(path: &str) -> String {
    return format!("\
# Error: Catalog Not Found

`{path}` does not exist.

## Fix

Create the catalog, one `[[item]]` table per item:

    [[item]]
    id = \"24\"
    name = \"Parsnip\"
    hint = \"Grown from Parsnip Seeds in spring.\"

Or point the config at an existing file:

    bundle-hints config set catalog path/to/catalog.toml
");
}

/// Catalog id declared twice.
fn render_duplicate_item(id: &str) -> String {
    return format!("\
# Error: Duplicate Item

Catalog id `{id}` is declared more than once.

## Fix

Merge the two `[[item]]` tables for `{id}` into one.
");
}

/// Setting value of the wrong type.
fn render_invalid_setting(key: &str, value: &str, expected: &str) -> String {
    return format!("\
# Error: Invalid Setting

`{value}` is not a valid value for `{key}`.

## Expected

{expected}
");
}

/// Failed reverse lookup from `hint`.
fn render_no_item_matching_name(name: &str) -> String {
    return format!("\
# Error: No Item Matching Name

No catalog entry is named `{name}`. Names match exactly, including case.

## Fix

Use the catalog name, or address the item by id:

    bundle-hints hint \"<24>\"
");
}

/// Unknown `config set` key, listing the known ones.
fn render_unknown_setting(key: &str) -> String {
    let keys = KNOWN_KEYS.iter().map(|k| return format!("- `{k}`")).collect::<Vec<_>>().join("\n");
    return format!("\
# Error: Unknown Setting

`{key}` is not a setting.

## Known settings

{keys}
");
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn catalog_not_found_suggests_config_set() {
        let md = render_error(&Error::CatalogNotFound { path: PathBuf::from("missing.toml") });
        assert!(md.starts_with("# Error: Catalog Not Found"));
        assert!(md.contains("`missing.toml` does not exist."));
        assert!(md.contains("bundle-hints config set catalog"));
    }

    #[test]
    fn unknown_setting_lists_known_keys() {
        let md = render_error(&Error::UnknownSetting { key: "colour".to_string() });
        assert!(md.contains("`colour` is not a setting."));
        assert!(md.contains("- `debug.show_unknown_ids`"));
    }

    #[test]
    fn generic_errors_have_a_heading() {
        let md = render_error(&Error::WatchFailed { reason: "inotify limit reached".to_string() });
        assert_eq!(md, "# Error: Watch Failed\n\ninotify limit reached\n");
    }
}
