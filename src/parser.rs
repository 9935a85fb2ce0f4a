//! Bundle definition parsing for both supported encodings.
//!
//! A definitions file is processed line by line. Each line is a comment, a
//! `"key": "value"` pair whose value holds one bundle definition, or noise.
//! Values are either slash-delimited (ingredient ids in field 2 as
//! `id quantity quality` triples) or comma-delimited (`quantity [SQ|GQ|IQ] Name`
//! entries, with `[A|B]` alternative groups).

use std::collections::HashSet;

use regex::Regex;
use serde::Serialize;

use crate::catalog::{ItemCatalog, UNKNOWN_ITEM_NAME, WellKnownCategory};
use crate::types::{BundleDefinition, ItemReference, Quality};

/// What every double-brace asset reference is normalized to.
pub const PLACEHOLDER: &str = "{{}}";

/// Prefix that marks a line as a comment to pass through.
const COMMENT_MARKER: &str = "//";

/// Which encoding a bundle definition value uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BundleFormat {
    /// `Name, Name, [Alt|Alt]` entries with quantities and quality markers.
    CommaDelimited,
    /// `name/reward/id qty quality id qty quality/...` fields.
    SlashDelimited,
}

impl BundleFormat {
    /// Slash-delimited when the value has at least three `/` fields.
    pub fn detect(definition: &str) -> Self {
        if definition.split('/').count() >= 3 {
            return Self::SlashDelimited;
        }
        return Self::CommaDelimited;
    }
}

/// One ingredient as it appeared in the definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IngredientEntry {
    /// Resolved to a catalog identifier.
    Resolved {
        /// Name to show in reports.
        display_name: String,
        /// The identifier was already seen earlier in this parse pass.
        duplicate: bool,
        /// The resolved reference.
        reference: ItemReference,
    },
    /// The name could not be reverse-resolved to an identifier.
    Unresolved {
        /// Name as written, after quantity and quality stripping.
        name: String,
    },
}

/// One bundle definition line after parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedBundle {
    /// Captured value with placeholders normalized.
    pub definition_text: String,
    /// Ingredients in declaration order, alternatives expanded.
    pub entries: Vec<IngredientEntry>,
    /// Encoding the value was read as.
    pub format: BundleFormat,
}

impl ParsedBundle {
    /// The resolved references, in declaration order, duplicates included.
    pub fn definition(&self) -> BundleDefinition {
        let ingredients = self
            .entries
            .iter()
            .filter_map(|entry| {
                return match entry {
                    IngredientEntry::Resolved { reference, .. } => Some(reference.clone()),
                    IngredientEntry::Unresolved { .. } => None,
                };
            })
            .collect();
        return BundleDefinition { ingredients };
    }

    /// Display names of every resolved ingredient, duplicates included.
    pub fn listed_names(&self) -> Vec<&str> {
        return self
            .entries
            .iter()
            .filter_map(|entry| {
                return match entry {
                    IngredientEntry::Resolved { display_name, .. } => Some(display_name.as_str()),
                    IngredientEntry::Unresolved { .. } => None,
                };
            })
            .collect();
    }
}

/// Classification of a single input line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LineOutcome {
    /// A bundle definition.
    Bundle(ParsedBundle),
    /// A comment line, kept verbatim.
    Comment {
        /// The comment text, marker included.
        text: String,
    },
    /// Anything else; silently ignored.
    Unparsed,
}

/// An input line together with what it parsed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedLine {
    /// What the line parsed to.
    pub outcome: LineOutcome,
    /// The line as read, carriage returns removed.
    pub source: String,
}

/// Parse every line of `raw` in one pass.
///
/// Deduplication state lives only for the duration of this call, so repeated
/// calls over the same text produce identical results.
pub fn parse<C: ItemCatalog + ?Sized>(raw: &str, catalog: &C) -> Vec<ParsedLine> {
    let mut parser = BundleParser::new(catalog);
    return raw
        .split('\n')
        .map(|line| {
            let source = line.replace('\r', "");
            let outcome = parser.parse_line(&source);
            return ParsedLine { outcome, source };
        })
        .collect();
}

/// Line parser holding the per-pass deduplication set.
pub struct BundleParser<'c, C: ?Sized> {
    catalog: &'c C,
    definition_pattern: Regex,
    placeholder_pattern: Regex,
    seen: HashSet<String>,
}

impl<'c, C: ItemCatalog + ?Sized> BundleParser<'c, C> {
    /// Create a parser with an empty deduplication set.
    ///
    /// # Panics
    ///
    /// Panics if the hardcoded line patterns are invalid (compile-time invariant).
    #[allow(clippy::expect_used, reason = "hardcoded regex literals")]
    pub fn new(catalog: &'c C) -> Self {
        return Self {
            catalog,
            definition_pattern: Regex::new(r#""[^"]*":[ ]*"([^"]*)""#).expect("valid regex"),
            placeholder_pattern: Regex::new(r"\{\{[^}]*\}\}").expect("valid regex"),
            seen: HashSet::new(),
        };
    }

    /// Classify and parse one line. Carriage returns should already be stripped.
    pub fn parse_line(&mut self, line: &str) -> LineOutcome {
        if line.starts_with(COMMENT_MARKER) {
            return LineOutcome::Comment { text: line.to_string() };
        }
        let Some(captured) = self.definition_pattern.captures(line).and_then(|c| return c.get(1)) else {
            return LineOutcome::Unparsed;
        };

        let definition_text = self
            .placeholder_pattern
            .replace_all(captured.as_str(), PLACEHOLDER)
            .into_owned();
        let format = BundleFormat::detect(&definition_text);
        let entries = match format {
            BundleFormat::CommaDelimited => self.parse_comma_delimited(&definition_text),
            BundleFormat::SlashDelimited => self.parse_slash_delimited(&definition_text),
        };

        return LineOutcome::Bundle(ParsedBundle { definition_text, entries, format });
    }

    /// Read field 2 of a slash-delimited value as `id quantity quality` triples.
    fn parse_slash_delimited(&mut self, definition: &str) -> Vec<IngredientEntry> {
        let ingredient_field = definition.split('/').nth(2).unwrap_or("");
        let tokens: Vec<&str> = ingredient_field.split_whitespace().collect();
        let mut entries = Vec::with_capacity(tokens.len() / 3);

        for triple in tokens.chunks(3) {
            let Some(&identifier) = triple.first() else {
                continue;
            };
            if identifier == PLACEHOLDER {
                continue;
            }
            let quality = triple
                .get(2)
                .and_then(|t| return t.parse::<u8>().ok())
                .and_then(Quality::from_tier)
                .unwrap_or_default();
            let Some(reference) = ItemReference::new(identifier, quality) else {
                continue;
            };
            let display_name = self.display_name_or_unknown(identifier);
            entries.push(self.resolved(reference, display_name));
        }

        return entries;
    }

    /// Read a comma-delimited value, expanding `[A|B]` groups into separate entries.
    fn parse_comma_delimited(&mut self, definition: &str) -> Vec<IngredientEntry> {
        let mut entries = Vec::new();
        for item_entry in expand_alternatives(definition) {
            let (quality, name) = strip_quantity_and_quality(item_entry);
            entries.push(self.resolve_named_entry(name, quality));
        }
        return entries;
    }

    /// Turn a comma-format item name into a reference, or an unresolved entry.
    fn resolve_named_entry(&mut self, name: &str, quality: Quality) -> IngredientEntry {
        let (identifier, display_name) =
            if let Some(direct) = name.strip_prefix('<').and_then(|n| return n.strip_suffix('>')) {
                (Some(direct.to_string()), self.display_name_or_unknown(direct))
            } else if let Some(category) = WellKnownCategory::from_literal(name) {
                let id = self.catalog.category_id(category);
                let display = self.catalog.name_of(&id, None).unwrap_or_else(|_| return name.to_string());
                (Some(id), display)
            } else {
                (self.catalog.identifier_of(name), name.to_string())
            };

        let Some(reference) = identifier.as_deref().and_then(|id| return ItemReference::new(id, quality)) else {
            tracing::debug!(name, "no item found matching name");
            return IngredientEntry::Unresolved { name: name.to_string() };
        };
        return self.resolved(reference, display_name);
    }

    /// Build a resolved entry, recording the identifier in the seen set.
    fn resolved(&mut self, reference: ItemReference, display_name: String) -> IngredientEntry {
        let duplicate = !self.seen.insert(reference.identifier.clone());
        return IngredientEntry::Resolved { display_name, duplicate, reference };
    }

    /// Catalog name for an identifier, or `???` when the catalog can't name it.
    fn display_name_or_unknown(&self, identifier: &str) -> String {
        return match self.catalog.name_of(identifier, None) {
            Err(e) => {
                tracing::debug!(identifier, error = %e, "item has no display name");
                UNKNOWN_ITEM_NAME.to_string()
            },
            Ok(name) => name,
        };
    }
}

/// Split on `, ` and expand every `[A|B|...]` group into its alternatives.
fn expand_alternatives(definition: &str) -> Vec<&str> {
    let mut expanded = Vec::new();
    for entry in definition.split(", ").map(str::trim) {
        if let Some(group) = entry.strip_prefix('[') {
            let group = group.strip_suffix(']').unwrap_or(group);
            expanded.extend(group.split('|').map(str::trim).filter(|alt| return !alt.is_empty()));
        } else if !entry.is_empty() {
            expanded.push(entry);
        }
    }
    return expanded;
}

/// Drop the leading quantity token, then a two-letter quality marker if present.
fn strip_quantity_and_quality(entry: &str) -> (Quality, &str) {
    let name = entry.split_once(' ').map_or(entry, |(_, rest)| return rest);
    if let Some((marker, rest)) = name.split_once(' ')
        && let Some(quality) = Quality::from_marker(marker)
    {
        return (quality, rest);
    }
    return (Quality::Normal, name);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::TomlCatalog;

    const CATALOG: &str = r#"
[[item]]
id = "388"
name = "Wood"

[[item]]
id = "24"
name = "Parsnip"

[[item]]
id = "176"
name = "Egg"

[[item]]
id = "442"
name = "Duck Egg"

[[item]]
id = "590"
name = "Ancient Doll"

[[item]]
id = "709"
name = "Hardwood"

[[item]]
id = "-5"
name = "Egg (Any)"
"#;

    fn catalog() -> TomlCatalog {
        return TomlCatalog::parse(CATALOG).unwrap();
    }

    fn only_bundle(raw: &str) -> ParsedBundle {
        let c = catalog();
        let mut bundles: Vec<ParsedBundle> = parse(raw, &c)
            .into_iter()
            .filter_map(|line| {
                return match line.outcome {
                    LineOutcome::Bundle(b) => Some(b),
                    _ => None,
                };
            })
            .collect();
        assert_eq!(bundles.len(), 1);
        return bundles.remove(0);
    }

    #[test]
    fn slash_format_reads_field_two_as_triples() {
        let bundle = only_bundle(r#""B":"  168 0 24ob 1a 1/ /590 1 0 709 1 2/F 3500/""#);
        assert_eq!(bundle.format, BundleFormat::SlashDelimited);

        let refs = bundle.definition().ingredients;
        let ids: Vec<&str> = refs.iter().map(|r| return r.identifier.as_str()).collect();
        assert_eq!(ids, ["590", "709"]);
        assert_eq!(refs[1].quality, Quality::Gold);
        assert_eq!(bundle.listed_names(), ["Ancient Doll", "Hardwood"]);
    }

    #[test]
    fn slash_format_quality_defaults_to_normal() {
        let bundle = only_bundle(r#""Pantry/0": "Spring/O 465 20/24 1 x 388 5/0""#);
        let refs = bundle.definition().ingredients;
        assert_eq!(refs.len(), 2);
        assert!(refs.iter().all(|r| return r.quality == Quality::Normal));
    }

    #[test]
    fn slash_format_skips_placeholders() {
        let bundle = only_bundle(r#""Mod/0": "Mod/O 1 1/{{ModId}}/Thing 1 0 24 1 1/0""#);
        // `{{ModId}}/Thing` normalizes to `{{}}/Thing`, so field 2 is the placeholder.
        assert!(bundle.definition_text.contains(PLACEHOLDER));
        assert!(bundle.entries.is_empty());

        let bundle = only_bundle(r#""Mod/1": "Mod/O 1 1/{{ModId.Item}} 1 0 24 1 1/0""#);
        let refs = bundle.definition().ingredients;
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].identifier, "24");
        assert_eq!(refs[0].quality, Quality::Silver);
    }

    #[test]
    fn slash_format_negative_ids_are_categories() {
        let bundle = only_bundle(r#""Animal/0": "Animal/O 1 1/-5 1 0/0""#);
        let refs = bundle.definition().ingredients;
        assert_eq!(refs[0].category_override, Some(-5));
        assert_eq!(bundle.listed_names(), ["Egg (Any)"]);
    }

    #[test]
    fn comma_format_strips_quantities_and_quality_markers() {
        let bundle = only_bundle(r#""Items": "3 Wood, 1 SQ Parsnip, [1 Egg|1 Duck Egg]""#);
        assert_eq!(bundle.format, BundleFormat::CommaDelimited);

        let refs = bundle.definition().ingredients;
        let got: Vec<(&str, Quality)> =
            refs.iter().map(|r| return (r.identifier.as_str(), r.quality)).collect();
        assert_eq!(
            got,
            [("388", Quality::Normal), ("24", Quality::Silver), ("176", Quality::Normal), ("442", Quality::Normal)]
        );
        assert_eq!(bundle.listed_names(), ["Wood", "Parsnip", "Egg", "Duck Egg"]);
    }

    #[test]
    fn keyless_line_is_not_a_bundle() {
        let c = catalog();
        let lines = parse(r#""Spring/O 465 20/24 1 x 388 5/0""#, &c);
        assert_eq!(lines[0].outcome, LineOutcome::Unparsed);
    }

    #[test]
    fn slash_format_unknown_ids_are_named_unknown() {
        let bundle = only_bundle(r#""Pantry/3": "Odd/O 1 1/999 1 0 388 1 0/0""#);
        let refs = bundle.definition().ingredients;
        assert_eq!(refs[0].identifier, "999");
        assert_eq!(bundle.listed_names(), [UNKNOWN_ITEM_NAME, "Wood"]);
    }

    #[test]
    fn alternative_group_after_extra_space_still_expands() {
        let bundle = only_bundle(r#""Items": "3 Wood,  [1 Egg|1 Duck Egg]""#);
        assert_eq!(bundle.listed_names(), ["Wood", "Egg", "Duck Egg"]);
        assert!(!bundle.entries.iter().any(|e| return matches!(e, IngredientEntry::Unresolved { .. })));
    }

    #[test]
    fn comma_format_alternative_group_expands_to_each_item() {
        let bundle = only_bundle(r#""A": "[1 Egg|5 GQ Duck Egg]""#);
        let refs = bundle.definition().ingredients;
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[1].quality, Quality::Gold);
    }

    #[test]
    fn comma_format_direct_ids_and_category_literals() {
        let bundle = only_bundle(r#""A": "1 <709>, 2 EggCategory""#);
        let refs = bundle.definition().ingredients;
        assert_eq!(refs[0].identifier, "709");
        assert_eq!(refs[1].identifier, "-5");
        assert_eq!(refs[1].category_override, Some(-5));
        assert_eq!(bundle.listed_names(), ["Hardwood", "Egg (Any)"]);
    }

    #[test]
    fn unresolved_names_do_not_stop_the_line() {
        let bundle = only_bundle(r#""A": "1 Frobnicator, 2 Wood""#);
        assert_eq!(
            bundle.entries[0],
            IngredientEntry::Unresolved { name: "Frobnicator".to_string() }
        );
        assert_eq!(bundle.definition().ingredients.len(), 1);
        assert_eq!(bundle.listed_names(), ["Wood"]);
    }

    #[test]
    fn duplicates_are_flagged_across_lines() {
        let c = catalog();
        let lines = parse("\"A\": \"1 Wood, 1 Wood\"\n\"B\": \"Bundle/O 1 1/388 1 0/0\"", &c);
        let flags: Vec<bool> = lines
            .iter()
            .filter_map(|l| return if let LineOutcome::Bundle(b) = &l.outcome { Some(b) } else { None })
            .flat_map(|b| return b.entries.iter())
            .filter_map(|e| {
                return match e {
                    IngredientEntry::Resolved { duplicate, .. } => Some(*duplicate),
                    IngredientEntry::Unresolved { .. } => None,
                };
            })
            .collect();
        assert_eq!(flags, [false, true, true]);
    }

    #[test]
    fn comments_and_noise_lines() {
        let c = catalog();
        let lines = parse("// Spring bundles\r\n{\n  \"broken\": 3,\n", &c);
        assert_eq!(lines[0].outcome, LineOutcome::Comment { text: "// Spring bundles".to_string() });
        assert!(lines[1..].iter().all(|l| return l.outcome == LineOutcome::Unparsed));
    }

    #[test]
    fn empty_value_is_an_empty_bundle() {
        let bundle = only_bundle(r#""Empty": """#);
        assert!(bundle.entries.is_empty());
        assert!(bundle.definition().ingredients.is_empty());
    }

    #[test]
    fn quantity_less_entry_keeps_whole_name() {
        assert_eq!(strip_quantity_and_quality("Wood"), (Quality::Normal, "Wood"));
        assert_eq!(strip_quantity_and_quality("5 IQ Wood"), (Quality::Iridium, "Wood"));
        assert_eq!(strip_quantity_and_quality("5 Duck Egg"), (Quality::Normal, "Duck Egg"));
    }
}
