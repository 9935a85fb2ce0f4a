//! Report building: parser output plus resolved hints, rendered as text.
//!
//! The builder never fails. Unresolved names and missing hints become inline
//! `ERROR:` blocks and the rest of the report is still produced.

use std::fmt::Write as _;

use serde::Serialize;

use crate::catalog::{HintQuery, HintResolver};
use crate::parser::{IngredientEntry, LineOutcome, ParsedLine};
use crate::types::ResolvedHint;

/// Switches that change what the report contains.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportOptions {
    /// Append an `<Items in Bundle>` block after every bundle.
    pub list_items_in_bundle: bool,
}

/// One block of the report, in input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReportBlock {
    /// The raw bundle line the following blocks belong to.
    BundleHeader {
        /// The source line.
        source: String,
    },
    /// A pass-through comment line.
    Comment {
        /// The comment text.
        text: String,
    },
    /// A resolved item with its hint.
    Hint(ResolvedHint),
    /// Every resolved ingredient name of one bundle, duplicates included.
    ItemsInBundle {
        /// Display names in encounter order.
        names: Vec<String>,
        /// The source line.
        source: String,
    },
    /// A resolved item for which the resolver had no hint.
    MissingHint {
        /// Normalized definition text, to locate the item.
        definition: String,
        /// The item with its empty hint.
        hint: ResolvedHint,
    },
    /// A name that could not be reverse-resolved to an item.
    Unresolved {
        /// The name as written.
        name: String,
    },
}

/// Counts over a finished report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    /// Bundle definition lines.
    pub bundles: usize,
    /// Items with a hint.
    pub hinted: usize,
    /// Items without a hint.
    pub missing: usize,
    /// Names that matched no item.
    pub unresolved: usize,
}

impl ReportSummary {
    /// Whether any error block was produced.
    pub const fn has_errors(&self) -> bool {
        return self.missing > 0 || self.unresolved > 0;
    }
}

/// The complete report for one parse pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParseReport {
    /// Blocks in input order.
    pub blocks: Vec<ReportBlock>,
}

impl ParseReport {
    /// Render the report as text. Every block ends with a blank line.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for block in &self.blocks {
            render_block(&mut out, block);
        }
        return out;
    }

    /// Count bundles, hints, and error blocks.
    pub fn summary(&self) -> ReportSummary {
        let mut summary = ReportSummary::default();
        for block in &self.blocks {
            let counter = match block {
                ReportBlock::BundleHeader { .. } => &mut summary.bundles,
                ReportBlock::Comment { .. } | ReportBlock::ItemsInBundle { .. } => continue,
                ReportBlock::Hint(_) => &mut summary.hinted,
                ReportBlock::MissingHint { .. } => &mut summary.missing,
                ReportBlock::Unresolved { .. } => &mut summary.unresolved,
            };
            *counter = counter.saturating_add(1);
        }
        return summary;
    }
}

/// Resolve hints for every first occurrence and assemble the report.
pub fn build<R: HintResolver + ?Sized>(
    lines: &[ParsedLine],
    resolver: &R,
    options: ReportOptions,
) -> ParseReport {
    let mut blocks = Vec::new();

    for line in lines {
        match &line.outcome {
            LineOutcome::Bundle(bundle) => {
                tracing::debug!(
                    format = ?bundle.format,
                    ingredients = bundle.definition().ingredients.len(),
                    "bundle parsed"
                );
                blocks.push(ReportBlock::BundleHeader { source: line.source.clone() });
                for entry in &bundle.entries {
                    if let Some(block) = entry_block(entry, &bundle.definition_text, resolver) {
                        blocks.push(block);
                    }
                }
                if options.list_items_in_bundle {
                    let names = bundle.listed_names().into_iter().map(String::from).collect();
                    blocks.push(ReportBlock::ItemsInBundle { names, source: line.source.clone() });
                }
            },
            LineOutcome::Comment { text } => blocks.push(ReportBlock::Comment { text: text.clone() }),
            LineOutcome::Unparsed => {},
        }
    }

    return ParseReport { blocks };
}

/// Block for one ingredient. Duplicates produce nothing.
fn entry_block<R: HintResolver + ?Sized>(
    entry: &IngredientEntry,
    definition: &str,
    resolver: &R,
) -> Option<ReportBlock> {
    let (reference, display_name) = match entry {
        IngredientEntry::Resolved { duplicate: true, .. } => return None,
        IngredientEntry::Resolved { display_name, reference, .. } => (reference, display_name),
        IngredientEntry::Unresolved { name } => {
            return Some(ReportBlock::Unresolved { name: name.clone() });
        },
    };

    let hint_text = match resolver.hint_for(&HintQuery::for_reference(reference)) {
        Err(e) => {
            tracing::warn!(identifier = %reference.identifier, error = %e, "hint resolver failed");
            String::new()
        },
        Ok(text) => text,
    };
    let hint = ResolvedHint {
        display_name: display_name.clone(),
        hint_text,
        reference: reference.clone(),
    };

    if hint.has_hint() {
        return Some(ReportBlock::Hint(hint));
    }
    tracing::debug!(identifier = %reference.identifier, "no hint");
    return Some(ReportBlock::MissingHint { definition: definition.to_string(), hint });
}

/// Append one block's text.
fn render_block(out: &mut String, block: &ReportBlock) {
    let _ = match block {
        ReportBlock::BundleHeader { source } => write!(out, "<{source}>\n\n"),
        ReportBlock::Comment { text } => write!(out, "{text}\n\n"),
        ReportBlock::Hint(hint) => write!(
            out,
            "{} [{}]\n{}\n\n",
            hint.display_name, hint.reference.identifier, hint.hint_text
        ),
        ReportBlock::ItemsInBundle { names, source } => {
            write!(out, "<Items in Bundle>\n{source}\n{}\n\n", names.join(", "))
        },
        ReportBlock::MissingHint { definition, hint } => write!(
            out,
            "ERROR: no hint for {} [{}]\n{definition}\n\n",
            hint.display_name, hint.reference.identifier
        ),
        ReportBlock::Unresolved { name } => {
            write!(out, "ERROR: no item found matching name {name}\n\n")
        },
    };
    return;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::TomlCatalog;
    use crate::parser;

    const CATALOG: &str = r#"
[[item]]
id = "388"
name = "Wood"
hint = "Chop trees."

[[item]]
id = "24"
name = "Parsnip"
hint = "Spring crop."

[[item]]
id = "176"
name = "Egg"

[[item]]
id = "442"
name = "Duck Egg"
hint = "Duck coop."
"#;

    fn report(raw: &str, list_items_in_bundle: bool) -> ParseReport {
        let catalog = TomlCatalog::parse(CATALOG).unwrap();
        let lines = parser::parse(raw, &catalog);
        return build(&lines, &catalog, ReportOptions { list_items_in_bundle });
    }

    #[test]
    fn renders_hints_and_errors_in_order() {
        let raw = "// Pantry\n\"Items\": \"3 Wood, 1 Frobnicator, 1 Egg\"";
        let text = report(raw, false).render();
        assert_eq!(
            text,
            "// Pantry\n\n\
             <\"Items\": \"3 Wood, 1 Frobnicator, 1 Egg\">\n\n\
             Wood [388]\nChop trees.\n\n\
             ERROR: no item found matching name Frobnicator\n\n\
             ERROR: no hint for Egg [176]\n3 Wood, 1 Frobnicator, 1 Egg\n\n"
        );
    }

    #[test]
    fn unknown_slash_ids_report_a_missing_hint() {
        let raw = "\"Odd/0\": \"Odd/O 1 1/999 1 0/0\"";
        let text = report(raw, false).render();
        assert_eq!(
            text,
            "<\"Odd/0\": \"Odd/O 1 1/999 1 0/0\">\n\n\
             ERROR: no hint for ??? [999]\nOdd/O 1 1/999 1 0/0\n\n"
        );
    }

    #[test]
    fn duplicates_get_one_block_but_are_listed_twice() {
        let raw = "\"A\": \"1 Wood, 2 Wood\"";
        let built = report(raw, true);
        let hints = built.blocks.iter().filter(|b| return matches!(b, ReportBlock::Hint(_))).count();
        assert_eq!(hints, 1);
        assert!(built.render().ends_with("<Items in Bundle>\n\"A\": \"1 Wood, 2 Wood\"\nWood, Wood\n\n"));
    }

    #[test]
    fn unresolved_names_are_left_out_of_the_listing() {
        let raw = "\"A\": \"1 Frobnicator, [1 Egg|1 Duck Egg]\"";
        let built = report(raw, true);
        let listing = built.blocks.iter().find_map(|b| {
            return match b {
                ReportBlock::ItemsInBundle { names, .. } => Some(names.clone()),
                _ => None,
            };
        });
        assert_eq!(listing, Some(vec!["Egg".to_string(), "Duck Egg".to_string()]));
    }

    #[test]
    fn summary_counts_blocks() {
        let raw = "\"A\": \"1 Frobnicator, 1 Egg, 1 Parsnip\"\nnoise\n\"B\": \"1 Duck Egg\"";
        let summary = report(raw, false).summary();
        assert_eq!(summary, ReportSummary { bundles: 2, hinted: 2, missing: 1, unresolved: 1 });
        assert!(summary.has_errors());
    }

    #[test]
    fn same_text_twice_renders_identically() {
        let raw = "\"A\": \"1 Wood, 1 Wood, 1 Egg\"\n\"B\": \"B/O 1 1/24 1 0 388 1 0/0\"";
        assert_eq!(report(raw, true).render(), report(raw, true).render());
    }

    #[test]
    fn empty_input_is_an_empty_report() {
        assert_eq!(report("", true).render(), "");
    }
}
