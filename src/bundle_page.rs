//! Hint tooltips for the ingredient slots of an open bundle page.

use serde::Serialize;

use crate::catalog::{HintQuery, HintResolver, ItemCatalog};
use crate::error::Error;
use crate::hover::Tooltip;
use crate::types::{ItemReference, Point, Rect};

/// Custom tooltip content for one ingredient slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SlotHint {
    /// Hint body; empty when the slot keeps the host tooltip.
    pub text: String,
    /// Item name shown as the tooltip heading.
    pub title: String,
}

impl SlotHint {
    /// Whether this slot replaces the host tooltip.
    pub fn is_custom(&self) -> bool {
        return !self.title.is_empty();
    }
}

/// Per-slot hints for the bundle currently on screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BundlePage {
    slots: Vec<SlotHint>,
}

impl BundlePage {
    /// Resolve a hint for every ingredient, in slot order.
    ///
    /// A slot whose lookup fails keeps the host tooltip; the failure is logged.
    pub fn build<C, R>(ingredients: &[ItemReference], catalog: &C, resolver: &R) -> Self
    where
        C: ItemCatalog + ?Sized,
        R: HintResolver + ?Sized,
    {
        let slots = ingredients
            .iter()
            .map(|ingredient| {
                return match slot_hint(ingredient, catalog, resolver) {
                    Err(e) => {
                        tracing::warn!(identifier = %ingredient.identifier, error = %e, "error defining hint text");
                        SlotHint::default()
                    },
                    Ok(hint) => hint,
                };
            })
            .collect();
        return Self { slots };
    }

    /// Slots whose host hover text must stay blank. Hosts that rebuild their
    /// hover text (e.g. on resize) blank these again.
    pub fn suppressed_slots(&self) -> Vec<usize> {
        return self
            .slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| return slot.is_custom())
            .map(|(index, _)| return index)
            .collect();
    }

    /// Tooltip for the first slot whose bounds contain the cursor.
    ///
    /// `slot_bounds` is parallel to the ingredient list; extra bounds beyond
    /// the known slots are ignored.
    pub fn tooltip_at(&self, slot_bounds: &[Rect], cursor: Point) -> Option<Tooltip> {
        let index = slot_bounds.iter().position(|bounds| return bounds.contains(cursor))?;
        let slot = self.slots.get(index).filter(|slot| return slot.is_custom())?;
        return Some(Tooltip { body: slot.text.clone(), title: slot.title.clone() });
    }

    /// All slots, in ingredient order.
    pub fn slots(&self) -> &[SlotHint] {
        return &self.slots;
    }
}

/// Hint for a single ingredient. An empty hint leaves the slot untouched.
///
/// # Errors
///
/// Returns collaborator errors from the resolver or catalog.
fn slot_hint<C, R>(ingredient: &ItemReference, catalog: &C, resolver: &R) -> Result<SlotHint, Error>
where
    C: ItemCatalog + ?Sized,
    R: HintResolver + ?Sized,
{
    let text = resolver.hint_for(&HintQuery::for_reference(ingredient))?;
    if text.is_empty() {
        return Ok(SlotHint::default());
    }
    let title = catalog.name_of(&ingredient.identifier, ingredient.preserve_sub_id.as_deref())?;
    return Ok(SlotHint { text, title });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::TomlCatalog;
    use crate::types::Quality;

    const CATALOG: &str = r#"
[[item]]
id = "344"
name = "Jelly"
hint = "Preserves jar."
preserve_name = "{} Jelly"

[[item]]
id = "613"
name = "Apple"
hint = "Fall fruit tree."

[[item]]
id = "24"
name = "Parsnip"
"#;

    fn slot(x: i32) -> Rect {
        return Rect { x, y: 0, width: 16, height: 16 };
    }

    fn page() -> BundlePage {
        let catalog = TomlCatalog::parse(CATALOG).unwrap();
        let ingredients = vec![
            ItemReference::new("344", Quality::Normal).unwrap().with_preserve(Some("613")),
            ItemReference::new("24", Quality::Normal).unwrap(),
            // Hint lookups for unknown ids are empty, not errors.
            ItemReference::new("1", Quality::Normal).unwrap(),
        ];
        return BundlePage::build(&ingredients, &catalog, &catalog);
    }

    #[test]
    fn preserves_are_titled_with_their_sub_item() {
        let page = page();
        assert_eq!(
            page.slots()[0],
            SlotHint { text: "Preserves jar.".to_string(), title: "Apple Jelly".to_string() }
        );
    }

    #[test]
    fn only_hinted_slots_are_suppressed() {
        assert_eq!(page().suppressed_slots(), [0]);
    }

    #[test]
    fn tooltip_follows_the_cursor() {
        let page = page();
        let bounds = [slot(0), slot(20), slot(40)];

        let tip = page.tooltip_at(&bounds, Point { x: 4, y: 4 }).unwrap();
        assert_eq!(tip.title, "Apple Jelly");
        assert!(page.tooltip_at(&bounds, Point { x: 24, y: 4 }).is_none());
        assert!(page.tooltip_at(&bounds, Point { x: 200, y: 4 }).is_none());
    }

    #[test]
    fn failed_lookups_keep_the_host_tooltip() {
        // The hint resolves, but the preserve sub-item is unknown to the catalog.
        let catalog = TomlCatalog::parse(CATALOG).unwrap();
        let ingredients = vec![ItemReference::new("344", Quality::Normal).unwrap().with_preserve(Some("9"))];
        let page = BundlePage::build(&ingredients, &catalog, &catalog);
        assert!(page.suppressed_slots().is_empty());
    }
}
