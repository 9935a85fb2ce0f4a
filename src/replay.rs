//! Replay scripts: a page snapshot plus a sequence of pointer and toggle
//! events, fed through the hover controller or the bundle page exactly as a
//! host would drive them frame by frame.

use std::fmt::Write as _;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::bundle_page::BundlePage;
use crate::catalog::{HintResolver, ItemCatalog};
use crate::error::Error;
use crate::hover::{HoverController, HoverDecision, HoverEntity, HoverState, Tooltip, hint_tooltip};
use crate::types::{DisplayMode, ItemReference, Point, Quality, Rect};

/// Which host page the script simulates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Surface {
    /// An open bundle with its ingredient slots.
    Bundle,
    /// The collections tab with its item grid.
    Collections,
}

/// A collections-page entity as the host names it.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct EntitySpec {
    bounds: Rect,
    name: String,
}

/// A bundle ingredient slot.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct IngredientSpec {
    bounds: Rect,
    id: String,
    #[serde(default)]
    preserve: Option<String>,
    #[serde(default)]
    quality: u8,
}

/// One input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ReplayEvent {
    /// Pointer moved to a position.
    Hover {
        /// Horizontal position.
        x: i32,
        /// Vertical position.
        y: i32,
    },
    /// The activate action was pressed.
    Toggle,
}

/// A parsed replay script.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReplayScript {
    #[serde(default)]
    entity: Vec<EntitySpec>,
    #[serde(default)]
    event: Vec<ReplayEvent>,
    #[serde(default = "default_hints_enabled")]
    hints_enabled: bool,
    #[serde(default)]
    ingredient: Vec<IngredientSpec>,
    /// Display mode override; the config value applies when absent.
    #[serde(default)]
    pub mode: Option<DisplayMode>,
    /// Simulated page.
    pub surface: Surface,
}

/// Serde default for `hints_enabled`.
const fn default_hints_enabled() -> bool {
    return true;
}

/// What happened in response to one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum StepOutcome {
    /// The host keeps its default tooltip.
    Default,
    /// The event had no effect on this surface or in this state.
    Ignored,
    /// The host should draw this tooltip instead of its own.
    Tooltip(Tooltip),
    /// The toggle flipped; the host plays its acknowledgement.
    Toggled {
        /// New toggle value.
        on: bool,
    },
}

/// One transcript line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Step {
    /// The event that was applied.
    pub event: ReplayEvent,
    /// Its effect.
    pub outcome: StepOutcome,
    /// Hover state after the event (collections surface only).
    pub state: Option<HoverState>,
}

impl Serialize for ReplayEvent {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        return serializer.serialize_str(&event_label(*self));
    }
}

impl ReplayScript {
    /// Read and parse a replay script.
    ///
    /// # Errors
    ///
    /// Returns `Error::FileNotFound` if the script doesn't exist,
    /// `Error::Io` for other read failures, or `Error::ParseFailed` if the
    /// TOML is malformed.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let content = match std::fs::read_to_string(path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::FileNotFound { path: path.to_path_buf() });
            },
            Err(e) => return Err(Error::Io(e)),
            Ok(c) => c,
        };
        return toml::from_str(&content).map_err(|e| {
            return Error::ParseFailed { file: path.to_path_buf(), reason: e.to_string() };
        });
    }

    /// Run every event and collect the transcript.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidScript` if an ingredient has an empty id or a
    /// quality outside 0..=3. Collaborator failures never error; they show
    /// up as `Default` outcomes.
    pub fn run<C>(&self, catalog: &C, mode: DisplayMode) -> Result<Vec<Step>, Error>
    where
        C: ItemCatalog + HintResolver + ?Sized,
    {
        let mode = self.mode.unwrap_or(mode);
        return match self.surface {
            Surface::Bundle => self.run_bundle(catalog),
            Surface::Collections => Ok(self.run_collections(catalog, mode)),
        };
    }

    /// Drive a bundle page: hovers show slot tooltips, toggles do nothing.
    fn run_bundle<C>(&self, catalog: &C) -> Result<Vec<Step>, Error>
    where
        C: ItemCatalog + HintResolver + ?Sized,
    {
        let ingredients = self
            .ingredient
            .iter()
            .enumerate()
            .map(|(index, spec)| return ingredient_reference(index, spec))
            .collect::<Result<Vec<_>, _>>()?;
        let bounds: Vec<Rect> = self.ingredient.iter().map(|spec| return spec.bounds).collect();
        let page = BundlePage::build(&ingredients, catalog, catalog);
        tracing::debug!(slots = page.slots().len(), suppressed = ?page.suppressed_slots(), "bundle page built");

        let steps = self
            .event
            .iter()
            .map(|&event| {
                let outcome = match event {
                    ReplayEvent::Hover { x, y } => page
                        .tooltip_at(&bounds, Point { x, y })
                        .map_or(StepOutcome::Default, StepOutcome::Tooltip),
                    ReplayEvent::Toggle => StepOutcome::Ignored,
                };
                return Step { event, outcome, state: None };
            })
            .collect();
        return Ok(steps);
    }

    /// Drive the collections page through a `HoverController`.
    fn run_collections<C>(&self, catalog: &C, mode: DisplayMode) -> Vec<Step>
    where
        C: ItemCatalog + HintResolver + ?Sized,
    {
        let entities: Vec<HoverEntity> = self
            .entity
            .iter()
            .filter_map(|spec| return HoverEntity::from_component_name(&spec.name, spec.bounds))
            .collect();
        let mut controller = HoverController::new();

        return self
            .event
            .iter()
            .map(|&event| {
                let outcome = match event {
                    ReplayEvent::Hover { x, y } => {
                        match controller.on_hover_query(&entities, Point { x, y }, self.hints_enabled, mode) {
                            HoverDecision::ShowHint { entity_id } => hint_tooltip(&entity_id, catalog, catalog)
                                .map_or(StepOutcome::Default, StepOutcome::Tooltip),
                            HoverDecision::UseDefault => StepOutcome::Default,
                        }
                    },
                    ReplayEvent::Toggle => {
                        if controller.on_toggle_action(mode) {
                            StepOutcome::Toggled { on: controller.state().display_toggle }
                        } else {
                            StepOutcome::Ignored
                        }
                    },
                };
                return Step { event, outcome, state: Some(controller.state().clone()) };
            })
            .collect();
    }
}

/// Build the reference for one ingredient spec.
///
/// # Errors
///
/// Returns `Error::InvalidScript` for an empty id or an out-of-range quality.
fn ingredient_reference(index: usize, spec: &IngredientSpec) -> Result<ItemReference, Error> {
    let invalid = |reason: String| return Error::InvalidScript { reason };
    let quality = Quality::from_tier(spec.quality)
        .ok_or_else(|| return invalid(format!("ingredient {index}: quality {} is not 0-3", spec.quality)))?;
    let reference = ItemReference::new(&spec.id, quality)
        .ok_or_else(|| return invalid(format!("ingredient {index}: empty id")))?;
    return Ok(reference.with_preserve(spec.preserve.as_deref()));
}

/// Short label for an event.
fn event_label(event: ReplayEvent) -> String {
    return match event {
        ReplayEvent::Hover { x, y } => format!("hover {x},{y}"),
        ReplayEvent::Toggle => "toggle".to_string(),
    };
}

/// Render a transcript, one line per step.
pub fn render_transcript(steps: &[Step]) -> String {
    let mut out = String::new();
    for step in steps {
        let outcome = match &step.outcome {
            StepOutcome::Default => "default".to_string(),
            StepOutcome::Ignored => "ignored".to_string(),
            StepOutcome::Toggled { on } => format!("toggled {}", if *on { "on" } else { "off" }),
            StepOutcome::Tooltip(tip) if tip.title.is_empty() => format!("tooltip {:?}", tip.body),
            StepOutcome::Tooltip(tip) => format!("tooltip {:?} {:?}", tip.title, tip.body),
        };
        let _ = write!(out, "{:<12} -> {outcome}", event_label(step.event));
        if let Some(state) = step.state.as_ref().filter(|s| return !s.current_entity_id.is_empty()) {
            let _ = write!(out, "  [{}{}]", state.current_entity_id, if state.display_toggle { ", toggled" } else { "" });
        }
        out.push('\n');
    }
    return out;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::TomlCatalog;

    const CATALOG: &str = r#"
[[item]]
id = "24"
name = "Parsnip"
hint = "Spring crop."

[[item]]
id = "60"
name = "Emerald"
hint = "Mines, floors 40-80."
"#;

    const COLLECTIONS: &str = r#"
surface = "collections"

[[entity]]
name = "24 true false"
bounds = { x = 0, y = 0, width = 64, height = 64 }

[[entity]]
name = "60 false false"
bounds = { x = 100, y = 0, width = 64, height = 64 }

[[event]]
kind = "hover"
x = 10
y = 10

[[event]]
kind = "toggle"

[[event]]
kind = "hover"
x = 12
y = 12

[[event]]
kind = "hover"
x = 110
y = 10

[[event]]
kind = "hover"
x = 500
y = 500
"#;

    fn catalog() -> TomlCatalog {
        return TomlCatalog::parse(CATALOG).unwrap();
    }

    #[test]
    fn collections_replay_follows_toggle_rules() {
        let script: ReplayScript = toml::from_str(COLLECTIONS).unwrap();
        let steps = script.run(&catalog(), DisplayMode::All).unwrap();
        let outcomes: Vec<&StepOutcome> = steps.iter().map(|s| return &s.outcome).collect();

        assert_eq!(outcomes[0], &StepOutcome::Default);
        assert_eq!(outcomes[1], &StepOutcome::Toggled { on: true });
        assert!(matches!(outcomes[2], StepOutcome::Tooltip(t) if t.body == "Parsnip\n\nSpring crop."));
        assert!(matches!(outcomes[3], StepOutcome::Tooltip(t) if t.body.starts_with("Emerald")));
        assert_eq!(steps[3].state.as_ref().map(|s| return s.display_toggle), Some(false));
        assert_eq!(outcomes[4], &StepOutcome::Default);
        assert_eq!(steps[4].state, Some(HoverState::default()));
    }

    #[test]
    fn script_mode_overrides_the_default() {
        let mut script: ReplayScript = toml::from_str(COLLECTIONS).unwrap();
        script.mode = Some(DisplayMode::Unobtained);
        let steps = script.run(&catalog(), DisplayMode::All).unwrap();
        assert_eq!(steps[1].outcome, StepOutcome::Ignored);
    }

    #[test]
    fn bundle_replay_shows_slot_tooltips() {
        let script: ReplayScript = toml::from_str(
            r#"
surface = "bundle"

[[ingredient]]
id = "24"
quality = 2
bounds = { x = 0, y = 0, width = 16, height = 16 }

[[event]]
kind = "hover"
x = 4
y = 4

[[event]]
kind = "toggle"
"#,
        )
        .unwrap();
        let steps = script.run(&catalog(), DisplayMode::All).unwrap();
        assert_eq!(
            steps[0].outcome,
            StepOutcome::Tooltip(Tooltip { body: "Spring crop.".to_string(), title: "Parsnip".to_string() })
        );
        assert_eq!(steps[1].outcome, StepOutcome::Ignored);
        assert!(render_transcript(&steps).starts_with("hover 4,4    -> tooltip \"Parsnip\""));
    }

    #[test]
    fn bad_ingredient_quality_is_rejected() {
        let script: ReplayScript = toml::from_str(
            "surface = \"bundle\"\n\n[[ingredient]]\nid = \"24\"\nquality = 7\nbounds = { x = 0, y = 0, width = 1, height = 1 }\n",
        )
        .unwrap();
        assert!(matches!(script.run(&catalog(), DisplayMode::All), Err(Error::InvalidScript { .. })));
    }
}
