//! Hover tracking and the minimal/full hint toggle for the collections page.
//!
//! The state is owned by a `HoverController` the caller keeps for the
//! lifetime of the page and drives once per frame. Reset rule: whenever the
//! hovered entity changes or hover is lost, the toggle goes back to off.

use serde::Serialize;

use crate::catalog::{HintQuery, HintResolver, ItemCatalog, UNKNOWN_ITEM_NAME};
use crate::types::{DisplayMode, Point, Rect};

/// Extra pixels around an entity that still count as hovering it.
pub const HOVER_MARGIN: i32 = 2;

/// Which entity is hovered and whether full hints are toggled on for it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HoverState {
    /// Identifier of the hovered entity; empty when nothing is hovered.
    pub current_entity_id: String,
    /// Full hints requested for the hovered entity. Only ever true while
    /// `current_entity_id` is non-empty.
    pub display_toggle: bool,
}

impl HoverState {
    /// Back to the no-entity baseline.
    fn reset(&mut self) {
        self.current_entity_id.clear();
        self.display_toggle = false;
    }
}

/// A visible, selectable entity on the current page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoverEntity {
    /// Screen bounds, margin included.
    pub bounds: Rect,
    /// Entity identifier.
    pub id: String,
    /// The player already has this entity.
    pub obtained: bool,
}

impl HoverEntity {
    /// Decode a host component name of the form `id [flag] [flag]`, where
    /// either flag being `true` marks the entity obtained. Bounds are grown by
    /// `HOVER_MARGIN`. Returns `None` for an empty name.
    pub fn from_component_name(name: &str, bounds: Rect) -> Option<Self> {
        let mut fields = name.split_whitespace();
        let id = fields.next()?;
        let obtained = fields.take(2).any(|flag| return flag.eq_ignore_ascii_case("true"));
        return Some(Self {
            bounds: bounds.inflate(HOVER_MARGIN),
            id: id.to_string(),
            obtained,
        });
    }
}

/// What the host should do with its own tooltip this frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum HoverDecision {
    /// Suppress the default tooltip and draw the hint for this entity.
    ShowHint {
        /// The entity to show the hint for.
        entity_id: String,
    },
    /// Leave the host's default behaviour alone.
    UseDefault,
}

/// Owns the `HoverState` and applies hover queries and toggle actions to it.
#[derive(Debug, Default)]
pub struct HoverController {
    state: HoverState,
}

impl HoverController {
    /// Start with nothing hovered.
    pub fn new() -> Self {
        return Self::default();
    }

    /// Apply one frame's hover snapshot.
    ///
    /// `hints_enabled` is false on pages that show no items; together with
    /// `DisplayMode::Off` it drops hover entirely.
    pub fn on_hover_query(
        &mut self,
        entities: &[HoverEntity],
        cursor: Point,
        hints_enabled: bool,
        mode: DisplayMode,
    ) -> HoverDecision {
        if !hints_enabled || mode == DisplayMode::Off {
            self.state.reset();
            return HoverDecision::UseDefault;
        }

        let Some(entity) = entities.iter().find(|e| return e.bounds.contains(cursor)) else {
            if !self.state.current_entity_id.is_empty() {
                tracing::debug!(entity = %self.state.current_entity_id, "hover lost");
            }
            self.state.reset();
            return HoverDecision::UseDefault;
        };

        if self.state.current_entity_id != entity.id {
            tracing::debug!(entity = %entity.id, "hover entered");
            self.state.current_entity_id.clone_from(&entity.id);
            self.state.display_toggle = false;
        }

        let revealed = mode == DisplayMode::All && self.state.display_toggle;
        if entity.obtained && !revealed {
            return HoverDecision::UseDefault;
        }
        return HoverDecision::ShowHint { entity_id: entity.id.clone() };
    }

    /// Flip the toggle for the hovered entity. Returns true when it flipped,
    /// in which case the caller plays its acknowledgement.
    pub fn on_toggle_action(&mut self, mode: DisplayMode) -> bool {
        if mode != DisplayMode::All || self.state.current_entity_id.is_empty() {
            return false;
        }
        self.state.display_toggle = !self.state.display_toggle;
        tracing::debug!(
            entity = %self.state.current_entity_id,
            toggled = self.state.display_toggle,
            "hint toggle"
        );
        return true;
    }

    /// Current state, for inspection.
    pub const fn state(&self) -> &HoverState {
        return &self.state;
    }
}

/// A tooltip the host should draw in place of its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tooltip {
    /// Tooltip body.
    pub body: String,
    /// Tooltip heading; empty for a body-only tooltip.
    pub title: String,
}

/// Build the collections-page hint tooltip for an entity: the item name, a
/// blank line, then the hint (`??? [id]` when there is none).
///
/// Collaborator failures are logged and yield `None`, meaning the host
/// should fall back to its default tooltip for this frame.
pub fn hint_tooltip<C, R>(entity_id: &str, catalog: &C, resolver: &R) -> Option<Tooltip>
where
    C: ItemCatalog + ?Sized,
    R: HintResolver + ?Sized,
{
    let lookup = catalog.name_of(entity_id, None).and_then(|name| {
        let hint = resolver.hint_for(&HintQuery::for_identifier(entity_id))?;
        return Ok((name, hint));
    });

    let (name, mut hint) = match lookup {
        Err(e) => {
            tracing::warn!(entity = entity_id, error = %e, "hint lookup failed, using default tooltip");
            return None;
        },
        Ok(found) => found,
    };
    if hint.is_empty() {
        hint = format!("{UNKNOWN_ITEM_NAME} [{entity_id}]");
    }
    return Some(Tooltip { body: format!("{name}\n\n{hint}"), title: String::new() });
}
