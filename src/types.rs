/// Core domain types for item references, bundles, hints, and hover geometry.
use serde::{Deserialize, Serialize};

/// Tri-state collections-tab display mode, selected externally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// Show hints for every entity; a toggle action reveals hints for obtained ones.
    All,
    /// Never show custom hints.
    Off,
    /// Show hints only for entities the player has not obtained yet.
    #[default]
    Unobtained,
}

impl DisplayMode {
    /// Parse the config spelling (`off`, `unobtained`, `all`), also accepting
    /// the legacy numeric form `0`, `1`, `2`.
    pub fn parse(value: &str) -> Option<Self> {
        return match value {
            "0" | "off" => Some(Self::Off),
            "1" | "unobtained" => Some(Self::Unobtained),
            "2" | "all" => Some(Self::All),
            _ => None,
        };
    }

    /// The spelling used in config files.
    pub const fn as_str(self) -> &'static str {
        return match self {
            Self::All => "all",
            Self::Off => "off",
            Self::Unobtained => "unobtained",
        };
    }
}

/// Ordinal quality modifier on an item, tiers 0 through 3.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    /// Tier 3.
    Iridium,
    /// Tier 2.
    Gold,
    /// Tier 0, the default when a definition names no quality.
    #[default]
    Normal,
    /// Tier 1.
    Silver,
}

impl Quality {
    /// Map a numeric tier to a quality. Anything outside 0..=3 is `None`.
    pub const fn from_tier(tier: u8) -> Option<Self> {
        return match tier {
            0 => Some(Self::Normal),
            1 => Some(Self::Silver),
            2 => Some(Self::Gold),
            3 => Some(Self::Iridium),
            _ => None,
        };
    }

    /// Map a two-letter bundle quality marker (`SQ`, `GQ`, `IQ`).
    pub fn from_marker(marker: &str) -> Option<Self> {
        return match marker {
            "GQ" => Some(Self::Gold),
            "IQ" => Some(Self::Iridium),
            "SQ" => Some(Self::Silver),
            _ => None,
        };
    }

    /// Lowercase name, as used for catalog `quality_hints` keys.
    pub const fn name(self) -> &'static str {
        return match self {
            Self::Gold => "gold",
            Self::Iridium => "iridium",
            Self::Normal => "normal",
            Self::Silver => "silver",
        };
    }
}

/// A reference to an item (or item category) inside a bundle definition.
///
/// Identity is the identifier alone; quality and category override are
/// resolution hints. Construct with `ItemReference::new`, which derives the
/// category override from the identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemReference {
    /// Negative category number when the identifier means "any item in category N".
    pub category_override: Option<i32>,
    /// Catalog identifier, never empty.
    pub identifier: String,
    /// Sub-item identifier for preserves (e.g. the fruit in a jelly).
    pub preserve_sub_id: Option<String>,
    /// Minimum quality the bundle asks for.
    pub quality: Quality,
}

impl ItemReference {
    /// Build a reference. Returns `None` for an empty identifier.
    ///
    /// An identifier beginning with `-` that parses as an integer is a
    /// category sentinel and also becomes the category override.
    pub fn new(identifier: &str, quality: Quality) -> Option<Self> {
        if identifier.is_empty() {
            return None;
        }
        let category_override = if identifier.starts_with('-') {
            identifier.parse::<i32>().ok()
        } else {
            None
        };
        return Some(Self {
            category_override,
            identifier: identifier.to_string(),
            preserve_sub_id: None,
            quality,
        });
    }

    /// Attach a preserve sub-identifier. Empty strings are treated as absent.
    #[must_use]
    pub fn with_preserve(mut self, sub_id: Option<&str>) -> Self {
        self.preserve_sub_id = sub_id.filter(|s| return !s.is_empty()).map(String::from);
        return self;
    }
}

/// Ordered ingredient references in declaration order. May be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BundleDefinition {
    /// Ingredients in the order they appear in the source text.
    pub ingredients: Vec<ItemReference>,
}

/// Hint text resolved for one reference during a single parse pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedHint {
    /// Catalog display name of the referenced item.
    pub display_name: String,
    /// How to obtain the item. Empty means no hint is available.
    pub hint_text: String,
    /// The reference the hint was resolved for.
    pub reference: ItemReference,
}

impl ResolvedHint {
    /// Whether the resolver had anything to say about this item.
    pub fn has_hint(&self) -> bool {
        return !self.hint_text.is_empty();
    }
}

/// Pointer position in UI pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position.
    pub x: i32,
    /// Vertical position.
    pub y: i32,
}

/// Axis-aligned bounds of a selectable entity, in UI pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    /// Height of the rectangle.
    pub height: i32,
    /// Width of the rectangle.
    pub width: i32,
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
}

impl Rect {
    /// Half-open containment: the right and bottom edges are outside.
    pub const fn contains(&self, point: Point) -> bool {
        let right = self.x.saturating_add(self.width);
        let bottom = self.y.saturating_add(self.height);
        return point.x >= self.x && point.x < right && point.y >= self.y && point.y < bottom;
    }

    /// Grow the rectangle by `margin` on every side.
    #[must_use]
    pub const fn inflate(&self, margin: i32) -> Self {
        return Self {
            height: self.height.saturating_add(margin.saturating_mul(2)),
            width: self.width.saturating_add(margin.saturating_mul(2)),
            x: self.x.saturating_sub(margin),
            y: self.y.saturating_sub(margin),
        };
    }
}
