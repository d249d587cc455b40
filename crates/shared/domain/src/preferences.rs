use crate::color::Color;
use crate::constants::{
    ALTERNATE_COLOR_KEY, ALTERNATE_LINE_SHADING, DYNAMIC_RED_LINE, RED_LINE_COLOR_KEY,
    WEEKEND_COLOR_KEY, WEEKEND_SHADING,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The customizable colors, each persisted under its own key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorSlot {
    Weekend,
    AlternateRow,
    BoundaryMarker,
}

impl ColorSlot {
    pub const ALL: [Self; 3] = [Self::Weekend, Self::AlternateRow, Self::BoundaryMarker];

    #[must_use]
    pub const fn storage_key(self) -> &'static str {
        match self {
            Self::Weekend => WEEKEND_COLOR_KEY,
            Self::AlternateRow => ALTERNATE_COLOR_KEY,
            Self::BoundaryMarker => RED_LINE_COLOR_KEY,
        }
    }

    #[must_use]
    pub const fn default_color(self) -> Color {
        match self {
            Self::Weekend => Color::WEEKEND,
            Self::AlternateRow => Color::ALTERNATE_ROW,
            Self::BoundaryMarker => Color::BOUNDARY_MARKER,
        }
    }

    /// Name of the enhancement painting with this color.
    #[must_use]
    pub const fn enhancement(self) -> &'static str {
        match self {
            Self::Weekend => WEEKEND_SHADING,
            Self::AlternateRow => ALTERNATE_LINE_SHADING,
            Self::BoundaryMarker => DYNAMIC_RED_LINE,
        }
    }
}

/// Cached copy of the persisted preference record.
///
/// Enabled flags and colors are stored independently; a missing entry means
/// "use the default" rather than "disabled".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Preferences {
    pub enhancement_preferences: BTreeMap<String, bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weekend_shade_color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alternate_shade_color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub red_line_color: Option<Color>,
}

impl Preferences {
    #[must_use]
    pub fn enabled(&self, name: &str) -> Option<bool> {
        self.enhancement_preferences.get(name).copied()
    }

    pub fn set_enabled(&mut self, name: impl Into<String>, enabled: bool) {
        self.enhancement_preferences.insert(name.into(), enabled);
    }

    #[must_use]
    pub const fn color(&self, slot: ColorSlot) -> Option<Color> {
        match slot {
            ColorSlot::Weekend => self.weekend_shade_color,
            ColorSlot::AlternateRow => self.alternate_shade_color,
            ColorSlot::BoundaryMarker => self.red_line_color,
        }
    }

    /// The stored color, or the slot default when none was saved.
    #[must_use]
    pub fn color_or_default(&self, slot: ColorSlot) -> Color {
        self.color(slot).unwrap_or_else(|| slot.default_color())
    }

    pub const fn set_color(&mut self, slot: ColorSlot, color: Color) {
        match slot {
            ColorSlot::Weekend => self.weekend_shade_color = Some(color),
            ColorSlot::AlternateRow => self.alternate_shade_color = Some(color),
            ColorSlot::BoundaryMarker => self.red_line_color = Some(color),
        }
    }
}
