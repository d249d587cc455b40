//! Well-known names shared by the overlay core, the preference store and the messaging surface.

pub const TIMECARD_TOTALS: &str = "timecard-totals";
pub const WEEKEND_SHADING: &str = "weekend-shading";
pub const ALTERNATE_LINE_SHADING: &str = "alternate-line-shading";
pub const DYNAMIC_RED_LINE: &str = "dynamic-red-line";

/// Registration order. Weekend shading must precede alternate shading.
pub const ENHANCEMENTS: [&str; 4] =
    [TIMECARD_TOTALS, WEEKEND_SHADING, ALTERNATE_LINE_SHADING, DYNAMIC_RED_LINE];

// Preference store keys.
pub const PREFERENCES_KEY: &str = "enhancementPreferences";
pub const WEEKEND_COLOR_KEY: &str = "weekendShadeColor";
pub const ALTERNATE_COLOR_KEY: &str = "alternateShadeColor";
pub const RED_LINE_COLOR_KEY: &str = "redLineColor";

pub const ALL_PREFERENCE_KEYS: [&str; 4] =
    [PREFERENCES_KEY, WEEKEND_COLOR_KEY, ALTERNATE_COLOR_KEY, RED_LINE_COLOR_KEY];
