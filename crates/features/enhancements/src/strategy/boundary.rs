use super::{COLUMN_HEADER_CELL, LEFT, Overlay, OverlayContext, cells_at_offsets};
use crate::error::{OverlayError, OverlayErrorExt};
use chrono::NaiveDate;
use tcard_domain::color::Color;
use tcard_host::{HostView, Selector};
use tracing::{debug, trace};

pub(crate) const MARKER_CLASS: &str = "oj-fa-time-hcm-dg-weekstart-border";
pub(crate) const ACTIVE_TAG: &str = "dynamic-red-line-active";
pub(crate) const REMOVED_TAG: &str = "dynamic-red-line-removed";
pub(crate) const STYLE_SHEET_ID: &str = "dynamic-red-line-style";

const DAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Today's date as the grid labels its column headers, e.g. `Sun,Aug 03`.
#[must_use]
pub fn today_label(date: NaiveDate) -> String {
    date.format("%a,%b %d").to_string()
}

/// Leading integer of a CSS length (`"120px"` -> `120`).
fn parse_offset(value: &str) -> Option<i64> {
    let value = value.trim();
    let end = value
        .char_indices()
        .find(|(i, c)| !(c.is_ascii_digit() || (*i == 0 && (*c == '-' || *c == '+'))))
        .map_or(value.len(), |(i, _)| i);
    value[..end].parse().ok()
}

/// Replaces the grid's static weekly boundary lines with one line right before today.
#[derive(Debug)]
pub struct BoundaryMarker {
    color: Color,
}

impl Default for BoundaryMarker {
    fn default() -> Self {
        Self { color: Color::BOUNDARY_MARKER }
    }
}

impl BoundaryMarker {
    #[must_use]
    pub const fn new(color: Color) -> Self {
        Self { color }
    }

    /// The `left` offset of the date column immediately preceding today's column.
    pub fn target_offset<H: HostView>(host: &H, today: NaiveDate) -> Option<String> {
        let label = today_label(today);
        let headers = host.select(&Selector::class(COLUMN_HEADER_CELL));

        let today_cell = headers
            .iter()
            .find(|cell| host.text(**cell).is_some_and(|t| t.trim().contains(&label)))?;
        let today_left = host.style(*today_cell, LEFT).as_deref().and_then(parse_offset)?;

        let mut dated: Vec<(i64, String)> = headers
            .iter()
            .filter(|cell| {
                host.text(**cell).is_some_and(|t| DAY_NAMES.iter().any(|d| t.trim().contains(d)))
            })
            .filter_map(|cell| {
                let left = host.style(*cell, LEFT)?;
                Some((parse_offset(&left)?, left))
            })
            .collect();
        dated.sort_by_key(|(offset, _)| *offset);

        let index = dated.iter().position(|(offset, _)| *offset == today_left)?;
        index.checked_sub(1).and_then(|i| dated.get(i)).map(|(_, left)| left.clone())
    }

    fn install_style<H: HostView>(&self, host: &mut H) {
        let css = format!(":root {{ --oj-palette-danger-rgb-100: {}; }}", self.color.channels());
        host.install_style_sheet(STYLE_SHEET_ID, &css);
    }

    fn apply<H: HostView>(&self, ctx: &mut OverlayContext<'_, H>) -> Result<(), OverlayError> {
        let today = ctx.clock.today();
        let target = Self::target_offset(ctx.host, today);
        let host = &mut *ctx.host;
        clear_marker(host)?;

        let Some(offset) = target else {
            let restored = restore_static_markers(host)?;
            trace!(today = %today_label(today), restored, "Column before today not rendered");
            return Ok(());
        };

        for cell in host.select(&Selector::class(MARKER_CLASS)) {
            if host.tag(cell, REMOVED_TAG).is_some() {
                continue;
            }
            host.remove_class(cell, MARKER_CLASS).context("Failed to remove static marker")?;
            host.set_tag(cell, REMOVED_TAG, "true")?;
        }

        let column = cells_at_offsets(host, std::slice::from_ref(&offset));
        for cell in &column {
            host.add_class(*cell, MARKER_CLASS).context("Failed to place marker")?;
            host.set_tag(*cell, ACTIVE_TAG, "true")?;
        }

        self.install_style(host);
        debug!(left = %offset, elements = column.len(), "Boundary marker placed");
        Ok(())
    }
}

/// Removes the marker a previous pass placed.
fn clear_marker<H: HostView>(host: &mut H) -> Result<(), OverlayError> {
    for cell in host.select(&Selector::tagged(ACTIVE_TAG, "true")) {
        host.remove_class(cell, MARKER_CLASS).context("Failed to clear previous marker")?;
        host.remove_tag(cell, ACTIVE_TAG)?;
    }
    Ok(())
}

/// Puts back the static weekly markers earlier passes stripped. Returns how many.
fn restore_static_markers<H: HostView>(host: &mut H) -> Result<usize, OverlayError> {
    let removed = host.select(&Selector::tagged(REMOVED_TAG, "true"));
    for cell in &removed {
        host.add_class(*cell, MARKER_CLASS).context("Failed to restore static marker")?;
        host.remove_tag(*cell, REMOVED_TAG)?;
    }
    Ok(removed.len())
}

impl Overlay for BoundaryMarker {
    fn on_init<H: HostView>(&mut self, ctx: &mut OverlayContext<'_, H>) -> Result<(), OverlayError> {
        self.install_style(ctx.host);
        self.apply(ctx)
    }

    fn on_cleanup<H: HostView>(
        &mut self,
        ctx: &mut OverlayContext<'_, H>,
    ) -> Result<(), OverlayError> {
        let host = &mut *ctx.host;
        clear_marker(host)?;
        restore_static_markers(host)?;
        host.remove_style_sheet(STYLE_SHEET_ID);
        Ok(())
    }

    fn on_update<H: HostView>(
        &mut self,
        ctx: &mut OverlayContext<'_, H>,
    ) -> Result<(), OverlayError> {
        self.apply(ctx)
    }

    /// A color change only swaps the injected style sheet.
    fn on_force_update<H: HostView>(
        &mut self,
        ctx: &mut OverlayContext<'_, H>,
    ) -> Result<(), OverlayError> {
        self.install_style(ctx.host);
        Ok(())
    }

    fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    fn color(&self) -> Option<Color> {
        Some(self.color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_matches_header_convention() {
        let date = NaiveDate::from_ymd_opt(2025, 8, 3).unwrap();
        assert_eq!(today_label(date), "Sun,Aug 03");
    }

    #[test]
    fn offsets_parse_like_css_lengths() {
        assert_eq!(parse_offset("120px"), Some(120));
        assert_eq!(parse_offset(" 0px"), Some(0));
        assert_eq!(parse_offset("-40px"), Some(-40));
        assert_eq!(parse_offset("12.5px"), Some(12));
        assert_eq!(parse_offset("auto"), None);
    }
}
