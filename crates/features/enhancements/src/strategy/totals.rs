use super::{END_HEADER_CELL, Overlay, OverlayContext};
use crate::error::{OverlayError, OverlayErrorExt};
use regex::Regex;
use std::sync::LazyLock;
use tcard_host::{ElementId, HostView, Selector};
use tracing::{debug, trace};

const ROW_END_HEADER_ID: &str = "timecard-datagrid:rowEndHeader";
const COLUMN_END_HEADER_ID: &str = "timecard-datagrid:columnEndHeader";
const CORNER_ID: &str = "timecard-datagrid:bcorner";
const UNIT: &str = " hours";

static HOURS_RE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\d*\.?\d+").ok());

/// Parses the first numeric token of a summary cell (`"4.5 hours"` -> `4.5`).
/// Text without a number counts as zero.
#[must_use]
pub fn parse_hours(text: &str) -> f64 {
    HOURS_RE
        .as_ref()
        .and_then(|re| re.find(text))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0.0)
}

/// Sums the per-row totals into the grid's bottom-right corner cell.
#[derive(Debug, Default)]
pub struct TotalsAggregator {
    /// Corner classes before the first restyle, restored on cleanup.
    original_classes: Option<(ElementId, Vec<String>)>,
}

impl TotalsAggregator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn refresh<H: HostView>(&mut self, host: &mut H) -> Result<(), OverlayError> {
        let Some(row_end) = host.element_by_id(ROW_END_HEADER_ID) else {
            trace!("Row end header not rendered yet");
            return Ok(());
        };
        let rows = host.select(&Selector::class(END_HEADER_CELL).within(row_end));
        if rows.is_empty() {
            trace!("No row totals rendered yet");
            return Ok(());
        }
        let Some(corner) = host.element_by_id(CORNER_ID) else {
            trace!("Corner cell not rendered yet");
            return Ok(());
        };

        let total: f64 = rows.iter().filter_map(|row| host.text(*row)).map(|t| parse_hours(&t)).sum();
        let formatted = format!("{total:.2}{UNIT}");

        let reference = host
            .element_by_id(COLUMN_END_HEADER_ID)
            .and_then(|header| host.select_first(&Selector::class(END_HEADER_CELL).within(header)));
        if let Some(reference) = reference {
            let classes = host.classes(reference);
            let current = host.classes(corner);
            if current != classes {
                if self.original_classes.as_ref().is_none_or(|(id, _)| *id != corner) {
                    self.original_classes = Some((corner, current));
                }
                host.set_classes(corner, &classes).context("Failed to restyle corner cell")?;
            }
        }

        if host.text(corner).is_none_or(|text| text.trim() != formatted) {
            host.set_text(corner, &formatted).context("Failed to write corner total")?;
            debug!(rows = rows.len(), total = %formatted, "Corner total written");
        }
        Ok(())
    }
}

impl Overlay for TotalsAggregator {
    fn on_init<H: HostView>(&mut self, ctx: &mut OverlayContext<'_, H>) -> Result<(), OverlayError> {
        self.refresh(ctx.host)
    }

    fn on_cleanup<H: HostView>(
        &mut self,
        ctx: &mut OverlayContext<'_, H>,
    ) -> Result<(), OverlayError> {
        let Some(corner) = ctx.host.element_by_id(CORNER_ID) else {
            self.original_classes = None;
            return Ok(());
        };
        if ctx.host.text(corner).is_some_and(|text| !text.is_empty()) {
            ctx.host.set_text(corner, "").context("Failed to clear corner total")?;
        }
        if let Some((id, classes)) = self.original_classes.take()
            && id == corner
        {
            ctx.host.set_classes(corner, &classes).context("Failed to restore corner classes")?;
        }
        Ok(())
    }

    fn on_update<H: HostView>(
        &mut self,
        ctx: &mut OverlayContext<'_, H>,
    ) -> Result<(), OverlayError> {
        self.refresh(ctx.host)
    }
}
