//! The four overlay strategies and the context they run in.
//!
//! Strategies are a closed set: [`Strategy`] dispatches to the concrete overlay. Each one
//! recomputes its targets from the current host snapshot on every pass and keeps no element
//! handles across passes except through the [`OwnershipTable`] or host tags.

mod alternate;
mod boundary;
mod totals;
mod weekend;

pub use alternate::AlternateRowShader;
pub use boundary::{BoundaryMarker, today_label};
pub use totals::{TotalsAggregator, parse_hours};
pub use weekend::WeekendShader;

use crate::error::OverlayError;
use crate::ownership::OwnershipTable;
use tcard_domain::color::Color;
use tcard_host::{ElementId, HostView, Selector};
use tcard_kernel::clock::Clock;

// Host view conventions.
pub(crate) const CELL: &str = "oj-datagrid-cell";
pub(crate) const CELL_FROZEN: &str = "oj-datagrid-cell-frozen";
pub(crate) const DATABODY: &str = "oj-datagrid-databody";
pub(crate) const COLUMN_HEADER_CELL: &str = "oj-datagrid-column-header-cell";
pub(crate) const COLUMN_HEADER_FROZEN: &str = "oj-datagrid-column-header-frozen";
pub(crate) const COLUMN_END_HEADER_CELL: &str = "oj-datagrid-column-end-header-cell";
pub(crate) const ROW_HEADER_CELL: &str = "oj-datagrid-row-header-cell";
pub(crate) const ROW_END_HEADER_CELL: &str = "oj-datagrid-row-end-header-cell";
pub(crate) const END_HEADER_CELL: &str = "oj-datagrid-end-header-cell";
pub(crate) const LEFT: &str = "left";

/// Everything a strategy may touch during one hook call.
pub struct OverlayContext<'a, H: HostView> {
    pub host: &'a mut H,
    pub ownership: &'a mut OwnershipTable,
    pub clock: &'a dyn Clock,
}

impl<H: HostView> std::fmt::Debug for OverlayContext<'_, H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayContext")
            .field("ownership", &self.ownership)
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

/// Hooks every overlay implements. Lifecycle bookkeeping lives in
/// [`crate::lifecycle::Enhancement`]; these only touch the host.
pub trait Overlay {
    fn on_init<H: HostView>(&mut self, ctx: &mut OverlayContext<'_, H>) -> Result<(), OverlayError>;

    fn on_cleanup<H: HostView>(
        &mut self,
        ctx: &mut OverlayContext<'_, H>,
    ) -> Result<(), OverlayError>;

    fn on_update<H: HostView>(
        &mut self,
        ctx: &mut OverlayContext<'_, H>,
    ) -> Result<(), OverlayError>;

    /// Full release-and-reclaim. Defaults to a regular update.
    fn on_force_update<H: HostView>(
        &mut self,
        ctx: &mut OverlayContext<'_, H>,
    ) -> Result<(), OverlayError> {
        self.on_update(ctx)
    }

    /// Overlays without a customizable color ignore this.
    fn set_color(&mut self, _color: Color) {}

    fn color(&self) -> Option<Color> {
        None
    }
}

#[derive(Debug)]
pub enum Strategy {
    Totals(TotalsAggregator),
    Weekend(WeekendShader),
    Alternate(AlternateRowShader),
    Boundary(BoundaryMarker),
}

macro_rules! dispatch {
    ($self:ident, $inner:ident => $body:expr) => {
        match $self {
            Strategy::Totals($inner) => $body,
            Strategy::Weekend($inner) => $body,
            Strategy::Alternate($inner) => $body,
            Strategy::Boundary($inner) => $body,
        }
    };
}

impl Overlay for Strategy {
    fn on_init<H: HostView>(&mut self, ctx: &mut OverlayContext<'_, H>) -> Result<(), OverlayError> {
        dispatch!(self, s => s.on_init(ctx))
    }

    fn on_cleanup<H: HostView>(
        &mut self,
        ctx: &mut OverlayContext<'_, H>,
    ) -> Result<(), OverlayError> {
        dispatch!(self, s => s.on_cleanup(ctx))
    }

    fn on_update<H: HostView>(
        &mut self,
        ctx: &mut OverlayContext<'_, H>,
    ) -> Result<(), OverlayError> {
        dispatch!(self, s => s.on_update(ctx))
    }

    fn on_force_update<H: HostView>(
        &mut self,
        ctx: &mut OverlayContext<'_, H>,
    ) -> Result<(), OverlayError> {
        dispatch!(self, s => s.on_force_update(ctx))
    }

    fn set_color(&mut self, color: Color) {
        dispatch!(self, s => s.set_color(color));
    }

    fn color(&self) -> Option<Color> {
        dispatch!(self, s => s.color())
    }
}

/// Column header cells whose inline `left` equals one of `offsets`, plus body and
/// end-header cells in the same columns.
pub(crate) fn cells_at_offsets<H: HostView>(host: &H, offsets: &[String]) -> Vec<ElementId> {
    if offsets.is_empty() {
        return Vec::new();
    }
    let columns = Selector::any_class(&[CELL, COLUMN_HEADER_CELL, COLUMN_END_HEADER_CELL]);
    host.select(&columns)
        .into_iter()
        .filter(|cell| host.style(*cell, LEFT).is_some_and(|left| offsets.contains(&left)))
        .collect()
}
