use super::{
    CELL, CELL_FROZEN, COLUMN_HEADER_CELL, COLUMN_HEADER_FROZEN, DATABODY, Overlay,
    OverlayContext, ROW_END_HEADER_CELL, ROW_HEADER_CELL,
};
use crate::error::OverlayError;
use crate::ownership::{Claim, Owner};
use tcard_domain::color::Color;
use tcard_host::{ElementId, HostError, HostView, Selector};
use tracing::{debug, trace};

/// Shades every other grid row.
///
/// The grid renders three disjoint element sets per row: row headers (numbers and totals),
/// the frozen pane and the scrollable body. Header cells are picked by sibling position;
/// pane cells arrive as a flat run and are split into rows by that pane's column count.
#[derive(Debug)]
pub struct AlternateRowShader {
    color: Color,
}

impl Default for AlternateRowShader {
    fn default() -> Self {
        Self { color: Color::ALTERNATE_ROW }
    }
}

impl AlternateRowShader {
    #[must_use]
    pub const fn new(color: Color) -> Self {
        Self { color }
    }

    /// Every element this pass should shade, before precedence is applied.
    pub fn targets<H: HostView>(host: &H) -> Vec<ElementId> {
        let mut targets: Vec<_> = host
            .select(&Selector::any_class(&[ROW_HEADER_CELL, ROW_END_HEADER_CELL]))
            .into_iter()
            .filter(|cell| host.child_position(*cell).is_some_and(|p| p % 2 == 0))
            .collect();

        // Columns are counted as header cells, whatever their sibling position: resize
        // handles and other non-header siblings in the header row do not shift the split.
        let frozen_columns: usize = host
            .select(&Selector::class(COLUMN_HEADER_FROZEN))
            .into_iter()
            .map(|pane| host.select(&Selector::class(COLUMN_HEADER_CELL).within(pane)).len())
            .sum();
        let all_columns = host.select(&Selector::class(COLUMN_HEADER_CELL)).len();
        let body_columns = all_columns.saturating_sub(frozen_columns);

        let frozen = host.select(&Selector::class(CELL).and_class(CELL_FROZEN));
        targets.extend(odd_rows(frozen, frozen_columns));

        let body: Vec<_> = host
            .select(&Selector::class(DATABODY))
            .into_iter()
            .flat_map(|pane| {
                host.select(&Selector::class(CELL).without_class(CELL_FROZEN).within(pane))
            })
            .collect();
        targets.extend(odd_rows(body, body_columns));

        targets
    }

    fn shade<H: HostView>(&self, ctx: &mut OverlayContext<'_, H>) -> Result<(), OverlayError> {
        let targets = Self::targets(ctx.host);
        if targets.is_empty() {
            trace!("No alternate rows rendered");
            return Ok(());
        }

        let paint = self.color.to_string();
        let (mut shaded, mut skipped) = (0usize, 0usize);
        for cell in targets {
            match ctx.ownership.claim(ctx.host, cell, Owner::ALTERNATE, &paint) {
                Ok(Claim::Applied) => shaded += 1,
                Ok(Claim::Outranked) => skipped += 1,
                Err(HostError::Detached { .. }) => {},
                Err(e) => return Err(e.into()),
            }
        }
        debug!(elements = shaded, outranked = skipped, "Alternate rows shaded");
        Ok(())
    }
}

/// Cells of odd 0-based rows, given a flat row-major run with `columns` cells per row.
fn odd_rows(cells: Vec<ElementId>, columns: usize) -> impl Iterator<Item = ElementId> {
    cells
        .into_iter()
        .enumerate()
        .filter(move |(i, _)| columns > 0 && (i / columns) % 2 == 1)
        .map(|(_, cell)| cell)
}

impl Overlay for AlternateRowShader {
    fn on_init<H: HostView>(&mut self, ctx: &mut OverlayContext<'_, H>) -> Result<(), OverlayError> {
        self.shade(ctx)
    }

    fn on_cleanup<H: HostView>(
        &mut self,
        ctx: &mut OverlayContext<'_, H>,
    ) -> Result<(), OverlayError> {
        ctx.ownership.release_all(ctx.host, Owner::ALTERNATE);
        Ok(())
    }

    fn on_update<H: HostView>(
        &mut self,
        ctx: &mut OverlayContext<'_, H>,
    ) -> Result<(), OverlayError> {
        ctx.ownership.release_all(ctx.host, Owner::ALTERNATE);
        self.shade(ctx)
    }

    fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    fn color(&self) -> Option<Color> {
        Some(self.color)
    }
}
