use super::{COLUMN_HEADER_CELL, LEFT, Overlay, OverlayContext, cells_at_offsets};
use crate::error::OverlayError;
use crate::ownership::{Claim, Owner};
use tcard_domain::color::Color;
use tcard_host::{HostError, HostView, Selector};
use tracing::{debug, trace};

const WEEKEND_MARKERS: [&str; 2] = ["Sat,", "Sun,"];

/// Shades Saturday and Sunday columns. Outranks [`super::AlternateRowShader`].
#[derive(Debug)]
pub struct WeekendShader {
    color: Color,
}

impl Default for WeekendShader {
    fn default() -> Self {
        Self { color: Color::WEEKEND }
    }
}

impl WeekendShader {
    #[must_use]
    pub const fn new(color: Color) -> Self {
        Self { color }
    }

    /// Inline `left` offsets of the weekend header cells, in header order.
    pub fn weekend_offsets<H: HostView>(host: &H) -> Vec<String> {
        host.select(&Selector::class(COLUMN_HEADER_CELL))
            .into_iter()
            .filter(|cell| {
                host.text(*cell).is_some_and(|t| WEEKEND_MARKERS.iter().any(|m| t.contains(m)))
            })
            .filter_map(|cell| host.style(cell, LEFT))
            .collect()
    }

    fn shade<H: HostView>(&self, ctx: &mut OverlayContext<'_, H>) -> Result<(), OverlayError> {
        let offsets = Self::weekend_offsets(ctx.host);
        if offsets.is_empty() {
            trace!("No weekend columns rendered");
            return Ok(());
        }

        let paint = self.color.to_string();
        let mut shaded = 0usize;
        for cell in cells_at_offsets(ctx.host, &offsets) {
            match ctx.ownership.claim(ctx.host, cell, Owner::WEEKEND, &paint) {
                Ok(Claim::Applied) => shaded += 1,
                Ok(Claim::Outranked) | Err(HostError::Detached { .. }) => {},
                Err(e) => return Err(e.into()),
            }
        }
        debug!(columns = offsets.len(), elements = shaded, "Weekend columns shaded");
        Ok(())
    }
}

impl Overlay for WeekendShader {
    fn on_init<H: HostView>(&mut self, ctx: &mut OverlayContext<'_, H>) -> Result<(), OverlayError> {
        self.shade(ctx)
    }

    fn on_cleanup<H: HostView>(
        &mut self,
        ctx: &mut OverlayContext<'_, H>,
    ) -> Result<(), OverlayError> {
        ctx.ownership.release_all(ctx.host, Owner::WEEKEND);
        Ok(())
    }

    fn on_update<H: HostView>(
        &mut self,
        ctx: &mut OverlayContext<'_, H>,
    ) -> Result<(), OverlayError> {
        ctx.ownership.release_all(ctx.host, Owner::WEEKEND);
        self.shade(ctx)
    }

    fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    fn color(&self) -> Option<Color> {
        Some(self.color)
    }
}
