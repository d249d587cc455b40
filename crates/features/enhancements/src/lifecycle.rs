//! # Enhancement Lifecycle
//!
//! `Uninitialized -> Initialized` via [`Enhancement::init`], back via
//! [`Enhancement::cleanup`], with an orthogonal `enabled` flag that only
//! [`Enhancement::set_enabled`] changes after registration.
//!
//! Hook failures never escape: they are logged and the flags still transition, so the
//! next pass starts from a known state and retries.

use crate::error::OverlayError;
use crate::strategy::{
    AlternateRowShader, BoundaryMarker, Overlay, OverlayContext, Strategy, TotalsAggregator,
    WeekendShader,
};
use std::borrow::Cow;
use tcard_domain::color::Color;
use tcard_domain::constants::{
    ALTERNATE_LINE_SHADING, DYNAMIC_RED_LINE, TIMECARD_TOTALS, WEEKEND_SHADING,
};
use tcard_domain::enhancement::EnhancementInfo;
use tcard_host::HostView;
use tracing::{debug, error};

#[derive(Debug)]
pub struct Enhancement {
    name: Cow<'static, str>,
    description: Cow<'static, str>,
    default_enabled: bool,
    enabled: bool,
    initialized: bool,
    strategy: Strategy,
}

impl Enhancement {
    pub fn new(
        name: impl Into<Cow<'static, str>>,
        description: impl Into<Cow<'static, str>>,
        default_enabled: bool,
        strategy: Strategy,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            default_enabled,
            enabled: default_enabled,
            initialized: false,
            strategy,
        }
    }

    #[must_use]
    pub fn timecard_totals() -> Self {
        Self::new(
            TIMECARD_TOTALS,
            "Calculate and display total hours in the bottom-right corner",
            true,
            Strategy::Totals(TotalsAggregator::new()),
        )
    }

    #[must_use]
    pub fn weekend_shading() -> Self {
        Self::new(
            WEEKEND_SHADING,
            "Apply subtle gray shading to weekend columns (Saturday & Sunday)",
            true,
            Strategy::Weekend(WeekendShader::default()),
        )
    }

    #[must_use]
    pub fn alternate_line_shading() -> Self {
        Self::new(
            ALTERNATE_LINE_SHADING,
            "Apply subtle gray shading to alternate rows",
            true,
            Strategy::Alternate(AlternateRowShader::default()),
        )
    }

    #[must_use]
    pub fn dynamic_red_line() -> Self {
        Self::new(
            DYNAMIC_RED_LINE,
            "Display a single red line before the current date column instead of static weekly lines",
            true,
            Strategy::Boundary(BoundaryMarker::default()),
        )
    }

    /// The four built-in enhancements in registration order.
    #[must_use]
    pub fn builtin() -> [Self; 4] {
        [
            Self::timecard_totals(),
            Self::weekend_shading(),
            Self::alternate_line_shading(),
            Self::dynamic_red_line(),
        ]
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.initialized
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.enabled && self.initialized
    }

    #[must_use]
    pub const fn default_enabled(&self) -> bool {
        self.default_enabled
    }

    #[must_use]
    pub const fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    #[must_use]
    pub fn info(&self) -> EnhancementInfo {
        EnhancementInfo {
            name: self.name.to_string(),
            description: self.description.to_string(),
            enabled: self.enabled,
            default_enabled: self.default_enabled,
        }
    }

    /// Applies a persisted preference before anything was initialized.
    pub(crate) const fn restore_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn init<H: HostView>(&mut self, ctx: &mut OverlayContext<'_, H>) {
        if self.initialized {
            return;
        }
        let result = self.strategy.on_init(ctx);
        self.report("init", result);
        self.initialized = true;
    }

    pub fn cleanup<H: HostView>(&mut self, ctx: &mut OverlayContext<'_, H>) {
        if !self.initialized {
            return;
        }
        let result = self.strategy.on_cleanup(ctx);
        self.report("cleanup", result);
        self.initialized = false;
    }

    pub fn update<H: HostView>(&mut self, ctx: &mut OverlayContext<'_, H>) {
        if !self.is_active() {
            return;
        }
        let result = self.strategy.on_update(ctx);
        self.report("update", result);
    }

    /// Full release-and-reclaim, used by coordination passes and color changes.
    pub fn force_update<H: HostView>(&mut self, ctx: &mut OverlayContext<'_, H>) {
        if !self.is_active() {
            return;
        }
        let result = self.strategy.on_force_update(ctx);
        self.report("force update", result);
    }

    /// Returns whether the state actually changed.
    pub fn set_enabled<H: HostView>(
        &mut self,
        enabled: bool,
        ctx: &mut OverlayContext<'_, H>,
    ) -> bool {
        if self.enabled == enabled {
            return false;
        }
        self.enabled = enabled;
        if enabled {
            self.init(ctx);
        } else {
            self.cleanup(ctx);
        }
        debug!(enhancement = %self.name, enabled, "Enhancement toggled");
        true
    }

    /// Swaps the color without touching the host. Returns `false` for overlays without one.
    pub fn set_color(&mut self, color: Color) -> bool {
        if self.strategy.color().is_none() {
            return false;
        }
        self.strategy.set_color(color);
        true
    }

    #[must_use]
    pub fn color(&self) -> Option<Color> {
        self.strategy.color()
    }

    fn report(&self, hook: &'static str, result: Result<(), OverlayError>) {
        if let Err(e) = result {
            error!(enhancement = %self.name, hook, error = %e, "Enhancement hook failed");
        }
    }
}
