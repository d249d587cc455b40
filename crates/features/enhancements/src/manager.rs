//! # Enhancement Manager
//!
//! Owns the registry, the cached preference record, the ownership table and the pass
//! scheduler. All host access happens through `&mut self`, so passes are serialized by
//! construction.
//!
//! ## Startup
//! 1. **Preferences**: enabled flags and colors are read from the store; failures fall back
//!    to defaults.
//! 2. **Initialization**: enabled enhancements are initialized in registration order.
//! 3. **Watcher**: a structural observer is installed on the host.
//!
//! ## Coordination
//! Toggling either shading overlay schedules a coordination pass after the settle delay.
//! It forces the alternate-row shader to release and reclaim so its claims match the
//! weekend shader's latest state.

use crate::error::{OverlayError, OverlayErrorExt};
use crate::lifecycle::Enhancement;
use crate::ownership::OwnershipTable;
use crate::scheduler::{DueBatch, Pass, PassScheduler};
use crate::strategy::OverlayContext;
use crate::watcher::ChangeWatcher;
use fxhash::FxHashMap;
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tcard_domain::color::Color;
use tcard_domain::config::TimingConfig;
use tcard_domain::constants::{
    ALL_PREFERENCE_KEYS, ALTERNATE_LINE_SHADING, PREFERENCES_KEY, WEEKEND_SHADING,
};
use tcard_domain::enhancement::EnhancementInfo;
use tcard_domain::preferences::{ColorSlot, Preferences};
use tcard_host::{HostEvent, HostView};
use tcard_kernel::clock::Clock;
use tcard_storage::{PreferenceStore, Record};
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

/// Number of `update_all` passes run so far. Clones share the count.
#[derive(Debug, Clone, Default)]
pub struct PassCounter(Arc<AtomicU64>);

impl PassCounter {
    #[must_use]
    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Acquire)
    }

    fn increment(&self) -> u64 {
        self.0.fetch_add(1, Ordering::AcqRel) + 1
    }
}

/// Result of a command that mutated state.
#[derive(Debug)]
pub struct CommandOutcome {
    pub changed: bool,
    /// Persistence failed; the in-memory change stands.
    pub warning: Option<OverlayError>,
}

impl CommandOutcome {
    const fn unchanged() -> Self {
        Self { changed: false, warning: None }
    }
}

#[derive(Debug)]
pub struct EnhancementManager<H: HostView, S: PreferenceStore> {
    host: H,
    store: S,
    clock: Arc<dyn Clock>,
    timing: TimingConfig,
    enhancements: Vec<Enhancement>,
    index: FxHashMap<String, usize>,
    ownership: OwnershipTable,
    preferences: Preferences,
    scheduler: PassScheduler,
    passes: PassCounter,
    initialized: bool,
}

impl<H: HostView, S: PreferenceStore> EnhancementManager<H, S> {
    pub fn new(host: H, store: S, clock: Arc<dyn Clock>, timing: TimingConfig) -> Self {
        Self {
            host,
            store,
            clock,
            timing,
            enhancements: Vec::new(),
            index: FxHashMap::default(),
            ownership: OwnershipTable::new(),
            preferences: Preferences::default(),
            scheduler: PassScheduler::new(),
            passes: PassCounter::default(),
            initialized: false,
        }
    }

    /// A manager with the four built-in enhancements registered.
    pub fn with_builtin(host: H, store: S, clock: Arc<dyn Clock>, timing: TimingConfig) -> Self {
        let mut manager = Self::new(host, store, clock, timing);
        for enhancement in Enhancement::builtin() {
            manager.register_enhancement(enhancement);
        }
        manager
    }

    /// Inserts by name. Re-registering a name replaces the previous entry in place.
    pub fn register_enhancement(&mut self, enhancement: Enhancement) {
        let name = enhancement.name().to_owned();
        if let Some(&slot) = self.index.get(&name) {
            debug!(enhancement = %name, "Enhancement re-registered");
            self.enhancements[slot] = enhancement;
        } else {
            self.index.insert(name, self.enhancements.len());
            self.enhancements.push(enhancement);
        }
    }

    /// Loads preferences, initializes enabled enhancements and installs the watcher.
    ///
    /// Calling it again is a no-op that returns a detached watcher.
    pub async fn init(&mut self) -> ChangeWatcher {
        if self.initialized {
            return ChangeWatcher::detached();
        }
        if let Err(e) = self.load_preferences().await {
            warn!(error = %e, "Preferences unavailable, using defaults");
        }

        for index in 0..self.enhancements.len() {
            if self.enhancements[index].is_enabled() {
                self.with_enhancement(index, |e, ctx| e.init(ctx));
            }
        }

        let watcher = ChangeWatcher::new(self.host.observe());
        self.initialized = true;
        info!(
            registered = self.enhancements.len(),
            enabled = self.enhancements.iter().filter(|e| e.is_enabled()).count(),
            "Enhancement manager initialized"
        );
        watcher
    }

    /// Turns an enhancement on or off, persists the preference set and schedules the
    /// follow-up passes.
    ///
    /// # Errors
    /// [`OverlayError::NotFound`] for an unknown name. Persistence failures are reported
    /// through [`CommandOutcome::warning`].
    pub async fn set_enhancement_enabled(
        &mut self,
        name: &str,
        enabled: bool,
    ) -> Result<CommandOutcome, OverlayError> {
        let index = self.position(name).ok_or_else(|| OverlayError::not_found(name.to_owned()))?;
        if !self.with_enhancement(index, |e, ctx| e.set_enabled(enabled, ctx)) {
            return Ok(CommandOutcome::unchanged());
        }

        let warning = self.save_preferences().await.err();
        if let Some(e) = &warning {
            warn!(enhancement = name, error = %e, "Toggle not persisted");
        }

        let now = Instant::now();
        if name == WEEKEND_SHADING || name == ALTERNATE_LINE_SHADING {
            self.scheduler.schedule(
                Pass::Coordinate { changed: name.to_owned() },
                now + self.timing.settle_delay(),
            );
        }
        if enabled {
            self.scheduler
                .schedule(Pass::Refresh { name: name.to_owned() }, now + self.timing.refresh_delay());
        }
        Ok(CommandOutcome { changed: true, warning })
    }

    /// Changes an overlay color, re-applies it when active and persists it.
    ///
    /// # Errors
    /// [`OverlayError::NotFound`] when the overlay painting with `slot` is not registered.
    pub async fn set_color(
        &mut self,
        slot: ColorSlot,
        color: Color,
    ) -> Result<CommandOutcome, OverlayError> {
        let name = slot.enhancement();
        let index = self.position(name).ok_or_else(|| OverlayError::not_found(name))?;
        self.with_enhancement(index, |e, ctx| {
            e.set_color(color);
            e.force_update(ctx);
        });
        self.preferences.set_color(slot, color);

        let mut record = Record::new();
        record.insert(slot.storage_key().to_owned(), Value::String(color.to_string()));
        let warning = self.store.set(record).await.context("Failed to save color").err();
        if let Some(e) = &warning {
            warn!(enhancement = name, error = %e, "Color not persisted");
        }
        debug!(enhancement = name, %color, "Color updated");
        Ok(CommandOutcome { changed: true, warning })
    }

    /// Re-runs every active enhancement in registration order.
    pub fn update_all(&mut self) {
        let pass = self.passes.increment();
        let pruned = self.ownership.prune(&self.host);
        for index in 0..self.enhancements.len() {
            self.with_enhancement(index, |e, ctx| e.update(ctx));
        }
        trace!(pass, pruned, owned = self.ownership.len(), "Update pass finished");
    }

    /// Forces the alternate-row shader to release and reclaim after a shading toggle.
    pub fn coordinate_shading(&mut self, changed: &str) {
        let (Some(weekend), Some(alternate)) =
            (self.position(WEEKEND_SHADING), self.position(ALTERNATE_LINE_SHADING))
        else {
            return;
        };
        let weekend_enabled = self.enhancements[weekend].is_enabled();
        let alternate_enabled = self.enhancements[alternate].is_enabled();

        let rerun = alternate_enabled
            && (changed == WEEKEND_SHADING || (changed == ALTERNATE_LINE_SHADING && weekend_enabled));
        if rerun {
            debug!(changed, "Coordinating shading ownership");
            self.with_enhancement(alternate, |e, ctx| e.force_update(ctx));
        }
    }

    /// Re-applies one enhancement if it is still active.
    pub fn refresh(&mut self, name: &str) {
        if let Some(index) = self.position(name) {
            self.with_enhancement(index, |e, ctx| e.update(ctx));
        }
    }

    #[must_use]
    pub fn get_all_enhancements(&self) -> Vec<EnhancementInfo> {
        self.enhancements.iter().map(Enhancement::info).collect()
    }

    /// Feeds one host event into the scheduler.
    pub fn on_host_event(&mut self, event: HostEvent) {
        let now = Instant::now();
        match event {
            HostEvent::Structural { .. } => {
                self.scheduler.debounce(now + self.timing.quiet_window());
            },
            HostEvent::Loaded => {
                debug!("Host loaded, scheduling first pass");
                self.scheduler.schedule(Pass::Loaded, now + self.timing.load_delay());
            },
        }
    }

    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.scheduler.next_deadline()
    }

    /// Runs everything due at `now`: coordination, then refreshes, then one `update_all`.
    pub fn run_due(&mut self, now: Instant) -> DueBatch {
        let batch = self.scheduler.take_due(now);
        for changed in &batch.coordinations {
            self.coordinate_shading(changed);
        }
        for name in &batch.refreshes {
            self.refresh(name);
        }
        if batch.update_all {
            self.update_all();
        }
        batch
    }

    /// Disconnects the watcher, drops pending passes and cleans up every enhancement.
    pub fn cleanup(&mut self) {
        self.host.disconnect();
        self.scheduler.clear();
        for index in 0..self.enhancements.len() {
            self.with_enhancement(index, |e, ctx| e.cleanup(ctx));
        }
        self.initialized = false;
        info!("Enhancement manager cleaned up");
    }

    /// Reads enabled flags and colors from the store into the registry.
    ///
    /// # Errors
    /// [`OverlayError::Persistence`] if the store rejects the read.
    pub async fn load_preferences(&mut self) -> Result<(), OverlayError> {
        let record =
            self.store.get(&ALL_PREFERENCE_KEYS).await.context("Failed to load preferences")?;
        let preferences = decode_preferences(record);

        for enhancement in &mut self.enhancements {
            if let Some(enabled) = preferences.enabled(enhancement.name()) {
                enhancement.restore_enabled(enabled);
            }
        }
        for slot in ColorSlot::ALL {
            if let Some(color) = preferences.color(slot)
                && let Some(index) = self.position(slot.enhancement())
            {
                self.enhancements[index].set_color(color);
            }
        }
        debug!(stored = preferences.enhancement_preferences.len(), "Preferences loaded");
        self.preferences = preferences;
        Ok(())
    }

    /// Persists the enabled flag of every registered enhancement.
    ///
    /// # Errors
    /// [`OverlayError::Persistence`] if the store rejects the write.
    pub async fn save_preferences(&mut self) -> Result<(), OverlayError> {
        for enhancement in &self.enhancements {
            self.preferences.set_enabled(enhancement.name(), enhancement.is_enabled());
        }
        let flags = self
            .preferences
            .enhancement_preferences
            .iter()
            .map(|(name, enabled)| (name.clone(), Value::Bool(*enabled)))
            .collect();

        let mut record = Record::new();
        record.insert(PREFERENCES_KEY.to_owned(), Value::Object(flags));
        self.store.set(record).await.context("Failed to save preferences")
    }

    #[must_use]
    pub fn enhancement(&self, name: &str) -> Option<&Enhancement> {
        self.position(name).map(|index| &self.enhancements[index])
    }

    #[must_use]
    pub const fn host(&self) -> &H {
        &self.host
    }

    #[must_use]
    pub const fn ownership(&self) -> &OwnershipTable {
        &self.ownership
    }

    #[must_use]
    pub const fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    #[must_use]
    pub const fn timing(&self) -> &TimingConfig {
        &self.timing
    }

    #[must_use]
    pub fn pass_counter(&self) -> PassCounter {
        self.passes.clone()
    }

    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    fn with_enhancement<R>(
        &mut self,
        index: usize,
        f: impl FnOnce(&mut Enhancement, &mut OverlayContext<'_, H>) -> R,
    ) -> R {
        let mut ctx = OverlayContext {
            host: &mut self.host,
            ownership: &mut self.ownership,
            clock: self.clock.as_ref(),
        };
        f(&mut self.enhancements[index], &mut ctx)
    }
}

/// Decodes each key on its own so one bad value does not discard the rest.
fn decode_preferences(mut record: Record) -> Preferences {
    let mut preferences = Preferences::default();

    if let Some(value) = record.remove(PREFERENCES_KEY) {
        match serde_json::from_value(value) {
            Ok(flags) => preferences.enhancement_preferences = flags,
            Err(e) => warn!(key = PREFERENCES_KEY, error = %e, "Ignoring stored flags"),
        }
    }
    for slot in ColorSlot::ALL {
        let Some(value) = record.remove(slot.storage_key()) else {
            continue;
        };
        match serde_json::from_value::<Color>(value) {
            Ok(color) => preferences.set_color(slot, color),
            Err(e) => warn!(key = slot.storage_key(), error = %e, "Ignoring stored color"),
        }
    }
    preferences
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decode_skips_bad_values() {
        let mut record = Record::new();
        record.insert(PREFERENCES_KEY.into(), json!({ "weekend-shading": false }));
        record.insert("weekendShadeColor".into(), json!("not a color"));
        record.insert("redLineColor".into(), json!("#0000ff"));

        let preferences = decode_preferences(record);
        assert_eq!(preferences.enabled(WEEKEND_SHADING), Some(false));
        assert_eq!(preferences.color(ColorSlot::Weekend), None);
        assert_eq!(preferences.color(ColorSlot::BoundaryMarker), Some(Color::rgb(0, 0, 255)));
    }

    #[test]
    fn decode_tolerates_wrong_shapes() {
        let mut record = Record::new();
        record.insert(PREFERENCES_KEY.into(), json!(["weekend-shading"]));
        assert_eq!(decode_preferences(record), Preferences::default());
    }
}
