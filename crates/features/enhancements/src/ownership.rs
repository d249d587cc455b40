//! # Ownership Table
//!
//! Two shading overlays paint the same inline property of the same host elements. The
//! table records, per element, which overlays currently claim it and the appearance the
//! element had before the *first* claim, so the last release can restore the true baseline.
//!
//! ## Rules
//! 1. **First claim captures**: the original appearance is read once, when the record is
//!    created, and never overwritten by later claims.
//! 2. **Precedence**: a claim is refused while a higher-priority owner holds the element.
//! 3. **Last release restores**: releasing a shared element drops the releasing owner and
//!    repaints the element with the remaining owner's paint; the original comes back only
//!    when no owner is left.
//!
//! Ownership is mirrored on the host as `<owner tag> = "true"` so the host-side state stays
//! inspectable.

use bitflags::bitflags;
use fxhash::FxHashMap;
use tcard_host::{ElementId, HostError, HostView};
use tracing::trace;

/// The inline style property both shading overlays override.
pub const APPEARANCE: &str = "background-color";

bitflags! {
    /// Overlays that may claim an element's appearance.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Owner: u8 {
        const WEEKEND = 1 << 0;
        const ALTERNATE = 1 << 1;
    }
}

impl Owner {
    /// Host tag mirroring this owner's claim.
    #[must_use]
    pub fn tag(self) -> &'static str {
        if self == Self::WEEKEND {
            "weekend-shaded"
        } else if self == Self::ALTERNATE {
            "alternate-rows-shaded"
        } else {
            "shaded"
        }
    }

    /// Owners whose claims win over this one.
    #[must_use]
    pub fn outranked_by(self) -> Self {
        if self == Self::ALTERNATE { Self::WEEKEND } else { Self::empty() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct OwnershipRecord {
    /// `None` means the property was unset.
    original: Option<String>,
    /// Each owner's paint, at most one entry per owner.
    claims: Vec<(Owner, String)>,
}

impl OwnershipRecord {
    fn owners(&self) -> Owner {
        self.claims.iter().fold(Owner::empty(), |acc, (owner, _)| acc | *owner)
    }

    /// Paint of the owner no other current owner outranks.
    fn winning_paint(&self) -> Option<&str> {
        let owners = self.owners();
        self.claims
            .iter()
            .find(|(owner, _)| !owners.intersects(owner.outranked_by()))
            .map(|(_, paint)| paint.as_str())
    }

    fn set_paint(&mut self, owner: Owner, paint: &str) {
        match self.claims.iter_mut().find(|(o, _)| *o == owner) {
            Some((_, current)) => paint.clone_into(current),
            None => self.claims.push((owner, paint.to_owned())),
        }
    }
}

/// Outcome of a claim attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Claim {
    Applied,
    /// A higher-priority owner holds the element.
    Outranked,
}

#[derive(Debug, Default)]
pub struct OwnershipTable {
    records: FxHashMap<ElementId, OwnershipRecord>,
}

impl OwnershipTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `element` for `owner` and paints it with `paint`.
    ///
    /// # Errors
    /// Returns [`HostError::Detached`] if the element vanished; the table is left untouched.
    pub fn claim<H: HostView>(
        &mut self,
        host: &mut H,
        element: ElementId,
        owner: Owner,
        paint: &str,
    ) -> Result<Claim, HostError> {
        if !host.contains(element) {
            return Err(HostError::detached(element));
        }
        let baseline = match self.records.get(&element) {
            Some(record) if record.owners().intersects(owner.outranked_by()) => {
                return Ok(Claim::Outranked);
            },
            Some(_) => None,
            None => Some(host.style(element, APPEARANCE)),
        };

        host.set_style(element, APPEARANCE, paint)?;
        host.set_tag(element, owner.tag(), "true")?;

        self.records
            .entry(element)
            .or_insert_with(|| OwnershipRecord { original: baseline.flatten(), claims: Vec::new() })
            .set_paint(owner, paint);
        Ok(Claim::Applied)
    }

    /// Releases `owner`'s claim on `element`. A remaining owner's paint takes over; with no
    /// owner left the original appearance is restored.
    ///
    /// # Errors
    /// Returns [`HostError::Detached`] if the element vanished; its record is dropped.
    pub fn release<H: HostView>(
        &mut self,
        host: &mut H,
        element: ElementId,
        owner: Owner,
    ) -> Result<(), HostError> {
        if !host.contains(element) {
            self.records.remove(&element);
            return Err(HostError::detached(element));
        }

        host.remove_tag(element, owner.tag())?;
        let Some(record) = self.records.get_mut(&element) else {
            return Ok(());
        };
        record.claims.retain(|(o, _)| *o != owner);
        if let Some(paint) = record.winning_paint() {
            let paint = paint.to_owned();
            return host.set_style(element, APPEARANCE, &paint);
        }

        match self.records.remove(&element).and_then(|r| r.original) {
            Some(original) => host.set_style(element, APPEARANCE, &original),
            None => host.remove_style(element, APPEARANCE),
        }
    }

    /// Releases every element `owner` holds. Detached elements are dropped silently.
    ///
    /// Returns the number of live elements released.
    pub fn release_all<H: HostView>(&mut self, host: &mut H, owner: Owner) -> usize {
        let mut released = 0;
        for element in self.owned_by(owner) {
            if self.release(host, element, owner).is_ok() {
                released += 1;
            }
        }
        trace!(owner = owner.tag(), released, "Ownership released");
        released
    }

    /// Elements currently claimed by `owner`, in identifier order.
    #[must_use]
    pub fn owned_by(&self, owner: Owner) -> Vec<ElementId> {
        let mut owned: Vec<_> = self
            .records
            .iter()
            .filter(|(_, r)| r.owners().contains(owner))
            .map(|(id, _)| *id)
            .collect();
        owned.sort_unstable();
        owned
    }

    #[must_use]
    pub fn owners(&self, element: ElementId) -> Owner {
        self.records.get(&element).map_or(Owner::empty(), OwnershipRecord::owners)
    }

    #[must_use]
    pub fn is_claimed_by(&self, element: ElementId, owner: Owner) -> bool {
        self.owners(element).contains(owner)
    }

    /// The recorded baseline: `None` if untracked, `Some(None)` if it was unset.
    #[must_use]
    pub fn original(&self, element: ElementId) -> Option<Option<&str>> {
        self.records.get(&element).map(|r| r.original.as_deref())
    }

    /// Drops records whose element was removed by a re-render. Returns how many went away.
    pub fn prune<H: HostView>(&mut self, host: &H) -> usize {
        let before = self.records.len();
        self.records.retain(|element, _| host.contains(*element));
        before - self.records.len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
