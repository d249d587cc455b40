use crate::error::HostError;
use crate::selector::Selector;
use std::fmt;
use tokio::sync::mpsc;

/// Stable key of one host element.
///
/// Keys are allocated monotonically and never recycled: after a re-render replaces an
/// element, its old key resolves to nothing instead of aliasing the replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(u64);

impl ElementId {
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Kind of structural change observed under the host root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    ChildrenAdded,
    ChildrenRemoved,
    TextReplaced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    /// Nodes were inserted or removed somewhere in the observed subtree.
    Structural { target: ElementId, kind: MutationKind },
    /// The host finished its initial load.
    Loaded,
}

/// Receiving end of an installed structural observer.
pub type MutationFeed = mpsc::UnboundedReceiver<HostEvent>;

/// The surface the overlay core may read and decorate.
///
/// Reads never fail: a missing element yields `None` or an empty result, since absence is
/// a normal transient state of a host that renders asynchronously. Writes report
/// [`HostError::Detached`] when the element disappeared in between.
pub trait HostView {
    fn contains(&self, element: ElementId) -> bool;

    /// Looks an element up by its document-unique id attribute.
    fn element_by_id(&self, dom_id: &str) -> Option<ElementId>;

    /// All matching elements in document order.
    fn select(&self, selector: &Selector) -> Vec<ElementId>;

    /// First match in document order.
    fn select_first(&self, selector: &Selector) -> Option<ElementId> {
        self.select(selector).into_iter().next()
    }

    /// 1-based position among the parent's children, as `:nth-child` counts.
    fn child_position(&self, element: ElementId) -> Option<usize>;

    /// Concatenated text of the element and its descendants.
    fn text(&self, element: ElementId) -> Option<String>;

    /// Replaces all children with a single text node.
    fn set_text(&mut self, element: ElementId, text: &str) -> Result<(), HostError>;

    fn style(&self, element: ElementId, property: &str) -> Option<String>;
    fn set_style(&mut self, element: ElementId, property: &str, value: &str)
    -> Result<(), HostError>;
    fn remove_style(&mut self, element: ElementId, property: &str) -> Result<(), HostError>;

    fn classes(&self, element: ElementId) -> Vec<String>;

    fn has_class(&self, element: ElementId, class: &str) -> bool {
        self.classes(element).iter().any(|c| c == class)
    }

    fn add_class(&mut self, element: ElementId, class: &str) -> Result<(), HostError>;
    fn remove_class(&mut self, element: ElementId, class: &str) -> Result<(), HostError>;
    fn set_classes(&mut self, element: ElementId, classes: &[String]) -> Result<(), HostError>;

    fn tag(&self, element: ElementId, key: &str) -> Option<String>;
    fn set_tag(&mut self, element: ElementId, key: &str, value: &str) -> Result<(), HostError>;
    fn remove_tag(&mut self, element: ElementId, key: &str) -> Result<(), HostError>;

    /// Installs (or replaces) a document-level style sheet identified by `id`.
    fn install_style_sheet(&mut self, id: &str, css: &str);

    /// Removes a previously installed style sheet. Returns whether one existed.
    fn remove_style_sheet(&mut self, id: &str) -> bool;

    /// Starts delivering structural changes of the whole document.
    fn observe(&mut self) -> MutationFeed;

    /// Stops every observer installed through [`HostView::observe`].
    fn disconnect(&mut self);
}
