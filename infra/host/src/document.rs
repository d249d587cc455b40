use crate::error::{HostError, HostErrorExt};
use crate::fixture::ElementFixture;
use crate::selector::Selector;
use crate::view::{ElementId, HostEvent, HostView, MutationFeed, MutationKind};
use fxhash::FxHashMap;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::trace;

#[derive(Debug, Default)]
struct Node {
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    dom_id: Option<String>,
    classes: Vec<String>,
    style: BTreeMap<String, String>,
    tags: BTreeMap<String, String>,
    text: String,
}

#[derive(Debug)]
struct Document {
    root: ElementId,
    nodes: FxHashMap<ElementId, Node>,
    next_id: u64,
    sheets: BTreeMap<String, String>,
    observers: Vec<mpsc::UnboundedSender<HostEvent>>,
    loaded: bool,
}

impl Document {
    fn new() -> Self {
        let root = ElementId::new(0);
        let mut nodes = FxHashMap::default();
        nodes.insert(root, Node::default());
        Self {
            root,
            nodes,
            next_id: 1,
            sheets: BTreeMap::new(),
            observers: Vec::new(),
            loaded: false,
        }
    }

    fn node(&self, id: ElementId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    fn node_mut(&mut self, id: ElementId) -> Result<&mut Node, HostError> {
        self.nodes.get_mut(&id).ok_or_else(|| HostError::detached(id))
    }

    fn notify(&mut self, event: HostEvent) {
        self.observers.retain(|tx| tx.send(event).is_ok());
    }

    fn insert(&mut self, parent: ElementId, fixture: ElementFixture) -> ElementId {
        let id = ElementId::new(self.next_id);
        self.next_id += 1;

        let node = Node {
            parent: Some(parent),
            children: Vec::new(),
            dom_id: fixture.id.clone(),
            classes: fixture.class_list(),
            style: fixture.style,
            tags: fixture.tags,
            text: fixture.text,
        };
        self.nodes.insert(id, node);
        if let Some(parent) = self.nodes.get_mut(&parent) {
            parent.children.push(id);
        }

        for child in fixture.children {
            self.insert(id, child);
        }
        id
    }

    fn drop_subtree(&mut self, id: ElementId) {
        if let Some(node) = self.nodes.remove(&id) {
            for child in node.children {
                self.drop_subtree(child);
            }
        }
    }

    fn detach(&mut self, id: ElementId) {
        let parent = self.node(id).and_then(|n| n.parent);
        if let Some(parent) = parent.and_then(|p| self.nodes.get_mut(&p)) {
            parent.children.retain(|c| *c != id);
        }
        self.drop_subtree(id);
    }

    fn descendants(&self, from: ElementId, include_self: bool, out: &mut Vec<ElementId>) {
        if include_self {
            out.push(from);
        }
        if let Some(node) = self.node(from) {
            for child in &node.children {
                self.descendants(*child, true, out);
            }
        }
    }

    fn text_of(&self, id: ElementId, out: &mut String) {
        if let Some(node) = self.node(id) {
            out.push_str(&node.text);
            for child in &node.children {
                self.text_of(*child, out);
            }
        }
    }
}

/// A cloneable handle to an in-memory host document.
///
/// Clones share the same document, which lets a test (or the agent) play the part of the
/// host application re-rendering its view while the overlay core decorates it.
#[derive(Debug, Clone)]
pub struct MemoryHost {
    doc: Arc<Mutex<Document>>,
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryHost {
    /// An empty document holding only its root element.
    #[must_use]
    pub fn new() -> Self {
        Self { doc: Arc::new(Mutex::new(Document::new())) }
    }

    /// Builds a document whose root children are the fixture's children.
    ///
    /// The fixture's own id, classes and styles are applied to the root element.
    #[must_use]
    pub fn from_fixture(fixture: ElementFixture) -> Self {
        let host = Self::new();
        {
            let mut doc = host.doc.lock();
            let root = doc.root;
            if let Some(node) = doc.nodes.get_mut(&root) {
                node.dom_id.clone_from(&fixture.id);
                node.classes = fixture.class_list();
                node.style.clone_from(&fixture.style);
                node.tags.clone_from(&fixture.tags);
                node.text.clone_from(&fixture.text);
            }
            for child in fixture.children {
                doc.insert(root, child);
            }
        }
        host
    }

    /// Parses a JSON fixture (see [`ElementFixture`]).
    ///
    /// # Errors
    /// Returns [`HostError::Fixture`] when the JSON does not describe an element tree.
    pub fn from_json(json: &str) -> Result<Self, HostError> {
        let fixture: ElementFixture =
            serde_json::from_str(json).context("Failed to decode host fixture")?;
        Ok(Self::from_fixture(fixture))
    }

    #[must_use]
    pub fn root(&self) -> ElementId {
        self.doc.lock().root
    }

    /// Appends a subtree under `parent`, notifying observers once.
    ///
    /// # Errors
    /// Returns [`HostError::Detached`] if `parent` no longer exists.
    pub fn append(
        &self,
        parent: ElementId,
        fixture: ElementFixture,
    ) -> Result<ElementId, HostError> {
        let mut doc = self.doc.lock();
        doc.node_mut(parent)?;
        let id = doc.insert(parent, fixture);
        doc.notify(HostEvent::Structural { target: parent, kind: MutationKind::ChildrenAdded });
        Ok(id)
    }

    /// Removes an element and its subtree.
    ///
    /// # Errors
    /// Returns [`HostError::Detached`] if the element is already gone.
    pub fn remove(&self, element: ElementId) -> Result<(), HostError> {
        let mut doc = self.doc.lock();
        let parent = doc.node_mut(element)?.parent;
        let parent = parent.unwrap_or(doc.root);
        doc.detach(element);
        doc.notify(HostEvent::Structural { target: parent, kind: MutationKind::ChildrenRemoved });
        Ok(())
    }

    /// Re-renders `parent`: drops every child and inserts fresh ones with new identifiers.
    ///
    /// # Errors
    /// Returns [`HostError::Detached`] if `parent` no longer exists.
    pub fn replace_children(
        &self,
        parent: ElementId,
        children: impl IntoIterator<Item = ElementFixture>,
    ) -> Result<Vec<ElementId>, HostError> {
        let mut doc = self.doc.lock();
        let old = std::mem::take(&mut doc.node_mut(parent)?.children);
        for child in old {
            doc.drop_subtree(child);
        }
        doc.notify(HostEvent::Structural { target: parent, kind: MutationKind::ChildrenRemoved });

        let ids = children.into_iter().map(|child| doc.insert(parent, child)).collect();
        doc.notify(HostEvent::Structural { target: parent, kind: MutationKind::ChildrenAdded });
        Ok(ids)
    }

    /// Fires the host's load notification. Later observers receive it on install.
    pub fn finish_load(&self) {
        let mut doc = self.doc.lock();
        if !doc.loaded {
            doc.loaded = true;
            doc.notify(HostEvent::Loaded);
        }
    }

    /// Content of an installed style sheet.
    #[must_use]
    pub fn style_sheet(&self, id: &str) -> Option<String> {
        self.doc.lock().sheets.get(id).cloned()
    }

    /// Number of live elements, root included.
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.doc.lock().nodes.len()
    }

    /// Snapshot of the document as a fixture tree.
    #[must_use]
    pub fn to_fixture(&self) -> ElementFixture {
        fn build(doc: &Document, id: ElementId) -> ElementFixture {
            let Some(node) = doc.node(id) else {
                return ElementFixture::default();
            };
            ElementFixture {
                id: node.dom_id.clone(),
                class: node.classes.join(" "),
                style: node.style.clone(),
                tags: node.tags.clone(),
                text: node.text.clone(),
                children: node.children.iter().map(|c| build(doc, *c)).collect(),
            }
        }
        let doc = self.doc.lock();
        build(&doc, doc.root)
    }
}

impl HostView for MemoryHost {
    fn contains(&self, element: ElementId) -> bool {
        self.doc.lock().nodes.contains_key(&element)
    }

    fn element_by_id(&self, dom_id: &str) -> Option<ElementId> {
        let doc = self.doc.lock();
        let mut all = Vec::new();
        doc.descendants(doc.root, true, &mut all);
        all.into_iter()
            .find(|id| doc.node(*id).and_then(|n| n.dom_id.as_deref()) == Some(dom_id))
    }

    fn select(&self, selector: &Selector) -> Vec<ElementId> {
        let doc = self.doc.lock();
        let mut candidates = Vec::new();
        match selector.scope() {
            Some(scope) => doc.descendants(scope, false, &mut candidates),
            None => doc.descendants(doc.root, true, &mut candidates),
        }
        candidates.retain(|id| {
            doc.node(*id).is_some_and(|node| {
                selector.matches(&node.classes, |key| node.tags.get(key).map(String::as_str))
            })
        });
        candidates
    }

    fn child_position(&self, element: ElementId) -> Option<usize> {
        let doc = self.doc.lock();
        let parent = doc.node(element)?.parent?;
        doc.node(parent)?.children.iter().position(|c| *c == element).map(|i| i + 1)
    }

    fn text(&self, element: ElementId) -> Option<String> {
        let doc = self.doc.lock();
        doc.node(element)?;
        let mut out = String::new();
        doc.text_of(element, &mut out);
        Some(out)
    }

    fn set_text(&mut self, element: ElementId, text: &str) -> Result<(), HostError> {
        let mut doc = self.doc.lock();
        let node = doc.node_mut(element)?;
        node.text = text.to_owned();
        let old = std::mem::take(&mut node.children);
        for child in old {
            doc.drop_subtree(child);
        }
        trace!(%element, "Text replaced");
        doc.notify(HostEvent::Structural { target: element, kind: MutationKind::TextReplaced });
        Ok(())
    }

    fn style(&self, element: ElementId, property: &str) -> Option<String> {
        self.doc.lock().node(element)?.style.get(property).cloned()
    }

    fn set_style(
        &mut self,
        element: ElementId,
        property: &str,
        value: &str,
    ) -> Result<(), HostError> {
        self.doc.lock().node_mut(element)?.style.insert(property.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove_style(&mut self, element: ElementId, property: &str) -> Result<(), HostError> {
        self.doc.lock().node_mut(element)?.style.remove(property);
        Ok(())
    }

    fn classes(&self, element: ElementId) -> Vec<String> {
        self.doc.lock().node(element).map(|n| n.classes.clone()).unwrap_or_default()
    }

    fn add_class(&mut self, element: ElementId, class: &str) -> Result<(), HostError> {
        let mut doc = self.doc.lock();
        let node = doc.node_mut(element)?;
        if !node.classes.iter().any(|c| c == class) {
            node.classes.push(class.to_owned());
        }
        Ok(())
    }

    fn remove_class(&mut self, element: ElementId, class: &str) -> Result<(), HostError> {
        self.doc.lock().node_mut(element)?.classes.retain(|c| c != class);
        Ok(())
    }

    fn set_classes(&mut self, element: ElementId, classes: &[String]) -> Result<(), HostError> {
        self.doc.lock().node_mut(element)?.classes = classes.to_vec();
        Ok(())
    }

    fn tag(&self, element: ElementId, key: &str) -> Option<String> {
        self.doc.lock().node(element)?.tags.get(key).cloned()
    }

    fn set_tag(&mut self, element: ElementId, key: &str, value: &str) -> Result<(), HostError> {
        self.doc.lock().node_mut(element)?.tags.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove_tag(&mut self, element: ElementId, key: &str) -> Result<(), HostError> {
        self.doc.lock().node_mut(element)?.tags.remove(key);
        Ok(())
    }

    fn install_style_sheet(&mut self, id: &str, css: &str) {
        self.doc.lock().sheets.insert(id.to_owned(), css.to_owned());
    }

    fn remove_style_sheet(&mut self, id: &str) -> bool {
        self.doc.lock().sheets.remove(id).is_some()
    }

    fn observe(&mut self) -> MutationFeed {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut doc = self.doc.lock();
        if doc.loaded {
            let _ = tx.send(HostEvent::Loaded);
        }
        doc.observers.push(tx);
        rx
    }

    fn disconnect(&mut self) {
        self.doc.lock().observers.clear();
    }
}
