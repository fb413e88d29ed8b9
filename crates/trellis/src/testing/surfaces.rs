//! In-memory implementations of the host surface traits.

use std::{
    cell::{Cell, RefCell},
    collections::{BTreeMap, BTreeSet, HashMap},
    rc::Rc,
};

use crate::{
    id::{NodeId, SubscriptionId},
    surface::{HostElement, KeyboardSource, RenderSurface, Surfaces},
};

/// An in-memory host element.
///
/// Attribute writes made through [`TestHost::set`] (the "outside world") and
/// through [`HostElement::set_attribute`] (reflection) are queued as
/// mutations while an observer is attached, for the test to deliver.
#[derive(Debug, Default)]
pub struct TestHost {
    /// Current attributes.
    attrs: RefCell<BTreeMap<String, String>>,
    /// Attached observers.
    observers: RefCell<BTreeSet<u64>>,
    /// Undelivered attribute names.
    pending: RefCell<Vec<String>>,
    /// Number of writes made through the host trait.
    writes: Cell<usize>,
    /// Next subscription id.
    next: Cell<u64>,
}

impl TestHost {
    /// Set an attribute from outside the widget.
    pub fn set(&self, name: &str, value: &str) {
        self.attrs
            .borrow_mut()
            .insert(name.to_string(), value.to_string());
        self.queue(name);
    }

    /// Remove an attribute.
    pub fn remove(&self, name: &str) {
        self.attrs.borrow_mut().remove(name);
        self.queue(name);
    }

    /// Current value of an attribute.
    pub fn get(&self, name: &str) -> Option<String> {
        self.attrs.borrow().get(name).cloned()
    }

    /// Number of attached observers.
    pub fn observers(&self) -> usize {
        self.observers.borrow().len()
    }

    /// Number of attribute writes the widget has made.
    pub fn writes(&self) -> usize {
        self.writes.get()
    }

    /// Take the queued mutation names.
    pub fn take_mutations(&self) -> Vec<String> {
        self.pending.take()
    }

    /// Queue a mutation if anyone is observing.
    fn queue(&self, name: &str) {
        if !self.observers.borrow().is_empty() {
            self.pending.borrow_mut().push(name.to_string());
        }
    }
}

impl HostElement for TestHost {
    fn attribute(&self, name: &str) -> Option<String> {
        self.get(name)
    }

    fn set_attribute(&self, name: &str, value: &str) {
        self.writes.set(self.writes.get() + 1);
        self.set(name, value);
    }

    fn attribute_names(&self) -> Vec<String> {
        self.attrs.borrow().keys().cloned().collect()
    }

    fn observe_attributes(&self) -> SubscriptionId {
        let id = self.next.get();
        self.next.set(id + 1);
        self.observers.borrow_mut().insert(id);
        SubscriptionId(id)
    }

    fn unobserve_attributes(&self, id: SubscriptionId) {
        self.observers.borrow_mut().remove(&id.0);
    }
}

/// An in-memory window keyboard stream that records subscriptions.
#[derive(Debug, Default)]
pub struct TestKeyboard {
    /// Live subscriptions.
    subs: RefCell<BTreeSet<u64>>,
    /// Next subscription id.
    next: Cell<u64>,
}

impl TestKeyboard {
    /// Live subscription ids, in creation order.
    pub fn active(&self) -> Vec<SubscriptionId> {
        self.subs.borrow().iter().map(|x| SubscriptionId(*x)).collect()
    }
}

impl KeyboardSource for TestKeyboard {
    fn subscribe(&self) -> SubscriptionId {
        let id = self.next.get();
        self.next.set(id + 1);
        self.subs.borrow_mut().insert(id);
        SubscriptionId(id)
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.subs.borrow_mut().remove(&id.0);
    }
}

/// An in-memory render surface. Selectors resolve to registered nodes.
#[derive(Debug, Default)]
pub struct TestRender {
    /// Last content written.
    content: RefCell<String>,
    /// Selector registrations, in registration order.
    children: RefCell<Vec<(String, NodeId)>>,
}

impl TestRender {
    /// Make a node reachable through a selector.
    pub fn register(&self, selector: &str, node: NodeId) {
        self.children
            .borrow_mut()
            .push((selector.to_string(), node));
    }

    /// Last content written.
    pub fn content(&self) -> String {
        self.content.borrow().clone()
    }
}

impl RenderSurface for TestRender {
    fn set_content(&self, content: &str) {
        *self.content.borrow_mut() = content.to_string();
    }

    fn query(&self, selector: &str) -> Option<NodeId> {
        self.children
            .borrow()
            .iter()
            .find(|(s, _)| s == selector)
            .map(|(_, n)| *n)
    }

    fn query_all(&self, selector: &str) -> Vec<NodeId> {
        self.children
            .borrow()
            .iter()
            .filter(|(s, _)| s == selector)
            .map(|(_, n)| *n)
            .collect()
    }

    fn append_child(&self, node: NodeId) {
        self.children.borrow_mut().push((String::new(), node));
    }

    fn remove_child(&self, selector: &str) -> bool {
        let mut children = self.children.borrow_mut();
        match children.iter().position(|(s, _)| s == selector) {
            Some(i) => {
                children.remove(i);
                true
            }
            None => false,
        }
    }
}

/// A bundle of test surfaces for one widget.
#[derive(Debug, Clone)]
pub struct TestSurfaces {
    /// Host element.
    pub host: Rc<TestHost>,
    /// Keyboard stream.
    pub keyboard: Rc<TestKeyboard>,
    /// Render surface.
    pub render: Rc<TestRender>,
}

impl Default for TestSurfaces {
    fn default() -> Self {
        Self::new()
    }
}

impl TestSurfaces {
    /// Fresh surfaces with a private keyboard.
    pub fn new() -> Self {
        Self::with_keyboard(Rc::new(TestKeyboard::default()))
    }

    /// Fresh host and render surfaces sharing a keyboard.
    pub fn with_keyboard(keyboard: Rc<TestKeyboard>) -> Self {
        Self {
            host: Rc::new(TestHost::default()),
            keyboard,
            render: Rc::new(TestRender::default()),
        }
    }

    /// The trait-object bundle to connect a widget with.
    pub fn surfaces(&self) -> Surfaces {
        Surfaces {
            host: self.host.clone(),
            keyboard: self.keyboard.clone(),
            render: self.render.clone(),
        }
    }
}

/// Map of per-node test surfaces.
pub(crate) type SurfaceMap = HashMap<NodeId, TestSurfaces>;
