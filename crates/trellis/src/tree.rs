//! The widget arena and keyboard delegation.
//!
//! Each node holds a widget and the pre-resolved handles of the child
//! controllers its unresolved chords are delegated to. Delegation is
//! depth-first in declaration order and stops at the first controller that
//! handles the chord.

use std::collections::HashSet;

use slotmap::SlotMap;

use crate::{
    chord::KeyDown,
    error::{Error, Result},
    id::NodeId,
    surface::Surfaces,
    widget::Widget,
};

/// A widget and its delegation children.
#[derive(Debug)]
struct Node {
    /// The widget.
    widget: Widget,
    /// Child controllers in delegation order.
    delegates: Vec<NodeId>,
}

/// Arena of widgets.
#[derive(Debug, Default)]
pub struct Tree {
    /// Node storage.
    nodes: SlotMap<NodeId, Node>,
}

impl Tree {
    /// Construct an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a widget with no delegation children.
    pub fn insert(&mut self, widget: Widget) -> NodeId {
        self.nodes.insert(Node {
            widget,
            delegates: Vec::new(),
        })
    }

    /// Remove a widget, dropping it from every delegation list. The returned
    /// widget still holds its subscriptions until it is dropped or
    /// disconnected.
    pub fn remove(&mut self, id: NodeId) -> Option<Widget> {
        let node = self.nodes.remove(id)?;
        for n in self.nodes.values_mut() {
            n.delegates.retain(|d| *d != id);
        }
        Some(node.widget)
    }

    /// Number of widgets.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if the tree holds no widgets.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Does the tree hold this node?
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Node IDs in arena order.
    pub fn ids(&self) -> Vec<NodeId> {
        self.nodes.keys().collect()
    }

    /// Borrow a node.
    fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(id).ok_or(Error::NodeNotFound(id))
    }

    /// Borrow a node mutably.
    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes.get_mut(id).ok_or(Error::NodeNotFound(id))
    }

    /// Borrow a widget.
    pub fn widget(&self, id: NodeId) -> Result<&Widget> {
        Ok(&self.node(id)?.widget)
    }

    /// Borrow a widget mutably.
    pub fn widget_mut(&mut self, id: NodeId) -> Result<&mut Widget> {
        Ok(&mut self.node_mut(id)?.widget)
    }

    /// Connect a widget to its host surfaces.
    pub fn connect(&mut self, id: NodeId, surfaces: Surfaces) -> Result<()> {
        self.widget_mut(id)?.element_mut().connect(surfaces)
    }

    /// Forward a host attribute change to a widget.
    pub fn attribute_changed(&mut self, id: NodeId, name: &str) -> Result<bool> {
        self.widget_mut(id)?.element_mut().attribute_changed(name)
    }

    /// Child controllers of a node, in delegation order.
    pub fn delegates(&self, id: NodeId) -> Result<&[NodeId]> {
        Ok(&self.node(id)?.delegates)
    }

    /// Resolve a widget's delegation selectors through its render surface and
    /// store the resulting handles. Every selector must match a controller in
    /// this tree.
    pub fn compose(&mut self, id: NodeId) -> Result<()> {
        let widget = self.widget(id)?;
        let mut children = Vec::new();
        for selector in widget.controls().selectors() {
            let child = widget
                .element()
                .element(selector)?
                .filter(|c| self.nodes.contains_key(*c))
                .ok_or_else(|| Error::NoController {
                    widget: widget.name().to_string(),
                    selector: selector.clone(),
                })?;
            children.push(child);
        }
        self.set_delegates(id, children)
    }

    /// Set a node's delegation children directly. Fails if a child is missing
    /// or if the delegation graph would contain a cycle.
    pub fn set_delegates(&mut self, id: NodeId, children: Vec<NodeId>) -> Result<()> {
        self.node(id)?;
        for c in &children {
            self.node(*c)?;
            if *c == id || self.reaches(*c, id) {
                return Err(Error::Invalid(format!(
                    "delegating from {} to {} would form a cycle",
                    self.widget(id)?.name(),
                    self.widget(*c)?.name()
                )));
            }
        }
        self.node_mut(id)?.delegates = children;
        Ok(())
    }

    /// Can `target` be reached from `from` through delegation?
    fn reaches(&self, from: NodeId, target: NodeId) -> bool {
        let mut seen = HashSet::new();
        let mut stack = vec![from];
        while let Some(n) = stack.pop() {
            if n == target {
                return true;
            }
            if !seen.insert(n) {
                continue;
            }
            if let Some(node) = self.nodes.get(n) {
                stack.extend(node.delegates.iter().copied());
            }
        }
        false
    }

    /// Resolve a chord against one widget's own controls.
    pub fn keyevent(&mut self, id: NodeId, chord: &str) -> Result<bool> {
        self.widget_mut(id)?.keyevent(chord)
    }

    /// Offer a chord to a node's delegation children, depth-first in
    /// declaration order. Returns the first controller that handled it.
    pub fn delegate_child_controls(&mut self, id: NodeId, chord: &str) -> Result<Option<NodeId>> {
        let children = self.node(id)?.delegates.clone();
        for child in children {
            tracing::trace!(chord, ?child, "delegate");
            if self.keyevent(child, chord)? {
                return Ok(Some(child));
            }
            if let Some(found) = self.delegate_child_controls(child, chord)? {
                return Ok(Some(found));
            }
        }
        Ok(None)
    }

    /// Feed a key press to a widget's tracker and resolve the resulting
    /// chord, locally first and then through delegation. Returns true if some
    /// controller handled it, in which case only held modifiers remain in the
    /// chord.
    pub fn key_down(&mut self, id: NodeId, code: &str) -> Result<bool> {
        let chord = match self.widget_mut(id)?.tracker_mut().key_down(code) {
            KeyDown::Chord(chord) => chord,
            KeyDown::Modifier | KeyDown::Overflow => return Ok(false),
        };
        let handled = self.keyevent(id, &chord)?
            || (!self.widget(id)?.tracker().pressed().is_empty()
                && self.delegate_child_controls(id, &chord)?.is_some());
        if handled {
            self.widget_mut(id)?.tracker_mut().resolved();
        }
        Ok(handled)
    }

    /// Feed a key release to a widget's tracker.
    pub fn key_up(&mut self, id: NodeId, code: &str) -> Result<()> {
        self.widget_mut(id)?.tracker_mut().key_up(code);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;

    /// Shared log of fired actions.
    type Log = Rc<RefCell<Vec<String>>>;

    fn logging(name: &str, chord: &str, log: &Log) -> Widget {
        let log = log.clone();
        let tag = name.to_string();
        Widget::builder(name)
            .modifiers(["ControlLeft"])
            .bind(chord, "fire")
            .action("fire", move |_, c| {
                log.borrow_mut().push(format!("{tag}:{c}"));
                Ok(())
            })
            .build()
            .unwrap()
    }

    fn plain(name: &str) -> Widget {
        Widget::builder(name)
            .modifiers(["ControlLeft"])
            .build()
            .unwrap()
    }

    #[test]
    fn first_sibling_wins() -> Result<()> {
        let log = Log::default();
        let mut t = Tree::new();
        let root = t.insert(plain("root"));
        let x = t.insert(logging("x", "KeyA", &log));
        let y = t.insert(logging("y", "KeyA", &log));
        t.set_delegates(root, vec![x, y])?;
        assert!(t.key_down(root, "KeyA")?);
        assert_eq!(*log.borrow(), vec!["x:KeyA"]);
        assert!(t.widget(root)?.tracker().pressed().is_empty());
        Ok(())
    }

    #[test]
    fn depth_first_before_next_sibling() -> Result<()> {
        let log = Log::default();
        let mut t = Tree::new();
        let root = t.insert(plain("root"));
        let a = t.insert(plain("a"));
        let a1 = t.insert(logging("a1", "KeyB", &log));
        let b = t.insert(logging("b", "KeyB", &log));
        t.set_delegates(root, vec![a, b])?;
        t.set_delegates(a, vec![a1])?;
        assert_eq!(t.delegate_child_controls(root, "KeyB")?, Some(a1));
        assert_eq!(*log.borrow(), vec!["a1:KeyB"]);
        Ok(())
    }

    #[test]
    fn miss_keeps_chord() -> Result<()> {
        let log = Log::default();
        let mut t = Tree::new();
        let root = t.insert(plain("root"));
        let x = t.insert(logging("x", "KeyG KeyG", &log));
        t.set_delegates(root, vec![x])?;
        assert!(!t.key_down(root, "KeyG")?);
        assert_eq!(t.widget(root)?.tracker().pressed().to_string(), "KeyG");
        assert!(t.key_down(root, "KeyG")?);
        assert_eq!(*log.borrow(), vec!["x:KeyG KeyG"]);
        Ok(())
    }

    #[test]
    fn modifier_survives_match() -> Result<()> {
        let log = Log::default();
        let mut t = Tree::new();
        let root = t.insert(logging("root", "mod-ControlLeft KeyS", &log));
        assert!(!t.key_down(root, "ControlLeft")?);
        assert!(t.key_down(root, "KeyS")?);
        assert!(t.key_down(root, "KeyS")?);
        assert_eq!(log.borrow().len(), 2);
        assert_eq!(
            t.widget(root)?.tracker().pressed().to_string(),
            "mod-ControlLeft"
        );
        Ok(())
    }

    #[test]
    fn cycles_are_rejected() -> Result<()> {
        let mut t = Tree::new();
        let a = t.insert(plain("a"));
        let b = t.insert(plain("b"));
        t.set_delegates(a, vec![b])?;
        assert!(matches!(t.set_delegates(b, vec![a]), Err(Error::Invalid(_))));
        assert!(matches!(t.set_delegates(a, vec![a]), Err(Error::Invalid(_))));
        Ok(())
    }

    #[test]
    fn remove_purges_delegates() -> Result<()> {
        let mut t = Tree::new();
        let a = t.insert(plain("a"));
        let b = t.insert(plain("b"));
        t.set_delegates(a, vec![b])?;
        assert!(t.remove(b).is_some());
        assert!(t.delegates(a)?.is_empty());
        assert!(matches!(t.widget(b), Err(Error::NodeNotFound(_))));
        Ok(())
    }
}
