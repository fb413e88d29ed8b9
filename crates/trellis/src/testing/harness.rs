//! A widget tree driven through in-memory surfaces.

use std::rc::Rc;

use super::surfaces::{SurfaceMap, TestKeyboard, TestSurfaces};
use crate::{
    Tree, Widget,
    error::{Error, Result},
    id::NodeId,
    model::Value,
};

/// Rounds of mutation delivery before a flush is considered a feedback loop.
const MAX_FLUSH_ROUNDS: usize = 16;

/// Drives a [`Tree`] of widgets connected to in-memory surfaces. All widgets
/// share one keyboard, as they would share one window.
#[derive(Debug)]
pub struct Harness {
    /// The widget tree.
    pub tree: Tree,
    /// Shared window keyboard.
    pub keyboard: Rc<TestKeyboard>,
    /// Per-node surfaces.
    surfaces: SurfaceMap,
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

impl Harness {
    /// Construct an empty harness.
    pub fn new() -> Self {
        Self {
            tree: Tree::new(),
            keyboard: Rc::new(TestKeyboard::default()),
            surfaces: SurfaceMap::new(),
        }
    }

    /// Insert and connect a widget.
    pub fn add(&mut self, widget: Widget) -> Result<NodeId> {
        self.add_with(widget, &[])
    }

    /// Insert a widget, set host attributes, then connect it.
    pub fn add_with(&mut self, widget: Widget, attrs: &[(&str, &str)]) -> Result<NodeId> {
        let id = self.tree.insert(widget);
        let t = TestSurfaces::with_keyboard(self.keyboard.clone());
        for (k, v) in attrs {
            t.host.set(k, v);
        }
        self.tree.connect(id, t.surfaces())?;
        self.surfaces.insert(id, t);
        self.flush(id)?;
        Ok(id)
    }

    /// Surfaces of a node.
    pub fn surfaces(&self, id: NodeId) -> Result<&TestSurfaces> {
        self.surfaces.get(&id).ok_or(Error::NodeNotFound(id))
    }

    /// Make `child` reachable from `parent`'s render surface under a
    /// selector.
    pub fn mount(&mut self, parent: NodeId, selector: &str, child: NodeId) -> Result<()> {
        self.surfaces(parent)?.render.register(selector, child);
        Ok(())
    }

    /// Set a host attribute and deliver the resulting mutations.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> Result<usize> {
        self.surfaces(id)?.host.set(name, value);
        self.flush(id)
    }

    /// Deliver queued attribute mutations until none remain. Returns the
    /// number of model writes.
    pub fn flush(&mut self, id: NodeId) -> Result<usize> {
        let host = self.surfaces(id)?.host.clone();
        let mut writes = 0;
        for _ in 0..MAX_FLUSH_ROUNDS {
            let pending = host.take_mutations();
            if pending.is_empty() {
                return Ok(writes);
            }
            for name in pending {
                if self.tree.attribute_changed(id, &name)? {
                    writes += 1;
                }
            }
        }
        Err(Error::Invalid("attribute mutations did not settle".into()))
    }

    /// Widgets with keyboard listeners attached, in arena order.
    pub fn listeners(&self) -> Vec<NodeId> {
        self.tree
            .ids()
            .into_iter()
            .filter(|id| {
                self.tree
                    .widget(*id)
                    .is_ok_and(|w| w.element().is_listening())
            })
            .collect()
    }

    /// Deliver a window key-down to every listening widget. Returns true if
    /// any of them handled it.
    pub fn key_down(&mut self, code: &str) -> Result<bool> {
        let mut handled = false;
        for id in self.listeners() {
            handled |= self.tree.key_down(id, code)?;
        }
        Ok(handled)
    }

    /// Deliver a window key-up to every listening widget.
    pub fn key_up(&mut self, code: &str) -> Result<()> {
        for id in self.listeners() {
            self.tree.key_up(id, code)?;
        }
        Ok(())
    }

    /// Press and release a key.
    pub fn press(&mut self, code: &str) -> Result<bool> {
        let handled = self.key_down(code)?;
        self.key_up(code)?;
        Ok(handled)
    }

    /// Current model value of a node's property.
    pub fn value(&self, id: NodeId, name: &str) -> Option<Value> {
        self.tree
            .widget(id)
            .ok()?
            .element()
            .get_model_value(name)
            .cloned()
    }
}
