//! The host surfaces a widget consumes.
//!
//! Trellis does not render, parse markup, or listen to the window itself. The
//! host implements these traits and hands them to a widget when it connects.
//! Surfaces are shared, single-threaded handles: methods take `&self` and any
//! bookkeeping behind them is the host's business.

use std::{fmt, rc::Rc};

use crate::id::{NodeId, SubscriptionId};

/// Attributes of the host element a widget is attached to.
pub trait HostElement {
    /// Current value of an attribute.
    fn attribute(&self, name: &str) -> Option<String>;

    /// Set an attribute value.
    fn set_attribute(&self, name: &str, value: &str);

    /// Names of all attributes currently present.
    fn attribute_names(&self) -> Vec<String>;

    /// Start delivering attribute additions and changes for this element.
    fn observe_attributes(&self) -> SubscriptionId;

    /// Stop delivering attribute changes for a subscription.
    fn unobserve_attributes(&self, id: SubscriptionId);
}

/// The window-level keyboard stream.
pub trait KeyboardSource {
    /// Attach key-down and key-up listeners.
    fn subscribe(&self) -> SubscriptionId;

    /// Detach the listeners of a subscription.
    fn unsubscribe(&self, id: SubscriptionId);
}

/// The widget's rendered content and the descendants inside it.
pub trait RenderSurface {
    /// Replace the serialized markup and style content.
    fn set_content(&self, content: &str);

    /// The first descendant controller matching a selector.
    fn query(&self, selector: &str) -> Option<NodeId>;

    /// All descendant controllers matching a selector.
    fn query_all(&self, selector: &str) -> Vec<NodeId>;

    /// Append a child.
    fn append_child(&self, node: NodeId);

    /// Remove the first child matching a selector. Returns true if one was
    /// removed.
    fn remove_child(&self, selector: &str) -> bool;
}

/// The set of surfaces a widget connects to.
#[derive(Clone)]
pub struct Surfaces {
    /// Host element attributes.
    pub host: Rc<dyn HostElement>,
    /// Window keyboard stream.
    pub keyboard: Rc<dyn KeyboardSource>,
    /// Render surface.
    pub render: Rc<dyn RenderSurface>,
}

impl fmt::Debug for Surfaces {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Surfaces").finish_non_exhaustive()
    }
}

/// A held subscription. Released when dropped.
pub struct Subscription {
    /// Identifier handed out by the surface.
    id: SubscriptionId,
    /// Release hook, taken on drop.
    release: Option<Box<dyn FnOnce(SubscriptionId)>>,
}

impl Subscription {
    /// Observe attribute changes on a host element.
    pub fn attributes(host: &Rc<dyn HostElement>) -> Self {
        let host = Rc::clone(host);
        let id = host.observe_attributes();
        Self {
            id,
            release: Some(Box::new(move |id| host.unobserve_attributes(id))),
        }
    }

    /// Listen to the window keyboard stream.
    pub fn keyboard(keyboard: &Rc<dyn KeyboardSource>) -> Self {
        let keyboard = Rc::clone(keyboard);
        let id = keyboard.subscribe();
        Self {
            id,
            release: Some(Box::new(move |id| keyboard.unsubscribe(id))),
        }
    }

    /// The surface-assigned identifier.
    pub fn id(&self) -> SubscriptionId {
        self.id
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release(self.id);
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
