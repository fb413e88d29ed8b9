//! Identifiers for widgets and host subscriptions.

use slotmap::new_key_type;

new_key_type! {
    /// Opaque identifier for a widget stored in the [`Tree`](crate::Tree) arena.
    pub struct NodeId;
}

/// Identifier for a subscription handed out by a host surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);
