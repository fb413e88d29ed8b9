//! Trellis: typed widget models and delegated keyboard controls.
//!
//! Trellis is the behavioral core of a declarative UI widget. It keeps a
//! schema-validated model in step with the attributes of a host element, and
//! turns key presses into chords that are resolved against a widget's own
//! controls or delegated down a tree of nested widgets.
//!
//! # Quick Start
//!
//! The main entry points are:
//! - [`Widget`] - A widget instance, built with [`Widget::builder`]
//! - [`Element`] - The model and host-attribute side of a widget
//! - [`Tree`] - The arena that owns widgets and routes key presses
//!
//! # Module Organization
//!
//! - [`model`] - Values, schemas, casting and validated storage
//! - [`chord`] - Key-chord tracking
//! - [`surface`] - The host traits a widget consumes

#![warn(missing_docs)]

pub mod chord;
pub mod controls;
pub mod element;
pub mod error;
pub mod id;
pub mod model;
pub mod surface;
/// Testing utilities.
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod tree;
pub mod widget;

pub use chord::{Chord, ChordTracker, KeyToken};
pub use controls::Controls;
pub use element::Element;
pub use error::{Error, Result};
pub use id::{NodeId, SubscriptionId};
pub use model::{PropType, Schema, Value};
pub use surface::{HostElement, KeyboardSource, RenderSurface, Subscription, Surfaces};
pub use tree::Tree;
pub use widget::{Widget, WidgetBuilder};
