//! Error types.

use std::result::Result as StdResult;

use thiserror::Error;

use crate::{id::NodeId, model::PropType};

/// Result type for trellis operations.
pub type Result<T> = StdResult<T, Error>;

/// Failure to convert a raw attribute string into a model value.
#[derive(Error, Debug)]
pub enum CastError {
    /// The serialized form was not valid JSON.
    #[error("malformed serialized value: {0}")]
    Json(#[from] serde_json::Error),
    /// The serialized form decoded to `null`, which has no model type.
    #[error("null is not a model value")]
    Null,
}

/// Core error type.
#[derive(Error, Debug)]
pub enum Error {
    /// A model write named a property the schema does not declare.
    #[error("[ui] {{{widget}}} model prop {{{property}}} does not exist")]
    UnknownProperty {
        /// Declared widget name.
        widget: String,
        /// Offending property name.
        property: String,
    },

    /// A model write carried a value of the wrong type.
    #[error(
        "[ui] {{{widget}}} model prop {{{property}}} is type {{{actual}}}, but should be of type {{{expected}}}"
    )]
    TypeMismatch {
        /// Declared widget name.
        widget: String,
        /// Offending property name.
        property: String,
        /// Runtime type of the rejected value.
        actual: String,
        /// Type declared by the schema.
        expected: PropType,
    },

    /// An attribute value could not be cast to its declared type.
    #[error("[ui] {{{widget}}} attribute {{{property}}} could not be cast: {source}")]
    Cast {
        /// Declared widget name.
        widget: String,
        /// Attribute and property name.
        property: String,
        /// Underlying cast failure.
        #[source]
        source: CastError,
    },

    /// A control is bound to an action that was never registered.
    #[error("[ui] {{{widget}}} control action {{{action}}} does not exist")]
    UnknownAction {
        /// Declared widget name.
        widget: String,
        /// Missing action name.
        action: String,
    },

    /// A delegation selector did not resolve to a controller.
    #[error("[ui] {{{widget}}} control selector {{{selector}}} matched no controller")]
    NoController {
        /// Declared widget name.
        widget: String,
        /// Selector that failed to resolve.
        selector: String,
    },

    /// The element has no host surfaces attached.
    #[error("[ui] {{{widget}}} is not connected")]
    NotConnected {
        /// Declared widget name.
        widget: String,
    },

    /// Node not present in the tree.
    #[error("node not found: {0:?}")]
    NodeNotFound(NodeId),

    /// Invalid input error.
    #[error("invalid: {0}")]
    Invalid(String),

    /// Schema or control configuration failed to load.
    #[error("schema: {0}")]
    Schema(#[from] serde_json::Error),
}
