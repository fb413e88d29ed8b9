//! Typed widget models: values, schemas, casting, and validated storage.

mod cast;
mod schema;
mod store;
mod value;

pub use cast::cast;
pub use schema::{CONTROLS, CONTROLS_ACTIVE, PropertyDescriptor, Schema};
pub use store::{Model, ModelMap, ModelSetter, PropertySetter};
pub(crate) use value::json_kind;
pub use value::{PropType, Value};
