//! Widget model schemas.

use std::result::Result as StdResult;

use serde::Deserialize;
use serde_json::{Map as JsonMap, Value as JsonValue};

use super::value::PropType;
use crate::error::{Error, Result};

/// Name of the property that switches keyboard controls on and off.
pub const CONTROLS: &str = "controls";

/// Name of the optional property that mirrors [`CONTROLS`].
pub const CONTROLS_ACTIVE: &str = "controlsActive";

/// A declared model property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDescriptor {
    /// Property name, also the host attribute name.
    pub name: String,
    /// Declared type.
    pub ty: PropType,
}

/// The declared properties of a widget type, their types, and an optional
/// order in which bulk model writes apply them.
///
/// Property iteration order is declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawSchema")]
pub struct Schema {
    /// Declared properties in declaration order.
    properties: Vec<PropertyDescriptor>,
    /// Application order for bulk writes.
    order: Option<Vec<String>>,
}

/// Wire form of a property entry.
#[derive(Deserialize)]
struct RawProperty {
    /// Declared type.
    #[serde(rename = "type")]
    ty: PropType,
}

/// Wire form of a schema.
#[derive(Deserialize)]
struct RawSchema {
    /// Property map, in document order.
    #[serde(default)]
    properties: JsonMap<String, JsonValue>,
    /// Optional application order.
    #[serde(default)]
    order: Option<Vec<String>>,
}

impl TryFrom<RawSchema> for Schema {
    type Error = serde_json::Error;

    fn try_from(raw: RawSchema) -> StdResult<Self, Self::Error> {
        let mut schema = Self::new();
        for (name, v) in raw.properties {
            let prop: RawProperty = serde_json::from_value(v)?;
            schema.insert(&name, prop.ty);
        }
        schema.order = raw.order;
        Ok(schema)
    }
}

impl Schema {
    /// Construct an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a schema from its JSON form:
    /// `{"properties": {"name": {"type": "string"}}, "order": ["name"]}`.
    pub fn from_json(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(Error::from)
    }

    /// Declare a property.
    pub fn prop(mut self, name: &str, ty: PropType) -> Self {
        self.insert(name, ty);
        self
    }

    /// Set the order in which bulk writes apply properties.
    pub fn order<I>(mut self, names: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.order = Some(names.into_iter().map(|x| x.as_ref().to_string()).collect());
        self
    }

    /// Declare a property, replacing the type of an existing declaration in
    /// place.
    pub(crate) fn insert(&mut self, name: &str, ty: PropType) {
        match self.properties.iter_mut().find(|p| p.name == name) {
            Some(p) => p.ty = ty,
            None => self.properties.push(PropertyDescriptor {
                name: name.to_string(),
                ty,
            }),
        }
    }

    /// The declared type of a property.
    pub fn get(&self, name: &str) -> Option<PropType> {
        self.properties
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.ty)
    }

    /// Is this property declared?
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Declared properties in declaration order.
    pub fn properties(&self) -> &[PropertyDescriptor] {
        &self.properties
    }

    /// The declared application order, if any.
    pub fn application_order(&self) -> Option<&[String]> {
        self.order.as_deref()
    }

    /// Number of declared properties.
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// True if no properties are declared.
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}
