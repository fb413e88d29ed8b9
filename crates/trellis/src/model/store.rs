//! Validated model storage and setter hooks.

use std::{
    collections::{BTreeMap, HashMap, HashSet},
    fmt,
};

use super::{schema::Schema, value::Value};
use crate::error::{Error, Result};

/// A set of property values keyed by name.
pub type ModelMap = BTreeMap<String, Value>;

/// Hook run before a property value is committed. Receives the value still in
/// the store (if any) and the value being written.
pub type PropertySetter = Box<dyn FnMut(Option<&Value>, &Value)>;

/// Hook run after a bulk model write, with the accepted values.
pub type ModelSetter = Box<dyn FnMut(&ModelMap)>;

/// Validated property storage for one widget.
///
/// Every stored value has a schema declaration and matches its declared type.
/// Writes either fail before touching the store or commit in full.
pub struct Model {
    /// Widget name used in error messages.
    widget: String,
    /// Declared properties.
    schema: Schema,
    /// Current values.
    values: HashMap<String, Value>,
    /// Per-property setter hooks.
    setters: HashMap<String, PropertySetter>,
    /// Whole-model hook.
    model_setter: Option<ModelSetter>,
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("widget", &self.widget)
            .field("schema", &self.schema)
            .field("values", &self.values)
            .finish_non_exhaustive()
    }
}

impl Model {
    /// Construct an empty model for a widget.
    pub fn new(widget: &str, schema: Schema) -> Self {
        Self {
            widget: widget.to_string(),
            schema,
            values: HashMap::new(),
            setters: HashMap::new(),
            model_setter: None,
        }
    }

    /// The widget name this model reports errors under.
    pub fn widget(&self) -> &str {
        &self.widget
    }

    /// The schema this model enforces.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Register the setter for a property, replacing any existing one.
    pub fn on_change<F>(&mut self, name: &str, f: F)
    where
        F: FnMut(Option<&Value>, &Value) + 'static,
    {
        self.setters.insert(name.to_string(), Box::new(f));
    }

    /// Register the whole-model hook, replacing any existing one.
    pub fn on_model<F>(&mut self, f: F)
    where
        F: FnMut(&ModelMap) + 'static,
    {
        self.model_setter = Some(Box::new(f));
    }

    /// Check that a write would be accepted.
    pub fn validate(&self, name: &str, value: &Value) -> Result<()> {
        let expected = self
            .schema
            .get(name)
            .ok_or_else(|| Error::UnknownProperty {
                widget: self.widget.clone(),
                property: name.to_string(),
            })?;
        if value.kind() != expected {
            return Err(self.mismatch(name, value.kind().name()));
        }
        Ok(())
    }

    /// Build a type mismatch error for a property.
    pub(crate) fn mismatch(&self, name: &str, actual: &str) -> Error {
        match self.schema.get(name) {
            Some(expected) => Error::TypeMismatch {
                widget: self.widget.clone(),
                property: name.to_string(),
                actual: actual.to_string(),
                expected,
            },
            None => Error::UnknownProperty {
                widget: self.widget.clone(),
                property: name.to_string(),
            },
        }
    }

    /// Validate and commit a value, running the property's setter first.
    pub fn set(&mut self, name: &str, value: Value) -> Result<()> {
        self.validate(name, &value)?;
        if let Some(setter) = self.setters.get_mut(name) {
            setter(self.values.get(name), &value);
        }
        tracing::trace!(widget = %self.widget, property = name, "model write");
        self.values.insert(name.to_string(), value);
        Ok(())
    }

    /// Current value of a property. Falsy values are reported as present.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Snapshot of all stored values.
    pub fn values(&self) -> ModelMap {
        self.values
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Work out which properties of `input` a bulk write applies, in
    /// application order: the schema's declared order first, then remaining
    /// declared properties in declaration order. Input entries the schema does
    /// not declare are skipped. Every accepted value is validated, so a plan
    /// that is returned can be applied without failing.
    pub fn plan(&self, input: &ModelMap) -> Result<Vec<(String, Value)>> {
        let mut seen = HashSet::new();
        let mut accepted = Vec::new();
        let ordered = self.schema.application_order().unwrap_or_default();
        let declared = self.schema.properties().iter().map(|p| &p.name);
        for name in ordered.iter().chain(declared) {
            let Some(value) = input.get(name) else {
                continue;
            };
            if !seen.insert(name.as_str()) {
                continue;
            }
            self.validate(name, value)?;
            accepted.push((name.clone(), value.clone()));
        }
        Ok(accepted)
    }

    /// Run the whole-model hook.
    pub(crate) fn notify_model(&mut self, accepted: &ModelMap) {
        if let Some(f) = self.model_setter.as_mut() {
            f(accepted);
        }
    }
}
