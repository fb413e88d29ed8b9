//! The model side of a widget: validated model writes, the bridge to host
//! attributes, keyboard subscription, and render surface plumbing.

use std::rc::Rc;

use serde_json::Value as JsonValue;

use crate::{
    error::{Error, Result},
    id::NodeId,
    model::{
        CONTROLS, CONTROLS_ACTIVE, Model, ModelMap, PropType, Schema, Value, cast, json_kind,
    },
    surface::{RenderSurface, Subscription, Surfaces},
};

/// A widget's model and its connection to the host.
#[derive(Debug)]
pub struct Element {
    /// Declared widget name, used in errors.
    name: String,
    /// Validated model storage.
    model: Model,
    /// Markup rendered by [`Element::reset_markup`].
    markup: String,
    /// Style sheet rendered by [`Element::reset_markup`].
    css: String,
    /// Write committed values back to host attributes.
    reflect: bool,
    /// Pull existing host attributes into the model on connect.
    initial_sync: bool,
    /// The `controls` property drives the keyboard subscription.
    uses_controls: bool,
    /// Host surfaces, present while connected.
    surfaces: Option<Surfaces>,
    /// Attribute observer, held while connected.
    attributes: Option<Subscription>,
    /// Keyboard listeners, held while controls are on and connected.
    keys: Option<Subscription>,
}

impl Element {
    /// Construct an unconnected element with an empty model.
    pub fn new(name: &str, schema: Schema) -> Self {
        Self {
            name: name.to_string(),
            model: Model::new(name, schema),
            markup: String::new(),
            css: String::new(),
            reflect: false,
            initial_sync: true,
            uses_controls: false,
            surfaces: None,
            attributes: None,
            keys: None,
        }
    }

    /// Set the markup and style sheet.
    pub(crate) fn set_template(&mut self, markup: String, css: String) {
        self.markup = markup;
        self.css = css;
    }

    /// Enable or disable writing committed values back to host attributes.
    pub fn set_reflect(&mut self, reflect: bool) {
        self.reflect = reflect;
    }

    /// Enable or disable pulling host attributes into the model on connect.
    pub fn set_initial_sync(&mut self, sync: bool) {
        self.initial_sync = sync;
    }

    /// Let the `controls` property drive keyboard listeners. The schema must
    /// already declare `controls` as a boolean.
    pub(crate) fn use_controls(&mut self) {
        self.uses_controls = true;
    }

    /// Declared widget name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The widget schema.
    pub fn schema(&self) -> &Schema {
        self.model.schema()
    }

    /// The underlying model store.
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Register a setter hook for a property.
    pub fn on_change<F>(&mut self, name: &str, f: F)
    where
        F: FnMut(Option<&Value>, &Value) + 'static,
    {
        self.model.on_change(name, f);
    }

    /// Register the whole-model hook run after [`Element::set_model`].
    pub fn on_model<F>(&mut self, f: F)
    where
        F: FnMut(&ModelMap) + 'static,
    {
        self.model.on_model(f);
    }

    /// Validate and commit a single property.
    ///
    /// The property's setter runs before the commit. Writes to `controls`
    /// attach or detach keyboard listeners and mirror into `controlsActive`
    /// when the schema declares it. With reflection on, the committed value is
    /// written to the host attribute of the same name.
    pub fn set_model_value(&mut self, name: &str, value: Value) -> Result<()> {
        let controls = if self.uses_controls && name == CONTROLS {
            value.as_bool()
        } else {
            None
        };
        self.model.set(name, value)?;
        if let Some(on) = controls {
            self.listen_keys(on);
            if self.schema().contains(CONTROLS_ACTIVE) {
                self.set_model_value(CONTROLS_ACTIVE, Value::Boolean(on))?;
            }
        }
        if self.reflect {
            self.reflect_attribute(name);
        }
        Ok(())
    }

    /// Apply every declared property present in `input`: first those named in
    /// the schema's order, then the rest in declaration order. Undeclared
    /// input entries are skipped. Nothing is written unless every accepted
    /// value is valid. Returns the accepted values, which are also passed to
    /// the whole-model hook.
    ///
    /// This is a merge, not a replacement: properties absent from `input`
    /// keep their stored values.
    pub fn set_model(&mut self, input: &ModelMap) -> Result<ModelMap> {
        let plan = self.model.plan(input)?;
        for (name, value) in &plan {
            self.set_model_value(name, value.clone())?;
        }
        let accepted: ModelMap = plan.into_iter().collect();
        self.model.notify_model(&accepted);
        Ok(accepted)
    }

    /// [`Element::set_model`] from a JSON object.
    pub fn set_model_json(&mut self, input: &JsonValue) -> Result<ModelMap> {
        let JsonValue::Object(obj) = input else {
            return Err(Error::Invalid(format!(
                "[ui] {{{}}} model must be an object, not {}",
                self.name,
                json_kind(input)
            )));
        };
        let mut map = ModelMap::new();
        for (k, v) in obj {
            match Value::from_json(v.clone()) {
                Some(value) => {
                    map.insert(k.clone(), value);
                }
                None if self.schema().contains(k) => {
                    return Err(self.model.mismatch(k, json_kind(v)));
                }
                None => {}
            }
        }
        self.set_model(&map)
    }

    /// Current value of a property, or `None` if it was never set.
    pub fn get_model_value(&self, name: &str) -> Option<&Value> {
        self.model.get(name)
    }

    /// Attach to host surfaces. Observes host attributes, pulls in existing
    /// attribute values when initial sync is on, and attaches keyboard
    /// listeners if `controls` is already true. On failure the element is left
    /// disconnected.
    pub fn connect(&mut self, surfaces: Surfaces) -> Result<()> {
        self.disconnect();
        self.attributes = Some(Subscription::attributes(&surfaces.host));
        self.surfaces = Some(surfaces);
        if self.initial_sync
            && let Err(e) = self.sync_attributes()
        {
            self.disconnect();
            return Err(e);
        }
        if self.uses_controls && self.model.get(CONTROLS) == Some(&Value::Boolean(true)) {
            self.listen_keys(true);
        }
        tracing::debug!(widget = %self.name, "connected");
        Ok(())
    }

    /// Release the attribute observer and keyboard listeners and drop the
    /// host surfaces. The model is kept.
    pub fn disconnect(&mut self) {
        if self.surfaces.take().is_some() {
            tracing::debug!(widget = %self.name, "disconnected");
        }
        self.keys = None;
        self.attributes = None;
    }

    /// Is the element attached to host surfaces?
    pub fn is_connected(&self) -> bool {
        self.surfaces.is_some()
    }

    /// Are keyboard listeners attached?
    pub fn is_listening(&self) -> bool {
        self.keys.is_some()
    }

    /// Attach or detach the window keyboard listeners. Attaching while
    /// already attached keeps the existing subscription. While disconnected
    /// this only detaches; attaching happens on the next connect.
    pub fn listen_keys(&mut self, on: bool) {
        if !on {
            if self.keys.take().is_some() {
                tracing::debug!(widget = %self.name, "keyboard detached");
            }
            return;
        }
        if self.keys.is_some() {
            return;
        }
        if let Some(s) = &self.surfaces {
            self.keys = Some(Subscription::keyboard(&s.keyboard));
            tracing::debug!(widget = %self.name, "keyboard attached");
        }
    }

    /// Handle an added or changed host attribute. Attributes the schema does
    /// not declare, and removed attributes, are ignored. Returns true if the
    /// model was written.
    pub fn attribute_changed(&mut self, name: &str) -> Result<bool> {
        let host = match &self.surfaces {
            Some(s) => Rc::clone(&s.host),
            None => return Err(self.not_connected()),
        };
        let Some(ty) = self.schema().get(name) else {
            tracing::trace!(widget = %self.name, attribute = name, "not a model attribute");
            return Ok(false);
        };
        let Some(raw) = host.attribute(name) else {
            return Ok(false);
        };
        let value = self.cast_attribute(name, ty, &raw)?;
        self.set_model_value(name, value)?;
        Ok(true)
    }

    /// Pull every model attribute currently on the host into the model.
    /// Returns the number of properties written.
    pub fn sync_attributes(&mut self) -> Result<usize> {
        let names = match &self.surfaces {
            Some(s) => s.host.attribute_names(),
            None => return Err(self.not_connected()),
        };
        let mut n = 0;
        for name in names {
            if self.attribute_changed(&name)? {
                n += 1;
            }
        }
        Ok(n)
    }

    /// Cast a raw attribute string, naming the widget on failure.
    fn cast_attribute(&self, name: &str, ty: PropType, raw: &str) -> Result<Value> {
        cast(ty, raw).map_err(|source| Error::Cast {
            widget: self.name.clone(),
            property: name.to_string(),
            source,
        })
    }

    /// Write a committed value to the host attribute, unless the host already
    /// holds the same text.
    fn reflect_attribute(&self, name: &str) {
        let (Some(s), Some(value)) = (&self.surfaces, self.model.get(name)) else {
            return;
        };
        let text = value.to_attribute();
        if s.host.attribute(name).as_deref() != Some(text.as_str()) {
            s.host.set_attribute(name, &text);
        }
    }

    /// The render surface, if connected.
    fn render(&self) -> Result<&Rc<dyn RenderSurface>> {
        self.surfaces
            .as_ref()
            .map(|s| &s.render)
            .ok_or_else(|| self.not_connected())
    }

    /// Replace the rendered content with the style sheet and markup.
    pub fn reset_markup(&self) -> Result<()> {
        let content = format!("<style>{}</style>{}", self.css, self.markup);
        self.render()?.set_content(&content);
        Ok(())
    }

    /// The first descendant matching a selector.
    pub fn element(&self, selector: &str) -> Result<Option<NodeId>> {
        Ok(self.render()?.query(selector))
    }

    /// All descendants matching a selector.
    pub fn elements(&self, selector: &str) -> Result<Vec<NodeId>> {
        Ok(self.render()?.query_all(selector))
    }

    /// Append a child to the rendered content.
    pub fn append_element(&self, node: NodeId) -> Result<()> {
        self.render()?.append_child(node);
        Ok(())
    }

    /// Remove the first child matching a selector.
    pub fn remove_element(&self, selector: &str) -> Result<bool> {
        Ok(self.render()?.remove_child(selector))
    }

    /// Error for operations that need host surfaces.
    fn not_connected(&self) -> Error {
        Error::NotConnected {
            widget: self.name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use serde_json::json;
    use slotmap::SlotMap;

    use super::*;
    use crate::testing::TestSurfaces;

    fn schema() -> Schema {
        Schema::new()
            .prop("count", PropType::Number)
            .prop("enabled", PropType::Boolean)
            .prop("tags", PropType::Array)
    }

    #[test]
    fn string_is_not_cast_by_model_writes() {
        let mut e = Element::new("counter", schema());
        let err = e.set_model_value("count", "5".into()).unwrap_err();
        assert!(matches!(
            err,
            Error::TypeMismatch {
                expected: PropType::Number,
                ..
            }
        ));
        assert_eq!(e.get_model_value("count"), None);
    }

    #[test]
    fn boolean_attribute_is_cast() -> Result<()> {
        let t = TestSurfaces::new();
        let mut e = Element::new("toggle", schema());
        e.connect(t.surfaces())?;
        t.host.set("enabled", "true");
        assert!(e.attribute_changed("enabled")?);
        assert_eq!(e.get_model_value("enabled"), Some(&Value::Boolean(true)));
        Ok(())
    }

    #[test]
    fn unknown_attributes_are_ignored() -> Result<()> {
        let t = TestSurfaces::new();
        let mut e = Element::new("toggle", schema());
        e.connect(t.surfaces())?;
        t.host.set("class", "big");
        assert!(!e.attribute_changed("class")?);
        t.host.remove("count");
        assert!(!e.attribute_changed("count")?);
        assert!(e.model().values().is_empty());
        Ok(())
    }

    #[test]
    fn initial_sync_on_connect() -> Result<()> {
        let t = TestSurfaces::new();
        t.host.set("count", "7");
        t.host.set("tags", r#"["a"]"#);
        t.host.set("id", "main");
        let mut e = Element::new("list", schema());
        e.connect(t.surfaces())?;
        assert_eq!(e.get_model_value("count"), Some(&Value::from(7)));
        assert_eq!(
            e.get_model_value("tags"),
            Some(&Value::Array(vec![json!("a")]))
        );
        assert_eq!(t.host.observers(), 1);
        Ok(())
    }

    #[test]
    fn failed_sync_leaves_disconnected() {
        let t = TestSurfaces::new();
        t.host.set("tags", "[oops");
        let mut e = Element::new("list", schema());
        let err = e.connect(t.surfaces()).unwrap_err();
        assert!(matches!(err, Error::Cast { .. }));
        assert!(!e.is_connected());
        assert_eq!(t.host.observers(), 0);
    }

    #[test]
    fn reflect_round_trips() -> Result<()> {
        let t = TestSurfaces::new();
        let mut e = Element::new("toggle", schema());
        e.set_reflect(true);
        e.connect(t.surfaces())?;
        e.set_model_value("count", 3.into())?;
        e.set_model_value("enabled", false.into())?;
        assert_eq!(t.host.get("count").as_deref(), Some("3"));
        assert_eq!(t.host.get("enabled").as_deref(), Some(""));
        // Feeding the reflected attributes back in is stable.
        let writes = t.host.writes();
        assert!(e.attribute_changed("enabled")?);
        assert!(e.attribute_changed("count")?);
        assert_eq!(e.get_model_value("enabled"), Some(&Value::Boolean(false)));
        assert_eq!(t.host.writes(), writes);
        Ok(())
    }

    #[test]
    fn no_reflection_by_default() -> Result<()> {
        let t = TestSurfaces::new();
        let mut e = Element::new("toggle", schema());
        e.connect(t.surfaces())?;
        e.set_model_value("count", 3.into())?;
        assert_eq!(t.host.get("count"), None);
        Ok(())
    }

    #[test]
    fn set_model_is_all_or_nothing() {
        let mut e = Element::new("counter", schema());
        let input: ModelMap = [
            ("count".to_string(), Value::from(1)),
            ("enabled".to_string(), Value::from("yes")),
        ]
        .into_iter()
        .collect();
        assert!(e.set_model(&input).is_err());
        assert!(e.model().values().is_empty());
    }

    #[test]
    fn set_model_hook_and_filtering() -> Result<()> {
        let mut e = Element::new("counter", schema());
        let seen = Rc::new(RefCell::new(None));
        let s = seen.clone();
        e.on_model(move |m| *s.borrow_mut() = Some(m.clone()));
        let accepted = e.set_model_json(&json!({"count": 2, "color": "red"}))?;
        assert_eq!(accepted.len(), 1);
        assert_eq!(seen.borrow().as_ref(), Some(&accepted));
        assert!(e.set_model_json(&json!([1])).is_err());
        assert!(matches!(
            e.set_model_json(&json!({"count": null})),
            Err(Error::TypeMismatch { .. })
        ));
        Ok(())
    }

    #[test]
    fn render_plumbing_needs_connection() -> Result<()> {
        let t = TestSurfaces::new();
        let mut e = Element::new("card", schema());
        e.set_template("<p></p>".into(), "p{}".into());
        assert!(matches!(e.reset_markup(), Err(Error::NotConnected { .. })));
        e.connect(t.surfaces())?;
        e.reset_markup()?;
        assert_eq!(t.render.content(), "<style>p{}</style><p></p>");
        Ok(())
    }

    #[test]
    fn child_elements() -> Result<()> {
        let t = TestSurfaces::new();
        let mut ids: SlotMap<NodeId, ()> = SlotMap::with_key();
        let (a, b) = (ids.insert(()), ids.insert(()));
        let mut e = Element::new("list", schema());
        assert!(matches!(e.append_element(a), Err(Error::NotConnected { .. })));
        assert!(matches!(e.elements(""), Err(Error::NotConnected { .. })));
        assert!(matches!(e.remove_element(""), Err(Error::NotConnected { .. })));

        e.connect(t.surfaces())?;
        e.append_element(a)?;
        e.append_element(b)?;
        t.render.register(".row", b);
        assert_eq!(e.elements("")?, vec![a, b]);
        assert_eq!(e.elements(".row")?, vec![b]);
        assert!(e.remove_element("")?);
        assert_eq!(e.elements("")?, vec![b]);
        assert!(e.remove_element(".row")?);
        assert!(!e.remove_element(".row")?);
        assert_eq!(e.element(".row")?, None);
        Ok(())
    }
}
