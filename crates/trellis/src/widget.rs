//! Widgets: an [`Element`] paired with its [`Controls`] and chord tracker.

use crate::{
    chord::ChordTracker,
    controls::{Action, Controls},
    element::Element,
    error::{Error, Result},
    model::{CONTROLS, CONTROLS_ACTIVE, PropType, Schema, Value},
};

/// A widget instance.
#[derive(Debug)]
pub struct Widget {
    /// Model and host connection.
    element: Element,
    /// Bindings, actions and delegation selectors.
    controls: Controls,
    /// Keys currently held, as seen by this widget's listeners.
    tracker: ChordTracker,
}

impl Widget {
    /// Start building a widget with a declared name.
    pub fn builder(name: &str) -> WidgetBuilder {
        WidgetBuilder::new(name)
    }

    /// Declared widget name.
    pub fn name(&self) -> &str {
        self.element.name()
    }

    /// The widget's element.
    pub fn element(&self) -> &Element {
        &self.element
    }

    /// The widget's element, mutably.
    pub fn element_mut(&mut self) -> &mut Element {
        &mut self.element
    }

    /// The widget's controls.
    pub fn controls(&self) -> &Controls {
        &self.controls
    }

    /// The widget's controls, mutably.
    pub fn controls_mut(&mut self) -> &mut Controls {
        &mut self.controls
    }

    /// The widget's chord tracker.
    pub fn tracker(&self) -> &ChordTracker {
        &self.tracker
    }

    /// The widget's chord tracker, mutably.
    pub fn tracker_mut(&mut self) -> &mut ChordTracker {
        &mut self.tracker
    }

    /// Resolve an exact chord against this widget's own controls, running the
    /// bound action. No partial matches.
    pub fn keyevent(&mut self, chord: &str) -> Result<bool> {
        self.controls.dispatch(&mut self.element, chord)
    }
}

/// Builder for [`Widget`].
pub struct WidgetBuilder {
    /// Declared widget name.
    name: String,
    /// Widget schema.
    schema: Schema,
    /// Markup template.
    markup: String,
    /// Style sheet.
    css: String,
    /// Reflect model writes to host attributes.
    reflect: bool,
    /// Sync host attributes on connect.
    initial_sync: bool,
    /// Wire the `controls` property to keyboard listeners.
    controls: bool,
    /// Modifier key codes.
    modifiers: Vec<String>,
    /// Chord bindings, checked on build.
    bindings: Vec<(String, String)>,
    /// JSON binding documents, loaded on build.
    binding_docs: Vec<String>,
    /// Actions by name.
    actions: Vec<(String, Action)>,
    /// Delegation selectors.
    selectors: Vec<String>,
}

impl WidgetBuilder {
    /// Construct a builder with an empty schema.
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            schema: Schema::new(),
            markup: String::new(),
            css: String::new(),
            reflect: false,
            initial_sync: true,
            controls: false,
            modifiers: Vec::new(),
            bindings: Vec::new(),
            binding_docs: Vec::new(),
            actions: Vec::new(),
            selectors: Vec::new(),
        }
    }

    /// Set the schema.
    pub fn schema(mut self, schema: Schema) -> Self {
        self.schema = schema;
        self
    }

    /// Set the markup template.
    pub fn markup(mut self, markup: &str) -> Self {
        self.markup = markup.to_string();
        self
    }

    /// Set the style sheet.
    pub fn css(mut self, css: &str) -> Self {
        self.css = css.to_string();
        self
    }

    /// Write committed model values back to host attributes. Off by default.
    pub fn reflect_attributes(mut self, reflect: bool) -> Self {
        self.reflect = reflect;
        self
    }

    /// Pull existing host attributes into the model on connect. On by
    /// default.
    pub fn initial_sync(mut self, sync: bool) -> Self {
        self.initial_sync = sync;
        self
    }

    /// Add a boolean `controls` property that attaches and detaches keyboard
    /// listeners.
    pub fn use_controls(mut self) -> Self {
        self.controls = true;
        self
    }

    /// Set the key codes treated as modifiers.
    pub fn modifiers<I>(mut self, codes: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.modifiers = codes.into_iter().map(|x| x.as_ref().to_string()).collect();
        self
    }

    /// Bind a chord to an action name.
    pub fn bind(mut self, chord: &str, action: &str) -> Self {
        self.bindings.push((chord.to_string(), action.to_string()));
        self
    }

    /// Bind chords from a JSON object of chord to action name.
    pub fn bindings_json(mut self, json: &str) -> Self {
        self.binding_docs.push(json.to_string());
        self
    }

    /// Register an action.
    pub fn action<F>(mut self, name: &str, f: F) -> Self
    where
        F: FnMut(&mut Element, &str) -> Result<()> + 'static,
    {
        self.actions.push((name.to_string(), Box::new(f)));
        self
    }

    /// Delegate unresolved chords to the child controller matching a
    /// selector. Children are tried in the order added.
    pub fn delegate(mut self, selector: &str) -> Self {
        self.selectors.push(selector.to_string());
        self
    }

    /// Build the widget, checking bindings and the controls schema.
    pub fn build(self) -> Result<Widget> {
        let mut schema = self.schema;
        if self.controls {
            schema.insert(CONTROLS, PropType::Boolean);
            if let Some(ty) = schema.get(CONTROLS_ACTIVE)
                && ty != PropType::Boolean
            {
                return Err(Error::Invalid(format!(
                    "[ui] {{{}}} {CONTROLS_ACTIVE} must be boolean, not {ty}",
                    self.name
                )));
            }
        }

        let mut controls = Controls::new();
        for doc in &self.binding_docs {
            controls.load_bindings(doc)?;
        }
        for (chord, action) in &self.bindings {
            controls.bind(chord, action)?;
        }
        for (name, action) in self.actions {
            controls.action(&name, action);
        }
        for selector in &self.selectors {
            controls.delegate(selector);
        }

        let mut element = Element::new(&self.name, schema);
        element.set_template(self.markup, self.css);
        element.set_reflect(self.reflect);
        element.set_initial_sync(self.initial_sync);
        if self.controls {
            element.use_controls();
        }

        Ok(Widget {
            element,
            controls,
            tracker: ChordTracker::new(&self.modifiers),
        })
    }
}

/// Convenience for toggling a boolean-valued control property from an action.
pub fn toggle(element: &mut Element, name: &str) -> Result<()> {
    let on = element
        .get_model_value(name)
        .and_then(Value::as_bool)
        .unwrap_or(false);
    element.set_model_value(name, Value::Boolean(!on))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestSurfaces;

    #[test]
    fn controls_drive_keyboard() -> Result<()> {
        let t = TestSurfaces::new();
        let mut w = Widget::builder("menu")
            .schema(Schema::new().prop(CONTROLS_ACTIVE, PropType::Boolean))
            .use_controls()
            .build()?;
        assert_eq!(w.element().schema().get(CONTROLS), Some(PropType::Boolean));
        w.element_mut().connect(t.surfaces())?;

        w.element_mut().set_model_value(CONTROLS, true.into())?;
        assert!(w.element().is_listening());
        assert_eq!(t.keyboard.active().len(), 1);
        assert_eq!(
            w.element().get_model_value(CONTROLS_ACTIVE),
            Some(&Value::Boolean(true))
        );

        // A second attach keeps the one subscription.
        w.element_mut().set_model_value(CONTROLS, true.into())?;
        assert_eq!(t.keyboard.active().len(), 1);

        w.element_mut().set_model_value(CONTROLS, false.into())?;
        assert!(t.keyboard.active().is_empty());
        assert_eq!(
            w.element().get_model_value(CONTROLS_ACTIVE),
            Some(&Value::Boolean(false))
        );
        Ok(())
    }

    #[test]
    fn controls_before_connect_attach_on_connect() -> Result<()> {
        let t = TestSurfaces::new();
        let mut w = Widget::builder("menu").use_controls().build()?;
        w.element_mut().set_model_value(CONTROLS, true.into())?;
        assert!(!w.element().is_listening());
        w.element_mut().connect(t.surfaces())?;
        assert_eq!(t.keyboard.active().len(), 1);
        w.element_mut().disconnect();
        assert!(t.keyboard.active().is_empty());
        Ok(())
    }

    #[test]
    fn controls_attribute_attaches() -> Result<()> {
        let t = TestSurfaces::new();
        t.host.set(CONTROLS, "true");
        let mut w = Widget::builder("menu").use_controls().build()?;
        w.element_mut().connect(t.surfaces())?;
        assert_eq!(t.keyboard.active().len(), 1);
        Ok(())
    }

    #[test]
    fn controls_active_must_be_boolean() {
        let r = Widget::builder("menu")
            .schema(Schema::new().prop(CONTROLS_ACTIVE, PropType::String))
            .use_controls()
            .build();
        assert!(matches!(r, Err(Error::Invalid(_))));
    }

    #[test]
    fn bad_binding_fails_build() {
        let r = Widget::builder("menu").bind("   ", "noop").build();
        assert!(matches!(r, Err(Error::Invalid(_))));
    }

    #[test]
    fn keyevent_and_toggle() -> Result<()> {
        let mut w = Widget::builder("menu")
            .schema(Schema::new().prop("open", PropType::Boolean))
            .bind("Space", "toggle")
            .action("toggle", |e, _| toggle(e, "open"))
            .build()?;
        assert!(w.keyevent("Space")?);
        assert_eq!(
            w.element().get_model_value("open"),
            Some(&Value::Boolean(true))
        );
        assert!(w.keyevent("Space")?);
        assert_eq!(
            w.element().get_model_value("open"),
            Some(&Value::Boolean(false))
        );
        assert!(!w.keyevent("Space Space")?);
        Ok(())
    }
}
