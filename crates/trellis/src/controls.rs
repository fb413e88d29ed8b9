//! Per-widget control tables: chord bindings, named actions, and the
//! selectors of child controllers that unresolved chords are delegated to.

use std::{
    collections::{BTreeMap, HashMap},
    fmt,
};

use crate::{
    chord::Chord,
    element::Element,
    error::{Error, Result},
};

/// An action invoked with the chord that triggered it.
pub type Action = Box<dyn FnMut(&mut Element, &str) -> Result<()>>;

/// Controls for one widget.
#[derive(Default)]
pub struct Controls {
    /// Chord string to action name.
    bindings: HashMap<String, String>,
    /// Action name to callback.
    actions: HashMap<String, Action>,
    /// Selectors of child controllers, in delegation order.
    selectors: Vec<String>,
}

impl fmt::Debug for Controls {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut actions: Vec<_> = self.actions.keys().collect();
        actions.sort();
        f.debug_struct("Controls")
            .field("bindings", &self.bindings)
            .field("actions", &actions)
            .field("selectors", &self.selectors)
            .finish()
    }
}

impl Controls {
    /// Construct an empty control table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a chord to an action name, replacing any existing binding for the
    /// chord.
    pub fn bind(&mut self, chord: &str, action: &str) -> Result<()> {
        let chord: Chord = chord.parse()?;
        self.bindings.insert(chord.to_string(), action.to_string());
        Ok(())
    }

    /// Load bindings from a JSON object mapping chords to action names:
    /// `{"KeyJ": "down", "mod-ControlLeft KeyS": "save"}`.
    pub fn load_bindings(&mut self, json: &str) -> Result<()> {
        let map: BTreeMap<String, String> = serde_json::from_str(json)?;
        for (chord, action) in &map {
            self.bind(chord, action)?;
        }
        Ok(())
    }

    /// Register an action, replacing any existing action of the same name.
    pub fn action<F>(&mut self, name: &str, f: F)
    where
        F: FnMut(&mut Element, &str) -> Result<()> + 'static,
    {
        self.actions.insert(name.to_string(), Box::new(f));
    }

    /// Add a child controller selector to the end of the delegation order.
    pub fn delegate(&mut self, selector: &str) {
        self.selectors.push(selector.to_string());
    }

    /// Child controller selectors in delegation order.
    pub fn selectors(&self) -> &[String] {
        &self.selectors
    }

    /// The action bound to an exact chord string.
    pub fn resolve(&self, chord: &str) -> Option<&str> {
        self.bindings.get(chord).map(String::as_str)
    }

    /// All bindings, sorted by chord.
    pub fn bindings(&self) -> Vec<(&str, &str)> {
        let mut out: Vec<_> = self
            .bindings
            .iter()
            .map(|(c, a)| (c.as_str(), a.as_str()))
            .collect();
        out.sort_unstable();
        out
    }

    /// Look up an exact chord and run its action. Returns false if the chord
    /// is not bound.
    pub(crate) fn dispatch(&mut self, element: &mut Element, chord: &str) -> Result<bool> {
        let Some(name) = self.bindings.get(chord) else {
            return Ok(false);
        };
        let action = self
            .actions
            .get_mut(name)
            .ok_or_else(|| Error::UnknownAction {
                widget: element.name().to_string(),
                action: name.clone(),
            })?;
        tracing::debug!(widget = element.name(), chord, action = %name, "control");
        action(element, chord)?;
        Ok(true)
    }
}
