use std::{cell::RefCell, collections::BTreeMap, rc::Rc};

use anyhow::{Context, Result, bail};
use trellis::{
    Element, NodeId, PropType, Schema, Value, Widget, WidgetBuilder,
    model::CONTROLS_ACTIVE,
    testing::Harness,
    widget::toggle,
};

/// Key codes the app treats as modifiers.
pub const MODIFIERS: [&str; 4] = ["ControlLeft", "ControlRight", "ShiftLeft", "AltLeft"];

/// A walk through chord resolution: local matches, delegation order,
/// modifier chords and the `controls` switch.
pub const DEMO: &str = "\
# keyboard listeners are off until controls is set
press KeyJ
attr app controls true
press KeyJ
press KeyJ
press KeyK
# the sidebar is tried before the editor, and the tree inside it first
press KeyL
press Enter
# auto-repeat builds a two-key chord
down KeyG
down KeyG
up KeyG
down ShiftLeft
press KeyG
up ShiftLeft
# held modifiers survive a match
down ControlLeft
press KeyS
press KeyS
down KeyK
down KeyB
up KeyB
up KeyK
up ControlLeft
show app
show sidebar
show tree
show editor
attr app controls \"\"
press KeyJ
";

/// Shared transcript of fired actions.
type Log = Rc<RefCell<Vec<String>>>;

/// Register an action that records itself in the log before running.
fn logged<F>(b: WidgetBuilder, log: &Log, name: &str, mut f: F) -> WidgetBuilder
where
    F: FnMut(&mut Element) -> trellis::Result<()> + 'static,
{
    let log = log.clone();
    let action = name.to_string();
    b.action(name, move |e, chord| {
        log.borrow_mut()
            .push(format!("{}: {action} <{chord}>", e.name()));
        f(e)
    })
}

/// Add `delta` to a numeric property, clamping at zero.
fn step(e: &mut Element, name: &str, delta: f64) -> trellis::Result<()> {
    let n = e.get_model_value(name).and_then(Value::as_f64).unwrap_or(0.0);
    e.set_model_value(name, Value::Number((n + delta).max(0.0)))
}

/// The top-level app: saves, toggles the sidebar, and delegates everything
/// else to the sidebar and then the editor.
fn app(log: &Log) -> Result<Widget> {
    let schema = Schema::new()
        .prop(CONTROLS_ACTIVE, PropType::Boolean)
        .prop("saved", PropType::Number)
        .prop("sidebar", PropType::Boolean);
    let b = Widget::builder("app")
        .schema(schema)
        .use_controls()
        .modifiers(MODIFIERS)
        .reflect_attributes(true)
        .markup(r#"<nav id="sidebar"></nav><main id="editor"></main>"#)
        .css("nav { width: 20ch }")
        .bindings_json(r#"{"mod-ControlLeft KeyS": "save", "mod-ControlLeft KeyK KeyB": "sidebar"}"#)
        .delegate("#sidebar")
        .delegate("#editor");
    let b = logged(b, log, "save", |e| step(e, "saved", 1.0));
    let b = logged(b, log, "sidebar", |e| toggle(e, "sidebar"));
    Ok(b.build()?)
}

/// A selectable list that hands unresolved chords to its tree.
fn sidebar(log: &Log) -> Result<Widget> {
    let b = Widget::builder("sidebar")
        .schema(Schema::new().prop("selected", PropType::Number))
        .bind("KeyJ", "down")
        .bind("KeyK", "up")
        .delegate("#tree");
    let b = logged(b, log, "down", |e| step(e, "selected", 1.0));
    let b = logged(b, log, "up", |e| step(e, "selected", -1.0));
    Ok(b.build()?)
}

/// An expandable tree node.
fn tree(log: &Log) -> Result<Widget> {
    let b = Widget::builder("tree")
        .schema(Schema::new().prop("expanded", PropType::Boolean))
        .bind("KeyL", "expand")
        .bind("KeyH", "collapse");
    let b = logged(b, log, "expand", |e| {
        e.set_model_value("expanded", Value::Boolean(true))
    });
    let b = logged(b, log, "collapse", |e| {
        e.set_model_value("expanded", Value::Boolean(false))
    });
    Ok(b.build()?)
}

/// A modal text view.
fn editor(log: &Log) -> Result<Widget> {
    let b = Widget::builder("editor")
        .schema(
            Schema::new()
                .prop("line", PropType::Number)
                .prop("mode", PropType::String),
        )
        .bind("KeyG KeyG", "top")
        .bind("mod-ShiftLeft KeyG", "bottom")
        .bind("KeyJ", "down")
        .bind("Enter", "insert")
        .bind("Escape", "normal");
    let b = logged(b, log, "top", |e| e.set_model_value("line", Value::Number(0.0)));
    let b = logged(b, log, "bottom", |e| {
        e.set_model_value("line", Value::Number(99.0))
    });
    let b = logged(b, log, "down", |e| step(e, "line", 1.0));
    let b = logged(b, log, "insert", |e| e.set_model_value("mode", "insert".into()));
    let b = logged(b, log, "normal", |e| e.set_model_value("mode", "normal".into()));
    Ok(b.build()?)
}

/// The app, its children, and a transcript of what happened.
pub struct ChordGym {
    /// Widgets on in-memory surfaces sharing one keyboard.
    harness: Harness,
    /// Widget handles by name.
    nodes: BTreeMap<String, NodeId>,
    /// Fired actions, drained into the transcript after each line.
    log: Log,
}

impl ChordGym {
    /// Build and compose the widget tree.
    pub fn new() -> Result<Self> {
        let log = Log::default();
        let mut harness = Harness::new();
        let app = harness.add(app(&log)?)?;
        let sidebar = harness.add(sidebar(&log)?)?;
        let tree = harness.add(tree(&log)?)?;
        let editor = harness.add(editor(&log)?)?;

        harness.tree.widget(app)?.element().reset_markup()?;
        harness.mount(app, "#sidebar", sidebar)?;
        harness.mount(app, "#editor", editor)?;
        harness.mount(sidebar, "#tree", tree)?;
        harness.tree.compose(sidebar)?;
        harness.tree.compose(app)?;

        let nodes = [
            ("app", app),
            ("sidebar", sidebar),
            ("tree", tree),
            ("editor", editor),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
        Ok(Self {
            harness,
            nodes,
            log,
        })
    }

    /// Handle of a named widget.
    pub fn node(&self, name: &str) -> Result<NodeId> {
        self.nodes
            .get(name)
            .copied()
            .with_context(|| format!("no widget named {name:?}"))
    }

    /// The underlying harness.
    pub fn harness(&self) -> &Harness {
        &self.harness
    }

    /// Current model value of a widget property.
    pub fn value(&self, widget: &str, name: &str) -> Result<Option<Value>> {
        Ok(self.harness.value(self.node(widget)?, name))
    }

    /// Every binding in the tree as `widget chord action`, sorted.
    pub fn bindings(&self) -> Result<Vec<String>> {
        let mut out = Vec::new();
        for (name, id) in &self.nodes {
            let w = self.harness.tree.widget(*id)?;
            for (chord, action) in w.controls().bindings() {
                out.push(format!("{name:<8} {chord:<28} {action}"));
            }
        }
        Ok(out)
    }

    /// Run one script line, returning the transcript lines it produced.
    ///
    /// Commands: `down <code>`, `up <code>`, `press <code>`,
    /// `attr <widget> <name> [value]` (no value removes the attribute, `""`
    /// sets it empty) and `show <widget>`. Blank lines and `#` comments are
    /// skipped.
    pub fn run_line(&mut self, line: &str) -> Result<Vec<String>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(Vec::new());
        }
        tracing::debug!(line, "script");
        let mut words = line.split_whitespace();
        let cmd = words.next().unwrap_or_default();
        let args: Vec<&str> = words.collect();
        let mut out = Vec::new();
        match (cmd, args.as_slice()) {
            ("down", [code]) => {
                if !self.harness.key_down(code)? && !MODIFIERS.contains(code) {
                    out.push(format!("  {code}: unhandled"));
                }
            }
            ("up", [code]) => self.harness.key_up(code)?,
            ("press", [code]) => {
                if !self.harness.press(code)? {
                    out.push(format!("  {code}: unhandled"));
                }
            }
            ("attr", [widget, name, value @ ..]) => {
                let id = self.node(widget)?;
                if value.is_empty() {
                    self.harness.surfaces(id)?.host.remove(name);
                    self.harness.flush(id)?;
                } else {
                    let value = match value.join(" ") {
                        v if v == r#""""# => String::new(),
                        v => v,
                    };
                    self.harness.set_attribute(id, name, &value)?;
                }
                out.push(format!(
                    "  {widget} listening: {}",
                    self.harness.tree.widget(id)?.element().is_listening()
                ));
            }
            ("show", [widget]) => out.push(self.show(widget)?),
            _ => bail!("bad script line: {line:?}"),
        }
        let fired: Vec<String> = self.log.borrow_mut().drain(..).collect();
        Ok(fired.into_iter().chain(out).collect())
    }

    /// Run a whole script. Each input line is echoed before its output.
    pub fn run_script(&mut self, script: &str) -> Result<Vec<String>> {
        let mut out = Vec::new();
        for (n, line) in script.lines().enumerate() {
            let produced = self
                .run_line(line)
                .with_context(|| format!("line {}", n + 1))?;
            if !line.trim().is_empty() && !line.trim_start().starts_with('#') {
                out.push(format!("> {}", line.trim()));
            }
            out.extend(produced);
        }
        Ok(out)
    }

    /// A widget's model as `name {k=v, ...}`.
    fn show(&self, widget: &str) -> Result<String> {
        let id = self.node(widget)?;
        let values = self.harness.tree.widget(id)?.element().model().values();
        let fields: Vec<String> = values
            .iter()
            .map(|(k, v)| match v {
                Value::Number(_) => format!("{k}={}", v.to_attribute()),
                _ => format!("{k}={}", v.to_json()),
            })
            .collect();
        Ok(format!("  {widget} {{{}}}", fields.join(", ")))
    }
}

