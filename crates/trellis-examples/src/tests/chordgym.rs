use trellis::Value;

use crate::chordgym::{ChordGym, DEMO};

#[test]
fn demo_script() -> anyhow::Result<()> {
    let mut gym = ChordGym::new()?;
    let out = gym.run_script(DEMO)?;

    assert_eq!(out[0], "> press KeyJ");
    assert_eq!(out[1], "  KeyJ: unhandled");
    assert!(out.contains(&"sidebar: down <KeyJ>".to_string()));
    assert!(out.contains(&"tree: expand <KeyL>".to_string()));
    assert!(out.contains(&"editor: top <KeyG KeyG>".to_string()));
    assert!(out.contains(&"app: sidebar <mod-ControlLeft KeyK KeyB>".to_string()));
    assert_eq!(out.last().map(String::as_str), Some("  KeyJ: unhandled"));

    assert_eq!(gym.value("sidebar", "selected")?, Some(Value::Number(1.0)));
    assert_eq!(gym.value("tree", "expanded")?, Some(Value::Boolean(true)));
    assert_eq!(gym.value("editor", "line")?, Some(Value::Number(99.0)));
    assert_eq!(gym.value("editor", "mode")?, Some(Value::from("insert")));
    assert_eq!(gym.value("app", "saved")?, Some(Value::Number(2.0)));
    assert_eq!(gym.value("app", "sidebar")?, Some(Value::Boolean(true)));
    assert_eq!(gym.value("app", "controlsActive")?, Some(Value::Boolean(false)));
    assert!(gym.harness().listeners().is_empty());
    Ok(())
}

#[test]
fn sidebar_shadows_editor() -> anyhow::Result<()> {
    let mut gym = ChordGym::new()?;
    gym.run_line("attr app controls true")?;
    let out = gym.run_line("press KeyJ")?;
    assert_eq!(out, vec!["sidebar: down <KeyJ>"]);
    assert_eq!(gym.value("editor", "line")?, None);
    Ok(())
}

#[test]
fn reflected_attributes() -> anyhow::Result<()> {
    let mut gym = ChordGym::new()?;
    gym.run_script("attr app controls true\ndown ControlLeft\npress KeyS\n")?;
    let host = gym.harness().surfaces(gym.node("app")?)?.host.clone();
    assert_eq!(host.get("saved").as_deref(), Some("1"));
    assert_eq!(host.get("controlsActive").as_deref(), Some("true"));
    let out = gym.run_line("show app")?;
    assert_eq!(
        out,
        vec!["  app {controls=true, controlsActive=true, saved=1}"]
    );
    Ok(())
}

#[test]
fn bindings_table() -> anyhow::Result<()> {
    let gym = ChordGym::new()?;
    let table = gym.bindings()?;
    assert_eq!(table.len(), 11);
    assert!(table[0].starts_with("app "));
    Ok(())
}

#[test]
fn bad_lines() -> anyhow::Result<()> {
    let mut gym = ChordGym::new()?;
    assert!(gym.run_line("jump KeyJ").is_err());
    assert!(gym.run_line("show nobody").is_err());
    assert!(gym.run_line("   # comment").unwrap().is_empty());
    let err = gym.run_script("press KeyJ\nattr app controls\nbogus\n").unwrap_err();
    assert_eq!(err.to_string(), "line 3");
    Ok(())
}

#[test]
fn quoted_empty_attribute_turns_controls_off() -> anyhow::Result<()> {
    let mut gym = ChordGym::new()?;
    gym.run_line("attr app controls true")?;
    assert_eq!(
        gym.run_line("attr app controls false")?,
        vec!["  app listening: true"]
    );
    assert_eq!(
        gym.run_line(r#"attr app controls """#)?,
        vec!["  app listening: false"]
    );
    let host = gym.harness().surfaces(gym.node("app")?)?.host.clone();
    assert_eq!(host.get("controls").as_deref(), Some(""));
    assert_eq!(gym.value("app", "controlsActive")?, Some(Value::Boolean(false)));
    assert_eq!(gym.run_line("press KeyJ")?, vec!["  KeyJ: unhandled"]);
    Ok(())
}
