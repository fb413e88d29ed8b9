//! Tracking of pressed keys as multi-key chords.
//!
//! A chord is the sequence of keys currently considered pressed, written as
//! space-separated tokens: `"KeyG KeyG"`, `"mod-ControlLeft KeyS"`. Pressing a
//! modifier starts a fresh chord holding only that modifier. Chords are
//! bounded at [`MAX_CHORD`] tokens.
//!
//! The tracker only sees key-down and key-up. It is not reset when the window
//! loses focus, so a key released outside the window stays in the chord until
//! the next modifier press, overflow, or an explicit [`ChordTracker::clear`].

use std::{collections::HashSet, fmt, str::FromStr};

use crate::error::{Error, Result};

/// Maximum number of tokens in a chord.
pub const MAX_CHORD: usize = 3;

/// Prefix marking a modifier token.
const MOD_PREFIX: &str = "mod-";

/// One element of a chord.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyToken {
    /// A held modifier key, written `mod-<code>`.
    Modifier(String),
    /// Any other key, written as its code.
    Key(String),
}

impl KeyToken {
    /// Is this a modifier token?
    pub fn is_modifier(&self) -> bool {
        matches!(self, Self::Modifier(_))
    }

    /// The underlying key code.
    pub fn code(&self) -> &str {
        match self {
            Self::Modifier(c) | Self::Key(c) => c,
        }
    }
}

impl fmt::Display for KeyToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Modifier(c) => write!(f, "{MOD_PREFIX}{c}"),
            Self::Key(c) => f.write_str(c),
        }
    }
}

impl From<&str> for KeyToken {
    fn from(s: &str) -> Self {
        match s.strip_prefix(MOD_PREFIX) {
            Some(code) => Self::Modifier(code.to_string()),
            None => Self::Key(s.to_string()),
        }
    }
}

/// An ordered sequence of key tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Chord {
    /// Tokens in press order.
    tokens: Vec<KeyToken>,
}

impl Chord {
    /// Construct an empty chord.
    pub fn new() -> Self {
        Self::default()
    }

    /// Tokens in press order.
    pub fn tokens(&self) -> &[KeyToken] {
        &self.tokens
    }

    /// Number of tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// True if no keys are held.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Append a token.
    fn push(&mut self, token: KeyToken) {
        self.tokens.push(token);
    }

    /// Drop every non-modifier token.
    pub fn retain_modifiers(&mut self) {
        self.tokens.retain(KeyToken::is_modifier);
    }

    /// Drop every occurrence of a token.
    fn remove(&mut self, token: &KeyToken) {
        self.tokens.retain(|t| t != token);
    }

    /// Drop all tokens.
    pub fn clear(&mut self) {
        self.tokens.clear();
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, t) in self.tokens.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{t}")?;
        }
        Ok(())
    }
}

/// Parses a binding such as `"mod-ControlLeft KeyS"`. Whitespace between
/// tokens is normalized.
impl FromStr for Chord {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let tokens: Vec<KeyToken> = s.split_whitespace().map(KeyToken::from).collect();
        if tokens.is_empty() {
            return Err(Error::Invalid("empty chord".into()));
        }
        if tokens.len() > MAX_CHORD {
            return Err(Error::Invalid(format!(
                "chord {s:?} is longer than {MAX_CHORD} keys"
            )));
        }
        Ok(Self { tokens })
    }
}

/// The outcome of a key press on a tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyDown {
    /// A modifier was pressed and now forms the whole chord.
    Modifier,
    /// The chord was full and has been cleared.
    Overflow,
    /// The key was added; the chord is ready to resolve.
    Chord(String),
}

/// Accumulates key presses into a chord.
#[derive(Debug, Clone, Default)]
pub struct ChordTracker {
    /// Key codes treated as modifiers.
    modifiers: HashSet<String>,
    /// Keys currently considered pressed.
    pressed: Chord,
}

impl ChordTracker {
    /// Construct a tracker with a set of modifier key codes.
    pub fn new<I>(modifiers: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        Self {
            modifiers: modifiers
                .into_iter()
                .map(|x| x.as_ref().to_string())
                .collect(),
            pressed: Chord::new(),
        }
    }

    /// Is this key code a modifier?
    pub fn is_modifier(&self, code: &str) -> bool {
        self.modifiers.contains(code)
    }

    /// Keys currently considered pressed.
    pub fn pressed(&self) -> &Chord {
        &self.pressed
    }

    /// Record a key press.
    pub fn key_down(&mut self, code: &str) -> KeyDown {
        if self.is_modifier(code) {
            self.pressed.clear();
            self.pressed.push(KeyToken::Modifier(code.to_string()));
            return KeyDown::Modifier;
        }
        if self.pressed.len() >= MAX_CHORD {
            tracing::debug!(chord = %self.pressed, key = code, "chord overflow, clearing");
            self.pressed.clear();
            return KeyDown::Overflow;
        }
        self.pressed.push(KeyToken::Key(code.to_string()));
        KeyDown::Chord(self.pressed.to_string())
    }

    /// Record a key release.
    pub fn key_up(&mut self, code: &str) {
        let token = if self.is_modifier(code) {
            KeyToken::Modifier(code.to_string())
        } else {
            KeyToken::Key(code.to_string())
        };
        self.pressed.remove(&token);
    }

    /// Mark the current chord as handled, keeping held modifiers so they can
    /// start the next chord.
    pub fn resolved(&mut self) {
        self.pressed.retain_modifiers();
    }

    /// Forget all pressed keys.
    pub fn clear(&mut self) {
        self.pressed.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> ChordTracker {
        ChordTracker::new(["ControlLeft", "ShiftLeft"])
    }

    #[test]
    fn parse_and_display() -> Result<()> {
        let c: Chord = "  mod-ControlLeft   KeyS ".parse()?;
        assert_eq!(c.to_string(), "mod-ControlLeft KeyS");
        assert!(c.tokens()[0].is_modifier());
        assert_eq!(c.tokens()[1].code(), "KeyS");
        assert!("".parse::<Chord>().is_err());
        assert!("a b c d".parse::<Chord>().is_err());
        Ok(())
    }

    #[test]
    fn keys_accumulate() {
        let mut t = tracker();
        assert_eq!(t.key_down("KeyG"), KeyDown::Chord("KeyG".into()));
        assert_eq!(t.key_down("KeyG"), KeyDown::Chord("KeyG KeyG".into()));
    }

    #[test]
    fn modifier_replaces() {
        let mut t = tracker();
        t.key_down("KeyA");
        t.key_down("KeyB");
        assert_eq!(t.key_down("ControlLeft"), KeyDown::Modifier);
        assert_eq!(t.pressed().to_string(), "mod-ControlLeft");
        assert_eq!(
            t.key_down("KeyS"),
            KeyDown::Chord("mod-ControlLeft KeyS".into())
        );
    }

    #[test]
    fn fourth_key_clears() {
        let mut t = tracker();
        t.key_down("KeyA");
        t.key_down("KeyB");
        t.key_down("KeyC");
        assert_eq!(t.pressed().len(), 3);
        assert_eq!(t.key_down("KeyD"), KeyDown::Overflow);
        assert!(t.pressed().is_empty());
    }

    #[test]
    fn release_removes_by_value() {
        let mut t = tracker();
        t.key_down("ShiftLeft");
        t.key_down("KeyA");
        t.key_down("KeyB");
        t.key_up("KeyA");
        assert_eq!(t.pressed().to_string(), "mod-ShiftLeft KeyB");
        t.key_up("ShiftLeft");
        assert_eq!(t.pressed().to_string(), "KeyB");
        t.key_up("KeyZ");
        assert_eq!(t.pressed().to_string(), "KeyB");
    }

    #[test]
    fn resolved_keeps_modifiers() {
        let mut t = tracker();
        t.key_down("ControlLeft");
        t.key_down("KeyS");
        t.resolved();
        assert_eq!(t.pressed().to_string(), "mod-ControlLeft");
    }
}
