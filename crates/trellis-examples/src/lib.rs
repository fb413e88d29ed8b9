//! Example widget trees used by trellis demos.

/// Chord gym example widgets.
pub mod chordgym;

#[cfg(test)]
mod tests;
