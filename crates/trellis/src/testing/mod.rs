//! In-memory surfaces and a harness for exercising widgets without a host.

/// Tree harness.
mod harness;
/// Surface implementations.
mod surfaces;

pub use harness::Harness;
pub use surfaces::{TestHost, TestKeyboard, TestRender, TestSurfaces};
