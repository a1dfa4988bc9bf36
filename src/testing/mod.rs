//! Stub producers for exercising the cursor machinery in tests.

pub mod stubs;

pub use stubs::{CountingSource, RegainingSource};
