pub mod collections;
pub mod config;
pub mod cursors;
pub mod functions;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;
