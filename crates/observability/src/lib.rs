//! Process-wide tracing/logging setup.

pub mod tracing;

pub use tracing::{LogFormat, init, init_with};
