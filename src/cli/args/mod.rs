//! Shared CLI argument types

mod common;
mod global;

pub use common::{LogLevel, OutputFormat};
pub use global::GlobalOptions;
