//! Diagnostics produced by analyzers and their rendering

mod renderer;
mod types;

pub use renderer::{DiagnosticRenderer, OutputFormat, source_map};
pub use types::{Diagnostic, Location, Severity, SourceMap};
