//! Recast Core
//!
//! Lossless syntax trees, a local semantic model and diagnostics for span-targeted
//! refactorings. Operations live in `recast-rules`; reformatting of rewritten
//! nodes lives in `recast-formatter`.

pub mod action;
pub mod config;
pub mod cst; // Concrete Syntax Tree (lossless, Rowan-based)
pub mod diagnostics;
pub mod error;
pub mod result;
pub mod semantic;

// Re-export commonly used types
pub use action::{Applicability, CodeAction, Transform};
pub use config::{
    ConfigLoader, ConfigureAwaitPolicy, FormatterConfiguration, IndentStyle, RecastConfiguration,
    RuleSeverity,
};
pub use cst::{Annotation, SyntaxKind, SyntaxNode, SyntaxToken, SyntaxTree, TieBreak};
pub use diagnostics::{
    Diagnostic, DiagnosticRenderer, Location, OutputFormat, Severity, SourceMap,
};
pub use error::{ErrorKind, RecastError};
pub use result::{Result, ResultExt};
pub use semantic::{
    ConstantValue, LocalSemanticModel, MemberSymbol, SemanticModel, TypeCatalog, TypeRef,
};

/// Initialize the tracing subscriber for logging
///
/// The filter is read from `RECAST_LOG`, defaulting to `recast=info`.
pub fn init_tracing() {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter =
        EnvFilter::try_from_env("RECAST_LOG").unwrap_or_else(|_| EnvFilter::new("recast=info"));

    // A host may already have installed a subscriber
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true),
        )
        .try_init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
