//! Recast Rules
//!
//! Built-in refactorings and analyzers, and the [`Engine`] that dispatches
//! them.
//!
//! # Example
//!
//! ```
//! use recast_core::RecastConfiguration;
//! use recast_core::cst::parse;
//! use recast_rules::{Engine, SWITCH_TO_IF};
//! use rowan::{TextRange, TextSize};
//!
//! let source = "switch (x) { case 1: f(); break; default: g(); break; }";
//! let tree = parse(source).tree();
//! let engine = Engine::with_builtins(RecastConfiguration::default());
//!
//! let actions = engine.code_actions(&tree, TextRange::empty(TextSize::from(0)));
//! let convert = actions.iter().find(|a| a.id == SWITCH_TO_IF).unwrap();
//! let edited = engine.apply(convert, &tree).unwrap();
//! assert!(edited.text().starts_with("if (x == 1)"));
//! ```

pub mod analyzers;
pub mod engine;
pub mod refactorings;

pub use analyzers::{
    AnalysisContext, Analyzer, CONFIGURE_AWAIT, ConfigureAwaitAnalyzer, RuleDescriptor,
};
pub use engine::{Document, DocumentHost, Engine};
pub use refactorings::{
    AddBracesToIfElseChain, ConvertSwitchToIf, FormatParameterList, IF_ELSE_BRACES,
    PARAMETER_LIST, Refactoring, RefactoringContext, SWITCH_TO_IF,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
