//! Recast Formatter
//!
//! Formatting pass run after a rewrite. Refactorings build new nodes without
//! caring about layout and mark them with [`Annotation::Format`]; this crate
//! normalizes spacing and indentation inside those nodes only. Everything
//! outside an annotated node is left byte-for-byte intact.
//!
//! # Example
//!
//! ```
//! use recast_core::cst::{Annotation, SyntaxKind, parse};
//! use recast_formatter::{FormatOptions, format_annotated};
//!
//! let tree = parse("if(a){\nf( x );\n}\ng( y );").tree();
//! let stmt = tree.root().descendants().find(|n| n.kind() == SyntaxKind::IfStmt).unwrap();
//! let tree = tree.with_annotation(&stmt, Annotation::Format).unwrap();
//!
//! let formatted = format_annotated(&tree, &FormatOptions::default()).unwrap();
//! assert_eq!(formatted.text(), "if (a) {\n    f(x);\n}\ng( y );");
//! ```

mod layout;

use recast_core::cst::{Annotation, SyntaxTree};
use recast_core::{FormatterConfiguration, Result};

/// Formatting options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatOptions {
    /// Text of one indentation level
    pub indent: String,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            indent: "    ".to_string(),
        }
    }
}

impl From<&FormatterConfiguration> for FormatOptions {
    fn from(config: &FormatterConfiguration) -> Self {
        Self {
            indent: config.indent_unit(),
        }
    }
}

/// Format every node annotated with [`Annotation::Format`]
///
/// Annotations are consumed: the returned tree carries none. Nested
/// annotated nodes are formatted as part of their outermost annotated
/// ancestor.
pub fn format_annotated(tree: &SyntaxTree, options: &FormatOptions) -> Result<SyntaxTree> {
    let mut tree = tree.clone();
    let mut formatted = 0usize;

    // Replacing a node drops its annotation and those nested in it
    while let Some(node) = tree.annotated(&Annotation::Format).into_iter().next() {
        let green = layout::format_node(&node, options);
        tree = tree.replace(&node, green)?;
        formatted += 1;
    }

    tracing::debug!(formatted, "formatted annotated nodes");
    Ok(tree.without_annotation(&Annotation::Format))
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
