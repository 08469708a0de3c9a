//! Concrete Syntax Tree (CST) for recast documents
//!
//! This module implements a lossless syntax tree using the Rowan library.
//! The CST preserves all source information including whitespace, comments,
//! and formatting, so that a refactoring touches only the text it rewrites.
//!
//! ## Architecture
//!
//! - **Green Tree**: immutable, position-independent storage. Cheap to clone
//!   and shared between tree versions; a replacement only rebuilds the spine
//!   from the edited node to the root.
//! - **Red Tree**: views with parent pointers and absolute offsets, created on
//!   demand from a green root.
//! - **[`SyntaxTree`]**: a green root plus node annotations. This is the value
//!   refactorings consume and produce.
//!
//! ## Trivia Handling
//!
//! Trivia are sibling tokens:
//! - **Trailing trivia**: everything after a token up to and including the
//!   first line break
//! - **Leading trivia**: everything else before a token
//!
//! This enables lossless representation: `parse(source).syntax().text() == source`
//!
//! ## Example
//!
//! ```
//! use recast_core::cst::{SyntaxKind, parse};
//!
//! let parse = parse("f(); // call\n");
//! assert_eq!(parse.syntax().text().to_string(), "f(); // call\n");
//!
//! let comments = parse
//!     .syntax()
//!     .descendants_with_tokens()
//!     .filter_map(|e| e.into_token())
//!     .filter(|t| t.kind() == SyntaxKind::CommentLine)
//!     .count();
//! assert_eq!(comments, 1);
//! ```

mod language;
mod lexer;
mod nodes;
mod parser;
mod syntax_kind;
mod tree;

pub mod ast;
pub mod locator;
pub mod make;
pub mod rewriter;
pub mod trivia;

pub use language::RecastLanguage;
pub use lexer::{CstLexResult, CstSpan, CstToken, LexerError, lex_with_trivia};
pub use locator::{TieBreak, find_ancestor, find_ancestor_of_kind, find_node};
pub use nodes::*;
pub use parser::{Parse, ParseError, parse};
pub use rewriter::{Rewriter, Visit, Visitor, rewrite, walk};
pub use syntax_kind::SyntaxKind;
pub use tree::{Annotation, SyntaxTree};
