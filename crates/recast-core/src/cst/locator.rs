//! Span-targeted node lookup
//!
//! Editors hand us a cursor or a selection. The locator resolves it to the
//! innermost node whose full range (trivia included) contains the span, and
//! from there walks ancestors until the requested kind shows up.

use rowan::{NodeOrToken, TextRange, TokenAtOffset};

use super::ast::AstNode;
use super::{SyntaxKind, SyntaxNode};

/// How to pick among nested nodes sharing the same range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TieBreak {
    /// Deepest node
    #[default]
    Innermost,
    /// Topmost ancestor whose range is identical to the deepest node's
    Outermost,
}

/// Node targeted by `span`
///
/// A collapsed span sitting between two tokens resolves to the token that ends
/// there; at the very start of the document it resolves to the first token.
pub fn find_node(root: &SyntaxNode, span: TextRange, tie: TieBreak) -> Option<SyntaxNode> {
    if !root.text_range().contains_range(span) {
        tracing::debug!(?span, "span outside of document");
        return None;
    }

    let node = if span.is_empty() {
        let token = match root.token_at_offset(span.start()) {
            TokenAtOffset::None => return Some(root.clone()),
            TokenAtOffset::Single(token) => token,
            TokenAtOffset::Between(left, _) => left,
        };
        token.parent()?
    } else {
        match root.covering_element(span) {
            NodeOrToken::Node(node) => node,
            NodeOrToken::Token(token) => token.parent()?,
        }
    };

    Some(match tie {
        TieBreak::Innermost => node,
        TieBreak::Outermost => outermost_with_same_range(node),
    })
}

fn outermost_with_same_range(node: SyntaxNode) -> SyntaxNode {
    let range = node.text_range();
    let mut current = node;
    while let Some(parent) = current.parent()
        && parent.text_range() == range
    {
        current = parent;
    }
    current
}

/// Closest node of `kind` enclosing `span`
pub fn find_ancestor_of_kind(
    root: &SyntaxNode,
    span: TextRange,
    kind: SyntaxKind,
    tie: TieBreak,
) -> Option<SyntaxNode> {
    find_node(root, span, tie)?
        .ancestors()
        .find(|node| node.kind() == kind)
}

/// Closest typed node enclosing `span`
pub fn find_ancestor<N: AstNode>(root: &SyntaxNode, span: TextRange, tie: TieBreak) -> Option<N> {
    find_node(root, span, tie)?.ancestors().find_map(N::cast)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cst::ast::{IfStmt, ParameterList, SwitchStmt};
    use crate::cst::parse;
    use rowan::TextSize;

    fn offset_of(source: &str, needle: &str) -> TextSize {
        TextSize::from(source.find(needle).unwrap() as u32)
    }

    fn cursor(source: &str, needle: &str) -> TextRange {
        TextRange::empty(offset_of(source, needle))
    }

    #[test]
    fn test_cursor_inside_token() {
        let source = "void M(int a, int b) { }";
        let root = parse(source).syntax();
        let span = TextRange::empty(offset_of(source, "int a") + TextSize::from(1));

        let list: ParameterList = find_ancestor(&root, span, TieBreak::Innermost).unwrap();
        assert_eq!(list.parameters().count(), 2);
    }

    #[test]
    fn test_collapsed_span_prefers_token_ending_there() {
        // The boundary between `)` and `{` belongs to the parameter list
        let source = "void M(int a, int b){ }";
        let root = parse(source).syntax();
        let span = cursor(source, "{");

        let node = find_node(&root, span, TieBreak::Innermost).unwrap();
        assert_eq!(node.kind(), SyntaxKind::ParameterList);
    }

    #[test]
    fn test_start_of_document_uses_first_token() {
        let source = "switch (x) { default: break; }";
        let root = parse(source).syntax();
        let switch: SwitchStmt =
            find_ancestor(&root, TextRange::empty(0.into()), TieBreak::Innermost).unwrap();
        assert_eq!(switch.sections().count(), 1);
    }

    #[test]
    fn test_selection_uses_covering_node() {
        let source = "if (a) f(); else if (b) g();";
        let root = parse(source).syntax();
        let start = offset_of(source, "if (b)");
        let span = TextRange::new(start, start + TextSize::from(6));

        let found: IfStmt = find_ancestor(&root, span, TieBreak::Innermost).unwrap();
        assert!(found.previous_if().is_some());
    }

    #[test]
    fn test_outermost_climbs_equal_ranges() {
        let source = "f(x);";
        let root = parse(source).syntax();
        let span = TextRange::new(0.into(), TextSize::from(source.len() as u32));

        let inner = find_node(&root, span, TieBreak::Innermost).unwrap();
        let outer = find_node(&root, span, TieBreak::Outermost).unwrap();
        assert_eq!(inner.kind(), SyntaxKind::ExprStmt);
        assert_eq!(outer.kind(), SyntaxKind::CompilationUnit);
    }

    #[test]
    fn test_missing_kind_is_not_found() {
        let source = "f(x);";
        let root = parse(source).syntax();
        let found = find_ancestor_of_kind(
            &root,
            cursor(source, "x"),
            SyntaxKind::SwitchStmt,
            TieBreak::Innermost,
        );
        assert!(found.is_none());
    }

    #[test]
    fn test_span_outside_document() {
        let root = parse("f();").syntax();
        let span = TextRange::empty(TextSize::from(100));
        assert!(find_node(&root, span, TieBreak::Innermost).is_none());
    }
}
