//! Trivia handling for the recast CST
//!
//! Trivia (whitespace, line breaks, comments) are stored as sibling tokens. The
//! parser places the leading trivia of a token right before it, inside the
//! innermost node that starts with that token, and the trailing trivia (up to
//! and including the first line break) right after it. The helpers here read
//! and rewrite the *edge* trivia of a subtree under that convention.
//!
//! All rewriting helpers work on green nodes and return new green nodes; they
//! never touch the tree the input came from.

use rowan::{GreenNode, GreenNodeData, GreenToken, NodeOrToken};

use super::make;
use super::{RecastLanguage, SyntaxKind, SyntaxNode, SyntaxNodeExt, SyntaxToken};

pub type GreenElement = NodeOrToken<GreenNode, GreenToken>;

/// Which end of a subtree a trivia operation applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Leading,
    Trailing,
}

/// Kind of a green element
pub fn kind_of(element: &GreenElement) -> SyntaxKind {
    let raw = match element {
        NodeOrToken::Node(node) => node.kind(),
        NodeOrToken::Token(token) => token.kind(),
    };
    <RecastLanguage as rowan::Language>::kind_from_raw(raw)
}

fn is_trivia(element: &GreenElement) -> bool {
    matches!(element, NodeOrToken::Token(_)) && kind_of(element).is_trivia()
}

fn owned_children(node: &GreenNodeData) -> Vec<GreenElement> {
    node.children()
        .map(|child| match child {
            NodeOrToken::Node(node) => NodeOrToken::Node(node.to_owned()),
            NodeOrToken::Token(token) => NodeOrToken::Token(token.to_owned()),
        })
        .collect()
}

// ============================================================================
// Reading
// ============================================================================

/// Trivia tokens at one edge of a green subtree, in source order
pub fn edge_trivia(node: &GreenNodeData, edge: Edge) -> Vec<GreenToken> {
    let mut collected = Vec::new();
    collect_edge(node, edge, &mut collected);
    if edge == Edge::Trailing {
        collected.reverse();
    }
    collected
}

/// Returns `true` once a significant token has been reached
fn collect_edge(node: &GreenNodeData, edge: Edge, out: &mut Vec<GreenToken>) -> bool {
    let mut children = owned_children(node);
    if edge == Edge::Trailing {
        children.reverse();
    }

    for child in children {
        match child {
            NodeOrToken::Token(token) => {
                let kind = <RecastLanguage as rowan::Language>::kind_from_raw(token.kind());
                if !kind.is_trivia() {
                    return true;
                }
                out.push(token);
            }
            NodeOrToken::Node(node) => {
                if collect_edge(&node, edge, out) {
                    return true;
                }
            }
        }
    }
    false
}

/// Whether a sequence of trivia contains a line break
pub fn has_newline(trivia: &[GreenToken]) -> bool {
    trivia
        .iter()
        .any(|t| t.kind() == SyntaxKind::Newline.into())
}

/// Whitespace at the start of the line containing `token`
pub fn line_indentation(token: &SyntaxToken) -> String {
    let mut first = token.clone();
    while let Some(prev) = first.prev_token() {
        if prev.kind() == SyntaxKind::Newline {
            break;
        }
        first = prev;
    }

    if first.kind() == SyntaxKind::Whitespace {
        first.text().to_string()
    } else {
        String::new()
    }
}

/// Indentation of the line on which `node` starts
pub fn node_indentation(node: &SyntaxNode) -> String {
    node.first_significant_token()
        .map(|token| line_indentation(&token))
        .unwrap_or_default()
}

// ============================================================================
// Rewriting
// ============================================================================

/// Replace all trivia at `edge` of `node` with `trivia`
///
/// Returns `None` when the subtree has no significant token to anchor the
/// trivia to.
pub fn with_edge_trivia(
    node: &GreenNodeData,
    edge: Edge,
    trivia: &[GreenToken],
) -> Option<GreenNode> {
    let mut children = owned_children(node);
    if edge == Edge::Trailing {
        children.reverse();
    }

    let mut rebuilt: Vec<GreenElement> = Vec::with_capacity(children.len() + trivia.len());
    let mut rest = children.into_iter();
    let mut anchored = false;

    for child in rest.by_ref() {
        match child {
            token @ NodeOrToken::Token(_) if is_trivia(&token) => continue,
            NodeOrToken::Token(token) => {
                push_trivia(&mut rebuilt, edge, trivia);
                rebuilt.push(NodeOrToken::Token(token));
                anchored = true;
                break;
            }
            NodeOrToken::Node(child) => match with_edge_trivia(&child, edge, trivia) {
                Some(child) => {
                    rebuilt.push(NodeOrToken::Node(child));
                    anchored = true;
                    break;
                }
                None => rebuilt.push(NodeOrToken::Node(child)),
            },
        }
    }

    if !anchored {
        return None;
    }

    rebuilt.extend(rest);
    if edge == Edge::Trailing {
        rebuilt.reverse();
    }
    Some(GreenNode::new(node.kind(), rebuilt))
}

fn push_trivia(out: &mut Vec<GreenElement>, edge: Edge, trivia: &[GreenToken]) {
    match edge {
        Edge::Leading => out.extend(trivia.iter().cloned().map(NodeOrToken::Token)),
        Edge::Trailing => out.extend(trivia.iter().rev().cloned().map(NodeOrToken::Token)),
    }
}

pub fn with_leading_trivia(node: &GreenNodeData, trivia: &[GreenToken]) -> GreenNode {
    with_edge_trivia(node, Edge::Leading, trivia).unwrap_or_else(|| node.to_owned())
}

pub fn with_trailing_trivia(node: &GreenNodeData, trivia: &[GreenToken]) -> GreenNode {
    with_edge_trivia(node, Edge::Trailing, trivia).unwrap_or_else(|| node.to_owned())
}

/// Copy the leading trivia of `from` onto the leading edge of `node` and the
/// trailing trivia of `from` onto its trailing edge
pub fn with_trivia_from(node: &GreenNodeData, from: &GreenNodeData) -> GreenNode {
    let leading = edge_trivia(from, Edge::Leading);
    let trailing = edge_trivia(from, Edge::Trailing);
    let node = with_leading_trivia(node, &leading);
    with_trailing_trivia(&node, &trailing)
}

/// Drop whitespace and line breaks from a trivia sequence, keeping comments
///
/// A line break directly after a line comment is kept, otherwise the comment
/// would swallow the code that follows it.
pub fn without_layout(trivia: &[GreenToken]) -> Vec<GreenToken> {
    let mut kept = Vec::new();
    let mut after_line_comment = false;
    for token in trivia {
        let kind = <RecastLanguage as rowan::Language>::kind_from_raw(token.kind());
        match kind {
            SyntaxKind::Newline if after_line_comment => kept.push(token.clone()),
            kind if kind.is_layout() => {}
            _ => kept.push(token.clone()),
        }
        after_line_comment = kind == SyntaxKind::CommentLine;
    }
    kept
}

/// Remove whitespace and line breaks from every token of the subtree,
/// including its edges; comments are kept
pub fn strip_layout(node: &GreenNodeData) -> GreenNode {
    let mut rebuilt = Vec::new();
    let mut pending: Vec<GreenToken> = Vec::new();

    let flush = |pending: &mut Vec<GreenToken>, rebuilt: &mut Vec<GreenElement>| {
        rebuilt.extend(without_layout(pending).into_iter().map(NodeOrToken::Token));
        pending.clear();
    };

    for child in owned_children(node) {
        match child {
            NodeOrToken::Token(token)
                if <RecastLanguage as rowan::Language>::kind_from_raw(token.kind())
                    .is_trivia() =>
            {
                pending.push(token)
            }
            NodeOrToken::Token(token) => {
                flush(&mut pending, &mut rebuilt);
                rebuilt.push(NodeOrToken::Token(token));
            }
            NodeOrToken::Node(child) => {
                flush(&mut pending, &mut rebuilt);
                rebuilt.push(NodeOrToken::Node(strip_layout(&child)));
            }
        }
    }
    flush(&mut pending, &mut rebuilt);

    GreenNode::new(node.kind(), rebuilt)
}

/// Remove whitespace and line breaks strictly inside the subtree, keeping its
/// edge trivia and all comments
pub fn strip_inner_layout(node: &GreenNodeData) -> GreenNode {
    let leading = edge_trivia(node, Edge::Leading);
    let trailing = edge_trivia(node, Edge::Trailing);
    let stripped = strip_layout(node);
    let stripped = with_leading_trivia(&stripped, &leading);
    with_trailing_trivia(&stripped, &trailing)
}

/// Normalize a statement so it occupies whole lines: no leading layout, and
/// trailing trivia ending in a line break
pub fn as_line(node: &GreenNodeData) -> GreenNode {
    let leading = without_layout(&edge_trivia(node, Edge::Leading));
    let trailing = edge_trivia(node, Edge::Trailing);

    let mut trailing = if has_newline(&trailing) {
        trailing
    } else {
        without_layout(&trailing)
    };
    if trailing.last().map(|t| t.kind()) != Some(SyntaxKind::Newline.into()) {
        trailing.push(make::newline());
    }

    let node = with_leading_trivia(node, &leading);
    with_trailing_trivia(&node, &trailing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cst::ast::{AstNode, ExprStmt};
    use crate::cst::parse;

    fn first_stmt(source: &str) -> SyntaxNode {
        parse(source)
            .syntax()
            .descendants()
            .find(|n| ExprStmt::can_cast(n.kind()))
            .unwrap()
    }

    fn texts(tokens: &[GreenToken]) -> String {
        tokens.iter().map(|t| t.text()).collect()
    }

    #[test]
    fn test_edge_trivia_of_statement() {
        let stmt = first_stmt("{\n    f(); // call\n}");
        assert_eq!(texts(&edge_trivia(&stmt.green(), Edge::Leading)), "    ");
        assert_eq!(
            texts(&edge_trivia(&stmt.green(), Edge::Trailing)),
            " // call\n"
        );
    }

    #[test]
    fn test_line_indentation() {
        let root = parse("void M()\n{\n\tif (x) y();\n}").syntax();
        let y = root
            .descendants_with_tokens()
            .filter_map(|e| e.into_token())
            .find(|t| t.text() == "y")
            .unwrap();
        assert_eq!(line_indentation(&y), "\t");
    }

    #[test]
    fn test_with_leading_trivia_replaces_edge() {
        let stmt = first_stmt("{\n    f();\n}");
        let rebuilt = with_leading_trivia(&stmt.green(), &[make::whitespace("  ")]);
        assert_eq!(rebuilt.to_string(), "  f();\n");
    }

    #[test]
    fn test_strip_inner_layout_keeps_edges_and_comments() {
        let root = parse("void M(\n    int a, // first\n    int b) { }").syntax();
        let list = root
            .descendants()
            .find(|n| n.kind() == SyntaxKind::ParameterList)
            .unwrap();
        let stripped = strip_inner_layout(&list.green());
        assert_eq!(stripped.to_string(), "(inta,// first\nintb) ");
    }

    #[test]
    fn test_as_line_appends_newline() {
        let stmt = first_stmt("switch (x) { case 1: f(); break; }");
        assert_eq!(as_line(&stmt.green()).to_string(), "f();\n");
    }
}
