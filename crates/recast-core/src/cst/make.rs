//! Constructors for new green nodes
//!
//! Generated code uses a canonical layout (braces on their own lines, single
//! spaces around operators). Indentation is left to the formatter pass, which
//! re-indents every line of an annotated node.

use rowan::{GreenNode, GreenToken, NodeOrToken};

use super::SyntaxKind;
use super::trivia::{self, GreenElement};

/// Token with the canonical text of a fixed-text kind
pub fn token(kind: SyntaxKind) -> GreenToken {
    debug_assert!(kind.fixed_text().is_some(), "{kind} has no fixed text");
    GreenToken::new(kind.into(), kind.fixed_text().unwrap_or_default())
}

pub fn ident(text: &str) -> GreenToken {
    GreenToken::new(SyntaxKind::Ident.into(), text)
}

pub fn whitespace(text: &str) -> GreenToken {
    GreenToken::new(SyntaxKind::Whitespace.into(), text)
}

pub fn space() -> GreenToken {
    whitespace(" ")
}

pub fn newline() -> GreenToken {
    line_break("\n")
}

/// Line break with explicit text (`"\n"` or `"\r\n"`)
pub fn line_break(text: &str) -> GreenToken {
    GreenToken::new(SyntaxKind::Newline.into(), text)
}

pub fn node(kind: SyntaxKind, children: Vec<GreenElement>) -> GreenNode {
    GreenNode::new(kind.into(), children)
}

fn tok(kind: SyntaxKind) -> GreenElement {
    NodeOrToken::Token(token(kind))
}

fn layout(token: GreenToken) -> GreenElement {
    NodeOrToken::Token(token)
}

// ============================================================================
// Expressions
// ============================================================================

pub fn name_expr(name: &str) -> GreenNode {
    node(SyntaxKind::NameExpr, vec![NodeOrToken::Token(ident(name))])
}

pub fn bool_literal(value: bool) -> GreenNode {
    let kind = if value {
        SyntaxKind::TrueKw
    } else {
        SyntaxKind::FalseKw
    };
    node(SyntaxKind::Literal, vec![tok(kind)])
}

/// `lhs op rhs` with single spaces around the operator
pub fn binary(lhs: GreenNode, op: SyntaxKind, rhs: GreenNode) -> GreenNode {
    node(
        SyntaxKind::BinaryExpr,
        vec![
            NodeOrToken::Node(lhs),
            layout(space()),
            tok(op),
            layout(space()),
            NodeOrToken::Node(rhs),
        ],
    )
}

pub fn paren(expr: GreenNode) -> GreenNode {
    node(
        SyntaxKind::ParenExpr,
        vec![
            tok(SyntaxKind::LParen),
            NodeOrToken::Node(expr),
            tok(SyntaxKind::RParen),
        ],
    )
}

pub fn member_access(receiver: GreenNode, name: &str) -> GreenNode {
    node(
        SyntaxKind::MemberAccessExpr,
        vec![
            NodeOrToken::Node(receiver),
            tok(SyntaxKind::Dot),
            NodeOrToken::Token(ident(name)),
        ],
    )
}

pub fn invocation(callee: GreenNode, args: Vec<GreenNode>) -> GreenNode {
    let mut list = vec![tok(SyntaxKind::LParen)];
    for (idx, arg) in args.into_iter().enumerate() {
        if idx > 0 {
            list.push(tok(SyntaxKind::Comma));
            list.push(layout(space()));
        }
        list.push(NodeOrToken::Node(node(
            SyntaxKind::Argument,
            vec![NodeOrToken::Node(arg)],
        )));
    }
    list.push(tok(SyntaxKind::RParen));

    node(
        SyntaxKind::InvocationExpr,
        vec![
            NodeOrToken::Node(callee),
            NodeOrToken::Node(node(SyntaxKind::ArgList, list)),
        ],
    )
}

// ============================================================================
// Statements
// ============================================================================

/// `{` on its own line, one statement per line, closing `}`
///
/// The closing brace carries no trailing trivia; callers attach it.
pub fn block(statements: Vec<GreenNode>) -> GreenNode {
    let mut children = vec![tok(SyntaxKind::LBrace), layout(newline())];
    children.extend(
        statements
            .iter()
            .map(|stmt| NodeOrToken::Node(trivia::as_line(stmt))),
    );
    children.push(tok(SyntaxKind::RBrace));
    node(SyntaxKind::Block, children)
}

/// `if (condition)` followed by `then_branch` on the next line
///
/// An `else` clause starts on its own line.
pub fn if_stmt(
    condition: GreenNode,
    then_branch: GreenNode,
    else_clause: Option<GreenNode>,
) -> GreenNode {
    let then_trailing = trivia::edge_trivia(&then_branch, trivia::Edge::Trailing);
    let ends_line = trivia::has_newline(&then_trailing);
    let mut children = vec![
        tok(SyntaxKind::IfKw),
        layout(space()),
        tok(SyntaxKind::LParen),
        NodeOrToken::Node(condition),
        tok(SyntaxKind::RParen),
        layout(newline()),
        NodeOrToken::Node(then_branch),
    ];
    if let Some(else_clause) = else_clause {
        if !ends_line {
            children.push(layout(newline()));
        }
        children.push(NodeOrToken::Node(else_clause));
    }
    node(SyntaxKind::IfStmt, children)
}

/// `else if ...` stays on one line, any other branch starts on the next
pub fn else_clause(statement: GreenNode) -> GreenNode {
    let separator = if statement.kind() == SyntaxKind::IfStmt.into() {
        space()
    } else {
        newline()
    };
    node(
        SyntaxKind::ElseClause,
        vec![
            tok(SyntaxKind::ElseKw),
            layout(separator),
            NodeOrToken::Node(statement),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_layout() {
        let expr = binary(name_expr("x"), SyntaxKind::EqEq, bool_literal(false));
        assert_eq!(expr.to_string(), "x == false");
    }

    #[test]
    fn test_configure_await_call() {
        let call = invocation(
            member_access(name_expr("task"), "ConfigureAwait"),
            vec![bool_literal(false)],
        );
        assert_eq!(call.to_string(), "task.ConfigureAwait(false)");
    }

    #[test]
    fn test_if_else_if_chain_layout() {
        let inner = if_stmt(name_expr("b"), block(vec![]), None);
        let outer = if_stmt(name_expr("a"), block(vec![]), Some(else_clause(inner)));
        assert_eq!(
            outer.to_string(),
            "if (a)\n{\n}\nelse if (b)\n{\n}"
        );
    }
}
