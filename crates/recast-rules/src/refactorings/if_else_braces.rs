//! Braces for every branch of an `if` chain
//!
//! The rewrite starts at the chain head and tracks which conditional it last
//! confirmed as part of the chain. A branch is wrapped only when its parent is
//! that conditional, so an `else if` continuation stays an `else if` and
//! conditionals nested inside branches are left alone.

use recast_core::cst::ast::{AstNode, IfStmt, Stmt};
use recast_core::cst::trivia::{self, Edge};
use recast_core::cst::{Annotation, Rewriter, SyntaxKind, SyntaxNode, Visit, make, rewrite};
use recast_core::{CodeAction, RecastError};
use rowan::{GreenNode, GreenToken};

use super::{Refactoring, RefactoringContext};

/// Refactoring ID for adding braces to an if-else chain
pub const IF_ELSE_BRACES: &str = "refactor/if-else-braces";

const TITLE: &str = "Add braces to if-else chain";

pub struct AddBracesToIfElseChain;

impl Refactoring for AddBracesToIfElseChain {
    fn id(&self) -> &'static str {
        IF_ELSE_BRACES
    }

    fn compute(&self, ctx: &RefactoringContext<'_>) -> Vec<CodeAction> {
        let Some(if_stmt) = ctx.find::<IfStmt>() else {
            return Vec::new();
        };
        let head = if_stmt.chain_head();
        if !needs_braces(&head) {
            tracing::debug!("every branch of the if chain is already a block");
            return Vec::new();
        }

        vec![CodeAction::new(IF_ELSE_BRACES, TITLE, head.syntax(), |tree, node| {
            let head = IfStmt::cast(node.clone()).ok_or_else(|| {
                let kind = node.kind();
                RecastError::invalid_argument(format!("expected IfStmt, found {kind:?}"))
            })?;
            let (green, added) = add_braces(&head);
            tracing::debug!(added, "added braces to if chain");
            tree.replace_annotated(node, green, Annotation::Format)
        })]
    }
}

/// Conditionals of the chain starting at `head`, following `else if` links
fn chain(head: &IfStmt) -> impl Iterator<Item = IfStmt> {
    std::iter::successors(Some(head.clone()), |if_stmt| {
        match if_stmt.else_clause()?.statement()? {
            Stmt::If(next) => Some(next),
            _ => None,
        }
    })
}

fn needs_braces(head: &IfStmt) -> bool {
    chain(head).any(|if_stmt| {
        let then_unbraced = if_stmt
            .then_branch()
            .is_some_and(|stmt| !matches!(stmt, Stmt::Block(_)));
        let else_unbraced = if_stmt
            .else_clause()
            .and_then(|clause| clause.statement())
            .is_some_and(|stmt| !matches!(stmt, Stmt::Block(_) | Stmt::If(_)));
        then_unbraced || else_unbraced
    })
}

/// Copy of the chain headed by `head` with every branch in a block, and the
/// number of blocks added
///
/// New blocks are not indented; callers annotate the result for the formatter.
pub fn add_braces(head: &IfStmt) -> (GreenNode, usize) {
    let mut state = ChainState::default();
    let green = rewrite(&BraceChain, head.syntax(), &mut state);
    (green, state.added)
}

#[derive(Debug, Default)]
struct ChainState {
    /// Last conditional confirmed to belong to the chain
    previous_if: Option<SyntaxNode>,
    added: usize,
}

struct BraceChain;

impl BraceChain {
    /// Whether the statement `node` is a branch of the tracked conditional
    /// that has to be wrapped
    fn is_unbraced_branch(node: &SyntaxNode, state: &ChainState) -> bool {
        if !node.kind().is_stmt() || node.kind() == SyntaxKind::Block {
            return false;
        }
        let (Some(previous), Some(parent)) = (&state.previous_if, node.parent()) else {
            return false;
        };

        match parent.kind() {
            // The only statement child of a conditional is its then-branch
            SyntaxKind::IfStmt => &parent == previous,
            SyntaxKind::ElseClause => {
                node.kind() != SyntaxKind::IfStmt && parent.parent().as_ref() == Some(previous)
            }
            _ => false,
        }
    }

    fn continues_chain(node: &SyntaxNode, state: &ChainState) -> bool {
        let Some(previous) = &state.previous_if else {
            return true;
        };
        IfStmt::cast(node.clone())
            .and_then(|if_stmt| if_stmt.previous_if())
            .is_some_and(|if_stmt| if_stmt.syntax() == previous)
    }
}

impl Rewriter for BraceChain {
    type State = ChainState;

    fn enter(&self, node: &SyntaxNode, state: &mut ChainState) -> Visit {
        if Self::is_unbraced_branch(node, state) {
            state.added += 1;
            tracing::trace!(kind = ?node.kind(), "wrapping branch in a block");
            return Visit::Replace(wrap_in_block(node));
        }

        if node.kind() == SyntaxKind::IfStmt && Self::continues_chain(node, state) {
            state.previous_if = Some(node.clone());
        }
        Visit::Descend
    }
}

/// `{ stmt }`, keeping the line position of `stmt`
///
/// Comments around the statement move into the block with it.
fn wrap_in_block(stmt: &SyntaxNode) -> GreenNode {
    let green = stmt.green();
    let leading: Vec<GreenToken> = trivia::edge_trivia(&green, Edge::Leading)
        .into_iter()
        .filter(|token| token.kind() == SyntaxKind::Whitespace.into())
        .collect();
    let trailing = trivia::edge_trivia(&green, Edge::Trailing);
    let trailing = match trailing
        .iter()
        .find(|token| token.kind() == SyntaxKind::Newline.into())
    {
        Some(newline) => vec![newline.clone()],
        None => trailing
            .into_iter()
            .filter(|token| token.kind() == SyntaxKind::Whitespace.into())
            .collect(),
    };

    let block = make::block(vec![green.into_owned()]);
    let block = trivia::with_leading_trivia(&block, &leading);
    trivia::with_trailing_trivia(&block, &trailing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use recast_core::cst::parse;
    use recast_core::{RecastConfiguration, SyntaxTree};
    use recast_formatter::{FormatOptions, format_annotated};
    use rowan::{TextRange, TextSize};

    fn actions_at(tree: &SyntaxTree, source: &str, needle: &str) -> Vec<CodeAction> {
        let config = RecastConfiguration::default();
        let offset = TextSize::from(source.find(needle).unwrap() as u32);
        let ctx = RefactoringContext::new(tree, TextRange::empty(offset), &config);
        AddBracesToIfElseChain.compute(&ctx)
    }

    fn brace(source: &str, cursor: &str) -> String {
        let tree = parse(source).tree();
        let actions = actions_at(&tree, source, cursor);
        assert_eq!(actions.len(), 1, "not offered on {source:?}");
        let edited = actions[0].apply(&tree).unwrap();
        format_annotated(&edited, &FormatOptions::default())
            .unwrap()
            .text()
    }

    fn head_of(source: &str) -> IfStmt {
        parse(source)
            .syntax()
            .descendants()
            .find_map(IfStmt::cast)
            .unwrap()
    }

    #[test]
    fn test_braces_every_branch_and_keeps_else_if() {
        let source = "if (a)\n    f();\nelse if (b)\n    g();\nelse\n    h();\n";
        // Cursor in the middle of the chain still targets the head
        insta::assert_snapshot!(brace(source, "g()").trim_end(), @r"
        if (a)
        {
            f();
        }
        else if (b)
        {
            g();
        }
        else
        {
            h();
        }
        ");
    }

    #[test]
    fn test_single_line_chain() {
        assert_eq!(
            brace("if (a) f(); else g();", "a"),
            "if (a) {\n    f();\n} else {\n    g();\n}"
        );
    }

    #[test]
    fn test_nested_conditionals_are_left_alone() {
        let source = "if (a)\n{\n    if (b) f();\n}\nelse\n    g();\n";
        assert_eq!(
            brace(source, "a)"),
            "if (a)\n{\n    if (b) f();\n}\nelse\n{\n    g();\n}\n"
        );
        let (_, added) = add_braces(&head_of(source));
        assert_eq!(added, 1);
    }

    #[test]
    fn test_then_branch_conditional_is_wrapped_whole() {
        assert_eq!(
            brace("if (a) if (b) f(); else g();", "a"),
            "if (a) {\n    if (b) f(); else g();\n}"
        );
    }

    #[test]
    fn test_one_block_per_unbraced_branch() {
        let source = "if (a) f(); else if (b) { g(); } else if (c) h(); else i();";
        let (green, added) = add_braces(&head_of(source));
        assert_eq!(added, 3);
        assert!(!green.to_string().contains("else {\nif"));
    }

    #[test]
    fn test_not_offered_when_all_branches_are_blocks() {
        let source = "if (a) { f(); } else if (b) { g(); } else { h(); }";
        let tree = parse(source).tree();
        assert!(actions_at(&tree, source, "g()").is_empty());
    }
}
