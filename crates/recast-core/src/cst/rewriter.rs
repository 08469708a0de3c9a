//! Tree visitor and rewriter framework
//!
//! A [`Rewriter`] sees every node twice: on the way down ([`Rewriter::enter`])
//! it decides whether to descend, skip or replace the subtree; on the way up
//! ([`Rewriter::leave`]) it receives the rebuilt green node and may transform
//! it further. Traversal state lives in an associated type owned by the
//! caller, so the same rewriter value can drive several independent passes.
//!
//! Subtrees the rewriter leaves alone are shared with the input: when no child
//! changed, the original green node is returned as is.

use rowan::{GreenNode, NodeOrToken, WalkEvent};

use super::SyntaxNode;
use super::trivia::GreenElement;

/// Pre-order decision for a node
#[derive(Debug, Clone)]
pub enum Visit {
    /// Rewrite the children, then call [`Rewriter::leave`]
    Descend,
    /// Keep the subtree unchanged, `leave` is not called
    Skip,
    /// Use this green node instead of the subtree, `leave` is not called
    Replace(GreenNode),
}

pub trait Rewriter {
    type State;

    fn enter(&self, _node: &SyntaxNode, _state: &mut Self::State) -> Visit {
        Visit::Descend
    }

    /// `rebuilt` is `node` with rewritten children
    fn leave(
        &self,
        _node: &SyntaxNode,
        rebuilt: GreenNode,
        _state: &mut Self::State,
    ) -> GreenNode {
        rebuilt
    }
}

/// Run `rewriter` over the subtree rooted at `node`
pub fn rewrite<R: Rewriter>(rewriter: &R, node: &SyntaxNode, state: &mut R::State) -> GreenNode {
    match rewriter.enter(node, state) {
        Visit::Skip => return node.green().into_owned(),
        Visit::Replace(green) => {
            tracing::trace!(kind = ?node.kind(), "replaced subtree");
            return green;
        }
        Visit::Descend => {}
    }

    let original = node.green().into_owned();
    let mut changed = false;
    let mut children: Vec<GreenElement> = Vec::with_capacity(original.children().len());

    for child in node.children_with_tokens() {
        match child {
            NodeOrToken::Token(token) => {
                children.push(NodeOrToken::Token(token.green().to_owned()));
            }
            NodeOrToken::Node(child) => {
                let rebuilt = rewrite(rewriter, &child, state);
                changed |= !std::ptr::eq(&*rebuilt, &*child.green());
                children.push(NodeOrToken::Node(rebuilt));
            }
        }
    }

    let rebuilt = if changed {
        GreenNode::new(original.kind(), children)
    } else {
        original
    };
    rewriter.leave(node, rebuilt, state)
}

/// Read-only pre-order traversal
pub trait Visitor {
    /// Return `false` to skip the node's children
    fn visit(&mut self, node: &SyntaxNode) -> bool;

    fn leave(&mut self, _node: &SyntaxNode) {}
}

pub fn walk(node: &SyntaxNode, visitor: &mut impl Visitor) {
    let mut events = node.preorder();
    while let Some(event) = events.next() {
        match event {
            WalkEvent::Enter(node) => {
                if !visitor.visit(&node) {
                    events.skip_subtree();
                }
            }
            WalkEvent::Leave(node) => visitor.leave(&node),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cst::{SyntaxKind, make, parse};

    /// Renames every `a` and counts visited nodes
    struct Rename;

    impl Rewriter for Rename {
        type State = usize;

        fn enter(&self, node: &SyntaxNode, state: &mut usize) -> Visit {
            *state += 1;
            if node.kind() == SyntaxKind::NameExpr && node.text() == "a" {
                Visit::Replace(make::name_expr("renamed"))
            } else {
                Visit::Descend
            }
        }
    }

    struct Identity;

    impl Rewriter for Identity {
        type State = ();
    }

    #[test]
    fn test_replace_rebuilds_spine() {
        let root = parse("f(a, b);\ng(a);\n").syntax();
        let mut visited = 0;
        let green = rewrite(&Rename, &root, &mut visited);
        assert_eq!(green.to_string(), "f(renamed, b);\ng(renamed);\n");
        assert!(visited > 0);
    }

    #[test]
    fn test_unchanged_subtrees_are_shared() {
        let root = parse("f(a);\ng(b);\n").syntax();
        let green = rewrite(&Identity, &root, &mut ());
        assert!(std::ptr::eq(&*green, &*root.green()));

        let rewritten = rewrite(&Rename, &root, &mut 0);
        let untouched = SyntaxNode::new_root(rewritten);
        let second = untouched.children().nth(1).unwrap();
        let original_second = root.children().nth(1).unwrap();
        assert!(std::ptr::eq(&*second.green(), &*original_second.green()));
    }

    #[test]
    fn test_walk_can_skip_subtrees() {
        struct Collect(Vec<SyntaxKind>);

        impl Visitor for Collect {
            fn visit(&mut self, node: &SyntaxNode) -> bool {
                self.0.push(node.kind());
                node.kind() != SyntaxKind::ArgList
            }
        }

        let root = parse("f(a);").syntax();
        let mut collect = Collect(Vec::new());
        walk(&root, &mut collect);
        assert_eq!(
            collect.0,
            vec![
                SyntaxKind::CompilationUnit,
                SyntaxKind::ExprStmt,
                SyntaxKind::InvocationExpr,
                SyntaxKind::NameExpr,
                SyntaxKind::ArgList,
            ]
        );
    }
}
