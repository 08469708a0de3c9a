//! Code actions: titled, deferred tree transforms
//!
//! A [`CodeAction`] captures everything needed to perform an edit later: the
//! node it targets (as a position-independent pointer) and a pure transform
//! from the old tree to the new one. Refactorings return them as offers;
//! diagnostics carry them as fixes.

use std::fmt;
use std::sync::Arc;

use rowan::TextRange;
use rowan::ast::SyntaxNodePtr;
use serde::{Deserialize, Serialize};

use crate::cst::{RecastLanguage, SyntaxKind, SyntaxNode, SyntaxTree};
use crate::{RecastError, Result};

/// Transform applied by a [`CodeAction`] to the resolved target node
pub type Transform = Arc<dyn Fn(&SyntaxTree, &SyntaxNode) -> Result<SyntaxTree> + Send + Sync>;

/// Whether an action can be applied without review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Applicability {
    /// Preserves behavior
    #[default]
    Always,
    /// May change behavior; the user should review it
    MaybeIncorrect,
}

impl fmt::Display for Applicability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Applicability::Always => write!(f, "safe"),
            Applicability::MaybeIncorrect => write!(f, "unsafe"),
        }
    }
}

#[derive(Clone)]
pub struct CodeAction {
    /// Id of the refactoring or rule offering the action
    pub id: String,
    pub title: String,
    pub applicability: Applicability,
    target: SyntaxNodePtr<RecastLanguage>,
    transform: Transform,
}

impl CodeAction {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        target: &SyntaxNode,
        transform: impl Fn(&SyntaxTree, &SyntaxNode) -> Result<SyntaxTree> + Send + Sync + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            applicability: Applicability::Always,
            target: SyntaxNodePtr::new(target),
            transform: Arc::new(transform),
        }
    }

    pub fn with_applicability(mut self, applicability: Applicability) -> Self {
        self.applicability = applicability;
        self
    }

    pub fn target_range(&self) -> TextRange {
        self.target.text_range()
    }

    pub fn target_kind(&self) -> SyntaxKind {
        self.target.kind()
    }

    /// Run the transform against `tree`
    ///
    /// The target is resolved by kind and range, so the action applies to the
    /// tree it was computed on and to any copy with the same text.
    pub fn apply(&self, tree: &SyntaxTree) -> Result<SyntaxTree> {
        let root = tree.root();
        let node = self.target.try_to_node(&root).ok_or_else(|| {
            RecastError::stale_node(format!(
                "target {:?}@{:?} of '{}' not found",
                self.target.kind(),
                self.target.text_range(),
                self.title
            ))
        })?;

        tracing::debug!(id = %self.id, title = %self.title, "applying code action");
        (self.transform)(tree, &node)
    }
}

impl fmt::Debug for CodeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodeAction")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("applicability", &self.applicability)
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cst::{make, parse};

    fn rename_action(tree: &SyntaxTree) -> CodeAction {
        let name = tree
            .root()
            .descendants()
            .find(|n| n.kind() == SyntaxKind::NameExpr)
            .unwrap();
        CodeAction::new("test/rename", "Rename", &name, |tree, node| {
            tree.replace(node, make::name_expr("g"))
        })
    }

    #[test]
    fn test_apply_resolves_target() {
        let tree = parse("f();").tree();
        let action = rename_action(&tree);
        assert_eq!(action.apply(&tree).unwrap().text(), "g();");
        assert_eq!(action.target_kind(), SyntaxKind::NameExpr);
    }

    #[test]
    fn test_apply_to_unrelated_tree_fails() {
        let tree = parse("f();").tree();
        let action = rename_action(&tree);
        let other = parse("{ }").tree();
        let err = action.apply(&other).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::StaleNode);
    }

    #[test]
    fn test_actions_are_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CodeAction>();
        assert_eq!(Applicability::MaybeIncorrect.to_string(), "unsafe");
    }
}
