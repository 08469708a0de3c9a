//! Span-targeted refactorings
//!
//! A refactoring looks at the node under the cursor (or selection), decides
//! whether it applies and, if so, offers one [`CodeAction`]. Computing the
//! offer never edits anything; the transform runs when the host applies it.
//!
//! Built-in refactorings:
//! - [`PARAMETER_LIST`]: one parameter per line, or all on one line
//! - [`SWITCH_TO_IF`]: `switch` with plain `case` labels to an `if` chain
//! - [`IF_ELSE_BRACES`]: wrap every branch of an `if` chain in a block

mod if_else_braces;
mod parameter_list;
mod switch_to_if;

pub use if_else_braces::{AddBracesToIfElseChain, IF_ELSE_BRACES, add_braces};
pub use parameter_list::{
    FormatParameterList, PARAMETER_LIST, is_single_line, to_multi_line, to_single_line,
};
pub use switch_to_if::{ConvertSwitchToIf, SWITCH_TO_IF, convert_switch};

use recast_core::cst::ast::AstNode;
use recast_core::cst::{SyntaxNode, TieBreak, find_ancestor, find_node};
use recast_core::{CodeAction, RecastConfiguration, SyntaxTree};
use rowan::TextRange;

/// Input of [`Refactoring::compute`]
#[derive(Debug, Clone, Copy)]
pub struct RefactoringContext<'a> {
    pub tree: &'a SyntaxTree,
    pub span: TextRange,
    pub config: &'a RecastConfiguration,
}

impl<'a> RefactoringContext<'a> {
    pub fn new(tree: &'a SyntaxTree, span: TextRange, config: &'a RecastConfiguration) -> Self {
        Self { tree, span, config }
    }

    /// Closest node of type `N` enclosing the span
    pub fn find<N: AstNode>(&self) -> Option<N> {
        find_ancestor(&self.tree.root(), self.span, TieBreak::Innermost)
    }

    /// Innermost node under the span
    pub fn covering_node(&self) -> Option<SyntaxNode> {
        find_node(&self.tree.root(), self.span, TieBreak::Innermost)
    }
}

/// A span-triggered tree rewrite
pub trait Refactoring: Send + Sync {
    /// Stable identifier, also the key of `refactorings.rules` in configuration
    fn id(&self) -> &'static str;

    /// Actions offered at the context's span; empty when not applicable
    fn compute(&self, ctx: &RefactoringContext<'_>) -> Vec<CodeAction>;
}

/// Every built-in refactoring
pub fn builtin() -> Vec<Box<dyn Refactoring>> {
    vec![
        Box::new(FormatParameterList),
        Box::new(ConvertSwitchToIf),
        Box::new(AddBracesToIfElseChain),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use recast_core::cst::ast::ParameterList;
    use recast_core::cst::parse;
    use rowan::TextSize;

    #[test]
    fn test_builtin_ids_are_unique() {
        let mut ids: Vec<_> = builtin().iter().map(|r| r.id()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids, vec![IF_ELSE_BRACES, PARAMETER_LIST, SWITCH_TO_IF]);
    }

    #[test]
    fn test_context_finds_enclosing_node() {
        let source = "void M(int a, int b) { }";
        let tree = parse(source).tree();
        let config = RecastConfiguration::default();
        let offset = TextSize::from(source.find("int b").unwrap() as u32);
        let ctx = RefactoringContext::new(&tree, TextRange::empty(offset), &config);

        let list: ParameterList = ctx.find().unwrap();
        assert_eq!(list.parameters().count(), 2);
        assert!(ctx.covering_node().is_some());
    }
}
