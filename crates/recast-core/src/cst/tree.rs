//! Immutable document tree with node annotations
//!
//! A [`SyntaxTree`] is a green root plus a table of annotations. Red nodes
//! handed out by [`SyntaxTree::root`] are views into that root; any edit goes
//! through [`SyntaxTree::replace`], which path-copies the green tree and
//! returns a new value. The original is never modified.
//!
//! Annotations are stored by `(range, kind)` rather than on the nodes
//! themselves, so they are re-keyed on every replacement: annotations after
//! the edit are shifted, annotations on ancestors of the edited node are
//! stretched and annotations inside the replaced subtree are dropped.

use rowan::{GreenNode, NodeOrToken, TextRange, TextSize};

use super::{SyntaxKind, SyntaxNode};
use crate::{RecastError, Result};

/// Marker attached to a node of a [`SyntaxTree`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Annotation {
    /// The node should be passed through the formatter
    Format,
    /// Host-defined marker
    Named(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AnnotatedRange {
    annotation: Annotation,
    range: TextRange,
    kind: SyntaxKind,
}

/// An immutable parsed document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxTree {
    green: GreenNode,
    annotations: Vec<AnnotatedRange>,
}

impl SyntaxTree {
    pub fn new(green: GreenNode) -> Self {
        Self {
            green,
            annotations: Vec::new(),
        }
    }

    /// Red root over the tree
    ///
    /// Every call creates a fresh red view; nodes from different views of the
    /// same value compare equal.
    pub fn root(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.green.clone())
    }

    pub fn green(&self) -> &GreenNode {
        &self.green
    }

    pub fn text(&self) -> String {
        self.green.to_string()
    }

    /// Whether `node` is a view into this tree value
    pub fn contains(&self, node: &SyntaxNode) -> bool {
        let root = node.ancestors().last().unwrap_or_else(|| node.clone());
        std::ptr::eq(&*root.green(), &*self.green)
    }

    fn check_owned(&self, node: &SyntaxNode) -> Result<()> {
        if self.contains(node) {
            Ok(())
        } else {
            Err(RecastError::stale_node(format!(
                "{:?}@{:?} does not belong to this tree",
                node.kind(),
                node.text_range()
            )))
        }
    }

    // ========================================================================
    // Annotations
    // ========================================================================

    /// Copy of the tree with `node` annotated
    pub fn with_annotation(&self, node: &SyntaxNode, annotation: Annotation) -> Result<Self> {
        self.check_owned(node)?;

        let mut tree = self.clone();
        let entry = AnnotatedRange {
            annotation,
            range: node.text_range(),
            kind: node.kind(),
        };
        if !tree.annotations.contains(&entry) {
            tree.annotations.push(entry);
        }
        Ok(tree)
    }

    /// Nodes carrying `annotation`, in document order
    pub fn annotated(&self, annotation: &Annotation) -> Vec<SyntaxNode> {
        let root = self.root();
        let mut nodes: Vec<SyntaxNode> = self
            .annotations
            .iter()
            .filter(|entry| &entry.annotation == annotation)
            .filter_map(|entry| resolve(&root, entry.range, entry.kind))
            .collect();
        nodes.sort_by_key(|node| {
            let range = node.text_range();
            (range.start(), std::cmp::Reverse(range.end()))
        });
        nodes
    }

    pub fn has_annotation(&self, node: &SyntaxNode, annotation: &Annotation) -> bool {
        self.annotations.iter().any(|entry| {
            &entry.annotation == annotation
                && entry.range == node.text_range()
                && entry.kind == node.kind()
        })
    }

    /// Copy of the tree with every `annotation` removed
    pub fn without_annotation(&self, annotation: &Annotation) -> Self {
        let mut tree = self.clone();
        tree.annotations.retain(|entry| &entry.annotation != annotation);
        tree
    }

    // ========================================================================
    // Replacement
    // ========================================================================

    /// Copy of the tree with `old` replaced by `new`
    ///
    /// Only the spine from `old` to the root is rebuilt; every other subtree
    /// is shared with `self`.
    pub fn replace(&self, old: &SyntaxNode, new: GreenNode) -> Result<Self> {
        self.check_owned(old)?;

        let old_range = old.text_range();
        let new_len = new.text_len();
        let green = path_copy(old, new);

        let ancestors: Vec<SyntaxNode> = old.ancestors().skip(1).collect();
        let root = self.root();
        let annotations = self
            .annotations
            .iter()
            .filter_map(|entry| {
                let range = rekey(entry, &root, old, &ancestors, old_range, new_len)?;
                Some(AnnotatedRange {
                    range,
                    ..entry.clone()
                })
            })
            .collect();

        tracing::trace!(
            kind = ?old.kind(),
            range = ?old_range,
            "replaced node, {} bytes now",
            u32::from(new_len)
        );

        Ok(Self { green, annotations })
    }

    /// [`replace`](Self::replace), then annotate the inserted node
    pub fn replace_annotated(
        &self,
        old: &SyntaxNode,
        new: GreenNode,
        annotation: Annotation,
    ) -> Result<Self> {
        let range = TextRange::at(old.text_range().start(), new.text_len());
        let kind = <super::RecastLanguage as rowan::Language>::kind_from_raw(new.kind());

        let mut tree = self.replace(old, new)?;
        tree.annotations.push(AnnotatedRange {
            annotation,
            range,
            kind,
        });
        Ok(tree)
    }
}

impl std::fmt::Display for SyntaxTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.green)
    }
}

/// Root of a copy of `old`'s tree with `old` swapped for `new`
///
/// Unlike `SyntaxNode::replace_with` the replacement may have another kind.
fn path_copy(old: &SyntaxNode, new: GreenNode) -> GreenNode {
    let mut green = new;
    let mut node = old.clone();
    while let Some(parent) = node.parent() {
        green = parent
            .green()
            .replace_child(node.index(), NodeOrToken::Node(green));
        node = parent;
    }
    green
}

/// Node with exactly `range` and `kind`
fn resolve(root: &SyntaxNode, range: TextRange, kind: SyntaxKind) -> Option<SyntaxNode> {
    if !root.text_range().contains_range(range) {
        return None;
    }
    let start = match root.covering_element(range) {
        NodeOrToken::Node(node) => node,
        NodeOrToken::Token(token) => token.parent()?,
    };
    start
        .ancestors()
        .take_while(|node| node.text_range() == range)
        .find(|node| node.kind() == kind)
}

/// New range of an annotation after `old` is replaced, `None` when it is lost
fn rekey(
    entry: &AnnotatedRange,
    root: &SyntaxNode,
    old: &SyntaxNode,
    ancestors: &[SyntaxNode],
    old_range: TextRange,
    new_len: TextSize,
) -> Option<TextRange> {
    let grow = |size: TextSize| {
        // Widen in u32 space; sizes never go negative for a valid edit
        let size = u32::from(size) + u32::from(new_len);
        TextSize::from(size - u32::from(old_range.len()))
    };

    if entry.range.end() <= old_range.start() && entry.range != old_range {
        return Some(entry.range);
    }
    if entry.range.start() >= old_range.end() && entry.range != old_range {
        return Some(TextRange::new(grow(entry.range.start()), grow(entry.range.end())));
    }

    let node = resolve(root, entry.range, entry.kind)?;
    if ancestors.contains(&node) {
        Some(TextRange::new(entry.range.start(), grow(entry.range.end())))
    } else {
        // The annotated node is `old` or lives inside it
        debug_assert!(node == *old || node.ancestors().any(|a| a == *old));
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cst::{SyntaxNodeExt, make, parse};

    fn find(tree: &SyntaxTree, kind: SyntaxKind, nth: usize) -> SyntaxNode {
        tree.root()
            .descendants()
            .filter(|n| n.kind() == kind)
            .nth(nth)
            .unwrap()
    }

    #[test]
    fn test_replace_is_persistent() {
        let tree = parse("f(a);\ng(b);\n").tree();
        let name = find(&tree, SyntaxKind::NameExpr, 1);
        let edited = tree.replace(&name, make::name_expr("value")).unwrap();

        assert_eq!(edited.text(), "f(value);\ng(b);\n");
        assert_eq!(tree.text(), "f(a);\ng(b);\n");
    }

    #[test]
    fn test_replace_with_another_kind() {
        let tree = parse("void M() {\n    await t;\n    g(x);\n}\n").tree();
        let await_operand = find(&tree, SyntaxKind::NameExpr, 0);
        let call = make::invocation(
            make::member_access(make::name_expr("t"), "ConfigureAwait"),
            vec![make::bool_literal(false)],
        );
        let edited = tree.replace(&await_operand, call).unwrap();
        assert_eq!(
            edited.text(),
            "void M() {\n    await t.ConfigureAwait(false);\n    g(x);\n}\n"
        );

        let stmt = find(&edited, SyntaxKind::ExprStmt, 0);
        let block = make::block(vec![]);
        let edited = edited.replace(&stmt, block).unwrap();
        assert_eq!(edited.text(), "void M() {\n{\n}    g(x);\n}\n");
        let blocks = edited
            .root()
            .descendants()
            .filter(|n| n.kind() == SyntaxKind::Block)
            .count();
        assert_eq!(blocks, 2);
    }

    #[test]
    fn test_replace_rejects_foreign_nodes() {
        let tree = parse("f(a);").tree();
        let other = parse("f(a);").tree();
        let node = find(&other, SyntaxKind::NameExpr, 0);

        let err = tree.replace(&node, make::name_expr("x")).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::StaleNode);
    }

    #[test]
    fn test_nodes_from_different_views_are_accepted() {
        let tree = parse("f(a);").tree();
        let node = find(&tree, SyntaxKind::NameExpr, 0);
        let clone = tree.clone();
        assert!(clone.contains(&node));
    }

    #[test]
    fn test_annotations_shift_after_earlier_edit() {
        let tree = parse("f(a);\ng(b);\n").tree();
        let second = find(&tree, SyntaxKind::ExprStmt, 1);
        let tree = tree.with_annotation(&second, Annotation::Format).unwrap();

        let first_arg = find(&tree, SyntaxKind::NameExpr, 1);
        let tree = tree.replace(&first_arg, make::name_expr("longer")).unwrap();

        let annotated = tree.annotated(&Annotation::Format);
        assert_eq!(annotated.len(), 1);
        assert_eq!(annotated[0].trimmed_text(), "g(b);");
    }

    #[test]
    fn test_annotations_on_ancestors_are_stretched() {
        let tree = parse("f(a);\n").tree();
        let stmt = find(&tree, SyntaxKind::ExprStmt, 0);
        let tree = tree.with_annotation(&stmt, Annotation::Format).unwrap();

        let arg = find(&tree, SyntaxKind::NameExpr, 1);
        let tree = tree.replace(&arg, make::name_expr("abc")).unwrap();

        let annotated = tree.annotated(&Annotation::Format);
        assert_eq!(annotated.len(), 1);
        assert_eq!(annotated[0].text().to_string(), "f(abc);\n");
    }

    #[test]
    fn test_annotations_inside_replaced_subtree_are_dropped() {
        let tree = parse("f(a);\n").tree();
        let arg = find(&tree, SyntaxKind::NameExpr, 1);
        let tree = tree.with_annotation(&arg, Annotation::Format).unwrap();

        let stmt = find(&tree, SyntaxKind::ExprStmt, 0);
        let replacement = make::node(
            SyntaxKind::ExprStmt,
            vec![
                NodeOrToken::Node(make::name_expr("g")),
                NodeOrToken::Token(make::token(SyntaxKind::Semicolon)),
            ],
        );
        let tree = tree.replace(&stmt, replacement).unwrap();
        assert!(tree.annotated(&Annotation::Format).is_empty());
    }

    #[test]
    fn test_replace_annotated_marks_new_node() {
        let tree = parse("f(a);").tree();
        let arg = find(&tree, SyntaxKind::NameExpr, 1);
        let hit = Annotation::Named("hit".into());
        let tree = tree
            .replace_annotated(&arg, make::name_expr("b"), hit.clone())
            .unwrap();

        let marked = tree.annotated(&hit);
        assert_eq!(marked.len(), 1);
        assert_eq!(marked[0].text().to_string(), "b");
        assert!(tree.without_annotation(&hit).annotated(&hit).is_empty());
    }
}
