//! Whitespace edits for one annotated node
//!
//! Layout is computed over the flat token sequence of the node and replayed
//! while the green subtree is rebuilt. Only whitespace tokens are edited:
//! comments and line breaks are kept where they are.

use std::collections::{HashMap, HashSet};

use recast_core::cst::{SyntaxElement, SyntaxKind, SyntaxNode, SyntaxToken, make, trivia};
use rowan::{GreenNode, NodeOrToken, TextSize};

use crate::FormatOptions;

#[derive(Debug, Default)]
struct Edits {
    remove: HashSet<TextSize>,
    replace: HashMap<TextSize, String>,
    insert_before: HashMap<TextSize, String>,
}

impl Edits {
    fn is_empty(&self) -> bool {
        self.remove.is_empty() && self.replace.is_empty() && self.insert_before.is_empty()
    }

    /// Set the whitespace run `run` to `text`, or drop it when `text` is empty
    fn set_run(&mut self, run: &[SyntaxToken], next: &SyntaxToken, text: &str) {
        match run.split_first() {
            Some((first, rest)) => {
                if text.is_empty() {
                    self.remove.insert(first.text_range().start());
                } else if first.text() != text {
                    self.replace
                        .insert(first.text_range().start(), text.to_string());
                }
                self.remove
                    .extend(rest.iter().map(|t| t.text_range().start()));
            }
            None if !text.is_empty() => {
                self.insert_before
                    .insert(next.text_range().start(), text.to_string());
            }
            None => {}
        }
    }
}

/// Formatted copy of `node`
pub(crate) fn format_node(node: &SyntaxNode, options: &FormatOptions) -> GreenNode {
    let edits = compute_edits(node, options);
    if edits.is_empty() {
        tracing::trace!(kind = ?node.kind(), "already formatted");
        return node.green().into_owned();
    }
    rebuild(node, &edits)
}

fn compute_edits(node: &SyntaxNode, options: &FormatOptions) -> Edits {
    let tokens: Vec<SyntaxToken> = node
        .descendants_with_tokens()
        .filter_map(|element| element.into_token())
        .collect();
    let significant: Vec<usize> = tokens
        .iter()
        .enumerate()
        .filter(|(_, token)| !token.kind().is_trivia())
        .map(|(idx, _)| idx)
        .collect();

    let base = trivia::node_indentation(node);
    let mut edits = Edits::default();

    // Trivia before the first and after the last significant token belong
    // to the surrounding code
    for pair in significant.windows(2) {
        let (prev, next) = (&tokens[pair[0]], &tokens[pair[1]]);
        let run = &tokens[pair[0] + 1..pair[1]];

        if run.iter().all(|t| t.kind() == SyntaxKind::Whitespace) {
            let text = if wants_space(prev, next) { " " } else { "" };
            edits.set_run(run, next, text);
            continue;
        }

        if !run.iter().any(|t| t.kind() == SyntaxKind::Newline) {
            // Inline comment between two tokens: keep as written
            continue;
        }

        let indent = format!("{base}{}", options.indent.repeat(depth(next, node)));
        for (idx, token) in run.iter().enumerate() {
            let before = idx.checked_sub(1).map(|i| &run[i]);
            let after = run.get(idx + 1).unwrap_or(next);
            match token.kind() {
                SyntaxKind::Whitespace if after.kind() == SyntaxKind::Newline => {
                    edits.remove.insert(token.text_range().start());
                }
                SyntaxKind::Whitespace
                    if before.is_some_and(|t| t.kind() == SyntaxKind::Newline) =>
                {
                    edits.set_run(std::slice::from_ref(token), after, &indent);
                }
                SyntaxKind::Newline if !after.kind().is_layout() && !indent.is_empty() => {
                    edits
                        .insert_before
                        .insert(after.text_range().start(), indent.clone());
                }
                _ => {}
            }
        }
    }

    edits
}

/// Whether two tokens on the same line are separated by a space
fn wants_space(prev: &SyntaxToken, next: &SyntaxToken) -> bool {
    use SyntaxKind::*;

    let parent_is = |token: &SyntaxToken, kind: SyntaxKind| {
        token.parent().is_some_and(|parent| parent.kind() == kind)
    };

    match (prev.kind(), next.kind()) {
        (_, Semicolon | Comma | RParen | Dot | Colon) => false,
        (LParen | Dot | Bang, _) => false,
        (Minus, _) if parent_is(prev, PrefixExpr) => false,
        (Ident | RParen, LParen) => false,
        (Gt, LParen) => !parent_is(prev, TypeArgList),
        (Lt, _) if parent_is(prev, TypeArgList) => false,
        (_, Lt | Gt) if parent_is(next, TypeArgList) => false,
        (DotDot, _) | (_, DotDot) => false,
        _ => true,
    }
}

/// Indentation levels of `token` relative to `root`
fn depth(token: &SyntaxToken, root: &SyntaxNode) -> usize {
    let mut depth = 0;
    let mut child: SyntaxElement = NodeOrToken::Token(token.clone());
    while let Some(parent) = child.parent() {
        if indents(&parent, &child) {
            depth += 1;
        }
        if &parent == root {
            break;
        }
        child = NodeOrToken::Node(parent);
    }
    depth
}

/// Whether `child` sits one level deeper than `parent`
fn indents(parent: &SyntaxNode, child: &SyntaxElement) -> bool {
    use SyntaxKind::*;

    let kind = child.kind();
    match parent.kind() {
        Block | ClassDecl => match child {
            NodeOrToken::Token(_) => {
                !matches!(kind, LBrace | RBrace | ClassKw | Ident | ModifierKw)
            }
            NodeOrToken::Node(_) => kind == MethodDecl || kind.is_stmt(),
        },
        SwitchStmt => kind == SwitchSection,
        SwitchSection => kind.is_stmt(),
        IfStmt | WhileStmt => kind.is_stmt() && kind != Block,
        ElseClause => kind.is_stmt() && !matches!(kind, Block | IfStmt),
        ParameterList => kind == Parameter,
        ArgList => kind == Argument,
        _ => false,
    }
}

fn rebuild(node: &SyntaxNode, edits: &Edits) -> GreenNode {
    let mut children = Vec::new();
    for element in node.children_with_tokens() {
        match element {
            NodeOrToken::Node(child) => children.push(NodeOrToken::Node(rebuild(&child, edits))),
            NodeOrToken::Token(token) => {
                let start = token.text_range().start();
                if let Some(text) = edits.insert_before.get(&start) {
                    children.push(NodeOrToken::Token(make::whitespace(text)));
                }
                if edits.remove.contains(&start) {
                    continue;
                }
                match edits.replace.get(&start) {
                    Some(text) => children.push(NodeOrToken::Token(make::whitespace(text))),
                    None => children.push(NodeOrToken::Token(token.green().to_owned())),
                }
            }
        }
    }
    make::node(node.kind(), children)
}

#[cfg(test)]
mod tests {
    use super::*;
    use recast_core::cst::parse;

    fn format_first(source: &str, kind: SyntaxKind) -> String {
        let root = parse(source).syntax();
        let node = root.descendants().find(|n| n.kind() == kind).unwrap();
        format_node(&node, &FormatOptions::default()).to_string()
    }

    #[test]
    fn test_horizontal_spacing() {
        assert_eq!(
            format_first("f(a,b ,  c ) ;", SyntaxKind::ExprStmt),
            "f(a, b, c);"
        );
        assert_eq!(
            format_first("var x=-a+b*  c;", SyntaxKind::LocalDecl),
            "var x = -a + b * c;"
        );
        assert_eq!(
            format_first("Task<  int >  t = ! x ;", SyntaxKind::LocalDecl),
            "Task<int> t = !x;"
        );
    }

    #[test]
    fn test_reindents_lines() {
        let source = "if (a)\n{\nf();\n  if (b)\ng();\n}\n";
        insta::assert_snapshot!(format_first(source, SyntaxKind::IfStmt).trim_end(), @r"
        if (a)
        {
            f();
            if (b)
                g();
        }
        ");
    }

    #[test]
    fn test_keeps_base_indentation_and_comments() {
        let source = "void M()\n{\n  switch (x)\n  {\n  case 1: // one\n  f();   \n  break;\n  }\n}";
        assert_eq!(
            format_first(source, SyntaxKind::SwitchStmt),
            "  switch (x)\n  {\n      case 1: // one\n          f();\n          break;\n  }\n"
        );
    }

    #[test]
    fn test_formatted_node_is_unchanged() {
        let source = "if (a)\n{\n    f(x, y);\n}\nelse\n    g();\n";
        let root = parse(source).syntax();
        let node = root.descendants().find(|n| n.kind() == SyntaxKind::IfStmt).unwrap();
        let green = format_node(&node, &FormatOptions::default());
        assert_eq!(green.to_string(), node.text().to_string());
    }
}
