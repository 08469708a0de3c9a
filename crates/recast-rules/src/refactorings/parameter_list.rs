//! Parameter list reformatting
//!
//! Toggles a parameter list between one parameter per line and a single line.
//! The direction is chosen from the current layout of the list: a list without
//! line breaks between its parentheses is spread out, anything else is joined.

use recast_core::cst::ast::{AstNode, ParameterList};
use recast_core::cst::trivia::{self, Edge, GreenElement};
use recast_core::cst::{Annotation, SyntaxKind, SyntaxNode, make};
use recast_core::{CodeAction, RecastError, Result};
use rowan::{GreenNode, GreenNodeData, GreenToken, NodeOrToken, TextRange};

use super::{Refactoring, RefactoringContext};

/// Refactoring ID for parameter list reformatting
pub const PARAMETER_LIST: &str = "refactor/parameter-list";

const TO_MULTI_LINE: &str = "Format each parameter on separate line";
const TO_SINGLE_LINE: &str = "Format all parameters on a single line";

/// Offers [`to_multi_line`] or [`to_single_line`] on lists with more than one
/// parameter
pub struct FormatParameterList;

impl Refactoring for FormatParameterList {
    fn id(&self) -> &'static str {
        PARAMETER_LIST
    }

    fn compute(&self, ctx: &RefactoringContext<'_>) -> Vec<CodeAction> {
        let Some(list) = ctx.find::<ParameterList>() else {
            return Vec::new();
        };

        let count = list.parameters().count();
        if count < 2 {
            tracing::debug!(count, "parameter list too short to reformat");
            return Vec::new();
        }

        let action = if is_single_line(&list) {
            let formatter = ctx.config.formatter();
            let indent_unit = formatter.indent_unit();
            let newline = formatter.newline();
            CodeAction::new(PARAMETER_LIST, TO_MULTI_LINE, list.syntax(), move |tree, node| {
                let green = to_multi_line(&expect_list(node)?, &indent_unit, newline);
                tree.replace(node, green)
            })
        } else {
            CodeAction::new(PARAMETER_LIST, TO_SINGLE_LINE, list.syntax(), |tree, node| {
                let green = to_single_line(&expect_list(node)?);
                tree.replace_annotated(node, green, Annotation::Format)
            })
        };
        vec![action]
    }
}

fn expect_list(node: &SyntaxNode) -> Result<ParameterList> {
    ParameterList::cast(node.clone()).ok_or_else(|| {
        RecastError::invalid_argument(format!("expected ParameterList, found {:?}", node.kind()))
    })
}

/// Whether no line break separates the parentheses of `list`
pub fn is_single_line(list: &ParameterList) -> bool {
    let range = list.syntax().text_range();
    let start = list
        .l_paren()
        .map_or(range.start(), |paren| paren.text_range().end());
    let end = list
        .r_paren()
        .map_or(range.end(), |paren| paren.text_range().start());
    let inner = TextRange::new(start, end);

    !list
        .syntax()
        .descendants_with_tokens()
        .filter_map(|element| element.into_token())
        .any(|token| {
            token.kind() == SyntaxKind::Newline && inner.contains_range(token.text_range())
        })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    BeforeOpen,
    Inside,
    AfterClose,
}

/// One parameter per line
///
/// Every parameter is indented one `indent_unit` deeper than the line of the
/// enclosing declaration. The opening parenthesis and every comma end their
/// line; the closing parenthesis stays after the last parameter. Comments
/// inside the list are kept next to the parameter they precede.
pub fn to_multi_line(list: &ParameterList, indent_unit: &str, newline: &str) -> GreenNode {
    let enclosing = list.syntax().parent().unwrap_or_else(|| list.syntax().clone());
    let prefix = format!("{}{indent_unit}", trivia::node_indentation(&enclosing));
    let line_break = make::line_break(newline);

    let mut children: Vec<GreenElement> = Vec::new();
    let mut comments: Vec<GreenToken> = Vec::new();
    let mut position = Position::BeforeOpen;

    for element in list.syntax().children_with_tokens() {
        match (position, element) {
            (Position::BeforeOpen, NodeOrToken::Token(token))
                if token.kind() == SyntaxKind::LParen =>
            {
                children.push(NodeOrToken::Token(token.green().to_owned()));
                children.push(NodeOrToken::Token(line_break.clone()));
                position = Position::Inside;
            }
            (Position::Inside, NodeOrToken::Node(parameter)) => {
                let comments = std::mem::take(&mut comments);
                let parameter = indent_parameter(&parameter.green(), &prefix, comments);
                children.push(NodeOrToken::Node(parameter));
            }
            (Position::Inside, NodeOrToken::Token(token)) => match token.kind() {
                SyntaxKind::Comma => {
                    children.push(NodeOrToken::Token(token.green().to_owned()));
                    children.push(NodeOrToken::Token(line_break.clone()));
                }
                SyntaxKind::RParen => {
                    for comment in comments.drain(..) {
                        children.push(NodeOrToken::Token(make::space()));
                        children.push(NodeOrToken::Token(comment));
                    }
                    children.push(NodeOrToken::Token(token.green().to_owned()));
                    position = Position::AfterClose;
                }
                kind if kind.is_layout() => {}
                kind if kind.is_comment() => comments.push(token.green().to_owned()),
                _ => children.push(NodeOrToken::Token(token.green().to_owned())),
            },
            (_, NodeOrToken::Node(node)) => {
                children.push(NodeOrToken::Node(node.green().into_owned()));
            }
            (_, NodeOrToken::Token(token)) => {
                children.push(NodeOrToken::Token(token.green().to_owned()));
            }
        }
    }

    make::node(SyntaxKind::ParameterList, children)
}

/// `parameter` on its own line: `prefix`, then comments, then the parameter
fn indent_parameter(
    parameter: &GreenNodeData,
    prefix: &str,
    comments: Vec<GreenToken>,
) -> GreenNode {
    let own_leading = trivia::without_layout(&trivia::edge_trivia(parameter, Edge::Leading));
    let mut leading = vec![make::whitespace(prefix)];
    for comment in comments.into_iter().chain(own_leading) {
        leading.push(comment);
        leading.push(make::space());
    }

    let mut trailing = Vec::new();
    for comment in trivia::without_layout(&trivia::edge_trivia(parameter, Edge::Trailing)) {
        trailing.push(make::space());
        trailing.push(comment);
    }

    let parameter = trivia::with_leading_trivia(parameter, &leading);
    trivia::with_trailing_trivia(&parameter, &trailing)
}

/// All parameters on one line
///
/// Whitespace and line breaks strictly inside the list are removed; the
/// caller annotates the result so the formatter restores canonical spacing.
pub fn to_single_line(list: &ParameterList) -> GreenNode {
    trivia::strip_inner_layout(&list.syntax().green())
}

#[cfg(test)]
mod tests {
    use super::*;
    use recast_core::cst::parse;
    use recast_core::{RecastConfiguration, SyntaxTree};
    use recast_formatter::{FormatOptions, format_annotated};
    use rowan::TextSize;

    fn actions_at(tree: &SyntaxTree, source: &str, needle: &str) -> Vec<CodeAction> {
        let config = RecastConfiguration::default();
        let offset = TextSize::from(source.find(needle).unwrap() as u32);
        let ctx = RefactoringContext::new(tree, TextRange::empty(offset), &config);
        FormatParameterList.compute(&ctx)
    }

    #[test]
    fn test_not_offered_for_short_lists() {
        for (source, cursor) in [("void M() { }", ")"), ("void M(int a) { }", "int")] {
            let tree = parse(source).tree();
            assert!(actions_at(&tree, source, cursor).is_empty(), "{source}");
        }
    }

    #[test]
    fn test_not_offered_outside_parameter_list() {
        let source = "void M(int a, int b) { f(a, b); }";
        let tree = parse(source).tree();
        assert!(actions_at(&tree, source, "f(").is_empty());
    }

    #[test]
    fn test_single_line_to_multi_line() {
        let source = "class C\n{\n    void M(int a, Task<int> b, string c)\n    {\n    }\n}\n";
        let tree = parse(source).tree();

        let actions = actions_at(&tree, source, "int a");
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].title, TO_MULTI_LINE);

        let edited = actions[0].apply(&tree).unwrap();
        insta::assert_snapshot!(edited.text().trim_end(), @r"
        class C
        {
            void M(
                int a,
                Task<int> b,
                string c)
            {
            }
        }
        ");
    }

    #[test]
    fn test_multi_line_to_single_line() {
        let source = "void M(\n    int a,\n      string b\n)\n{\n}\n";
        let tree = parse(source).tree();

        let actions = actions_at(&tree, source, "string");
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].title, TO_SINGLE_LINE);

        let edited = actions[0].apply(&tree).unwrap();
        assert_eq!(edited.annotated(&Annotation::Format).len(), 1);

        let formatted = format_annotated(&edited, &FormatOptions::default()).unwrap();
        assert_eq!(formatted.text(), "void M(int a, string b)\n{\n}\n");
    }

    #[test]
    fn test_multi_line_keeps_comments() {
        let source = "void M(int a, /* second */ int b) { }";
        let list = parse(source)
            .syntax()
            .descendants()
            .find_map(ParameterList::cast)
            .unwrap();

        let green = to_multi_line(&list, "  ", "\r\n");
        assert_eq!(
            green.to_string(),
            "(\r\n  int a,\r\n  /* second */ int b) "
        );
    }

    #[test]
    fn test_layout_detection() {
        let lists: Vec<ParameterList> = parse("void A(int a,\nint b) { }\nvoid B(int a, int b)\n{ }")
            .syntax()
            .descendants()
            .filter_map(ParameterList::cast)
            .collect();
        assert!(!is_single_line(&lists[0]));
        assert!(is_single_line(&lists[1]));
    }

    #[test]
    fn test_transform_rejects_other_nodes() {
        let tree = parse("void M(int a, int b) { }").tree();
        let block = tree
            .root()
            .descendants()
            .find(|n| n.kind() == SyntaxKind::Block)
            .unwrap();
        let err = expect_list(&block).unwrap_err();
        assert_eq!(err.kind(), recast_core::ErrorKind::InvalidArgument);
    }
}
