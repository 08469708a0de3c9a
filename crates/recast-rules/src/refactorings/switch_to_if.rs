//! `switch` to `if` chain conversion
//!
//! Each `case` section becomes one conditional of the chain, in section order.
//! Its guard compares the discriminant with every label of the section,
//! joined with `||`. The `default` section, wherever it appears, becomes the
//! terminal `else`. Only plain `case` labels can be expressed as equality
//! tests: a pattern or range label anywhere disables the conversion.
//!
//! The discriminant is repeated in every guard. When it contains a call or an
//! `await` the action is offered as [`Applicability::MaybeIncorrect`].

use recast_core::cst::ast::{AstNode, Expr, Stmt, SwitchLabel, SwitchSection, SwitchStmt};
use recast_core::cst::{Annotation, SyntaxKind, make, trivia};
use recast_core::{Applicability, CodeAction, RecastError, Result};
use rowan::GreenNode;

use super::{Refactoring, RefactoringContext};

/// Refactoring ID for switch to if-else conversion
pub const SWITCH_TO_IF: &str = "refactor/switch-to-if";

const TITLE: &str = "Convert 'switch' to 'if-else'";

pub struct ConvertSwitchToIf;

impl Refactoring for ConvertSwitchToIf {
    fn id(&self) -> &'static str {
        SWITCH_TO_IF
    }

    fn compute(&self, ctx: &RefactoringContext<'_>) -> Vec<CodeAction> {
        let Some(switch) = ctx.find::<SwitchStmt>() else {
            return Vec::new();
        };
        if !is_convertible(&switch) {
            let range = switch.syntax().text_range();
            tracing::debug!(?range, "switch cannot become an if chain");
            return Vec::new();
        }

        let action = CodeAction::new(SWITCH_TO_IF, TITLE, switch.syntax(), |tree, node| {
            let switch = SwitchStmt::cast(node.clone()).ok_or_else(|| {
                let kind = node.kind();
                RecastError::invalid_argument(format!("expected SwitchStmt, found {kind:?}"))
            })?;
            tree.replace_annotated(node, convert_switch(&switch)?, Annotation::Format)
        });
        vec![action.with_applicability(applicability(&switch))]
    }
}

/// Every label is a plain `case` or `default`, and at least one section is
/// not the default one
fn is_convertible(switch: &SwitchStmt) -> bool {
    if switch.expr().is_none() {
        return false;
    }

    let plain_labels = switch
        .sections()
        .flat_map(|section| section.labels())
        .all(|label| match label {
            SwitchLabel::Case(case) => case.value().is_some(),
            SwitchLabel::Default(_) => true,
            SwitchLabel::Pattern(_) | SwitchLabel::Range(_) => false,
        });

    plain_labels && switch.sections().any(|section| !section.is_default())
}

/// Whether repeating the discriminant in each guard keeps behavior
fn applicability(switch: &SwitchStmt) -> Applicability {
    let repeats_effects = switch.expr().is_some_and(|expr| {
        expr.syntax().descendants().any(|node| {
            matches!(node.kind(), SyntaxKind::InvocationExpr | SyntaxKind::AwaitExpr)
        })
    });
    if repeats_effects {
        Applicability::MaybeIncorrect
    } else {
        Applicability::Always
    }
}

/// The `if` chain equivalent to `switch`
///
/// The chain takes over the leading and trailing trivia of the `switch`.
/// Layout inside it is canonical but unindented; callers annotate it for the
/// formatter.
pub fn convert_switch(switch: &SwitchStmt) -> Result<GreenNode> {
    let discriminant = switch
        .expr()
        .map(|expr| operand(&expr))
        .ok_or_else(|| RecastError::invalid_argument("switch statement has no expression"))?;

    let (defaults, cases): (Vec<SwitchSection>, Vec<SwitchSection>) =
        switch.sections().partition(SwitchSection::is_default);

    let mut chain = defaults.first().map(|section| make::block(body(section)));
    for section in cases.iter().rev() {
        let condition = guard(&discriminant, section)?;
        let branch = make::if_stmt(
            condition,
            make::block(body(section)),
            chain.map(make::else_clause),
        );
        chain = Some(branch);
    }

    let chain =
        chain.ok_or_else(|| RecastError::invalid_argument("switch statement has no sections"))?;
    tracing::trace!(sections = cases.len(), "built if chain");
    Ok(trivia::with_trivia_from(&chain, &switch.syntax().green()))
}

/// `d == l0 || d == l1 || ...`, folded from the last label
fn guard(discriminant: &GreenNode, section: &SwitchSection) -> Result<GreenNode> {
    section
        .labels()
        .filter_map(|label| match label {
            SwitchLabel::Case(case) => case.value(),
            _ => None,
        })
        .map(|value| make::binary(discriminant.clone(), SyntaxKind::EqEq, operand(&value)))
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .reduce(|rest, test| make::binary(test, SyntaxKind::PipePipe, rest))
        .ok_or_else(|| RecastError::invalid_argument("switch section has no case label"))
}

/// `expr` without edge trivia, parenthesized when it would not bind as an
/// operand of `==`
fn operand(expr: &Expr) -> GreenNode {
    let green = trivia::with_leading_trivia(&expr.syntax().green(), &[]);
    let green = trivia::with_trailing_trivia(&green, &[]);

    let binds_looser = SyntaxKind::EqEq
        .binary_precedence()
        .is_some_and(|equality| expr.precedence() <= equality);
    if binds_looser {
        make::paren(green)
    } else {
        green
    }
}

/// Statements of a section without its first direct `break`
fn body(section: &SwitchSection) -> Vec<GreenNode> {
    let mut statements: Vec<Stmt> = section.statements().collect();
    if let Some(idx) = statements.iter().position(|stmt| matches!(stmt, Stmt::Break(_))) {
        statements.remove(idx);
    }
    statements
        .iter()
        .map(|stmt| stmt.syntax().green().into_owned())
        .collect()
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
        ConvertSwitchToIf.compute(&ctx)
    }

    fn convert(source: &str) -> String {
        let tree = parse(source).tree();
        let actions = actions_at(&tree, source, "switch");
        assert_eq!(actions.len(), 1, "not offered on {source:?}");
        let edited = actions[0].apply(&tree).unwrap();
        format_annotated(&edited, &FormatOptions::default())
            .unwrap()
            .text()
    }

    fn guard_of(source: &str) -> String {
        let switch = parse(source)
            .syntax()
            .descendants()
            .find_map(SwitchStmt::cast)
            .unwrap();
        let discriminant = operand(&switch.expr().unwrap());
        let section = switch.sections().next().unwrap();
        guard(&discriminant, &section).unwrap().to_string()
    }

    #[test]
    fn test_converts_sections_in_order() {
        let source = r#"void M(int x)
{
    switch (x)
    {
        case 1:
        case 2:
            f(1);
            break;
        default:
            h();
            break;
        case 3:
            g();
            break;
    }
}
"#;
        insta::assert_snapshot!(convert(source).trim_end(), @r"
        void M(int x)
        {
            if (x == 1 || x == 2)
            {
                f(1);
            }
            else if (x == 3)
            {
                g();
            }
            else
            {
                h();
            }
        }
        ");
    }

    #[test]
    fn test_labels_read_left_to_right() {
        assert_eq!(
            guard_of("switch (x) { case 1: case 2: case 3: f(); break; }"),
            "x == 1 || x == 2 || x == 3"
        );
    }

    #[test]
    fn test_low_precedence_operands_are_parenthesized() {
        assert_eq!(
            guard_of("switch (a == b) { case true: f(); break; }"),
            "(a == b) == true"
        );
        assert_eq!(
            guard_of("switch (a + b) { case c || d: f(); break; }"),
            "a + b == (c || d)"
        );
    }

    #[test]
    fn test_only_first_direct_break_is_removed() {
        let source = "switch (x)\n{\ncase 1:\nif (y) { break; }\nf();\nbreak;\nbreak;\n}\n";
        assert_eq!(
            convert(source),
            "if (x == 1)\n{\n    if (y) { break; }\n    f();\n    break;\n}\n"
        );
    }

    #[test]
    fn test_break_only_section_yields_empty_block() {
        let source = "switch (x)\n{\ncase 1:\nbreak;\ndefault:\nf();\nbreak;\n}\n";
        assert_eq!(convert(source), "if (x == 1)\n{\n}\nelse\n{\n    f();\n}\n");
    }

    #[test]
    fn test_not_offered_for_pattern_or_range_labels() {
        for source in [
            "switch (x) { case int n: f(); break; case 1: g(); break; }",
            "switch (x) { case 1 when y: f(); break; }",
            "switch (x) { case 1..5: f(); break; }",
        ] {
            let tree = parse(source).tree();
            assert!(actions_at(&tree, source, "switch").is_empty(), "{source}");
        }
    }

    #[test]
    fn test_discriminant_with_calls_needs_review() {
        for (source, expected) in [
            ("switch (x) { case 1: f(); break; }", Applicability::Always),
            ("switch (a.b) { case 1: f(); break; }", Applicability::Always),
            ("switch (next()) { case 1: f(); break; }", Applicability::MaybeIncorrect),
            ("switch (await t) { case 1: f(); break; }", Applicability::MaybeIncorrect),
            ("switch (-r.Read()) { case 1: f(); break; }", Applicability::MaybeIncorrect),
        ] {
            let tree = parse(source).tree();
            let actions = actions_at(&tree, source, "switch");
            assert_eq!(actions[0].applicability, expected, "{source}");
        }
    }

    #[test]
    fn test_not_offered_without_case_sections() {
        let source = "switch (x) { default: f(); break; }";
        let tree = parse(source).tree();
        assert!(actions_at(&tree, source, "switch").is_empty());
    }

    #[test]
    fn test_conversion_keeps_surrounding_trivia() {
        let source = "f();\n  switch (x) { case 1: g(); break; } // done\nh();\n";
        let switch = parse(source)
            .syntax()
            .descendants()
            .find_map(SwitchStmt::cast)
            .unwrap();
        let chain = convert_switch(&switch).unwrap();
        assert_eq!(chain.to_string(), "  if (x == 1)\n{\ng();\n} // done\n");
    }
}
