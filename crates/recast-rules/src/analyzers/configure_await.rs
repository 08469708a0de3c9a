//! `ConfigureAwait(false)` on awaited tasks
//!
//! With the `include` policy every awaited expression whose type offers an
//! awaitable `ConfigureAwait(bool)` should call it; with `omit` an existing
//! `ConfigureAwait(false)` is reported as removable when its receiver is
//! awaitable on its own. Both directions only fire when every type involved
//! resolves.

use once_cell::race::OnceBox;
use recast_core::cst::ast::{AstNode, AwaitExpr, Expr, InvocationExpr, MemberAccessExpr};
use recast_core::cst::trivia::{self, Edge};
use recast_core::cst::{SyntaxNodeExt, make};
use recast_core::{
    CodeAction, ConfigureAwaitPolicy, ConstantValue, Diagnostic, RecastError, Result, Severity,
    SyntaxKind, SyntaxNode, SyntaxTree,
};
use rowan::TextRange;

use super::{AnalysisContext, Analyzer, RuleDescriptor};

/// Rule ID for ConfigureAwait normalization
pub const CONFIGURE_AWAIT: &str = "reliability/configure-await";

const REMOVE_TITLE: &str = "Remove call to 'ConfigureAwait'";
const ADD_TITLE: &str = "Add call to 'ConfigureAwait(false)'";

const CONFIGURE_AWAIT_METHOD: &str = "ConfigureAwait";

/// Without this type in the universe there is nothing to configure
const CONFIGURED_AWAITABLE: &str = "ConfiguredTaskAwaitable`1";

static RULES: OnceBox<Vec<RuleDescriptor>> = OnceBox::new();

pub struct ConfigureAwaitAnalyzer;

impl Analyzer for ConfigureAwaitAnalyzer {
    fn supported_rules(&self) -> &'static [RuleDescriptor] {
        RULES.get_or_init(|| {
            Box::new(vec![RuleDescriptor {
                id: CONFIGURE_AWAIT,
                title: "Awaited tasks follow the ConfigureAwait policy",
                default_severity: Severity::Info,
            }])
        })
    }

    fn trigger_kinds(&self) -> &'static [SyntaxKind] {
        &[SyntaxKind::AwaitExpr]
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>, node: &SyntaxNode) -> Vec<Diagnostic> {
        let Some(expr) = AwaitExpr::cast(node.clone()).and_then(|await_expr| await_expr.expr())
        else {
            return Vec::new();
        };
        let Some(severity) = self
            .supported_rules()
            .first()
            .and_then(|rule| ctx.severity(rule))
        else {
            return Vec::new();
        };

        let diagnostic = match ctx.config.configure_await_policy() {
            ConfigureAwaitPolicy::Omit => check_omit(ctx, &expr),
            ConfigureAwaitPolicy::Include => check_include(ctx, &expr),
        };
        diagnostic
            .map(|diagnostic| diagnostic.with_severity(severity))
            .into_iter()
            .collect()
    }
}

/// `expr` as `receiver.ConfigureAwait(arg)`
fn configure_await_call(expr: &Expr) -> Option<(InvocationExpr, MemberAccessExpr)> {
    let Expr::Invocation(invocation) = expr else {
        return None;
    };
    let Some(Expr::MemberAccess(access)) = invocation.callee() else {
        return None;
    };
    let is_configure_await = access.name().as_deref() == Some(CONFIGURE_AWAIT_METHOD)
        && invocation.arguments().len() == 1;
    is_configure_await.then(|| (invocation.clone(), access))
}

/// `recv.ConfigureAwait(false)` where both the call and `recv` are awaitable
fn check_omit(ctx: &AnalysisContext<'_>, expr: &Expr) -> Option<Diagnostic> {
    let (invocation, access) = configure_await_call(expr)?;
    let arguments = invocation.arguments();
    let [argument] = arguments.as_slice() else {
        return None;
    };
    let value = argument.expr()?;
    if ctx.model.constant_value(value.syntax()) != Some(ConstantValue::Bool(false)) {
        return None;
    }

    let position = expr.syntax().trimmed_range().start();
    let ty = ctx.model.type_of(expr.syntax())?;
    let receiver = access.receiver()?;
    let receiver_ty = ctx.model.type_of(receiver.syntax())?;
    if !ctx.model.is_awaitable(position, &ty) || !ctx.model.is_awaitable(position, &receiver_ty) {
        tracing::debug!(%ty, %receiver_ty, "ConfigureAwait call on a non-awaitable type");
        return None;
    }

    let dot = access.dot()?;
    let range = TextRange::new(dot.text_range().start(), expr.syntax().trimmed_range().end());
    let fix = CodeAction::new(CONFIGURE_AWAIT, REMOVE_TITLE, expr.syntax(), remove_configure_await);
    let location = ctx.location(range);
    Some(Diagnostic::new(CONFIGURE_AWAIT, Severity::Info, REMOVE_TITLE, location).with_fix(fix))
}

/// Awaited expression that could call an awaitable `ConfigureAwait(bool)`
fn check_include(ctx: &AnalysisContext<'_>, expr: &Expr) -> Option<Diagnostic> {
    if configure_await_call(expr).is_some() || !ctx.model.has_type(CONFIGURED_AWAITABLE) {
        return None;
    }

    let position = expr.syntax().trimmed_range().start();
    let ty = ctx.model.type_of(expr.syntax())?;
    if !ctx.model.is_awaitable(position, &ty) {
        return None;
    }

    let configurable = ctx
        .model
        .lookup_members(position, &ty, CONFIGURE_AWAIT_METHOD)
        .iter()
        .filter(|member| !member.is_static || member.is_extension)
        .any(|member| {
            member.has_single_parameter("bool") && ctx.model.is_awaitable(position, &member.ty)
        });
    if !configurable {
        tracing::debug!(%ty, "no awaitable ConfigureAwait(bool) on awaited type");
        return None;
    }

    let range = expr.syntax().trimmed_range();
    let fix = CodeAction::new(CONFIGURE_AWAIT, ADD_TITLE, expr.syntax(), add_configure_await);
    let location = ctx.location(range);
    Some(Diagnostic::new(CONFIGURE_AWAIT, Severity::Info, ADD_TITLE, location).with_fix(fix))
}

fn expect_expr(node: &SyntaxNode) -> Result<Expr> {
    Expr::cast(node.clone()).ok_or_else(|| {
        let kind = node.kind();
        RecastError::invalid_argument(format!("expected an expression, found {kind:?}"))
    })
}

/// `recv.ConfigureAwait(false)` to `recv`, keeping the trivia around the call
fn remove_configure_await(tree: &SyntaxTree, node: &SyntaxNode) -> Result<SyntaxTree> {
    let receiver = configure_await_call(&expect_expr(node)?)
        .and_then(|(_, access)| access.receiver())
        .ok_or_else(|| RecastError::invalid_argument("expected a ConfigureAwait call"))?;

    let trailing = trivia::edge_trivia(&node.green(), Edge::Trailing);
    let green = trivia::with_trailing_trivia(&receiver.syntax().green(), &trailing);
    tree.replace(node, green)
}

/// `expr` to `expr.ConfigureAwait(false)`, keeping the trivia around `expr`
fn add_configure_await(tree: &SyntaxTree, node: &SyntaxNode) -> Result<SyntaxTree> {
    let expr = expect_expr(node)?;
    let green = node.green();
    let leading = trivia::edge_trivia(&green, Edge::Leading);
    let trailing = trivia::edge_trivia(&green, Edge::Trailing);

    let receiver = trivia::with_leading_trivia(&green, &[]);
    let receiver = trivia::with_trailing_trivia(&receiver, &[]);
    let receiver = match expr {
        Expr::Binary(_) | Expr::Prefix(_) | Expr::Await(_) => make::paren(receiver),
        _ => receiver,
    };

    let call = make::invocation(
        make::member_access(receiver, CONFIGURE_AWAIT_METHOD),
        vec![make::bool_literal(false)],
    );
    let call = trivia::with_leading_trivia(&call, &leading);
    tree.replace(node, trivia::with_trailing_trivia(&call, &trailing))
}

#[cfg(test)]
mod tests {
    use super::*;
    use recast_core::cst::parse;
    use recast_core::semantic::{MemberDecl, TypeCatalog, TypeDecl};
    use recast_core::{LocalSemanticModel, RecastConfiguration, SemanticModel};
    use recast_core::config::AnalyzersConfiguration;
    use std::sync::Arc;

    const SOURCE: &str = r#"class Worker
{
    async Task Run(Task task, Task<int> job)
    {
        await task;
        var n = await job.ConfigureAwait(false);
        await Task.Delay(10);
        await unknown;
    }
}
"#;

    fn config(policy: ConfigureAwaitPolicy) -> RecastConfiguration {
        RecastConfiguration {
            analyzers: Some(AnalyzersConfiguration {
                configure_await: Some(policy),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn analyze_with(
        tree: &SyntaxTree,
        model: &dyn SemanticModel,
        config: &RecastConfiguration,
    ) -> Vec<Diagnostic> {
        let ctx = AnalysisContext::new(tree, model, config);
        tree.root()
            .descendants()
            .filter(|node| node.kind() == SyntaxKind::AwaitExpr)
            .flat_map(|node| ConfigureAwaitAnalyzer.analyze(&ctx, &node))
            .collect()
    }

    fn analyze(tree: &SyntaxTree, policy: ConfigureAwaitPolicy) -> Vec<Diagnostic> {
        let model = LocalSemanticModel::with_task_types(tree);
        analyze_with(tree, &model, &config(policy))
    }

    fn text_at(tree: &SyntaxTree, diagnostic: &Diagnostic) -> String {
        tree.text()[diagnostic.location.offset..][..diagnostic.location.length].to_string()
    }

    #[test]
    fn test_include_reports_unconfigured_awaits() {
        let tree = parse(SOURCE).tree();
        let diagnostics = analyze(&tree, ConfigureAwaitPolicy::Include);

        let reported: Vec<String> = diagnostics.iter().map(|d| text_at(&tree, d)).collect();
        assert_eq!(reported, vec!["task", "Task.Delay(10)"]);
        assert!(diagnostics.iter().all(|d| d.message == ADD_TITLE));
        assert_eq!(diagnostics[0].location.line, 5);
    }

    #[test]
    fn test_omit_reports_configure_await_false() {
        let tree = parse(SOURCE).tree();
        let diagnostics = analyze(&tree, ConfigureAwaitPolicy::Omit);

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(text_at(&tree, &diagnostics[0]), ".ConfigureAwait(false)");
        assert_eq!(diagnostics[0].fixes[0].title, REMOVE_TITLE);
        assert_eq!(diagnostics[0].severity, Severity::Info);
    }

    #[test]
    fn test_omit_ignores_configure_await_true() {
        let source = "async Task M(Task task) { await task.ConfigureAwait(true); }";
        let tree = parse(source).tree();
        assert!(analyze(&tree, ConfigureAwaitPolicy::Omit).is_empty());
    }

    #[test]
    fn test_include_then_omit_restores_source() {
        let tree = parse(SOURCE).tree();
        let include = analyze(&tree, ConfigureAwaitPolicy::Include);
        let added = include[0].fixes[0].apply(&tree).unwrap();
        assert!(added.text().contains("        await task.ConfigureAwait(false);\n"));

        let omit = analyze(&added, ConfigureAwaitPolicy::Omit);
        assert_eq!(omit.len(), 2);
        let removed = omit[0].fixes[0].apply(&added).unwrap();
        assert_eq!(removed.text(), SOURCE);
    }

    #[test]
    fn test_omit_then_include_restores_source() {
        let tree = parse(SOURCE).tree();
        let omit = analyze(&tree, ConfigureAwaitPolicy::Omit);
        let removed = omit[0].fixes[0].apply(&tree).unwrap();
        assert!(removed.text().contains("var n = await job;\n"));

        let include = analyze(&removed, ConfigureAwaitPolicy::Include);
        let job = include
            .iter()
            .find(|d| text_at(&removed, d) == "job")
            .unwrap();
        let restored = job.fixes[0].apply(&removed).unwrap();
        assert_eq!(restored.text(), SOURCE);
    }

    #[test]
    fn test_prefix_operand_is_parenthesized() {
        let source = "async Task M(Task<Task> nested) { await await nested; }";
        let tree = parse(source).tree();
        let outer = tree
            .root()
            .descendants()
            .find_map(AwaitExpr::cast)
            .unwrap();
        let inner = outer.expr().unwrap();
        let edited = add_configure_await(&tree, inner.syntax()).unwrap();
        assert_eq!(
            edited.text(),
            "async Task M(Task<Task> nested) { await (await nested).ConfigureAwait(false); }"
        );
    }

    #[test]
    fn test_include_requires_configured_awaitable_type() {
        let source = "async Task M(Task task) { await task; }";
        let tree = parse(source).tree();

        let mut catalog = TypeCatalog::new();
        catalog.add_type(TypeDecl::new("bool", &[]));
        catalog.add_type(TypeDecl::new("void", &[]));
        catalog.add_type(
            TypeDecl::new("Task", &[])
                .member(MemberDecl::method("GetAwaiter", &[], "TaskAwaiter"))
                .member(MemberDecl::method("ConfigureAwait", &["bool"], "Task")),
        );
        catalog.add_type(
            TypeDecl::new("TaskAwaiter", &[])
                .member(MemberDecl::property("IsCompleted", "bool"))
                .member(MemberDecl::method("GetResult", &[], "void")),
        );
        let include = config(ConfigureAwaitPolicy::Include);

        let model = LocalSemanticModel::new(&tree, Arc::new(catalog.clone()));
        assert!(analyze_with(&tree, &model, &include).is_empty());

        catalog.add_type(TypeDecl::new("ConfiguredTaskAwaitable", &[]));
        let model = LocalSemanticModel::new(&tree, Arc::new(catalog.clone()));
        assert!(analyze_with(&tree, &model, &include).is_empty());

        catalog.add_type(TypeDecl::new("ConfiguredTaskAwaitable", &["TResult"]));
        let model = LocalSemanticModel::new(&tree, Arc::new(catalog));
        assert_eq!(analyze_with(&tree, &model, &include).len(), 1);
    }

    #[test]
    fn test_configure_await_call_takes_one_argument() {
        for (source, expected) in [
            ("await t.ConfigureAwait(false);", true),
            ("await t.ConfigureAwait();", false),
            ("await t.ConfigureAwait(false, true);", false),
            ("await t.Configure(false);", false),
        ] {
            let awaited = parse(source)
                .syntax()
                .descendants()
                .find_map(AwaitExpr::cast)
                .and_then(|await_expr| await_expr.expr())
                .unwrap();
            assert_eq!(configure_await_call(&awaited).is_some(), expected, "{source}");
        }
    }

    #[test]
    fn test_rule_can_be_turned_off() {
        let tree = parse(SOURCE).tree();
        let model = LocalSemanticModel::with_task_types(&tree);
        let mut config = config(ConfigureAwaitPolicy::Include);
        if let Some(analyzers) = config.analyzers.as_mut() {
            analyzers.rules = Some([(CONFIGURE_AWAIT.to_string(), recast_core::RuleSeverity::Off)].into());
        }
        assert!(analyze_with(&tree, &model, &config).is_empty());
    }

    #[test]
    fn test_descriptors_are_published_once() {
        let first = ConfigureAwaitAnalyzer.supported_rules();
        let second = ConfigureAwaitAnalyzer.supported_rules();
        assert!(std::ptr::eq(first, second));
        assert_eq!(first[0].id, CONFIGURE_AWAIT);
    }
}
