//! Dispatch of refactorings and analyzers
//!
//! The [`Engine`] owns the registered operations and the configuration. It
//! offers code actions at a span, applies them (running the formatter over
//! the nodes a transform annotated), and runs analyzers in a single pre-order
//! walk per document.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use rayon::prelude::*;
use recast_core::cst::{Visitor, walk};
use recast_core::{
    CodeAction, Diagnostic, RecastConfiguration, RecastError, Result, ResultExt, SemanticModel,
    SyntaxKind, SyntaxNode, SyntaxTree,
};
use recast_formatter::{FormatOptions, format_annotated};
use rowan::TextRange;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::analyzers::{self, AnalysisContext, Analyzer, RuleDescriptor};
use crate::refactorings::{self, Refactoring, RefactoringContext};

/// Source of the current state of one document
///
/// Implemented by editor integrations. Both values must describe the same
/// tree: a semantic model answers nothing for nodes of another tree.
#[async_trait]
pub trait DocumentHost: Send + Sync {
    async fn syntax_tree(&self) -> Result<SyntaxTree>;

    async fn semantic_model(&self) -> Result<Arc<dyn SemanticModel>>;
}

/// One document of a batch
#[derive(Clone)]
pub struct Document {
    pub tree: SyntaxTree,
    pub model: Arc<dyn SemanticModel>,
}

impl Document {
    pub fn new(tree: SyntaxTree, model: Arc<dyn SemanticModel>) -> Self {
        Self { tree, model }
    }
}

pub struct Engine {
    refactorings: Vec<Box<dyn Refactoring>>,
    analyzers: Vec<Box<dyn Analyzer>>,
    config: RecastConfiguration,
}

impl Engine {
    /// Engine with nothing registered
    pub fn new(config: RecastConfiguration) -> Self {
        Self {
            refactorings: Vec::new(),
            analyzers: Vec::new(),
            config,
        }
    }

    /// Engine with every built-in refactoring and analyzer
    pub fn with_builtins(config: RecastConfiguration) -> Self {
        let mut engine = Self::new(config);
        for refactoring in refactorings::builtin() {
            engine.register_refactoring(refactoring);
        }
        for analyzer in analyzers::builtin() {
            engine.register_analyzer(analyzer);
        }
        engine
    }

    pub fn config(&self) -> &RecastConfiguration {
        &self.config
    }

    /// Register a refactoring, replacing one with the same id
    pub fn register_refactoring(&mut self, refactoring: Box<dyn Refactoring>) {
        let id = refactoring.id();
        if let Some(slot) = self.refactorings.iter_mut().find(|r| r.id() == id) {
            warn!(id, "replacing registered refactoring");
            *slot = refactoring;
        } else {
            debug!(id, "registered refactoring");
            self.refactorings.push(refactoring);
        }
    }

    pub fn register_analyzer(&mut self, analyzer: Box<dyn Analyzer>) {
        debug!(
            rules = analyzer.supported_rules().len(),
            "registered analyzer"
        );
        self.analyzers.push(analyzer);
    }

    /// Descriptors of every rule reported by the registered analyzers
    pub fn rules(&self) -> Vec<&'static RuleDescriptor> {
        self.analyzers
            .iter()
            .flat_map(|analyzer| analyzer.supported_rules())
            .collect()
    }

    /// Actions offered at `span` by every enabled refactoring
    #[instrument(skip(self, tree))]
    pub fn code_actions(&self, tree: &SyntaxTree, span: TextRange) -> Vec<CodeAction> {
        let ctx = RefactoringContext::new(tree, span, &self.config);
        let actions: Vec<CodeAction> = self
            .refactorings
            .iter()
            .filter(|refactoring| self.config.refactoring_enabled(refactoring.id()))
            .flat_map(|refactoring| refactoring.compute(&ctx))
            .collect();
        debug!(offered = actions.len(), "computed code actions");
        actions
    }

    /// Run `action` against `tree` and format what it annotated
    #[instrument(skip_all, fields(id = %action.id))]
    pub fn apply(&self, action: &CodeAction, tree: &SyntaxTree) -> Result<SyntaxTree> {
        let edited = action.apply(tree)?;
        let options = FormatOptions::from(&self.config.formatter());
        format_annotated(&edited, &options)
    }

    /// Diagnostics of every enabled rule, in document order
    #[instrument(skip_all)]
    pub fn analyze(&self, tree: &SyntaxTree, model: &dyn SemanticModel) -> Vec<Diagnostic> {
        if !self.config.analyzers_enabled() || self.analyzers.is_empty() {
            return Vec::new();
        }

        let ctx = AnalysisContext::new(tree, model, &self.config);
        let mut dispatch = Dispatch::new(&self.analyzers, &ctx);
        walk(&tree.root(), &mut dispatch);
        debug!(reported = dispatch.diagnostics.len(), "analyzed document");
        dispatch.diagnostics
    }

    /// [`Engine::analyze`] over independent documents in parallel
    ///
    /// Results are in the order of `documents`.
    #[instrument(skip_all, fields(documents = documents.len()))]
    pub fn analyze_batch(&self, documents: &[Document]) -> Vec<Vec<Diagnostic>> {
        let results: Vec<Vec<Diagnostic>> = documents
            .par_iter()
            .map(|document| self.analyze(&document.tree, document.model.as_ref()))
            .collect();
        let total: usize = results.iter().map(Vec::len).sum();
        info!(total, "analyzed {} documents", documents.len());
        results
    }

    /// Apply the action `id` offered at `span` to the host's current tree
    ///
    /// Returns `None` when the refactoring is not offered there. Cancellation
    /// is checked once the tree is fetched; a running transform is not
    /// interrupted.
    #[instrument(skip(self, host, cancel))]
    pub async fn refactor_document(
        &self,
        host: &dyn DocumentHost,
        span: TextRange,
        id: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<SyntaxTree>> {
        let tree = host.syntax_tree().await?;
        let Some(action) = self
            .code_actions(&tree, span)
            .into_iter()
            .find(|action| action.id == id)
        else {
            debug!("refactoring not offered at span");
            return Ok(None);
        };

        if cancel.is_cancelled() {
            return Err(RecastError::cancelled(format!("refactoring '{id}'")));
        }
        self.apply(&action, &tree).map(Some)
    }

    /// Analyze the host's current document
    #[instrument(skip_all)]
    pub async fn analyze_document(
        &self,
        host: &dyn DocumentHost,
        cancel: &CancellationToken,
    ) -> Result<Vec<Diagnostic>> {
        let tree = host.syntax_tree().await?;
        let model = host.semantic_model().await?;
        if cancel.is_cancelled() {
            return Err(RecastError::cancelled("analysis"));
        }
        Ok(self.analyze(&tree, model.as_ref()))
    }

    /// [`Engine::analyze_document`] for each host, in order
    ///
    /// A host that fails yields `None` for its slot; the error is logged and
    /// the remaining hosts are still analyzed.
    #[instrument(skip_all, fields(hosts = hosts.len()))]
    pub async fn analyze_hosts(
        &self,
        hosts: &[&dyn DocumentHost],
        cancel: &CancellationToken,
    ) -> Vec<Option<Vec<Diagnostic>>> {
        let mut results = Vec::with_capacity(hosts.len());
        for host in hosts {
            results.push(self.analyze_document(*host, cancel).await.log_and_continue());
        }
        let failed = results.iter().filter(|result| result.is_none()).count();
        info!(failed, "analyzed {} hosts", hosts.len());
        results
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::with_builtins(RecastConfiguration::default())
    }
}

/// Pre-order walk handing nodes to the analyzers registered for their kind
struct Dispatch<'a> {
    by_kind: HashMap<SyntaxKind, Vec<&'a dyn Analyzer>>,
    ctx: &'a AnalysisContext<'a>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Dispatch<'a> {
    fn new(analyzers: &'a [Box<dyn Analyzer>], ctx: &'a AnalysisContext<'a>) -> Self {
        let mut by_kind: HashMap<SyntaxKind, Vec<&'a dyn Analyzer>> = HashMap::new();
        for analyzer in analyzers {
            for kind in analyzer.trigger_kinds() {
                by_kind.entry(*kind).or_default().push(analyzer.as_ref());
            }
        }
        Self {
            by_kind,
            ctx,
            diagnostics: Vec::new(),
        }
    }
}

impl Visitor for Dispatch<'_> {
    fn visit(&mut self, node: &SyntaxNode) -> bool {
        if let Some(analyzers) = self.by_kind.get(&node.kind()) {
            for analyzer in analyzers {
                self.diagnostics.extend(analyzer.analyze(self.ctx, node));
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::refactorings::{IF_ELSE_BRACES, PARAMETER_LIST};
    use recast_core::LocalSemanticModel;
    use recast_core::config::RefactoringsConfiguration;
    use recast_core::cst::parse;
    use rowan::TextSize;

    fn cursor(source: &str, needle: &str) -> TextRange {
        TextRange::empty(TextSize::from(source.find(needle).unwrap() as u32))
    }

    /// Counts every node it is handed
    struct CountingAnalyzer;

    impl Analyzer for CountingAnalyzer {
        fn supported_rules(&self) -> &'static [RuleDescriptor] {
            &[]
        }

        fn trigger_kinds(&self) -> &'static [SyntaxKind] {
            &[SyntaxKind::InvocationExpr]
        }

        fn analyze(&self, ctx: &AnalysisContext<'_>, node: &SyntaxNode) -> Vec<Diagnostic> {
            vec![Diagnostic::new(
                "test/count",
                recast_core::Severity::Hint,
                "call",
                ctx.location(node.text_range()),
            )]
        }
    }

    #[test]
    fn test_disabled_refactorings_are_not_offered() {
        let source = "void M(int a, int b) { if (a) f(); }";
        let tree = parse(source).tree();

        let engine = Engine::default();
        let ids: Vec<String> = engine
            .code_actions(&tree, cursor(source, "int b"))
            .into_iter()
            .map(|action| action.id)
            .collect();
        assert_eq!(ids, vec![PARAMETER_LIST]);

        let config = RecastConfiguration {
            refactorings: Some(RefactoringsConfiguration {
                rules: Some(HashMap::from([(PARAMETER_LIST.to_string(), false)])),
            }),
            ..Default::default()
        };
        let engine = Engine::with_builtins(config);
        assert!(engine.code_actions(&tree, cursor(source, "int b")).is_empty());
        assert_eq!(engine.code_actions(&tree, cursor(source, "f()")).len(), 1);
    }

    #[test]
    fn test_apply_formats_annotated_nodes() {
        let source = "if (a) f(); else g();";
        let tree = parse(source).tree();
        let engine = Engine::default();
        let actions = engine.code_actions(&tree, cursor(source, "a"));
        let action = actions.iter().find(|a| a.id == IF_ELSE_BRACES).unwrap();

        let edited = engine.apply(action, &tree).unwrap();
        assert_eq!(edited.text(), "if (a) {\n    f();\n} else {\n    g();\n}");
        assert!(edited.annotated(&recast_core::Annotation::Format).is_empty());
    }

    #[test]
    fn test_analyze_dispatches_by_kind_in_document_order() {
        let source = "void M() { f(); g(h()); }";
        let tree = parse(source).tree();
        let model = LocalSemanticModel::with_task_types(&tree);

        let mut engine = Engine::new(RecastConfiguration::default());
        engine.register_analyzer(Box::new(CountingAnalyzer));
        let offsets: Vec<usize> = engine
            .analyze(&tree, &model)
            .iter()
            .map(|d| d.location.offset)
            .collect();
        assert_eq!(
            offsets,
            vec![
                source.find("f()").unwrap(),
                source.find("g(").unwrap(),
                source.find("h()").unwrap()
            ]
        );
    }

    #[test]
    fn test_register_refactoring_replaces_same_id() {
        let mut engine = Engine::new(RecastConfiguration::default());
        engine.register_refactoring(Box::new(refactorings::FormatParameterList));
        engine.register_refactoring(Box::new(refactorings::FormatParameterList));
        assert_eq!(engine.refactorings.len(), 1);
    }

    #[test]
    fn test_builtin_rules_are_listed() {
        let engine = Engine::default();
        let ids: Vec<&str> = engine.rules().iter().map(|rule| rule.id).collect();
        assert_eq!(ids, vec![analyzers::CONFIGURE_AWAIT]);
    }
}
