//! Semantic analyzers
//!
//! An analyzer registers for node kinds. The engine walks a tree once and
//! hands every node of a registered kind to it, together with an
//! [`AnalysisContext`] that gives access to the semantic model and the
//! configuration. Findings come back as [`Diagnostic`]s, optionally with fixes.

mod configure_await;

pub use configure_await::{CONFIGURE_AWAIT, ConfigureAwaitAnalyzer};

use recast_core::{
    Diagnostic, Location, RecastConfiguration, SemanticModel, Severity, SourceMap, SyntaxKind,
    SyntaxNode, SyntaxTree,
};
use rowan::TextRange;
use serde::Serialize;

/// Static description of a rule reported by an analyzer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleDescriptor {
    pub id: &'static str,
    pub title: &'static str,
    /// Severity unless overridden in `analyzers.rules`
    pub default_severity: Severity,
}

/// Everything an analyzer may consult for one document
pub struct AnalysisContext<'a> {
    pub tree: &'a SyntaxTree,
    pub model: &'a dyn SemanticModel,
    pub config: &'a RecastConfiguration,
    source: String,
    source_map: SourceMap,
}

impl<'a> AnalysisContext<'a> {
    pub fn new(
        tree: &'a SyntaxTree,
        model: &'a dyn SemanticModel,
        config: &'a RecastConfiguration,
    ) -> Self {
        let source = tree.text();
        let source_map = SourceMap::new(&source);
        Self {
            tree,
            model,
            config,
            source,
            source_map,
        }
    }

    /// Line and column information for `range`
    pub fn location(&self, range: TextRange) -> Location {
        self.source_map.location(range, &self.source)
    }

    /// Configured severity of `rule`, `None` when the rule is turned off
    pub fn severity(&self, rule: &RuleDescriptor) -> Option<Severity> {
        match self.config.rule_severity(rule.id) {
            Some(configured) => configured.to_severity(),
            None => Some(rule.default_severity),
        }
    }
}

/// A pattern detector triggered on nodes of given kinds
pub trait Analyzer: Send + Sync {
    fn supported_rules(&self) -> &'static [RuleDescriptor];

    /// Node kinds the analyzer wants to see
    fn trigger_kinds(&self) -> &'static [SyntaxKind];

    fn analyze(&self, ctx: &AnalysisContext<'_>, node: &SyntaxNode) -> Vec<Diagnostic>;
}

/// Every built-in analyzer
pub fn builtin() -> Vec<Box<dyn Analyzer>> {
    vec![Box::new(ConfigureAwaitAnalyzer)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use recast_core::cst::parse;
    use recast_core::{LocalSemanticModel, RuleSeverity};
    use std::collections::HashMap;

    #[test]
    fn test_severity_overrides() {
        let rule = RuleDescriptor {
            id: "test/rule",
            title: "Test rule",
            default_severity: Severity::Info,
        };
        let tree = parse("f();").tree();
        let model = LocalSemanticModel::with_task_types(&tree);

        let config = RecastConfiguration::default();
        let ctx = AnalysisContext::new(&tree, &model, &config);
        assert_eq!(ctx.severity(&rule), Some(Severity::Info));

        for (configured, expected) in [
            (RuleSeverity::Off, None),
            (RuleSeverity::Error, Some(Severity::Error)),
        ] {
            let mut config = RecastConfiguration::default();
            config.analyzers = Some(recast_core::config::AnalyzersConfiguration {
                rules: Some(HashMap::from([("test/rule".to_string(), configured)])),
                ..Default::default()
            });
            let ctx = AnalysisContext::new(&tree, &model, &config);
            assert_eq!(ctx.severity(&rule), expected);
        }
    }

    #[test]
    fn test_descriptor_serialization() {
        let rule = RuleDescriptor {
            id: "test/rule",
            title: "Test rule",
            default_severity: Severity::Warning,
        };
        assert_eq!(
            serde_json::to_string(&rule).unwrap(),
            r#"{"id":"test/rule","title":"Test rule","defaultSeverity":"warning"}"#
        );
    }
}
