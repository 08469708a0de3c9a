//! Configuration types for recast

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::Result;
use crate::diagnostics::Severity;
use crate::semantic::TypeCatalog;

/// Root configuration document
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecastConfiguration {
    /// JSON schema reference, ignored by the loader
    #[serde(rename = "$schema", skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Stop upward discovery at this file
    #[schemars(description = "Mark this file as the root configuration")]
    pub root: Option<bool>,

    #[schemars(description = "Formatting of rewritten nodes")]
    pub formatter: Option<FormatterConfiguration>,

    #[schemars(description = "Refactorings offered at a cursor or selection")]
    pub refactorings: Option<RefactoringsConfiguration>,

    #[schemars(description = "Analyzers run over whole documents")]
    pub analyzers: Option<AnalyzersConfiguration>,

    #[schemars(description = "Types known to the local semantic model")]
    pub semantic: Option<SemanticConfiguration>,
}

/// Indent style for formatting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum IndentStyle {
    #[default]
    Spaces,
    Tabs,
}

/// Line terminator inserted by rewrites
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum NewlineKind {
    #[default]
    Lf,
    Crlf,
}

impl NewlineKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NewlineKind::Lf => "\n",
            NewlineKind::Crlf => "\r\n",
        }
    }
}

/// Formatter configuration
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FormatterConfiguration {
    #[schemars(description = "Indentation style: 'spaces' or 'tabs'")]
    pub indent_style: Option<IndentStyle>,

    /// Indentation size in spaces (when indent_style is 'spaces')
    #[schemars(description = "Number of spaces for one indentation level")]
    pub indent_size: Option<usize>,

    #[schemars(description = "Line terminator: 'lf' or 'crlf'")]
    pub newline: Option<NewlineKind>,
}

impl Default for FormatterConfiguration {
    fn default() -> Self {
        Self {
            indent_style: Some(IndentStyle::Spaces),
            indent_size: Some(4),
            newline: Some(NewlineKind::Lf),
        }
    }
}

impl FormatterConfiguration {
    /// Text of one indentation level
    pub fn indent_unit(&self) -> String {
        match self.indent_style.unwrap_or_default() {
            IndentStyle::Tabs => "\t".to_string(),
            IndentStyle::Spaces => " ".repeat(self.indent_size.unwrap_or(4)),
        }
    }

    pub fn newline(&self) -> &'static str {
        self.newline.unwrap_or_default().as_str()
    }
}

/// Refactoring configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RefactoringsConfiguration {
    /// Per-refactoring enable flags, keyed by refactoring id
    #[schemars(description = "Enable or disable individual refactorings by id")]
    pub rules: Option<HashMap<String, bool>>,
}

/// Policy for `ConfigureAwait(false)` on awaited expressions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ConfigureAwaitPolicy {
    /// Every awaited task should carry `.ConfigureAwait(false)`
    #[default]
    Include,
    /// `.ConfigureAwait(false)` is redundant and should be removed
    Omit,
}

/// Analyzer configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzersConfiguration {
    #[schemars(description = "Enable or disable all analyzers")]
    pub enabled: Option<bool>,

    #[schemars(description = "Whether awaited tasks should call ConfigureAwait(false)")]
    pub configure_await: Option<ConfigureAwaitPolicy>,

    /// Severity overrides keyed by rule id
    #[schemars(description = "Rule severity overrides, e.g. {\"reliability/configure-await\": \"error\"}")]
    pub rules: Option<HashMap<String, RuleSeverity>>,
}

/// Rule severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum RuleSeverity {
    /// Disable the rule
    Off,
    Info,
    Warn,
    Error,
}

impl RuleSeverity {
    /// Diagnostic severity, `None` when the rule is off
    pub fn to_severity(self) -> Option<Severity> {
        match self {
            RuleSeverity::Off => None,
            RuleSeverity::Info => Some(Severity::Info),
            RuleSeverity::Warn => Some(Severity::Warning),
            RuleSeverity::Error => Some(Severity::Error),
        }
    }
}

/// Semantic model configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SemanticConfiguration {
    /// Declarations added to the built-in task types
    #[schemars(description = "Extra type and extension method declarations")]
    pub catalog: Option<TypeCatalog>,
}

impl RecastConfiguration {
    pub fn formatter(&self) -> FormatterConfiguration {
        let defaults = FormatterConfiguration::default();
        match &self.formatter {
            Some(formatter) => FormatterConfiguration {
                indent_style: formatter.indent_style.or(defaults.indent_style),
                indent_size: formatter.indent_size.or(defaults.indent_size),
                newline: formatter.newline.or(defaults.newline),
            },
            None => defaults,
        }
    }

    /// Refactorings are enabled unless switched off by id
    pub fn refactoring_enabled(&self, id: &str) -> bool {
        self.refactorings
            .as_ref()
            .and_then(|r| r.rules.as_ref())
            .and_then(|rules| rules.get(id).copied())
            .unwrap_or(true)
    }

    pub fn analyzers_enabled(&self) -> bool {
        self.analyzers
            .as_ref()
            .and_then(|a| a.enabled)
            .unwrap_or(true)
    }

    pub fn configure_await_policy(&self) -> ConfigureAwaitPolicy {
        self.analyzers
            .as_ref()
            .and_then(|a| a.configure_await)
            .unwrap_or_default()
    }

    pub fn rule_severity(&self, rule_id: &str) -> Option<RuleSeverity> {
        self.analyzers
            .as_ref()
            .and_then(|a| a.rules.as_ref())
            .and_then(|rules| rules.get(rule_id).copied())
    }

    /// Built-in task types plus configured declarations
    pub fn type_catalog(&self) -> TypeCatalog {
        let mut catalog = TypeCatalog::with_task_types();
        if let Some(extra) = self.semantic.as_ref().and_then(|s| s.catalog.clone()) {
            catalog.merge(extra);
        }
        catalog
    }

    /// Check values serde cannot reject on its own
    pub fn validate(&self) -> Result<()> {
        if let Some(size) = self.formatter.as_ref().and_then(|f| f.indent_size)
            && !(1..=16).contains(&size)
        {
            return Err(crate::RecastError::config_error(format!(
                "formatter.indentSize must be between 1 and 16, got {size}"
            )));
        }
        self.type_catalog().validate()
    }
}
