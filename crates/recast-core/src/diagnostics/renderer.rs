//! Diagnostic rendering as plain text or JSON

use serde::Serialize;
use similar::TextDiff;

use super::{Diagnostic, SourceMap};
use crate::action::{Applicability, CodeAction};
use crate::cst::SyntaxTree;

/// Output format for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text with a code frame and fix previews
    #[default]
    Text,
    /// JSON format for programmatic consumption
    Json,
    /// JSON with pretty-printing
    JsonPretty,
}

/// Renders diagnostics against the tree they were computed on
#[derive(Debug, Clone, Default)]
pub struct DiagnosticRenderer {
    output_format: OutputFormat,
}

/// JSON shape of a diagnostic, fixes reduced to their titles
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonDiagnostic<'a> {
    #[serde(flatten)]
    diagnostic: &'a Diagnostic,
    fixes: Vec<JsonFix<'a>>,
}

#[derive(Serialize)]
struct JsonFix<'a> {
    title: &'a str,
    applicability: Applicability,
}

impl DiagnosticRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_format(format: OutputFormat) -> Self {
        Self {
            output_format: format,
        }
    }

    pub fn set_format(&mut self, format: OutputFormat) {
        self.output_format = format;
    }

    /// Render all diagnostics of one document
    pub fn render_all(&self, diagnostics: &[Diagnostic], tree: &SyntaxTree) -> String {
        match self.output_format {
            OutputFormat::Text => diagnostics
                .iter()
                .map(|diagnostic| self.render_text(diagnostic, tree))
                .collect::<Vec<_>>()
                .join("\n"),
            OutputFormat::Json => self.render_json(diagnostics, false),
            OutputFormat::JsonPretty => self.render_json(diagnostics, true),
        }
    }

    pub fn render(&self, diagnostic: &Diagnostic, tree: &SyntaxTree) -> String {
        self.render_all(std::slice::from_ref(diagnostic), tree)
    }

    fn render_json(&self, diagnostics: &[Diagnostic], pretty: bool) -> String {
        let payload: Vec<JsonDiagnostic<'_>> = diagnostics
            .iter()
            .map(|diagnostic| JsonDiagnostic {
                diagnostic,
                fixes: diagnostic
                    .fixes
                    .iter()
                    .map(|fix| JsonFix {
                        title: &fix.title,
                        applicability: fix.applicability,
                    })
                    .collect(),
            })
            .collect();

        let rendered = if pretty {
            serde_json::to_string_pretty(&payload)
        } else {
            serde_json::to_string(&payload)
        };
        rendered.unwrap_or_else(|e| format!("{{\"error\": \"Failed to serialize: {e}\"}}"))
    }

    /// `severity[rule]: message`, a code frame, then one preview per fix
    fn render_text(&self, diagnostic: &Diagnostic, tree: &SyntaxTree) -> String {
        let mut output = format!(
            "{}[{}]: {}\n",
            diagnostic.severity, diagnostic.rule_id, diagnostic.message
        );
        output.push_str(&format!("  --> {}\n", diagnostic.location));

        let source = tree.text();
        if let Some(frame) = self.render_code_frame(diagnostic, &source) {
            output.push_str(&frame);
        }

        for fix in &diagnostic.fixes {
            output.push_str(&self.render_fix(fix, tree, &source));
        }
        output
    }

    fn render_code_frame(&self, diagnostic: &Diagnostic, source: &str) -> Option<String> {
        let location = &diagnostic.location;
        let line = source.lines().nth(location.line.checked_sub(1)?)?;
        let gutter = location.line.to_string().len();

        let width = if location.end_line == location.line {
            location.end_column.saturating_sub(location.column).max(1)
        } else {
            line.chars().count().saturating_sub(location.column - 1).max(1)
        };

        let mut frame = format!("{:gutter$} |\n", "");
        frame.push_str(&format!("{} | {}\n", location.line, line));
        frame.push_str(&format!(
            "{:gutter$} | {}{}\n",
            "",
            " ".repeat(location.column.saturating_sub(1)),
            "^".repeat(width)
        ));
        Some(frame)
    }

    fn render_fix(&self, fix: &CodeAction, tree: &SyntaxTree, source: &str) -> String {
        let label = match fix.applicability {
            Applicability::Always => "Safe fix",
            Applicability::MaybeIncorrect => "Unsafe fix",
        };
        let mut output = format!("  i {label}: {}\n", fix.title);

        match fix.apply(tree) {
            Ok(fixed) => {
                let fixed = fixed.text();
                let diff = TextDiff::from_lines(source, fixed.as_str());
                for hunk in diff.unified_diff().context_radius(1).iter_hunks() {
                    for line in hunk.to_string().lines() {
                        output.push_str("    ");
                        output.push_str(line);
                        output.push('\n');
                    }
                }
            }
            Err(err) => {
                tracing::warn!(title = %fix.title, "fix preview failed: {err}");
                output.push_str("    (preview unavailable)\n");
            }
        }
        output
    }
}

/// Source map for a tree's current text
pub fn source_map(tree: &SyntaxTree) -> SourceMap {
    SourceMap::new(&tree.text())
}
