//! Diagnostic data types

use std::path::{Path, PathBuf};

use rowan::TextRange;
use serde::{Deserialize, Serialize};

use crate::action::CodeAction;

/// A finding reported by an analyzer
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    /// Identifier of the rule that produced the diagnostic
    pub rule_id: String,
    pub severity: Severity,
    pub message: String,
    pub location: Location,
    /// Fixes, in preference order
    #[serde(skip)]
    pub fixes: Vec<CodeAction>,
}

impl Diagnostic {
    pub fn new(
        rule_id: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
        location: Location,
    ) -> Self {
        Self {
            rule_id: rule_id.into(),
            severity,
            message: message.into(),
            location,
            fixes: Vec::new(),
        }
    }

    pub fn with_fix(mut self, fix: CodeAction) -> Self {
        self.fixes.push(fix);
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn has_fixes(&self) -> bool {
        !self.fixes.is_empty()
    }
}

/// Severity levels for diagnostics, least severe first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Hint,
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Hint => write!(f, "hint"),
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// Where a diagnostic points
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// Document path, empty for in-memory documents
    #[serde(skip_serializing_if = "is_empty_path")]
    #[serde(default)]
    pub file: PathBuf,
    /// Line number (1-based)
    pub line: usize,
    /// Column number (1-based)
    pub column: usize,
    pub end_line: usize,
    pub end_column: usize,
    /// Byte offset in the document
    pub offset: usize,
    /// Length of the span in bytes
    pub length: usize,
}

fn is_empty_path(path: &Path) -> bool {
    path.as_os_str().is_empty()
}

impl Location {
    pub fn range(&self) -> TextRange {
        TextRange::at((self.offset as u32).into(), (self.length as u32).into())
    }

    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = file.into();
        self
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if is_empty_path(&self.file) {
            write!(f, "{}:{}", self.line, self.column)
        } else {
            write!(f, "{}:{}:{}", self.file.display(), self.line, self.column)
        }
    }
}

/// Line index over a source text for offset to line/column conversion
#[derive(Debug, Clone)]
pub struct SourceMap {
    /// Byte offset of each line start
    line_starts: Vec<usize>,
}

impl SourceMap {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            source
                .char_indices()
                .filter(|(_, ch)| *ch == '\n')
                .map(|(idx, _)| idx + 1),
        );
        Self { line_starts }
    }

    /// 1-based `(line, column)` of a byte offset; columns count characters
    pub fn offset_to_position(&self, offset: usize, source: &str) -> (usize, usize) {
        let line_idx = match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx.saturating_sub(1),
        };
        let line_start = self.line_starts[line_idx];
        let end = offset.min(source.len());
        let column = source
            .get(line_start..end)
            .map_or(end.saturating_sub(line_start), |text| text.chars().count());
        (line_idx + 1, column + 1)
    }

    pub fn location(&self, range: TextRange, source: &str) -> Location {
        let start = usize::from(range.start());
        let end = usize::from(range.end());
        let (line, column) = self.offset_to_position(start, source);
        let (end_line, end_column) = self.offset_to_position(end, source);
        Location {
            file: PathBuf::new(),
            line,
            column,
            end_line,
            end_column,
            offset: start,
            length: end - start,
        }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_to_position() {
        let source = "void M()\n{\n    await t;\n}";
        let map = SourceMap::new(source);
        assert_eq!(map.offset_to_position(0, source), (1, 1));
        assert_eq!(map.offset_to_position(9, source), (2, 1));
        assert_eq!(map.offset_to_position(15, source), (3, 5));
        assert_eq!(map.line_count(), 4);
    }

    #[test]
    fn test_columns_count_characters() {
        let source = "\"日本\" + x";
        let map = SourceMap::new(source);
        let x = source.find('x').unwrap();
        assert_eq!(map.offset_to_position(x, source), (1, 8));
    }

    #[test]
    fn test_location_of_range() {
        let source = "f();\nawait g.ConfigureAwait(false);";
        let map = SourceMap::new(source);
        let start = source.find(".Configure").unwrap() as u32;
        let range = TextRange::new(start.into(), (source.len() as u32 - 1).into());

        let location = map.location(range, source);
        assert_eq!((location.line, location.column), (2, 8));
        assert_eq!((location.end_line, location.end_column), (2, 30));
        assert_eq!(location.range(), range);
        assert_eq!(location.to_string(), "2:8");
    }

    #[test]
    fn test_severity_order() {
        assert!(Severity::Hint < Severity::Info);
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
        assert_eq!(
            [Severity::Error, Severity::Hint, Severity::Info].iter().max(),
            Some(&Severity::Error)
        );
        assert_eq!(
            [Severity::Info, Severity::Hint].iter().min(),
            Some(&Severity::Hint)
        );
    }
}
