//! Diagnostic types for linqguard rules
//!
//! Provides diagnostics with:
//! - Byte-precise locations that map back to syntax nodes
//! - Code suggestions with applicability levels (safe vs unsafe)
//! - Line/column conversion for reporting

use rowan::{TextRange, TextSize};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Half-open byte range `[start, end)` in a source file
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct TextSpan {
    pub start: usize,
    pub end: usize,
}

impl TextSpan {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `other` lies entirely inside this span
    pub fn contains_span(&self, other: TextSpan) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Whether the two spans share at least one byte
    pub fn overlaps(&self, other: TextSpan) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn to_text_range(self) -> TextRange {
        TextRange::new(
            TextSize::from(self.start as u32),
            TextSize::from(self.end as u32),
        )
    }
}

impl From<TextRange> for TextSpan {
    fn from(range: TextRange) -> Self {
        Self {
            start: u32::from(range.start()) as usize,
            end: u32::from(range.end()) as usize,
        }
    }
}

impl fmt::Display for TextSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Severity levels for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational messages
    Info,
    /// Hints for improvements
    Hint,
    /// Warnings that should be addressed
    Warning,
    /// Errors that must be fixed
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Hint => write!(f, "hint"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// Indicates how a tool should manage this suggestion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Applicability {
    /// The suggestion is definitely correct and can be applied automatically
    Always,

    /// The suggestion may change behavior and requires review.
    /// Requires --unsafe flag to apply.
    MaybeIncorrect,
}

impl fmt::Display for Applicability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Applicability::Always => write!(f, "safe"),
            Applicability::MaybeIncorrect => write!(f, "unsafe"),
        }
    }
}

/// A code suggestion that can be applied by a fix provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeSuggestion {
    /// Title of the fix
    pub message: String,

    /// Key shared by every fix of the same kind, used to group fix-all
    pub equivalence_key: String,

    /// Preview of the replacement text
    pub replacement: String,

    /// Location the fix rewrites
    pub location: TextSpan,

    /// When this suggestion should be applied
    pub applicability: Applicability,
}

impl CodeSuggestion {
    pub fn new(
        message: impl Into<String>,
        equivalence_key: impl Into<String>,
        replacement: impl Into<String>,
        location: TextSpan,
        applicability: Applicability,
    ) -> Self {
        Self {
            message: message.into(),
            equivalence_key: equivalence_key.into(),
            replacement: replacement.into(),
            location,
            applicability,
        }
    }

    pub fn is_safe(&self) -> bool {
        self.applicability == Applicability::Always
    }
}

/// Represents a diagnostic message produced by a rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Unique identifier for the rule that generated this diagnostic
    pub rule_id: String,
    /// Severity level of the diagnostic
    pub severity: Severity,
    /// Short rule title
    pub title: String,
    /// Human-readable message
    pub message: String,
    /// Rule category, e.g. "Usage"
    pub category: String,
    /// Byte range of the offending code, trivia excluded
    pub location: TextSpan,
    /// Source file, when the unit came from disk
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    /// Code suggestions for fixing the issue
    pub suggestions: Vec<CodeSuggestion>,
}

impl Diagnostic {
    /// Create a new diagnostic
    pub fn new(
        rule_id: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
        location: TextSpan,
    ) -> Self {
        Self {
            rule_id: rule_id.into(),
            severity,
            title: String::new(),
            message: message.into(),
            category: String::new(),
            location,
            file: None,
            suggestions: Vec::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_file(mut self, file: Option<PathBuf>) -> Self {
        self.file = file;
        self
    }

    /// Add a code suggestion to this diagnostic
    pub fn with_suggestion(mut self, suggestion: CodeSuggestion) -> Self {
        self.suggestions.push(suggestion);
        self
    }

    /// Check if this diagnostic has any safe fixes
    pub fn has_safe_fixes(&self) -> bool {
        self.suggestions.iter().any(CodeSuggestion::is_safe)
    }
}

/// 1-based line and column, columns counted in characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LineCol {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for LineCol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Maps byte offsets to line/column positions
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Byte offset of each line start
    line_starts: Vec<usize>,
    text: String,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        for (idx, ch) in source.char_indices() {
            if ch == '\n' {
                line_starts.push(idx + 1);
            }
        }
        Self {
            line_starts,
            text: source.to_string(),
        }
    }

    /// Convert a byte offset to a 1-based position
    ///
    /// Offsets past the end clamp to the end of the text.
    pub fn line_col(&self, offset: usize) -> LineCol {
        let offset = offset.min(self.text.len());
        let line_idx = match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx.saturating_sub(1),
        };
        let line_start = self.line_starts[line_idx];
        let column = self
            .text
            .get(line_start..offset)
            .map(|prefix| prefix.chars().count())
            .unwrap_or(offset - line_start)
            + 1;
        LineCol {
            line: line_idx + 1,
            column,
        }
    }

    /// Text of a 1-based line without its line break
    pub fn line_text(&self, line: usize) -> Option<&str> {
        let start = *self.line_starts.get(line.checked_sub(1)?)?;
        let end = self
            .line_starts
            .get(line)
            .copied()
            .unwrap_or(self.text.len());
        self.text
            .get(start..end)
            .map(|text| text.trim_end_matches(['\n', '\r']))
    }
}
