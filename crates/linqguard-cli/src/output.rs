//! Output formatting and reporting

use colored::*;
use linqguard_core::{Diagnostic, LineIndex, Severity, TextSpan};
use linqguard_rules::{FixFailure, RuleMetadata};
use serde::Serialize;
use similar::{ChangeTag, TextDiff};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Diagnostics found in one file
#[derive(Debug)]
pub struct FileReport {
    pub path: PathBuf,
    pub source: String,
    pub diagnostics: Vec<Diagnostic>,
}

/// Result of fixing one file
#[derive(Debug)]
pub struct FileFix {
    pub path: PathBuf,
    /// Text before fixing
    pub source: String,
    pub applied: usize,
    pub skipped: Vec<TextSpan>,
    pub failures: Vec<FixFailure>,
    /// Unified diff, only for dry runs
    pub diff: Option<String>,
}

/// Summary statistics for a check run
#[derive(Debug, Clone, Serialize)]
pub struct CheckSummary {
    pub files_checked: usize,
    pub files_with_issues: usize,
    pub diagnostics: usize,
    pub fixable: usize,
    #[serde(skip)]
    pub elapsed: Duration,
}

impl CheckSummary {
    pub fn from_reports(reports: &[FileReport], elapsed: Duration) -> Self {
        let diagnostics = reports.iter().map(|r| r.diagnostics.len()).sum();
        let fixable = reports
            .iter()
            .flat_map(|r| &r.diagnostics)
            .filter(|d| d.has_safe_fixes())
            .count();
        Self {
            files_checked: reports.len(),
            files_with_issues: reports.iter().filter(|r| !r.diagnostics.is_empty()).count(),
            diagnostics,
            fixable,
            elapsed,
        }
    }
}

/// A diagnostic as written in JSON output, with 1-based positions added
#[derive(Debug, Serialize)]
struct JsonDiagnostic<'a> {
    line: usize,
    column: usize,
    end_line: usize,
    end_column: usize,
    #[serde(flatten)]
    diagnostic: &'a Diagnostic,
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    diagnostics: Vec<JsonDiagnostic<'a>>,
    summary: &'a CheckSummary,
}

pub fn print_human(reports: &[FileReport], summary: &CheckSummary) {
    for report in reports {
        if report.diagnostics.is_empty() {
            continue;
        }
        let index = LineIndex::new(&report.source);
        for diagnostic in &report.diagnostics {
            print!("{}", render_diagnostic(&report.path, &index, diagnostic));
        }
    }
    print_summary(summary);
}

/// Render one diagnostic with its source line underlined
pub fn render_diagnostic(path: &Path, index: &LineIndex, diagnostic: &Diagnostic) -> String {
    let start = index.line_col(diagnostic.location.start);
    let end = index.line_col(diagnostic.location.end);
    let line_text = index.line_text(start.line).unwrap_or_default();
    let gutter = " ".repeat(start.line.to_string().len());

    let severity = match diagnostic.severity {
        Severity::Error => "error".red().bold(),
        Severity::Warning => "warning".yellow().bold(),
        Severity::Info => "info".blue().bold(),
        Severity::Hint => "hint".cyan().bold(),
    };
    let width = if end.line == start.line {
        end.column.saturating_sub(start.column).max(1)
    } else {
        line_text.chars().count().saturating_sub(start.column - 1).max(1)
    };

    let mut out = format!(
        "{}{}: {}\n",
        severity,
        format!("[{}]", diagnostic.rule_id).bold(),
        diagnostic.message.bold()
    );
    out.push_str(&format!(
        "{}{} {}:{}:{}\n",
        gutter,
        "-->".blue().bold(),
        path.display(),
        start.line,
        start.column
    ));
    out.push_str(&format!("{} {}\n", gutter, "|".blue().bold()));
    out.push_str(&format!(
        "{} {} {}\n",
        start.line.to_string().blue().bold(),
        "|".blue().bold(),
        line_text
    ));
    out.push_str(&format!(
        "{} {} {}{}\n",
        gutter,
        "|".blue().bold(),
        " ".repeat(start.column - 1),
        "^".repeat(width).yellow().bold()
    ));
    for suggestion in &diagnostic.suggestions {
        out.push_str(&format!(
            "{} {} {}: `{}` ({})\n",
            gutter,
            "=".blue().bold(),
            "help".bold(),
            suggestion.replacement,
            suggestion.applicability
        ));
    }
    out.push('\n');
    out
}

fn print_summary(summary: &CheckSummary) {
    if summary.diagnostics == 0 {
        println!(
            "{} Checked {} file(s), no issues found",
            "✓".green().bold(),
            summary.files_checked
        );
        return;
    }
    println!(
        "Found {} in {} of {} file(s) ({} fixable with `linqguard fix`)",
        format!("{} warning(s)", summary.diagnostics).yellow(),
        summary.files_with_issues,
        summary.files_checked,
        summary.fixable
    );
    println!("{}", format!("Finished in {:.2?}", summary.elapsed).dimmed());
}

pub fn print_json(reports: &[FileReport], summary: &CheckSummary) -> anyhow::Result<()> {
    let mut diagnostics = Vec::new();
    for report in reports {
        let index = LineIndex::new(&report.source);
        for diagnostic in &report.diagnostics {
            let start = index.line_col(diagnostic.location.start);
            let end = index.line_col(diagnostic.location.end);
            diagnostics.push(JsonDiagnostic {
                line: start.line,
                column: start.column,
                end_line: end.line,
                end_column: end.column,
                diagnostic,
            });
        }
    }

    let report = JsonReport {
        diagnostics,
        summary,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

pub fn print_fixes(fixes: &[FileFix], dry_run: bool) {
    let mut applied = 0;
    let mut remaining = 0;

    for fix in fixes {
        applied += fix.applied;
        remaining += fix.failures.len() + fix.skipped.len();

        if let Some(diff) = &fix.diff {
            print!("{diff}");
        } else if fix.applied > 0 {
            println!(
                "{} {} ({} fix(es))",
                "Fixed".green().bold(),
                fix.path.display(),
                fix.applied
            );
        }

        let index = LineIndex::new(&fix.source);
        for failure in &fix.failures {
            let at = index.line_col(failure.location.start);
            println!(
                "{} {}:{}:{}: {}",
                "not fixed".yellow().bold(),
                fix.path.display(),
                at.line,
                at.column,
                failure.error
            );
        }
        for span in &fix.skipped {
            let at = index.line_col(span.start);
            println!(
                "{} {}:{}:{}: overlaps another fix, run again",
                "skipped".yellow().bold(),
                fix.path.display(),
                at.line,
                at.column
            );
        }
    }

    let verb = if dry_run { "Would fix" } else { "Fixed" };
    println!("{verb} {applied} call(s), {remaining} left unchanged");
}

pub fn print_rules(rules: &[RuleMetadata]) {
    for rule in rules {
        println!("{} {}", rule.id.bold(), rule.title);
        println!("  category: {}", rule.category);
        println!("  severity: {}", rule.severity);
        println!("  message:  {}", rule.message);
        println!("  fix:      {}", rule.fix_title);
    }
}

/// Unified diff between two versions of a file
pub fn unified_diff(path: &Path, original: &str, modified: &str) -> String {
    let diff = TextDiff::from_lines(original, modified);
    let mut output = format!(
        "{}\n{}\n",
        format!("--- {}", path.display()).bold(),
        format!("+++ {} (fixed)", path.display()).bold()
    );

    for group in diff.grouped_ops(3) {
        let old_start = group[0].old_range().start;
        let new_start = group[0].new_range().start;
        let old_len: usize = group.iter().map(|op| op.old_range().len()).sum();
        let new_len: usize = group.iter().map(|op| op.new_range().len()).sum();
        output.push_str(&format!(
            "{}\n",
            format!(
                "@@ -{},{} +{},{} @@",
                old_start + 1,
                old_len,
                new_start + 1,
                new_len
            )
            .cyan()
        ));

        for op in &group {
            for change in diff.iter_changes(op) {
                let line = change.value().trim_end_matches(['\n', '\r']);
                let rendered = match change.tag() {
                    ChangeTag::Delete => format!("-{line}").red().to_string(),
                    ChangeTag::Insert => format!("+{line}").green().to_string(),
                    ChangeTag::Equal => format!(" {line}"),
                };
                output.push_str(&rendered);
                output.push('\n');
            }
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use linqguard_core::{Applicability, CodeSuggestion};

    fn diagnostic(source: &str, needle: &str) -> Diagnostic {
        let start = source.find(needle).unwrap();
        let location = TextSpan::new(start, start + needle.len());
        Diagnostic::new("DIAG0001", Severity::Warning, "Avoid it", location).with_suggestion(
            CodeSuggestion::new(
                "Replace",
                "key",
                "xs is null || xs.Any() is false",
                location,
                Applicability::Always,
            ),
        )
    }

    #[test]
    fn test_render_diagnostic_underlines_the_call() {
        colored::control::set_override(false);
        let source = "class A\n{\n    bool M() => xs.IsNullOrEmpty();\n}\n";
        let rendered = render_diagnostic(
            Path::new("A.cs"),
            &LineIndex::new(source),
            &diagnostic(source, "xs.IsNullOrEmpty()"),
        );

        assert!(rendered.starts_with("warning[DIAG0001]: Avoid it\n"));
        assert!(rendered.contains("--> A.cs:3:17\n"));
        assert!(rendered.contains("3 |     bool M() => xs.IsNullOrEmpty();\n"));
        assert!(rendered.contains(&format!("  | {}{}\n", " ".repeat(16), "^".repeat(18))));
        assert!(rendered.contains("= help: `xs is null || xs.Any() is false` (safe)"));
    }

    #[test]
    fn test_unified_diff_marks_changed_lines() {
        colored::control::set_override(false);
        let diff = unified_diff(
            Path::new("A.cs"),
            "a\nb\nc\n",
            "a\nB\nc\n",
        );

        assert_eq!(diff, "--- A.cs\n+++ A.cs (fixed)\n@@ -1,3 +1,3 @@\n a\n-b\n+B\n c\n");
    }

    #[test]
    fn test_summary_counts_fixable() {
        let source = "xs.IsNullOrEmpty()";
        let mut unfixable = diagnostic(source, source);
        unfixable.suggestions.clear();
        let reports = vec![
            FileReport {
                path: PathBuf::from("A.cs"),
                source: source.to_string(),
                diagnostics: vec![diagnostic(source, source), unfixable],
            },
            FileReport {
                path: PathBuf::from("B.cs"),
                source: String::new(),
                diagnostics: Vec::new(),
            },
        ];

        let summary = CheckSummary::from_reports(&reports, Duration::ZERO);
        assert_eq!(summary.files_checked, 2);
        assert_eq!(summary.files_with_issues, 1);
        assert_eq!(summary.diagnostics, 2);
        assert_eq!(summary.fixable, 1);
    }
}
