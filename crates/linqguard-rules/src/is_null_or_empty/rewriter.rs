//! Rewrite of flagged `IsNullOrEmpty` calls
//!
//! A call `r.IsNullOrEmpty()` (or `CollectionUtilities.IsNullOrEmpty(r)`) is
//! replaced by the tree for `r is null || r.Any() is false`. The replacement
//! is built from green node factories, takes over the call's leading and
//! trailing trivia, and is spliced into a copy of the tree. `using System.Linq;`
//! is then added to the compilation unit unless it is already imported.
//!
//! Every operation returns a new [`SourceUnit`]; the input is never modified,
//! and a failed fix leaves nothing half-edited.

use rowan::{GreenNode, NodeOrToken};
use thiserror::Error;

use linqguard_core::cst::ast::{AstNode, CallExpr, Expr};
use linqguard_core::cst::make::{self, GreenElement};
use linqguard_core::cst::trivia::{leading_trivia, trailing_trivia, without_edge_trivia};
use linqguard_core::cst::{CsSyntaxKind, CsSyntaxNode};
use linqguard_core::{FixConfig, SourceUnit, TextSpan};

use super::LINQ_NAMESPACE;
use super::symbol::TARGET_METHOD;

/// Why a fix could not be applied
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FixError {
    #[error("no IsNullOrEmpty call found at {span}")]
    TargetNotFound { span: TextSpan },

    #[error("cannot rewrite the call at {span}: {reason}")]
    MalformedReceiver { span: TextSpan, reason: String },

    #[error("the receiver of the call at {span} may have side effects and would be evaluated twice")]
    SideEffectingReceiver { span: TextSpan },
}

impl FixError {
    /// Location the failed fix was asked to rewrite
    pub fn span(&self) -> TextSpan {
        match self {
            FixError::TargetNotFound { span }
            | FixError::MalformedReceiver { span, .. }
            | FixError::SideEffectingReceiver { span } => *span,
        }
    }
}

/// Rewrite settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FixOptions {
    /// Rewrite receivers that are not plain references
    pub allow_side_effecting_receivers: bool,
}

impl From<&FixConfig> for FixOptions {
    fn from(config: &FixConfig) -> Self {
        Self {
            allow_side_effecting_receivers: config.allow_side_effecting_receivers,
        }
    }
}

/// One text change made by a fix: `deleted` bytes at `offset` were replaced
/// by `inserted` bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextEdit {
    pub offset: usize,
    pub deleted: usize,
    pub inserted: usize,
}

impl TextEdit {
    /// Position of `span` after this edit
    ///
    /// Spans before the edit are unchanged, spans after it shift, and spans
    /// enclosing it grow or shrink with it. A span cut by the edit has no
    /// position and yields `None`.
    pub fn translate(&self, span: TextSpan) -> Option<TextSpan> {
        let edit_end = self.offset + self.deleted;
        if span.end <= self.offset {
            Some(span)
        } else if span.start >= edit_end {
            Some(TextSpan::new(
                span.start - self.deleted + self.inserted,
                span.end - self.deleted + self.inserted,
            ))
        } else if span.start <= self.offset && edit_end <= span.end {
            Some(TextSpan::new(
                span.start,
                span.end - self.deleted + self.inserted,
            ))
        } else {
            None
        }
    }
}

/// A location that could not be fixed during fix-all
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixFailure {
    /// Location as reported against the original unit
    pub location: TextSpan,
    pub error: FixError,
}

/// Result of fixing every location in a unit
#[derive(Debug, Clone)]
pub struct FixAllOutcome {
    pub unit: SourceUnit,
    /// Locations rewritten, in source order
    pub applied: Vec<TextSpan>,
    /// Duplicate locations and locations cut by an earlier rewrite
    pub skipped: Vec<TextSpan>,
    pub failures: Vec<FixFailure>,
}

impl FixAllOutcome {
    pub fn changed(&self) -> bool {
        !self.applied.is_empty()
    }

    /// Whether every location was rewritten
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty() && self.failures.is_empty()
    }
}

/// Rewrite the call at `location` with the default options
pub fn apply_fix(unit: &SourceUnit, location: TextSpan) -> Result<SourceUnit, FixError> {
    apply_fix_with(unit, location, &FixOptions::default())
}

/// Rewrite the call whose trimmed span is exactly `location`
pub fn apply_fix_with(
    unit: &SourceUnit,
    location: TextSpan,
    options: &FixOptions,
) -> Result<SourceUnit, FixError> {
    rewrite(unit, location, options).map(|(unit, _)| unit)
}

/// Rewrite every location with the default options
pub fn apply_fix_all(unit: &SourceUnit, locations: &[TextSpan]) -> FixAllOutcome {
    apply_fix_all_with(unit, locations, &FixOptions::default())
}

/// Rewrite every location, all given against the original `unit`
///
/// Fixes run one after another, each on the previous result. Locations are
/// moved through the edits already made, so the final unit does not depend
/// on the order of `locations`. Nested calls are rewritten before the calls
/// enclosing them.
pub fn apply_fix_all_with(
    unit: &SourceUnit,
    locations: &[TextSpan],
    options: &FixOptions,
) -> FixAllOutcome {
    let mut pending: Vec<TextSpan> = Vec::with_capacity(locations.len());
    let mut skipped = Vec::new();
    for &location in locations {
        if pending.contains(&location) {
            skipped.push(location);
        } else {
            pending.push(location);
        }
    }
    // A span that contains another is always longer than it
    pending.sort_by_key(TextSpan::len);

    let mut current = unit.clone();
    let mut edits: Vec<TextEdit> = Vec::new();
    let mut applied = Vec::new();
    let mut failures = Vec::new();

    for location in pending {
        let Some(translated) = edits
            .iter()
            .try_fold(location, |span, edit| edit.translate(span))
        else {
            tracing::warn!("Skipping fix at {location}: cut by an earlier rewrite");
            skipped.push(location);
            continue;
        };

        match rewrite(&current, translated, options) {
            Ok((next, new_edits)) => {
                current = next;
                edits.extend(new_edits);
                applied.push(location);
            }
            Err(error) => {
                tracing::debug!("Fix at {location} failed: {error}");
                failures.push(FixFailure { location, error });
            }
        }
    }

    applied.sort();
    skipped.sort();
    failures.sort_by_key(|failure| failure.location);

    FixAllOutcome {
        unit: current,
        applied,
        skipped,
        failures,
    }
}

/// Add `using {namespace};` unless the compilation unit already imports it
///
/// Only top-level namespace imports count, `global using` included. The new
/// directive follows the last top-level using, or opens the file when there
/// is none.
pub fn ensure_using(unit: &SourceUnit, namespace: &str) -> SourceUnit {
    insert_using(unit, namespace).0
}

fn rewrite(
    unit: &SourceUnit,
    location: TextSpan,
    options: &FixOptions,
) -> Result<(SourceUnit, Vec<TextEdit>), FixError> {
    let call = find_target(unit, location).ok_or(FixError::TargetNotFound { span: location })?;
    let plan = RewritePlan::for_call(&call)?;
    if !plan.receiver_is_safe() && !options.allow_side_effecting_receivers {
        return Err(FixError::SideEffectingReceiver { span: location });
    }

    let leading = leading_trivia(call.syntax());
    let trailing = trailing_trivia(call.syntax());
    let replacement = plan.build(make::trivia(&leading), make::trivia(&trailing));
    let replacement_len = u32::from(replacement.text_len()) as usize;
    let mut edits = vec![TextEdit {
        offset: location.start,
        deleted: location.len(),
        inserted: replacement_len - leading.len() - trailing.len(),
    }];

    let replaced = unit.with_green(splice(call.syntax(), replacement));
    tracing::debug!("Rewrote IsNullOrEmpty call at {location}");

    let (fixed, import) = insert_using(&replaced, LINQ_NAMESPACE);
    edits.extend(import);
    Ok((fixed, edits))
}

/// New root with `node` swapped for `replacement`
///
/// The swap happens in the parent, since the replacement is usually of a
/// different kind than the node it stands in for.
fn splice(node: &CsSyntaxNode, replacement: GreenNode) -> GreenNode {
    match node.parent() {
        Some(parent) => parent.replace_with(
            parent
                .green()
                .replace_child(node.index(), NodeOrToken::Node(replacement)),
        ),
        None => replacement,
    }
}

/// Innermost `IsNullOrEmpty` call whose trimmed span is exactly `location`
fn find_target(unit: &SourceUnit, location: TextSpan) -> Option<CallExpr> {
    let text_len = u32::from(unit.green().text_len()) as usize;
    if location.start > location.end || location.end > text_len {
        return None;
    }
    let range = location.to_text_range();
    unit.syntax()
        .descendants()
        .filter_map(CallExpr::cast)
        .filter(|call| call.span() == range)
        .filter(|call| call.method_name().as_deref() == Some(TARGET_METHOD))
        .last()
}

/// Replacement for one call, before trivia is attached
#[derive(Debug, Clone)]
pub(crate) struct RewritePlan {
    /// Receiver without edge trivia, parenthesized when needed
    receiver: GreenNode,
    receiver_is_safe: bool,
    /// Whether the call sits where `||` would bind to the wrong operands
    parenthesize: bool,
}

impl RewritePlan {
    pub(crate) fn for_call(call: &CallExpr) -> Result<Self, FixError> {
        let receiver = receiver_of(call).map_err(|reason| FixError::MalformedReceiver {
            span: TextSpan::from(call.span()),
            reason: reason.to_string(),
        })?;

        let green = without_edge_trivia(receiver.syntax());
        let green = if receiver.is_primary() {
            green
        } else {
            make::paren(green)
        };

        Ok(Self {
            receiver: green,
            receiver_is_safe: receiver.is_side_effect_free(),
            parenthesize: needs_parens(call),
        })
    }

    /// Whether evaluating the receiver twice is harmless
    pub(crate) fn receiver_is_safe(&self) -> bool {
        self.receiver_is_safe
    }

    /// Replacement text without trivia
    pub(crate) fn preview(&self) -> String {
        CsSyntaxNode::new_root(self.build(Vec::new(), Vec::new()))
            .text()
            .to_string()
    }

    fn build(&self, leading: Vec<GreenElement>, trailing: Vec<GreenElement>) -> GreenNode {
        let is_null = make::is_constant(self.receiver.clone(), CsSyntaxKind::NullKw, "null");
        let any = make::call_no_args(make::member_access(self.receiver.clone(), "Any"));
        let is_empty = make::is_constant(any, CsSyntaxKind::FalseKw, "false");

        if self.parenthesize {
            let check = make::binary(
                is_null,
                CsSyntaxKind::PipePipe,
                "||",
                is_empty,
                Vec::new(),
                Vec::new(),
            );
            make::paren_with_trivia(check, leading, trailing)
        } else {
            make::binary(
                is_null,
                CsSyntaxKind::PipePipe,
                "||",
                is_empty,
                leading,
                trailing,
            )
        }
    }
}

/// The sequence the call checks
///
/// With no arguments the call is in extension form and the receiver is the
/// left operand of the member access. With one argument it is a static or
/// `using static` call and the receiver is that argument.
fn receiver_of(call: &CallExpr) -> Result<Expr, &'static str> {
    if call.arg_list().is_none() {
        return Err("missing argument list");
    }

    let args = call.args();
    let receiver = match args.as_slice() {
        [] => {
            let access = call
                .member_access()
                .ok_or("no receiver before the method name")?;
            if access.is_conditional() {
                return Err("receiver is accessed with `?.`");
            }
            let receiver = access.receiver().ok_or("missing receiver")?;
            if in_conditional_chain(&receiver) {
                return Err("receiver is part of a `?.` chain");
            }
            receiver
        }
        [arg] => {
            if arg.has_modifier() {
                return Err("argument is passed by reference");
            }
            arg.expr().ok_or("missing argument")?
        }
        _ => return Err("more than one argument"),
    };

    if receiver.span().is_empty() {
        return Err("empty receiver");
    }
    if receiver
        .syntax()
        .descendants()
        .any(|node| node.kind() == CsSyntaxKind::Error)
    {
        return Err("receiver does not parse");
    }
    if receiver.kind() == CsSyntaxKind::BaseExpr {
        return Err("`base` is not a value");
    }
    Ok(receiver)
}

/// Whether `expr` continues a `?.` or `?[` chain
///
/// `a?.b.IsNullOrEmpty()` yields null when `a` is null, which the rewritten
/// form cannot reproduce.
fn in_conditional_chain(expr: &Expr) -> bool {
    let mut current = Some(expr.clone());
    while let Some(expr) = current {
        current = match expr.kind() {
            CsSyntaxKind::MemberAccessExpr => {
                if expr
                    .as_member_access()
                    .is_some_and(|access| access.is_conditional())
                {
                    return true;
                }
                expr.children().into_iter().next()
            }
            CsSyntaxKind::ElementAccessExpr => {
                let conditional = expr
                    .syntax()
                    .children_with_tokens()
                    .filter_map(|element| element.into_token())
                    .any(|token| token.kind() == CsSyntaxKind::Question);
                if conditional {
                    return true;
                }
                expr.children().into_iter().next()
            }
            CsSyntaxKind::CallExpr | CsSyntaxKind::PostfixExpr => {
                expr.children().into_iter().next()
            }
            _ => None,
        };
    }
    false
}

/// Whether the replacement must be parenthesized where the call stands
fn needs_parens(call: &CallExpr) -> bool {
    use CsSyntaxKind as K;

    let Some(parent) = call.syntax().parent() else {
        return false;
    };
    match parent.kind() {
        K::ExprStmt
        | K::ReturnStmt
        | K::YieldStmt
        | K::ThrowStmt
        | K::IfStmt
        | K::WhileStmt
        | K::DoStmt
        | K::ForStmt
        | K::SwitchStmt
        | K::LockStmt
        | K::UsingStmt
        | K::Arg
        | K::VariableDeclarator
        | K::ExprBody
        | K::ParenExpr
        | K::TupleExpr
        | K::LambdaExpr
        | K::InitializerExpr
        | K::CollectionExpr
        | K::Interpolation => false,
        // Right-hand side only; assignment binds loosest
        K::AssignExpr => parent
            .children()
            .next()
            .is_some_and(|target| &target == call.syntax()),
        K::BinaryExpr => operator_kind(&parent) != Some(K::PipePipe),
        _ => true,
    }
}

/// First significant direct token of a binary expression
fn operator_kind(node: &CsSyntaxNode) -> Option<CsSyntaxKind> {
    node.children_with_tokens()
        .filter_map(|element| element.into_token())
        .map(|token| token.kind())
        .find(|kind| !kind.is_trivia())
}

fn insert_using(unit: &SourceUnit, namespace: &str) -> (SourceUnit, Option<TextEdit>) {
    let Some(compilation_unit) = unit.compilation_unit() else {
        return (unit.clone(), None);
    };
    let usings: Vec<_> = compilation_unit.usings().collect();
    let imported = usings.iter().any(|using| {
        using.is_namespace_import()
            && using
                .qualified_name()
                .is_some_and(|name| name.trim_start_matches("global::") == namespace)
    });
    if imported {
        return (unit.clone(), None);
    }

    let text = unit.text();
    let newline = preferred_newline(&text);
    let (index, offset, directive) = match usings.last() {
        Some(last) => {
            let last_leading = leading_trivia(last.syntax());
            let indent = indentation(&last_leading);
            let directive = match line_break(&trailing_trivia(last.syntax())) {
                Some(line_break) => make::using_directive(indent, namespace, line_break),
                None => make::using_directive(&format!("{newline}{indent}"), namespace, ""),
            };
            let offset = u32::from(last.full_range().end()) as usize;
            (last.syntax().index() + 1, offset, directive)
        }
        None => {
            let leading = leading_trivia(compilation_unit.syntax());
            let separator = if text.is_empty() || leading.starts_with(['\r', '\n']) {
                newline.to_string()
            } else {
                format!("{newline}{newline}")
            };
            (0, 0, make::using_directive("", namespace, &separator))
        }
    };

    let edit = TextEdit {
        offset,
        deleted: 0,
        inserted: u32::from(directive.text_len()) as usize,
    };
    let green = unit
        .green()
        .insert_child(index, NodeOrToken::Node(directive));
    tracing::debug!("Added `using {namespace};`");
    (unit.with_green(green), Some(edit))
}

/// Whitespace that starts the directive's own line
fn indentation(leading: &str) -> &str {
    let line = leading.rsplit('\n').next().unwrap_or(leading);
    if line.chars().all(|c| c == ' ' || c == '\t') {
        line
    } else {
        ""
    }
}

fn line_break(trailing: &str) -> Option<&'static str> {
    if trailing.ends_with("\r\n") {
        Some("\r\n")
    } else if trailing.ends_with('\n') {
        Some("\n")
    } else {
        None
    }
}

fn preferred_newline(text: &str) -> &'static str {
    if text.contains("\r\n") { "\r\n" } else { "\n" }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span_of(source: &str, needle: &str) -> TextSpan {
        let start = source.find(needle).unwrap();
        TextSpan::new(start, start + needle.len())
    }

    fn fix(source: &str, needle: &str) -> String {
        let unit = SourceUnit::parse(source);
        apply_fix(&unit, span_of(source, needle)).unwrap().text()
    }

    #[test]
    fn test_extension_form() {
        let source = "using System;\nclass A { bool M(int[] xs) => xs.IsNullOrEmpty(); }\n";
        assert_eq!(
            fix(source, "xs.IsNullOrEmpty()"),
            "using System;\nusing System.Linq;\nclass A { bool M(int[] xs) => xs is null || xs.Any() is false; }\n"
        );
    }

    #[test]
    fn test_if_condition() {
        let source = "class A { void M(List<int> myEnumerable) { if (myEnumerable.IsNullOrEmpty()) { } } }";
        assert_eq!(
            fix(source, "myEnumerable.IsNullOrEmpty()"),
            "using System.Linq;\n\nclass A { void M(List<int> myEnumerable) { if (myEnumerable is null || myEnumerable.Any() is false) { } } }"
        );
    }

    #[test]
    fn test_statement_heads_need_no_parentheses() {
        let cases = [
            (
                "class A { void M(int[] xs) { switch (xs.IsNullOrEmpty()) { default: break; } } }",
                "switch (xs is null || xs.Any() is false)",
            ),
            (
                "class A { void M(int[] xs) { lock (xs.IsNullOrEmpty()) { } } }",
                "lock (xs is null || xs.Any() is false)",
            ),
            (
                "class A { void M(int[] xs) { using (xs.IsNullOrEmpty()) { } } }",
                "using (xs is null || xs.Any() is false)",
            ),
        ];

        for (source, expected) in cases {
            let fixed = fix(source, "xs.IsNullOrEmpty()");
            assert!(fixed.contains(expected), "{fixed}");
        }
    }

    #[test]
    fn test_static_and_bare_forms_use_the_argument() {
        let source = "using System.Linq;\nclass A { void M() { var a = CollectionUtilities.IsNullOrEmpty(items); var b = IsNullOrEmpty(other); } }";

        let once = fix(source, "CollectionUtilities.IsNullOrEmpty(items)");
        assert!(once.contains("var a = items is null || items.Any() is false;"));

        let twice = fix(&once, "IsNullOrEmpty(other)");
        assert!(twice.contains("var b = other is null || other.Any() is false;"));
        assert_eq!(twice.matches("using System.Linq;").count(), 1);
    }

    #[test]
    fn test_context_parentheses() {
        let source = "class A { bool M(int[] xs, bool f) { return !xs.IsNullOrEmpty() && f; } }";
        let fixed = fix(source, "xs.IsNullOrEmpty()");
        assert!(fixed.contains("return !(xs is null || xs.Any() is false) && f;"));

        let source = "class A { bool M(int[] xs, bool f) { return f || xs.IsNullOrEmpty(); } }";
        let fixed = fix(source, "xs.IsNullOrEmpty()");
        assert!(fixed.contains("return f || xs is null || xs.Any() is false;"));
    }

    #[test]
    fn test_non_primary_receiver_is_parenthesized() {
        let source =
            "class A { bool M(int[] a, int[] b) { return CollectionUtilities.IsNullOrEmpty(a ?? b); } }";
        let unit = SourceUnit::parse(source);
        let options = FixOptions {
            allow_side_effecting_receivers: true,
        };
        let fixed = apply_fix_with(
            &unit,
            span_of(source, "CollectionUtilities.IsNullOrEmpty(a ?? b)"),
            &options,
        )
        .unwrap();

        assert!(
            fixed
                .text()
                .contains("return (a ?? b) is null || (a ?? b).Any() is false;")
        );
    }

    #[test]
    fn test_side_effecting_receiver_is_refused_by_default() {
        let source = "class A { bool M() { return Load().IsNullOrEmpty(); } }";
        let unit = SourceUnit::parse(source);
        let location = span_of(source, "Load().IsNullOrEmpty()");

        let err = apply_fix(&unit, location).unwrap_err();
        assert_eq!(err, FixError::SideEffectingReceiver { span: location });

        let options = FixOptions {
            allow_side_effecting_receivers: true,
        };
        let fixed = apply_fix_with(&unit, location, &options).unwrap();
        assert!(
            fixed
                .text()
                .contains("return Load() is null || Load().Any() is false;")
        );
    }

    #[test]
    fn test_target_not_found() {
        let source = "class A { bool M(int[] xs) => xs.IsNullOrEmpty(); }";
        let unit = SourceUnit::parse(source);

        let cases = [
            span_of(source, "xs.IsNullOrEmpty"),
            span_of(source, "bool"),
            TextSpan::new(500, 510),
            TextSpan::new(20, 10),
        ];
        for location in cases {
            assert_eq!(
                apply_fix(&unit, location).unwrap_err(),
                FixError::TargetNotFound { span: location }
            );
        }
    }

    #[test]
    fn test_other_method_is_not_a_target() {
        let source = "class A { bool M(int[] xs) => xs.Any(); }";
        let unit = SourceUnit::parse(source);
        let location = span_of(source, "xs.Any()");

        assert!(matches!(
            apply_fix(&unit, location),
            Err(FixError::TargetNotFound { .. })
        ));
    }

    #[test]
    fn test_malformed_receivers() {
        let cases = [
            ("class A { bool M(int[] xs) => xs?.IsNullOrEmpty(); }", "xs?.IsNullOrEmpty()"),
            ("class A { bool M(B b) => b?.Items.IsNullOrEmpty(); }", "b?.Items.IsNullOrEmpty()"),
            ("class A { bool M() => IsNullOrEmpty(); }", "IsNullOrEmpty()"),
            ("class A { bool M(int[] a) => CollectionUtilities.IsNullOrEmpty(a, a); }", "CollectionUtilities.IsNullOrEmpty(a, a)"),
            ("class A { bool M(int[] a) => CollectionUtilities.IsNullOrEmpty(ref a); }", "CollectionUtilities.IsNullOrEmpty(ref a)"),
        ];

        for (source, needle) in cases {
            let unit = SourceUnit::parse(source);
            let err = apply_fix(&unit, span_of(source, needle)).unwrap_err();
            assert!(
                matches!(err, FixError::MalformedReceiver { .. }),
                "{needle}: {err:?}"
            );
        }
    }

    #[test]
    fn test_failed_fix_leaves_unit_untouched() {
        let source = "class A { bool M(int[] xs) => xs?.IsNullOrEmpty(); }";
        let unit = SourceUnit::parse(source);
        let _ = apply_fix(&unit, span_of(source, "xs?.IsNullOrEmpty()"));

        assert_eq!(unit.text(), source);
    }

    #[test]
    fn test_ensure_using_is_idempotent() {
        let unit = SourceUnit::parse("using System;\r\n\r\nclass A { }\r\n");
        let once = ensure_using(&unit, "System.Linq");
        let twice = ensure_using(&once, "System.Linq");

        assert_eq!(
            once.text(),
            "using System;\r\nusing System.Linq;\r\n\r\nclass A { }\r\n"
        );
        assert_eq!(twice.text(), once.text());
    }

    #[test]
    fn test_ensure_using_counts_global_but_not_static_or_alias() {
        let global = SourceUnit::parse("global using System.Linq;\nclass A { }");
        assert_eq!(ensure_using(&global, "System.Linq").text(), global.text());

        let source = "using static System.Linq;\nusing L = System.Linq;\nclass A { }";
        let fixed = ensure_using(&SourceUnit::parse(source), "System.Linq").text();
        assert_eq!(
            fixed,
            "using static System.Linq;\nusing L = System.Linq;\nusing System.Linq;\nclass A { }"
        );
    }

    #[test]
    fn test_ensure_using_without_directives() {
        let unit = SourceUnit::parse("class A { }\n");
        assert_eq!(
            ensure_using(&unit, "System.Linq").text(),
            "using System.Linq;\n\nclass A { }\n"
        );

        let unit = SourceUnit::parse("\nnamespace N;\nclass A { }\n");
        assert_eq!(
            ensure_using(&unit, "System.Linq").text(),
            "using System.Linq;\n\nnamespace N;\nclass A { }\n"
        );
    }

    #[test]
    fn test_ensure_using_ignores_namespace_level_usings() {
        let source = "namespace N\n{\n    using System.Linq;\n    class A { }\n}\n";
        let fixed = ensure_using(&SourceUnit::parse(source), "System.Linq").text();
        assert!(fixed.starts_with("using System.Linq;\n\nnamespace N"));
    }

    #[test]
    fn test_ensure_using_copies_indentation() {
        let source = "  using System;  // core\n\nclass A { }";
        let fixed = ensure_using(&SourceUnit::parse(source), "System.Linq").text();
        assert_eq!(
            fixed,
            "  using System;  // core\n  using System.Linq;\n\nclass A { }"
        );
    }

    #[test]
    fn test_text_edit_translation() {
        let edit = TextEdit {
            offset: 10,
            deleted: 5,
            inserted: 8,
        };

        assert_eq!(edit.translate(TextSpan::new(0, 10)), Some(TextSpan::new(0, 10)));
        assert_eq!(edit.translate(TextSpan::new(15, 20)), Some(TextSpan::new(18, 23)));
        assert_eq!(edit.translate(TextSpan::new(5, 30)), Some(TextSpan::new(5, 33)));
        assert_eq!(edit.translate(TextSpan::new(12, 20)), None);

        let insertion = TextEdit {
            offset: 0,
            deleted: 0,
            inserted: 19,
        };
        assert_eq!(
            insertion.translate(TextSpan::new(0, 4)),
            Some(TextSpan::new(19, 23))
        );
    }

    #[test]
    fn test_fix_all_reports_duplicates_and_failures() {
        let source = "class A { void M(int[] a) { var x = a.IsNullOrEmpty(); var y = Load().IsNullOrEmpty(); } }";
        let unit = SourceUnit::parse(source);
        let first = span_of(source, "a.IsNullOrEmpty()");
        let second = span_of(source, "Load().IsNullOrEmpty()");

        let outcome = apply_fix_all(&unit, &[second, first, first]);

        assert_eq!(outcome.applied, vec![first]);
        assert_eq!(outcome.skipped, vec![first]);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].location, second);
        assert!(outcome.changed());
        assert!(!outcome.is_complete());
        assert!(
            outcome
                .unit
                .text()
                .contains("var x = a is null || a.Any() is false;")
        );
    }

    #[test]
    fn test_fix_all_rewrites_nested_calls_inside_out() {
        let source = "class A { bool M(B b) => Wrap(b.Items.IsNullOrEmpty()).IsNullOrEmpty(); }";
        let unit = SourceUnit::parse(source);
        let outer = span_of(source, "Wrap(b.Items.IsNullOrEmpty()).IsNullOrEmpty()");
        let inner = span_of(source, "b.Items.IsNullOrEmpty()");
        let options = FixOptions {
            allow_side_effecting_receivers: true,
        };

        let outcome = apply_fix_all_with(&unit, &[outer, inner], &options);

        assert_eq!(outcome.applied, vec![outer, inner]);
        assert!(outcome.unit.text().contains(
            "Wrap(b.Items is null || b.Items.Any() is false) is null || Wrap(b.Items is null || b.Items.Any() is false).Any() is false"
        ));
    }
}
