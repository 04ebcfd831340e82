//! Detection of `CollectionUtilities.IsNullOrEmpty` calls

use std::path::Path;

use linqguard_core::cst::ast::{AstNode, CallExpr};
use linqguard_core::{
    Applicability, CodeSuggestion, Diagnostic, Severity, SourceUnit, SymbolResolver, TextSpan,
};

use super::rewriter::RewritePlan;
use super::symbol::is_target;
use super::{CATEGORY, DIAGNOSTIC_ID, EQUIVALENCE_KEY, FIX_TITLE, MESSAGE, TITLE};

/// Diagnostics for every call that resolves to the disallowed method
///
/// Calls are visited in pre-order, so outer calls are reported before the
/// calls nested in their arguments. Calls the resolver cannot bind are
/// skipped. Each call to this function walks the tree afresh.
pub fn find_violations<'a, R>(
    unit: &'a SourceUnit,
    resolver: &'a R,
) -> impl Iterator<Item = Diagnostic> + 'a
where
    R: SymbolResolver + ?Sized,
{
    let calls: Vec<CallExpr> = unit
        .syntax()
        .descendants()
        .filter_map(CallExpr::cast)
        .collect();
    let file = unit.path();

    calls.into_iter().filter_map(move |call| {
        let symbol = resolver.resolve_call(&call)?;
        if !is_target(&symbol) {
            return None;
        }
        Some(report(&call, file))
    })
}

fn report(call: &CallExpr, file: Option<&Path>) -> Diagnostic {
    let location = TextSpan::from(call.span());
    tracing::trace!("{DIAGNOSTIC_ID} at {location}");

    let diagnostic = Diagnostic::new(DIAGNOSTIC_ID, Severity::Warning, MESSAGE, location)
        .with_title(TITLE)
        .with_category(CATEGORY)
        .with_file(file.map(Path::to_path_buf));

    match RewritePlan::for_call(call) {
        Ok(plan) => {
            let applicability = if plan.receiver_is_safe() {
                Applicability::Always
            } else {
                Applicability::MaybeIncorrect
            };
            diagnostic.with_suggestion(CodeSuggestion::new(
                FIX_TITLE,
                EQUIVALENCE_KEY,
                plan.preview(),
                location,
                applicability,
            ))
        }
        Err(error) => {
            tracing::trace!("No fix offered: {error}");
            diagnostic
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::is_null_or_empty::{TARGET_METHOD, TARGET_TYPE};
    use linqguard_core::{LibraryCatalog, LineIndex, ResolvedSymbol, SemanticModel};

    const FIXTURE: &str = r#"
using System.Collections.Generic;
using Microsoft.IdentityModel.Tokens;

public class Examples
{
    public void Example1() {
        IEnumerable<int> myEnumerable = new[] { 1, 2, 3, 4};
        if (myEnumerable.IsNullOrEmpty())
        {
            // do something
        }
    }
}
"#;

    fn check(source: &str) -> Vec<Diagnostic> {
        let unit = SourceUnit::parse(source);
        let model = SemanticModel::build(&unit, &LibraryCatalog::default());
        find_violations(&unit, &model).collect()
    }

    #[test]
    fn test_reports_fixture_call() {
        let diagnostics = check(FIXTURE);
        assert_eq!(diagnostics.len(), 1);

        let diagnostic = &diagnostics[0];
        assert_eq!(diagnostic.rule_id, "DIAG0001");
        assert_eq!(diagnostic.severity, Severity::Warning);
        assert_eq!(diagnostic.message, MESSAGE);
        assert_eq!(diagnostic.category, "Usage");

        let location = diagnostic.location;
        assert_eq!(
            &FIXTURE[location.start..location.end],
            "myEnumerable.IsNullOrEmpty()"
        );
        let position = LineIndex::new(FIXTURE).line_col(location.start);
        assert_eq!((position.line, position.column), (9, 13));
    }

    #[test]
    fn test_suggestion_preview() {
        let diagnostics = check(FIXTURE);
        let suggestion = &diagnostics[0].suggestions[0];

        assert_eq!(suggestion.message, FIX_TITLE);
        assert_eq!(suggestion.equivalence_key, EQUIVALENCE_KEY);
        assert_eq!(
            suggestion.replacement,
            "myEnumerable is null || myEnumerable.Any() is false"
        );
        assert!(suggestion.is_safe());
    }

    #[test]
    fn test_side_effecting_receiver_gets_unsafe_fix() {
        let source = r#"
using System.Collections.Generic;
using Microsoft.IdentityModel.Tokens;

class A
{
    IEnumerable<int> Load() => null;
    bool M() => Load().IsNullOrEmpty();
}
"#;
        let diagnostics = check(source);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].suggestions[0].applicability,
            Applicability::MaybeIncorrect
        );
    }

    #[test]
    fn test_conditional_receiver_is_reported_without_fix() {
        let source = r#"
using System.Collections.Generic;
using Microsoft.IdentityModel.Tokens;

class A
{
    bool M(List<int> items) => items?.IsNullOrEmpty() ?? true;
}
"#;
        let diagnostics = check(source);
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].suggestions.is_empty());
    }

    #[test]
    fn test_fake_resolver_drives_detection() {
        let source = "class A { void M() { a.IsNullOrEmpty(); b.IsNullOrEmpty(); } }";
        let unit = SourceUnit::parse(source);
        let resolver = |call: &CallExpr| {
            let access = call.member_access()?;
            let receiver = access.receiver()?.as_identifier()?;
            (receiver == "b").then(|| ResolvedSymbol::new(TARGET_TYPE, TARGET_METHOD))
        };

        let diagnostics: Vec<_> = find_violations(&unit, &resolver).collect();
        assert_eq!(diagnostics.len(), 1);
        let location = diagnostics[0].location;
        assert_eq!(&source[location.start..location.end], "b.IsNullOrEmpty()");
    }

    #[test]
    fn test_preorder_and_restartable() {
        let source = "class A { void M() { Outer(x.IsNullOrEmpty()).IsNullOrEmpty(); } }";
        let unit = SourceUnit::parse(source);
        let resolver = |call: &CallExpr| {
            (call.method_name()? == "IsNullOrEmpty")
                .then(|| ResolvedSymbol::new(TARGET_TYPE, TARGET_METHOD))
        };

        let starts: Vec<_> = find_violations(&unit, &resolver)
            .map(|d| d.location.start)
            .collect();
        assert_eq!(starts.len(), 2);
        assert!(starts[0] < starts[1]);
        assert_eq!(find_violations(&unit, &resolver).count(), 2);
    }

    #[test]
    fn test_file_path_is_attached() {
        let unit = SourceUnit::parse("class A { void M() { a.IsNullOrEmpty(); } }")
            .with_path("src/A.cs");
        let resolver = |_: &CallExpr| Some(ResolvedSymbol::new(TARGET_TYPE, TARGET_METHOD));

        let diagnostic = find_violations(&unit, &resolver).next().unwrap();
        assert_eq!(diagnostic.file.as_deref(), Some(Path::new("src/A.cs")));
    }
}
