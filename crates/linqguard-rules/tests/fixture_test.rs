//! End-to-end detection and fixing of the DIAG0001 fixtures

use linqguard_core::{LibraryCatalog, LineIndex, SemanticModel, Severity, SourceUnit};
use linqguard_rules::is_null_or_empty::{DIAGNOSTIC_ID, MESSAGE};
use linqguard_rules::{apply_fix, apply_fix_all, find_violations};

const ANALYZER_FIXTURE: &str = r#"
using System.Collections.Generic;
using Microsoft.IdentityModel.Tokens;

public class Examples
{
    public void Example1() {
        IEnumerable<int> myEnumerable = new[] { 1, 2, 3, 4};
        myEnumerable.IsNullOrEmpty();
    }
}
"#;

const FIX_FIXTURE: &str = r#"
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

const FIX_EXPECTED: &str = r#"
using System.Collections.Generic;
using Microsoft.IdentityModel.Tokens;
using System.Linq;

public class Examples
{
    public void Example1() {
        IEnumerable<int> myEnumerable = new[] { 1, 2, 3, 4};
        if (myEnumerable is null || myEnumerable.Any() is false)
        {
            // do something
        }
    }
}
"#;

fn positions(source: &str) -> Vec<(usize, usize)> {
    let unit = SourceUnit::parse(source);
    let model = SemanticModel::build(&unit, &LibraryCatalog::default());
    let index = LineIndex::new(source);
    find_violations(&unit, &model)
        .map(|d| {
            let position = index.line_col(d.location.start);
            (position.line, position.column)
        })
        .collect()
}

fn fix_everything(source: &str) -> String {
    let unit = SourceUnit::parse(source);
    let model = SemanticModel::build(&unit, &LibraryCatalog::default());
    let locations: Vec<_> = find_violations(&unit, &model)
        .map(|d| d.location)
        .collect();
    let outcome = apply_fix_all(&unit, &locations);
    assert!(outcome.is_complete(), "{:?}", outcome.failures);
    outcome.unit.text()
}

#[test]
fn test_analyzer_fixture_location() {
    assert_eq!(positions(ANALYZER_FIXTURE), vec![(9, 9)]);
}

#[test]
fn test_fix_fixture_location() {
    assert_eq!(positions(FIX_FIXTURE), vec![(9, 13)]);
}

#[test]
fn test_fix_fixture_output_is_exact() {
    let unit = SourceUnit::parse(FIX_FIXTURE);
    let model = SemanticModel::build(&unit, &LibraryCatalog::default());
    let diagnostics: Vec<_> = find_violations(&unit, &model).collect();

    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].rule_id, DIAGNOSTIC_ID);
    assert_eq!(diagnostics[0].severity, Severity::Warning);
    assert_eq!(diagnostics[0].message, MESSAGE);

    let fixed = apply_fix(&unit, diagnostics[0].location).unwrap();
    assert_eq!(fixed.text(), FIX_EXPECTED);
}

#[test]
fn test_fixed_output_has_no_violations() {
    let fixed = fix_everything(FIX_FIXTURE);
    assert!(positions(&fixed).is_empty());
}

#[test]
fn test_crlf_fixture_keeps_line_endings() {
    let source = FIX_FIXTURE.replace('\n', "\r\n");
    let expected = FIX_EXPECTED.replace('\n', "\r\n");

    assert_eq!(fix_everything(&source), expected);
}

#[test]
fn test_sample_files() {
    let class_a = r#"using System.Collections.Generic;
using Microsoft.IdentityModel.Tokens;

namespace CodeFixDemo.Sample;

public class ClassA
{
    public void DoSomething()
    {
        IEnumerable<int> myEnumerable = [1, 2, 3, 4];
        if (myEnumerable.IsNullOrEmpty())
        {
            // code
        }
    }
}"#;
    let class_b = r#"using System.Collections.Generic;
using Microsoft.IdentityModel.Tokens;

namespace CodeFixDemo.Sample;

public class ClassB
{
    public bool SomeBooleanMethod(IEnumerable<int> myEnumerable)
    {
        return myEnumerable.IsNullOrEmpty();
    }
}"#;

    assert_eq!(positions(class_a), vec![(11, 13)]);
    assert_eq!(positions(class_b), vec![(10, 16)]);

    let fixed_b = fix_everything(class_b);
    assert!(fixed_b.starts_with(
        "using System.Collections.Generic;\nusing Microsoft.IdentityModel.Tokens;\nusing System.Linq;\n\nnamespace"
    ));
    assert!(fixed_b.contains("return myEnumerable is null || myEnumerable.Any() is false;"));
}

#[test]
fn test_every_call_form_is_recognized() {
    let source = r#"
using System.Collections.Generic;
using Microsoft.IdentityModel.Tokens;
using static Microsoft.IdentityModel.Tokens.CollectionUtilities;
using Utils = Microsoft.IdentityModel.Tokens.CollectionUtilities;

class A
{
    bool M(List<string> names)
    {
        var a = names.IsNullOrEmpty();
        var b = CollectionUtilities.IsNullOrEmpty(names);
        var c = Microsoft.IdentityModel.Tokens.CollectionUtilities.IsNullOrEmpty(names);
        var d = IsNullOrEmpty(names);
        var e = Utils.IsNullOrEmpty(names);
        return a && b && c && d && e;
    }
}
"#;
    assert_eq!(positions(source).len(), 5);

    let fixed = fix_everything(source);
    assert_eq!(
        fixed.matches("names is null || names.Any() is false").count(),
        5
    );
    assert_eq!(fixed.matches("using System.Linq;").count(), 1);
}

#[test]
fn test_calls_inside_interpolated_strings() {
    let source = r#"using System.Collections.Generic;
using Microsoft.IdentityModel.Tokens;

class A
{
    string M(List<int> xs) => $"{xs.IsNullOrEmpty()}";
    string N(List<int> xs) => $@"empty: {xs.IsNullOrEmpty(),-5} ""{xs.Count:D2}""";
}
"#;
    assert_eq!(positions(source), vec![(6, 34), (7, 42)]);

    let fixed = fix_everything(source);
    assert!(fixed.contains(r#"$"{xs is null || xs.Any() is false}";"#));
    assert!(fixed.contains(
        r#"$@"empty: {xs is null || xs.Any() is false,-5} ""{xs.Count:D2}""";"#
    ));
    assert!(positions(&fixed).is_empty());
}

#[test]
fn test_false_positive_guards() {
    // Same-named extension in the user's own namespace
    let own_extension = r#"
using System.Collections.Generic;

namespace Acme
{
    static class Guards
    {
        public static bool IsNullOrEmpty<T>(this IEnumerable<T> source) => source == null;
    }

    class A
    {
        bool M(List<int> xs) => xs.IsNullOrEmpty();
    }
}
"#;
    assert!(positions(own_extension).is_empty());

    // Instance method of the same name wins over the extension
    let instance = r#"
using Microsoft.IdentityModel.Tokens;

class Bag
{
    public bool IsNullOrEmpty() => true;
}

class A
{
    bool M(Bag bag) => bag.IsNullOrEmpty();
}
"#;
    assert!(positions(instance).is_empty());

    // string.IsNullOrEmpty is a different method
    let string_check = r#"
using System;
using Microsoft.IdentityModel.Tokens;

class A
{
    bool M(string s) => string.IsNullOrEmpty(s) || String.IsNullOrEmpty(s);
}
"#;
    assert!(positions(string_check).is_empty());

    // Without the import the call does not resolve
    let unresolved = r#"
using System.Collections.Generic;

class A
{
    bool M(List<int> xs) => xs.IsNullOrEmpty();
}
"#;
    assert!(positions(unresolved).is_empty());
}

#[test]
fn test_ambiguous_extension_is_not_reported() {
    let source = r#"
using System.Collections.Generic;
using Microsoft.IdentityModel.Tokens;
using Acme;

namespace Acme
{
    static class Guards
    {
        public static bool IsNullOrEmpty<T>(this IEnumerable<T> source) => source == null;
    }
}

class A
{
    bool M(List<int> xs) => xs.IsNullOrEmpty();
}
"#;
    assert!(positions(source).is_empty());
}

#[test]
fn test_other_library_extension_is_not_reported() {
    use linqguard_core::{LibraryMethod, LibraryType};

    let source = r#"
using System.Collections.Generic;
using Acme.Collections;

class A
{
    bool M(List<int> xs) => xs.IsNullOrEmpty();
}
"#;
    let catalog = LibraryCatalog::default().with_type(
        LibraryType::new("Acme.Collections", "Guards")
            .with_method(LibraryMethod::extension("IsNullOrEmpty", &["IEnumerable<T>"])),
    );
    let unit = SourceUnit::parse(source);
    let model = SemanticModel::build(&unit, &catalog);

    assert_eq!(find_violations(&unit, &model).count(), 0);
}
