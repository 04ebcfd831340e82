//! Library declarations loaded from a config file drive symbol resolution

use linqguard_core::cst::ast::{AstNode, CallExpr};
use linqguard_core::{ConfigLoader, SemanticModel, SourceUnit, SymbolResolver};
use std::fs;
use tempfile::TempDir;

const CONFIG: &str = r#"
[files]
include = ["src/**/*.cs"]
exclude = []

[fix]
allow_side_effecting_receivers = true

[[catalog.types]]
namespace = "Acme.Collections"
name = "Guards"

[[catalog.types.methods]]
name = "IsBlank"
parameters = ["IEnumerable<T>"]
extension = true
"#;

const SOURCE: &str = r#"using System.Collections.Generic;
using Acme.Collections;

class Consumer
{
    bool M(List<int> xs) => xs.IsBlank();
}
"#;

fn resolved(unit: &SourceUnit, model: &SemanticModel) -> Option<String> {
    let call = unit
        .syntax()
        .descendants()
        .find_map(CallExpr::cast)?;
    model.resolve_call(&call).map(|symbol| symbol.to_string())
}

#[test]
fn test_configured_extension_resolves() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("linqguard.toml"), CONFIG).unwrap();
    fs::create_dir_all(dir.path().join("src/deep")).unwrap();

    let config = ConfigLoader::load(None, Some(&dir.path().join("src/deep"))).unwrap();
    assert!(config.fix.allow_side_effecting_receivers);
    assert!(config.validate().is_ok());

    let unit = SourceUnit::parse(SOURCE);
    let model = SemanticModel::build(&unit, &config.library_catalog());
    assert_eq!(
        resolved(&unit, &model).as_deref(),
        Some("Acme.Collections.Guards.IsBlank")
    );
}

#[test]
fn test_default_config_does_not_know_the_extension() {
    let dir = TempDir::new().unwrap();

    let config = ConfigLoader::load(None, Some(dir.path())).unwrap();
    let unit = SourceUnit::parse(SOURCE);
    let model = SemanticModel::build(&unit, &config.library_catalog());

    assert_eq!(resolved(&unit, &model), None);
}

#[test]
fn test_configured_patterns_are_relative() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("linqguard.toml");
    fs::write(&path, CONFIG).unwrap();

    let config = ConfigLoader::load(Some(&path), None).unwrap();
    let matcher = config.files.matcher().unwrap();

    assert!(matcher.is_match(std::path::Path::new("src/App/Program.cs")));
    assert!(!matcher.is_match(std::path::Path::new("tests/AppTests.cs")));
}
