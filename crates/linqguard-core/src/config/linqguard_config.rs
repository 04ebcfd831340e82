//! Configuration types for linqguard

use glob::{MatchOptions, Pattern};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::LinqGuardError;
use crate::result::Result;
use crate::semantic::{LibraryCatalog, LibraryType};

/// Main linqguard configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LinqGuardConfig {
    /// File pattern configuration
    pub files: FilesConfig,

    /// Autofix behaviour
    pub fix: FixConfig,

    /// Library types known in addition to the built-in catalog
    pub catalog: CatalogConfig,
}

impl LinqGuardConfig {
    /// Built-in catalog extended with the configured types
    pub fn library_catalog(&self) -> LibraryCatalog {
        let mut catalog = LibraryCatalog::default();
        for ty in &self.catalog.types {
            catalog.add_type(ty.clone());
        }
        catalog
    }

    /// Check the configuration for values that cannot be used
    pub fn validate(&self) -> Result<()> {
        self.files.matcher()?;
        for ty in &self.catalog.types {
            if ty.name.trim().is_empty() {
                return Err(LinqGuardError::config_error(
                    "catalog type with an empty name",
                ));
            }
            if ty.methods.iter().any(|m| m.name.trim().is_empty()) {
                return Err(LinqGuardError::config_error(format!(
                    "catalog type '{}' has a method with an empty name",
                    ty.full_name()
                )));
            }
            if let Some(method) = ty
                .methods
                .iter()
                .find(|m| m.extension && m.parameters.is_empty())
            {
                return Err(LinqGuardError::config_error(format!(
                    "extension method '{}.{}' declares no `this` parameter",
                    ty.full_name(),
                    method.name
                )));
            }
        }
        Ok(())
    }
}

/// File inclusion/exclusion patterns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilesConfig {
    /// Glob patterns for files to check
    pub include: Vec<String>,

    /// Glob patterns for files to skip
    pub exclude: Vec<String>,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            include: vec!["**/*.cs".to_string()],
            exclude: vec!["**/bin/**".to_string(), "**/obj/**".to_string()],
        }
    }
}

impl FilesConfig {
    /// Compile the patterns
    pub fn matcher(&self) -> Result<FileMatcher> {
        Ok(FileMatcher {
            include: compile_patterns(&self.include)?,
            exclude: compile_patterns(&self.exclude)?,
        })
    }
}

fn compile_patterns(patterns: &[String]) -> Result<Vec<Pattern>> {
    patterns
        .iter()
        .map(|pattern| {
            Pattern::new(pattern).map_err(|e| {
                LinqGuardError::config_error(format!("Invalid glob pattern '{pattern}': {e}"))
            })
        })
        .collect()
}

/// Compiled include/exclude patterns
#[derive(Debug, Clone)]
pub struct FileMatcher {
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
}

impl FileMatcher {
    /// Whether a path, relative to the search root, should be processed
    pub fn is_match(&self, path: &Path) -> bool {
        let options = MatchOptions {
            case_sensitive: true,
            require_literal_separator: false,
            require_literal_leading_dot: false,
        };
        let included = self
            .include
            .iter()
            .any(|p| p.matches_path_with(path, options));
        included
            && !self
                .exclude
                .iter()
                .any(|p| p.matches_path_with(path, options))
    }
}

/// Autofix settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FixConfig {
    /// Rewrite receivers that are not plain references, evaluating them
    /// twice
    pub allow_side_effecting_receivers: bool,
}

/// Extra library declarations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogConfig {
    pub types: Vec<LibraryType>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic::LibraryMethod;

    #[test]
    fn test_default_file_patterns() {
        let matcher = FilesConfig::default().matcher().unwrap();

        assert!(matcher.is_match(Path::new("Program.cs")));
        assert!(matcher.is_match(Path::new("src/App/Service.cs")));
        assert!(!matcher.is_match(Path::new("src/App/obj/Debug/Gen.cs")));
        assert!(!matcher.is_match(Path::new("README.md")));
    }

    #[test]
    fn test_invalid_pattern_is_config_error() {
        let files = FilesConfig {
            include: vec!["[".to_string()],
            exclude: Vec::new(),
        };
        let err = files.matcher().unwrap_err();
        assert!(err.to_string().contains("Invalid glob pattern"));
    }

    #[test]
    fn test_library_catalog_extends_defaults() {
        let mut config = LinqGuardConfig::default();
        config.catalog.types.push(
            LibraryType::new("Acme.Collections", "Guards")
                .with_method(LibraryMethod::extension("IsNullOrEmpty", &["IEnumerable<T>"])),
        );

        let catalog = config.library_catalog();
        assert!(catalog.find("Acme.Collections.Guards").is_some());
        assert!(
            catalog
                .find("Microsoft.IdentityModel.Tokens.CollectionUtilities")
                .is_some()
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_extension_without_parameters_is_rejected() {
        let mut config = LinqGuardConfig::default();
        config.catalog.types.push(
            LibraryType::new("Acme", "Broken").with_method(LibraryMethod::extension("Nope", &[])),
        );

        assert!(config.validate().is_err());
    }
}
