//! Parsed source units
//!
//! A [`SourceUnit`] owns an immutable green tree. Red trees are built on
//! demand with [`SourceUnit::syntax`]; edits produce a new unit that shares
//! every untouched subtree with the old one.

use rowan::GreenNode;
use std::path::{Path, PathBuf};

use crate::cst::ast::{AstNode, CompilationUnit};
use crate::cst::{CsSyntaxNode, LexerError, parse_csharp};

/// An immutable parsed C# file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    green: GreenNode,
    errors: Vec<LexerError>,
    path: Option<PathBuf>,
}

impl SourceUnit {
    /// Parse `text` into a unit
    pub fn parse(text: &str) -> Self {
        let (cst, errors) = parse_csharp(text);
        if !errors.is_empty() {
            tracing::debug!("Parsed with {} syntax errors", errors.len());
        }
        Self {
            green: cst.green().into_owned(),
            errors,
            path: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Unit sharing this unit's path and parse errors with a new tree
    pub fn with_green(&self, green: GreenNode) -> Self {
        Self {
            green,
            errors: self.errors.clone(),
            path: self.path.clone(),
        }
    }

    /// Fresh red tree rooted at the compilation unit
    pub fn syntax(&self) -> CsSyntaxNode {
        CsSyntaxNode::new_root(self.green.clone())
    }

    pub fn compilation_unit(&self) -> Option<CompilationUnit> {
        CompilationUnit::cast(self.syntax())
    }

    pub fn green(&self) -> &GreenNode {
        &self.green
    }

    /// Full source text
    pub fn text(&self) -> String {
        self.syntax().text().to_string()
    }

    /// Diagnostics from the parse that produced the original tree
    pub fn errors(&self) -> &[LexerError] {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}
