//! Semantic layer
//!
//! Binds invocations to the methods they call. [`SemanticModel`] indexes the
//! types declared in a source unit together with a [`LibraryCatalog`] of
//! referenced library types, then resolves calls with C# scoping rules.

mod catalog;
mod model;

pub use catalog::{LibraryCatalog, LibraryMethod, LibraryType};
pub use model::SemanticModel;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a resolved method
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolvedSymbol {
    /// Namespace-qualified containing type, e.g. `System.Linq.Enumerable`
    pub containing_type: String,
    pub method_name: String,
}

impl ResolvedSymbol {
    pub fn new(containing_type: impl Into<String>, method_name: impl Into<String>) -> Self {
        Self {
            containing_type: containing_type.into(),
            method_name: method_name.into(),
        }
    }

    /// Whether this is `method_name` declared on `containing_type`
    pub fn is(&self, containing_type: &str, method_name: &str) -> bool {
        self.containing_type == containing_type && self.method_name == method_name
    }
}

impl fmt::Display for ResolvedSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.containing_type, self.method_name)
    }
}
