//! linqguard core
//!
//! Shared infrastructure for the linqguard C# analyzer: a lossless Rowan
//! syntax tree, a semantic model that binds invocations to the methods they
//! call, diagnostics with fix suggestions, and configuration loading.

pub mod config;
pub mod cst; // Concrete Syntax Tree (lossless, Rowan-based)
pub mod diagnostics;
pub mod error;
pub mod host; // Parse/render and symbol resolution ports
pub mod result;
pub mod semantic;
pub mod source;

// Configuration system
pub use config::{
    CatalogConfig, ConfigLoader, FileMatcher, FilesConfig, FixConfig, LinqGuardConfig,
};
pub use diagnostics::{
    Applicability, CodeSuggestion, Diagnostic, LineCol, LineIndex, Severity, TextSpan,
};
pub use error::{ErrorKind, LinqGuardError};
pub use host::{CSharpHost, SourceHost, SymbolResolver};
pub use result::{Result, ResultExt};
pub use semantic::{LibraryCatalog, LibraryMethod, LibraryType, ResolvedSymbol, SemanticModel};
pub use source::SourceUnit;

/// Initialize the tracing subscriber for logging
///
/// `RUST_LOG` selects the filter, `linqguard=info` when unset.
pub fn init_tracing() {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("linqguard=info"));

    // A subscriber may already be installed by an embedding application
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true),
        )
        .try_init();
}
