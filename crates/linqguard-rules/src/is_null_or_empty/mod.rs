//! `DIAG0001`: falsely exposed `CollectionUtilities.IsNullOrEmpty`
//!
//! `Microsoft.IdentityModel.Tokens` ships a public `IsNullOrEmpty` extension
//! on `IEnumerable<T>` that is not meant for consumers. Every call resolved to
//! it is reported, and the fix replaces the call with plain C#:
//!
//! ```text
//! if (items.IsNullOrEmpty())                       // before
//! if (items is null || items.Any() is false)       // after, plus `using System.Linq;`
//! ```

mod detector;
mod rewriter;
mod symbol;

use linqguard_core::Severity;

use crate::RuleMetadata;

pub use detector::find_violations;
pub use rewriter::{
    FixAllOutcome, FixError, FixFailure, FixOptions, TextEdit, apply_fix, apply_fix_all,
    apply_fix_all_with, apply_fix_with, ensure_using,
};
pub use symbol::{TARGET_METHOD, TARGET_TYPE, is_target};

pub const DIAGNOSTIC_ID: &str = "DIAG0001";
pub const TITLE: &str =
    "Use custom IsNullOrEmpty instead of falsely exposed CollectionUtilities extension method";
pub const MESSAGE: &str =
    "Replace usage of Microsoft.IdentityModel.Tokens.CollectionUtilities.IsNullOrEmpty()";
pub const CATEGORY: &str = "Usage";
pub const FIX_TITLE: &str = "Replace with is null || .Any() is false";
pub const EQUIVALENCE_KEY: &str = "ReplaceWithIsNullOrAny";

/// Namespace the replacement's `Any()` comes from
pub const LINQ_NAMESPACE: &str = "System.Linq";

pub const METADATA: RuleMetadata = RuleMetadata {
    id: DIAGNOSTIC_ID,
    title: TITLE,
    message: MESSAGE,
    category: CATEGORY,
    severity: Severity::Warning,
    fix_title: FIX_TITLE,
    equivalence_key: EQUIVALENCE_KEY,
};
