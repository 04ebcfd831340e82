//! linqguard rules
//!
//! Detection and rewrite for `DIAG0001`: calls to the
//! `Microsoft.IdentityModel.Tokens.CollectionUtilities.IsNullOrEmpty`
//! extension are reported and replaced with
//! `x is null || x.Any() is false`.

use linqguard_core::Severity;
use serde::Serialize;

pub mod is_null_or_empty;

// Re-export commonly used types
pub use is_null_or_empty::{
    FixAllOutcome, FixError, FixFailure, FixOptions, TextEdit, apply_fix, apply_fix_all,
    apply_fix_all_with, apply_fix_with, ensure_using, find_violations, is_target,
};

/// Static description of a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RuleMetadata {
    /// Diagnostic identifier, e.g. `DIAG0001`
    pub id: &'static str,
    pub title: &'static str,
    /// Message attached to every diagnostic
    pub message: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    /// Title of the code fix
    pub fix_title: &'static str,
    /// Key shared by all fixes of the rule
    pub equivalence_key: &'static str,
}

/// Every rule shipped with linqguard
pub fn builtin_rules() -> Vec<RuleMetadata> {
    vec![is_null_or_empty::METADATA]
}
