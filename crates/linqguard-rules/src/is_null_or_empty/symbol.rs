//! Recognition of the disallowed method

use linqguard_core::ResolvedSymbol;

/// Fully qualified type declaring the disallowed method
pub const TARGET_TYPE: &str = "Microsoft.IdentityModel.Tokens.CollectionUtilities";
pub const TARGET_METHOD: &str = "IsNullOrEmpty";

/// Whether a resolved call targets `CollectionUtilities.IsNullOrEmpty`
///
/// Exact and case-sensitive on both parts.
pub fn is_target(symbol: &ResolvedSymbol) -> bool {
    symbol.is(TARGET_TYPE, TARGET_METHOD)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        assert!(is_target(&ResolvedSymbol::new(TARGET_TYPE, TARGET_METHOD)));
    }

    #[test]
    fn test_near_misses() {
        let misses = [
            ResolvedSymbol::new("System.String", "IsNullOrEmpty"),
            ResolvedSymbol::new("Acme.CollectionUtilities", "IsNullOrEmpty"),
            ResolvedSymbol::new(TARGET_TYPE, "isNullOrEmpty"),
            ResolvedSymbol::new("microsoft.identitymodel.tokens.collectionutilities", TARGET_METHOD),
            ResolvedSymbol::new(TARGET_TYPE, "IsNullOrWhiteSpace"),
        ];
        for symbol in &misses {
            assert!(!is_target(symbol), "{symbol} should not match");
        }
    }
}
