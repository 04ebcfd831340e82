//! Rowan language implementation for C#
//!
//! Connects [`CsSyntaxKind`] to Rowan's generic CST infrastructure.

use rowan::Language;

use super::CsSyntaxKind;

/// Language implementation for the C# subset
///
/// Zero-sized marker that parameterizes the rowan tree types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CSharpLanguage;

impl Language for CSharpLanguage {
    type Kind = CsSyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        CsSyntaxKind::ALL
            .get(raw.0 as usize)
            .copied()
            .unwrap_or(CsSyntaxKind::Error)
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        rowan::SyntaxKind(kind as u16)
    }
}

/// A node in the C# concrete syntax tree
pub type CsSyntaxNode = rowan::SyntaxNode<CSharpLanguage>;

/// A token (leaf) in the C# concrete syntax tree
pub type CsSyntaxToken = rowan::SyntaxToken<CSharpLanguage>;

/// Either a node or a token
pub type CsSyntaxElement = rowan::SyntaxElement<CSharpLanguage>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_roundtrip() {
        let kinds = [
            CsSyntaxKind::Whitespace,
            CsSyntaxKind::UsingKw,
            CsSyntaxKind::Ident,
            CsSyntaxKind::FatArrow,
            CsSyntaxKind::CallExpr,
            CsSyntaxKind::Error,
        ];

        for &kind in &kinds {
            let raw = CSharpLanguage::kind_to_raw(kind);
            let back = CSharpLanguage::kind_from_raw(raw);
            assert_eq!(kind, back, "Roundtrip failed for {kind:?}");
        }
    }

    #[test]
    fn test_unknown_raw_kind_maps_to_error() {
        let back = CSharpLanguage::kind_from_raw(rowan::SyntaxKind(u16::MAX));
        assert_eq!(back, CsSyntaxKind::Error);
    }
}
