//! Host ports
//!
//! Rules never parse or bind code themselves. They consume a [`SourceHost`]
//! for text <-> tree conversion and a [`SymbolResolver`] for call binding.
//! [`CSharpHost`] and [`SemanticModel`](crate::semantic::SemanticModel) are
//! the bundled adapters; tests can substitute closures for the resolver.

use crate::cst::ast::CallExpr;
use crate::semantic::ResolvedSymbol;
use crate::source::SourceUnit;

/// Converts between source text and syntax trees
pub trait SourceHost {
    fn parse(&self, text: &str) -> SourceUnit;
    fn render(&self, unit: &SourceUnit) -> String;
}

/// Binds invocations to the method they call
pub trait SymbolResolver {
    /// The method `call` invokes, or `None` when unresolved or ambiguous
    fn resolve_call(&self, call: &CallExpr) -> Option<ResolvedSymbol>;
}

impl<F> SymbolResolver for F
where
    F: Fn(&CallExpr) -> Option<ResolvedSymbol>,
{
    fn resolve_call(&self, call: &CallExpr) -> Option<ResolvedSymbol> {
        self(call)
    }
}

/// Lossless C# front end
#[derive(Debug, Clone, Copy, Default)]
pub struct CSharpHost;

impl SourceHost for CSharpHost {
    fn parse(&self, text: &str) -> SourceUnit {
        SourceUnit::parse(text)
    }

    fn render(&self, unit: &SourceUnit) -> String {
        unit.text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cst::ast::AstNode;

    #[test]
    fn test_host_round_trip() {
        let host = CSharpHost;
        let source = "// header\nusing System;\r\nclass A { void M() { } }";
        let unit = host.parse(source);

        assert_eq!(host.render(&unit), source);
    }

    #[test]
    fn test_closure_resolver() {
        let unit = CSharpHost.parse("class A { void M() { xs.Go(); } }");
        let call = unit
            .syntax()
            .descendants()
            .find_map(CallExpr::cast)
            .unwrap();

        let resolver = |call: &CallExpr| {
            call.method_name()
                .map(|name| ResolvedSymbol::new("Demo.Helpers", name))
        };
        let symbol = resolver.resolve_call(&call).unwrap();

        assert_eq!(symbol.containing_type, "Demo.Helpers");
        assert_eq!(symbol.method_name, "Go");
    }
}
