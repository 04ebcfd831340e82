//! Typed AST layer over the C# CST
//!
//! Thin wrappers over raw CST nodes. Each wrapper implements `cast()` to
//! convert from a `CsSyntaxNode` when the kind matches, and exposes the
//! children the detector, rewriter and semantic model need.
//!
//! # Example
//!
//! ```ignore
//! use linqguard_core::cst::{parse_csharp, ast::{AstNode, CompilationUnit}};
//!
//! let (cst, _) = parse_csharp("using System.Linq;\nclass A { }");
//! let unit = CompilationUnit::cast(cst).unwrap();
//!
//! let using = unit.usings().next().unwrap();
//! assert_eq!(using.qualified_name().unwrap(), "System.Linq");
//! ```

use rowan::TextRange;

use super::trivia::{compact_text, trimmed_range};
use super::{CsSyntaxKind, CsSyntaxNode, CsSyntaxToken};

/// Helper trait for casting CST nodes to typed wrappers
pub trait AstNode: Sized {
    fn can_cast(kind: CsSyntaxKind) -> bool;
    fn cast(node: CsSyntaxNode) -> Option<Self>;
    fn syntax(&self) -> &CsSyntaxNode;

    /// Range without leading and trailing trivia
    fn span(&self) -> TextRange {
        trimmed_range(self.syntax())
    }

    /// Range including leading and trailing trivia
    fn full_range(&self) -> TextRange {
        self.syntax().text_range()
    }
}

/// Helper function to find first child of a specific kind
fn child_of_kind(parent: &CsSyntaxNode, kind: CsSyntaxKind) -> Option<CsSyntaxNode> {
    parent.children().find(|n| n.kind() == kind)
}

/// Helper function to find first token of a specific kind
fn token_of_kind(parent: &CsSyntaxNode, kind: CsSyntaxKind) -> Option<CsSyntaxToken> {
    parent
        .children_with_tokens()
        .filter_map(|e| e.into_token())
        .find(|t| t.kind() == kind)
}

fn has_token(parent: &CsSyntaxNode, kind: CsSyntaxKind) -> bool {
    token_of_kind(parent, kind).is_some()
}

/// Text of the first direct identifier token
fn ident_text(node: &CsSyntaxNode) -> Option<String> {
    token_of_kind(node, CsSyntaxKind::Ident).map(|t| t.text().to_string())
}

/// Identifier declared after the node's `Type` child, or the last
/// identifier when no type is written (untyped lambda parameters)
fn declared_name(node: &CsSyntaxNode) -> Option<String> {
    let mut seen_type = false;
    let mut last_ident = None;
    for element in node.children_with_tokens() {
        match element {
            rowan::NodeOrToken::Node(child) if child.kind() == CsSyntaxKind::Type => {
                seen_type = true
            }
            rowan::NodeOrToken::Token(token) if token.kind() == CsSyntaxKind::Ident => {
                if seen_type {
                    return Some(token.text().to_string());
                }
                last_ident = Some(token.text().to_string());
            }
            _ => {}
        }
    }
    if seen_type { None } else { last_ident }
}

fn has_contextual(node: &CsSyntaxNode, word: &str) -> bool {
    node.children_with_tokens()
        .filter_map(|e| e.into_token())
        .any(|t| t.kind() == CsSyntaxKind::Ident && t.text() == word)
}

macro_rules! ast_node {
    ($(#[$meta:meta])* $name:ident, $kind:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name {
            syntax: CsSyntaxNode,
        }

        impl AstNode for $name {
            fn can_cast(kind: CsSyntaxKind) -> bool {
                kind == CsSyntaxKind::$kind
            }

            fn cast(node: CsSyntaxNode) -> Option<Self> {
                if Self::can_cast(node.kind()) {
                    Some(Self { syntax: node })
                } else {
                    None
                }
            }

            fn syntax(&self) -> &CsSyntaxNode {
                &self.syntax
            }
        }
    };
}

// ============================================================================
// Compilation unit and usings
// ============================================================================

ast_node!(
    /// Root of a parsed file
    CompilationUnit,
    CompilationUnit
);

impl CompilationUnit {
    /// Using directives at file level, in source order
    pub fn usings(&self) -> impl Iterator<Item = UsingDirective> {
        self.syntax.children().filter_map(UsingDirective::cast)
    }

    pub fn namespaces(&self) -> impl Iterator<Item = NamespaceDecl> {
        self.syntax.children().filter_map(NamespaceDecl::cast)
    }

    /// Type declarations outside any namespace
    pub fn types(&self) -> impl Iterator<Item = TypeDecl> {
        self.syntax.children().filter_map(TypeDecl::cast)
    }
}

ast_node!(
    /// `using X;`, `using static X;`, `using A = X;` or `global using X;`
    UsingDirective,
    UsingDirective
);

impl UsingDirective {
    pub fn name(&self) -> Option<Name> {
        child_of_kind(&self.syntax, CsSyntaxKind::Name).and_then(Name::cast)
    }

    /// Imported name with all trivia removed, e.g. `System.Linq`
    pub fn qualified_name(&self) -> Option<String> {
        self.name().map(|name| name.text())
    }

    pub fn is_static(&self) -> bool {
        has_token(&self.syntax, CsSyntaxKind::StaticKw)
    }

    pub fn is_global(&self) -> bool {
        has_contextual(&self.syntax, "global")
    }

    /// Alias introduced by `using Alias = Target;`
    pub fn alias(&self) -> Option<String> {
        if !has_token(&self.syntax, CsSyntaxKind::Eq) {
            return None;
        }
        self.syntax
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .filter(|t| t.kind() == CsSyntaxKind::Ident)
            .find(|t| t.text() != "global")
            .map(|t| t.text().to_string())
    }

    /// Plain namespace import: neither static nor alias
    pub fn is_namespace_import(&self) -> bool {
        !self.is_static() && self.alias().is_none()
    }
}

ast_node!(
    /// Dotted name such as `System.Collections.Generic`
    Name,
    Name
);

impl Name {
    /// Name text without trivia
    pub fn text(&self) -> String {
        compact_text(&self.syntax)
    }
}

// ============================================================================
// Declarations
// ============================================================================

ast_node!(
    /// `namespace X { ... }` or file-scoped `namespace X;`
    NamespaceDecl,
    NamespaceDecl
);

impl NamespaceDecl {
    pub fn name(&self) -> Option<String> {
        child_of_kind(&self.syntax, CsSyntaxKind::Name)
            .and_then(Name::cast)
            .map(|name| name.text())
    }

    pub fn usings(&self) -> impl Iterator<Item = UsingDirective> {
        self.syntax.children().filter_map(UsingDirective::cast)
    }

    pub fn namespaces(&self) -> impl Iterator<Item = NamespaceDecl> {
        self.syntax.children().filter_map(NamespaceDecl::cast)
    }

    pub fn types(&self) -> impl Iterator<Item = TypeDecl> {
        self.syntax.children().filter_map(TypeDecl::cast)
    }
}

ast_node!(
    /// Class, struct, interface or record declaration
    TypeDecl,
    TypeDecl
);

impl TypeDecl {
    /// Declared type name, the identifier after the type keyword
    pub fn name(&self) -> Option<String> {
        let mut after_keyword = false;
        for token in self
            .syntax
            .children_with_tokens()
            .filter_map(|e| e.into_token())
        {
            match token.kind() {
                CsSyntaxKind::ClassKw | CsSyntaxKind::StructKw | CsSyntaxKind::InterfaceKw => {
                    after_keyword = true
                }
                CsSyntaxKind::Ident if token.text() == "record" && !after_keyword => {
                    after_keyword = true
                }
                CsSyntaxKind::Ident if after_keyword => return Some(token.text().to_string()),
                _ => {}
            }
        }
        None
    }

    pub fn is_static(&self) -> bool {
        has_token(&self.syntax, CsSyntaxKind::StaticKw)
    }

    pub fn type_params(&self) -> Vec<String> {
        child_of_kind(&self.syntax, CsSyntaxKind::TypeParamList)
            .map(|list| type_param_names(&list))
            .unwrap_or_default()
    }

    /// Base class and implemented interfaces
    pub fn base_types(&self) -> Vec<Type> {
        child_of_kind(&self.syntax, CsSyntaxKind::BaseList)
            .map(|list| list.children().filter_map(Type::cast).collect())
            .unwrap_or_default()
    }

    /// Record primary constructor parameters
    pub fn primary_params(&self) -> Vec<Param> {
        child_of_kind(&self.syntax, CsSyntaxKind::ParamList)
            .map(|list| list.children().filter_map(Param::cast).collect())
            .unwrap_or_default()
    }

    pub fn methods(&self) -> impl Iterator<Item = MethodDecl> {
        self.syntax.children().filter_map(MethodDecl::cast)
    }

    pub fn fields(&self) -> impl Iterator<Item = FieldDecl> {
        self.syntax.children().filter_map(FieldDecl::cast)
    }

    pub fn properties(&self) -> impl Iterator<Item = PropertyDecl> {
        self.syntax.children().filter_map(PropertyDecl::cast)
    }
}

fn type_param_names(list: &CsSyntaxNode) -> Vec<String> {
    list.children_with_tokens()
        .filter_map(|e| e.into_token())
        .filter(|t| t.kind() == CsSyntaxKind::Ident)
        .map(|t| t.text().to_string())
        .collect()
}

ast_node!(
    /// Method or local function declaration
    MethodDecl,
    MethodDecl
);

impl MethodDecl {
    pub fn name(&self) -> Option<String> {
        declared_name(&self.syntax)
    }

    pub fn return_type(&self) -> Option<Type> {
        child_of_kind(&self.syntax, CsSyntaxKind::Type).and_then(Type::cast)
    }

    pub fn params(&self) -> Vec<Param> {
        child_of_kind(&self.syntax, CsSyntaxKind::ParamList)
            .map(|list| list.children().filter_map(Param::cast).collect())
            .unwrap_or_default()
    }

    pub fn type_params(&self) -> Vec<String> {
        child_of_kind(&self.syntax, CsSyntaxKind::TypeParamList)
            .map(|list| type_param_names(&list))
            .unwrap_or_default()
    }

    pub fn is_static(&self) -> bool {
        has_token(&self.syntax, CsSyntaxKind::StaticKw)
    }

    /// Whether the first parameter carries the `this` modifier
    pub fn is_extension(&self) -> bool {
        self.params().first().is_some_and(Param::is_this)
    }
}

ast_node!(
    /// Method, constructor, lambda or record parameter
    Param,
    Param
);

impl Param {
    pub fn name(&self) -> Option<String> {
        declared_name(&self.syntax)
    }

    pub fn ty(&self) -> Option<Type> {
        child_of_kind(&self.syntax, CsSyntaxKind::Type).and_then(Type::cast)
    }

    pub fn is_this(&self) -> bool {
        has_token(&self.syntax, CsSyntaxKind::ThisKw)
    }

    /// Whether the parameter declares a default value
    pub fn has_default(&self) -> bool {
        has_token(&self.syntax, CsSyntaxKind::Eq)
    }

    pub fn is_params(&self) -> bool {
        has_token(&self.syntax, CsSyntaxKind::ParamsKw)
    }
}

ast_node!(
    /// Instance or static constructor
    ConstructorDecl,
    ConstructorDecl
);

impl ConstructorDecl {
    pub fn params(&self) -> Vec<Param> {
        child_of_kind(&self.syntax, CsSyntaxKind::ParamList)
            .map(|list| list.children().filter_map(Param::cast).collect())
            .unwrap_or_default()
    }
}

ast_node!(
    /// Field declaration with one or more declarators
    FieldDecl,
    FieldDecl
);

impl FieldDecl {
    pub fn ty(&self) -> Option<Type> {
        child_of_kind(&self.syntax, CsSyntaxKind::Type).and_then(Type::cast)
    }

    pub fn declarators(&self) -> impl Iterator<Item = VariableDeclarator> {
        self.syntax.children().filter_map(VariableDeclarator::cast)
    }
}

ast_node!(
    /// Property declaration
    PropertyDecl,
    PropertyDecl
);

impl PropertyDecl {
    pub fn ty(&self) -> Option<Type> {
        child_of_kind(&self.syntax, CsSyntaxKind::Type).and_then(Type::cast)
    }

    pub fn name(&self) -> Option<String> {
        declared_name(&self.syntax)
    }
}

ast_node!(
    /// `name` or `name = initializer` inside a field or local declaration
    VariableDeclarator,
    VariableDeclarator
);

impl VariableDeclarator {
    pub fn name(&self) -> Option<String> {
        ident_text(&self.syntax)
    }

    pub fn initializer(&self) -> Option<Expr> {
        self.syntax.children().find_map(Expr::cast)
    }
}

ast_node!(
    /// Type reference as written
    Type,
    Type
);

impl Type {
    /// Type text without trivia, e.g. `IEnumerable<int>`
    pub fn text(&self) -> String {
        compact_text(&self.syntax)
    }
}

// ============================================================================
// Statements
// ============================================================================

ast_node!(
    /// Local variable declaration statement
    LocalDeclStmt,
    LocalDeclStmt
);

impl LocalDeclStmt {
    pub fn ty(&self) -> Option<Type> {
        child_of_kind(&self.syntax, CsSyntaxKind::Type).and_then(Type::cast)
    }

    pub fn declarators(&self) -> impl Iterator<Item = VariableDeclarator> {
        self.syntax.children().filter_map(VariableDeclarator::cast)
    }
}

ast_node!(
    /// `foreach (T x in xs) ...`
    ForeachStmt,
    ForeachStmt
);

impl ForeachStmt {
    pub fn ty(&self) -> Option<Type> {
        child_of_kind(&self.syntax, CsSyntaxKind::Type).and_then(Type::cast)
    }

    pub fn variable(&self) -> Option<String> {
        declared_name(&self.syntax)
    }
}

ast_node!(
    /// `catch (T e) { ... }`
    CatchClause,
    CatchClause
);

impl CatchClause {
    pub fn ty(&self) -> Option<Type> {
        child_of_kind(&self.syntax, CsSyntaxKind::Type).and_then(Type::cast)
    }

    pub fn variable(&self) -> Option<String> {
        child_of_kind(&self.syntax, CsSyntaxKind::Type)?;
        declared_name(&self.syntax)
    }
}

ast_node!(
    /// `T name` or `var name` pattern
    TypePattern,
    TypePattern
);

impl TypePattern {
    /// Tested type; `None` for `var` patterns
    pub fn ty(&self) -> Option<Type> {
        child_of_kind(&self.syntax, CsSyntaxKind::Type).and_then(Type::cast)
    }

    /// Variable the pattern declares, if any
    pub fn designation(&self) -> Option<String> {
        declared_name(&self.syntax)
    }
}

// ============================================================================
// Expressions
// ============================================================================

/// Any expression node
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Expr {
    syntax: CsSyntaxNode,
}

impl AstNode for Expr {
    fn can_cast(kind: CsSyntaxKind) -> bool {
        use CsSyntaxKind::*;
        matches!(
            kind,
            NameRef
                | GenericName
                | Literal
                | InterpolatedStringExpr
                | ThisExpr
                | BaseExpr
                | PredefinedTypeExpr
                | ParenExpr
                | TupleExpr
                | MemberAccessExpr
                | CallExpr
                | ElementAccessExpr
                | PrefixExpr
                | PostfixExpr
                | BinaryExpr
                | AssignExpr
                | ConditionalExpr
                | IsPatternExpr
                | AsExpr
                | CastExpr
                | ObjectCreationExpr
                | ArrayCreationExpr
                | InitializerExpr
                | CollectionExpr
                | LambdaExpr
                | TypeofExpr
                | DefaultExpr
                | SwitchExpr
        )
    }

    fn cast(node: CsSyntaxNode) -> Option<Self> {
        if Self::can_cast(node.kind()) {
            Some(Self { syntax: node })
        } else {
            None
        }
    }

    fn syntax(&self) -> &CsSyntaxNode {
        &self.syntax
    }
}

impl Expr {
    pub fn kind(&self) -> CsSyntaxKind {
        self.syntax.kind()
    }

    /// Expression text without trivia
    pub fn text(&self) -> String {
        compact_text(&self.syntax)
    }

    /// Primary and postfix expressions can take a member access without
    /// parentheses
    pub fn is_primary(&self) -> bool {
        use CsSyntaxKind::*;
        matches!(
            self.kind(),
            NameRef
                | GenericName
                | Literal
                | InterpolatedStringExpr
                | ThisExpr
                | BaseExpr
                | PredefinedTypeExpr
                | ParenExpr
                | TupleExpr
                | MemberAccessExpr
                | CallExpr
                | ElementAccessExpr
                | PostfixExpr
                | ObjectCreationExpr
                | TypeofExpr
                | DefaultExpr
        )
    }

    /// Whether evaluating the expression twice is indistinguishable from
    /// evaluating it once
    ///
    /// Holds for names, `this`, `base`, literals, and member-access chains
    /// and parentheses or null-forgiving `!` over those.
    pub fn is_side_effect_free(&self) -> bool {
        match self.kind() {
            CsSyntaxKind::NameRef
            | CsSyntaxKind::ThisExpr
            | CsSyntaxKind::BaseExpr
            | CsSyntaxKind::Literal
            | CsSyntaxKind::PredefinedTypeExpr => true,
            CsSyntaxKind::ParenExpr => {
                let inner = self.children();
                inner.len() == 1 && inner[0].is_side_effect_free()
            }
            CsSyntaxKind::MemberAccessExpr => self.as_member_access().is_some_and(|access| {
                !access.is_conditional()
                    && access
                        .receiver()
                        .is_some_and(|receiver| receiver.is_side_effect_free())
            }),
            CsSyntaxKind::PostfixExpr => {
                has_token(&self.syntax, CsSyntaxKind::Bang)
                    && self.children().first().is_some_and(Expr::is_side_effect_free)
            }
            _ => false,
        }
    }

    /// Direct sub-expressions
    pub fn children(&self) -> Vec<Expr> {
        self.syntax.children().filter_map(Expr::cast).collect()
    }

    pub fn as_call(&self) -> Option<CallExpr> {
        CallExpr::cast(self.syntax.clone())
    }

    pub fn as_member_access(&self) -> Option<MemberAccessExpr> {
        MemberAccessExpr::cast(self.syntax.clone())
    }

    /// Identifier of a simple or generic name expression
    pub fn as_identifier(&self) -> Option<String> {
        match self.kind() {
            CsSyntaxKind::NameRef | CsSyntaxKind::GenericName => ident_text(&self.syntax),
            _ => None,
        }
    }
}

ast_node!(
    /// Invocation: callee followed by an argument list
    CallExpr,
    CallExpr
);

impl CallExpr {
    /// The invoked expression, e.g. `xs.IsNullOrEmpty` in `xs.IsNullOrEmpty()`
    pub fn callee(&self) -> Option<Expr> {
        self.syntax.children().find_map(Expr::cast)
    }

    pub fn arg_list(&self) -> Option<ArgList> {
        child_of_kind(&self.syntax, CsSyntaxKind::ArgList).and_then(ArgList::cast)
    }

    pub fn args(&self) -> Vec<Arg> {
        self.arg_list().map(|list| list.args().collect()).unwrap_or_default()
    }

    /// Callee as a member access, for `recv.Method(...)` shapes
    pub fn member_access(&self) -> Option<MemberAccessExpr> {
        self.callee().and_then(|callee| callee.as_member_access())
    }

    /// Name of the invoked method, for member-access and bare callees
    pub fn method_name(&self) -> Option<String> {
        let callee = self.callee()?;
        match callee.as_member_access() {
            Some(access) => access.name(),
            None => callee.as_identifier(),
        }
    }
}

ast_node!(
    /// `recv.Name`, `recv?.Name` or `alias::Name`
    MemberAccessExpr,
    MemberAccessExpr
);

impl MemberAccessExpr {
    /// Left operand of the access
    pub fn receiver(&self) -> Option<Expr> {
        self.syntax.children().find_map(Expr::cast)
    }

    /// The accessed member's name node (`NameRef` or `GenericName`)
    pub fn name_node(&self) -> Option<CsSyntaxNode> {
        self.syntax
            .children()
            .skip(1)
            .find(|n| matches!(n.kind(), CsSyntaxKind::NameRef | CsSyntaxKind::GenericName))
    }

    pub fn name(&self) -> Option<String> {
        self.name_node().and_then(|node| ident_text(&node))
    }

    /// Whether the access uses `?.`
    pub fn is_conditional(&self) -> bool {
        has_token(&self.syntax, CsSyntaxKind::QuestionDot)
    }

    /// Whether the access uses `::`
    pub fn is_alias_qualified(&self) -> bool {
        has_token(&self.syntax, CsSyntaxKind::ColonColon)
    }
}

ast_node!(
    /// Parenthesized or bracketed argument list
    ArgList,
    ArgList
);

impl ArgList {
    pub fn args(&self) -> impl Iterator<Item = Arg> {
        self.syntax.children().filter_map(Arg::cast)
    }
}

ast_node!(
    /// Single call argument
    Arg,
    Arg
);

impl Arg {
    pub fn expr(&self) -> Option<Expr> {
        self.syntax.children().find_map(Expr::cast)
    }

    /// `name` in `name: value`
    pub fn name(&self) -> Option<String> {
        if !has_token(&self.syntax, CsSyntaxKind::Colon) {
            return None;
        }
        ident_text(&self.syntax)
    }

    /// Whether the argument is passed with `ref`, `out` or `in`
    pub fn has_modifier(&self) -> bool {
        has_token(&self.syntax, CsSyntaxKind::RefKw)
            || has_token(&self.syntax, CsSyntaxKind::OutKw)
            || has_token(&self.syntax, CsSyntaxKind::InKw)
    }

    /// Variable declared by `out T name`, with its written type
    pub fn out_declaration(&self) -> Option<(String, Type)> {
        let ty = child_of_kind(&self.syntax, CsSyntaxKind::Type).and_then(Type::cast)?;
        Some((declared_name(&self.syntax)?, ty))
    }
}

ast_node!(
    /// `x => ...`, `(a, b) => ...` or `delegate (...) { ... }`
    LambdaExpr,
    LambdaExpr
);

impl LambdaExpr {
    pub fn params(&self) -> Vec<Param> {
        child_of_kind(&self.syntax, CsSyntaxKind::ParamList)
            .map(|list| list.children().filter_map(Param::cast).collect())
            .unwrap_or_default()
    }
}

ast_node!(
    /// `new T(...)`, `new T { ... }` or target-typed `new(...)`
    ObjectCreationExpr,
    ObjectCreationExpr
);

impl ObjectCreationExpr {
    pub fn ty(&self) -> Option<Type> {
        child_of_kind(&self.syntax, CsSyntaxKind::Type).and_then(Type::cast)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cst::parse_csharp;

    fn unit(source: &str) -> CompilationUnit {
        let (cst, errors) = parse_csharp(source);
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
        CompilationUnit::cast(cst).unwrap()
    }

    fn calls(unit: &CompilationUnit) -> Vec<CallExpr> {
        unit.syntax().descendants().filter_map(CallExpr::cast).collect()
    }

    #[test]
    fn test_using_directive_shapes() {
        let unit = unit(
            "using System.Linq;\nglobal using System.Text;\nusing static System.Math;\nusing L = System.Linq;\n",
        );
        let usings: Vec<_> = unit.usings().collect();

        assert_eq!(usings.len(), 4);
        assert_eq!(usings[0].qualified_name().as_deref(), Some("System.Linq"));
        assert!(usings[0].is_namespace_import());
        assert!(usings[1].is_global());
        assert!(usings[1].is_namespace_import());
        assert!(usings[2].is_static());
        assert_eq!(usings[3].alias().as_deref(), Some("L"));
        assert_eq!(usings[3].qualified_name().as_deref(), Some("System.Linq"));
    }

    #[test]
    fn test_using_name_ignores_interior_trivia() {
        let unit = unit("using System . /* x */ Linq;\n");
        let using = unit.usings().next().unwrap();

        assert_eq!(using.qualified_name().as_deref(), Some("System.Linq"));
    }

    #[test]
    fn test_call_shapes() {
        let unit = unit("class A { void M() { xs.IsNullOrEmpty(); Check(xs); ys?.Any(); } }");
        let calls = calls(&unit);

        assert_eq!(calls.len(), 3);
        let access = calls[0].member_access().unwrap();
        assert_eq!(access.receiver().unwrap().text(), "xs");
        assert_eq!(calls[0].method_name().as_deref(), Some("IsNullOrEmpty"));
        assert!(calls[0].args().is_empty());

        assert!(calls[1].member_access().is_none());
        assert_eq!(calls[1].method_name().as_deref(), Some("Check"));
        assert_eq!(calls[1].args().len(), 1);

        assert!(calls[2].member_access().unwrap().is_conditional());
    }

    #[test]
    fn test_type_and_method_declarations() {
        let unit = unit(
            "namespace N { public static class Ext { public static bool IsEmpty<T>(this IEnumerable<T> xs) => true; } }",
        );
        let ns = unit.namespaces().next().unwrap();
        assert_eq!(ns.name().as_deref(), Some("N"));

        let ext = ns.types().next().unwrap();
        assert_eq!(ext.name().as_deref(), Some("Ext"));
        assert!(ext.is_static());

        let method = ext.methods().next().unwrap();
        assert_eq!(method.name().as_deref(), Some("IsEmpty"));
        assert!(method.is_extension());
        assert_eq!(method.type_params(), vec!["T".to_string()]);
        assert_eq!(method.params()[0].ty().unwrap().text(), "IEnumerable<T>");
    }

    #[test]
    fn test_side_effect_free_receivers() {
        let unit = unit(
            "class A { void M() { a.F(); this.b.F(); (c).F(); d!.F(); G().F(); e[0].F(); (f = g).F(); h?.i.F(); } }",
        );
        let receivers: Vec<bool> = calls(&unit)
            .iter()
            .filter(|call| call.method_name().as_deref() == Some("F"))
            .map(|call| call.member_access().unwrap().receiver().unwrap().is_side_effect_free())
            .collect();

        assert_eq!(
            receivers,
            vec![true, true, true, true, false, false, false, false]
        );
    }

    #[test]
    fn test_record_name() {
        let unit = unit("public record Person(string Name);\n");
        let person = unit.types().next().unwrap();

        assert_eq!(person.name().as_deref(), Some("Person"));
        assert_eq!(person.primary_params().len(), 1);
    }

    #[test]
    fn test_binder_shapes() {
        let unit = unit(
            "class A { A(int n = 1, params string[] rest) { } void M(object o) { if (o is List<int> xs) { } int.TryParse(\"1\", out int v); try { } catch (Exception e) { } } }",
        );
        let syntax = unit.syntax();

        let ctor = syntax.descendants().find_map(ConstructorDecl::cast).unwrap();
        let params = ctor.params();
        assert!(params[0].has_default());
        assert!(params[1].is_params());

        let pattern = syntax.descendants().find_map(TypePattern::cast).unwrap();
        assert_eq!(pattern.designation().as_deref(), Some("xs"));
        assert_eq!(pattern.ty().unwrap().text(), "List<int>");

        let (name, ty) = syntax
            .descendants()
            .filter_map(Arg::cast)
            .find_map(|arg| arg.out_declaration())
            .unwrap();
        assert_eq!((name.as_str(), ty.text().as_str()), ("v", "int"));

        let catch = syntax.descendants().find_map(CatchClause::cast).unwrap();
        assert_eq!(catch.variable().as_deref(), Some("e"));
    }
}
