//! Call binding
//!
//! The model keeps an owned index of declared types, so it can be shared
//! across threads and queried with nodes from any red tree over the unit it
//! was built from. Scope information (enclosing types, namespace levels,
//! using directives and locals) is read from the tree at query time.
//!
//! Binding follows the C# lookup order:
//! - a receiver that names a type binds to that type's static methods
//! - a receiver value binds to an applicable instance method of its type,
//!   then to extension methods found namespace level by namespace level,
//!   innermost first; two candidate types at one level leave the call
//!   unresolved
//! - a bare call binds to a method of an enclosing type, then to methods
//!   imported with `using static`
//!
//! Receiver types are compared by name. Unknown receiver types accept any
//! extension method.

use std::collections::HashMap;

use crate::cst::ast::{
    Arg, AstNode, CallExpr, CatchClause, CompilationUnit, ConstructorDecl, Expr, ForeachStmt,
    LambdaExpr, LocalDeclStmt, MethodDecl, NamespaceDecl, Param, Type, TypeDecl, TypePattern,
    UsingDirective,
};
use crate::cst::{CsSyntaxKind, CsSyntaxNode};
use crate::host::SymbolResolver;
use crate::source::SourceUnit;

use super::{LibraryCatalog, LibraryMethod, LibraryType, ResolvedSymbol};

/// Limit for nested receiver classification
const MAX_DEPTH: usize = 16;

/// Limit for base-type walks
const MAX_BASE_DEPTH: usize = 4;

/// Collection types accepted for an `IEnumerable` parameter
const SEQUENCE_TYPES: &[&str] = &[
    "IEnumerable",
    "ICollection",
    "IList",
    "IReadOnlyCollection",
    "IReadOnlyList",
    "ISet",
    "IReadOnlySet",
    "IDictionary",
    "IReadOnlyDictionary",
    "IQueryable",
    "IOrderedEnumerable",
    "IOrderedQueryable",
    "IGrouping",
    "ILookup",
    "List",
    "HashSet",
    "SortedSet",
    "Dictionary",
    "SortedDictionary",
    "SortedList",
    "Queue",
    "Stack",
    "LinkedList",
    "Collection",
    "ReadOnlyCollection",
    "ObservableCollection",
    "ImmutableArray",
    "ImmutableList",
    "ImmutableHashSet",
    "ImmutableDictionary",
    "ConcurrentBag",
    "ConcurrentQueue",
    "ConcurrentStack",
    "ConcurrentDictionary",
    "BlockingCollection",
    "ArraySegment",
    "ArrayList",
    "Lookup",
];

/// Index of a declaring type and one of its methods
type Binding = (usize, usize);

#[derive(Debug, Clone)]
struct MethodInfo {
    name: String,
    is_static: bool,
    is_extension: bool,
    /// Parameter types, `this` parameter included
    params: Vec<String>,
    type_params: Vec<String>,
    return_type: Option<String>,
    min_arity: usize,
    max_arity: usize,
}

impl MethodInfo {
    fn from_source(decl: &MethodDecl) -> Option<Self> {
        let params = decl.params();
        let min_arity = params
            .iter()
            .filter(|p| !p.has_default() && !p.is_params())
            .count();
        let max_arity = if params.last().is_some_and(Param::is_params) {
            usize::MAX
        } else {
            params.len()
        };
        Some(Self {
            name: decl.name()?,
            is_static: decl.is_static(),
            is_extension: decl.is_extension(),
            params: params
                .iter()
                .map(|p| p.ty().map(|t| t.text()).unwrap_or_default())
                .collect(),
            type_params: decl.type_params(),
            return_type: decl.return_type().map(|t| t.text()),
            min_arity,
            max_arity,
        })
    }

    fn from_library(method: &LibraryMethod) -> Self {
        Self {
            name: method.name.clone(),
            is_static: !method.instance,
            is_extension: method.extension,
            params: method.parameters.clone(),
            type_params: method.generic_params(),
            return_type: None,
            min_arity: method.parameters.len(),
            max_arity: method.parameters.len(),
        }
    }

    fn accepts(&self, args: usize) -> bool {
        self.min_arity <= args && args <= self.max_arity
    }
}

#[derive(Debug, Clone)]
struct TypeInfo {
    full_name: String,
    namespace: String,
    is_static: bool,
    is_nested: bool,
    base_types: Vec<String>,
    /// Fields and properties: name and declared type
    members: Vec<(String, String)>,
    methods: Vec<MethodInfo>,
}

impl TypeInfo {
    fn from_source(decl: &TypeDecl) -> Option<Self> {
        let mut members = Vec::new();
        for field in decl.fields() {
            let ty = field.ty().map(|t| t.text()).unwrap_or_default();
            members.extend(
                field
                    .declarators()
                    .filter_map(|d| d.name())
                    .map(|name| (name, ty.clone())),
            );
        }
        for property in decl.properties() {
            if let (Some(name), Some(ty)) = (property.name(), property.ty()) {
                members.push((name, ty.text()));
            }
        }
        for param in decl.primary_params() {
            if let (Some(name), Some(ty)) = (param.name(), param.ty()) {
                members.push((name, ty.text()));
            }
        }

        Some(Self {
            full_name: declared_full_name(decl)?,
            namespace: enclosing_namespace(decl.syntax()),
            is_static: decl.is_static(),
            is_nested: decl
                .syntax()
                .ancestors()
                .skip(1)
                .any(|n| n.kind() == CsSyntaxKind::TypeDecl),
            base_types: decl.base_types().iter().map(Type::text).collect(),
            members,
            methods: decl
                .methods()
                .filter_map(|m| MethodInfo::from_source(&m))
                .collect(),
        })
    }

    fn from_library(ty: &LibraryType) -> Self {
        Self {
            full_name: ty.full_name(),
            namespace: ty.namespace.clone(),
            is_static: true,
            is_nested: false,
            base_types: Vec::new(),
            members: Vec::new(),
            methods: ty.methods.iter().map(MethodInfo::from_library).collect(),
        }
    }
}

/// Outcome of an extension lookup at one scope level
enum Lookup {
    Missing,
    Found(Binding),
    Ambiguous,
}

/// What a receiver expression denotes
#[derive(Debug, Clone, PartialEq, Eq)]
enum Receiver {
    /// A value, with its declared type when known
    Value(Option<String>),
    /// A type
    Type(usize),
    /// A name that binds to nothing known, possibly a namespace prefix
    Unbound,
}

/// One namespace level of a lookup, with the using directives attached
/// to its declaration
#[derive(Debug, Default)]
struct Level {
    namespace: String,
    imports: Vec<String>,
    statics: Vec<String>,
    aliases: Vec<(String, String)>,
}

impl Level {
    fn new(namespace: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            ..Self::default()
        }
    }

    fn with_usings(mut self, usings: impl Iterator<Item = UsingDirective>) -> Self {
        for using in usings {
            let Some(target) = using.qualified_name() else {
                continue;
            };
            let target = match target.strip_prefix("global::") {
                Some(rest) => rest.to_string(),
                None => target,
            };
            if let Some(alias) = using.alias() {
                self.aliases.push((alias, target));
            } else if using.is_static() {
                self.statics.push(target);
            } else {
                self.imports.push(target);
            }
        }
        self
    }
}

/// Lookup context at a node
#[derive(Debug, Default)]
struct Scope {
    /// Enclosing types, innermost first
    types: Vec<usize>,
    /// Namespace levels, innermost first, ending with the global level
    levels: Vec<Level>,
}

/// Resolves invocations in one source unit
#[derive(Debug, Clone, Default)]
pub struct SemanticModel {
    types: Vec<TypeInfo>,
    by_name: HashMap<String, usize>,
    by_namespace: HashMap<String, Vec<usize>>,
    keywords: HashMap<String, String>,
}

impl SemanticModel {
    /// Index the types declared in `unit` and in `catalog`
    ///
    /// Source declarations shadow library types with the same full name.
    /// Partial declarations are merged.
    pub fn build(unit: &SourceUnit, catalog: &LibraryCatalog) -> Self {
        let mut model = Self::default();
        for decl in unit.syntax().descendants().filter_map(TypeDecl::cast) {
            if let Some(info) = TypeInfo::from_source(&decl) {
                model.insert(info);
            }
        }
        for ty in catalog.types() {
            if let Some(keyword) = &ty.keyword {
                model.keywords.insert(keyword.clone(), ty.full_name());
            }
            if !model.by_name.contains_key(&ty.full_name()) {
                model.insert(TypeInfo::from_library(ty));
            }
        }
        tracing::debug!(types = model.types.len(), "Built semantic model");
        model
    }

    /// Method invoked by `call`, if it binds to exactly one known method
    pub fn resolve(&self, call: &CallExpr) -> Option<ResolvedSymbol> {
        let (ty, method) = self.bind_call(call, 0)?;
        let info = self.types.get(ty)?;
        let method = info.methods.get(method)?;
        Some(ResolvedSymbol::new(
            info.full_name.clone(),
            method.name.clone(),
        ))
    }

    fn insert(&mut self, info: TypeInfo) {
        if let Some(&idx) = self.by_name.get(&info.full_name) {
            let existing = &mut self.types[idx];
            existing.is_static |= info.is_static;
            existing.base_types.extend(info.base_types);
            existing.members.extend(info.members);
            existing.methods.extend(info.methods);
            return;
        }
        let idx = self.types.len();
        self.by_name.insert(info.full_name.clone(), idx);
        if !info.is_nested {
            self.by_namespace
                .entry(info.namespace.clone())
                .or_default()
                .push(idx);
        }
        self.types.push(info);
    }

    // ========================================================================
    // Scopes
    // ========================================================================

    fn scope_at(&self, node: &CsSyntaxNode) -> Scope {
        let mut scope = Scope::default();
        let mut namespaces = Vec::new();
        let mut root_usings = Vec::new();

        for ancestor in node.ancestors() {
            if let Some(decl) = TypeDecl::cast(ancestor.clone()) {
                let idx = declared_full_name(&decl).and_then(|name| self.by_name.get(&name));
                scope.types.extend(idx.copied());
            } else if let Some(ns) = NamespaceDecl::cast(ancestor.clone()) {
                namespaces.push(ns);
            } else if let Some(unit) = CompilationUnit::cast(ancestor) {
                root_usings = unit.usings().collect();
            }
        }

        for (i, ns) in namespaces.iter().enumerate() {
            let full_name = namespace_full_name(ns);
            let outer = namespaces
                .get(i + 1)
                .map(namespace_full_name)
                .unwrap_or_default();
            scope
                .levels
                .push(Level::new(&full_name).with_usings(ns.usings()));

            let mut name = full_name.as_str();
            while let Some((parent, _)) = name.rsplit_once('.') {
                if parent == outer {
                    break;
                }
                scope.levels.push(Level::new(parent));
                name = parent;
            }
        }
        scope
            .levels
            .push(Level::new("").with_usings(root_usings.into_iter()));
        scope
    }

    /// Resolve a type as written at a position described by `scope`
    fn resolve_type(&self, text: &str, scope: &Scope) -> Option<usize> {
        let name = type_lookup_name(text);
        if name.is_empty() {
            return None;
        }
        if let Some(full_name) = self.keywords.get(&name) {
            return self.by_name.get(full_name).copied();
        }

        if let Some((head, rest)) = name.split_once('.') {
            for level in &scope.levels {
                if let Some((_, target)) = level.aliases.iter().find(|(alias, _)| alias == head) {
                    return self.by_name.get(&format!("{target}.{rest}")).copied();
                }
            }
            if let Some(&idx) = self.by_name.get(&name) {
                return Some(idx);
            }
            return scope
                .levels
                .iter()
                .find_map(|level| self.by_name.get(&qualify(&level.namespace, &name)))
                .copied();
        }

        for &ty in &scope.types {
            let nested = format!("{}.{}", self.types[ty].full_name, name);
            if let Some(&idx) = self.by_name.get(&nested) {
                return Some(idx);
            }
        }
        for level in &scope.levels {
            if let Some(&idx) = self.by_name.get(&qualify(&level.namespace, &name)) {
                return Some(idx);
            }
            if let Some((_, target)) = level.aliases.iter().find(|(alias, _)| *alias == name) {
                return self.by_name.get(target).copied();
            }
            let imported = level
                .imports
                .iter()
                .find_map(|import| self.by_name.get(&qualify(import, &name)));
            if let Some(&idx) = imported {
                return Some(idx);
            }
        }
        None
    }

    // ========================================================================
    // Receivers
    // ========================================================================

    fn classify(&self, expr: &Expr, scope: &Scope, depth: usize) -> Receiver {
        if depth > MAX_DEPTH {
            return Receiver::Value(None);
        }
        match expr.kind() {
            CsSyntaxKind::NameRef | CsSyntaxKind::GenericName => {
                let Some(name) = expr.as_identifier() else {
                    return Receiver::Value(None);
                };
                if let Some(ty) = self.local_type(&name, expr.syntax(), scope, depth) {
                    return Receiver::Value(ty);
                }
                if let Some(ty) = scope
                    .types
                    .iter()
                    .find_map(|&idx| self.member_type(idx, &name, scope, 0))
                {
                    return Receiver::Value(Some(ty));
                }
                self.resolve_type(&expr.text(), scope)
                    .map_or(Receiver::Unbound, Receiver::Type)
            }
            CsSyntaxKind::MemberAccessExpr => {
                let Some(access) = expr.as_member_access() else {
                    return Receiver::Value(None);
                };
                if access.is_alias_qualified() {
                    return self
                        .resolve_type(&expr.text(), scope)
                        .map_or(Receiver::Unbound, Receiver::Type);
                }
                let (Some(inner), Some(name)) = (access.receiver(), access.name()) else {
                    return Receiver::Value(None);
                };
                match self.classify(&inner, scope, depth + 1) {
                    Receiver::Type(idx) => {
                        let nested = format!("{}.{}", self.types[idx].full_name, name);
                        match self.by_name.get(&nested) {
                            Some(&nested) => Receiver::Type(nested),
                            None => Receiver::Value(self.member_type(idx, &name, scope, 0)),
                        }
                    }
                    Receiver::Value(Some(ty)) => Receiver::Value(
                        self.resolve_type(&ty, scope)
                            .and_then(|idx| self.member_type(idx, &name, scope, 0)),
                    ),
                    Receiver::Value(None) => Receiver::Value(None),
                    Receiver::Unbound => self
                        .resolve_type(&expr.text(), scope)
                        .map_or(Receiver::Unbound, Receiver::Type),
                }
            }
            CsSyntaxKind::ThisExpr => Receiver::Value(
                scope
                    .types
                    .first()
                    .map(|&idx| self.types[idx].full_name.clone()),
            ),
            CsSyntaxKind::BaseExpr => Receiver::Value(
                scope
                    .types
                    .first()
                    .and_then(|&idx| self.types[idx].base_types.first().cloned()),
            ),
            CsSyntaxKind::Literal => Receiver::Value(literal_type(expr.syntax())),
            CsSyntaxKind::InterpolatedStringExpr => Receiver::Value(Some("string".to_string())),
            CsSyntaxKind::PredefinedTypeExpr => self
                .keywords
                .get(&expr.text())
                .and_then(|full_name| self.by_name.get(full_name))
                .map_or(Receiver::Unbound, |&idx| Receiver::Type(idx)),
            CsSyntaxKind::ParenExpr => match expr.children().as_slice() {
                [inner] => self.classify(inner, scope, depth + 1),
                _ => Receiver::Value(None),
            },
            CsSyntaxKind::PostfixExpr => {
                let null_forgiving = expr
                    .syntax()
                    .children_with_tokens()
                    .any(|e| e.kind() == CsSyntaxKind::Bang);
                match expr.children().first() {
                    Some(inner) if null_forgiving => self.classify(inner, scope, depth + 1),
                    _ => Receiver::Value(None),
                }
            }
            CsSyntaxKind::CastExpr | CsSyntaxKind::AsExpr | CsSyntaxKind::ObjectCreationExpr => {
                Receiver::Value(child_type_text(expr.syntax()))
            }
            CsSyntaxKind::ArrayCreationExpr => {
                let ty = child_type_text(expr.syntax()).unwrap_or_else(|| "object".to_string());
                if ty.ends_with(']') {
                    Receiver::Value(Some(ty))
                } else {
                    Receiver::Value(Some(format!("{ty}[]")))
                }
            }
            CsSyntaxKind::CallExpr => {
                let ty = expr
                    .as_call()
                    .and_then(|call| self.bind_call(&call, depth + 1))
                    .and_then(|(ty, method)| self.types[ty].methods[method].return_type.clone());
                Receiver::Value(ty)
            }
            _ => Receiver::Value(None),
        }
    }

    /// Declared type of a local, parameter or pattern variable visible at
    /// `node`
    ///
    /// `Some(None)` means the variable exists but its type is unknown.
    fn local_type(
        &self,
        name: &str,
        node: &CsSyntaxNode,
        scope: &Scope,
        depth: usize,
    ) -> Option<Option<String>> {
        let mut child = node.clone();
        for ancestor in node.ancestors().skip(1) {
            if let Some(decl) = TypeDecl::cast(ancestor.clone()) {
                return find_param(decl.primary_params(), name);
            }
            let preceding: Vec<CsSyntaxNode> =
                ancestor.children().take_while(|c| *c != child).collect();
            for sibling in preceding.iter().rev() {
                if let Some(found) = self.declaration_in(sibling, name, scope, depth) {
                    return Some(found);
                }
            }
            if let Some(found) = own_binding(&ancestor, name) {
                return Some(found);
            }
            child = ancestor;
        }
        None
    }

    /// Last declaration of `name` inside `node` that stays visible after it
    fn declaration_in(
        &self,
        node: &CsSyntaxNode,
        name: &str,
        scope: &Scope,
        depth: usize,
    ) -> Option<Option<String>> {
        match node.kind() {
            CsSyntaxKind::LocalDeclStmt => {
                if let Some(stmt) = LocalDeclStmt::cast(node.clone()) {
                    let declarator = stmt
                        .declarators()
                        .filter(|d| d.name().as_deref() == Some(name))
                        .last();
                    if let Some(declarator) = declarator {
                        let written = stmt.ty().map(|t| t.text());
                        return Some(self.declared_type(
                            written,
                            declarator.initializer(),
                            scope,
                            depth,
                        ));
                    }
                }
            }
            CsSyntaxKind::TypePattern => {
                if let Some(pattern) = TypePattern::cast(node.clone())
                    && pattern.designation().as_deref() == Some(name)
                {
                    return Some(written_type(pattern.ty()));
                }
            }
            CsSyntaxKind::Arg => {
                if let Some((declared, ty)) = Arg::cast(node.clone()).and_then(|a| a.out_declaration())
                    && declared == name
                {
                    return Some(written_type(Some(ty)));
                }
            }
            CsSyntaxKind::UsingStmt => {
                let is_declaration = !node
                    .children_with_tokens()
                    .any(|e| e.kind() == CsSyntaxKind::LParen);
                if !is_declaration {
                    return None;
                }
            }
            kind if is_scope_boundary(kind) => return None,
            _ => {}
        }
        let children: Vec<CsSyntaxNode> = node.children().collect();
        children
            .iter()
            .rev()
            .find_map(|child| self.declaration_in(child, name, scope, depth))
    }

    fn declared_type(
        &self,
        written: Option<String>,
        initializer: Option<Expr>,
        scope: &Scope,
        depth: usize,
    ) -> Option<String> {
        match written {
            Some(ty) if ty != "var" => Some(ty),
            _ => match self.classify(&initializer?, scope, depth + 1) {
                Receiver::Value(ty) => ty,
                Receiver::Type(_) | Receiver::Unbound => None,
            },
        }
    }

    /// Field or property type on a type or its bases
    fn member_type(&self, idx: usize, name: &str, scope: &Scope, depth: usize) -> Option<String> {
        let info = &self.types[idx];
        if let Some((_, ty)) = info.members.iter().find(|(member, _)| member == name) {
            return Some(ty.clone());
        }
        if depth >= MAX_BASE_DEPTH {
            return None;
        }
        info.base_types
            .iter()
            .filter_map(|base| self.resolve_type(base, scope))
            .find_map(|base| self.member_type(base, name, scope, depth + 1))
    }

    /// Whether a receiver of type `receiver` can bind to a `this` parameter
    /// of type `param`
    fn receiver_matches(
        &self,
        receiver: Option<&str>,
        param: &str,
        type_params: &[String],
        scope: &Scope,
        depth: usize,
    ) -> bool {
        let Some(receiver) = receiver else {
            return true;
        };
        if type_params.contains(&type_lookup_name(param)) {
            return true;
        }
        let param_base = base_name(param);
        if param_base == "Object" {
            return true;
        }

        let array = is_array(receiver);
        let receiver_base = base_name(receiver);
        if !array && receiver_base == param_base {
            return true;
        }
        if param_base == "IEnumerable"
            && (array
                || receiver_base == "String"
                || SEQUENCE_TYPES.contains(&receiver_base.as_str()))
        {
            return true;
        }
        if array || depth >= MAX_BASE_DEPTH {
            return false;
        }
        let Some(idx) = self.resolve_type(receiver, scope) else {
            return false;
        };
        self.types[idx].base_types.iter().any(|base| {
            self.receiver_matches(Some(base), param, type_params, scope, depth + 1)
        })
    }

    // ========================================================================
    // Calls
    // ========================================================================

    fn bind_call(&self, call: &CallExpr, depth: usize) -> Option<Binding> {
        if depth > MAX_DEPTH {
            return None;
        }
        let name = call.method_name()?;
        let arity = call.args().len();
        let callee = call.callee()?;
        let scope = self.scope_at(call.syntax());

        let Some(access) = callee.as_member_access() else {
            if callee.as_identifier().is_none() {
                return None;
            }
            return self.bind_bare(&name, arity, &scope, call.syntax());
        };
        let receiver = access.receiver()?;
        match self.classify(&receiver, &scope, depth) {
            Receiver::Type(idx) => self.find_method(idx, &scope, 0, &|m: &MethodInfo| {
                m.name == name && m.accepts(arity) && (m.is_static || m.is_extension)
            }),
            Receiver::Value(ty) => {
                let instance = ty
                    .as_deref()
                    .and_then(|ty| self.resolve_type(ty, &scope))
                    .and_then(|idx| {
                        self.find_method(idx, &scope, 0, &|m: &MethodInfo| {
                            m.name == name && m.accepts(arity) && !m.is_static
                        })
                    });
                instance.or_else(|| self.bind_extension(&name, arity + 1, ty.as_deref(), &scope))
            }
            Receiver::Unbound => self.bind_extension(&name, arity + 1, None, &scope),
        }
    }

    fn bind_bare(
        &self,
        name: &str,
        arity: usize,
        scope: &Scope,
        node: &CsSyntaxNode,
    ) -> Option<Binding> {
        if has_local_function(node, name) {
            return None;
        }
        let named = |m: &MethodInfo| m.name == name && m.accepts(arity);
        if let Some(binding) = scope
            .types
            .iter()
            .find_map(|&idx| self.find_method(idx, scope, 0, &named))
        {
            return Some(binding);
        }

        for level in &scope.levels {
            let mut found: Option<Binding> = None;
            for idx in level
                .statics
                .iter()
                .filter_map(|target| self.resolve_type(target, scope))
            {
                let Some(method) = self.types[idx]
                    .methods
                    .iter()
                    .position(|m| named(m) && m.is_static)
                else {
                    continue;
                };
                match found {
                    Some((prev, _)) if prev != idx => return None,
                    Some(_) => {}
                    None => found = Some((idx, method)),
                }
            }
            if found.is_some() {
                return found;
            }
        }
        None
    }

    fn bind_extension(
        &self,
        name: &str,
        arity: usize,
        receiver: Option<&str>,
        scope: &Scope,
    ) -> Option<Binding> {
        for level in &scope.levels {
            let declared = self
                .by_namespace
                .get(&level.namespace)
                .map(Vec::as_slice)
                .unwrap_or_default();
            match self.pick_extension(declared.iter().copied(), name, arity, receiver, scope) {
                Lookup::Found(binding) => return Some(binding),
                Lookup::Ambiguous => return None,
                Lookup::Missing => {}
            }

            let imported = level
                .imports
                .iter()
                .filter_map(|ns| self.by_namespace.get(ns))
                .flatten()
                .copied()
                .chain(
                    level
                        .statics
                        .iter()
                        .filter_map(|target| self.resolve_type(target, scope)),
                );
            match self.pick_extension(imported, name, arity, receiver, scope) {
                Lookup::Found(binding) => return Some(binding),
                Lookup::Ambiguous => return None,
                Lookup::Missing => {}
            }
        }
        None
    }

    fn pick_extension(
        &self,
        candidates: impl Iterator<Item = usize>,
        name: &str,
        arity: usize,
        receiver: Option<&str>,
        scope: &Scope,
    ) -> Lookup {
        let mut found: Option<Binding> = None;
        for idx in candidates {
            let info = &self.types[idx];
            if !info.is_static || info.is_nested {
                continue;
            }
            let method = info.methods.iter().position(|m| {
                m.is_extension
                    && m.name == name
                    && m.accepts(arity)
                    && self.receiver_matches(
                        receiver,
                        m.params.first().map(String::as_str).unwrap_or_default(),
                        &m.type_params,
                        scope,
                        0,
                    )
            });
            let Some(method) = method else {
                continue;
            };
            match found {
                Some((prev, _)) if prev != idx => return Lookup::Ambiguous,
                Some(_) => {}
                None => found = Some((idx, method)),
            }
        }
        found.map_or(Lookup::Missing, Lookup::Found)
    }

    fn find_method<P>(&self, idx: usize, scope: &Scope, depth: usize, pred: &P) -> Option<Binding>
    where
        P: Fn(&MethodInfo) -> bool,
    {
        let info = &self.types[idx];
        if let Some(method) = info.methods.iter().position(pred) {
            return Some((idx, method));
        }
        if depth >= MAX_BASE_DEPTH {
            return None;
        }
        info.base_types
            .iter()
            .filter_map(|base| self.resolve_type(base, scope))
            .find_map(|base| self.find_method(base, scope, depth + 1, pred))
    }
}

impl SymbolResolver for SemanticModel {
    fn resolve_call(&self, call: &CallExpr) -> Option<ResolvedSymbol> {
        self.resolve(call)
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn qualify(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{namespace}.{name}")
    }
}

/// Namespace-qualified name of a declared type, outer types included
fn declared_full_name(decl: &TypeDecl) -> Option<String> {
    let mut parts = Vec::new();
    for ancestor in decl.syntax().ancestors() {
        if let Some(ty) = TypeDecl::cast(ancestor.clone()) {
            parts.push(ty.name()?);
        } else if let Some(ns) = NamespaceDecl::cast(ancestor) {
            parts.extend(ns.name());
        }
    }
    parts.reverse();
    Some(parts.join("."))
}

fn namespace_full_name(decl: &NamespaceDecl) -> String {
    let mut parts: Vec<String> = decl
        .syntax()
        .ancestors()
        .filter_map(NamespaceDecl::cast)
        .filter_map(|ns| ns.name())
        .collect();
    parts.reverse();
    parts.join(".")
}

fn enclosing_namespace(node: &CsSyntaxNode) -> String {
    node.ancestors()
        .find_map(NamespaceDecl::cast)
        .map(|ns| namespace_full_name(&ns))
        .unwrap_or_default()
}

/// Type name without `global::`, type arguments, array ranks or `?`
fn type_lookup_name(text: &str) -> String {
    let text = text.trim();
    let text = text.strip_prefix("global::").unwrap_or(text);
    let mut name = String::with_capacity(text.len());
    let mut depth = 0usize;
    for c in text.chars() {
        match c {
            '<' | '[' => depth += 1,
            '>' | ']' => depth = depth.saturating_sub(1),
            '?' => {}
            c if depth == 0 && !c.is_whitespace() => name.push(c),
            _ => {}
        }
    }
    name
}

/// Simple type name with keyword types mapped to their framework names
fn base_name(text: &str) -> String {
    let name = type_lookup_name(text);
    let simple = name.rsplit('.').next().unwrap_or_default();
    match simple {
        "string" => "String".to_string(),
        "object" => "Object".to_string(),
        other => other.to_string(),
    }
}

fn is_array(text: &str) -> bool {
    text.trim_end_matches('?').ends_with(']')
}

fn literal_type(node: &CsSyntaxNode) -> Option<String> {
    let token = node
        .children_with_tokens()
        .filter_map(|e| e.into_token())
        .find(|t| !t.kind().is_trivia())?;
    let ty = match token.kind() {
        CsSyntaxKind::StringLiteral => "string",
        CsSyntaxKind::IntLiteral => "int",
        CsSyntaxKind::RealLiteral => "double",
        CsSyntaxKind::CharLiteral => "char",
        CsSyntaxKind::TrueKw | CsSyntaxKind::FalseKw => "bool",
        _ => return None,
    };
    Some(ty.to_string())
}

fn child_type_text(node: &CsSyntaxNode) -> Option<String> {
    node.children().find_map(Type::cast).map(|t| t.text())
}

/// Written type, `None` for `var`
fn written_type(ty: Option<Type>) -> Option<String> {
    ty.map(|t| t.text()).filter(|t| t != "var")
}

fn find_param(params: Vec<Param>, name: &str) -> Option<Option<String>> {
    params
        .into_iter()
        .find(|p| p.name().as_deref() == Some(name))
        .map(|p| written_type(p.ty()))
}

/// Variables a node declares for its whole body
fn own_binding(node: &CsSyntaxNode, name: &str) -> Option<Option<String>> {
    match node.kind() {
        CsSyntaxKind::ForeachStmt => {
            let stmt = ForeachStmt::cast(node.clone())?;
            (stmt.variable().as_deref() == Some(name)).then(|| written_type(stmt.ty()))
        }
        CsSyntaxKind::CatchClause => {
            let clause = CatchClause::cast(node.clone())?;
            (clause.variable().as_deref() == Some(name)).then(|| written_type(clause.ty()))
        }
        CsSyntaxKind::LambdaExpr => find_param(LambdaExpr::cast(node.clone())?.params(), name),
        CsSyntaxKind::MethodDecl => find_param(MethodDecl::cast(node.clone())?.params(), name),
        CsSyntaxKind::ConstructorDecl => {
            find_param(ConstructorDecl::cast(node.clone())?.params(), name)
        }
        _ => None,
    }
}

/// Nodes whose declarations are not visible to following siblings
fn is_scope_boundary(kind: CsSyntaxKind) -> bool {
    matches!(
        kind,
        CsSyntaxKind::Block
            | CsSyntaxKind::LambdaExpr
            | CsSyntaxKind::MethodDecl
            | CsSyntaxKind::ConstructorDecl
            | CsSyntaxKind::TypeDecl
            | CsSyntaxKind::ForStmt
            | CsSyntaxKind::ForeachStmt
            | CsSyntaxKind::WhileStmt
            | CsSyntaxKind::DoStmt
            | CsSyntaxKind::TryStmt
            | CsSyntaxKind::CatchClause
            | CsSyntaxKind::SwitchStmt
            | CsSyntaxKind::SwitchExpr
            | CsSyntaxKind::ElseClause
            | CsSyntaxKind::LockStmt
    )
}

fn has_local_function(node: &CsSyntaxNode, name: &str) -> bool {
    node.ancestors()
        .filter(|n| n.kind() == CsSyntaxKind::Block)
        .any(|block| {
            block
                .children()
                .filter_map(MethodDecl::cast)
                .any(|m| m.name().as_deref() == Some(name))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEQUENCE_EXT: &str =
        "public static bool IsNullOrEmpty<T>(this IEnumerable<T> xs) => xs == null;";

    fn resolve(source: &str, method: &str) -> Option<String> {
        let unit = SourceUnit::parse(source);
        assert!(!unit.has_errors(), "unexpected errors: {:?}", unit.errors());
        let model = SemanticModel::build(&unit, &LibraryCatalog::default());
        let call = unit
            .syntax()
            .descendants()
            .filter_map(CallExpr::cast)
            .find(|c| c.method_name().as_deref() == Some(method))
            .unwrap();
        model.resolve(&call).map(|symbol| symbol.to_string())
    }

    #[test]
    fn test_extension_through_using() {
        let source = "using Microsoft.IdentityModel.Tokens;\nclass A { bool M(List<int> xs) => xs.IsNullOrEmpty(); }";

        assert_eq!(
            resolve(source, "IsNullOrEmpty").as_deref(),
            Some("Microsoft.IdentityModel.Tokens.CollectionUtilities.IsNullOrEmpty")
        );
    }

    #[test]
    fn test_extension_needs_import() {
        let source = "class A { bool M(List<int> xs) => xs.IsNullOrEmpty(); }";
        assert_eq!(resolve(source, "IsNullOrEmpty"), None);
    }

    #[test]
    fn test_inner_namespace_extension_wins() {
        let source = format!(
            "using Microsoft.IdentityModel.Tokens;\nnamespace App {{\n static class Mine {{ {SEQUENCE_EXT} }}\n class C {{ bool M(List<int> xs) => xs.IsNullOrEmpty(); }}\n}}"
        );

        assert_eq!(
            resolve(&source, "IsNullOrEmpty").as_deref(),
            Some("App.Mine.IsNullOrEmpty")
        );
    }

    #[test]
    fn test_same_level_candidates_are_ambiguous() {
        let source = format!(
            "using Microsoft.IdentityModel.Tokens;\nusing Acme;\nnamespace Acme {{ public static class Ext {{ {SEQUENCE_EXT} }} }}\nnamespace App {{ class C {{ bool M(List<int> xs) => xs.IsNullOrEmpty(); }} }}"
        );
        assert_eq!(resolve(&source, "IsNullOrEmpty"), None);
    }

    #[test]
    fn test_instance_method_wins() {
        let source = "using Microsoft.IdentityModel.Tokens;\nclass Bag { public bool IsNullOrEmpty() => true; }\nclass A { bool M(Bag bag) => bag.IsNullOrEmpty(); }";

        assert_eq!(resolve(source, "IsNullOrEmpty").as_deref(), Some("Bag.IsNullOrEmpty"));
    }

    #[test]
    fn test_static_invocation_forms() {
        let imported = "using Microsoft.IdentityModel.Tokens;\nclass A { bool M(int[] xs) => CollectionUtilities.IsNullOrEmpty(xs); }";
        let qualified = "class A { bool M(int[] xs) => Microsoft.IdentityModel.Tokens.CollectionUtilities.IsNullOrEmpty(xs); }";
        let aliased = "using CU = Microsoft.IdentityModel.Tokens.CollectionUtilities;\nclass A { bool M(int[] xs) => CU.IsNullOrEmpty(xs); }";
        let bare = "using static Microsoft.IdentityModel.Tokens.CollectionUtilities;\nclass A { bool M(int[] xs) => IsNullOrEmpty(xs); }";
        let expected = Some("Microsoft.IdentityModel.Tokens.CollectionUtilities.IsNullOrEmpty");

        for source in [imported, qualified, aliased, bare] {
            assert_eq!(resolve(source, "IsNullOrEmpty").as_deref(), expected, "{source}");
        }
    }

    #[test]
    fn test_string_static_method() {
        let source = "using Microsoft.IdentityModel.Tokens;\nclass A { bool M(string s) => string.IsNullOrEmpty(s); }";

        assert_eq!(
            resolve(source, "IsNullOrEmpty").as_deref(),
            Some("System.String.IsNullOrEmpty")
        );
    }

    #[test]
    fn test_receiver_type_must_fit() {
        let source = "using Microsoft.IdentityModel.Tokens;\nclass A { bool M(int count) => count.IsNullOrEmpty(); }";
        assert_eq!(resolve(source, "IsNullOrEmpty"), None);

        let text = "using Microsoft.IdentityModel.Tokens;\nclass A { bool M(string s) => s.IsNullOrEmpty(); }";
        assert!(resolve(text, "IsNullOrEmpty").is_some());
    }

    #[test]
    fn test_local_and_pattern_receivers() {
        let inferred = "using Microsoft.IdentityModel.Tokens;\nclass A { bool M() { var xs = new List<int>(); return xs.IsNullOrEmpty(); } }";
        let pattern = "using Microsoft.IdentityModel.Tokens;\nclass A { bool M(object o) => o is List<int> xs && xs.IsNullOrEmpty(); }";
        let field = "using Microsoft.IdentityModel.Tokens;\nclass A { private List<int> _xs; bool M() => _xs.IsNullOrEmpty(); }";
        let number = "using Microsoft.IdentityModel.Tokens;\nclass A { bool M() { var n = 3; return n.IsNullOrEmpty(); } }";

        assert!(resolve(inferred, "IsNullOrEmpty").is_some());
        assert!(resolve(pattern, "IsNullOrEmpty").is_some());
        assert!(resolve(field, "IsNullOrEmpty").is_some());
        assert_eq!(resolve(number, "IsNullOrEmpty"), None);
    }

    #[test]
    fn test_bare_call_binds_enclosing_method() {
        let source = "using static Microsoft.IdentityModel.Tokens.CollectionUtilities;\nclass A { static bool IsNullOrEmpty(int[] xs) => false; bool M(int[] xs) => IsNullOrEmpty(xs); }";

        assert_eq!(resolve(source, "IsNullOrEmpty").as_deref(), Some("A.IsNullOrEmpty"));
    }

    #[test]
    fn test_nested_namespace_levels() {
        let source = format!(
            "namespace Outer {{ static class Ext {{ {SEQUENCE_EXT} }} }}\nnamespace Outer.Inner {{ class C {{ bool M(int[] xs) => xs.IsNullOrEmpty(); }} }}"
        );

        assert_eq!(
            resolve(&source, "IsNullOrEmpty").as_deref(),
            Some("Outer.Ext.IsNullOrEmpty")
        );
    }

    #[test]
    fn test_type_lookup_name() {
        assert_eq!(type_lookup_name("global::System.Collections.Generic.List<int>?"), "System.Collections.Generic.List");
        assert_eq!(type_lookup_name("int[]"), "int");
        assert_eq!(base_name("string"), "String");
        assert!(is_array("int[]?"));
    }

    #[test]
    fn test_model_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SemanticModel>();
    }
}
