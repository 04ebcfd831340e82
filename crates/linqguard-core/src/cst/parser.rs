//! Hierarchical parser for the C# subset
//!
//! Builds a lossless CST from the token stream. Trivia is attached the way
//! Roslyn attaches it: a token owns the trivia after it up to and including
//! the first line break, and everything else before the next token is that
//! token's leading trivia. Constructs the parser does not model are kept as
//! balanced token runs inside `OpaqueMember` nodes so the tree still
//! round-trips.

use rowan::Checkpoint;

use super::lexer::LexerError;
use super::{CstBuilder, CstToken, CsSyntaxKind, CsSyntaxNode};

use super::CsSyntaxKind as K;

/// Binding power of prefix operators
const UNARY_BP: u8 = 29;
/// Patterns stop before relational operators bind the rest of the expression
const PATTERN_OPERAND_BP: u8 = 21;
/// Expressions and statements nested deeper than this become `Error` nodes
const MAX_DEPTH: usize = 256;

/// Parse C# source into a hierarchical CST
///
/// Returns the tree together with lexer and parser diagnostics. The tree
/// text always equals `source`.
///
/// # Example
///
/// ```rust,ignore
/// use linqguard_core::cst::parse_csharp;
///
/// let source = "class A { void M() { x.Foo(); } }";
/// let (cst, errors) = parse_csharp(source);
/// assert!(errors.is_empty());
/// assert_eq!(cst.text().to_string(), source);
/// ```
pub fn parse_csharp(source: &str) -> (CsSyntaxNode, Vec<LexerError>) {
    let (tokens, mut errors) = super::lex_with_trivia(source);
    let mut parser = Parser::new(&tokens);
    parser.parse_compilation_unit();
    let (green, parse_errors) = parser.finish();
    errors.extend(parse_errors);
    (CsSyntaxNode::new_root(green), errors)
}

/// Token stream parser
struct Parser<'a> {
    tokens: &'a [CstToken],
    /// Indices of non-trivia tokens in `tokens`
    significant: Vec<usize>,
    /// Position in `significant`
    pos: usize,
    /// Number of raw tokens already handed to the builder
    emitted: usize,
    last_bumped: CsSyntaxKind,
    /// Current expression and statement nesting
    depth: usize,
    type_names: Vec<String>,
    builder: CstBuilder,
    errors: Vec<LexerError>,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [CstToken]) -> Self {
        let significant = tokens
            .iter()
            .enumerate()
            .filter(|(_, token)| !token.kind.is_trivia())
            .map(|(index, _)| index)
            .collect();
        Self {
            tokens,
            significant,
            pos: 0,
            emitted: 0,
            last_bumped: K::Eof,
            depth: 0,
            type_names: Vec::new(),
            builder: CstBuilder::new(),
            errors: Vec::new(),
        }
    }

    fn finish(self) -> (rowan::GreenNode, Vec<LexerError>) {
        (self.builder.finish(), self.errors)
    }

    // ==================
    // Declarations
    // ==================

    fn parse_compilation_unit(&mut self) {
        self.builder.start_node(K::CompilationUnit);
        self.usings();
        while !self.at_end() {
            self.members(true);
            if self.at(K::RBrace) {
                self.error_and_bump("unmatched `}`");
            }
        }
        self.emit_remaining();
        self.builder.finish_node();
    }

    fn usings(&mut self) {
        while self.at_using_directive() {
            self.using_directive();
        }
    }

    fn at_using_directive(&self) -> bool {
        if self.at_contextual("global") && self.nth(1) == K::UsingKw {
            return true;
        }
        self.at(K::UsingKw) && self.nth(1) != K::LParen && !self.nth_is_contextual(1, "var")
    }

    fn using_directive(&mut self) {
        self.builder.start_node(K::UsingDirective);
        if self.at_contextual("global") {
            self.bump();
        }
        self.expect(K::UsingKw);
        if self.at(K::StaticKw) {
            self.bump();
        }
        if self.at(K::Ident) && self.nth(1) == K::Eq {
            self.bump();
            self.bump();
        }
        self.name();
        self.expect(K::Semicolon);
        self.builder.finish_node();
    }

    /// Qualified name such as `System.Collections.Generic`
    fn name(&mut self) {
        self.builder.start_node(K::Name);
        self.expect(K::Ident);
        loop {
            if matches!(self.current(), K::Dot | K::ColonColon) && self.nth(1) == K::Ident {
                self.bump();
                self.bump();
            } else if self.at(K::Lt) {
                self.type_arg_list();
            } else {
                break;
            }
        }
        self.builder.finish_node();
    }

    fn members(&mut self, top_level: bool) {
        while !self.at_end() && !self.at(K::RBrace) {
            let before = self.pos;
            if top_level && !self.looks_like_type_member() {
                self.statement();
            } else {
                self.member();
            }
            if self.pos == before {
                self.error_and_bump("expected a declaration");
            }
        }
    }

    /// Whether the tokens ahead start a namespace or type declaration
    fn looks_like_type_member(&self) -> bool {
        let mut i = self.pos;
        while self.kind_at(i) == K::LBracket {
            i = self.scan_balanced(i);
        }
        while self.is_modifier_at(i) {
            i += 1;
        }
        match self.kind_at(i) {
            K::NamespaceKw | K::ClassKw | K::StructKw | K::InterfaceKw | K::EnumKw => true,
            K::DelegateKw => self.kind_at(i + 1) != K::LParen && self.kind_at(i + 1) != K::LBrace,
            K::Ident => self.text_at(i) == "record" && self.kind_at(i + 1) != K::Eq,
            _ => false,
        }
    }

    fn is_modifier_at(&self, i: usize) -> bool {
        let kind = self.kind_at(i);
        if kind.is_modifier() {
            return true;
        }
        kind == K::Ident
            && matches!(self.text_at(i), "async" | "partial" | "required" | "file")
            && (self.kind_at(i + 1) == K::Ident
                || self.kind_at(i + 1).is_keyword()
                || self.kind_at(i + 1) == K::LParen && self.text_at(i) == "async")
    }

    fn member(&mut self) {
        let cp = self.builder.checkpoint();
        while self.at(K::LBracket) {
            self.attribute_list();
        }
        while self.is_modifier_at(self.pos) {
            self.bump();
        }

        match self.current() {
            K::NamespaceKw => self.namespace_decl(cp),
            K::ClassKw | K::StructKw | K::InterfaceKw => self.type_decl(cp),
            K::Ident if self.at_contextual("record") && self.nth(1) != K::Eq => self.type_decl(cp),
            K::EnumKw => self.enum_decl(cp),
            K::Ident if self.nth(1) == K::LParen && self.is_current_type_name() => {
                self.constructor_decl(cp)
            }
            _ => match self.scan_type(self.pos) {
                Some(after) if self.kind_at(after) == K::Ident => match self.kind_at(after + 1) {
                    K::LParen | K::Lt => self.method_decl(cp),
                    K::LBrace | K::FatArrow => self.property_decl(cp),
                    K::Eq | K::Semicolon | K::Comma => self.field_decl(cp),
                    _ => self.opaque_member(cp),
                },
                _ => self.opaque_member(cp),
            },
        }
    }

    fn is_current_type_name(&self) -> bool {
        self.type_names
            .last()
            .is_some_and(|name| name == self.current_text())
    }

    fn attribute_list(&mut self) {
        self.builder.start_node(K::AttributeList);
        self.bump_balanced();
        self.builder.finish_node();
    }

    fn namespace_decl(&mut self, cp: Checkpoint) {
        self.bump();
        self.name();
        if self.at(K::Semicolon) {
            self.bump();
            self.usings();
            while !self.at_end() {
                self.members(false);
                if self.at(K::RBrace) {
                    self.error_and_bump("unmatched `}`");
                }
            }
        } else {
            self.expect(K::LBrace);
            self.usings();
            self.members(false);
            self.expect(K::RBrace);
            self.eat(K::Semicolon);
        }
        self.builder.start_node_at(cp, K::NamespaceDecl);
        self.builder.finish_node();
    }

    fn type_decl(&mut self, cp: Checkpoint) {
        if self.at_contextual("record") {
            self.bump();
            if matches!(self.current(), K::ClassKw | K::StructKw) {
                self.bump();
            }
        } else {
            self.bump();
        }

        let name = self.current_text().to_string();
        self.expect(K::Ident);
        self.type_names.push(name);

        if self.at(K::Lt) {
            self.type_param_list();
        }
        if self.at(K::LParen) {
            self.param_list();
        }
        if self.at(K::Colon) {
            self.base_list();
        }
        while self.at_contextual("where") {
            self.constraint_clause();
        }
        if self.at(K::LBrace) {
            self.bump();
            self.members(false);
            self.expect(K::RBrace);
            self.eat(K::Semicolon);
        } else {
            self.expect(K::Semicolon);
        }

        self.type_names.pop();
        self.builder.start_node_at(cp, K::TypeDecl);
        self.builder.finish_node();
    }

    fn type_param_list(&mut self) {
        self.builder.start_node(K::TypeParamList);
        self.bump();
        loop {
            while self.at(K::LBracket) {
                self.attribute_list();
            }
            if matches!(self.current(), K::InKw | K::OutKw) {
                self.bump();
            }
            self.expect(K::Ident);
            if !self.eat(K::Comma) {
                break;
            }
        }
        self.expect(K::Gt);
        self.builder.finish_node();
    }

    fn base_list(&mut self) {
        self.builder.start_node(K::BaseList);
        self.bump();
        loop {
            self.type_();
            if self.at(K::LParen) {
                self.arg_list();
            }
            if !self.eat(K::Comma) {
                break;
            }
        }
        self.builder.finish_node();
    }

    fn constraint_clause(&mut self) {
        self.builder.start_node(K::ConstraintClause);
        self.bump();
        while !self.at_end()
            && !matches!(self.current(), K::LBrace | K::FatArrow | K::Semicolon)
            && !self.at_contextual("where")
        {
            if matches!(self.current(), K::LParen | K::LBracket) {
                self.bump_balanced();
            } else {
                self.bump();
            }
        }
        self.builder.finish_node();
    }

    fn enum_decl(&mut self, cp: Checkpoint) {
        self.bump();
        self.expect(K::Ident);
        if self.at(K::Colon) {
            self.bump();
            self.type_();
        }
        if self.at(K::LBrace) {
            self.bump_balanced();
        } else {
            self.error("expected `{`");
        }
        self.eat(K::Semicolon);
        self.builder.start_node_at(cp, K::EnumDecl);
        self.builder.finish_node();
    }

    /// Any member the parser does not model: operators, indexers, events,
    /// delegates, finalizers and explicit interface implementations
    fn opaque_member(&mut self, cp: Checkpoint) {
        let start = self.pos;
        loop {
            match self.current() {
                K::Semicolon => {
                    self.bump();
                    break;
                }
                K::LBrace => {
                    self.bump_balanced();
                    if !matches!(self.current(), K::Semicolon | K::FatArrow | K::Eq) {
                        break;
                    }
                }
                K::LParen | K::LBracket => self.bump_balanced(),
                K::RBrace | K::Eof => break,
                _ => self.bump(),
            }
        }
        if self.pos == start && !self.at_end() && !self.at(K::RBrace) {
            self.error_and_bump("unexpected token in member position");
        }
        self.builder.start_node_at(cp, K::OpaqueMember);
        self.builder.finish_node();
    }

    fn method_decl(&mut self, cp: Checkpoint) {
        self.type_();
        self.expect(K::Ident);
        if self.at(K::Lt) {
            self.type_param_list();
        }
        self.param_list();
        while self.at_contextual("where") {
            self.constraint_clause();
        }
        self.member_body();
        self.builder.start_node_at(cp, K::MethodDecl);
        self.builder.finish_node();
    }

    fn constructor_decl(&mut self, cp: Checkpoint) {
        self.bump();
        self.param_list();
        if self.at(K::Colon) {
            self.bump();
            if matches!(self.current(), K::ThisKw | K::BaseKw) {
                self.bump();
            } else {
                self.error("expected `this` or `base`");
            }
            if self.at(K::LParen) {
                self.arg_list();
            }
        }
        self.member_body();
        self.builder.start_node_at(cp, K::ConstructorDecl);
        self.builder.finish_node();
    }

    fn member_body(&mut self) {
        match self.current() {
            K::LBrace => self.block(),
            K::FatArrow => {
                self.expr_body();
                self.expect(K::Semicolon);
            }
            _ => self.expect(K::Semicolon),
        }
    }

    fn expr_body(&mut self) {
        self.builder.start_node(K::ExprBody);
        self.bump();
        if !self.expr() {
            self.error("expected expression");
        }
        self.builder.finish_node();
    }

    fn property_decl(&mut self, cp: Checkpoint) {
        self.type_();
        self.expect(K::Ident);
        if self.at(K::LBrace) {
            self.accessor_list();
            if self.at(K::Eq) {
                self.bump();
                self.variable_initializer();
                self.expect(K::Semicolon);
            }
        } else {
            self.expr_body();
            self.expect(K::Semicolon);
        }
        self.builder.start_node_at(cp, K::PropertyDecl);
        self.builder.finish_node();
    }

    fn accessor_list(&mut self) {
        self.builder.start_node(K::AccessorList);
        self.bump();
        while !self.at_end() && !self.at(K::RBrace) {
            let before = self.pos;
            self.builder.start_node(K::Accessor);
            while self.at(K::LBracket) {
                self.attribute_list();
            }
            while self.current().is_modifier() {
                self.bump();
            }
            if self.at(K::Ident) {
                self.bump();
            }
            match self.current() {
                K::LBrace => self.block(),
                K::FatArrow => {
                    self.expr_body();
                    self.expect(K::Semicolon);
                }
                K::Semicolon => self.bump(),
                _ => {}
            }
            self.builder.finish_node();
            if self.pos == before {
                self.error_and_bump("expected accessor");
            }
        }
        self.expect(K::RBrace);
        self.builder.finish_node();
    }

    fn field_decl(&mut self, cp: Checkpoint) {
        self.type_();
        self.variable_declarators();
        self.expect(K::Semicolon);
        self.builder.start_node_at(cp, K::FieldDecl);
        self.builder.finish_node();
    }

    fn variable_declarators(&mut self) {
        loop {
            self.builder.start_node(K::VariableDeclarator);
            self.expect(K::Ident);
            if self.eat(K::Eq) {
                self.variable_initializer();
            }
            self.builder.finish_node();
            if !self.eat(K::Comma) {
                break;
            }
        }
    }

    fn variable_initializer(&mut self) {
        if self.at(K::LBrace) {
            self.initializer_expr();
        } else if !self.expr() {
            self.error("expected initializer");
        }
    }

    fn param_list(&mut self) {
        self.builder.start_node(K::ParamList);
        self.expect(K::LParen);
        if !self.at(K::RParen) {
            loop {
                let before = self.pos;
                self.param();
                if self.pos == before {
                    break;
                }
                if !self.eat(K::Comma) {
                    break;
                }
            }
        }
        self.expect(K::RParen);
        self.builder.finish_node();
    }

    fn param(&mut self) {
        self.builder.start_node(K::Param);
        while self.at(K::LBracket) {
            self.attribute_list();
        }
        while matches!(
            self.current(),
            K::ThisKw | K::RefKw | K::OutKw | K::InKw | K::ParamsKw | K::ReadonlyKw
        ) || self.at_contextual("scoped") && self.nth(1) != K::Comma && self.nth(1) != K::RParen
        {
            self.bump();
        }
        if self.type_() {
            self.expect(K::Ident);
            if self.eat(K::Eq) && !self.expr() {
                self.error("expected default value");
            }
        }
        self.builder.finish_node();
    }

    // ==================
    // Types
    // ==================

    /// Parse a type, returning false (and consuming nothing) if none starts here
    fn type_(&mut self) -> bool {
        match self.scan_type(self.pos) {
            Some(end) => {
                self.emit_type(end);
                true
            }
            None => {
                self.error("expected type");
                false
            }
        }
    }

    /// Emit a `Type` node covering tokens up to `end`, which `scan_type`
    /// has already validated
    fn emit_type(&mut self, end: usize) {
        self.builder.start_node(K::Type);
        if self.at(K::LParen) {
            self.bump();
            loop {
                let Some(element_end) = self.scan_type(self.pos) else {
                    break;
                };
                self.emit_type(element_end);
                if self.at(K::Ident) {
                    self.bump();
                }
                if !self.eat(K::Comma) {
                    break;
                }
            }
            self.expect(K::RParen);
        } else {
            self.bump();
        }
        while self.pos < end && !self.at_end() {
            if self.at(K::Lt) {
                self.type_arg_list();
            } else {
                self.bump();
            }
        }
        self.builder.finish_node();
    }

    fn type_arg_list(&mut self) {
        self.builder.start_node(K::TypeArgList);
        self.bump();
        loop {
            let Some(end) = self.scan_type(self.pos) else {
                break;
            };
            self.emit_type(end);
            if !self.eat(K::Comma) {
                break;
            }
        }
        self.expect(K::Gt);
        self.builder.finish_node();
    }

    /// Look ahead for a type starting at significant index `i`, returning
    /// the index just past it
    fn scan_type(&self, i: usize) -> Option<usize> {
        let mut i = i;
        match self.kind_at(i) {
            K::LParen => {
                i += 1;
                let mut elements = 0;
                loop {
                    i = self.scan_type(i)?;
                    if self.kind_at(i) == K::Ident {
                        i += 1;
                    }
                    elements += 1;
                    if self.kind_at(i) == K::Comma {
                        i += 1;
                        continue;
                    }
                    break;
                }
                if self.kind_at(i) != K::RParen || elements < 2 {
                    return None;
                }
                i += 1;
            }
            kind if kind == K::Ident || kind.is_predefined_type() => {
                i += 1;
                loop {
                    if self.kind_at(i) == K::Lt {
                        i = self.scan_type_args(i)?;
                    }
                    if matches!(self.kind_at(i), K::Dot | K::ColonColon)
                        && self.kind_at(i + 1) == K::Ident
                    {
                        i += 2;
                        continue;
                    }
                    break;
                }
            }
            _ => return None,
        }

        loop {
            match self.kind_at(i) {
                K::Question => i += 1,
                K::LBracket if matches!(self.kind_at(i + 1), K::RBracket | K::Comma) => {
                    i += 1;
                    while self.kind_at(i) == K::Comma {
                        i += 1;
                    }
                    if self.kind_at(i) != K::RBracket {
                        return None;
                    }
                    i += 1;
                }
                _ => break,
            }
        }
        Some(i)
    }

    fn scan_type_args(&self, i: usize) -> Option<usize> {
        let mut i = i + 1;
        loop {
            i = self.scan_type(i)?;
            match self.kind_at(i) {
                K::Comma => i += 1,
                K::Gt => return Some(i + 1),
                _ => return None,
            }
        }
    }

    /// Whether `<` at `i` opens a generic argument list in expression context
    fn generic_args_follow(&self, i: usize) -> bool {
        if self.kind_at(i) != K::Lt {
            return false;
        }
        let Some(after) = self.scan_type_args(i) else {
            return false;
        };
        matches!(
            self.kind_at(after),
            K::LParen
                | K::RParen
                | K::RBracket
                | K::RBrace
                | K::Semicolon
                | K::Comma
                | K::Dot
                | K::QuestionDot
                | K::Colon
                | K::EqEq
                | K::BangEq
                | K::Eof
        )
    }

    // ==================
    // Statements
    // ==================

    fn block(&mut self) {
        self.builder.start_node(K::Block);
        self.expect(K::LBrace);
        while !self.at_end() && !self.at(K::RBrace) {
            let before = self.pos;
            self.statement();
            if self.pos == before {
                self.error_and_bump("expected statement");
            }
        }
        self.expect(K::RBrace);
        self.builder.finish_node();
    }

    fn statement(&mut self) {
        if self.depth >= MAX_DEPTH {
            self.skip_too_deep();
            return;
        }
        self.depth += 1;
        self.statement_inner();
        self.depth -= 1;
    }

    fn statement_inner(&mut self) {
        match self.current() {
            K::LBrace => self.block(),
            K::Semicolon => self.simple_statement(K::EmptyStmt),
            K::IfKw => self.if_stmt(),
            K::WhileKw => {
                self.builder.start_node(K::WhileStmt);
                self.bump();
                self.paren_condition();
                self.statement();
                self.builder.finish_node();
            }
            K::DoKw => {
                self.builder.start_node(K::DoStmt);
                self.bump();
                self.statement();
                self.expect(K::WhileKw);
                self.paren_condition();
                self.expect(K::Semicolon);
                self.builder.finish_node();
            }
            K::ForKw => self.for_stmt(),
            K::ForeachKw => self.foreach_stmt(),
            K::ReturnKw => self.keyword_expr_stmt(K::ReturnStmt),
            K::ThrowKw => self.keyword_expr_stmt(K::ThrowStmt),
            K::BreakKw => self.simple_statement(K::BreakStmt),
            K::ContinueKw => self.simple_statement(K::ContinueStmt),
            K::TryKw => self.try_stmt(),
            K::LockKw => {
                self.builder.start_node(K::LockStmt);
                self.bump();
                self.paren_condition();
                self.statement();
                self.builder.finish_node();
            }
            K::UsingKw => self.using_stmt(),
            K::SwitchKw => self.switch_stmt(),
            K::Ident
                if self.at_contextual("yield")
                    && matches!(self.nth(1), K::ReturnKw | K::BreakKw) =>
            {
                self.builder.start_node(K::YieldStmt);
                self.bump();
                self.bump();
                if !self.at(K::Semicolon) && !self.expr() {
                    self.error("expected expression");
                }
                self.expect(K::Semicolon);
                self.builder.finish_node();
            }
            K::ConstKw => self.local_decl(true),
            _ if self.is_local_function() => {
                let cp = self.builder.checkpoint();
                while self.is_modifier_at(self.pos) {
                    self.bump();
                }
                self.method_decl(cp);
            }
            _ if self.is_local_decl() => self.local_decl(true),
            _ => self.expr_stmt(),
        }
    }

    fn simple_statement(&mut self, kind: CsSyntaxKind) {
        self.builder.start_node(kind);
        self.bump();
        self.expect(K::Semicolon);
        self.builder.finish_node();
    }

    fn keyword_expr_stmt(&mut self, kind: CsSyntaxKind) {
        self.builder.start_node(kind);
        self.bump();
        if !self.at(K::Semicolon) && !self.expr() {
            self.error("expected expression");
        }
        self.expect(K::Semicolon);
        self.builder.finish_node();
    }

    fn paren_condition(&mut self) {
        self.expect(K::LParen);
        if !self.expr() {
            self.error("expected condition");
        }
        self.expect(K::RParen);
    }

    fn if_stmt(&mut self) {
        self.builder.start_node(K::IfStmt);
        self.bump();
        self.paren_condition();
        self.statement();
        if self.at(K::ElseKw) {
            self.builder.start_node(K::ElseClause);
            self.bump();
            self.statement();
            self.builder.finish_node();
        }
        self.builder.finish_node();
    }

    fn for_stmt(&mut self) {
        self.builder.start_node(K::ForStmt);
        self.bump();
        self.expect(K::LParen);
        if !self.at(K::Semicolon) {
            if self.is_local_decl() {
                self.local_decl(false);
            } else {
                self.expr_list();
            }
        }
        self.expect(K::Semicolon);
        if !self.at(K::Semicolon) && !self.expr() {
            self.error("expected condition");
        }
        self.expect(K::Semicolon);
        if !self.at(K::RParen) {
            self.expr_list();
        }
        self.expect(K::RParen);
        self.statement();
        self.builder.finish_node();
    }

    fn expr_list(&mut self) {
        loop {
            if !self.expr() {
                self.error("expected expression");
                break;
            }
            if !self.eat(K::Comma) {
                break;
            }
        }
    }

    fn foreach_stmt(&mut self) {
        self.builder.start_node(K::ForeachStmt);
        self.bump();
        self.expect(K::LParen);
        if self.type_() {
            if self.at(K::LParen) {
                self.bump_balanced();
            } else {
                self.expect(K::Ident);
            }
        }
        self.expect(K::InKw);
        if !self.expr() {
            self.error("expected collection");
        }
        self.expect(K::RParen);
        self.statement();
        self.builder.finish_node();
    }

    fn using_stmt(&mut self) {
        self.builder.start_node(K::UsingStmt);
        self.bump();
        if self.at(K::LParen) {
            self.bump();
            if self.is_local_decl() {
                self.local_decl(false);
            } else if !self.expr() {
                self.error("expected resource");
            }
            self.expect(K::RParen);
            self.statement();
        } else {
            self.local_decl(false);
            self.expect(K::Semicolon);
        }
        self.builder.finish_node();
    }

    fn try_stmt(&mut self) {
        self.builder.start_node(K::TryStmt);
        self.bump();
        self.block();
        while self.at(K::CatchKw) {
            self.builder.start_node(K::CatchClause);
            self.bump();
            if self.at(K::LParen) {
                self.bump();
                self.type_();
                if self.at(K::Ident) {
                    self.bump();
                }
                self.expect(K::RParen);
            }
            if self.at_contextual("when") {
                self.bump();
                self.paren_condition();
            }
            self.block();
            self.builder.finish_node();
        }
        if self.at(K::FinallyKw) {
            self.builder.start_node(K::FinallyClause);
            self.bump();
            self.block();
            self.builder.finish_node();
        }
        self.builder.finish_node();
    }

    fn switch_stmt(&mut self) {
        self.builder.start_node(K::SwitchStmt);
        self.bump();
        self.paren_condition();
        self.expect(K::LBrace);
        while !self.at_end() && !self.at(K::RBrace) {
            let before = self.pos;
            self.switch_section();
            if self.pos == before {
                self.error_and_bump("expected `case` or `default`");
            }
        }
        self.expect(K::RBrace);
        self.builder.finish_node();
    }

    fn at_default_label(&self) -> bool {
        self.at(K::DefaultKw) && self.nth(1) == K::Colon
    }

    fn switch_section(&mut self) {
        self.builder.start_node(K::SwitchSection);
        loop {
            if self.at(K::CaseKw) {
                self.bump();
                self.pattern();
                if self.at_contextual("when") {
                    self.bump();
                    if !self.expr() {
                        self.error("expected guard");
                    }
                }
                self.expect(K::Colon);
            } else if self.at_default_label() {
                self.bump();
                self.bump();
            } else {
                break;
            }
        }
        while !self.at_end()
            && !self.at(K::RBrace)
            && !self.at(K::CaseKw)
            && !self.at_default_label()
        {
            let before = self.pos;
            self.statement();
            if self.pos == before {
                self.error_and_bump("expected statement");
            }
        }
        self.builder.finish_node();
    }

    fn is_local_decl(&self) -> bool {
        if self.at(K::ConstKw) {
            return true;
        }
        let mut i = self.pos;
        if self.kind_at(i) == K::RefKw || self.nth_is_contextual(0, "scoped") {
            i += 1;
        }
        if matches!(self.text_at(i), "await" | "yield" | "nameof") {
            return false;
        }
        match self.scan_type(i) {
            Some(after) => {
                self.kind_at(after) == K::Ident
                    && matches!(self.kind_at(after + 1), K::Eq | K::Semicolon | K::Comma | K::InKw)
            }
            None => false,
        }
    }

    fn is_local_function(&self) -> bool {
        let mut i = self.pos;
        while self.kind_at(i) == K::StaticKw
            || self.kind_at(i) == K::UnsafeKw
            || self.kind_at(i) == K::Ident && self.text_at(i) == "async"
        {
            i += 1;
        }
        if matches!(self.text_at(i), "await" | "yield") {
            return false;
        }
        match self.scan_type(i) {
            Some(after) => {
                self.kind_at(after) == K::Ident
                    && matches!(self.kind_at(after + 1), K::LParen | K::Lt)
                    && self.local_function_body_follows(after + 1)
            }
            None => false,
        }
    }

    fn local_function_body_follows(&self, i: usize) -> bool {
        let mut i = i;
        if self.kind_at(i) == K::Lt {
            match self.scan_type_args(i) {
                Some(after) => i = after,
                None => return false,
            }
        }
        if self.kind_at(i) != K::LParen {
            return false;
        }
        let after = self.scan_balanced(i);
        matches!(self.kind_at(after), K::LBrace | K::FatArrow)
            || self.kind_at(after) == K::Ident && self.text_at(after) == "where"
    }

    fn local_decl(&mut self, with_semicolon: bool) {
        self.builder.start_node(K::LocalDeclStmt);
        if self.at(K::ConstKw) || self.at(K::RefKw) || self.at_contextual("scoped") {
            self.bump();
        }
        self.type_();
        self.variable_declarators();
        if with_semicolon {
            self.expect(K::Semicolon);
        }
        self.builder.finish_node();
    }

    fn expr_stmt(&mut self) {
        self.builder.start_node(K::ExprStmt);
        if self.expr() {
            self.expect(K::Semicolon);
        } else if !self.at(K::RBrace) {
            self.error_and_bump("expected expression");
            self.eat(K::Semicolon);
        }
        self.builder.finish_node();
    }

    // ==================
    // Expressions
    // ==================

    fn expr(&mut self) -> bool {
        self.expr_bp(0)
    }

    fn expr_bp(&mut self, min_bp: u8) -> bool {
        if self.depth >= MAX_DEPTH {
            return self.can_start_expr() && self.skip_too_deep();
        }
        self.depth += 1;
        let parsed = self.expr_bp_inner(min_bp);
        self.depth -= 1;
        parsed
    }

    fn expr_bp_inner(&mut self, min_bp: u8) -> bool {
        let cp = self.builder.checkpoint();
        if !self.unary() {
            return false;
        }

        loop {
            if self.at(K::SwitchKw) && self.nth(1) == K::LBrace {
                if UNARY_BP - 2 < min_bp {
                    break;
                }
                self.bump();
                self.bump_balanced();
                self.builder.start_node_at(cp, K::SwitchExpr);
                self.builder.finish_node();
                continue;
            }

            let Some((left_bp, right_bp, node)) = self.infix_op() else {
                break;
            };
            if left_bp < min_bp {
                break;
            }

            match self.current() {
                K::IsKw => {
                    self.bump();
                    self.pattern();
                }
                K::AsKw => {
                    self.bump();
                    self.type_();
                }
                K::Question => {
                    self.bump();
                    if !self.expr() {
                        self.error("expected expression");
                    }
                    self.expect(K::Colon);
                    if !self.expr_bp(right_bp) {
                        self.error("expected expression");
                    }
                }
                K::DotDot => {
                    self.bump();
                    if self.can_start_expr() {
                        self.expr_bp(right_bp);
                    }
                }
                K::Gt if self.at_shift_right() => {
                    self.bump();
                    self.bump();
                    if !self.expr_bp(right_bp) {
                        self.error("expected expression");
                    }
                }
                _ => {
                    self.bump();
                    if !self.expr_bp(right_bp) {
                        self.error("expected expression");
                    }
                }
            }
            self.builder.start_node_at(cp, node);
            self.builder.finish_node();
        }
        true
    }

    fn at_shift_right(&self) -> bool {
        self.at(K::Gt) && self.nth(1) == K::Gt && self.adjacent(self.pos, self.pos + 1)
    }

    fn infix_op(&self) -> Option<(u8, u8, CsSyntaxKind)> {
        let op = match self.current() {
            K::Eq
            | K::PlusEq
            | K::MinusEq
            | K::StarEq
            | K::SlashEq
            | K::PercentEq
            | K::AmpEq
            | K::PipeEq
            | K::CaretEq
            | K::LtLtEq
            | K::QuestionQuestionEq => (2, 1, K::AssignExpr),
            K::Question => (4, 3, K::ConditionalExpr),
            K::QuestionQuestion => (6, 5, K::BinaryExpr),
            K::PipePipe => (7, 8, K::BinaryExpr),
            K::AmpAmp => (9, 10, K::BinaryExpr),
            K::Pipe => (11, 12, K::BinaryExpr),
            K::Caret => (13, 14, K::BinaryExpr),
            K::Amp => (15, 16, K::BinaryExpr),
            K::EqEq | K::BangEq => (17, 18, K::BinaryExpr),
            K::Gt if self.at_shift_right() => (21, 22, K::BinaryExpr),
            K::Lt | K::Gt | K::LtEq | K::GtEq => (19, 20, K::BinaryExpr),
            K::IsKw => (19, 20, K::IsPatternExpr),
            K::AsKw => (19, 20, K::AsExpr),
            K::LtLt => (21, 22, K::BinaryExpr),
            K::Plus | K::Minus => (23, 24, K::BinaryExpr),
            K::Star | K::Slash | K::Percent => (25, 26, K::BinaryExpr),
            K::DotDot => (27, 28, K::BinaryExpr),
            _ => return None,
        };
        Some(op)
    }

    fn unary(&mut self) -> bool {
        match self.current() {
            K::Bang
            | K::Minus
            | K::Plus
            | K::Tilde
            | K::PlusPlus
            | K::MinusMinus
            | K::Amp
            | K::Star
            | K::Caret => {
                self.builder.start_node(K::PrefixExpr);
                self.bump();
                if !self.expr_bp(UNARY_BP) {
                    self.error("expected operand");
                }
                self.builder.finish_node();
                true
            }
            K::DotDot => {
                self.builder.start_node(K::PrefixExpr);
                self.bump();
                if self.can_start_expr() {
                    self.expr_bp(UNARY_BP);
                }
                self.builder.finish_node();
                true
            }
            K::ThrowKw => {
                self.builder.start_node(K::PrefixExpr);
                self.bump();
                if !self.expr() {
                    self.error("expected exception");
                }
                self.builder.finish_node();
                true
            }
            K::Ident if self.at_contextual("await") && self.can_start_expr_at(self.pos + 1) => {
                self.builder.start_node(K::PrefixExpr);
                self.bump();
                self.expr_bp(UNARY_BP);
                self.builder.finish_node();
                true
            }
            K::LParen if self.is_cast() => {
                self.builder.start_node(K::CastExpr);
                self.bump();
                self.type_();
                self.expect(K::RParen);
                if !self.expr_bp(UNARY_BP) {
                    self.error("expected operand");
                }
                self.builder.finish_node();
                true
            }
            _ => self.postfix(),
        }
    }

    fn is_cast(&self) -> bool {
        let Some(after) = self.scan_type(self.pos + 1) else {
            return false;
        };
        if self.kind_at(after) != K::RParen {
            return false;
        }
        if self.nth(1).is_predefined_type() && after == self.pos + 2 {
            return self.can_start_expr_at(after + 1) && self.kind_at(after + 1) != K::Dot;
        }
        let next = self.kind_at(after + 1);
        next == K::Ident
            || next.is_literal()
            || next.is_predefined_type()
            || matches!(
                next,
                K::ThisKw
                    | K::BaseKw
                    | K::NewKw
                    | K::LParen
                    | K::TypeofKw
                    | K::DefaultKw
                    | K::Bang
                    | K::Tilde
            )
    }

    fn postfix(&mut self) -> bool {
        let cp = self.builder.checkpoint();
        if !self.primary() {
            return false;
        }

        loop {
            match self.current() {
                K::Dot | K::QuestionDot | K::ColonColon => {
                    self.bump();
                    self.simple_name();
                    self.builder.start_node_at(cp, K::MemberAccessExpr);
                }
                K::LParen => {
                    self.arg_list();
                    self.builder.start_node_at(cp, K::CallExpr);
                }
                K::LBracket => {
                    self.bracket_arg_list();
                    self.builder.start_node_at(cp, K::ElementAccessExpr);
                }
                K::Question if self.nth(1) == K::LBracket && self.adjacent(self.pos, self.pos + 1) => {
                    self.bump();
                    self.bracket_arg_list();
                    self.builder.start_node_at(cp, K::ElementAccessExpr);
                }
                K::PlusPlus | K::MinusMinus => {
                    self.bump();
                    self.builder.start_node_at(cp, K::PostfixExpr);
                }
                K::Bang if self.null_forgiving_follows() => {
                    self.bump();
                    self.builder.start_node_at(cp, K::PostfixExpr);
                }
                _ => break,
            }
            self.builder.finish_node();
        }
        true
    }

    fn null_forgiving_follows(&self) -> bool {
        matches!(
            self.nth(1),
            K::Dot
                | K::QuestionDot
                | K::RParen
                | K::Semicolon
                | K::Comma
                | K::LBracket
                | K::RBracket
                | K::RBrace
                | K::Colon
                | K::PipePipe
                | K::AmpAmp
                | K::QuestionQuestion
                | K::EqEq
                | K::BangEq
                | K::Question
                | K::Eof
        )
    }

    fn simple_name(&mut self) {
        if !self.at(K::Ident) {
            self.error("expected name");
            return;
        }
        if self.generic_args_follow(self.pos + 1) {
            self.builder.start_node(K::GenericName);
            self.bump();
            self.type_arg_list();
        } else {
            self.builder.start_node(K::NameRef);
            self.bump();
        }
        self.builder.finish_node();
    }

    fn primary(&mut self) -> bool {
        match self.current() {
            K::Ident => {
                let async_lambda = self.at_contextual("async")
                    && (self.nth(1) == K::Ident && self.nth(2) == K::FatArrow
                        || self.nth(1) == K::LParen && self.paren_lambda_at(self.pos + 1));
                if self.nth(1) == K::FatArrow || async_lambda {
                    self.lambda();
                } else {
                    self.simple_name();
                }
            }
            kind if kind.is_literal() => self.leaf_node(K::Literal),
            K::InterpolatedStringStart => self.interpolated_string(),
            K::DefaultKw => {
                self.builder.start_node(K::DefaultExpr);
                self.bump();
                if self.at(K::LParen) {
                    self.bump();
                    self.type_();
                    self.expect(K::RParen);
                }
                self.builder.finish_node();
            }
            K::ThisKw => self.leaf_node(K::ThisExpr),
            K::BaseKw => self.leaf_node(K::BaseExpr),
            kind if kind.is_predefined_type() => self.leaf_node(K::PredefinedTypeExpr),
            K::LParen if self.paren_lambda_at(self.pos) => self.lambda(),
            K::StaticKw if self.nth(1) == K::Ident || self.nth(1) == K::LParen => self.lambda(),
            K::LParen => self.paren_or_tuple(),
            K::LBracket => self.collection_expr(),
            K::LBrace => self.initializer_expr(),
            K::NewKw => self.new_expr(),
            K::TypeofKw | K::SizeofKw => {
                self.builder.start_node(K::TypeofExpr);
                self.bump();
                self.expect(K::LParen);
                if matches!(self.current(), K::Ident) && self.nth(1) == K::Lt {
                    // unbound generics such as `typeof(List<>)`
                    while !self.at_end() && !self.at(K::RParen) {
                        self.bump();
                    }
                } else {
                    self.type_();
                }
                self.expect(K::RParen);
                self.builder.finish_node();
            }
            K::CheckedKw | K::UncheckedKw => {
                self.builder.start_node(K::ParenExpr);
                self.bump();
                self.paren_condition();
                self.builder.finish_node();
            }
            K::DelegateKw => {
                self.builder.start_node(K::LambdaExpr);
                self.bump();
                if self.at(K::LParen) {
                    self.param_list();
                }
                self.block();
                self.builder.finish_node();
            }
            _ => return false,
        }
        true
    }

    fn interpolated_string(&mut self) {
        self.builder.start_node(K::InterpolatedStringExpr);
        self.bump();
        loop {
            match self.current() {
                K::InterpolatedStringText => self.bump(),
                K::LBrace => self.interpolation(),
                K::InterpolatedStringEnd => {
                    self.bump();
                    break;
                }
                _ => {
                    self.error("unterminated interpolated string");
                    break;
                }
            }
        }
        self.builder.finish_node();
    }

    fn interpolation(&mut self) {
        self.builder.start_node(K::Interpolation);
        self.bump();
        if !self.expr() {
            self.error("expected expression");
        }
        if self.eat(K::Comma) && !self.expr() {
            self.error("expected alignment");
        }
        self.eat(K::InterpolationFormat);
        while !self.at_end() && !self.at(K::RBrace) && !self.at(K::InterpolatedStringEnd) {
            self.error("unexpected token in interpolation");
            self.builder.start_node(K::Error);
            if matches!(self.current(), K::LParen | K::LBracket | K::LBrace) {
                self.bump_balanced();
            } else {
                self.bump();
            }
            self.builder.finish_node();
        }
        self.expect(K::RBrace);
        self.builder.finish_node();
    }

    fn leaf_node(&mut self, kind: CsSyntaxKind) {
        self.builder.start_node(kind);
        self.bump();
        self.builder.finish_node();
    }

    fn paren_lambda_at(&self, i: usize) -> bool {
        self.kind_at(i) == K::LParen && self.kind_at(self.scan_balanced(i)) == K::FatArrow
    }

    fn lambda(&mut self) {
        self.builder.start_node(K::LambdaExpr);
        if self.at(K::StaticKw) {
            self.bump();
        }
        if self.at_contextual("async") && self.nth(1) != K::FatArrow {
            self.bump();
        }
        if self.at(K::LParen) {
            self.lambda_params();
        } else {
            self.builder.start_node(K::ParamList);
            self.builder.start_node(K::Param);
            self.expect(K::Ident);
            self.builder.finish_node();
            self.builder.finish_node();
        }
        self.expect(K::FatArrow);
        if self.at(K::LBrace) {
            self.block();
        } else if !self.expr() {
            self.error("expected lambda body");
        }
        self.builder.finish_node();
    }

    fn lambda_params(&mut self) {
        self.builder.start_node(K::ParamList);
        self.bump();
        while !self.at_end() && !self.at(K::RParen) {
            let before = self.pos;
            self.builder.start_node(K::Param);
            while matches!(self.current(), K::RefKw | K::OutKw | K::InKw) {
                self.bump();
            }
            match self.scan_type(self.pos) {
                Some(after) if self.kind_at(after) == K::Ident => {
                    self.emit_type(after);
                    self.bump();
                }
                _ => self.expect(K::Ident),
            }
            self.builder.finish_node();
            if self.pos == before {
                self.error_and_bump("expected parameter");
            }
            if !self.eat(K::Comma) {
                break;
            }
        }
        self.expect(K::RParen);
        self.builder.finish_node();
    }

    fn paren_or_tuple(&mut self) {
        let cp = self.builder.checkpoint();
        self.bump();
        self.tuple_element();
        let mut kind = K::ParenExpr;
        while self.eat(K::Comma) {
            kind = K::TupleExpr;
            self.tuple_element();
        }
        self.expect(K::RParen);
        self.builder.start_node_at(cp, kind);
        self.builder.finish_node();
    }

    fn tuple_element(&mut self) {
        if self.at(K::Ident) && self.nth(1) == K::Colon {
            self.bump();
            self.bump();
        }
        if !self.expr() {
            self.error("expected expression");
        }
    }

    fn collection_expr(&mut self) {
        self.builder.start_node(K::CollectionExpr);
        self.bump();
        while !self.at_end() && !self.at(K::RBracket) {
            if !self.expr() {
                self.error_and_bump("expected element");
            }
            if !self.eat(K::Comma) {
                break;
            }
        }
        self.expect(K::RBracket);
        self.builder.finish_node();
    }

    fn initializer_expr(&mut self) {
        self.builder.start_node(K::InitializerExpr);
        self.bump();
        while !self.at_end() && !self.at(K::RBrace) {
            if !self.expr() {
                self.error_and_bump("expected initializer element");
            }
            if !self.eat(K::Comma) {
                break;
            }
        }
        self.expect(K::RBrace);
        self.builder.finish_node();
    }

    fn new_expr(&mut self) {
        let cp = self.builder.checkpoint();
        self.bump();
        let kind = match self.current() {
            K::LBracket => {
                self.bump();
                while self.eat(K::Comma) {}
                self.expect(K::RBracket);
                if self.at(K::LBrace) {
                    self.initializer_expr();
                }
                K::ArrayCreationExpr
            }
            K::LParen => {
                self.arg_list();
                if self.at(K::LBrace) {
                    self.initializer_expr();
                }
                K::ObjectCreationExpr
            }
            K::LBrace => {
                self.initializer_expr();
                K::ObjectCreationExpr
            }
            _ => {
                self.type_();
                if self.at(K::LBracket) {
                    self.bracket_arg_list();
                    while self.at(K::LBracket) {
                        self.bump_balanced();
                    }
                    if self.at(K::LBrace) {
                        self.initializer_expr();
                    }
                    K::ArrayCreationExpr
                } else if self.last_bumped == K::RBracket {
                    if self.at(K::LBrace) {
                        self.initializer_expr();
                    }
                    K::ArrayCreationExpr
                } else {
                    if self.at(K::LParen) {
                        self.arg_list();
                    }
                    if self.at(K::LBrace) {
                        self.initializer_expr();
                    }
                    K::ObjectCreationExpr
                }
            }
        };
        self.builder.start_node_at(cp, kind);
        self.builder.finish_node();
    }

    fn arg_list(&mut self) {
        self.builder.start_node(K::ArgList);
        self.expect(K::LParen);
        self.args_until(K::RParen);
        self.expect(K::RParen);
        self.builder.finish_node();
    }

    fn bracket_arg_list(&mut self) {
        self.builder.start_node(K::ArgList);
        self.bump();
        self.args_until(K::RBracket);
        self.expect(K::RBracket);
        self.builder.finish_node();
    }

    fn args_until(&mut self, close: CsSyntaxKind) {
        while !self.at_end() && !self.at(close) {
            let before = self.pos;
            self.arg();
            if self.pos == before {
                self.error_and_bump("expected argument");
            }
            if !self.eat(K::Comma) {
                break;
            }
        }
    }

    fn arg(&mut self) {
        self.builder.start_node(K::Arg);
        if self.at(K::Ident) && self.nth(1) == K::Colon {
            self.bump();
            self.bump();
        }
        let is_out = self.at(K::OutKw);
        if matches!(self.current(), K::RefKw | K::OutKw | K::InKw) {
            self.bump();
        }
        let declaration = if is_out {
            self.scan_type(self.pos)
                .filter(|after| self.kind_at(*after) == K::Ident)
        } else {
            None
        };
        match declaration {
            Some(after) => {
                self.emit_type(after);
                self.bump();
            }
            None => {
                self.expr();
            }
        }
        self.builder.finish_node();
    }

    // ==================
    // Patterns
    // ==================

    fn pattern(&mut self) {
        self.primary_pattern();
        while (self.at_contextual("and") || self.at_contextual("or")) && self.can_start_pattern(1) {
            self.bump();
            self.primary_pattern();
        }
    }

    fn can_start_pattern(&self, n: usize) -> bool {
        let kind = self.nth(n);
        self.can_start_expr_at(self.pos + n) || matches!(kind, K::Lt | K::Gt | K::LtEq | K::GtEq)
    }

    fn primary_pattern(&mut self) {
        match self.current() {
            K::Ident if self.at_contextual("not") && self.can_start_pattern(1) => {
                self.builder.start_node(K::NotPattern);
                self.bump();
                self.primary_pattern();
                self.builder.finish_node();
            }
            K::LBrace => {
                self.builder.start_node(K::PropertyPattern);
                self.bump_balanced();
                if self.at(K::Ident) {
                    self.bump();
                }
                self.builder.finish_node();
            }
            K::Lt | K::Gt | K::LtEq | K::GtEq => {
                self.builder.start_node(K::ConstantPattern);
                self.bump();
                if !self.expr_bp(PATTERN_OPERAND_BP) {
                    self.error("expected constant");
                }
                self.builder.finish_node();
            }
            K::Ident if self.at_contextual("var") && self.nth(1) == K::Ident => {
                self.builder.start_node(K::TypePattern);
                self.bump();
                self.bump();
                self.builder.finish_node();
            }
            kind if kind == K::Ident || kind.is_predefined_type() => {
                match self.scan_type(self.pos) {
                    Some(after) if self.type_pattern_ends_at(after) => {
                        self.builder.start_node(K::TypePattern);
                        self.emit_type(after);
                        if self.at(K::LBrace) {
                            self.bump_balanced();
                        }
                        if self.at(K::Ident) && !self.at_pattern_combinator() {
                            self.bump();
                        }
                        self.builder.finish_node();
                    }
                    _ => self.constant_pattern(),
                }
            }
            _ => self.constant_pattern(),
        }
    }

    fn at_pattern_combinator(&self) -> bool {
        self.at_contextual("and") || self.at_contextual("or") || self.at_contextual("when")
    }

    fn type_pattern_ends_at(&self, after: usize) -> bool {
        !matches!(
            self.kind_at(after),
            K::LParen | K::Dot | K::Plus | K::Minus | K::Star | K::Slash | K::LBracket
        )
    }

    fn constant_pattern(&mut self) {
        self.builder.start_node(K::ConstantPattern);
        if !self.expr_bp(PATTERN_OPERAND_BP) {
            self.error("expected pattern");
        }
        self.builder.finish_node();
    }

    // ==================
    // Token plumbing
    // ==================

    fn kind_at(&self, i: usize) -> CsSyntaxKind {
        self.significant
            .get(i)
            .map(|&index| self.tokens[index].kind)
            .unwrap_or(K::Eof)
    }

    fn text_at(&self, i: usize) -> &str {
        self.significant
            .get(i)
            .map(|&index| self.tokens[index].text.as_str())
            .unwrap_or("")
    }

    fn current(&self) -> CsSyntaxKind {
        self.kind_at(self.pos)
    }

    fn current_text(&self) -> &str {
        self.text_at(self.pos)
    }

    fn nth(&self, n: usize) -> CsSyntaxKind {
        self.kind_at(self.pos + n)
    }

    fn at(&self, kind: CsSyntaxKind) -> bool {
        self.current() == kind
    }

    fn at_end(&self) -> bool {
        self.pos >= self.significant.len()
    }

    fn at_contextual(&self, word: &str) -> bool {
        self.nth_is_contextual(0, word)
    }

    fn nth_is_contextual(&self, n: usize, word: &str) -> bool {
        self.nth(n) == K::Ident && self.text_at(self.pos + n) == word
    }

    /// Whether two significant tokens touch with no trivia between them
    fn adjacent(&self, a: usize, b: usize) -> bool {
        match (self.significant.get(a), self.significant.get(b)) {
            (Some(&first), Some(&second)) => {
                self.tokens[first].span.end == self.tokens[second].span.start
            }
            _ => false,
        }
    }

    fn can_start_expr(&self) -> bool {
        self.can_start_expr_at(self.pos)
    }

    fn can_start_expr_at(&self, i: usize) -> bool {
        let kind = self.kind_at(i);
        kind == K::Ident
            || kind.is_literal()
            || kind.is_predefined_type()
            || matches!(
                kind,
                K::ThisKw
                    | K::BaseKw
                    | K::InterpolatedStringStart
                    | K::NewKw
                    | K::TypeofKw
                    | K::SizeofKw
                    | K::DefaultKw
                    | K::CheckedKw
                    | K::UncheckedKw
                    | K::DelegateKw
                    | K::ThrowKw
                    | K::LParen
                    | K::LBracket
                    | K::Bang
                    | K::Minus
                    | K::Plus
                    | K::Tilde
                    | K::PlusPlus
                    | K::MinusMinus
                    | K::Caret
                    | K::DotDot
            )
    }

    /// Index just past the bracket group opening at `i`
    fn scan_balanced(&self, i: usize) -> usize {
        let mut depth = 0usize;
        let mut i = i;
        loop {
            match self.kind_at(i) {
                K::LParen | K::LBracket | K::LBrace => depth += 1,
                K::RParen | K::RBracket | K::RBrace => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return i + 1;
                    }
                }
                K::Eof => return i,
                _ => {}
            }
            i += 1;
        }
    }

    fn bump_balanced(&mut self) {
        let end = self.scan_balanced(self.pos);
        while self.pos < end {
            self.bump();
        }
    }

    /// Emit the current token with its leading and trailing trivia
    fn bump(&mut self) {
        let Some(&index) = self.significant.get(self.pos) else {
            return;
        };
        while self.emitted < index {
            self.builder.add_token(&self.tokens[self.emitted]);
            self.emitted += 1;
        }
        self.builder.add_token(&self.tokens[index]);
        self.last_bumped = self.tokens[index].kind;
        self.emitted = index + 1;

        while let Some(token) = self.tokens.get(self.emitted) {
            if !token.kind.is_trivia() {
                break;
            }
            self.builder.add_token(token);
            self.emitted += 1;
            if token.kind == K::Newline {
                break;
            }
        }
        self.pos += 1;
    }

    fn emit_remaining(&mut self) {
        while let Some(token) = self.tokens.get(self.emitted) {
            self.builder.add_token(token);
            self.emitted += 1;
        }
    }

    fn eat(&mut self, kind: CsSyntaxKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: CsSyntaxKind) {
        if !self.eat(kind) {
            self.error(format!("expected {kind}, found {}", self.current()));
        }
    }

    fn current_span(&self) -> std::ops::Range<usize> {
        match self.significant.get(self.pos) {
            Some(&index) => self.tokens[index].span.clone(),
            None => {
                let end = self.tokens.last().map(|token| token.span.end).unwrap_or(0);
                end..end
            }
        }
    }

    fn error(&mut self, message: impl Into<String>) {
        let span = self.current_span();
        self.errors.push(LexerError::new(message, span));
    }

    /// Wrap the construct at the cursor in one `Error` node without descending
    fn skip_too_deep(&mut self) -> bool {
        if self.at_end() {
            return false;
        }
        self.error("nesting too deep");
        self.builder.start_node(K::Error);
        if matches!(self.current(), K::LParen | K::LBracket | K::LBrace) {
            self.bump_balanced();
        } else {
            self.bump();
        }
        self.builder.finish_node();
        true
    }

    fn error_and_bump(&mut self, message: &str) {
        self.error(message);
        self.builder.start_node(K::Error);
        self.bump();
        self.builder.finish_node();
    }
}
