//! Syntax kind enumeration for the C# CST
//!
//! Every token and node kind the lexer and parser can produce. Kinds are
//! numbered contiguously from zero so the rowan raw value maps straight back
//! through [`CsSyntaxKind::ALL`].

use std::fmt;

macro_rules! syntax_kinds {
    ($($(#[$meta:meta])* $name:ident,)*) => {
        /// Syntax kind for C# language elements
        ///
        /// Covers trivia, literals, keywords, punctuation and the structural
        /// nodes built by the parser.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr(u16)]
        pub enum CsSyntaxKind {
            $($(#[$meta])* $name,)*
        }

        impl CsSyntaxKind {
            /// All kinds, indexed by their raw value
            pub const ALL: &'static [CsSyntaxKind] = &[$(CsSyntaxKind::$name,)*];
        }
    };
}

syntax_kinds! {
    // ==================
    // Trivia
    // ==================
    /// Spaces and tabs
    Whitespace,
    /// `\n` or `\r\n`
    Newline,
    /// `// ...`
    LineComment,
    /// `/* ... */`
    BlockComment,
    /// `#region`, `#if` and friends, up to the end of the line
    PreprocessorDirective,

    // ==================
    // Literals & identifiers
    // ==================
    Ident,
    IntLiteral,
    RealLiteral,
    StringLiteral,
    CharLiteral,
    /// `$"`, `$@"` or `@$"` opening an interpolated string
    InterpolatedStringStart,
    /// Literal text between interpolation holes
    InterpolatedStringText,
    /// `:format` clause of an interpolation hole
    InterpolationFormat,
    /// Closing `"` of an interpolated string
    InterpolatedStringEnd,

    // ==================
    // Reserved keywords
    // ==================
    AbstractKw,
    AsKw,
    BaseKw,
    BoolKw,
    BreakKw,
    ByteKw,
    CaseKw,
    CatchKw,
    CharKw,
    CheckedKw,
    ClassKw,
    ConstKw,
    ContinueKw,
    DecimalKw,
    DefaultKw,
    DelegateKw,
    DoKw,
    DoubleKw,
    ElseKw,
    EnumKw,
    EventKw,
    ExplicitKw,
    ExternKw,
    FalseKw,
    FinallyKw,
    FloatKw,
    ForKw,
    ForeachKw,
    GotoKw,
    IfKw,
    ImplicitKw,
    InKw,
    IntKw,
    InterfaceKw,
    InternalKw,
    IsKw,
    LockKw,
    LongKw,
    NamespaceKw,
    NewKw,
    NullKw,
    ObjectKw,
    OperatorKw,
    OutKw,
    OverrideKw,
    ParamsKw,
    PrivateKw,
    ProtectedKw,
    PublicKw,
    ReadonlyKw,
    RefKw,
    ReturnKw,
    SbyteKw,
    SealedKw,
    ShortKw,
    SizeofKw,
    StaticKw,
    StringKw,
    StructKw,
    SwitchKw,
    ThisKw,
    ThrowKw,
    TrueKw,
    TryKw,
    TypeofKw,
    UintKw,
    UlongKw,
    UncheckedKw,
    UnsafeKw,
    UshortKw,
    UsingKw,
    VirtualKw,
    VoidKw,
    VolatileKw,
    WhileKw,

    // ==================
    // Punctuation & operators
    // ==================
    LBrace,
    RBrace,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Semicolon,
    Comma,
    Dot,
    DotDot,
    QuestionDot,
    Colon,
    ColonColon,
    Question,
    QuestionQuestion,
    QuestionQuestionEq,
    Eq,
    EqEq,
    BangEq,
    FatArrow,
    Arrow,
    Lt,
    Gt,
    LtEq,
    GtEq,
    LtLt,
    LtLtEq,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Bang,
    Tilde,
    Amp,
    AmpAmp,
    Pipe,
    PipePipe,
    Caret,
    PlusPlus,
    MinusMinus,
    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,
    PercentEq,
    AmpEq,
    PipeEq,
    CaretEq,

    // ==================
    // Declarations
    // ==================
    CompilationUnit,
    UsingDirective,
    /// Qualified name: `System.Collections.Generic`
    Name,
    NamespaceDecl,
    /// class, struct, interface and record declarations
    TypeDecl,
    EnumDecl,
    AttributeList,
    TypeParamList,
    BaseList,
    ConstraintClause,
    MethodDecl,
    ConstructorDecl,
    FieldDecl,
    PropertyDecl,
    AccessorList,
    Accessor,
    ParamList,
    Param,
    VariableDeclarator,
    /// `=> expr` body of a member or accessor
    ExprBody,
    /// Member the parser keeps without structure (operators, events, indexers)
    OpaqueMember,
    /// Type reference: `IEnumerable<int>`, `int[]`, `string?`
    Type,
    TypeArgList,

    // ==================
    // Statements
    // ==================
    Block,
    LocalDeclStmt,
    ExprStmt,
    IfStmt,
    ElseClause,
    WhileStmt,
    DoStmt,
    ForStmt,
    ForeachStmt,
    ReturnStmt,
    ThrowStmt,
    BreakStmt,
    ContinueStmt,
    YieldStmt,
    UsingStmt,
    LockStmt,
    TryStmt,
    CatchClause,
    FinallyClause,
    SwitchStmt,
    SwitchSection,
    EmptyStmt,

    // ==================
    // Expressions
    // ==================
    NameRef,
    GenericName,
    Literal,
    InterpolatedStringExpr,
    /// `{expr,alignment:format}` hole of an interpolated string
    Interpolation,
    ThisExpr,
    BaseExpr,
    /// `string`, `int` used as an expression: `string.IsNullOrEmpty(s)`
    PredefinedTypeExpr,
    ParenExpr,
    TupleExpr,
    MemberAccessExpr,
    CallExpr,
    ArgList,
    Arg,
    ElementAccessExpr,
    PrefixExpr,
    PostfixExpr,
    BinaryExpr,
    AssignExpr,
    ConditionalExpr,
    IsPatternExpr,
    AsExpr,
    CastExpr,
    ObjectCreationExpr,
    ArrayCreationExpr,
    InitializerExpr,
    CollectionExpr,
    LambdaExpr,
    TypeofExpr,
    DefaultExpr,
    SwitchExpr,

    // ==================
    // Patterns
    // ==================
    ConstantPattern,
    NotPattern,
    TypePattern,
    PropertyPattern,

    // ==================
    // Errors
    // ==================
    Error,
    /// End of input marker, never stored in a tree
    Eof,
}

impl CsSyntaxKind {
    /// Whitespace, newlines, comments and preprocessor lines
    pub const fn is_trivia(self) -> bool {
        matches!(
            self,
            CsSyntaxKind::Whitespace
                | CsSyntaxKind::Newline
                | CsSyntaxKind::LineComment
                | CsSyntaxKind::BlockComment
                | CsSyntaxKind::PreprocessorDirective
        )
    }

    pub const fn is_comment(self) -> bool {
        matches!(self, CsSyntaxKind::LineComment | CsSyntaxKind::BlockComment)
    }

    pub fn is_keyword(self) -> bool {
        self >= CsSyntaxKind::AbstractKw && self <= CsSyntaxKind::WhileKw
    }

    pub fn is_punct(self) -> bool {
        self >= CsSyntaxKind::LBrace && self <= CsSyntaxKind::CaretEq
    }

    pub const fn is_literal(self) -> bool {
        matches!(
            self,
            CsSyntaxKind::IntLiteral
                | CsSyntaxKind::RealLiteral
                | CsSyntaxKind::StringLiteral
                | CsSyntaxKind::CharLiteral
                | CsSyntaxKind::TrueKw
                | CsSyntaxKind::FalseKw
                | CsSyntaxKind::NullKw
        )
    }

    /// Keywords that name a built-in type (`int`, `string`, ...)
    pub const fn is_predefined_type(self) -> bool {
        matches!(
            self,
            CsSyntaxKind::BoolKw
                | CsSyntaxKind::ByteKw
                | CsSyntaxKind::CharKw
                | CsSyntaxKind::DecimalKw
                | CsSyntaxKind::DoubleKw
                | CsSyntaxKind::FloatKw
                | CsSyntaxKind::IntKw
                | CsSyntaxKind::LongKw
                | CsSyntaxKind::ObjectKw
                | CsSyntaxKind::SbyteKw
                | CsSyntaxKind::ShortKw
                | CsSyntaxKind::StringKw
                | CsSyntaxKind::UintKw
                | CsSyntaxKind::UlongKw
                | CsSyntaxKind::UshortKw
                | CsSyntaxKind::VoidKw
        )
    }

    /// Declaration modifiers accepted in front of types and members
    pub const fn is_modifier(self) -> bool {
        matches!(
            self,
            CsSyntaxKind::PublicKw
                | CsSyntaxKind::PrivateKw
                | CsSyntaxKind::ProtectedKw
                | CsSyntaxKind::InternalKw
                | CsSyntaxKind::StaticKw
                | CsSyntaxKind::ReadonlyKw
                | CsSyntaxKind::SealedKw
                | CsSyntaxKind::AbstractKw
                | CsSyntaxKind::VirtualKw
                | CsSyntaxKind::OverrideKw
                | CsSyntaxKind::ExternKw
                | CsSyntaxKind::UnsafeKw
                | CsSyntaxKind::VolatileKw
                | CsSyntaxKind::ConstKw
                | CsSyntaxKind::NewKw
        )
    }

    pub fn is_node(self) -> bool {
        self >= CsSyntaxKind::CompilationUnit && self != CsSyntaxKind::Eof
    }

    /// Map reserved keyword text to its kind
    pub fn from_keyword(text: &str) -> Option<CsSyntaxKind> {
        let kind = match text {
            "abstract" => CsSyntaxKind::AbstractKw,
            "as" => CsSyntaxKind::AsKw,
            "base" => CsSyntaxKind::BaseKw,
            "bool" => CsSyntaxKind::BoolKw,
            "break" => CsSyntaxKind::BreakKw,
            "byte" => CsSyntaxKind::ByteKw,
            "case" => CsSyntaxKind::CaseKw,
            "catch" => CsSyntaxKind::CatchKw,
            "char" => CsSyntaxKind::CharKw,
            "checked" => CsSyntaxKind::CheckedKw,
            "class" => CsSyntaxKind::ClassKw,
            "const" => CsSyntaxKind::ConstKw,
            "continue" => CsSyntaxKind::ContinueKw,
            "decimal" => CsSyntaxKind::DecimalKw,
            "default" => CsSyntaxKind::DefaultKw,
            "delegate" => CsSyntaxKind::DelegateKw,
            "do" => CsSyntaxKind::DoKw,
            "double" => CsSyntaxKind::DoubleKw,
            "else" => CsSyntaxKind::ElseKw,
            "enum" => CsSyntaxKind::EnumKw,
            "event" => CsSyntaxKind::EventKw,
            "explicit" => CsSyntaxKind::ExplicitKw,
            "extern" => CsSyntaxKind::ExternKw,
            "false" => CsSyntaxKind::FalseKw,
            "finally" => CsSyntaxKind::FinallyKw,
            "float" => CsSyntaxKind::FloatKw,
            "for" => CsSyntaxKind::ForKw,
            "foreach" => CsSyntaxKind::ForeachKw,
            "goto" => CsSyntaxKind::GotoKw,
            "if" => CsSyntaxKind::IfKw,
            "implicit" => CsSyntaxKind::ImplicitKw,
            "in" => CsSyntaxKind::InKw,
            "int" => CsSyntaxKind::IntKw,
            "interface" => CsSyntaxKind::InterfaceKw,
            "internal" => CsSyntaxKind::InternalKw,
            "is" => CsSyntaxKind::IsKw,
            "lock" => CsSyntaxKind::LockKw,
            "long" => CsSyntaxKind::LongKw,
            "namespace" => CsSyntaxKind::NamespaceKw,
            "new" => CsSyntaxKind::NewKw,
            "null" => CsSyntaxKind::NullKw,
            "object" => CsSyntaxKind::ObjectKw,
            "operator" => CsSyntaxKind::OperatorKw,
            "out" => CsSyntaxKind::OutKw,
            "override" => CsSyntaxKind::OverrideKw,
            "params" => CsSyntaxKind::ParamsKw,
            "private" => CsSyntaxKind::PrivateKw,
            "protected" => CsSyntaxKind::ProtectedKw,
            "public" => CsSyntaxKind::PublicKw,
            "readonly" => CsSyntaxKind::ReadonlyKw,
            "ref" => CsSyntaxKind::RefKw,
            "return" => CsSyntaxKind::ReturnKw,
            "sbyte" => CsSyntaxKind::SbyteKw,
            "sealed" => CsSyntaxKind::SealedKw,
            "short" => CsSyntaxKind::ShortKw,
            "sizeof" => CsSyntaxKind::SizeofKw,
            "static" => CsSyntaxKind::StaticKw,
            "string" => CsSyntaxKind::StringKw,
            "struct" => CsSyntaxKind::StructKw,
            "switch" => CsSyntaxKind::SwitchKw,
            "this" => CsSyntaxKind::ThisKw,
            "throw" => CsSyntaxKind::ThrowKw,
            "true" => CsSyntaxKind::TrueKw,
            "try" => CsSyntaxKind::TryKw,
            "typeof" => CsSyntaxKind::TypeofKw,
            "uint" => CsSyntaxKind::UintKw,
            "ulong" => CsSyntaxKind::UlongKw,
            "unchecked" => CsSyntaxKind::UncheckedKw,
            "unsafe" => CsSyntaxKind::UnsafeKw,
            "ushort" => CsSyntaxKind::UshortKw,
            "using" => CsSyntaxKind::UsingKw,
            "virtual" => CsSyntaxKind::VirtualKw,
            "void" => CsSyntaxKind::VoidKw,
            "volatile" => CsSyntaxKind::VolatileKw,
            "while" => CsSyntaxKind::WhileKw,
            _ => return None,
        };
        Some(kind)
    }
}

impl fmt::Display for CsSyntaxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl From<CsSyntaxKind> for rowan::SyntaxKind {
    fn from(kind: CsSyntaxKind) -> Self {
        rowan::SyntaxKind(kind as u16)
    }
}
