//! Concrete Syntax Tree (CST) for C# source
//!
//! Lossless syntax tree built on Rowan. Every byte of the input, including
//! whitespace, comments and preprocessor lines, is stored in the tree, so
//! rendering a tree reproduces its source exactly:
//!
//! ```text
//! parse(source).text() == source
//! ```
//!
//! The parser covers the declaration, statement and expression forms the
//! rules inspect. Anything else is kept as opaque balanced token runs.
//!
//! # Example
//!
//! ```rust,ignore
//! use linqguard_core::cst::parse_csharp;
//!
//! let source = "class A { bool M(int[] xs) => xs.IsNullOrEmpty(); }";
//! let (cst, errors) = parse_csharp(source);
//!
//! assert!(errors.is_empty());
//! assert_eq!(cst.text().to_string(), source);
//! ```

mod builder;
mod language;
mod lexer;
mod parser;
mod syntax_kind;

pub mod ast;
pub mod make;
pub mod trivia;

pub use builder::CstBuilder;
pub use language::{CSharpLanguage, CsSyntaxElement, CsSyntaxNode, CsSyntaxToken};
pub use lexer::{CstLexResult, CstSpan, CstToken, LexerError, lex_with_trivia};
pub use parser::parse_csharp;
pub use syntax_kind::CsSyntaxKind;
