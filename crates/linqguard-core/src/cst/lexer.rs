//! CST-aware lexer that preserves all trivia (whitespace, comments)
//!
//! Produces every byte of the input as some token so that the parser can
//! build a lossless tree: `parse(source).text() == source`.

use crate::cst::CsSyntaxKind;
use std::ops::Range;

/// Byte range in the source
pub type CstSpan = Range<usize>;

/// A lexer error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexerError {
    pub message: String,
    pub span: CstSpan,
}

impl LexerError {
    pub fn new(message: impl Into<String>, span: CstSpan) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

/// A token with its syntax kind and span
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CstToken {
    pub kind: CsSyntaxKind,
    pub text: String,
    pub span: CstSpan,
}

impl CstToken {
    pub fn new(kind: CsSyntaxKind, text: impl Into<String>, span: CstSpan) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
        }
    }
}

/// Result returned by the CST lexer
pub type CstLexResult = (Vec<CstToken>, Vec<LexerError>);

/// Lex input preserving ALL trivia for CST construction
pub fn lex_with_trivia(input: &str) -> CstLexResult {
    let mut lexer = Lexer {
        input,
        pos: 0,
        tokens: Vec::new(),
        errors: Vec::new(),
    };
    lexer.run();
    (lexer.tokens, lexer.errors)
}

struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    tokens: Vec<CstToken>,
    errors: Vec<LexerError>,
}

impl<'a> Lexer<'a> {
    fn run(&mut self) {
        while let Some(current) = self.peek_char(0) {
            self.lex_token(current);
        }
    }

    fn lex_token(&mut self, current: char) {
        let start = self.pos;
        match current {
            '\n' => {
                self.pos += 1;
                self.push(CsSyntaxKind::Newline, start);
            }
            '\r' => {
                self.pos += 1;
                if self.peek_char(0) == Some('\n') {
                    self.pos += 1;
                }
                self.push(CsSyntaxKind::Newline, start);
            }
            c if c.is_whitespace() => {
                self.eat_while(|c| c.is_whitespace() && c != '\n' && c != '\r');
                self.push(CsSyntaxKind::Whitespace, start);
            }
            '/' if self.peek_char(1) == Some('/') => {
                self.eat_while(|c| c != '\n' && c != '\r');
                self.push(CsSyntaxKind::LineComment, start);
            }
            '/' if self.peek_char(1) == Some('*') => self.lex_block_comment(start),
            '#' if self.at_line_start(start) => {
                self.eat_while(|c| c != '\n' && c != '\r');
                self.push(CsSyntaxKind::PreprocessorDirective, start);
            }
            '"' => self.lex_string(start, false),
            '@' if self.peek_char(1) == Some('"') => {
                self.pos += 1;
                self.lex_string(start, true);
            }
            '$' => self.lex_interpolated(start),
            '@' if self.peek_char(1) == Some('$') => self.lex_interpolated(start),
            '\'' => self.lex_char(start),
            '@' if self.peek_char(1).is_some_and(is_ident_start) => {
                self.pos += 1;
                self.eat_while(is_ident_continue);
                self.push(CsSyntaxKind::Ident, start);
            }
            c if is_ident_start(c) => {
                self.eat_while(is_ident_continue);
                let text = &self.input[start..self.pos];
                let kind = CsSyntaxKind::from_keyword(text).unwrap_or(CsSyntaxKind::Ident);
                self.push(kind, start);
            }
            c if c.is_ascii_digit() => self.lex_number(start),
            '.' if self.peek_char(1).is_some_and(|c| c.is_ascii_digit()) => {
                self.lex_number(start)
            }
            _ => self.lex_punct(start, current),
        }
    }

    fn peek_char(&self, n: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(n)
    }

    fn eat_while(&mut self, mut predicate: impl FnMut(char) -> bool) {
        while let Some(c) = self.peek_char(0) {
            if !predicate(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    fn push(&mut self, kind: CsSyntaxKind, start: usize) {
        self.tokens.push(CstToken::new(
            kind,
            &self.input[start..self.pos],
            start..self.pos,
        ));
    }

    fn error(&mut self, message: impl Into<String>, start: usize) {
        self.errors
            .push(LexerError::new(message, start..self.pos.max(start + 1)));
    }

    /// `#` only starts a directive when nothing but whitespace precedes it on the line
    fn at_line_start(&self, start: usize) -> bool {
        self.input[..start]
            .chars()
            .rev()
            .take_while(|&c| c != '\n' && c != '\r')
            .all(char::is_whitespace)
    }

    fn lex_block_comment(&mut self, start: usize) {
        self.pos += 2;
        match self.input[self.pos..].find("*/") {
            Some(offset) => self.pos += offset + 2,
            None => {
                self.pos = self.input.len();
                self.error("Unterminated block comment", start);
            }
        }
        self.push(CsSyntaxKind::BlockComment, start);
    }

    fn lex_char(&mut self, start: usize) {
        self.pos += 1;
        let mut terminated = false;
        while let Some(c) = self.peek_char(0) {
            match c {
                '\\' => {
                    self.pos += 1;
                    if let Some(escaped) = self.peek_char(0) {
                        self.pos += escaped.len_utf8();
                    }
                }
                '\'' => {
                    self.pos += 1;
                    terminated = true;
                    break;
                }
                '\n' | '\r' => break,
                _ => self.pos += c.len_utf8(),
            }
        }
        if !terminated {
            self.error("Unterminated character literal", start);
        }
        self.push(CsSyntaxKind::CharLiteral, start);
    }

    /// Regular (`"..."`), verbatim (`@"..."`) and raw (`"""..."""`) strings
    ///
    /// `self.pos` points at the opening quote.
    fn lex_string(&mut self, start: usize, verbatim: bool) {
        let quotes = self.input[self.pos..]
            .chars()
            .take_while(|&c| c == '"')
            .count();
        if quotes >= 3 {
            self.pos += quotes;
            let fence = "\"".repeat(quotes);
            match self.input[self.pos..].find(&fence) {
                Some(offset) => self.pos += offset + quotes,
                None => {
                    self.pos = self.input.len();
                    self.error("Unterminated raw string literal", start);
                }
            }
            self.push(CsSyntaxKind::StringLiteral, start);
            return;
        }

        self.pos += 1;
        if !self.scan_string_body(verbatim) {
            self.error("Unterminated string literal", start);
        }
        self.push(CsSyntaxKind::StringLiteral, start);
    }

    /// Scan up to and including the closing quote; false when unterminated
    fn scan_string_body(&mut self, verbatim: bool) -> bool {
        while let Some(c) = self.peek_char(0) {
            match c {
                '"' if verbatim && self.peek_char(1) == Some('"') => self.pos += 2,
                '"' => {
                    self.pos += 1;
                    return true;
                }
                '\\' if !verbatim => {
                    self.pos += 1;
                    if let Some(escaped) = self.peek_char(0) {
                        self.pos += escaped.len_utf8();
                    }
                }
                '\n' | '\r' if !verbatim => return false,
                _ => self.pos += c.len_utf8(),
            }
        }
        false
    }

    /// `$"..."`, `$@"..."` and `@$"..."`
    ///
    /// The string is split into text runs and `{ ... }` holes whose contents
    /// are lexed as ordinary tokens, so expressions inside holes reach the
    /// parser. Raw interpolated strings stay a single literal.
    fn lex_interpolated(&mut self, start: usize) {
        let mut verbatim = false;
        while let Some(c) = self.peek_char(0) {
            match c {
                '$' => self.pos += 1,
                '@' => {
                    verbatim = true;
                    self.pos += 1;
                }
                _ => break,
            }
        }
        if self.peek_char(0) != Some('"') {
            self.error("Unexpected character '$'", start);
            self.push(CsSyntaxKind::Error, start);
            return;
        }
        if self.input[self.pos..].starts_with("\"\"\"") {
            self.lex_string(start, verbatim);
            return;
        }

        self.pos += 1;
        self.push(CsSyntaxKind::InterpolatedStringStart, start);

        let mut text_start = self.pos;
        while let Some(c) = self.peek_char(0) {
            match c {
                '"' if verbatim && self.peek_char(1) == Some('"') => self.pos += 2,
                '"' => {
                    self.push_text(text_start);
                    let quote = self.pos;
                    self.pos += 1;
                    self.push(CsSyntaxKind::InterpolatedStringEnd, quote);
                    return;
                }
                '\\' if !verbatim => {
                    self.pos += 1;
                    if let Some(escaped) = self.peek_char(0) {
                        self.pos += escaped.len_utf8();
                    }
                }
                '{' | '}' if self.peek_char(1) == Some(c) => self.pos += 2,
                '{' => {
                    self.push_text(text_start);
                    let open = self.pos;
                    self.pos += 1;
                    self.push(CsSyntaxKind::LBrace, open);
                    self.lex_interpolation_hole(start);
                    text_start = self.pos;
                }
                '\n' | '\r' if !verbatim => break,
                _ => self.pos += c.len_utf8(),
            }
        }
        self.push_text(text_start);
        self.error("Unterminated string literal", start);
    }

    fn push_text(&mut self, start: usize) {
        if self.pos > start {
            self.push(CsSyntaxKind::InterpolatedStringText, start);
        }
    }

    /// Lex a hole after its `{` up to and including the closing `}`
    ///
    /// A `:` outside brackets starts the format clause, which runs to the
    /// closing brace as one token.
    fn lex_interpolation_hole(&mut self, string_start: usize) {
        let mut depth = 0usize;
        while let Some(c) = self.peek_char(0) {
            let start = self.pos;
            match c {
                '}' if depth == 0 => {
                    self.pos += 1;
                    self.push(CsSyntaxKind::RBrace, start);
                    return;
                }
                ':' if depth == 0 && self.peek_char(1) != Some(':') => {
                    self.eat_while(|c| !matches!(c, '}' | '"' | '\n' | '\r'));
                    self.push(CsSyntaxKind::InterpolationFormat, start);
                }
                '(' | '[' | '{' => {
                    depth += 1;
                    self.lex_token(c);
                }
                ')' | ']' | '}' => {
                    depth = depth.saturating_sub(1);
                    self.lex_token(c);
                }
                _ => self.lex_token(c),
            }
        }
        self.error("Unterminated interpolation", string_start);
    }

    fn lex_number(&mut self, start: usize) {
        let mut kind = CsSyntaxKind::IntLiteral;
        let lower = self.input[self.pos..].to_ascii_lowercase();
        if lower.starts_with("0x") || lower.starts_with("0b") {
            self.pos += 2;
            self.eat_while(|c| c.is_ascii_hexdigit() || c == '_');
        } else {
            self.eat_while(|c| c.is_ascii_digit() || c == '_');
            if self.peek_char(0) == Some('.') && self.peek_char(1).is_some_and(|c| c.is_ascii_digit())
            {
                kind = CsSyntaxKind::RealLiteral;
                self.pos += 1;
                self.eat_while(|c| c.is_ascii_digit() || c == '_');
            }
            if matches!(self.peek_char(0), Some('e' | 'E')) {
                let sign = usize::from(matches!(self.peek_char(1), Some('+' | '-')));
                if self
                    .peek_char(1 + sign)
                    .is_some_and(|c| c.is_ascii_digit())
                {
                    kind = CsSyntaxKind::RealLiteral;
                    self.pos += 1 + sign;
                    self.eat_while(|c| c.is_ascii_digit());
                }
            }
        }
        while let Some(c) = self.peek_char(0) {
            match c.to_ascii_lowercase() {
                'f' | 'd' | 'm' => {
                    kind = CsSyntaxKind::RealLiteral;
                    self.pos += 1;
                }
                'u' | 'l' => self.pos += 1,
                _ => break,
            }
        }
        self.push(kind, start);
    }

    fn lex_punct(&mut self, start: usize, current: char) {
        const PUNCT: &[(&str, CsSyntaxKind)] = &[
            ("??=", CsSyntaxKind::QuestionQuestionEq),
            ("<<=", CsSyntaxKind::LtLtEq),
            ("??", CsSyntaxKind::QuestionQuestion),
            ("?.", CsSyntaxKind::QuestionDot),
            ("::", CsSyntaxKind::ColonColon),
            ("..", CsSyntaxKind::DotDot),
            ("==", CsSyntaxKind::EqEq),
            ("!=", CsSyntaxKind::BangEq),
            ("=>", CsSyntaxKind::FatArrow),
            ("->", CsSyntaxKind::Arrow),
            ("<=", CsSyntaxKind::LtEq),
            (">=", CsSyntaxKind::GtEq),
            ("<<", CsSyntaxKind::LtLt),
            ("&&", CsSyntaxKind::AmpAmp),
            ("||", CsSyntaxKind::PipePipe),
            ("++", CsSyntaxKind::PlusPlus),
            ("--", CsSyntaxKind::MinusMinus),
            ("+=", CsSyntaxKind::PlusEq),
            ("-=", CsSyntaxKind::MinusEq),
            ("*=", CsSyntaxKind::StarEq),
            ("/=", CsSyntaxKind::SlashEq),
            ("%=", CsSyntaxKind::PercentEq),
            ("&=", CsSyntaxKind::AmpEq),
            ("|=", CsSyntaxKind::PipeEq),
            ("^=", CsSyntaxKind::CaretEq),
            ("{", CsSyntaxKind::LBrace),
            ("}", CsSyntaxKind::RBrace),
            ("(", CsSyntaxKind::LParen),
            (")", CsSyntaxKind::RParen),
            ("[", CsSyntaxKind::LBracket),
            ("]", CsSyntaxKind::RBracket),
            (";", CsSyntaxKind::Semicolon),
            (",", CsSyntaxKind::Comma),
            (".", CsSyntaxKind::Dot),
            (":", CsSyntaxKind::Colon),
            ("?", CsSyntaxKind::Question),
            ("=", CsSyntaxKind::Eq),
            ("<", CsSyntaxKind::Lt),
            // `>` is never merged so that `List<List<int>>` closes twice
            (">", CsSyntaxKind::Gt),
            ("+", CsSyntaxKind::Plus),
            ("-", CsSyntaxKind::Minus),
            ("*", CsSyntaxKind::Star),
            ("/", CsSyntaxKind::Slash),
            ("%", CsSyntaxKind::Percent),
            ("!", CsSyntaxKind::Bang),
            ("~", CsSyntaxKind::Tilde),
            ("&", CsSyntaxKind::Amp),
            ("|", CsSyntaxKind::Pipe),
            ("^", CsSyntaxKind::Caret),
        ];

        let rest = &self.input[self.pos..];
        // `?.5` is a conditional followed by a real literal
        let conditional_real = rest.starts_with("?.")
            && rest
                .get(2..)
                .is_some_and(|tail| tail.starts_with(|c: char| c.is_ascii_digit()));
        let candidates = PUNCT
            .iter()
            .filter(|(text, _)| !(conditional_real && *text == "?."));
        for (text, kind) in candidates {
            if rest.starts_with(text) {
                self.pos += text.len();
                self.push(*kind, start);
                return;
            }
        }

        self.pos += current.len_utf8();
        self.error(format!("Unexpected character '{current}'"), start);
        self.push(CsSyntaxKind::Error, start);
    }
}

fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

fn is_ident_continue(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}
