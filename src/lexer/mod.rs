use std::fmt;

use regex::Regex;

use crate::grammar::Expr;

pub mod calc_lexer;
pub mod grammar_lexer;
pub use calc_lexer::CalcLexer;
pub use grammar_lexer::GrammarLexer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    AxiomKeyword,
    NTermKeyword,
    TermKeyword,
    RuleKeyword,
    EpsKeyword,
    Term,
    Nterm,
    Equal,
    NewLine,
    Plus,
    Mult,
    Open,
    Close,
    Number,
    Eof,
    Error,
}

impl TokenKind {
    /// The terminal name a grammar uses to refer to this kind of token.
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::AxiomKeyword => "AxiomKeyword",
            TokenKind::NTermKeyword => "NTermKeyword",
            TokenKind::TermKeyword => "TermKeyword",
            TokenKind::RuleKeyword => "RuleKeyword",
            TokenKind::EpsKeyword => "EpsKeyword",
            TokenKind::Term => "Term",
            TokenKind::Nterm => "Nterm",
            TokenKind::Equal => "Equal",
            TokenKind::NewLine => "NewLine",
            TokenKind::Plus => "+",
            TokenKind::Mult => "*",
            TokenKind::Open => "(",
            TokenKind::Close => ")",
            TokenKind::Number => "n",
            TokenKind::Eof => "EOF",
            TokenKind::Error => "Error",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// Byte offsets into the source text.
    pub start: usize,
    pub end: usize,
    /// 1-based position of `start`.
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub span: Span,
}

impl Token {
    pub fn to_expr(&self) -> Expr {
        if self.kind == TokenKind::Eof {
            return Expr::dollar();
        }
        Expr::term(self.kind.as_str())
    }
}

/// Pull interface the predictive parser consumes tokens through.
/// Once the input is exhausted `next_token` keeps returning `Eof`.
pub trait Lexer {
    fn has_next(&self) -> bool;
    fn next_token(&mut self) -> Token;
}

/// Position bookkeeping shared by the concrete lexers.
#[derive(Debug, Clone)]
struct Scanner {
    text: String,
    offset: usize,
    line: usize,
    column: usize,
}

impl Scanner {
    fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    fn rest(&self) -> &str {
        &self.text[self.offset..]
    }

    fn is_empty(&self) -> bool {
        self.offset >= self.text.len()
    }

    fn find(&self, re: &Regex) -> Option<usize> {
        re.find(self.rest()).map(|m| m.end())
    }

    /// Consumes `len` bytes, returning the consumed text and its span.
    fn advance(&mut self, len: usize) -> (String, Span) {
        let start = self.offset;
        let (line, column) = (self.line, self.column);
        let text = self.text[start..start + len].to_string();
        for c in text.chars() {
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.offset += len;
        let span = Span {
            start,
            end: self.offset,
            line,
            column,
        };
        (text, span)
    }

    /// Consumes one character that no pattern accepts.
    fn error_token(&mut self) -> Token {
        let len = self.rest().chars().next().map_or(0, char::len_utf8);
        let (value, span) = self.advance(len);
        Token {
            kind: TokenKind::Error,
            value,
            span,
        }
    }

    fn eof_token(&self) -> Token {
        Token {
            kind: TokenKind::Eof,
            value: String::new(),
            span: Span {
                start: self.offset,
                end: self.offset,
                line: self.line,
                column: self.column,
            },
        }
    }
}
