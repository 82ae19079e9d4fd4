use once_cell::sync::Lazy;
use regex::Regex;

use super::{Lexer, Scanner, Token, TokenKind};

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s+").unwrap());

static PATTERNS: Lazy<Vec<(TokenKind, Regex)>> = Lazy::new(|| {
    vec![
        (TokenKind::Plus, Regex::new(r"^\+").unwrap()),
        (TokenKind::Mult, Regex::new(r"^\*").unwrap()),
        (TokenKind::Open, Regex::new(r"^\(").unwrap()),
        (TokenKind::Close, Regex::new(r"^\)").unwrap()),
        (TokenKind::Number, Regex::new(r"^\d+").unwrap()),
    ]
});

/// Tokens of arithmetic expressions over `+`, `*`, parentheses and decimal numerals.
#[derive(Debug, Clone)]
pub struct CalcLexer {
    scanner: Scanner,
}

impl CalcLexer {
    pub fn new(text: &str) -> Self {
        Self {
            scanner: Scanner::new(text),
        }
    }

    fn skip_whitespace(&mut self) {
        if let Some(len) = self.scanner.find(&WHITESPACE) {
            self.scanner.advance(len);
        }
    }
}

impl Lexer for CalcLexer {
    fn has_next(&self) -> bool {
        !self.scanner.rest().trim_start().is_empty()
    }

    fn next_token(&mut self) -> Token {
        self.skip_whitespace();
        if self.scanner.is_empty() {
            return self.scanner.eof_token();
        }

        for (kind, re) in PATTERNS.iter() {
            if let Some(len) = self.scanner.find(re) {
                let (value, span) = self.scanner.advance(len);
                return Token {
                    kind: *kind,
                    value,
                    span,
                };
            }
        }

        self.scanner.error_token()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<TokenKind> {
        let mut lexer = CalcLexer::new(text);
        let mut kinds = Vec::new();
        loop {
            let token = lexer.next_token();
            kinds.push(token.kind);
            if token.kind == TokenKind::Eof {
                return kinds;
            }
        }
    }

    #[test]
    fn arithmetic_tokens() {
        assert_eq!(
            kinds(" 12 +(3* 4)\n"),
            vec![
                TokenKind::Number,
                TokenKind::Plus,
                TokenKind::Open,
                TokenKind::Number,
                TokenKind::Mult,
                TokenKind::Number,
                TokenKind::Close,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn numbers_keep_their_text_and_position() {
        let mut lexer = CalcLexer::new("1\n  42");
        lexer.next_token();
        let token = lexer.next_token();
        assert_eq!(token.value, "42");
        assert_eq!((token.span.line, token.span.column), (2, 3));
        assert!(!lexer.has_next());
    }

    #[test]
    fn unknown_character_is_an_error_token() {
        let mut lexer = CalcLexer::new("2 - 1");
        lexer.next_token();
        let token = lexer.next_token();
        assert_eq!(token.kind, TokenKind::Error);
        assert_eq!(token.value, "-");
        assert_eq!(lexer.next_token().kind, TokenKind::Number);
    }
}
