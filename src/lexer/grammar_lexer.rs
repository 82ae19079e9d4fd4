use once_cell::sync::Lazy;
use regex::Regex;

use super::{Lexer, Scanner, Token, TokenKind};

static BLANK: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[ \t\r]+").unwrap());
static COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\*[^\n]*").unwrap());

static PATTERNS: Lazy<Vec<(TokenKind, Regex)>> = Lazy::new(|| {
    vec![
        (TokenKind::AxiomKeyword, Regex::new(r"^\$AXIOM").unwrap()),
        (TokenKind::NTermKeyword, Regex::new(r"^\$NTERM").unwrap()),
        (TokenKind::TermKeyword, Regex::new(r"^\$TERM").unwrap()),
        (TokenKind::RuleKeyword, Regex::new(r"^\$RULE").unwrap()),
        (TokenKind::EpsKeyword, Regex::new(r"^\$EPS").unwrap()),
        (TokenKind::Nterm, Regex::new(r"^[A-Z][^ \t\r\n]*").unwrap()),
        (TokenKind::Term, Regex::new(r#"^"[^ \t\r\n]+""#).unwrap()),
        (TokenKind::Equal, Regex::new(r"^=").unwrap()),
        (TokenKind::NewLine, Regex::new(r"^\n").unwrap()),
    ]
});

/// Tokens of a grammar description.
///
/// The whole text is scanned up front because newlines are only meaningful
/// inside `$RULE` blocks, where a single newline separates two alternatives.
#[derive(Debug, Clone)]
pub struct GrammarLexer {
    tokens: Vec<Token>,
    index: usize,
    eof: Token,
}

impl GrammarLexer {
    pub fn new(text: &str) -> Self {
        let mut scanner = Scanner::new(text);
        let mut tokens = Vec::new();
        while let Some(token) = next_unfiltered_token(&mut scanner) {
            tokens.push(token);
        }

        Self {
            tokens: filter_newlines(tokens),
            index: 0,
            eof: scanner.eof_token(),
        }
    }
}

fn next_unfiltered_token(scanner: &mut Scanner) -> Option<Token> {
    loop {
        if let Some(len) = scanner.find(&BLANK).or_else(|| scanner.find(&COMMENT)) {
            scanner.advance(len);
        } else {
            break;
        }
    }
    if scanner.is_empty() {
        return None;
    }

    for (kind, re) in PATTERNS.iter() {
        if let Some(len) = scanner.find(re) {
            let (mut value, span) = scanner.advance(len);
            if *kind == TokenKind::Term {
                value = value[1..value.len() - 1].to_string();
            }
            return Some(Token {
                kind: *kind,
                value,
                span,
            });
        }
    }

    Some(scanner.error_token())
}

/// Keeps a newline only inside a rule block, collapsing runs of newlines and
/// dropping the ones that end a rule block.
fn filter_newlines(tokens: Vec<Token>) -> Vec<Token> {
    let mut filtered: Vec<Token> = Vec::with_capacity(tokens.len());
    let mut in_rule = false;

    for (i, token) in tokens.iter().enumerate() {
        match token.kind {
            TokenKind::RuleKeyword => in_rule = true,
            TokenKind::AxiomKeyword | TokenKind::NTermKeyword | TokenKind::TermKeyword => {
                in_rule = false
            }
            _ => {}
        }

        if token.kind == TokenKind::NewLine {
            let previous_is_newline = filtered
                .last()
                .map_or(true, |t| t.kind == TokenKind::NewLine);
            let next = tokens[i + 1..]
                .iter()
                .find(|t| t.kind != TokenKind::NewLine);
            let separates_alternatives = matches!(next, Some(t) if t.kind != TokenKind::RuleKeyword);
            if !in_rule || previous_is_newline || !separates_alternatives {
                continue;
            }
        }

        filtered.push(token.clone());
    }

    filtered
}

impl Lexer for GrammarLexer {
    fn has_next(&self) -> bool {
        self.index < self.tokens.len()
    }

    fn next_token(&mut self) -> Token {
        match self.tokens.get(self.index) {
            Some(token) => {
                self.index += 1;
                token.clone()
            }
            None => self.eof.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(text: &str) -> Vec<(TokenKind, String)> {
        let mut lexer = GrammarLexer::new(text);
        let mut tokens = Vec::new();
        while lexer.has_next() {
            let token = lexer.next_token();
            tokens.push((token.kind, token.value));
        }
        tokens
    }

    #[test]
    fn keywords_names_and_literals() {
        let t = tokens("$AXIOM E\n$NTERM E F\n$TERM \"+\" \"n\"");
        let kinds: Vec<TokenKind> = t.iter().map(|(k, _)| *k).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::AxiomKeyword,
                TokenKind::Nterm,
                TokenKind::NTermKeyword,
                TokenKind::Nterm,
                TokenKind::Nterm,
                TokenKind::TermKeyword,
                TokenKind::Term,
                TokenKind::Term,
            ]
        );
        assert_eq!(t[6].1, "+");
        assert_eq!(t[7].1, "n");
    }

    #[test]
    fn newlines_separate_alternatives_only_inside_rules() {
        let t = tokens("$AXIOM S\n\n$NTERM S\n$TERM \"a\"\n$RULE S = \"a\" S\n\n  $EPS\n$RULE S = \"a\"\n\n");
        let kinds: Vec<TokenKind> = t.iter().map(|(k, _)| *k).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::AxiomKeyword,
                TokenKind::Nterm,
                TokenKind::NTermKeyword,
                TokenKind::Nterm,
                TokenKind::TermKeyword,
                TokenKind::Term,
                TokenKind::RuleKeyword,
                TokenKind::Nterm,
                TokenKind::Equal,
                TokenKind::Term,
                TokenKind::Nterm,
                TokenKind::NewLine,
                TokenKind::EpsKeyword,
                TokenKind::RuleKeyword,
                TokenKind::Nterm,
                TokenKind::Equal,
                TokenKind::Term,
            ]
        );
    }

    #[test]
    fn comments_are_skipped() {
        let t = tokens("* the axiom\n$AXIOM S * trailing\n");
        assert_eq!(
            t,
            vec![
                (TokenKind::AxiomKeyword, "$AXIOM".to_string()),
                (TokenKind::Nterm, "S".to_string()),
            ]
        );
    }

    #[test]
    fn stray_character_becomes_error_token() {
        let mut lexer = GrammarLexer::new("$AXIOM s");
        lexer.next_token();
        let token = lexer.next_token();
        assert_eq!(token.kind, TokenKind::Error);
        assert_eq!(token.value, "s");
        assert_eq!(token.span.column, 8);
    }
}
