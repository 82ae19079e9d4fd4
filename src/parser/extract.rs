use indexmap::IndexSet;
use log::debug;

use crate::error::{Error, Result};
use crate::grammar::{Expr, Grammar, Production, Rules};
use crate::lexer::TokenKind;

use super::Node;

fn child<'a>(node: &'a Node, idx: usize) -> Result<&'a Node> {
    node.children.get(idx).ok_or_else(|| {
        Error::MalformedTree(format!(
            "{} has no child at position {}",
            node.expr.value, idx
        ))
    })
}

fn leaf_value(node: &Node) -> Result<&str> {
    node.value.as_deref().ok_or_else(|| {
        Error::MalformedTree(format!("{} is not a token", node.expr.value))
    })
}

fn is_token(node: &Node, kind: TokenKind) -> bool {
    node.expr == Expr::term(kind.as_str())
}

fn unknown(node: &Node) -> Error {
    Error::Semantic {
        name: node.value.clone().unwrap_or_default(),
        span: node.span.unwrap_or_default(),
    }
}

/// Names declared in the `$AXIOM`, `$NTERM` and `$TERM` headers.
struct Declarations {
    nterms: IndexSet<Expr>,
    terms: IndexSet<Expr>,
}

impl Declarations {
    fn collect(root: &Node) -> Result<Self> {
        let mut nterms = IndexSet::new();
        let mut terms = IndexSet::new();
        // everything before the rule list is header
        let header = root.children.iter().take(6);
        for leaf in header.flat_map(|node| node.leaves()) {
            if is_token(leaf, TokenKind::Nterm) {
                nterms.insert(Expr::nterm(leaf_value(leaf)?));
            } else if is_token(leaf, TokenKind::Term) {
                terms.insert(Expr::term(leaf_value(leaf)?));
            }
        }
        Ok(Self { nterms, terms })
    }

    fn classify(&self, leaf: &Node) -> Result<Expr> {
        if is_token(leaf, TokenKind::EpsKeyword) {
            return Ok(Expr::epsilon());
        }
        let value = leaf_value(leaf)?;
        let expr = if is_token(leaf, TokenKind::Term) {
            Expr::term(value)
        } else {
            Expr::nterm(value)
        };
        let declared = if expr.is_term() {
            self.terms.contains(&expr)
        } else {
            self.nterms.contains(&expr)
        };
        if declared {
            Ok(expr)
        } else {
            Err(unknown(leaf))
        }
    }
}

/// One alternative: a chain `Alternative -> token AlternativeTail`, `AlternativeTail -> token AlternativeTail | ε`.
fn collect_alternative(alternative: &Node, declarations: &Declarations) -> Result<Production> {
    let mut production = Vec::new();
    let mut node = alternative;
    while let Some(leaf) = node.children.first() {
        production.push(declarations.classify(leaf)?);
        match node.children.get(1) {
            Some(tail) => node = tail,
            None => break,
        }
    }
    Ok(production)
}

/// `Alternatives -> Alternative MoreAlternatives`, `MoreAlternatives -> NewLine Alternatives | ε`.
fn collect_alternatives(alternatives: &Node, declarations: &Declarations) -> Result<Vec<Production>> {
    let mut productions = Vec::new();
    let mut node = alternatives;
    loop {
        productions.push(collect_alternative(child(node, 0)?, declarations)?);
        let more = child(node, 1)?;
        if more.children.is_empty() {
            break;
        }
        node = child(more, 1)?;
    }
    Ok(productions)
}

/// Turns the parse tree of a grammar description into the grammar it describes.
///
/// Rule heads and right-hand sides may only use names declared in the header;
/// anything else is a semantic error pointing at the offending token.
pub fn build_rules(root: &Node) -> Result<Grammar> {
    let axiom_leaf = child(root, 1)?;
    let axiom = Expr::nterm(leaf_value(axiom_leaf)?);
    let declarations = Declarations::collect(root)?;

    let mut rules: Rules = declarations
        .nterms
        .iter()
        .map(|nterm| (nterm.clone(), Vec::new()))
        .collect();

    // RuleList -> Rule RuleTail, RuleTail -> Rule RuleTail | ε
    let mut node = child(root, 6)?;
    while let Some(rule) = node.children.first() {
        let head = child(rule, 1)?;
        let left = Expr::nterm(leaf_value(head)?);
        if !declarations.nterms.contains(&left) {
            return Err(unknown(head));
        }
        let rights = collect_alternatives(child(rule, 3)?, &declarations)?;
        rules.entry(left).or_default().extend(rights);
        node = child(node, 1)?;
    }

    debug!(
        "extracted grammar: axiom {}, {} nonterminals, {} terminals",
        axiom,
        rules.len(),
        declarations.terms.len()
    );
    Ok(Grammar::from_parts(rules, axiom, declarations.terms))
}

#[cfg(test)]
mod tests {
    use crate::error::Error;
    use crate::grammar::{Expr, Grammar};
    use crate::lexer::GrammarLexer;
    use crate::parser::{bootstrap::bootstrap_table, parse};

    fn extract(text: &str) -> Result<Grammar, Error> {
        let table = bootstrap_table().unwrap();
        let root = parse(&mut GrammarLexer::new(text), &table)?;
        super::build_rules(&root)
    }

    #[test]
    fn alternatives_accumulate_in_declaration_order() {
        let g = extract(
            "$AXIOM S\n$NTERM S A\n$TERM \"a\" \"b\"\n\
             $RULE S = A \"b\"\n  \"b\"\n$RULE A = $EPS\n$RULE S = \"a\" S\n",
        )
        .unwrap();

        assert_eq!(g.axiom, Expr::nterm("S"));
        assert_eq!(
            g.terminals.iter().cloned().collect::<Vec<_>>(),
            vec![Expr::term("a"), Expr::term("b")]
        );
        assert_eq!(
            g.rules[&Expr::nterm("S")],
            vec![
                vec![Expr::nterm("A"), Expr::term("b")],
                vec![Expr::term("b")],
                vec![Expr::term("a"), Expr::nterm("S")],
            ]
        );
        assert_eq!(g.rules[&Expr::nterm("A")], vec![vec![Expr::epsilon()]]);
    }

    #[test]
    fn undeclared_terminal_is_semantic_error() {
        let err = extract("$AXIOM S\n$NTERM S\n$TERM \"a\"\n$RULE S = \"a\" \"b\"\n").unwrap_err();
        match err {
            Error::Semantic { name, span } => {
                assert_eq!(name, "b");
                assert_eq!((span.line, span.column), (4, 15));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn undeclared_rule_head_is_semantic_error() {
        let err = extract("$AXIOM S\n$NTERM S\n$TERM \"a\"\n$RULE X = \"a\"\n").unwrap_err();
        assert!(matches!(err, Error::Semantic { ref name, .. } if name == "X"));
    }

    #[test]
    fn undeclared_right_hand_nonterminal_is_semantic_error() {
        let err = extract("$AXIOM S\n$NTERM S\n$TERM \"a\"\n$RULE S = \"a\" X\n").unwrap_err();
        match err {
            Error::Semantic { name, span } => {
                assert_eq!(name, "X");
                assert_eq!((span.line, span.column), (4, 15));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn description_without_rules_does_not_parse() {
        match extract("$AXIOM S\n$NTERM S\n$TERM \"a\"\n") {
            Err(Error::Syntax { found, expected, .. }) => {
                assert_eq!(found, "end of input");
                assert!(expected.starts_with("RuleList"), "{}", expected);
            }
            other => panic!("expected a syntax error, got {:?}", other),
        }
    }
}
