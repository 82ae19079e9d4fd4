extern crate wasm_bindgen;

use log::info;
use wasm_bindgen::prelude::*;

pub mod calculator;
pub mod error;
pub mod grammar;
pub mod lexer;
pub mod parser;

pub use error::{Error, Result};
pub use grammar::{ConflictPolicy, Grammar, LL1Table};
use lexer::{CalcLexer, GrammarLexer};

/// Parses a grammar description with the bootstrap table and extracts the grammar it describes.
pub fn parse_grammar_description(text: &str, bootstrap: &LL1Table) -> Result<Grammar> {
    let root = parser::parse(&mut GrammarLexer::new(text), bootstrap)?;
    parser::extract::build_rules(&root)
}

/// The full bootstrap: returns the table for grammar descriptions and the
/// table for the language `text` describes.
pub fn compile_grammar(text: &str, policy: ConflictPolicy) -> Result<(LL1Table, LL1Table)> {
    let bootstrap = parser::bootstrap::bootstrap_table()?;
    let grammar = parse_grammar_description(text, &bootstrap)?;
    let table = grammar.generate_ll1_parsing_table(policy)?;
    info!(
        "compiled grammar with axiom {} ({} nonterminals)",
        table.axiom,
        table.rows.len()
    );
    Ok((bootstrap, table))
}

pub fn parse_source(text: &str, table: &LL1Table) -> Result<parser::Node> {
    parser::parse(&mut CalcLexer::new(text), table)
}

pub fn evaluate_source(text: &str, table: &LL1Table) -> Result<i64> {
    calculator::compute(&parse_source(text, table)?)
}

fn error_json(e: &Error) -> String {
    serde_json::json!({ "error": e.to_string() }).to_string()
}

fn describe_grammar(grammar: &str) -> Result<Grammar> {
    let bootstrap = parser::bootstrap::bootstrap_table()?;
    parse_grammar_description(grammar, &bootstrap)
}

#[wasm_bindgen]
pub fn first_follow_to_json(grammar: &str) -> String {
    let json = describe_grammar(grammar).and_then(|g| {
        g.calculate_first_follow()
            .to_non_terminal_output_vec()
            .to_json()
    });
    match json {
        Ok(json) => json,
        Err(e) => error_json(&e),
    }
}

#[wasm_bindgen]
pub fn ll1_table_to_json(grammar: &str) -> String {
    let json = describe_grammar(grammar)
        .and_then(|g| g.generate_ll1_parsing_table(ConflictPolicy::FirstMatch))
        .and_then(|table| table.to_json());
    match json {
        Ok(json) => json,
        Err(e) => error_json(&e),
    }
}

#[cfg(test)]
mod fixtures {
    use crate::grammar::{Expr, Grammar};

    pub const ARITHMETIC: &str = include_str!("../grammars/arithmetic.grammar");
    pub const AMBIGUOUS: &str = include_str!("../grammars/ambiguous.grammar");
    pub const SINGLE: &str = include_str!("../grammars/single.grammar");
    pub const DESCRIPTION: &str = include_str!("../grammars/grammar.grammar");

    pub fn t(value: &str) -> Expr {
        Expr::term(value)
    }

    pub fn n(value: &str) -> Expr {
        Expr::nterm(value)
    }

    pub fn eps() -> Expr {
        Expr::epsilon()
    }

    /// Builds a grammar from `(left, [alternatives])`; the first left side is the axiom.
    pub fn grammar(rules: &[(&str, Vec<Vec<Expr>>)], terminals: &[&str]) -> Grammar {
        let mut g = Grammar::new(n(rules[0].0));
        for &terminal in terminals {
            g.add_terminal(t(terminal));
        }
        for (left, rights) in rules {
            for right in rights {
                g.add_production(n(left), right.clone());
            }
        }
        g
    }

    /// E -> T E', E' -> "+" T E' | ε, T -> F T', T' -> "*" F T' | ε, F -> "n" | "(" E ")"
    pub fn arithmetic() -> Grammar {
        grammar(
            &[
                ("E", vec![vec![n("T"), n("E'")]]),
                ("E'", vec![vec![t("+"), n("T"), n("E'")], vec![eps()]]),
                ("T", vec![vec![n("F"), n("T'")]]),
                ("T'", vec![vec![t("*"), n("F"), n("T'")], vec![eps()]]),
                ("F", vec![vec![t("n")], vec![t("("), n("E"), t(")")]]),
            ],
            &["+", "*", "(", ")", "n"],
        )
    }
}

#[cfg(test)]
mod first_follow_tests {
    use std::collections::{BTreeMap, BTreeSet};

    use super::fixtures::*;
    use crate::grammar::{first_of_sequence, Expr, Grammar, SymbolSets};

    type Sets = BTreeMap<Expr, BTreeSet<Expr>>;

    fn normalize(sets: &SymbolSets) -> Sets {
        sets.iter()
            .map(|(k, v)| (k.clone(), v.iter().cloned().collect()))
            .collect()
    }

    fn set(items: &[Expr]) -> BTreeSet<Expr> {
        items.iter().cloned().collect()
    }

    /// Leftmost derivations from `start` up to `depth` expansions; records the
    /// first terminal of every sentential form reached, or ε for the empty form.
    fn brute_force_first(g: &Grammar, start: &Expr, depth: usize) -> BTreeSet<Expr> {
        let mut result = BTreeSet::new();
        let mut forms: Vec<Vec<Expr>> = vec![vec![start.clone()]];
        for _ in 0..depth {
            let mut next = Vec::new();
            for form in forms {
                match form.first() {
                    None => {
                        result.insert(Expr::epsilon());
                    }
                    Some(head) if head.is_term() => {
                        result.insert(head.clone());
                    }
                    Some(head) => {
                        for right in &g.rules[head] {
                            let mut expanded: Vec<Expr> =
                                right.iter().filter(|e| !e.is_epsilon()).cloned().collect();
                            expanded.extend(form[1..].iter().cloned());
                            next.push(expanded);
                        }
                    }
                }
            }
            forms = next;
        }
        result
    }

    fn check_against_brute_force(g: &Grammar) {
        let first = g.calculate_first();
        for nterm in g.non_terminal_iter() {
            assert_eq!(
                first[nterm].iter().cloned().collect::<BTreeSet<_>>(),
                brute_force_first(g, nterm, 8),
                "First({})",
                nterm
            );
        }
    }

    #[test]
    fn first_without_epsilon() {
        let g = grammar(
            &[
                ("S", vec![vec![n("A"), t("b")], vec![t("c")]]),
                ("A", vec![vec![t("a")], vec![t("d"), n("S")]]),
            ],
            &["a", "b", "c", "d"],
        );
        check_against_brute_force(&g);
        assert_eq!(
            normalize(&g.calculate_first())[&n("S")],
            set(&[t("a"), t("c"), t("d")])
        );
    }

    #[test]
    fn first_with_left_nested_epsilon() {
        let g = grammar(
            &[
                ("S", vec![vec![n("A"), n("B"), t("c")]]),
                ("A", vec![vec![t("a")], vec![eps()]]),
                ("B", vec![vec![t("b")], vec![eps()]]),
            ],
            &["a", "b", "c"],
        );
        check_against_brute_force(&g);
        assert_eq!(
            normalize(&g.calculate_first())[&n("S")],
            set(&[t("a"), t("b"), t("c")])
        );
    }

    #[test]
    fn first_with_chained_epsilon() {
        let g = grammar(
            &[
                ("S", vec![vec![n("A")]]),
                ("A", vec![vec![n("B")]]),
                ("B", vec![vec![n("C")]]),
                ("C", vec![vec![t("c")], vec![eps()]]),
            ],
            &["c"],
        );
        check_against_brute_force(&g);
        assert_eq!(
            normalize(&g.calculate_first())[&n("S")],
            set(&[t("c"), eps()])
        );
    }

    #[test]
    fn first_of_sequences() {
        let g = arithmetic();
        let first = g.calculate_first();
        let f = |seq: &[Expr]| -> BTreeSet<Expr> {
            first_of_sequence(seq, &first).into_iter().collect()
        };
        assert_eq!(f(&[]), set(&[eps()]));
        assert_eq!(f(&[eps(), t("+")]), set(&[eps()]));
        assert_eq!(f(&[n("E'"), n("T'")]), set(&[t("+"), t("*"), eps()]));
        assert_eq!(f(&[n("E'"), t(")")]), set(&[t("+"), t(")")]));
        assert_eq!(f(&[n("T"), n("E'")]), set(&[t("n"), t("(")]));
    }

    #[test]
    fn arithmetic_follow() {
        let ff = arithmetic().calculate_first_follow();
        let follow = normalize(&ff.follow);
        let dollar = Expr::dollar();
        assert_eq!(follow[&n("E")], set(&[t(")"), dollar.clone()]));
        assert_eq!(follow[&n("E'")], set(&[t(")"), dollar.clone()]));
        assert_eq!(follow[&n("T")], set(&[t("+"), t(")"), dollar.clone()]));
        assert_eq!(follow[&n("T'")], set(&[t("+"), t(")"), dollar.clone()]));
        assert_eq!(
            follow[&n("F")],
            set(&[t("+"), t("*"), t(")"), dollar.clone()])
        );
        assert!(follow.values().all(|s| !s.contains(&eps())));
    }

    #[test]
    fn terminal_after_nonterminal_blocks_propagation() {
        let g = grammar(
            &[
                ("S", vec![vec![n("A"), t("x")]]),
                ("A", vec![vec![t("a")]]),
            ],
            &["a", "x"],
        );
        let follow = normalize(&g.calculate_first_follow().follow);
        assert_eq!(follow[&n("A")], set(&[t("x")]));
    }

    #[test]
    fn sets_do_not_depend_on_declaration_order() {
        let g = arithmetic();
        let mut reversed = Grammar::new(g.axiom.clone());
        for terminal in g.terminal_iter().rev() {
            reversed.add_terminal(terminal.clone());
        }
        for (left, rights) in g.rules.iter().rev() {
            for right in rights.iter().rev() {
                reversed.add_production(left.clone(), right.clone());
            }
        }

        let a = g.calculate_first_follow();
        let b = reversed.calculate_first_follow();
        assert_eq!(normalize(&a.first), normalize(&b.first));
        assert_eq!(normalize(&a.follow), normalize(&b.follow));
    }
}
