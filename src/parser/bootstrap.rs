//! The grammar of grammar descriptions, written by hand so that the first
//! table can be built before any description has been parsed.

use once_cell::sync::Lazy;

use crate::error::Result;
use crate::grammar::{ConflictPolicy, Expr, Grammar, LL1Table};
use crate::lexer::TokenKind;

pub const AXIOM: &str = "Spec";
pub const NTERM_LIST: &str = "NtermList";
pub const TERM_DECL: &str = "TermDecl";
pub const TERM_LIST: &str = "TermList";
pub const RULE_LIST: &str = "RuleList";
pub const RULE_TAIL: &str = "RuleTail";
pub const RULE: &str = "Rule";
pub const ALTERNATIVES: &str = "Alternatives";
pub const MORE_ALTERNATIVES: &str = "MoreAlternatives";
pub const ALTERNATIVE: &str = "Alternative";
pub const ALTERNATIVE_TAIL: &str = "AlternativeTail";

pub static BOOTSTRAP_GRAMMAR: Lazy<Grammar> = Lazy::new(bootstrap_grammar);

fn t(kind: TokenKind) -> Expr {
    Expr::term(kind.as_str())
}

fn n(name: &str) -> Expr {
    Expr::nterm(name)
}

fn bootstrap_grammar() -> Grammar {
    use TokenKind::*;

    let mut g = Grammar::new(n(AXIOM));
    for kind in [
        AxiomKeyword,
        NTermKeyword,
        TermKeyword,
        RuleKeyword,
        EpsKeyword,
        Equal,
        NewLine,
        Term,
        Nterm,
    ] {
        g.add_terminal(t(kind));
    }

    // $AXIOM A $NTERM A B ... $TERM "x" ... rules
    g.add_production(
        n(AXIOM),
        vec![
            t(AxiomKeyword),
            t(Nterm),
            t(NTermKeyword),
            t(Nterm),
            n(NTERM_LIST),
            n(TERM_DECL),
            n(RULE_LIST),
        ],
    );
    g.add_production(n(NTERM_LIST), vec![t(Nterm), n(NTERM_LIST)]);
    g.add_production(n(NTERM_LIST), vec![Expr::epsilon()]);
    g.add_production(n(TERM_DECL), vec![t(TermKeyword), t(Term), n(TERM_LIST)]);
    g.add_production(n(TERM_LIST), vec![t(Term), n(TERM_LIST)]);
    g.add_production(n(TERM_LIST), vec![Expr::epsilon()]);

    g.add_production(n(RULE_LIST), vec![n(RULE), n(RULE_TAIL)]);
    g.add_production(n(RULE_TAIL), vec![n(RULE), n(RULE_TAIL)]);
    g.add_production(n(RULE_TAIL), vec![Expr::epsilon()]);
    g.add_production(
        n(RULE),
        vec![t(RuleKeyword), t(Nterm), t(Equal), n(ALTERNATIVES)],
    );

    // alternatives are separated by a newline
    g.add_production(n(ALTERNATIVES), vec![n(ALTERNATIVE), n(MORE_ALTERNATIVES)]);
    g.add_production(n(MORE_ALTERNATIVES), vec![t(NewLine), n(ALTERNATIVES)]);
    g.add_production(n(MORE_ALTERNATIVES), vec![Expr::epsilon()]);
    g.add_production(n(ALTERNATIVE), vec![t(Term), n(ALTERNATIVE_TAIL)]);
    g.add_production(n(ALTERNATIVE), vec![t(Nterm), n(ALTERNATIVE_TAIL)]);
    g.add_production(n(ALTERNATIVE), vec![t(EpsKeyword)]);
    g.add_production(n(ALTERNATIVE_TAIL), vec![t(Term), n(ALTERNATIVE_TAIL)]);
    g.add_production(n(ALTERNATIVE_TAIL), vec![t(Nterm), n(ALTERNATIVE_TAIL)]);
    g.add_production(n(ALTERNATIVE_TAIL), vec![Expr::epsilon()]);

    g
}

/// The table every grammar description is parsed with. The bootstrap
/// grammar is LL(1), so conflicts are rejected outright.
pub fn bootstrap_table() -> Result<LL1Table> {
    BOOTSTRAP_GRAMMAR.generate_ll1_parsing_table(ConflictPolicy::Reject)
}
