use std::fmt;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use super::{END_MARK, EPSILON, ERROR_MARK};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ExprKind {
    #[serde(rename = "term")]
    Term,
    #[serde(rename = "nterm")]
    NTerm,
    #[serde(rename = "eps")]
    Eps,
    /// Only ever appears in persisted tables, marking an empty cell.
    #[serde(rename = "Error")]
    Error,
}

/// A grammar symbol. Two symbols are the same symbol iff kind and value match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Expr {
    pub value: String,
    pub kind: ExprKind,
}

impl Expr {
    pub fn term(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            kind: ExprKind::Term,
        }
    }

    pub fn nterm(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            kind: ExprKind::NTerm,
        }
    }

    pub fn epsilon() -> Self {
        Self {
            value: EPSILON.to_string(),
            kind: ExprKind::Eps,
        }
    }

    /// End-of-input marker; behaves as an ordinary terminal.
    pub fn dollar() -> Self {
        Self::term(END_MARK)
    }

    pub fn error() -> Self {
        Self {
            value: ERROR_MARK.to_string(),
            kind: ExprKind::Error,
        }
    }

    pub fn is_term(&self) -> bool {
        self.kind == ExprKind::Term
    }

    pub fn is_nterm(&self) -> bool {
        self.kind == ExprKind::NTerm
    }

    pub fn is_epsilon(&self) -> bool {
        self.kind == ExprKind::Eps
    }

    pub fn is_error(&self) -> bool {
        self.kind == ExprKind::Error
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ExprKind::Term => write!(f, "\"{}\"", self.value),
            _ => write!(f, "{}", self.value),
        }
    }
}

/// One right-hand side. `[Epsilon]` is the empty production.
pub type Production = Vec<Expr>;

/// Nonterminal -> alternatives, both in declaration order.
pub type Rules = IndexMap<Expr, Vec<Production>>;

pub fn is_empty_production(production: &[Expr]) -> bool {
    production.len() == 1 && production[0].is_epsilon()
}

#[derive(Debug, Clone)]
pub struct Grammar {
    pub rules: Rules,
    pub axiom: Expr,
    pub terminals: IndexSet<Expr>,
}

impl Grammar {
    pub fn new(axiom: Expr) -> Self {
        Self {
            rules: Rules::new(),
            axiom,
            terminals: IndexSet::new(),
        }
    }

    pub fn from_parts(rules: Rules, axiom: Expr, terminals: impl IntoIterator<Item = Expr>) -> Self {
        Self {
            rules,
            axiom,
            terminals: terminals.into_iter().collect(),
        }
    }

    pub fn add_terminal(&mut self, terminal: Expr) {
        self.terminals.insert(terminal);
    }

    pub fn add_production(&mut self, left: Expr, right: Production) {
        self.rules.entry(left).or_insert_with(Vec::new).push(right);
    }

    pub fn non_terminal_iter(&self) -> impl DoubleEndedIterator<Item = &Expr> {
        self.rules.keys()
    }

    pub fn terminal_iter(&self) -> impl DoubleEndedIterator<Item = &Expr> {
        self.terminals.iter()
    }

    pub fn productions(&self) -> impl Iterator<Item = (&Expr, &Production)> {
        self.rules
            .iter()
            .flat_map(|(left, rights)| rights.iter().map(move |right| (left, right)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn symbols_compare_by_kind_and_value() {
        assert_eq!(Expr::term("a"), Expr::term("a"));
        assert_ne!(Expr::term("S"), Expr::nterm("S"));
        assert_eq!(Expr::dollar(), Expr::term(END_MARK));

        let set: HashSet<Expr> = vec![Expr::nterm("S"), Expr::nterm("S"), Expr::epsilon()]
            .into_iter()
            .collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn alternatives_keep_declaration_order() {
        let mut g = Grammar::new(Expr::nterm("S"));
        g.add_production(Expr::nterm("S"), vec![Expr::term("b")]);
        g.add_production(Expr::nterm("A"), vec![Expr::epsilon()]);
        g.add_production(Expr::nterm("S"), vec![Expr::term("a")]);

        let names: Vec<&str> = g.non_terminal_iter().map(|e| e.value.as_str()).collect();
        assert_eq!(names, vec!["S", "A"]);
        assert_eq!(
            g.rules[&Expr::nterm("S")],
            vec![vec![Expr::term("b")], vec![Expr::term("a")]]
        );
        assert!(is_empty_production(&g.rules[&Expr::nterm("A")][0]));
    }
}
