use crowbook_text_processing::escape::tex as escape_tex;
use indexmap::IndexMap;
use log::{debug, warn};
use std::str::FromStr;

use crate::error::{Error, Result};

use super::{
    grammar::{is_empty_production, ExprKind},
    pretty_print::ProductionOutput,
    Expr, FirstFollow, Grammar, Production,
};

/// What to do when two different alternatives land in the same cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConflictPolicy {
    /// Keep every alternative in registration order and parse with the first one.
    #[default]
    FirstMatch,
    /// Fail table construction on the first conflicting cell.
    Reject,
}

impl FromStr for ConflictPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "first-match" => Ok(ConflictPolicy::FirstMatch),
            "reject" => Ok(ConflictPolicy::Reject),
            _ => Err(format!(
                "unknown conflict policy {:?}, expected \"first-match\" or \"reject\"",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    NoEntry,
    Unique(Production),
    /// Alternatives in registration order; index 0 is the one the parser applies.
    Conflict(Vec<Production>),
}

static NO_ENTRY: Cell = Cell::NoEntry;

impl Cell {
    pub fn chosen(&self) -> Option<&Production> {
        match self {
            Cell::NoEntry => None,
            Cell::Unique(production) => Some(production),
            Cell::Conflict(productions) => productions.first(),
        }
    }

    pub fn alternatives(&self) -> &[Production] {
        match self {
            Cell::NoEntry => &[],
            Cell::Unique(production) => std::slice::from_ref(production),
            Cell::Conflict(productions) => productions,
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Cell::Conflict(_))
    }

    fn register(&mut self, production: &Production) {
        match self {
            Cell::NoEntry => *self = Cell::Unique(production.clone()),
            Cell::Unique(existing) => {
                if existing != production {
                    let existing = std::mem::take(existing);
                    *self = Cell::Conflict(vec![existing, production.clone()]);
                }
            }
            Cell::Conflict(productions) => {
                if !productions.contains(production) {
                    productions.push(production.clone());
                }
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct LL1Table {
    pub axiom: Expr,
    /// Column order: the terminal alphabet as declared, then Dollar.
    pub terminals: Vec<Expr>,
    pub rows: IndexMap<Expr, IndexMap<Expr, Cell>>,
}

impl LL1Table {
    pub fn get(&self, nterm: &Expr, term: &Expr) -> &Cell {
        self.rows
            .get(nterm)
            .and_then(|row| row.get(term))
            .unwrap_or(&NO_ENTRY)
    }

    pub fn conflicts(&self) -> Vec<(&Expr, &Expr, &[Production])> {
        self.rows
            .iter()
            .flat_map(|(nterm, row)| {
                row.iter()
                    .filter(|(_, cell)| cell.is_conflict())
                    .map(move |(term, cell)| (nterm, term, cell.alternatives()))
            })
            .collect()
    }

    pub fn is_ll1(&self) -> bool {
        self.conflicts().is_empty()
    }

    pub fn to_plaintext(&self) -> String {
        let mut header: Vec<String> = vec![String::new()];
        header.extend(self.terminals.iter().map(|t| t.to_string()));
        let mut output: Vec<Vec<String>> = vec![header];
        for (left, row) in &self.rows {
            let left_name = left.to_string();
            let mut line: Vec<String> = vec![left_name.clone()];
            line.extend(self.terminals.iter().map(|t| {
                let cell = row.get(t).unwrap_or(&NO_ENTRY);
                ProductionOutput::from_cell(left, cell).to_plaintext(left_name.len(), false)
            }));
            output.push(line);
        }

        let mut width = vec![0; self.terminals.len() + 1];
        for (j, w) in width.iter_mut().enumerate() {
            *w = output.iter().map(|line| line[j].len()).max().unwrap_or(0);
        }
        output
            .iter()
            .map(|line| {
                line.iter()
                    .enumerate()
                    .map(|(i, s)| format!("{:>width$}", s, width = width[i]))
                    .collect::<Vec<_>>()
                    .join(" | ")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn to_latex(&self) -> String {
        let mut header: Vec<String> = vec![format!(
            "\\[\\begin{{array}}{{c{}}}\n",
            "|l".repeat(self.terminals.len()),
        )];
        header.extend(
            self.terminals
                .iter()
                .map(|t| format!("\\text{{{}}}", escape_tex(t.value.as_str()))),
        );
        let header = header.join(" & ");

        let mut output: Vec<String> = Vec::new();
        for (left, row) in &self.rows {
            let mut line: Vec<String> = vec![format!("{}", escape_tex(left.value.as_str()))];
            line.extend(self.terminals.iter().map(|t| {
                let cell = row.get(t).unwrap_or(&NO_ENTRY);
                ProductionOutput::from_cell(left, cell).to_latex(false)
            }));
            output.push(line.join(" & "));
        }

        let output = output.join("\\\\\n");

        header + "\\\\\\hline\n" + &output + "\n\\end{array}\\]"
    }
}

impl Grammar {
    pub fn generate_ll1_parsing_table(&self, policy: ConflictPolicy) -> Result<LL1Table> {
        let first_follow = self.calculate_first_follow();
        self.generate_ll1_parsing_table_with(&first_follow, policy)
    }

    pub fn generate_ll1_parsing_table_with(
        &self,
        first_follow: &FirstFollow,
        policy: ConflictPolicy,
    ) -> Result<LL1Table> {
        let mut terminals: Vec<Expr> = self.terminal_iter().cloned().collect();
        let dollar = Expr::dollar();
        if !terminals.contains(&dollar) {
            terminals.push(dollar);
        }

        let mut rows: IndexMap<Expr, IndexMap<Expr, Cell>> = self
            .non_terminal_iter()
            .map(|left| {
                let row = terminals
                    .iter()
                    .map(|t| (t.clone(), Cell::NoEntry))
                    .collect();
                (left.clone(), row)
            })
            .collect();

        for (left, right) in self.productions() {
            let row = rows.entry(left.clone()).or_default();
            let mut register = |term: &Expr| {
                row.entry(term.clone()).or_insert(Cell::NoEntry).register(right);
            };

            let mut derives_empty = true;
            if !is_empty_production(right) {
                for expr in right {
                    match expr.kind {
                        ExprKind::Eps => continue,
                        ExprKind::Term => {
                            register(expr);
                            derives_empty = false;
                            break;
                        }
                        ExprKind::NTerm => {
                            if let Some(first) = first_follow.first.get(expr) {
                                first.iter().filter(|t| !t.is_epsilon()).for_each(&mut register);
                            }
                            if !first_follow.is_nullable(expr) {
                                derives_empty = false;
                                break;
                            }
                        }
                        ExprKind::Error => {
                            derives_empty = false;
                            break;
                        }
                    }
                }
            }

            if derives_empty {
                if let Some(follow) = first_follow.follow.get(left) {
                    follow.iter().for_each(&mut register);
                }
            }
        }

        let table = LL1Table {
            axiom: self.axiom.clone(),
            terminals,
            rows,
        };

        for (nterm, term, alternatives) in table.conflicts() {
            if policy == ConflictPolicy::Reject {
                return Err(Error::Conflict {
                    nterm: nterm.clone(),
                    term: term.clone(),
                    alternatives: alternatives.to_vec(),
                });
            }
            warn!(
                "conflict at [{}, {}]: {} alternatives, using the first registered",
                nterm,
                term,
                alternatives.len()
            );
        }

        debug!(
            "built LL(1) table: {} nonterminals x {} terminals",
            table.rows.len(),
            table.terminals.len()
        );
        Ok(table)
    }
}
