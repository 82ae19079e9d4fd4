use indexmap::{IndexMap, IndexSet};
use log::debug;

use super::{grammar::ExprKind, Expr, Grammar};

/// Nonterminal -> set of symbols, used for both First and Follow.
pub type SymbolSets = IndexMap<Expr, IndexSet<Expr>>;

#[derive(Debug, Clone)]
pub struct FirstFollow {
    pub first: SymbolSets,
    pub follow: SymbolSets,
}

impl FirstFollow {
    pub fn first_of(&self, sequence: &[Expr]) -> IndexSet<Expr> {
        first_of_sequence(sequence, &self.first)
    }

    pub fn is_nullable(&self, expr: &Expr) -> bool {
        is_nullable(expr, &self.first)
    }
}

/// First of a symbol sequence given the currently known First sets of nonterminals.
/// A nonterminal without an entry in `first` contributes nothing.
pub fn first_of_sequence(sequence: &[Expr], first: &SymbolSets) -> IndexSet<Expr> {
    let epsilon = Expr::epsilon();
    let mut result = IndexSet::new();
    for expr in sequence {
        match expr.kind {
            ExprKind::Eps => {
                result.insert(epsilon);
                return result;
            }
            ExprKind::Term => {
                result.insert(expr.clone());
                return result;
            }
            ExprKind::NTerm => {
                let set = match first.get(expr) {
                    Some(set) => set,
                    None => return result,
                };
                if !set.contains(&epsilon) {
                    result.extend(set.iter().cloned());
                    return result;
                }
                result.extend(set.iter().filter(|e| !e.is_epsilon()).cloned());
            }
            ExprKind::Error => return result,
        }
    }
    result.insert(epsilon);
    result
}

fn is_nullable(expr: &Expr, first: &SymbolSets) -> bool {
    match expr.kind {
        ExprKind::Eps => true,
        ExprKind::NTerm => first
            .get(expr)
            .map_or(false, |set| set.contains(&Expr::epsilon())),
        ExprKind::Term | ExprKind::Error => false,
    }
}

impl Grammar {
    pub fn calculate_first_follow(&self) -> FirstFollow {
        let first = self.calculate_first();
        let follow = self.calculate_follow(&first);
        FirstFollow { first, follow }
    }

    pub fn calculate_first(&self) -> SymbolSets {
        let mut first: SymbolSets = self
            .non_terminal_iter()
            .map(|left| (left.clone(), IndexSet::new()))
            .collect();

        let mut rounds = 0;
        let mut changed = true;
        while changed {
            changed = false;
            rounds += 1;
            for (left, right) in self.productions() {
                let f = first_of_sequence(right, &first);
                if let Some(set) = first.get_mut(left) {
                    for e in f {
                        changed |= set.insert(e);
                    }
                }
            }
        }

        debug!("first sets converged after {} rounds", rounds);
        first
    }

    pub fn calculate_follow(&self, first: &SymbolSets) -> SymbolSets {
        let mut follow: SymbolSets = self
            .non_terminal_iter()
            .map(|left| (left.clone(), IndexSet::new()))
            .collect();
        follow
            .entry(self.axiom.clone())
            .or_default()
            .insert(Expr::dollar());

        // whatever can start the remainder of a production follows the nonterminal
        for (_, right) in self.productions() {
            for (i, expr) in right.iter().enumerate() {
                if !expr.is_nterm() {
                    continue;
                }
                let mut seeded: IndexSet<Expr> = IndexSet::new();
                for next in &right[i + 1..] {
                    match next.kind {
                        ExprKind::Eps => continue,
                        ExprKind::Term => {
                            seeded.insert(next.clone());
                            break;
                        }
                        ExprKind::NTerm => {
                            if let Some(set) = first.get(next) {
                                seeded.extend(set.iter().filter(|e| !e.is_epsilon()).cloned());
                            }
                            if !is_nullable(next, first) {
                                break;
                            }
                        }
                        ExprKind::Error => break,
                    }
                }
                follow.entry(expr.clone()).or_default().extend(seeded);
            }
        }

        let mut rounds = 0;
        let mut changed = true;
        while changed {
            changed = false;
            rounds += 1;
            for (left, right) in self.productions() {
                for (i, expr) in right.iter().enumerate() {
                    if !expr.is_nterm() || !right[i + 1..].iter().all(|e| is_nullable(e, first)) {
                        continue;
                    }
                    let inherited: Vec<Expr> = follow
                        .get(left)
                        .map(|set| set.iter().cloned().collect())
                        .unwrap_or_default();
                    let set = follow.entry(expr.clone()).or_default();
                    for t in inherited {
                        changed |= set.insert(t);
                    }
                }
            }
        }

        debug!("follow sets converged after {} rounds", rounds);
        follow
    }
}
