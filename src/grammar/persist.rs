use std::{fs, path::Path};

use indexmap::IndexMap;
use log::info;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

use super::{Cell, Expr, LL1Table};

#[derive(Debug, Serialize, Deserialize)]
struct Transition {
    term: Expr,
    nterms: Vec<Expr>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Rule {
    nterm: Expr,
    transitions: Vec<Transition>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TableInfo {
    axiom: Expr,
    rules: Vec<Rule>,
}

impl LL1Table {
    /// Only the alternative the parser would apply is stored for each cell,
    /// so conflicted cells come back as `Cell::Unique`.
    pub fn to_json(&self) -> Result<String> {
        let rules = self
            .rows
            .iter()
            .map(|(nterm, row)| Rule {
                nterm: nterm.clone(),
                transitions: row
                    .iter()
                    .map(|(term, cell)| Transition {
                        term: term.clone(),
                        nterms: match cell.chosen() {
                            Some(production) => production.clone(),
                            None => vec![Expr::error()],
                        },
                    })
                    .collect(),
            })
            .collect();
        let info = TableInfo {
            axiom: self.axiom.clone(),
            rules,
        };
        Ok(serde_json::to_string(&info)?)
    }

    pub fn from_json(data: &str) -> Result<Self> {
        let info: TableInfo = serde_json::from_str(data)?;

        let mut terminals: Vec<Expr> = Vec::new();
        let mut rows: IndexMap<Expr, IndexMap<Expr, Cell>> = IndexMap::new();
        for rule in info.rules {
            let row = rows.entry(rule.nterm).or_default();
            for transition in rule.transitions {
                if !terminals.contains(&transition.term) {
                    terminals.push(transition.term.clone());
                }
                let cell = if transition.nterms.iter().any(Expr::is_error) {
                    Cell::NoEntry
                } else {
                    Cell::Unique(transition.nterms)
                };
                row.insert(transition.term, cell);
            }
        }

        Ok(LL1Table {
            axiom: info.axiom,
            terminals,
            rows,
        })
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let data = self.to_json()?;
        fs::write(path, data).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!("saved table for {} to {}", self.axiom, path.display());
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::from_json(&data)?;
        info!("loaded table for {} from {}", table.axiom, path.display());
        Ok(table)
    }
}
