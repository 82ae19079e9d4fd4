use crowbook_text_processing::escape;
use serde::Serialize;

use crate::error::Result;

use super::{grammar::ExprKind, Cell, Expr, FirstFollow, Grammar};

#[derive(Debug, Clone)]
pub struct ProductionOutput<'a> {
    pub left: &'a Expr,
    pub rights: Vec<&'a [Expr]>,
}

fn symbol_to_plaintext(expr: &Expr) -> String {
    match expr.kind {
        ExprKind::Eps => "ε".to_string(),
        _ => expr.to_string(),
    }
}

fn symbol_to_latex(expr: &Expr) -> String {
    match expr.kind {
        ExprKind::Eps => "\\epsilon".to_string(),
        ExprKind::Term => format!("\\text{{{}}}", escape::tex(expr.value.as_str())),
        _ => escape::tex(expr.value.as_str()).to_string(),
    }
}

impl<'a> ProductionOutput<'a> {
    pub fn from_cell(left: &'a Expr, cell: &'a Cell) -> Self {
        Self {
            left,
            rights: cell.alternatives().iter().map(|p| p.as_slice()).collect(),
        }
    }

    pub fn to_plaintext(&self, left_width: usize, multiline: bool) -> String {
        self.rights
            .iter()
            .map(|right| {
                right
                    .iter()
                    .map(symbol_to_plaintext)
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .enumerate()
            .map(|(i, right)| {
                if i == 0 {
                    format!(
                        "{:>width$} -> {}",
                        self.left.value,
                        right,
                        width = left_width
                    )
                } else if multiline {
                    format!("{:>width$}  | {}", "", right, width = left_width)
                } else {
                    format!(", {}", right)
                }
            })
            .collect::<Vec<_>>()
            .join(if multiline { "\n" } else { "" })
    }

    pub fn to_latex(&self, and_sign: bool) -> String {
        if self.rights.is_empty() {
            return String::new();
        }

        let left = if and_sign {
            format!("{} & \\rightarrow &", escape::tex(self.left.value.as_str()))
        } else {
            format!("{} \\rightarrow ", escape::tex(self.left.value.as_str()))
        };
        let right = self
            .rights
            .iter()
            .map(|right| {
                right
                    .iter()
                    .map(symbol_to_latex)
                    .collect::<Vec<_>>()
                    .join(" \\ ")
            })
            .collect::<Vec<_>>()
            .join(" \\mid ");

        left + &right
    }
}

pub struct ProductionOutputVec<'a> {
    productions: Vec<ProductionOutput<'a>>,
}

impl ProductionOutputVec<'_> {
    pub fn to_plaintext(&self) -> String {
        let left_max_len = self
            .productions
            .iter()
            .map(|p| p.left.value.len())
            .max()
            .unwrap_or(0);
        self.productions
            .iter()
            .map(|s| s.to_plaintext(left_max_len, true))
            .collect::<Vec<String>>()
            .join("\n")
    }

    pub fn to_latex(&self) -> String {
        std::iter::once("\\[\\begin{array}{cll}".to_string())
            .chain(self.productions.iter().map(|s| s.to_latex(true)))
            .chain(std::iter::once("\\end{array}\\]".to_string()))
            .collect::<Vec<String>>()
            .join("\\\\\n")
    }
}

impl Grammar {
    pub fn to_production_output_vec(&self) -> ProductionOutputVec {
        let productions = self
            .rules
            .iter()
            .map(|(left, rights)| ProductionOutput {
                left,
                rights: rights.iter().map(|p| p.as_slice()).collect(),
            })
            .collect();
        ProductionOutputVec { productions }
    }
}

#[derive(Serialize)]
struct NonTerminalOutput<'a> {
    name: &'a str,
    nullable: bool,
    first: Vec<String>,
    follow: Vec<String>,
}

impl NonTerminalOutput<'_> {
    fn to_plaintext(&self) -> String {
        format!(
            "{} | {} | {} | {}",
            self.name,
            self.nullable,
            self.first.join(", "),
            self.follow.join(", ")
        )
    }

    fn to_latex(&self) -> String {
        fn f(a: &[String]) -> String {
            a.iter()
                .map(|s| {
                    if s == "ε" {
                        r"$\epsilon$".to_string()
                    } else {
                        escape::tex(s.as_str()).to_string()
                    }
                })
                .collect::<Vec<_>>()
                .join(r"\ ")
        }

        format!(
            "{} & {} & {} & {}",
            escape::tex(self.name),
            self.nullable,
            f(&self.first),
            f(&self.follow)
        )
    }
}

#[derive(Serialize)]
pub struct NonTerminalOutputVec<'a> {
    data: Vec<NonTerminalOutput<'a>>,
}

impl NonTerminalOutputVec<'_> {
    pub fn to_plaintext(&self) -> String {
        self.data
            .iter()
            .map(|s| s.to_plaintext())
            .collect::<Vec<String>>()
            .join("\n")
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_latex(&self) -> String {
        let content = self
            .data
            .iter()
            .map(|e| e.to_latex())
            .collect::<Vec<_>>()
            .join("\\\\\n ");

        "\\begin{tabular}{c|c|c|c}\n".to_string()
            + "Symbol & Nullable & First & Follow\\\\\\hline\n"
            + &content
            + "\\\\\n\\end{tabular}"
    }
}

impl FirstFollow {
    pub fn to_non_terminal_output_vec(&self) -> NonTerminalOutputVec {
        let mut data = Vec::new();
        for (nterm, first) in &self.first {
            // ε is listed last, after the sorted terminals
            let mut t = NonTerminalOutput {
                name: nterm.value.as_str(),
                nullable: self.is_nullable(nterm),
                first: first
                    .iter()
                    .filter(|e| !e.is_epsilon())
                    .map(symbol_to_plaintext)
                    .collect(),
                follow: self
                    .follow
                    .get(nterm)
                    .map(|set| set.iter().map(symbol_to_plaintext).collect())
                    .unwrap_or_default(),
            };
            t.first.sort();
            t.follow.sort();

            if t.nullable {
                t.first.push(symbol_to_plaintext(&Expr::epsilon()));
            }
            data.push(t);
        }
        NonTerminalOutputVec { data }
    }
}
