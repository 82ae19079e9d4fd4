use log::{debug, trace};

use crate::error::{Error, Result};
use crate::grammar::{grammar::ExprKind, Expr, LL1Table, Production};
use crate::lexer::{Lexer, Span, Token, TokenKind};

pub mod bootstrap;
pub mod extract;

/// A parse tree node. Nonterminal nodes record the alternative applied,
/// terminal leaves record the literal text and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub expr: Expr,
    pub rule: Option<Production>,
    pub value: Option<String>,
    pub span: Option<Span>,
    pub children: Vec<Node>,
}

impl Node {
    /// Terminal leaves in left-to-right order.
    pub fn leaves(&self) -> Vec<&Node> {
        let mut leaves = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if node.expr.is_term() {
                leaves.push(node);
            }
            stack.extend(node.children.iter().rev());
        }
        leaves
    }

    pub fn to_plaintext(&self) -> String {
        let mut lines = Vec::new();
        self.write_plaintext(0, &mut lines);
        lines.join("\n")
    }

    fn write_plaintext(&self, depth: usize, lines: &mut Vec<String>) {
        let indent = "  ".repeat(depth);
        match &self.rule {
            Some(rule) => {
                let right = rule
                    .iter()
                    .map(|e| e.value.as_str())
                    .collect::<Vec<_>>()
                    .join(" ");
                lines.push(format!("{}{} -> {}", indent, self.expr.value, right));
                for child in &self.children {
                    child.write_plaintext(depth + 1, lines);
                }
            }
            None => lines.push(format!(
                "{}{} {}",
                indent,
                self.expr.value,
                self.value.as_deref().unwrap_or("")
            )),
        }
    }
}

/// A node under construction; children are arena indices.
struct PendingNode {
    expr: Expr,
    rule: Option<Production>,
    value: Option<String>,
    span: Option<Span>,
    children: Vec<usize>,
}

/// Owns every node while the automaton runs. Stack entries refer to the node
/// they attach to by index, and a child is always allocated after its parent.
struct BuildContext {
    arena: Vec<PendingNode>,
}

const ROOT: usize = 0;

impl BuildContext {
    fn new() -> Self {
        Self {
            arena: vec![PendingNode {
                expr: Expr::nterm("S'"),
                rule: None,
                value: None,
                span: None,
                children: Vec::new(),
            }],
        }
    }

    fn attach(&mut self, parent: usize, node: PendingNode) -> usize {
        let idx = self.arena.len();
        self.arena.push(node);
        self.arena[parent].children.push(idx);
        idx
    }

    /// Assembles the owned tree bottom-up and returns the single child of the root.
    fn finish(mut self) -> Option<Node> {
        let mut built: Vec<Option<Node>> = Vec::new();
        built.resize_with(self.arena.len(), || None);
        while let Some(pending) = self.arena.pop() {
            let idx = self.arena.len();
            let children = pending
                .children
                .iter()
                .filter_map(|&child| built[child].take())
                .collect();
            built[idx] = Some(Node {
                expr: pending.expr,
                rule: pending.rule,
                value: pending.value,
                span: pending.span,
                children,
            });
        }
        built[ROOT]
            .take()
            .and_then(|root| root.children.into_iter().next())
    }
}

fn advance(lexer: &mut impl Lexer) -> Result<Token> {
    let token = lexer.next_token();
    if token.kind == TokenKind::Error {
        return Err(Error::Lexical {
            text: token.value,
            span: token.span,
        });
    }
    Ok(token)
}

fn describe(token: &Token) -> String {
    match token.kind {
        TokenKind::Eof => "end of input".to_string(),
        _ => token.kind.as_str().to_string(),
    }
}

fn expected_for(table: &LL1Table, nterm: &Expr) -> String {
    let terminals: Vec<String> = table
        .rows
        .get(nterm)
        .map(|row| {
            row.iter()
                .filter(|(_, cell)| cell.chosen().is_some())
                .map(|(term, _)| term.to_string())
                .collect()
        })
        .unwrap_or_default();
    format!("{} (one of {})", nterm.value, terminals.join(", "))
}

/// Runs the predictive parser over `lexer` using `table`.
///
/// The first lexical or syntax error aborts the parse; no partial tree is returned.
/// A table that expands a nonterminal into itself without consuming input (left
/// recursion kept by `ConflictPolicy::FirstMatch`) is reported as a syntax error.
pub fn parse(lexer: &mut impl Lexer, table: &LL1Table) -> Result<Node> {
    let dollar = Expr::dollar();
    let mut context = BuildContext::new();
    let mut stack: Vec<(Expr, usize)> = vec![(dollar.clone(), ROOT), (table.axiom.clone(), ROOT)];
    let mut lookahead = advance(lexer)?;
    let mut steps = 0;
    // Nonterminals expanded since the last match, with the stack height below each.
    // An entry lives until the parse pops below that height.
    let mut expanding: Vec<(Expr, usize)> = Vec::new();

    while let Some((top, parent)) = stack.pop() {
        steps += 1;
        let height = stack.len();
        expanding.retain(|(_, below)| *below <= height);
        let current = lookahead.to_expr();
        trace!("step {}: top {} lookahead {}", steps, top, current);

        if top == dollar {
            if current != dollar {
                return Err(Error::Syntax {
                    found: describe(&lookahead),
                    expected: "end of input".to_string(),
                    span: lookahead.span,
                });
            }
            break;
        }

        match top.kind {
            ExprKind::Term => {
                if top != current {
                    return Err(Error::Syntax {
                        found: describe(&lookahead),
                        expected: top.value,
                        span: lookahead.span,
                    });
                }
                context.attach(
                    parent,
                    PendingNode {
                        expr: current,
                        rule: None,
                        value: Some(lookahead.value),
                        span: Some(lookahead.span),
                        children: Vec::new(),
                    },
                );
                lookahead = advance(lexer)?;
                expanding.clear();
            }
            ExprKind::NTerm => {
                if expanding.iter().any(|(nterm, _)| *nterm == top) {
                    return Err(Error::Syntax {
                        found: describe(&lookahead),
                        expected: format!(
                            "{} to consume input, but it expands to itself",
                            top.value
                        ),
                        span: lookahead.span,
                    });
                }
                expanding.push((top.clone(), height));
                let production = match table.get(&top, &current).chosen() {
                    Some(production) => production,
                    None => {
                        return Err(Error::Syntax {
                            found: describe(&lookahead),
                            expected: expected_for(table, &top),
                            span: lookahead.span,
                        })
                    }
                };
                let node = context.attach(
                    parent,
                    PendingNode {
                        expr: top,
                        rule: Some(production.clone()),
                        value: None,
                        span: None,
                        children: Vec::new(),
                    },
                );
                stack.extend(
                    production
                        .iter()
                        .rev()
                        .filter(|e| !e.is_epsilon())
                        .map(|e| (e.clone(), node)),
                );
            }
            ExprKind::Eps => {}
            ExprKind::Error => {
                return Err(Error::Syntax {
                    found: describe(&lookahead),
                    expected: top.value,
                    span: lookahead.span,
                })
            }
        }
    }

    debug!("parse finished after {} steps", steps);
    context.finish().ok_or_else(|| Error::Syntax {
        found: describe(&lookahead),
        expected: table.axiom.value.clone(),
        span: lookahead.span,
    })
}
