//! Folds a parse tree of the arithmetic grammar in `grammars/arithmetic.grammar`
//! (`E -> T E'`, `E' -> "+" T E' | ε`, `T -> F T'`, `T' -> "*" F T' | ε`,
//! `F -> "n" | "(" E ")"`) into its value.

use crate::error::{Error, Result};
use crate::parser::Node;

fn fail(message: impl Into<String>) -> Error {
    Error::Evaluation {
        message: message.into(),
    }
}

fn child(node: &Node, idx: usize) -> Result<&Node> {
    node.children
        .get(idx)
        .ok_or_else(|| fail(format!("{} has no child at position {}", node.expr.value, idx)))
}

fn add(a: i64, b: i64) -> Result<i64> {
    a.checked_add(b)
        .ok_or_else(|| fail(format!("{} + {} overflows", a, b)))
}

fn mul(a: i64, b: i64) -> Result<i64> {
    a.checked_mul(b)
        .ok_or_else(|| fail(format!("{} * {} overflows", a, b)))
}

pub fn compute(root: &Node) -> Result<i64> {
    compute_e(root)
}

fn compute_e(node: &Node) -> Result<i64> {
    add(compute_t(child(node, 0)?)?, compute_e_tail(child(node, 1)?)?)
}

fn compute_e_tail(node: &Node) -> Result<i64> {
    if node.children.is_empty() {
        return Ok(0);
    }
    add(compute_t(child(node, 1)?)?, compute_e_tail(child(node, 2)?)?)
}

fn compute_t(node: &Node) -> Result<i64> {
    mul(compute_f(child(node, 0)?)?, compute_t_tail(child(node, 1)?)?)
}

fn compute_t_tail(node: &Node) -> Result<i64> {
    if node.children.is_empty() {
        return Ok(1);
    }
    mul(compute_f(child(node, 1)?)?, compute_t_tail(child(node, 2)?)?)
}

fn compute_f(node: &Node) -> Result<i64> {
    match node.children.len() {
        1 => {
            let literal = child(node, 0)?.value.as_deref().unwrap_or("");
            literal
                .parse::<i64>()
                .map_err(|e| fail(format!("bad number {:?}: {}", literal, e)))
        }
        3 => compute_e(child(node, 1)?),
        n => Err(fail(format!(
            "{} has {} children, expected 1 or 3",
            node.expr.value, n
        ))),
    }
}
