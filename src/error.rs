use std::path::PathBuf;

use thiserror::Error;

use crate::grammar::Expr;
use crate::lexer::Span;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("lexical error: unrecognized character {text:?} at {span}")]
    Lexical { text: String, span: Span },

    #[error("syntax error: unexpected {found} at {span}, expected: {expected}")]
    Syntax {
        found: String,
        expected: String,
        span: Span,
    },

    #[error("semantic error: unknown token {name:?} at {span}")]
    Semantic { name: String, span: Span },

    #[error("grammar is not LL(1): {nterm} on {term} has {} alternatives", .alternatives.len())]
    Conflict {
        nterm: Expr,
        term: Expr,
        alternatives: Vec<Vec<Expr>>,
    },

    #[error("malformed grammar description tree: {0}")]
    MalformedTree(String),

    #[error("cannot access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed table: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("evaluation error: {message}")]
    Evaluation { message: String },
}
