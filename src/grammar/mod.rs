pub mod first_follow;
pub mod grammar;
pub mod ll1_parsing_table;
pub mod persist;
pub mod pretty_print;
pub use first_follow::{first_of_sequence, FirstFollow, SymbolSets};
pub use grammar::{Expr, ExprKind, Grammar, Production, Rules};
pub use ll1_parsing_table::{Cell, ConflictPolicy, LL1Table};

pub const EPSILON: &str = "eps";
pub const END_MARK: &str = "Dollar";
pub const ERROR_MARK: &str = "Error";
