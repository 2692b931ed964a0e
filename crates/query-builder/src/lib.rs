pub mod ast;
pub mod eval;
pub mod macros;

pub use eval::{eval_expr, matches};
