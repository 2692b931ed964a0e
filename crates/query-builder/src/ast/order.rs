//! Defines the AST node for a single ORDER BY element.

use crate::ast::{common::OrderDir, expr::Expr};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderByExpr {
    pub expr: Expr,
    /// `None` means the storage default, which is ascending.
    pub direction: Option<OrderDir>,
}

impl OrderByExpr {
    pub fn new(expr: Expr, direction: Option<OrderDir>) -> Self {
        OrderByExpr { expr, direction }
    }
}
