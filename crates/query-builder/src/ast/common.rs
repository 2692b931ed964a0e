//! Defines common, reusable AST nodes shared by predicates and orderings.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum OrderDir {
    Asc,
    Desc,
}

impl OrderDir {
    /// The opposite sort direction.
    pub fn reverse(self) -> Self {
        match self {
            OrderDir::Asc => OrderDir::Desc,
            OrderDir::Desc => OrderDir::Asc,
        }
    }

    pub fn is_asc(self) -> bool {
        matches!(self, OrderDir::Asc)
    }
}
