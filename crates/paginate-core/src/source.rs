//! The data-source collaborator contract.

use crate::{
    error::SourceError,
    order::{Direction, OrderSpec, OrderTerm},
};
use model::records::row::RowData;
use query_builder::ast::expr::Expr;

/// The abstraction the paginator drives. Implementations translate the
/// order spec and predicate into their own query representation; the
/// paginator never touches the store directly.
///
/// Synchronous by design: a pagination request is single-owner and
/// request-scoped, and the only blocking operations are the bounded fetch
/// and the count.
pub trait DataSource {
    /// The ordering this source naturally reports. May be empty, in which
    /// case the paginator orders by the identifier field ascending.
    fn order(&self) -> Vec<OrderTerm>;

    /// Re-orders the source by the spec's fields, each taken in the
    /// effective direction for `traversal` (all flipped when backward).
    fn apply_order(&mut self, spec: &OrderSpec, traversal: Direction);

    /// Restricts results to rows satisfying the boundary predicate.
    fn apply_filter(&mut self, predicate: Expr);

    /// Caps the number of rows `fetch` returns.
    fn limit(&mut self, limit: usize);

    /// Executes and returns the ordered rows.
    fn fetch(&mut self) -> Result<Vec<RowData>, SourceError>;

    /// Counts rows ignoring the ordering, predicate, and limit applied
    /// through this trait (filters the source carried beforehand still
    /// apply).
    fn count(&self) -> Result<u64, SourceError>;
}
