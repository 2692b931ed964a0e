//! A vector-backed data source.
//!
//! Reference collaborator for tests and small in-process datasets: filters
//! with the in-memory predicate evaluator, sorts with `Value::compare`, and
//! caps results at the applied limit.

use crate::{
    error::SourceError,
    order::{Direction, OrderField, OrderSpec, OrderTerm},
    source::DataSource,
};
use model::{core::value::Value, records::row::RowData};
use query_builder::{ast::expr::Expr, matches};
use std::cmp::Ordering;
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    rows: Vec<RowData>,
    order: Vec<OrderTerm>,
    filter: Option<Expr>,
    sort: Vec<OrderField>,
    limit: Option<usize>,
}

impl MemorySource {
    pub fn new(rows: Vec<RowData>) -> Self {
        MemorySource {
            rows,
            ..Default::default()
        }
    }

    /// Sets the ordering this source reports to the paginator.
    pub fn with_order(mut self, order: Vec<OrderTerm>) -> Self {
        self.order = order;
        self
    }
}

impl DataSource for MemorySource {
    fn order(&self) -> Vec<OrderTerm> {
        self.order.clone()
    }

    fn apply_order(&mut self, spec: &OrderSpec, traversal: Direction) {
        self.sort = spec
            .fields()
            .iter()
            .map(|field| OrderField {
                name: field.name.clone(),
                direction: traversal.effective(field.direction),
            })
            .collect();
    }

    fn apply_filter(&mut self, predicate: Expr) {
        self.filter = Some(predicate);
    }

    fn limit(&mut self, limit: usize) {
        self.limit = Some(limit);
    }

    fn fetch(&mut self) -> Result<Vec<RowData>, SourceError> {
        let mut rows: Vec<RowData> = match &self.filter {
            Some(predicate) => self
                .rows
                .iter()
                .filter(|row| matches(predicate, row))
                .cloned()
                .collect(),
            None => self.rows.clone(),
        };

        if !self.sort.is_empty() {
            let sort = self.sort.clone();
            rows.sort_by(|a, b| compare_rows(a, b, &sort));
        }

        if let Some(limit) = self.limit {
            rows.truncate(limit);
        }

        debug!(rows = rows.len(), "memory source fetch");
        Ok(rows)
    }

    fn count(&self) -> Result<u64, SourceError> {
        Ok(self.rows.len() as u64)
    }
}

fn compare_rows(a: &RowData, b: &RowData, sort: &[OrderField]) -> Ordering {
    for field in sort {
        let left = a.get_value(&field.name);
        let right = b.get_value(&field.name);

        let ord = compare_values(&left, &right);
        let ord = if field.direction.is_asc() {
            ord
        } else {
            ord.reverse()
        };

        if ord != Ordering::Equal {
            return ord;
        }
    }

    Ordering::Equal
}

/// Nulls sort first under ascending direction. Incomparable non-null pairs
/// compare equal; the identifier tie-break resolves before that can matter
/// at a page boundary.
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => a.compare(b).unwrap_or(Ordering::Equal),
    }
}
