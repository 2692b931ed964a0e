//! Boundary predicate construction.
//!
//! Treats the order spec and cursor as a value tuple and selects every row
//! whose tuple sorts strictly after the cursor's under the combined
//! per-field/traversal direction. Expressed as a disjunction of one
//! conjunction per prefix length:
//!
//! ```text
//! (f1 > c1)
//! OR (f1 = c1 AND f2 > c2)
//! OR (f1 = c1 AND f2 = c2 AND f3 > c3)
//! ...
//! ```
//!
//! with `>` swapped for `<` wherever the effective direction is descending.
//! Null sort keys follow the nulls-smallest rule the memory source sorts
//! by: under an ascending effective direction null rows lead, under a
//! descending one they trail. A null cursor value therefore turns its
//! comparison into a null test (`IS NOT NULL` ascending, nothing at all
//! descending) and its tie-break equality into `IS NULL`.
//!
//! Tie-break correctness rests entirely on the unique identifier field the
//! normalizer appends: without it, rows equal on every explicit field would
//! be skipped or duplicated across page boundaries.

use crate::{
    cursor::Cursor,
    order::{Direction, OrderSpec},
};
use model::core::value::Value;
use query_builder::{
    ast::{
        common::OrderDir,
        expr::{BinaryOperator, Expr},
    },
    ident, value,
};

/// Builds the filter selecting rows strictly after (or, for backward
/// traversal, before) the cursor position in sort order.
pub fn boundary_predicate(spec: &OrderSpec, cursor: &Cursor, traversal: Direction) -> Expr {
    let fields = spec.fields();
    let mut branches: Vec<Expr> = Vec::new();

    for k in 0..fields.len() {
        let field = &fields[k];
        let effective = traversal.effective(field.direction);

        let Some(mut expr) = strict_after(&field.name, cursor.value(k), effective) else {
            continue;
        };

        // Equality on every field before `k` scopes the comparison to rows
        // tied with the cursor on that prefix.
        for j in (0..k).rev() {
            expr = Expr::and(tied_with(&fields[j].name, cursor.value(j)), expr);
        }

        branches.push(expr);
    }

    // Every branch can degenerate only when the trailing identifier value
    // itself is null; no row sorts strictly after that position.
    branches
        .into_iter()
        .reduce(Expr::or)
        .unwrap_or(Expr::Value(Value::Boolean(false)))
}

/// Rows strictly after the cursor value on this field alone, honoring the
/// nulls-smallest ordering.
fn strict_after(name: &str, cursor_value: &Value, direction: OrderDir) -> Option<Expr> {
    let field = ident!(name);

    match (cursor_value.is_null(), direction) {
        (false, OrderDir::Asc) => Some(Expr::binary(
            field,
            BinaryOperator::Gt,
            value!(cursor_value.clone()),
        )),
        // Descending puts null rows after every non-null value.
        (false, OrderDir::Desc) => Some(Expr::or(
            Expr::binary(field.clone(), BinaryOperator::Lt, value!(cursor_value.clone())),
            Expr::is_null(field),
        )),
        (true, OrderDir::Asc) => Some(Expr::is_not_null(field)),
        // Nothing sorts after null when nulls trail.
        (true, OrderDir::Desc) => None,
    }
}

fn tied_with(name: &str, cursor_value: &Value) -> Expr {
    if cursor_value.is_null() {
        Expr::is_null(ident!(name))
    } else {
        Expr::binary(
            ident!(name),
            BinaryOperator::Eq,
            value!(cursor_value.clone()),
        )
    }
}
