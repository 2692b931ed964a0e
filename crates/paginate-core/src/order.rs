//! Ordering normalization.
//!
//! Callers hand over orderings in several shapes (bare field names, field
//! plus direction, free-text clauses, structured order expressions). All of
//! them funnel through [`OrderSpec::normalize`], which resolves them into a
//! canonical field/direction list that always ends with the unique
//! row-identifier field. That trailing field is what makes page boundaries
//! stable when the explicit sort keys carry duplicate values.

use crate::error::{PageError, Result};
use query_builder::ast::{common::OrderDir, expr::Expr, order::OrderByExpr};
use serde::{Deserialize, Serialize};

/// Which way a request walks the ordered sequence relative to its cursor.
/// Distinct from each field's own `Asc`/`Desc`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    pub fn is_forward(self) -> bool {
        matches!(self, Direction::Forward)
    }

    /// The direction a field is actually compared/fetched in: backward
    /// traversal walks the sequence in reverse, so every field flips.
    pub fn effective(self, dir: OrderDir) -> OrderDir {
        match self {
            Direction::Forward => dir,
            Direction::Backward => dir.reverse(),
        }
    }
}

/// A single raw ordering element, as supplied by the caller or reported by a
/// data source. A closed set: anything that does not fit one of these
/// variants is not an ordering the paginator supports.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum OrderTerm {
    /// A bare field name, implicitly ascending.
    Field(String),

    /// A field name with an explicit direction.
    FieldDir(String, OrderDir),

    /// A free-text clause: comma-separated `identifier [asc|desc]`,
    /// case-insensitive.
    Clause(String),

    /// A structured order expression. Only plain identifiers are accepted;
    /// function calls and computed expressions are rejected.
    Expr(OrderByExpr),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderField {
    pub name: String,
    pub direction: OrderDir,
}

/// A canonical, uniquely-resolving ordering: non-empty, duplicate-free, and
/// terminated by the row-identifier field. Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderSpec {
    fields: Vec<OrderField>,
}

impl OrderSpec {
    /// Resolves raw order terms into a canonical spec.
    ///
    /// Terms after the first occurrence of `id_field` are dropped (the
    /// identifier is unique per record, so nothing after it can influence
    /// the order), later duplicates of earlier fields are dropped, and the
    /// identifier is appended ascending when absent. An empty input
    /// normalizes to `[id_field asc]`.
    pub fn normalize(terms: &[OrderTerm], id_field: &str) -> Result<OrderSpec> {
        let mut fields: Vec<OrderField> = Vec::new();

        'terms: for term in terms {
            for field in resolve_term(term)? {
                if fields.iter().any(|f| f.name == field.name) {
                    continue;
                }

                let is_id = field.name == id_field;
                fields.push(field);

                if is_id {
                    break 'terms;
                }
            }
        }

        if fields.last().is_none_or(|f| f.name != id_field) {
            fields.push(OrderField {
                name: id_field.to_string(),
                direction: OrderDir::Asc,
            });
        }

        Ok(OrderSpec { fields })
    }

    pub fn fields(&self) -> &[OrderField] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Always false: normalization yields at least the identifier field.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }
}

fn resolve_term(term: &OrderTerm) -> Result<Vec<OrderField>> {
    match term {
        OrderTerm::Field(name) => Ok(vec![named_field(name, OrderDir::Asc)?]),
        OrderTerm::FieldDir(name, dir) => Ok(vec![named_field(name, *dir)?]),
        OrderTerm::Clause(text) => parse_clause(text),
        OrderTerm::Expr(order_by) => resolve_expr(order_by),
    }
}

fn named_field(name: &str, direction: OrderDir) -> Result<OrderField> {
    let name = parse_identifier(name)
        .ok_or_else(|| PageError::InvalidOrder(format!("not a plain field reference: {name:?}")))?;

    Ok(OrderField {
        name: name.to_string(),
        direction,
    })
}

fn resolve_expr(order_by: &OrderByExpr) -> Result<Vec<OrderField>> {
    let direction = order_by.direction.unwrap_or(OrderDir::Asc);

    match &order_by.expr {
        Expr::Identifier(ident) => Ok(vec![OrderField {
            name: ident.name.clone(),
            direction,
        }]),
        Expr::FunctionCall(call) => Err(PageError::InvalidOrder(format!(
            "cannot order by function call {}(...)",
            call.name
        ))),
        other => Err(PageError::InvalidOrder(format!(
            "cannot order by computed expression: {other:?}"
        ))),
    }
}

/// Parses `identifier [asc|desc]` clauses, comma-separated, case-insensitive.
fn parse_clause(text: &str) -> Result<Vec<OrderField>> {
    let mut fields = Vec::new();

    for part in text.split(',') {
        let part = part.trim();
        if part.is_empty() {
            return Err(PageError::InvalidOrder(format!(
                "empty element in order clause {text:?}"
            )));
        }

        let mut tokens = part.split_whitespace();
        let name = tokens.next().and_then(parse_identifier).ok_or_else(|| {
            PageError::InvalidOrder(format!("unparseable order clause element: {part:?}"))
        })?;

        let direction = match tokens.next() {
            None => OrderDir::Asc,
            Some(dir) if dir.eq_ignore_ascii_case("asc") => OrderDir::Asc,
            Some(dir) if dir.eq_ignore_ascii_case("desc") => OrderDir::Desc,
            Some(dir) => {
                return Err(PageError::InvalidOrder(format!(
                    "unknown order direction {dir:?} in {part:?}"
                )));
            }
        };

        if tokens.next().is_some() {
            return Err(PageError::InvalidOrder(format!(
                "trailing tokens in order clause element: {part:?}"
            )));
        }

        fields.push(OrderField {
            name: name.to_string(),
            direction,
        });
    }

    Ok(fields)
}

/// Accepts `name` or `qualifier.name` where both sides are plain
/// identifiers, and returns the unqualified field name.
fn parse_identifier(raw: &str) -> Option<&str> {
    let name = match raw.split_once('.') {
        Some((qualifier, name)) if is_identifier(qualifier) => name,
        Some(_) => return None,
        None => raw,
    };

    is_identifier(name).then_some(name)
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::{Direction, OrderSpec, OrderTerm};
    use crate::error::PageError;
    use query_builder::{
        ast::{
            common::OrderDir,
            expr::{Expr, FunctionCall},
            order::OrderByExpr,
        },
        ident,
    };

    fn names(spec: &OrderSpec) -> Vec<&str> {
        spec.field_names().collect()
    }

    #[test]
    fn empty_input_defaults_to_identifier_ascending() {
        let spec = OrderSpec::normalize(&[], "id").unwrap();

        assert_eq!(names(&spec), vec!["id"]);
        assert_eq!(spec.fields()[0].direction, OrderDir::Asc);
    }

    #[test]
    fn appends_identifier_when_missing() {
        let spec = OrderSpec::normalize(
            &[OrderTerm::FieldDir("display_index".to_string(), OrderDir::Desc)],
            "id",
        )
        .unwrap();

        assert_eq!(names(&spec), vec!["display_index", "id"]);
        assert_eq!(spec.fields()[0].direction, OrderDir::Desc);
        assert_eq!(spec.fields()[1].direction, OrderDir::Asc);
    }

    #[test]
    fn parses_free_text_clauses_case_insensitively() {
        let spec = OrderSpec::normalize(
            &[OrderTerm::Clause("created_at DESC, name Asc".to_string())],
            "id",
        )
        .unwrap();

        assert_eq!(names(&spec), vec!["created_at", "name", "id"]);
        assert_eq!(spec.fields()[0].direction, OrderDir::Desc);
        assert_eq!(spec.fields()[1].direction, OrderDir::Asc);
    }

    #[test]
    fn accepts_qualified_identifiers() {
        let spec =
            OrderSpec::normalize(&[OrderTerm::Clause("users.created_at desc".to_string())], "id")
                .unwrap();

        assert_eq!(names(&spec), vec!["created_at", "id"]);
    }

    #[test]
    fn rejects_function_call_expressions() {
        let terms = [OrderTerm::Expr(OrderByExpr::new(
            Expr::FunctionCall(FunctionCall {
                name: "abs".to_string(),
                args: vec![ident!("display_index")],
            }),
            None,
        ))];

        let err = OrderSpec::normalize(&terms, "id").unwrap_err();
        assert!(matches!(err, PageError::InvalidOrder(_)), "{err}");
    }

    #[test]
    fn rejects_free_text_that_is_not_identifier_direction() {
        for clause in ["abs(display_index)", "name asc extra", "name sideways", ""] {
            let terms = [OrderTerm::Clause(clause.to_string())];
            let err = OrderSpec::normalize(&terms, "id").unwrap_err();
            assert!(matches!(err, PageError::InvalidOrder(_)), "{clause:?}");
        }
    }

    #[test]
    fn structured_identifier_defaults_to_ascending() {
        let terms = [OrderTerm::Expr(OrderByExpr::new(ident!("name"), None))];
        let spec = OrderSpec::normalize(&terms, "id").unwrap();

        assert_eq!(names(&spec), vec!["name", "id"]);
        assert_eq!(spec.fields()[0].direction, OrderDir::Asc);
    }

    #[test]
    fn drops_terms_after_the_identifier_field() {
        let spec = OrderSpec::normalize(
            &[OrderTerm::Clause("id desc, name asc".to_string())],
            "id",
        )
        .unwrap();

        // The identifier is unique, so nothing after it can affect order.
        assert_eq!(names(&spec), vec!["id"]);
        assert_eq!(spec.fields()[0].direction, OrderDir::Desc);
    }

    #[test]
    fn drops_duplicate_fields_keeping_the_first() {
        let spec = OrderSpec::normalize(
            &[
                OrderTerm::FieldDir("name".to_string(), OrderDir::Desc),
                OrderTerm::Field("name".to_string()),
            ],
            "id",
        )
        .unwrap();

        assert_eq!(names(&spec), vec!["name", "id"]);
        assert_eq!(spec.fields()[0].direction, OrderDir::Desc);
    }

    #[test]
    fn backward_traversal_flips_every_field() {
        assert_eq!(
            Direction::Backward.effective(OrderDir::Asc),
            OrderDir::Desc
        );
        assert_eq!(
            Direction::Backward.effective(OrderDir::Desc),
            OrderDir::Asc
        );
        assert_eq!(Direction::Forward.effective(OrderDir::Desc), OrderDir::Desc);
    }
}
