//! In-memory predicate evaluation against a single row.
//!
//! Used by vector-backed sources and tests; real stores translate the AST
//! into their own filter representation instead.

use crate::ast::expr::{BinaryOperator, Expr};
use model::{core::value::Value, records::row::RowData};
use std::cmp::Ordering;
use tracing::warn;

/// Evaluates an expression against a row.
///
/// Comparisons follow SQL three-valued logic: comparing against an
/// incomparable pair (including NULL) yields `None`, which `matches`
/// treats as false.
pub fn eval_expr(expr: &Expr, row: &RowData) -> Option<Value> {
    match expr {
        Expr::Identifier(ident) => Some(row.get_value(&ident.name)),
        Expr::Value(value) => Some(value.clone()),
        Expr::BinaryOp(op) => eval_binary(&op.left, op.op, &op.right, row),
        Expr::FunctionCall(call) => {
            warn!(function = %call.name, "function calls are not evaluable in-memory");
            None
        }
        Expr::IsNull { expr, negated } => {
            let value = eval_expr(expr, row)?;
            Some(Value::Boolean(value.is_null() != *negated))
        }
    }
}

/// True when the expression evaluates to boolean true for the row.
pub fn matches(expr: &Expr, row: &RowData) -> bool {
    matches!(eval_expr(expr, row), Some(Value::Boolean(true)))
}

fn eval_binary(left: &Expr, op: BinaryOperator, right: &Expr, row: &RowData) -> Option<Value> {
    match op {
        BinaryOperator::And => {
            // Short-circuit on a false left side.
            match eval_bool(left, row)? {
                false => Some(Value::Boolean(false)),
                true => Some(Value::Boolean(eval_bool(right, row)?)),
            }
        }
        BinaryOperator::Or => match eval_bool(left, row)? {
            true => Some(Value::Boolean(true)),
            false => Some(Value::Boolean(eval_bool(right, row)?)),
        },
        _ => {
            let l = eval_expr(left, row)?;
            let r = eval_expr(right, row)?;
            let ord = l.compare(&r)?;

            let result = match op {
                BinaryOperator::Eq => ord == Ordering::Equal,
                BinaryOperator::NotEq => ord != Ordering::Equal,
                BinaryOperator::Lt => ord == Ordering::Less,
                BinaryOperator::LtEq => ord != Ordering::Greater,
                BinaryOperator::Gt => ord == Ordering::Greater,
                BinaryOperator::GtEq => ord != Ordering::Less,
                BinaryOperator::And | BinaryOperator::Or => unreachable!(),
            };

            Some(Value::Boolean(result))
        }
    }
}

fn eval_bool(expr: &Expr, row: &RowData) -> Option<bool> {
    match eval_expr(expr, row)? {
        Value::Boolean(b) => Some(b),
        other => {
            warn!(value = %other, "logical operand did not evaluate to a boolean");
            None
        }
    }
}
