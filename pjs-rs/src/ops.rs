//! `filter` and `map`: evaluate an expression once per element.
//!
//! The expression is parsed once up front; a syntax error is reported before
//! any element is touched.  A failure on any element aborts the whole call
//! and is reported with that element's index.  Inputs are never modified;
//! results are always newly built.

use crate::error::Result;
use crate::expr::{Expression, Scope, Value};

/// Keep the elements for which `expression` is truthy, in input order.
pub fn filter<T>(elements: &[T], expression: &str, explicit: bool) -> Result<Vec<T>>
where
    T: Clone + Into<Value>,
{
    let expr = Expression::parse(expression)?;
    let mut kept = Vec::new();
    for (index, element) in elements.iter().enumerate() {
        let value: Value = element.clone().into();
        let scope = Scope::build(&value, explicit);
        if expr.eval(&scope).map_err(|e| e.at(index))?.is_truthy() {
            kept.push(element.clone());
        }
    }
    Ok(kept)
}

/// Replace every element with the value of `expression` evaluated on it.
///
/// The result has the same length and order as the input.
pub fn map<T>(elements: &[T], expression: &str, explicit: bool) -> Result<Vec<Value>>
where
    T: Clone + Into<Value>,
{
    let expr = Expression::parse(expression)?;
    elements
        .iter()
        .enumerate()
        .map(|(index, element)| {
            let value: Value = element.clone().into();
            expr.eval(&Scope::build(&value, explicit))
                .map_err(|e| e.at(index))
        })
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
