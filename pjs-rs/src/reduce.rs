//! `reduce`: collapse a sequence into one value.
//!
//! Six reserved keywords select a built-in aggregate.  Any other expression
//! drives a left fold seeded with the first element, evaluated once per
//! remaining element with `prev`, `curr`, `i` and `array` bound.
//!
//! | Keyword  | Result |
//! |----------|--------|
//! | `length` | number of elements |
//! | `sum`    | `prev + curr` folded over the input |
//! | `min`    | `prev < curr ? prev : curr` folded over the input |
//! | `max`    | `prev > curr ? prev : curr` folded over the input |
//! | `avg`    | `sum / length` |
//! | `concat` | every element's display form, joined with no separator |
//!
//! `length` of an empty input is `0` and `concat` of one is `""`; every
//! other aggregate and the generic fold fail with
//! [`Error::EmptyInput`].

use std::cmp::Ordering;

use crate::error::{Error, Result};
use crate::expr::{Expression, Scope, Value};

/// A built-in aggregate selected by a reserved `reduce` keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregate {
    Length,
    Sum,
    Min,
    Max,
    Avg,
    Concat,
}

impl Aggregate {
    pub const ALL: [Aggregate; 6] = [
        Aggregate::Length,
        Aggregate::Sum,
        Aggregate::Min,
        Aggregate::Max,
        Aggregate::Avg,
        Aggregate::Concat,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            Aggregate::Length => "length",
            Aggregate::Sum => "sum",
            Aggregate::Min => "min",
            Aggregate::Max => "max",
            Aggregate::Avg => "avg",
            Aggregate::Concat => "concat",
        }
    }

    /// Exact, case-sensitive keyword match.  Callers trim first.
    pub fn from_keyword(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.keyword() == s)
    }

    pub fn apply(self, values: &[Value]) -> Result<Value> {
        match self {
            Aggregate::Length => Ok(Value::from(values.len())),
            Aggregate::Sum => sum(values),
            Aggregate::Min => pick(values, Ordering::Less),
            Aggregate::Max => pick(values, Ordering::Greater),
            Aggregate::Avg => sum(values)?.div(&Value::from(values.len())),
            Aggregate::Concat => Ok(Value::Str(values.iter().map(Value::to_string).collect())),
        }
    }
}

/// Reduce `elements` with a keyword aggregate or a fold expression.
///
/// Keywords take precedence: `"sum"` is always the aggregate, never a
/// lookup of an identifier named `sum`.
pub fn reduce<T>(elements: &[T], expression: &str) -> Result<Value>
where
    T: Clone + Into<Value>,
{
    let values: Vec<Value> = elements.iter().cloned().map(Into::into).collect();
    match Aggregate::from_keyword(expression.trim()) {
        Some(aggregate) => aggregate.apply(&values),
        None => fold(&values, &Expression::parse(expression)?),
    }
}

/// Left fold seeded with `values[0]`.
///
/// For each later index `i` the expression sees `prev` (the accumulator),
/// `curr` (`values[i]`), `i`, and `array` (all of `values`); its result
/// becomes the new accumulator.  A single element is returned unevaluated.
pub fn fold(values: &[Value], expr: &Expression) -> Result<Value> {
    let (first, rest) = values.split_first().ok_or(Error::EmptyInput)?;
    let array = Value::Array(values.to_vec());
    let mut acc = first.clone();
    for (offset, curr) in rest.iter().enumerate() {
        let i = offset + 1;
        let next = expr
            .eval(&Scope::for_fold(&acc, curr, i, &array))
            .map_err(|e| e.at(i))?;
        acc = next;
    }
    Ok(acc)
}

fn sum(values: &[Value]) -> Result<Value> {
    let (first, rest) = values.split_first().ok_or(Error::EmptyInput)?;
    let mut acc = first.clone();
    for (offset, curr) in rest.iter().enumerate() {
        acc = acc.add(curr).map_err(|e| e.at(offset + 1))?;
    }
    Ok(acc)
}

/// Keep `prev` while it compares as `keep` against `curr`, else take `curr`.
fn pick(values: &[Value], keep: Ordering) -> Result<Value> {
    let (first, rest) = values.split_first().ok_or(Error::EmptyInput)?;
    let mut acc = first;
    for (offset, curr) in rest.iter().enumerate() {
        let ord = acc.compare(curr).map_err(|e| e.at(offset + 1))?;
        if ord != Some(keep) {
            acc = curr;
        }
    }
    Ok(acc.clone())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
