//! Tree-walking evaluator.
//!
//! Evaluation is a pure function of `(Expr, Scope)`: it reads bindings,
//! never writes them, and keeps no state between calls.

use std::borrow::Cow;
use std::cmp::Ordering;

use super::members::lookup;
use super::parse::{BinOp, Expr, Expression, LogicOp, UnaryOp};
use super::scope::Scope;
use super::value::Value;
use crate::error::{Error, Result};

impl Expression {
    /// Evaluate against `scope`.
    pub fn eval(&self, scope: &Scope<'_>) -> Result<Value> {
        eval_expr(self.root(), scope)
    }
}

/// Convenience: parse and evaluate an expression string.
pub fn evaluate(src: &str, scope: &Scope<'_>) -> Result<Value> {
    Expression::parse(src)?.eval(scope)
}

/// Evaluate an [`Expr`] AST node against the given scope.
pub fn eval_expr(expr: &Expr, scope: &Scope<'_>) -> Result<Value> {
    match expr {
        Expr::Literal(v) => Ok(v.clone()),

        Expr::Ident(name) => resolve(name, scope).cloned(),

        Expr::Unary(op, inner) => {
            let v = eval_expr(inner, scope)?;
            match op {
                UnaryOp::Neg => v.neg(),
                UnaryOp::Not => Ok(Value::Bool(!v.is_truthy())),
            }
        }

        Expr::Binary(op, lhs, rhs) => {
            let l = eval_operand(lhs, scope)?;
            let r = eval_operand(rhs, scope)?;
            eval_binop(*op, &l, &r)
        }

        // Yields the deciding operand, not a coerced boolean.
        Expr::Logical(op, lhs, rhs) => {
            let l = eval_expr(lhs, scope)?;
            match (op, l.is_truthy()) {
                (LogicOp::And, true) | (LogicOp::Or, false) => eval_expr(rhs, scope),
                _ => Ok(l),
            }
        }

        Expr::Ternary(cond, then, else_) => {
            if eval_expr(cond, scope)?.is_truthy() {
                eval_expr(then, scope)
            } else {
                eval_expr(else_, scope)
            }
        }

        Expr::Call(name, arg_exprs) => {
            let args = eval_args(arg_exprs, scope)?;
            scope.call_bound(name, &args)
        }

        Expr::Member(object, name) => {
            let obj = eval_operand(object, scope)?;
            match lookup(&obj, name) {
                Some(member) => member.read(&obj),
                None => Err(Error::Type(format!(
                    "{} has no property '{name}'",
                    obj.type_name()
                ))),
            }
        }

        Expr::MethodCall(object, name, arg_exprs) => {
            let obj = eval_operand(object, scope)?;
            let member = lookup(&obj, name).ok_or_else(|| {
                Error::Type(format!("{}.{name} is not a function", obj.type_name()))
            })?;
            let args = eval_args(arg_exprs, scope)?;
            member.invoke(&obj, &args)
        }

        Expr::Index(object, index) => {
            let obj = eval_operand(object, scope)?;
            let idx = eval_expr(index, scope)?;
            eval_index(&obj, &idx)
        }
    }
}

/// Resolve a bare identifier to the value it is bound to.
fn resolve<'s>(name: &str, scope: &'s Scope<'_>) -> Result<&'s Value> {
    match scope.value(name) {
        Some(v) => Ok(v),
        None if scope.contains(name) => Err(Error::Type(format!(
            "{name} is a method of the current element; call it as {name}()"
        ))),
        None => Err(Error::Reference(name.to_owned())),
    }
}

/// Like [`eval_expr`], but identifiers are borrowed from the scope instead
/// of cloned.  Keeps `array[i]` and `array.length` cheap inside a fold.
fn eval_operand<'s>(expr: &Expr, scope: &'s Scope<'_>) -> Result<Cow<'s, Value>> {
    match expr {
        Expr::Ident(name) => resolve(name, scope).map(Cow::Borrowed),
        other => eval_expr(other, scope).map(Cow::Owned),
    }
}

fn eval_args(arg_exprs: &[Expr], scope: &Scope<'_>) -> Result<Vec<Value>> {
    arg_exprs.iter().map(|e| eval_expr(e, scope)).collect()
}

fn eval_binop(op: BinOp, l: &Value, r: &Value) -> Result<Value> {
    let ordered = |accept: fn(Ordering) -> bool| -> Result<Value> {
        Ok(Value::Bool(l.compare(r)?.is_some_and(accept)))
    };
    match op {
        BinOp::Add => l.add(r),
        BinOp::Sub => l.sub(r),
        BinOp::Mul => l.mul(r),
        BinOp::Div => l.div(r),
        BinOp::Rem => l.rem(r),

        BinOp::StrictEq => Ok(Value::Bool(l.strict_eq(r))),
        BinOp::StrictNe => Ok(Value::Bool(!l.strict_eq(r))),
        BinOp::Eq => Ok(Value::Bool(l.loose_eq(r))),
        BinOp::Ne => Ok(Value::Bool(!l.loose_eq(r))),

        BinOp::Lt => ordered(Ordering::is_lt),
        BinOp::Le => ordered(Ordering::is_le),
        BinOp::Gt => ordered(Ordering::is_gt),
        BinOp::Ge => ordered(Ordering::is_ge),
    }
}

fn eval_index(obj: &Value, idx: &Value) -> Result<Value> {
    let x = idx.as_num().ok_or_else(|| {
        Error::Type(format!("index must be a number, not {}", idx.type_name()))
    })?;
    if x.fract() != 0.0 || x < 0.0 || !x.is_finite() {
        return Err(Error::Range(format!("invalid index {idx}")));
    }
    let i = x as usize;
    match obj {
        Value::Array(items) => items.get(i).cloned().ok_or_else(|| {
            Error::Range(format!("index {i} out of bounds for array of length {}", items.len()))
        }),
        Value::Str(s) => s
            .chars()
            .nth(i)
            .map(|c| Value::Str(c.to_string()))
            .ok_or_else(|| {
                Error::Range(format!(
                    "index {i} out of bounds for string of length {}",
                    s.chars().count()
                ))
            }),
        other => Err(Error::Type(format!("cannot index {}", other.type_name()))),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
