//! Expression language: values, parsing, member tables, scopes and
//! evaluation.
//!
//! An expression is parsed once into an [`Expression`] and evaluated against
//! a fresh [`Scope`] per element:
//!
//! ```rust
//! use pjs::expr::{Expression, Scope, Value};
//!
//! let expr = Expression::parse("length === 3").unwrap();
//! let line = Value::from("foo");
//! assert_eq!(expr.eval(&Scope::build(&line, false)).unwrap(), Value::Bool(true));
//! ```

pub mod eval;
pub mod members;
pub mod parse;
pub mod scope;
pub mod value;

// Re-exports for convenience.
pub use eval::evaluate;
pub use parse::Expression;
pub use scope::Scope;
pub use value::Value;
