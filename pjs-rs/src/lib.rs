//! pjs — filter, map and reduce lines with short expressions.
//!
//! The expression fragment names the current line implicitly: in the
//! default mode every string member is a bare name (`length`,
//! `toUpperCase()`), and `$` always refers to the line itself.
//!
//! ```rust
//! let lines = ["a", "b", "foo", "bar"];
//! assert_eq!(pjs::filter(&lines, "length === 3", false).unwrap(), ["foo", "bar"]);
//! assert_eq!(pjs::reduce(&[1, 2, 3], "sum").unwrap(), pjs::Value::from(6));
//! ```

pub mod cli;
pub mod error;
pub mod expr;
pub mod ops;
pub mod pipeline;
pub mod reduce;

pub use error::{Error, ErrorKind, Result};
pub use expr::Value;
pub use ops::{filter, map};
pub use reduce::{reduce, Aggregate};
