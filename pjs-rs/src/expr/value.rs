//! Runtime value type for pjs expressions.
//!
//! Values are dynamically typed.  Lines enter as strings, `reduce` inputs are
//! usually numbers, and expressions may produce booleans, arrays (from
//! `split`, `match`, or the fold's `array` binding) or `null`.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;

use serde::ser::{Serialize, SerializeSeq, Serializer};

use crate::error::{Error, Result};

/// A pjs runtime value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Num(f64),
    Str(String),
    Array(Vec<Value>),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Num(x) => fmt_number(*x, f),
            Value::Str(s) => f.write_str(s),
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    // Nested nulls print as empty, the way a joined list does.
                    if !matches!(item, Value::Null) {
                        write!(f, "{item}")?;
                    }
                }
                Ok(())
            }
        }
    }
}

/// Integral numbers print without a fractional part (`2`, not `2.0`).
/// Magnitudes below 1e-6 or from 1e21 up use exponent form (`1e-7`,
/// `1.5e+21`).
fn fmt_number(x: f64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if x.is_nan() {
        f.write_str("NaN")
    } else if x.is_infinite() {
        f.write_str(if x > 0.0 { "Infinity" } else { "-Infinity" })
    } else if x == 0.0 {
        // -0 prints as 0.
        f.write_str("0")
    } else if x.abs() < 1e-6 || x.abs() >= 1e21 {
        let sci = format!("{x:e}");
        match sci.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => write!(f, "{mantissa}e+{exp}"),
            _ => f.write_str(&sci),
        }
    } else {
        write!(f, "{x}")
    }
}

impl Value {
    /// Truthiness: `null`, `false`, `0`, `NaN` and `""` are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Num(x) => *x != 0.0 && !x.is_nan(),
            Value::Str(s) => !s.is_empty(),
            Value::Array(_) => true,
        }
    }

    /// Name of the type, used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Num(_) => "number",
            Value::Str(_) => "string",
            Value::Array(_) => "array",
        }
    }

    pub fn as_num(&self) -> Option<f64> {
        match self {
            Value::Num(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Convert a string that reads as a finite number into [`Value::Num`].
    ///
    /// Anything else is returned unchanged.  Used before `reduce` so numeric
    /// input lines aggregate as numbers.
    pub fn numify(self) -> Value {
        if let Value::Str(s) = &self {
            if let Some(x) = parse_numeric(s) {
                return Value::Num(x);
            }
        }
        self
    }

    /// Display form, borrowed when the value is already a string.
    fn display_str(&self) -> Cow<'_, str> {
        match self {
            Value::Str(s) => Cow::Borrowed(s),
            other => Cow::Owned(other.to_string()),
        }
    }

    // ── Arithmetic helpers ────────────────────────────────────────────────────

    fn numeric_operands(&self, rhs: &Value, op: &str) -> Result<(f64, f64)> {
        match (self, rhs) {
            (Value::Num(a), Value::Num(b)) => Ok((*a, *b)),
            _ => Err(Error::Type(format!(
                "cannot apply '{op}' to {} and {}",
                self.type_name(),
                rhs.type_name()
            ))),
        }
    }

    /// `+`: numeric addition, or concatenation when either side is a string.
    pub fn add(&self, rhs: &Value) -> Result<Value> {
        match (self, rhs) {
            (Value::Num(a), Value::Num(b)) => Ok(Value::Num(a + b)),
            (Value::Str(_), _) | (_, Value::Str(_)) => {
                let (l, r) = (self.display_str(), rhs.display_str());
                let len = check_string_len(l.len().checked_add(r.len()), "+")?;
                let mut out = String::with_capacity(len);
                out.push_str(&l);
                out.push_str(&r);
                Ok(Value::Str(out))
            }
            _ => Err(Error::Type(format!(
                "cannot apply '+' to {} and {}",
                self.type_name(),
                rhs.type_name()
            ))),
        }
    }

    pub fn sub(&self, rhs: &Value) -> Result<Value> {
        let (a, b) = self.numeric_operands(rhs, "-")?;
        Ok(Value::Num(a - b))
    }

    pub fn mul(&self, rhs: &Value) -> Result<Value> {
        let (a, b) = self.numeric_operands(rhs, "*")?;
        Ok(Value::Num(a * b))
    }

    /// IEEE division: `1 / 0` is `Infinity`, `0 / 0` is `NaN`.
    pub fn div(&self, rhs: &Value) -> Result<Value> {
        let (a, b) = self.numeric_operands(rhs, "/")?;
        Ok(Value::Num(a / b))
    }

    pub fn rem(&self, rhs: &Value) -> Result<Value> {
        let (a, b) = self.numeric_operands(rhs, "%")?;
        Ok(Value::Num(a % b))
    }

    pub fn neg(&self) -> Result<Value> {
        match self {
            Value::Num(x) => Ok(Value::Num(-x)),
            other => Err(Error::Type(format!(
                "cannot negate {}",
                other.type_name()
            ))),
        }
    }

    // ── Comparison ───────────────────────────────────────────────────────────

    /// `===`: same variant and equal payload.  `NaN` never equals itself.
    pub fn strict_eq(&self, rhs: &Value) -> bool {
        self == rhs
    }

    /// `==`: strict equality, except that a number and a numeric string
    /// compare by numeric value.
    pub fn loose_eq(&self, rhs: &Value) -> bool {
        match (self, rhs) {
            (Value::Num(a), Value::Str(s)) | (Value::Str(s), Value::Num(a)) => {
                parse_numeric(s).is_some_and(|b| b == *a)
            }
            _ => self.strict_eq(rhs),
        }
    }

    /// Relational ordering for `<`, `<=`, `>`, `>=`.
    ///
    /// Returns `Ok(None)` when the operands are unordered (a `NaN` is
    /// involved), in which case every relational operator yields `false`.
    pub fn compare(&self, rhs: &Value) -> Result<Option<Ordering>> {
        match (self, rhs) {
            (Value::Num(a), Value::Num(b)) => Ok(a.partial_cmp(b)),
            (Value::Str(a), Value::Str(b)) => Ok(Some(a.cmp(b))),
            _ => Err(Error::Type(format!(
                "cannot compare {} with {}",
                self.type_name(),
                rhs.type_name()
            ))),
        }
    }
}

/// Longest string an expression may build, in bytes.
pub const MAX_STRING_LEN: usize = 1 << 30;

/// Vet the length of a string about to be built.  `None` means the length
/// computation overflowed.
pub(crate) fn check_string_len(len: Option<usize>, what: &str) -> Result<usize> {
    match len {
        Some(n) if n <= MAX_STRING_LEN => Ok(n),
        _ => Err(Error::Range(format!("{what}: invalid string length"))),
    }
}

/// Parse a trimmed decimal number; non-finite results are rejected.
pub(crate) fn parse_numeric(s: &str) -> Option<f64> {
    let t = s.trim();
    if t.is_empty() {
        return None;
    }
    // Rust accepts "inf"/"nan" spellings; input lines should not.
    if t.bytes().any(|b| b.is_ascii_alphabetic() && !matches!(b, b'e' | b'E')) {
        return None;
    }
    t.parse::<f64>().ok().filter(|x| x.is_finite())
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Num(x) if !x.is_finite() => serializer.serialize_unit(),
            Value::Num(x) if x.fract() == 0.0 && x.abs() < 9.0e15 => {
                serializer.serialize_i64(*x as i64)
            }
            Value::Num(x) => serializer.serialize_f64(*x),
            Value::Str(s) => serializer.serialize_str(s),
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Num(x)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Num(n as f64)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Num(f64::from(n))
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Num(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_owned())
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::Str(s.clone())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_numbers() {
        assert_eq!(Value::Num(42.0).to_string(), "42");
        assert_eq!(Value::Num(-7.0).to_string(), "-7");
        assert_eq!(Value::Num(3.5).to_string(), "3.5");
        assert_eq!(Value::Num(-0.0).to_string(), "0");
        assert_eq!(Value::Num(f64::NAN).to_string(), "NaN");
        assert_eq!(Value::Num(f64::INFINITY).to_string(), "Infinity");
        assert_eq!(Value::Num(f64::NEG_INFINITY).to_string(), "-Infinity");
    }

    #[test]
    fn display_exponent_form() {
        assert_eq!(Value::Num(1e-7).to_string(), "1e-7");
        assert_eq!(Value::Num(-2.5e-8).to_string(), "-2.5e-8");
        assert_eq!(Value::Num(0.000001).to_string(), "0.000001");
        assert_eq!(Value::Num(1e21).to_string(), "1e+21");
        assert_eq!(Value::Num(1.5e300).to_string(), "1.5e+300");
        assert_eq!(Value::Num(123456789012345680000.0).to_string(), "123456789012345680000");
    }

    #[test]
    fn string_length_limit() {
        assert_eq!(check_string_len(Some(MAX_STRING_LEN), "x"), Ok(MAX_STRING_LEN));
        assert!(matches!(check_string_len(Some(MAX_STRING_LEN + 1), "x"), Err(Error::Range(_))));
        assert!(matches!(check_string_len(None, "x"), Err(Error::Range(_))));
        assert_eq!(Value::from("a").add(&Value::Num(1.0)), Ok(Value::from("a1")));
        assert_eq!(Value::Num(1.0).add(&Value::from("a")), Ok(Value::from("1a")));
    }

    #[test]
    fn display_other() {
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(Value::from("hello").to_string(), "hello");
        let arr = Value::Array(vec![Value::from("a"), Value::Null, Value::Num(1.0)]);
        assert_eq!(arr.to_string(), "a,,1");
    }

    #[test]
    fn truthiness() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(!Value::Num(0.0).is_truthy());
        assert!(!Value::Num(f64::NAN).is_truthy());
        assert!(!Value::from("").is_truthy());
        assert!(Value::from("0").is_truthy());
        assert!(Value::Num(-1.0).is_truthy());
        assert!(Value::Array(vec![]).is_truthy());
    }

    #[test]
    fn arithmetic() {
        let a = Value::Num(10.0);
        let b = Value::Num(4.0);
        assert_eq!(a.add(&b), Ok(Value::Num(14.0)));
        assert_eq!(a.sub(&b), Ok(Value::Num(6.0)));
        assert_eq!(a.mul(&b), Ok(Value::Num(40.0)));
        assert_eq!(a.div(&b), Ok(Value::Num(2.5)));
        assert_eq!(a.rem(&b), Ok(Value::Num(2.0)));
    }

    #[test]
    fn div_by_zero_is_infinite() {
        assert_eq!(Value::Num(1.0).div(&Value::Num(0.0)), Ok(Value::Num(f64::INFINITY)));
    }

    #[test]
    fn add_concatenates_strings() {
        assert_eq!(Value::from("a").add(&Value::Num(1.0)), Ok(Value::from("a1")));
        assert_eq!(Value::Num(1.5).add(&Value::from("x")), Ok(Value::from("1.5x")));
    }

    #[test]
    fn numeric_ops_reject_strings() {
        let err = Value::from("3").mul(&Value::Num(2.0)).unwrap_err();
        assert!(matches!(err, Error::Type(_)));
        assert!(Value::Bool(true).add(&Value::Num(1.0)).is_err());
        assert!(Value::from("x").neg().is_err());
    }

    #[test]
    fn equality() {
        assert!(Value::Num(3.0).strict_eq(&Value::Num(3.0)));
        assert!(!Value::Num(3.0).strict_eq(&Value::from("3")));
        assert!(Value::Num(3.0).loose_eq(&Value::from("3")));
        assert!(!Value::Num(f64::NAN).strict_eq(&Value::Num(f64::NAN)));
    }

    #[test]
    fn compare() {
        assert_eq!(Value::Num(1.0).compare(&Value::Num(2.0)), Ok(Some(Ordering::Less)));
        assert_eq!(Value::from("b").compare(&Value::from("a")), Ok(Some(Ordering::Greater)));
        assert_eq!(Value::Num(f64::NAN).compare(&Value::Num(1.0)), Ok(None));
        assert!(Value::from("1").compare(&Value::Num(1.0)).is_err());
    }

    #[test]
    fn numify() {
        assert_eq!(Value::from(" 42 ").numify(), Value::Num(42.0));
        assert_eq!(Value::from("1e3").numify(), Value::Num(1000.0));
        assert_eq!(Value::from("inf").numify(), Value::from("inf"));
        assert_eq!(Value::from("abc").numify(), Value::from("abc"));
        assert_eq!(Value::from("").numify(), Value::from(""));
    }

    #[test]
    fn serializes_as_json() {
        let v = Value::Array(vec![
            Value::Num(1.0),
            Value::Num(2.5),
            Value::from("x"),
            Value::Bool(false),
            Value::Num(f64::NAN),
        ]);
        assert_eq!(serde_json::to_string(&v).unwrap(), r#"[1,2.5,"x",false,null]"#);
    }

    #[test]
    fn from_impls() {
        assert_eq!(Value::from(3), Value::Num(3.0));
        assert_eq!(Value::from(true), Value::Bool(true));
        assert_eq!(Value::from(vec![1, 2]), Value::Array(vec![Value::Num(1.0), Value::Num(2.0)]));
    }
}
