//! Failure taxonomy for parsing and evaluating expressions.

use thiserror::Error;

/// Convenience alias used throughout the library.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// An expression failed to parse or evaluate.
///
/// Every failure is deterministic for a given (expression, element) pair;
/// nothing here is transient or worth retrying.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The expression text does not match the grammar.
    #[error("SyntaxError: {0}")]
    Syntax(String),

    /// An identifier is not bound in the current scope.
    #[error("ReferenceError: {0} is not defined")]
    Reference(String),

    /// An operator, call, or member was applied to an unsupported type.
    #[error("TypeError: {0}")]
    Type(String),

    /// An index lies outside its array or string.
    #[error("RangeError: {0}")]
    Range(String),

    /// `reduce` needs at least one element for this expression.
    #[error("reduce of empty input with no initial value")]
    EmptyInput,

    /// Evaluation failed on one element of the input.
    #[error("element {index}: {error}")]
    Element { index: usize, error: Box<Error> },
}

/// The category of an [`Error`], ignoring where it happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Syntax,
    Reference,
    Type,
    Range,
    EmptyInput,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Syntax(_) => ErrorKind::Syntax,
            Error::Reference(_) => ErrorKind::Reference,
            Error::Type(_) => ErrorKind::Type,
            Error::Range(_) => ErrorKind::Range,
            Error::EmptyInput => ErrorKind::EmptyInput,
            Error::Element { error, .. } => error.kind(),
        }
    }

    /// Attach the index of the element being evaluated.
    pub(crate) fn at(self, index: usize) -> Error {
        match self {
            e @ Error::Element { .. } => e,
            e => Error::Element {
                index,
                error: Box::new(e),
            },
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_sees_through_element_wrapper() {
        let e = Error::Reference("foo".into()).at(3);
        assert_eq!(e.kind(), ErrorKind::Reference);
        assert_eq!(e.to_string(), "element 3: ReferenceError: foo is not defined");
    }

    #[test]
    fn at_does_not_nest() {
        let e = Error::Type("x".into()).at(1).at(2);
        assert!(matches!(e, Error::Element { index: 1, .. }));
    }
}
