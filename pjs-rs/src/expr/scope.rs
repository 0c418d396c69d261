//! Name-resolution scope for one evaluation.
//!
//! A [`Scope`] is built fresh for every element (or fold step) and dropped
//! afterwards; nothing carries over between evaluations.  `$` always
//! resolves to the current element and no other binding can shadow it.
//!
//! In implicit mode the element's members are exposed as bare names, so
//! `length === 3` reads `$.length` and `toUpperCase()` calls
//! `$.toUpperCase()`.  Explicit mode binds `$` alone.

use std::borrow::Cow;
use std::collections::HashMap;

use super::members::{members_of, Member, MemberKind};
use super::value::Value;
use crate::error::{Error, Result};

/// One named entry in a [`Scope`].
#[derive(Debug, Clone)]
pub(crate) enum Binding<'a> {
    /// A plain value.
    Value(Cow<'a, Value>),
    /// A method bound to the scope's element.
    Method(&'static Member),
}

/// Identifier bindings visible to a single evaluation.
#[derive(Debug, Clone)]
pub struct Scope<'a> {
    element: Cow<'a, Value>,
    bindings: HashMap<&'static str, Binding<'a>>,
}

impl<'a> Scope<'a> {
    /// Scope for filter/map: `$` plus, unless `explicit`, every member of
    /// the element's type.
    ///
    /// Building never fails.  A member property that cannot be computed for
    /// this element is simply left unbound.
    pub fn build(element: &'a Value, explicit: bool) -> Self {
        if explicit {
            Self::explicit(element)
        } else {
            Self::implicit(element)
        }
    }

    /// Only `$` is bound.
    pub fn explicit(element: &'a Value) -> Self {
        Scope {
            element: Cow::Borrowed(element),
            bindings: HashMap::new(),
        }
    }

    /// `$` plus the element's members as bare names.
    pub fn implicit(element: &'a Value) -> Self {
        let table = members_of(element);
        let mut bindings = HashMap::with_capacity(table.len());
        for member in table {
            let binding = match member.kind {
                MemberKind::Property(read) => match read(element) {
                    Ok(v) => Binding::Value(Cow::Owned(v)),
                    Err(_) => continue,
                },
                MemberKind::Method(_) => Binding::Method(member),
            };
            bindings.insert(member.name, binding);
        }
        Scope {
            element: Cow::Borrowed(element),
            bindings,
        }
    }

    /// Scope for one step of a generic `reduce` fold.
    ///
    /// Binds `prev` (the accumulator), `curr` (the element at `i`), `i`, and
    /// `array` (the whole input).  `$` is bound to `curr`.
    pub fn for_fold(prev: &'a Value, curr: &'a Value, i: usize, array: &'a Value) -> Self {
        let mut bindings = HashMap::with_capacity(4);
        bindings.insert("prev", Binding::Value(Cow::Borrowed(prev)));
        bindings.insert("curr", Binding::Value(Cow::Borrowed(curr)));
        bindings.insert("i", Binding::Value(Cow::Owned(Value::from(i))));
        bindings.insert("array", Binding::Value(Cow::Borrowed(array)));
        Scope {
            element: Cow::Borrowed(curr),
            bindings,
        }
    }

    /// The value bound to `name`, if it is bound to a plain value.
    pub fn value(&self, name: &str) -> Option<&Value> {
        if name == "$" {
            return Some(&self.element);
        }
        match self.bindings.get(name)? {
            Binding::Value(v) => Some(v.as_ref()),
            Binding::Method(_) => None,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        name == "$" || self.bindings.contains_key(name)
    }

    /// Call the method bound to `name` with `$` as receiver.
    pub fn call_bound(&self, name: &str, args: &[Value]) -> Result<Value> {
        match self.bindings.get(name) {
            Some(Binding::Method(m)) => m.invoke(&self.element, args),
            Some(Binding::Value(_)) => Err(Error::Type(format!("{name} is not a function"))),
            None if name == "$" => Err(Error::Type("$ is not a function".to_owned())),
            None => Err(Error::Reference(name.to_owned())),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
