//! Per-type member tables.
//!
//! Every property and method an expression can reach on a value is listed
//! here explicitly, one static table per value type.  [`scope`](super::scope)
//! uses the tables to expose an element's members as bare names, and the
//! evaluator uses them for `value.member` and `value.method(…)`.
//!
//! Positions and lengths count Unicode scalar values, not bytes.
//!
//! | Type   | Properties | Methods |
//! |--------|------------|---------|
//! | string | `length`   | `charAt` `charCodeAt` `indexOf` `lastIndexOf` `includes` `startsWith` `endsWith` `toUpperCase` `toLowerCase` `trim` `trimStart` `trimEnd` `slice` `substring` `substr` `split` `replace` `replaceAll` `repeat` `padStart` `padEnd` `concat` `at` `match` `search` `test` `toString` |
//! | array  | `length`   | `join` `indexOf` `includes` `slice` `at` `reverse` `concat` `toString` |
//! | number | —          | `toFixed` `toString` |

use regex::Regex;

use super::value::{check_string_len, Value};
use crate::error::{Error, Result};

// ── Table types ───────────────────────────────────────────────────────────────

pub type PropertyFn = fn(&Value) -> Result<Value>;
pub type MethodFn = fn(&Value, &[Value]) -> Result<Value>;

#[derive(Clone, Copy)]
pub enum MemberKind {
    /// Read-only value derived from the receiver.
    Property(PropertyFn),
    /// Callable taking the receiver and the evaluated arguments.
    Method(MethodFn),
}

/// One entry of a type's member table.
#[derive(Clone, Copy)]
pub struct Member {
    pub name: &'static str,
    pub kind: MemberKind,
}

impl std::fmt::Debug for Member {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.kind {
            MemberKind::Property(_) => "property",
            MemberKind::Method(_) => "method",
        };
        write!(f, "Member({} {})", kind, self.name)
    }
}

impl Member {
    /// Call this member as a method on `receiver`.
    pub fn invoke(&self, receiver: &Value, args: &[Value]) -> Result<Value> {
        match self.kind {
            MemberKind::Method(f) => f(receiver, args),
            MemberKind::Property(_) => Err(Error::Type(format!(
                "{}.{} is not a function",
                receiver.type_name(),
                self.name
            ))),
        }
    }

    /// Read this member from `receiver` without calling it.
    ///
    /// Methods read this way are a type error: there are no function values.
    pub fn read(&self, receiver: &Value) -> Result<Value> {
        match self.kind {
            MemberKind::Property(f) => f(receiver),
            MemberKind::Method(_) => Err(Error::Type(format!(
                "{}.{} is a method; call it as {}()",
                receiver.type_name(),
                self.name,
                self.name
            ))),
        }
    }
}

const fn prop(name: &'static str, f: PropertyFn) -> Member {
    Member {
        name,
        kind: MemberKind::Property(f),
    }
}

const fn method(name: &'static str, f: MethodFn) -> Member {
    Member {
        name,
        kind: MemberKind::Method(f),
    }
}

pub static STRING_MEMBERS: &[Member] = &[
    prop("length", str_length),
    method("charAt", str_char_at),
    method("charCodeAt", str_char_code_at),
    method("indexOf", str_index_of),
    method("lastIndexOf", str_last_index_of),
    method("includes", str_includes),
    method("startsWith", str_starts_with),
    method("endsWith", str_ends_with),
    method("toUpperCase", str_to_upper_case),
    method("toLowerCase", str_to_lower_case),
    method("trim", str_trim),
    method("trimStart", str_trim_start),
    method("trimEnd", str_trim_end),
    method("slice", str_slice),
    method("substring", str_substring),
    method("substr", str_substr),
    method("split", str_split),
    method("replace", str_replace),
    method("replaceAll", str_replace_all),
    method("repeat", str_repeat),
    method("padStart", str_pad_start),
    method("padEnd", str_pad_end),
    method("concat", str_concat),
    method("at", str_at),
    method("match", str_match),
    method("search", str_search),
    method("test", str_test),
    method("toString", to_string),
];

pub static ARRAY_MEMBERS: &[Member] = &[
    prop("length", arr_length),
    method("join", arr_join),
    method("indexOf", arr_index_of),
    method("includes", arr_includes),
    method("slice", arr_slice),
    method("at", arr_at),
    method("reverse", arr_reverse),
    method("concat", arr_concat),
    method("toString", to_string),
];

pub static NUMBER_MEMBERS: &[Member] = &[
    method("toFixed", num_to_fixed),
    method("toString", to_string),
];

/// The member table for a value's type.  Booleans and `null` have none.
pub fn members_of(value: &Value) -> &'static [Member] {
    match value {
        Value::Str(_) => STRING_MEMBERS,
        Value::Array(_) => ARRAY_MEMBERS,
        Value::Num(_) => NUMBER_MEMBERS,
        Value::Bool(_) | Value::Null => &[],
    }
}

/// Find `name` in the member table of `value`'s type.
pub fn lookup(value: &Value, name: &str) -> Option<&'static Member> {
    members_of(value).iter().find(|m| m.name == name)
}

// ── Argument helpers ──────────────────────────────────────────────────────────

fn recv_str<'a>(v: &'a Value, name: &str) -> Result<&'a str> {
    v.as_str()
        .ok_or_else(|| Error::Type(format!("{name} called on {}", v.type_name())))
}

fn recv_array<'a>(v: &'a Value, name: &str) -> Result<&'a [Value]> {
    match v {
        Value::Array(items) => Ok(items),
        other => Err(Error::Type(format!("{name} called on {}", other.type_name()))),
    }
}

/// A string argument.  Numbers are accepted in their display form.
fn arg_str(args: &[Value], i: usize, name: &str) -> Result<String> {
    match args.get(i) {
        Some(Value::Str(s)) => Ok(s.clone()),
        Some(v @ Value::Num(_)) => Ok(v.to_string()),
        Some(other) => Err(Error::Type(format!(
            "{name}: argument {} must be a string, not {}",
            i + 1,
            other.type_name()
        ))),
        None => Err(Error::Type(format!("{name}: missing argument {}", i + 1))),
    }
}

fn opt_str(args: &[Value], i: usize, name: &str) -> Result<Option<String>> {
    if args.get(i).is_some() {
        arg_str(args, i, name).map(Some)
    } else {
        Ok(None)
    }
}

/// An integer argument, truncated toward zero.  `NaN` reads as 0.
fn opt_int(args: &[Value], i: usize, name: &str) -> Result<Option<i64>> {
    match args.get(i) {
        None => Ok(None),
        Some(Value::Num(x)) if x.is_nan() => Ok(Some(0)),
        Some(Value::Num(x)) => Ok(Some(x.trunc().clamp(i64::MIN as f64, i64::MAX as f64) as i64)),
        Some(other) => Err(Error::Type(format!(
            "{name}: argument {} must be a number, not {}",
            i + 1,
            other.type_name()
        ))),
    }
}

fn arg_int(args: &[Value], i: usize, name: &str) -> Result<i64> {
    opt_int(args, i, name)?
        .ok_or_else(|| Error::Type(format!("{name}: missing argument {}", i + 1)))
}

fn arg_regex(args: &[Value], i: usize, name: &str) -> Result<Regex> {
    let src = arg_str(args, i, name)?;
    Regex::new(&src).map_err(|e| Error::Syntax(format!("{name}: invalid regular expression: {e}")))
}

/// Resolve a possibly negative position against `len`, clamped to `0..=len`.
fn relative_index(i: i64, len: usize) -> usize {
    if i < 0 {
        (len as i64).saturating_add(i).max(0) as usize
    } else {
        (i as usize).min(len)
    }
}

fn find_chars(hay: &[char], needle: &[char], from: usize) -> Option<usize> {
    if needle.is_empty() {
        return Some(from.min(hay.len()));
    }
    if needle.len() > hay.len() {
        return None;
    }
    (from..=hay.len() - needle.len()).find(|&i| hay[i..i + needle.len()] == *needle)
}

fn rfind_chars(hay: &[char], needle: &[char]) -> Option<usize> {
    if needle.len() > hay.len() {
        return None;
    }
    (0..=hay.len() - needle.len())
        .rev()
        .find(|&i| hay[i..i + needle.len()] == *needle)
}

fn char_index_of_byte(s: &str, byte: usize) -> usize {
    s[..byte].chars().count()
}

fn index_result(i: Option<usize>) -> Value {
    i.map_or(Value::Num(-1.0), Value::from)
}

fn to_string(recv: &Value, _args: &[Value]) -> Result<Value> {
    Ok(Value::Str(recv.to_string()))
}

// ── String members ────────────────────────────────────────────────────────────

fn str_length(recv: &Value) -> Result<Value> {
    Ok(Value::from(recv_str(recv, "length")?.chars().count()))
}

fn str_char_at(recv: &Value, args: &[Value]) -> Result<Value> {
    let s = recv_str(recv, "charAt")?;
    let i = opt_int(args, 0, "charAt")?.unwrap_or(0);
    let c = usize::try_from(i).ok().and_then(|i| s.chars().nth(i));
    Ok(Value::Str(c.map(String::from).unwrap_or_default()))
}

fn str_char_code_at(recv: &Value, args: &[Value]) -> Result<Value> {
    let s = recv_str(recv, "charCodeAt")?;
    let i = opt_int(args, 0, "charCodeAt")?.unwrap_or(0);
    let c = usize::try_from(i).ok().and_then(|i| s.chars().nth(i));
    Ok(Value::Num(c.map_or(f64::NAN, |c| f64::from(u32::from(c)))))
}

fn str_index_of(recv: &Value, args: &[Value]) -> Result<Value> {
    let hay: Vec<char> = recv_str(recv, "indexOf")?.chars().collect();
    let needle: Vec<char> = arg_str(args, 0, "indexOf")?.chars().collect();
    let from = relative_index(opt_int(args, 1, "indexOf")?.unwrap_or(0).max(0), hay.len());
    Ok(index_result(find_chars(&hay, &needle, from)))
}

fn str_last_index_of(recv: &Value, args: &[Value]) -> Result<Value> {
    let hay: Vec<char> = recv_str(recv, "lastIndexOf")?.chars().collect();
    let needle: Vec<char> = arg_str(args, 0, "lastIndexOf")?.chars().collect();
    Ok(index_result(rfind_chars(&hay, &needle)))
}

fn str_includes(recv: &Value, args: &[Value]) -> Result<Value> {
    let s = recv_str(recv, "includes")?;
    Ok(Value::Bool(s.contains(arg_str(args, 0, "includes")?.as_str())))
}

fn str_starts_with(recv: &Value, args: &[Value]) -> Result<Value> {
    let s = recv_str(recv, "startsWith")?;
    Ok(Value::Bool(s.starts_with(arg_str(args, 0, "startsWith")?.as_str())))
}

fn str_ends_with(recv: &Value, args: &[Value]) -> Result<Value> {
    let s = recv_str(recv, "endsWith")?;
    Ok(Value::Bool(s.ends_with(arg_str(args, 0, "endsWith")?.as_str())))
}

fn str_to_upper_case(recv: &Value, _args: &[Value]) -> Result<Value> {
    Ok(Value::Str(recv_str(recv, "toUpperCase")?.to_uppercase()))
}

fn str_to_lower_case(recv: &Value, _args: &[Value]) -> Result<Value> {
    Ok(Value::Str(recv_str(recv, "toLowerCase")?.to_lowercase()))
}

fn str_trim(recv: &Value, _args: &[Value]) -> Result<Value> {
    Ok(Value::from(recv_str(recv, "trim")?.trim()))
}

fn str_trim_start(recv: &Value, _args: &[Value]) -> Result<Value> {
    Ok(Value::from(recv_str(recv, "trimStart")?.trim_start()))
}

fn str_trim_end(recv: &Value, _args: &[Value]) -> Result<Value> {
    Ok(Value::from(recv_str(recv, "trimEnd")?.trim_end()))
}

fn str_slice(recv: &Value, args: &[Value]) -> Result<Value> {
    let chars: Vec<char> = recv_str(recv, "slice")?.chars().collect();
    let len = chars.len();
    let start = relative_index(opt_int(args, 0, "slice")?.unwrap_or(0), len);
    let end = opt_int(args, 1, "slice")?.map_or(len, |e| relative_index(e, len));
    Ok(Value::Str(if start < end {
        chars[start..end].iter().collect()
    } else {
        String::new()
    }))
}

fn str_substring(recv: &Value, args: &[Value]) -> Result<Value> {
    let chars: Vec<char> = recv_str(recv, "substring")?.chars().collect();
    let len = chars.len();
    let clamp = |i: i64| relative_index(i.max(0), len);
    let a = clamp(opt_int(args, 0, "substring")?.unwrap_or(0));
    let b = opt_int(args, 1, "substring")?.map_or(len, clamp);
    let (start, end) = if a <= b { (a, b) } else { (b, a) };
    Ok(Value::Str(chars[start..end].iter().collect()))
}

fn str_substr(recv: &Value, args: &[Value]) -> Result<Value> {
    let chars: Vec<char> = recv_str(recv, "substr")?.chars().collect();
    let len = chars.len();
    let start = relative_index(opt_int(args, 0, "substr")?.unwrap_or(0), len);
    let count = opt_int(args, 1, "substr")?
        .map_or(len - start, |n| n.max(0) as usize)
        .min(len - start);
    Ok(Value::Str(chars[start..start + count].iter().collect()))
}

fn str_split(recv: &Value, args: &[Value]) -> Result<Value> {
    let s = recv_str(recv, "split")?;
    let limit = opt_int(args, 1, "split")?.map(|n| n.max(0) as usize);
    let parts: Vec<Value> = match opt_str(args, 0, "split")? {
        None => vec![Value::from(s)],
        Some(sep) if sep.is_empty() => s.chars().map(|c| Value::Str(c.to_string())).collect(),
        Some(sep) => s.split(sep.as_str()).map(Value::from).collect(),
    };
    Ok(Value::Array(match limit {
        Some(n) => parts.into_iter().take(n).collect(),
        None => parts,
    }))
}

fn str_replace(recv: &Value, args: &[Value]) -> Result<Value> {
    let s = recv_str(recv, "replace")?;
    let from = arg_str(args, 0, "replace")?;
    let to = arg_str(args, 1, "replace")?;
    Ok(Value::Str(s.replacen(from.as_str(), &to, 1)))
}

fn str_replace_all(recv: &Value, args: &[Value]) -> Result<Value> {
    let s = recv_str(recv, "replaceAll")?;
    let from = arg_str(args, 0, "replaceAll")?;
    let to = arg_str(args, 1, "replaceAll")?;
    let hits = if from.is_empty() {
        s.chars().count() + 1
    } else {
        s.matches(from.as_str()).count()
    };
    check_string_len(
        hits.checked_mul(to.len()).and_then(|n| n.checked_add(s.len())),
        "replaceAll",
    )?;
    if from.is_empty() {
        // Insert between every character, and at both ends.
        let mut out = to.clone();
        for c in s.chars() {
            out.push(c);
            out.push_str(&to);
        }
        return Ok(Value::Str(out));
    }
    Ok(Value::Str(s.replace(from.as_str(), &to)))
}

fn str_repeat(recv: &Value, args: &[Value]) -> Result<Value> {
    let s = recv_str(recv, "repeat")?;
    let n = arg_int(args, 0, "repeat")?;
    let n = usize::try_from(n)
        .map_err(|_| Error::Range(format!("repeat: invalid count {n}")))?;
    check_string_len(s.len().checked_mul(n), "repeat")?;
    Ok(Value::Str(s.repeat(n)))
}

fn pad(recv: &Value, args: &[Value], name: &str, at_start: bool) -> Result<Value> {
    let s = recv_str(recv, name)?;
    let width = arg_int(args, 0, name)?.max(0) as usize;
    let fill = opt_str(args, 1, name)?.unwrap_or_else(|| " ".to_owned());
    let cur = s.chars().count();
    if cur >= width || fill.is_empty() {
        return Ok(Value::from(s));
    }
    let fill_char_len = fill.chars().map(char::len_utf8).max().unwrap_or(1);
    check_string_len(
        (width - cur)
            .checked_mul(fill_char_len)
            .and_then(|n| n.checked_add(s.len())),
        name,
    )?;
    let padding: String = fill.chars().cycle().take(width - cur).collect();
    Ok(Value::Str(if at_start {
        padding + s
    } else {
        format!("{s}{padding}")
    }))
}

fn str_pad_start(recv: &Value, args: &[Value]) -> Result<Value> {
    pad(recv, args, "padStart", true)
}

fn str_pad_end(recv: &Value, args: &[Value]) -> Result<Value> {
    pad(recv, args, "padEnd", false)
}

fn str_concat(recv: &Value, args: &[Value]) -> Result<Value> {
    let mut out = recv_str(recv, "concat")?.to_owned();
    for a in args {
        out.push_str(&a.to_string());
    }
    Ok(Value::Str(out))
}

fn str_at(recv: &Value, args: &[Value]) -> Result<Value> {
    let chars: Vec<char> = recv_str(recv, "at")?.chars().collect();
    let i = opt_int(args, 0, "at")?.unwrap_or(0);
    let i = if i < 0 { chars.len() as i64 + i } else { i };
    Ok(usize::try_from(i)
        .ok()
        .and_then(|i| chars.get(i))
        .map_or(Value::Null, |c| Value::Str(c.to_string())))
}

fn str_match(recv: &Value, args: &[Value]) -> Result<Value> {
    let s = recv_str(recv, "match")?;
    let re = arg_regex(args, 0, "match")?;
    Ok(match re.captures(s) {
        Some(caps) => Value::Array(
            caps.iter()
                .map(|m| m.map_or(Value::Null, |m| Value::from(m.as_str())))
                .collect(),
        ),
        None => Value::Null,
    })
}

fn str_search(recv: &Value, args: &[Value]) -> Result<Value> {
    let s = recv_str(recv, "search")?;
    let re = arg_regex(args, 0, "search")?;
    Ok(index_result(re.find(s).map(|m| char_index_of_byte(s, m.start()))))
}

fn str_test(recv: &Value, args: &[Value]) -> Result<Value> {
    let s = recv_str(recv, "test")?;
    Ok(Value::Bool(arg_regex(args, 0, "test")?.is_match(s)))
}

// ── Array members ─────────────────────────────────────────────────────────────

fn arr_length(recv: &Value) -> Result<Value> {
    Ok(Value::from(recv_array(recv, "length")?.len()))
}

fn arr_join(recv: &Value, args: &[Value]) -> Result<Value> {
    let items = recv_array(recv, "join")?;
    let sep = opt_str(args, 0, "join")?.unwrap_or_else(|| ",".to_owned());
    let parts: Vec<String> = items
        .iter()
        .map(|v| match v {
            Value::Null => String::new(),
            v => v.to_string(),
        })
        .collect();
    Ok(Value::Str(parts.join(&sep)))
}

fn arr_index_of(recv: &Value, args: &[Value]) -> Result<Value> {
    let items = recv_array(recv, "indexOf")?;
    let needle = args
        .first()
        .ok_or_else(|| Error::Type("indexOf: missing argument 1".into()))?;
    Ok(index_result(items.iter().position(|v| v.strict_eq(needle))))
}

fn arr_includes(recv: &Value, args: &[Value]) -> Result<Value> {
    let items = recv_array(recv, "includes")?;
    let needle = args
        .first()
        .ok_or_else(|| Error::Type("includes: missing argument 1".into()))?;
    Ok(Value::Bool(items.iter().any(|v| v.strict_eq(needle))))
}

fn arr_slice(recv: &Value, args: &[Value]) -> Result<Value> {
    let items = recv_array(recv, "slice")?;
    let len = items.len();
    let start = relative_index(opt_int(args, 0, "slice")?.unwrap_or(0), len);
    let end = opt_int(args, 1, "slice")?.map_or(len, |e| relative_index(e, len));
    Ok(Value::Array(if start < end {
        items[start..end].to_vec()
    } else {
        Vec::new()
    }))
}

fn arr_at(recv: &Value, args: &[Value]) -> Result<Value> {
    let items = recv_array(recv, "at")?;
    let i = opt_int(args, 0, "at")?.unwrap_or(0);
    let i = if i < 0 { items.len() as i64 + i } else { i };
    Ok(usize::try_from(i)
        .ok()
        .and_then(|i| items.get(i))
        .cloned()
        .unwrap_or(Value::Null))
}

/// Returns a reversed copy; the receiver is never modified.
fn arr_reverse(recv: &Value, _args: &[Value]) -> Result<Value> {
    let items = recv_array(recv, "reverse")?;
    Ok(Value::Array(items.iter().rev().cloned().collect()))
}

fn arr_concat(recv: &Value, args: &[Value]) -> Result<Value> {
    let mut out = recv_array(recv, "concat")?.to_vec();
    for a in args {
        match a {
            Value::Array(more) => out.extend(more.iter().cloned()),
            v => out.push(v.clone()),
        }
    }
    Ok(Value::Array(out))
}

// ── Number members ────────────────────────────────────────────────────────────

fn num_to_fixed(recv: &Value, args: &[Value]) -> Result<Value> {
    let x = recv
        .as_num()
        .ok_or_else(|| Error::Type(format!("toFixed called on {}", recv.type_name())))?;
    let digits = opt_int(args, 0, "toFixed")?.unwrap_or(0);
    if !(0..=100).contains(&digits) {
        return Err(Error::Range(format!("toFixed: digits {digits} out of range 0..100")));
    }
    if !x.is_finite() {
        return Ok(Value::Str(Value::Num(x).to_string()));
    }
    Ok(Value::Str(format!("{:.*}", digits as usize, x)))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn call(recv: impl Into<Value>, name: &str, args: &[Value]) -> Result<Value> {
        let recv = recv.into();
        let m = lookup(&recv, name).unwrap_or_else(|| panic!("no member {name}"));
        m.invoke(&recv, args)
    }

    fn s(v: &str) -> Value {
        Value::from(v)
    }

    fn n(x: f64) -> Value {
        Value::Num(x)
    }

    #[test]
    fn tables_have_unique_names() {
        for table in [STRING_MEMBERS, ARRAY_MEMBERS, NUMBER_MEMBERS] {
            let mut names: Vec<_> = table.iter().map(|m| m.name).collect();
            names.sort_unstable();
            let before = names.len();
            names.dedup();
            assert_eq!(before, names.len());
        }
    }

    #[test]
    fn booleans_and_null_have_no_members() {
        assert!(members_of(&Value::Bool(true)).is_empty());
        assert!(members_of(&Value::Null).is_empty());
    }

    #[test]
    fn length_is_a_property() {
        let m = lookup(&s("héllo"), "length").unwrap();
        assert!(matches!(m.kind, MemberKind::Property(_)));
        assert_eq!(m.read(&s("héllo")), Ok(n(5.0)));
        assert!(m.invoke(&s("x"), &[]).is_err());
    }

    #[test]
    fn reading_a_method_is_a_type_error() {
        let m = lookup(&s("x"), "trim").unwrap();
        assert!(matches!(m.read(&s("x")), Err(Error::Type(_))));
    }

    #[test]
    fn char_access() {
        assert_eq!(call("foo", "charAt", &[n(0.0)]), Ok(s("f")));
        assert_eq!(call("foo", "charAt", &[n(9.0)]), Ok(s("")));
        assert_eq!(call("foo", "charAt", &[]), Ok(s("f")));
        assert_eq!(call("A", "charCodeAt", &[]), Ok(n(65.0)));
        assert_eq!(call("abc", "at", &[n(-1.0)]), Ok(s("c")));
        assert_eq!(call("abc", "at", &[n(5.0)]), Ok(Value::Null));
    }

    #[test]
    fn searching() {
        assert_eq!(call("bar", "indexOf", &[s("b")]), Ok(n(0.0)));
        assert_eq!(call("a", "indexOf", &[s("b")]), Ok(n(-1.0)));
        assert_eq!(call("abab", "indexOf", &[s("b"), n(2.0)]), Ok(n(3.0)));
        assert_eq!(call("ébé", "indexOf", &[s("é"), n(1.0)]), Ok(n(2.0)));
        assert_eq!(call("abab", "lastIndexOf", &[s("ab")]), Ok(n(2.0)));
        assert_eq!(call("abc", "includes", &[s("bc")]), Ok(Value::Bool(true)));
        assert_eq!(call("abc", "startsWith", &[s("ab")]), Ok(Value::Bool(true)));
        assert_eq!(call("abc", "endsWith", &[s("ab")]), Ok(Value::Bool(false)));
        assert_eq!(call("a1", "indexOf", &[n(1.0)]), Ok(n(1.0)));
    }

    #[test]
    fn case_and_trim() {
        assert_eq!(call("Foo", "toUpperCase", &[]), Ok(s("FOO")));
        assert_eq!(call("Foo", "toLowerCase", &[]), Ok(s("foo")));
        assert_eq!(call("  x ", "trim", &[]), Ok(s("x")));
        assert_eq!(call("  x ", "trimStart", &[]), Ok(s("x ")));
        assert_eq!(call("  x ", "trimEnd", &[]), Ok(s("  x")));
    }

    #[test]
    fn substrings() {
        assert_eq!(call("hello", "slice", &[n(1.0), n(3.0)]), Ok(s("el")));
        assert_eq!(call("hello", "slice", &[n(-3.0)]), Ok(s("llo")));
        assert_eq!(call("hello", "slice", &[n(3.0), n(1.0)]), Ok(s("")));
        assert_eq!(call("hello", "substring", &[n(3.0), n(1.0)]), Ok(s("el")));
        assert_eq!(call("hello", "substring", &[n(-2.0)]), Ok(s("hello")));
        assert_eq!(call("hello", "substr", &[n(1.0), n(3.0)]), Ok(s("ell")));
        assert_eq!(call("hello", "substr", &[n(-2.0)]), Ok(s("lo")));
    }

    #[test]
    fn split_variants() {
        assert_eq!(call("a,b,c", "split", &[s(",")]), Ok(Value::from(vec!["a", "b", "c"])));
        assert_eq!(call("abc", "split", &[s("")]), Ok(Value::from(vec!["a", "b", "c"])));
        assert_eq!(call("abc", "split", &[]), Ok(Value::from(vec!["abc"])));
        assert_eq!(call("a b c", "split", &[s(" "), n(2.0)]), Ok(Value::from(vec!["a", "b"])));
    }

    #[test]
    fn replacing() {
        assert_eq!(call("aXbX", "replace", &[s("X"), s("-")]), Ok(s("a-bX")));
        assert_eq!(call("aXbX", "replaceAll", &[s("X"), s("-")]), Ok(s("a-b-")));
        assert_eq!(call("ab", "replaceAll", &[s(""), s("_")]), Ok(s("_a_b_")));
    }

    #[test]
    fn repeat_and_pad() {
        assert_eq!(call("ab", "repeat", &[n(3.0)]), Ok(s("ababab")));
        assert!(matches!(call("ab", "repeat", &[n(-1.0)]), Err(Error::Range(_))));
        assert_eq!(call("7", "padStart", &[n(3.0), s("0")]), Ok(s("007")));
        assert_eq!(call("7", "padEnd", &[n(3.0)]), Ok(s("7  ")));
        assert_eq!(call("1234", "padStart", &[n(2.0)]), Ok(s("1234")));
        assert_eq!(call("ab", "padEnd", &[n(4.0), s("é")]), Ok(s("abéé")));
    }

    #[test]
    fn oversized_strings_are_range_errors() {
        assert!(matches!(call("ab", "repeat", &[n(1e18)]), Err(Error::Range(_))));
        assert!(matches!(call("ab", "repeat", &[n(1e300)]), Err(Error::Range(_))));
        assert!(matches!(call("ab", "padStart", &[n(1e18)]), Err(Error::Range(_))));
        assert!(matches!(call("ab", "padEnd", &[n(1e18), s("xy")]), Err(Error::Range(_))));
        let wide = s(&"x".repeat(1 << 20));
        assert!(matches!(call("aaaa", "replaceAll", &[s("a"), wide.clone()]), Ok(_)));
        assert!(matches!(
            call("a".repeat(2048).as_str(), "replaceAll", &[s("a"), wide]),
            Err(Error::Range(_))
        ));
    }

    #[test]
    fn regex_members() {
        assert_eq!(
            call("key=value", "match", &[s("(\\w+)=(\\w+)")]),
            Ok(Value::from(vec!["key=value", "key", "value"]))
        );
        assert_eq!(call("abc", "match", &[s("\\d")]), Ok(Value::Null));
        assert_eq!(call("héllo1", "search", &[s("\\d")]), Ok(n(5.0)));
        assert_eq!(call("abc", "test", &[s("^a")]), Ok(Value::Bool(true)));
        assert!(matches!(call("abc", "test", &[s("(")]), Err(Error::Syntax(_))));
    }

    #[test]
    fn argument_errors() {
        assert!(matches!(call("abc", "indexOf", &[]), Err(Error::Type(_))));
        assert!(matches!(call("abc", "charAt", &[s("x")]), Err(Error::Type(_))));
        assert!(matches!(call("abc", "includes", &[Value::Bool(true)]), Err(Error::Type(_))));
    }

    #[test]
    fn array_members() {
        let arr = Value::from(vec![1, 2, 3]);
        assert_eq!(lookup(&arr, "length").unwrap().read(&arr), Ok(n(3.0)));
        assert_eq!(call(arr.clone(), "join", &[s("-")]), Ok(s("1-2-3")));
        assert_eq!(call(arr.clone(), "join", &[]), Ok(s("1,2,3")));
        assert_eq!(call(arr.clone(), "indexOf", &[n(2.0)]), Ok(n(1.0)));
        assert_eq!(call(arr.clone(), "includes", &[s("2")]), Ok(Value::Bool(false)));
        assert_eq!(call(arr.clone(), "slice", &[n(1.0)]), Ok(Value::from(vec![2, 3])));
        assert_eq!(call(arr.clone(), "at", &[n(-1.0)]), Ok(n(3.0)));
        assert_eq!(call(arr.clone(), "reverse", &[]), Ok(Value::from(vec![3, 2, 1])));
        assert_eq!(
            call(arr, "concat", &[Value::from(vec![4]), n(5.0)]),
            Ok(Value::from(vec![1, 2, 3, 4, 5]))
        );
    }

    #[test]
    fn number_members() {
        assert_eq!(call(2.0 / 3.0, "toFixed", &[n(2.0)]), Ok(s("0.67")));
        assert_eq!(call(2.4, "toFixed", &[]), Ok(s("2")));
        assert_eq!(call(7.0, "toString", &[]), Ok(s("7")));
        assert!(matches!(call(1.0, "toFixed", &[n(101.0)]), Err(Error::Range(_))));
    }
}
