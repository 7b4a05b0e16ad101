//! Deterministic identifier derivation: root names from titles, lifted
//! nested-type names, enum member names, and target-side manglings.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::ir::Literal;

static NON_IDENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9_]").unwrap());
static NON_ALPHA: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z]+").unwrap());

/// Replace everything outside `[A-Za-z0-9_]` with `_` and make sure the
/// result does not start with a digit.
pub fn sanitize_ident(raw: &str) -> String {
    let mut s = NON_IDENT.replace_all(raw, "_").into_owned();
    if s.is_empty() || s.as_bytes()[0].is_ascii_digit() {
        s.insert(0, '_');
    }
    s
}

/// Root type name from a document `title`: title-case each word, keep only
/// alphabetic characters. `"ABcd"` becomes `Abcd`, `"my model!"` `MyModel`.
pub fn type_name_from_title(title: &str) -> String {
    NON_ALPHA
        .split(title)
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut cs = w.chars();
            match cs.next() {
                Some(c) => c.to_uppercase().chain(cs.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect()
}

/// Lifted name for an inline object/enum at a property: `_` + the key.
pub fn nested_field_name(key: &str) -> String {
    format!("_{}", sanitize_ident(key).trim_start_matches('_'))
}

/// Lifted name for an anonymous array item, `k` being the 1-based ordinal
/// of appearance among siblings.
pub fn nested_item_name(k: usize) -> String {
    format!("_sub{k}")
}

/// Default enum member name: the uppercased literal, sanitized. Integer
/// literals cannot become bare identifiers, so they get a `VALUE_` prefix
/// (`VALUE_0`, `VALUE_MINUS_1`).
pub fn enum_member_name(value: &Literal) -> String {
    match value {
        Literal::Str(s) => sanitize_ident(&s.to_uppercase()),
        Literal::Int(i) if *i < 0 => format!("VALUE_MINUS_{}", i.unsigned_abs()),
        Literal::Int(i) => format!("VALUE_{i}"),
        Literal::Float(f) => sanitize_ident(&format!("VALUE_{f}")),
        Literal::Bool(b) => format!("VALUE_{}", b.to_string().to_uppercase()),
    }
}

/// Mangle a qualified name for targets without nested type declarations:
/// segments lose their lifted `_` prefix and join with `_`, so
/// `ABcd._Child1._Child2` becomes `ABcd_Child1_Child2`.
pub fn flat_ident(qualified: &str) -> String {
    qualified
        .split('.')
        .map(|seg| seg.trim_start_matches('_'))
        .collect::<Vec<_>>()
        .join("_")
}

/// Uppercase the first character (Go export rule).
pub fn capitalize(s: &str) -> String {
    let mut cs = s.chars();
    match cs.next() {
        Some(c) => c.to_uppercase().chain(cs).collect(),
        None => String::new(),
    }
}

/// Lowercase the first character (for Go's unexported options struct type).
pub fn uncapitalize(s: &str) -> String {
    let mut cs = s.chars();
    match cs.next() {
        Some(c) => c.to_lowercase().chain(cs).collect(),
        None => String::new(),
    }
}

// ————————————————————————————————————————————————————————————————————————————
// Tests
// ————————————————————————————————————————————————————————————————————————————
