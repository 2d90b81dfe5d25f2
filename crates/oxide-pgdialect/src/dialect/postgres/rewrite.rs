//! Named parameter rewriting.
//!
//! Query templates reference inputs as `:name` or `$name`. PostgreSQL infers a
//! parameter's type from its context, which goes wrong for values the driver
//! binds as text or as an untyped NULL: a UUID compared to a text parameter,
//! a date bound as a timestamp, or a NULL array passed to `= any(...)`. The
//! rewriter appends an explicit cast to every parameter whose field needs one
//! and leaves all other text untouched.
//!
//! Already cast parameters (`:id::uuid`) are never matched, so rewriting its
//! own output changes nothing.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::types::storage_type;
use crate::schema::{Field, SchemaDefinition, SemanticType};

/// List types that never receive an array cast.
///
/// Binding a list of integers and casting the parameter to `integer[]` fails
/// with "cannot cast type integer to integer[]", unlike the text and uuid
/// variants of the same predicate.
pub const LIST_CAST_EXCEPTIONS: &[SemanticType] = &[SemanticType::Integer];

/// `[not] in (<param>[::cast])` where the parameter is the whole list.
static MEMBERSHIP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\s+)(not\s+)?in\s*\(\s*([:$][A-Za-z0-9_$]+)((?:::\w+(?:\[\])?)?\s*\))")
        .expect("Invalid membership regex")
});

/// A named parameter in a query template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterToken<'a> {
    /// The parameter name, without sigil.
    pub name: &'a str,
    /// Byte offset of the sigil.
    pub start: usize,
    /// Byte offset just past the name.
    pub end: usize,
}

/// Single pass scanner over the parameter tokens of a template.
///
/// A token is a sigil (`:` or `$`) followed by identifier characters
/// (`[A-Za-z0-9_$]`). The sigil must not follow another sigil and the token
/// must not be followed by `::`.
pub struct ParameterScanner<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> ParameterScanner<'a> {
    /// Creates a scanner over `input`.
    #[must_use]
    pub const fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }
}

const fn is_sigil(b: u8) -> bool {
    b == b':' || b == b'$'
}

const fn is_identifier(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

impl<'a> Iterator for ParameterScanner<'a> {
    type Item = ParameterToken<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let bytes = self.input.as_bytes();
        while self.pos < bytes.len() {
            let start = self.pos;
            self.pos += 1;

            if !is_sigil(bytes[start]) {
                continue;
            }
            if start > 0 && is_sigil(bytes[start - 1]) {
                continue;
            }

            let mut end = start + 1;
            while end < bytes.len() && is_identifier(bytes[end]) {
                end += 1;
            }
            if end == start + 1 {
                continue;
            }
            self.pos = end;

            if self.input[end..].starts_with("::") {
                continue;
            }
            return Some(ParameterToken {
                name: &self.input[start + 1..end],
                start,
                end,
            });
        }
        None
    }
}

/// Returns the cast appended to a parameter bound to `field`, without `[]`.
fn parameter_cast(field: &Field) -> Option<&'static str> {
    match field.semantic_type {
        SemanticType::Uuid => Some("uuid"),
        SemanticType::DateTime => Some(field.granularity().sql_type()),
        SemanticType::Duration => Some("interval"),
        SemanticType::Boolean => Some("boolean"),
        // A NULL list compared with `= any(...)` is rejected unless typed.
        other if field.list && !LIST_CAST_EXCEPTIONS.contains(&other) => storage_type(other),
        _ => None,
    }
}

/// Rewrites the parameters of `sql` using the fields of `input`.
#[must_use]
pub fn rewrite(sql: &str, input: &SchemaDefinition) -> String {
    let mut result = String::with_capacity(sql.len() + 32);
    let mut last = 0;
    for token in ParameterScanner::new(sql) {
        result.push_str(&sql[last..token.end]);
        last = token.end;

        let Some(field) = input.get(token.name) else {
            continue;
        };
        if let Some(cast) = parameter_cast(field) {
            result.push_str("::");
            result.push_str(cast);
            if field.list {
                result.push_str("[]");
            }
        }
    }
    result.push_str(&sql[last..]);

    let rewritten = normalize_membership(&result, input);
    tracing::trace!(template = %sql, rewritten = %rewritten, "Rewrote query");
    rewritten
}

/// Turns `in (:param)` into `= any(:param)` and `not in (:param)` into
/// `<> all(:param)` when `param` is a list field.
///
/// Literal lists and parameters that are not lists keep their `IN`.
fn normalize_membership(sql: &str, input: &SchemaDefinition) -> String {
    MEMBERSHIP
        .replace_all(sql, |caps: &Captures<'_>| {
            let parameter = &caps[3];
            let is_list = input.get(&parameter[1..]).is_some_and(|f| f.list);
            if !is_list {
                return caps[0].to_string();
            }
            let operator = if caps.get(2).is_some() {
                "<> all"
            } else {
                "= any"
            };
            format!("{}{operator}({parameter}{}", &caps[1], &caps[4])
        })
        .into_owned()
}
