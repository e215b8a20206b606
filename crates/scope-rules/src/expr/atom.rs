//! Membership predicates: the leaves of every rule.

use std::fmt;

use crate::errors::ParseError;
use crate::tags::TagSet;

const RECEIVER: &str = "scope.";

/// A single membership test against the tag set.
///
/// The set of shapes is closed; evaluation is an exhaustive match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Atom {
    /// `scope.has("key")`: the key is present.
    Has(String),
    /// `scope.hasAny([...])`: at least one key is present. False when empty.
    HasAny(Vec<String>),
    /// `scope.hasAll([...])`: every key is present. True when empty.
    HasAll(Vec<String>),
}

impl Atom {
    /// Parse a single membership call such as `scope.hasAny(["a","b"])`.
    ///
    /// # Errors
    /// Returns [`ParseError`] when the text is not a recognised call or its
    /// argument is not the expected literal shape.
    ///
    /// # Examples
    /// ```
    /// use scope_rules::Atom;
    /// let atom = Atom::parse(r#"scope.hasAll([ "a", "b" ])"#)?;
    /// assert_eq!(atom, Atom::HasAll(vec!["a".into(), "b".into()]));
    /// # Ok::<(), scope_rules::ParseError>(())
    /// ```
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let (text, offset) = super::lexer::trim_span(text, 0);
        Self::parse_at(text, offset)
    }

    pub(crate) fn parse_at(text: &str, position: usize) -> Result<Self, ParseError> {
        let unknown = || ParseError::UnknownAtom {
            text: text.to_string(),
            position,
        };
        let call = text.strip_prefix(RECEIVER).ok_or_else(unknown)?;
        let (method, rest) = call.split_once('(').ok_or_else(unknown)?;
        let args = rest.strip_suffix(')').ok_or_else(unknown)?;
        let expected_array = || ParseError::ExpectedArray {
            text: text.to_string(),
            position,
        };
        match method {
            "has" => parse_string_literal(args.trim())
                .map(|key| Self::Has(key.to_string()))
                .ok_or_else(|| ParseError::ExpectedString {
                    text: text.to_string(),
                    position,
                }),
            "hasAny" => parse_string_array(args)
                .map(Self::HasAny)
                .ok_or_else(expected_array),
            "hasAll" => parse_string_array(args)
                .map(Self::HasAll)
                .ok_or_else(expected_array),
            _ => Err(unknown()),
        }
    }

    /// The keys this atom mentions, in source order.
    #[must_use]
    pub fn keys(&self) -> &[String] {
        match self {
            Self::Has(key) => std::slice::from_ref(key),
            Self::HasAny(keys) | Self::HasAll(keys) => keys,
        }
    }

    /// Evaluate the predicate against `tags`.
    #[must_use]
    pub fn matches(&self, tags: &TagSet<'_>) -> bool {
        match self {
            Self::Has(key) => tags.contains(key),
            Self::HasAny(keys) => keys.iter().any(|key| tags.contains(key)),
            Self::HasAll(keys) => keys.iter().all(|key| tags.contains(key)),
        }
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (method, keys) = match self {
            Self::Has(key) => return write!(f, "{RECEIVER}has(\"{key}\")"),
            Self::HasAny(keys) => ("hasAny", keys),
            Self::HasAll(keys) => ("hasAll", keys),
        };
        write!(f, "{RECEIVER}{method}([")?;
        for (index, key) in keys.iter().enumerate() {
            if index > 0 {
                f.write_str(",")?;
            }
            write!(f, "\"{key}\"")?;
        }
        f.write_str("])")
    }
}

/// Parse `"key"` or `'key'`, returning the unquoted key.
fn parse_string_literal(text: &str) -> Option<&str> {
    let quote = text.chars().next().filter(|&c| matches!(c, '"' | '\''))?;
    let inner = text.strip_prefix(quote)?.strip_suffix(quote)?;
    (!inner.contains(quote)).then_some(inner)
}

/// Parse `[ "a", "b" ]` into its keys. `[]` is the empty list.
fn parse_string_array(text: &str) -> Option<Vec<String>> {
    let inner = text.trim().strip_prefix('[')?.strip_suffix(']')?.trim();
    let mut keys = Vec::new();
    if inner.is_empty() {
        return Some(keys);
    }
    let mut rest = inner;
    loop {
        let quote = rest.chars().next().filter(|&c| matches!(c, '"' | '\''))?;
        let body = rest.strip_prefix(quote)?;
        let (key, tail) = body.split_once(quote)?;
        keys.push(key.to_string());
        rest = tail.trim_start();
        if rest.is_empty() {
            return Some(keys);
        }
        rest = rest.strip_prefix(',')?.trim_start();
    }
}
