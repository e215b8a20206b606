//! Splits rule expressions into atom spans and top-level binary operators.
//!
//! The scanner tracks a stack of open `(`/`[` delimiters and whether it sits
//! inside a string literal. `&&` and `||` only count as operators when both
//! are clear; anywhere else they are ordinary characters of the current atom.
//! Atoms are emitted as trimmed slices of the input, so nested groups such as
//! `!(scope.has("a") || scope.has("b"))` arrive as a single token for the
//! parser to descend into.
//!
//! All structural characters are ASCII, so the scan walks bytes and only ever
//! slices the input at ASCII boundaries.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::LexError;

/// Binary operators recognised between atoms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    /// Conjunction, `&&`.
    #[serde(rename = "&&")]
    And,
    /// Disjunction, `||`.
    #[serde(rename = "||")]
    Or,
}

impl Operator {
    /// Source spelling of the operator.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::And => "&&",
            Self::Or => "||",
        }
    }

    fn at(bytes: &[u8], pos: usize) -> Option<Self> {
        match bytes.get(pos..pos + 2) {
            Some(b"&&") => Some(Self::And),
            Some(b"||") => Some(Self::Or),
            _ => None,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// What a [`Token`] holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind<'a> {
    /// Trimmed source text between operators.
    Atom(&'a str),
    /// A top-level `&&` or `||`.
    Operator(Operator),
}

/// A token together with the byte offset where it starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    /// The token payload.
    pub kind: TokenKind<'a>,
    /// Zero-based byte offset into the scanned text.
    pub start: usize,
}

impl<'a> Token<'a> {
    /// The atom text, if this token is an atom.
    #[must_use]
    pub fn atom(&self) -> Option<&'a str> {
        match self.kind {
            TokenKind::Atom(text) => Some(text),
            TokenKind::Operator(_) => None,
        }
    }
}

#[derive(Debug, Default)]
struct Nesting {
    quote: Option<(u8, usize)>,
    open: Vec<(u8, usize)>,
}

impl Nesting {
    fn is_top_level(&self) -> bool {
        self.quote.is_none() && self.open.is_empty()
    }

    fn step(&mut self, byte: u8, pos: usize) -> Result<(), LexError> {
        if let Some((quote, _)) = self.quote {
            if byte == quote {
                self.quote = None;
            }
            return Ok(());
        }
        match byte {
            b'"' | b'\'' => self.quote = Some((byte, pos)),
            b'(' | b'[' => self.open.push((byte, pos)),
            b')' | b']' => {
                let wanted = if byte == b')' { b'(' } else { b'[' };
                match self.open.pop() {
                    Some((opened, _)) if opened == wanted => {}
                    Some((opened, start)) => {
                        return Err(LexError::Mismatched {
                            opened: char::from(opened),
                            start,
                            found: char::from(byte),
                            position: pos,
                        });
                    }
                    None => {
                        return Err(LexError::UnexpectedCloser {
                            delimiter: char::from(byte),
                            position: pos,
                        });
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn finish(&self) -> Result<(), LexError> {
        if let Some((_, start)) = self.quote {
            return Err(LexError::UnterminatedQuote { start });
        }
        match self.open.last() {
            Some(&(delimiter, start)) => Err(LexError::Unclosed {
                delimiter: char::from(delimiter),
                start,
            }),
            None => Ok(()),
        }
    }
}

/// Split `input` into atom spans and top-level operators.
///
/// Whitespace around atoms is trimmed and empty spans are dropped, so
/// `"a && && b"` yields two atoms around two operators; the parser reports
/// the missing operand.
///
/// # Errors
/// Returns [`LexError`] for unterminated literals and unbalanced or
/// mismatched delimiters.
///
/// # Examples
/// ```
/// use scope_rules::{Operator, TokenKind, tokenize};
/// let tokens = tokenize(r#"scope.hasAny(["a||b"]) || !scope.has("c")"#)?;
/// let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
/// assert_eq!(
///     kinds,
///     vec![
///         TokenKind::Atom(r#"scope.hasAny(["a||b"])"#),
///         TokenKind::Operator(Operator::Or),
///         TokenKind::Atom(r#"!scope.has("c")"#),
///     ]
/// );
/// # Ok::<(), scope_rules::LexError>(())
/// ```
pub fn tokenize(input: &str) -> Result<Vec<Token<'_>>, LexError> {
    let bytes = input.as_bytes();
    let mut nesting = Nesting::default();
    let mut tokens = Vec::new();
    let mut span_start = 0;
    let mut pos = 0;

    while let Some(&byte) = bytes.get(pos) {
        if nesting.is_top_level() {
            if let Some(op) = Operator::at(bytes, pos) {
                push_atom(input, span_start, pos, &mut tokens);
                tokens.push(Token {
                    kind: TokenKind::Operator(op),
                    start: pos,
                });
                pos += 2;
                span_start = pos;
                continue;
            }
        }
        nesting.step(byte, pos)?;
        pos += 1;
    }

    nesting.finish()?;
    push_atom(input, span_start, input.len(), &mut tokens);
    Ok(tokens)
}

fn push_atom<'a>(input: &'a str, start: usize, end: usize, tokens: &mut Vec<Token<'a>>) {
    let Some(raw) = input.get(start..end) else {
        return;
    };
    let (text, offset) = trim_span(raw, start);
    if !text.is_empty() {
        tokens.push(Token {
            kind: TokenKind::Atom(text),
            start: offset,
        });
    }
}

/// Trim `text`, shifting `offset` past any leading whitespace.
pub(crate) fn trim_span(text: &str, offset: usize) -> (&str, usize) {
    let leading = text.len() - text.trim_start().len();
    (text.trim(), offset + leading)
}

/// Return the inner text when a single parenthesis pair wraps all of `text`.
///
/// `(a) && (b)` starts and ends with parentheses but is not wrapped, so it
/// yields `None`. Malformed spans also yield `None`; tokenising them later
/// reports the precise problem.
pub(crate) fn enclosing_group(text: &str) -> Option<&str> {
    let inner = text.strip_prefix('(')?.strip_suffix(')')?;
    let bytes = text.as_bytes();
    let last = bytes.len() - 1;
    let mut nesting = Nesting::default();
    for (pos, &byte) in bytes.iter().enumerate() {
        nesting.step(byte, pos).ok()?;
        if nesting.is_top_level() {
            return (pos == last).then_some(inner);
        }
    }
    None
}
