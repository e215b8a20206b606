//! Error types shared by the tokeniser, parser, synthesiser, and catalog.
//!
//! Byte offsets are zero-based and always refer to the expression the caller
//! handed in, not to the sub-span being parsed when the failure surfaced.

use thiserror::Error;

use crate::expr::Operator;

/// Structural failures detected while scanning an expression into tokens.
///
/// # Examples
/// ```
/// use scope_rules::{LexError, tokenize};
/// let err = tokenize(r#"scope.hasAll(["a""#).err();
/// assert_eq!(err, Some(LexError::Unclosed { delimiter: '[', start: 13 }));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    /// A string literal was opened but never closed.
    #[error("unterminated string literal starting at byte {start}")]
    UnterminatedQuote {
        /// Offset of the opening quote.
        start: usize,
    },
    /// A bracket or parenthesis was still open at the end of input.
    #[error("unclosed '{delimiter}' opened at byte {start}")]
    Unclosed {
        /// The opening delimiter, `(` or `[`.
        delimiter: char,
        /// Offset of the opening delimiter.
        start: usize,
    },
    /// A closing delimiter appeared with nothing open.
    #[error("unexpected '{delimiter}' at byte {position}")]
    UnexpectedCloser {
        /// The closing delimiter, `)` or `]`.
        delimiter: char,
        /// Offset of the closing delimiter.
        position: usize,
    },
    /// A closing delimiter did not match the innermost open one.
    #[error("'{found}' at byte {position} does not close '{opened}' opened at byte {start}")]
    Mismatched {
        /// The delimiter that was open.
        opened: char,
        /// Offset of the open delimiter.
        start: usize,
        /// The closing delimiter actually found.
        found: char,
        /// Offset of the closing delimiter.
        position: usize,
    },
}

/// Grammar violations detected once tokens are available.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The span is not one of the recognised `scope.*` membership calls.
    #[error("unrecognised atom `{text}` at byte {position}")]
    UnknownAtom {
        /// Source text of the offending span.
        text: String,
        /// Offset of the span.
        position: usize,
    },
    /// `scope.has` was not given exactly one string literal.
    #[error("expected a single string literal in `{text}` at byte {position}")]
    ExpectedString {
        /// Source text of the offending atom.
        text: String,
        /// Offset of the atom.
        position: usize,
    },
    /// `scope.hasAny` or `scope.hasAll` was not given an array of literals.
    #[error("expected an array of string literals in `{text}` at byte {position}")]
    ExpectedArray {
        /// Source text of the offending atom.
        text: String,
        /// Offset of the atom.
        position: usize,
    },
    /// An operator lacks an operand on one side.
    #[error("operator '{operator}' at byte {position} is missing an operand")]
    MissingOperand {
        /// The dangling operator.
        operator: Operator,
        /// Offset of the operator.
        position: usize,
    },
    /// An empty group or a bare `!` where an expression was required.
    #[error("expected an expression at byte {position}")]
    ExpectedExpression {
        /// Offset where the expression should have started.
        position: usize,
    },
}

/// Every way a rule expression can fail to produce a verdict.
///
/// # Examples
/// ```
/// use scope_rules::{RuleError, TagSet, try_evaluate};
/// let tags = TagSet::new();
/// assert!(matches!(try_evaluate("   ", &tags), Err(RuleError::EmptyExpression)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    /// The expression was empty or whitespace only.
    #[error("rule expression is empty")]
    EmptyExpression,
    /// Tokenising failed.
    #[error(transparent)]
    Lex(#[from] LexError),
    /// The token stream did not match the grammar.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// The expression exceeded the configured length bound.
    #[error("rule expression is {length} bytes long, exceeding the limit of {limit}")]
    TooLong {
        /// Length of the rejected expression in bytes.
        length: usize,
        /// The configured bound.
        limit: usize,
    },
    /// The expression nested `!` or parentheses beyond the configured bound.
    #[error("rule expression nests deeper than {limit} levels")]
    TooDeep {
        /// The configured bound.
        limit: usize,
    },
}

impl RuleError {
    /// Whether this is the "no predicate" case rather than a broken rule.
    #[must_use]
    pub fn is_empty_expression(&self) -> bool {
        matches!(self, Self::EmptyExpression)
    }
}

/// Raised when text does not name a known selection mode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown selection mode '{0}', expected one of: must_have_all, any_of, exclude")]
pub struct SelectionModeError(pub String);

/// Raised when text does not name a known tag kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "unknown tag kind '{0}', expected one of: ecosystem, method, data, governance, outcomes"
)]
pub struct TagKindError(pub String);

/// Errors raised while assembling a tag catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// Two entries share a key.
    #[error("duplicate catalog key '{key}'")]
    DuplicateKey {
        /// The repeated key.
        key: String,
    },
}
