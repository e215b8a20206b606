//! Recursive-descent parsing over token spans.
//!
//! ```text
//! OrExpr  := AndExpr ( "||" AndExpr )*
//! AndExpr := Unary   ( "&&" Unary   )*
//! Unary   := "!" Unary | "(" OrExpr ")" | Atom
//! ```
//!
//! Each level re-tokenises the span it was given: nested groups arrive from
//! the lexer as single atom tokens and are descended into here. Offsets are
//! threaded through so errors point into the caller's original text.

use super::ast::Expr;
use super::atom::Atom;
use super::lexer::{Operator, TokenKind, enclosing_group, tokenize, trim_span};
use crate::errors::{ParseError, RuleError};

/// Default bound on `!` and parenthesis nesting.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Default bound on expression length, in bytes.
pub const DEFAULT_MAX_LENGTH: usize = 16 * 1024;

/// Bounds applied before and during parsing.
///
/// Rules are user-authored text, so parsing refuses input that would recurse
/// or scan without bound.
///
/// # Examples
/// ```
/// use scope_rules::{Limits, Rule, RuleError};
/// let limits = Limits { max_depth: 1, ..Limits::default() };
/// let err = Rule::parse_with_limits(r#"!!scope.has("a")"#, limits).err();
/// assert_eq!(err, Some(RuleError::TooDeep { limit: 1 }));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Deepest permitted nesting of `!` and parenthesised groups.
    pub max_depth: usize,
    /// Longest permitted expression, in bytes.
    pub max_length: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_length: DEFAULT_MAX_LENGTH,
        }
    }
}

impl Limits {
    /// Limits that never reject input.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            max_depth: usize::MAX,
            max_length: usize::MAX,
        }
    }
}

pub(super) struct Parser {
    limits: Limits,
}

impl Parser {
    pub(super) fn new(limits: Limits) -> Self {
        Self { limits }
    }

    pub(super) fn parse(&self, input: &str) -> Result<Expr, RuleError> {
        if input.len() > self.limits.max_length {
            return Err(RuleError::TooLong {
                length: input.len(),
                limit: self.limits.max_length,
            });
        }
        if input.trim().is_empty() {
            return Err(RuleError::EmptyExpression);
        }
        self.parse_or(input, 0, 0)
    }

    fn enter(&self, depth: usize) -> Result<(), RuleError> {
        if depth > self.limits.max_depth {
            Err(RuleError::TooDeep {
                limit: self.limits.max_depth,
            })
        } else {
            Ok(())
        }
    }

    fn parse_or(&self, text: &str, offset: usize, depth: usize) -> Result<Expr, RuleError> {
        self.enter(depth)?;
        let (text, offset) = trim_span(text, offset);
        if let Some(inner) = enclosing_group(text) {
            return self.parse_or(inner, offset + 1, depth + 1);
        }

        let mut alternatives = Vec::new();
        let mut operands = Vec::new();
        let mut dangling: Option<(Operator, usize)> = None;
        let mut expecting_operand = true;

        for token in tokenize(text)? {
            let position = offset + token.start;
            match token.kind {
                TokenKind::Atom(span) => {
                    operands.push(self.parse_unary(span, position, depth)?);
                    expecting_operand = false;
                    dangling = None;
                }
                TokenKind::Operator(operator) => {
                    if expecting_operand {
                        return Err(ParseError::MissingOperand { operator, position }.into());
                    }
                    if operator == Operator::Or {
                        alternatives.push(Expr::group(std::mem::take(&mut operands), Expr::And));
                    }
                    expecting_operand = true;
                    dangling = Some((operator, position));
                }
            }
        }

        if let Some((operator, position)) = dangling {
            return Err(ParseError::MissingOperand { operator, position }.into());
        }
        if operands.is_empty() {
            return Err(ParseError::ExpectedExpression { position: offset }.into());
        }
        alternatives.push(Expr::group(operands, Expr::And));
        Ok(Expr::group(alternatives, Expr::Or))
    }

    fn parse_unary(&self, text: &str, offset: usize, depth: usize) -> Result<Expr, RuleError> {
        let (text, offset) = trim_span(text, offset);
        if let Some(rest) = text.strip_prefix('!') {
            self.enter(depth + 1)?;
            if rest.trim().is_empty() {
                return Err(ParseError::ExpectedExpression {
                    position: offset + 1,
                }
                .into());
            }
            let operand = self.parse_unary(rest, offset + 1, depth + 1)?;
            return Ok(Expr::Not(Box::new(operand)));
        }
        if let Some(inner) = enclosing_group(text) {
            return self.parse_or(inner, offset + 1, depth + 1);
        }
        Ok(Expr::Atom(Atom::parse_at(text, offset)?))
    }
}
