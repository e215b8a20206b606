//! Rule parsing and evaluation.
//!
//! Every entry point parses the expression afresh; nothing is cached between
//! calls. Callers that check one rule against many tag sets can hold on to a
//! [`Rule`] and call [`Rule::matches`] repeatedly.

mod ast;
mod atom;
mod lexer;
mod parser;

use std::str::FromStr;

pub use ast::Expr;
pub use atom::Atom;
pub use lexer::{Operator, Token, TokenKind, tokenize};
pub use parser::{DEFAULT_MAX_DEPTH, DEFAULT_MAX_LENGTH, Limits};

use crate::errors::RuleError;
use crate::tags::TagSet;
use parser::Parser;

/// A parsed rule expression.
///
/// # Examples
/// ```
/// use scope_rules::{Rule, TagSet};
/// let rule: Rule = r#"scope.hasAny(["a","b"]) && !scope.has("c")"#.parse()?;
/// assert!(rule.matches(&TagSet::from(["a"])));
/// assert!(!rule.matches(&TagSet::from(["a", "c"])));
/// # Ok::<(), scope_rules::RuleError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    source: String,
    root: Expr,
}

impl Rule {
    /// Parse `input` under the default [`Limits`].
    ///
    /// # Errors
    /// Returns [`RuleError::EmptyExpression`] for blank input, and the lexing,
    /// grammar, or limit error otherwise.
    pub fn parse(input: &str) -> Result<Self, RuleError> {
        Self::parse_with_limits(input, Limits::default())
    }

    /// Parse `input` under caller-supplied [`Limits`].
    ///
    /// # Errors
    /// As for [`Rule::parse`].
    pub fn parse_with_limits(input: &str, limits: Limits) -> Result<Self, RuleError> {
        let root = Parser::new(limits).parse(input)?;
        Ok(Self {
            source: input.to_string(),
            root,
        })
    }

    /// Evaluate the rule against `tags`.
    #[must_use]
    pub fn matches(&self, tags: &TagSet<'_>) -> bool {
        self.root.evaluate(tags)
    }

    /// The parsed tree.
    #[must_use]
    pub fn expr(&self) -> &Expr {
        &self.root
    }

    /// The text the rule was parsed from.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }
}

impl FromStr for Rule {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Evaluate `expression` against `tags`, surfacing every failure.
///
/// # Errors
/// Returns [`RuleError`] when the expression is empty or malformed.
pub fn try_evaluate(expression: &str, tags: &TagSet<'_>) -> Result<bool, RuleError> {
    Rule::parse(expression).map(|rule| rule.matches(tags))
}

/// Evaluate `expression` against `tags`, treating any failure as a non-match.
///
/// Blank expressions mean "no predicate" and quietly yield `false`. Malformed
/// ones also yield `false` and emit a warning through the `log` facade, so a
/// broken user-authored rule only ever fails to match.
///
/// # Examples
/// ```
/// use scope_rules::{TagSet, evaluate};
/// let tags = TagSet::from(["a"]);
/// assert!(evaluate(r#"scope.has("a")"#, &tags));
/// assert!(!evaluate(r#"scope.hasAll(["a""#, &tags));
/// assert!(!evaluate("", &tags));
/// ```
#[must_use]
pub fn evaluate(expression: &str, tags: &TagSet<'_>) -> bool {
    evaluate_with_limits(expression, tags, Limits::default())
}

/// [`evaluate`] under caller-supplied [`Limits`].
#[must_use]
pub fn evaluate_with_limits(expression: &str, tags: &TagSet<'_>, limits: Limits) -> bool {
    Rule::parse_with_limits(expression, limits).map_or_else(
        |err| {
            report_failure("evaluate", expression, &err);
            false
        },
        |rule| rule.matches(tags),
    )
}

/// Check that `expression` is a well-formed rule without evaluating it.
///
/// # Errors
/// Returns the [`RuleError`] that evaluation would have hit. Blank input
/// reports [`RuleError::EmptyExpression`]; editors usually treat that as
/// "nothing to validate" rather than as invalid.
pub fn validate(expression: &str) -> Result<(), RuleError> {
    Rule::parse(expression).map(drop)
}

pub(crate) fn report_failure(operation: &str, expression: &str, err: &RuleError) {
    if err.is_empty_expression() {
        log::debug!("{operation}: empty rule expression treated as no match");
    } else {
        log::warn!("{operation}: rule expression failed: {err} | expression: {expression}");
    }
}
