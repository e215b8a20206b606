//! Clause-by-clause explanations of a rule verdict.
//!
//! The expression is cut at its top-level `&&`/`||` boundaries and each piece
//! is evaluated on its own. This is a display aid, not a logical
//! decomposition: in `(a && b) || c` the first clause is itself a
//! conjunction, and the overall verdict always comes from evaluating the
//! whole rule rather than recombining clause results.
//!
//! Referenced keys are gathered with a shallow scan: one leading
//! `!` is stripped and the remainder must be a single atom. Grouped or doubly
//! negated clauses therefore report no keys.

use serde::{Deserialize, Serialize};

use crate::errors::RuleError;
use crate::expr::{Atom, Limits, Operator, Rule, TokenKind, report_failure, tokenize};
use crate::tags::TagSet;

/// Verdict for a rule plus the per-clause breakdown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Explanation {
    /// Whether the whole rule matched.
    pub matches: bool,
    /// Top-level clauses in source order.
    pub clauses: Vec<ClauseDetail>,
}

/// One top-level clause of a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClauseDetail {
    /// Trimmed source text of the clause.
    pub source: String,
    /// Whether the clause matched on its own.
    pub matches: bool,
    /// Referenced keys present in the tag set.
    pub matched_tags: Vec<String>,
    /// Referenced keys absent from the tag set.
    pub missing_tags: Vec<String>,
    /// Operator joining this clause to the next; `None` on the last clause.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub joiner: Option<Operator>,
}

impl Explanation {
    /// Number of clauses that matched on their own.
    #[must_use]
    pub fn matched_clause_count(&self) -> usize {
        self.clauses.iter().filter(|clause| clause.matches).count()
    }
}

/// Explain `expression` against `tags`, surfacing every failure.
///
/// # Errors
/// Returns [`RuleError`] when the expression is empty or malformed.
///
/// # Examples
/// ```
/// use scope_rules::{TagSet, try_explain};
/// let explanation = try_explain(r#"scope.has("a") && scope.has("b")"#, &TagSet::from(["a"]))?;
/// assert!(!explanation.matches);
/// assert_eq!(explanation.clauses.len(), 2);
/// assert_eq!(explanation.clauses[1].missing_tags, vec!["b".to_string()]);
/// # Ok::<(), scope_rules::RuleError>(())
/// ```
pub fn try_explain(expression: &str, tags: &TagSet<'_>) -> Result<Explanation, RuleError> {
    try_explain_with_limits(expression, tags, Limits::default())
}

/// [`try_explain`] under caller-supplied [`Limits`].
///
/// # Errors
/// As for [`try_explain`].
pub fn try_explain_with_limits(
    expression: &str,
    tags: &TagSet<'_>,
    limits: Limits,
) -> Result<Explanation, RuleError> {
    let rule = Rule::parse_with_limits(expression, limits)?;
    let tokens = tokenize(expression)?;

    let mut clauses: Vec<ClauseDetail> = Vec::new();
    for token in tokens {
        match token.kind {
            TokenKind::Atom(source) => {
                let clause = Rule::parse_with_limits(source, limits)?;
                clauses.push(describe_clause(source, clause.matches(tags), tags));
            }
            TokenKind::Operator(operator) => {
                if let Some(previous) = clauses.last_mut() {
                    previous.joiner = Some(operator);
                }
            }
        }
    }

    Ok(Explanation {
        matches: rule.matches(tags),
        clauses,
    })
}

/// Explain `expression` against `tags`, degrading to an empty non-match.
///
/// Mirrors [`crate::evaluate`]: blank input is silent, malformed input is
/// logged as a warning.
#[must_use]
pub fn explain(expression: &str, tags: &TagSet<'_>) -> Explanation {
    try_explain(expression, tags).unwrap_or_else(|err| {
        report_failure("explain", expression, &err);
        Explanation::default()
    })
}

fn describe_clause(source: &str, matches: bool, tags: &TagSet<'_>) -> ClauseDetail {
    let (matched_tags, missing_tags): (Vec<String>, Vec<String>) = referenced_keys(source)
        .into_iter()
        .partition(|key| tags.contains(key));
    ClauseDetail {
        source: source.to_string(),
        matches,
        matched_tags,
        missing_tags,
        joiner: None,
    }
}

/// Keys mentioned by a clause that is a single, optionally negated, atom.
fn referenced_keys(clause: &str) -> Vec<String> {
    let trimmed = clause.trim();
    let atom_text = trimmed.strip_prefix('!').unwrap_or(trimmed);
    let Ok(atom) = Atom::parse(atom_text) else {
        return Vec::new();
    };
    let mut keys: Vec<String> = Vec::new();
    for key in atom.keys() {
        if !keys.contains(key) {
            keys.push(key.clone());
        }
    }
    keys
}
