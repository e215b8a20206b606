//! Synthesises rule text from structured tag selections.
//!
//! Selections are grouped by mode and emitted in a fixed order: one
//! `scope.hasAll` atom, one `scope.hasAny` atom, then one `!scope.has` atom
//! per excluded key, all joined with ` && `. Keys keep their input order
//! within each group, so the same selections always produce the same text.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::SelectionModeError;
use crate::expr::{Atom, Expr};

static QUOTED_LITERAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"]*)"|'([^']*)'"#).unwrap_or_else(|_| unreachable!()));

/// How a selected key takes part in a synthesised rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    /// The activity must carry every such key.
    MustHaveAll,
    /// The activity must carry at least one such key.
    AnyOf,
    /// The activity must carry none of these keys.
    Exclude,
}

impl SelectionMode {
    /// Every mode, in emission order.
    pub const ALL: [Self; 3] = [Self::MustHaveAll, Self::AnyOf, Self::Exclude];

    /// Canonical spelling used by serde and [`FromStr`].
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MustHaveAll => "must_have_all",
            Self::AnyOf => "any_of",
            Self::Exclude => "exclude",
        }
    }

    /// The mode a further click moves to; `None` once the cycle deselects.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::MustHaveAll => Some(Self::AnyOf),
            Self::AnyOf => Some(Self::Exclude),
            Self::Exclude => None,
        }
    }
}

impl fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SelectionMode {
    type Err = SelectionModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "must_have_all" | "all" => Ok(Self::MustHaveAll),
            "any_of" | "any" => Ok(Self::AnyOf),
            "exclude" | "none" => Ok(Self::Exclude),
            _ => Err(SelectionModeError(s.to_string())),
        }
    }
}

/// A key paired with the way it should be matched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TagSelection {
    /// The tag key.
    pub key: String,
    /// How the key participates.
    pub mode: SelectionMode,
}

impl TagSelection {
    /// Pair `key` with `mode`.
    pub fn new(key: impl Into<String>, mode: SelectionMode) -> Self {
        Self {
            key: key.into(),
            mode,
        }
    }
}

/// Build canonical rule text from `selections`.
///
/// Returns an empty string when there is nothing to select. Duplicate keys
/// are emitted as given; use [`SelectionSet`] for last-wins semantics.
///
/// # Examples
/// ```
/// use scope_rules::{SelectionMode::*, TagSelection, build_expression};
/// let text = build_expression(&[
///     TagSelection::new("a", MustHaveAll),
///     TagSelection::new("b", MustHaveAll),
///     TagSelection::new("c", AnyOf),
///     TagSelection::new("d", Exclude),
/// ]);
/// assert_eq!(
///     text,
///     r#"scope.hasAll(["a","b"]) && scope.hasAny(["c"]) && !scope.has("d")"#
/// );
/// ```
#[must_use]
pub fn build_expression(selections: &[TagSelection]) -> String {
    let keys_for = |mode: SelectionMode| -> Vec<String> {
        selections
            .iter()
            .filter(|selection| selection.mode == mode)
            .map(|selection| selection.key.clone())
            .collect()
    };

    let mut parts = Vec::new();
    let all = keys_for(SelectionMode::MustHaveAll);
    if !all.is_empty() {
        parts.push(Expr::Atom(Atom::HasAll(all)));
    }
    let any = keys_for(SelectionMode::AnyOf);
    if !any.is_empty() {
        parts.push(Expr::Atom(Atom::HasAny(any)));
    }
    parts.extend(
        keys_for(SelectionMode::Exclude)
            .into_iter()
            .map(|key| Expr::Not(Box::new(Expr::Atom(Atom::Has(key))))),
    );

    if parts.is_empty() {
        String::new()
    } else {
        Expr::group(parts, Expr::And).to_string()
    }
}

/// Build a single `scope.hasAll([...])` over `keys`, or an empty string.
#[must_use]
pub fn build_all_of_expression<I, S>(keys: I) -> String
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let keys: Vec<String> = keys.into_iter().map(Into::into).collect();
    if keys.is_empty() {
        String::new()
    } else {
        Atom::HasAll(keys).to_string()
    }
}

/// Collect every quoted literal in `expression`, deduplicated in order of
/// first appearance.
///
/// This is a text scan, not a parse: it works on malformed rules and picks up
/// literals from any atom. Empty literals are skipped.
///
/// # Examples
/// ```
/// use scope_rules::extract_tag_keys;
/// let keys = extract_tag_keys(r#"scope.hasAny(["a","b"]) && !scope.has("a")"#);
/// assert_eq!(keys, vec!["a".to_string(), "b".to_string()]);
/// ```
#[must_use]
pub fn extract_tag_keys(expression: &str) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    for captures in QUOTED_LITERAL_RE.captures_iter(expression) {
        let Some(key) = captures.get(1).or_else(|| captures.get(2)).map(|m| m.as_str()) else {
            continue;
        };
        if !key.is_empty() && !keys.iter().any(|existing| existing == key) {
            keys.push(key.to_string());
        }
    }
    keys
}

/// Insertion-ordered selections with one mode per key.
///
/// Re-selecting a key replaces its mode in place, so the position of a key in
/// the synthesised text is fixed by when it was first selected.
///
/// # Examples
/// ```
/// use scope_rules::{SelectionMode, SelectionSet};
/// let mut selections = SelectionSet::new();
/// selections.toggle("a");
/// selections.toggle("b");
/// selections.toggle("b");
/// assert_eq!(selections.mode_of("b"), Some(SelectionMode::AnyOf));
/// assert_eq!(
///     selections.to_expression(),
///     r#"scope.hasAll(["a"]) && scope.hasAny(["b"])"#
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    entries: Vec<TagSelection>,
}

impl SelectionSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Select `key` with `mode`, returning the mode it replaced.
    pub fn set(&mut self, key: impl Into<String>, mode: SelectionMode) -> Option<SelectionMode> {
        let key = key.into();
        if let Some(entry) = self.entries.iter_mut().find(|entry| entry.key == key) {
            return Some(std::mem::replace(&mut entry.mode, mode));
        }
        self.entries.push(TagSelection { key, mode });
        None
    }

    /// Deselect `key`, returning its previous mode.
    pub fn remove(&mut self, key: &str) -> Option<SelectionMode> {
        let index = self.entries.iter().position(|entry| entry.key == key)?;
        Some(self.entries.remove(index).mode)
    }

    /// Advance `key` one step through the selection cycle.
    ///
    /// Unselected keys become [`SelectionMode::MustHaveAll`]; stepping past
    /// [`SelectionMode::Exclude`] deselects the key. Returns the new mode.
    pub fn toggle(&mut self, key: &str) -> Option<SelectionMode> {
        let Some(current) = self.mode_of(key) else {
            self.set(key, SelectionMode::MustHaveAll);
            return Some(SelectionMode::MustHaveAll);
        };
        match current.next() {
            Some(next) => {
                self.set(key, next);
                Some(next)
            }
            None => {
                self.remove(key);
                None
            }
        }
    }

    /// The current mode of `key`, if selected.
    #[must_use]
    pub fn mode_of(&self, key: &str) -> Option<SelectionMode> {
        self.entries
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| entry.mode)
    }

    /// Selections in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &TagSelection> {
        self.entries.iter()
    }

    /// Selections as a slice, ready for [`build_expression`].
    #[must_use]
    pub fn as_slice(&self) -> &[TagSelection] {
        &self.entries
    }

    /// Number of selected keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Deselect everything.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Synthesise rule text for the current selections.
    #[must_use]
    pub fn to_expression(&self) -> String {
        build_expression(&self.entries)
    }
}

impl FromIterator<TagSelection> for SelectionSet {
    fn from_iter<T: IntoIterator<Item = TagSelection>>(iter: T) -> Self {
        let mut set = Self::new();
        for selection in iter {
            set.set(selection.key, selection.mode);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::expr::Rule;

    fn sel(key: &str, mode: SelectionMode) -> TagSelection {
        TagSelection::new(key, mode)
    }

    #[test]
    fn empty_selection_builds_empty_text() {
        assert_eq!(build_expression(&[]), "");
        assert!(SelectionSet::new().to_expression().is_empty());
    }

    #[test]
    fn groups_by_mode_in_fixed_order() {
        let text = build_expression(&[
            sel("x", SelectionMode::Exclude),
            sel("c", SelectionMode::AnyOf),
            sel("a", SelectionMode::MustHaveAll),
            sel("y", SelectionMode::Exclude),
            sel("b", SelectionMode::MustHaveAll),
        ]);
        assert_eq!(
            text,
            r#"scope.hasAll(["a","b"]) && scope.hasAny(["c"]) && !scope.has("x") && !scope.has("y")"#
        );
    }

    #[rstest]
    #[case(&[("a", SelectionMode::AnyOf)], r#"scope.hasAny(["a"])"#)]
    #[case(&[("a", SelectionMode::Exclude)], r#"!scope.has("a")"#)]
    #[case(
        &[("a", SelectionMode::Exclude), ("b", SelectionMode::AnyOf)],
        r#"scope.hasAny(["b"]) && !scope.has("a")"#
    )]
    fn omits_empty_groups(#[case] input: &[(&str, SelectionMode)], #[case] expected: &str) {
        let selections: Vec<_> = input.iter().map(|&(key, mode)| sel(key, mode)).collect();
        assert_eq!(build_expression(&selections), expected);
    }

    #[test]
    fn synthesised_text_parses_and_evaluates() {
        let text = build_expression(&[
            sel("a", SelectionMode::MustHaveAll),
            sel("c", SelectionMode::AnyOf),
            sel("d", SelectionMode::Exclude),
        ]);
        let rule = Rule::parse(&text).unwrap_or_else(|err| panic!("parse `{text}`: {err}"));
        assert!(rule.matches(&["a", "c"].into()));
        assert!(!rule.matches(&["a", "c", "d"].into()));
        assert!(!rule.matches(&["a"].into()));
    }

    #[test]
    fn duplicate_keys_do_not_panic() {
        let text = build_expression(&[
            sel("a", SelectionMode::MustHaveAll),
            sel("a", SelectionMode::Exclude),
        ]);
        assert_eq!(text, r#"scope.hasAll(["a"]) && !scope.has("a")"#);
    }

    #[test]
    fn all_of_shortcut() {
        assert_eq!(build_all_of_expression(["a", "b"]), r#"scope.hasAll(["a","b"])"#);
        assert_eq!(build_all_of_expression(Vec::<String>::new()), "");
    }

    #[rstest]
    #[case(r#"scope.has("a") || scope.hasAll(["b", 'c', "a"])"#, &["a", "b", "c"])]
    #[case(r#"scope.hasAll(["a""#, &["a"])]
    #[case(r#"scope.hasAny([""]) && scope.has("z")"#, &["z"])]
    #[case("", &[])]
    fn extracts_keys_in_first_appearance_order(#[case] input: &str, #[case] expected: &[&str]) {
        assert_eq!(extract_tag_keys(input), expected);
    }

    #[test]
    fn extraction_round_trips_synthesis() {
        let selections = [
            sel("b", SelectionMode::AnyOf),
            sel("a", SelectionMode::MustHaveAll),
            sel("c", SelectionMode::Exclude),
            sel("a", SelectionMode::AnyOf),
        ];
        let mut keys = extract_tag_keys(&build_expression(&selections));
        keys.sort();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    #[test]
    fn toggle_cycles_through_modes_then_deselects() {
        let mut selections = SelectionSet::new();
        assert_eq!(selections.toggle("a"), Some(SelectionMode::MustHaveAll));
        assert_eq!(selections.toggle("a"), Some(SelectionMode::AnyOf));
        assert_eq!(selections.toggle("a"), Some(SelectionMode::Exclude));
        assert_eq!(selections.toggle("a"), None);
        assert!(selections.is_empty());
    }

    #[test]
    fn reselecting_keeps_original_position() {
        let mut selections = SelectionSet::new();
        selections.set("a", SelectionMode::Exclude);
        selections.set("b", SelectionMode::Exclude);
        assert_eq!(
            selections.set("a", SelectionMode::Exclude),
            Some(SelectionMode::Exclude)
        );
        let keys: Vec<_> = selections.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(selections.remove("a"), Some(SelectionMode::Exclude));
        assert_eq!(selections.len(), 1);
    }

    #[test]
    fn collecting_applies_last_wins() {
        let selections: SelectionSet = [
            sel("a", SelectionMode::MustHaveAll),
            sel("b", SelectionMode::AnyOf),
            sel("a", SelectionMode::Exclude),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            selections.to_expression(),
            r#"scope.hasAny(["b"]) && !scope.has("a")"#
        );
        assert_eq!(selections.as_slice().len(), 2);
    }

    #[rstest]
    #[case("must_have_all", SelectionMode::MustHaveAll)]
    #[case("ALL", SelectionMode::MustHaveAll)]
    #[case("any_of", SelectionMode::AnyOf)]
    #[case(" any ", SelectionMode::AnyOf)]
    #[case("exclude", SelectionMode::Exclude)]
    fn parses_mode_names(#[case] input: &str, #[case] expected: SelectionMode) {
        assert_eq!(input.parse(), Ok(expected));
    }

    #[test]
    fn rejects_unknown_mode_names() {
        let err = "sometimes".parse::<SelectionMode>().err();
        assert_eq!(err, Some(SelectionModeError("sometimes".into())));
    }

    #[test]
    fn modes_round_trip_through_serde() -> Result<(), serde_json::Error> {
        let json = serde_json::to_string(&sel("a", SelectionMode::MustHaveAll))?;
        assert_eq!(json, r#"{"key":"a","mode":"must_have_all"}"#);
        let parsed: TagSelection = serde_json::from_str(r#"{"key":"b","mode":"any_of"}"#)?;
        assert_eq!(parsed, sel("b", SelectionMode::AnyOf));
        assert!(serde_json::from_str::<TagSelection>(r#"{"key":"c","mode":"maybe"}"#).is_err());
        Ok(())
    }
}
