//! Activity records and the aggregate queries run over them.

use std::cmp::Reverse;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, TagKind};
use crate::expr::Rule;
use crate::tags::TagSet;

/// A unit of work described by its tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    /// Display title.
    pub title: String,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Tag keys attached to the activity.
    #[serde(default)]
    pub tag_keys: Vec<String>,
}

impl Activity {
    /// An activity with no description.
    pub fn new<I, S>(title: impl Into<String>, tag_keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            title: title.into(),
            description: String::new(),
            tag_keys: tag_keys.into_iter().map(Into::into).collect(),
        }
    }

    /// The activity's keys as a [`TagSet`].
    #[must_use]
    pub fn tag_set(&self) -> TagSet<'_> {
        TagSet::from_keys(&self.tag_keys)
    }
}

/// Split `activities` into those `rule` matches and the rest.
///
/// Both halves keep input order.
#[must_use]
pub fn partition_matches<'a>(
    rule: &Rule,
    activities: &'a [Activity],
) -> (Vec<&'a Activity>, Vec<&'a Activity>) {
    activities
        .iter()
        .partition(|activity| rule.matches(&activity.tag_set()))
}

/// Number of `activities` that `rule` matches.
#[must_use]
pub fn count_matches(rule: &Rule, activities: &[Activity]) -> usize {
    activities
        .iter()
        .filter(|activity| rule.matches(&activity.tag_set()))
        .count()
}

/// How many activities carry each key, most common first.
///
/// A key listed twice on one activity counts once. Ties keep the order in
/// which keys first appear.
///
/// # Examples
/// ```
/// use scope_rules::{Activity, tag_frequency};
/// let activities = [
///     Activity::new("one", ["b", "a"]),
///     Activity::new("two", ["a"]),
/// ];
/// let ranked = tag_frequency(&activities);
/// assert_eq!(ranked, vec![("a".to_string(), 2), ("b".to_string(), 1)]);
/// ```
#[must_use]
pub fn tag_frequency(activities: &[Activity]) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for activity in activities {
        let mut seen: Vec<&str> = Vec::new();
        for key in &activity.tag_keys {
            if seen.contains(&key.as_str()) {
                continue;
            }
            seen.push(key);
            let slot = *index.entry(key.as_str()).or_insert_with(|| {
                counts.push((key.clone(), 0));
                counts.len() - 1
            });
            if let Some((_, count)) = counts.get_mut(slot) {
                *count += 1;
            }
        }
    }
    counts.sort_by_key(|&(_, count)| Reverse(count));
    counts
}

/// For each [`TagKind`], how many activities carry at least one tag of it.
///
/// Keys missing from `catalog` belong to no kind.
#[must_use]
pub fn kind_distribution(catalog: &Catalog, activities: &[Activity]) -> Vec<(TagKind, usize)> {
    TagKind::ALL
        .into_iter()
        .map(|kind| {
            let count = activities
                .iter()
                .filter(|activity| {
                    activity
                        .tag_keys
                        .iter()
                        .any(|key| catalog.get(key).is_some_and(|entry| entry.kind == kind))
                })
                .count();
            (kind, count)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::*;
    use crate::catalog::CatalogEntry;

    #[fixture]
    fn activities() -> Vec<Activity> {
        vec![
            Activity::new("Mangrove planting", ["mangrove", "planting"]),
            Activity::new("Reef survey", ["reef", "open_data"]),
            Activity::new("Mangrove census", ["mangrove", "open_data", "mangrove"]),
            Activity::new("Untagged", Vec::<String>::new()),
        ]
    }

    fn rule(text: &str) -> Rule {
        Rule::parse(text).unwrap_or_else(|err| panic!("parse `{text}`: {err}"))
    }

    fn titles<'a>(list: &[&'a Activity]) -> Vec<&'a str> {
        list.iter().map(|activity| activity.title.as_str()).collect()
    }

    #[rstest]
    fn partitions_in_input_order(activities: Vec<Activity>) {
        let (matched, rest) = partition_matches(&rule(r#"scope.has("mangrove")"#), &activities);
        assert_eq!(titles(&matched), vec!["Mangrove planting", "Mangrove census"]);
        assert_eq!(titles(&rest), vec!["Reef survey", "Untagged"]);
    }

    #[rstest]
    #[case(r#"scope.has("open_data")"#, 2)]
    #[case(r#"!scope.has("mangrove")"#, 2)]
    #[case(r#"scope.hasAll([])"#, 4)]
    #[case(r#"scope.hasAny(["kelp"])"#, 0)]
    fn counts_matches(activities: Vec<Activity>, #[case] text: &str, #[case] expected: usize) {
        assert_eq!(count_matches(&rule(text), &activities), expected);
    }

    #[rstest]
    fn ranks_tags_by_frequency(activities: Vec<Activity>) {
        let frequency = tag_frequency(&activities);
        assert_eq!(
            frequency,
            vec![
                ("mangrove".to_string(), 2),
                ("open_data".to_string(), 2),
                ("planting".to_string(), 1),
                ("reef".to_string(), 1),
            ]
        );
    }

    #[rstest]
    fn distributes_by_kind(activities: Vec<Activity>) {
        let catalog = Catalog::new(vec![
            CatalogEntry::new("mangrove", "Mangrove", TagKind::Ecosystem),
            CatalogEntry::new("reef", "Reef", TagKind::Ecosystem),
            CatalogEntry::new("open_data", "Open Data", TagKind::Data),
        ])
        .unwrap_or_else(|err| panic!("catalog: {err}"));
        assert_eq!(
            kind_distribution(&catalog, &activities),
            vec![
                (TagKind::Ecosystem, 3),
                (TagKind::Method, 0),
                (TagKind::Data, 2),
                (TagKind::Governance, 0),
                (TagKind::Outcomes, 0),
            ]
        );
    }

    #[test]
    fn reads_camel_case_json() -> Result<(), serde_json::Error> {
        let activity: Activity =
            serde_json::from_str(r#"{"title": "T", "tagKeys": ["a", "b"]}"#)?;
        assert!(activity.tag_set().contains("b"));
        assert!(activity.description.is_empty());
        Ok(())
    }
}
