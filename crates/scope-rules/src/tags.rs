//! The tag set a rule is evaluated against.
//!
//! A [`TagSet`] borrows the keys held by one activity record for the duration
//! of an evaluation. Order and duplicates in the source collection are
//! irrelevant; membership checks are hash lookups.

use std::collections::HashSet;

/// Unordered set of tag keys possessed by one activity.
///
/// # Examples
/// ```
/// use scope_rules::TagSet;
/// let owned = vec!["open_data".to_string(), "remote_sensing".to_string()];
/// let tags = TagSet::from_keys(&owned);
/// assert!(tags.contains("open_data"));
/// assert!(!tags.contains("community_led"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet<'a> {
    keys: HashSet<&'a str>,
}

impl<'a> TagSet<'a> {
    /// Create an empty tag set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Borrow every key from a collection of owned or borrowed strings.
    pub fn from_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = &'a S>,
        S: AsRef<str> + ?Sized + 'a,
    {
        keys.into_iter().map(<S as AsRef<str>>::as_ref).collect()
    }

    /// Add a key, returning `false` when it was already present.
    pub fn insert(&mut self, key: &'a str) -> bool {
        self.keys.insert(key)
    }

    /// Whether the set holds `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    /// Number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the set holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Iterate over the keys in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.keys.iter().copied()
    }
}

impl<'a> FromIterator<&'a str> for TagSet<'a> {
    fn from_iter<T: IntoIterator<Item = &'a str>>(iter: T) -> Self {
        Self {
            keys: iter.into_iter().collect(),
        }
    }
}

impl<'a> Extend<&'a str> for TagSet<'a> {
    fn extend<T: IntoIterator<Item = &'a str>>(&mut self, iter: T) {
        self.keys.extend(iter);
    }
}

impl<'a, const N: usize> From<[&'a str; N]> for TagSet<'a> {
    fn from(keys: [&'a str; N]) -> Self {
        keys.into_iter().collect()
    }
}
