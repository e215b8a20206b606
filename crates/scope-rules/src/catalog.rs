//! The tag catalog: the vocabulary rules are written against.
//!
//! The engine never consults the catalog; keys are opaque strings to it. The
//! catalog exists for presentation (labels) and for analytics grouped by
//! [`TagKind`].

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{CatalogError, TagKindError};

/// Broad category a tag belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagKind {
    /// Habitats and biomes.
    Ecosystem,
    /// Interventions and techniques.
    Method,
    /// Data collection and publication.
    Data,
    /// Decision making and stewardship.
    Governance,
    /// Measured results.
    Outcomes,
}

impl TagKind {
    /// Every kind, in display order.
    pub const ALL: [Self; 5] = [
        Self::Ecosystem,
        Self::Method,
        Self::Data,
        Self::Governance,
        Self::Outcomes,
    ];

    /// Canonical lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ecosystem => "ecosystem",
            Self::Method => "method",
            Self::Data => "data",
            Self::Governance => "governance",
            Self::Outcomes => "outcomes",
        }
    }
}

impl fmt::Display for TagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TagKind {
    type Err = TagKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| TagKindError(s.to_string()))
    }
}

/// Lifecycle state of a catalog entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagStatus {
    /// In current use.
    #[default]
    Active,
    /// Kept for old records; see [`CatalogEntry::superseded_by`].
    Deprecated,
}

/// One tag in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    /// Machine-readable slug, e.g. `mangrove_restoration`.
    pub key: String,
    /// Human-readable name.
    pub label: String,
    /// Category.
    pub kind: TagKind,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Key of the parent tag in the taxonomy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Lifecycle state.
    #[serde(default)]
    pub status: TagStatus,
    /// Key of the replacement for a deprecated tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub superseded_by: Option<String>,
}

impl CatalogEntry {
    /// An active entry with no description or taxonomy links.
    pub fn new(key: impl Into<String>, label: impl Into<String>, kind: TagKind) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            kind,
            description: String::new(),
            parent: None,
            status: TagStatus::Active,
            superseded_by: None,
        }
    }
}

/// A key-unique, order-preserving collection of [`CatalogEntry`] values.
///
/// Deserialises from a JSON array of entries and rejects duplicate keys.
///
/// # Examples
/// ```
/// use scope_rules::{Catalog, CatalogEntry, TagKind};
/// let catalog = Catalog::new(vec![
///     CatalogEntry::new("mangrove", "Mangrove", TagKind::Ecosystem),
/// ])?;
/// assert_eq!(catalog.label_for("mangrove"), "Mangrove");
/// assert_eq!(catalog.label_for("unknown"), "unknown");
/// # Ok::<(), scope_rules::CatalogError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CatalogEntry>", into = "Vec<CatalogEntry>")]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
    by_key: HashMap<String, usize>,
}

impl Catalog {
    /// Index `entries` by key.
    ///
    /// # Errors
    /// Returns [`CatalogError::DuplicateKey`] for the first repeated key.
    pub fn new(entries: Vec<CatalogEntry>) -> Result<Self, CatalogError> {
        let mut by_key = HashMap::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            if by_key.insert(entry.key.clone(), index).is_some() {
                return Err(CatalogError::DuplicateKey {
                    key: entry.key.clone(),
                });
            }
        }
        Ok(Self { entries, by_key })
    }

    /// The entry for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&CatalogEntry> {
        self.by_key
            .get(key)
            .and_then(|&index| self.entries.get(index))
    }

    /// The label for `key`, or the key itself when it is not catalogued.
    #[must_use]
    pub fn label_for<'a>(&'a self, key: &'a str) -> &'a str {
        self.get(key).map_or(key, |entry| entry.label.as_str())
    }

    /// Entries of `kind`, in catalog order.
    pub fn of_kind(&self, kind: TagKind) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter().filter(move |entry| entry.kind == kind)
    }

    /// All entries, in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TryFrom<Vec<CatalogEntry>> for Catalog {
    type Error = CatalogError;

    fn try_from(entries: Vec<CatalogEntry>) -> Result<Self, Self::Error> {
        Self::new(entries)
    }
}

impl From<Catalog> for Vec<CatalogEntry> {
    fn from(catalog: Catalog) -> Self {
        catalog.entries
    }
}
