//! Session-local identifier registries for discovered images and saved AOIs

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Stable opaque identifier of a provider image.
///
/// The provider emits identifiers as JSON numbers in some endpoints and as
/// strings in others; both deserialize into the same newtype so identity
/// comparisons work across search types.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ImageId(String);

impl ImageId {
    /// Create an identifier from its string form
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }

    /// The identifier's string form
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ImageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ImageId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for ImageId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl<'de> Deserialize<'de> for ImageId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        string_or_number(deserializer).map(Self)
    }
}

/// Stable opaque identifier of a saved area of interest
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct AoiId(String);

impl AoiId {
    /// Create an identifier from its string form
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }

    /// The identifier's string form
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AoiId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for AoiId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for AoiId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl<'de> Deserialize<'de> for AoiId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        string_or_number(deserializer).map(Self)
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n.to_string()),
        Raw::Text(s) => Ok(s),
    }
}

/// In-memory deduplicated working set of image identifiers for one session.
///
/// Searches merge their results here; overlapping searches never produce
/// duplicate entries, so downstream download work is issued at most once per
/// image. The catalog lives and dies with the session and is never persisted.
#[derive(Debug, Clone, Default)]
pub struct ImageCatalog {
    ids: HashSet<ImageId>,
}

impl ImageCatalog {
    /// Create an empty catalog
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an identifier; returns `false` when it was already present
    pub fn add(&mut self, id: ImageId) -> bool {
        self.ids.insert(id)
    }

    /// Insert every identifier, returning only the ones that were new, in
    /// input order
    pub fn merge<I>(&mut self, ids: I) -> Vec<ImageId>
    where
        I: IntoIterator<Item = ImageId>,
    {
        ids.into_iter()
            .filter(|id| self.ids.insert(id.clone()))
            .collect()
    }

    /// Number of distinct identifiers currently catalogued
    #[must_use]
    pub fn size(&self) -> usize {
        self.ids.len()
    }

    /// Whether the catalog holds no identifiers
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Membership test
    #[must_use]
    pub fn contains(&self, id: &ImageId) -> bool {
        self.ids.contains(id)
    }

    /// Empty the catalog for a fresh search session
    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Sorted snapshot of the current membership
    #[must_use]
    pub fn ids(&self) -> Vec<ImageId> {
        let mut ids: Vec<ImageId> = self.ids.iter().cloned().collect();
        ids.sort();
        ids
    }

    /// Iterate the membership in arbitrary order
    pub fn iter(&self) -> impl Iterator<Item = &ImageId> {
        self.ids.iter()
    }
}

/// Session-local registry of AOIs created or fetched through the provider
#[derive(Debug, Clone, Default)]
pub struct AoiRegistry {
    ids: HashSet<AoiId>,
}

impl AoiRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an identifier; returns `false` when it was already present
    pub fn add(&mut self, id: AoiId) -> bool {
        self.ids.insert(id)
    }

    /// Swap a superseded identifier for the one a successful update returned
    pub fn replace(&mut self, old: &AoiId, new: AoiId) {
        self.ids.remove(old);
        self.ids.insert(new);
    }

    /// Number of distinct identifiers currently registered
    #[must_use]
    pub fn size(&self) -> usize {
        self.ids.len()
    }

    /// Membership test
    #[must_use]
    pub fn contains(&self, id: &AoiId) -> bool {
        self.ids.contains(id)
    }

    /// Empty the registry
    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Sorted snapshot of the current membership
    #[must_use]
    pub fn ids(&self) -> Vec<AoiId> {
        let mut ids: Vec<AoiId> = self.ids.iter().cloned().collect();
        ids.sort();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_deduplicates() {
        let mut catalog = ImageCatalog::new();
        assert!(catalog.add(ImageId::new("100")));
        assert!(!catalog.add(ImageId::new("100")));
        assert_eq!(catalog.size(), 1);
        assert!(catalog.contains(&ImageId::new("100")));
    }

    #[test]
    fn test_overlapping_merges_keep_distinct_cardinality() {
        let mut catalog = ImageCatalog::new();
        let first = catalog.merge(vec![
            ImageId::new("1"),
            ImageId::new("2"),
            ImageId::new("3"),
        ]);
        assert_eq!(first.len(), 3);

        let second = catalog.merge(vec![
            ImageId::new("2"),
            ImageId::new("3"),
            ImageId::new("4"),
        ]);
        assert_eq!(second, vec![ImageId::new("4")]);
        assert_eq!(catalog.size(), 4);
    }

    #[test]
    fn test_merge_reports_delta_in_input_order() {
        let mut catalog = ImageCatalog::new();
        catalog.add(ImageId::new("b"));
        let added = catalog.merge(vec![
            ImageId::new("c"),
            ImageId::new("b"),
            ImageId::new("a"),
        ]);
        assert_eq!(added, vec![ImageId::new("c"), ImageId::new("a")]);
    }

    #[test]
    fn test_clear_resets_session() {
        let mut catalog = ImageCatalog::new();
        catalog.add(ImageId::new("1"));
        catalog.add(ImageId::new("2"));
        catalog.clear();
        assert!(catalog.is_empty());
        assert_eq!(catalog.size(), 0);
    }

    #[test]
    fn test_sorted_snapshot() {
        let mut catalog = ImageCatalog::new();
        catalog.add(ImageId::new("30"));
        catalog.add(ImageId::new("10"));
        catalog.add(ImageId::new("20"));
        assert_eq!(
            catalog.ids(),
            vec![ImageId::new("10"), ImageId::new("20"), ImageId::new("30")]
        );
    }

    #[test]
    fn test_image_id_deserializes_from_number_or_string() {
        let from_number: ImageId = serde_json::from_str("48152").unwrap();
        let from_string: ImageId = serde_json::from_str("\"48152\"").unwrap();
        assert_eq!(from_number, from_string);
        assert_eq!(from_number.as_str(), "48152");
    }

    #[test]
    fn test_aoi_registry_replace_swaps_identifier() {
        let mut registry = AoiRegistry::new();
        registry.add(AoiId::new("7"));
        registry.replace(&AoiId::new("7"), AoiId::new("8"));
        assert!(!registry.contains(&AoiId::new("7")));
        assert!(registry.contains(&AoiId::new("8")));
        assert_eq!(registry.size(), 1);
    }

    #[test]
    fn test_aoi_id_deserializes_from_number_or_string() {
        let from_number: AoiId = serde_json::from_str("7").unwrap();
        assert_eq!(from_number.as_str(), "7");
    }
}
