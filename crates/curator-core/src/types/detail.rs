//! Item detail records and collection metadata.

use serde::{Deserialize, Serialize};

/// Availability metadata for one media item.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DetailRecord {
    /// Media item ID.
    pub id: String,
    /// Provider privacy status (`public`, `unlisted`, `private`).
    pub privacy_status: Option<String>,
    /// Provider upload status (`processed`, `rejected`, ...).
    pub upload_status: Option<String>,
    /// Geographic playback restriction.
    pub region_restriction: Option<RegionRestriction>,
}

impl DetailRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_restriction(mut self, restriction: RegionRestriction) -> Self {
        self.region_restriction = Some(restriction);
        self
    }
}

/// Allow-list and/or block-list of region codes.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegionRestriction {
    pub allowed: Option<Vec<String>>,
    pub blocked: Option<Vec<String>>,
}

impl RegionRestriction {
    pub fn allowed<I, S>(regions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: Some(regions.into_iter().map(Into::into).collect()),
            blocked: None,
        }
    }

    pub fn blocked<I, S>(regions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: None,
            blocked: Some(regions.into_iter().map(Into::into).collect()),
        }
    }

    /// Whether playback is excluded in `region`.
    pub fn excludes(&self, region: &str) -> bool {
        let contains = |list: &[String]| list.iter().any(|r| r.eq_ignore_ascii_case(region));

        let not_allowed = self.allowed.as_deref().is_some_and(|list| !contains(list));
        let blocked = self.blocked.as_deref().is_some_and(contains);
        not_allowed || blocked
    }
}

/// Metadata about the collection itself.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CollectionInfo {
    pub id: String,
    pub title: String,
    pub description: String,
    pub channel_id: Option<String>,
    pub channel_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allow_list() {
        let restriction = RegionRestriction::allowed(["US", "CA"]);
        assert!(restriction.excludes("FR"));
        assert!(!restriction.excludes("US"));
    }

    #[test]
    fn test_block_list() {
        let restriction = RegionRestriction::blocked(["FR"]);
        assert!(restriction.excludes("FR"));
        assert!(restriction.excludes("fr"));
        assert!(!restriction.excludes("DE"));
    }

    #[test]
    fn test_both_lists() {
        let restriction = RegionRestriction {
            allowed: Some(vec!["FR".into(), "DE".into()]),
            blocked: Some(vec!["DE".into()]),
        };
        assert!(!restriction.excludes("FR"));
        assert!(restriction.excludes("DE"));
        assert!(restriction.excludes("US"));
    }

    #[test]
    fn test_empty_restriction() {
        assert!(!RegionRestriction::default().excludes("FR"));
    }
}
