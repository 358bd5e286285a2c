//! Merging provider detail records into entry availability.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::{DetailRecord, Entry};

/// Mark entries unavailable according to their detail records.
///
/// An entry becomes unavailable when its record reports a private or
/// rejected upload, or when `region` is excluded by the record's region
/// restriction. Entries without a record keep their fetched availability.
/// Returns the number of entries newly marked unavailable.
pub fn apply_details(entries: &mut [Entry], details: &[DetailRecord], region: Option<&str>) -> usize {
    let by_id: HashMap<&str, &DetailRecord> = details.iter().map(|d| (d.id.as_str(), d)).collect();
    let mut marked = 0;

    for entry in entries.iter_mut().filter(|e| e.is_available) {
        let Some(detail) = by_id.get(entry.id.as_str()) else {
            debug!("No detail record for {}", entry.id);
            continue;
        };

        if let Some(reason) = unavailability_reason(detail, region) {
            info!("Marking {} unavailable: {reason}", entry.label());
            entry.is_available = false;
            marked += 1;
        }
    }

    marked
}

fn unavailability_reason(detail: &DetailRecord, region: Option<&str>) -> Option<String> {
    if detail.privacy_status.as_deref() == Some("private") {
        return Some("private".to_string());
    }

    if matches!(
        detail.upload_status.as_deref(),
        Some("rejected" | "deleted" | "failed")
    ) {
        return detail.upload_status.as_ref().map(|s| format!("upload {s}"));
    }

    let region = region?;
    detail
        .region_restriction
        .as_ref()
        .filter(|r| r.excludes(region))
        .map(|_| format!("blocked in region {region}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RegionRestriction;

    fn entries() -> Vec<Entry> {
        vec![
            Entry::new("a", "pa", "A", 0),
            Entry::new("b", "pb", "B", 1),
            Entry::new("c", "pc", "C", 2),
        ]
    }

    #[test]
    fn test_region_rules() {
        let mut entries = entries();
        let details = vec![
            DetailRecord::new("a").with_restriction(RegionRestriction::allowed(["US"])),
            DetailRecord::new("b").with_restriction(RegionRestriction::blocked(["FR"])),
            DetailRecord::new("c").with_restriction(RegionRestriction::blocked(["DE"])),
        ];

        let marked = apply_details(&mut entries, &details, Some("FR"));

        assert_eq!(marked, 2);
        assert!(!entries[0].is_available);
        assert!(!entries[1].is_available);
        assert!(entries[2].is_available);
    }

    #[test]
    fn test_no_region_ignores_restrictions() {
        let mut entries = entries();
        let details =
            vec![DetailRecord::new("a").with_restriction(RegionRestriction::allowed(["US"]))];

        assert_eq!(apply_details(&mut entries, &details, None), 0);
        assert!(entries.iter().all(|e| e.is_available));
    }

    #[test]
    fn test_private_record() {
        let mut entries = entries();
        let mut detail = DetailRecord::new("c");
        detail.privacy_status = Some("private".into());

        assert_eq!(apply_details(&mut entries, &[detail], Some("FR")), 1);
        assert!(!entries[2].is_available);
    }

    #[test]
    fn test_missing_record_keeps_availability() {
        let mut entries = entries();
        entries[1].is_available = false;

        assert_eq!(apply_details(&mut entries, &[], Some("FR")), 0);
        assert!(entries[0].is_available);
        assert!(!entries[1].is_available);
    }
}
