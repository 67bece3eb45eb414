//! Filtering logic
//!
//! `filter` is a pure linear scan over a cache slot, re-run from scratch on
//! every keystroke or selection change. It returns indices into the slot in
//! cache order, so the result is always a subset of the cache.

use crate::types::*;

/// A record that can be searched by text and narrowed by one category
pub trait Filterable {
    /// Text fields matched case-insensitively against the search term
    fn search_fields(&self) -> Vec<&str>;
    /// Value compared for exact equality against the category filter
    fn category(&self) -> &str;
}

impl Filterable for Donor {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.contact.as_str(), self.location.as_str()]
    }
    fn category(&self) -> &str {
        self.blood_group.as_str()
    }
}

impl Filterable for Patient {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.contact.as_str(), self.location.as_str()]
    }
    fn category(&self) -> &str {
        self.blood_group.as_str()
    }
}

impl Filterable for InventoryUnit {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.blood_group.as_str()]
    }
    fn category(&self) -> &str {
        self.blood_group.as_str()
    }
}

impl Filterable for BloodRequest {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.patient_name.as_str(), self.blood_group.as_str()]
    }
    fn category(&self) -> &str {
        self.status.as_str()
    }
}

impl Filterable for DonationRecord {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.donor_name.as_str(), self.blood_group.as_str()]
    }
    fn category(&self) -> &str {
        self.blood_group.as_str()
    }
}

/// Current search box and category select for one section
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub search: String,
    /// Empty means "all"
    pub category: String,
}

impl FilterCriteria {
    pub fn is_empty(&self) -> bool {
        self.search.is_empty() && self.category.is_empty()
    }
}

/// Indices of records matching both the search text and the category
pub fn filter<T: Filterable>(records: &[T], criteria: &FilterCriteria) -> Vec<usize> {
    let needle = criteria.search.to_lowercase();
    let category = criteria.category.as_str();

    records
        .iter()
        .enumerate()
        .filter(|(_, r)| {
            let matches_search = needle.is_empty()
                || r
                    .search_fields()
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle));
            let matches_category = category.is_empty() || r.category() == category;
            matches_search && matches_category
        })
        .map(|(i, _)| i)
        .collect()
}

/// Options offered by a section's category select, in display order
pub fn category_options(kind: EntityKind) -> Vec<&'static str> {
    match kind {
        EntityKind::Requests => RequestStatus::ALL.iter().map(|s| s.as_str()).collect(),
        _ => BloodGroup::ALL.iter().map(|g| g.as_str()).collect(),
    }
}

/// Label for the "match all" entry of a section's category select
pub fn category_placeholder(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Requests => "All Statuses",
        _ => "All Blood Groups",
    }
}

/// Hint text for a section's search box
pub fn search_hint(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Donors | EntityKind::Patients => "Search name / contact / location...",
        EntityKind::Inventory => "Search blood group...",
        EntityKind::Requests => "Search patient / blood group...",
        EntityKind::Donations => "Search donor / blood group...",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    impl FilterCriteria {
        fn new(search: &str, category: &str) -> Self {
            Self {
                search: search.into(),
                category: category.into(),
            }
        }
    }

    fn donor(id: i64, name: &str, group: BloodGroup, contact: &str, location: &str) -> Donor {
        Donor {
            id,
            name: name.into(),
            age: 30,
            gender: Gender::Female,
            blood_group: group,
            contact: contact.into(),
            location: location.into(),
            last_donation_date: None,
            created_at: None,
        }
    }

    fn sample() -> Vec<Donor> {
        vec![
            donor(1, "Alice", BloodGroup::OPos, "555", "X"),
            donor(2, "bob marley", BloodGroup::APos, "777-1000", "Kingston"),
            donor(3, "Carol", BloodGroup::OPos, "555-2000", "north side"),
        ]
    }

    #[test]
    fn test_empty_criteria_is_identity() {
        let cache = sample();
        let all = filter(&cache, &FilterCriteria::default());
        assert_eq!(all, vec![0, 1, 2]);
    }

    #[test]
    fn test_result_is_subset_in_cache_order() {
        let cache = sample();
        for (search, cat) in [("o", ""), ("555", "O+"), ("zzz", ""), ("", "A+"), ("a", "B-")] {
            let idx = filter(&cache, &FilterCriteria::new(search, cat));
            assert!(idx.windows(2).all(|w| w[0] < w[1]));
            assert!(idx.iter().all(|&i| i < cache.len()));
        }
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let cache = sample();
        let lower = filter(&cache, &FilterCriteria::new("marley", ""));
        let upper = filter(&cache, &FilterCriteria::new("MARLEY", ""));
        assert_eq!(lower, vec![1]);
        assert_eq!(lower, upper);

        let location = filter(&cache, &FilterCriteria::new("NORTH", ""));
        assert_eq!(location, vec![2]);
    }

    #[test]
    fn test_single_record_scenarios() {
        let cache = vec![donor(1, "Alice", BloodGroup::OPos, "555", "X")];
        assert_eq!(filter(&cache, &FilterCriteria::new("ali", "")), vec![0]);
        assert!(filter(&cache, &FilterCriteria::new("", "A+")).is_empty());
    }

    #[test]
    fn test_search_and_category_are_conjunctive() {
        let cache = sample();
        assert_eq!(filter(&cache, &FilterCriteria::new("555", "O+")), vec![0, 2]);
        assert!(filter(&cache, &FilterCriteria::new("555", "A+")).is_empty());
        assert_eq!(filter(&cache, &FilterCriteria::new("", "O+")), vec![0, 2]);
    }

    #[test]
    fn test_search_keeps_surrounding_whitespace() {
        let cache = vec![
            donor(1, "Ann Lee", BloodGroup::APos, "100", "Y"),
            donor(2, "Annabel", BloodGroup::APos, "200", "Z"),
        ];
        assert_eq!(filter(&cache, &FilterCriteria::new("ann ", "")), vec![0]);
        assert_eq!(filter(&cache, &FilterCriteria::new(" ", "")), vec![0]);
        assert!(!FilterCriteria::new(" ", "").is_empty());
    }

    #[test]
    fn test_requests_filter_by_status() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let req = |id, name: &str, status| BloodRequest {
            id,
            patient_id: id,
            patient_name: name.into(),
            blood_group: BloodGroup::AbNeg,
            units_requested: 2,
            date,
            status,
            priority: Priority::High,
            created_at: None,
        };
        let cache = vec![
            req(1, "Dana", RequestStatus::Pending),
            req(2, "Eli", RequestStatus::Fulfilled),
        ];
        assert_eq!(filter(&cache, &FilterCriteria::new("", "Fulfilled")), vec![1]);
        assert_eq!(filter(&cache, &FilterCriteria::new("ab-", "")), vec![0, 1]);
    }

    #[test]
    fn test_category_options() {
        assert_eq!(category_options(EntityKind::Donors).len(), 8);
        assert_eq!(
            category_options(EntityKind::Requests),
            vec!["Pending", "Approved", "Fulfilled", "Rejected"]
        );
    }
}
