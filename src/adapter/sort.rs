// ============================================================================
// src/adapter/sort.rs - Client-side ordering of a fetched page
// ============================================================================
//
// - Fields are compared after numeric normalization (plain numbers, numeric
//   strings, wrapped export numbers; anything else counts as 0)
// - Stable: ties keep their original relative order
// - Never mutates the input page
//
// ============================================================================

use crate::core::value::compare_numeric;
use crate::core::{Record, SortCriterion};
use std::cmp::Ordering;

// ============================================================================
// SORT KEY
// ============================================================================

/// One numeric field to order by
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub descending: bool,
}

impl SortKey {
    pub fn new(field: impl Into<String>, descending: bool) -> Self {
        Self {
            field: field.into(),
            descending,
        }
    }
}

impl From<SortCriterion> for SortKey {
    fn from(criterion: SortCriterion) -> Self {
        Self::new(criterion.field(), criterion.is_descending())
    }
}

// ============================================================================
// RECORD COMPARATOR
// ============================================================================

/// Compares records key by key, falling through to the next key on ties
pub struct RecordComparator<'a> {
    keys: &'a [SortKey],
}

impl<'a> RecordComparator<'a> {
    pub fn new(keys: &'a [SortKey]) -> Self {
        Self { keys }
    }

    pub fn compare(&self, a: &Record, b: &Record) -> Ordering {
        for key in self.keys {
            let ordering = compare_numeric(a.number(&key.field), b.number(&key.field));
            let ordering = if key.descending { ordering.reverse() } else { ordering };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }
}

/// Order `items` by a sort criterion. `None` returns the page as received.
pub fn sort_records(items: &[Record], criterion: Option<SortCriterion>) -> Vec<Record> {
    match criterion {
        Some(criterion) => sort_by_keys(items, &[SortKey::from(criterion)]),
        None => items.to_vec(),
    }
}

/// Order `items` by several keys
pub fn sort_by_keys(items: &[Record], keys: &[SortKey]) -> Vec<Record> {
    let mut sorted = items.to_vec();
    if sorted.len() < 2 || keys.is_empty() {
        return sorted;
    }

    let comparator = RecordComparator::new(keys);
    // sort_by is stable
    sorted.sort_by(|a, b| comparator.compare(a, b));
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> Record {
        Record::from_value(value).unwrap()
    }

    fn ids(items: &[Record]) -> Vec<String> {
        items.iter().filter_map(Record::id).collect()
    }

    #[test]
    fn test_sort_key_from_criterion() {
        assert_eq!(SortKey::from(SortCriterion::PriceDesc), SortKey::new("price", true));
        assert_eq!(SortKey::from(SortCriterion::DurationAsc), SortKey::new("duration", false));
    }

    #[test]
    fn test_none_keeps_order() {
        let items = vec![record(json!({"_id": "b", "price": 2})), record(json!({"_id": "a", "price": 1}))];
        assert_eq!(ids(&sort_records(&items, None)), vec!["b", "a"]);
    }

    #[test]
    fn test_input_untouched() {
        let items = vec![record(json!({"_id": "b", "price": 2})), record(json!({"_id": "a", "price": 1}))];
        let before = items.clone();
        let sorted = sort_records(&items, Some(SortCriterion::PriceAsc));
        assert_eq!(items, before);
        assert_eq!(ids(&sorted), vec!["a", "b"]);
    }

    #[test]
    fn test_multi_key_fallthrough() {
        let items = vec![
            record(json!({"_id": "a", "price": 100, "duration": 3})),
            record(json!({"_id": "b", "price": 100, "duration": 1})),
            record(json!({"_id": "c", "price": 50, "duration": 9})),
        ];
        let keys = [SortKey::new("price", false), SortKey::new("duration", true)];
        assert_eq!(ids(&sort_by_keys(&items, &keys)), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_descending_is_stable() {
        let items = vec![
            record(json!({"_id": "a", "price": 10})),
            record(json!({"_id": "b", "price": 10})),
            record(json!({"_id": "c", "price": 20})),
        ];
        let sorted = sort_records(&items, Some(SortCriterion::PriceDesc));
        assert_eq!(ids(&sorted), vec!["c", "a", "b"]);
    }
}
