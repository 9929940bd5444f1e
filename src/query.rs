//! Shared pieces of the query engine: pagination, case-insensitive matching, sorting.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

pub const DEFAULT_LIMIT: i64 = 10;

/// One page of a filtered collection.
///
/// `total` counts every match before pagination so callers can tell whether more pages remain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
}

impl<T> Page<T> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
        }
    }
}

/// Raw pagination arguments as supplied by the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct PageRequest {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PageRequest {
    pub fn new(limit: Option<i64>, offset: Option<i64>) -> Self {
        Self { limit, offset }
    }
}

/// Slice `items[offset..offset + limit]`.
///
/// `offset` defaults to 0 and is clamped to be non-negative, `limit` defaults to
/// [`DEFAULT_LIMIT`]. Running past the end yields a short page, never an error.
/// A negative `limit` is clamped to 0 and yields an empty page, not a count from the end.
pub fn paginate<T>(items: Vec<T>, page: PageRequest) -> Page<T> {
    let total = items.len();
    let offset = page.offset.unwrap_or(0).max(0);
    let limit = page.limit.unwrap_or(DEFAULT_LIMIT).max(0);

    let items = items
        .into_iter()
        .skip(usize::try_from(offset).unwrap_or(usize::MAX))
        .take(usize::try_from(limit).unwrap_or(usize::MAX))
        .collect();

    Page { items, total }
}

/// Case-insensitive substring test.
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Treat an empty filter string the same as an absent one.
pub fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Order `items` by `key` in `direction`.
///
/// Unstable: entities with equal keys keep no particular relative order.
pub fn sort_by_key<T, K, F>(items: &mut [T], direction: SortDirection, key: F)
where
    K: Ord,
    F: Fn(&T) -> K,
{
    items.sort_unstable_by(|a, b| {
        let ordering: Ordering = key(a).cmp(&key(b));
        match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paginate_defaults() {
        let page = paginate((0..25).collect::<Vec<_>>(), PageRequest::default());
        assert_eq!(page.items, (0..10).collect::<Vec<_>>());
        assert_eq!(page.total, 25);
    }

    #[test]
    fn paginate_clamps_negative_offset() {
        let page = paginate(vec![1, 2, 3], PageRequest::new(Some(2), Some(-5)));
        assert_eq!(page.items, vec![1, 2]);
        assert_eq!(page.total, 3);
    }

    #[test]
    fn paginate_past_end_is_short_not_error() {
        let page = paginate(vec![1, 2, 3], PageRequest::new(Some(10), Some(2)));
        assert_eq!(page.items, vec![3]);

        let page = paginate(vec![1, 2, 3], PageRequest::new(Some(10), Some(7)));
        assert!(page.items.is_empty());
        assert_eq!(page.total, 3);
    }

    #[test]
    fn paginate_negative_limit_is_empty() {
        let page = paginate(vec![1, 2, 3], PageRequest::new(Some(-1), None));
        assert!(page.items.is_empty());
        assert_eq!(page.total, 3);
    }

    #[test]
    fn page_never_exceeds_limit() {
        for len in 0..15usize {
            for limit in 0..6i64 {
                for offset in -2..18i64 {
                    let page = paginate(vec![(); len], PageRequest::new(Some(limit), Some(offset)));
                    assert!(page.items.len() <= limit as usize);
                    assert_eq!(page.total, len);
                }
            }
        }
    }

    #[test]
    fn contains_ignores_case() {
        assert!(contains_ci("Pride and Prejudice", "PREJ"));
        assert!(!contains_ci("Emma", "emmy"));
    }

    #[test]
    fn empty_filter_string_is_absent() {
        assert_eq!(non_empty(&Some(String::new())), None);
        assert_eq!(non_empty(&Some("x".into())), Some("x"));
        assert_eq!(non_empty(&None), None);
    }

    #[test]
    fn sort_both_directions() {
        let mut values = vec!["b", "c", "a"];
        sort_by_key(&mut values, SortDirection::Asc, |v| *v);
        assert_eq!(values, vec!["a", "b", "c"]);
        sort_by_key(&mut values, SortDirection::Desc, |v| *v);
        assert_eq!(values, vec!["c", "b", "a"]);
    }
}
