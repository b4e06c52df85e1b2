//! Paginator: slices the ordered ID list into the requested window.

use serde::{Deserialize, Serialize};

/// IDs on the requested page plus the total match count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageWindow {
    pub ids: Vec<i64>,
    pub start: usize,
    pub total: usize,
}

impl PageWindow {
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Cut the window for a 1-based `page` of `limit` items.
///
/// A page past the end yields an empty window with the real total.
pub fn paginate(ids: &[i64], page: usize, limit: usize) -> PageWindow {
    let total = ids.len();
    let start = page.saturating_sub(1).saturating_mul(limit);
    if start >= total {
        return PageWindow {
            ids: Vec::new(),
            start,
            total,
        };
    }
    let end = start.saturating_add(limit).min(total);
    PageWindow {
        ids: ids[start..end].to_vec(),
        start,
        total,
    }
}

/// Response envelope for listings. `data` is always an array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub page: usize,
    pub limit: usize,
    pub total: usize,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, page: usize, limit: usize, total: usize) -> Self {
        Self {
            data,
            page,
            limit,
            total,
        }
    }

    pub fn empty(page: usize, limit: usize, total: usize) -> Self {
        Self::new(Vec::new(), page, limit, total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: i64) -> Vec<i64> {
        (1..=n).collect()
    }

    #[test]
    fn test_first_page() {
        let window = paginate(&ids(10), 1, 4);
        assert_eq!(window.ids, vec![1, 2, 3, 4]);
        assert_eq!(window.start, 0);
        assert_eq!(window.total, 10);
    }

    #[test]
    fn test_partial_last_page() {
        let window = paginate(&ids(10), 3, 4);
        assert_eq!(window.ids, vec![9, 10]);
        assert_eq!(window.total, 10);
    }

    #[test]
    fn test_beyond_last_page_keeps_total() {
        let window = paginate(&ids(10), 4, 4);
        assert!(window.is_empty());
        assert_eq!(window.total, 10);
    }

    #[test]
    fn test_empty_input() {
        let window = paginate(&[], 1, 24);
        assert!(window.is_empty());
        assert_eq!(window.total, 0);
    }

    #[test]
    fn test_page_zero_treated_as_first() {
        assert_eq!(paginate(&ids(3), 0, 2).ids, vec![1, 2]);
    }

    #[test]
    fn test_huge_page_does_not_overflow() {
        let window = paginate(&ids(3), usize::MAX, usize::MAX);
        assert!(window.is_empty());
        assert_eq!(window.total, 3);
    }

    #[test]
    fn test_empty_envelope_serializes_array() {
        let page: Paginated<i64> = Paginated::empty(2, 24, 5);
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["data"], serde_json::json!([]));
        assert_eq!(json["total"], 5);
    }
}
