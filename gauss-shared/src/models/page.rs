/// Offset pagination envelope
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub current_page: i64,
    pub per_page: i64,
    pub total: i64,
    pub last_page: i64,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, current_page: i64, per_page: i64, total: i64) -> Self {
        Self {
            data,
            current_page,
            per_page,
            total,
            last_page: last_page(total, per_page),
        }
    }
}

/// Number of the last page; an empty result still has page 1
pub fn last_page(total: i64, per_page: i64) -> i64 {
    if per_page <= 0 || total <= 0 {
        return 1;
    }
    (total + per_page - 1) / per_page
}

/// Row offset for a 1-based page number, saturating at `i64::MAX`
pub fn offset(page: i64, per_page: i64) -> i64 {
    (page.max(1) - 1).saturating_mul(per_page.max(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_page() {
        assert_eq!(last_page(0, 12), 1);
        assert_eq!(last_page(12, 12), 1);
        assert_eq!(last_page(13, 12), 2);
        assert_eq!(last_page(25, 12), 3);
    }

    #[test]
    fn test_offset_clamps_page() {
        assert_eq!(offset(1, 12), 0);
        assert_eq!(offset(3, 12), 24);
        assert_eq!(offset(0, 12), 0);
        assert_eq!(offset(-4, 12), 0);
    }

    #[test]
    fn test_offset_saturates_on_huge_page() {
        assert_eq!(offset(i64::MAX, 12), i64::MAX);
        assert_eq!(offset(i64::MAX / 12 + 2, 12), i64::MAX);
        assert_eq!(offset(i64::MAX, 0), 0);
    }

    #[test]
    fn test_page_envelope() {
        let page = Page::new(vec![1, 2, 3], 2, 3, 7);
        assert_eq!(page.last_page, 3);

        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["current_page"], 2);
        assert_eq!(json["data"], serde_json::json!([1, 2, 3]));
    }
}
