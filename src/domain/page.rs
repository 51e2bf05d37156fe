use serde::{Deserialize, Serialize};

use crate::domain::customer::Customer;

/// One page of customers plus aggregates over the whole filtered set.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct PageResult {
    pub rows: Vec<Customer>,
    pub total_count: usize,
    /// Customers in the filtered set holding at least one claim unit.
    pub eligible_count: usize,
    pub total_points: i64,
    pub total_claimed: i64,
    pub total_unclaimed: i64,
}

impl PageResult {
    /// Number of pages for `page_size`, never less than one.
    pub fn total_pages(&self, page_size: usize) -> usize {
        if page_size == 0 {
            return 1;
        }
        self.total_count.div_ceil(page_size).max(1)
    }

    /// True when `rows` already holds the entire filtered set.
    pub fn covers_all(&self) -> bool {
        self.rows.len() >= self.total_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_rounds_up_and_never_hits_zero() {
        let page = PageResult {
            total_count: 21,
            ..PageResult::default()
        };
        assert_eq!(page.total_pages(10), 3);
        assert_eq!(page.total_pages(25), 1);
        assert_eq!(PageResult::default().total_pages(10), 1);
    }

    #[test]
    fn covers_all_compares_rows_to_total() {
        let page = PageResult {
            rows: vec![Customer::default(); 2],
            total_count: 3,
            ..PageResult::default()
        };
        assert!(!page.covers_all());
        assert!(PageResult::default().covers_all());
    }
}
