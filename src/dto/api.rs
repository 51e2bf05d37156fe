//! DTOs exposed by the JSON API endpoints.

use serde::Serialize;

use crate::domain::page::PageResult;
use crate::services::list::ListQuery;

/// Payload of `GET /api/v1/customers`.
#[derive(Debug, Serialize)]
pub struct CustomersResponse<'a> {
    #[serde(flatten)]
    pub result: &'a PageResult,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
}

impl<'a> CustomersResponse<'a> {
    pub fn new(result: &'a PageResult, query: &ListQuery) -> Self {
        Self {
            result,
            page: query.page,
            page_size: query.page_size,
            total_pages: result.total_pages(query.page_size),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::filter::FilterState;

    #[test]
    fn response_flattens_page_result() {
        let result = PageResult {
            total_count: 30,
            ..PageResult::default()
        };
        let query = ListQuery::new(FilterState::default(), 1, 25);
        let json = serde_json::to_value(CustomersResponse::new(&result, &query)).unwrap();
        assert_eq!(json["total_count"], 30);
        assert_eq!(json["total_pages"], 2);
        assert_eq!(json["page_size"], 25);
        assert!(json["rows"].as_array().unwrap().is_empty());
    }
}
