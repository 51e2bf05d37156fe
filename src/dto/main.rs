use serde::Serialize;

use crate::domain::claim::claim_options;
use crate::domain::customer::Customer;
use crate::domain::page::PageResult;
use crate::pagination::Paginated;
use crate::services::list::ListQuery;

/// Customer row with the values the table and the claim dialog need.
#[derive(Debug, Serialize)]
pub struct CustomerView {
    #[serde(flatten)]
    pub customer: Customer,
    pub address: String,
    pub max_claimable: i64,
    pub eligible: bool,
    pub claim_options: Vec<i64>,
}

impl From<Customer> for CustomerView {
    fn from(customer: Customer) -> Self {
        Self {
            address: customer.address_line(),
            max_claimable: customer.max_claimable(),
            eligible: customer.is_eligible(),
            claim_options: claim_options(customer.unclaimed),
            customer,
        }
    }
}

/// Aggregates over the whole filtered set.
#[derive(Debug, Serialize)]
pub struct Summary {
    pub total_count: usize,
    pub eligible_count: usize,
    pub total_points: i64,
    pub total_claimed: i64,
    pub total_unclaimed: i64,
}

impl From<&PageResult> for Summary {
    fn from(page: &PageResult) -> Self {
        Self {
            total_count: page.total_count,
            eligible_count: page.eligible_count,
            total_points: page.total_points,
            total_claimed: page.total_claimed,
            total_unclaimed: page.total_unclaimed,
        }
    }
}

/// Data required to render the main index template.
#[derive(Debug, Serialize)]
pub struct IndexPageData {
    pub customers: Paginated<CustomerView>,
    pub summary: Summary,
    pub page_size: usize,
    pub total_pages: usize,
}

impl IndexPageData {
    pub fn new(result: &PageResult, query: &ListQuery) -> Self {
        let total_pages = result.total_pages(query.page_size);
        let rows = result.rows.iter().cloned().map(CustomerView::from).collect();
        Self {
            customers: Paginated::new(rows, query.page, total_pages),
            summary: Summary::from(result),
            page_size: query.page_size,
            total_pages,
        }
    }
}
