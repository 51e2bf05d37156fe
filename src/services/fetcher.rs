//! Store-facing fetchers used by the list controller and the export path.

use std::sync::Arc;

use crate::domain::customer::Customer;
use crate::domain::filter::FilterState;
use crate::domain::page::PageResult;
use crate::repository::{CustomerListQuery, CustomerReader};
use crate::services::{ServiceResult, run_blocking};

/// Issues the paginated, filtered, aggregated store query.
pub struct PageFetcher<R> {
    repo: Arc<R>,
}

impl<R> Clone for PageFetcher<R> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
        }
    }
}

impl<R> PageFetcher<R>
where
    R: CustomerReader + Send + Sync + 'static,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// One page plus aggregates over the whole filtered set. No retries.
    pub async fn fetch_page(
        &self,
        filters: &FilterState,
        page: usize,
        page_size: usize,
    ) -> ServiceResult<PageResult> {
        let repo = Arc::clone(&self.repo);
        let query = CustomerListQuery::new(filters.clone()).paginate(page.max(1), page_size);

        run_blocking(move || repo.list_customers_page(&query)).await
    }
}

/// Issues the unpaginated query used by export and print.
pub struct FullDatasetFetcher<R> {
    repo: Arc<R>,
}

impl<R> Clone for FullDatasetFetcher<R> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
        }
    }
}

impl<R> FullDatasetFetcher<R>
where
    R: CustomerReader + Send + Sync + 'static,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Every row matching `filters`, ordered by customer code ascending.
    pub async fn fetch_all(&self, filters: &FilterState) -> ServiceResult<Vec<Customer>> {
        let repo = Arc::clone(&self.repo);
        let query = CustomerListQuery::new(filters.clone());

        run_blocking(move || repo.list_all_customers(&query)).await
    }
}
