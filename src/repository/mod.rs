use crate::{
    db::{DbConnection, DbPool},
    domain::{
        claim::PointClaim,
        customer::{Customer, NewCustomer, UpdateCustomer},
        filter::FilterState,
        page::PageResult,
        types::CustomerCode,
    },
    repository::errors::RepositoryResult,
};

pub mod customer;
pub mod errors;
#[cfg(any(test, feature = "test-mocks"))]
pub mod mock;
pub mod points;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub per_page: usize,
}

/// Filtered customer listing, optionally paginated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerListQuery {
    pub filters: FilterState,
    pub pagination: Option<Pagination>,
}

impl CustomerListQuery {
    pub fn new(filters: FilterState) -> Self {
        Self {
            filters,
            pagination: None,
        }
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

pub trait CustomerReader {
    fn get_customer(&self, code: &CustomerCode) -> RepositoryResult<Option<Customer>>;
    /// Filtered page with aggregates computed over the whole filtered set.
    fn list_customers_page(&self, query: &CustomerListQuery) -> RepositoryResult<PageResult>;
    /// Every filtered row, ordered by customer code ascending.
    fn list_all_customers(&self, query: &CustomerListQuery) -> RepositoryResult<Vec<Customer>>;
    /// Claim history for a customer, newest first.
    fn list_claims(&self, code: &CustomerCode) -> RepositoryResult<Vec<PointClaim>>;
}

pub trait CustomerWriter {
    fn create_customers(&self, new_customers: &[NewCustomer]) -> RepositoryResult<usize>;
    fn update_customer(
        &self,
        code: &CustomerCode,
        updates: &UpdateCustomer,
    ) -> RepositoryResult<Customer>;
    fn delete_customer(&self, code: &CustomerCode) -> RepositoryResult<()>;
}

/// Store-side point procedures. Each returns a message meant for the user.
pub trait PointsWriter {
    /// Atomically redeems `amount` points, re-validated against the stored balance.
    fn claim_points(&self, code: &CustomerCode, amount: i64) -> RepositoryResult<String>;
    fn refresh_accrual(&self) -> RepositoryResult<String>;
    fn refresh_parsed_dates(&self) -> RepositoryResult<String>;
}

/// Diesel-backed implementation of every store trait.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool,
}

impl DieselRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}
