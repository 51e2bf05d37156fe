//! Mock repository implementations for isolating services in tests.

use mockall::mock;

use crate::domain::claim::PointClaim;
use crate::domain::customer::{Customer, NewCustomer, UpdateCustomer};
use crate::domain::page::PageResult;
use crate::domain::types::CustomerCode;
use crate::repository::errors::RepositoryResult;
use crate::repository::{CustomerListQuery, CustomerReader, CustomerWriter, PointsWriter};

mock! {
    pub Repository {}

    impl CustomerReader for Repository {
        fn get_customer(&self, code: &CustomerCode) -> RepositoryResult<Option<Customer>>;
        fn list_customers_page(&self, query: &CustomerListQuery) -> RepositoryResult<PageResult>;
        fn list_all_customers(&self, query: &CustomerListQuery) -> RepositoryResult<Vec<Customer>>;
        fn list_claims(&self, code: &CustomerCode) -> RepositoryResult<Vec<PointClaim>>;
    }

    impl CustomerWriter for Repository {
        fn create_customers(&self, new_customers: &[NewCustomer]) -> RepositoryResult<usize>;
        fn update_customer(
            &self,
            code: &CustomerCode,
            updates: &UpdateCustomer,
        ) -> RepositoryResult<Customer>;
        fn delete_customer(&self, code: &CustomerCode) -> RepositoryResult<()>;
    }

    impl PointsWriter for Repository {
        fn claim_points(&self, code: &CustomerCode, amount: i64) -> RepositoryResult<String>;
        fn refresh_accrual(&self) -> RepositoryResult<String>;
        fn refresh_parsed_dates(&self) -> RepositoryResult<String>;
    }
}
