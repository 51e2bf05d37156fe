//! Ledger facade: every mutation goes through here so the list cache is
//! invalidated exactly when the store confirms a change.

use std::sync::Arc;

use crate::domain::claim::{ClaimRequest, PointClaim};
use crate::domain::customer::{Customer, NewCustomer, UpdateCustomer};
use crate::domain::page::PageResult;
use crate::domain::types::CustomerCode;
use crate::repository::{CustomerReader, CustomerWriter, PointsWriter};
use crate::services::claim::{self as claim_service, ClaimOutcome};
use crate::services::list::{ListController, ListQuery};
use crate::services::{ServiceError, ServiceResult, run_blocking};

pub struct Ledger<R> {
    repo: Arc<R>,
    list: ListController<R>,
}

impl<R> Ledger<R>
where
    R: CustomerReader + CustomerWriter + PointsWriter + Send + Sync + 'static,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self {
            list: ListController::new(Arc::clone(&repo)),
            repo,
        }
    }

    pub fn list(&self) -> &ListController<R> {
        &self.list
    }

    pub async fn load(&self, query: &ListQuery) -> ServiceResult<Arc<PageResult>> {
        self.list.load(query).await
    }

    pub async fn get_customer(&self, code: CustomerCode) -> ServiceResult<Customer> {
        let repo = Arc::clone(&self.repo);
        run_blocking(move || repo.get_customer(&code))
            .await?
            .ok_or(ServiceError::NotFound)
    }

    pub async fn list_claims(&self, code: CustomerCode) -> ServiceResult<Vec<PointClaim>> {
        let repo = Arc::clone(&self.repo);
        run_blocking(move || repo.list_claims(&code)).await
    }

    pub async fn create_customer(&self, customer: NewCustomer) -> ServiceResult<String> {
        let code = customer.code.clone();
        let repo = Arc::clone(&self.repo);
        run_blocking(move || repo.create_customers(&[customer]))
            .await
            .map_err(|err| {
                log::error!("Failed to add customer {code}: {err}");
                err
            })?;
        self.list.invalidate();

        let refreshed = self.refresh_after_write().await;
        Ok(join_messages(format!("Customer {code} added."), refreshed))
    }

    pub async fn update_customer(
        &self,
        code: CustomerCode,
        updates: UpdateCustomer,
    ) -> ServiceResult<String> {
        let repo = Arc::clone(&self.repo);
        let updated_code = code.clone();
        run_blocking(move || repo.update_customer(&updated_code, &updates))
            .await
            .map_err(|err| {
                log::error!("Failed to save customer {code}: {err}");
                err
            })?;
        self.list.invalidate();

        let refreshed = self.refresh_after_write().await;
        Ok(join_messages(format!("Customer {code} saved."), refreshed))
    }

    pub async fn delete_customer(&self, code: CustomerCode) -> ServiceResult<String> {
        let repo = Arc::clone(&self.repo);
        let deleted_code = code.clone();
        run_blocking(move || repo.delete_customer(&deleted_code))
            .await
            .map_err(|err| {
                log::error!("Failed to delete customer {code}: {err}");
                err
            })?;
        self.list.invalidate();

        Ok(format!("Customer {code} deleted."))
    }

    pub async fn import_customers(&self, customers: Vec<NewCustomer>) -> ServiceResult<String> {
        if customers.is_empty() {
            return Err(ServiceError::Form("The file contains no customers".to_string()));
        }

        let repo = Arc::clone(&self.repo);
        let created = run_blocking(move || repo.create_customers(&customers))
            .await
            .map_err(|err| {
                log::error!("Failed to import customers: {err}");
                err
            })?;
        self.list.invalidate();

        let refreshed = self.refresh_after_write().await;
        Ok(join_messages(format!("Imported {created} customers."), refreshed))
    }

    /// Claims points against the balance the caller last saw.
    pub async fn claim(
        &self,
        request: ClaimRequest,
        current_unclaimed: i64,
    ) -> ServiceResult<ClaimOutcome> {
        let outcome =
            claim_service::claim(Arc::clone(&self.repo), request, current_unclaimed).await?;
        self.list.invalidate();
        Ok(outcome)
    }

    /// Recomputes accrued points, then parsed sale dates. Both store messages
    /// are returned joined with a space.
    pub async fn refresh_points(&self) -> ServiceResult<String> {
        let repo = Arc::clone(&self.repo);
        let points = run_blocking(move || repo.refresh_accrual())
            .await
            .map_err(|err| {
                log::error!("Failed to refresh points: {err}");
                err
            })?;
        self.list.invalidate();

        let repo = Arc::clone(&self.repo);
        let dates = run_blocking(move || repo.refresh_parsed_dates())
            .await
            .map_err(|err| {
                log::error!("Failed to refresh parsed dates: {err}");
                err
            })?;
        self.list.invalidate();

        Ok(format!("{points} {dates}"))
    }

    /// Resets the controller's filters and wipes the cache.
    pub fn clear_filters(&self) {
        self.list.clear_filters();
    }

    async fn refresh_after_write(&self) -> Option<String> {
        match self.refresh_points().await {
            Ok(message) => Some(message),
            Err(err) => {
                log::warn!("Points were not refreshed after a customer change: {err}");
                None
            }
        }
    }
}

fn join_messages(message: String, extra: Option<String>) -> String {
    match extra {
        Some(extra) => format!("{message} {extra}"),
        None => message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::customer::CustomerDetails;
    use crate::domain::filter::FilterState;
    use crate::domain::types::NetWeight;
    use crate::repository::errors::RepositoryError;
    use crate::repository::mock::MockRepository;

    fn one_page(repo: &mut MockRepository, times: usize) {
        repo.expect_list_customers_page()
            .times(times)
            .returning(|_| {
                Ok(PageResult {
                    total_count: 1,
                    ..PageResult::default()
                })
            });
    }

    fn refresh_ok(repo: &mut MockRepository) {
        repo.expect_refresh_accrual()
            .returning(|| Ok("Points refreshed for 1 customers.".to_string()));
        repo.expect_refresh_parsed_dates()
            .returning(|| Ok("Parsed dates updated for 1 customers.".to_string()));
    }

    fn code() -> CustomerCode {
        CustomerCode::new("C001").unwrap()
    }

    fn details() -> CustomerDetails {
        CustomerDetails::new(
            "Alice".into(),
            String::new(),
            String::new(),
            "Thrissur".into(),
            String::new(),
            "9876543210".into(),
            None,
        )
    }

    async fn warm(ledger: &Ledger<MockRepository>) {
        ledger.load(&ListQuery::default()).await.unwrap();
        assert_eq!(ledger.list().cache().len(), 1);
    }

    #[tokio::test]
    async fn every_confirmed_mutation_forces_a_refetch() {
        let mut repo = MockRepository::new();
        // One warm-up load plus one reload after each of the five mutations.
        one_page(&mut repo, 6);
        refresh_ok(&mut repo);
        repo.expect_create_customers().returning(|c| Ok(c.len()));
        repo.expect_update_customer()
            .returning(|_, _| Ok(Customer::default()));
        repo.expect_delete_customer().returning(|_| Ok(()));
        repo.expect_claim_points()
            .returning(|_, _| Ok("Successfully claimed 5 points for customer C001".into()));

        let ledger = Ledger::new(Arc::new(repo));
        let query = ListQuery::default();

        warm(&ledger).await;
        ledger
            .create_customer(NewCustomer::new(code(), details(), NetWeight::default()))
            .await
            .unwrap();
        ledger.load(&query).await.unwrap();

        ledger
            .update_customer(code(), UpdateCustomer::new(details()))
            .await
            .unwrap();
        ledger.load(&query).await.unwrap();

        ledger
            .claim(ClaimRequest::new(code(), 5), 12)
            .await
            .unwrap();
        ledger.load(&query).await.unwrap();

        ledger.refresh_points().await.unwrap();
        ledger.load(&query).await.unwrap();

        ledger.delete_customer(code()).await.unwrap();
        ledger.load(&query).await.unwrap();
    }

    #[tokio::test]
    async fn failed_mutation_keeps_the_cache() {
        let mut repo = MockRepository::new();
        one_page(&mut repo, 1);
        repo.expect_delete_customer()
            .returning(|_| Err(RepositoryError::DatabaseError("locked".into())));
        repo.expect_claim_points().times(0);

        let ledger = Ledger::new(Arc::new(repo));
        warm(&ledger).await;

        assert!(ledger.delete_customer(code()).await.is_err());
        assert!(
            ledger
                .claim(ClaimRequest::new(code(), 15), 12)
                .await
                .is_err()
        );
        assert_eq!(ledger.list().cache().len(), 1);
        ledger.load(&ListQuery::default()).await.unwrap();
    }

    #[tokio::test]
    async fn refresh_joins_both_messages() {
        let mut repo = MockRepository::new();
        refresh_ok(&mut repo);

        let ledger = Ledger::new(Arc::new(repo));
        let message = ledger.refresh_points().await.unwrap();
        assert_eq!(
            message,
            "Points refreshed for 1 customers. Parsed dates updated for 1 customers."
        );
    }

    #[tokio::test]
    async fn create_reports_refresh_outcome() {
        let mut repo = MockRepository::new();
        repo.expect_create_customers().times(1).returning(|c| Ok(c.len()));
        refresh_ok(&mut repo);

        let ledger = Ledger::new(Arc::new(repo));
        let message = ledger
            .create_customer(NewCustomer::new(code(), details(), NetWeight::default()))
            .await
            .unwrap();
        assert_eq!(
            message,
            "Customer C001 added. Points refreshed for 1 customers. Parsed dates updated for 1 customers."
        );
    }

    #[tokio::test]
    async fn empty_import_is_rejected_without_store_call() {
        let mut repo = MockRepository::new();
        repo.expect_create_customers().times(0);

        let ledger = Ledger::new(Arc::new(repo));
        let err = ledger.import_customers(Vec::new()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Form(_)));
    }

    #[tokio::test]
    async fn clear_filters_resets_the_view() {
        let repo = MockRepository::new();
        let ledger = Ledger::new(Arc::new(repo));
        ledger.list().set_filters(FilterState {
            search: "alice".into(),
            ..FilterState::default()
        });

        ledger.clear_filters();
        assert!(ledger.list().query().filters == FilterState::default());
    }

    #[tokio::test]
    async fn missing_customer_maps_to_not_found() {
        let mut repo = MockRepository::new();
        repo.expect_get_customer().returning(|_| Ok(None));

        let ledger = Ledger::new(Arc::new(repo));
        let err = ledger.get_customer(code()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound));
    }
}
