//! Core list engine and the mutations that drive it.

use thiserror::Error;

use crate::domain::claim::ClaimError;
use crate::repository::errors::{RepositoryError, RepositoryResult};

pub mod cache;
pub mod claim;
pub mod export;
pub mod fetcher;
pub mod ledger;
pub mod list;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Bad user input; nothing was sent to the store.
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Claim(#[from] ClaimError),

    /// The store call itself failed.
    #[error("{0}")]
    Store(RepositoryError),

    #[error("Customer not found")]
    NotFound,

    #[error("{0}")]
    Form(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => ServiceError::NotFound,
            RepositoryError::ValidationError(message) => ServiceError::Validation(message),
            other => ServiceError::Store(other),
        }
    }
}

/// Runs a blocking store call on the blocking thread pool.
pub(crate) async fn run_blocking<T, F>(call: F) -> ServiceResult<T>
where
    F: FnOnce() -> RepositoryResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(call)
        .await
        .map_err(|e| ServiceError::Internal(format!("store task failed: {e}")))?
        .map_err(ServiceError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repository_errors_map_to_service_errors() {
        assert!(matches!(
            ServiceError::from(RepositoryError::NotFound),
            ServiceError::NotFound
        ));
        assert!(matches!(
            ServiceError::from(RepositoryError::ValidationError("bad".into())),
            ServiceError::Validation(message) if message == "bad"
        ));
        assert!(matches!(
            ServiceError::from(RepositoryError::ConnectionError("down".into())),
            ServiceError::Store(_)
        ));
    }

    #[test]
    fn diesel_decoding_failures_are_not_user_errors() {
        let err = ServiceError::from(RepositoryError::from(
            diesel::result::Error::DeserializationError("unexpected null".into()),
        ));
        assert!(matches!(err, ServiceError::Store(_)));
    }

    #[tokio::test]
    async fn run_blocking_propagates_store_errors() {
        let result: ServiceResult<()> =
            run_blocking(|| Err(RepositoryError::DatabaseError("locked".into()))).await;
        assert!(matches!(result, Err(ServiceError::Store(_))));

        let value = run_blocking(|| Ok(7)).await.unwrap();
        assert_eq!(value, 7);
    }
}
