//! Store errors.
//!
//! `ValidationError` is only produced for input the store rejects on its own
//! rules, such as a claim that no longer fits the stored balance. Every Diesel
//! or pool failure maps to one of the store-side variants.

use diesel::r2d2::{Error as R2D2Error, PoolError};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Customer not found")]
    NotFound,

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("{0}")]
    ValidationError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

fn constraint_label(kind: &DatabaseErrorKind) -> Option<&'static str> {
    match kind {
        DatabaseErrorKind::UniqueViolation => Some("customer code already exists"),
        DatabaseErrorKind::ForeignKeyViolation => Some("unknown customer"),
        DatabaseErrorKind::NotNullViolation => Some("missing required value"),
        DatabaseErrorKind::CheckViolation => Some("point balance out of range"),
        _ => None,
    }
}

impl From<DieselError> for RepositoryError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => RepositoryError::NotFound,
            DieselError::DatabaseError(kind, info) => match constraint_label(&kind) {
                Some(label) => {
                    RepositoryError::ConstraintViolation(format!("{label} ({})", info.message()))
                }
                None => RepositoryError::DatabaseError(info.message().to_string()),
            },
            DieselError::InvalidCString(_)
            | DieselError::SerializationError(_)
            | DieselError::DeserializationError(_)
            | DieselError::QueryBuilderError(_) => RepositoryError::DatabaseError(err.to_string()),
            DieselError::RollbackTransaction
            | DieselError::AlreadyInTransaction
            | DieselError::NotInTransaction
            | DieselError::BrokenTransactionManager => {
                RepositoryError::DatabaseError(format!("Transaction failed: {err}"))
            }
            _ => RepositoryError::Unexpected(err.to_string()),
        }
    }
}

impl From<R2D2Error> for RepositoryError {
    fn from(err: R2D2Error) -> Self {
        RepositoryError::ConnectionError(err.to_string())
    }
}

impl From<PoolError> for RepositoryError {
    fn from(err: PoolError) -> Self {
        RepositoryError::ConnectionError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_decoding_failures_are_store_errors() {
        let decoded = RepositoryError::from(DieselError::DeserializationError(
            "unexpected null".into(),
        ));
        assert!(matches!(decoded, RepositoryError::DatabaseError(_)));

        let encoded =
            RepositoryError::from(DieselError::SerializationError("bad value".into()));
        assert!(matches!(encoded, RepositoryError::DatabaseError(_)));

        let built = RepositoryError::from(DieselError::QueryBuilderError("empty".into()));
        assert!(matches!(built, RepositoryError::DatabaseError(_)));
    }

    #[test]
    fn missing_rows_and_transactions_map_to_their_variants() {
        assert!(matches!(
            RepositoryError::from(DieselError::NotFound),
            RepositoryError::NotFound
        ));
        assert!(matches!(
            RepositoryError::from(DieselError::RollbackTransaction),
            RepositoryError::DatabaseError(_)
        ));
    }
}
