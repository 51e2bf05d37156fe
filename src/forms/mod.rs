//! Form definitions backing the loyalty routes.

use thiserror::Error;
use validator::ValidationErrors;

pub mod customer;
pub mod main;

#[derive(Debug, Error)]
/// Errors that can occur when processing form data.
pub enum FormError {
    #[error("validation errors: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Customer Code is required")]
    InvalidCustomerCode,

    #[error("invalid net weight: {0}")]
    InvalidNetWeight(String),

    #[error("Please enter a valid claim amount")]
    InvalidClaimAmount,

    #[error("missing column: {0}")]
    MissingColumn(&'static str),

    #[error("line {line}: customer code is empty")]
    MissingCode { line: usize },

    #[error("line {line}: {message}")]
    InvalidRow { line: usize, message: String },

    #[error("failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to read upload: {0}")]
    Io(#[from] std::io::Error),
}
