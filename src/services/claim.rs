//! Claim transaction: local policy checks, then the store's atomic claim.

use std::sync::Arc;

use crate::domain::claim::{ClaimRequest, validate_claim_amount};
use crate::repository::PointsWriter;
use crate::services::{ServiceResult, run_blocking};

/// Confirmed claim as reported back to the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClaimOutcome {
    /// Store message, passed through verbatim.
    pub message: String,
    /// Balance left according to the snapshot the claim was made against.
    pub remaining: i64,
}

impl ClaimOutcome {
    pub fn summary(&self) -> String {
        format!("{} ({} points remaining)", self.message, self.remaining)
    }
}

/// Claims `request.amount` points for a customer whose balance was last seen as
/// `current_unclaimed`.
///
/// Nothing reaches the store unless the amount passes the claim policy against
/// the snapshot. The store re-validates against its own balance.
pub async fn claim<R>(
    repo: Arc<R>,
    request: ClaimRequest,
    current_unclaimed: i64,
) -> ServiceResult<ClaimOutcome>
where
    R: PointsWriter + Send + Sync + 'static,
{
    validate_claim_amount(request.amount, current_unclaimed)?;

    let amount = request.amount;
    let message = run_blocking(move || repo.claim_points(&request.customer_code, amount))
        .await
        .map_err(|err| {
            log::error!("Failed to claim points: {err}");
            err
        })?;

    Ok(ClaimOutcome {
        message,
        remaining: current_unclaimed - amount,
    })
}
