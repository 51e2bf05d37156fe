//! Points-claiming policy.
//!
//! Claims are redeemed in whole units of [`CLAIM_UNIT`] points. All functions
//! here are pure and expect a non-negative unclaimed balance.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::types::CustomerCode;

/// Claim granularity in points.
pub const CLAIM_UNIT: i64 = 5;

/// Largest amount that can be claimed from `unclaimed` in whole units.
pub const fn max_claimable(unclaimed: i64) -> i64 {
    (unclaimed / CLAIM_UNIT) * CLAIM_UNIT
}

/// A customer is eligible once at least one unit is available.
pub const fn is_eligible(unclaimed: i64) -> bool {
    unclaimed >= CLAIM_UNIT
}

/// Every valid claim amount for `unclaimed`, ascending. Empty when ineligible.
pub fn claim_options(unclaimed: i64) -> Vec<i64> {
    (1..=unclaimed / CLAIM_UNIT)
        .map(|units| units * CLAIM_UNIT)
        .collect()
}

/// Reasons a claim amount is rejected before reaching the store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClaimError {
    #[error("Please enter a valid claim amount")]
    NonPositive,

    #[error("Claim amount must be a multiple of {} points", CLAIM_UNIT)]
    NotMultipleOfUnit { amount: i64 },

    #[error("Cannot claim {amount} points. Only {available} points available.")]
    ExceedsBalance { amount: i64, available: i64 },

    #[error(
        "Cannot claim {amount} points. Maximum claimable in multiples of {}: {max} points.",
        CLAIM_UNIT
    )]
    ExceedsMaxClaimable { amount: i64, max: i64 },
}

/// Validates `amount` against a balance snapshot.
///
/// The unit and balance checks imply the max-claimable bound; it is still
/// checked last so the invariant is stated in one place.
pub fn validate_claim_amount(amount: i64, unclaimed: i64) -> Result<(), ClaimError> {
    if amount <= 0 {
        return Err(ClaimError::NonPositive);
    }
    if amount % CLAIM_UNIT != 0 {
        return Err(ClaimError::NotMultipleOfUnit { amount });
    }
    if amount > unclaimed {
        return Err(ClaimError::ExceedsBalance {
            amount,
            available: unclaimed,
        });
    }
    let max = max_claimable(unclaimed);
    if amount > max {
        return Err(ClaimError::ExceedsMaxClaimable { amount, max });
    }
    Ok(())
}

/// Request to redeem `amount` points from a customer's balance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClaimRequest {
    pub customer_code: CustomerCode,
    pub amount: i64,
}

impl ClaimRequest {
    pub fn new(customer_code: CustomerCode, amount: i64) -> Self {
        Self {
            customer_code,
            amount,
        }
    }
}

/// Historical claim recorded by the store.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PointClaim {
    pub id: i32,
    pub customer_code: String,
    pub points: i64,
    pub claimed_at: NaiveDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_claimable_is_a_multiple_not_above_balance() {
        for unclaimed in 0..200 {
            let max = max_claimable(unclaimed);
            assert_eq!(max % CLAIM_UNIT, 0);
            assert!(max <= unclaimed);
            assert_eq!(max == unclaimed, unclaimed % CLAIM_UNIT == 0);
        }
    }

    #[test]
    fn claim_options_are_increasing_multiples() {
        for unclaimed in 0..200 {
            let options = claim_options(unclaimed);
            assert_eq!(options.is_empty(), unclaimed < CLAIM_UNIT);
            assert!(options.windows(2).all(|w| w[0] < w[1]));
            assert!(options.iter().all(|o| o % CLAIM_UNIT == 0));
            assert_eq!(options.last().copied().unwrap_or(0), max_claimable(unclaimed));
        }
    }

    #[test]
    fn eligibility_threshold() {
        assert!(!is_eligible(0));
        assert!(!is_eligible(4));
        assert!(is_eligible(5));
        assert!(is_eligible(47));
    }

    #[test]
    fn twelve_points_allow_five_and_ten_only() {
        let valid: Vec<i64> = (-5..=20)
            .filter(|amount| validate_claim_amount(*amount, 12).is_ok())
            .collect();
        assert_eq!(valid, vec![5, 10]);
        assert_eq!(
            validate_claim_amount(15, 12),
            Err(ClaimError::ExceedsBalance {
                amount: 15,
                available: 12
            })
        );
    }

    #[test]
    fn rejects_zero_negative_and_off_unit_amounts() {
        assert_eq!(validate_claim_amount(0, 50), Err(ClaimError::NonPositive));
        assert_eq!(validate_claim_amount(-5, 50), Err(ClaimError::NonPositive));
        assert_eq!(
            validate_claim_amount(7, 50),
            Err(ClaimError::NotMultipleOfUnit { amount: 7 })
        );
    }

    #[test]
    fn forty_seven_points_walkthrough() {
        let unclaimed = 47;
        assert!(is_eligible(unclaimed));
        assert_eq!(max_claimable(unclaimed), 45);
        assert_eq!(claim_options(unclaimed), (1..=9).map(|u| u * 5).collect::<Vec<_>>());
        assert!(validate_claim_amount(45, unclaimed).is_ok());

        let remaining = unclaimed - 45;
        assert_eq!(remaining, 2);
        assert!(!is_eligible(remaining));
        assert!(claim_options(remaining).is_empty());
    }
}
