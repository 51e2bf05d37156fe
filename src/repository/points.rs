use chrono::{NaiveDate, Utc};
use diesel::prelude::*;

use crate::domain::claim::validate_claim_amount;
use crate::domain::customer::parse_sales_date;
use crate::domain::types::CustomerCode;
use crate::models::claim::NewPointClaim;
use crate::models::customer::Customer as DbCustomer;
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, PointsWriter};
use crate::schema::{customers, point_claims};

/// Grams of net gold weight that earn one point.
pub const GRAMS_PER_POINT: f64 = 10.0;

/// Accrued points for a net weight: one point per full [`GRAMS_PER_POINT`].
pub fn accrued_points(net_weight: f64) -> i32 {
    if !net_weight.is_finite() || net_weight <= 0.0 {
        return 0;
    }
    (net_weight / GRAMS_PER_POINT)
        .floor()
        .min(f64::from(i32::MAX)) as i32
}

impl PointsWriter for DieselRepository {
    fn claim_points(&self, code: &CustomerCode, amount: i64) -> RepositoryResult<String> {
        let mut conn = self.conn()?;

        conn.immediate_transaction::<_, RepositoryError, _>(|conn| {
            let customer = customers::table
                .find(code.as_str())
                .first::<DbCustomer>(conn)
                .optional()?
                .ok_or(RepositoryError::NotFound)?;

            let unclaimed = i64::from(customer.total_points) - i64::from(customer.claimed_points);
            validate_claim_amount(amount, unclaimed)
                .map_err(|e| RepositoryError::ValidationError(e.to_string()))?;
            let points = i32::try_from(amount)
                .map_err(|_| RepositoryError::ValidationError(format!("invalid amount {amount}")))?;

            let now = Utc::now().naive_utc();
            diesel::update(customers::table.find(code.as_str()))
                .set((
                    customers::claimed_points.eq(customers::claimed_points + points),
                    customers::points_last_updated.eq(now),
                ))
                .execute(conn)?;

            diesel::insert_into(point_claims::table)
                .values(&NewPointClaim {
                    customer_code: code.as_str(),
                    points,
                    claimed_at: now,
                })
                .execute(conn)?;

            Ok(format!(
                "Successfully claimed {amount} points for customer {code}"
            ))
        })
    }

    fn refresh_accrual(&self) -> RepositoryResult<String> {
        let mut conn = self.conn()?;

        conn.immediate_transaction::<_, RepositoryError, _>(|conn| {
            let weights = customers::table
                .select((customers::code, customers::net_weight))
                .load::<(String, f64)>(conn)?;

            let now = Utc::now().naive_utc();
            for (code, net_weight) in &weights {
                diesel::update(customers::table.find(code.as_str()))
                    .set((
                        customers::total_points.eq(accrued_points(*net_weight)),
                        customers::points_last_updated.eq(now),
                    ))
                    .execute(conn)?;
            }

            Ok(format!("Points refreshed for {} customers.", weights.len()))
        })
    }

    fn refresh_parsed_dates(&self) -> RepositoryResult<String> {
        let mut conn = self.conn()?;

        conn.immediate_transaction::<_, RepositoryError, _>(|conn| {
            let dates = customers::table
                .select((customers::code, customers::last_sales_date))
                .load::<(String, Option<String>)>(conn)?;

            let mut parsed_count = 0usize;
            for (code, raw) in &dates {
                let parsed: Option<NaiveDate> = raw.as_deref().and_then(parse_sales_date);
                if parsed.is_some() {
                    parsed_count += 1;
                }
                diesel::update(customers::table.find(code.as_str()))
                    .set(customers::parsed_date.eq(parsed))
                    .execute(conn)?;
            }

            Ok(format!("Parsed dates updated for {parsed_count} customers."))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accrual_is_one_point_per_ten_grams() {
        assert_eq!(accrued_points(0.0), 0);
        assert_eq!(accrued_points(9.99), 0);
        assert_eq!(accrued_points(10.0), 1);
        assert_eq!(accrued_points(475.3), 47);
        assert_eq!(accrued_points(-20.0), 0);
        assert_eq!(accrued_points(f64::NAN), 0);
    }
}
