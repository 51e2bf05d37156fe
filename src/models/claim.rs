//! Diesel models for the claim history.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::claim::PointClaim as DomainPointClaim;

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::point_claims)]
pub struct PointClaim {
    pub id: i32,
    pub customer_code: String,
    pub points: i32,
    pub claimed_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::point_claims)]
pub struct NewPointClaim<'a> {
    pub customer_code: &'a str,
    pub points: i32,
    pub claimed_at: NaiveDateTime,
}

impl From<PointClaim> for DomainPointClaim {
    fn from(claim: PointClaim) -> Self {
        Self {
            id: claim.id,
            customer_code: claim.customer_code,
            points: i64::from(claim.points),
            claimed_at: claim.claimed_at,
        }
    }
}
