use diesel::dsl::{count_star, sum};
use diesel::prelude::*;
use diesel::sqlite::Sqlite;

use crate::domain::claim::{CLAIM_UNIT, PointClaim};
use crate::domain::customer::{Customer, NewCustomer, UpdateCustomer};
use crate::domain::filter::FilterState;
use crate::domain::page::PageResult;
use crate::domain::types::CustomerCode;
use crate::models::claim::PointClaim as DbPointClaim;
use crate::models::customer::{
    Customer as DbCustomer, NewCustomer as DbNewCustomer, UpdateCustomer as DbUpdateCustomer,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{
    CustomerListQuery, CustomerReader, CustomerWriter, DieselRepository, Pagination,
};
use crate::schema::{customers, point_claims};

/// Point columns are 32-bit; bounds outside that range still order correctly.
fn clamp_points(value: i64) -> i32 {
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

const UNIT: i32 = CLAIM_UNIT as i32;

/// SQL `OFFSET` and `LIMIT` for a 1-based page. `None` when the offset does
/// not fit, which can only mean a page past the end.
fn page_window(pagination: &Pagination) -> Option<(i64, i64)> {
    let offset = (pagination.page.max(1) - 1).checked_mul(pagination.per_page)?;
    let offset = i64::try_from(offset).ok()?;
    let limit = i64::try_from(pagination.per_page).unwrap_or(i64::MAX);
    Some((offset, limit))
}

/// Customers matching every constraint in `filters`.
fn filtered_customers(filters: &FilterState) -> customers::BoxedQuery<'static, Sqlite> {
    let mut items = customers::table.into_boxed::<Sqlite>();

    if let Some(term) = filters.search_term() {
        let pattern = format!("%{term}%");
        items = items.filter(
            customers::code
                .like(pattern.clone())
                .or(customers::name.like(pattern.clone()))
                .or(customers::mobile.like(pattern)),
        );
    }

    let dates = &filters.date_range;
    if let Some(start) = dates.start {
        items = items.filter(customers::parsed_date.ge(start));
    }
    if let Some(end) = dates.end {
        items = items.filter(customers::parsed_date.le(end));
    }

    let points = &filters.points_range;
    if let Some(min) = points.min_total {
        items = items.filter(customers::total_points.ge(clamp_points(min)));
    }
    if let Some(max) = points.max_total {
        items = items.filter(customers::total_points.le(clamp_points(max)));
    }
    if let Some(min) = points.min_claimed {
        items = items.filter(customers::claimed_points.ge(clamp_points(min)));
    }
    if let Some(max) = points.max_claimed {
        items = items.filter(customers::claimed_points.le(clamp_points(max)));
    }
    if let Some(min) = points.min_unclaimed {
        items = items.filter(
            (customers::total_points - customers::claimed_points).ge(clamp_points(min)),
        );
    }
    if let Some(max) = points.max_unclaimed {
        items = items.filter(
            (customers::total_points - customers::claimed_points).le(clamp_points(max)),
        );
    }

    if filters.claim_status.has_claimed {
        items = items.filter(customers::claimed_points.gt(0));
    }
    if filters.claim_status.has_eligible_claims {
        items = items.filter((customers::total_points - customers::claimed_points).ge(UNIT));
    }

    items
}

impl CustomerReader for DieselRepository {
    fn get_customer(&self, code: &CustomerCode) -> RepositoryResult<Option<Customer>> {
        let mut conn = self.conn()?;
        let customer = customers::table
            .find(code.as_str())
            .first::<DbCustomer>(&mut conn)
            .optional()?;

        Ok(customer.map(Into::into))
    }

    fn list_customers_page(&self, query: &CustomerListQuery) -> RepositoryResult<PageResult> {
        let mut conn = self.conn()?;
        let filters = &query.filters;

        let (total_count, total_points, total_claimed) = filtered_customers(filters)
            .select((
                count_star(),
                sum(customers::total_points),
                sum(customers::claimed_points),
            ))
            .get_result::<(i64, Option<i64>, Option<i64>)>(&mut conn)?;

        let eligible_count = filtered_customers(filters)
            .filter((customers::total_points - customers::claimed_points).ge(UNIT))
            .count()
            .get_result::<i64>(&mut conn)?;

        let mut items = filtered_customers(filters).order(customers::code.asc());
        let mut in_range = true;
        if let Some(pagination) = &query.pagination {
            match page_window(pagination) {
                Some((offset, limit)) => items = items.offset(offset).limit(limit),
                None => in_range = false,
            }
        }

        let rows = if in_range {
            items
                .load::<DbCustomer>(&mut conn)?
                .into_iter()
                .map(Into::into)
                .collect::<Vec<Customer>>()
        } else {
            Vec::new()
        };

        let total_points = total_points.unwrap_or(0);
        let total_claimed = total_claimed.unwrap_or(0);

        Ok(PageResult {
            rows,
            total_count: total_count as usize,
            eligible_count: eligible_count as usize,
            total_points,
            total_claimed,
            total_unclaimed: total_points - total_claimed,
        })
    }

    fn list_all_customers(&self, query: &CustomerListQuery) -> RepositoryResult<Vec<Customer>> {
        let mut conn = self.conn()?;

        let rows = filtered_customers(&query.filters)
            .order(customers::code.asc())
            .load::<DbCustomer>(&mut conn)?
            .into_iter()
            .map(Into::into)
            .collect();

        Ok(rows)
    }

    fn list_claims(&self, code: &CustomerCode) -> RepositoryResult<Vec<PointClaim>> {
        let mut conn = self.conn()?;

        let claims = point_claims::table
            .filter(point_claims::customer_code.eq(code.as_str()))
            .order((point_claims::claimed_at.desc(), point_claims::id.desc()))
            .load::<DbPointClaim>(&mut conn)?
            .into_iter()
            .map(Into::into)
            .collect();

        Ok(claims)
    }
}

impl CustomerWriter for DieselRepository {
    fn create_customers(&self, new_customers: &[NewCustomer]) -> RepositoryResult<usize> {
        let mut conn = self.conn()?;
        let insertables: Vec<DbNewCustomer> = new_customers.iter().map(Into::into).collect();

        let affected = diesel::insert_into(customers::table)
            .values(&insertables)
            .execute(&mut conn)?;

        Ok(affected)
    }

    fn update_customer(
        &self,
        code: &CustomerCode,
        updates: &UpdateCustomer,
    ) -> RepositoryResult<Customer> {
        let mut conn = self.conn()?;
        let db_updates: DbUpdateCustomer = updates.into();

        let updated = diesel::update(customers::table.find(code.as_str()))
            .set(&db_updates)
            .get_result::<DbCustomer>(&mut conn)?;

        Ok(updated.into())
    }

    fn delete_customer(&self, code: &CustomerCode) -> RepositoryResult<()> {
        let mut conn = self.conn()?;

        conn.transaction::<_, RepositoryError, _>(|conn| {
            diesel::delete(
                point_claims::table.filter(point_claims::customer_code.eq(code.as_str())),
            )
            .execute(conn)?;
            let deleted = diesel::delete(customers::table.find(code.as_str())).execute(conn)?;
            if deleted == 0 {
                return Err(RepositoryError::NotFound);
            }
            Ok(())
        })
    }
}
