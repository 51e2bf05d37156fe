//! Diesel models for customers and their point balances.

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;

use crate::domain::customer::{
    Customer as DomainCustomer, NewCustomer as DomainNewCustomer,
    UpdateCustomer as DomainUpdateCustomer,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::customers)]
#[diesel(primary_key(code))]
/// Diesel model for [`crate::domain::customer::Customer`].
pub struct Customer {
    pub code: String,
    pub name: String,
    pub house_name: String,
    pub street: String,
    pub place: String,
    pub pin_code: String,
    pub mobile: String,
    pub net_weight: f64,
    pub last_sales_date: Option<String>,
    pub parsed_date: Option<NaiveDate>,
    pub total_points: i32,
    pub claimed_points: i32,
    pub points_last_updated: Option<NaiveDateTime>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::customers)]
/// Insertable form of [`Customer`]. Balances start at zero.
pub struct NewCustomer<'a> {
    pub code: &'a str,
    pub name: &'a str,
    pub house_name: &'a str,
    pub street: &'a str,
    pub place: &'a str,
    pub pin_code: &'a str,
    pub mobile: &'a str,
    pub net_weight: f64,
    pub last_sales_date: Option<&'a str>,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::customers)]
#[diesel(treat_none_as_null = true)]
/// Data used when updating a [`Customer`] record.
pub struct UpdateCustomer<'a> {
    pub name: &'a str,
    pub house_name: &'a str,
    pub street: &'a str,
    pub place: &'a str,
    pub pin_code: &'a str,
    pub mobile: &'a str,
    pub last_sales_date: Option<&'a str>,
}

impl From<Customer> for DomainCustomer {
    fn from(customer: Customer) -> Self {
        Self {
            unclaimed: i64::from(customer.total_points) - i64::from(customer.claimed_points),
            code: customer.code,
            name: customer.name,
            house_name: customer.house_name,
            street: customer.street,
            place: customer.place,
            pin_code: customer.pin_code,
            mobile: customer.mobile,
            net_weight: customer.net_weight,
            last_sales_date: customer.last_sales_date,
            parsed_date: customer.parsed_date,
            total: i64::from(customer.total_points),
            claimed: i64::from(customer.claimed_points),
            last_updated: customer.points_last_updated,
        }
    }
}

impl<'a> From<&'a DomainNewCustomer> for NewCustomer<'a> {
    fn from(customer: &'a DomainNewCustomer) -> Self {
        let details = &customer.details;
        Self {
            code: customer.code.as_str(),
            name: details.name.as_str(),
            house_name: details.house_name.as_str(),
            street: details.street.as_str(),
            place: details.place.as_str(),
            pin_code: details.pin_code.as_str(),
            mobile: details.mobile.as_str(),
            net_weight: customer.net_weight.get(),
            last_sales_date: details.last_sales_date.as_deref(),
        }
    }
}

impl<'a> From<&'a DomainUpdateCustomer> for UpdateCustomer<'a> {
    fn from(customer: &'a DomainUpdateCustomer) -> Self {
        let details = &customer.details;
        Self {
            name: details.name.as_str(),
            house_name: details.house_name.as_str(),
            street: details.street.as_str(),
            place: details.place.as_str(),
            pin_code: details.pin_code.as_str(),
            mobile: details.mobile.as_str(),
            last_sales_date: details.last_sales_date.as_deref(),
        }
    }
}
