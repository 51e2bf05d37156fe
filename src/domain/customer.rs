use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::claim;
use crate::domain::types::{CustomerCode, NetWeight};

/// Read-only snapshot of a customer and their point balances.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct Customer {
    pub code: String,
    pub name: String,
    pub house_name: String,
    pub street: String,
    pub place: String,
    pub pin_code: String,
    pub mobile: String,
    pub net_weight: f64,
    /// Last sale date as entered (`DD/MM/YYYY`).
    pub last_sales_date: Option<String>,
    pub parsed_date: Option<NaiveDate>,
    pub total: i64,
    pub claimed: i64,
    /// Always `total - claimed`.
    pub unclaimed: i64,
    pub last_updated: Option<NaiveDateTime>,
}

impl Customer {
    pub fn max_claimable(&self) -> i64 {
        claim::max_claimable(self.unclaimed)
    }

    pub fn is_eligible(&self) -> bool {
        claim::is_eligible(self.unclaimed)
    }

    /// House name, street, place and PIN joined for display.
    pub fn address_line(&self) -> String {
        [
            self.house_name.as_str(),
            self.street.as_str(),
            self.place.as_str(),
            self.pin_code.as_str(),
        ]
        .iter()
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
    }
}

const SALES_DATE_FORMATS: [&str; 4] = ["%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%Y-%m-%d"];

/// Parses a last-sale date as entered by staff or imported from spreadsheets.
pub fn parse_sales_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    SALES_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
}

/// Text is stored as typed; templates escape it on render.
fn clean(value: String) -> String {
    value.trim().to_string()
}

fn clean_date(value: Option<String>) -> Option<String> {
    value.map(clean).filter(|s| !s.is_empty())
}

/// Editable contact fields shared by create and update.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct CustomerDetails {
    pub name: String,
    pub house_name: String,
    pub street: String,
    pub place: String,
    pub pin_code: String,
    pub mobile: String,
    pub last_sales_date: Option<String>,
}

impl CustomerDetails {
    #[must_use]
    pub fn new(
        name: String,
        house_name: String,
        street: String,
        place: String,
        pin_code: String,
        mobile: String,
        last_sales_date: Option<String>,
    ) -> Self {
        Self {
            name: clean(name),
            house_name: clean(house_name),
            street: clean(street),
            place: clean(place),
            pin_code: clean(pin_code),
            mobile: clean(mobile),
            last_sales_date: clean_date(last_sales_date),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewCustomer {
    pub code: CustomerCode,
    pub details: CustomerDetails,
    pub net_weight: NetWeight,
}

impl NewCustomer {
    #[must_use]
    pub fn new(code: CustomerCode, details: CustomerDetails, net_weight: NetWeight) -> Self {
        Self {
            code,
            details,
            net_weight,
        }
    }
}

/// Updates keep the customer code and the recorded net weight untouched.
#[derive(Clone, Debug, PartialEq)]
pub struct UpdateCustomer {
    pub details: CustomerDetails,
}

impl UpdateCustomer {
    #[must_use]
    pub fn new(details: CustomerDetails) -> Self {
        Self { details }
    }
}
