use std::io::{Read, Seek, SeekFrom};

use actix_multipart::form::{MultipartForm, tempfile::TempFile};
use csv::StringRecord;
use serde::Deserialize;

use crate::domain::customer::{CustomerDetails, NewCustomer};
use crate::domain::filter::{FilterState, RawFilters};
use crate::domain::types::{CustomerCode, NetWeight};
use crate::forms::FormError;
use crate::services::export::PrintMode;
use crate::services::list::{ListQuery, normalize_page_size};

/// Query string shared by the index page, the JSON API, export and print.
#[derive(Debug, Default, Deserialize)]
pub struct ListQueryForm {
    pub q: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub min_total: Option<String>,
    pub max_total: Option<String>,
    pub min_claimed: Option<String>,
    pub max_claimed: Option<String>,
    pub min_unclaimed: Option<String>,
    pub max_unclaimed: Option<String>,
    pub has_claimed: Option<bool>,
    pub has_eligible_claims: Option<bool>,
    pub page: Option<usize>,
    pub per_page: Option<usize>,
    pub mode: Option<PrintMode>,
}

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

impl ListQueryForm {
    pub fn raw_filters(&self) -> RawFilters {
        RawFilters {
            search: text(&self.q),
            start_date: text(&self.start_date),
            end_date: text(&self.end_date),
            min_total: text(&self.min_total),
            max_total: text(&self.max_total),
            min_claimed: text(&self.min_claimed),
            max_claimed: text(&self.max_claimed),
            min_unclaimed: text(&self.min_unclaimed),
            max_unclaimed: text(&self.max_unclaimed),
            has_claimed: self.has_claimed.unwrap_or(false),
            has_eligible_claims: self.has_eligible_claims.unwrap_or(false),
        }
    }

    /// `default_page_size` applies when no page size was sent.
    pub fn list_query(&self, default_page_size: usize) -> ListQuery {
        ListQuery::new(
            FilterState::normalize(&self.raw_filters()),
            self.page.unwrap_or(1),
            normalize_page_size(self.per_page.or(Some(default_page_size))),
        )
    }

    /// Non-empty filter parameters, for building page links that keep the filters.
    pub fn filter_params(&self) -> Vec<(&'static str, String)> {
        let raw = self.raw_filters();
        let mut params: Vec<(&'static str, String)> = [
            ("q", raw.search),
            ("start_date", raw.start_date),
            ("end_date", raw.end_date),
            ("min_total", raw.min_total),
            ("max_total", raw.max_total),
            ("min_claimed", raw.min_claimed),
            ("max_claimed", raw.max_claimed),
            ("min_unclaimed", raw.min_unclaimed),
            ("max_unclaimed", raw.max_unclaimed),
        ]
        .into_iter()
        .map(|(name, value)| (name, value.trim().to_string()))
        .filter(|(_, value)| !value.is_empty())
        .collect();

        if raw.has_claimed {
            params.push(("has_claimed", "true".to_string()));
        }
        if raw.has_eligible_claims {
            params.push(("has_eligible_claims", "true".to_string()));
        }
        params
    }
}

/// Accepted header spellings per field, in order of preference.
const CODE_COLUMNS: &[&str] = &["customer_code", "CUSTOMER CODE"];
const NAME_COLUMNS: &[&str] = &["customer_name", "CUSTOMER NAME"];
const HOUSE_COLUMNS: &[&str] = &["house_name", "HOUSE NAME"];
const STREET_COLUMNS: &[&str] = &["street", "STREET"];
const PLACE_COLUMNS: &[&str] = &["place", "PLACE"];
const PIN_COLUMNS: &[&str] = &["pin_code", "PIN CODE"];
const MOBILE_COLUMNS: &[&str] = &["mobile", "MOBILE"];
const WEIGHT_COLUMNS: &[&str] = &["net_weight", "NET WEIGHT"];
const SALES_DATE_COLUMNS: &[&str] = &["last_sales_date", "LAST SALES DATE", "original_date"];

fn find_column(headers: &StringRecord, aliases: &[&str]) -> Option<usize> {
    aliases.iter().find_map(|alias| {
        headers
            .iter()
            .position(|header| header.trim_start_matches('\u{feff}').trim() == *alias)
    })
}

/// Column positions resolved from a header row.
struct ColumnMap {
    code: usize,
    name: Option<usize>,
    house_name: Option<usize>,
    street: Option<usize>,
    place: Option<usize>,
    pin_code: Option<usize>,
    mobile: Option<usize>,
    net_weight: Option<usize>,
    last_sales_date: Option<usize>,
}

impl ColumnMap {
    fn resolve(headers: &StringRecord) -> Result<Self, FormError> {
        Ok(Self {
            code: find_column(headers, CODE_COLUMNS)
                .ok_or(FormError::MissingColumn("customer_code"))?,
            name: find_column(headers, NAME_COLUMNS),
            house_name: find_column(headers, HOUSE_COLUMNS),
            street: find_column(headers, STREET_COLUMNS),
            place: find_column(headers, PLACE_COLUMNS),
            pin_code: find_column(headers, PIN_COLUMNS),
            mobile: find_column(headers, MOBILE_COLUMNS),
            net_weight: find_column(headers, WEIGHT_COLUMNS),
            last_sales_date: find_column(headers, SALES_DATE_COLUMNS),
        })
    }

    fn field(record: &StringRecord, index: Option<usize>) -> String {
        index
            .and_then(|i| record.get(i))
            .map(|value| value.trim().to_string())
            .unwrap_or_default()
    }

    fn customer(&self, record: &StringRecord, line: usize) -> Result<NewCustomer, FormError> {
        let code = CustomerCode::new(Self::field(record, Some(self.code)))
            .map_err(|_| FormError::MissingCode { line })?;
        let net_weight = NetWeight::parse(&Self::field(record, self.net_weight)).map_err(|e| {
            FormError::InvalidRow {
                line,
                message: format!("net weight: {e}"),
            }
        })?;
        let last_sales_date = Some(Self::field(record, self.last_sales_date));

        let details = CustomerDetails::new(
            Self::field(record, self.name),
            Self::field(record, self.house_name),
            Self::field(record, self.street),
            Self::field(record, self.place),
            Self::field(record, self.pin_code),
            Self::field(record, self.mobile),
            last_sales_date,
        );
        Ok(NewCustomer::new(code, details, net_weight))
    }
}

/// Parses customer rows written with either header spelling.
pub fn parse_customers_csv<R: Read>(reader: R) -> Result<Vec<NewCustomer>, FormError> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let columns = ColumnMap::resolve(rdr.headers()?)?;

    let mut customers = Vec::new();
    for (index, result) in rdr.records().enumerate() {
        let record = result?;
        if record.iter().all(|value| value.trim().is_empty()) {
            continue;
        }
        // Line 1 is the header.
        let line = record
            .position()
            .map(|pos| pos.line() as usize)
            .unwrap_or(index + 2);
        customers.push(columns.customer(&record, line)?);
    }
    Ok(customers)
}

#[derive(MultipartForm)]
pub struct UploadCustomersForm {
    #[multipart(limit = "10MB")]
    pub csv: TempFile,
}

impl UploadCustomersForm {
    pub fn parse(&mut self) -> Result<Vec<NewCustomer>, FormError> {
        let file = self.csv.file.as_file_mut();
        file.seek(SeekFrom::Start(0))?;
        parse_customers_csv(file)
    }
}
