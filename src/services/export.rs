//! CSV export and printable report.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::claim::CLAIM_UNIT;
use crate::domain::customer::Customer;
use crate::domain::page::PageResult;
use crate::repository::CustomerReader;
use crate::repository::points::GRAMS_PER_POINT;
use crate::services::list::{ListController, ListQuery};
use crate::services::{ServiceError, ServiceResult};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

pub const CSV_HEADERS: [&str; 13] = [
    "Customer Code",
    "Customer Name",
    "House Name",
    "Street",
    "Place",
    "PIN Code",
    "Mobile",
    "Last Sales Date",
    "Total Points",
    "Claimed Points",
    "Unclaimed Points",
    "Max Claimable (Multiple of 5)",
    "Last Updated",
];

/// Rows for an export or print.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub rows: Vec<Customer>,
    /// False when the full fetch failed and only the loaded page was used.
    pub complete: bool,
}

/// Reuses the loaded page when it already holds every filtered row, otherwise
/// fetches the full filtered set. A failed full fetch falls back to the loaded
/// rows.
pub async fn report_rows<R>(
    list: &ListController<R>,
    query: &ListQuery,
    loaded: &PageResult,
) -> Report
where
    R: CustomerReader + Send + Sync + 'static,
{
    if loaded.covers_all() {
        return Report {
            rows: loaded.rows.clone(),
            complete: true,
        };
    }

    match list.fetch_all(&query.filters).await {
        Ok(rows) => Report {
            rows,
            complete: true,
        },
        Err(err) => {
            log::warn!(
                "Full export fetch failed, using {} loaded rows: {err}",
                loaded.rows.len()
            );
            Report {
                rows: loaded.rows.clone(),
                complete: false,
            }
        }
    }
}

fn format_timestamp(value: Option<NaiveDateTime>) -> String {
    value
        .map(|ts| ts.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_default()
}

/// CSV bytes with a UTF-8 BOM so spreadsheet tools detect the encoding.
pub fn write_csv(rows: &[Customer]) -> ServiceResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(UTF8_BOM.to_vec());
    let to_internal = |e: csv::Error| ServiceError::Internal(format!("CSV export failed: {e}"));

    writer.write_record(CSV_HEADERS).map_err(to_internal)?;
    for row in rows {
        writer
            .write_record([
                row.code.clone(),
                row.name.clone(),
                row.house_name.clone(),
                row.street.clone(),
                row.place.clone(),
                row.pin_code.clone(),
                row.mobile.clone(),
                row.last_sales_date.clone().unwrap_or_default(),
                row.total.to_string(),
                row.claimed.to_string(),
                row.unclaimed.to_string(),
                row.max_claimable().to_string(),
                format_timestamp(row.last_updated),
            ])
            .map_err(to_internal)?;
    }

    writer
        .into_inner()
        .map_err(|e| ServiceError::Internal(format!("CSV export failed: {e}")))
}

pub fn export_file_name(date: NaiveDate) -> String {
    format!("customer_loyalty_data_{}.csv", date.format("%Y-%m-%d"))
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrintMode {
    #[default]
    Table,
    Cards,
}

/// One printable row, with the display-only columns precomputed.
#[derive(Debug, Serialize)]
pub struct PrintRow {
    #[serde(flatten)]
    pub customer: Customer,
    pub address: String,
    pub max_claimable: i64,
    pub eligible: bool,
    pub last_updated_display: String,
}

#[derive(Debug, Serialize)]
pub struct PrintSummary {
    pub total_customers: usize,
    pub eligible_customers: usize,
    pub total_points: i64,
    pub total_claimed: i64,
    pub total_unclaimed: i64,
}

/// Template context for the print view. Both layouts render from the same rows.
#[derive(Debug, Serialize)]
pub struct PrintReport {
    pub rows: Vec<PrintRow>,
    pub summary: PrintSummary,
    pub mode: PrintMode,
    pub complete: bool,
    pub generated_at: String,
    pub claim_unit: i64,
    pub grams_per_point: f64,
}

impl PrintReport {
    pub fn new(
        report: Report,
        aggregates: &PageResult,
        mode: PrintMode,
        generated_at: NaiveDateTime,
    ) -> Self {
        let rows = report
            .rows
            .into_iter()
            .map(|customer| PrintRow {
                address: customer.address_line(),
                max_claimable: customer.max_claimable(),
                eligible: customer.is_eligible(),
                last_updated_display: format_timestamp(customer.last_updated),
                customer,
            })
            .collect();

        Self {
            rows,
            summary: PrintSummary {
                total_customers: aggregates.total_count,
                eligible_customers: aggregates.eligible_count,
                total_points: aggregates.total_points,
                total_claimed: aggregates.total_claimed,
                total_unclaimed: aggregates.total_unclaimed,
            },
            mode,
            complete: report.complete,
            generated_at: generated_at.format("%Y-%m-%d %H:%M").to_string(),
            claim_unit: CLAIM_UNIT,
            grams_per_point: GRAMS_PER_POINT,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::repository::errors::RepositoryError;
    use crate::repository::mock::MockRepository;

    fn customer(code: &str, total: i64, claimed: i64) -> Customer {
        Customer {
            code: code.into(),
            name: format!("Name {code}"),
            total,
            claimed,
            unclaimed: total - claimed,
            ..Customer::default()
        }
    }

    fn partial_page() -> PageResult {
        PageResult {
            rows: vec![customer("C1", 10, 0)],
            total_count: 3,
            ..PageResult::default()
        }
    }

    #[tokio::test]
    async fn complete_page_is_reused_without_fetching() {
        let mut repo = MockRepository::new();
        repo.expect_list_all_customers().times(0);
        let list = ListController::new(Arc::new(repo));

        let loaded = PageResult {
            rows: vec![customer("C1", 10, 0), customer("C2", 3, 0)],
            total_count: 2,
            ..PageResult::default()
        };
        let report = report_rows(&list, &ListQuery::default(), &loaded).await;
        assert!(report.complete);
        assert_eq!(report.rows, loaded.rows);
    }

    #[tokio::test]
    async fn partial_page_fetches_everything() {
        let mut repo = MockRepository::new();
        repo.expect_list_all_customers().times(1).returning(|_| {
            Ok(vec![
                customer("C1", 10, 0),
                customer("C2", 3, 0),
                customer("C3", 7, 5),
            ])
        });
        let list = ListController::new(Arc::new(repo));

        let report = report_rows(&list, &ListQuery::default(), &partial_page()).await;
        assert!(report.complete);
        assert_eq!(report.rows.len(), 3);
    }

    #[tokio::test]
    async fn failed_full_fetch_falls_back_to_loaded_rows() {
        let mut repo = MockRepository::new();
        repo.expect_list_all_customers()
            .returning(|_| Err(RepositoryError::ConnectionError("offline".into())));
        let list = ListController::new(Arc::new(repo));

        let report = report_rows(&list, &ListQuery::default(), &partial_page()).await;
        assert!(!report.complete);
        assert_eq!(report.rows.len(), 1);
    }

    #[test]
    fn csv_has_bom_header_and_derived_columns() {
        let bytes = write_csv(&[customer("C1", 47, 0)]).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));

        let text = String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next().unwrap(), CSV_HEADERS.join(","));
        assert_eq!(lines.next().unwrap(), "C1,Name C1,,,,,,,47,0,47,45,");
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn csv_quotes_embedded_commas() {
        let mut row = customer("C1", 0, 0);
        row.street = "MG Road, Ward 4".into();
        let bytes = write_csv(&[row]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("\"MG Road, Ward 4\""));
    }

    #[test]
    fn file_name_carries_the_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(
            export_file_name(date),
            "customer_loyalty_data_2024-03-09.csv"
        );
    }

    #[test]
    fn print_report_uses_filtered_aggregates() {
        let loaded = PageResult {
            rows: vec![customer("C1", 47, 0)],
            total_count: 12,
            eligible_count: 4,
            total_points: 300,
            total_claimed: 100,
            total_unclaimed: 200,
        };
        let report = Report {
            rows: loaded.rows.clone(),
            complete: false,
        };
        let generated_at = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();

        let print = PrintReport::new(report, &loaded, PrintMode::Cards, generated_at);
        assert_eq!(print.summary.total_customers, 12);
        assert_eq!(print.summary.eligible_customers, 4);
        assert_eq!(print.rows[0].max_claimable, 45);
        assert!(print.rows[0].eligible);
        assert!(!print.complete);
        assert_eq!(print.generated_at, "2024-03-09 10:30");
    }

    #[test]
    fn print_mode_parses_lowercase() {
        let mode: PrintMode = serde_json::from_str("\"cards\"").unwrap();
        assert_eq!(mode, PrintMode::Cards);
        assert_eq!(PrintMode::default(), PrintMode::Table);
    }
}
