//! Normalized list filters.
//!
//! [`RawFilters`] carries the strings exactly as the user typed them;
//! [`FilterState::normalize`] turns them into typed bounds where anything empty
//! or non-numeric means "unconstrained".

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Inclusive range over the parsed last-sale date.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

/// Inclusive bounds over the three point balances.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PointsRange {
    pub min_total: Option<i64>,
    pub max_total: Option<i64>,
    pub min_claimed: Option<i64>,
    pub max_claimed: Option<i64>,
    pub min_unclaimed: Option<i64>,
    pub max_unclaimed: Option<i64>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClaimStatus {
    /// Only customers that redeemed something already.
    pub has_claimed: bool,
    /// Only customers holding at least one claim unit.
    pub has_eligible_claims: bool,
}

/// Search text plus every list filter, in normalized form.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterState {
    pub search: String,
    pub date_range: DateRange,
    pub points_range: PointsRange,
    pub claim_status: ClaimStatus,
}

/// Filter input as entered in the UI.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RawFilters {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default)]
    pub min_total: String,
    #[serde(default)]
    pub max_total: String,
    #[serde(default)]
    pub min_claimed: String,
    #[serde(default)]
    pub max_claimed: String,
    #[serde(default)]
    pub min_unclaimed: String,
    #[serde(default)]
    pub max_unclaimed: String,
    #[serde(default)]
    pub has_claimed: bool,
    #[serde(default)]
    pub has_eligible_claims: bool,
}

#[derive(Clone, Copy)]
enum Bound {
    Lower,
    Upper,
}

/// Parses a point bound. Balances are integers, so a fractional lower bound
/// rounds up and a fractional upper bound rounds down.
fn parse_bound(value: &str, bound: Bound) -> Option<i64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(parsed) = trimmed.parse::<i64>() {
        return Some(parsed);
    }
    let parsed = trimmed.parse::<f64>().ok().filter(|v| v.is_finite())?;
    let rounded = match bound {
        Bound::Lower => parsed.ceil(),
        Bound::Upper => parsed.floor(),
    };
    if rounded < i64::MIN as f64 || rounded > i64::MAX as f64 {
        return None;
    }
    Some(rounded as i64)
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").ok()
}

impl FilterState {
    /// Converts raw user input into typed bounds.
    pub fn normalize(raw: &RawFilters) -> Self {
        Self {
            search: raw.search.trim().to_string(),
            date_range: DateRange {
                start: parse_date(&raw.start_date),
                end: parse_date(&raw.end_date),
            },
            points_range: PointsRange {
                min_total: parse_bound(&raw.min_total, Bound::Lower),
                max_total: parse_bound(&raw.max_total, Bound::Upper),
                min_claimed: parse_bound(&raw.min_claimed, Bound::Lower),
                max_claimed: parse_bound(&raw.max_claimed, Bound::Upper),
                min_unclaimed: parse_bound(&raw.min_unclaimed, Bound::Lower),
                max_unclaimed: parse_bound(&raw.max_unclaimed, Bound::Upper),
            },
            claim_status: ClaimStatus {
                has_claimed: raw.has_claimed,
                has_eligible_claims: raw.has_eligible_claims,
            },
        }
    }

    /// Search text with surrounding whitespace removed, `None` when blank.
    pub fn search_term(&self) -> Option<&str> {
        let trimmed = self.search.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }
}
