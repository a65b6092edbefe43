//! Relative date ranges and period-over-period comparisons.
//!
//! Everything here takes an explicit `today` so results stay reproducible.

use crate::analysis::aggregator::{filter_notes_by_range, sales_summary};
use crate::models::{non_empty, AtRiskClient, Client, DateRange, PeriodComparison, SalesNote};
use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Days without an order after which a client counts as at risk.
pub const AT_RISK_AFTER_DAYS: u64 = 60;

/// Window used for the next-week forecast.
const FORECAST_WINDOW_DAYS: u64 = 30;

/// Named ranges ending today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RangePreset {
    /// Monday of the current week through today
    Week,
    /// First of the current month through today
    Month,
    /// The last 90 days
    Quarter,
    /// The last 365 days
    Year,
}

impl RangePreset {
    /// First day of the range for a given `today`.
    pub fn start(self, today: NaiveDate) -> NaiveDate {
        match self {
            RangePreset::Week => {
                let since_monday = today.weekday().num_days_from_monday();
                today - Days::new(u64::from(since_monday))
            }
            RangePreset::Month => today.with_day(1).unwrap_or(today),
            RangePreset::Quarter => today - Days::new(89),
            RangePreset::Year => today - Days::new(364),
        }
    }

    /// The preset as a concrete range, both bounds at midnight.
    pub fn resolve(self, today: NaiveDate) -> DateRange {
        DateRange::between_days(self.start(today), today)
    }

    /// Hebrew label used on the dashboard.
    pub fn label(self) -> &'static str {
        match self {
            RangePreset::Week => "השבוע",
            RangePreset::Month => "החודש",
            RangePreset::Quarter => "3 חודשים אחרונים",
            RangePreset::Year => "12 חודשים אחרונים",
        }
    }
}

impl fmt::Display for RangePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangePreset::Week => write!(f, "week"),
            RangePreset::Month => write!(f, "month"),
            RangePreset::Quarter => write!(f, "quarter"),
            RangePreset::Year => write!(f, "year"),
        }
    }
}

/// The range of equal length that ends the day before `range` starts.
pub fn previous_period(range: &DateRange) -> Option<DateRange> {
    let (from, _) = range.bounds()?;
    let span = u64::try_from(range.span_days()?).ok()?;
    let start = from.date();

    let previous_end = start.checked_sub_days(Days::new(1))?;
    let previous_start = start.checked_sub_days(Days::new(span))?;
    Some(DateRange::between_days(previous_start, previous_end))
}

/// Signed percentage change, e.g. `+12.5%` or `-3.0%`.
///
/// Both zero gives `0%`; growth from zero gives `+∞%`.
pub fn format_percent_change(current: f64, previous: f64) -> String {
    if previous == 0.0 && current == 0.0 {
        return "0%".to_string();
    }
    if previous == 0.0 {
        return "+∞%".to_string();
    }

    let diff = (current - previous) / previous.abs() * 100.0;
    let sign = if diff >= 0.0 { "+" } else { "" };
    format!("{}{:.1}%", sign, diff)
}

/// KPIs for `range` against the period just before it.
///
/// Returns `None` for an unbounded range.
pub fn compare_periods(notes: &[SalesNote], range: &DateRange) -> Option<PeriodComparison> {
    let previous_range = previous_period(range)?;

    let current = sales_summary(&filter_notes_by_range(notes, range));
    let previous = sales_summary(&filter_notes_by_range(notes, &previous_range));

    Some(PeriodComparison {
        current_range: *range,
        previous_range,
        growth: format_percent_change(current.total_revenue, previous.total_revenue),
        current,
        previous,
    })
}

/// Expected revenue over the next 7 days from the last 30 days' daily average.
pub fn forecast_next_week(notes: &[SalesNote], today: NaiveDate) -> f64 {
    let Some(window_start) = today.checked_sub_days(Days::new(FORECAST_WINDOW_DAYS - 1)) else {
        return 0.0;
    };

    let recent: Vec<&SalesNote> = notes
        .iter()
        .filter(|note| note.parsed_date().is_some_and(|d| d >= window_start))
        .collect();

    if recent.is_empty() {
        return 0.0;
    }

    let revenue: f64 = recent.iter().map(|note| note.revenue()).sum();
    revenue / FORECAST_WINDOW_DAYS as f64 * 7.0
}

/// Revenue from the first of `today`'s month through `today`.
pub fn current_month_revenue(notes: &[SalesNote], today: NaiveDate) -> f64 {
    let month = RangePreset::Month.resolve(today);
    sales_summary(&filter_notes_by_range(notes, &month)).total_revenue
}

/// Directory clients whose last order is older than [`AT_RISK_AFTER_DAYS`]
/// (or who never ordered), in directory order.
///
/// A note belongs to the client whose `id` equals its `clientKey`, falling
/// back to `clientId` and then `clientName`.
pub fn at_risk_clients(notes: &[SalesNote], clients: &[Client], today: NaiveDate) -> Vec<AtRiskClient> {
    let mut last_order: HashMap<&str, NaiveDate> = HashMap::new();

    for note in notes {
        let Some(date) = note.parsed_date() else {
            continue;
        };
        let key = non_empty(&note.client_key)
            .or_else(|| non_empty(&note.client_id))
            .or_else(|| non_empty(&note.client_name));
        let Some(key) = key else {
            continue;
        };

        last_order
            .entry(key)
            .and_modify(|last| *last = (*last).max(date))
            .or_insert(date);
    }

    let cutoff = today.checked_sub_days(Days::new(AT_RISK_AFTER_DAYS));

    clients
        .iter()
        .filter_map(|client| {
            let key = non_empty(&client.id)?;
            let last = last_order.get(key).copied();
            let stale = match (last, cutoff) {
                (None, _) => true,
                (Some(last), Some(cutoff)) => last < cutoff,
                (Some(_), None) => false,
            };

            stale.then(|| AtRiskClient {
                key: key.to_string(),
                name: non_empty(&client.name).unwrap_or(key).to_string(),
                last_order: last,
            })
        })
        .collect()
}
