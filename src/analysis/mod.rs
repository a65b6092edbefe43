//! Sales analytics engine.
//!
//! Pure, synchronous functions over in-memory notes. [`analyze`] runs every
//! aggregation for one report.

pub mod aggregator;
pub mod collation;
pub mod dates;
pub mod periods;

pub use aggregator::*;
pub use collation::{Collator, HEBREW_LOCALE};
pub use dates::{bucket_key, parse_doc_date};
pub use periods::*;

use crate::models::{AnalyticsSnapshot, Client, DateRange, Granularity, SalesNote};
use chrono::NaiveDate;
use tracing::debug;

/// Options for a full analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    /// Range to restrict notes to. Unbounded means all notes.
    pub range: DateRange,
    /// Timeline bucket size. `None` picks one from the range length.
    pub granularity: Option<Granularity>,
    /// Rows kept in the product and client lists.
    pub top_n: usize,
    /// Reference day for forecasts and at-risk detection.
    pub today: NaiveDate,
    /// Locale for timeline label ordering.
    pub locale: String,
}

impl AnalysisOptions {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            range: DateRange::default(),
            granularity: None,
            top_n: 5,
            today,
            locale: HEBREW_LOCALE.to_string(),
        }
    }

    /// The granularity to use: explicit, else derived from the range span.
    pub fn effective_granularity(&self) -> Granularity {
        self.granularity.unwrap_or_else(|| {
            self.range
                .span_days()
                .map(Granularity::for_span_days)
                .unwrap_or_default()
        })
    }
}

/// Run every aggregation over `notes` for one report.
///
/// Range-dependent figures (summary, breakdowns, timeline) use the notes in
/// `options.range`; the forecast and at-risk list always look at all notes
/// relative to `options.today`.
pub fn analyze(notes: &[SalesNote], clients: &[Client], options: &AnalysisOptions) -> AnalyticsSnapshot {
    let in_range = filter_notes_by_range(notes, &options.range);
    let granularity = options.effective_granularity();
    let collator = Collator::new(&options.locale);

    debug!(
        "Analyzing {} notes ({} in range), granularity {}",
        notes.len(),
        in_range.len(),
        granularity
    );

    let mut clients_ranked = sales_by_client(&in_range, clients);
    let active_clients = clients_ranked.len();
    clients_ranked.truncate(options.top_n);

    AnalyticsSnapshot {
        range: options.range,
        granularity,
        summary: sales_summary(&in_range),
        comparison: compare_periods(notes, &options.range),
        regions: sales_by_region(&in_range, clients),
        products: top_products(&in_range, options.top_n),
        weakest_products: weakest_products(&in_range, options.top_n),
        clients: clients_ranked,
        active_clients,
        at_risk_clients: at_risk_clients(notes, clients, options.today),
        forecast_next_week: forecast_next_week(notes, options.today),
        current_month_revenue: current_month_revenue(notes, options.today),
        timeline: sales_timeline_with(&in_range, granularity, &collator),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LineItem;

    #[test]
    fn test_analyze_with_range() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 20).unwrap();
        let notes = vec![
            SalesNote::new("18/03/24", 200.0)
                .with_client("c1")
                .with_items(vec![LineItem::new("P1", "צינור", 2.0, 200.0)]),
            SalesNote::new("19/03/24", 100.0).with_client("c2"),
            SalesNote::new("16/03/24", 50.0).with_client("c1"),
        ];
        let clients = vec![Client::new("c1", "מפעל הצפון", "צפון")];

        let mut options = AnalysisOptions::new(today);
        options.range = RangePreset::Week.resolve(today);

        let snapshot = analyze(&notes, &clients, &options);
        assert_eq!(snapshot.granularity, Granularity::Day);
        assert_eq!(snapshot.summary.order_count, 2);
        assert_eq!(snapshot.summary.total_revenue, 300.0);
        assert_eq!(snapshot.active_clients, 2);
        assert_eq!(snapshot.timeline.len(), 2);
        assert_eq!(snapshot.products.len(), 1);
        assert_eq!(snapshot.current_month_revenue, 350.0);

        let comparison = snapshot.comparison.unwrap();
        assert_eq!(comparison.previous.total_revenue, 50.0);
        assert_eq!(comparison.growth, "+500.0%");
    }

    #[test]
    fn test_analyze_unbounded() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 20).unwrap();
        let notes = vec![SalesNote::new("1/1/24", 10.0), SalesNote::new("x", 5.0)];

        let snapshot = analyze(&notes, &[], &AnalysisOptions::new(today));
        assert_eq!(snapshot.current_month_revenue, 0.0);
        assert_eq!(snapshot.summary.order_count, 2);
        assert_eq!(snapshot.summary.total_revenue, 15.0);
        assert!(snapshot.comparison.is_none());
        assert_eq!(snapshot.timeline.len(), 1);
        assert_eq!(snapshot.granularity, Granularity::Day);
    }

    #[test]
    fn test_effective_granularity() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 20).unwrap();
        let mut options = AnalysisOptions::new(today);
        options.range = RangePreset::Quarter.resolve(today);
        assert_eq!(options.effective_granularity(), Granularity::Week);

        options.granularity = Some(Granularity::Month);
        assert_eq!(options.effective_granularity(), Granularity::Month);
    }
}
