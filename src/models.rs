//! Data models for the sales analytics engine.
//!
//! Input records (`SalesNote`, `LineItem`, `Client`) mirror the shape the CRM
//! dashboard stores, so they deserialize with camelCase keys and tolerate
//! missing or oddly-typed fields. Output records are the plain aggregates the
//! engine produces.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Product code used when an item carries neither `code` nor `sku`.
pub const UNKNOWN_CODE: &str = "unknown";

/// Client group id used when a note has no `clientId`.
pub const UNKNOWN_CLIENT_ID: &str = "unknown";

/// Region label for notes whose region cannot be resolved ("undefined").
pub const UNDEFINED_REGION: &str = "לא מוגדר";

/// Client label for notes whose client cannot be resolved ("unidentified").
pub const UNIDENTIFIED_CLIENT: &str = "לא מזוהה";

/// A single sales document (delivery note / invoice).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesNote {
    /// Document date as `DD/MM/YY`.
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub doc_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub total_revenue: Option<f64>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub client_key: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
    /// Fallback region when the client directory has none.
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<LineItem>>,
}

impl SalesNote {
    /// Creates a note with a date and a total.
    pub fn new(doc_date: impl Into<String>, total_revenue: f64) -> Self {
        Self {
            doc_date: Some(doc_date.into()),
            total_revenue: Some(total_revenue),
            ..Self::default()
        }
    }

    pub fn with_client(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    pub fn with_client_name(mut self, client_name: impl Into<String>) -> Self {
        self.client_name = Some(client_name.into());
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_items(mut self, items: Vec<LineItem>) -> Self {
        self.items = Some(items);
        self
    }

    /// Total revenue, with missing or NaN values read as 0.
    pub fn revenue(&self) -> f64 {
        number_or_zero(self.total_revenue)
    }

    /// The parsed document date, if the text is a valid `D/M/YY` date.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        self.doc_date
            .as_deref()
            .and_then(crate::analysis::parse_doc_date)
    }

    /// Line items, empty when the note has none.
    pub fn items(&self) -> &[LineItem] {
        self.items.as_deref().unwrap_or(&[])
    }
}

/// One product line on a sales note.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub revenue: Option<f64>,
}

impl LineItem {
    pub fn new(code: impl Into<String>, name: impl Into<String>, quantity: f64, revenue: f64) -> Self {
        Self {
            code: Some(code.into()),
            name: Some(name.into()),
            quantity: Some(quantity),
            revenue: Some(revenue),
            ..Self::default()
        }
    }

    /// Product code: `code`, then `sku`, then [`UNKNOWN_CODE`].
    pub fn product_code(&self) -> &str {
        non_empty(&self.code)
            .or_else(|| non_empty(&self.sku))
            .unwrap_or(UNKNOWN_CODE)
    }

    /// Display label: `name`, then `description`, then the product code.
    pub fn display_name(&self) -> &str {
        non_empty(&self.name)
            .or_else(|| non_empty(&self.description))
            .unwrap_or_else(|| self.product_code())
    }

    pub fn quantity(&self) -> f64 {
        number_or_zero(self.quantity)
    }

    pub fn revenue(&self) -> f64 {
        number_or_zero(self.revenue)
    }
}

/// A client from the CRM directory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Client {
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

impl Client {
    pub fn new(id: impl Into<String>, name: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            name: Some(name.into()),
            region: Some(region.into()),
        }
    }
}

/// Time bucket used by the revenue timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Granularity {
    #[default]
    Day,
    Week,
    Month,
}

impl Granularity {
    /// Picks a bucket size suited to a range spanning `days` calendar days.
    pub fn for_span_days(days: i64) -> Self {
        if days <= 31 {
            Granularity::Day
        } else if days <= 120 {
            Granularity::Week
        } else {
            Granularity::Month
        }
    }

    /// Exact, case-sensitive match. Returns `None` for anything else.
    pub fn recognize(s: &str) -> Option<Self> {
        match s {
            "day" => Some(Granularity::Day),
            "week" => Some(Granularity::Week),
            "month" => Some(Granularity::Month),
            _ => None,
        }
    }
}

impl From<&str> for Granularity {
    /// Unrecognized values fall back to [`Granularity::Day`].
    fn from(s: &str) -> Self {
        Self::recognize(s).unwrap_or_default()
    }
}

impl From<String> for Granularity {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Granularity::Day => write!(f, "day"),
            Granularity::Week => write!(f, "week"),
            Granularity::Month => write!(f, "month"),
        }
    }
}

/// Inclusive date-time range. Either bound missing means "no filtering".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: Option<NaiveDateTime>,
    pub to: Option<NaiveDateTime>,
}

impl DateRange {
    pub fn new(from: Option<NaiveDateTime>, to: Option<NaiveDateTime>) -> Self {
        Self { from, to }
    }

    /// Range between two calendar days, both bounds at midnight.
    pub fn between_days(from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            from: Some(from.and_time(chrono::NaiveTime::MIN)),
            to: Some(to.and_time(chrono::NaiveTime::MIN)),
        }
    }

    /// Both bounds, when present.
    pub fn bounds(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        self.from.zip(self.to)
    }

    /// Number of calendar days covered, counting both ends.
    pub fn span_days(&self) -> Option<i64> {
        self.bounds()
            .map(|(from, to)| ((to.date() - from.date()).num_days() + 1).max(1))
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.bounds() {
            Some((from, to)) => write!(f, "{} – {}", from.date(), to.date()),
            None => write!(f, "all dates"),
        }
    }
}

/// Headline KPIs over a set of notes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesSummary {
    pub total_revenue: f64,
    pub order_count: usize,
    pub avg_order_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionRevenue {
    pub region: String,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRevenue {
    pub code: String,
    pub name: String,
    pub quantity: f64,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientRevenue {
    pub client_id: String,
    pub client_name: String,
    pub orders: usize,
    pub revenue: f64,
}

/// One bucket of the revenue timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelinePoint {
    pub label: String,
    pub revenue: f64,
}

/// Current vs. previous period KPIs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodComparison {
    pub current_range: DateRange,
    pub previous_range: DateRange,
    pub current: SalesSummary,
    pub previous: SalesSummary,
    /// Formatted change, e.g. `+12.5%`.
    pub growth: String,
}

/// A directory client with no recent orders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtRiskClient {
    pub key: String,
    pub name: String,
    pub last_order: Option<NaiveDate>,
}

/// Every aggregate the engine produces for one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSnapshot {
    pub range: DateRange,
    pub granularity: Granularity,
    pub summary: SalesSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison: Option<PeriodComparison>,
    pub regions: Vec<RegionRevenue>,
    pub products: Vec<ProductRevenue>,
    pub weakest_products: Vec<ProductRevenue>,
    pub clients: Vec<ClientRevenue>,
    pub active_clients: usize,
    pub at_risk_clients: Vec<AtRiskClient>,
    pub forecast_next_week: f64,
    /// Revenue of all notes from the first of the current month through today.
    pub current_month_revenue: f64,
    pub timeline: Vec<TimelinePoint>,
}

/// Metadata about a generated report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMetadata {
    pub generated_at: DateTime<Utc>,
    pub today: NaiveDate,
    pub notes_source: String,
    pub notes_loaded: usize,
    pub notes_in_range: usize,
    pub clients_loaded: usize,
    pub locale: String,
}

/// The complete sales report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesReport {
    pub metadata: ReportMetadata,
    pub snapshot: AnalyticsSnapshot,
}

/// Borrows the text of a field when it is present and not empty.
pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

fn number_or_zero(value: Option<f64>) -> f64 {
    value.filter(|v| !v.is_nan()).unwrap_or(0.0)
}

/// Accepts numbers and numeric strings; anything else reads as absent.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok().filter(|v| !v.is_nan()),
        _ => None,
    })
}

/// Accepts strings and numbers (rendered as text); anything else reads as absent.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(number_text(&n)),
        _ => None,
    })
}

fn number_text(n: &serde_json::Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e21 => format!("{:.0}", f),
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}
