//! Prompt construction for AI-generated business insights.
//!
//! The prompts are plain text handed to whatever model the caller uses;
//! nothing here talks to the network.

use crate::models::{
    AnalyticsSnapshot, ClientRevenue, ProductRevenue, RegionRevenue, TimelinePoint,
};
use crate::report::format_currency;
use serde::Serialize;

/// Number of entries from each ranking included in a prompt.
const PROMPT_TOP_N: usize = 5;

/// The figures serialized into the insight prompt.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InsightData<'a> {
    total_revenue: f64,
    order_count: usize,
    average_order_value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    growth: Option<&'a str>,
    forecast_next_week_revenue: f64,
    at_risk_clients: Vec<AtRiskEntry<'a>>,
    top_products: &'a [ProductRevenue],
    top_regions: &'a [RegionRevenue],
    top_clients: &'a [ClientRevenue],
    timeline: &'a [TimelinePoint],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AtRiskEntry<'a> {
    name: &'a str,
    last_order: Option<String>,
}

fn head<T>(items: &[T]) -> &[T] {
    &items[..items.len().min(PROMPT_TOP_N)]
}

/// Build the full insight-report prompt for a snapshot.
///
/// Asks for a Hebrew report with six sections: next-week forecast, pricing
/// opportunities, growth areas, at-risk clients, a 14-day action plan and
/// other notes.
pub fn build_insight_prompt(snapshot: &AnalyticsSnapshot) -> String {
    let data = InsightData {
        total_revenue: snapshot.summary.total_revenue,
        order_count: snapshot.summary.order_count,
        average_order_value: snapshot.summary.avg_order_value,
        growth: snapshot.comparison.as_ref().map(|c| c.growth.as_str()),
        forecast_next_week_revenue: snapshot.forecast_next_week,
        at_risk_clients: head(&snapshot.at_risk_clients)
            .iter()
            .map(|c| AtRiskEntry {
                name: &c.name,
                last_order: c.last_order.map(|d| d.to_string()),
            })
            .collect(),
        top_products: head(&snapshot.products),
        top_regions: head(&snapshot.regions),
        top_clients: head(&snapshot.clients),
        timeline: &snapshot.timeline,
    };

    let json = serde_json::to_string_pretty(&data).unwrap_or_default();

    let mut prompt = String::new();
    prompt.push_str("אתה מנתח עסק בתחום ייצור הפלסטיק. ");
    prompt.push_str("בנה דו\"ח תובנות מקיף בעברית על סמך הנתונים הבאים:\n\n");
    prompt.push_str(&json);
    prompt.push_str("\n\nספק 6 סעיפים:\n");
    prompt.push_str("1. תחזית מכירות לשבוע הבא\n");
    prompt.push_str("2. הזדמנויות תמחור ללקוחות או מוצרים\n");
    prompt.push_str("3. מוצרים או אזורים לצמיחה\n");
    prompt.push_str("4. לקוחות בסיכון (לא הזמינו זמן רב)\n");
    prompt.push_str("5. המלצות פעולה ל-14 הימים הקרובים\n");
    prompt.push_str("6. הערות חשובות נוספות\n");

    prompt
}

/// Build a prompt answering a free-form business question from the snapshot.
///
/// Returns `None` when the question is blank.
pub fn build_question_prompt(snapshot: &AnalyticsSnapshot, question: &str) -> Option<String> {
    let question = question.trim();
    if question.is_empty() {
        return None;
    }

    let products = head(&snapshot.products)
        .iter()
        .map(|p| format!("{} ({})", p.name, format_currency(p.revenue)))
        .collect::<Vec<_>>()
        .join(", ");
    let at_risk = head(&snapshot.at_risk_clients)
        .iter()
        .map(|c| c.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    let mut prompt = String::new();
    prompt.push_str("ענה בעברית על השאלה העסקית הבאה בהתבסס על נתוני המכירות:\n\n");
    prompt.push_str(&format!("שאלה: {}\n\n", question));
    prompt.push_str("נתונים זמינים:\n");
    prompt.push_str(&format!(
        "- סה\"כ הכנסות: {}\n",
        format_currency(snapshot.summary.total_revenue)
    ));
    prompt.push_str(&format!(
        "- הזמנה ממוצעת: {}\n",
        format_currency(snapshot.summary.avg_order_value)
    ));
    prompt.push_str(&format!(
        "- הכנסות חודש נוכחי: {}\n",
        format_currency(snapshot.current_month_revenue)
    ));
    if let Some(comparison) = &snapshot.comparison {
        prompt.push_str(&format!("- שינוי לעומת התקופה הקודמת: {}\n", comparison.growth));
    }
    prompt.push_str(&format!("- מוצרים מובילים: {}\n", products));
    prompt.push_str(&format!("- לקוחות בסיכון: {}\n", at_risk));

    Some(prompt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AtRiskClient, SalesSummary};

    fn snapshot() -> AnalyticsSnapshot {
        AnalyticsSnapshot {
            summary: SalesSummary {
                total_revenue: 4200.0,
                order_count: 3,
                avg_order_value: 1400.0,
            },
            current_month_revenue: 1800.0,
            products: (1..=7)
                .map(|i| ProductRevenue {
                    code: format!("P{}", i),
                    name: format!("מוצר {}", i),
                    quantity: 1.0,
                    revenue: 100.0 * (8 - i) as f64,
                })
                .collect(),
            at_risk_clients: vec![AtRiskClient {
                key: "c9".to_string(),
                name: "לקוח רדום".to_string(),
                last_order: None,
            }],
            ..AnalyticsSnapshot::default()
        }
    }

    #[test]
    fn test_insight_prompt_contains_data() {
        let prompt = build_insight_prompt(&snapshot());

        assert!(prompt.starts_with("אתה מנתח עסק"));
        assert!(prompt.contains("\"totalRevenue\": 4200.0"));
        assert!(prompt.contains("\"P5\""));
        assert!(!prompt.contains("\"P6\""));
        assert!(prompt.contains("לקוח רדום"));
        assert!(prompt.contains("6. הערות חשובות נוספות"));
    }

    #[test]
    fn test_question_prompt() {
        let prompt = build_question_prompt(&snapshot(), "  אילו מוצרים לקדם?  ").unwrap();

        assert!(prompt.contains("שאלה: אילו מוצרים לקדם?\n"));
        assert!(prompt.contains("- סה\"כ הכנסות: ₪4,200"));
        assert!(prompt.contains("- הכנסות חודש נוכחי: ₪1,800\n"));
        assert!(prompt.contains("מוצר 1 (₪700)"));
        assert!(prompt.contains("- לקוחות בסיכון: לקוח רדום"));
    }

    #[test]
    fn test_blank_question() {
        assert!(build_question_prompt(&snapshot(), "   ").is_none());
    }
}
