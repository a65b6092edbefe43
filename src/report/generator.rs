//! Markdown and JSON sales report generation.

use crate::models::{
    AnalyticsSnapshot, AtRiskClient, ClientRevenue, PeriodComparison, ProductRevenue,
    RegionRevenue, ReportMetadata, SalesReport, SalesSummary, TimelinePoint,
};
use anyhow::Result;
use std::path::Path;

/// Format an amount as shekels with thousands separators and no decimals.
pub fn format_currency(amount: f64) -> String {
    let rounded = amount.round();
    let negative = rounded < 0.0;
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    format!("{}₪{}", if negative { "-" } else { "" }, grouped)
}

fn format_quantity(quantity: f64) -> String {
    if quantity.fract() == 0.0 {
        format!("{:.0}", quantity)
    } else {
        format!("{:.2}", quantity)
    }
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &SalesReport) -> String {
    let snapshot = &report.snapshot;
    let mut output = String::new();

    output.push_str("# NA Kasem Sales Report\n\n");
    output.push_str(&generate_metadata_section(&report.metadata, snapshot));
    output.push_str(&generate_summary_section(
        &snapshot.summary,
        snapshot.comparison.as_ref(),
        snapshot.active_clients,
        snapshot.forecast_next_week,
    ));
    output.push_str(&generate_region_section(&snapshot.regions, snapshot.summary.total_revenue));
    output.push_str(&generate_product_section(&snapshot.products, &snapshot.weakest_products));
    output.push_str(&generate_client_section(&snapshot.clients, &snapshot.at_risk_clients));
    output.push_str(&generate_timeline_section(snapshot));
    output.push_str(&generate_footer());

    output
}

fn generate_metadata_section(metadata: &ReportMetadata, snapshot: &AnalyticsSnapshot) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Source:** `{}`\n", metadata.notes_source));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Reference Day:** {}\n", metadata.today));
    section.push_str(&format!("- **Range:** {}\n", snapshot.range));
    section.push_str(&format!(
        "- **Notes:** {} in range of {} loaded\n",
        metadata.notes_in_range, metadata.notes_loaded
    ));
    section.push_str(&format!("- **Clients in Directory:** {}\n", metadata.clients_loaded));
    section.push('\n');

    section
}

fn generate_summary_section(
    summary: &SalesSummary,
    comparison: Option<&PeriodComparison>,
    active_clients: usize,
    forecast: f64,
) -> String {
    let mut section = String::new();

    section.push_str("## Summary\n\n");
    section.push_str("| Revenue | Orders | Avg. Order | Active Clients | Next-Week Forecast |\n");
    section.push_str("|:---:|:---:|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {} | {} | {} | {} | {} |\n\n",
        format_currency(summary.total_revenue),
        summary.order_count,
        format_currency(summary.avg_order_value),
        active_clients,
        format_currency(forecast),
    ));

    if let Some(comparison) = comparison {
        section.push_str(&format!(
            "Revenue {} vs. previous period ({}: {}).\n\n",
            comparison.growth,
            comparison.previous_range,
            format_currency(comparison.previous.total_revenue)
        ));
    }

    section
}

fn generate_region_section(regions: &[RegionRevenue], total: f64) -> String {
    let mut section = String::new();

    section.push_str("## Revenue by Region\n\n");
    if regions.is_empty() {
        section.push_str("No sales in range.\n\n");
        return section;
    }

    section.push_str("| Region | Revenue | Share |\n");
    section.push_str("|:---|---:|---:|\n");
    for region in regions {
        let share = if total > 0.0 {
            region.revenue / total * 100.0
        } else {
            0.0
        };
        section.push_str(&format!(
            "| {} | {} | {:.1}% |\n",
            region.region,
            format_currency(region.revenue),
            share
        ));
    }
    section.push('\n');

    section
}

fn generate_product_section(top: &[ProductRevenue], weakest: &[ProductRevenue]) -> String {
    let mut section = String::new();

    section.push_str("## Products\n\n");
    if top.is_empty() {
        section.push_str("No line items in range.\n\n");
        return section;
    }

    section.push_str("### Best Sellers\n\n");
    section.push_str(&product_table(top));

    if !weakest.is_empty() {
        section.push_str("### Weakest Sellers\n\n");
        section.push_str(&product_table(weakest));
    }

    section
}

fn product_table(products: &[ProductRevenue]) -> String {
    let mut table = String::new();

    table.push_str("| Code | Product | Quantity | Revenue |\n");
    table.push_str("|:---|:---|---:|---:|\n");
    for product in products {
        table.push_str(&format!(
            "| `{}` | {} | {} | {} |\n",
            product.code,
            product.name,
            format_quantity(product.quantity),
            format_currency(product.revenue)
        ));
    }
    table.push('\n');

    table
}

fn generate_client_section(clients: &[ClientRevenue], at_risk: &[AtRiskClient]) -> String {
    let mut section = String::new();

    section.push_str("## Top Clients\n\n");
    if clients.is_empty() {
        section.push_str("No orders in range.\n\n");
    } else {
        section.push_str("| Client | Orders | Revenue |\n");
        section.push_str("|:---|:---:|---:|\n");
        for client in clients {
            section.push_str(&format!(
                "| {} | {} | {} |\n",
                client.client_name,
                client.orders,
                format_currency(client.revenue)
            ));
        }
        section.push('\n');
    }

    if !at_risk.is_empty() {
        section.push_str("### Clients at Risk\n\n");
        for client in at_risk {
            let last = client
                .last_order
                .map(|d| d.to_string())
                .unwrap_or_else(|| "never".to_string());
            section.push_str(&format!("- {} (last order: {})\n", client.name, last));
        }
        section.push('\n');
    }

    section
}

fn generate_timeline_section(snapshot: &AnalyticsSnapshot) -> String {
    let mut section = String::new();

    section.push_str(&format!("## Timeline ({})\n\n", snapshot.granularity));
    if snapshot.timeline.is_empty() {
        section.push_str("No dated notes in range.\n\n");
        return section;
    }

    section.push_str("| Period | Revenue |\n");
    section.push_str("|:---|---:|\n");
    for TimelinePoint { label, revenue } in &snapshot.timeline {
        section.push_str(&format!("| {} | {} |\n", label, format_currency(*revenue)));
    }
    section.push('\n');

    section
}

fn generate_footer() -> String {
    "---\n\n*Report generated by na-kasem-analytics*\n".to_string()
}

/// Generate a JSON report.
pub fn generate_json_report(report: &SalesReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Write rendered report content to a file.
pub fn write_report(content: &str, path: &Path) -> Result<()> {
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DateRange, Granularity};
    use chrono::{NaiveDate, Utc};

    fn create_test_report() -> SalesReport {
        let today = NaiveDate::from_ymd_opt(2024, 3, 20).unwrap();
        let metadata = ReportMetadata {
            generated_at: Utc::now(),
            today,
            notes_source: "notes.json".to_string(),
            notes_loaded: 10,
            notes_in_range: 2,
            clients_loaded: 3,
            locale: "he-IL".to_string(),
        };

        let snapshot = AnalyticsSnapshot {
            range: DateRange::between_days(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), today),
            granularity: Granularity::Month,
            summary: SalesSummary {
                total_revenue: 1500.0,
                order_count: 2,
                avg_order_value: 750.0,
            },
            regions: vec![RegionRevenue {
                region: "צפון".to_string(),
                revenue: 1500.0,
            }],
            products: vec![ProductRevenue {
                code: "P1".to_string(),
                name: "צינור".to_string(),
                quantity: 12.0,
                revenue: 1500.0,
            }],
            clients: vec![ClientRevenue {
                client_id: "c1".to_string(),
                client_name: "מפעל הצפון".to_string(),
                orders: 2,
                revenue: 1500.0,
            }],
            active_clients: 1,
            at_risk_clients: vec![AtRiskClient {
                key: "c9".to_string(),
                name: "לקוח רדום".to_string(),
                last_order: None,
            }],
            timeline: vec![TimelinePoint {
                label: "2024-3".to_string(),
                revenue: 1500.0,
            }],
            ..AnalyticsSnapshot::default()
        };

        SalesReport { metadata, snapshot }
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0.0), "₪0");
        assert_eq!(format_currency(999.4), "₪999");
        assert_eq!(format_currency(1250.5), "₪1,251");
        assert_eq!(format_currency(1234567.0), "₪1,234,567");
        assert_eq!(format_currency(-4500.0), "-₪4,500");
    }

    #[test]
    fn test_generate_markdown_report() {
        let markdown = generate_markdown_report(&create_test_report());

        assert!(markdown.contains("# NA Kasem Sales Report"));
        assert!(markdown.contains("## Summary"));
        assert!(markdown.contains("₪1,500"));
        assert!(markdown.contains("| צפון | ₪1,500 | 100.0% |"));
        assert!(markdown.contains("`P1`"));
        assert!(markdown.contains("מפעל הצפון"));
        assert!(markdown.contains("לקוח רדום (last order: never)"));
        assert!(markdown.contains("## Timeline (month)"));
        assert!(markdown.contains("| 2024-3 | ₪1,500 |"));
    }

    #[test]
    fn test_summary_section_with_comparison() {
        let day = |d| NaiveDate::from_ymd_opt(2024, 3, d).unwrap();
        let comparison = PeriodComparison {
            current_range: DateRange::between_days(day(11), day(20)),
            previous_range: DateRange::between_days(day(1), day(10)),
            current: SalesSummary::default(),
            previous: SalesSummary {
                total_revenue: 200.0,
                order_count: 1,
                avg_order_value: 200.0,
            },
            growth: "-100.0%".to_string(),
        };

        let section = generate_summary_section(&SalesSummary::default(), Some(&comparison), 0, 0.0);
        assert!(section.contains("Revenue -100.0% vs. previous period"));
        assert!(section.contains("₪200"));
    }

    #[test]
    fn test_empty_sections() {
        let mut report = create_test_report();
        report.snapshot = AnalyticsSnapshot::default();

        let markdown = generate_markdown_report(&report);
        assert!(markdown.contains("No sales in range."));
        assert!(markdown.contains("No line items in range."));
        assert!(markdown.contains("No dated notes in range."));
        assert!(!markdown.contains("Clients at Risk"));
    }

    #[test]
    fn test_generate_json_report() {
        let json = generate_json_report(&create_test_report()).unwrap();

        assert!(json.contains("\"metadata\""));
        assert!(json.contains("\"totalRevenue\""));
        assert!(json.contains("\"clientName\""));
        assert!(json.contains("\"timeline\""));
    }
}
