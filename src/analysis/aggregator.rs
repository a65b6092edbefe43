//! Sales aggregation and statistics.
//!
//! Pure folds over a slice of sales notes: headline KPIs, revenue grouped by
//! region, product and client, and a bucketed revenue timeline. None of these
//! functions mutate their inputs or fail; missing data degrades to zeros and
//! fallback labels.

use crate::analysis::collation::Collator;
use crate::analysis::dates::bucket_key;
use crate::models::{
    non_empty, Client, ClientRevenue, DateRange, Granularity, ProductRevenue, RegionRevenue,
    SalesNote, SalesSummary, TimelinePoint, UNDEFINED_REGION, UNIDENTIFIED_CLIENT,
    UNKNOWN_CLIENT_ID,
};
use chrono::NaiveTime;
use indexmap::IndexMap;
use std::borrow::Cow;
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::debug;

/// Index clients by id. The first client with a given id wins.
fn index_clients(clients: &[Client]) -> HashMap<Option<&str>, &Client> {
    let mut index = HashMap::with_capacity(clients.len());
    for client in clients {
        index.entry(client.id.as_deref()).or_insert(client);
    }
    index
}

fn by_revenue_desc(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

/// Keep only notes dated within `range`, inclusive on both ends.
///
/// When either bound is missing the input is returned as-is (borrowed).
/// Otherwise notes whose date doesn't parse are dropped. Note dates compare
/// as midnight of their day.
pub fn filter_notes_by_range<'a>(notes: &'a [SalesNote], range: &DateRange) -> Cow<'a, [SalesNote]> {
    let Some((from, to)) = range.bounds() else {
        return Cow::Borrowed(notes);
    };

    let kept: Vec<SalesNote> = notes
        .iter()
        .filter(|note| {
            note.parsed_date()
                .map(|date| date.and_time(NaiveTime::MIN))
                .is_some_and(|at| at >= from && at <= to)
        })
        .cloned()
        .collect();

    debug!(
        "Range {} kept {} of {} notes",
        range,
        kept.len(),
        notes.len()
    );

    Cow::Owned(kept)
}

/// Total revenue, order count and average order value.
pub fn sales_summary(notes: &[SalesNote]) -> SalesSummary {
    let total_revenue: f64 = notes.iter().map(SalesNote::revenue).sum();
    let order_count = notes.len();
    let avg_order_value = if order_count > 0 {
        total_revenue / order_count as f64
    } else {
        0.0
    };

    SalesSummary {
        total_revenue,
        order_count,
        avg_order_value,
    }
}

/// Revenue per region, highest first.
///
/// Region resolves from the client directory entry matching the note's
/// `clientId`, then the note's own `region`, then [`UNDEFINED_REGION`].
pub fn sales_by_region(notes: &[SalesNote], clients: &[Client]) -> Vec<RegionRevenue> {
    let directory = index_clients(clients);
    let mut groups: IndexMap<String, RegionRevenue> = IndexMap::new();

    for note in notes {
        let client = directory.get(&note.client_id.as_deref());
        let region = client
            .and_then(|c| non_empty(&c.region))
            .or_else(|| non_empty(&note.region))
            .unwrap_or(UNDEFINED_REGION);

        groups
            .entry(region.to_string())
            .or_insert_with(|| RegionRevenue {
                region: region.to_string(),
                revenue: 0.0,
            })
            .revenue += note.revenue();
    }

    let mut rows = groups.into_values().collect::<Vec<_>>();
    rows.sort_by(|a, b| by_revenue_desc(a.revenue, b.revenue));
    rows
}

/// Quantity and revenue per product code, highest revenue first.
///
/// The first line item seen for a code fixes its display name.
pub fn sales_by_product(notes: &[SalesNote]) -> Vec<ProductRevenue> {
    let mut groups: IndexMap<String, ProductRevenue> = IndexMap::new();

    for item in notes.iter().flat_map(SalesNote::items) {
        let code = item.product_code();
        let row = groups
            .entry(code.to_string())
            .or_insert_with(|| ProductRevenue {
                code: code.to_string(),
                name: item.display_name().to_string(),
                quantity: 0.0,
                revenue: 0.0,
            });
        row.quantity += item.quantity();
        row.revenue += item.revenue();
    }

    let mut rows = groups.into_values().collect::<Vec<_>>();
    rows.sort_by(|a, b| by_revenue_desc(a.revenue, b.revenue));
    rows
}

/// Order count and revenue per client id, highest revenue first.
///
/// Notes without a `clientId` group under [`UNKNOWN_CLIENT_ID`]. The first
/// note of a group resolves its name: the directory entry's name when the id
/// matches one, else the note's `clientName`, else [`UNIDENTIFIED_CLIENT`].
pub fn sales_by_client(notes: &[SalesNote], clients: &[Client]) -> Vec<ClientRevenue> {
    let directory = index_clients(clients);
    let mut groups: IndexMap<String, ClientRevenue> = IndexMap::new();

    for note in notes {
        let client_id = non_empty(&note.client_id).unwrap_or(UNKNOWN_CLIENT_ID);
        let row = groups.entry(client_id.to_string()).or_insert_with(|| {
            let client_name = match directory.get(&Some(client_id)) {
                Some(client) => client.name.clone().unwrap_or_default(),
                None => non_empty(&note.client_name)
                    .unwrap_or(UNIDENTIFIED_CLIENT)
                    .to_string(),
            };
            ClientRevenue {
                client_id: client_id.to_string(),
                client_name,
                orders: 0,
                revenue: 0.0,
            }
        });
        row.orders += 1;
        row.revenue += note.revenue();
    }

    let mut rows = groups.into_values().collect::<Vec<_>>();
    rows.sort_by(|a, b| by_revenue_desc(a.revenue, b.revenue));
    rows
}

/// Revenue per time bucket, labels sorted with the Hebrew collator.
pub fn sales_timeline(notes: &[SalesNote], granularity: Granularity) -> Vec<TimelinePoint> {
    sales_timeline_with(notes, granularity, &Collator::default())
}

/// Revenue per time bucket, labels sorted with `collator`.
///
/// Notes whose date doesn't parse are skipped. The label sort is a string
/// collation, so `2024-10` sorts before `2024-3`.
pub fn sales_timeline_with(
    notes: &[SalesNote],
    granularity: Granularity,
    collator: &Collator,
) -> Vec<TimelinePoint> {
    let mut groups: IndexMap<String, TimelinePoint> = IndexMap::new();
    let mut skipped = 0usize;

    for note in notes {
        let Some(date) = note.parsed_date() else {
            skipped += 1;
            continue;
        };

        let label = bucket_key(date, granularity);
        groups
            .entry(label)
            .or_insert_with_key(|label| TimelinePoint {
                label: label.clone(),
                revenue: 0.0,
            })
            .revenue += note.revenue();
    }

    let mut points = groups.into_values().collect::<Vec<_>>();
    points.sort_by(|a, b| collator.compare(&a.label, &b.label));

    debug!(
        "Timeline ({}): {} buckets, {} undated notes skipped",
        granularity,
        points.len(),
        skipped
    );

    points
}

/// The `n` best-selling products.
pub fn top_products(notes: &[SalesNote], n: usize) -> Vec<ProductRevenue> {
    let mut products = sales_by_product(notes);
    products.truncate(n);
    products
}

/// The `n` products with the lowest non-zero revenue, lowest first.
pub fn weakest_products(notes: &[SalesNote], n: usize) -> Vec<ProductRevenue> {
    let mut products: Vec<ProductRevenue> = sales_by_product(notes)
        .into_iter()
        .filter(|p| p.revenue > 0.0)
        .collect();

    products.sort_by(|a, b| by_revenue_desc(b.revenue, a.revenue));
    products.truncate(n);
    products
}

/// Number of distinct client groups with at least one order.
pub fn active_clients(notes: &[SalesNote], clients: &[Client]) -> usize {
    sales_by_client(notes, clients).len()
}
