//! Pure derived views over an order snapshot.
//!
//! Every function here is a side-effect-free function of the collection it is
//! given; nothing is cached between invocations, so a recompute is always
//! consistent with the latest snapshot. Callers pass `now` explicitly, which
//! keeps calendar-month bucketing deterministic under test.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::Serialize;
use utoipa::ToSchema;

use crate::models::{Order, OrderStatus};

/// Headline numbers for the dashboard cards, each paired with its
/// month-over-month percentage change.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
pub struct DashboardStats {
    pub total_orders: usize,
    pub total_orders_change: i32,
    /// Distinct customer ids across the whole collection, not order count.
    pub active_customers: usize,
    pub active_customers_change: i32,
    pub total_revenue: Decimal,
    pub revenue_change: i32,
    pub pending_orders: usize,
    pub pending_orders_change: i32,
}

/// One slice of the status pie. In-progress and measuring share a slice.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
pub struct StatusSlice {
    pub label: String,
    pub percent: i32,
}

#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
pub struct PopularItem {
    pub item: String,
    pub orders: usize,
    pub revenue: Decimal,
}

/// One calendar-month bucket of the six-month revenue trend.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
pub struct MonthlyRevenue {
    /// Short month name, e.g. "Mar".
    pub month: String,
    pub revenue: Decimal,
    pub orders: usize,
}

/// All derived views in one bundle; the reducer the subscription feeds.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
pub struct DashboardSnapshot {
    pub stats: DashboardStats,
    pub status_distribution: Vec<StatusSlice>,
    pub popular_items: Vec<PopularItem>,
    pub revenue_trend: Vec<MonthlyRevenue>,
}

impl DashboardSnapshot {
    pub fn compute(orders: &[Order], now: DateTime<Utc>) -> Self {
        Self {
            stats: dashboard_stats(orders, now),
            status_distribution: status_distribution(orders),
            popular_items: popular_items(orders),
            revenue_trend: revenue_trend(orders, now),
        }
    }
}

/// Percentage change between two period values, rounded to the nearest whole
/// percent. A zero prior period reads as 0, never a division error.
pub fn pct_change(cur: Decimal, prev: Decimal) -> i32 {
    if prev.is_zero() {
        return 0;
    }
    ((cur - prev) / prev * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i32()
        .unwrap_or(0)
}

fn pct_change_count(cur: usize, prev: usize) -> i32 {
    pct_change(Decimal::from(cur as u64), Decimal::from(prev as u64))
}

/// Start of the calendar month `back` months before the month of `now`.
/// `back` may be negative to move forward.
fn month_start(now: DateTime<Utc>, back: i32) -> DateTime<Utc> {
    let total = now.year() * 12 + now.month0() as i32 - back;
    let year = total.div_euclid(12);
    let month = total.rem_euclid(12) as u32 + 1;
    // Day 1 of a valid month always exists.
    NaiveDate::from_ymd_opt(year, month, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        .and_utc()
}

fn in_window(order: &Order, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
    order.created_at >= start && order.created_at < end
}

pub fn dashboard_stats(orders: &[Order], now: DateTime<Utc>) -> DashboardStats {
    let this_month = month_start(now, 0);
    let last_month = month_start(now, 1);

    let current: Vec<&Order> = orders.iter().filter(|o| o.created_at >= this_month).collect();
    let prior: Vec<&Order> = orders
        .iter()
        .filter(|o| in_window(o, last_month, this_month))
        .collect();

    let distinct = |set: &[&Order]| {
        set.iter()
            .map(|o| o.customer_id.as_str())
            .collect::<std::collections::HashSet<_>>()
            .len()
    };
    let revenue = |set: &[&Order]| set.iter().map(|o| o.amount).sum::<Decimal>();
    let pending = |set: &[&Order]| {
        set.iter()
            .filter(|o| o.status == OrderStatus::Pending)
            .count()
    };

    DashboardStats {
        total_orders: orders.len(),
        total_orders_change: pct_change_count(current.len(), prior.len()),
        active_customers: orders
            .iter()
            .map(|o| o.customer_id.as_str())
            .collect::<std::collections::HashSet<_>>()
            .len(),
        active_customers_change: pct_change_count(distinct(&current), distinct(&prior)),
        total_revenue: orders.iter().map(|o| o.amount).sum(),
        revenue_change: pct_change(revenue(&current), revenue(&prior)),
        pending_orders: orders
            .iter()
            .filter(|o| o.status == OrderStatus::Pending)
            .count(),
        pending_orders_change: pct_change_count(pending(&current), pending(&prior)),
    }
}

/// Percentage share per visual bucket. Delivered orders have left the
/// workshop and do not appear on this chart. An empty workshop renders the
/// documented 65/25/10 placeholder split so the chart stays drawable.
pub fn status_distribution(orders: &[Order]) -> Vec<StatusSlice> {
    let completed = orders
        .iter()
        .filter(|o| o.status == OrderStatus::Completed)
        .count();
    let in_progress = orders
        .iter()
        .filter(|o| matches!(o.status, OrderStatus::InProgress | OrderStatus::Measuring))
        .count();
    let pending = orders
        .iter()
        .filter(|o| o.status == OrderStatus::Pending)
        .count();

    let total = completed + in_progress + pending;
    if total == 0 {
        return vec![
            slice("Completed", 65),
            slice("In Progress", 25),
            slice("Pending", 10),
        ];
    }

    let share = |count: usize| {
        (Decimal::from(count as u64) / Decimal::from(total as u64) * Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i32()
            .unwrap_or(0)
    };

    vec![
        slice("Completed", share(completed)),
        slice("In Progress", share(in_progress)),
        slice("Pending", share(pending)),
    ]
}

fn slice(label: &str, percent: i32) -> StatusSlice {
    StatusSlice {
        label: label.to_string(),
        percent,
    }
}

/// Canonical display form of a garment name: separators become spaces, the
/// whole name is lower-cased, then the first letter is capitalized. This is
/// what merges "wedding-dress" and "Wedding Dress" into one bucket.
pub fn normalize_item(raw: &str) -> String {
    let lowered: String = raw
        .to_lowercase()
        .chars()
        .map(|c| if c == '-' || c == '_' { ' ' } else { c })
        .collect();
    let mut chars = lowered.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Top five garment types by order count. An empty collection falls back to
/// the showcase catalogue so the chart has something to draw.
pub fn popular_items(orders: &[Order]) -> Vec<PopularItem> {
    let mut buckets: HashMap<String, (usize, Decimal)> = HashMap::new();
    for order in orders {
        let entry = buckets
            .entry(normalize_item(&order.item))
            .or_insert((0, Decimal::ZERO));
        entry.0 += 1;
        entry.1 += order.amount;
    }

    if buckets.is_empty() {
        return default_popular_items();
    }

    let mut items: Vec<PopularItem> = buckets
        .into_iter()
        .map(|(item, (orders, revenue))| PopularItem {
            item,
            orders,
            revenue,
        })
        .collect();
    // Count descending, name ascending for a stable chart.
    items.sort_by(|a, b| b.orders.cmp(&a.orders).then(a.item.cmp(&b.item)));
    items.truncate(5);
    items
}

fn default_popular_items() -> Vec<PopularItem> {
    [
        ("Shalwar Kameez", 45, dec!(157500)),
        ("Formal Suit", 32, dec!(256000)),
        ("Wedding Dress", 18, dec!(270000)),
        ("Casual Dress", 12, dec!(50400)),
        ("Kurta", 8, dec!(24000)),
    ]
    .into_iter()
    .map(|(item, orders, revenue)| PopularItem {
        item: item.to_string(),
        orders,
        revenue,
    })
    .collect()
}

/// The six most recent calendar months including the current one, oldest
/// first. Each bucket is an independent half-open interval, so an order
/// belongs to exactly one month by `created_at`.
pub fn revenue_trend(orders: &[Order], now: DateTime<Utc>) -> Vec<MonthlyRevenue> {
    (0..6)
        .rev()
        .map(|back| {
            let start = month_start(now, back);
            let end = month_start(now, back - 1);
            let in_month: Vec<&Order> = orders
                .iter()
                .filter(|o| in_window(o, start, end))
                .collect();
            MonthlyRevenue {
                month: start.format("%b").to_string(),
                revenue: in_month.iter().map(|o| o.amount).sum(),
                orders: in_month.len(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn order(customer: &str, item: &str, status: OrderStatus, amount: Decimal, created_at: DateTime<Utc>) -> Order {
        Order {
            id: format!("{customer}-{item}-{created_at}"),
            customer_id: customer.to_string(),
            customer_name: customer.to_string(),
            customer_email: format!("{customer}@email.com"),
            item: item.to_string(),
            description: None,
            fabric: None,
            measurements: None,
            status,
            amount,
            notes: None,
            due_date: None,
            created_at,
            updated_at: created_at,
        }
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn pct_change_handles_zero_prior_period() {
        assert_eq!(pct_change(dec!(5), dec!(0)), 0);
        assert_eq!(pct_change(dec!(115), dec!(100)), 15);
        assert_eq!(pct_change(dec!(85), dec!(100)), -15);
    }

    #[test]
    fn pct_change_rounds_to_nearest_whole_percent() {
        assert_eq!(pct_change(dec!(104.9), dec!(100)), 5);
        assert_eq!(pct_change(dec!(104.4), dec!(100)), 4);
        assert_eq!(pct_change(dec!(50), dec!(100)), -50);
    }

    #[test]
    fn active_customers_counts_distinct_ids() {
        let now = at(2026, 8, 30, 12);
        let orders = vec![
            order("a", "kurta", OrderStatus::Pending, dec!(10), now),
            order("a", "kurta", OrderStatus::Pending, dec!(20), now),
            order("b", "kurta", OrderStatus::Pending, dec!(30), now),
        ];
        let stats = dashboard_stats(&orders, now);
        assert_eq!(stats.active_customers, 2);
        assert_eq!(stats.total_orders, 3);
        assert_eq!(stats.total_revenue, dec!(60));
        assert_eq!(stats.pending_orders, 3);
    }

    #[test]
    fn month_over_month_changes_use_calendar_windows() {
        let now = at(2026, 8, 30, 12);
        let mut orders = Vec::new();
        // 4 orders last month, 5 this month: +25%.
        for i in 0..4 {
            orders.push(order("a", "suit", OrderStatus::Completed, dec!(100), at(2026, 7, i + 1, 9)));
        }
        for i in 0..5 {
            orders.push(order("b", "suit", OrderStatus::Completed, dec!(100), at(2026, 8, i + 1, 9)));
        }
        let stats = dashboard_stats(&orders, now);
        assert_eq!(stats.total_orders_change, 25);
        assert_eq!(stats.revenue_change, 25);
    }

    #[test]
    fn last_day_of_month_belongs_to_that_month() {
        // 2026-07-31 23:00 is still July, whatever the time of day.
        let now = at(2026, 8, 15, 0);
        let july_order = order(
            "a",
            "suit",
            OrderStatus::Completed,
            dec!(500),
            at(2026, 7, 31, 23),
        );
        let stats = dashboard_stats(&[july_order.clone()], now);
        // Prior month has 1 order, current has 0: change is -100%.
        assert_eq!(stats.total_orders_change, -100);

        let trend = revenue_trend(&[july_order], now);
        let july = trend.iter().find(|m| m.month == "Jul").unwrap();
        assert_eq!(july.orders, 1);
        assert_eq!(july.revenue, dec!(500));
        let august = trend.iter().find(|m| m.month == "Aug").unwrap();
        assert_eq!(august.orders, 0);
    }

    #[test]
    fn revenue_trend_spans_six_months_across_year_boundary() {
        let now = at(2026, 2, 10, 0);
        let orders = vec![
            order("a", "suit", OrderStatus::Completed, dec!(100), at(2025, 9, 5, 0)),
            order("a", "suit", OrderStatus::Completed, dec!(200), at(2026, 1, 5, 0)),
            // Outside the window: seven months back.
            order("a", "suit", OrderStatus::Completed, dec!(999), at(2025, 8, 31, 23)),
        ];
        let trend = revenue_trend(&orders, now);
        assert_eq!(
            trend.iter().map(|m| m.month.as_str()).collect::<Vec<_>>(),
            vec!["Sep", "Oct", "Nov", "Dec", "Jan", "Feb"]
        );
        assert_eq!(trend[0].revenue, dec!(100));
        assert_eq!(trend[4].revenue, dec!(200));
        assert_eq!(trend.iter().map(|m| m.orders).sum::<usize>(), 2);
    }

    #[test]
    fn status_distribution_merges_measuring_into_in_progress() {
        let now = at(2026, 8, 30, 12);
        let orders = vec![
            order("a", "suit", OrderStatus::Completed, dec!(1), now),
            order("b", "suit", OrderStatus::InProgress, dec!(1), now),
            order("c", "suit", OrderStatus::Measuring, dec!(1), now),
            order("d", "suit", OrderStatus::Pending, dec!(1), now),
        ];
        let dist = status_distribution(&orders);
        assert_eq!(dist[0], slice("Completed", 25));
        assert_eq!(dist[1], slice("In Progress", 50));
        assert_eq!(dist[2], slice("Pending", 25));
    }

    #[test]
    fn empty_collection_renders_the_default_split() {
        let dist = status_distribution(&[]);
        assert_eq!(
            dist,
            vec![
                slice("Completed", 65),
                slice("In Progress", 25),
                slice("Pending", 10),
            ]
        );
    }

    #[test]
    fn differently_formatted_item_names_merge() {
        let now = at(2026, 8, 30, 12);
        let orders = vec![
            order("a", "wedding-dress", OrderStatus::Pending, dec!(1000), now),
            order("b", "Wedding Dress", OrderStatus::Pending, dec!(2000), now),
            order("c", "kurta", OrderStatus::Pending, dec!(300), now),
        ];
        let items = popular_items(&orders);
        assert_eq!(items[0].item, "Wedding dress");
        assert_eq!(items[0].orders, 2);
        assert_eq!(items[0].revenue, dec!(3000));
        assert_eq!(items[1].item, "Kurta");
    }

    #[test]
    fn popular_items_caps_at_five() {
        let now = at(2026, 8, 30, 12);
        let orders: Vec<Order> = ["a", "b", "c", "d", "e", "f", "g"]
            .iter()
            .map(|item| order("cust", item, OrderStatus::Pending, dec!(10), now))
            .collect();
        assert_eq!(popular_items(&orders).len(), 5);
    }

    #[test]
    fn popular_items_falls_back_to_showcase_catalogue() {
        let items = popular_items(&[]);
        assert_eq!(items.len(), 5);
        assert_eq!(items[0].item, "Shalwar Kameez");
        assert_eq!(items[0].orders, 45);
    }

    #[test]
    fn snapshot_is_a_pure_function_of_the_collection() {
        let now = at(2026, 8, 30, 12);
        let orders = vec![
            order("a", "kurta", OrderStatus::Pending, dec!(100), at(2026, 8, 1, 0)),
            order("b", "suit", OrderStatus::Completed, dec!(200), at(2026, 7, 15, 0)),
        ];
        let first = DashboardSnapshot::compute(&orders, now);
        let second = DashboardSnapshot::compute(&orders, now);
        assert_eq!(first, second);
    }
}
