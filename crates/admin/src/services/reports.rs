//! Sales report aggregation over fetched rows.

use std::collections::{BTreeMap, HashMap, HashSet};

use rust_decimal::Decimal;

use jerseyworks_core::{OrderId, OrderStatus};

use crate::db::reports::{DateRange, ReportLine, ReportOrder};
use crate::models::{MonthRevenue, ReportSummary, StatusCount, TopProduct};

/// Best sellers listed in a report.
pub const TOP_PRODUCTS: usize = 10;

/// Build the summary for `range` from its orders and their lines.
///
/// Cancelled orders appear in `order_count` and `by_status` only.
#[must_use]
pub fn summarize(range: DateRange, orders: &[ReportOrder], lines: &[ReportLine]) -> ReportSummary {
    let mut by_status: HashMap<OrderStatus, u64> = HashMap::new();
    let mut months: BTreeMap<String, (u64, Decimal)> = BTreeMap::new();
    let mut live_orders: HashSet<OrderId> = HashSet::new();
    let mut revenue = Decimal::ZERO;
    let mut collected = Decimal::ZERO;
    let mut outstanding = Decimal::ZERO;

    for order in orders {
        *by_status.entry(order.status).or_default() += 1;

        if order.status == OrderStatus::Cancelled {
            continue;
        }
        live_orders.insert(order.id);
        revenue += order.total_amount;
        collected += order.paid_amount;
        outstanding += (order.total_amount - order.paid_amount).max(Decimal::ZERO);

        let month = months
            .entry(order.created_at.format("%Y-%m").to_string())
            .or_default();
        month.0 += 1;
        month.1 += order.total_amount;
    }

    let live_count = live_orders.len() as u64;
    let average_order_value = if live_count == 0 {
        Decimal::ZERO
    } else {
        (revenue / Decimal::from(live_count)).round_dp(2)
    };

    ReportSummary {
        from: range.from,
        to: range.to,
        order_count: orders.len() as u64,
        revenue,
        collected,
        outstanding,
        average_order_value,
        by_status: OrderStatus::ALL
            .into_iter()
            .map(|status| StatusCount {
                status,
                count: by_status.get(&status).copied().unwrap_or(0),
            })
            .collect(),
        revenue_by_month: months
            .into_iter()
            .map(|(month, (order_count, revenue))| MonthRevenue {
                month,
                order_count,
                revenue,
            })
            .collect(),
        top_products: top_products(lines, &live_orders),
    }
}

fn top_products(lines: &[ReportLine], live_orders: &HashSet<OrderId>) -> Vec<TopProduct> {
    // Deleted products keep their snapshot name, so group by name when the ID is gone
    let mut totals: HashMap<(Option<_>, String), (u64, Decimal)> = HashMap::new();
    for line in lines.iter().filter(|l| live_orders.contains(&l.order_id)) {
        let key = (
            line.product_id,
            if line.product_id.is_some() {
                String::new()
            } else {
                line.product_name.clone()
            },
        );
        let entry = totals.entry(key).or_default();
        entry.0 += u64::try_from(line.quantity).unwrap_or(0);
        entry.1 += line.line_total;
    }

    let names: HashMap<_, _> = lines
        .iter()
        .filter_map(|l| l.product_id.map(|id| (id, l.product_name.as_str())))
        .collect();

    let mut products: Vec<TopProduct> = totals
        .into_iter()
        .map(|((product_id, name), (units, revenue))| TopProduct {
            product_name: product_id
                .and_then(|id| names.get(&id).map(|n| (*n).to_owned()))
                .unwrap_or(name),
            product_id,
            units,
            revenue,
        })
        .collect();

    products.sort_by(|a, b| {
        b.units
            .cmp(&a.units)
            .then_with(|| b.revenue.cmp(&a.revenue))
            .then_with(|| a.product_name.cmp(&b.product_name))
    });
    products.truncate(TOP_PRODUCTS);
    products
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};

    use jerseyworks_core::ProductId;

    use super::*;

    fn order(status: OrderStatus, total: i64, paid: i64, month: u32) -> ReportOrder {
        ReportOrder {
            id: OrderId::new(),
            status,
            total_amount: Decimal::from(total),
            paid_amount: Decimal::from(paid),
            created_at: Utc.with_ymd_and_hms(2026, month, 10, 12, 0, 0).unwrap(),
        }
    }

    fn line(order: &ReportOrder, product: Option<ProductId>, name: &str, qty: i32) -> ReportLine {
        ReportLine {
            order_id: order.id,
            product_id: product,
            product_name: name.to_owned(),
            quantity: qty,
            line_total: Decimal::from(qty) * Decimal::from(100),
        }
    }

    #[test]
    fn test_empty_range() {
        let summary = summarize(DateRange::default(), &[], &[]);
        assert_eq!(summary.order_count, 0);
        assert_eq!(summary.average_order_value, Decimal::ZERO);
        assert_eq!(summary.by_status.len(), OrderStatus::ALL.len());
        assert!(summary.by_status.iter().all(|s| s.count == 0));
        assert!(summary.top_products.is_empty());
    }

    #[test]
    fn test_money_excludes_cancelled() {
        let orders = vec![
            order(OrderStatus::Verified, 90_000, 45_000, 3),
            order(OrderStatus::Pending, 10_000, 0, 3),
            order(OrderStatus::Cancelled, 50_000, 0, 4),
            order(OrderStatus::Completed, 20_000, 20_000, 5),
        ];
        let summary = summarize(DateRange::default(), &orders, &[]);

        assert_eq!(summary.order_count, 4);
        assert_eq!(summary.revenue, Decimal::from(120_000));
        assert_eq!(summary.collected, Decimal::from(65_000));
        assert_eq!(summary.outstanding, Decimal::from(55_000));
        assert_eq!(summary.average_order_value, Decimal::from(40_000));

        let cancelled = summary
            .by_status
            .iter()
            .find(|s| s.status == OrderStatus::Cancelled)
            .unwrap();
        assert_eq!(cancelled.count, 1);

        let months: Vec<_> = summary
            .revenue_by_month
            .iter()
            .map(|m| (m.month.as_str(), m.order_count))
            .collect();
        assert_eq!(months, vec![("2026-03", 2), ("2026-05", 1)]);
    }

    #[test]
    fn test_top_products_by_units() {
        let home = ProductId::new();
        let away = ProductId::new();
        let a = order(OrderStatus::Verified, 1, 0, 1);
        let b = order(OrderStatus::Production, 1, 0, 1);
        let dead = order(OrderStatus::Cancelled, 1, 0, 1);
        let lines = vec![
            line(&a, Some(home), "Home Kit", 150),
            line(&b, Some(home), "Home Kit", 50),
            line(&a, Some(away), "Away Kit", 120),
            line(&b, None, "Retired Tee", 10),
            line(&dead, Some(away), "Away Kit", 500),
        ];
        let summary = summarize(DateRange::default(), &[a, b, dead], &lines);

        let top: Vec<_> = summary
            .top_products
            .iter()
            .map(|p| (p.product_name.as_str(), p.units))
            .collect();
        assert_eq!(
            top,
            vec![("Home Kit", 200), ("Away Kit", 120), ("Retired Tee", 10)]
        );
    }
}
