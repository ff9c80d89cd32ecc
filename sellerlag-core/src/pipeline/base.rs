//! Base builder: order/item join, delay computation, seller eligibility.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::config::AnalysisConfig;
use crate::domain::{OrderItemRecord, OrderRecord, OrderSellerRecord, OrderSellerTable};
use crate::stats::floor_days;

/// Join items to orders and compute per-row delivery delay.
///
/// - Orders are restricted to "delivered" when `only_delivered` is set.
/// - Each (order_id, seller_id) pair yields one row; repeated item rows for
///   the same pair collapse to the first.
/// - Rows without an estimated or actual delivery date are dropped.
/// - `late_days` is clipped at zero when `late_days_clip_at_zero` is set.
pub fn build_order_seller_base(
    orders: &[OrderRecord],
    items: &[OrderItemRecord],
    config: &AnalysisConfig,
) -> OrderSellerTable {
    let mut by_id: HashMap<&str, &OrderRecord> = HashMap::with_capacity(orders.len());
    for order in orders {
        if config.only_delivered && !order.is_delivered() {
            continue;
        }
        by_id.entry(order.order_id.as_str()).or_insert(order);
    }

    let mut seen: HashSet<(&str, &str)> = HashSet::with_capacity(items.len());
    let mut rows = Vec::with_capacity(items.len());
    let mut dropped_missing = 0usize;

    for item in items {
        let Some(order) = by_id.get(item.order_id.as_str()) else {
            continue;
        };
        if !seen.insert((item.order_id.as_str(), item.seller_id.as_str())) {
            continue;
        }
        let (Some(estimated), Some(delivered)) = (
            order.order_estimated_delivery_date,
            order.order_delivered_customer_date,
        ) else {
            dropped_missing += 1;
            continue;
        };

        let delivery_delay_days = floor_days(delivered - estimated);
        let late_days = if config.late_days_clip_at_zero {
            delivery_delay_days.max(0)
        } else {
            delivery_delay_days
        };

        rows.push(OrderSellerRecord {
            order_id: order.order_id.clone(),
            seller_id: item.seller_id.clone(),
            order_purchase_timestamp: order.order_purchase_timestamp,
            order_estimated_delivery_date: estimated,
            order_delivered_customer_date: delivered,
            delivery_delay_days,
            late_days,
        });
    }

    if dropped_missing > 0 {
        log::debug!("base: dropped {dropped_missing} order-seller rows without delivery dates");
    }
    let table = OrderSellerTable::from_rows(rows);
    log::info!(
        "base: {} order-seller rows across {} sellers",
        table.len(),
        table.seller_count()
    );
    table
}

/// Keep only rows of sellers with at least `min_delivered_orders_per_seller`
/// distinct orders.
pub fn filter_sellers_by_min_orders(
    table: &OrderSellerTable,
    config: &AnalysisConfig,
) -> OrderSellerTable {
    let mut counts: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for row in table.rows() {
        counts
            .entry(row.seller_id.as_str())
            .or_default()
            .insert(row.order_id.as_str());
    }
    let eligible: HashSet<String> = counts
        .into_iter()
        .filter(|(_, orders)| orders.len() >= config.min_delivered_orders_per_seller)
        .map(|(seller, _)| seller.to_string())
        .collect();

    let filtered = table.clone().retain(|row| eligible.contains(&row.seller_id));
    log::info!(
        "eligibility: {} of {} sellers have >= {} orders",
        eligible.len(),
        table.seller_count(),
        config.min_delivered_orders_per_seller
    );
    filtered
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2018, 5, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn order(
        id: &str,
        status: &str,
        purchase: NaiveDateTime,
        estimated: Option<NaiveDateTime>,
        delivered: Option<NaiveDateTime>,
    ) -> OrderRecord {
        OrderRecord {
            order_id: id.into(),
            order_status: status.into(),
            order_purchase_timestamp: purchase,
            order_estimated_delivery_date: estimated,
            order_delivered_customer_date: delivered,
        }
    }

    fn delivered(id: &str, purchase_day: u32, delay_hours: i64) -> OrderRecord {
        let estimated = at(purchase_day + 10, 0);
        let actual = estimated + chrono::TimeDelta::hours(delay_hours);
        order(id, "delivered", at(purchase_day, 9), Some(estimated), Some(actual))
    }

    #[test]
    fn delay_is_floored_and_signed() {
        let orders = vec![
            delivered("late", 1, 50),
            delivered("almost", 2, 23),
            delivered("early_hour", 3, -1),
            delivered("early_day", 4, -36),
        ];
        let items: Vec<_> = ["late", "almost", "early_hour", "early_day"]
            .iter()
            .map(|id| OrderItemRecord::new(*id, "s1"))
            .collect();
        let table = build_order_seller_base(&orders, &items, &AnalysisConfig::default());
        let delays: Vec<_> = table
            .rows()
            .iter()
            .map(|r| (r.order_id.as_str(), r.delivery_delay_days, r.late_days))
            .collect();
        assert_eq!(
            delays,
            vec![
                ("late", 2, 2),
                ("almost", 0, 0),
                ("early_hour", -1, -1),
                ("early_day", -2, -2),
            ]
        );
    }

    #[test]
    fn clipping_zeroes_early_deliveries() {
        let config = AnalysisConfig {
            late_days_clip_at_zero: true,
            ..AnalysisConfig::default()
        };
        let orders = vec![delivered("a", 1, -72), delivered("b", 2, 200)];
        let items = vec![OrderItemRecord::new("a", "s"), OrderItemRecord::new("b", "s")];
        let table = build_order_seller_base(&orders, &items, &config);
        assert_eq!(table.rows()[0].delivery_delay_days, -3);
        assert_eq!(table.rows()[0].late_days, 0);
        assert_eq!(table.rows()[1].late_days, 8);
    }

    #[test]
    fn only_delivered_filters_status() {
        let mut shipped = delivered("x", 1, 0);
        shipped.order_status = "shipped".into();
        let orders = vec![shipped, delivered("y", 2, 0)];
        let items = vec![OrderItemRecord::new("x", "s"), OrderItemRecord::new("y", "s")];

        let table = build_order_seller_base(&orders, &items, &AnalysisConfig::default());
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].order_id, "y");

        let all = AnalysisConfig {
            only_delivered: false,
            ..AnalysisConfig::default()
        };
        assert_eq!(build_order_seller_base(&orders, &items, &all).len(), 2);
    }

    #[test]
    fn rows_without_delivery_dates_are_dropped() {
        let orders = vec![
            order("no_actual", "delivered", at(1, 0), Some(at(9, 0)), None),
            order("no_estimate", "delivered", at(2, 0), None, Some(at(9, 0))),
            delivered("ok", 3, 0),
        ];
        let items: Vec<_> = ["no_actual", "no_estimate", "ok"]
            .iter()
            .map(|id| OrderItemRecord::new(*id, "s"))
            .collect();
        let table = build_order_seller_base(&orders, &items, &AnalysisConfig::default());
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].order_id, "ok");
    }

    #[test]
    fn one_row_per_order_seller_pair() {
        let orders = vec![delivered("o1", 1, 0)];
        let items = vec![
            OrderItemRecord::new("o1", "s1"),
            OrderItemRecord::new("o1", "s1"),
            OrderItemRecord::new("o1", "s2"),
            OrderItemRecord::new("unknown", "s1"),
        ];
        let table = build_order_seller_base(&orders, &items, &AnalysisConfig::default());
        let pairs: Vec<_> = table
            .rows()
            .iter()
            .map(|r| (r.order_id.as_str(), r.seller_id.as_str()))
            .collect();
        assert_eq!(pairs, vec![("o1", "s1"), ("o1", "s2")]);
    }

    #[test]
    fn output_is_sorted_by_seller_then_purchase() {
        let orders = vec![delivered("o1", 5, 0), delivered("o2", 1, 0), delivered("o3", 3, 0)];
        let items = vec![
            OrderItemRecord::new("o1", "b"),
            OrderItemRecord::new("o2", "b"),
            OrderItemRecord::new("o3", "a"),
        ];
        let table = build_order_seller_base(&orders, &items, &AnalysisConfig::default());
        let ids: Vec<_> = table.rows().iter().map(|r| r.order_id.as_str()).collect();
        assert_eq!(ids, vec!["o3", "o2", "o1"]);
    }

    #[test]
    fn min_orders_filter_counts_distinct_orders() {
        let orders: Vec<_> = (1..=5).map(|d| delivered(&format!("o{d}"), d, 0)).collect();
        let mut items: Vec<_> = (1..=3)
            .map(|d| OrderItemRecord::new(format!("o{d}"), "big"))
            .collect();
        items.push(OrderItemRecord::new("o4", "small"));
        items.push(OrderItemRecord::new("o5", "small"));
        let base = build_order_seller_base(&orders, &items, &AnalysisConfig::default());

        let config = AnalysisConfig {
            min_delivered_orders_per_seller: 3,
            ..AnalysisConfig::default()
        };
        let filtered = filter_sellers_by_min_orders(&base, &config);
        assert_eq!(filtered.len(), 3);
        assert!(filtered.rows().iter().all(|r| r.seller_id == "big"));
        assert_eq!(base.len(), 5, "input table is untouched");
    }

    #[test]
    fn min_orders_zero_keeps_everything() {
        let orders = vec![delivered("o1", 1, 0)];
        let items = vec![OrderItemRecord::new("o1", "s")];
        let base = build_order_seller_base(&orders, &items, &AnalysisConfig::default());
        let config = AnalysisConfig {
            min_delivered_orders_per_seller: 0,
            ..AnalysisConfig::default()
        };
        assert_eq!(filter_sellers_by_min_orders(&base, &config), base);
    }
}
