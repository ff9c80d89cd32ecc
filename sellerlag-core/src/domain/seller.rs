//! Order-seller fact rows and the seller-keyed aggregates derived from them.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One (order, seller) pair with its delivery delay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSellerRecord {
    pub order_id: String,
    pub seller_id: String,
    pub order_purchase_timestamp: NaiveDateTime,
    pub order_estimated_delivery_date: NaiveDateTime,
    pub order_delivered_customer_date: NaiveDateTime,
    /// Whole days between actual and estimated delivery. Negative = early.
    pub delivery_delay_days: i64,
    /// The delay signal used downstream (equal to `delivery_delay_days`, or
    /// clipped at zero).
    pub late_days: i64,
}

/// The order-seller fact table.
///
/// Rows are always sorted by (seller_id, purchase timestamp, order_id).
/// Every constructor establishes that order, deserialization included, so
/// per-seller ranking can rely on it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SerializedTable")]
pub struct OrderSellerTable {
    rows: Vec<OrderSellerRecord>,
}

#[derive(Deserialize)]
struct SerializedTable {
    rows: Vec<OrderSellerRecord>,
}

impl From<SerializedTable> for OrderSellerTable {
    fn from(table: SerializedTable) -> Self {
        Self::from_rows(table.rows)
    }
}

impl OrderSellerTable {
    /// Build a table from rows in any order.
    pub fn from_rows(mut rows: Vec<OrderSellerRecord>) -> Self {
        rows.sort_by(|a, b| {
            a.seller_id
                .cmp(&b.seller_id)
                .then(a.order_purchase_timestamp.cmp(&b.order_purchase_timestamp))
                .then(a.order_id.cmp(&b.order_id))
        });
        Self { rows }
    }

    pub fn rows(&self) -> &[OrderSellerRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Contiguous per-seller slices, in seller_id order.
    pub fn seller_groups(&self) -> SellerGroups<'_> {
        SellerGroups { rest: &self.rows }
    }

    pub fn seller_count(&self) -> usize {
        self.seller_groups().count()
    }

    /// Rows of a single seller, in purchase order.
    pub fn seller_rows(&self, seller_id: &str) -> &[OrderSellerRecord] {
        let start = self
            .rows
            .partition_point(|r| r.seller_id.as_str() < seller_id);
        let end = start
            + self.rows[start..].partition_point(|r| r.seller_id.as_str() == seller_id);
        &self.rows[start..end]
    }

    /// Keep rows matching the predicate. Order is preserved.
    pub(crate) fn retain(self, keep: impl FnMut(&OrderSellerRecord) -> bool) -> Self {
        let rows = self.rows.into_iter().filter(keep).collect();
        Self { rows }
    }
}

/// Iterator over `(seller_id, rows)` groups of a sorted table.
pub struct SellerGroups<'a> {
    rest: &'a [OrderSellerRecord],
}

impl<'a> Iterator for SellerGroups<'a> {
    type Item = (&'a str, &'a [OrderSellerRecord]);

    fn next(&mut self) -> Option<Self::Item> {
        let first = self.rest.first()?;
        let seller = first.seller_id.as_str();
        let len = self
            .rest
            .iter()
            .position(|r| r.seller_id != seller)
            .unwrap_or(self.rest.len());
        let (group, rest) = self.rest.split_at(len);
        self.rest = rest;
        Some((seller, group))
    }
}

/// Delay statistics over a seller's first K orders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SellerExposure {
    pub seller_id: String,
    /// Distinct orders in the window. Always K for retained sellers.
    pub early_orders: usize,
    /// Purchase timestamp of the K-th order; the exposure/outcome anchor.
    pub early_k_date: NaiveDateTime,
    pub early_max_late: i64,
    pub early_p95_late: f64,
    pub early_severe7_rate: f64,
}

/// Seller activity strictly after the anchor date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellerOutcome {
    pub seller_id: String,
    pub remaining_orders: usize,
    pub remaining_active_days: i64,
    /// Window size used to build the exposure.
    pub k: usize,
}

/// Exposure and outcome of one seller, joined on `seller_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SellerProfile {
    pub seller_id: String,
    pub early_orders: usize,
    pub early_k_date: NaiveDateTime,
    pub early_max_late: i64,
    pub early_p95_late: f64,
    pub early_severe7_rate: f64,
    pub remaining_orders: usize,
    pub remaining_active_days: i64,
    pub k: usize,
}

impl SellerProfile {
    pub fn new(exposure: &SellerExposure, outcome: &SellerOutcome) -> Self {
        Self {
            seller_id: exposure.seller_id.clone(),
            early_orders: exposure.early_orders,
            early_k_date: exposure.early_k_date,
            early_max_late: exposure.early_max_late,
            early_p95_late: exposure.early_p95_late,
            early_severe7_rate: exposure.early_severe7_rate,
            remaining_orders: outcome.remaining_orders,
            remaining_active_days: outcome.remaining_active_days,
            k: outcome.k,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2018, 1, day)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn row(order: &str, seller: &str, day: u32) -> OrderSellerRecord {
        OrderSellerRecord {
            order_id: order.into(),
            seller_id: seller.into(),
            order_purchase_timestamp: ts(day),
            order_estimated_delivery_date: ts(day + 5),
            order_delivered_customer_date: ts(day + 4),
            delivery_delay_days: -1,
            late_days: -1,
        }
    }

    #[test]
    fn from_rows_sorts_by_seller_then_time_then_order() {
        let table = OrderSellerTable::from_rows(vec![
            row("o3", "b", 1),
            row("o2", "a", 3),
            row("o9", "a", 1),
            row("o1", "a", 1),
        ]);
        let ids: Vec<_> = table.rows().iter().map(|r| r.order_id.as_str()).collect();
        assert_eq!(ids, vec!["o1", "o9", "o2", "o3"]);
    }

    #[test]
    fn seller_groups_are_contiguous() {
        let table = OrderSellerTable::from_rows(vec![
            row("o1", "a", 1),
            row("o2", "b", 2),
            row("o3", "a", 3),
            row("o4", "c", 4),
        ]);
        let groups: Vec<_> = table
            .seller_groups()
            .map(|(s, rows)| (s.to_string(), rows.len()))
            .collect();
        assert_eq!(
            groups,
            vec![("a".into(), 2), ("b".into(), 1), ("c".into(), 1)]
        );
        assert_eq!(table.seller_count(), 3);
    }

    #[test]
    fn seller_rows_finds_slice() {
        let table = OrderSellerTable::from_rows(vec![
            row("o1", "a", 1),
            row("o2", "b", 2),
            row("o3", "b", 3),
        ]);
        assert_eq!(table.seller_rows("b").len(), 2);
        assert!(table.seller_rows("zzz").is_empty());
    }

    #[test]
    fn empty_table_has_no_groups() {
        let table = OrderSellerTable::default();
        assert!(table.is_empty());
        assert_eq!(table.seller_groups().count(), 0);
    }

    #[test]
    fn deserialized_table_is_sorted() {
        let json = serde_json::json!({
            "rows": [row("o2", "a", 5), row("o9", "b", 1), row("o1", "a", 1)],
        });
        let table: OrderSellerTable = serde_json::from_value(json).unwrap();

        let ids: Vec<_> = table.rows().iter().map(|r| r.order_id.as_str()).collect();
        assert_eq!(ids, vec!["o1", "o2", "o9"]);
        assert_eq!(table.seller_count(), 2);
        assert_eq!(table.seller_rows("a")[0].order_purchase_timestamp, ts(1));

        let text = serde_json::to_string(&table).unwrap();
        assert_eq!(serde_json::from_str::<OrderSellerTable>(&text).unwrap(), table);
    }
}
