//! Dataset fingerprinting for run manifests.
//!
//! The hash covers the parsed relations, not the raw file bytes, so
//! whitespace or column-order differences in the CSVs do not change it.

use crate::domain::{OrderItemRecord, OrderRecord};

/// BLAKE3 hex digest over both input relations, in input order.
pub fn dataset_hash(orders: &[OrderRecord], items: &[OrderItemRecord]) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(b"orders\n");
    for o in orders {
        let line = format!(
            "{}|{}|{}|{}|{}\n",
            o.order_id,
            o.order_status,
            o.order_purchase_timestamp,
            fmt_opt(o.order_estimated_delivery_date),
            fmt_opt(o.order_delivered_customer_date),
        );
        hasher.update(line.as_bytes());
    }
    hasher.update(b"items\n");
    for i in items {
        hasher.update(format!("{}|{}\n", i.order_id, i.seller_id).as_bytes());
    }
    hasher.finalize().to_hex().to_string()
}

fn fmt_opt(ts: Option<chrono::NaiveDateTime>) -> String {
    ts.map(|t| t.to_string()).unwrap_or_default()
}
