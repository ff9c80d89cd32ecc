//! Exposure builder: delay statistics over each seller's first K orders.

use std::collections::BTreeSet;

use crate::config::AnalysisConfig;
use crate::domain::{OrderSellerTable, SellerExposure};
use crate::stats::percentile;

/// A late_days value at or above this counts as a severe delay.
pub const SEVERE_LATE_DAYS: i64 = 7;

/// Percentile reported as `early_p95_late`.
pub const EARLY_PERCENTILE: f64 = 95.0;

/// Summarize the first `k_early_orders` rows of every seller.
///
/// Rank follows the base table order (purchase time, then order_id).
/// Sellers whose window holds fewer than K distinct orders are excluded, so
/// every returned row describes a window of exactly K orders. Output is in
/// seller_id order.
pub fn build_early_exposure(base: &OrderSellerTable, config: &AnalysisConfig) -> Vec<SellerExposure> {
    let k = config.k_early_orders;
    let mut exposure = Vec::new();
    let mut short_sellers = 0usize;

    for (seller_id, rows) in base.seller_groups() {
        let early = &rows[..rows.len().min(k)];
        let early_orders = early
            .iter()
            .map(|r| r.order_id.as_str())
            .collect::<BTreeSet<_>>()
            .len();
        if early_orders != k {
            short_sellers += 1;
            continue;
        }

        let late: Vec<f64> = early.iter().map(|r| r.late_days as f64).collect();
        let (Some(early_k_date), Some(early_max_late), Some(early_p95_late)) = (
            early.iter().map(|r| r.order_purchase_timestamp).max(),
            early.iter().map(|r| r.late_days).max(),
            percentile(&late, EARLY_PERCENTILE),
        ) else {
            continue;
        };
        let severe = early
            .iter()
            .filter(|r| r.late_days >= SEVERE_LATE_DAYS)
            .count();

        exposure.push(SellerExposure {
            seller_id: seller_id.to_string(),
            early_orders,
            early_k_date,
            early_max_late,
            early_p95_late,
            early_severe7_rate: severe as f64 / early.len() as f64,
        });
    }

    log::info!(
        "exposure: {} sellers with exactly {k} early orders ({short_sellers} excluded)",
        exposure.len()
    );
    exposure
}
