//! Outcome builder: seller activity strictly after the exposure anchor.

use std::collections::{BTreeSet, HashMap};

use crate::config::AnalysisConfig;
use crate::domain::{OrderSellerTable, SellerExposure, SellerOutcome, SellerProfile};
use crate::stats::floor_days;

/// Count each exposed seller's orders after its `early_k_date`.
///
/// Orders purchased exactly at the anchor do not count. One row is returned
/// per exposure row, in the same order, with zeros for sellers that have no
/// later activity.
pub fn build_remaining_activity(
    base: &OrderSellerTable,
    exposure: &[SellerExposure],
    config: &AnalysisConfig,
) -> Vec<SellerOutcome> {
    let outcome: Vec<SellerOutcome> = exposure
        .iter()
        .map(|e| {
            let after: Vec<_> = base
                .seller_rows(&e.seller_id)
                .iter()
                .filter(|r| r.order_purchase_timestamp > e.early_k_date)
                .collect();

            let remaining_orders = after
                .iter()
                .map(|r| r.order_id.as_str())
                .collect::<BTreeSet<_>>()
                .len();
            let first = after.iter().map(|r| r.order_purchase_timestamp).min();
            let last = after.iter().map(|r| r.order_purchase_timestamp).max();
            let remaining_active_days = match (first, last) {
                (Some(first), Some(last)) => floor_days(last - first),
                _ => 0,
            };

            SellerOutcome {
                seller_id: e.seller_id.clone(),
                remaining_orders,
                remaining_active_days,
                k: config.k_early_orders,
            }
        })
        .collect();

    let inactive = outcome.iter().filter(|o| o.remaining_orders == 0).count();
    log::info!(
        "outcome: {} sellers, {inactive} with no orders after the early window",
        outcome.len()
    );
    outcome
}

/// Inner-join exposure and outcome on seller_id, in exposure order.
pub fn merge_profiles(exposure: &[SellerExposure], outcome: &[SellerOutcome]) -> Vec<SellerProfile> {
    let by_seller: HashMap<&str, &SellerOutcome> =
        outcome.iter().map(|o| (o.seller_id.as_str(), o)).collect();
    exposure
        .iter()
        .filter_map(|e| {
            by_seller
                .get(e.seller_id.as_str())
                .map(|o| SellerProfile::new(e, o))
        })
        .collect()
}
