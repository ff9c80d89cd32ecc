//! Analysis runner: wires the core pipeline stages together.
//!
//! Two entry points:
//! - `run_from_config()`: loads the CSVs named by the config, then runs. Used by the CLI.
//! - `run_analysis()`: takes already-loaded relations. No I/O.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use sellerlag_core::config::{AnalysisConfig, ConfigError};
use sellerlag_core::data::{load_orders_items, DataError};
use sellerlag_core::fingerprint::dataset_hash;
use sellerlag_core::{
    build_early_exposure, build_order_seller_base, build_remaining_activity,
    compute_effect_scan_median, filter_sellers_by_min_orders, merge_profiles, OrderItemRecord,
    OrderRecord, OrderSellerTable, SellerExposure, SellerOutcome, SellerProfile,
    ThresholdScanRecord,
};

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] DataError),
}

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// Row and seller counts at each pipeline stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineCounts {
    pub orders: usize,
    pub items: usize,
    pub base_rows: usize,
    pub base_sellers: usize,
    pub eligible_rows: usize,
    pub eligible_sellers: usize,
    pub exposed_sellers: usize,
    pub sellers_without_remaining: usize,
}

/// Every table produced by one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub config: AnalysisConfig,
    pub dataset_hash: String,
    pub counts: PipelineCounts,
    /// Base table after the eligibility filter.
    pub base: OrderSellerTable,
    pub exposure: Vec<SellerExposure>,
    pub outcome: Vec<SellerOutcome>,
    pub profiles: Vec<SellerProfile>,
    pub scan: Vec<ThresholdScanRecord>,
}

/// Load the configured CSVs and run the full pipeline.
pub fn run_from_config(config: &AnalysisConfig) -> Result<AnalysisResult, RunError> {
    config.validate()?;
    let (orders, items) = load_orders_items(config)?;
    Ok(run_analysis(&orders, &items, config))
}

/// Run the full pipeline over pre-loaded relations. Pure.
pub fn run_analysis(
    orders: &[OrderRecord],
    items: &[OrderItemRecord],
    config: &AnalysisConfig,
) -> AnalysisResult {
    let all = build_order_seller_base(orders, items, config);
    let base = filter_sellers_by_min_orders(&all, config);
    let exposure = build_early_exposure(&base, config);
    let outcome = build_remaining_activity(&base, &exposure, config);
    let profiles = merge_profiles(&exposure, &outcome);
    log::info!(
        "scanning {} thresholds over {} seller profiles",
        config.threshold_count(),
        profiles.len()
    );
    let scan = compute_effect_scan_median(
        &profiles,
        config.delay_column,
        config.outcome_column,
        config.threshold_t_start,
        config.threshold_t_end,
    );

    let counts = PipelineCounts {
        orders: orders.len(),
        items: items.len(),
        base_rows: all.len(),
        base_sellers: all.seller_count(),
        eligible_rows: base.len(),
        eligible_sellers: base.seller_count(),
        exposed_sellers: exposure.len(),
        sellers_without_remaining: outcome.iter().filter(|o| o.remaining_orders == 0).count(),
    };

    AnalysisResult {
        config: config.clone(),
        dataset_hash: dataset_hash(orders, items),
        counts,
        base,
        exposure,
        outcome,
        profiles,
        scan,
    }
}
