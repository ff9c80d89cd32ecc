//! SellerLag Core: do early delivery delays predict less seller activity later?
//!
//! This crate contains the analysis pipeline and the thin collaborators it needs:
//! - Domain records (orders, items, order-seller rows, seller aggregates, scan rows)
//! - Frozen analysis configuration loaded from TOML
//! - CSV ingestion with header validation and timestamp parsing
//! - Base builder: order/item join, delay computation, seller eligibility filter
//! - Exposure builder: statistics over each seller's first K orders
//! - Outcome builder: activity strictly after the K-th order
//! - Threshold scanner: median outcome gap per delay threshold

pub mod config;
pub mod data;
pub mod domain;
pub mod fingerprint;
pub mod pipeline;
pub mod stats;

pub use config::{AnalysisConfig, ConfigError};
pub use domain::{
    ColumnError, DelayColumn, OrderItemRecord, OrderRecord, OrderSellerRecord, OrderSellerTable,
    OutcomeColumn, SellerExposure, SellerOutcome, SellerProfile, ThresholdScanRecord,
};
pub use pipeline::{
    build_early_exposure, build_order_seller_base, build_remaining_activity,
    compute_effect_scan_median, filter_sellers_by_min_orders, merge_profiles,
};
