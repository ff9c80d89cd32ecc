//! Frozen analysis configuration.
//!
//! Loaded once from TOML (or taken from defaults) and passed by reference
//! into every pipeline component. Keys are snake_case; the upper-case names
//! used by the original notebooks (`K_EARLY_ORDERS`, ...) are accepted as
//! aliases.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::domain::{DelayColumn, OutcomeColumn};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    // --- Paths ---
    #[serde(alias = "DATA_DIR")]
    pub data_dir: PathBuf,
    #[serde(alias = "ORDERS_CSV")]
    pub orders_csv: String,
    #[serde(alias = "ORDER_ITEMS_CSV")]
    pub order_items_csv: String,

    // --- Filters / definitions ---
    /// Keep only orders whose status is "delivered".
    #[serde(alias = "ONLY_DELIVERED")]
    pub only_delivered: bool,
    /// Sellers need at least this many distinct orders to be analyzed.
    #[serde(alias = "MIN_DELIVERED_ORDERS_PER_SELLER")]
    pub min_delivered_orders_per_seller: usize,
    /// Size of the early window.
    #[serde(alias = "K_EARLY_ORDERS")]
    pub k_early_orders: usize,
    /// Treat early deliveries as zero delay.
    #[serde(alias = "LATE_DAYS_CLIP_AT_ZERO")]
    pub late_days_clip_at_zero: bool,

    // --- Threshold sweep ---
    #[serde(alias = "THRESHOLD_T_START")]
    pub threshold_t_start: i64,
    #[serde(alias = "THRESHOLD_T_END")]
    pub threshold_t_end: i64,
    /// Advisory only: scan rows with a smaller group are flagged in reports.
    #[serde(alias = "MIN_GROUP_SIZE")]
    pub min_group_size: usize,
    pub delay_column: DelayColumn,
    pub outcome_column: OutcomeColumn,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            orders_csv: "olist_orders_dataset.csv".into(),
            order_items_csv: "olist_order_items_dataset.csv".into(),
            only_delivered: true,
            min_delivered_orders_per_seller: 50,
            k_early_orders: 20,
            late_days_clip_at_zero: false,
            threshold_t_start: 1,
            threshold_t_end: 15,
            min_group_size: 30,
            delay_column: DelayColumn::EarlyMaxLate,
            outcome_column: OutcomeColumn::RemainingActiveDays,
        }
    }
}

impl AnalysisConfig {
    /// Load and validate a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a config from a TOML string. Missing keys take defaults.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.k_early_orders == 0 {
            return Err(ConfigError::Invalid(
                "k_early_orders must be at least 1".into(),
            ));
        }
        if self.threshold_t_start > self.threshold_t_end {
            return Err(ConfigError::Invalid(format!(
                "threshold_t_start ({}) must not exceed threshold_t_end ({})",
                self.threshold_t_start, self.threshold_t_end
            )));
        }
        Ok(())
    }

    pub fn orders_path(&self) -> PathBuf {
        self.data_dir.join(&self.orders_csv)
    }

    pub fn order_items_path(&self) -> PathBuf {
        self.data_dir.join(&self.order_items_csv)
    }

    /// Number of thresholds the scan will emit.
    pub fn threshold_count(&self) -> usize {
        (self.threshold_t_end - self.threshold_t_start + 1).max(0) as usize
    }
}
