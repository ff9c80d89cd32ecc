//! Threshold scan rows and the profile columns a scan can split on.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::seller::SellerProfile;

/// One threshold of the sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdScanRecord {
    /// Threshold in days.
    pub t: i64,
    /// median(outcome | delay < t) - median(outcome | delay >= t).
    /// `None` when either group is empty.
    pub loss_days: Option<f64>,
    pub n_hi: usize,
    pub n_lo: usize,
}

impl ThresholdScanRecord {
    /// True when either group is smaller than `min_group_size`.
    pub fn is_low_sample(&self, min_group_size: usize) -> bool {
        self.n_hi < min_group_size || self.n_lo < min_group_size
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColumnError {
    #[error("unknown {kind} column '{name}' (valid: {valid})")]
    Unknown {
        kind: &'static str,
        name: String,
        valid: &'static str,
    },
}

/// Exposure column used as the split variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DelayColumn {
    #[default]
    EarlyMaxLate,
    EarlyP95Late,
    EarlySevere7Rate,
}

impl DelayColumn {
    pub const ALL: [DelayColumn; 3] = [
        DelayColumn::EarlyMaxLate,
        DelayColumn::EarlyP95Late,
        DelayColumn::EarlySevere7Rate,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DelayColumn::EarlyMaxLate => "early_max_late",
            DelayColumn::EarlyP95Late => "early_p95_late",
            DelayColumn::EarlySevere7Rate => "early_severe7_rate",
        }
    }

    pub fn value(self, profile: &SellerProfile) -> f64 {
        match self {
            DelayColumn::EarlyMaxLate => profile.early_max_late as f64,
            DelayColumn::EarlyP95Late => profile.early_p95_late,
            DelayColumn::EarlySevere7Rate => profile.early_severe7_rate,
        }
    }
}

impl fmt::Display for DelayColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DelayColumn {
    type Err = ColumnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DelayColumn::ALL
            .into_iter()
            .find(|c| c.name() == s)
            .ok_or_else(|| ColumnError::Unknown {
                kind: "delay",
                name: s.to_string(),
                valid: "early_max_late, early_p95_late, early_severe7_rate",
            })
    }
}

/// Outcome column used as the response variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeColumn {
    RemainingOrders,
    #[default]
    RemainingActiveDays,
}

impl OutcomeColumn {
    pub const ALL: [OutcomeColumn; 2] = [
        OutcomeColumn::RemainingOrders,
        OutcomeColumn::RemainingActiveDays,
    ];

    pub fn name(self) -> &'static str {
        match self {
            OutcomeColumn::RemainingOrders => "remaining_orders",
            OutcomeColumn::RemainingActiveDays => "remaining_active_days",
        }
    }

    pub fn value(self, profile: &SellerProfile) -> f64 {
        match self {
            OutcomeColumn::RemainingOrders => profile.remaining_orders as f64,
            OutcomeColumn::RemainingActiveDays => profile.remaining_active_days as f64,
        }
    }
}

impl fmt::Display for OutcomeColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OutcomeColumn {
    type Err = ColumnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OutcomeColumn::ALL
            .into_iter()
            .find(|c| c.name() == s)
            .ok_or_else(|| ColumnError::Unknown {
                kind: "outcome",
                name: s.to_string(),
                valid: "remaining_orders, remaining_active_days",
            })
    }
}
