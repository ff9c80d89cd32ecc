//! Threshold scanner: median outcome gap per delay threshold.

use crate::domain::{DelayColumn, OutcomeColumn, SellerProfile, ThresholdScanRecord};
use crate::stats::median;

/// Sweep integer thresholds `t_start..=t_end`.
///
/// For each t, sellers split into `hi` (delay >= t) and `lo` (delay < t) and
/// `loss_days = median(lo outcome) - median(hi outcome)`. Every t yields a
/// row; `loss_days` is `None` when either side is empty. Group sizes are
/// reported as-is with no minimum enforced.
pub fn compute_effect_scan_median(
    profiles: &[SellerProfile],
    delay_column: DelayColumn,
    outcome_column: OutcomeColumn,
    t_start: i64,
    t_end: i64,
) -> Vec<ThresholdScanRecord> {
    let points: Vec<(f64, f64)> = profiles
        .iter()
        .map(|p| (delay_column.value(p), outcome_column.value(p)))
        .collect();

    (t_start..=t_end)
        .map(|t| {
            let threshold = t as f64;
            let hi: Vec<f64> = points
                .iter()
                .filter(|(delay, _)| *delay >= threshold)
                .map(|&(_, y)| y)
                .collect();
            let lo: Vec<f64> = points
                .iter()
                .filter(|(delay, _)| *delay < threshold)
                .map(|&(_, y)| y)
                .collect();

            let loss_days = match (median(&lo), median(&hi)) {
                (Some(lo_median), Some(hi_median)) => Some(lo_median - hi_median),
                _ => {
                    log::debug!(
                        "scan t={t}: empty group (n_hi={}, n_lo={})",
                        hi.len(),
                        lo.len()
                    );
                    None
                }
            };

            ThresholdScanRecord {
                t,
                loss_days,
                n_hi: hi.len(),
                n_lo: lo.len(),
            }
        })
        .collect()
}
