//! The four pipeline stages.
//!
//! Data flows forward only:
//! orders + items -> base -> (exposure, outcome) -> profiles -> scan.
//! Every stage borrows its inputs and returns a freshly owned table.

pub mod base;
pub mod exposure;
pub mod outcome;
pub mod threshold;

pub use base::{build_order_seller_base, filter_sellers_by_min_orders};
pub use exposure::{build_early_exposure, EARLY_PERCENTILE, SEVERE_LATE_DAYS};
pub use outcome::{build_remaining_activity, merge_profiles};
pub use threshold::compute_effect_scan_median;
