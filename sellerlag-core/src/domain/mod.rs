//! Domain records flowing through the pipeline.

pub mod order;
pub mod scan;
pub mod seller;

pub use order::{OrderItemRecord, OrderRecord, DELIVERED_STATUS};
pub use scan::{ColumnError, DelayColumn, OutcomeColumn, ThresholdScanRecord};
pub use seller::{
    OrderSellerRecord, OrderSellerTable, SellerExposure, SellerOutcome, SellerProfile,
};
