//! CSV readers for the orders and order items relations.
//!
//! Readers work over any `io::Read`; `load_orders_items` resolves the two
//! files under the configured data directory. Header names are validated
//! up front, so a missing column fails before any row is read.

use chrono::{NaiveDate, NaiveDateTime};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::config::AnalysisConfig;
use crate::data::schema::{ItemsSchema, OrdersSchema, SchemaError};
use crate::domain::{OrderItemRecord, OrderRecord};

#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("CSV not found: {0}")]
    FileNotFound(PathBuf),

    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("{source_name}: {source}")]
    Schema {
        source_name: String,
        #[source]
        source: SchemaError,
    },

    #[error("{source_name} line {line}: cannot parse {column} timestamp '{value}'")]
    InvalidTimestamp {
        source_name: String,
        line: u64,
        column: &'static str,
        value: String,
    },

    #[error("{source_name} line {line}: {column} is required")]
    MissingValue {
        source_name: String,
        line: u64,
        column: &'static str,
    },
}

const DATETIME_FORMATS: [&str; 3] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse a timestamp cell. Date-only values map to midnight.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Fail with `FileNotFound` unless `path` exists.
pub fn resolve_path(path: PathBuf) -> Result<PathBuf, DataError> {
    if !path.exists() {
        return Err(DataError::FileNotFound(path));
    }
    Ok(path)
}

/// Load both relations from the configured data directory.
pub fn load_orders_items(
    config: &AnalysisConfig,
) -> Result<(Vec<OrderRecord>, Vec<OrderItemRecord>), DataError> {
    let orders_path = resolve_path(config.orders_path())?;
    let items_path = resolve_path(config.order_items_path())?;

    let orders = read_orders(open(&orders_path)?, &config.orders_csv)?;
    let items = read_items(open(&items_path)?, &config.order_items_csv)?;
    log::info!(
        "loaded {} orders from {} and {} items from {}",
        orders.len(),
        orders_path.display(),
        items.len(),
        items_path.display()
    );
    Ok((orders, items))
}

fn open(path: &Path) -> Result<File, DataError> {
    File::open(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Read the orders relation. `source_name` labels errors.
pub fn read_orders<R: Read>(reader: R, source_name: &str) -> Result<Vec<OrderRecord>, DataError> {
    let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
    let [id_idx, status_idx, purchase_idx, estimated_idx, delivered_idx] =
        OrdersSchema::validate(rdr.headers()?).map_err(|source| DataError::Schema {
            source_name: source_name.to_string(),
            source,
        })?;

    let mut orders = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let cell = |idx: usize| record.get(idx).unwrap_or("").trim();
        let optional_ts = |idx: usize, column: &'static str| -> Result<_, DataError> {
            let value = cell(idx);
            if value.is_empty() {
                return Ok(None);
            }
            parse_timestamp(value)
                .map(Some)
                .ok_or_else(|| DataError::InvalidTimestamp {
                    source_name: source_name.to_string(),
                    line,
                    column,
                    value: value.to_string(),
                })
        };

        let purchase = optional_ts(purchase_idx, OrdersSchema::PURCHASE)?.ok_or_else(|| {
            DataError::MissingValue {
                source_name: source_name.to_string(),
                line,
                column: OrdersSchema::PURCHASE,
            }
        })?;

        orders.push(OrderRecord {
            order_id: cell(id_idx).to_string(),
            order_status: cell(status_idx).to_string(),
            order_purchase_timestamp: purchase,
            order_estimated_delivery_date: optional_ts(estimated_idx, OrdersSchema::ESTIMATED)?,
            order_delivered_customer_date: optional_ts(delivered_idx, OrdersSchema::DELIVERED)?,
        });
    }
    Ok(orders)
}

/// Read the order items relation, keeping only the order-seller link.
pub fn read_items<R: Read>(
    reader: R,
    source_name: &str,
) -> Result<Vec<OrderItemRecord>, DataError> {
    let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
    let [order_idx, seller_idx] =
        ItemsSchema::validate(rdr.headers()?).map_err(|source| DataError::Schema {
            source_name: source_name.to_string(),
            source,
        })?;

    let mut items = Vec::new();
    for record in rdr.records() {
        let record = record?;
        items.push(OrderItemRecord::new(
            record.get(order_idx).unwrap_or("").trim(),
            record.get(seller_idx).unwrap_or("").trim(),
        ));
    }
    Ok(items)
}
