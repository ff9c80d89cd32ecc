//! CSV ingestion and header validation for the two input relations.

pub mod ingest;
pub mod schema;

pub use ingest::{
    load_orders_items, parse_timestamp, read_items, read_orders, resolve_path, DataError,
};
pub use schema::{ItemsSchema, OrdersSchema, SchemaError};
