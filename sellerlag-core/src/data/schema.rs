/// Required columns of the orders CSV.
pub struct OrdersSchema;

impl OrdersSchema {
    pub const ORDER_ID: &'static str = "order_id";
    pub const ORDER_STATUS: &'static str = "order_status";
    pub const PURCHASE: &'static str = "order_purchase_timestamp";
    pub const ESTIMATED: &'static str = "order_estimated_delivery_date";
    pub const DELIVERED: &'static str = "order_delivered_customer_date";

    pub fn columns() -> [&'static str; 5] {
        [
            Self::ORDER_ID,
            Self::ORDER_STATUS,
            Self::PURCHASE,
            Self::ESTIMATED,
            Self::DELIVERED,
        ]
    }

    /// Validate a header row and return the index of each required column,
    /// in `columns()` order.
    pub fn validate(headers: &csv::StringRecord) -> Result<[usize; 5], SchemaError> {
        let mut idx = [0usize; 5];
        for (slot, name) in idx.iter_mut().zip(Self::columns()) {
            *slot = column_index(headers, name)?;
        }
        Ok(idx)
    }
}

/// Required columns of the order items CSV.
pub struct ItemsSchema;

impl ItemsSchema {
    pub const ORDER_ID: &'static str = "order_id";
    pub const SELLER_ID: &'static str = "seller_id";

    pub fn columns() -> [&'static str; 2] {
        [Self::ORDER_ID, Self::SELLER_ID]
    }

    pub fn validate(headers: &csv::StringRecord) -> Result<[usize; 2], SchemaError> {
        Ok([
            column_index(headers, Self::ORDER_ID)?,
            column_index(headers, Self::SELLER_ID)?,
        ])
    }
}

fn column_index(headers: &csv::StringRecord, name: &str) -> Result<usize, SchemaError> {
    headers
        .iter()
        .position(|h| h.trim() == name)
        .ok_or_else(|| SchemaError::MissingColumn(name.to_string()))
}

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("Missing required column: {0}")]
    MissingColumn(String),
}
