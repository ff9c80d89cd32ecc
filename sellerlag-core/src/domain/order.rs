use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Status value of an order that reached the customer.
pub const DELIVERED_STATUS: &str = "delivered";

/// One row of the `orders` relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub order_id: String,
    pub order_status: String,
    pub order_purchase_timestamp: NaiveDateTime,
    pub order_estimated_delivery_date: Option<NaiveDateTime>,
    pub order_delivered_customer_date: Option<NaiveDateTime>,
}

impl OrderRecord {
    pub fn is_delivered(&self) -> bool {
        self.order_status == DELIVERED_STATUS
    }
}

/// One row of the `order_items` relation, reduced to the order-seller link.
///
/// An order may appear several times, once per item, and may map to more
/// than one seller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderItemRecord {
    pub order_id: String,
    pub seller_id: String,
}

impl OrderItemRecord {
    pub fn new(order_id: impl Into<String>, seller_id: impl Into<String>) -> Self {
        Self {
            order_id: order_id.into(),
            seller_id: seller_id.into(),
        }
    }
}
