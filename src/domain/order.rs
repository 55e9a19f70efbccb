use chrono::{DateTime, Utc};

/// One line item of an order: a unique product and how many times it was
/// referenced in the raw product list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    pub product_id: i32,
    pub quantity: i32,
}

/// Input for a new order header. `status_id` is `None` for client-placed
/// orders, which take the schema default.
#[derive(Debug, Clone)]
pub struct NewOrderRecord {
    pub user_id: i32,
    pub payment_method_id: i32,
    pub status_id: Option<i32>,
    pub product_refs: Vec<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedOrder {
    pub id: i32,
    pub line_items: Vec<LineItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub id: i32,
    pub username: String,
    pub fullname: String,
    pub address: String,
    pub phone: String,
    pub email: String,
}

#[derive(Debug, Clone)]
pub struct OrderSummary {
    pub id: i32,
    pub placed_at: DateTime<Utc>,
    pub username: String,
    pub address: String,
    pub payment_method: String,
    pub status: String,
    pub products: Vec<String>,
    pub total_price: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductLine {
    pub name: String,
    pub unit_price: i32,
    pub quantity: i32,
}

#[derive(Debug, Clone)]
pub struct OrderDetail {
    pub id: i32,
    pub username: String,
    pub fullname: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub payment_method: String,
    pub status: String,
    pub lines: Vec<ProductLine>,
    pub total_price: i64,
}

/// Expand a raw, possibly-repeated product-reference list into one line item
/// per unique product, with quantity equal to the number of occurrences.
/// First-occurrence order is preserved so the result is deterministic.
///
/// The sum of the returned quantities always equals `refs.len()`.
pub fn expand_product_refs(refs: &[i32]) -> Vec<LineItem> {
    let mut items: Vec<LineItem> = Vec::new();
    for &id in refs {
        match items.iter_mut().find(|item| item.product_id == id) {
            Some(item) => item.quantity += 1,
            None => items.push(LineItem {
                product_id: id,
                quantity: 1,
            }),
        }
    }
    items
}
