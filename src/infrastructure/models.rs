use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

use crate::schema::{deleted_orders, order_products, orders, products, users};

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    pub id: i32,
    pub username: String,
    pub fullname: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub role_id: i32,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProductRow {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub price: i32,
    pub stock: i32,
    pub picture: String,
}

#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = products)]
#[diesel(treat_none_as_null = true)]
pub struct NewProductRow {
    pub name: String,
    pub description: Option<String>,
    pub price: i32,
    pub stock: i32,
    pub picture: String,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderRow {
    pub id: i32,
    pub user_id: i32,
    pub payment_method_id: i32,
    pub status_id: i32,
    pub product_refs: Value,
    pub placed_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = orders)]
pub struct NewOrderRow {
    pub user_id: i32,
    pub payment_method_id: i32,
    /// `None` lets the column default apply (client-placed orders).
    pub status_id: Option<i32>,
    pub product_refs: Value,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Associations)]
#[diesel(table_name = order_products)]
#[diesel(primary_key(order_id, product_id))]
#[diesel(belongs_to(OrderRow, foreign_key = order_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderProductRow {
    pub order_id: i32,
    pub product_id: i32,
    pub quantity: i32,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = order_products)]
pub struct NewOrderProductRow {
    pub order_id: i32,
    pub product_id: i32,
    pub quantity: i32,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Insertable)]
#[diesel(table_name = deleted_orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DeletedOrderRow {
    pub id: i32,
    pub user_id: i32,
    pub payment_method_id: i32,
    pub status_id: i32,
    pub product_refs: Value,
    pub placed_at: DateTime<Utc>,
}

impl From<OrderRow> for DeletedOrderRow {
    fn from(row: OrderRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            payment_method_id: row.payment_method_id,
            status_id: row.status_id,
            product_refs: row.product_refs,
            placed_at: row.placed_at,
        }
    }
}
