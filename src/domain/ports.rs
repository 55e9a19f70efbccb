use std::collections::HashSet;
use std::sync::Arc;

use super::errors::DomainError;
use super::order::{LineItem, NewOrderRecord, OrderDetail, OrderSummary, UserProfile};

pub trait OrderRepository: Send + Sync + 'static {
    fn user_exists(&self, id: i32) -> Result<bool, DomainError>;
    fn find_user_by_username(&self, username: &str) -> Result<Option<UserProfile>, DomainError>;

    /// Full set of catalog product ids, loaded in one query.
    fn product_ids(&self) -> Result<HashSet<i32>, DomainError>;

    /// Insert the order header and its line items atomically, returning the
    /// generated order id from the insert itself.
    fn insert_order(&self, order: &NewOrderRecord, items: &[LineItem]) -> Result<i32, DomainError>;

    fn list_orders(&self) -> Result<Vec<OrderSummary>, DomainError>;
    fn find_order(&self, id: i32) -> Result<Option<OrderSummary>, DomainError>;
    fn find_order_detail(&self, id: i32) -> Result<Option<OrderDetail>, DomainError>;

    /// Returns the number of rows matched by the update.
    fn set_order_status(&self, id: i32, status_id: i32) -> Result<usize, DomainError>;

    /// Archive the order, delete its line items, then delete the order row,
    /// all in one transaction. Returns the number of archived orders
    /// (0 when the order does not exist).
    fn archive_and_delete(&self, id: i32) -> Result<usize, DomainError>;
}

pub type SharedOrderRepo = Arc<dyn OrderRepository>;

impl OrderRepository for SharedOrderRepo {
    fn user_exists(&self, id: i32) -> Result<bool, DomainError> {
        (**self).user_exists(id)
    }

    fn find_user_by_username(&self, username: &str) -> Result<Option<UserProfile>, DomainError> {
        (**self).find_user_by_username(username)
    }

    fn product_ids(&self) -> Result<HashSet<i32>, DomainError> {
        (**self).product_ids()
    }

    fn insert_order(&self, order: &NewOrderRecord, items: &[LineItem]) -> Result<i32, DomainError> {
        (**self).insert_order(order, items)
    }

    fn list_orders(&self) -> Result<Vec<OrderSummary>, DomainError> {
        (**self).list_orders()
    }

    fn find_order(&self, id: i32) -> Result<Option<OrderSummary>, DomainError> {
        (**self).find_order(id)
    }

    fn find_order_detail(&self, id: i32) -> Result<Option<OrderDetail>, DomainError> {
        (**self).find_order_detail(id)
    }

    fn set_order_status(&self, id: i32, status_id: i32) -> Result<usize, DomainError> {
        (**self).set_order_status(id, status_id)
    }

    fn archive_and_delete(&self, id: i32) -> Result<usize, DomainError> {
        (**self).archive_and_delete(id)
    }
}
