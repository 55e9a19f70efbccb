//! In-memory [`OrderRepository`] shared by the service unit tests and the
//! HTTP tests. Not part of the public API.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex};

use chrono::Utc;

use crate::domain::errors::DomainError;
use crate::domain::order::{
    LineItem, NewOrderRecord, OrderDetail, OrderSummary, ProductLine, UserProfile,
};
use crate::domain::ports::OrderRepository;

#[derive(Debug, Clone)]
pub struct StoredOrder {
    pub id: i32,
    pub record: NewOrderRecord,
    pub items: Vec<LineItem>,
}

#[derive(Debug, Clone)]
struct CatalogEntry {
    name: String,
    price: i32,
}

#[derive(Default)]
struct State {
    users: Vec<UserProfile>,
    catalog: BTreeMap<i32, CatalogEntry>,
    orders: Vec<StoredOrder>,
    archived: Vec<StoredOrder>,
    next_id: i32,
}

/// Repository backed by plain collections behind a mutex, so tests can
/// inspect exactly what was written.
#[derive(Clone)]
pub struct MemoryRepo {
    state: Arc<Mutex<State>>,
}

impl MemoryRepo {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                next_id: 1,
                ..State::default()
            })),
        }
    }

    pub fn with_user(self, id: i32, username: &str) -> Self {
        self.state.lock().unwrap().users.push(UserProfile {
            id,
            username: username.to_string(),
            fullname: format!("{username} example"),
            address: "1 Main St".to_string(),
            phone: "5550000".to_string(),
            email: format!("{username}@example.com"),
        });
        self
    }

    /// Seed catalog entries where only membership matters.
    pub fn with_products(self, ids: &[i32]) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            for &id in ids {
                state.catalog.entry(id).or_insert(CatalogEntry {
                    name: format!("product-{id}"),
                    price: 0,
                });
            }
        }
        self
    }

    /// Seed a catalog entry with a name and unit price, for tests that
    /// assert on summaries or details.
    pub fn with_priced_product(self, id: i32, name: &str, price: i32) -> Self {
        self.state.lock().unwrap().catalog.insert(
            id,
            CatalogEntry {
                name: name.to_string(),
                price,
            },
        );
        self
    }

    pub fn order_count(&self) -> usize {
        self.state.lock().unwrap().orders.len()
    }

    pub fn orders(&self) -> Vec<StoredOrder> {
        self.state.lock().unwrap().orders.clone()
    }

    pub fn archived(&self) -> Vec<StoredOrder> {
        self.state.lock().unwrap().archived.clone()
    }
}

impl Default for MemoryRepo {
    fn default() -> Self {
        Self::new()
    }
}

fn lines_of(state: &State, order: &StoredOrder) -> Vec<ProductLine> {
    order
        .items
        .iter()
        .map(|item| {
            let entry = state.catalog.get(&item.product_id);
            ProductLine {
                name: entry
                    .map(|e| e.name.clone())
                    .unwrap_or_else(|| item.product_id.to_string()),
                unit_price: entry.map(|e| e.price).unwrap_or(0),
                quantity: item.quantity,
            }
        })
        .collect()
}

fn total_of(lines: &[ProductLine]) -> i64 {
    lines
        .iter()
        .map(|l| i64::from(l.unit_price) * i64::from(l.quantity))
        .sum()
}

fn summary_of(state: &State, order: &StoredOrder) -> OrderSummary {
    let (username, address) = state
        .users
        .iter()
        .find(|u| u.id == order.record.user_id)
        .map(|u| (u.username.clone(), u.address.clone()))
        .unwrap_or_default();
    let lines = lines_of(state, order);
    OrderSummary {
        id: order.id,
        placed_at: Utc::now(),
        username,
        address,
        payment_method: "cash".to_string(),
        status: "new".to_string(),
        products: lines.iter().map(|l| l.name.clone()).collect(),
        total_price: total_of(&lines),
    }
}

impl OrderRepository for MemoryRepo {
    fn user_exists(&self, id: i32) -> Result<bool, DomainError> {
        Ok(self.state.lock().unwrap().users.iter().any(|u| u.id == id))
    }

    fn find_user_by_username(&self, username: &str) -> Result<Option<UserProfile>, DomainError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .users
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    fn product_ids(&self) -> Result<HashSet<i32>, DomainError> {
        Ok(self.state.lock().unwrap().catalog.keys().copied().collect())
    }

    fn insert_order(&self, order: &NewOrderRecord, items: &[LineItem]) -> Result<i32, DomainError> {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id;
        state.next_id += 1;
        state.orders.push(StoredOrder {
            id,
            record: order.clone(),
            items: items.to_vec(),
        });
        Ok(id)
    }

    fn list_orders(&self) -> Result<Vec<OrderSummary>, DomainError> {
        let state = self.state.lock().unwrap();
        Ok(state.orders.iter().map(|o| summary_of(&state, o)).collect())
    }

    fn find_order(&self, id: i32) -> Result<Option<OrderSummary>, DomainError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .orders
            .iter()
            .find(|o| o.id == id)
            .map(|o| summary_of(&state, o)))
    }

    fn find_order_detail(&self, id: i32) -> Result<Option<OrderDetail>, DomainError> {
        let state = self.state.lock().unwrap();
        let Some(order) = state.orders.iter().find(|o| o.id == id) else {
            return Ok(None);
        };
        let user = state
            .users
            .iter()
            .find(|u| u.id == order.record.user_id)
            .cloned()
            .ok_or_else(|| DomainError::Storage("order references a missing user".to_string()))?;
        let lines = lines_of(&state, order);
        let total_price = total_of(&lines);
        Ok(Some(OrderDetail {
            id: order.id,
            username: user.username,
            fullname: user.fullname,
            address: user.address,
            phone: user.phone,
            email: user.email,
            payment_method: "cash".to_string(),
            status: "new".to_string(),
            lines,
            total_price,
        }))
    }

    fn set_order_status(&self, id: i32, status_id: i32) -> Result<usize, DomainError> {
        let mut state = self.state.lock().unwrap();
        match state.orders.iter_mut().find(|o| o.id == id) {
            Some(order) => {
                order.record.status_id = Some(status_id);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    fn archive_and_delete(&self, id: i32) -> Result<usize, DomainError> {
        let mut state = self.state.lock().unwrap();
        match state.orders.iter().position(|o| o.id == id) {
            Some(pos) => {
                let order = state.orders.remove(pos);
                state.archived.push(order);
                Ok(1)
            }
            None => Ok(0),
        }
    }
}
