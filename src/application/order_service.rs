use crate::domain::errors::DomainError;
use crate::domain::order::{
    expand_product_refs, NewOrderRecord, OrderDetail, OrderSummary, PlacedOrder, UserProfile,
};
use crate::domain::ports::OrderRepository;

/// Orchestrates the order workflow: existence checks, header insert and
/// line-item expansion run in a fixed sequence, and nothing is written if any
/// check fails.
#[derive(Clone)]
pub struct OrderService<R> {
    repo: R,
}

impl<R: OrderRepository> OrderService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Membership check against the full catalog id set. Loading every id in
    /// one query trades memory for round trips and only holds up while the
    /// catalog stays small.
    fn all_products_exist(&self, refs: &[i32]) -> Result<bool, DomainError> {
        let catalog = self.repo.product_ids()?;
        Ok(refs.iter().all(|id| catalog.contains(id)))
    }

    /// Place an order on behalf of an arbitrary user (admin variant).
    ///
    /// The user check runs before the product check, and both before any
    /// write. Header and line items are inserted in one transaction, so a
    /// failed expansion leaves no order behind.
    pub fn place_order(&self, order: NewOrderRecord) -> Result<PlacedOrder, DomainError> {
        if !self.repo.user_exists(order.user_id)? {
            return Err(DomainError::UserNotFound);
        }
        if !self.all_products_exist(&order.product_refs)? {
            return Err(DomainError::ProductNotFound);
        }

        let line_items = expand_product_refs(&order.product_refs);
        let id = self.repo.insert_order(&order, &line_items)?;

        Ok(PlacedOrder { id, line_items })
    }

    /// Place an order for the caller's own account (client variant). The
    /// ownership check runs first; on mismatch nothing is read or written.
    /// The status id is omitted so the schema default applies.
    pub fn place_order_for(
        &self,
        caller: &str,
        username: &str,
        payment_method_id: i32,
        product_refs: Vec<i32>,
    ) -> Result<(UserProfile, PlacedOrder), DomainError> {
        if caller != username {
            return Err(DomainError::IdentityMismatch);
        }

        let user = self
            .repo
            .find_user_by_username(username)?
            .ok_or(DomainError::UserNotFound)?;

        let placed = self.place_order(NewOrderRecord {
            user_id: user.id,
            payment_method_id,
            status_id: None,
            product_refs,
        })?;

        Ok((user, placed))
    }

    pub fn list_orders(&self) -> Result<Vec<OrderSummary>, DomainError> {
        self.repo.list_orders()
    }

    pub fn order_summary(&self, id: i32) -> Result<OrderSummary, DomainError> {
        self.repo.find_order(id)?.ok_or(DomainError::OrderNotFound)
    }

    pub fn order_detail(&self, id: i32) -> Result<OrderDetail, DomainError> {
        self.repo
            .find_order_detail(id)?
            .ok_or(DomainError::OrderNotFound)
    }

    pub fn update_status(&self, id: i32, status_id: i32) -> Result<(), DomainError> {
        match self.repo.set_order_status(id, status_id)? {
            0 => Err(DomainError::OrderNotFound),
            _ => Ok(()),
        }
    }

    pub fn delete_order(&self, id: i32) -> Result<(), DomainError> {
        match self.repo.archive_and_delete(id)? {
            0 => Err(DomainError::OrderNotFound),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::LineItem;
    use crate::testing::MemoryRepo;

    fn admin_order(user_id: i32, refs: Vec<i32>) -> NewOrderRecord {
        NewOrderRecord {
            user_id,
            payment_method_id: 1,
            status_id: Some(1),
            product_refs: refs,
        }
    }

    #[test]
    fn unknown_user_writes_nothing() {
        let repo = MemoryRepo::new().with_products(&[1, 2]);
        let service = OrderService::new(repo.clone());

        let err = service.place_order(admin_order(42, vec![1, 2])).unwrap_err();

        assert!(matches!(err, DomainError::UserNotFound));
        assert_eq!(repo.order_count(), 0);
    }

    #[test]
    fn unknown_product_writes_nothing() {
        let repo = MemoryRepo::new().with_user(5, "alice").with_products(&[1]);
        let service = OrderService::new(repo.clone());

        let err = service.place_order(admin_order(5, vec![1, 999])).unwrap_err();

        assert!(matches!(err, DomainError::ProductNotFound));
        assert_eq!(repo.order_count(), 0);
    }

    #[test]
    fn repeated_refs_become_line_item_quantities() {
        let repo = MemoryRepo::new().with_user(5, "alice").with_products(&[3, 7]);
        let service = OrderService::new(repo.clone());

        let placed = service.place_order(admin_order(5, vec![7, 7, 3, 7])).unwrap();

        assert_eq!(
            placed.line_items,
            vec![
                LineItem {
                    product_id: 7,
                    quantity: 3
                },
                LineItem {
                    product_id: 3,
                    quantity: 1
                },
            ]
        );
        let total: i32 = placed.line_items.iter().map(|i| i.quantity).sum();
        assert_eq!(total, 4);

        assert_eq!(repo.orders()[0].items, placed.line_items);
    }

    #[test]
    fn identity_mismatch_aborts_before_any_write() {
        let repo = MemoryRepo::new().with_user(5, "alice").with_products(&[1]);
        let service = OrderService::new(repo.clone());

        let err = service
            .place_order_for("bob", "alice", 1, vec![1])
            .unwrap_err();

        assert!(matches!(err, DomainError::IdentityMismatch));
        assert_eq!(repo.order_count(), 0);
    }

    #[test]
    fn client_order_defaults_status_and_returns_profile() {
        let repo = MemoryRepo::new().with_user(5, "alice").with_products(&[1, 2]);
        let service = OrderService::new(repo.clone());

        let (user, placed) = service
            .place_order_for("alice", "alice", 2, vec![1, 2, 2])
            .unwrap();

        assert_eq!(user.username, "alice");
        assert_eq!(placed.line_items.len(), 2);

        let orders = repo.orders();
        assert_eq!(orders[0].record.status_id, None);
        assert_eq!(orders[0].record.payment_method_id, 2);
    }

    #[test]
    fn status_update_distinguishes_matched_from_missing() {
        let repo = MemoryRepo::new().with_user(5, "alice").with_products(&[1]);
        let service = OrderService::new(repo.clone());

        let placed = service.place_order(admin_order(5, vec![1])).unwrap();

        assert!(service.update_status(placed.id, 3).is_ok());
        assert!(matches!(
            service.update_status(placed.id + 1, 3),
            Err(DomainError::OrderNotFound)
        ));
    }

    #[test]
    fn delete_archives_the_order_and_removes_it() {
        let repo = MemoryRepo::new().with_user(5, "alice").with_products(&[1]);
        let service = OrderService::new(repo.clone());

        let placed = service.place_order(admin_order(5, vec![1, 1])).unwrap();
        service.delete_order(placed.id).unwrap();

        assert!(repo.orders().is_empty());
        let archived = repo.archived();
        assert_eq!(archived.len(), 1);
        assert_eq!(archived[0].id, placed.id);
        assert_eq!(archived[0].record.product_refs, vec![1, 1]);
    }

    #[test]
    fn delete_of_missing_order_is_not_found() {
        let service = OrderService::new(MemoryRepo::new());
        assert!(matches!(
            service.delete_order(99),
            Err(DomainError::OrderNotFound)
        ));
    }
}
