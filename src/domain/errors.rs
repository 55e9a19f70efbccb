use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("User not found")]
    UserNotFound,
    #[error("One or more products not found")]
    ProductNotFound,
    #[error("Order not found")]
    OrderNotFound,
    #[error("Caller identity does not match the order owner")]
    IdentityMismatch,
    #[error("Storage error: {0}")]
    Storage(String),
}
