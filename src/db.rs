use std::time::Duration;

use diesel::pg::PgConnection;
use diesel::r2d2::{Builder, ConnectionManager, Pool};

pub type DbPool = Pool<ConnectionManager<PgConnection>>;

/// Pool size used when `DATABASE_POOL_SIZE` is not set.
pub const DEFAULT_POOL_SIZE: u32 = 10;

const CONNECTION_TIMEOUT: Duration = Duration::from_secs(5);

pub fn create_pool(database_url: &str, max_size: u32) -> DbPool {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    pool_builder(max_size)
        .build(manager)
        .expect("Failed to create database connection pool")
}

/// Bounded pool with a short acquire timeout, so a saturated pool surfaces
/// as an error instead of a request hanging on checkout.
fn pool_builder(max_size: u32) -> Builder<ConnectionManager<PgConnection>> {
    Pool::builder()
        .max_size(max_size)
        .connection_timeout(CONNECTION_TIMEOUT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_is_bounded_to_the_requested_size() {
        let manager = ConnectionManager::<PgConnection>::new("postgres://localhost/unused");
        // build_unchecked does not open connections, so no database is needed.
        let pool = pool_builder(3).build_unchecked(manager);
        assert_eq!(pool.max_size(), 3);
    }
}
