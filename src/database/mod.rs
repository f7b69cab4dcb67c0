mod connection;

pub use connection::{PoolStatus, check_health, create_pool, run_migrations};
