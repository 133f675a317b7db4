//! PostgreSQL connection pool and schema migrations.

pub mod pool;

pub use pool::{create_pool, run_migrations, DatabaseError};
