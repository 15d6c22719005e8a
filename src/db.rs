//! Database connection management
//!
//! A single process-global SeaORM connection pool, initialised once at
//! startup. Handlers and background tasks borrow it through `get_db_pool`.

use once_cell::sync::OnceCell;
use sea_orm::{Database, DatabaseConnection};

static DB_POOL: OnceCell<DatabaseConnection> = OnceCell::new();

/// Connect to the database and store the pool. Called once at startup.
///
/// Panics if the connection fails or the pool is already set, since the
/// process cannot do anything useful without a store.
pub async fn init_db(database_url: String) {
    let pool = Database::connect(&database_url)
        .await
        .expect("Failed to connect to database");
    DB_POOL
        .set(pool)
        .expect("Database pool initialized more than once");
    log::info!("Database pool initialized");
}

/// Borrow the global connection pool.
///
/// Panics if `init_db` has not run.
pub fn get_db_pool() -> &'static DatabaseConnection {
    DB_POOL.get().expect("Database pool not initialized")
}
