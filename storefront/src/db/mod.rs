// storefront/src/db/mod.rs

//! Postgres-backed implementations of the core store traits.
//!
//! Every statement is parameterised; values only ever travel as binds.

pub mod orders;
pub mod users;

pub use orders::PgOrderStore;
pub use users::PgUserStore;

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use storefront_core::StoreError;

use crate::config::AppConfig;

pub async fn connect(config: &AppConfig) -> Result<PgPool, sqlx::Error> {
  PgPoolOptions::new()
    .max_connections(config.db_max_connections)
    .acquire_timeout(Duration::from_secs(5))
    .connect(&config.database_url)
    .await
}

/// Splits sqlx failures into "cannot reach or log in to the store" and
/// "this particular statement failed".
pub(crate) fn store_error(operation: &'static str, err: sqlx::Error) -> StoreError {
  match err {
    e @ (sqlx::Error::PoolTimedOut
    | sqlx::Error::PoolClosed
    | sqlx::Error::WorkerCrashed
    | sqlx::Error::Io(_)
    | sqlx::Error::Tls(_)) => StoreError::Unavailable { source: e.into() },
    sqlx::Error::Database(db) if is_connection_class(db.code().as_deref()) => StoreError::Unavailable {
      source: sqlx::Error::Database(db).into(),
    },
    other => StoreError::operation(operation, other),
  }
}

// SQLSTATE class 08 is connection exceptions, 28 is invalid authorization.
fn is_connection_class(code: Option<&str>) -> bool {
  matches!(code, Some(c) if c.starts_with("08") || c.starts_with("28"))
}
