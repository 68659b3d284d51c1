// storefront/src/db/users.rs

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use storefront_core::{StoreResult, UserContact, UserStore};
use tracing::instrument;
use uuid::Uuid;

use super::store_error;

#[derive(Debug, FromRow)]
struct ContactRow {
  id: Uuid,
  name: String,
  email: String,
}

#[derive(Clone)]
pub struct PgUserStore {
  pool: PgPool,
}

impl PgUserStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl UserStore for PgUserStore {
  #[instrument(name = "db::users::get_contact", skip(self))]
  async fn get_contact(&self, id: Uuid) -> StoreResult<Option<UserContact>> {
    let row: Option<ContactRow> = sqlx::query_as("SELECT id, name, email FROM users WHERE id = $1")
      .bind(id)
      .fetch_optional(&self.pool)
      .await
      .map_err(|e| store_error("get_contact", e))?;

    Ok(row.map(|r| UserContact {
      id: r.id,
      name: r.name,
      email: r.email,
    }))
  }
}
