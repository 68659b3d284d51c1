// storefront/src/db/orders.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use storefront_core::{
  NewOrder, Order, OrderStatus, OrderStore, OrderTimestamp, PendingOrder, StoreError, StoreResult,
};
use tracing::{debug, instrument};
use uuid::Uuid;

use super::store_error;

const ORDER_COLUMNS: &str = "id, user_id, status, total_amount_cents, currency, shipping_address, payment_method, items, created_at, updated_at";

#[derive(Debug, FromRow)]
struct OrderRow {
  id: Uuid,
  user_id: Uuid,
  status: String,
  total_amount_cents: i64,
  currency: String,
  shipping_address: Option<String>,
  payment_method: Option<String>,
  items: serde_json::Value,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
  type Error = StoreError;

  fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
    let status = row
      .status
      .parse::<OrderStatus>()
      .map_err(|e| StoreError::Malformed(format!("order {}: {}", row.id, e)))?;
    Ok(Order {
      id: row.id,
      user_id: row.user_id,
      status,
      total_amount_cents: row.total_amount_cents,
      currency: row.currency,
      shipping_address: row.shipping_address,
      payment_method: row.payment_method,
      items: row.items,
      created_at: row.created_at,
      updated_at: row.updated_at,
    })
  }
}

#[derive(Debug, FromRow)]
struct PendingRow {
  id: Uuid,
  user_id: Uuid,
  total_amount_cents: i64,
  currency: String,
  created_at: DateTime<Utc>,
}

impl From<PendingRow> for PendingOrder {
  fn from(row: PendingRow) -> Self {
    PendingOrder {
      id: row.id,
      user_id: row.user_id,
      total_amount_cents: row.total_amount_cents,
      currency: row.currency,
      created_at: OrderTimestamp::Native(row.created_at),
    }
  }
}

#[derive(Clone)]
pub struct PgOrderStore {
  pool: PgPool,
}

impl PgOrderStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl OrderStore for PgOrderStore {
  #[instrument(name = "db::orders::list_by_status", skip(self))]
  async fn list_by_status(&self, status: OrderStatus) -> StoreResult<Vec<PendingOrder>> {
    let rows: Vec<PendingRow> = sqlx::query_as(
      "SELECT id, user_id, total_amount_cents, currency, created_at FROM orders WHERE status = $1 ORDER BY created_at ASC",
    )
    .bind(status.as_str())
    .fetch_all(&self.pool)
    .await
    .map_err(|e| store_error("list_by_status", e))?;

    debug!(count = rows.len(), "Fetched orders by status.");
    Ok(rows.into_iter().map(PendingOrder::from).collect())
  }

  #[instrument(name = "db::orders::transition_status", skip(self))]
  async fn transition_status(&self, id: Uuid, from: OrderStatus, to: OrderStatus) -> StoreResult<bool> {
    let result = sqlx::query("UPDATE orders SET status = $1, updated_at = NOW() WHERE id = $2 AND status = $3")
      .bind(to.as_str())
      .bind(id)
      .bind(from.as_str())
      .execute(&self.pool)
      .await
      .map_err(|e| store_error("transition_status", e))?;

    Ok(result.rows_affected() == 1)
  }

  #[instrument(name = "db::orders::set_status", skip(self))]
  async fn set_status(&self, id: Uuid, status: OrderStatus) -> StoreResult<Option<Order>> {
    let sql = format!(
      "UPDATE orders SET status = $1, updated_at = NOW() WHERE id = $2 RETURNING {}",
      ORDER_COLUMNS
    );
    let row: Option<OrderRow> = sqlx::query_as(&sql)
      .bind(status.as_str())
      .bind(id)
      .fetch_optional(&self.pool)
      .await
      .map_err(|e| store_error("set_status", e))?;

    row.map(Order::try_from).transpose()
  }

  #[instrument(name = "db::orders::get", skip(self))]
  async fn get(&self, id: Uuid) -> StoreResult<Option<Order>> {
    let sql = format!("SELECT {} FROM orders WHERE id = $1", ORDER_COLUMNS);
    let row: Option<OrderRow> = sqlx::query_as(&sql)
      .bind(id)
      .fetch_optional(&self.pool)
      .await
      .map_err(|e| store_error("get", e))?;

    row.map(Order::try_from).transpose()
  }

  #[instrument(name = "db::orders::create", skip(self, order), fields(user_id = %order.user_id))]
  async fn create(&self, order: NewOrder) -> StoreResult<Order> {
    let sql = format!(
      "INSERT INTO orders (id, user_id, status, total_amount_cents, currency, shipping_address, payment_method, items) \
       VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {}",
      ORDER_COLUMNS
    );
    let row: OrderRow = sqlx::query_as(&sql)
      .bind(Uuid::new_v4())
      .bind(order.user_id)
      .bind(OrderStatus::Pending.as_str())
      .bind(order.total_amount_cents)
      .bind(&order.currency)
      .bind(&order.shipping_address)
      .bind(&order.payment_method)
      .bind(&order.items)
      .fetch_one(&self.pool)
      .await
      .map_err(|e| store_error("create", e))?;

    Order::try_from(row)
  }
}
