// core/src/store.rs

//! Narrow interfaces onto the order and user datastores.
//!
//! Implementations own their connection handling and concurrency control. The
//! sweep holds these as trait objects so tests can swap in the in-memory
//! versions from [`crate::memory`].

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StoreResult;
use crate::model::{NewOrder, Order, OrderStatus, PendingOrder, UserContact};

#[async_trait]
pub trait OrderStore: Send + Sync {
  /// All orders currently in `status`, in whatever order the store returns them.
  async fn list_by_status(&self, status: OrderStatus) -> StoreResult<Vec<PendingOrder>>;

  /// Moves order `id` from `from` to `to` only if it is still in `from`.
  ///
  /// Returns `Ok(false)` when nothing changed, either because the order has
  /// already left `from` or because it does not exist.
  async fn transition_status(&self, id: Uuid, from: OrderStatus, to: OrderStatus) -> StoreResult<bool>;

  /// Unconditional status write used by admin actions.
  async fn set_status(&self, id: Uuid, status: OrderStatus) -> StoreResult<Option<Order>>;

  async fn get(&self, id: Uuid) -> StoreResult<Option<Order>>;

  async fn create(&self, order: NewOrder) -> StoreResult<Order>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
  async fn get_contact(&self, id: Uuid) -> StoreResult<Option<UserContact>>;
}
