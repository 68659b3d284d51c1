// core/src/memory.rs

//! In-memory implementations of the store and transport traits.
//!
//! They keep everything behind `parking_lot` locks and support fault
//! injection so the sweep's partial-failure paths can be driven directly.
//! Lock guards are never held across an `.await`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::model::{NewOrder, Order, OrderStatus, OrderTimestamp, PendingOrder, UserContact};
use crate::notify::{DeliveryReceipt, Envelope, NotificationTransport};
use crate::store::{OrderStore, UserStore};

#[derive(Default)]
pub struct InMemoryOrderStore {
  // Insertion order doubles as the listing order.
  orders: RwLock<Vec<Order>>,
  created_at_overrides: RwLock<HashMap<Uuid, OrderTimestamp>>,
  fail_listing: AtomicBool,
  failing_mutations: Mutex<HashSet<Uuid>>,
  latency: Mutex<Option<Duration>>,
  list_calls: AtomicUsize,
  transition_calls: AtomicUsize,
  in_flight: AtomicUsize,
  max_in_flight: AtomicUsize,
}

impl InMemoryOrderStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn insert(&self, order: Order) {
    self.orders.write().push(order);
  }

  /// Adds a `Pending` order created at `created_at` and returns its id.
  pub fn seed_pending(&self, user_id: Uuid, total_amount_cents: i64, created_at: DateTime<Utc>) -> Uuid {
    let id = Uuid::new_v4();
    self.insert(Order {
      id,
      user_id,
      status: OrderStatus::Pending,
      total_amount_cents,
      currency: "INR".to_string(),
      shipping_address: None,
      payment_method: None,
      items: serde_json::Value::Array(Vec::new()),
      created_at,
      updated_at: created_at,
    });
    id
  }

  /// Makes listings report this order's creation time in a different shape.
  pub fn override_created_at(&self, id: Uuid, created_at: OrderTimestamp) {
    self.created_at_overrides.write().insert(id, created_at);
  }

  pub fn fail_listing(&self, fail: bool) {
    self.fail_listing.store(fail, Ordering::SeqCst);
  }

  pub fn fail_mutation_for(&self, id: Uuid) {
    self.failing_mutations.lock().insert(id);
  }

  pub fn clear_mutation_failures(&self) {
    self.failing_mutations.lock().clear();
  }

  /// Delays every conditional transition by `latency`.
  pub fn set_latency(&self, latency: Option<Duration>) {
    *self.latency.lock() = latency;
  }

  pub fn status_of(&self, id: Uuid) -> Option<OrderStatus> {
    self.orders.read().iter().find(|o| o.id == id).map(|o| o.status)
  }

  pub fn list_calls(&self) -> usize {
    self.list_calls.load(Ordering::SeqCst)
  }

  pub fn transition_calls(&self) -> usize {
    self.transition_calls.load(Ordering::SeqCst)
  }

  /// Highest number of transitions observed running at the same time.
  pub fn max_in_flight(&self) -> usize {
    self.max_in_flight.load(Ordering::SeqCst)
  }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
  async fn list_by_status(&self, status: OrderStatus) -> StoreResult<Vec<PendingOrder>> {
    self.list_calls.fetch_add(1, Ordering::SeqCst);
    if self.fail_listing.load(Ordering::SeqCst) {
      return Err(StoreError::Unavailable {
        source: anyhow::anyhow!("in-memory store configured to refuse listings"),
      });
    }
    let overrides = self.created_at_overrides.read();
    Ok(
      self
        .orders
        .read()
        .iter()
        .filter(|o| o.status == status)
        .map(|o| {
          let mut pending = o.to_pending();
          if let Some(ts) = overrides.get(&o.id) {
            pending.created_at = ts.clone();
          }
          pending
        })
        .collect(),
    )
  }

  async fn transition_status(&self, id: Uuid, from: OrderStatus, to: OrderStatus) -> StoreResult<bool> {
    self.transition_calls.fetch_add(1, Ordering::SeqCst);
    let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
    self.max_in_flight.fetch_max(current, Ordering::SeqCst);

    let latency = *self.latency.lock();
    if let Some(delay) = latency {
      tokio::time::sleep(delay).await;
    }

    let result = if self.failing_mutations.lock().contains(&id) {
      Err(StoreError::operation(
        "transition_status",
        anyhow::anyhow!("injected mutation failure for order {}", id),
      ))
    } else {
      let mut orders = self.orders.write();
      match orders.iter_mut().find(|o| o.id == id) {
        Some(order) if order.status == from => {
          order.status = to;
          order.updated_at = Utc::now();
          Ok(true)
        }
        _ => Ok(false),
      }
    };

    self.in_flight.fetch_sub(1, Ordering::SeqCst);
    result
  }

  async fn set_status(&self, id: Uuid, status: OrderStatus) -> StoreResult<Option<Order>> {
    let mut orders = self.orders.write();
    Ok(orders.iter_mut().find(|o| o.id == id).map(|order| {
      order.status = status;
      order.updated_at = Utc::now();
      order.clone()
    }))
  }

  async fn get(&self, id: Uuid) -> StoreResult<Option<Order>> {
    Ok(self.orders.read().iter().find(|o| o.id == id).cloned())
  }

  async fn create(&self, new_order: NewOrder) -> StoreResult<Order> {
    let now = Utc::now();
    let order = Order {
      id: Uuid::new_v4(),
      user_id: new_order.user_id,
      status: OrderStatus::Pending,
      total_amount_cents: new_order.total_amount_cents,
      currency: new_order.currency,
      shipping_address: new_order.shipping_address,
      payment_method: new_order.payment_method,
      items: new_order.items,
      created_at: now,
      updated_at: now,
    };
    self.insert(order.clone());
    Ok(order)
  }
}

#[derive(Default)]
pub struct InMemoryUserStore {
  users: RwLock<HashMap<Uuid, UserContact>>,
  failing_lookups: Mutex<HashSet<Uuid>>,
  lookups: AtomicUsize,
}

impl InMemoryUserStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Registers a user and returns the generated id.
  pub fn add(&self, name: &str, email: &str) -> Uuid {
    let id = Uuid::new_v4();
    self.users.write().insert(
      id,
      UserContact {
        id,
        name: name.to_string(),
        email: email.to_string(),
      },
    );
    id
  }

  pub fn fail_lookup_for(&self, id: Uuid) {
    self.failing_lookups.lock().insert(id);
  }

  pub fn lookups(&self) -> usize {
    self.lookups.load(Ordering::SeqCst)
  }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
  async fn get_contact(&self, id: Uuid) -> StoreResult<Option<UserContact>> {
    self.lookups.fetch_add(1, Ordering::SeqCst);
    if self.failing_lookups.lock().contains(&id) {
      return Err(StoreError::operation(
        "get_contact",
        anyhow::anyhow!("injected lookup failure for user {}", id),
      ));
    }
    Ok(self.users.read().get(&id).cloned())
  }
}

/// Transport that keeps every envelope it accepts.
#[derive(Default)]
pub struct RecordingTransport {
  sent: Mutex<Vec<Envelope>>,
  failing_recipients: Mutex<HashSet<String>>,
  attempts: AtomicUsize,
}

impl RecordingTransport {
  pub fn fail_for(&self, recipient: &str) {
    self.failing_recipients.lock().insert(recipient.to_string());
  }

  pub fn sent(&self) -> Vec<Envelope> {
    self.sent.lock().clone()
  }

  pub fn attempts(&self) -> usize {
    self.attempts.load(Ordering::SeqCst)
  }
}

#[async_trait]
impl NotificationTransport for RecordingTransport {
  async fn send(&self, envelope: &Envelope) -> anyhow::Result<DeliveryReceipt> {
    let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
    if self.failing_recipients.lock().contains(&envelope.to) {
      anyhow::bail!("recipient {} rejected by recording transport", envelope.to);
    }
    self.sent.lock().push(envelope.clone());
    Ok(DeliveryReceipt {
      message_id: format!("recorded-{}", attempt),
    })
  }
}
