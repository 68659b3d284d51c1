// core/src/model/order.rs

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::TimestampError;

/// Lifecycle state of an order. `Pending` is always the initial state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
  Pending,
  Confirmed,
  Processing,
  Shipped,
  Delivered,
  Cancelled,
}

impl OrderStatus {
  pub const ALL: [OrderStatus; 6] = [
    OrderStatus::Pending,
    OrderStatus::Confirmed,
    OrderStatus::Processing,
    OrderStatus::Shipped,
    OrderStatus::Delivered,
    OrderStatus::Cancelled,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      OrderStatus::Pending => "Pending",
      OrderStatus::Confirmed => "Confirmed",
      OrderStatus::Processing => "Processing",
      OrderStatus::Shipped => "Shipped",
      OrderStatus::Delivered => "Delivered",
      OrderStatus::Cancelled => "Cancelled",
    }
  }

  /// Delivered and cancelled orders take no further transitions.
  pub fn is_terminal(&self) -> bool {
    matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
  }
}

impl fmt::Display for OrderStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown order status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for OrderStatus {
  type Err = UnknownStatus;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let trimmed = s.trim();
    OrderStatus::ALL
      .iter()
      .copied()
      .find(|status| status.as_str().eq_ignore_ascii_case(trimmed))
      .ok_or_else(|| UnknownStatus(s.to_string()))
  }
}

/// A creation timestamp in whatever shape the backing store hands it over.
///
/// Stores differ: some return epoch milliseconds, some RFC 3339 text, some a
/// native date value. The sweep only ever compares `epoch_millis()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OrderTimestamp {
  EpochMillis(i64),
  Native(DateTime<Utc>),
  Text(String),
}

impl OrderTimestamp {
  pub fn epoch_millis(&self) -> Result<i64, TimestampError> {
    match self {
      OrderTimestamp::EpochMillis(ms) => Ok(*ms),
      OrderTimestamp::Native(dt) => Ok(dt.timestamp_millis()),
      OrderTimestamp::Text(raw) => parse_text_timestamp(raw),
    }
  }
}

impl From<DateTime<Utc>> for OrderTimestamp {
  fn from(dt: DateTime<Utc>) -> Self {
    OrderTimestamp::Native(dt)
  }
}

fn parse_text_timestamp(raw: &str) -> Result<i64, TimestampError> {
  let trimmed = raw.trim();
  if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
    return Ok(dt.timestamp_millis());
  }
  // SQL-style "YYYY-MM-DD HH:MM:SS[.fff]" without an offset is taken as UTC.
  if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S%.f") {
    return Ok(Utc.from_utc_datetime(&naive).timestamp_millis());
  }
  if let Ok(ms) = trimmed.parse::<i64>() {
    return Ok(ms);
  }
  Err(TimestampError {
    raw: raw.to_string(),
    reason: "expected epoch milliseconds, RFC 3339, or 'YYYY-MM-DD HH:MM:SS'".to_string(),
  })
}

/// Projection returned when listing orders by status; all the sweep reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingOrder {
  pub id: Uuid,
  pub user_id: Uuid,
  pub total_amount_cents: i64,
  pub currency: String,
  pub created_at: OrderTimestamp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
  pub id: Uuid,
  pub user_id: Uuid,
  pub status: OrderStatus,
  pub total_amount_cents: i64,
  pub currency: String,
  // Pass-through fields owned by checkout and fulfilment.
  pub shipping_address: Option<String>,
  pub payment_method: Option<String>,
  pub items: serde_json::Value,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Order {
  pub fn to_pending(&self) -> PendingOrder {
    PendingOrder {
      id: self.id,
      user_id: self.user_id,
      total_amount_cents: self.total_amount_cents,
      currency: self.currency.clone(),
      created_at: OrderTimestamp::Native(self.created_at),
    }
  }
}

/// Everything needed to place an order. Orders are always created `Pending`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOrder {
  pub user_id: Uuid,
  pub total_amount_cents: i64,
  pub currency: String,
  pub shipping_address: Option<String>,
  pub payment_method: Option<String>,
  #[serde(default)]
  pub items: serde_json::Value,
}
