// core/src/error.rs
use anyhow::Error as AnyhowError;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Failure reported by an `OrderStore` or `UserStore` implementation.
#[derive(Debug, Error)]
pub enum StoreError {
  /// The store could not be reached or refused our credentials.
  #[error("Store unavailable: {source}")]
  Unavailable {
    #[source]
    source: AnyhowError,
  },

  #[error("Store operation '{operation}' failed. Source: {source}")]
  Operation {
    operation: &'static str,
    #[source]
    source: AnyhowError,
  },

  #[error("Malformed record: {0}")]
  Malformed(String),
}

impl StoreError {
  pub fn operation(operation: &'static str, source: impl Into<AnyhowError>) -> Self {
    StoreError::Operation {
      operation,
      source: source.into(),
    }
  }

  pub fn is_unavailable(&self) -> bool {
    matches!(self, StoreError::Unavailable { .. })
  }
}

/// Creation timestamp that could not be normalised to an epoch.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unparseable order timestamp '{raw}': {reason}")]
pub struct TimestampError {
  pub raw: String,
  pub reason: String,
}

/// Run-level failures of the auto-confirmation sweep.
///
/// Per-order problems never surface here; they are logged and counted in the
/// `SweepReport` instead.
#[derive(Debug, Error)]
pub enum SweepError {
  #[error("Listing pending orders failed. Source: {source}")]
  ListPending {
    #[source]
    source: StoreError,
  },

  #[error("A sweep run is already in progress")]
  AlreadyRunning,

  #[error("Sweep run exceeded its time limit of {after:?}")]
  TimedOut { after: Duration },
}

/// Reason a single order was not confirmed, carried only in logs.
#[derive(Debug, Error)]
pub(crate) enum OrderProcessingError {
  #[error("order {order_id}: {source}")]
  Timestamp {
    order_id: Uuid,
    #[source]
    source: TimestampError,
  },

  #[error("order {order_id}: status mutation failed: {source}")]
  Mutation {
    order_id: Uuid,
    #[source]
    source: StoreError,
  },
}

pub type SweepResult<T, E = SweepError> = std::result::Result<T, E>;
pub type StoreResult<T, E = StoreError> = std::result::Result<T, E>;
