// tests/common/mod.rs
#![allow(dead_code)] // Not every test file uses every helper

use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use storefront_core::memory::{InMemoryOrderStore, InMemoryUserStore, RecordingTransport};
use storefront_core::{AutoConfirmSweep, Dispatcher, ManualClock, RunReporter, SweepConfig, SweepError, SweepReport};
use tracing::Level;
use uuid::Uuid;

pub const SENDER: &str = "orders@storefront.test";

pub fn fixed_now() -> DateTime<Utc> {
  Utc.with_ymd_and_hms(2026, 10, 16, 10, 0, 0).unwrap()
}

// --- Sweep wired to in-memory collaborators and a manual clock ---
pub struct Harness {
  pub orders: Arc<InMemoryOrderStore>,
  pub users: Arc<InMemoryUserStore>,
  pub transport: Arc<RecordingTransport>,
  pub clock: Arc<ManualClock>,
  pub sweep: Arc<AutoConfirmSweep>,
}

impl Harness {
  pub fn new(threshold: Duration, max_in_flight: usize) -> Self {
    let orders = Arc::new(InMemoryOrderStore::new());
    let users = Arc::new(InMemoryUserStore::new());
    let transport = Arc::new(RecordingTransport::default());
    let clock = Arc::new(ManualClock::new(fixed_now()));
    let sweep = Arc::new(AutoConfirmSweep::with_clock(
      orders.clone(),
      users.clone(),
      Dispatcher::new(transport.clone(), SENDER),
      SweepConfig {
        threshold,
        max_in_flight,
      },
      clock.clone(),
    ));
    Self {
      orders,
      users,
      transport,
      clock,
      sweep,
    }
  }

  /// One-minute threshold, sequential processing.
  pub fn one_minute() -> Self {
    Self::new(Duration::from_secs(60), 1)
  }

  pub fn customer(&self, name: &str, email: &str) -> Uuid {
    self.users.add(name, email)
  }

  /// A pending order created `age` before the harness clock's current time.
  pub fn pending_order(&self, user_id: Uuid, total_amount_cents: i64, age: ChronoDuration) -> Uuid {
    self
      .orders
      .seed_pending(user_id, total_amount_cents, self.clock_now() - age)
  }

  pub fn clock_now(&self) -> DateTime<Utc> {
    use storefront_core::Clock;
    self.clock.now()
  }
}

// --- Reporter that remembers what it was told ---
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reported {
  Success { confirmed: usize, pending_seen: usize },
  Failure(String),
}

#[derive(Clone, Default)]
pub struct RecordingReporter {
  calls: Arc<Mutex<Vec<Reported>>>,
}

impl RecordingReporter {
  pub fn calls(&self) -> Vec<Reported> {
    self.calls.lock().clone()
  }
}

impl RunReporter for RecordingReporter {
  fn report_success(self, report: &SweepReport) {
    self.calls.lock().push(Reported::Success {
      confirmed: report.confirmed,
      pending_seen: report.pending_seen,
    });
  }

  fn report_failure(self, error: &SweepError) {
    self.calls.lock().push(Reported::Failure(error.to_string()));
  }
}

// --- Helper for Tracing Setup (call once per test run if needed) ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
