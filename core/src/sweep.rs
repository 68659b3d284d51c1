// core/src/sweep.rs

//! The auto-confirmation sweep.
//!
//! One run lists every `Pending` order, ages each against a single "now", and
//! moves those at least `threshold` old to `Confirmed`, notifying the owner on
//! a best-effort basis. Only the initial listing can fail the run; anything
//! that goes wrong for an individual order is logged, counted, and skipped.
//! Nothing is retried inside a run: a failed mutation leaves the order
//! `Pending` for the next run, and a failed notification is not resent.

use chrono::{DateTime, Utc};
use futures_util::stream::{self, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::clock::{Clock, SystemClock};
use crate::error::{OrderProcessingError, SweepError, SweepResult};
use crate::model::{OrderStatus, PendingOrder};
use crate::notify::{Dispatcher, NotificationOutcome, OrderRef, StatusNotifier};
use crate::store::{OrderStore, UserStore};

const MILLIS_PER_MINUTE: i64 = 60_000;

#[derive(Debug, Clone)]
pub struct SweepConfig {
  /// Minimum age before a pending order is confirmed.
  pub threshold: Duration,
  /// Upper bound on orders processed at the same time. Values below 1 act as 1.
  pub max_in_flight: usize,
}

impl Default for SweepConfig {
  fn default() -> Self {
    Self {
      threshold: Duration::from_secs(60),
      max_in_flight: 4,
    }
  }
}

/// Counters for one completed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SweepReport {
  pub run_id: Uuid,
  pub started_at: DateTime<Utc>,
  pub pending_seen: usize,
  pub confirmed: usize,
  pub not_yet_eligible: usize,
  /// Eligible orders some other actor moved out of `Pending` first.
  pub already_transitioned: usize,
  pub invalid_timestamp: usize,
  pub mutation_failures: usize,
  pub notified: usize,
  pub notification_skipped: usize,
  pub notification_failures: usize,
}

impl SweepReport {
  fn empty(run_id: Uuid, started_at: DateTime<Utc>) -> Self {
    Self {
      run_id,
      started_at,
      pending_seen: 0,
      confirmed: 0,
      not_yet_eligible: 0,
      already_transitioned: 0,
      invalid_timestamp: 0,
      mutation_failures: 0,
      notified: 0,
      notification_skipped: 0,
      notification_failures: 0,
    }
  }

  fn tally(&mut self, outcome: OrderOutcome) {
    match outcome {
      OrderOutcome::NotYetEligible => self.not_yet_eligible += 1,
      OrderOutcome::InvalidTimestamp => self.invalid_timestamp += 1,
      OrderOutcome::MutationFailed => self.mutation_failures += 1,
      OrderOutcome::AlreadyTransitioned => self.already_transitioned += 1,
      OrderOutcome::Confirmed(notification) => {
        self.confirmed += 1;
        match notification {
          NotificationOutcome::Sent => self.notified += 1,
          NotificationOutcome::RecipientMissing => self.notification_skipped += 1,
          NotificationOutcome::LookupFailed | NotificationOutcome::DispatchFailed => self.notification_failures += 1,
        }
      }
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OrderOutcome {
  NotYetEligible,
  InvalidTimestamp,
  MutationFailed,
  AlreadyTransitioned,
  Confirmed(NotificationOutcome),
}

/// Receives the result of one invocation. Both methods consume the reporter,
/// so a run can be reported at most once.
pub trait RunReporter {
  fn report_success(self, report: &SweepReport);
  fn report_failure(self, error: &SweepError);
}

/// Hands a finished run to `reporter`, calling exactly one of its methods.
pub fn report_outcome<R: RunReporter>(reporter: R, result: &SweepResult<SweepReport>) {
  match result {
    Ok(report) => reporter.report_success(report),
    Err(e) => reporter.report_failure(e),
  }
}

/// Reports runs to the tracing subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingReporter;

impl RunReporter for LoggingReporter {
  fn report_success(self, report: &SweepReport) {
    info!(
      run_id = %report.run_id,
      pending_seen = report.pending_seen,
      confirmed = report.confirmed,
      not_yet_eligible = report.not_yet_eligible,
      already_transitioned = report.already_transitioned,
      invalid_timestamp = report.invalid_timestamp,
      mutation_failures = report.mutation_failures,
      notified = report.notified,
      notification_skipped = report.notification_skipped,
      notification_failures = report.notification_failures,
      "Auto-confirmation sweep completed."
    );
  }

  fn report_failure(self, error: &SweepError) {
    match error {
      SweepError::AlreadyRunning => warn!("Auto-confirmation sweep skipped: previous run still in progress."),
      other => error!(error = %other, "Auto-confirmation sweep failed."),
    }
  }
}

pub struct AutoConfirmSweep {
  orders: Arc<dyn OrderStore>,
  notifier: StatusNotifier,
  clock: Arc<dyn Clock>,
  config: SweepConfig,
  // Held for the whole run; a second caller fails fast instead of queueing.
  run_lock: AsyncMutex<()>,
}

impl AutoConfirmSweep {
  pub fn new(
    orders: Arc<dyn OrderStore>,
    users: Arc<dyn UserStore>,
    dispatcher: Dispatcher,
    config: SweepConfig,
  ) -> Self {
    Self::with_clock(orders, users, dispatcher, config, Arc::new(SystemClock))
  }

  pub fn with_clock(
    orders: Arc<dyn OrderStore>,
    users: Arc<dyn UserStore>,
    dispatcher: Dispatcher,
    config: SweepConfig,
    clock: Arc<dyn Clock>,
  ) -> Self {
    let notifier = StatusNotifier::new(users, dispatcher, clock.clone());
    Self {
      orders,
      notifier,
      clock,
      config,
      run_lock: AsyncMutex::new(()),
    }
  }

  pub fn config(&self) -> &SweepConfig {
    &self.config
  }

  /// Runs once and reports the result to `reporter`.
  pub async fn invoke<R: RunReporter>(&self, reporter: R) -> SweepResult<SweepReport> {
    let result = self.run().await;
    report_outcome(reporter, &result);
    result
  }

  /// Runs once. Fails only if another run is in flight or the pending
  /// listing cannot be fetched.
  pub async fn run(&self) -> SweepResult<SweepReport> {
    let _running = self.run_lock.try_lock().map_err(|_| SweepError::AlreadyRunning)?;
    let run_id = Uuid::new_v4();
    self
      .run_exclusive(run_id)
      .instrument(info_span!("sweep::run", %run_id))
      .await
  }

  async fn run_exclusive(&self, run_id: Uuid) -> SweepResult<SweepReport> {
    let now = self.clock.now();
    let mut report = SweepReport::empty(run_id, now);

    let pending = self
      .orders
      .list_by_status(OrderStatus::Pending)
      .await
      .map_err(|source| {
        error!(error = %source, "Could not list pending orders; aborting run.");
        SweepError::ListPending { source }
      })?;

    report.pending_seen = pending.len();
    if pending.is_empty() {
      debug!("No pending orders.");
      return Ok(report);
    }
    info!(pending = pending.len(), "Examining pending orders.");

    let cutoff = Cutoff {
      now_ms: now.timestamp_millis(),
      threshold_ms: threshold_millis(self.config.threshold),
    };

    let outcomes: Vec<OrderOutcome> = stream::iter(pending)
      .map(|order| self.process_order(order, cutoff))
      .buffer_unordered(self.config.max_in_flight.max(1))
      .collect()
      .await;

    for outcome in outcomes {
      report.tally(outcome);
    }
    Ok(report)
  }

  async fn process_order(&self, order: PendingOrder, cutoff: Cutoff) -> OrderOutcome {
    let created_ms = match order.created_at.epoch_millis() {
      Ok(ms) => ms,
      Err(source) => {
        let err = OrderProcessingError::Timestamp {
          order_id: order.id,
          source,
        };
        warn!(error = %err, "Skipping order with unreadable creation time.");
        return OrderOutcome::InvalidTimestamp;
      }
    };

    let age_ms = cutoff.now_ms.saturating_sub(created_ms);
    if age_ms < cutoff.threshold_ms {
      debug!(order_id = %order.id, age_minutes = age_ms / MILLIS_PER_MINUTE, "Order not old enough yet.");
      return OrderOutcome::NotYetEligible;
    }

    match self
      .orders
      .transition_status(order.id, OrderStatus::Pending, OrderStatus::Confirmed)
      .await
    {
      Err(source) => {
        let err = OrderProcessingError::Mutation {
          order_id: order.id,
          source,
        };
        error!(error = %err, "Failed to confirm order; it stays pending.");
        OrderOutcome::MutationFailed
      }
      Ok(false) => {
        info!(order_id = %order.id, "Order left Pending before we got to it; not confirming.");
        OrderOutcome::AlreadyTransitioned
      }
      Ok(true) => {
        info!(order_id = %order.id, age_minutes = age_ms / MILLIS_PER_MINUTE, "Order auto-confirmed.");
        let notification = self
          .notifier
          .notify(
            OrderRef {
              order_id: order.id,
              user_id: order.user_id,
              total_amount_cents: order.total_amount_cents,
              currency: &order.currency,
            },
            OrderStatus::Confirmed.as_str(),
          )
          .await;
        OrderOutcome::Confirmed(notification)
      }
    }
  }
}

// Ages are whole milliseconds, so a fractional threshold rounds up: an order
// is never confirmed before the full threshold has elapsed.
fn threshold_millis(threshold: Duration) -> i64 {
  i64::try_from(threshold.as_nanos().div_ceil(1_000_000)).unwrap_or(i64::MAX)
}

#[derive(Debug, Clone, Copy)]
struct Cutoff {
  now_ms: i64,
  threshold_ms: i64,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn report_tallies_each_outcome_into_one_counter() {
    let mut report = SweepReport::empty(Uuid::nil(), Utc::now());
    report.tally(OrderOutcome::NotYetEligible);
    report.tally(OrderOutcome::MutationFailed);
    report.tally(OrderOutcome::Confirmed(NotificationOutcome::Sent));
    report.tally(OrderOutcome::Confirmed(NotificationOutcome::DispatchFailed));
    report.tally(OrderOutcome::Confirmed(NotificationOutcome::RecipientMissing));

    assert_eq!(report.not_yet_eligible, 1);
    assert_eq!(report.mutation_failures, 1);
    assert_eq!(report.confirmed, 3);
    assert_eq!(report.notified, 1);
    assert_eq!(report.notification_failures, 1);
    assert_eq!(report.notification_skipped, 1);
  }

  #[test]
  fn fractional_threshold_rounds_up_to_next_millisecond() {
    assert_eq!(threshold_millis(Duration::from_secs(60)), 60_000);
    assert_eq!(threshold_millis(Duration::from_micros(60_000_500)), 60_001);
    assert_eq!(threshold_millis(Duration::from_nanos(1)), 1);
    assert_eq!(threshold_millis(Duration::ZERO), 0);
    assert_eq!(threshold_millis(Duration::MAX), i64::MAX);
  }

  #[test]
  fn default_config_matches_documented_values() {
    let config = SweepConfig::default();
    assert_eq!(config.threshold, Duration::from_secs(60));
    assert_eq!(config.max_in_flight, 4);
  }
}
