// tests/scheduler_tests.rs
mod common;

use chrono::Duration as ChronoDuration;
use common::*;
use serial_test::serial;
use std::time::Duration;
use storefront_core::{OrderStatus, SweepError, SweepScheduler};
use tokio::sync::oneshot;

#[tokio::test(start_paused = true)]
#[serial]
async fn test_tick_once_reports_timeout_and_keeps_finished_work() {
  setup_tracing();
  let h = Harness::one_minute();
  let user = h.customer("Pia", "pia@example.com");
  let done_in_time = h.pending_order(user, 100, ChronoDuration::minutes(5));
  let cut_off = h.pending_order(user, 100, ChronoDuration::minutes(5));
  h.orders.set_latency(Some(Duration::from_millis(50)));
  let scheduler = SweepScheduler::new(h.sweep.clone(), Duration::from_secs(60), Duration::from_millis(75));
  let reporter = RecordingReporter::default();

  let result = scheduler.tick_once(reporter.clone()).await;

  assert!(matches!(result, Err(SweepError::TimedOut { .. })));
  assert_eq!(h.orders.status_of(done_in_time), Some(OrderStatus::Confirmed));
  assert_eq!(h.orders.status_of(cut_off), Some(OrderStatus::Pending));
  assert!(matches!(reporter.calls().as_slice(), [Reported::Failure(msg)] if msg.contains("time limit")));

  // The interrupted order is picked up by the next run.
  h.orders.set_latency(None);
  let next = scheduler.tick_once(RecordingReporter::default()).await.unwrap();
  assert_eq!(next.confirmed, 1);
  assert_eq!(h.orders.status_of(cut_off), Some(OrderStatus::Confirmed));
}

#[tokio::test(start_paused = true)]
#[serial]
async fn test_tick_once_reports_success_within_limit() {
  setup_tracing();
  let h = Harness::one_minute();
  let user = h.customer("Quinn", "quinn@example.com");
  h.pending_order(user, 100, ChronoDuration::minutes(5));
  let scheduler = SweepScheduler::new(h.sweep.clone(), Duration::from_secs(60), Duration::from_secs(5));
  let reporter = RecordingReporter::default();

  let report = scheduler.tick_once(reporter.clone()).await.unwrap();

  assert_eq!(report.confirmed, 1);
  assert_eq!(
    reporter.calls(),
    vec![Reported::Success {
      confirmed: 1,
      pending_seen: 1
    }]
  );
}

#[tokio::test(start_paused = true)]
#[serial]
async fn test_scheduler_runs_on_interval_until_shutdown() {
  setup_tracing();
  let h = Harness::one_minute();
  let scheduler = SweepScheduler::new(h.sweep.clone(), Duration::from_secs(30), Duration::from_secs(5));
  let (stop_tx, stop_rx) = oneshot::channel::<()>();

  let handle = scheduler.spawn(async move {
    let _ = stop_rx.await;
  });

  // First tick fires immediately, then one every 30s.
  tokio::time::sleep(Duration::from_secs(1)).await;
  assert_eq!(h.orders.list_calls(), 1);
  tokio::time::sleep(Duration::from_secs(60)).await;
  assert_eq!(h.orders.list_calls(), 3);

  stop_tx.send(()).unwrap();
  tokio::time::timeout(Duration::from_secs(1), handle)
    .await
    .expect("scheduler should stop promptly")
    .expect("scheduler task should not panic");

  tokio::time::sleep(Duration::from_secs(120)).await;
  assert_eq!(h.orders.list_calls(), 3);
}

#[tokio::test(start_paused = true)]
#[serial]
async fn test_scheduler_keeps_ticking_after_listing_failures() {
  setup_tracing();
  let h = Harness::one_minute();
  let user = h.customer("Rhea", "rhea@example.com");
  let id = h.pending_order(user, 100, ChronoDuration::minutes(5));
  h.orders.fail_listing(true);
  let scheduler = SweepScheduler::new(h.sweep.clone(), Duration::from_secs(10), Duration::from_secs(5));
  let (stop_tx, stop_rx) = oneshot::channel::<()>();
  let handle = scheduler.spawn(async move {
    let _ = stop_rx.await;
  });

  tokio::time::sleep(Duration::from_secs(1)).await;
  assert_eq!(h.orders.status_of(id), Some(OrderStatus::Pending));

  h.orders.fail_listing(false);
  tokio::time::sleep(Duration::from_secs(10)).await;
  assert_eq!(h.orders.status_of(id), Some(OrderStatus::Confirmed));

  stop_tx.send(()).unwrap();
  handle.await.unwrap();
}
