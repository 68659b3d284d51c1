// core/src/scheduler.rs

//! Fixed-interval driver for the auto-confirmation sweep.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, timeout, MissedTickBehavior};
use tracing::info;

use crate::error::{SweepError, SweepResult};
use crate::sweep::{report_outcome, AutoConfirmSweep, LoggingReporter, RunReporter, SweepReport};

pub struct SweepScheduler {
  sweep: Arc<AutoConfirmSweep>,
  every: Duration,
  run_timeout: Duration,
}

impl SweepScheduler {
  pub fn new(sweep: Arc<AutoConfirmSweep>, every: Duration, run_timeout: Duration) -> Self {
    Self {
      sweep,
      every,
      run_timeout,
    }
  }

  /// One bounded run. A run that overruns `run_timeout` is dropped mid-way:
  /// orders it already confirmed stay confirmed, the rest stay pending.
  pub async fn tick_once<R: RunReporter>(&self, reporter: R) -> SweepResult<SweepReport> {
    let result = match timeout(self.run_timeout, self.sweep.run()).await {
      Ok(result) => result,
      Err(_) => Err(SweepError::TimedOut {
        after: self.run_timeout,
      }),
    };
    report_outcome(reporter, &result);
    result
  }

  /// Ticks until `shutdown` resolves. The first run happens immediately.
  pub async fn run_until<F>(self, shutdown: F)
  where
    F: Future<Output = ()>,
  {
    info!(
      every_secs = self.every.as_secs(),
      run_timeout_secs = self.run_timeout.as_secs(),
      threshold_secs = self.sweep.config().threshold.as_secs(),
      "Auto-confirmation scheduler started."
    );

    let mut ticker = interval(self.every);
    // A slow run must not cause a burst of catch-up runs.
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tokio::pin!(shutdown);

    loop {
      tokio::select! {
        _ = &mut shutdown => {
          info!("Shutdown requested, stopping auto-confirmation scheduler.");
          break;
        }
        _ = ticker.tick() => {
          // Failures are reported and the next tick retries by re-scanning.
          let _ = self.tick_once(LoggingReporter).await;
        }
      }
    }

    info!("Auto-confirmation scheduler stopped.");
  }

  pub fn spawn<F>(self, shutdown: F) -> JoinHandle<()>
  where
    F: Future<Output = ()> + Send + 'static,
  {
    tokio::spawn(self.run_until(shutdown))
  }
}
