// storefront/src/web/handlers/mod.rs

// Declare handler modules
pub mod admin_handlers;
pub mod extractors;
pub mod order_handlers;

#[cfg(test)]
pub(crate) mod test_support {
  use std::sync::Arc;
  use std::time::Duration;
  use storefront_core::memory::{InMemoryOrderStore, InMemoryUserStore, RecordingTransport};
  use storefront_core::{AutoConfirmSweep, Dispatcher, StatusNotifier, SweepConfig, SystemClock};

  use crate::config::AppConfig;
  use crate::state::AppState;

  pub const ADMIN_TOKEN: &str = "test-admin-token";

  pub struct TestBackend {
    pub orders: Arc<InMemoryOrderStore>,
    pub users: Arc<InMemoryUserStore>,
    pub transport: Arc<RecordingTransport>,
  }

  /// App state over in-memory stores with a one-minute threshold.
  pub fn test_state() -> (AppState, TestBackend) {
    let config = AppConfig::from_lookup(|name| match name {
      "DATABASE_URL" => Some("postgres://unused".to_string()),
      "ADMIN_API_TOKEN" => Some(ADMIN_TOKEN.to_string()),
      _ => None,
    })
    .expect("test config");

    let orders = Arc::new(InMemoryOrderStore::new());
    let users = Arc::new(InMemoryUserStore::new());
    let transport = Arc::new(RecordingTransport::default());
    let dispatcher = Dispatcher::new(transport.clone(), config.email_sender.clone());
    let sweep = AutoConfirmSweep::new(
      orders.clone(),
      users.clone(),
      dispatcher.clone(),
      SweepConfig {
        threshold: Duration::from_secs(60),
        max_in_flight: 2,
      },
    );

    let state = AppState {
      orders: orders.clone(),
      notifier: StatusNotifier::new(users.clone(), dispatcher, Arc::new(SystemClock)),
      sweep: Arc::new(sweep),
      config: Arc::new(config),
    };
    (
      state,
      TestBackend {
        orders,
        users,
        transport,
      },
    )
  }
}
