// storefront/src/state.rs
use crate::config::AppConfig;
use std::sync::Arc;
use storefront_core::{AutoConfirmSweep, OrderStore, StatusNotifier};

#[derive(Clone)]
pub struct AppState {
  pub orders: Arc<dyn OrderStore>,
  pub notifier: StatusNotifier,
  pub sweep: Arc<AutoConfirmSweep>,
  pub config: Arc<AppConfig>, // Share loaded config
}
