// storefront/src/main.rs

// Declare modules for the application
mod config;
mod db;
mod errors;
mod services;
mod state;
mod web;

use crate::config::AppConfig;
use crate::db::orders::PgOrderStore;
use crate::db::users::PgUserStore;
use crate::services::email::LogEmailTransport;
use crate::state::AppState;
use crate::web::configure_app_routes;

use actix_web::{web as actix_data, App, HttpServer};
use std::io;
use std::sync::Arc;
use storefront_core::{AutoConfirmSweep, Dispatcher, StatusNotifier, SweepConfig, SweepScheduler, SystemClock};
use tokio::sync::oneshot;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;

fn startup_error(context: &str, err: impl std::fmt::Display) -> io::Error {
  tracing::error!(error = %err, "{}", context);
  io::Error::other(format!("{}: {}", context, err))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
  tracing_subscriber::fmt()
    .with_max_level(Level::INFO)
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env()) // Allow RUST_LOG override
    .with_span_events(FmtSpan::CLOSE) // Log when spans close, showing duration
    .init();

  tracing::info!("Starting storefront server...");

  let app_config = Arc::new(AppConfig::from_env().map_err(|e| startup_error("Failed to load configuration", e))?);

  let db_pool = db::connect(&app_config)
    .await
    .map_err(|e| startup_error("Failed to connect to the database", e))?;
  tracing::info!("Successfully connected to the database.");

  let orders = Arc::new(PgOrderStore::new(db_pool.clone()));
  let users = Arc::new(PgUserStore::new(db_pool));
  let dispatcher = Dispatcher::new(
    Arc::new(LogEmailTransport::default()),
    app_config.email_sender.clone(),
  );

  let sweep = Arc::new(AutoConfirmSweep::new(
    orders.clone(),
    users.clone(),
    dispatcher.clone(),
    SweepConfig {
      threshold: app_config.sweep.threshold,
      max_in_flight: app_config.sweep.max_in_flight,
    },
  ));

  let app_state = AppState {
    orders,
    notifier: StatusNotifier::new(users, dispatcher, Arc::new(SystemClock)),
    sweep: sweep.clone(),
    config: app_config.clone(),
  };

  let (stop_tx, stop_rx) = oneshot::channel::<()>();
  let scheduler = if app_config.sweep.enabled {
    let scheduler = SweepScheduler::new(sweep, app_config.sweep.interval, app_config.sweep.run_timeout);
    Some(scheduler.spawn(async move {
      let _ = stop_rx.await;
    }))
  } else {
    tracing::info!("Auto-confirmation scheduler disabled; sweeps run only via POST /api/v1/admin/sweeps.");
    None
  };

  let server_address = format!("{}:{}", app_config.server_host, app_config.server_port);
  tracing::info!("Attempting to bind server to {}...", server_address);

  let served = HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(configure_app_routes)
  })
  .bind(&server_address)?
  .run()
  .await;

  // The server has stopped; let an in-flight sweep finish, then stop ticking.
  let _ = stop_tx.send(());
  if let Some(handle) = scheduler {
    if let Err(e) = handle.await {
      tracing::error!(error = %e, "Auto-confirmation scheduler task failed.");
    }
  }

  tracing::info!("Storefront server stopped.");
  served
}
