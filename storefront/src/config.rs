// storefront/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub database_url: String,
  pub db_max_connections: u32,

  pub email_sender: String,
  pub admin_api_token: String,

  pub sweep: SweepSettings,
}

#[derive(Debug, Clone)]
pub struct SweepSettings {
  pub enabled: bool,
  pub interval: Duration,
  pub threshold: Duration,
  pub max_in_flight: usize,
  pub run_timeout: Duration,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present
    Self::from_lookup(|name| env::var(name).ok())
  }

  /// Builds the config from any key lookup; `from_env` passes the process environment.
  pub fn from_lookup<F>(lookup: F) -> Result<Self>
  where
    F: Fn(&str) -> Option<String>,
  {
    let require = |name: &str| {
      lookup(name)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::Config(format!("Missing environment variable '{}'", name)))
    };
    let or_default = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

    let server_host = or_default("SERVER_HOST", "127.0.0.1");
    let server_port = parse_var::<u16>("SERVER_PORT", &or_default("SERVER_PORT", "8080"))?;
    let database_url = require("DATABASE_URL")?;
    let db_max_connections = parse_var::<u32>("DB_MAX_CONNECTIONS", &or_default("DB_MAX_CONNECTIONS", "5"))?;
    let email_sender = or_default("EMAIL_SENDER", "noreply@example.com");
    let admin_api_token = require("ADMIN_API_TOKEN")?;

    let sweep = SweepSettings {
      enabled: parse_var::<bool>("SWEEP_ENABLED", &or_default("SWEEP_ENABLED", "true"))?,
      interval: Duration::from_secs(parse_positive("SWEEP_INTERVAL_SECS", &or_default("SWEEP_INTERVAL_SECS", "60"))?),
      threshold: minutes_to_duration(
        "SWEEP_THRESHOLD_MINUTES",
        parse_var::<u64>("SWEEP_THRESHOLD_MINUTES", &or_default("SWEEP_THRESHOLD_MINUTES", "1"))?,
      )?,
      max_in_flight: parse_positive("SWEEP_MAX_IN_FLIGHT", &or_default("SWEEP_MAX_IN_FLIGHT", "4"))? as usize,
      run_timeout: Duration::from_secs(parse_positive(
        "SWEEP_RUN_TIMEOUT_SECS",
        &or_default("SWEEP_RUN_TIMEOUT_SECS", "300"),
      )?),
    };

    tracing::info!(
      server_host = %server_host,
      server_port,
      sweep_enabled = sweep.enabled,
      sweep_interval_secs = sweep.interval.as_secs(),
      sweep_threshold_secs = sweep.threshold.as_secs(),
      "Application configuration loaded successfully."
    );
    // database_url and admin_api_token are deliberately not logged.

    Ok(Self {
      server_host,
      server_port,
      database_url,
      db_max_connections,
      email_sender,
      admin_api_token,
      sweep,
    })
  }
}

fn parse_var<T>(name: &str, raw: &str) -> Result<T>
where
  T: FromStr,
  T::Err: std::fmt::Display,
{
  raw
    .trim()
    .parse::<T>()
    .map_err(|e| AppError::Config(format!("Invalid {}: {}", name, e)))
}

fn parse_positive(name: &str, raw: &str) -> Result<u64> {
  match parse_var::<u64>(name, raw)? {
    0 => Err(AppError::Config(format!("{} must be greater than zero", name))),
    v => Ok(v),
  }
}

fn minutes_to_duration(name: &str, minutes: u64) -> Result<Duration> {
  minutes
    .checked_mul(60)
    .map(Duration::from_secs)
    .ok_or_else(|| AppError::Config(format!("{} is too large: {} minutes", name, minutes)))
}
