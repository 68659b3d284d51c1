// storefront/src/errors.rs

use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

use storefront_core::{StoreError, SweepError};

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Authentication Failed: {0}")]
  Auth(String),

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Store Error: {source}")]
  Store {
    #[from]
    source: StoreError,
  },

  #[error("Auto-confirmation Error: {source}")]
  Sweep {
    #[from]
    source: SweepError,
  },

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

impl ResponseError for AppError {
  fn error_response(&self) -> HttpResponse {
    // Log the full error when it's turned into a response
    tracing::error!(application_error = %self, "Responding with error");
    match self {
      AppError::Validation(m) => HttpResponse::BadRequest().json(json!({"error": m})),
      AppError::Auth(m) => HttpResponse::Unauthorized().json(json!({"error": m})),
      AppError::NotFound(m) => HttpResponse::NotFound().json(json!({"error": m})),
      AppError::Config(m) => {
        HttpResponse::InternalServerError().json(json!({"error": "Configuration issue", "detail": m}))
      }
      AppError::Store { source } if source.is_unavailable() => {
        HttpResponse::ServiceUnavailable().json(json!({"error": "Order store unavailable"}))
      }
      AppError::Store { .. } => HttpResponse::InternalServerError().json(json!({"error": "Order store operation failed"})),
      AppError::Sweep { source } => match source {
        SweepError::AlreadyRunning => {
          HttpResponse::Conflict().json(json!({"error": "An auto-confirmation run is already in progress"}))
        }
        SweepError::ListPending { .. } => {
          HttpResponse::ServiceUnavailable().json(json!({"error": "Could not list pending orders", "detail": source.to_string()}))
        }
        SweepError::TimedOut { .. } => {
          HttpResponse::GatewayTimeout().json(json!({"error": "Auto-confirmation run timed out"}))
        }
      },
      AppError::Internal(m) => {
        HttpResponse::InternalServerError().json(json!({"error": "An internal error occurred", "detail": m}))
      }
    }
  }
}

// Define a Result type alias for the application
pub type Result<T, E = AppError> = std::result::Result<T, E>;
