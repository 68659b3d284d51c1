// storefront/src/web/handlers/extractors.rs

use actix_web::{web, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};
use tracing::warn;
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;

// --- Customer identity ---
// Session handling lives in front of this service; it forwards the
// authenticated customer as the X-User-ID header.
#[derive(Debug)]
pub struct AuthenticatedUser {
  pub user_id: Uuid,
}

impl FromRequest for AuthenticatedUser {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
    let user_id = req
      .headers()
      .get("X-User-ID")
      .and_then(|v| v.to_str().ok())
      .and_then(|s| Uuid::parse_str(s.trim()).ok());

    match user_id {
      Some(user_id) => ready(Ok(AuthenticatedUser { user_id })),
      None => {
        warn!("AuthenticatedUser extractor: Missing or invalid X-User-ID header.");
        ready(Err(AppError::Auth(
          "User authentication required. Missing or invalid X-User-ID header.".to_string(),
        )))
      }
    }
  }
}

// --- Back-office access ---
#[derive(Debug)]
pub struct AdminAccess;

impl FromRequest for AdminAccess {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
    let Some(state) = req.app_data::<web::Data<AppState>>() else {
      return ready(Err(AppError::Internal("Application state is not configured.".to_string())));
    };

    let presented = req.headers().get("X-Admin-Token").and_then(|v| v.to_str().ok());
    match presented {
      Some(token) if tokens_match(token.trim(), &state.config.admin_api_token) => ready(Ok(AdminAccess)),
      _ => {
        warn!("AdminAccess extractor: Missing or wrong X-Admin-Token header.");
        ready(Err(AppError::Auth("Admin token required.".to_string())))
      }
    }
  }
}

// Compares every byte so the comparison time does not depend on the prefix matched.
fn tokens_match(presented: &str, expected: &str) -> bool {
  let (a, b) = (presented.as_bytes(), expected.as_bytes());
  if a.len() != b.len() || b.is_empty() {
    return false;
  }
  a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn token_comparison() {
    assert!(tokens_match("secret", "secret"));
    assert!(!tokens_match("secreT", "secret"));
    assert!(!tokens_match("secret-longer", "secret"));
    assert!(!tokens_match("", ""));
  }
}
