// storefront/src/web/handlers/order_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use storefront_core::NewOrder;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::extractors::AuthenticatedUser;
use crate::errors::AppError;
use crate::state::AppState;

// --- Request DTO ---
#[derive(Deserialize, Debug)]
pub struct CreateOrderPayload {
  pub total_amount_cents: i64,
  pub currency: String,
  pub shipping_address: Option<String>,
  pub payment_method: Option<String>,
  #[serde(default)]
  pub items: serde_json::Value,
}

impl CreateOrderPayload {
  fn into_new_order(self, user_id: Uuid) -> Result<NewOrder, AppError> {
    if self.total_amount_cents < 0 {
      return Err(AppError::Validation("total_amount_cents must not be negative.".to_string()));
    }
    let currency = self.currency.trim().to_ascii_uppercase();
    if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
      return Err(AppError::Validation(format!(
        "currency must be a three-letter code, got '{}'.",
        self.currency
      )));
    }
    let items = match self.items {
      serde_json::Value::Null => serde_json::Value::Array(Vec::new()),
      other => other,
    };
    Ok(NewOrder {
      user_id,
      total_amount_cents: self.total_amount_cents,
      currency,
      shipping_address: self.shipping_address,
      payment_method: self.payment_method,
      items,
    })
  }
}

#[instrument(
    name = "handler::create_order",
    skip(app_state, req_payload, auth_user),
    fields(user_id = %auth_user.user_id)
)]
pub async fn create_order_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<CreateOrderPayload>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let new_order = req_payload.into_inner().into_new_order(auth_user.user_id)?;
  let order = app_state.orders.create(new_order).await?;

  info!(order_id = %order.id, "Order placed; awaiting auto-confirmation.");
  Ok(HttpResponse::Created().json(json!({
      "message": "Order placed successfully.",
      "order": order
  })))
}

#[instrument(
    name = "handler::get_order",
    skip(app_state, path, auth_user),
    fields(user_id = %auth_user.user_id, order_id = %path.as_ref())
)]
pub async fn get_order_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let order_id = path.into_inner();

  match app_state.orders.get(order_id).await? {
    Some(order) if order.user_id == auth_user.user_id => Ok(HttpResponse::Ok().json(json!({
        "message": "Order fetched successfully.",
        "order": order
    }))),
    // Someone else's order looks exactly like a missing one.
    _ => {
      warn!("Order {} not found for user {}.", order_id, auth_user.user_id);
      Err(AppError::NotFound(format!("Order with ID {} not found.", order_id)))
    }
  }
}
