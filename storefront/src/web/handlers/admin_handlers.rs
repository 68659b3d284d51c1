// storefront/src/web/handlers/admin_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use storefront_core::{LoggingReporter, OrderRef, OrderStatus};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::extractors::AdminAccess;
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Deserialize, Debug)]
pub struct ListOrdersQuery {
  pub status: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct UpdateStatusPayload {
  pub status: String,
}

fn parse_status(raw: &str) -> Result<OrderStatus, AppError> {
  raw.parse::<OrderStatus>().map_err(|e| {
    let allowed: Vec<&str> = OrderStatus::ALL.iter().map(|s| s.as_str()).collect();
    AppError::Validation(format!("{}. Expected one of: {}.", e, allowed.join(", ")))
  })
}

#[instrument(name = "handler::admin::list_orders", skip(app_state, query, _admin))]
pub async fn list_orders_handler(
  app_state: web::Data<AppState>,
  query: web::Query<ListOrdersQuery>,
  _admin: AdminAccess,
) -> Result<HttpResponse, AppError> {
  let status = match query.status.as_deref() {
    Some(raw) => parse_status(raw)?,
    None => OrderStatus::Pending,
  };
  let orders = app_state.orders.list_by_status(status).await?;

  Ok(HttpResponse::Ok().json(json!({
      "status": status,
      "count": orders.len(),
      "orders": orders
  })))
}

#[instrument(
    name = "handler::admin::update_order_status",
    skip(app_state, path, payload, _admin),
    fields(order_id = %path.as_ref())
)]
pub async fn update_order_status_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  payload: web::Json<UpdateStatusPayload>,
  _admin: AdminAccess,
) -> Result<HttpResponse, AppError> {
  let order_id = path.into_inner();
  let status = parse_status(&payload.status)?;

  let order = app_state
    .orders
    .set_status(order_id, status)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Order with ID {} not found.", order_id)))?;
  info!(status = %status, "Order status updated by admin.");

  // The update stands whatever happens to the email.
  let outcome = app_state
    .notifier
    .notify(
      OrderRef {
        order_id: order.id,
        user_id: order.user_id,
        total_amount_cents: order.total_amount_cents,
        currency: &order.currency,
      },
      status.as_str(),
    )
    .await;

  Ok(HttpResponse::Ok().json(json!({
      "message": "Order status updated.",
      "order": order,
      "notification": outcome.as_str()
  })))
}

#[instrument(name = "handler::admin::run_sweep", skip(app_state, _admin))]
pub async fn run_sweep_handler(app_state: web::Data<AppState>, _admin: AdminAccess) -> Result<HttpResponse, AppError> {
  let report = app_state.sweep.invoke(LoggingReporter).await.map_err(|e| {
    warn!(error = %e, "On-demand auto-confirmation run did not complete.");
    AppError::from(e)
  })?;

  Ok(HttpResponse::Ok().json(json!({
      "message": "Auto-confirmation run finished.",
      "report": report
  })))
}
