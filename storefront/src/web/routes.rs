// storefront/src/web/routes.rs

use actix_web::web;

use crate::web::handlers::{admin_handlers, order_handlers};

async fn health_check_handler() -> actix_web::HttpResponse {
  actix_web::HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

// Called from `main.rs` and from handler tests to mount the API.
pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg.service(
    web::scope("/api/v1")
      // Health Check Route
      .route("/health", web::get().to(health_check_handler))
      // Customer order routes; identity comes from the X-User-ID header.
      .service(
        web::scope("/orders")
          .route("", web::post().to(order_handlers::create_order_handler))
          .route("/{order_id}", web::get().to(order_handlers::get_order_handler)),
      )
      // Back-office routes, guarded by the AdminAccess extractor.
      .service(
        web::scope("/admin")
          .route("/orders", web::get().to(admin_handlers::list_orders_handler))
          .route(
            "/orders/{order_id}/status",
            web::patch().to(admin_handlers::update_order_status_handler),
          )
          .route("/sweeps", web::post().to(admin_handlers::run_sweep_handler)),
      ),
  );
}
