pub mod auth;
pub mod health;
pub mod tasks;

use actix_web::{web, HttpResponse, Responder};
use serde_json::json;

use crate::auth::{AuthMiddleware, RateLimit};

/// Wires the API surface: rate-limited public auth routes and
/// token-gated task routes. Mounted under `/api` by the app factory.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .wrap(RateLimit)
            .service(auth::register)
            .service(auth::login),
    )
    .service(
        web::scope("/tasks")
            .wrap(AuthMiddleware)
            .service(tasks::list_tasks)
            .service(tasks::create_task)
            .service(tasks::get_task)
            .service(tasks::update_task)
            .service(tasks::delete_task),
    );
}

/// Fallback for unmatched routes.
pub async fn not_found() -> impl Responder {
    HttpResponse::NotFound().json(json!({
        "success": false,
        "message": "Route not found",
    }))
}
