use actix_web::{get, HttpResponse, Responder};
use chrono::Utc;
use serde_json::json;

/// Liveness probe. Uses the same `{success, message}` envelope as the rest
/// of the API, plus a timestamp so monitors can spot a wedged clock.
#[get("/health")]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "success": true,
        "status": "OK",
        "message": "Server is running",
        "timestamp": Utc::now(),
    }))
}
