use actix_web::{HttpResponse, Responder};
use serde_json::json;

use crate::utils::time::TIMEZONE_NAME;

#[utoipa::path(
    get,
    path = "/healthz",
    responses(
        (status = 200, description = "Service is up", body = Object, example = json!({
            "status": "OK",
            "timezone": "Asia/Bangkok"
        }))
    ),
    tag = "Health"
)]
pub async fn healthz() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "OK",
        "timezone": TIMEZONE_NAME
    }))
}
