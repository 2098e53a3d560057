use axum::Json;
use serde_json::{Value, json};

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "wms-server",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
