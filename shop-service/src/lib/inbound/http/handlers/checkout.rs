use axum::Json;
use serde_json::json;
use serde_json::Value;

// Placeholder until orders exist.
pub async fn checkout() -> Json<Value> {
    Json(json!({ "message": "Coming soon" }))
}
