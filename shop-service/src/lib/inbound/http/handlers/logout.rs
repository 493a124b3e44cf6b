use axum::http::StatusCode;

use super::ApiSuccess;

/// Tokens are stateless; the client discards its copy.
pub async fn logout() -> ApiSuccess<()> {
    ApiSuccess::message_only(StatusCode::OK, "Logout successful")
}
