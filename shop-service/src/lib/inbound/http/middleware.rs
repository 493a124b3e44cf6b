use auth::JwtError;
use axum::extract::Request;
use axum::extract::State;
use axum::http::{self};
use axum::middleware::Next;
use axum::response::Response;

use super::handlers::ApiError;
use super::handlers::ErrorCode;
use crate::inbound::http::router::AppState;

/// Extension type to store the verified token subject in request extensions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub subject: String,
}

/// Middleware that validates bearer tokens and adds the subject to request extensions
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token_from_header(&req)?;

    let claims = state
        .authenticator
        .validate_token(token)
        .map_err(|e| {
            tracing::warn!(error = %e, "JWT validation failed");
            match e {
                JwtError::TokenExpired => {
                    ApiError::Unauthorized(ErrorCode::TokenExpired, "Token has expired".to_string())
                }
                _ => ApiError::Unauthorized(ErrorCode::InvalidToken, "Invalid token".to_string()),
            }
        })?;

    req.extensions_mut()
        .insert(AuthenticatedUser { subject: claims.sub });

    Ok(next.run(req).await)
}

fn extract_token_from_header(req: &Request) -> Result<&str, ApiError> {
    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .ok_or_else(|| {
            ApiError::Unauthorized(
                ErrorCode::MissingToken,
                "Authorization header required".to_string(),
            )
        })?;

    let invalid_format = || {
        ApiError::Unauthorized(
            ErrorCode::InvalidToken,
            "Invalid Authorization header format. Expected: Bearer <token>".to_string(),
        )
    };

    let auth_str = auth_header.to_str().map_err(|_| invalid_format())?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim()),
        _ => Err(invalid_format()),
    }
}
