use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde::Serialize;

use crate::catalog::errors::CatalogError;
use crate::domain::user::models::AuthSession;
use crate::domain::user::models::User;
use crate::user::errors::UserError;

pub mod checkout;
pub mod get_profile;
pub mod health;
pub mod list_categories;
pub mod list_products;
pub mod login;
pub mod logout;
pub mod register;

/// Enveloped success response: `{ "message": ..., "data": ... }`.
#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize + PartialEq>(StatusCode, Json<ApiResponseBody<T>>);

impl<T> PartialEq for ApiSuccess<T>
where
    T: Serialize + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1 .0 == other.1 .0
    }
}

impl<T: Serialize + PartialEq> ApiSuccess<T> {
    pub fn new(status: StatusCode, message: &str, data: T) -> Self {
        ApiSuccess(status, Json(ApiResponseBody::new(message, Some(data))))
    }

    pub fn message_only(status: StatusCode, message: &str) -> Self {
        ApiSuccess(status, Json(ApiResponseBody::new(message, None)))
    }
}

impl<T: Serialize + PartialEq> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponseBody<T: Serialize + PartialEq> {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
}

impl<T: Serialize + PartialEq> ApiResponseBody<T> {
    pub fn new(message: &str, data: Option<T>) -> Self {
        Self {
            message: message.to_string(),
            data,
        }
    }
}

/// Machine-readable error code sent alongside every error message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationError,
    EmailExists,
    UsernameExists,
    InvalidCredentials,
    InvalidUserId,
    UserNotFound,
    MissingToken,
    InvalidToken,
    TokenExpired,
    UpstreamError,
    InternalError,
}

/// Boundary error. Messages carried here are safe to show to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    BadRequest {
        code: ErrorCode,
        message: String,
        details: Option<String>,
    },
    Unauthorized(ErrorCode, String),
    NotFound(ErrorCode, String),
    Conflict(ErrorCode, String),
    BadGateway(String),
    InternalServerError(String),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::BadRequest {
            code: ErrorCode::ValidationError,
            message: message.into(),
            details: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::BadRequest {
                code,
                message,
                details,
            } => (
                StatusCode::BAD_REQUEST,
                ApiErrorData::new(message, code).with_details(details),
            ),
            ApiError::Unauthorized(code, message) => {
                (StatusCode::UNAUTHORIZED, ApiErrorData::new(message, code))
            }
            ApiError::NotFound(code, message) => {
                (StatusCode::NOT_FOUND, ApiErrorData::new(message, code))
            }
            ApiError::Conflict(code, message) => {
                (StatusCode::CONFLICT, ApiErrorData::new(message, code))
            }
            ApiError::BadGateway(message) => (
                StatusCode::BAD_GATEWAY,
                ApiErrorData::new(message, ErrorCode::UpstreamError),
            ),
            ApiError::InternalServerError(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiErrorData::new(message, ErrorCode::InternalError),
            ),
        };

        (status, Json(body)).into_response()
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::Validation(e) => ApiError::validation(e.to_string()),
            UserError::InvalidUserId(_) => ApiError::BadRequest {
                code: ErrorCode::InvalidUserId,
                message: "Invalid user ID".to_string(),
                details: None,
            },
            UserError::NotFound(_) => {
                ApiError::NotFound(ErrorCode::UserNotFound, "User not found".to_string())
            }
            UserError::EmailAlreadyExists(_) => ApiError::Conflict(
                ErrorCode::EmailExists,
                "An account with this email already exists".to_string(),
            ),
            UserError::UsernameAlreadyExists(_) => ApiError::Conflict(
                ErrorCode::UsernameExists,
                "This username is already taken".to_string(),
            ),
            UserError::InvalidCredentials => ApiError::Unauthorized(
                ErrorCode::InvalidCredentials,
                "Invalid username or password".to_string(),
            ),
            UserError::Password(_)
            | UserError::Token(_)
            | UserError::DatabaseError(_)
            | UserError::Unknown(_) => {
                tracing::error!(error = %err, "Request failed with internal error");
                ApiError::InternalServerError("Internal server error".to_string())
            }
        }
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        tracing::error!(error = %err, "Product catalog request failed");
        ApiError::BadGateway("Failed to fetch from product catalog".to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest {
            code: ErrorCode::ValidationError,
            message: "Validation failed".to_string(),
            details: Some(rejection.body_text()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorData {
    pub error: String,
    pub code: ErrorCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiErrorData {
    fn new(error: String, code: ErrorCode) -> Self {
        Self {
            error,
            code,
            details: None,
        }
    }

    fn with_details(mut self, details: Option<String>) -> Self {
        self.details = details;
        self
    }
}

/// Public identity fields returned by register and login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserData {
    pub id: String,
    pub name: String,
    pub username: String,
    pub email: String,
}

impl From<&User> for UserData {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name.as_str().to_string(),
            username: user.username.as_str().to_string(),
            email: user.email.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionResponseData {
    pub token: String,
    pub user: UserData,
}

impl From<AuthSession> for SessionResponseData {
    fn from(session: AuthSession) -> Self {
        Self {
            user: (&session.user).into(),
            token: session.token,
        }
    }
}
