use std::sync::Arc;
use std::time::Duration;

use auth::Authenticator;
use axum::body::Body;
use axum::http::header;
use axum::http::HeaderValue;
use axum::http::Method;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower_http::cors::AllowOrigin;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::client_ip::resolve_client_ip;
use super::client_ip::ClientIp;
use super::client_ip::TrustedProxies;
use super::handlers::checkout::checkout;
use super::handlers::get_profile::get_profile;
use super::handlers::health::health;
use super::handlers::list_categories::list_categories;
use super::handlers::list_products::list_products;
use super::handlers::login::login;
use super::handlers::logout::logout;
use super::handlers::register::register;
use super::middleware::authenticate as auth_middleware;
use crate::domain::catalog::ports::CatalogServicePort;
use crate::domain::user::ports::AuthServicePort;

#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthServicePort>,
    pub catalog_service: Arc<dyn CatalogServicePort>,
    pub authenticator: Arc<Authenticator>,
    pub trusted_proxies: Arc<TrustedProxies>,
}

pub fn create_router(state: AppState, allowed_origins: &[String]) -> Router {
    let public_routes = Router::new()
        .route("/api/register", post(register))
        .route("/api/login", post(login))
        .route("/api/logout", post(logout))
        .route("/api/products", get(list_products))
        .route("/api/categories", get(list_categories))
        .route("/health", get(health));

    let protected_routes = Router::new()
        .route("/api/profile", get(get_profile))
        .route("/api/checkout", post(checkout))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Headers are left out of the span so bearer tokens never reach the logs.
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            let client_ip = request
                .extensions()
                .get::<ClientIp>()
                .map(ToString::to_string)
                .unwrap_or_else(|| "unknown".to_string());
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
                client_ip = %client_ip,
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(trace_layer)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            resolve_client_ip,
        ))
        .layer(cors_layer(allowed_origins))
        .with_state(state)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::HEAD,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::ORIGIN,
            header::CONTENT_LENGTH,
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
        ])
        .allow_credentials(true)
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use axum::body::to_bytes;
    use axum::http::StatusCode;
    use chrono::Utc;
    use mockall::mock;
    use serde_json::json;
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::domain::catalog::errors::CatalogError;
    use crate::domain::catalog::models::CatalogRoute;
    use crate::domain::catalog::models::ListingQuery;
    use crate::domain::catalog::models::ProductPage;
    use crate::domain::user::errors::UserError;
    use crate::domain::user::models::AuthSession;
    use crate::domain::user::models::DisplayName;
    use crate::domain::user::models::EmailAddress;
    use crate::domain::user::models::LoginCommand;
    use crate::domain::user::models::RegisterUserCommand;
    use crate::domain::user::models::User;
    use crate::domain::user::models::UserId;
    use crate::domain::user::models::Username;

    const SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";

    mock! {
        pub TestAuthService {}

        #[async_trait]
        impl AuthServicePort for TestAuthService {
            async fn register(&self, command: RegisterUserCommand) -> Result<AuthSession, UserError>;
            async fn login(&self, command: LoginCommand) -> Result<AuthSession, UserError>;
            async fn get_profile(&self, subject: &str) -> Result<User, UserError>;
        }
    }

    mock! {
        pub TestCatalogService {}

        #[async_trait]
        impl CatalogServicePort for TestCatalogService {
            async fn list_products(&self, query: ListingQuery) -> Result<ProductPage, CatalogError>;
            async fn list_categories(&self) -> Result<Vec<String>, CatalogError>;
        }
    }

    fn router(
        auth_service: MockTestAuthService,
        catalog_service: MockTestCatalogService,
    ) -> Router {
        let state = AppState {
            auth_service: Arc::new(auth_service),
            catalog_service: Arc::new(catalog_service),
            authenticator: Arc::new(Authenticator::new(SECRET, 24).unwrap()),
            trusted_proxies: Arc::new(TrustedProxies::default()),
        };
        create_router(state, &["http://localhost:5173".to_string()])
    }

    fn user() -> User {
        let now = Utc::now();
        User {
            id: UserId::new(),
            name: DisplayName::new("Alice").unwrap(),
            username: Username::new("alice").unwrap(),
            email: EmailAddress::new("alice@x.com").unwrap(),
            password_hash: "$argon2id$unused".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    fn token_for(subject: &str) -> String {
        Authenticator::new(SECRET, 24).unwrap().issue_token(subject).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method(Method::GET).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    #[tokio::test]
    async fn test_health() {
        let app = router(MockTestAuthService::new(), MockTestCatalogService::new());

        let (status, body) = send(app, get_request("/health", None)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "ok", "mode": "full" }));
    }

    #[tokio::test]
    async fn test_register_returns_created_envelope() {
        let mut auth_service = MockTestAuthService::new();
        auth_service
            .expect_register()
            .withf(|command| {
                command.name.as_str() == "Alice"
                    && command.username.as_str() == "alice"
                    && command.email.as_str() == "alice@x.com"
            })
            .times(1)
            .returning(|_| {
                Ok(AuthSession {
                    user: user(),
                    token: "signed.jwt.token".to_string(),
                })
            });
        let app = router(auth_service, MockTestCatalogService::new());

        let (status, body) = send(
            app,
            post_json(
                "/api/register",
                json!({
                    "name": " Alice ",
                    "username": "alice",
                    "email": "alice@x.com",
                    "password": "secret1"
                }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "Account created successfully");
        assert_eq!(body["data"]["token"], "signed.jwt.token");
        assert_eq!(body["data"]["user"]["username"], "alice");
        assert_eq!(body["data"]["user"]["name"], "Alice");
        assert!(body["data"]["user"]["id"].is_string());
        assert!(body["data"]["user"].get("password_hash").is_none());
    }

    #[tokio::test]
    async fn test_register_validation_failure_skips_service() {
        let app = router(MockTestAuthService::new(), MockTestCatalogService::new());

        let (status, body) = send(
            app,
            post_json(
                "/api/register",
                json!({
                    "name": "A",
                    "username": "alice",
                    "email": "alice@x.com",
                    "password": "secret1"
                }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"], "name must be at least 2 characters long");
    }

    #[tokio::test]
    async fn test_malformed_json_is_validation_error_with_details() {
        let app = router(MockTestAuthService::new(), MockTestCatalogService::new());
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"username\": "))
            .unwrap();

        let (status, body) = send(app, request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert!(body["details"].is_string());
    }

    #[tokio::test]
    async fn test_login_invalid_credentials() {
        let mut auth_service = MockTestAuthService::new();
        auth_service
            .expect_login()
            .times(1)
            .returning(|_| Err(UserError::InvalidCredentials));
        let app = router(auth_service, MockTestCatalogService::new());

        let (status, body) = send(
            app,
            post_json(
                "/api/login",
                json!({ "username": "alice", "password": "wrongpass" }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "INVALID_CREDENTIALS");
        assert_eq!(body["error"], "Invalid username or password");
    }

    #[tokio::test]
    async fn test_logout_has_no_data() {
        let app = router(MockTestAuthService::new(), MockTestCatalogService::new());

        let (status, body) = send(app, post_json("/api/logout", json!({}))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "message": "Logout successful" }));
    }

    #[tokio::test]
    async fn test_profile_requires_token() {
        let app = router(MockTestAuthService::new(), MockTestCatalogService::new());

        let (status, body) = send(app, get_request("/api/profile", None)).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "MISSING_TOKEN");
    }

    #[tokio::test]
    async fn test_profile_rejects_non_bearer_scheme() {
        let app = router(MockTestAuthService::new(), MockTestCatalogService::new());
        let request = Request::builder()
            .uri("/api/profile")
            .header(header::AUTHORIZATION, "Basic YWxpY2U6c2VjcmV0")
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(app, request).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "INVALID_TOKEN");
    }

    #[tokio::test]
    async fn test_profile_rejects_expired_token() {
        let app = router(MockTestAuthService::new(), MockTestCatalogService::new());
        let past = Utc::now().timestamp() - 60;
        let claims = auth::Claims::for_subject("someone", 24)
            .with_issued_at(past - 3600)
            .with_expiration(past);
        let token = auth::JwtHandler::new(SECRET).unwrap().encode(&claims).unwrap();

        let (status, body) = send(app, get_request("/api/profile", Some(&token))).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "TOKEN_EXPIRED");
    }

    #[tokio::test]
    async fn test_profile_rejects_foreign_signature() {
        let app = router(MockTestAuthService::new(), MockTestCatalogService::new());
        let token = Authenticator::new(b"some-other-secret-of-adequate-length", 24)
            .unwrap()
            .issue_token("someone")
            .unwrap();

        let (status, body) = send(app, get_request("/api/profile", Some(&token))).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "INVALID_TOKEN");
    }

    #[tokio::test]
    async fn test_profile_resolves_token_subject() {
        let stored = user();
        let subject = stored.id.to_string();
        let expected_subject = subject.clone();
        let mut auth_service = MockTestAuthService::new();
        auth_service
            .expect_get_profile()
            .withf(move |s| *s == expected_subject)
            .times(1)
            .returning(move |_| Ok(stored.clone()));
        let app = router(auth_service, MockTestCatalogService::new());

        let token = token_for(&subject);

        let (status, body) = send(app, get_request("/api/profile", Some(&token))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Profile retrieved successfully");
        assert_eq!(body["data"]["user"]["id"], subject);
        assert_eq!(body["data"]["user"]["email"], "alice@x.com");
        assert!(body["data"]["user"]["created_at"].is_string());
    }

    #[tokio::test]
    async fn test_profile_for_deleted_user_is_not_found() {
        let mut auth_service = MockTestAuthService::new();
        auth_service
            .expect_get_profile()
            .returning(|s| Err(UserError::NotFound(s.to_string())));
        let app = router(auth_service, MockTestCatalogService::new());
        let token = token_for(&UserId::new().to_string());

        let (status, body) = send(app, get_request("/api/profile", Some(&token))).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "USER_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_products_query_is_normalised() {
        let mut catalog_service = MockTestCatalogService::new();
        catalog_service
            .expect_list_products()
            .withf(|query| {
                query.limit == 12
                    && query.skip == 0
                    && query.route() == CatalogRoute::Search("phone".to_string())
            })
            .times(1)
            .returning(|query| {
                Ok(ProductPage {
                    products: vec![],
                    total: 0,
                    skip: query.skip,
                    limit: u64::from(query.limit),
                })
            });
        let app = router(MockTestAuthService::new(), catalog_service);

        let (status, body) = send(
            app,
            get_request(
                "/api/products?limit=500&skip=-5&search=phone&category=laptops&priceMin=abc",
                None,
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "products": [], "total": 0, "skip": 0, "limit": 12 }));
    }

    #[tokio::test]
    async fn test_categories_upstream_failure_is_bad_gateway() {
        let mut catalog_service = MockTestCatalogService::new();
        catalog_service
            .expect_list_categories()
            .times(1)
            .returning(|| Err(CatalogError::Status(503)));
        let app = router(MockTestAuthService::new(), catalog_service);

        let (status, body) = send(app, get_request("/api/categories", None)).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["code"], "UPSTREAM_ERROR");
    }

    #[tokio::test]
    async fn test_categories_are_wrapped() {
        let mut catalog_service = MockTestCatalogService::new();
        catalog_service
            .expect_list_categories()
            .returning(|| Ok(vec!["beauty".to_string(), "laptops".to_string()]));
        let app = router(MockTestAuthService::new(), catalog_service);

        let (status, body) = send(app, get_request("/api/categories", None)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "categories": ["beauty", "laptops"] }));
    }

    #[tokio::test]
    async fn test_checkout_is_protected_placeholder() {
        let app = router(MockTestAuthService::new(), MockTestCatalogService::new());
        let (status, _) = send(app, post_json("/api/checkout", json!({}))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let app = router(MockTestAuthService::new(), MockTestCatalogService::new());
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/checkout")
            .header(header::AUTHORIZATION, format!("Bearer {}", token_for("someone")))
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(app, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "message": "Coming soon" }));
    }

    #[tokio::test]
    async fn test_cors_preflight_allows_configured_origin() {
        let app = router(MockTestAuthService::new(), MockTestCatalogService::new());
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/login")
            .header(header::ORIGIN, "http://localhost:5173")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN),
            Some(&HeaderValue::from_static("http://localhost:5173"))
        );
        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS),
            Some(&HeaderValue::from_static("true"))
        );
    }
}
