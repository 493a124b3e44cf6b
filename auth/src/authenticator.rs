use std::sync::OnceLock;

use crate::jwt::Claims;
use crate::jwt::JwtError;
use crate::jwt::JwtHandler;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Longest accepted token lifetime (one year).
pub const MAX_TOKEN_LIFETIME_HOURS: i64 = 24 * 365;

const DUMMY_PASSWORD: &str = "no-such-account-placeholder";

/// Authentication coordinator combining password hashing and session tokens.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    jwt_handler: JwtHandler,
    token_lifetime_hours: i64,
    dummy_hash: OnceLock<String>,
}

/// Result of successful authentication.
#[derive(Debug)]
pub struct AuthenticationResult {
    /// Signed session token
    pub access_token: String,
}

/// Authentication operation errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("JWT error: {0}")]
    JwtError(#[from] JwtError),
}

impl Authenticator {
    /// Create a new authenticator.
    ///
    /// # Arguments
    /// * `jwt_secret` - Secret key for token signing
    /// * `token_lifetime_hours` - Lifetime of issued tokens
    ///
    /// # Errors
    /// * `MissingSecret` - Secret is empty
    /// * `InvalidLifetime` - Lifetime is not within 1..=MAX_TOKEN_LIFETIME_HOURS
    pub fn new(jwt_secret: &[u8], token_lifetime_hours: i64) -> Result<Self, JwtError> {
        if !(1..=MAX_TOKEN_LIFETIME_HOURS).contains(&token_lifetime_hours) {
            return Err(JwtError::InvalidLifetime(token_lifetime_hours));
        }

        Ok(Self {
            password_hasher: PasswordHasher::new(),
            jwt_handler: JwtHandler::new(jwt_secret)?,
            token_lifetime_hours,
            dummy_hash: OnceLock::new(),
        })
    }

    /// Hash a password for storage.
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Verify credentials and issue a token for `subject`.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match
    /// * `PasswordError` - Stored hash is unusable
    /// * `JwtError` - Token generation failed
    pub fn authenticate(
        &self,
        password: &str,
        stored_hash: &str,
        subject: &str,
    ) -> Result<AuthenticationResult, AuthenticationError> {
        if !self.password_hasher.verify(password, stored_hash)? {
            return Err(AuthenticationError::InvalidCredentials);
        }

        let access_token = self.issue_token(subject)?;

        Ok(AuthenticationResult { access_token })
    }

    /// Spend one full verification on a password that has no account.
    ///
    /// Callers run this when the username is unknown so the response takes
    /// as long as a wrong-password check. The result is always a mismatch.
    pub fn verify_dummy(&self, password: &str) {
        let hash = self.dummy_hash.get_or_init(|| {
            self.password_hasher
                .hash(DUMMY_PASSWORD)
                .unwrap_or_default()
        });
        let _ = self.password_hasher.verify(password, hash);
    }

    /// Issue a token for `subject` without password verification.
    ///
    /// Used right after registration, when the caller has just proven
    /// knowledge of the password by choosing it.
    pub fn issue_token(&self, subject: &str) -> Result<String, JwtError> {
        let claims = Claims::for_subject(subject, self.token_lifetime_hours);
        self.jwt_handler.encode(&claims)
    }

    /// Validate a token and return its claims.
    ///
    /// # Errors
    /// * `TokenExpired` - Token is past its expiry
    /// * `InvalidToken` - Token is malformed or its signature does not verify
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        self.jwt_handler.decode(token)
    }
}
