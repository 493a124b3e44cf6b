use async_trait::async_trait;

use crate::domain::user::models::AuthSession;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::LoginCommand;
use crate::domain::user::models::RegisterUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::user::errors::UserError;

/// Port for the authentication workflow.
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    /// Register a new identity and issue its first session token.
    ///
    /// # Arguments
    /// * `command` - Validated name, username, email and password
    ///
    /// # Returns
    /// Created user and a session token
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `UsernameAlreadyExists` - Username is already taken
    /// * `DatabaseError` - Directory lookup or write failed
    /// * `Password` / `Token` - Hashing or token issuance failed
    async fn register(&self, command: RegisterUserCommand) -> Result<AuthSession, UserError>;

    /// Check credentials and issue a session token.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown username, wrong password, or the lookup failed
    /// * `Token` - Token issuance failed
    async fn login(&self, command: LoginCommand) -> Result<AuthSession, UserError>;

    /// Resolve a token subject to its identity.
    ///
    /// # Arguments
    /// * `subject` - Subject claim from a verified token
    ///
    /// # Errors
    /// * `InvalidUserId` - Subject is not a well-formed identifier
    /// * `NotFound` - Identity no longer exists
    /// * `DatabaseError` - Directory lookup failed
    async fn get_profile(&self, subject: &str) -> Result<User, UserError>;
}

/// User directory: uniqueness checks and lookups over the identity store.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Whether an identity with this email exists.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn email_exists(&self, email: &EmailAddress) -> Result<bool, UserError>;

    /// Whether an identity with this username exists.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn username_exists(&self, username: &Username) -> Result<bool, UserError>;

    /// Persist new user to storage.
    ///
    /// The store's unique constraints are authoritative; a violation that
    /// slipped past the existence checks is reported as a conflict.
    ///
    /// # Errors
    /// * `UsernameAlreadyExists` - Username is already taken
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `DatabaseError` - Database operation failed
    async fn create(&self, user: User) -> Result<User, UserError>;

    /// Retrieve user by username.
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, UserError>;

    /// Retrieve user by identifier.
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;
}
