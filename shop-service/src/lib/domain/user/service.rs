use std::sync::Arc;

use async_trait::async_trait;
use auth::AuthenticationError;
use auth::Authenticator;
use chrono::Utc;

use crate::domain::user::models::AuthSession;
use crate::domain::user::models::LoginCommand;
use crate::domain::user::models::RegisterUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::UserError;
use crate::user::ports::AuthServicePort;
use crate::user::ports::UserRepository;

/// Authentication workflow: validator output -> directory -> hasher -> issuer.
///
/// Register performs exactly one directory write; login and profile only read.
pub struct AuthService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    authenticator: Arc<Authenticator>,
}

impl<UR> AuthService<UR>
where
    UR: UserRepository,
{
    /// Create a new auth service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - User directory implementation
    /// * `authenticator` - Password hasher and token issuer
    pub fn new(repository: Arc<UR>, authenticator: Arc<Authenticator>) -> Self {
        Self {
            repository,
            authenticator,
        }
    }

    async fn hash_password(&self, password: String) -> Result<String, UserError> {
        let authenticator = Arc::clone(&self.authenticator);

        let hash = tokio::task::spawn_blocking(move || authenticator.hash_password(&password))
            .await
            .map_err(|e| {
                UserError::Unknown(format!("Password hashing task failed: {}", e))
            })??;

        Ok(hash)
    }

    /// Spend the same verification work as a wrong password, then fail.
    async fn reject_unknown_user(&self, command: LoginCommand) -> Result<AuthSession, UserError> {
        let authenticator = Arc::clone(&self.authenticator);
        let password = command.password.expose().to_string();

        tokio::task::spawn_blocking(move || authenticator.verify_dummy(&password))
            .await
            .map_err(|e| {
                UserError::Unknown(format!("Password verification task failed: {}", e))
            })?;

        Err(UserError::InvalidCredentials)
    }
}

#[async_trait]
impl<UR> AuthServicePort for AuthService<UR>
where
    UR: UserRepository,
{
    async fn register(&self, command: RegisterUserCommand) -> Result<AuthSession, UserError> {
        // Early exits only; the unique constraints in the store decide races.
        if self.repository.email_exists(&command.email).await? {
            return Err(UserError::EmailAlreadyExists(command.email.to_string()));
        }

        if self.repository.username_exists(&command.username).await? {
            return Err(UserError::UsernameAlreadyExists(
                command.username.to_string(),
            ));
        }

        let password_hash = self
            .hash_password(command.password.expose().to_string())
            .await?;

        let now = Utc::now();
        let user = User {
            id: UserId::new(),
            name: command.name,
            username: command.username,
            email: command.email,
            password_hash,
            created_at: now,
            updated_at: now,
        };

        let created_user = self.repository.create(user).await?;
        tracing::info!(user_id = %created_user.id, "User registered");

        let token = self
            .authenticator
            .issue_token(&created_user.id.to_string())?;

        Ok(AuthSession {
            user: created_user,
            token,
        })
    }

    async fn login(&self, command: LoginCommand) -> Result<AuthSession, UserError> {
        // Every failure before the token is issued collapses into
        // InvalidCredentials so callers cannot probe for usernames.
        let user = match self.repository.find_by_username(&command.username).await {
            Ok(Some(user)) => user,
            Ok(None) => return self.reject_unknown_user(command).await,
            Err(e) => {
                tracing::warn!(error = %e, "User lookup failed during login");
                return self.reject_unknown_user(command).await;
            }
        };

        let authenticator = Arc::clone(&self.authenticator);
        let password = command.password.expose().to_string();
        let stored_hash = user.password_hash.clone();
        let subject = user.id.to_string();

        let result = tokio::task::spawn_blocking(move || {
            authenticator.authenticate(&password, &stored_hash, &subject)
        })
        .await
        .map_err(|e| UserError::Unknown(format!("Password verification task failed: {}", e)))?;

        match result {
            Ok(result) => Ok(AuthSession {
                user,
                token: result.access_token,
            }),
            Err(AuthenticationError::InvalidCredentials) => Err(UserError::InvalidCredentials),
            Err(AuthenticationError::PasswordError(e)) => {
                tracing::error!(user_id = %user.id, error = %e, "Stored password hash is unusable");
                Err(UserError::InvalidCredentials)
            }
            Err(AuthenticationError::JwtError(e)) => Err(UserError::Token(e)),
        }
    }

    async fn get_profile(&self, subject: &str) -> Result<User, UserError> {
        let id = UserId::from_string(subject)?;

        self.repository
            .find_by_id(&id)
            .await?
            .ok_or(UserError::NotFound(id.to_string()))
    }
}
