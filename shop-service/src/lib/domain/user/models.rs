use std::fmt;
use std::sync::OnceLock;

use chrono::DateTime;
use chrono::Utc;
use regex::Regex;
use uuid::Uuid;

use crate::user::errors::UserIdError;
use crate::user::errors::ValidationError;

/// Registered identity.
///
/// The password hash never leaves the service: response types copy the
/// public fields only.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub name: DisplayName,
    pub username: Username,
    pub email: EmailAddress,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Generate a new random user ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a user ID from string.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, UserIdError> {
        Uuid::parse_str(s)
            .map(UserId)
            .map_err(|e| UserIdError::InvalidFormat(e.to_string()))
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

fn required(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        Err(ValidationError::Required { field })
    } else {
        Ok(())
    }
}

fn at_least(field: &'static str, value: &str, min: usize) -> Result<(), ValidationError> {
    if value.chars().count() < min {
        Err(ValidationError::TooShort { field, min })
    } else {
        Ok(())
    }
}

fn at_most(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.chars().count() > max {
        Err(ValidationError::TooLong { field, max })
    } else {
        Ok(())
    }
}

/// Display name: 2-50 characters after trimming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayName(String);

impl DisplayName {
    const MIN_LENGTH: usize = 2;
    const MAX_LENGTH: usize = 50;

    pub fn new(name: &str) -> Result<Self, ValidationError> {
        let name = name.trim();
        required("name", name)?;
        at_least("name", name, Self::MIN_LENGTH)?;
        at_most("name", name, Self::MAX_LENGTH)?;
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Username value type
///
/// 3-30 characters after trimming, ASCII letters, digits and underscore only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Username(String);

impl Username {
    const MIN_LENGTH: usize = 3;
    const MAX_LENGTH: usize = 30;

    pub fn new(username: &str) -> Result<Self, ValidationError> {
        let username = username.trim();
        required("username", username)?;
        at_least("username", username, Self::MIN_LENGTH)?;
        at_most("username", username, Self::MAX_LENGTH)?;
        Self::with_valid_chars(username)?;
        Ok(Self(username.to_string()))
    }

    fn with_valid_chars(username: &str) -> Result<(), ValidationError> {
        if username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            Ok(())
        } else {
            Err(ValidationError::InvalidUsernameCharacters)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address type
///
/// Only the minimal `<non-space>@<non-space>` shape is enforced, up to 100
/// characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    const MAX_LENGTH: usize = 100;

    pub fn new(email: &str) -> Result<Self, ValidationError> {
        let email = email.trim();
        required("email", email)?;

        static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex = EMAIL_REGEX
            .get_or_init(|| Regex::new(r"^\S+@\S+$").expect("Failed to compile email regex"));
        if !regex.is_match(email) {
            return Err(ValidationError::InvalidEmail);
        }

        at_most("email", email, Self::MAX_LENGTH)?;
        Ok(Self(email.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Plaintext password, held only long enough to hash or verify it.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    const MIN_LENGTH: usize = 6;
    const MAX_LENGTH: usize = 100;

    /// Registration rules: 6-100 characters, not trimmed.
    pub fn new(password: String) -> Result<Self, ValidationError> {
        required("password", &password)?;
        at_least("password", &password, Self::MIN_LENGTH)?;
        at_most("password", &password, Self::MAX_LENGTH)?;
        Ok(Self(password))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

/// Validated registration input.
#[derive(Debug)]
pub struct RegisterUserCommand {
    pub name: DisplayName,
    pub username: Username,
    pub email: EmailAddress,
    pub password: Password,
}

impl RegisterUserCommand {
    /// Validate raw registration fields.
    ///
    /// Checks run in the order name, username, email, password; the first
    /// failure is returned.
    pub fn new(
        name: &str,
        username: &str,
        email: &str,
        password: String,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            name: DisplayName::new(name)?,
            username: Username::new(username)?,
            email: EmailAddress::new(email)?,
            password: Password::new(password)?,
        })
    }
}

/// Validated login input.
///
/// Looser than registration: no character class and no upper bounds.
#[derive(Debug)]
pub struct LoginCommand {
    pub username: String,
    pub password: Password,
}

impl LoginCommand {
    const USERNAME_MIN_LENGTH: usize = 3;

    pub fn new(username: &str, password: String) -> Result<Self, ValidationError> {
        let username = username.trim();
        required("username", username)?;
        required("password", password.trim())?;
        at_least("username", username, Self::USERNAME_MIN_LENGTH)?;
        at_least("password", &password, Password::MIN_LENGTH)?;

        Ok(Self {
            username: username.to_string(),
            password: Password(password),
        })
    }
}

/// Outcome of a successful register or login.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: User,
    pub token: String,
}
