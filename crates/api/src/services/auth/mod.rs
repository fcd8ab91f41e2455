//! Authentication service.
//!
//! Registration, password login, and resolution of bearer tokens to users.

mod error;

use std::sync::LazyLock;

pub use error::AuthError;

use atelier_core::{Email, Username};

use crate::db::{RepositoryError, UniqueField, UserStore};
use crate::models::user::{AccessToken, NewUser, RegisterRequest, User};
use crate::services::password::{hash_password, verify_password};
use crate::services::token::TokenService;

/// Minimum password length, in characters.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Verified against when the username is unknown, so a miss costs about as
/// much as a wrong password.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("atelier-dummy-password").ok());

/// Authentication service.
///
/// Borrows the credential store and token service from `AppState` for the
/// duration of one request.
pub struct AuthService<'a> {
    users: &'a dyn UserStore,
    tokens: &'a TokenService,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(users: &'a dyn UserStore, tokens: &'a TokenService) -> Self {
        Self { users, tokens }
    }

    /// Register a new user.
    ///
    /// The username is checked before the email, so when both are taken the
    /// username conflict is reported.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidUsername`, `AuthError::InvalidEmail` or
    /// `AuthError::WeakPassword` for bad input, `AuthError::UsernameTaken` or
    /// `AuthError::EmailTaken` on conflict.
    pub async fn register(&self, request: &RegisterRequest) -> Result<User, AuthError> {
        let username = Username::parse(&request.username)?;
        let email = Email::parse(&request.email)?;
        validate_password(&request.password)?;

        if self
            .users
            .find_by_username(username.as_str())
            .await?
            .is_some()
        {
            return Err(AuthError::UsernameTaken);
        }
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let password_hash = hash_password(&request.password).map_err(|e| {
            tracing::error!(error = %e, "Password hashing failed");
            AuthError::PasswordHash
        })?;

        let user = self
            .users
            .insert(NewUser {
                username: &username,
                email: &email,
                password_hash: &password_hash,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(UniqueField::Username) => AuthError::UsernameTaken,
                RepositoryError::Conflict(UniqueField::Email) => AuthError::EmailTaken,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Login with username and password, returning a bearer token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the user is unknown or the
    /// password is wrong; the two cases are indistinguishable.
    pub async fn login(&self, username: &str, password: &str) -> Result<AccessToken, AuthError> {
        let Some(user) = self.users.find_by_username(username).await? else {
            if let Some(dummy) = DUMMY_HASH.as_deref() {
                let _ = verify_password(password, dummy);
            }
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_password(password, &user.password_hash) {
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.tokens.issue(user.username.as_str())?;
        tracing::info!(user_id = %user.id, "User logged in");
        Ok(AccessToken::bearer(token))
    }

    /// Resolve a bearer token to a currently existing user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` if the token is rejected or its
    /// subject no longer exists, `AuthError::Repository` if the lookup fails.
    pub async fn authenticate_bearer(&self, token: &str) -> Result<User, AuthError> {
        let subject = self
            .tokens
            .validate(token)
            .map_err(|_| AuthError::InvalidToken)?;

        self.users
            .find_by_username(&subject)
            .await?
            .ok_or(AuthError::InvalidToken)
    }
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}
