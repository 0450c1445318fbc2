//! Sign-up, sign-in and user profiles

use super::views::UserProfile;
use crate::auth::{hash_password, verify_password, TokenService};
use crate::error::{ServiceError, ServiceResult};
use crate::models::{DisplayName, Email, Password, Username};
use crate::store::{NewUser, Role, Store, StoreError, UniqueKey, User};

/// Raw sign-up input, validated by [`AccountService::signup`]
#[derive(Debug, Clone)]
pub struct SignUp<'a> {
    pub name: &'a str,
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

pub struct AccountService<'a> {
    store: &'a dyn Store,
    tokens: &'a TokenService,
}

impl<'a> AccountService<'a> {
    pub fn new(store: &'a dyn Store, tokens: &'a TokenService) -> Self {
        Self { store, tokens }
    }

    /// Register a new account with role `user`.
    ///
    /// Duplicates are caught by a pre-check for a friendly error and again by
    /// the store's unique constraints, which decide concurrent sign-ups.
    pub async fn signup(&self, input: SignUp<'_>) -> ServiceResult<User> {
        let name = DisplayName::new(input.name)?;
        let username = Username::new(input.username)?;
        let email = Email::new(input.email)?;
        let password = Password::new(input.password)?;

        if self.store.username_exists(username.as_str()).await? {
            return Err(ServiceError::UsernameTaken);
        }
        if self.store.email_exists(email.as_str()).await? {
            return Err(ServiceError::EmailInUse);
        }

        let password_hash = hash_password(password.as_str())?;

        let user = self
            .store
            .create_user(NewUser {
                name: name.into_string(),
                username: username.into_string(),
                email: email.into_string(),
                password_hash,
                role: Role::User,
            })
            .await
            .map_err(|e| match e {
                StoreError::Conflict(UniqueKey::Username) => ServiceError::UsernameTaken,
                StoreError::Conflict(UniqueKey::Email) => ServiceError::EmailInUse,
                other => other.into(),
            })?;

        tracing::info!(user_id = user.id, username = %user.username, "user registered");
        Ok(user)
    }

    /// Check credentials and issue an access token.
    pub async fn signin(&self, username_or_email: &str, password: &str) -> ServiceResult<String> {
        let user = self
            .store
            .find_user_by_login(username_or_email.trim())
            .await?
            .ok_or(ServiceError::BadCredentials)?;

        if !verify_password(&user.password_hash, password) {
            tracing::debug!(user_id = user.id, "password mismatch");
            return Err(ServiceError::BadCredentials);
        }

        Ok(self.tokens.issue(user.id)?)
    }

    pub async fn username_available(&self, username: &str) -> ServiceResult<bool> {
        Ok(!self.store.username_exists(username.trim()).await?)
    }

    pub async fn email_available(&self, email: &str) -> ServiceResult<bool> {
        Ok(!self.store.email_exists(email.trim()).await?)
    }

    /// Public profile with poll and vote counters.
    pub async fn profile(&self, username: &str) -> ServiceResult<UserProfile> {
        let user = self
            .store
            .find_user_by_username(username)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", "username", username))?;

        let poll_count = self.store.count_polls_created_by(user.id).await?;
        let vote_count = self.store.count_votes_by(user.id).await?;

        Ok(UserProfile {
            id: user.id,
            username: user.username,
            name: user.name,
            joined_at: user.created_at,
            poll_count,
            vote_count,
        })
    }
}
