//! Registered users referenced by projects, issues and comments.

use super::error::TrackerServiceResult;
use crate::tracker::{
    domain::{EmailAddress, User, UserId, UserRole},
    ports::{TrackerRepositoryError, TrackerStore},
};
use mockable::Clock;
use std::sync::Arc;
use tracing::{info, warn};

/// Request payload for registering a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterUserRequest {
    name: String,
    email: String,
    role: UserRole,
    avatar_url: Option<String>,
}

impl RegisterUserRequest {
    /// Creates a request for a developer account.
    #[must_use]
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            role: UserRole::default(),
            avatar_url: None,
        }
    }

    /// Sets the role.
    #[must_use]
    pub const fn with_role(mut self, role: UserRole) -> Self {
        self.role = role;
        self
    }

    /// Sets the avatar URL.
    #[must_use]
    pub fn with_avatar_url(mut self, avatar_url: impl Into<String>) -> Self {
        self.avatar_url = Some(avatar_url.into());
        self
    }
}

/// User directory service.
#[derive(Clone)]
pub struct UserDirectoryService<S, C>
where
    S: TrackerStore,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    clock: Arc<C>,
}

impl<S, C> UserDirectoryService<S, C>
where
    S: TrackerStore,
    C: Clock + Send + Sync,
{
    /// Creates a new user directory service.
    #[must_use]
    pub const fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        Self { store, clock }
    }

    /// Registers a user.
    ///
    /// # Errors
    ///
    /// Returns a domain error for a blank name or malformed email, or
    /// [`TrackerRepositoryError::DuplicateEmail`] when the email is taken.
    pub async fn register(&self, request: RegisterUserRequest) -> TrackerServiceResult<User> {
        let email = EmailAddress::new(request.email)?;
        if self.store.find_user_by_email(&email).await?.is_some() {
            warn!(email = %email, "registration rejected; email in use");
            return Err(TrackerRepositoryError::DuplicateEmail(email).into());
        }

        let mut user = User::new(request.name, email, request.role, &*self.clock)?;
        if let Some(avatar_url) = request.avatar_url {
            user = user.with_avatar_url(avatar_url);
        }
        self.store.store_user(&user).await?;
        info!(user_id = %user.id(), role = %user.role(), "user registered");
        Ok(user)
    }

    /// Retrieves a user by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`crate::tracker::services::TrackerServiceError::Repository`]
    /// when the lookup fails.
    pub async fn find_by_id(&self, user_id: UserId) -> TrackerServiceResult<Option<User>> {
        Ok(self.store.find_user(user_id).await?)
    }

    /// Retrieves a user by email, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns a domain error for a malformed email or
    /// [`crate::tracker::services::TrackerServiceError::Repository`] when the
    /// lookup fails.
    pub async fn find_by_email(&self, email: &str) -> TrackerServiceResult<Option<User>> {
        let address = EmailAddress::new(email)?;
        Ok(self.store.find_user_by_email(&address).await?)
    }

    /// Lists every user in registration order.
    ///
    /// # Errors
    ///
    /// Returns [`crate::tracker::services::TrackerServiceError::Repository`]
    /// when the query fails.
    pub async fn list_all(&self) -> TrackerServiceResult<Vec<User>> {
        Ok(self.store.list_users().await?)
    }
}
