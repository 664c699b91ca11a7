//! User records referenced by projects, issues, and comments.

use super::text::{optional_text, required_text};
use super::{ParseEnumError, TrackerDomainError, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Role a user holds across the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Full administrative access.
    Admin,
    /// Plans sprints and manages projects.
    ProjectManager,
    /// Works on issues.
    #[default]
    Developer,
    /// Read-only participant.
    Viewer,
}

impl UserRole {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::ProjectManager => "project_manager",
            Self::Developer => "developer",
            Self::Viewer => "viewer",
        }
    }
}

impl TryFrom<&str> for UserRole {
    type Error = ParseEnumError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "project_manager" => Ok(Self::ProjectManager),
            "developer" => Ok(Self::Developer),
            "viewer" => Ok(Self::Viewer),
            _ => Err(ParseEnumError::new("user role", value)),
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lowercased email address used as the unique login handle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Creates a normalized email address.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerDomainError::InvalidEmail`] unless the value has a
    /// non-empty local part and domain separated by a single `@` and no
    /// whitespace.
    pub fn new(value: impl Into<String>) -> Result<Self, TrackerDomainError> {
        let raw = value.into();
        let normalized = raw.trim().to_ascii_lowercase();
        let is_valid = match normalized.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty()
                    && !domain.is_empty()
                    && !domain.contains('@')
                    && !normalized.chars().any(char::is_whitespace)
            }
            None => false,
        };
        if !is_valid {
            return Err(TrackerDomainError::InvalidEmail(raw));
        }
        Ok(Self(normalized))
    }

    /// Returns the address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Registered tracker user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    name: String,
    email: EmailAddress,
    role: UserRole,
    avatar_url: Option<String>,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedUserData {
    /// Persisted identifier.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: EmailAddress,
    /// Role.
    pub role: UserRole,
    /// Optional avatar URL.
    pub avatar_url: Option<String>,
    /// Registration timestamp.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Creates a new user record.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerDomainError::EmptyField`] when the name is blank.
    pub fn new(
        name: impl Into<String>,
        email: EmailAddress,
        role: UserRole,
        clock: &impl Clock,
    ) -> Result<Self, TrackerDomainError> {
        let name = required_text(name.into(), "user name")?;
        Ok(Self {
            id: UserId::new(),
            name,
            email,
            role,
            avatar_url: None,
            created_at: clock.utc(),
        })
    }

    /// Sets the avatar URL; blank values clear it.
    #[must_use]
    pub fn with_avatar_url(mut self, avatar_url: impl Into<String>) -> Self {
        self.avatar_url = optional_text(avatar_url.into());
        self
    }

    /// Reconstructs a user from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedUserData) -> Self {
        Self {
            id: data.id,
            name: data.name,
            email: data.email,
            role: data.role,
            avatar_url: data.avatar_url,
            created_at: data.created_at,
        }
    }

    /// Returns the user identifier.
    #[must_use]
    pub const fn id(&self) -> UserId {
        self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the login email.
    #[must_use]
    pub const fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Returns the role.
    #[must_use]
    pub const fn role(&self) -> UserRole {
        self.role
    }

    /// Returns the avatar URL, if any.
    #[must_use]
    pub fn avatar_url(&self) -> Option<&str> {
        self.avatar_url.as_deref()
    }

    /// Returns the registration timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
