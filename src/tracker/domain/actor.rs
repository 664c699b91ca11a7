//! Explicit acting-user context passed into every mutating operation.

use super::UserId;

/// Identifies who is performing a tracker operation.
///
/// Callers build one per request from their own session handling. An
/// anonymous context is rejected by every mutating service operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActorContext {
    user_id: Option<UserId>,
}

impl ActorContext {
    /// Creates a context for an authenticated user.
    #[must_use]
    pub const fn authenticated(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
        }
    }

    /// Creates a context with no acting user.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self { user_id: None }
    }

    /// Returns the acting user, if any.
    #[must_use]
    pub const fn user_id(&self) -> Option<UserId> {
        self.user_id
    }

    /// Returns `true` when an acting user is present.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }
}
