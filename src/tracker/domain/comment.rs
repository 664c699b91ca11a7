//! Comments attached to issues.

use super::text::required_text;
use super::{CommentId, IssueId, TrackerDomainError, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Comment on an issue. Deleted together with its issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    id: CommentId,
    issue_id: IssueId,
    author: UserId,
    text: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedCommentData {
    /// Persisted identifier.
    pub id: CommentId,
    /// Parent issue.
    pub issue_id: IssueId,
    /// Author.
    pub author: UserId,
    /// Body text.
    pub text: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Latest edit timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    /// Creates a comment.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerDomainError::EmptyField`] for blank text.
    pub fn new(
        issue_id: IssueId,
        author: UserId,
        text: impl Into<String>,
        clock: &impl Clock,
    ) -> Result<Self, TrackerDomainError> {
        let timestamp = clock.utc();
        Ok(Self {
            id: CommentId::new(),
            issue_id,
            author,
            text: required_text(text.into(), "comment text")?,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Reconstructs a comment from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedCommentData) -> Self {
        Self {
            id: data.id,
            issue_id: data.issue_id,
            author: data.author,
            text: data.text,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the comment identifier.
    #[must_use]
    pub const fn id(&self) -> CommentId {
        self.id
    }

    /// Returns the parent issue.
    #[must_use]
    pub const fn issue_id(&self) -> IssueId {
        self.issue_id
    }

    /// Returns the author.
    #[must_use]
    pub const fn author(&self) -> UserId {
        self.author
    }

    /// Returns the body text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest edit timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Replaces the body text.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerDomainError::EmptyField`] for blank text.
    pub fn edit(&mut self, text: impl Into<String>, clock: &impl Clock) -> Result<(), TrackerDomainError> {
        self.text = required_text(text.into(), "comment text")?;
        self.updated_at = clock.utc();
        Ok(())
    }
}
