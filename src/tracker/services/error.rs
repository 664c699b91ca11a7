//! Service-level errors shared by the tracker services.

use crate::tracker::{
    domain::{ActorContext, CommentId, ProjectId, SprintId, TrackerDomainError, UserId},
    ports::{RecordRef, TrackerRepositoryError},
};
use thiserror::Error;
use tracing::warn;

/// Categorical classification of a [`TrackerServiceError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A referenced record does not exist.
    NotFound,
    /// The operation needs an acting user.
    Unauthenticated,
    /// The operation conflicts with the current lifecycle state.
    InvalidState,
    /// The input was rejected.
    Validation,
    /// The backing store failed.
    Persistence,
}

/// Errors returned by tracker services.
#[derive(Debug, Error)]
pub enum TrackerServiceError {
    /// Domain validation or transition failed.
    #[error(transparent)]
    Domain(#[from] TrackerDomainError),

    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] TrackerRepositoryError),

    /// A referenced record does not exist.
    #[error("{0} not found")]
    NotFound(RecordRef),

    /// A mutating operation was attempted without an acting user.
    #[error("an authenticated actor is required")]
    Unauthenticated,

    /// Another sprint of the project is already active.
    #[error("project {project_id} already has active sprint {active_sprint_id}")]
    ActiveSprintExists {
        /// Project being planned.
        project_id: ProjectId,
        /// Sprint currently active.
        active_sprint_id: SprintId,
    },

    /// The sprint belongs to a different project than the issue.
    #[error("sprint {sprint_id} does not belong to project {project_id}")]
    SprintProjectMismatch {
        /// Project of the issue.
        project_id: ProjectId,
        /// Requested sprint.
        sprint_id: SprintId,
    },

    /// Only the author may edit or delete a comment.
    #[error("user {actor} is not the author of comment {comment_id}")]
    NotCommentAuthor {
        /// Comment being changed.
        comment_id: CommentId,
        /// Acting user.
        actor: UserId,
    },

    /// The project owner cannot leave the member set.
    #[error("user {0} owns the project and cannot be removed")]
    OwnerRemoval(UserId),
}

impl TrackerServiceError {
    /// Classifies the error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Domain(err) => domain_kind(err),
            Self::Repository(err) => repository_kind(err),
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Unauthenticated => ErrorKind::Unauthenticated,
            Self::ActiveSprintExists { .. } | Self::OwnerRemoval(_) => ErrorKind::InvalidState,
            Self::SprintProjectMismatch { .. } | Self::NotCommentAuthor { .. } => {
                ErrorKind::Validation
            }
        }
    }
}

const fn domain_kind(err: &TrackerDomainError) -> ErrorKind {
    match err {
        TrackerDomainError::InvalidSprintTransition { .. }
        | TrackerDomainError::ProjectKeyLocked(_) => ErrorKind::InvalidState,
        _ => ErrorKind::Validation,
    }
}

const fn repository_kind(err: &TrackerRepositoryError) -> ErrorKind {
    match err {
        TrackerRepositoryError::NotFound(_) => ErrorKind::NotFound,
        TrackerRepositoryError::DuplicateProjectKey(_)
        | TrackerRepositoryError::DuplicateEmail(_)
        | TrackerRepositoryError::DuplicateRecord(_) => ErrorKind::Validation,
        TrackerRepositoryError::ProjectKeyLocked(_) => ErrorKind::InvalidState,
        TrackerRepositoryError::Persistence(_) => ErrorKind::Persistence,
    }
}

/// Result type for tracker service operations.
pub type TrackerServiceResult<T> = Result<T, TrackerServiceError>;

/// Returns the acting user or rejects the operation.
pub(super) fn require_actor(
    actor: &ActorContext,
    operation: &'static str,
) -> TrackerServiceResult<UserId> {
    actor.user_id().ok_or_else(|| {
        warn!(operation, "rejected anonymous tracker mutation");
        TrackerServiceError::Unauthenticated
    })
}

/// Converts a missing lookup into [`TrackerServiceError::NotFound`].
pub(super) fn found<T>(record: Option<T>, reference: RecordRef) -> TrackerServiceResult<T> {
    record.ok_or(TrackerServiceError::NotFound(reference))
}
