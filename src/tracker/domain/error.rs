//! Error types for tracker domain validation, transitions, and parsing.

use super::{IssueId, ProjectId, SprintId, SprintStatus};
use thiserror::Error;

/// Errors returned while constructing or mutating tracker aggregates.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TrackerDomainError {
    /// The project key is empty, too long, or contains non-letters.
    #[error("invalid project key '{0}', expected 1-10 ASCII letters")]
    InvalidProjectKey(String),

    /// The project key cannot change after issues have been created.
    #[error("project {0} already has issues; its key is locked")]
    ProjectKeyLocked(ProjectId),

    /// The issue key does not follow `KEY-N` format.
    #[error("invalid issue key '{0}', expected KEY-N")]
    InvalidIssueKey(String),

    /// The issue number is invalid.
    #[error("invalid issue number {0}, expected a positive integer")]
    InvalidIssueNumber(u64),

    /// Story points must be a positive integer.
    #[error("invalid story points {0}, expected a positive integer")]
    InvalidStoryPoints(i64),

    /// A required text field is empty after trimming.
    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    /// The email address is not plausibly valid.
    #[error("invalid email address '{0}'")]
    InvalidEmail(String),

    /// A sprint's end date precedes its start date.
    #[error("sprint end date precedes its start date")]
    InvalidSprintDates,

    /// The sprint cannot move from its current status to the target.
    #[error("sprint {sprint_id} cannot transition from {from} to {to}")]
    InvalidSprintTransition {
        /// Sprint being transitioned.
        sprint_id: SprintId,
        /// Current status.
        from: SprintStatus,
        /// Requested status.
        to: SprintStatus,
    },

    /// The issue and sprint belong to different projects.
    #[error("issue {issue_id} cannot join sprint {sprint_id} from another project")]
    SprintProjectMismatch {
        /// Issue being moved.
        issue_id: IssueId,
        /// Target sprint.
        sprint_id: SprintId,
    },
}

/// Error returned while parsing a tracker enumeration from its wire form.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown {kind}: {value}")]
pub struct ParseEnumError {
    /// Enumeration being parsed, e.g. `issue status`.
    pub kind: &'static str,
    /// Rejected input.
    pub value: String,
}

impl ParseEnumError {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_owned(),
        }
    }
}
