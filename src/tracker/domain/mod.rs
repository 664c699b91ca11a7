//! Domain model for project tracking.
//!
//! Aggregates here own every workflow rule: issue keys, the activity log,
//! board column moves, sprint membership, and the sprint lifecycle. Nothing
//! in this module touches storage.

mod activity;
mod actor;
mod board;
mod comment;
mod error;
mod filter;
mod ids;
mod issue;
mod project;
mod sprint;
mod text;
mod user;

pub use activity::{ActivityEntry, ActivityKind, UnassignmentLogging};
pub use actor::ActorContext;
pub use board::{BacklogView, Board, BoardColumn, ProjectStats, SprintLane};
pub use comment::{Comment, PersistedCommentData};
pub use error::{ParseEnumError, TrackerDomainError};
pub use filter::{IssueFilter, SprintScope};
pub use ids::{
    ActivityId, CommentId, IssueId, IssueKey, IssueNumber, ProjectId, ProjectKey, SprintId,
    StoryPoints, UserId,
};
pub use issue::{
    Issue, IssueDraft, IssuePatch, IssuePriority, IssueStatus, IssueType, PersistedIssueData,
};
pub use project::{PersistedProjectData, Project, ProjectCategory, ProjectPatch};
pub use sprint::{PersistedSprintData, Sprint, SprintPatch, SprintStatus};
pub use user::{EmailAddress, PersistedUserData, User, UserRole};
