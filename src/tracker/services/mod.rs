//! Application services orchestrating tracker workflows.
//!
//! Every mutating operation takes an [`crate::tracker::domain::ActorContext`]
//! and rejects anonymous callers.

mod comment;
mod error;
mod issue_lifecycle;
mod project;
mod sprint_lifecycle;
mod user_directory;

pub use comment::CommentService;
pub use error::{ErrorKind, TrackerServiceError, TrackerServiceResult};
pub use issue_lifecycle::{CreateIssueRequest, IssueLifecycleService, UpdateIssueRequest};
pub use project::{CreateProjectRequest, ProjectService};
pub use sprint_lifecycle::{CreateSprintRequest, SprintLifecycleService};
pub use user_directory::{RegisterUserRequest, UserDirectoryService};
