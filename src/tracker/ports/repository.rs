//! Repository ports for tracker persistence.
//!
//! Each collection (users, projects, issues, sprints, comments) has its own
//! trait. Adapters usually implement all of them over one backing store so
//! that cascading deletes can run atomically; [`TrackerStore`] names that
//! combination.

use crate::tracker::domain::{
    Comment, CommentId, EmailAddress, Issue, IssueFilter, IssueId, IssueKey, Project, ProjectId,
    ProjectKey, Sprint, SprintId, User, UserId,
};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Result type for tracker repository operations.
pub type TrackerRepositoryResult<T> = Result<T, TrackerRepositoryError>;

/// User persistence contract.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Stores a new user.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerRepositoryError::DuplicateEmail`] when the email is
    /// already registered.
    async fn store_user(&self, user: &User) -> TrackerRepositoryResult<()>;

    /// Finds a user by identifier.
    async fn find_user(&self, id: UserId) -> TrackerRepositoryResult<Option<User>>;

    /// Finds a user by email.
    async fn find_user_by_email(
        &self,
        email: &EmailAddress,
    ) -> TrackerRepositoryResult<Option<User>>;

    /// Lists every user ordered by registration time.
    async fn list_users(&self) -> TrackerRepositoryResult<Vec<User>>;
}

/// Project persistence contract.
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Stores a new project.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerRepositoryError::DuplicateProjectKey`] when another
    /// project already uses the key.
    async fn store_project(&self, project: &Project) -> TrackerRepositoryResult<()>;

    /// Persists changes to an existing project.
    ///
    /// The issue counter is owned by [`Self::allocate_issue_key`] and is not
    /// overwritten here.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerRepositoryError::NotFound`] when the project does not
    /// exist, [`TrackerRepositoryError::DuplicateProjectKey`] when a
    /// renamed key collides, or [`TrackerRepositoryError::ProjectKeyLocked`]
    /// when the key changes after an issue number was allocated.
    async fn update_project(&self, project: &Project) -> TrackerRepositoryResult<()>;

    /// Finds a project by identifier.
    async fn find_project(&self, id: ProjectId) -> TrackerRepositoryResult<Option<Project>>;

    /// Finds a project by key.
    async fn find_project_by_key(
        &self,
        key: &ProjectKey,
    ) -> TrackerRepositoryResult<Option<Project>>;

    /// Lists every project ordered by creation time.
    async fn list_projects(&self) -> TrackerRepositoryResult<Vec<Project>>;

    /// Atomically advances the project's issue counter and returns the key
    /// for the next issue.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerRepositoryError::NotFound`] when the project does not
    /// exist.
    async fn allocate_issue_key(&self, id: ProjectId) -> TrackerRepositoryResult<IssueKey>;

    /// Deletes a project with its issues, their comments, and its sprints,
    /// all or nothing.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerRepositoryError::NotFound`] when the project does not
    /// exist.
    async fn delete_project(&self, id: ProjectId) -> TrackerRepositoryResult<()>;
}

/// Issue persistence contract.
#[async_trait]
pub trait IssueRepository: Send + Sync {
    /// Stores a new issue.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerRepositoryError::DuplicateRecord`] when the issue ID
    /// or key already exists.
    async fn store_issue(&self, issue: &Issue) -> TrackerRepositoryResult<()>;

    /// Persists changes to an existing issue, activity log included.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerRepositoryError::NotFound`] when the issue does not
    /// exist.
    async fn update_issue(&self, issue: &Issue) -> TrackerRepositoryResult<()>;

    /// Finds an issue by identifier.
    async fn find_issue(&self, id: IssueId) -> TrackerRepositoryResult<Option<Issue>>;

    /// Finds an issue by its project-scoped key.
    async fn find_issue_by_key(&self, key: &IssueKey) -> TrackerRepositoryResult<Option<Issue>>;

    /// Lists issues matching `filter`, ordered by creation time.
    async fn list_issues(&self, filter: &IssueFilter) -> TrackerRepositoryResult<Vec<Issue>>;

    /// Deletes an issue and its comments, all or nothing.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerRepositoryError::NotFound`] when the issue does not
    /// exist.
    async fn delete_issue(&self, id: IssueId) -> TrackerRepositoryResult<()>;
}

/// Sprint persistence contract.
#[async_trait]
pub trait SprintRepository: Send + Sync {
    /// Stores a new sprint.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerRepositoryError::DuplicateRecord`] when the sprint ID
    /// already exists.
    async fn store_sprint(&self, sprint: &Sprint) -> TrackerRepositoryResult<()>;

    /// Persists changes to an existing sprint.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerRepositoryError::NotFound`] when the sprint does not
    /// exist.
    async fn update_sprint(&self, sprint: &Sprint) -> TrackerRepositoryResult<()>;

    /// Finds a sprint by identifier.
    async fn find_sprint(&self, id: SprintId) -> TrackerRepositoryResult<Option<Sprint>>;

    /// Lists a project's sprints ordered by creation time.
    async fn list_sprints(&self, project_id: ProjectId) -> TrackerRepositoryResult<Vec<Sprint>>;
}

/// Comment persistence contract.
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Stores a new comment.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerRepositoryError::NotFound`] when the parent issue does
    /// not exist.
    async fn store_comment(&self, comment: &Comment) -> TrackerRepositoryResult<()>;

    /// Persists an edited comment.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerRepositoryError::NotFound`] when the comment does not
    /// exist.
    async fn update_comment(&self, comment: &Comment) -> TrackerRepositoryResult<()>;

    /// Finds a comment by identifier.
    async fn find_comment(&self, id: CommentId) -> TrackerRepositoryResult<Option<Comment>>;

    /// Lists an issue's comments ordered by creation time.
    async fn list_comments(&self, issue_id: IssueId) -> TrackerRepositoryResult<Vec<Comment>>;

    /// Deletes a comment.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerRepositoryError::NotFound`] when the comment does not
    /// exist.
    async fn delete_comment(&self, id: CommentId) -> TrackerRepositoryResult<()>;
}

/// A backing store implementing every tracker collection.
pub trait TrackerStore:
    UserRepository + ProjectRepository + IssueRepository + SprintRepository + CommentRepository
{
}

impl<T> TrackerStore for T where
    T: UserRepository + ProjectRepository + IssueRepository + SprintRepository + CommentRepository
{
}

/// Reference to a record that a lookup failed to find.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordRef {
    /// A user.
    User(UserId),
    /// A project.
    Project(ProjectId),
    /// An issue.
    Issue(IssueId),
    /// A sprint.
    Sprint(SprintId),
    /// A comment.
    Comment(CommentId),
}

impl fmt::Display for RecordRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User(id) => write!(f, "user {id}"),
            Self::Project(id) => write!(f, "project {id}"),
            Self::Issue(id) => write!(f, "issue {id}"),
            Self::Sprint(id) => write!(f, "sprint {id}"),
            Self::Comment(id) => write!(f, "comment {id}"),
        }
    }
}

/// Errors returned by tracker repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TrackerRepositoryError {
    /// The record was not found.
    #[error("{0} not found")]
    NotFound(RecordRef),

    /// Another project already uses the key.
    #[error("duplicate project key: {0}")]
    DuplicateProjectKey(ProjectKey),

    /// Another user already registered the email.
    #[error("duplicate email address: {0}")]
    DuplicateEmail(EmailAddress),

    /// The project key changed after an issue number was allocated.
    #[error("project key is locked for project {0}")]
    ProjectKeyLocked(ProjectId),

    /// A record with the same identity already exists.
    #[error("duplicate record: {0}")]
    DuplicateRecord(String),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TrackerRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
