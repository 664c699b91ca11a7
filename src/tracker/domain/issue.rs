//! Issue aggregate root, workflow enumerations, and partial updates.

use super::text::{normalize_labels, optional_text, required_text};
use super::{
    ActivityEntry, ActivityKind, IssueId, IssueKey, ParseEnumError, ProjectId, Sprint, SprintId,
    StoryPoints, TrackerDomainError, UnassignmentLogging, UserId,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of work an issue tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueType {
    /// User-facing story.
    Story,
    /// Generic unit of work.
    #[default]
    Task,
    /// Defect.
    Bug,
    /// Large body of work.
    Epic,
}

impl IssueType {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Story => "story",
            Self::Task => "task",
            Self::Bug => "bug",
            Self::Epic => "epic",
        }
    }
}

impl TryFrom<&str> for IssueType {
    type Error = ParseEnumError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "story" => Ok(Self::Story),
            "task" => Ok(Self::Task),
            "bug" => Ok(Self::Bug),
            "epic" => Ok(Self::Epic),
            _ => Err(ParseEnumError::new("issue type", value)),
        }
    }
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Board column an issue sits in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueStatus {
    /// Not started.
    #[default]
    Todo,
    /// Being worked on.
    InProgress,
    /// Awaiting review.
    InReview,
    /// Finished.
    Done,
}

impl IssueStatus {
    /// Every status in board column order.
    pub const ALL: [Self; 4] = [Self::Todo, Self::InProgress, Self::InReview, Self::Done];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in-progress",
            Self::InReview => "in-review",
            Self::Done => "done",
        }
    }
}

impl TryFrom<&str> for IssueStatus {
    type Error = ParseEnumError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "todo" => Ok(Self::Todo),
            "in-progress" => Ok(Self::InProgress),
            "in-review" => Ok(Self::InReview),
            "done" => Ok(Self::Done),
            _ => Err(ParseEnumError::new("issue status", value)),
        }
    }
}

impl fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Issue priority, highest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssuePriority {
    /// Drop everything.
    Highest,
    /// Important.
    High,
    /// Normal.
    #[default]
    Medium,
    /// Can wait.
    Low,
    /// Nice to have.
    Lowest,
}

impl IssuePriority {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Highest => "highest",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::Lowest => "lowest",
        }
    }
}

impl TryFrom<&str> for IssuePriority {
    type Error = ParseEnumError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "highest" => Ok(Self::Highest),
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            "lowest" => Ok(Self::Lowest),
            _ => Err(ParseEnumError::new("issue priority", value)),
        }
    }
}

impl fmt::Display for IssuePriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field values for a new issue. Unset optional fields take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueDraft {
    /// Required title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Type, `task` when unset.
    pub issue_type: Option<IssueType>,
    /// Initial status, `todo` when unset.
    pub status: Option<IssueStatus>,
    /// Priority, `medium` when unset.
    pub priority: Option<IssuePriority>,
    /// Initial assignee.
    pub assignee: Option<UserId>,
    /// Estimate.
    pub story_points: Option<StoryPoints>,
    /// Free-form labels.
    pub labels: Vec<String>,
}

/// Partial update for an issue. `None` leaves a field unchanged; nested
/// options distinguish clearing a value from leaving it alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssuePatch {
    /// New title.
    pub title: Option<String>,
    /// New description; a blank string clears it.
    pub description: Option<String>,
    /// New type.
    pub issue_type: Option<IssueType>,
    /// New status.
    pub status: Option<IssueStatus>,
    /// New priority.
    pub priority: Option<IssuePriority>,
    /// New assignee, or `Some(None)` to unassign.
    pub assignee: Option<Option<UserId>>,
    /// New estimate, or `Some(None)` to clear it.
    pub story_points: Option<Option<StoryPoints>>,
    /// Replacement label set.
    pub labels: Option<Vec<String>>,
}

/// Issue aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    id: IssueId,
    project_id: ProjectId,
    key: IssueKey,
    title: String,
    description: Option<String>,
    issue_type: IssueType,
    status: IssueStatus,
    priority: IssuePriority,
    assignee: Option<UserId>,
    reporter: UserId,
    sprint_id: Option<SprintId>,
    story_points: Option<StoryPoints>,
    labels: Vec<String>,
    activities: Vec<ActivityEntry>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedIssueData {
    /// Persisted identifier.
    pub id: IssueId,
    /// Owning project.
    pub project_id: ProjectId,
    /// Project-scoped key.
    pub key: IssueKey,
    /// Title.
    pub title: String,
    /// Description.
    pub description: Option<String>,
    /// Type.
    pub issue_type: IssueType,
    /// Status.
    pub status: IssueStatus,
    /// Priority.
    pub priority: IssuePriority,
    /// Assignee.
    pub assignee: Option<UserId>,
    /// Reporter.
    pub reporter: UserId,
    /// Sprint membership.
    pub sprint_id: Option<SprintId>,
    /// Estimate.
    pub story_points: Option<StoryPoints>,
    /// Labels.
    pub labels: Vec<String>,
    /// Activity log in append order.
    pub activities: Vec<ActivityEntry>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Latest update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Issue {
    /// Creates a new issue reported by `reporter` and logs its creation.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerDomainError::EmptyField`] for a blank title or
    /// [`TrackerDomainError::SprintProjectMismatch`] when `sprint` belongs to
    /// another project.
    pub fn create(
        project_id: ProjectId,
        key: IssueKey,
        draft: IssueDraft,
        sprint: Option<&Sprint>,
        reporter: UserId,
        clock: &impl Clock,
    ) -> Result<Self, TrackerDomainError> {
        let id = IssueId::new();
        let title = required_text(draft.title, "issue title")?;
        let sprint_id = sprint
            .map(|target| ensure_same_project(id, project_id, target))
            .transpose()?;
        let timestamp = clock.utc();

        Ok(Self {
            id,
            project_id,
            key,
            title,
            description: draft.description.and_then(optional_text),
            issue_type: draft.issue_type.unwrap_or_default(),
            status: draft.status.unwrap_or_default(),
            priority: draft.priority.unwrap_or_default(),
            assignee: draft.assignee,
            reporter,
            sprint_id,
            story_points: draft.story_points,
            labels: normalize_labels(draft.labels),
            activities: vec![ActivityEntry::new(
                ActivityKind::Created,
                reporter,
                timestamp,
            )],
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Reconstructs an issue from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedIssueData) -> Self {
        Self {
            id: data.id,
            project_id: data.project_id,
            key: data.key,
            title: data.title,
            description: data.description,
            issue_type: data.issue_type,
            status: data.status,
            priority: data.priority,
            assignee: data.assignee,
            reporter: data.reporter,
            sprint_id: data.sprint_id,
            story_points: data.story_points,
            labels: data.labels,
            activities: data.activities,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the issue identifier.
    #[must_use]
    pub const fn id(&self) -> IssueId {
        self.id
    }

    /// Returns the owning project.
    #[must_use]
    pub const fn project_id(&self) -> ProjectId {
        self.project_id
    }

    /// Returns the project-scoped key.
    #[must_use]
    pub const fn key(&self) -> &IssueKey {
        &self.key
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the issue type.
    #[must_use]
    pub const fn issue_type(&self) -> IssueType {
        self.issue_type
    }

    /// Returns the board column.
    #[must_use]
    pub const fn status(&self) -> IssueStatus {
        self.status
    }

    /// Returns the priority.
    #[must_use]
    pub const fn priority(&self) -> IssuePriority {
        self.priority
    }

    /// Returns the assignee, if any.
    #[must_use]
    pub const fn assignee(&self) -> Option<UserId> {
        self.assignee
    }

    /// Returns the reporter.
    #[must_use]
    pub const fn reporter(&self) -> UserId {
        self.reporter
    }

    /// Returns the sprint, or `None` for backlog issues.
    #[must_use]
    pub const fn sprint_id(&self) -> Option<SprintId> {
        self.sprint_id
    }

    /// Returns `true` when the issue is in the backlog.
    #[must_use]
    pub const fn is_in_backlog(&self) -> bool {
        self.sprint_id.is_none()
    }

    /// Returns the estimate, if any.
    #[must_use]
    pub const fn story_points(&self) -> Option<StoryPoints> {
        self.story_points
    }

    /// Returns the labels.
    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Returns the activity log in append order.
    #[must_use]
    pub fn activities(&self) -> &[ActivityEntry] {
        &self.activities
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns `true` when the title, description, or key contains `needle`,
    /// ignoring case.
    #[must_use]
    pub fn matches_text(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.title.to_lowercase().contains(&needle)
            || self
                .description
                .as_deref()
                .is_some_and(|text| text.to_lowercase().contains(&needle))
            || self.key.to_string().to_lowercase().contains(&needle)
    }

    /// Applies a partial update on behalf of `actor`.
    ///
    /// A status change appends a `status_changed` entry; an assignee change
    /// to a user appends an `assigned` entry. Clearing the assignee is logged
    /// only under [`UnassignmentLogging::Record`]. `updated_at` advances on
    /// every call, even when nothing else changes.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerDomainError::EmptyField`] for a blank title; the
    /// issue is left untouched.
    pub fn apply_patch(
        &mut self,
        patch: IssuePatch,
        actor: UserId,
        unassignment: UnassignmentLogging,
        clock: &impl Clock,
    ) -> Result<(), TrackerDomainError> {
        let IssuePatch {
            title,
            description,
            issue_type,
            status,
            priority,
            assignee,
            story_points,
            labels,
        } = patch;
        let new_title = title
            .map(|value| required_text(value, "issue title"))
            .transpose()?;
        let timestamp = clock.utc();

        if let Some(value) = new_title {
            self.title = value;
        }
        if let Some(value) = description {
            self.description = optional_text(value);
        }
        if let Some(value) = issue_type {
            self.issue_type = value;
        }
        if let Some(value) = status {
            self.change_status(value, actor, timestamp);
        }
        if let Some(value) = priority {
            self.priority = value;
        }
        if let Some(value) = assignee {
            self.change_assignee(value, actor, unassignment, timestamp);
        }
        if let Some(value) = story_points {
            self.story_points = value;
        }
        if let Some(value) = labels {
            self.labels = normalize_labels(value);
        }
        self.updated_at = timestamp;
        Ok(())
    }

    /// Moves the issue to a board column.
    ///
    /// Returns `false` without touching the issue when it is already in
    /// `status`, so dropping a card on its own column neither persists nor
    /// logs anything.
    pub fn move_to_column(&mut self, status: IssueStatus, actor: UserId, clock: &impl Clock) -> bool {
        if self.status == status {
            return false;
        }
        let timestamp = clock.utc();
        self.change_status(status, actor, timestamp);
        self.updated_at = timestamp;
        true
    }

    /// Places the issue in `sprint`, or back in the backlog for `None`.
    ///
    /// The status is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerDomainError::SprintProjectMismatch`] when the sprint
    /// belongs to a different project.
    pub fn move_to_sprint(
        &mut self,
        sprint: Option<&Sprint>,
        clock: &impl Clock,
    ) -> Result<(), TrackerDomainError> {
        let sprint_id = sprint
            .map(|target| ensure_same_project(self.id, self.project_id, target))
            .transpose()?;
        self.sprint_id = sprint_id;
        self.updated_at = clock.utc();
        Ok(())
    }

    fn change_status(&mut self, status: IssueStatus, actor: UserId, timestamp: DateTime<Utc>) {
        if self.status == status {
            return;
        }
        let kind = ActivityKind::StatusChanged {
            from: self.status,
            to: status,
        };
        self.activities
            .push(ActivityEntry::new(kind, actor, timestamp));
        self.status = status;
    }

    fn change_assignee(
        &mut self,
        assignee: Option<UserId>,
        actor: UserId,
        unassignment: UnassignmentLogging,
        timestamp: DateTime<Utc>,
    ) {
        if self.assignee == assignee {
            return;
        }
        let should_log = assignee.is_some() || unassignment == UnassignmentLogging::Record;
        if should_log {
            self.activities.push(ActivityEntry::new(
                ActivityKind::Assigned { assignee },
                actor,
                timestamp,
            ));
        }
        self.assignee = assignee;
    }
}

fn ensure_same_project(
    issue_id: IssueId,
    project_id: ProjectId,
    sprint: &Sprint,
) -> Result<SprintId, TrackerDomainError> {
    if sprint.project_id() != project_id {
        return Err(TrackerDomainError::SprintProjectMismatch {
            issue_id,
            sprint_id: sprint.id(),
        });
    }
    Ok(sprint.id())
}
