//! Diesel row models for tracker persistence.

use super::schema::{comments, issues, projects, sprints, users};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query result row for user records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    /// User identifier.
    pub id: uuid::Uuid,
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Role name.
    pub role: String,
    /// Optional avatar URL.
    pub avatar_url: Option<String>,
    /// Registration timestamp.
    pub created_at: DateTime<Utc>,
}

/// Insert model for user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub struct NewUserRow {
    /// User identifier.
    pub id: uuid::Uuid,
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Role name.
    pub role: String,
    /// Optional avatar URL.
    pub avatar_url: Option<String>,
    /// Registration timestamp.
    pub created_at: DateTime<Utc>,
}

/// Query result row for project records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = projects)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProjectRow {
    /// Project identifier.
    pub id: uuid::Uuid,
    /// Issue-key prefix.
    pub key: String,
    /// Display name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Category name.
    pub category: String,
    /// Owning user.
    pub owner_id: uuid::Uuid,
    /// Member identifiers as a JSON array.
    pub members: Value,
    /// Number of issues ever created.
    pub issue_counter: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for project records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = projects)]
pub struct NewProjectRow {
    /// Project identifier.
    pub id: uuid::Uuid,
    /// Issue-key prefix.
    pub key: String,
    /// Display name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Category name.
    pub category: String,
    /// Owning user.
    pub owner_id: uuid::Uuid,
    /// Member identifiers as a JSON array.
    pub members: Value,
    /// Number of issues ever created.
    pub issue_counter: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Update model for project records. Leaves the issue counter alone.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = projects)]
#[diesel(treat_none_as_null = true)]
pub struct ProjectChangeset {
    /// Issue-key prefix.
    pub key: String,
    /// Display name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Category name.
    pub category: String,
    /// Member identifiers as a JSON array.
    pub members: Value,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Query result row for sprint records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = sprints)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SprintRow {
    /// Sprint identifier.
    pub id: uuid::Uuid,
    /// Owning project.
    pub project_id: uuid::Uuid,
    /// Display name.
    pub name: String,
    /// Optional goal.
    pub goal: Option<String>,
    /// Start date.
    pub start_date: Option<DateTime<Utc>>,
    /// End date.
    pub end_date: Option<DateTime<Utc>>,
    /// Lifecycle status.
    pub status: String,
    /// Creating user.
    pub created_by: uuid::Uuid,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for sprint records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = sprints)]
pub struct NewSprintRow {
    /// Sprint identifier.
    pub id: uuid::Uuid,
    /// Owning project.
    pub project_id: uuid::Uuid,
    /// Display name.
    pub name: String,
    /// Optional goal.
    pub goal: Option<String>,
    /// Start date.
    pub start_date: Option<DateTime<Utc>>,
    /// End date.
    pub end_date: Option<DateTime<Utc>>,
    /// Lifecycle status.
    pub status: String,
    /// Creating user.
    pub created_by: uuid::Uuid,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Update model for sprint records.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = sprints)]
#[diesel(treat_none_as_null = true)]
pub struct SprintChangeset {
    /// Display name.
    pub name: String,
    /// Optional goal.
    pub goal: Option<String>,
    /// Start date.
    pub start_date: Option<DateTime<Utc>>,
    /// End date.
    pub end_date: Option<DateTime<Utc>>,
    /// Lifecycle status.
    pub status: String,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Query result row for issue records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = issues)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct IssueRow {
    /// Issue identifier.
    pub id: uuid::Uuid,
    /// Owning project.
    pub project_id: uuid::Uuid,
    /// Sequential number within the project.
    pub issue_number: i64,
    /// Rendered `KEY-N` key.
    pub issue_key: String,
    /// Title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Issue type.
    pub issue_type: String,
    /// Board column.
    pub status: String,
    /// Priority.
    pub priority: String,
    /// Optional assignee.
    pub assignee_id: Option<uuid::Uuid>,
    /// Reporting user.
    pub reporter_id: uuid::Uuid,
    /// Sprint membership.
    pub sprint_id: Option<uuid::Uuid>,
    /// Optional estimate.
    pub story_points: Option<i32>,
    /// Labels as a JSON array.
    pub labels: Value,
    /// Activity log as a JSON array.
    pub activities: Value,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for issue records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = issues)]
pub struct NewIssueRow {
    /// Issue identifier.
    pub id: uuid::Uuid,
    /// Owning project.
    pub project_id: uuid::Uuid,
    /// Sequential number within the project.
    pub issue_number: i64,
    /// Rendered `KEY-N` key.
    pub issue_key: String,
    /// Title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Issue type.
    pub issue_type: String,
    /// Board column.
    pub status: String,
    /// Priority.
    pub priority: String,
    /// Optional assignee.
    pub assignee_id: Option<uuid::Uuid>,
    /// Reporting user.
    pub reporter_id: uuid::Uuid,
    /// Sprint membership.
    pub sprint_id: Option<uuid::Uuid>,
    /// Optional estimate.
    pub story_points: Option<i32>,
    /// Labels as a JSON array.
    pub labels: Value,
    /// Activity log as a JSON array.
    pub activities: Value,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Update model for issue records.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = issues)]
#[diesel(treat_none_as_null = true)]
pub struct IssueChangeset {
    /// Title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Issue type.
    pub issue_type: String,
    /// Board column.
    pub status: String,
    /// Priority.
    pub priority: String,
    /// Optional assignee.
    pub assignee_id: Option<uuid::Uuid>,
    /// Sprint membership.
    pub sprint_id: Option<uuid::Uuid>,
    /// Optional estimate.
    pub story_points: Option<i32>,
    /// Labels as a JSON array.
    pub labels: Value,
    /// Activity log as a JSON array.
    pub activities: Value,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Query result row for comment records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = comments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CommentRow {
    /// Comment identifier.
    pub id: uuid::Uuid,
    /// Parent issue.
    pub issue_id: uuid::Uuid,
    /// Authoring user.
    pub author_id: uuid::Uuid,
    /// Body text.
    pub body: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last edit timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for comment records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = comments)]
pub struct NewCommentRow {
    /// Comment identifier.
    pub id: uuid::Uuid,
    /// Parent issue.
    pub issue_id: uuid::Uuid,
    /// Authoring user.
    pub author_id: uuid::Uuid,
    /// Body text.
    pub body: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last edit timestamp.
    pub updated_at: DateTime<Utc>,
}
