//! Conversions between tracker aggregates and Diesel rows.

use super::models::{
    CommentRow, IssueChangeset, IssueRow, NewCommentRow, NewIssueRow, NewProjectRow,
    NewSprintRow, NewUserRow, ProjectChangeset, ProjectRow, SprintChangeset, SprintRow, UserRow,
};
use crate::tracker::{
    domain::{
        ActivityEntry, Comment, CommentId, EmailAddress, Issue, IssueId, IssueKey,
        IssuePriority, IssueStatus, IssueType, PersistedCommentData, PersistedIssueData,
        PersistedProjectData, PersistedSprintData, PersistedUserData, Project, ProjectCategory,
        ProjectId, ProjectKey, Sprint, SprintId, SprintStatus, StoryPoints, User, UserId,
        UserRole,
    },
    ports::{TrackerRepositoryError, TrackerRepositoryResult},
};
use serde_json::Value;

pub(crate) fn user_to_new_row(user: &User) -> NewUserRow {
    NewUserRow {
        id: user.id().into_inner(),
        name: user.name().to_owned(),
        email: user.email().as_str().to_owned(),
        role: user.role().as_str().to_owned(),
        avatar_url: user.avatar_url().map(str::to_owned),
        created_at: user.created_at(),
    }
}

pub(crate) fn row_to_user(row: UserRow) -> TrackerRepositoryResult<User> {
    let UserRow {
        id,
        name,
        email,
        role,
        avatar_url,
        created_at,
    } = row;

    let data = PersistedUserData {
        id: UserId::from_uuid(id),
        name,
        email: EmailAddress::new(email).map_err(TrackerRepositoryError::persistence)?,
        role: UserRole::try_from(role.as_str()).map_err(TrackerRepositoryError::persistence)?,
        avatar_url,
        created_at,
    };
    Ok(User::from_persisted(data))
}

pub(crate) fn project_to_new_row(project: &Project) -> TrackerRepositoryResult<NewProjectRow> {
    Ok(NewProjectRow {
        id: project.id().into_inner(),
        key: project.key().as_str().to_owned(),
        name: project.name().to_owned(),
        description: project.description().map(str::to_owned),
        category: project.category().as_str().to_owned(),
        owner_id: project.owner().into_inner(),
        members: to_json(project.members())?,
        issue_counter: counter_to_column(project.issue_counter())?,
        created_at: project.created_at(),
        updated_at: project.updated_at(),
    })
}

pub(crate) fn project_changeset(project: &Project) -> TrackerRepositoryResult<ProjectChangeset> {
    Ok(ProjectChangeset {
        key: project.key().as_str().to_owned(),
        name: project.name().to_owned(),
        description: project.description().map(str::to_owned),
        category: project.category().as_str().to_owned(),
        members: to_json(project.members())?,
        updated_at: project.updated_at(),
    })
}

pub(crate) fn row_to_project(row: ProjectRow) -> TrackerRepositoryResult<Project> {
    let ProjectRow {
        id,
        key,
        name,
        description,
        category,
        owner_id,
        members,
        issue_counter,
        created_at,
        updated_at,
    } = row;

    let data = PersistedProjectData {
        id: ProjectId::from_uuid(id),
        key: ProjectKey::new(key).map_err(TrackerRepositoryError::persistence)?,
        name,
        description,
        category: ProjectCategory::try_from(category.as_str())
            .map_err(TrackerRepositoryError::persistence)?,
        owner: UserId::from_uuid(owner_id),
        members: from_json::<Vec<UserId>>(members)?,
        issue_counter: u64::try_from(issue_counter)
            .map_err(TrackerRepositoryError::persistence)?,
        created_at,
        updated_at,
    };
    Ok(Project::from_persisted(data))
}

pub(crate) fn sprint_to_new_row(sprint: &Sprint) -> NewSprintRow {
    NewSprintRow {
        id: sprint.id().into_inner(),
        project_id: sprint.project_id().into_inner(),
        name: sprint.name().to_owned(),
        goal: sprint.goal().map(str::to_owned),
        start_date: sprint.start_date(),
        end_date: sprint.end_date(),
        status: sprint.status().as_str().to_owned(),
        created_by: sprint.created_by().into_inner(),
        created_at: sprint.created_at(),
        updated_at: sprint.updated_at(),
    }
}

pub(crate) fn sprint_changeset(sprint: &Sprint) -> SprintChangeset {
    SprintChangeset {
        name: sprint.name().to_owned(),
        goal: sprint.goal().map(str::to_owned),
        start_date: sprint.start_date(),
        end_date: sprint.end_date(),
        status: sprint.status().as_str().to_owned(),
        updated_at: sprint.updated_at(),
    }
}

pub(crate) fn row_to_sprint(row: SprintRow) -> TrackerRepositoryResult<Sprint> {
    let SprintRow {
        id,
        project_id,
        name,
        goal,
        start_date,
        end_date,
        status,
        created_by,
        created_at,
        updated_at,
    } = row;

    let data = PersistedSprintData {
        id: SprintId::from_uuid(id),
        project_id: ProjectId::from_uuid(project_id),
        name,
        goal,
        start_date,
        end_date,
        status: SprintStatus::try_from(status.as_str())
            .map_err(TrackerRepositoryError::persistence)?,
        created_by: UserId::from_uuid(created_by),
        created_at,
        updated_at,
    };
    Ok(Sprint::from_persisted(data))
}

pub(crate) fn issue_to_new_row(issue: &Issue) -> TrackerRepositoryResult<NewIssueRow> {
    let issue_number = i64::try_from(issue.key().number().value())
        .map_err(TrackerRepositoryError::persistence)?;
    Ok(NewIssueRow {
        id: issue.id().into_inner(),
        project_id: issue.project_id().into_inner(),
        issue_number,
        issue_key: issue.key().to_string(),
        title: issue.title().to_owned(),
        description: issue.description().map(str::to_owned),
        issue_type: issue.issue_type().as_str().to_owned(),
        status: issue.status().as_str().to_owned(),
        priority: issue.priority().as_str().to_owned(),
        assignee_id: issue.assignee().map(UserId::into_inner),
        reporter_id: issue.reporter().into_inner(),
        sprint_id: issue.sprint_id().map(SprintId::into_inner),
        story_points: story_points_to_column(issue.story_points())?,
        labels: to_json(issue.labels())?,
        activities: to_json(issue.activities())?,
        created_at: issue.created_at(),
        updated_at: issue.updated_at(),
    })
}

pub(crate) fn issue_changeset(issue: &Issue) -> TrackerRepositoryResult<IssueChangeset> {
    Ok(IssueChangeset {
        title: issue.title().to_owned(),
        description: issue.description().map(str::to_owned),
        issue_type: issue.issue_type().as_str().to_owned(),
        status: issue.status().as_str().to_owned(),
        priority: issue.priority().as_str().to_owned(),
        assignee_id: issue.assignee().map(UserId::into_inner),
        sprint_id: issue.sprint_id().map(SprintId::into_inner),
        story_points: story_points_to_column(issue.story_points())?,
        labels: to_json(issue.labels())?,
        activities: to_json(issue.activities())?,
        updated_at: issue.updated_at(),
    })
}

pub(crate) fn row_to_issue(row: IssueRow) -> TrackerRepositoryResult<Issue> {
    let IssueRow {
        id,
        project_id,
        issue_key,
        title,
        description,
        issue_type,
        status,
        priority,
        assignee_id,
        reporter_id,
        sprint_id,
        story_points,
        labels,
        activities,
        created_at,
        updated_at,
        ..
    } = row;

    let data = PersistedIssueData {
        id: IssueId::from_uuid(id),
        project_id: ProjectId::from_uuid(project_id),
        key: IssueKey::parse(&issue_key).map_err(TrackerRepositoryError::persistence)?,
        title,
        description,
        issue_type: IssueType::try_from(issue_type.as_str())
            .map_err(TrackerRepositoryError::persistence)?,
        status: IssueStatus::try_from(status.as_str())
            .map_err(TrackerRepositoryError::persistence)?,
        priority: IssuePriority::try_from(priority.as_str())
            .map_err(TrackerRepositoryError::persistence)?,
        assignee: assignee_id.map(UserId::from_uuid),
        reporter: UserId::from_uuid(reporter_id),
        sprint_id: sprint_id.map(SprintId::from_uuid),
        story_points: story_points
            .map(|points| StoryPoints::new(i64::from(points)))
            .transpose()
            .map_err(TrackerRepositoryError::persistence)?,
        labels: from_json::<Vec<String>>(labels)?,
        activities: from_json::<Vec<ActivityEntry>>(activities)?,
        created_at,
        updated_at,
    };
    Ok(Issue::from_persisted(data))
}

pub(crate) fn comment_to_new_row(comment: &Comment) -> NewCommentRow {
    NewCommentRow {
        id: comment.id().into_inner(),
        issue_id: comment.issue_id().into_inner(),
        author_id: comment.author().into_inner(),
        body: comment.text().to_owned(),
        created_at: comment.created_at(),
        updated_at: comment.updated_at(),
    }
}

pub(crate) fn row_to_comment(row: CommentRow) -> Comment {
    Comment::from_persisted(PersistedCommentData {
        id: CommentId::from_uuid(row.id),
        issue_id: IssueId::from_uuid(row.issue_id),
        author: UserId::from_uuid(row.author_id),
        text: row.body,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

/// Builds an `ILIKE` pattern matching `needle` anywhere, with wildcards in
/// the needle escaped.
pub(crate) fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for ch in needle.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

pub(crate) fn counter_to_column(counter: u64) -> TrackerRepositoryResult<i64> {
    i64::try_from(counter).map_err(TrackerRepositoryError::persistence)
}

fn story_points_to_column(points: Option<StoryPoints>) -> TrackerRepositoryResult<Option<i32>> {
    points
        .map(|value| i32::try_from(value.value()))
        .transpose()
        .map_err(TrackerRepositoryError::persistence)
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> TrackerRepositoryResult<Value> {
    serde_json::to_value(value).map_err(TrackerRepositoryError::persistence)
}

fn from_json<T: serde::de::DeserializeOwned>(value: Value) -> TrackerRepositoryResult<T> {
    serde_json::from_value(value).map_err(TrackerRepositoryError::persistence)
}
