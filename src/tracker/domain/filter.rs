//! Issue query filters shared by every repository adapter.

use super::{Issue, IssueStatus, IssueType, ProjectId, SprintId, UserId};

/// Sprint membership constraint for issue queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SprintScope {
    /// Issues not assigned to any sprint.
    Backlog,
    /// Issues in the given sprint.
    Sprint(SprintId),
}

/// Conjunctive filter over issues. Unset fields match everything.
///
/// # Examples
///
/// ```
/// use trackwell::tracker::domain::{IssueFilter, IssueStatus, ProjectId};
///
/// let project_id = ProjectId::new();
/// let filter = IssueFilter::for_project(project_id).with_status(IssueStatus::Todo);
/// assert_eq!(filter.project_id, Some(project_id));
/// assert_eq!(filter.status, Some(IssueStatus::Todo));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueFilter {
    /// Owning project.
    pub project_id: Option<ProjectId>,
    /// Board column.
    pub status: Option<IssueStatus>,
    /// Assigned user.
    pub assignee: Option<UserId>,
    /// Issue type.
    pub issue_type: Option<IssueType>,
    /// Sprint membership.
    pub sprint: Option<SprintScope>,
    /// Case-insensitive substring over title, description, and key.
    pub search: Option<String>,
}

impl IssueFilter {
    /// Creates a filter that matches every issue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a filter restricted to one project.
    #[must_use]
    pub fn for_project(project_id: ProjectId) -> Self {
        Self {
            project_id: Some(project_id),
            ..Self::default()
        }
    }

    /// Restricts to a board column.
    #[must_use]
    pub const fn with_status(mut self, status: IssueStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Restricts to an assignee.
    #[must_use]
    pub const fn with_assignee(mut self, assignee: UserId) -> Self {
        self.assignee = Some(assignee);
        self
    }

    /// Restricts to an issue type.
    #[must_use]
    pub const fn with_type(mut self, issue_type: IssueType) -> Self {
        self.issue_type = Some(issue_type);
        self
    }

    /// Restricts by sprint membership.
    #[must_use]
    pub const fn with_sprint(mut self, sprint: SprintScope) -> Self {
        self.sprint = Some(sprint);
        self
    }

    /// Restricts by free-text search; blank input is ignored.
    #[must_use]
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        let value = search.into();
        let trimmed = value.trim();
        self.search = (!trimmed.is_empty()).then(|| trimmed.to_owned());
        self
    }

    /// Returns `true` when `issue` satisfies every set constraint.
    #[must_use]
    pub fn matches(&self, issue: &Issue) -> bool {
        let sprint_matches = match self.sprint {
            None => true,
            Some(SprintScope::Backlog) => issue.is_in_backlog(),
            Some(SprintScope::Sprint(sprint_id)) => issue.sprint_id() == Some(sprint_id),
        };

        self.project_id.is_none_or(|id| issue.project_id() == id)
            && self.status.is_none_or(|status| issue.status() == status)
            && self
                .assignee
                .is_none_or(|assignee| issue.assignee() == Some(assignee))
            && self.issue_type.is_none_or(|kind| issue.issue_type() == kind)
            && sprint_matches
            && self
                .search
                .as_deref()
                .is_none_or(|needle| issue.matches_text(needle))
    }
}
