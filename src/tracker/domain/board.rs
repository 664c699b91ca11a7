//! Read models for the kanban board, the backlog, and project summaries.

use super::{Issue, IssueStatus, Sprint, SprintStatus};
use serde::Serialize;

/// Issues in one board column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardColumn {
    /// Column status.
    pub status: IssueStatus,
    /// Issues in key order.
    pub issues: Vec<Issue>,
}

/// Kanban board grouping issues into the four status columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Board {
    columns: Vec<BoardColumn>,
}

impl Board {
    /// Groups `issues` into columns in [`IssueStatus::ALL`] order.
    #[must_use]
    pub fn from_issues(issues: Vec<Issue>) -> Self {
        let mut columns: Vec<BoardColumn> = IssueStatus::ALL
            .into_iter()
            .map(|status| BoardColumn {
                status,
                issues: Vec::new(),
            })
            .collect();

        for issue in sorted_by_key(issues) {
            if let Some(column) = columns
                .iter_mut()
                .find(|column| column.status == issue.status())
            {
                column.issues.push(issue);
            }
        }
        Self { columns }
    }

    /// Returns every column in board order.
    #[must_use]
    pub fn columns(&self) -> &[BoardColumn] {
        &self.columns
    }

    /// Returns the issues in one column.
    #[must_use]
    pub fn column(&self, status: IssueStatus) -> &[Issue] {
        self.columns
            .iter()
            .find(|column| column.status == status)
            .map(|column| column.issues.as_slice())
            .unwrap_or_default()
    }
}

/// A sprint together with the issues assigned to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SprintLane {
    /// The sprint.
    pub sprint: Sprint,
    /// Its issues in key order.
    pub issues: Vec<Issue>,
}

/// Backlog planning view for one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BacklogView {
    /// The running sprint, if any.
    pub active: Option<SprintLane>,
    /// Sprints not yet started, oldest first.
    pub planned: Vec<SprintLane>,
    /// Issues without a sprint.
    pub backlog: Vec<Issue>,
}

impl BacklogView {
    /// Distributes a project's issues across its sprints and the backlog.
    ///
    /// Issues in completed sprints are not shown.
    #[must_use]
    pub fn assemble(sprints: Vec<Sprint>, issues: Vec<Issue>) -> Self {
        let mut remaining = sorted_by_key(issues);
        let mut take_lane = |sprint: Sprint| {
            let (lane_issues, rest): (Vec<Issue>, Vec<Issue>) = remaining
                .drain(..)
                .partition(|issue| issue.sprint_id() == Some(sprint.id()));
            remaining = rest;
            SprintLane {
                sprint,
                issues: lane_issues,
            }
        };

        let mut active = None;
        let mut planned = Vec::new();
        let mut ordered = sprints;
        ordered.sort_by_key(Sprint::created_at);
        for sprint in ordered {
            match sprint.status() {
                SprintStatus::Active => active = Some(take_lane(sprint)),
                SprintStatus::Planned => planned.push(take_lane(sprint)),
                SprintStatus::Completed => {}
            }
        }

        let backlog = remaining
            .into_iter()
            .filter(Issue::is_in_backlog)
            .collect();
        Self {
            active,
            planned,
            backlog,
        }
    }
}

/// Issue counts per status for a project.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProjectStats {
    /// All issues.
    pub total: usize,
    /// Issues in `todo`.
    pub todo: usize,
    /// Issues in `in-progress`.
    pub in_progress: usize,
    /// Issues in `in-review`.
    pub in_review: usize,
    /// Issues in `done`.
    pub done: usize,
}

impl ProjectStats {
    /// Counts `issues` by status.
    #[must_use]
    pub fn from_issues(issues: &[Issue]) -> Self {
        issues.iter().fold(Self::default(), |mut stats, issue| {
            stats.total += 1;
            match issue.status() {
                IssueStatus::Todo => stats.todo += 1,
                IssueStatus::InProgress => stats.in_progress += 1,
                IssueStatus::InReview => stats.in_review += 1,
                IssueStatus::Done => stats.done += 1,
            }
            stats
        })
    }
}

fn sorted_by_key(mut issues: Vec<Issue>) -> Vec<Issue> {
    issues.sort_by_key(|issue| issue.key().number());
    issues
}
