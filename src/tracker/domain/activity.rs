//! Append-only activity entries embedded in each issue.

use super::{ActivityId, IssueStatus, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What happened in an activity entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActivityKind {
    /// The issue was created.
    Created,
    /// The issue moved between status columns.
    StatusChanged {
        /// Status before the change.
        from: IssueStatus,
        /// Status after the change.
        to: IssueStatus,
    },
    /// The assignee changed. `None` records an unassignment.
    Assigned {
        /// New assignee.
        assignee: Option<UserId>,
    },
}

impl ActivityKind {
    /// Returns the wire name of the entry type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::StatusChanged { .. } => "status_changed",
            Self::Assigned { .. } => "assigned",
        }
    }

    fn describe(self) -> String {
        match self {
            Self::Created => "created this issue".to_owned(),
            Self::StatusChanged { from, to } => format!("changed status from {from} to {to}"),
            Self::Assigned {
                assignee: Some(user_id),
            } => format!("assigned to {user_id}"),
            Self::Assigned { assignee: None } => "unassigned".to_owned(),
        }
    }
}

/// Whether clearing an assignee records an `assigned` entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnassignmentLogging {
    /// Only assignments to a user are logged.
    #[default]
    Skip,
    /// Unassignments are logged as `assigned` entries with no assignee.
    Record,
}

/// Single immutable entry in an issue's activity log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEntry {
    id: ActivityId,
    #[serde(flatten)]
    kind: ActivityKind,
    actor_id: UserId,
    description: String,
    timestamp: DateTime<Utc>,
}

impl ActivityEntry {
    /// Creates an entry with a generated description.
    #[must_use]
    pub fn new(kind: ActivityKind, actor_id: UserId, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: ActivityId::new(),
            kind,
            actor_id,
            description: kind.describe(),
            timestamp,
        }
    }

    /// Returns the entry identifier.
    #[must_use]
    pub const fn id(&self) -> ActivityId {
        self.id
    }

    /// Returns what happened.
    #[must_use]
    pub const fn kind(&self) -> ActivityKind {
        self.kind
    }

    /// Returns the user who caused the entry.
    #[must_use]
    pub const fn actor_id(&self) -> UserId {
        self.actor_id
    }

    /// Returns the human-readable description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns when the entry was recorded.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}
