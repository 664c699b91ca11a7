//! Sprint aggregate root and its forward-only lifecycle.

use super::text::{optional_text, required_text};
use super::{ParseEnumError, ProjectId, SprintId, TrackerDomainError, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sprint lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SprintStatus {
    /// Created, not yet started.
    #[default]
    Planned,
    /// Currently running.
    Active,
    /// Finished.
    Completed,
}

impl SprintStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Planned => "planned",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }

    /// Returns `true` when moving from `self` to `target` is permitted.
    ///
    /// Only `planned -> active` and `active -> completed` are allowed.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Planned, Self::Active) | (Self::Active, Self::Completed)
        )
    }

    /// Returns `true` for the terminal status.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl TryFrom<&str> for SprintStatus {
    type Error = ParseEnumError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "planned" => Ok(Self::Planned),
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            _ => Err(ParseEnumError::new("sprint status", value)),
        }
    }
}

impl fmt::Display for SprintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Partial update for sprint details. Status is never patched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SprintPatch {
    /// New name.
    pub name: Option<String>,
    /// New goal; a blank string clears it.
    pub goal: Option<String>,
    /// New start date, or `Some(None)` to clear it.
    pub start_date: Option<Option<DateTime<Utc>>>,
    /// New end date, or `Some(None)` to clear it.
    pub end_date: Option<Option<DateTime<Utc>>>,
}

/// Sprint aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sprint {
    id: SprintId,
    project_id: ProjectId,
    name: String,
    goal: Option<String>,
    start_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
    status: SprintStatus,
    created_by: UserId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted sprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedSprintData {
    /// Persisted identifier.
    pub id: SprintId,
    /// Owning project.
    pub project_id: ProjectId,
    /// Name.
    pub name: String,
    /// Goal.
    pub goal: Option<String>,
    /// Start date.
    pub start_date: Option<DateTime<Utc>>,
    /// End date.
    pub end_date: Option<DateTime<Utc>>,
    /// Lifecycle status.
    pub status: SprintStatus,
    /// Creating user.
    pub created_by: UserId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Latest update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Sprint {
    /// Creates a planned sprint.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerDomainError::EmptyField`] for a blank name.
    pub fn new(
        project_id: ProjectId,
        name: impl Into<String>,
        created_by: UserId,
        clock: &impl Clock,
    ) -> Result<Self, TrackerDomainError> {
        let timestamp = clock.utc();
        Ok(Self {
            id: SprintId::new(),
            project_id,
            name: required_text(name.into(), "sprint name")?,
            goal: None,
            start_date: None,
            end_date: None,
            status: SprintStatus::Planned,
            created_by,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Sets the goal; blank values clear it.
    #[must_use]
    pub fn with_goal(mut self, goal: impl Into<String>) -> Self {
        self.goal = optional_text(goal.into());
        self
    }

    /// Sets planned dates.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerDomainError::InvalidSprintDates`] when the end date
    /// precedes the start date.
    pub fn with_dates(
        mut self,
        start_date: Option<DateTime<Utc>>,
        end_date: Option<DateTime<Utc>>,
    ) -> Result<Self, TrackerDomainError> {
        ensure_date_order(start_date, end_date)?;
        self.start_date = start_date;
        self.end_date = end_date;
        Ok(self)
    }

    /// Reconstructs a sprint from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedSprintData) -> Self {
        Self {
            id: data.id,
            project_id: data.project_id,
            name: data.name,
            goal: data.goal,
            start_date: data.start_date,
            end_date: data.end_date,
            status: data.status,
            created_by: data.created_by,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the sprint identifier.
    #[must_use]
    pub const fn id(&self) -> SprintId {
        self.id
    }

    /// Returns the owning project.
    #[must_use]
    pub const fn project_id(&self) -> ProjectId {
        self.project_id
    }

    /// Returns the name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the goal, if any.
    #[must_use]
    pub fn goal(&self) -> Option<&str> {
        self.goal.as_deref()
    }

    /// Returns the start date, if set.
    #[must_use]
    pub const fn start_date(&self) -> Option<DateTime<Utc>> {
        self.start_date
    }

    /// Returns the end date, if set.
    #[must_use]
    pub const fn end_date(&self) -> Option<DateTime<Utc>> {
        self.end_date
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> SprintStatus {
        self.status
    }

    /// Returns the creating user.
    #[must_use]
    pub const fn created_by(&self) -> UserId {
        self.created_by
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

    /// Starts the sprint, stamping the start date with the current time.
    ///
    /// A planned end date that is already in the past is cleared.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerDomainError::InvalidSprintTransition`] unless the
    /// sprint is planned.
    pub fn start(&mut self, clock: &impl Clock) -> Result<(), TrackerDomainError> {
        self.transition_to(SprintStatus::Active)?;
        let timestamp = clock.utc();
        self.start_date = Some(timestamp);
        if self.end_date.is_some_and(|end| end < timestamp) {
            self.end_date = None;
        }
        self.updated_at = timestamp;
        Ok(())
    }

    /// Completes the sprint, stamping the end date with the current time.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerDomainError::InvalidSprintTransition`] unless the
    /// sprint is active.
    pub fn complete(&mut self, clock: &impl Clock) -> Result<(), TrackerDomainError> {
        self.transition_to(SprintStatus::Completed)?;
        let timestamp = clock.utc();
        self.end_date = Some(timestamp);
        self.updated_at = timestamp;
        Ok(())
    }

    /// Applies a partial update to the sprint details.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerDomainError::EmptyField`] for a blank name or
    /// [`TrackerDomainError::InvalidSprintDates`] when a patched date leaves
    /// the end date before the start date. The sprint is left untouched on
    /// error.
    pub fn apply_patch(
        &mut self,
        patch: SprintPatch,
        clock: &impl Clock,
    ) -> Result<(), TrackerDomainError> {
        let SprintPatch {
            name,
            goal,
            start_date,
            end_date,
        } = patch;
        let new_name = name
            .map(|value| required_text(value, "sprint name"))
            .transpose()?;
        let dates_patched = start_date.is_some() || end_date.is_some();
        let next_start = start_date.unwrap_or(self.start_date);
        let next_end = end_date.unwrap_or(self.end_date);
        if dates_patched {
            ensure_date_order(next_start, next_end)?;
        }

        if let Some(value) = new_name {
            self.name = value;
        }
        if let Some(value) = goal {
            self.goal = optional_text(value);
        }
        self.start_date = next_start;
        self.end_date = next_end;
        self.updated_at = clock.utc();
        Ok(())
    }

    fn transition_to(&mut self, target: SprintStatus) -> Result<(), TrackerDomainError> {
        if !self.status.can_transition_to(target) {
            return Err(TrackerDomainError::InvalidSprintTransition {
                sprint_id: self.id,
                from: self.status,
                to: target,
            });
        }
        self.status = target;
        Ok(())
    }
}

fn ensure_date_order(
    start_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
) -> Result<(), TrackerDomainError> {
    if let (Some(start), Some(end)) = (start_date, end_date) {
        if end < start {
            return Err(TrackerDomainError::InvalidSprintDates);
        }
    }
    Ok(())
}
