//! Project aggregate root and membership rules.

use super::text::{optional_text, required_text};
use super::{IssueKey, IssueNumber, ParseEnumError, ProjectId, ProjectKey, TrackerDomainError, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Broad project category shown on project listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectCategory {
    /// Software delivery.
    #[default]
    Software,
    /// Marketing campaigns.
    Marketing,
    /// Business operations.
    Business,
    /// Design work.
    Design,
}

impl ProjectCategory {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Software => "software",
            Self::Marketing => "marketing",
            Self::Business => "business",
            Self::Design => "design",
        }
    }
}

impl TryFrom<&str> for ProjectCategory {
    type Error = ParseEnumError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "software" => Ok(Self::Software),
            "marketing" => Ok(Self::Marketing),
            "business" => Ok(Self::Business),
            "design" => Ok(Self::Design),
            _ => Err(ParseEnumError::new("project category", value)),
        }
    }
}

impl fmt::Display for ProjectCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Partial update for a project. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectPatch {
    /// New key; rejected once the project has issues.
    pub key: Option<ProjectKey>,
    /// New name.
    pub name: Option<String>,
    /// New description; a blank string clears it.
    pub description: Option<String>,
    /// New category.
    pub category: Option<ProjectCategory>,
}

/// Project aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    id: ProjectId,
    key: ProjectKey,
    name: String,
    description: Option<String>,
    category: ProjectCategory,
    owner: UserId,
    members: Vec<UserId>,
    issue_counter: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedProjectData {
    /// Persisted identifier.
    pub id: ProjectId,
    /// Issue-key prefix.
    pub key: ProjectKey,
    /// Display name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Category.
    pub category: ProjectCategory,
    /// Owning user.
    pub owner: UserId,
    /// Member set, owner included.
    pub members: Vec<UserId>,
    /// Number of issues ever created in the project.
    pub issue_counter: u64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Latest update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Creates a new project owned by `owner`, who becomes its first member.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerDomainError::EmptyField`] when the name is blank.
    pub fn new(
        key: ProjectKey,
        name: impl Into<String>,
        owner: UserId,
        clock: &impl Clock,
    ) -> Result<Self, TrackerDomainError> {
        let timestamp = clock.utc();
        Ok(Self {
            id: ProjectId::new(),
            key,
            name: required_text(name.into(), "project name")?,
            description: None,
            category: ProjectCategory::default(),
            owner,
            members: vec![owner],
            issue_counter: 0,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Sets the description; blank values clear it.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = optional_text(description.into());
        self
    }

    /// Sets the category.
    #[must_use]
    pub const fn with_category(mut self, category: ProjectCategory) -> Self {
        self.category = category;
        self
    }

    /// Reconstructs a project from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedProjectData) -> Self {
        Self {
            id: data.id,
            key: data.key,
            name: data.name,
            description: data.description,
            category: data.category,
            owner: data.owner,
            members: data.members,
            issue_counter: data.issue_counter,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the project identifier.
    #[must_use]
    pub const fn id(&self) -> ProjectId {
        self.id
    }

    /// Returns the issue-key prefix.
    #[must_use]
    pub const fn key(&self) -> &ProjectKey {
        &self.key
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the category.
    #[must_use]
    pub const fn category(&self) -> ProjectCategory {
        self.category
    }

    /// Returns the owning user.
    #[must_use]
    pub const fn owner(&self) -> UserId {
        self.owner
    }

    /// Returns the member set in insertion order.
    #[must_use]
    pub fn members(&self) -> &[UserId] {
        &self.members
    }

    /// Returns `true` when `user_id` is a member.
    #[must_use]
    pub fn is_member(&self, user_id: UserId) -> bool {
        self.members.contains(&user_id)
    }

    /// Returns the number of issues ever created in this project.
    #[must_use]
    pub const fn issue_counter(&self) -> u64 {
        self.issue_counter
    }

    /// Returns `true` once any issue has been created, even if since deleted.
    #[must_use]
    pub const fn has_issues(&self) -> bool {
        self.issue_counter > 0
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

    /// Advances the issue counter and returns the key for the next issue.
    ///
    /// Numbers are never handed out twice, so deleting an issue leaves a gap.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerDomainError::InvalidIssueNumber`] if the counter
    /// would exceed the persisted range.
    pub fn allocate_issue_key(&mut self) -> Result<IssueKey, TrackerDomainError> {
        let next = self.issue_counter.saturating_add(1);
        let number = IssueNumber::new(next)?;
        self.issue_counter = next;
        Ok(IssueKey::new(self.key.clone(), number))
    }

    /// Overwrites the issue counter with the store's authoritative value.
    pub(crate) const fn sync_issue_counter(&mut self, issue_counter: u64) {
        self.issue_counter = issue_counter;
    }

    /// Applies a partial update.
    ///
    /// Validation happens before any field changes, so a rejected patch
    /// leaves the project untouched.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerDomainError::ProjectKeyLocked`] when the key would
    /// change after issues exist, or [`TrackerDomainError::EmptyField`] for a
    /// blank name.
    pub fn apply_patch(
        &mut self,
        patch: ProjectPatch,
        clock: &impl Clock,
    ) -> Result<(), TrackerDomainError> {
        let ProjectPatch {
            key,
            name,
            description,
            category,
        } = patch;

        let new_key = key.filter(|candidate| *candidate != self.key);
        if new_key.is_some() && self.has_issues() {
            return Err(TrackerDomainError::ProjectKeyLocked(self.id));
        }
        let new_name = name
            .map(|value| required_text(value, "project name"))
            .transpose()?;

        if let Some(value) = new_key {
            self.key = value;
        }
        if let Some(value) = new_name {
            self.name = value;
        }
        if let Some(value) = description {
            self.description = optional_text(value);
        }
        if let Some(value) = category {
            self.category = value;
        }
        self.touch(clock);
        Ok(())
    }

    /// Adds a member. Returns `false` when the user was already a member.
    pub fn add_member(&mut self, user_id: UserId, clock: &impl Clock) -> bool {
        if self.is_member(user_id) {
            return false;
        }
        self.members.push(user_id);
        self.touch(clock);
        true
    }

    /// Removes a non-owner member. Returns `false` when the user was not a
    /// member or is the owner.
    pub fn remove_member(&mut self, user_id: UserId, clock: &impl Clock) -> bool {
        if user_id == self.owner || !self.is_member(user_id) {
            return false;
        }
        self.members.retain(|member| *member != user_id);
        self.touch(clock);
        true
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
