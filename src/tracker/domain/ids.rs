//! Identifier and validated scalar types for the tracker domain.

use super::TrackerDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! uuid_identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an identifier from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the wrapped UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl AsRef<Uuid> for $name {
            fn as_ref(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

uuid_identifier!(
    /// Unique identifier for a registered user.
    UserId
);
uuid_identifier!(
    /// Unique identifier for a project.
    ProjectId
);
uuid_identifier!(
    /// Unique identifier for an issue record.
    IssueId
);
uuid_identifier!(
    /// Unique identifier for a sprint.
    SprintId
);
uuid_identifier!(
    /// Unique identifier for an issue comment.
    CommentId
);
uuid_identifier!(
    /// Unique identifier for an activity log entry.
    ActivityId
);

/// Maximum number of letters in a project key.
const MAX_PROJECT_KEY_LENGTH: usize = 10;

/// Short uppercase project key used as the issue-key prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProjectKey(String);

impl ProjectKey {
    /// Creates a validated project key.
    ///
    /// The input is trimmed and uppercased before validation.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerDomainError::InvalidProjectKey`] when the key is
    /// empty, longer than ten characters, or contains anything other than
    /// ASCII letters.
    pub fn new(value: impl Into<String>) -> Result<Self, TrackerDomainError> {
        let raw = value.into();
        let normalized = raw.trim().to_ascii_uppercase();
        let is_valid = !normalized.is_empty()
            && normalized.len() <= MAX_PROJECT_KEY_LENGTH
            && normalized.chars().all(|c| c.is_ascii_uppercase());

        if !is_valid {
            return Err(TrackerDomainError::InvalidProjectKey(raw));
        }
        Ok(Self(normalized))
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ProjectKey {
    type Error = TrackerDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ProjectKey> for String {
    fn from(value: ProjectKey) -> Self {
        value.0
    }
}

impl AsRef<str> for ProjectKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for ProjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One-based sequential issue number within a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IssueNumber(u64);

impl IssueNumber {
    /// Largest issue number representable in the `PostgreSQL` schema.
    const MAX_PERSISTED_VALUE: u64 = i64::MAX as u64;

    /// Creates a validated issue number.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerDomainError::InvalidIssueNumber`] when the value is
    /// zero or exceeds `i64::MAX`.
    pub const fn new(value: u64) -> Result<Self, TrackerDomainError> {
        if value == 0 || value > Self::MAX_PERSISTED_VALUE {
            return Err(TrackerDomainError::InvalidIssueNumber(value));
        }
        Ok(Self(value))
    }

    /// Returns the underlying numeric value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for IssueNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Human-readable issue key in `{ProjectKey}-{N}` form, e.g. `DEMO-7`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IssueKey {
    project_key: ProjectKey,
    number: IssueNumber,
}

impl IssueKey {
    /// Creates an issue key from validated parts.
    #[must_use]
    pub const fn new(project_key: ProjectKey, number: IssueNumber) -> Self {
        Self {
            project_key,
            number,
        }
    }

    /// Parses an issue key such as `DEMO-7`.
    ///
    /// Lowercase prefixes are accepted and normalized.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerDomainError::InvalidIssueKey`] when the value does
    /// not split into a valid project key and positive number.
    pub fn parse(value: &str) -> Result<Self, TrackerDomainError> {
        let invalid = || TrackerDomainError::InvalidIssueKey(value.to_owned());
        let (prefix, suffix) = value.trim().rsplit_once('-').ok_or_else(invalid)?;
        let project_key = ProjectKey::new(prefix).map_err(|_| invalid())?;
        let raw_number = suffix.parse::<u64>().map_err(|_| invalid())?;
        let number = IssueNumber::new(raw_number).map_err(|_| invalid())?;
        Ok(Self::new(project_key, number))
    }

    /// Returns the project key prefix.
    #[must_use]
    pub const fn project_key(&self) -> &ProjectKey {
        &self.project_key
    }

    /// Returns the sequential number.
    #[must_use]
    pub const fn number(&self) -> IssueNumber {
        self.number
    }
}

impl TryFrom<String> for IssueKey {
    type Error = TrackerDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<IssueKey> for String {
    fn from(value: IssueKey) -> Self {
        value.to_string()
    }
}

impl fmt::Display for IssueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.project_key, self.number)
    }
}

/// Positive story-point estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct StoryPoints(u32);

impl StoryPoints {
    /// Creates a validated story-point estimate.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerDomainError::InvalidStoryPoints`] when the value is
    /// not a positive integer that fits in `u32`.
    pub fn new(value: i64) -> Result<Self, TrackerDomainError> {
        match u32::try_from(value) {
            Ok(points) if points > 0 => Ok(Self(points)),
            _ => Err(TrackerDomainError::InvalidStoryPoints(value)),
        }
    }

    /// Returns the estimate.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl TryFrom<i64> for StoryPoints {
    type Error = TrackerDomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<StoryPoints> for i64 {
    fn from(value: StoryPoints) -> Self {
        Self::from(value.0)
    }
}

impl fmt::Display for StoryPoints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
