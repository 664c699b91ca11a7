//! Shared world state for issue workflow BDD scenarios.

use std::sync::Arc;

use mockable::DefaultClock;
use rstest::fixture;
use trackwell::tracker::{
    adapters::memory::InMemoryTrackerStore,
    domain::{ActorContext, Issue, IssueKey, Project},
    services::{
        IssueLifecycleService, ProjectService, TrackerServiceResult, UserDirectoryService,
    },
};

/// Scenario world for issue workflow behaviour tests.
pub struct IssueWorkflowWorld {
    pub users: UserDirectoryService<InMemoryTrackerStore, DefaultClock>,
    pub projects: ProjectService<InMemoryTrackerStore, DefaultClock>,
    pub issues: IssueLifecycleService<InMemoryTrackerStore, DefaultClock>,
    pub actor: Option<ActorContext>,
    pub project: Option<Project>,
    pub created: Vec<Issue>,
    pub last_result: Option<TrackerServiceResult<Issue>>,
}

impl IssueWorkflowWorld {
    /// Creates a world backed by an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        let store = Arc::new(InMemoryTrackerStore::new());
        let clock = Arc::new(DefaultClock);
        Self {
            users: UserDirectoryService::new(Arc::clone(&store), Arc::clone(&clock)),
            projects: ProjectService::new(Arc::clone(&store), Arc::clone(&clock)),
            issues: IssueLifecycleService::new(store, clock),
            actor: None,
            project: None,
            created: Vec::new(),
            last_result: None,
        }
    }

    /// Returns the acting user established by a given step.
    ///
    /// # Errors
    ///
    /// Returns an error when no actor has been registered.
    pub fn actor(&self) -> Result<&ActorContext, eyre::Report> {
        self.actor
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing actor in scenario world"))
    }

    /// Returns the project established by a given step.
    ///
    /// # Errors
    ///
    /// Returns an error when no project has been created.
    pub fn project(&self) -> Result<&Project, eyre::Report> {
        self.project
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing project in scenario world"))
    }

    /// Loads the current state of an issue by its key.
    ///
    /// # Errors
    ///
    /// Returns an error when the key is malformed or the issue is missing.
    pub fn issue(&self, key: &str) -> Result<Issue, eyre::Report> {
        let issue_key = IssueKey::parse(key)?;
        run_async(self.issues.find_by_key(&issue_key))?
            .ok_or_else(|| eyre::eyre!("issue {key} not found"))
    }
}

impl Default for IssueWorkflowWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> IssueWorkflowWorld {
    IssueWorkflowWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
