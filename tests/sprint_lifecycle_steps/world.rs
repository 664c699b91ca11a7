//! Shared world state for sprint lifecycle BDD scenarios.

use std::sync::Arc;

use mockable::DefaultClock;
use rstest::fixture;
use trackwell::tracker::{
    adapters::memory::InMemoryTrackerStore,
    domain::{ActorContext, Project, Sprint},
    services::{
        IssueLifecycleService, ProjectService, SprintLifecycleService, TrackerServiceResult,
        UserDirectoryService,
    },
};

/// Scenario world for sprint lifecycle behaviour tests.
pub struct SprintWorld {
    pub users: UserDirectoryService<InMemoryTrackerStore, DefaultClock>,
    pub projects: ProjectService<InMemoryTrackerStore, DefaultClock>,
    pub issues: IssueLifecycleService<InMemoryTrackerStore, DefaultClock>,
    pub sprints: SprintLifecycleService<InMemoryTrackerStore, DefaultClock>,
    pub actor: Option<ActorContext>,
    pub project: Option<Project>,
    pub last_result: Option<TrackerServiceResult<Sprint>>,
}

impl SprintWorld {
    /// Creates a world backed by an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        let store = Arc::new(InMemoryTrackerStore::new());
        let clock = Arc::new(DefaultClock);
        Self {
            users: UserDirectoryService::new(Arc::clone(&store), Arc::clone(&clock)),
            projects: ProjectService::new(Arc::clone(&store), Arc::clone(&clock)),
            issues: IssueLifecycleService::new(Arc::clone(&store), Arc::clone(&clock)),
            sprints: SprintLifecycleService::new(store, clock),
            actor: None,
            project: None,
            last_result: None,
        }
    }

    /// Returns the acting user established by a given step.
    ///
    /// # Errors
    ///
    /// Returns an error when no actor has been registered.
    pub fn actor(&self) -> Result<ActorContext, eyre::Report> {
        self.actor
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

    /// Loads the current state of a sprint by name.
    ///
    /// # Errors
    ///
    /// Returns an error when no sprint of the project carries `name`.
    pub fn sprint(&self, name: &str) -> Result<Sprint, eyre::Report> {
        let project_id = self.project()?.id();
        run_async(self.sprints.list_for_project(project_id))?
            .into_iter()
            .find(|sprint| sprint.name() == name)
            .ok_or_else(|| eyre::eyre!("sprint {name} not found"))
    }
}

impl Default for SprintWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> SprintWorld {
    SprintWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
