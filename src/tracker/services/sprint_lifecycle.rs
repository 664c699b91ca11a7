//! Sprint lifecycle orchestration: planning, starting and completing sprints.

use super::error::{TrackerServiceError, TrackerServiceResult, found, require_actor};
use crate::tracker::{
    config::WorkflowConfig,
    domain::{ActorContext, ProjectId, Sprint, SprintId, SprintPatch, SprintStatus},
    ports::{RecordRef, TrackerStore},
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::sync::Arc;
use tracing::{info, warn};

/// Request payload for planning a sprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateSprintRequest {
    project_id: ProjectId,
    name: String,
    goal: Option<String>,
    start_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
}

impl CreateSprintRequest {
    /// Creates a request with the required fields.
    #[must_use]
    pub fn new(project_id: ProjectId, name: impl Into<String>) -> Self {
        Self {
            project_id,
            name: name.into(),
            goal: None,
            start_date: None,
            end_date: None,
        }
    }

    /// Sets the sprint goal.
    #[must_use]
    pub fn with_goal(mut self, goal: impl Into<String>) -> Self {
        self.goal = Some(goal.into());
        self
    }

    /// Sets the planned dates.
    #[must_use]
    pub const fn with_dates(
        mut self,
        start_date: Option<DateTime<Utc>>,
        end_date: Option<DateTime<Utc>>,
    ) -> Self {
        self.start_date = start_date;
        self.end_date = end_date;
        self
    }
}

/// Sprint lifecycle orchestration service.
#[derive(Clone)]
pub struct SprintLifecycleService<S, C>
where
    S: TrackerStore,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    clock: Arc<C>,
    config: WorkflowConfig,
}

impl<S, C> SprintLifecycleService<S, C>
where
    S: TrackerStore,
    C: Clock + Send + Sync,
{
    /// Creates a service with the default workflow configuration.
    #[must_use]
    pub fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        Self::with_config(store, clock, WorkflowConfig::default())
    }

    /// Creates a service with an explicit workflow configuration.
    #[must_use]
    pub const fn with_config(store: Arc<S>, clock: Arc<C>, config: WorkflowConfig) -> Self {
        Self {
            store,
            clock,
            config,
        }
    }

    /// Plans a new sprint for a project.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerServiceError::Unauthenticated`] without an actor,
    /// [`TrackerServiceError::NotFound`] for a missing project, or a domain
    /// error for a blank name or inverted dates.
    pub async fn create(
        &self,
        actor: &ActorContext,
        request: CreateSprintRequest,
    ) -> TrackerServiceResult<Sprint> {
        let created_by = require_actor(actor, "create sprint")?;
        found(
            self.store.find_project(request.project_id).await?,
            RecordRef::Project(request.project_id),
        )?;

        let mut sprint = Sprint::new(request.project_id, request.name, created_by, &*self.clock)?
            .with_dates(request.start_date, request.end_date)?;
        if let Some(goal) = request.goal {
            sprint = sprint.with_goal(goal);
        }
        self.store.store_sprint(&sprint).await?;
        info!(
            sprint_id = %sprint.id(),
            project_id = %sprint.project_id(),
            "sprint planned"
        );
        Ok(sprint)
    }

    /// Starts a planned sprint.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerServiceError::NotFound`] for a missing sprint,
    /// [`TrackerServiceError::ActiveSprintExists`] when another sprint of the
    /// project is running and the workflow enforces a single active sprint,
    /// or [`crate::tracker::domain::TrackerDomainError::InvalidSprintTransition`]
    /// unless the sprint is planned.
    pub async fn start(
        &self,
        actor: &ActorContext,
        sprint_id: SprintId,
    ) -> TrackerServiceResult<Sprint> {
        require_actor(actor, "start sprint")?;
        let mut sprint = self.load_sprint(sprint_id).await?;

        if self.config.enforce_single_active_sprint && sprint.status() == SprintStatus::Planned {
            if let Some(active) = self.active_sprint(sprint.project_id()).await? {
                warn!(
                    sprint_id = %sprint_id,
                    active_sprint_id = %active.id(),
                    "sprint start rejected; another sprint is active"
                );
                return Err(TrackerServiceError::ActiveSprintExists {
                    project_id: sprint.project_id(),
                    active_sprint_id: active.id(),
                });
            }
        }

        if let Err(err) = sprint.start(&*self.clock) {
            warn!(sprint_id = %sprint_id, error = %err, "sprint start rejected");
            return Err(err.into());
        }
        self.store.update_sprint(&sprint).await?;
        info!(sprint_id = %sprint_id, project_id = %sprint.project_id(), "sprint started");
        Ok(sprint)
    }

    /// Completes an active sprint.
    ///
    /// Issues keep their sprint reference; the backlog view hides them.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerServiceError::NotFound`] for a missing sprint or
    /// [`crate::tracker::domain::TrackerDomainError::InvalidSprintTransition`]
    /// unless the sprint is active.
    pub async fn complete(
        &self,
        actor: &ActorContext,
        sprint_id: SprintId,
    ) -> TrackerServiceResult<Sprint> {
        require_actor(actor, "complete sprint")?;
        let mut sprint = self.load_sprint(sprint_id).await?;

        if let Err(err) = sprint.complete(&*self.clock) {
            warn!(sprint_id = %sprint_id, error = %err, "sprint completion rejected");
            return Err(err.into());
        }
        self.store.update_sprint(&sprint).await?;
        info!(sprint_id = %sprint_id, project_id = %sprint.project_id(), "sprint completed");
        Ok(sprint)
    }

    /// Edits a sprint's name, goal or dates. The status never changes.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerServiceError::NotFound`] for a missing sprint or a
    /// domain error for a blank name or inverted dates.
    pub async fn update(
        &self,
        actor: &ActorContext,
        sprint_id: SprintId,
        patch: SprintPatch,
    ) -> TrackerServiceResult<Sprint> {
        require_actor(actor, "update sprint")?;
        let mut sprint = self.load_sprint(sprint_id).await?;
        sprint.apply_patch(patch, &*self.clock)?;
        self.store.update_sprint(&sprint).await?;
        info!(sprint_id = %sprint_id, "sprint updated");
        Ok(sprint)
    }

    /// Retrieves a sprint by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerServiceError::Repository`] when the lookup fails.
    pub async fn find_by_id(&self, sprint_id: SprintId) -> TrackerServiceResult<Option<Sprint>> {
        Ok(self.store.find_sprint(sprint_id).await?)
    }

    /// Lists a project's sprints in creation order.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerServiceError::Repository`] when the query fails.
    pub async fn list_for_project(&self, project_id: ProjectId) -> TrackerServiceResult<Vec<Sprint>> {
        Ok(self.store.list_sprints(project_id).await?)
    }

    /// Returns the project's active sprint, if any.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerServiceError::Repository`] when the query fails.
    pub async fn active_sprint(&self, project_id: ProjectId) -> TrackerServiceResult<Option<Sprint>> {
        let sprints = self.store.list_sprints(project_id).await?;
        Ok(sprints
            .into_iter()
            .find(|sprint| sprint.status() == SprintStatus::Active))
    }

    async fn load_sprint(&self, sprint_id: SprintId) -> TrackerServiceResult<Sprint> {
        found(
            self.store.find_sprint(sprint_id).await?,
            RecordRef::Sprint(sprint_id),
        )
    }
}
