//! Project registration, membership and statistics.

use super::error::{TrackerServiceError, TrackerServiceResult, found, require_actor};
use crate::tracker::{
    domain::{
        ActorContext, IssueFilter, Project, ProjectCategory, ProjectId, ProjectKey, ProjectPatch,
        ProjectStats, TrackerDomainError, UserId,
    },
    ports::{RecordRef, TrackerRepositoryError, TrackerStore},
};
use mockable::Clock;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Request payload for creating a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateProjectRequest {
    key: String,
    name: String,
    description: Option<String>,
    category: Option<ProjectCategory>,
}

impl CreateProjectRequest {
    /// Creates a request with the required fields. The key is normalized to
    /// uppercase.
    #[must_use]
    pub fn new(key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            description: None,
            category: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the category.
    #[must_use]
    pub const fn with_category(mut self, category: ProjectCategory) -> Self {
        self.category = Some(category);
        self
    }
}

/// Project orchestration service.
#[derive(Clone)]
pub struct ProjectService<S, C>
where
    S: TrackerStore,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    clock: Arc<C>,
}

impl<S, C> ProjectService<S, C>
where
    S: TrackerStore,
    C: Clock + Send + Sync,
{
    /// Creates a new project service.
    #[must_use]
    pub const fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        Self { store, clock }
    }

    /// Creates a project owned by the acting user.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerServiceError::Unauthenticated`] without an actor,
    /// a domain error for an invalid key or blank name, or
    /// [`TrackerRepositoryError::DuplicateProjectKey`] when the key is taken.
    pub async fn create(
        &self,
        actor: &ActorContext,
        request: CreateProjectRequest,
    ) -> TrackerServiceResult<Project> {
        let owner = require_actor(actor, "create project")?;
        let key = ProjectKey::new(request.key)?;
        if self.store.find_project_by_key(&key).await?.is_some() {
            warn!(project_key = %key, "project creation rejected; key in use");
            return Err(TrackerRepositoryError::DuplicateProjectKey(key).into());
        }

        let mut project = Project::new(key, request.name, owner, &*self.clock)?;
        if let Some(description) = request.description {
            project = project.with_description(description);
        }
        if let Some(category) = request.category {
            project = project.with_category(category);
        }
        self.store.store_project(&project).await?;
        info!(project_key = %project.key(), project_id = %project.id(), "project created");
        Ok(project)
    }

    /// Applies a partial update to a project.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerServiceError::NotFound`] for a missing project,
    /// [`TrackerDomainError::ProjectKeyLocked`] when the key would change
    /// after issues exist, or
    /// [`TrackerRepositoryError::DuplicateProjectKey`] when a new key is
    /// taken.
    pub async fn update(
        &self,
        actor: &ActorContext,
        project_id: ProjectId,
        patch: ProjectPatch,
    ) -> TrackerServiceResult<Project> {
        require_actor(actor, "update project")?;
        let mut project = self.load_project(project_id).await?;

        if let Err(err) = project.apply_patch(patch, &*self.clock) {
            if matches!(err, TrackerDomainError::ProjectKeyLocked(_)) {
                warn!(project_id = %project_id, "project key change rejected");
            }
            return Err(err.into());
        }
        self.store.update_project(&project).await?;
        info!(project_key = %project.key(), project_id = %project_id, "project updated");
        Ok(project)
    }

    /// Deletes a project with its issues, their comments, and its sprints.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerServiceError::NotFound`] for a missing project.
    pub async fn delete(
        &self,
        actor: &ActorContext,
        project_id: ProjectId,
    ) -> TrackerServiceResult<()> {
        require_actor(actor, "delete project")?;
        let project = self.load_project(project_id).await?;
        self.store.delete_project(project_id).await?;
        info!(project_key = %project.key(), project_id = %project_id, "project deleted");
        Ok(())
    }

    /// Adds a registered user to the member set.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerServiceError::NotFound`] for a missing project or
    /// user.
    pub async fn add_member(
        &self,
        actor: &ActorContext,
        project_id: ProjectId,
        user_id: UserId,
    ) -> TrackerServiceResult<Project> {
        require_actor(actor, "add project member")?;
        let mut project = self.load_project(project_id).await?;
        found(
            self.store.find_user(user_id).await?,
            RecordRef::User(user_id),
        )?;

        if !project.add_member(user_id, &*self.clock) {
            debug!(project_id = %project_id, user_id = %user_id, "user already a member");
            return Ok(project);
        }
        self.store.update_project(&project).await?;
        info!(project_id = %project_id, user_id = %user_id, "project member added");
        Ok(project)
    }

    /// Removes a member other than the owner.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerServiceError::NotFound`] for a missing project or
    /// [`TrackerServiceError::OwnerRemoval`] for the owner.
    pub async fn remove_member(
        &self,
        actor: &ActorContext,
        project_id: ProjectId,
        user_id: UserId,
    ) -> TrackerServiceResult<Project> {
        require_actor(actor, "remove project member")?;
        let mut project = self.load_project(project_id).await?;
        if project.owner() == user_id {
            warn!(project_id = %project_id, user_id = %user_id, "owner removal rejected");
            return Err(TrackerServiceError::OwnerRemoval(user_id));
        }

        if !project.remove_member(user_id, &*self.clock) {
            debug!(project_id = %project_id, user_id = %user_id, "user not a member");
            return Ok(project);
        }
        self.store.update_project(&project).await?;
        info!(project_id = %project_id, user_id = %user_id, "project member removed");
        Ok(project)
    }

    /// Retrieves a project by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerServiceError::Repository`] when the lookup fails.
    pub async fn find_by_id(&self, project_id: ProjectId) -> TrackerServiceResult<Option<Project>> {
        Ok(self.store.find_project(project_id).await?)
    }

    /// Retrieves a project by key, normalizing the input.
    ///
    /// # Errors
    ///
    /// Returns a domain error for a malformed key or
    /// [`TrackerServiceError::Repository`] when the lookup fails.
    pub async fn find_by_key(&self, key: &str) -> TrackerServiceResult<Option<Project>> {
        let project_key = ProjectKey::new(key)?;
        Ok(self.store.find_project_by_key(&project_key).await?)
    }

    /// Lists every project in creation order.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerServiceError::Repository`] when the query fails.
    pub async fn list_all(&self) -> TrackerServiceResult<Vec<Project>> {
        Ok(self.store.list_projects().await?)
    }

    /// Counts a project's issues per status.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerServiceError::NotFound`] for a missing project.
    pub async fn stats(&self, project_id: ProjectId) -> TrackerServiceResult<ProjectStats> {
        self.load_project(project_id).await?;
        let issues = self
            .store
            .list_issues(&IssueFilter::for_project(project_id))
            .await?;
        Ok(ProjectStats::from_issues(&issues))
    }

    async fn load_project(&self, project_id: ProjectId) -> TrackerServiceResult<Project> {
        found(
            self.store.find_project(project_id).await?,
            RecordRef::Project(project_id),
        )
    }
}
