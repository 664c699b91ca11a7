//! Issue lifecycle orchestration: creation, updates, board and sprint moves.

use super::error::{TrackerServiceError, TrackerServiceResult, found, require_actor};
use crate::tracker::{
    config::WorkflowConfig,
    domain::{
        ActivityEntry, ActorContext, BacklogView, Board, Issue, IssueDraft, IssueFilter, IssueId,
        IssueKey, IssuePatch, IssuePriority, IssueStatus, IssueType, Project, ProjectId, Sprint,
        SprintId, SprintScope, SprintStatus, StoryPoints, TrackerDomainError, UserId,
    },
    ports::{RecordRef, TrackerStore},
};
use mockable::Clock;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Request payload for creating an issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateIssueRequest {
    project_id: ProjectId,
    title: String,
    description: Option<String>,
    issue_type: Option<IssueType>,
    status: Option<IssueStatus>,
    priority: Option<IssuePriority>,
    assignee: Option<UserId>,
    story_points: Option<i64>,
    labels: Vec<String>,
    sprint_id: Option<SprintId>,
}

impl CreateIssueRequest {
    /// Creates a request with the required fields.
    #[must_use]
    pub fn new(project_id: ProjectId, title: impl Into<String>) -> Self {
        Self {
            project_id,
            title: title.into(),
            description: None,
            issue_type: None,
            status: None,
            priority: None,
            assignee: None,
            story_points: None,
            labels: Vec::new(),
            sprint_id: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the issue type.
    #[must_use]
    pub const fn with_type(mut self, issue_type: IssueType) -> Self {
        self.issue_type = Some(issue_type);
        self
    }

    /// Sets the initial board column.
    #[must_use]
    pub const fn with_status(mut self, status: IssueStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: IssuePriority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Sets the assignee.
    #[must_use]
    pub const fn with_assignee(mut self, assignee: UserId) -> Self {
        self.assignee = Some(assignee);
        self
    }

    /// Sets the story-point estimate, validated on creation.
    #[must_use]
    pub const fn with_story_points(mut self, story_points: i64) -> Self {
        self.story_points = Some(story_points);
        self
    }

    /// Sets the labels.
    #[must_use]
    pub fn with_labels(mut self, labels: impl IntoIterator<Item = String>) -> Self {
        self.labels = labels.into_iter().collect();
        self
    }

    /// Places the new issue in a sprint instead of the backlog.
    #[must_use]
    pub const fn with_sprint(mut self, sprint_id: SprintId) -> Self {
        self.sprint_id = Some(sprint_id);
        self
    }
}

/// Request payload for a partial issue update.
///
/// Unset fields are left unchanged. Assignee, story points and sprint are
/// tri-state: unchanged, cleared, or set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateIssueRequest {
    title: Option<String>,
    description: Option<String>,
    issue_type: Option<IssueType>,
    status: Option<IssueStatus>,
    priority: Option<IssuePriority>,
    assignee: Option<Option<UserId>>,
    story_points: Option<Option<i64>>,
    labels: Option<Vec<String>>,
    sprint_id: Option<Option<SprintId>>,
}

impl UpdateIssueRequest {
    /// Creates an empty update.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a new title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets a new description; a blank value clears it.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets a new issue type.
    #[must_use]
    pub const fn with_type(mut self, issue_type: IssueType) -> Self {
        self.issue_type = Some(issue_type);
        self
    }

    /// Sets a new board column.
    #[must_use]
    pub const fn with_status(mut self, status: IssueStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets a new priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: IssuePriority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Sets or clears the assignee.
    #[must_use]
    pub const fn with_assignee(mut self, assignee: Option<UserId>) -> Self {
        self.assignee = Some(assignee);
        self
    }

    /// Sets or clears the story-point estimate.
    #[must_use]
    pub const fn with_story_points(mut self, story_points: Option<i64>) -> Self {
        self.story_points = Some(story_points);
        self
    }

    /// Replaces the labels.
    #[must_use]
    pub fn with_labels(mut self, labels: impl IntoIterator<Item = String>) -> Self {
        self.labels = Some(labels.into_iter().collect());
        self
    }

    /// Moves the issue to a sprint, or to the backlog for `None`.
    #[must_use]
    pub const fn with_sprint(mut self, sprint_id: Option<SprintId>) -> Self {
        self.sprint_id = Some(sprint_id);
        self
    }
}

/// Issue lifecycle orchestration service.
#[derive(Clone)]
pub struct IssueLifecycleService<S, C>
where
    S: TrackerStore,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    clock: Arc<C>,
    config: WorkflowConfig,
}

impl<S, C> IssueLifecycleService<S, C>
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

    /// Creates an issue, assigning the next key of its project.
    ///
    /// The acting user becomes the reporter and a `created` entry opens the
    /// activity log. Every input is validated before the key is allocated.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerServiceError::Unauthenticated`] without an actor,
    /// [`TrackerServiceError::NotFound`] for a missing project or sprint,
    /// [`TrackerServiceError::SprintProjectMismatch`] when the sprint belongs
    /// to another project, or a domain error for invalid input.
    pub async fn create(
        &self,
        actor: &ActorContext,
        request: CreateIssueRequest,
    ) -> TrackerServiceResult<Issue> {
        let reporter = require_actor(actor, "create issue")?;
        let project = self.load_project(request.project_id).await?;

        if request.title.trim().is_empty() {
            return Err(TrackerDomainError::EmptyField("issue title").into());
        }
        let story_points = request.story_points.map(StoryPoints::new).transpose()?;
        let sprint = match request.sprint_id {
            Some(sprint_id) => Some(self.load_sprint_for(&project, sprint_id).await?),
            None => None,
        };

        let draft = IssueDraft {
            title: request.title,
            description: request.description,
            issue_type: request.issue_type,
            status: request.status,
            priority: request.priority,
            assignee: request.assignee,
            story_points,
            labels: request.labels,
        };

        let key = self.store.allocate_issue_key(project.id()).await?;
        let issue = Issue::create(
            project.id(),
            key,
            draft,
            sprint.as_ref(),
            reporter,
            &*self.clock,
        )?;
        self.store.store_issue(&issue).await?;
        info!(
            issue_key = %issue.key(),
            issue_id = %issue.id(),
            project_id = %project.id(),
            "issue created"
        );
        Ok(issue)
    }

    /// Applies a partial update to an issue.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerServiceError::Unauthenticated`] without an actor,
    /// [`TrackerServiceError::NotFound`] for a missing issue or sprint, or a
    /// domain error for invalid input.
    pub async fn update(
        &self,
        actor: &ActorContext,
        issue_id: IssueId,
        request: UpdateIssueRequest,
    ) -> TrackerServiceResult<Issue> {
        let actor_id = require_actor(actor, "update issue")?;
        let mut issue = self.load_issue(issue_id).await?;

        let story_points = request
            .story_points
            .map(|points| points.map(StoryPoints::new).transpose())
            .transpose()?;
        let sprint = match request.sprint_id {
            Some(Some(sprint_id)) => Some(Some(self.load_sprint(sprint_id).await?)),
            Some(None) => Some(None),
            None => None,
        };

        let patch = IssuePatch {
            title: request.title,
            description: request.description,
            issue_type: request.issue_type,
            status: request.status,
            priority: request.priority,
            assignee: request.assignee,
            story_points,
            labels: request.labels,
        };
        let previous_status = issue.status();
        issue.apply_patch(
            patch,
            actor_id,
            self.config.unassignment_logging(),
            &*self.clock,
        )?;
        if let Some(target) = sprint {
            issue.move_to_sprint(target.as_ref(), &*self.clock)?;
        }

        self.store.update_issue(&issue).await?;
        info!(
            issue_key = %issue.key(),
            from = %previous_status,
            to = %issue.status(),
            "issue updated"
        );
        Ok(issue)
    }

    /// Deletes an issue together with its comments.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerServiceError::Unauthenticated`] without an actor or
    /// [`TrackerServiceError::NotFound`] when the issue does not exist.
    pub async fn delete(&self, actor: &ActorContext, issue_id: IssueId) -> TrackerServiceResult<()> {
        require_actor(actor, "delete issue")?;
        let issue = self.load_issue(issue_id).await?;
        self.store.delete_issue(issue_id).await?;
        info!(issue_key = %issue.key(), issue_id = %issue_id, "issue deleted");
        Ok(())
    }

    /// Moves an issue into a sprint, or back to the backlog for `None`.
    ///
    /// The status is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerServiceError::NotFound`] for a missing issue or
    /// sprint, or [`TrackerDomainError::SprintProjectMismatch`] when the
    /// sprint belongs to another project.
    pub async fn move_to_sprint(
        &self,
        actor: &ActorContext,
        issue_id: IssueId,
        sprint_id: Option<SprintId>,
    ) -> TrackerServiceResult<Issue> {
        require_actor(actor, "move issue to sprint")?;
        let mut issue = self.load_issue(issue_id).await?;
        let sprint = match sprint_id {
            Some(id) => Some(self.load_sprint(id).await?),
            None => None,
        };

        if let Err(err) = issue.move_to_sprint(sprint.as_ref(), &*self.clock) {
            warn!(issue_key = %issue.key(), error = %err, "sprint move rejected");
            return Err(err.into());
        }
        self.store.update_issue(&issue).await?;
        match sprint_id {
            Some(id) => info!(issue_key = %issue.key(), sprint_id = %id, "issue moved to sprint"),
            None => info!(issue_key = %issue.key(), "issue moved to backlog"),
        }
        Ok(issue)
    }

    /// Moves an issue to a board column.
    ///
    /// Dropping a card on its current column is a no-op: nothing is logged
    /// or persisted and the issue is returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerServiceError::Unauthenticated`] without an actor or
    /// [`TrackerServiceError::NotFound`] when the issue does not exist.
    pub async fn move_to_column(
        &self,
        actor: &ActorContext,
        issue_id: IssueId,
        status: IssueStatus,
    ) -> TrackerServiceResult<Issue> {
        let actor_id = require_actor(actor, "move issue to column")?;
        let mut issue = self.load_issue(issue_id).await?;
        let previous_status = issue.status();

        if !issue.move_to_column(status, actor_id, &*self.clock) {
            debug!(issue_key = %issue.key(), status = %status, "issue already in column");
            return Ok(issue);
        }
        self.store.update_issue(&issue).await?;
        info!(
            issue_key = %issue.key(),
            from = %previous_status,
            to = %status,
            "issue moved to column"
        );
        Ok(issue)
    }

    /// Retrieves an issue by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerServiceError::Repository`] when the lookup fails.
    pub async fn find_by_id(&self, issue_id: IssueId) -> TrackerServiceResult<Option<Issue>> {
        Ok(self.store.find_issue(issue_id).await?)
    }

    /// Retrieves an issue by its key, e.g. `DEMO-7`.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerServiceError::Repository`] when the lookup fails.
    pub async fn find_by_key(&self, key: &IssueKey) -> TrackerServiceResult<Option<Issue>> {
        Ok(self.store.find_issue_by_key(key).await?)
    }

    /// Lists issues matching `filter` in creation order.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerServiceError::Repository`] when the query fails.
    pub async fn list(&self, filter: &IssueFilter) -> TrackerServiceResult<Vec<Issue>> {
        Ok(self.store.list_issues(filter).await?)
    }

    /// Returns an issue's activity log in append order.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerServiceError::NotFound`] when the issue does not
    /// exist.
    pub async fn activities(&self, issue_id: IssueId) -> TrackerServiceResult<Vec<ActivityEntry>> {
        let issue = self.load_issue(issue_id).await?;
        Ok(issue.activities().to_vec())
    }

    /// Groups every issue of a project into board columns.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerServiceError::NotFound`] when the project does not
    /// exist.
    pub async fn board(&self, project_id: ProjectId) -> TrackerServiceResult<Board> {
        self.load_project(project_id).await?;
        let issues = self
            .store
            .list_issues(&IssueFilter::for_project(project_id))
            .await?;
        Ok(Board::from_issues(issues))
    }

    /// Groups the active sprint's issues into board columns.
    ///
    /// Returns empty columns when no sprint is active.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerServiceError::NotFound`] when the project does not
    /// exist.
    pub async fn active_sprint_board(&self, project_id: ProjectId) -> TrackerServiceResult<Board> {
        self.load_project(project_id).await?;
        let sprints = self.store.list_sprints(project_id).await?;
        let Some(active) = sprints
            .iter()
            .find(|sprint| sprint.status() == SprintStatus::Active)
        else {
            return Ok(Board::from_issues(Vec::new()));
        };
        let filter =
            IssueFilter::for_project(project_id).with_sprint(SprintScope::Sprint(active.id()));
        let issues = self.store.list_issues(&filter).await?;
        Ok(Board::from_issues(issues))
    }

    /// Builds the backlog view: the active sprint, planned sprints, and
    /// issues outside any sprint.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerServiceError::NotFound`] when the project does not
    /// exist.
    pub async fn backlog(&self, project_id: ProjectId) -> TrackerServiceResult<BacklogView> {
        self.load_project(project_id).await?;
        let sprints = self.store.list_sprints(project_id).await?;
        let issues = self
            .store
            .list_issues(&IssueFilter::for_project(project_id))
            .await?;
        Ok(BacklogView::assemble(sprints, issues))
    }

    async fn load_project(&self, project_id: ProjectId) -> TrackerServiceResult<Project> {
        found(
            self.store.find_project(project_id).await?,
            RecordRef::Project(project_id),
        )
    }

    async fn load_issue(&self, issue_id: IssueId) -> TrackerServiceResult<Issue> {
        found(
            self.store.find_issue(issue_id).await?,
            RecordRef::Issue(issue_id),
        )
    }

    async fn load_sprint(&self, sprint_id: SprintId) -> TrackerServiceResult<Sprint> {
        found(
            self.store.find_sprint(sprint_id).await?,
            RecordRef::Sprint(sprint_id),
        )
    }

    async fn load_sprint_for(
        &self,
        project: &Project,
        sprint_id: SprintId,
    ) -> TrackerServiceResult<Sprint> {
        let sprint = self.load_sprint(sprint_id).await?;
        if sprint.project_id() != project.id() {
            warn!(
                project_id = %project.id(),
                sprint_id = %sprint_id,
                "issue creation rejected for sprint of another project"
            );
            return Err(TrackerServiceError::SprintProjectMismatch {
                project_id: project.id(),
                sprint_id,
            });
        }
        Ok(sprint)
    }
}
