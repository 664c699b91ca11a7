//! In-memory tracker store for tests and local sessions.

use async_trait::async_trait;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::tracker::{
    domain::{
        Comment, CommentId, EmailAddress, Issue, IssueFilter, IssueId, IssueKey, Project,
        ProjectId, ProjectKey, Sprint, SprintId, User, UserId,
    },
    ports::{
        CommentRepository, IssueRepository, ProjectRepository, RecordRef, SprintRepository,
        TrackerRepositoryError, TrackerRepositoryResult, UserRepository,
    },
};

/// Thread-safe in-memory store implementing every tracker repository port.
///
/// All collections live behind a single lock, so cascading deletes and
/// issue-key allocation are atomic.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTrackerStore {
    state: Arc<RwLock<InMemoryTrackerState>>,
}

/// A record tagged with its insertion sequence for stable ordering.
#[derive(Debug)]
struct Stored<T> {
    seq: u64,
    record: T,
}

#[derive(Debug, Default)]
struct InMemoryTrackerState {
    next_seq: u64,
    users: HashMap<UserId, Stored<User>>,
    email_index: HashMap<EmailAddress, UserId>,
    projects: HashMap<ProjectId, Stored<Project>>,
    project_key_index: HashMap<ProjectKey, ProjectId>,
    issues: HashMap<IssueId, Stored<Issue>>,
    issue_key_index: HashMap<IssueKey, IssueId>,
    sprints: HashMap<SprintId, Stored<Sprint>>,
    comments: HashMap<CommentId, Stored<Comment>>,
}

impl InMemoryTrackerState {
    fn stamp<T>(&mut self, record: T) -> Stored<T> {
        self.next_seq += 1;
        Stored {
            seq: self.next_seq,
            record,
        }
    }
}

impl InMemoryTrackerStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> TrackerRepositoryResult<RwLockReadGuard<'_, InMemoryTrackerState>> {
        self.state.read().map_err(|err| {
            TrackerRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write(&self) -> TrackerRepositoryResult<RwLockWriteGuard<'_, InMemoryTrackerState>> {
        self.state.write().map_err(|err| {
            TrackerRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

/// Returns matching records in insertion order.
fn collect_ordered<K, T, F>(records: &HashMap<K, Stored<T>>, predicate: F) -> Vec<T>
where
    K: Eq + Hash,
    T: Clone,
    F: Fn(&T) -> bool,
{
    let mut matching: Vec<&Stored<T>> = records
        .values()
        .filter(|stored| predicate(&stored.record))
        .collect();
    matching.sort_by_key(|stored| stored.seq);
    matching
        .into_iter()
        .map(|stored| stored.record.clone())
        .collect()
}

/// Replaces the record under `key`, keeping its insertion sequence.
fn replace_existing<K, T>(
    records: &mut HashMap<K, Stored<T>>,
    key: &K,
    record: T,
    missing: RecordRef,
) -> TrackerRepositoryResult<()>
where
    K: Eq + Hash,
{
    let stored = records
        .get_mut(key)
        .ok_or(TrackerRepositoryError::NotFound(missing))?;
    stored.record = record;
    Ok(())
}

/// Removes an issue together with its comments.
fn remove_issue_cascade(state: &mut InMemoryTrackerState, issue_id: IssueId) {
    if let Some(removed) = state.issues.remove(&issue_id) {
        state.issue_key_index.remove(removed.record.key());
    }
    state
        .comments
        .retain(|_, stored| stored.record.issue_id() != issue_id);
}

#[async_trait]
impl UserRepository for InMemoryTrackerStore {
    async fn store_user(&self, user: &User) -> TrackerRepositoryResult<()> {
        let mut state = self.write()?;
        if state.users.contains_key(&user.id()) {
            return Err(TrackerRepositoryError::DuplicateRecord(format!(
                "user {}",
                user.id()
            )));
        }
        if state.email_index.contains_key(user.email()) {
            return Err(TrackerRepositoryError::DuplicateEmail(user.email().clone()));
        }
        state.email_index.insert(user.email().clone(), user.id());
        let stored = state.stamp(user.clone());
        state.users.insert(user.id(), stored);
        Ok(())
    }

    async fn find_user(&self, id: UserId) -> TrackerRepositoryResult<Option<User>> {
        let state = self.read()?;
        Ok(state.users.get(&id).map(|stored| stored.record.clone()))
    }

    async fn find_user_by_email(
        &self,
        email: &EmailAddress,
    ) -> TrackerRepositoryResult<Option<User>> {
        let state = self.read()?;
        let user = state
            .email_index
            .get(email)
            .and_then(|id| state.users.get(id))
            .map(|stored| stored.record.clone());
        Ok(user)
    }

    async fn list_users(&self) -> TrackerRepositoryResult<Vec<User>> {
        let state = self.read()?;
        Ok(collect_ordered(&state.users, |_| true))
    }
}

#[async_trait]
impl ProjectRepository for InMemoryTrackerStore {
    async fn store_project(&self, project: &Project) -> TrackerRepositoryResult<()> {
        let mut state = self.write()?;
        if state.projects.contains_key(&project.id()) {
            return Err(TrackerRepositoryError::DuplicateRecord(format!(
                "project {}",
                project.id()
            )));
        }
        if state.project_key_index.contains_key(project.key()) {
            return Err(TrackerRepositoryError::DuplicateProjectKey(
                project.key().clone(),
            ));
        }
        state
            .project_key_index
            .insert(project.key().clone(), project.id());
        let stored = state.stamp(project.clone());
        state.projects.insert(project.id(), stored);
        Ok(())
    }

    async fn update_project(&self, project: &Project) -> TrackerRepositoryResult<()> {
        let mut state = self.write()?;
        let (old_key, issue_counter) = state
            .projects
            .get(&project.id())
            .map(|stored| (stored.record.key().clone(), stored.record.issue_counter()))
            .ok_or(TrackerRepositoryError::NotFound(RecordRef::Project(
                project.id(),
            )))?;

        if old_key != *project.key() {
            if issue_counter > 0 {
                return Err(TrackerRepositoryError::ProjectKeyLocked(project.id()));
            }
            if state.project_key_index.contains_key(project.key()) {
                return Err(TrackerRepositoryError::DuplicateProjectKey(
                    project.key().clone(),
                ));
            }
            state.project_key_index.remove(&old_key);
            state
                .project_key_index
                .insert(project.key().clone(), project.id());
        }

        let mut updated = project.clone();
        updated.sync_issue_counter(issue_counter);
        replace_existing(
            &mut state.projects,
            &project.id(),
            updated,
            RecordRef::Project(project.id()),
        )
    }

    async fn find_project(&self, id: ProjectId) -> TrackerRepositoryResult<Option<Project>> {
        let state = self.read()?;
        Ok(state.projects.get(&id).map(|stored| stored.record.clone()))
    }

    async fn find_project_by_key(
        &self,
        key: &ProjectKey,
    ) -> TrackerRepositoryResult<Option<Project>> {
        let state = self.read()?;
        let project = state
            .project_key_index
            .get(key)
            .and_then(|id| state.projects.get(id))
            .map(|stored| stored.record.clone());
        Ok(project)
    }

    async fn list_projects(&self) -> TrackerRepositoryResult<Vec<Project>> {
        let state = self.read()?;
        Ok(collect_ordered(&state.projects, |_| true))
    }

    async fn allocate_issue_key(&self, id: ProjectId) -> TrackerRepositoryResult<IssueKey> {
        let mut state = self.write()?;
        let stored = state
            .projects
            .get_mut(&id)
            .ok_or(TrackerRepositoryError::NotFound(RecordRef::Project(id)))?;
        stored
            .record
            .allocate_issue_key()
            .map_err(TrackerRepositoryError::persistence)
    }

    async fn delete_project(&self, id: ProjectId) -> TrackerRepositoryResult<()> {
        let mut state = self.write()?;
        let removed = state
            .projects
            .remove(&id)
            .ok_or(TrackerRepositoryError::NotFound(RecordRef::Project(id)))?;
        state.project_key_index.remove(removed.record.key());

        let issue_ids: Vec<IssueId> = state
            .issues
            .values()
            .filter(|stored| stored.record.project_id() == id)
            .map(|stored| stored.record.id())
            .collect();
        for issue_id in issue_ids {
            remove_issue_cascade(&mut state, issue_id);
        }
        state
            .sprints
            .retain(|_, stored| stored.record.project_id() != id);
        Ok(())
    }
}

#[async_trait]
impl IssueRepository for InMemoryTrackerStore {
    async fn store_issue(&self, issue: &Issue) -> TrackerRepositoryResult<()> {
        let mut state = self.write()?;
        if state.issues.contains_key(&issue.id()) {
            return Err(TrackerRepositoryError::DuplicateRecord(format!(
                "issue {}",
                issue.id()
            )));
        }
        if state.issue_key_index.contains_key(issue.key()) {
            return Err(TrackerRepositoryError::DuplicateRecord(format!(
                "issue key {}",
                issue.key()
            )));
        }
        state.issue_key_index.insert(issue.key().clone(), issue.id());
        let stored = state.stamp(issue.clone());
        state.issues.insert(issue.id(), stored);
        Ok(())
    }

    async fn update_issue(&self, issue: &Issue) -> TrackerRepositoryResult<()> {
        let mut state = self.write()?;
        replace_existing(
            &mut state.issues,
            &issue.id(),
            issue.clone(),
            RecordRef::Issue(issue.id()),
        )
    }

    async fn find_issue(&self, id: IssueId) -> TrackerRepositoryResult<Option<Issue>> {
        let state = self.read()?;
        Ok(state.issues.get(&id).map(|stored| stored.record.clone()))
    }

    async fn find_issue_by_key(&self, key: &IssueKey) -> TrackerRepositoryResult<Option<Issue>> {
        let state = self.read()?;
        let issue = state
            .issue_key_index
            .get(key)
            .and_then(|id| state.issues.get(id))
            .map(|stored| stored.record.clone());
        Ok(issue)
    }

    async fn list_issues(&self, filter: &IssueFilter) -> TrackerRepositoryResult<Vec<Issue>> {
        let state = self.read()?;
        Ok(collect_ordered(&state.issues, |issue| filter.matches(issue)))
    }

    async fn delete_issue(&self, id: IssueId) -> TrackerRepositoryResult<()> {
        let mut state = self.write()?;
        if !state.issues.contains_key(&id) {
            return Err(TrackerRepositoryError::NotFound(RecordRef::Issue(id)));
        }
        remove_issue_cascade(&mut state, id);
        Ok(())
    }
}

#[async_trait]
impl SprintRepository for InMemoryTrackerStore {
    async fn store_sprint(&self, sprint: &Sprint) -> TrackerRepositoryResult<()> {
        let mut state = self.write()?;
        if state.sprints.contains_key(&sprint.id()) {
            return Err(TrackerRepositoryError::DuplicateRecord(format!(
                "sprint {}",
                sprint.id()
            )));
        }
        let stored = state.stamp(sprint.clone());
        state.sprints.insert(sprint.id(), stored);
        Ok(())
    }

    async fn update_sprint(&self, sprint: &Sprint) -> TrackerRepositoryResult<()> {
        let mut state = self.write()?;
        replace_existing(
            &mut state.sprints,
            &sprint.id(),
            sprint.clone(),
            RecordRef::Sprint(sprint.id()),
        )
    }

    async fn find_sprint(&self, id: SprintId) -> TrackerRepositoryResult<Option<Sprint>> {
        let state = self.read()?;
        Ok(state.sprints.get(&id).map(|stored| stored.record.clone()))
    }

    async fn list_sprints(&self, project_id: ProjectId) -> TrackerRepositoryResult<Vec<Sprint>> {
        let state = self.read()?;
        Ok(collect_ordered(&state.sprints, |sprint| {
            sprint.project_id() == project_id
        }))
    }
}

#[async_trait]
impl CommentRepository for InMemoryTrackerStore {
    async fn store_comment(&self, comment: &Comment) -> TrackerRepositoryResult<()> {
        let mut state = self.write()?;
        if !state.issues.contains_key(&comment.issue_id()) {
            return Err(TrackerRepositoryError::NotFound(RecordRef::Issue(
                comment.issue_id(),
            )));
        }
        if state.comments.contains_key(&comment.id()) {
            return Err(TrackerRepositoryError::DuplicateRecord(format!(
                "comment {}",
                comment.id()
            )));
        }
        let stored = state.stamp(comment.clone());
        state.comments.insert(comment.id(), stored);
        Ok(())
    }

    async fn update_comment(&self, comment: &Comment) -> TrackerRepositoryResult<()> {
        let mut state = self.write()?;
        replace_existing(
            &mut state.comments,
            &comment.id(),
            comment.clone(),
            RecordRef::Comment(comment.id()),
        )
    }

    async fn find_comment(&self, id: CommentId) -> TrackerRepositoryResult<Option<Comment>> {
        let state = self.read()?;
        Ok(state.comments.get(&id).map(|stored| stored.record.clone()))
    }

    async fn list_comments(&self, issue_id: IssueId) -> TrackerRepositoryResult<Vec<Comment>> {
        let state = self.read()?;
        Ok(collect_ordered(&state.comments, |comment| {
            comment.issue_id() == issue_id
        }))
    }

    async fn delete_comment(&self, id: CommentId) -> TrackerRepositoryResult<()> {
        let mut state = self.write()?;
        state
            .comments
            .remove(&id)
            .map(|_| ())
            .ok_or(TrackerRepositoryError::NotFound(RecordRef::Comment(id)))
    }
}
