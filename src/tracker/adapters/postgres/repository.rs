//! `PostgreSQL` repository implementation for tracker storage.

use super::{
    mapping::{
        comment_to_new_row, contains_pattern, issue_changeset, issue_to_new_row,
        project_changeset, project_to_new_row, row_to_comment, row_to_issue, row_to_project,
        row_to_sprint, row_to_user, sprint_changeset, sprint_to_new_row, user_to_new_row,
    },
    models::{CommentRow, IssueRow, ProjectRow, SprintRow, UserRow},
    schema::{comments, issues, projects, sprints, users},
};
use crate::tracker::{
    domain::{
        Comment, CommentId, EmailAddress, Issue, IssueFilter, IssueId, IssueKey, IssueNumber,
        Project, ProjectId, ProjectKey, Sprint, SprintId, SprintScope, User, UserId,
    },
    ports::{
        CommentRepository, IssueRepository, ProjectRepository, RecordRef, SprintRepository,
        TrackerRepositoryError, TrackerRepositoryResult, UserRepository,
    },
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by tracker adapters.
pub type TrackerPgPool = Pool<ConnectionManager<PgConnection>>;

const USERS_EMAIL_CONSTRAINT: &str = "users_email_unique";
const PROJECTS_KEY_CONSTRAINT: &str = "projects_key_unique";
const ISSUES_KEY_CONSTRAINT: &str = "issues_key_unique";

/// `PostgreSQL`-backed store implementing every tracker repository port.
#[derive(Debug, Clone)]
pub struct PostgresTrackerStore {
    pool: TrackerPgPool,
}

impl PostgresTrackerStore {
    /// Creates a new store from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TrackerPgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    #[must_use]
    pub const fn pool(&self) -> &TrackerPgPool {
        &self.pool
    }

    async fn run_blocking<F, T>(&self, f: F) -> TrackerRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TrackerRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TrackerRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TrackerRepositoryError::persistence)?
    }
}

#[async_trait]
impl UserRepository for PostgresTrackerStore {
    async fn store_user(&self, user: &User) -> TrackerRepositoryResult<()> {
        let user_id = user.id();
        let email = user.email().clone();
        let new_row = user_to_new_row(user);

        self.run_blocking(move |connection| {
            diesel::insert_into(users::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
                        if violates(info.as_ref(), USERS_EMAIL_CONSTRAINT) =>
                    {
                        TrackerRepositoryError::DuplicateEmail(email.clone())
                    }
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        TrackerRepositoryError::DuplicateRecord(format!("user {user_id}"))
                    }
                    _ => TrackerRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn find_user(&self, id: UserId) -> TrackerRepositoryResult<Option<User>> {
        self.run_blocking(move |connection| {
            let row = users::table
                .filter(users::id.eq(id.into_inner()))
                .select(UserRow::as_select())
                .first::<UserRow>(connection)
                .optional()
                .map_err(TrackerRepositoryError::persistence)?;
            row.map(row_to_user).transpose()
        })
        .await
    }

    async fn find_user_by_email(
        &self,
        email: &EmailAddress,
    ) -> TrackerRepositoryResult<Option<User>> {
        let lookup = email.as_str().to_owned();
        self.run_blocking(move |connection| {
            let row = users::table
                .filter(users::email.eq(lookup))
                .select(UserRow::as_select())
                .first::<UserRow>(connection)
                .optional()
                .map_err(TrackerRepositoryError::persistence)?;
            row.map(row_to_user).transpose()
        })
        .await
    }

    async fn list_users(&self) -> TrackerRepositoryResult<Vec<User>> {
        self.run_blocking(move |connection| {
            let rows = users::table
                .order((users::created_at.asc(), users::id.asc()))
                .select(UserRow::as_select())
                .load::<UserRow>(connection)
                .map_err(TrackerRepositoryError::persistence)?;
            rows.into_iter().map(row_to_user).collect()
        })
        .await
    }
}

#[async_trait]
impl ProjectRepository for PostgresTrackerStore {
    async fn store_project(&self, project: &Project) -> TrackerRepositoryResult<()> {
        let project_id = project.id();
        let key = project.key().clone();
        let new_row = project_to_new_row(project)?;

        self.run_blocking(move |connection| {
            diesel::insert_into(projects::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| project_write_error(err, &key, project_id))?;
            Ok(())
        })
        .await
    }

    async fn update_project(&self, project: &Project) -> TrackerRepositoryResult<()> {
        let project_id = project.id();
        let key = project.key().clone();
        let changeset = project_changeset(project)?;

        self.run_blocking(move |connection| {
            connection.transaction::<(), TrackerRepositoryError, _>(|tx| {
                let project_uuid = project_id.into_inner();
                let (stored_key, issue_counter) = projects::table
                    .filter(projects::id.eq(project_uuid))
                    .select((projects::key, projects::issue_counter))
                    .for_update()
                    .first::<(String, i64)>(tx)
                    .optional()
                    .map_err(TrackerRepositoryError::persistence)?
                    .ok_or(TrackerRepositoryError::NotFound(RecordRef::Project(
                        project_id,
                    )))?;
                if stored_key != key.as_str() && issue_counter > 0 {
                    return Err(TrackerRepositoryError::ProjectKeyLocked(project_id));
                }

                diesel::update(projects::table.filter(projects::id.eq(project_uuid)))
                    .set(&changeset)
                    .execute(tx)
                    .map_err(|err| project_write_error(err, &key, project_id))?;
                Ok(())
            })
        })
        .await
    }

    async fn find_project(&self, id: ProjectId) -> TrackerRepositoryResult<Option<Project>> {
        self.run_blocking(move |connection| {
            let row = projects::table
                .filter(projects::id.eq(id.into_inner()))
                .select(ProjectRow::as_select())
                .first::<ProjectRow>(connection)
                .optional()
                .map_err(TrackerRepositoryError::persistence)?;
            row.map(row_to_project).transpose()
        })
        .await
    }

    async fn find_project_by_key(
        &self,
        key: &ProjectKey,
    ) -> TrackerRepositoryResult<Option<Project>> {
        let lookup = key.as_str().to_owned();
        self.run_blocking(move |connection| {
            let row = projects::table
                .filter(projects::key.eq(lookup))
                .select(ProjectRow::as_select())
                .first::<ProjectRow>(connection)
                .optional()
                .map_err(TrackerRepositoryError::persistence)?;
            row.map(row_to_project).transpose()
        })
        .await
    }

    async fn list_projects(&self) -> TrackerRepositoryResult<Vec<Project>> {
        self.run_blocking(move |connection| {
            let rows = projects::table
                .order((projects::created_at.asc(), projects::id.asc()))
                .select(ProjectRow::as_select())
                .load::<ProjectRow>(connection)
                .map_err(TrackerRepositoryError::persistence)?;
            rows.into_iter().map(row_to_project).collect()
        })
        .await
    }

    async fn allocate_issue_key(&self, id: ProjectId) -> TrackerRepositoryResult<IssueKey> {
        self.run_blocking(move |connection| {
            let allocated = diesel::update(projects::table.filter(projects::id.eq(id.into_inner())))
                .set(projects::issue_counter.eq(projects::issue_counter + 1))
                .returning((projects::key, projects::issue_counter))
                .get_result::<(String, i64)>(connection)
                .optional()
                .map_err(TrackerRepositoryError::persistence)?;
            let (raw_key, counter) =
                allocated.ok_or(TrackerRepositoryError::NotFound(RecordRef::Project(id)))?;

            let project_key =
                ProjectKey::new(raw_key).map_err(TrackerRepositoryError::persistence)?;
            let raw_number = u64::try_from(counter).map_err(TrackerRepositoryError::persistence)?;
            let number =
                IssueNumber::new(raw_number).map_err(TrackerRepositoryError::persistence)?;
            Ok(IssueKey::new(project_key, number))
        })
        .await
    }

    async fn delete_project(&self, id: ProjectId) -> TrackerRepositoryResult<()> {
        self.run_blocking(move |connection| {
            let project_uuid = id.into_inner();
            let deleted = connection
                .transaction::<usize, DieselError, _>(|tx| {
                    let project_issues = issues::table
                        .filter(issues::project_id.eq(project_uuid))
                        .select(issues::id);
                    diesel::delete(comments::table.filter(comments::issue_id.eq_any(project_issues)))
                        .execute(tx)?;
                    diesel::delete(issues::table.filter(issues::project_id.eq(project_uuid)))
                        .execute(tx)?;
                    diesel::delete(sprints::table.filter(sprints::project_id.eq(project_uuid)))
                        .execute(tx)?;
                    diesel::delete(projects::table.filter(projects::id.eq(project_uuid)))
                        .execute(tx)
                })
                .map_err(TrackerRepositoryError::persistence)?;
            if deleted == 0 {
                return Err(TrackerRepositoryError::NotFound(RecordRef::Project(id)));
            }
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl IssueRepository for PostgresTrackerStore {
    async fn store_issue(&self, issue: &Issue) -> TrackerRepositoryResult<()> {
        let issue_id = issue.id();
        let key = issue.key().clone();
        let new_row = issue_to_new_row(issue)?;

        self.run_blocking(move |connection| {
            diesel::insert_into(issues::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
                        if violates(info.as_ref(), ISSUES_KEY_CONSTRAINT) =>
                    {
                        TrackerRepositoryError::DuplicateRecord(format!("issue key {key}"))
                    }
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        TrackerRepositoryError::DuplicateRecord(format!("issue {issue_id}"))
                    }
                    _ => TrackerRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn update_issue(&self, issue: &Issue) -> TrackerRepositoryResult<()> {
        let issue_id = issue.id();
        let changeset = issue_changeset(issue)?;

        self.run_blocking(move |connection| {
            let updated = diesel::update(issues::table.filter(issues::id.eq(issue_id.into_inner())))
                .set(&changeset)
                .execute(connection)
                .map_err(TrackerRepositoryError::persistence)?;
            if updated == 0 {
                return Err(TrackerRepositoryError::NotFound(RecordRef::Issue(issue_id)));
            }
            Ok(())
        })
        .await
    }

    async fn find_issue(&self, id: IssueId) -> TrackerRepositoryResult<Option<Issue>> {
        self.run_blocking(move |connection| {
            let row = issues::table
                .filter(issues::id.eq(id.into_inner()))
                .select(IssueRow::as_select())
                .first::<IssueRow>(connection)
                .optional()
                .map_err(TrackerRepositoryError::persistence)?;
            row.map(row_to_issue).transpose()
        })
        .await
    }

    async fn find_issue_by_key(&self, key: &IssueKey) -> TrackerRepositoryResult<Option<Issue>> {
        let lookup = key.to_string();
        self.run_blocking(move |connection| {
            let row = issues::table
                .filter(issues::issue_key.eq(lookup))
                .select(IssueRow::as_select())
                .first::<IssueRow>(connection)
                .optional()
                .map_err(TrackerRepositoryError::persistence)?;
            row.map(row_to_issue).transpose()
        })
        .await
    }

    async fn list_issues(&self, filter: &IssueFilter) -> TrackerRepositoryResult<Vec<Issue>> {
        let query_filter = filter.clone();
        self.run_blocking(move |connection| {
            let rows = filtered_issues(&query_filter)
                .order((issues::created_at.asc(), issues::issue_number.asc()))
                .select(IssueRow::as_select())
                .load::<IssueRow>(connection)
                .map_err(TrackerRepositoryError::persistence)?;
            rows.into_iter().map(row_to_issue).collect()
        })
        .await
    }

    async fn delete_issue(&self, id: IssueId) -> TrackerRepositoryResult<()> {
        self.run_blocking(move |connection| {
            let issue_uuid = id.into_inner();
            let deleted = connection
                .transaction::<usize, DieselError, _>(|tx| {
                    diesel::delete(comments::table.filter(comments::issue_id.eq(issue_uuid)))
                        .execute(tx)?;
                    diesel::delete(issues::table.filter(issues::id.eq(issue_uuid))).execute(tx)
                })
                .map_err(TrackerRepositoryError::persistence)?;
            if deleted == 0 {
                return Err(TrackerRepositoryError::NotFound(RecordRef::Issue(id)));
            }
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl SprintRepository for PostgresTrackerStore {
    async fn store_sprint(&self, sprint: &Sprint) -> TrackerRepositoryResult<()> {
        let sprint_id = sprint.id();
        let new_row = sprint_to_new_row(sprint);

        self.run_blocking(move |connection| {
            diesel::insert_into(sprints::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        TrackerRepositoryError::DuplicateRecord(format!("sprint {sprint_id}"))
                    }
                    _ => TrackerRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn update_sprint(&self, sprint: &Sprint) -> TrackerRepositoryResult<()> {
        let sprint_id = sprint.id();
        let changeset = sprint_changeset(sprint);

        self.run_blocking(move |connection| {
            let updated =
                diesel::update(sprints::table.filter(sprints::id.eq(sprint_id.into_inner())))
                    .set(&changeset)
                    .execute(connection)
                    .map_err(TrackerRepositoryError::persistence)?;
            if updated == 0 {
                return Err(TrackerRepositoryError::NotFound(RecordRef::Sprint(sprint_id)));
            }
            Ok(())
        })
        .await
    }

    async fn find_sprint(&self, id: SprintId) -> TrackerRepositoryResult<Option<Sprint>> {
        self.run_blocking(move |connection| {
            let row = sprints::table
                .filter(sprints::id.eq(id.into_inner()))
                .select(SprintRow::as_select())
                .first::<SprintRow>(connection)
                .optional()
                .map_err(TrackerRepositoryError::persistence)?;
            row.map(row_to_sprint).transpose()
        })
        .await
    }

    async fn list_sprints(&self, project_id: ProjectId) -> TrackerRepositoryResult<Vec<Sprint>> {
        self.run_blocking(move |connection| {
            let rows = sprints::table
                .filter(sprints::project_id.eq(project_id.into_inner()))
                .order((sprints::created_at.asc(), sprints::id.asc()))
                .select(SprintRow::as_select())
                .load::<SprintRow>(connection)
                .map_err(TrackerRepositoryError::persistence)?;
            rows.into_iter().map(row_to_sprint).collect()
        })
        .await
    }
}

#[async_trait]
impl CommentRepository for PostgresTrackerStore {
    async fn store_comment(&self, comment: &Comment) -> TrackerRepositoryResult<()> {
        let comment_id = comment.id();
        let issue_id = comment.issue_id();
        let new_row = comment_to_new_row(comment);

        self.run_blocking(move |connection| {
            diesel::insert_into(comments::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                        TrackerRepositoryError::NotFound(RecordRef::Issue(issue_id))
                    }
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        TrackerRepositoryError::DuplicateRecord(format!("comment {comment_id}"))
                    }
                    _ => TrackerRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn update_comment(&self, comment: &Comment) -> TrackerRepositoryResult<()> {
        let comment_id = comment.id();
        let body = comment.text().to_owned();
        let updated_at = comment.updated_at();

        self.run_blocking(move |connection| {
            let updated =
                diesel::update(comments::table.filter(comments::id.eq(comment_id.into_inner())))
                    .set((comments::body.eq(body), comments::updated_at.eq(updated_at)))
                    .execute(connection)
                    .map_err(TrackerRepositoryError::persistence)?;
            if updated == 0 {
                return Err(TrackerRepositoryError::NotFound(RecordRef::Comment(
                    comment_id,
                )));
            }
            Ok(())
        })
        .await
    }

    async fn find_comment(&self, id: CommentId) -> TrackerRepositoryResult<Option<Comment>> {
        self.run_blocking(move |connection| {
            let row = comments::table
                .filter(comments::id.eq(id.into_inner()))
                .select(CommentRow::as_select())
                .first::<CommentRow>(connection)
                .optional()
                .map_err(TrackerRepositoryError::persistence)?;
            Ok(row.map(row_to_comment))
        })
        .await
    }

    async fn list_comments(&self, issue_id: IssueId) -> TrackerRepositoryResult<Vec<Comment>> {
        self.run_blocking(move |connection| {
            let rows = comments::table
                .filter(comments::issue_id.eq(issue_id.into_inner()))
                .order((comments::created_at.asc(), comments::id.asc()))
                .select(CommentRow::as_select())
                .load::<CommentRow>(connection)
                .map_err(TrackerRepositoryError::persistence)?;
            Ok(rows.into_iter().map(row_to_comment).collect())
        })
        .await
    }

    async fn delete_comment(&self, id: CommentId) -> TrackerRepositoryResult<()> {
        self.run_blocking(move |connection| {
            let deleted = diesel::delete(comments::table.filter(comments::id.eq(id.into_inner())))
                .execute(connection)
                .map_err(TrackerRepositoryError::persistence)?;
            if deleted == 0 {
                return Err(TrackerRepositoryError::NotFound(RecordRef::Comment(id)));
            }
            Ok(())
        })
        .await
    }
}

fn filtered_issues(filter: &IssueFilter) -> issues::BoxedQuery<'static, diesel::pg::Pg> {
    let mut query = issues::table.into_boxed();
    if let Some(project_id) = filter.project_id {
        query = query.filter(issues::project_id.eq(project_id.into_inner()));
    }
    if let Some(status) = filter.status {
        query = query.filter(issues::status.eq(status.as_str()));
    }
    if let Some(assignee) = filter.assignee {
        query = query.filter(issues::assignee_id.eq(assignee.into_inner()));
    }
    if let Some(issue_type) = filter.issue_type {
        query = query.filter(issues::issue_type.eq(issue_type.as_str()));
    }
    match filter.sprint {
        Some(SprintScope::Backlog) => query = query.filter(issues::sprint_id.is_null()),
        Some(SprintScope::Sprint(sprint_id)) => {
            query = query.filter(issues::sprint_id.eq(sprint_id.into_inner()));
        }
        None => {}
    }
    if let Some(needle) = filter.search.as_deref() {
        let pattern = contains_pattern(needle);
        query = query.filter(
            issues::title
                .ilike(pattern.clone())
                .or(issues::issue_key.ilike(pattern.clone()))
                .or(issues::description.ilike(pattern)),
        );
    }
    query
}

fn project_write_error(
    err: DieselError,
    key: &ProjectKey,
    project_id: ProjectId,
) -> TrackerRepositoryError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
            if violates(info.as_ref(), PROJECTS_KEY_CONSTRAINT) =>
        {
            TrackerRepositoryError::DuplicateProjectKey(key.clone())
        }
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            TrackerRepositoryError::DuplicateRecord(format!("project {project_id}"))
        }
        _ => TrackerRepositoryError::persistence(err),
    }
}

impl From<DieselError> for TrackerRepositoryError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

fn violates(info: &dyn DatabaseErrorInformation, constraint: &str) -> bool {
    info.constraint_name().is_some_and(|name| name == constraint)
}
