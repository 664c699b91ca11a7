//! Project key locking and cascading deletes against `PostgreSQL`.

use crate::postgres::helpers::{
    PostgresCluster, PostgresTracker, count_rows, keys, postgres_cluster,
};
use mockable::DefaultClock;
use rstest::rstest;
use trackwell::tracker::{
    domain::{IssueFilter, ProjectKey, ProjectPatch},
    ports::{CommentRepository, ProjectRepository, SprintRepository, TrackerRepositoryError},
    services::{CreateIssueRequest, CreateProjectRequest, CreateSprintRequest, ErrorKind},
};

#[rstest]
fn project_key_locks_after_the_first_issue(
    postgres_cluster: Option<PostgresCluster>,
) -> Result<(), eyre::Report> {
    let Some(tracker) = PostgresTracker::connect(postgres_cluster)? else {
        return Ok(());
    };
    tracker.block_on(async {
        let (owner, project) = tracker.demo_project().await?;
        let renamed = tracker
            .projects
            .update(
                &owner,
                project.id(),
                ProjectPatch {
                    key: Some(ProjectKey::new("WEB")?),
                    ..ProjectPatch::default()
                },
            )
            .await?;
        eyre::ensure!(renamed.key().as_str() == "WEB");

        let issue = tracker
            .issues
            .create(&owner, CreateIssueRequest::new(project.id(), "Locks the key"))
            .await?;
        eyre::ensure!(issue.key().to_string() == "WEB-1");

        let locked = tracker
            .projects
            .update(
                &owner,
                project.id(),
                ProjectPatch {
                    key: Some(ProjectKey::new("APP")?),
                    ..ProjectPatch::default()
                },
            )
            .await;
        eyre::ensure!(locked.is_err_and(|err| err.kind() == ErrorKind::InvalidState));
        Ok::<(), eyre::Report>(())
    })
}

#[rstest]
fn store_rejects_key_change_after_allocation(
    postgres_cluster: Option<PostgresCluster>,
) -> Result<(), eyre::Report> {
    let Some(tracker) = PostgresTracker::connect(postgres_cluster)? else {
        return Ok(());
    };
    tracker.block_on(async {
        let (_, project) = tracker.demo_project().await?;
        let mut stale = project.clone();

        tracker.store.allocate_issue_key(project.id()).await?;
        stale.apply_patch(
            ProjectPatch {
                key: Some(ProjectKey::new("LATE")?),
                ..ProjectPatch::default()
            },
            &DefaultClock,
        )?;

        let result = tracker.store.update_project(&stale).await;
        eyre::ensure!(
            matches!(
                result,
                Err(TrackerRepositoryError::ProjectKeyLocked(id)) if id == project.id()
            ),
            "unexpected update result: {result:?}"
        );
        let stored = tracker
            .store
            .find_project(project.id())
            .await?
            .ok_or_else(|| eyre::eyre!("project should exist"))?;
        eyre::ensure!(stored.key().as_str() == "DEMO");
        eyre::ensure!(stored.issue_counter() == 1);
        Ok::<(), eyre::Report>(())
    })
}

#[rstest]
fn deleting_a_project_removes_everything_it_owns(
    postgres_cluster: Option<PostgresCluster>,
) -> Result<(), eyre::Report> {
    let Some(tracker) = PostgresTracker::connect(postgres_cluster)? else {
        return Ok(());
    };
    let (sprint_id, comment_id, survivor) = tracker.block_on(async {
        let (owner, project) = tracker.demo_project().await?;
        let sprint = tracker
            .sprints
            .create(&owner, CreateSprintRequest::new(project.id(), "Sprint 1"))
            .await?;
        let issue = tracker
            .issues
            .create(
                &owner,
                CreateIssueRequest::new(project.id(), "Doomed").with_sprint(sprint.id()),
            )
            .await?;
        let comment = tracker.comments.add(&owner, issue.id(), "Goodbye").await?;

        let other = tracker
            .projects
            .create(&owner, CreateProjectRequest::new("OPS", "Operations"))
            .await?;
        let survivor = tracker
            .issues
            .create(&owner, CreateIssueRequest::new(other.id(), "Survives"))
            .await?;

        tracker.projects.delete(&owner, project.id()).await?;

        eyre::ensure!(tracker.projects.find_by_id(project.id()).await?.is_none());
        eyre::ensure!(tracker.issues.find_by_id(issue.id()).await?.is_none());
        let again = tracker.projects.delete(&owner, project.id()).await;
        eyre::ensure!(again.is_err_and(|err| err.kind() == ErrorKind::NotFound));
        Ok::<_, eyre::Report>((sprint.id(), comment.id(), survivor))
    })?;

    tracker.block_on(async {
        eyre::ensure!(tracker.store.find_sprint(sprint_id).await?.is_none());
        eyre::ensure!(tracker.store.find_comment(comment_id).await?.is_none());
        let remaining = tracker.issues.list(&IssueFilter::new()).await?;
        eyre::ensure!(keys(&remaining) == ["OPS-1"]);
        eyre::ensure!(remaining.first().map(|issue| issue.id()) == Some(survivor.id()));
        Ok::<(), eyre::Report>(())
    })?;

    let url = tracker.database_url();
    eyre::ensure!(count_rows(&url, "projects")? == 1);
    eyre::ensure!(count_rows(&url, "sprints")? == 0);
    eyre::ensure!(count_rows(&url, "issues")? == 1);
    eyre::ensure!(count_rows(&url, "comments")? == 0);
    Ok(())
}

#[rstest]
fn deleting_an_issue_removes_its_comments(
    postgres_cluster: Option<PostgresCluster>,
) -> Result<(), eyre::Report> {
    let Some(tracker) = PostgresTracker::connect(postgres_cluster)? else {
        return Ok(());
    };
    tracker.block_on(async {
        let (owner, project) = tracker.demo_project().await?;
        let issues = tracker
            .create_issues(&owner, project.id(), &["Doomed", "Kept"])
            .await?;
        let [doomed, kept] = issues.as_slice() else {
            eyre::bail!("expected two issues");
        };
        tracker.comments.add(&owner, doomed.id(), "First").await?;
        tracker.comments.add(&owner, doomed.id(), "Second").await?;
        let survivor = tracker.comments.add(&owner, kept.id(), "Stays").await?;

        tracker.issues.delete(&owner, doomed.id()).await?;

        eyre::ensure!(tracker.store.list_comments(doomed.id()).await?.is_empty());
        let kept_comments = tracker.store.list_comments(kept.id()).await?;
        eyre::ensure!(
            kept_comments.iter().map(|comment| comment.id()).collect::<Vec<_>>() == [survivor.id()]
        );
        Ok::<(), eyre::Report>(())
    })?;

    eyre::ensure!(count_rows(&tracker.database_url(), "comments")? == 1);
    Ok(())
}
