//! In-memory integration tests for project management and cascading deletes.

use super::helpers::{Tracker, tracker};
use mockable::DefaultClock;
use rstest::rstest;
use trackwell::tracker::{
    domain::{IssueFilter, IssueStatus, ProjectCategory, ProjectKey, ProjectPatch},
    ports::{CommentRepository, ProjectRepository, SprintRepository, TrackerRepositoryError},
    services::{
        CreateIssueRequest, CreateProjectRequest, CreateSprintRequest, ErrorKind,
        TrackerServiceError, UpdateIssueRequest,
    },
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn project_keys_are_normalized_and_unique(tracker: Tracker) -> Result<(), eyre::Report> {
    let (owner, project) = tracker.demo_project().await?;
    eyre::ensure!(project.key().as_str() == "DEMO");
    eyre::ensure!(Some(project.owner()) == owner.user_id());
    eyre::ensure!(project.category() == ProjectCategory::Software);

    let duplicate = tracker
        .projects
        .create(&owner, CreateProjectRequest::new("Demo", "Another demo"))
        .await;
    eyre::ensure!(matches!(
        duplicate,
        Err(TrackerServiceError::Repository(
            TrackerRepositoryError::DuplicateProjectKey(_)
        ))
    ));

    let found = tracker.projects.find_by_key("demo").await?;
    eyre::ensure!(found.map(|stored| stored.id()) == Some(project.id()));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn project_key_locks_after_the_first_issue(tracker: Tracker) -> Result<(), eyre::Report> {
    let (owner, project) = tracker.demo_project().await?;
    let renamed = tracker
        .projects
        .update(
            &owner,
            project.id(),
            ProjectPatch {
                key: Some(ProjectKey::new("WEB")?),
                category: Some(ProjectCategory::Design),
                ..ProjectPatch::default()
            },
        )
        .await?;
    eyre::ensure!(renamed.key().as_str() == "WEB");
    eyre::ensure!(tracker.projects.find_by_key("DEMO").await?.is_none());

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
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn members_can_be_added_and_removed(tracker: Tracker) -> Result<(), eyre::Report> {
    let (owner, project) = tracker.demo_project().await?;
    let teammate = tracker.actor("Grace Hopper", "grace@example.com").await?;
    let teammate_id = teammate
        .user_id()
        .ok_or_else(|| eyre::eyre!("authenticated actor"))?;

    let joined = tracker
        .projects
        .add_member(&owner, project.id(), teammate_id)
        .await?;
    eyre::ensure!(joined.members() == [project.owner(), teammate_id]);

    let repeated = tracker
        .projects
        .add_member(&owner, project.id(), teammate_id)
        .await?;
    eyre::ensure!(repeated.members().len() == 2);

    let left = tracker
        .projects
        .remove_member(&owner, project.id(), teammate_id)
        .await?;
    eyre::ensure!(left.members() == [project.owner()]);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn stats_count_issues_per_status(tracker: Tracker) -> Result<(), eyre::Report> {
    let (owner, project) = tracker.demo_project().await?;
    let issues = tracker
        .create_issues(&owner, project.id(), &["a", "b", "c"])
        .await?;
    for (issue, status) in issues.iter().zip([IssueStatus::Done, IssueStatus::InReview]) {
        tracker
            .issues
            .update(&owner, issue.id(), UpdateIssueRequest::new().with_status(status))
            .await?;
    }

    let stats = tracker.projects.stats(project.id()).await?;
    eyre::ensure!(stats.total == 3);
    eyre::ensure!(stats.todo == 1);
    eyre::ensure!(stats.in_review == 1);
    eyre::ensure!(stats.done == 1);
    eyre::ensure!(stats.in_progress == 0);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleting_a_project_removes_everything_it_owns(
    tracker: Tracker,
) -> Result<(), eyre::Report> {
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
    let comment = tracker
        .comments
        .add(&owner, issue.id(), "Goodbye")
        .await?;

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
    eyre::ensure!(tracker.store.find_sprint(sprint.id()).await?.is_none());
    eyre::ensure!(tracker.store.find_comment(comment.id()).await?.is_none());
    eyre::ensure!(tracker.sprints.list_for_project(project.id()).await?.is_empty());

    let remaining = tracker.issues.list(&IssueFilter::new()).await?;
    eyre::ensure!(remaining == [survivor]);

    let again = tracker.projects.delete(&owner, project.id()).await;
    eyre::ensure!(again.is_err_and(|err| err.kind() == ErrorKind::NotFound));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn views_of_a_missing_project_are_not_found(tracker: Tracker) -> Result<(), eyre::Report> {
    let (owner, project) = tracker.demo_project().await?;
    tracker.projects.delete(&owner, project.id()).await?;

    let board = tracker.issues.board(project.id()).await;
    eyre::ensure!(board.is_err_and(|err| err.kind() == ErrorKind::NotFound));
    let backlog = tracker.issues.backlog(project.id()).await;
    eyre::ensure!(backlog.is_err_and(|err| err.kind() == ErrorKind::NotFound));
    let stats = tracker.projects.stats(project.id()).await;
    eyre::ensure!(stats.is_err_and(|err| err.kind() == ErrorKind::NotFound));
    let issue = tracker
        .issues
        .create(&owner, CreateIssueRequest::new(project.id(), "Orphan"))
        .await;
    eyre::ensure!(issue.is_err_and(|err| err.kind() == ErrorKind::NotFound));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn store_rejects_key_change_after_allocation(tracker: Tracker) -> Result<(), eyre::Report> {
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
    eyre::ensure!(matches!(
        result,
        Err(TrackerRepositoryError::ProjectKeyLocked(id)) if id == project.id()
    ));
    let stored = tracker
        .store
        .find_project(project.id())
        .await?
        .ok_or_else(|| eyre::eyre!("project should exist"))?;
    eyre::ensure!(stored.key().as_str() == "DEMO");
    eyre::ensure!(stored.issue_counter() == 1);
    Ok(())
}
