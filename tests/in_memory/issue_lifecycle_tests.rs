//! In-memory integration tests for issue lifecycle operations.

use super::helpers::{Tracker, keys, tracker};
use rstest::rstest;
use trackwell::tracker::{
    config::WorkflowConfig,
    domain::{
        ActivityKind, IssueFilter, IssueKey, IssuePriority, IssueStatus, IssueType, SprintScope,
        StoryPoints,
    },
    ports::ProjectRepository,
    services::{
        CreateIssueRequest, CreateProjectRequest, CreateSprintRequest, ErrorKind,
        UpdateIssueRequest,
    },
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn issue_keys_are_sequential_and_never_reused(
    tracker: Tracker,
) -> Result<(), eyre::Report> {
    let (owner, project) = tracker.demo_project().await?;
    let issues = tracker
        .create_issues(&owner, project.id(), &["One", "Two", "Three"])
        .await?;
    eyre::ensure!(keys(&issues) == ["DEMO-1", "DEMO-2", "DEMO-3"]);

    let second = issues
        .get(1)
        .ok_or_else(|| eyre::eyre!("expected a second issue"))?;
    tracker.issues.delete(&owner, second.id()).await?;

    let fourth = tracker
        .issues
        .create(&owner, CreateIssueRequest::new(project.id(), "Four"))
        .await?;
    eyre::ensure!(fourth.key().to_string() == "DEMO-4");

    let remaining = tracker
        .issues
        .list(&IssueFilter::for_project(project.id()))
        .await?;
    eyre::ensure!(keys(&remaining) == ["DEMO-1", "DEMO-3", "DEMO-4"]);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn project_updates_do_not_rewind_the_issue_counter(
    tracker: Tracker,
) -> Result<(), eyre::Report> {
    let (owner, project) = tracker.demo_project().await?;
    tracker
        .create_issues(&owner, project.id(), &["One", "Two"])
        .await?;

    // `project` was loaded before any issue existed.
    tracker.store.update_project(&project).await?;
    let next = tracker
        .issues
        .create(&owner, CreateIssueRequest::new(project.id(), "Three"))
        .await?;
    eyre::ensure!(next.key().to_string() == "DEMO-3");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_applies_request_fields(tracker: Tracker) -> Result<(), eyre::Report> {
    let (owner, project) = tracker.demo_project().await?;
    let assignee = tracker.actor("Grace Hopper", "grace@example.com").await?;
    let assignee_id = assignee
        .user_id()
        .ok_or_else(|| eyre::eyre!("authenticated actor"))?;

    let issue = tracker
        .issues
        .create(
            &owner,
            CreateIssueRequest::new(project.id(), "Login fails on Safari")
                .with_description("Blank page after submit")
                .with_type(IssueType::Bug)
                .with_priority(IssuePriority::Highest)
                .with_assignee(assignee_id)
                .with_story_points(3)
                .with_labels(vec!["auth".to_owned(), "browser".to_owned()]),
        )
        .await?;

    eyre::ensure!(issue.issue_type() == IssueType::Bug);
    eyre::ensure!(issue.priority() == IssuePriority::Highest);
    eyre::ensure!(issue.status() == IssueStatus::Todo);
    eyre::ensure!(issue.assignee() == Some(assignee_id));
    eyre::ensure!(Some(issue.reporter()) == owner.user_id());
    eyre::ensure!(issue.story_points().map(StoryPoints::value) == Some(3));
    eyre::ensure!(issue.labels() == ["auth", "browser"]);

    let key = IssueKey::parse("DEMO-1")?;
    let found = tracker.issues.find_by_key(&key).await?;
    eyre::ensure!(found.as_ref() == Some(&issue));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn status_updates_append_to_the_activity_log(
    tracker: Tracker,
) -> Result<(), eyre::Report> {
    let (owner, project) = tracker.demo_project().await?;
    let issue = tracker
        .issues
        .create(&owner, CreateIssueRequest::new(project.id(), "Ship it"))
        .await?;

    tracker
        .issues
        .update(
            &owner,
            issue.id(),
            UpdateIssueRequest::new().with_status(IssueStatus::InProgress),
        )
        .await?;
    tracker
        .issues
        .update(
            &owner,
            issue.id(),
            UpdateIssueRequest::new()
                .with_status(IssueStatus::InProgress)
                .with_title("Ship it today"),
        )
        .await?;

    let activities = tracker.issues.activities(issue.id()).await?;
    let kinds: Vec<ActivityKind> = activities.iter().map(|entry| entry.kind()).collect();
    eyre::ensure!(
        kinds
            == [
                ActivityKind::Created,
                ActivityKind::StatusChanged {
                    from: IssueStatus::Todo,
                    to: IssueStatus::InProgress,
                },
            ]
    );

    let stored = tracker
        .issues
        .find_by_id(issue.id())
        .await?
        .ok_or_else(|| eyre::eyre!("issue should exist"))?;
    eyre::ensure!(stored.title() == "Ship it today");
    eyre::ensure!(stored.updated_at() >= issue.updated_at());
    Ok(())
}

#[rstest]
#[case(WorkflowConfig::default(), 2)]
#[case(WorkflowConfig::strict(), 3)]
#[tokio::test(flavor = "multi_thread")]
async fn unassignment_logging_follows_workflow_config(
    #[case] config: WorkflowConfig,
    #[case] expected_entries: usize,
) -> Result<(), eyre::Report> {
    let tracker = Tracker::with_config(config);
    let (owner, project) = tracker.demo_project().await?;
    let issue = tracker
        .issues
        .create(&owner, CreateIssueRequest::new(project.id(), "Pair on it"))
        .await?;

    tracker
        .issues
        .update(
            &owner,
            issue.id(),
            UpdateIssueRequest::new().with_assignee(owner.user_id()),
        )
        .await?;
    let cleared = tracker
        .issues
        .update(&owner, issue.id(), UpdateIssueRequest::new().with_assignee(None))
        .await?;

    eyre::ensure!(cleared.assignee().is_none());
    eyre::ensure!(cleared.activities().len() == expected_entries);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn dropping_on_the_same_column_changes_nothing(
    tracker: Tracker,
) -> Result<(), eyre::Report> {
    let (owner, project) = tracker.demo_project().await?;
    let issue = tracker
        .issues
        .create(&owner, CreateIssueRequest::new(project.id(), "Drag me"))
        .await?;

    let unchanged = tracker
        .issues
        .move_to_column(&owner, issue.id(), IssueStatus::Todo)
        .await?;
    eyre::ensure!(unchanged == issue);

    let moved = tracker
        .issues
        .move_to_column(&owner, issue.id(), IssueStatus::InReview)
        .await?;
    eyre::ensure!(moved.status() == IssueStatus::InReview);
    eyre::ensure!(moved.activities().len() == 2);

    let board = tracker.issues.board(project.id()).await?;
    eyre::ensure!(keys(board.column(IssueStatus::InReview)) == ["DEMO-1"]);
    eyre::ensure!(board.column(IssueStatus::Todo).is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn filters_combine_status_type_and_search(tracker: Tracker) -> Result<(), eyre::Report> {
    let (owner, project) = tracker.demo_project().await?;
    for (title, issue_type, status) in [
        ("Login button misaligned", IssueType::Bug, IssueStatus::Todo),
        ("Login with SSO", IssueType::Story, IssueStatus::InProgress),
        ("Nightly backup", IssueType::Task, IssueStatus::Todo),
    ] {
        tracker
            .issues
            .create(
                &owner,
                CreateIssueRequest::new(project.id(), title)
                    .with_type(issue_type)
                    .with_status(status),
            )
            .await?;
    }

    let base = IssueFilter::for_project(project.id());
    let login = tracker
        .issues
        .list(&base.clone().with_search("LOGIN"))
        .await?;
    eyre::ensure!(keys(&login) == ["DEMO-1", "DEMO-2"]);

    let todo_login = tracker
        .issues
        .list(&base.clone().with_search("login").with_status(IssueStatus::Todo))
        .await?;
    eyre::ensure!(keys(&todo_login) == ["DEMO-1"]);

    let by_key = tracker.issues.list(&base.clone().with_search("demo-3")).await?;
    eyre::ensure!(keys(&by_key) == ["DEMO-3"]);

    let stories = tracker.issues.list(&base.with_type(IssueType::Story)).await?;
    eyre::ensure!(keys(&stories) == ["DEMO-2"]);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn issues_move_between_sprint_and_backlog(tracker: Tracker) -> Result<(), eyre::Report> {
    let (owner, project) = tracker.demo_project().await?;
    let sprint = tracker
        .sprints
        .create(&owner, CreateSprintRequest::new(project.id(), "Sprint 1"))
        .await?;
    let issues = tracker
        .create_issues(&owner, project.id(), &["Planned", "Unplanned"])
        .await?;
    let planned = issues
        .first()
        .ok_or_else(|| eyre::eyre!("expected an issue"))?;

    let moved = tracker
        .issues
        .move_to_sprint(&owner, planned.id(), Some(sprint.id()))
        .await?;
    eyre::ensure!(moved.sprint_id() == Some(sprint.id()));
    eyre::ensure!(moved.status() == planned.status());

    let base = IssueFilter::for_project(project.id());
    let in_sprint = tracker
        .issues
        .list(&base.clone().with_sprint(SprintScope::Sprint(sprint.id())))
        .await?;
    eyre::ensure!(keys(&in_sprint) == ["DEMO-1"]);
    let backlog = tracker
        .issues
        .list(&base.with_sprint(SprintScope::Backlog))
        .await?;
    eyre::ensure!(keys(&backlog) == ["DEMO-2"]);

    let returned = tracker
        .issues
        .move_to_sprint(&owner, planned.id(), None)
        .await?;
    eyre::ensure!(returned.is_in_backlog());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn sprint_of_another_project_is_rejected_on_move(
    tracker: Tracker,
) -> Result<(), eyre::Report> {
    let (owner, project) = tracker.demo_project().await?;
    let other = tracker
        .projects
        .create(&owner, CreateProjectRequest::new("OPS", "Operations"))
        .await?;
    let foreign = tracker
        .sprints
        .create(&owner, CreateSprintRequest::new(other.id(), "Ops sprint"))
        .await?;
    let issue = tracker
        .issues
        .create(&owner, CreateIssueRequest::new(project.id(), "Stay home"))
        .await?;

    let result = tracker
        .issues
        .move_to_sprint(&owner, issue.id(), Some(foreign.id()))
        .await;
    eyre::ensure!(result.is_err_and(|err| err.kind() == ErrorKind::Validation));

    let stored = tracker
        .issues
        .find_by_id(issue.id())
        .await?
        .ok_or_else(|| eyre::eyre!("issue should exist"))?;
    eyre::ensure!(stored.is_in_backlog());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn missing_records_surface_as_not_found(tracker: Tracker) -> Result<(), eyre::Report> {
    let (owner, project) = tracker.demo_project().await?;
    let issue = tracker
        .issues
        .create(&owner, CreateIssueRequest::new(project.id(), "Short-lived"))
        .await?;
    tracker.issues.delete(&owner, issue.id()).await?;

    let update = tracker
        .issues
        .update(&owner, issue.id(), UpdateIssueRequest::new().with_title("Ghost"))
        .await;
    eyre::ensure!(update.is_err_and(|err| err.kind() == ErrorKind::NotFound));

    let repeat = tracker.issues.delete(&owner, issue.id()).await;
    eyre::ensure!(repeat.is_err_and(|err| err.kind() == ErrorKind::NotFound));
    eyre::ensure!(tracker.issues.find_by_id(issue.id()).await?.is_none());
    Ok(())
}
