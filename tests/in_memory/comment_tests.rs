//! In-memory integration tests for issue comments.

use super::helpers::{Tracker, tracker};
use rstest::rstest;
use trackwell::tracker::{
    domain::{IssueId, TrackerDomainError},
    ports::CommentRepository,
    services::{CreateIssueRequest, ErrorKind, TrackerServiceError},
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn comments_are_listed_in_creation_order(tracker: Tracker) -> Result<(), eyre::Report> {
    let (owner, project) = tracker.demo_project().await?;
    let reviewer = tracker.actor("Grace Hopper", "grace@example.com").await?;
    let issue = tracker
        .issues
        .create(&owner, CreateIssueRequest::new(project.id(), "Review me"))
        .await?;

    tracker.comments.add(&owner, issue.id(), "Ready for review").await?;
    tracker.comments.add(&reviewer, issue.id(), "  Looks good  ").await?;

    let comments = tracker.comments.list_for_issue(issue.id()).await?;
    let texts: Vec<&str> = comments.iter().map(|comment| comment.text()).collect();
    eyre::ensure!(texts == ["Ready for review", "Looks good"]);
    eyre::ensure!(
        comments.iter().map(|comment| Some(comment.author())).collect::<Vec<_>>()
            == [owner.user_id(), reviewer.user_id()]
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn blank_comments_are_rejected(tracker: Tracker) -> Result<(), eyre::Report> {
    let (owner, project) = tracker.demo_project().await?;
    let issue = tracker
        .issues
        .create(&owner, CreateIssueRequest::new(project.id(), "Quiet issue"))
        .await?;

    let result = tracker.comments.add(&owner, issue.id(), "   ").await;
    eyre::ensure!(matches!(
        result,
        Err(TrackerServiceError::Domain(TrackerDomainError::EmptyField(_)))
    ));
    eyre::ensure!(tracker.comments.list_for_issue(issue.id()).await?.is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn comments_need_an_existing_issue(tracker: Tracker) -> Result<(), eyre::Report> {
    let (owner, _) = tracker.demo_project().await?;
    let result = tracker.comments.add(&owner, IssueId::new(), "Hello?").await;
    eyre::ensure!(result.is_err_and(|err| err.kind() == ErrorKind::NotFound));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleting_an_issue_removes_its_comments(tracker: Tracker) -> Result<(), eyre::Report> {
    let (owner, project) = tracker.demo_project().await?;
    let issue = tracker
        .issues
        .create(&owner, CreateIssueRequest::new(project.id(), "Short-lived"))
        .await?;
    let comment = tracker.comments.add(&owner, issue.id(), "Noted").await?;

    tracker.issues.delete(&owner, issue.id()).await?;
    eyre::ensure!(tracker.store.find_comment(comment.id()).await?.is_none());
    eyre::ensure!(tracker.comments.list_for_issue(issue.id()).await?.is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn only_authors_edit_their_comments(tracker: Tracker) -> Result<(), eyre::Report> {
    let (owner, project) = tracker.demo_project().await?;
    let other = tracker.actor("Grace Hopper", "grace@example.com").await?;
    let issue = tracker
        .issues
        .create(&owner, CreateIssueRequest::new(project.id(), "Discuss"))
        .await?;
    let comment = tracker.comments.add(&owner, issue.id(), "Draft").await?;

    let denied = tracker.comments.edit(&other, comment.id(), "Mine now").await;
    eyre::ensure!(denied.is_err_and(|err| err.kind() == ErrorKind::Validation));

    let edited = tracker.comments.edit(&owner, comment.id(), "Final").await?;
    eyre::ensure!(edited.text() == "Final");
    eyre::ensure!(edited.updated_at() >= comment.updated_at());

    let stored = tracker
        .store
        .find_comment(comment.id())
        .await?
        .ok_or_else(|| eyre::eyre!("comment should exist"))?;
    eyre::ensure!(stored == edited);
    Ok(())
}
