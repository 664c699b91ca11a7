//! Then steps for issue workflow BDD scenarios.

use super::world::{IssueWorkflowWorld, run_async};
use rstest_bdd_macros::then;
use trackwell::tracker::{
    domain::{IssueFilter, IssueStatus},
    services::ErrorKind,
};

#[then(r#"the issue keys are "{keys}""#)]
fn issue_keys_are(world: &IssueWorkflowWorld, keys: String) -> Result<(), eyre::Report> {
    let expected: Vec<&str> = keys.split(',').map(str::trim).collect();
    let actual: Vec<String> = world
        .created
        .iter()
        .map(|issue| issue.key().to_string())
        .collect();
    if actual != expected {
        return Err(eyre::eyre!("expected keys {expected:?}, found {actual:?}"));
    }
    Ok(())
}

#[then(r#"the last created issue has key "{key}""#)]
fn last_issue_has_key(world: &IssueWorkflowWorld, key: String) -> Result<(), eyre::Report> {
    let issue = world
        .created
        .last()
        .ok_or_else(|| eyre::eyre!("no issue was created"))?;
    eyre::ensure!(
        issue.key().to_string() == key,
        "expected key {key}, found {}",
        issue.key()
    );
    Ok(())
}

#[then(r#"issue "{key}" has status "{status}""#)]
fn issue_has_status(
    world: &IssueWorkflowWorld,
    key: String,
    status: String,
) -> Result<(), eyre::Report> {
    let expected = IssueStatus::try_from(status.as_str())
        .map_err(|err| eyre::eyre!("invalid status in scenario: {err}"))?;
    let issue = world.issue(&key)?;
    eyre::ensure!(
        issue.status() == expected,
        "expected status {expected}, found {}",
        issue.status()
    );
    Ok(())
}

#[then(r#"issue "{key}" has {count:usize} activity entries"#)]
fn issue_has_activity_count(
    world: &IssueWorkflowWorld,
    key: String,
    count: usize,
) -> Result<(), eyre::Report> {
    let issue = world.issue(&key)?;
    let entries = run_async(world.issues.activities(issue.id()))?;
    eyre::ensure!(
        entries.len() == count,
        "expected {count} activity entries, found {}",
        entries.len()
    );
    Ok(())
}

#[then(r#"the latest activity of issue "{key}" reads "{description}""#)]
fn latest_activity_reads(
    world: &IssueWorkflowWorld,
    key: String,
    description: String,
) -> Result<(), eyre::Report> {
    let issue = world.issue(&key)?;
    let entries = run_async(world.issues.activities(issue.id()))?;
    let latest = entries
        .last()
        .ok_or_else(|| eyre::eyre!("issue {key} has no activity"))?;
    eyre::ensure!(
        latest.description() == description,
        "expected \"{description}\", found \"{}\"",
        latest.description()
    );
    Ok(())
}

#[then("the request is rejected as unauthenticated")]
fn rejected_as_unauthenticated(world: &IssueWorkflowWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing request result"))?;
    match result {
        Err(err) if err.kind() == ErrorKind::Unauthenticated => Ok(()),
        other => Err(eyre::eyre!("expected an unauthenticated error, got {other:?}")),
    }
}

#[then("the project has no issues")]
fn project_has_no_issues(world: &IssueWorkflowWorld) -> Result<(), eyre::Report> {
    let project_id = world.project()?.id();
    let issues = run_async(world.issues.list(&IssueFilter::for_project(project_id)))?;
    eyre::ensure!(issues.is_empty(), "expected no issues, found {}", issues.len());
    Ok(())
}
