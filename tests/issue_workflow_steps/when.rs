//! When steps for issue workflow BDD scenarios.

use super::world::{IssueWorkflowWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::when;
use trackwell::tracker::{
    domain::{ActorContext, IssueStatus},
    services::CreateIssueRequest,
};

#[when("the user creates {count:usize} issues")]
fn user_creates_issues(world: &mut IssueWorkflowWorld, count: usize) -> Result<(), eyre::Report> {
    let actor = *world.actor()?;
    let project_id = world.project()?.id();
    for index in 1..=count {
        let issue = run_async(world.issues.create(
            &actor,
            CreateIssueRequest::new(project_id, format!("Issue {index}")),
        ))
        .wrap_err("create issue")?;
        world.created.push(issue);
    }
    Ok(())
}

#[when(r#"the user creates an issue titled "{title}""#)]
fn user_creates_issue(world: &mut IssueWorkflowWorld, title: String) -> Result<(), eyre::Report> {
    let actor = *world.actor()?;
    let project_id = world.project()?.id();
    let issue = run_async(
        world
            .issues
            .create(&actor, CreateIssueRequest::new(project_id, title)),
    )
    .wrap_err("create titled issue")?;
    world.created.push(issue);
    Ok(())
}

#[when(r#"an anonymous user creates an issue titled "{title}""#)]
fn anonymous_creates_issue(
    world: &mut IssueWorkflowWorld,
    title: String,
) -> Result<(), eyre::Report> {
    let project_id = world.project()?.id();
    let result = run_async(world.issues.create(
        &ActorContext::anonymous(),
        CreateIssueRequest::new(project_id, title),
    ));
    world.last_result = Some(result);
    Ok(())
}

#[when(r#"the user deletes issue "{key}""#)]
fn user_deletes_issue(world: &mut IssueWorkflowWorld, key: String) -> Result<(), eyre::Report> {
    let actor = *world.actor()?;
    let issue = world.issue(&key)?;
    run_async(world.issues.delete(&actor, issue.id())).wrap_err("delete issue")?;
    Ok(())
}

#[when(r#"the user moves issue "{key}" to "{status}""#)]
fn user_moves_issue(
    world: &mut IssueWorkflowWorld,
    key: String,
    status: String,
) -> Result<(), eyre::Report> {
    let target = IssueStatus::try_from(status.as_str())
        .map_err(|err| eyre::eyre!("invalid status in scenario: {err}"))?;
    let actor = *world.actor()?;
    let issue = world.issue(&key)?;
    let result = run_async(world.issues.move_to_column(&actor, issue.id(), target));
    world.last_result = Some(result);
    Ok(())
}
