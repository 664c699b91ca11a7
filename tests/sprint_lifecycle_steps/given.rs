//! Given steps for sprint lifecycle BDD scenarios.

use super::world::{SprintWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::given;
use trackwell::tracker::{
    domain::ActorContext,
    services::{
        CreateIssueRequest, CreateProjectRequest, CreateSprintRequest, RegisterUserRequest,
    },
};

#[given(r#"a project with key "{key}""#)]
fn project_with_key(world: &mut SprintWorld, key: String) -> Result<(), eyre::Report> {
    let owner = run_async(
        world
            .users
            .register(RegisterUserRequest::new("Ada Lovelace", "ada@example.com")),
    )
    .wrap_err("register project owner")?;
    let actor = ActorContext::authenticated(owner.id());
    let project = run_async(
        world
            .projects
            .create(&actor, CreateProjectRequest::new(key, "Sprint project")),
    )
    .wrap_err("create project for sprint scenario")?;

    world.actor = Some(actor);
    world.project = Some(project);
    Ok(())
}

#[given(r#"a planned sprint named "{name}""#)]
fn planned_sprint(world: &mut SprintWorld, name: String) -> Result<(), eyre::Report> {
    let actor = world.actor()?;
    let project_id = world.project()?.id();
    run_async(
        world
            .sprints
            .create(&actor, CreateSprintRequest::new(project_id, name)),
    )
    .wrap_err("create planned sprint")?;
    Ok(())
}

#[given(r#"sprint "{name}" has been started"#)]
fn sprint_started(world: &mut SprintWorld, name: String) -> Result<(), eyre::Report> {
    let actor = world.actor()?;
    let sprint = world.sprint(&name)?;
    run_async(world.sprints.start(&actor, sprint.id())).wrap_err("start sprint")?;
    Ok(())
}

#[given(r#"sprint "{name}" has been completed"#)]
fn sprint_completed(world: &mut SprintWorld, name: String) -> Result<(), eyre::Report> {
    let actor = world.actor()?;
    let sprint = world.sprint(&name)?;
    run_async(world.sprints.complete(&actor, sprint.id())).wrap_err("complete sprint")?;
    Ok(())
}

#[given(r#"an issue titled "{title}" in sprint "{name}""#)]
fn issue_in_sprint(
    world: &mut SprintWorld,
    title: String,
    name: String,
) -> Result<(), eyre::Report> {
    let actor = world.actor()?;
    let project_id = world.project()?.id();
    let sprint = world.sprint(&name)?;
    run_async(world.issues.create(
        &actor,
        CreateIssueRequest::new(project_id, title).with_sprint(sprint.id()),
    ))
    .wrap_err("create sprint issue")?;
    Ok(())
}

#[given(r#"an issue titled "{title}" in the backlog"#)]
fn issue_in_backlog(world: &mut SprintWorld, title: String) -> Result<(), eyre::Report> {
    let actor = world.actor()?;
    let project_id = world.project()?.id();
    run_async(
        world
            .issues
            .create(&actor, CreateIssueRequest::new(project_id, title)),
    )
    .wrap_err("create backlog issue")?;
    Ok(())
}
