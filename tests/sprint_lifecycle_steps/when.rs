//! When steps for sprint lifecycle BDD scenarios.

use super::world::{SprintWorld, run_async};
use rstest_bdd_macros::when;

#[when(r#"the user starts sprint "{name}""#)]
fn user_starts_sprint(world: &mut SprintWorld, name: String) -> Result<(), eyre::Report> {
    let actor = world.actor()?;
    let sprint = world.sprint(&name)?;
    let result = run_async(world.sprints.start(&actor, sprint.id()));
    world.last_result = Some(result);
    Ok(())
}

#[when(r#"the user completes sprint "{name}""#)]
fn user_completes_sprint(world: &mut SprintWorld, name: String) -> Result<(), eyre::Report> {
    let actor = world.actor()?;
    let sprint = world.sprint(&name)?;
    let result = run_async(world.sprints.complete(&actor, sprint.id()));
    world.last_result = Some(result);
    Ok(())
}
