//! When steps for publish run BDD scenarios.

use super::world::{PublishWorld, run_async};
use eyre::WrapErr;
use miniship::release::{
    domain::{BranchName, NewTask, PlatformType, Task, UserId, VersionLabel},
    ports::TaskStore,
    services::PublishRequest,
};
use rstest_bdd_macros::when;

#[when(r#""{owner}" publishes "{platform_type}" from branch "{branch}" as version "{version}""#)]
fn publish(
    world: &mut PublishWorld,
    owner: String,
    platform_type: String,
    branch: String,
    version: String,
) -> Result<(), eyre::Report> {
    let request = PublishRequest::new(NewTask {
        platform_type: PlatformType::new(platform_type).wrap_err("platform type")?,
        version: VersionLabel::new(version).wrap_err("version")?,
        branch: BranchName::new(branch).wrap_err("branch")?,
        description: String::new(),
        owner: UserId::new(owner).wrap_err("owner")?,
    });
    let orchestrator = world.orchestrator();
    let id = run_async(orchestrator.publish(request))
        .ok_or_else(|| eyre::eyre!("publish did not create a task"))?;
    let persisted = run_async(world.store.get(id)).wrap_err("load published task")?;
    world.last_task =
        Some(Task::from_persisted(persisted).wrap_err("restore published task")?);
    Ok(())
}
