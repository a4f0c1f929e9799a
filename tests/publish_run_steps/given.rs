//! Given steps for publish run BDD scenarios.

use super::world::PublishWorld;
use rstest_bdd_macros::given;

#[given(r#"a configured target "{platform_type}" building with "{build_command}""#)]
fn configured_target(world: &mut PublishWorld, platform_type: String, build_command: String) {
    world.add_target(&platform_type, &build_command);
}

#[given(r#"the command "{command}" fails with "{detail}""#)]
fn failing_command(world: &mut PublishWorld, command: String, detail: String) {
    world.runner = world.runner.clone().failing_on(command, detail);
}
