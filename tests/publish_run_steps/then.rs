//! Then steps for publish run BDD scenarios.

use super::world::PublishWorld;
use miniship::release::domain::Task;
use rstest_bdd_macros::then;

fn last_task(world: &PublishWorld) -> Result<&Task, eyre::Report> {
    world
        .last_task
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing published task in scenario world"))
}

#[then(r#"the task status is "{status}""#)]
fn task_status(world: &PublishWorld, status: String) -> Result<(), eyre::Report> {
    let task = last_task(world)?;
    if task.status().as_str() != status {
        return Err(eyre::eyre!(
            "expected status {status}, found {}",
            task.status()
        ));
    }
    Ok(())
}

#[then("the journal holds {count:usize} events")]
fn journal_length(world: &PublishWorld, count: usize) -> Result<(), eyre::Report> {
    let task = last_task(world)?;
    if task.journal().len() != count {
        return Err(eyre::eyre!(
            "expected {count} journal events, found {}",
            task.journal().len()
        ));
    }
    Ok(())
}

#[then("the task has a QR code URL")]
fn has_qr_code_url(world: &PublishWorld) -> Result<(), eyre::Report> {
    match last_task(world)?.qr_code_url() {
        Some(url) if !url.is_empty() => Ok(()),
        other => Err(eyre::eyre!("expected a QR code URL, found {other:?}")),
    }
}

#[then(r#"the task error is "{message}""#)]
fn task_error(world: &PublishWorld, message: String) -> Result<(), eyre::Report> {
    let task = last_task(world)?;
    if task.error_message() != Some(message.as_str()) {
        return Err(eyre::eyre!(
            "expected error {message:?}, found {:?}",
            task.error_message()
        ));
    }
    Ok(())
}

#[then("the owner received a run confirmation")]
fn run_confirmed(world: &PublishWorld) -> Result<(), eyre::Report> {
    if world.notifier.confirmation_count() != 1 {
        return Err(eyre::eyre!(
            "expected one run confirmation, found {}",
            world.notifier.confirmation_count()
        ));
    }
    Ok(())
}
