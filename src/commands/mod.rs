pub mod confirm;
pub mod decline;
pub mod new;
pub mod open;
pub mod pending;

use anyhow::{Context, Result};
use showup_core::ReminderScheduler;
use showup_core::config::ShowUpConfig;
use showup_core::dispatch::FileDispatcher;

use crate::permission::PromptPermissionGate;

pub type Scheduler = ReminderScheduler<PromptPermissionGate, FileDispatcher>;

/// Wire the scheduler to the file-backed dispatcher and the config-backed
/// permission prompt.
pub fn build_scheduler(config: ShowUpConfig) -> Result<Scheduler> {
    let link_base = config.link_base_url()?;
    let dispatcher = FileDispatcher::new(&config.data_path());
    let namespace = config.namespace.clone();
    let tz = config.time_zone();

    Ok(ReminderScheduler::new(PromptPermissionGate::new(config), dispatcher, link_base)
        .with_namespace(namespace)
        .with_time_zone(tz))
}

pub fn parse_link(link: &str) -> Result<showup_core::Event> {
    showup_core::link::parse_link(link).context("Could not read event from link")
}
