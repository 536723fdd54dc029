use std::path::Path;
use std::sync::Arc;

use crate::domain::clock::SystemClock;
use crate::domain::config::SchedulerConfig;
use crate::domain::quota::completion_notifier::LoggingNotifier;
use crate::domain::scheduler::Scheduler;
use crate::error::Result;

pub mod api;
pub mod domain;
pub mod error;
pub mod loader;
pub mod logger;

/// Builds a scheduler from a configuration file and seeds it with a
/// recorded scenario. The logger is left to the caller.
pub fn generate_scheduler(config_path: impl AsRef<Path>, scenario_path: impl AsRef<Path>) -> Result<Scheduler> {
    let config = SchedulerConfig::load(config_path)?;
    log::info!("Configuration parsed successfully.");

    let scheduler = Scheduler::in_memory(config, Arc::new(SystemClock), Arc::new(LoggingNotifier))?;
    scheduler.import_scenario_file(scenario_path)?;
    log::info!("Scheduler constructed successfully.");

    Ok(scheduler)
}
