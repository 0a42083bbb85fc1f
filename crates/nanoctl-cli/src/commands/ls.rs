//! `nanoctl ls`: list every cluster.

use nanoctl_common::config::NanoConfig;
use nanoctl_runtime::controller::Controller;

use crate::output;

/// Executes the `ls` command.
///
/// Stopped and unhealthy clusters are listed too; no health check runs.
///
/// # Errors
///
/// Returns an error if the engine cannot be queried.
pub fn execute(config: NanoConfig) -> anyhow::Result<()> {
    let controller = Controller::new(config)?;
    let rows = controller.list()?;

    if rows.is_empty() {
        println!("No clusters found.");
        return Ok(());
    }
    print!("{}", output::cluster_table(&rows));
    Ok(())
}
