//! `nanoctl status`: wait for a cluster and print its access details.

use anyhow::bail;
use clap::Args;
use nanoctl_common::config::NanoConfig;
use nanoctl_common::constants::ISSUE_TRACKER_URL;
use nanoctl_common::types::ClusterName;
use nanoctl_runtime::controller::{Controller, StatusOutcome};

use crate::output;

/// Arguments for the `status` command.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Cluster name.
    pub name: ClusterName,
}

/// Executes the `status` command.
///
/// # Errors
///
/// Returns an error if the cluster never becomes healthy or the engine
/// fails.
pub fn execute(args: StatusArgs, config: NanoConfig) -> anyhow::Result<()> {
    let controller = Controller::new(config)?;
    report(&controller, &args.name)
}

/// Prints the status report of a cluster, or its diagnostics when it is
/// unhealthy.
///
/// # Errors
///
/// Returns an error if a readiness phase timed out or the engine fails.
pub fn report(controller: &Controller, cluster: &ClusterName) -> anyhow::Result<()> {
    match controller.status(cluster)? {
        StatusOutcome::Ready(report) => println!("{report}"),
        StatusOutcome::NotMet(message) => println!("{message}"),
        StatusOutcome::Unhealthy {
            phase,
            diagnostic_log,
        } => {
            let container = controller.container_name(cluster);
            println!("{}", output::timeout_header(phase, cluster, &container));
            println!("{diagnostic_log}");
            bail!("Please open an issue at: {ISSUE_TRACKER_URL} with the logs above.");
        }
    }
    Ok(())
}
