//! `nanoctl start`: start a cluster, creating it on first use.

use std::path::PathBuf;

use clap::Args;
use nanoctl_common::config::NanoConfig;
use nanoctl_common::types::ClusterName;
use nanoctl_runtime::controller::{Controller, StartOptions, StartOutcome};

use super::status;
use crate::output;

/// Arguments for the `start` command.
#[derive(Args, Debug)]
pub struct StartArgs {
    /// Cluster name.
    pub name: ClusterName,

    /// Host directory exposed to the cluster.
    #[arg(short = 'd', long = "work-dir")]
    pub work_dir: Option<PathBuf>,

    /// Image to create the cluster from.
    #[arg(short, long)]
    pub image: Option<String>,
}

/// Executes the `start` command, then waits for the cluster and prints
/// its status report.
///
/// # Errors
///
/// Returns an error if the cluster cannot be created or started, or never
/// becomes healthy.
pub fn execute(args: StartArgs, config: NanoConfig) -> anyhow::Result<()> {
    let controller = Controller::new(config)?;
    let options = StartOptions {
        image: args.image,
        working_dir: args.work_dir,
    };

    match controller.start(&args.name, &options, &mut output::pull_progress)? {
        StartOutcome::AlreadyRunning(message) => {
            println!("{message}");
            return Ok(());
        }
        StartOutcome::Restarted => println!("Starting cluster {}...", args.name),
        StartOutcome::Created { port, image } => {
            println!("Running cluster {} from {image} on port {port}...", args.name);
        }
    }
    status::report(&controller, &args.name)
}
