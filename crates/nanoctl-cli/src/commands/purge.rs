//! `nanoctl purge`: remove a cluster.

use anyhow::bail;
use clap::{Args, CommandFactory};
use nanoctl_common::config::NanoConfig;
use nanoctl_common::types::ClusterName;
use nanoctl_runtime::controller::{Controller, PurgeOptions, PurgeOutcome};

use super::Cli;

/// Arguments for the `purge` command.
#[derive(Args, Debug)]
pub struct PurgeArgs {
    /// Cluster name.
    pub name: ClusterName,

    /// Confirm the cluster and its data may be destroyed.
    #[arg(long = "yes-i-am-sure")]
    pub yes_i_am_sure: bool,

    /// Also remove the image the cluster runs.
    #[arg(long)]
    pub all: bool,
}

/// Executes the `purge` command.
///
/// Removal failures are not reported as command failures.
///
/// # Errors
///
/// Returns an error if confirmation is missing or the engine cannot be
/// queried.
pub fn execute(args: PurgeArgs, config: NanoConfig) -> anyhow::Result<()> {
    let controller = Controller::new(config)?;
    let options = PurgeOptions {
        confirmed: args.yes_i_am_sure,
        remove_image: args.all,
    };

    match controller.purge(&args.name, options)? {
        PurgeOutcome::Unconfirmed => {
            println!("Purge option is too dangerous please set the right flag.\n");
            if let Some(purge) = Cli::command().find_subcommand_mut("purge") {
                purge.print_help()?;
            }
            bail!("refusing to purge {} without --yes-i-am-sure", args.name);
        }
        PurgeOutcome::NotMet(message) => println!("{message}"),
        PurgeOutcome::Purged { image } => {
            println!("Purged cluster {}.", args.name);
            if let Some(image) = image {
                println!("Deleted image {image}.");
            }
        }
    }
    Ok(())
}
