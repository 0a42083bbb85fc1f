//! `nanoctl image`: registry information about the cluster image.

use clap::{Args, Subcommand};
use nanoctl_common::config::NanoConfig;
use nanoctl_runtime::registry;

use crate::output;

/// Arguments for the `image` command.
#[derive(Args, Debug)]
pub struct ImageArgs {
    /// Image subcommand.
    #[command(subcommand)]
    pub command: ImageCommand,
}

/// Image subcommands.
#[derive(Subcommand, Debug)]
pub enum ImageCommand {
    /// Count the tags published on the registry.
    Tags,
}

/// Executes the `image` command.
///
/// # Errors
///
/// Returns an error if the registry is unreachable or answers garbage.
pub fn execute(args: ImageArgs, config: &NanoConfig) -> anyhow::Result<()> {
    match args.command {
        ImageCommand::Tags => {
            let summary = registry::fetch_tag_summary(
                &config.registry_tags_url,
                config.readiness.http_timeout(),
            )?;
            println!("{}", output::tag_summary(summary));
        }
    }
    Ok(())
}
