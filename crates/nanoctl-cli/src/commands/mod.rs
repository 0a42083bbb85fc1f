//! CLI command definitions and dispatch.

pub mod image;
pub mod ls;
pub mod purge;
pub mod start;
pub mod status;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use nanoctl_common::config::NanoConfig;
use nanoctl_common::constants::{BIN_NAME, CONFIG_ENV};

/// nanoctl: a one-container storage cluster with an S3 gateway.
#[derive(Parser, Debug)]
#[command(name = BIN_NAME, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Path to a TOML configuration file.
    #[arg(long, global = true, env = CONFIG_ENV)]
    pub config: Option<PathBuf>,

    /// Log debug output to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List every cluster, running or not.
    Ls,
    /// Wait for a cluster to be healthy and print its access details.
    Status(status::StatusArgs),
    /// Start a cluster, creating it if needed.
    Start(start::StartArgs),
    /// Remove a cluster and, optionally, its image.
    Purge(purge::PurgeArgs),
    /// Inspect the cluster image on the registry.
    Image(image::ImageArgs),
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the command fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    let config = NanoConfig::load(cli.config.as_deref())?;
    tracing::debug!(config = ?cli.config, prefix = %config.container_prefix, "configuration loaded");

    match cli.command {
        Command::Ls => ls::execute(config),
        Command::Status(args) => status::execute(args, config),
        Command::Start(args) => start::execute(args, config),
        Command::Purge(args) => purge::execute(args, config),
        Command::Image(args) => image::execute(args, &config),
    }
}
