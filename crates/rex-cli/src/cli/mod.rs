//! CLI for the rex retry executor.

mod args;
mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use rex_core::config;

pub use args::RetryArgs;
use commands::{run_command, run_config, run_schedule};

/// Top-level CLI for rex.
#[derive(Debug, Parser)]
#[command(name = "rex")]
#[command(about = "rex: re-run failing commands with exponential backoff", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Run a program, re-running it with backoff until it exits 0.
    Run {
        #[command(flatten)]
        retry: RetryArgs,

        /// Exit code that triggers a retry (repeatable). Default: any non-zero code.
        #[arg(long = "retry-on-exit", value_name = "CODE")]
        retry_on_exit: Vec<i32>,

        /// Program and arguments, after `--`.
        #[arg(required = true, last = true, value_name = "PROGRAM")]
        command: Vec<String>,
    },

    /// Print the backoff delay window before each retry.
    Schedule {
        #[command(flatten)]
        retry: RetryArgs,
    },

    /// Show the config file path and effective retry settings.
    Config,
}

impl CliCommand {
    /// Parse arguments, run the command and return the process exit code.
    pub async fn run_from_args() -> Result<i32> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Run {
                retry,
                retry_on_exit,
                command,
            } => run_command(&cfg, &retry, retry_on_exit, &command).await,
            CliCommand::Schedule { retry } => run_schedule(&cfg, &retry).map(|()| 0),
            CliCommand::Config => run_config(&cfg).map(|()| 0),
        }
    }
}

#[cfg(test)]
mod tests;
