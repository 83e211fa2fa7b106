use clap::{Parser, Subcommand};

use crate::common::{JpError, LogArgs};

/// Main command of the aspect-jp CLI tool
#[derive(Parser, Debug)]
#[command(infer_subcommands = true, version = "0.1")]
pub struct MainCmd {
    /// Logging configuration
    #[command(flatten)]
    pub log_args: LogArgs,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands of the aspect-jp CLI tool
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build the join-point request of a signed transaction
    Tx(crate::tx::Cmd),
    /// Build the join-point request of a block
    Block(crate::block::Cmd),
    /// Build the join-point request of a raw payload
    Data(crate::data::Cmd),
    /// Validate chain parameters and resolve the chain config
    Params(crate::params::Cmd),
}

/// Error types for the main command system
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Command error
    #[error("{0}")]
    Command(#[from] JpError),
    /// Failed to set up logging
    #[error("Failed to create log file: {0}")]
    Logging(#[from] std::io::Error),
}

impl MainCmd {
    /// Execute the main command
    pub fn run(&self) -> Result<(), Error> {
        match &self.command {
            Command::Tx(cmd) => cmd.run()?,
            Command::Block(cmd) => cmd.run()?,
            Command::Data(cmd) => cmd.run()?,
            Command::Params(cmd) => cmd.run()?,
        }
        Ok(())
    }
}
