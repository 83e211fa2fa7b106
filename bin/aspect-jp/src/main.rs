//! Command-line tool to inspect Aspect join-point requests
//!
//! Decodes transactions, block environments and raw payloads into the join-point requests
//! handed to bonded Aspects, and validates chain parameters.

use clap::Parser;

mod cmd;
pub use cmd::*;

/// Block join-point requests
pub mod block;
/// Arguments, errors and helpers shared by the subcommands
pub mod common;
/// Raw payload join-point requests
pub mod data;
/// Chain parameters
pub mod params;
/// Transaction join-point requests
pub mod tx;

fn main() -> Result<(), Error> {
    let cmd = MainCmd::parse();
    cmd.log_args.init()?;
    cmd.run().inspect_err(|e| eprintln!("{e}"))
}
