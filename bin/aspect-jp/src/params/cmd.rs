use std::{fs, path::PathBuf};

use aspect_provider::{
    params::{ChainParams, EthereumChainConfig, ParamsKeeper},
    StateContext,
};
use clap::Parser;
use serde::Serialize;
use tracing::info;

use crate::common::{print_json, EnvArgs, Result};

/// Output of the params command
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ParamsOutput {
    params: ChainParams,
    chain_config: EthereumChainConfig,
    active_forks: Vec<&'static str>,
}

/// Validate chain parameters and resolve the chain config
#[derive(Parser, Debug)]
pub struct Cmd {
    /// JSON file with the chain parameters. Defaults are used without it.
    #[arg(long = "params.file")]
    pub params_file: Option<PathBuf>,

    /// Write the parameters to the legacy subspace and migrate them, instead of writing them
    /// directly
    #[arg(long = "params.legacy")]
    pub legacy: bool,

    /// Environment configuration
    #[command(flatten)]
    pub env_args: EnvArgs,
}

impl Cmd {
    /// Execute the params command
    pub fn run(&self) -> Result<()> {
        let ctx = self.env_args.create_state_context();
        print_json(&self.store_and_resolve(&ctx)?)
    }

    /// Stores the loaded parameters in `ctx` through the keeper and reads them back.
    fn store_and_resolve(&self, ctx: &StateContext) -> Result<ParamsOutput> {
        let params = self.load_params()?;
        let keeper = ParamsKeeper::default();

        if self.legacy {
            keeper.legacy().set_param_set(ctx, &params)?;
            let migrated = keeper.migrate_legacy(ctx)?;
            info!(migrated, "Legacy params migrated");
        } else {
            keeper.set_params(ctx, &params)?;
        }

        let stored = keeper.params(ctx)?;
        let chain_config = keeper.chain_config(ctx)?;
        let active_forks =
            chain_config.config.active_forks(ctx.block_height(), ctx.header().timestamp);
        Ok(ParamsOutput { params: stored, chain_config, active_forks })
    }

    fn load_params(&self) -> Result<ChainParams> {
        let Some(path) = &self.params_file else {
            return Ok(ChainParams::default());
        };
        info!(params_path = ?path, "Loading params from file");
        Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
    }
}
