//! Block environment configuration for aspect-jp

use std::sync::Arc;

use alloy_consensus::Header;
use alloy_primitives::{Address, B256};
use aspect_provider::{
    constants::{EVM_STORE_KEY, PARAMS_STORE_KEY},
    MemoryStore, StateContext,
};
use clap::Parser;
use tracing::debug;

/// The chain id of the Artela mainnet.
pub const DEFAULT_CHAIN_ID: u64 = 11820;

/// Environment configuration arguments (chain id and block header)
#[derive(Parser, Debug, Clone)]
pub struct EnvArgs {
    /// `ChainID` of the executing chain
    #[arg(long = "state.chainid", default_value_t = DEFAULT_CHAIN_ID)]
    pub chain_id: u64,

    /// Block number
    #[arg(long = "block.number", default_value = "1")]
    pub block_number: u64,

    /// Block coinbase/beneficiary address
    #[arg(long = "block.coinbase", default_value = "0x0000000000000000000000000000000000000000")]
    pub block_coinbase: Address,

    /// Block timestamp
    #[arg(long = "block.timestamp", default_value = "1")]
    pub block_timestamp: u64,

    /// Block gas limit
    #[arg(long = "block.gaslimit", default_value = "30000000")]
    pub block_gas_limit: u64,

    /// Block base fee per gas (EIP-1559). Fee caps are not checked without it.
    #[arg(long = "block.basefee")]
    pub block_basefee: Option<u64>,

    /// Hash identifying the block, if other than the hash of the header
    #[arg(long = "block.hash")]
    pub block_hash: Option<B256>,
}

impl EnvArgs {
    /// Creates the block [`Header`].
    pub fn create_header(&self) -> Header {
        Header {
            number: self.block_number,
            beneficiary: self.block_coinbase,
            timestamp: self.block_timestamp,
            gas_limit: self.block_gas_limit,
            base_fee_per_gas: self.block_basefee,
            ..Default::default()
        }
    }

    /// Creates a [`StateContext`] for the block with empty EVM and params stores.
    pub fn create_state_context(&self) -> StateContext {
        let mut ctx = StateContext::new(self.chain_id, self.create_header())
            .with_store(EVM_STORE_KEY, Arc::new(MemoryStore::new()))
            .with_store(PARAMS_STORE_KEY, Arc::new(MemoryStore::new()));
        if let Some(block_hash) = self.block_hash {
            ctx = ctx.with_header_hash(block_hash);
        }
        debug!(
            chain_id = ctx.chain_id(),
            block_number = ctx.block_height(),
            header_hash = %ctx.header_hash(),
            "State context created"
        );
        ctx
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Parser, Debug)]
    struct TestCmd {
        #[command(flatten)]
        env_args: EnvArgs,
    }

    #[test]
    fn test_defaults() {
        let cmd = TestCmd::parse_from(["test"]);
        let ctx = cmd.env_args.create_state_context();

        assert_eq!(ctx.chain_id(), DEFAULT_CHAIN_ID);
        assert_eq!(ctx.block_height(), 1);
        assert_eq!(ctx.header().base_fee_per_gas, None);
        assert_eq!(ctx.header_hash(), ctx.header().hash_slow());
        assert!(ctx.kv_store(&EVM_STORE_KEY).is_some());
    }

    #[test]
    fn test_block_overrides() {
        let hash = B256::repeat_byte(0xab);
        let hash_arg = hash.to_string();
        let cmd = TestCmd::parse_from([
            "test",
            "--state.chainid",
            "1",
            "--block.number",
            "42",
            "--block.basefee",
            "7",
            "--block.hash",
            hash_arg.as_str(),
        ]);
        let ctx = cmd.env_args.create_state_context();

        assert_eq!(ctx.chain_id(), 1);
        assert_eq!(ctx.block_height(), 42);
        assert_eq!(ctx.header().base_fee_per_gas, Some(7));
        assert_eq!(ctx.header_hash(), hash);
    }
}
