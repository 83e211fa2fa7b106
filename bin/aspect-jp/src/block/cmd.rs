use aspect_provider::BlockJoinPointRequest;
use clap::Parser;
use tracing::info;

use crate::common::{print_json, EnvArgs, Result};

/// Build the join-point request of a block
#[derive(Parser, Debug)]
pub struct Cmd {
    /// Environment configuration
    #[command(flatten)]
    pub env_args: EnvArgs,
}

impl Cmd {
    /// Execute the block command
    pub fn run(&self) -> Result<()> {
        let request = self.build_request();
        info!(block_number = request.header.number, "Block request built");
        print_json(&request)
    }

    fn build_request(&self) -> BlockJoinPointRequest {
        BlockJoinPointRequest::from_block_header(&self.env_args.create_state_context())
    }
}
