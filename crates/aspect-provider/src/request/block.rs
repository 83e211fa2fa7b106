//! Block-level join-point requests.

use alloy_consensus::Header;
use alloy_primitives::B256;
use serde::{Deserialize, Serialize};

use crate::{GasInfo, StateContext};

/// A block-level join-point request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockJoinPointRequest {
    /// The header of the executing block
    pub header: Header,
    /// The hash identifying the executing block
    pub header_hash: B256,
    /// Gas counters, zero until the caller accumulates the block's transactions into them
    pub gas_info: GasInfo,
}

impl BlockJoinPointRequest {
    /// Builds the request for the block of `ctx`.
    pub fn from_block_header(ctx: &StateContext) -> Self {
        Self {
            header: ctx.header().clone(),
            header_hash: ctx.header_hash(),
            gas_info: GasInfo::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::state_context;

    #[test]
    fn test_block_request_snapshot() {
        let ctx = state_context(100, 11820);
        let mut request = BlockJoinPointRequest::from_block_header(&ctx);

        assert_eq!(request.header.number, 100);
        assert_eq!(request.header_hash, ctx.header_hash());
        assert!(request.gas_info.is_zero());

        request.gas_info.accumulate(GasInfo { gas_wanted: 21_000, gas_used: 21_000, gas: 0 });
        assert!(BlockJoinPointRequest::from_block_header(&ctx).gas_info.is_zero());
    }
}
