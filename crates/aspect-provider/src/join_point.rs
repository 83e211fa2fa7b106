//! The lifecycle points at which bonded Aspects run.

use core::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// A point in the transaction or block lifecycle at which bonded Aspects are looked up.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum JoinPoint {
    /// Transaction verification, run by the verifier Aspects of the sender account
    VerifyTx,
    /// Before the transaction is executed
    PreTxExecute,
    /// Before every call of a contract
    PreContractCall,
    /// After every call of a contract
    PostContractCall,
    /// After the transaction is executed
    PostTxExecute,
    /// After the transaction state is committed
    PostTxCommit,
    /// At the beginning of a block
    OnBlockInitialize,
    /// At the end of a block
    OnBlockFinalize,
}

/// String identifiers of the join points.
#[allow(missing_docs)]
pub mod name {
    pub const VERIFY_TX: &str = "verifyTx";
    pub const PRE_TX_EXECUTE: &str = "preTxExecute";
    pub const PRE_CONTRACT_CALL: &str = "preContractCall";
    pub const POST_CONTRACT_CALL: &str = "postContractCall";
    pub const POST_TX_EXECUTE: &str = "postTxExecute";
    pub const POST_TX_COMMIT: &str = "postTxCommit";
    pub const ON_BLOCK_INITIALIZE: &str = "onBlockInitialize";
    pub const ON_BLOCK_FINALIZE: &str = "onBlockFinalize";
}

/// Error returned when parsing an unknown join point name.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown join point: {0}")]
pub struct UnknownJoinPoint(pub String);

impl JoinPoint {
    /// All join points in lifecycle order.
    pub const ALL: [Self; 8] = [
        Self::OnBlockInitialize,
        Self::VerifyTx,
        Self::PreTxExecute,
        Self::PreContractCall,
        Self::PostContractCall,
        Self::PostTxExecute,
        Self::PostTxCommit,
        Self::OnBlockFinalize,
    ];

    /// Returns `true` for join points at block boundaries.
    pub const fn is_block_level(self) -> bool {
        matches!(self, Self::OnBlockInitialize | Self::OnBlockFinalize)
    }

    /// Returns the name of the join point.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::VerifyTx => name::VERIFY_TX,
            Self::PreTxExecute => name::PRE_TX_EXECUTE,
            Self::PreContractCall => name::PRE_CONTRACT_CALL,
            Self::PostContractCall => name::POST_CONTRACT_CALL,
            Self::PostTxExecute => name::POST_TX_EXECUTE,
            Self::PostTxCommit => name::POST_TX_COMMIT,
            Self::OnBlockInitialize => name::ON_BLOCK_INITIALIZE,
            Self::OnBlockFinalize => name::ON_BLOCK_FINALIZE,
        }
    }
}

impl From<JoinPoint> for &'static str {
    fn from(point: JoinPoint) -> Self {
        point.as_str()
    }
}

impl fmt::Display for JoinPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JoinPoint {
    type Err = UnknownJoinPoint;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|point| point.as_str() == s)
            .ok_or_else(|| UnknownJoinPoint(s.to_string()))
    }
}
