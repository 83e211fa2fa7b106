//! Chain parameters of the EVM module.

mod chain_config;
pub use chain_config::*;

mod keeper;
pub use keeper::*;

use serde::{Deserialize, Serialize};

use crate::ContextError;

/// EIPs that can be activated on top of the configured fork schedule.
pub const ACTIVATEABLE_EIPS: [i64; 13] =
    [1153, 1344, 1884, 2200, 2929, 3198, 3529, 3855, 3860, 4762, 5656, 6780, 7516];

/// The default denomination of the EVM native token.
pub const DEFAULT_EVM_DENOM: &str = "aart";

/// Errors raised while reading, validating or writing the chain parameters.
#[derive(Debug, thiserror::Error)]
pub enum ParamsError {
    /// The EVM denomination is not a valid coin denomination
    #[error("invalid evm denom: {0:?}")]
    InvalidDenom(String),
    /// An extra EIP cannot be activated
    #[error("EIP {0} is not activateable")]
    EipNotActivateable(i64),
    /// An extra EIP is listed twice
    #[error("duplicate EIP: {0}")]
    DuplicateEip(i64),
    /// The fork schedule is inconsistent
    #[error("invalid chain config: {0}")]
    ChainConfig(#[from] ChainConfigError),
    /// The store holding the parameters is not reachable
    #[error(transparent)]
    Context(#[from] ContextError),
    /// A stored value does not decode
    #[error("failed to decode stored params at {key}: {source}")]
    Decode {
        /// The store key of the value
        key: String,
        /// The decoding error
        #[source]
        source: serde_json::Error,
    },
    /// The parameters could not be encoded
    #[error("failed to encode params: {0}")]
    Encode(#[source] serde_json::Error),
}

/// The parameters of the EVM module.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainParams {
    /// The denomination of the EVM native token
    pub evm_denom: String,
    /// Whether contract creation is enabled
    pub enable_create: bool,
    /// Whether contract calls are enabled
    pub enable_call: bool,
    /// EIPs activated on top of the fork schedule
    pub extra_eips: Vec<i64>,
    /// The Ethereum fork schedule
    pub chain_config: ChainConfig,
    /// Whether transactions without replay protection are accepted
    pub allow_unprotected_txs: bool,
}

impl Default for ChainParams {
    fn default() -> Self {
        Self {
            evm_denom: DEFAULT_EVM_DENOM.to_string(),
            enable_create: true,
            enable_call: true,
            extra_eips: Vec::new(),
            chain_config: ChainConfig::default(),
            allow_unprotected_txs: false,
        }
    }
}

impl ChainParams {
    /// Set the extra EIPs.
    pub fn with_extra_eips(mut self, extra_eips: Vec<i64>) -> Self {
        self.extra_eips = extra_eips;
        self
    }

    /// Set whether transactions without replay protection are accepted.
    pub fn with_allow_unprotected_txs(mut self, allow: bool) -> Self {
        self.allow_unprotected_txs = allow;
        self
    }

    /// Validates the denomination, the extra EIPs and the fork schedule.
    pub fn validate(&self) -> Result<(), ParamsError> {
        validate_denom(&self.evm_denom)?;

        let mut seen = Vec::with_capacity(self.extra_eips.len());
        for &eip in &self.extra_eips {
            if !ACTIVATEABLE_EIPS.contains(&eip) {
                return Err(ParamsError::EipNotActivateable(eip));
            }
            if seen.contains(&eip) {
                return Err(ParamsError::DuplicateEip(eip));
            }
            seen.push(eip);
        }

        Ok(self.chain_config.validate()?)
    }
}

/// A coin denomination is 3 to 128 characters: a letter followed by letters, digits or one of
/// `/:._-`.
fn validate_denom(denom: &str) -> Result<(), ParamsError> {
    let mut chars = denom.chars();
    let valid = (3..=128).contains(&denom.len()) &&
        chars.next().is_some_and(|c| c.is_ascii_alphabetic()) &&
        chars.all(|c| c.is_ascii_alphanumeric() || "/:._-".contains(c));
    if valid {
        Ok(())
    } else {
        Err(ParamsError::InvalidDenom(denom.to_string()))
    }
}
