//! Ethereum fork schedule of the chain.

use alloy_primitives::{BlockNumber, ChainId};
use serde::{Deserialize, Serialize};

/// Errors raised by an inconsistent fork schedule.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ChainConfigError {
    /// A fork is scheduled although a fork it builds on is not
    #[error("unsupported fork ordering: {missing} not enabled, but {enabled} enabled at {at}")]
    ForkNotEnabled {
        /// The fork that is not scheduled
        missing: &'static str,
        /// The later fork that is scheduled
        enabled: &'static str,
        /// The activation of the later fork
        at: u64,
    },
    /// A fork is scheduled before a fork it builds on
    #[error(
        "unsupported fork ordering: {earlier} enabled at {earlier_at}, \
         but {later} enabled at {later_at}"
    )]
    ForkOrder {
        /// The fork that must come first
        earlier: &'static str,
        /// Its activation
        earlier_at: u64,
        /// The fork scheduled too early
        later: &'static str,
        /// Its activation
        later_at: u64,
    },
}

/// Activation of the Ethereum forks, by block number up to the merge and by timestamp after.
///
/// `None` means the fork is not scheduled.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainConfig {
    /// Homestead switch block
    pub homestead_block: Option<BlockNumber>,
    /// The DAO hard-fork switch block
    pub dao_fork_block: Option<BlockNumber>,
    /// Whether the node supports the DAO hard-fork
    pub dao_fork_support: bool,
    /// EIP-150 switch block
    pub eip150_block: Option<BlockNumber>,
    /// EIP-155 switch block
    pub eip155_block: Option<BlockNumber>,
    /// EIP-158 switch block
    pub eip158_block: Option<BlockNumber>,
    /// Byzantium switch block
    pub byzantium_block: Option<BlockNumber>,
    /// Constantinople switch block
    pub constantinople_block: Option<BlockNumber>,
    /// Petersburg switch block
    pub petersburg_block: Option<BlockNumber>,
    /// Istanbul switch block
    pub istanbul_block: Option<BlockNumber>,
    /// EIP-2384 difficulty bomb delay switch block
    pub muir_glacier_block: Option<BlockNumber>,
    /// Berlin switch block
    pub berlin_block: Option<BlockNumber>,
    /// London switch block
    pub london_block: Option<BlockNumber>,
    /// EIP-4345 difficulty bomb delay switch block
    pub arrow_glacier_block: Option<BlockNumber>,
    /// EIP-5133 difficulty bomb delay switch block
    pub gray_glacier_block: Option<BlockNumber>,
    /// Virtual fork after the merge, used as a network splitter
    pub merge_netsplit_block: Option<BlockNumber>,
    /// Shanghai switch time
    pub shanghai_time: Option<u64>,
    /// Cancun switch time
    pub cancun_time: Option<u64>,
}

impl Default for ChainConfig {
    /// Every block-numbered fork active from genesis, timestamp forks unscheduled.
    fn default() -> Self {
        Self {
            homestead_block: Some(0),
            dao_fork_block: Some(0),
            dao_fork_support: true,
            eip150_block: Some(0),
            eip155_block: Some(0),
            eip158_block: Some(0),
            byzantium_block: Some(0),
            constantinople_block: Some(0),
            petersburg_block: Some(0),
            istanbul_block: Some(0),
            muir_glacier_block: Some(0),
            berlin_block: Some(0),
            london_block: Some(0),
            arrow_glacier_block: Some(0),
            gray_glacier_block: Some(0),
            merge_netsplit_block: Some(0),
            shanghai_time: None,
            cancun_time: None,
        }
    }
}

/// A fork in the schedule. Optional forks may be skipped without breaking the ordering.
struct Fork {
    name: &'static str,
    at: Option<u64>,
    optional: bool,
}

impl Fork {
    const fn required(name: &'static str, at: Option<u64>) -> Self {
        Self { name, at, optional: false }
    }

    const fn optional(name: &'static str, at: Option<u64>) -> Self {
        Self { name, at, optional: true }
    }
}

impl ChainConfig {
    fn block_forks(&self) -> [Fork; 15] {
        [
            Fork::required("homesteadBlock", self.homestead_block),
            Fork::optional("daoForkBlock", self.dao_fork_block),
            Fork::required("eip150Block", self.eip150_block),
            Fork::required("eip155Block", self.eip155_block),
            Fork::required("eip158Block", self.eip158_block),
            Fork::required("byzantiumBlock", self.byzantium_block),
            Fork::required("constantinopleBlock", self.constantinople_block),
            Fork::required("petersburgBlock", self.petersburg_block),
            Fork::required("istanbulBlock", self.istanbul_block),
            Fork::optional("muirGlacierBlock", self.muir_glacier_block),
            Fork::required("berlinBlock", self.berlin_block),
            Fork::required("londonBlock", self.london_block),
            Fork::optional("arrowGlacierBlock", self.arrow_glacier_block),
            Fork::optional("grayGlacierBlock", self.gray_glacier_block),
            Fork::optional("mergeNetsplitBlock", self.merge_netsplit_block),
        ]
    }

    fn time_forks(&self) -> [Fork; 2] {
        [
            Fork::required("shanghaiTime", self.shanghai_time),
            Fork::required("cancunTime", self.cancun_time),
        ]
    }

    /// Checks that forks are scheduled in order and that no fork is scheduled without the
    /// required forks before it. Block-numbered and timestamp forks are ordered separately.
    pub fn validate(&self) -> Result<(), ChainConfigError> {
        check_fork_order(&self.block_forks())?;
        check_fork_order(&self.time_forks())
    }

    /// Returns the names of the forks active at the given block.
    pub fn active_forks(&self, number: BlockNumber, timestamp: u64) -> Vec<&'static str> {
        let blocks =
            self.block_forks().into_iter().filter(|fork| fork.at.is_some_and(|at| at <= number));
        let times =
            self.time_forks().into_iter().filter(|fork| fork.at.is_some_and(|at| at <= timestamp));
        blocks.chain(times).map(|fork| fork.name).collect()
    }

    /// Binds the schedule to `chain_id`.
    pub fn ethereum_config(&self, chain_id: ChainId) -> EthereumChainConfig {
        EthereumChainConfig { chain_id, config: self.clone() }
    }
}

fn check_fork_order(forks: &[Fork]) -> Result<(), ChainConfigError> {
    let mut last: Option<&Fork> = None;
    for fork in forks {
        if let Some(last) = last {
            match (last.at, fork.at) {
                (None, Some(at)) => {
                    return Err(ChainConfigError::ForkNotEnabled {
                        missing: last.name,
                        enabled: fork.name,
                        at,
                    });
                }
                (Some(earlier_at), Some(later_at)) if earlier_at > later_at => {
                    return Err(ChainConfigError::ForkOrder {
                        earlier: last.name,
                        earlier_at,
                        later: fork.name,
                        later_at,
                    });
                }
                _ => {}
            }
        }
        if !fork.optional || fork.at.is_some() {
            last = Some(fork);
        }
    }
    Ok(())
}

/// The fork schedule bound to a chain id, as consumed by the EVM.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EthereumChainConfig {
    /// The chain id
    pub chain_id: ChainId,
    /// The fork schedule
    #[serde(flatten)]
    pub config: ChainConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = ChainConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.active_forks(0, 0).len(), 15);
    }

    #[test]
    fn test_fork_not_enabled() {
        let config = ChainConfig { berlin_block: None, ..Default::default() };
        assert_eq!(
            config.validate(),
            Err(ChainConfigError::ForkNotEnabled {
                missing: "berlinBlock",
                enabled: "londonBlock",
                at: 0
            })
        );
    }

    #[test]
    fn test_fork_order() {
        let config =
            ChainConfig { berlin_block: Some(10), london_block: Some(5), ..Default::default() };
        assert_eq!(
            config.validate(),
            Err(ChainConfigError::ForkOrder {
                earlier: "berlinBlock",
                earlier_at: 10,
                later: "londonBlock",
                later_at: 5
            })
        );
    }

    #[test]
    fn test_optional_forks_may_be_skipped() {
        let config = ChainConfig {
            dao_fork_block: None,
            muir_glacier_block: None,
            arrow_glacier_block: None,
            gray_glacier_block: None,
            merge_netsplit_block: None,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_timestamp_forks() {
        let config = ChainConfig { cancun_time: Some(100), ..Default::default() };
        assert!(matches!(
            config.validate(),
            Err(ChainConfigError::ForkNotEnabled { missing: "shanghaiTime", .. })
        ));

        let config =
            ChainConfig { shanghai_time: Some(50), cancun_time: Some(100), ..Default::default() };
        assert!(config.validate().is_ok());
        assert!(config.active_forks(0, 99).contains(&"shanghaiTime"));
        assert!(!config.active_forks(0, 99).contains(&"cancunTime"));
        assert!(config.active_forks(0, 100).contains(&"cancunTime"));
    }

    #[test]
    fn test_ethereum_config_serializes_flat() {
        let config = ChainConfig::default().ethereum_config(11820);
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["chainId"], 11820);
        assert_eq!(json["londonBlock"], 0);
        assert_eq!(serde_json::from_value::<EthereumChainConfig>(json).unwrap(), config);
    }
}
