//! The bonding registry the provider resolves Aspects through.

use core::fmt::Debug;

use alloy_primitives::{Address, BlockNumber, Bytes};
use auto_impl::auto_impl;
use serde::{Deserialize, Serialize};

use crate::{JoinPoint, StateContext};

/// A reference to the code of a bonded Aspect.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AspectCode {
    /// The Aspect id
    pub aspect_id: Address,
    /// The bonded version of the Aspect
    pub version: u64,
    /// Execution priority among the Aspects of a join point
    pub priority: i64,
    /// The Aspect bytecode
    pub code: Bytes,
}

impl AspectCode {
    /// Creates a new reference to version `version` of `aspect_id`.
    pub fn new(aspect_id: Address, version: u64, code: Bytes) -> Self {
        Self { aspect_id, version, priority: 0, code }
    }

    /// Set the priority.
    pub const fn with_priority(mut self, priority: i64) -> Self {
        self.priority = priority;
        self
    }
}

/// Storage-backed lookups of Aspect bondings.
///
/// Implementations own the returned [`AspectCode`]s; the provider hands them to the caller
/// without modifying them. An address with nothing bonded yields an empty list, not an error.
#[auto_impl(&, Box, Arc)]
pub trait BondingRegistry: Debug + Send + Sync {
    /// The error raised by failing lookups.
    type Error: core::error::Error + Send + Sync + 'static;

    /// Returns the Aspects bonded to `address` that run at `join_point`.
    fn aspects_for_join_point(
        &self,
        ctx: &StateContext,
        address: Address,
        join_point: JoinPoint,
    ) -> Result<Vec<AspectCode>, Self::Error>;

    /// Returns the Aspects registered as transaction verifiers of `address`.
    fn account_verifiers(
        &self,
        ctx: &StateContext,
        address: Address,
    ) -> Result<Vec<AspectCode>, Self::Error>;

    /// Returns the Aspects bonded to the block lifecycle.
    fn block_aspects(&self, ctx: &StateContext) -> Result<Vec<AspectCode>, Self::Error>;

    /// Returns the account owning `aspect_id`, or `None` if the Aspect is unknown.
    fn aspect_account(
        &self,
        ctx: &StateContext,
        aspect_id: Address,
    ) -> Result<Option<Address>, Self::Error>;

    /// Returns the height of the last block the registry has seen.
    fn block_height(&self) -> BlockNumber;
}
