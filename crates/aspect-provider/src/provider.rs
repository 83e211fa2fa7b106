//! The join-point provider consumed by the transaction and block execution pipeline.

use alloy_consensus::TxEnvelope;
use alloy_primitives::{Address, BlockNumber, Bytes, B256};
use auto_impl::auto_impl;
use revm::context::TxEnv;
use tracing::debug;

use crate::{
    adapt_or_fail, AspectCode, BlockJoinPointRequest, BondingRegistry, ContextError,
    ExecutionContext, InnerTransaction, JoinPoint, JoinPointError, Msg, ProviderError,
    StateContext, StoreKey, TxJoinPointRequest,
};

/// The operations the execution pipeline performs at every join point.
///
/// Request construction and routing are provided; implementors only resolve bondings.
#[auto_impl(&, Box, Arc)]
pub trait AspectProvider {
    /// The error raised by bonding lookups.
    type Error: core::error::Error + Send + Sync + 'static;

    /// Builds the request of a signed transaction whose sender is already known.
    fn request_from_signed_tx(
        &self,
        ctx: &StateContext,
        from: Address,
        tx: &TxEnvelope,
        tx_index: u64,
        base_fee: Option<u64>,
        inner_tx: Option<InnerTransaction>,
    ) -> Result<TxJoinPointRequest, JoinPointError> {
        TxJoinPointRequest::from_signed_transaction(ctx, from, tx, tx_index, base_fee, inner_tx)
    }

    /// Builds the request of an Ethereum transaction message, recovering its sender.
    fn request_from_message(
        &self,
        ctx: &StateContext,
        msg: &dyn Msg,
        tx_index: u64,
        base_fee: Option<u64>,
        inner_tx: Option<InnerTransaction>,
    ) -> Result<TxJoinPointRequest, JoinPointError> {
        TxJoinPointRequest::from_message(ctx, msg, tx_index, base_fee, inner_tx)
    }

    /// Builds a request carrying only an opaque payload.
    fn request_from_data(&self, data: Bytes) -> TxJoinPointRequest {
        TxJoinPointRequest::from_raw_bytes(data)
    }

    /// Builds the request of a message synthesized during EVM execution.
    fn request_from_evm_message(
        &self,
        ctx: &StateContext,
        msg: &TxEnv,
        tx_hash: B256,
        tx_type: u8,
        inner_tx: Option<InnerTransaction>,
    ) -> TxJoinPointRequest {
        TxJoinPointRequest::from_evm_message(ctx, msg, tx_hash, tx_type, inner_tx)
    }

    /// Builds the request of the block of `ctx`.
    fn block_request(&self, ctx: &StateContext) -> BlockJoinPointRequest {
        BlockJoinPointRequest::from_block_header(ctx)
    }

    /// Decides whether `msg` is routed to bonded Aspects. See [`crate::should_route`].
    fn should_route(&self, msg: &dyn Msg) -> bool {
        crate::should_route(msg)
    }

    /// Returns the Aspects bonded to `address` that run at `join_point`.
    fn bonded_aspects(
        &self,
        ctx: Option<&ExecutionContext>,
        address: Address,
        join_point: JoinPoint,
    ) -> Result<Vec<AspectCode>, Self::Error>;

    /// Returns the verifier Aspects of `address`.
    fn account_verifiers(
        &self,
        ctx: Option<&ExecutionContext>,
        address: Address,
    ) -> Result<Vec<AspectCode>, Self::Error>;

    /// Returns the Aspects bonded to the block lifecycle.
    fn block_bonded_aspects(
        &self,
        ctx: Option<&ExecutionContext>,
    ) -> Result<Vec<AspectCode>, Self::Error>;

    /// Returns the account owning `aspect_id`, `None` if the Aspect is unknown.
    fn aspect_owner(
        &self,
        ctx: Option<&ExecutionContext>,
        aspect_id: Address,
    ) -> Result<Option<Address>, Self::Error>;

    /// Returns the height of the last block known to the bonding registry.
    fn latest_block_height(&self) -> BlockNumber;
}

/// An [`AspectProvider`] resolving bondings through a [`BondingRegistry`].
///
/// The registry and store key are fixed at construction, so a provider can be shared across
/// threads whenever its registry can.
#[derive(Clone, Debug)]
pub struct JoinPointProvider<R> {
    store_key: StoreKey,
    registry: R,
}

impl<R: BondingRegistry> JoinPointProvider<R> {
    /// Creates a provider reading bondings from the store mounted under `store_key`.
    pub const fn new(store_key: StoreKey, registry: R) -> Self {
        Self { store_key, registry }
    }

    /// Get the store key.
    pub const fn store_key(&self) -> StoreKey {
        self.store_key
    }

    /// Get the bonding registry.
    pub const fn registry(&self) -> &R {
        &self.registry
    }

    /// Unwraps `ctx` and checks that the provider's store is reachable from it.
    fn state_context<'a>(
        &self,
        ctx: Option<&'a ExecutionContext>,
    ) -> Result<&'a StateContext, ContextError> {
        let state = adapt_or_fail(ctx)
            .inspect_err(|err| {
                debug!(target: "aspect::provider", %err, "Failed to adapt execution context")
            })?
            .state();

        if state.kv_store(&self.store_key).is_none() {
            debug!(target: "aspect::provider", store = %self.store_key, "Store not mounted");
            return Err(ContextError::StoreNotMounted(self.store_key));
        }
        Ok(state)
    }
}

impl<R: BondingRegistry> AspectProvider for JoinPointProvider<R> {
    type Error = ProviderError<R::Error>;

    fn bonded_aspects(
        &self,
        ctx: Option<&ExecutionContext>,
        address: Address,
        join_point: JoinPoint,
    ) -> Result<Vec<AspectCode>, Self::Error> {
        let state = self.state_context(ctx)?;
        self.registry
            .aspects_for_join_point(state, address, join_point)
            .map_err(ProviderError::Registry)
    }

    fn account_verifiers(
        &self,
        ctx: Option<&ExecutionContext>,
        address: Address,
    ) -> Result<Vec<AspectCode>, Self::Error> {
        let state = self.state_context(ctx)?;
        self.registry.account_verifiers(state, address).map_err(ProviderError::Registry)
    }

    fn block_bonded_aspects(
        &self,
        ctx: Option<&ExecutionContext>,
    ) -> Result<Vec<AspectCode>, Self::Error> {
        let state = self.state_context(ctx)?;
        self.registry.block_aspects(state).map_err(ProviderError::Registry)
    }

    fn aspect_owner(
        &self,
        ctx: Option<&ExecutionContext>,
        aspect_id: Address,
    ) -> Result<Option<Address>, Self::Error> {
        let state = self.state_context(ctx)?;
        self.registry.aspect_account(state, aspect_id).map_err(ProviderError::Registry)
    }

    fn latest_block_height(&self) -> BlockNumber {
        self.registry.block_height()
    }
}
