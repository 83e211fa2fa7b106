//! Execution contexts threaded through transaction and block processing.

use std::{collections::BTreeMap, sync::Arc};

use alloy_consensus::Header;
use alloy_primitives::{BlockNumber, ChainId, B256};

use crate::{ContextError, KvStore, StoreKey};

/// The state-machine context of the block being executed.
///
/// It is created once per block (or transaction) by the execution engine. Apart from the
/// builder methods consuming `self`, it is never mutated; the mounted stores are shared handles
/// whose writes are tracked by the stores themselves.
#[derive(Clone, Debug)]
pub struct StateContext {
    header: Header,
    header_hash: B256,
    chain_id: ChainId,
    stores: BTreeMap<StoreKey, Arc<dyn KvStore>>,
}

impl StateContext {
    /// Creates a new `StateContext` for the given chain and block header. The header hash is
    /// computed from the header.
    pub fn new(chain_id: ChainId, header: Header) -> Self {
        let header_hash = header.hash_slow();
        Self { header, header_hash, chain_id, stores: BTreeMap::new() }
    }

    /// Set the header hash. The consensus engine may identify blocks by a hash other than the
    /// Ethereum header hash.
    pub fn with_header_hash(self, header_hash: B256) -> Self {
        Self { header_hash, ..self }
    }

    /// Mount a store under the given key.
    pub fn with_store(mut self, key: StoreKey, store: Arc<dyn KvStore>) -> Self {
        self.stores.insert(key, store);
        self
    }

    /// Get the block header.
    pub const fn header(&self) -> &Header {
        &self.header
    }

    /// Get the header hash.
    pub const fn header_hash(&self) -> B256 {
        self.header_hash
    }

    /// Get the block height.
    pub const fn block_height(&self) -> BlockNumber {
        self.header.number
    }

    /// Get the chain id.
    pub const fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    /// Get the store mounted under `key`.
    pub fn kv_store(&self, key: &StoreKey) -> Option<&dyn KvStore> {
        self.stores.get(key).map(|store| store.as_ref())
    }
}

/// The context Aspect lookups run in. It wraps the [`StateContext`] of the executing block.
#[derive(Clone, Debug, derive_more::Deref)]
pub struct AspectRuntimeContext {
    #[deref]
    state: StateContext,
}

impl AspectRuntimeContext {
    /// Create a new `AspectRuntimeContext` over the given state context.
    pub const fn new(state: StateContext) -> Self {
        Self { state }
    }

    /// Get the state-machine context.
    pub const fn state(&self) -> &StateContext {
        &self.state
    }

    /// Convert the `AspectRuntimeContext` into the inner `StateContext`.
    pub fn into_inner(self) -> StateContext {
        self.state
    }
}

/// The generic context handed to the provider by the execution engine.
#[derive(Clone, Debug)]
pub enum ExecutionContext {
    /// A context created for Aspect execution.
    Aspect(AspectRuntimeContext),
    /// A context created by machinery unrelated to Aspect execution, tagged with its kind.
    Foreign(&'static str),
}

impl ExecutionContext {
    /// The kind of this context, used in diagnostics.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Aspect(_) => "aspect runtime",
            Self::Foreign(kind) => *kind,
        }
    }

    /// Returns the [`AspectRuntimeContext`] if this is an Aspect context.
    pub const fn as_aspect_runtime(&self) -> Result<&AspectRuntimeContext, ContextError> {
        match self {
            Self::Aspect(runtime) => Ok(runtime),
            Self::Foreign(kind) => Err(ContextError::WrongKind { found: *kind }),
        }
    }
}

impl From<AspectRuntimeContext> for ExecutionContext {
    fn from(runtime: AspectRuntimeContext) -> Self {
        Self::Aspect(runtime)
    }
}

/// Unwraps a generic execution context into the [`AspectRuntimeContext`] required to reach the
/// state store.
///
/// An absent context yields [`ContextError::Missing`], a context of another kind yields
/// [`ContextError::WrongKind`]. On success the very same context is returned.
pub fn adapt_or_fail(
    ctx: Option<&ExecutionContext>,
) -> Result<&AspectRuntimeContext, ContextError> {
    ctx.ok_or(ContextError::Missing)?.as_aspect_runtime()
}

#[cfg(test)]
mod tests {
    use alloy_primitives::b256;

    use super::*;
    use crate::MemoryStore;

    fn state_context() -> StateContext {
        let header = Header { number: 7, timestamp: 1_700_000_000, ..Default::default() };
        StateContext::new(11820, header)
    }

    #[test]
    fn test_state_context_accessors() {
        let ctx = state_context();
        assert_eq!(ctx.block_height(), 7);
        assert_eq!(ctx.chain_id(), 11820);
        assert_eq!(ctx.header_hash(), ctx.header().hash_slow());

        let hash = b256!("0x00000000000000000000000000000000000000000000000000000000000000aa");
        assert_eq!(ctx.with_header_hash(hash).header_hash(), hash);
    }

    #[test]
    fn test_kv_store_lookup() {
        let key = StoreKey::new("evm");
        let ctx = state_context();
        assert!(ctx.kv_store(&key).is_none());

        let store = Arc::new(MemoryStore::new());
        let ctx = ctx.with_store(key, store.clone());
        ctx.kv_store(&key).unwrap().set(b"k", b"v".to_vec());
        assert_eq!(store.get(b"k"), Some(b"v".to_vec()));
        assert!(ctx.kv_store(&StoreKey::new("params")).is_none());
    }

    #[test]
    fn test_adapt_missing_context() {
        assert_eq!(adapt_or_fail(None).unwrap_err(), ContextError::Missing);
    }

    #[test]
    fn test_adapt_foreign_context() {
        let ctx = ExecutionContext::Foreign("query");
        assert_eq!(
            adapt_or_fail(Some(&ctx)).unwrap_err(),
            ContextError::WrongKind { found: "query" }
        );
    }

    #[test]
    fn test_adapt_is_identity() {
        let ctx = ExecutionContext::from(AspectRuntimeContext::new(state_context()));
        let adapted = adapt_or_fail(Some(&ctx)).unwrap();
        let ExecutionContext::Aspect(inner) = &ctx else { unreachable!() };
        assert!(core::ptr::eq(adapted, inner));
        assert_eq!(adapted.block_height(), 7);
    }
}
