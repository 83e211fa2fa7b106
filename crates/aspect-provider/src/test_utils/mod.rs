//! Helpers for testing code built on the join-point provider.

use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicU64, AtomicUsize, Ordering},
        Arc,
    },
};

use alloy_consensus::{Header, SignableTransaction, Signed, TxEip1559, TxLegacy};
use alloy_primitives::{Address, BlockNumber, ChainId, Signature, TxKind, B256, U256};
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;

use crate::{
    constants::{EVM_STORE_KEY, PARAMS_STORE_KEY},
    AspectCode, AspectRuntimeContext, BondingRegistry, ExecutionContext, JoinPoint, MemoryStore,
    Msg, MsgError, StateContext,
};

/// Returns a signer whose private key is `n` as a big-endian 32-byte integer.
pub fn test_signer(n: u8) -> PrivateKeySigner {
    PrivateKeySigner::from_bytes(&B256::with_last_byte(n)).expect("non-zero private key")
}

/// Signs `tx` with `signer`.
pub fn sign_tx<T: SignableTransaction<Signature>>(signer: &PrivateKeySigner, tx: T) -> Signed<T> {
    let signature = signer.sign_hash_sync(&tx.signature_hash()).expect("signing succeeds");
    tx.into_signed(signature)
}

/// A legacy value transfer to `to`, replay protected when `chain_id` is set.
pub fn legacy_tx(chain_id: Option<ChainId>, to: Address) -> TxLegacy {
    TxLegacy {
        chain_id,
        nonce: 0,
        gas_price: 1_000_000_000,
        gas_limit: 21_000,
        to: TxKind::Call(to),
        value: U256::from(1_000),
        ..Default::default()
    }
}

/// A dynamic-fee transaction for `chain_id`.
pub fn eip1559_tx(chain_id: ChainId, to: TxKind) -> TxEip1559 {
    TxEip1559 {
        chain_id,
        nonce: 1,
        gas_limit: 100_000,
        max_fee_per_gas: 2_000_000_000,
        max_priority_fee_per_gas: 1_000_000_000,
        to,
        value: U256::from(1),
        ..Default::default()
    }
}

/// A state context at `height` with the EVM and params stores mounted.
pub fn state_context(height: BlockNumber, chain_id: ChainId) -> StateContext {
    let header = Header {
        number: height,
        timestamp: 1_700_000_000 + height,
        gas_limit: 30_000_000,
        base_fee_per_gas: Some(7),
        ..Default::default()
    };
    StateContext::new(chain_id, header)
        .with_store(EVM_STORE_KEY, Arc::new(MemoryStore::new()))
        .with_store(PARAMS_STORE_KEY, Arc::new(MemoryStore::new()))
}

/// An Aspect execution context over [`state_context`].
pub fn runtime_context(height: BlockNumber, chain_id: ChainId) -> ExecutionContext {
    AspectRuntimeContext::new(state_context(height, chain_id)).into()
}

/// A non-Ethereum message moving native tokens.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BankSendMsg {
    /// The recipient
    pub to: Address,
    /// The amount moved
    pub amount: u64,
}

impl BankSendMsg {
    /// Creates a new message moving `amount` to `to`.
    pub const fn new(to: Address, amount: u64) -> Self {
        Self { to, amount }
    }
}

impl Msg for BankSendMsg {
    fn type_url(&self) -> &str {
        "/cosmos.bank.v1beta1.MsgSend"
    }

    fn validate_basic(&self) -> Result<(), MsgError> {
        if self.amount == 0 {
            return Err(MsgError::Invalid("zero amount".to_string()));
        }
        Ok(())
    }
}

/// Errors injected into [`MemoryRegistry`] lookups.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// The backing store cannot be read
    #[error("bonding store unavailable")]
    Unavailable,
    /// A stored bonding does not decode
    #[error("corrupted bonding for {0}")]
    Corrupted(Address),
}

/// A deterministic in-memory [`BondingRegistry`].
#[derive(Debug, Default)]
pub struct MemoryRegistry {
    bondings: BTreeMap<(Address, JoinPoint), Vec<AspectCode>>,
    verifiers: BTreeMap<Address, Vec<AspectCode>>,
    block: Vec<AspectCode>,
    owners: BTreeMap<Address, Address>,
    failure: Option<RegistryError>,
    height: AtomicU64,
    lookups: AtomicUsize,
}

impl MemoryRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bond `code` to `address` at `join_point`.
    pub fn with_bonding(
        mut self,
        address: Address,
        join_point: JoinPoint,
        code: AspectCode,
    ) -> Self {
        self.bondings.entry((address, join_point)).or_default().push(code);
        self
    }

    /// Register `code` as a verifier of `address`.
    pub fn with_verifier(mut self, address: Address, code: AspectCode) -> Self {
        self.verifiers.entry(address).or_default().push(code);
        self
    }

    /// Bond `code` to the block lifecycle.
    pub fn with_block_aspect(mut self, code: AspectCode) -> Self {
        self.block.push(code);
        self
    }

    /// Set the owner account of `aspect_id`.
    pub fn with_owner(mut self, aspect_id: Address, owner: Address) -> Self {
        self.owners.insert(aspect_id, owner);
        self
    }

    /// Make every lookup fail with `error`.
    pub fn with_failure(mut self, error: RegistryError) -> Self {
        self.failure = Some(error);
        self
    }

    /// Set the last seen block height.
    pub fn set_block_height(&self, height: BlockNumber) {
        self.height.store(height, Ordering::Relaxed);
    }

    /// Returns the number of lookups served, failed ones included.
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::Relaxed)
    }

    fn lookup<T>(&self, f: impl FnOnce() -> T) -> Result<T, RegistryError> {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        match &self.failure {
            Some(error) => Err(error.clone()),
            None => Ok(f()),
        }
    }
}

impl BondingRegistry for MemoryRegistry {
    type Error = RegistryError;

    fn aspects_for_join_point(
        &self,
        _ctx: &StateContext,
        address: Address,
        join_point: JoinPoint,
    ) -> Result<Vec<AspectCode>, Self::Error> {
        self.lookup(|| self.bondings.get(&(address, join_point)).cloned().unwrap_or_default())
    }

    fn account_verifiers(
        &self,
        _ctx: &StateContext,
        address: Address,
    ) -> Result<Vec<AspectCode>, Self::Error> {
        self.lookup(|| self.verifiers.get(&address).cloned().unwrap_or_default())
    }

    fn block_aspects(&self, _ctx: &StateContext) -> Result<Vec<AspectCode>, Self::Error> {
        self.lookup(|| self.block.clone())
    }

    fn aspect_account(
        &self,
        _ctx: &StateContext,
        aspect_id: Address,
    ) -> Result<Option<Address>, Self::Error> {
        self.lookup(|| self.owners.get(&aspect_id).copied())
    }

    fn block_height(&self) -> BlockNumber {
        self.height.load(Ordering::Relaxed)
    }
}
