//! Error types of the join-point provider.

use alloy_eips::eip2718::Eip2718Error;

use crate::{SignerError, StoreKey};

/// Errors raised while normalizing a transaction into a join-point request.
#[derive(Debug, thiserror::Error)]
pub enum JoinPointError {
    /// The message does not carry an Ethereum transaction
    #[error("message {0} is not an ethereum transaction")]
    NotEthereumMessage(String),
    /// The transaction payload could not be decoded
    #[error("failed to decode transaction: {0}")]
    Decode(#[from] Eip2718Error),
    /// The transaction type cannot be executed on this chain
    #[error("unsupported transaction type: {0}")]
    UnsupportedTxType(u8),
    /// The fee cap is below the block base fee, so no effective gas price exists
    #[error("max fee per gas {fee_cap} is lower than base fee {base_fee}")]
    FeeCapTooLow {
        /// The max fee per gas of the transaction
        fee_cap: u128,
        /// The base fee of the block
        base_fee: u64,
    },
    /// The sender could not be recovered from the signature
    #[error("failed to recover sender: {0}")]
    Signer(#[from] SignerError),
}

impl JoinPointError {
    /// Returns `true` if the sender of the transaction could not be authenticated. Such
    /// transactions must be rejected by the caller. Every other variant is malformed input.
    pub const fn is_signature_failure(&self) -> bool {
        matches!(self, Self::Signer(_))
    }
}

/// Errors raised while unwrapping a call-data container.
#[derive(Debug, thiserror::Error)]
pub enum CallDataError {
    /// The container holds a payload of another type than
    /// [`BYTES_DATA_TYPE_URL`](crate::constants::BYTES_DATA_TYPE_URL)
    #[error("unexpected call data type {0}, expected /aspect.v2.BytesData")]
    UnexpectedType(String),
    /// The container body is not a valid encoding
    #[error("malformed call data: {0}")]
    Rlp(#[from] alloy_rlp::Error),
}

/// Errors raised while adapting the generic execution context.
///
/// These are wiring defects, not properties of the transaction being processed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ContextError {
    /// No context was passed
    #[error("invalid context")]
    Missing,
    /// The context was created by unrelated machinery
    #[error("failed to unwrap aspect runtime context from {found} context")]
    WrongKind {
        /// The kind of the context that was passed
        found: &'static str,
    },
    /// The store the provider reads from is not mounted on the state context
    #[error("store {0} is not mounted on the state context")]
    StoreNotMounted(StoreKey),
}

/// Errors returned by the bonding lookups of the provider.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError<E> {
    /// The execution context could not be adapted; raised before the registry is queried
    #[error(transparent)]
    Context(#[from] ContextError),
    /// The bonding registry failed, its error is kept unchanged
    #[error("bonding registry lookup failed: {0}")]
    Registry(#[source] E),
}

impl<E> ProviderError<E> {
    /// Returns the registry error, if this is one.
    pub const fn as_registry(&self) -> Option<&E> {
        match self {
            Self::Registry(err) => Some(err),
            Self::Context(_) => None,
        }
    }
}
