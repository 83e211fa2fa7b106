//! State-machine messages offered to the Aspect pipeline.

use core::fmt::Debug;

use alloy_consensus::{Transaction, TxEnvelope};
use alloy_eips::{
    eip2718::{Decodable2718, Eip2718Error, Encodable2718},
    Typed2718,
};
use alloy_primitives::{Bytes, B256};
use auto_impl::auto_impl;
use serde::{Deserialize, Serialize};

use crate::constants::MSG_ETHEREUM_TX_TYPE_URL;

/// Errors raised by the basic validation of a message.
#[derive(Debug, thiserror::Error)]
pub enum MsgError {
    /// The message carries no transaction bytes
    #[error("empty transaction payload")]
    EmptyPayload,
    /// The transaction bytes do not decode
    #[error("failed to decode transaction: {0}")]
    Decode(#[from] Eip2718Error),
    /// The declared hash does not match the transaction
    #[error("transaction hash mismatch: declared {declared}, computed {computed}")]
    HashMismatch {
        /// The hash declared by the submitter
        declared: B256,
        /// The hash of the decoded transaction
        computed: B256,
    },
    /// The transaction has a zero gas limit
    #[error("transaction gas limit cannot be zero")]
    ZeroGasLimit,
    /// The transaction type cannot be executed on this chain
    #[error("unsupported transaction type: {0}")]
    UnsupportedTxType(u8),
    /// Any other validation failure of a non-Ethereum message
    #[error("{0}")]
    Invalid(String),
}

/// A message of the state-machine framework.
#[auto_impl(&, Box, Arc)]
pub trait Msg: Debug {
    /// The type URL identifying the message.
    fn type_url(&self) -> &str;

    /// Stateless structural validation of the message.
    fn validate_basic(&self) -> Result<(), MsgError>;

    /// Returns the Ethereum transaction message if this message carries one.
    fn as_ethereum_tx(&self) -> Option<&MsgEthereumTx> {
        None
    }
}

/// A message carrying an EIP-2718 encoded, signed Ethereum transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MsgEthereumTx {
    /// The encoded transaction.
    pub raw: Bytes,
    /// The transaction hash declared by the submitter, checked against `raw`.
    pub hash: Option<B256>,
}

impl MsgEthereumTx {
    /// Creates a new message from encoded transaction bytes.
    pub const fn new(raw: Bytes) -> Self {
        Self { raw, hash: None }
    }

    /// Creates a new message from a signed transaction, declaring its hash.
    pub fn from_envelope(tx: &TxEnvelope) -> Self {
        Self { raw: tx.encoded_2718().into(), hash: Some(*tx.tx_hash()) }
    }

    /// Set the declared transaction hash.
    pub fn with_hash(mut self, hash: B256) -> Self {
        self.hash = Some(hash);
        self
    }

    /// Decodes the carried transaction. Trailing bytes after the transaction are rejected.
    pub fn as_transaction(&self) -> Result<TxEnvelope, Eip2718Error> {
        let mut buf = self.raw.as_ref();
        let tx = TxEnvelope::decode_2718(&mut buf)?;
        if !buf.is_empty() {
            return Err(Eip2718Error::RlpError(alloy_rlp::Error::UnexpectedLength));
        }
        Ok(tx)
    }
}

impl Msg for MsgEthereumTx {
    fn type_url(&self) -> &str {
        MSG_ETHEREUM_TX_TYPE_URL
    }

    fn validate_basic(&self) -> Result<(), MsgError> {
        if self.raw.is_empty() {
            return Err(MsgError::EmptyPayload);
        }

        let tx = self.as_transaction()?;
        if tx.is_eip4844() {
            return Err(MsgError::UnsupportedTxType(tx.ty()));
        }
        if tx.gas_limit() == 0 {
            return Err(MsgError::ZeroGasLimit);
        }
        if let Some(declared) = self.hash {
            let computed = *tx.tx_hash();
            if declared != computed {
                return Err(MsgError::HashMismatch { declared, computed });
            }
        }
        Ok(())
    }

    fn as_ethereum_tx(&self) -> Option<&MsgEthereumTx> {
        Some(self)
    }
}
