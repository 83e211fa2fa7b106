//! Sender resolution for signed transactions.
//!
//! A transaction is replay protected when its signature commits to a chain id. Protected
//! transactions are verified with the latest signer for their own chain id: later signers accept
//! every transaction type introduced before them, so the fork a transaction was created in does
//! not matter. Unprotected transactions predate chain-id binding and are verified with the
//! Homestead signer.

use alloy_consensus::{Transaction, TxEnvelope};
use alloy_eips::Typed2718;
use alloy_primitives::{Address, ChainId, SignatureError};
use tracing::trace;

use crate::constants::SECP256K1N_HALF;

/// Errors raised while recovering the sender of a transaction.
#[derive(Debug, thiserror::Error)]
pub enum SignerError {
    /// The signature does not recover to a public key
    #[error("invalid signature: {0}")]
    InvalidSignature(#[from] SignatureError),
    /// The `s` value of the signature is in the upper half of the curve order
    #[error("signature s value is above secp256k1n/2")]
    HighS,
    /// A [`SignerScheme::Latest`] built for another chain than the transaction's. Never raised by
    /// [`recover_sender`], which binds the scheme to the transaction's own chain id.
    #[error("transaction chain id {actual:?} does not match signer chain id {expected}")]
    ChainIdMismatch {
        /// The chain id of the signer
        expected: ChainId,
        /// The chain id of the transaction
        actual: Option<ChainId>,
    },
    /// The Homestead signer was given a replay-protected transaction
    #[error("homestead signer cannot verify transaction protected for chain {0}")]
    ReplayProtected(ChainId),
    /// The Homestead signer only verifies legacy transactions
    #[error("transaction type {0} is not supported by the homestead signer")]
    TxTypeNotSupported(u8),
}

/// The signature scheme used to authenticate a transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignerScheme {
    /// Pre-EIP-155 signing. The signature commits to no chain id.
    Homestead,
    /// The most permissive signer for the given chain id.
    Latest(ChainId),
}

impl SignerScheme {
    /// Selects the scheme for `tx`: [`SignerScheme::Latest`] for its own chain id if it is
    /// replay protected, [`SignerScheme::Homestead`] otherwise.
    pub fn for_transaction(tx: &TxEnvelope) -> Self {
        // Unprotected legacy transactions are the only ones without a chain id.
        tx.chain_id().map_or(Self::Homestead, Self::Latest)
    }

    /// Recovers the sender of `tx` under this scheme.
    ///
    /// A scheme chosen by [`SignerScheme::for_transaction`] only fails on the signature itself;
    /// [`SignerError::ChainIdMismatch`] needs a [`SignerScheme::Latest`] picked by the caller.
    pub fn recover_sender(self, tx: &TxEnvelope) -> Result<Address, SignerError> {
        let signature = tx.signature();
        if signature.s() > SECP256K1N_HALF {
            return Err(SignerError::HighS);
        }

        let signature_hash = match self {
            Self::Homestead => {
                let Some(legacy) = tx.as_legacy() else {
                    return Err(SignerError::TxTypeNotSupported(tx.ty()));
                };
                if let Some(chain_id) = legacy.tx().chain_id {
                    return Err(SignerError::ReplayProtected(chain_id));
                }
                legacy.signature_hash()
            }
            Self::Latest(chain_id) => {
                if tx.chain_id() != Some(chain_id) {
                    return Err(SignerError::ChainIdMismatch {
                        expected: chain_id,
                        actual: tx.chain_id(),
                    });
                }
                tx.signature_hash()
            }
        };

        Ok(signature.recover_address_from_prehash(&signature_hash)?)
    }
}

/// Recovers the sender of `tx`, selecting the scheme from its replay protection.
pub fn recover_sender(tx: &TxEnvelope) -> Result<Address, SignerError> {
    let scheme = SignerScheme::for_transaction(tx);
    trace!(target: "aspect::signer", ?scheme, tx_hash = %tx.tx_hash(), "Selected signer scheme");
    scheme.recover_sender(tx)
}
