//! Eligibility of state-machine messages for the Aspect pipeline.

use alloy_consensus::Transaction;
use alloy_primitives::Address;
use tracing::trace;

use crate::{constants::ASPECT_CONTRACT_ADDRESS, Msg};

/// Returns `true` if `address` is the Aspect management system contract.
pub fn is_aspect_contract_address(address: Address) -> bool {
    address == ASPECT_CONTRACT_ADDRESS
}

/// Decides whether `msg` is routed to bonded Aspects.
///
/// Only valid Ethereum transaction messages calling an ordinary account are routed. Contract
/// creations have no bonded target yet, and calls to the Aspect management contract are never
/// routed so that Aspects cannot intercept their own management traffic.
pub fn should_route<M: Msg + ?Sized>(msg: &M) -> bool {
    if let Err(err) = msg.validate_basic() {
        trace!(target: "aspect::filter", type_url = msg.type_url(), %err, "Invalid message");
        return false;
    }

    let Some(eth_msg) = msg.as_ethereum_tx() else {
        trace!(target: "aspect::filter", type_url = msg.type_url(), "Not an ethereum transaction");
        return false;
    };

    let tx = match eth_msg.as_transaction() {
        Ok(tx) => tx,
        Err(err) => {
            trace!(target: "aspect::filter", %err, "Undecodable transaction");
            return false;
        }
    };

    match tx.to() {
        None => {
            trace!(target: "aspect::filter", tx_hash = %tx.tx_hash(), "Contract creation");
            false
        }
        Some(to) if is_aspect_contract_address(to) => {
            trace!(target: "aspect::filter", tx_hash = %tx.tx_hash(), "Aspect management call");
            false
        }
        Some(to) => {
            trace!(target: "aspect::filter", tx_hash = %tx.tx_hash(), %to, "Routing transaction");
            true
        }
    }
}
