//! The Aspect join-point provider.
//!
//! This crate sits between the transaction/block execution pipeline of the chain and the Aspect
//! bonding registry. It normalizes signed transactions, EVM messages, raw payloads and block
//! headers into join-point requests, decides which state-machine messages are routed to Aspects
//! at all, and resolves bonded Aspects through a [`BondingRegistry`] once the generic execution
//! context has been unwrapped into an [`AspectRuntimeContext`].
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

pub mod constants;

mod context;
pub use context::*;

mod error;
pub use error::*;

mod filter;
pub use filter::*;

mod gas;
pub use gas::*;

mod join_point;
pub use join_point::*;

mod message;
pub use message::*;

pub mod params;

mod provider;
pub use provider::*;

mod registry;
pub use registry::*;

mod request;
pub use request::*;

mod signer;
pub use signer::*;

mod store;
pub use store::*;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use alloy_consensus;
pub use alloy_eips;
pub use revm;
