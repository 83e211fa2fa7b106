//! Constants shared by the join-point provider.

use alloy_primitives::{address, uint, Address, U256};

use crate::StoreKey;

/// The address of the Aspect management system contract.
///
/// Deploying, upgrading and bonding Aspects are calls to this contract. Such calls manage the
/// bonding registry itself and are never offered to bonded Aspects.
pub const ASPECT_CONTRACT_ADDRESS: Address = address!("0x0000000000000000000000000000000000A27E14");

/// Half of the secp256k1 curve order. Every signer since Homestead (EIP-2) rejects signatures
/// whose `s` value is above it.
pub const SECP256K1N_HALF: U256 =
    uint!(0x7FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF5D576E7357A4501DDFE92F46681B20A0_U256);

/// The type URL of the self-describing container wrapping raw byte payloads.
pub const BYTES_DATA_TYPE_URL: &str = "/aspect.v2.BytesData";

/// The type URL of Ethereum transaction messages.
pub const MSG_ETHEREUM_TX_TYPE_URL: &str = "/artela.evm.v1.MsgEthereumTx";

/// The store holding EVM module state, including the chain parameters.
pub const EVM_STORE_KEY: StoreKey = StoreKey::new("evm");

/// The store holding legacy per-field parameter subspaces.
pub const PARAMS_STORE_KEY: StoreKey = StoreKey::new("params");

/// The key under which the chain parameters are stored in the EVM store.
pub const KEY_PREFIX_PARAMS: &[u8] = &[0x03];

/// The name of the legacy parameter subspace of the EVM module.
pub const EVM_PARAM_SUBSPACE: &str = "evm";
