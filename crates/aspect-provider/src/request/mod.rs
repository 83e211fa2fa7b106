//! Join-point requests handed to the Aspect pipeline.

mod block;
pub use block::*;

mod tx;
pub use tx::*;

use alloy_primitives::{Address, Bytes, U256};
use alloy_rlp::{Decodable, RlpDecodable, RlpEncodable};
use serde::{Deserialize, Serialize};

use crate::{constants::BYTES_DATA_TYPE_URL, CallDataError};

/// The innermost call being executed when a join point is reached.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InnerTransaction {
    /// The caller
    pub from: Address,
    /// The callee, `None` for contract creation
    pub to: Option<Address>,
    /// The call input
    pub data: Bytes,
    /// The value transferred by the call
    pub value: U256,
    /// The gas limit of the call
    pub gas: u64,
    /// The position of the call in the call stack
    pub index: u64,
}

/// The body of a [`CallData`] container of type [`BYTES_DATA_TYPE_URL`].
#[derive(Clone, Debug, PartialEq, Eq, RlpEncodable, RlpDecodable)]
struct BytesData {
    data: Bytes,
}

/// An opaque, self-describing payload: a type URL and the encoded body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallData {
    /// The type of the encoded body
    pub type_url: String,
    /// The encoded body
    pub value: Bytes,
}

impl CallData {
    /// Wraps raw bytes into a container of type [`BYTES_DATA_TYPE_URL`].
    pub fn wrap_bytes(data: Bytes) -> Self {
        let value = alloy_rlp::encode(BytesData { data });
        Self { type_url: BYTES_DATA_TYPE_URL.to_string(), value: value.into() }
    }

    /// Unwraps the raw bytes of a container of type [`BYTES_DATA_TYPE_URL`].
    pub fn to_bytes(&self) -> Result<Bytes, CallDataError> {
        if self.type_url != BYTES_DATA_TYPE_URL {
            return Err(CallDataError::UnexpectedType(self.type_url.clone()));
        }

        let mut buf = self.value.as_ref();
        let body = BytesData::decode(&mut buf)?;
        if !buf.is_empty() {
            return Err(alloy_rlp::Error::UnexpectedLength.into());
        }
        Ok(body.data)
    }
}
