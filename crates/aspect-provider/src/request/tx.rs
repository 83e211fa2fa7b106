//! Transaction-level join-point requests.

use alloy_consensus::{Transaction, TxEnvelope};
use alloy_eips::{
    eip2718::{EIP2930_TX_TYPE_ID, LEGACY_TX_TYPE_ID},
    eip2930::AccessList,
    Typed2718,
};
use alloy_primitives::{Address, BlockNumber, Bytes, ChainId, Signature, B256, U256};
use revm::context::TxEnv;
use serde::{Deserialize, Serialize};

use crate::{
    recover_sender, CallData, GasInfo, InnerTransaction, JoinPointError, Msg, StateContext,
};

/// The canonical transaction record offered to Aspects.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AspectTransaction {
    /// The chain id of the executing chain
    pub chain_id: ChainId,
    /// The EIP-2718 transaction type
    pub tx_type: u8,
    /// The sender nonce
    pub nonce: u64,
    /// The gas limit
    pub gas: u64,
    /// The effective gas price under the block base fee
    pub gas_price: u128,
    /// The max priority fee per gas, for dynamic-fee transactions
    pub gas_tip_cap: Option<u128>,
    /// The max fee per gas, for dynamic-fee transactions
    pub gas_fee_cap: Option<u128>,
    /// The sender
    pub from: Address,
    /// The recipient, `None` for contract creation
    pub to: Option<Address>,
    /// The value transferred
    pub value: U256,
    /// The call input or init code
    pub input: Bytes,
    /// The EIP-2930 access list
    pub access_list: AccessList,
    /// The transaction hash
    pub hash: B256,
    /// The hash of the executing block
    pub block_hash: B256,
    /// The height of the executing block
    pub block_number: BlockNumber,
    /// The position in the block, `None` for messages synthesized during execution
    pub transaction_index: Option<u64>,
    /// The signature, `None` for messages synthesized during execution
    pub signature: Option<Signature>,
}

impl AspectTransaction {
    /// Builds the record of a signed transaction sent by `from`.
    ///
    /// Blob transactions are rejected since they cannot be executed on this chain. With a base
    /// fee, the max fee per gas must cover it so that an effective gas price exists.
    pub fn from_signed(
        ctx: &StateContext,
        from: Address,
        tx: &TxEnvelope,
        tx_index: u64,
        base_fee: Option<u64>,
    ) -> Result<Self, JoinPointError> {
        if tx.is_eip4844() {
            return Err(JoinPointError::UnsupportedTxType(tx.ty()));
        }
        if let Some(base_fee) = base_fee {
            if tx.max_fee_per_gas() < u128::from(base_fee) {
                return Err(JoinPointError::FeeCapTooLow {
                    fee_cap: tx.max_fee_per_gas(),
                    base_fee,
                });
            }
        }

        Ok(Self {
            chain_id: ctx.chain_id(),
            tx_type: tx.ty(),
            nonce: tx.nonce(),
            gas: tx.gas_limit(),
            gas_price: tx.effective_gas_price(base_fee),
            gas_tip_cap: tx.max_priority_fee_per_gas(),
            gas_fee_cap: tx.is_dynamic_fee().then(|| tx.max_fee_per_gas()),
            from,
            to: tx.to(),
            value: tx.value(),
            input: tx.input().clone(),
            access_list: tx.access_list().cloned().unwrap_or_default(),
            hash: *tx.tx_hash(),
            block_hash: ctx.header_hash(),
            block_number: ctx.block_height(),
            transaction_index: Some(tx_index),
            signature: Some(*tx.signature()),
        })
    }

    /// Builds the record of a message synthesized during EVM execution. The hash and type are
    /// those of the transaction the message belongs to.
    ///
    /// For dynamic-fee types `msg.gas_price` is the max fee per gas; the effective gas price is
    /// derived from it and the base fee of the executing block.
    pub fn from_evm_message(ctx: &StateContext, msg: &TxEnv, hash: B256, tx_type: u8) -> Self {
        let dynamic_fee = !matches!(tx_type, LEGACY_TX_TYPE_ID | EIP2930_TX_TYPE_ID);
        let gas_tip_cap = msg.gas_priority_fee.filter(|_| dynamic_fee);
        let gas_price = match (gas_tip_cap, ctx.header().base_fee_per_gas) {
            (Some(tip), Some(base_fee)) => {
                msg.gas_price.min(u128::from(base_fee).saturating_add(tip))
            }
            _ => msg.gas_price,
        };

        Self {
            chain_id: ctx.chain_id(),
            tx_type,
            nonce: msg.nonce,
            gas: msg.gas_limit,
            gas_price,
            gas_tip_cap,
            gas_fee_cap: dynamic_fee.then_some(msg.gas_price),
            from: msg.caller,
            to: msg.kind.to().copied(),
            value: msg.value,
            input: msg.data.clone(),
            access_list: msg.access_list.clone(),
            hash,
            block_hash: ctx.header_hash(),
            block_number: ctx.block_height(),
            transaction_index: None,
            signature: None,
        }
    }
}

/// The primary payload of a [`TxJoinPointRequest`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Payload {
    /// A transaction with a resolved sender
    Transaction(AspectTransaction),
    /// An opaque payload without sender
    CallData(CallData),
}

/// A transaction-level join-point request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxJoinPointRequest {
    /// The transaction or opaque payload of the request
    pub payload: Payload,
    /// The innermost call being executed, if any
    pub current_inner_tx: Option<InnerTransaction>,
    /// Gas counters, zero until the caller fills them in
    pub gas_info: GasInfo,
}

impl TxJoinPointRequest {
    /// Builds a request for a signed transaction whose sender is already known. `from` is
    /// trusted as-is.
    pub fn from_signed_transaction(
        ctx: &StateContext,
        from: Address,
        tx: &TxEnvelope,
        tx_index: u64,
        base_fee: Option<u64>,
        inner_tx: Option<InnerTransaction>,
    ) -> Result<Self, JoinPointError> {
        let tx = AspectTransaction::from_signed(ctx, from, tx, tx_index, base_fee)?;
        Ok(Self::new(Payload::Transaction(tx), inner_tx))
    }

    /// Builds a request for an Ethereum transaction message, recovering its sender from the
    /// signature.
    pub fn from_message<M: Msg + ?Sized>(
        ctx: &StateContext,
        msg: &M,
        tx_index: u64,
        base_fee: Option<u64>,
        inner_tx: Option<InnerTransaction>,
    ) -> Result<Self, JoinPointError> {
        let eth_msg = msg
            .as_ethereum_tx()
            .ok_or_else(|| JoinPointError::NotEthereumMessage(msg.type_url().to_string()))?;
        let tx = eth_msg.as_transaction()?;
        let from = recover_sender(&tx)?;
        Self::from_signed_transaction(ctx, from, &tx, tx_index, base_fee, inner_tx)
    }

    /// Builds a request carrying only an opaque payload.
    pub fn from_raw_bytes(data: Bytes) -> Self {
        Self::new(Payload::CallData(CallData::wrap_bytes(data)), None)
    }

    /// Builds a request for a message synthesized during EVM execution.
    pub fn from_evm_message(
        ctx: &StateContext,
        msg: &TxEnv,
        tx_hash: B256,
        tx_type: u8,
        inner_tx: Option<InnerTransaction>,
    ) -> Self {
        let tx = AspectTransaction::from_evm_message(ctx, msg, tx_hash, tx_type);
        Self::new(Payload::Transaction(tx), inner_tx)
    }

    const fn new(payload: Payload, current_inner_tx: Option<InnerTransaction>) -> Self {
        Self { payload, current_inner_tx, gas_info: GasInfo::new() }
    }

    /// Returns the transaction record, if the request carries one.
    pub const fn transaction(&self) -> Option<&AspectTransaction> {
        match &self.payload {
            Payload::Transaction(tx) => Some(tx),
            Payload::CallData(_) => None,
        }
    }

    /// Returns the opaque payload, if the request carries one.
    pub const fn call_data(&self) -> Option<&CallData> {
        match &self.payload {
            Payload::CallData(data) => Some(data),
            Payload::Transaction(_) => None,
        }
    }

    /// Returns the sender of the transaction, `None` for opaque payloads.
    pub fn sender(&self) -> Option<Address> {
        self.transaction().map(|tx| tx.from)
    }
}

#[cfg(test)]
mod tests {
    use alloy_consensus::{TxEip4844, TxLegacy};
    use alloy_primitives::{address, TxKind};

    use super::*;
    use crate::{
        test_utils::{eip1559_tx, legacy_tx, sign_tx, state_context, test_signer, BankSendMsg},
        MsgEthereumTx, SignerError,
    };

    const RECIPIENT: Address = address!("0000000000000000000000000000000000100001");

    #[test]
    fn test_signed_transaction_record() {
        let ctx = state_context(42, 11820);
        let signer = test_signer(1);
        let tx: TxEnvelope = sign_tx(&signer, eip1559_tx(11820, TxKind::Call(RECIPIENT))).into();
        let declared = address!("00000000000000000000000000000000000000dd");

        let request =
            TxJoinPointRequest::from_signed_transaction(&ctx, declared, &tx, 3, Some(7), None)
                .unwrap();
        let record = request.transaction().unwrap();

        assert_eq!(request.sender(), Some(declared));
        assert!(request.call_data().is_none());
        assert!(request.gas_info.is_zero());
        assert_eq!(record.chain_id, 11820);
        assert_eq!(record.tx_type, 2);
        assert_eq!(record.to, Some(RECIPIENT));
        assert_eq!(record.hash, *tx.tx_hash());
        assert_eq!(record.block_hash, ctx.header_hash());
        assert_eq!(record.block_number, 42);
        assert_eq!(record.transaction_index, Some(3));
        assert_eq!(record.gas_price, tx.effective_gas_price(Some(7)));
        assert_eq!(record.gas_fee_cap, Some(tx.max_fee_per_gas()));
        assert_eq!(record.signature, Some(*tx.signature()));
    }

    #[test]
    fn test_signed_transaction_rejects_low_fee_cap() {
        let ctx = state_context(1, 1);
        let legacy = TxLegacy { gas_price: 5, ..legacy_tx(None, RECIPIENT) };
        let tx: TxEnvelope = sign_tx(&test_signer(1), legacy).into();

        assert!(matches!(
            TxJoinPointRequest::from_signed_transaction(&ctx, RECIPIENT, &tx, 0, Some(6), None),
            Err(JoinPointError::FeeCapTooLow { fee_cap: 5, base_fee: 6 })
        ));
        assert!(
            TxJoinPointRequest::from_signed_transaction(&ctx, RECIPIENT, &tx, 0, Some(5), None)
                .is_ok()
        );
        assert!(
            TxJoinPointRequest::from_signed_transaction(&ctx, RECIPIENT, &tx, 0, None, None)
                .is_ok()
        );
    }

    #[test]
    fn test_signed_transaction_rejects_blob() {
        let ctx = state_context(1, 1);
        let blob = TxEip4844 { chain_id: 1, gas_limit: 21_000, ..Default::default() };
        let tx: TxEnvelope = sign_tx(&test_signer(1), blob).into();

        assert!(matches!(
            TxJoinPointRequest::from_signed_transaction(&ctx, RECIPIENT, &tx, 0, None, None),
            Err(JoinPointError::UnsupportedTxType(3))
        ));
    }

    #[test]
    fn test_message_recovers_sender_of_foreign_chain() {
        // The context runs chain 1; the transaction is protected for chain 5.
        let ctx = state_context(1, 1);
        let signer = test_signer(9);
        let tx: TxEnvelope = sign_tx(&signer, eip1559_tx(5, TxKind::Call(RECIPIENT))).into();
        let msg = MsgEthereumTx::from_envelope(&tx);

        let request = TxJoinPointRequest::from_message(&ctx, &msg, 0, None, None).unwrap();
        assert_eq!(request.sender(), Some(signer.address()));
        assert_eq!(request.transaction().unwrap().chain_id, 1);
    }

    #[test]
    fn test_message_errors() {
        let ctx = state_context(1, 1);

        let bank_send = BankSendMsg::new(RECIPIENT, 1);
        let err = TxJoinPointRequest::from_message(&ctx, &bank_send, 0, None, None).unwrap_err();
        assert!(matches!(err, JoinPointError::NotEthereumMessage(_)));
        assert!(!err.is_signature_failure());

        let msg = MsgEthereumTx::new(Bytes::from_static(&[0x01]));
        assert!(matches!(
            TxJoinPointRequest::from_message(&ctx, &msg, 0, None, None),
            Err(JoinPointError::Decode(_))
        ));

        let unsigned = alloy_consensus::Signed::new_unhashed(
            legacy_tx(None, RECIPIENT),
            Signature::new(U256::ZERO, U256::from(1), false),
        );
        let msg = MsgEthereumTx::from_envelope(&TxEnvelope::from(unsigned));
        let err = TxJoinPointRequest::from_message(&ctx, &msg, 0, None, None).unwrap_err();
        assert!(matches!(err, JoinPointError::Signer(SignerError::InvalidSignature(_))));
        assert!(err.is_signature_failure());
    }

    #[test]
    fn test_raw_bytes_request() {
        let data = Bytes::from_static(b"opaque aspect payload");
        let request = TxJoinPointRequest::from_raw_bytes(data.clone());

        assert!(request.transaction().is_none());
        assert!(request.sender().is_none());
        assert!(request.current_inner_tx.is_none());
        assert!(request.gas_info.is_zero());
        assert_eq!(request.call_data().unwrap().to_bytes().unwrap(), data);
    }

    #[test]
    fn test_evm_message_request() {
        let ctx = state_context(10, 11820);
        let caller = address!("00000000000000000000000000000000000000cc");
        let msg = TxEnv {
            caller,
            kind: TxKind::Create,
            gas_limit: 100_000,
            gas_price: 9,
            gas_priority_fee: Some(2),
            nonce: 4,
            tx_type: 2,
            ..Default::default()
        };
        let inner = InnerTransaction { from: caller, gas: 50_000, ..Default::default() };
        let hash = B256::repeat_byte(0x11);

        let request =
            TxJoinPointRequest::from_evm_message(&ctx, &msg, hash, 2, Some(inner.clone()));
        let record = request.transaction().unwrap();

        assert_eq!(request.sender(), Some(caller));
        assert_eq!(request.current_inner_tx, Some(inner));
        assert!(request.gas_info.is_zero());
        assert_eq!(record.hash, hash);
        assert_eq!(record.tx_type, 2);
        assert_eq!(record.to, None);
        assert_eq!(record.nonce, 4);
        assert_eq!(record.gas_tip_cap, Some(2));
        assert_eq!(record.gas_fee_cap, Some(9));
        assert_eq!(record.block_number, 10);
        assert_eq!(record.transaction_index, None);
        assert_eq!(record.signature, None);
    }

    #[test]
    fn test_evm_message_gas_price_matches_signed_transaction() {
        // Base fee 7 is below the max fee, so the tip is what bounds the price.
        let ctx = state_context(10, 11820);
        let signer = test_signer(3);
        let tx: TxEnvelope = sign_tx(&signer, eip1559_tx(11820, TxKind::Call(RECIPIENT))).into();
        let msg = TxEnv {
            tx_type: tx.ty(),
            caller: signer.address(),
            gas_limit: tx.gas_limit(),
            gas_price: tx.max_fee_per_gas(),
            gas_priority_fee: tx.max_priority_fee_per_gas(),
            kind: tx.kind(),
            value: tx.value(),
            data: tx.input().clone(),
            nonce: tx.nonce(),
            chain_id: tx.chain_id(),
            ..Default::default()
        };

        let signed =
            AspectTransaction::from_signed(&ctx, signer.address(), &tx, 0, Some(7)).unwrap();
        let evm = AspectTransaction::from_evm_message(&ctx, &msg, *tx.tx_hash(), tx.ty());

        assert_eq!(evm.gas_price, 1_000_000_007);
        assert_eq!(evm.gas_price, signed.gas_price);
        assert_eq!(evm.gas_tip_cap, signed.gas_tip_cap);
        assert_eq!(evm.gas_fee_cap, signed.gas_fee_cap);
    }

    #[test]
    fn test_evm_message_legacy_gas_price() {
        let ctx = state_context(10, 11820);
        let msg = TxEnv { gas_price: 3, gas_priority_fee: Some(1), ..Default::default() };

        let record = AspectTransaction::from_evm_message(&ctx, &msg, B256::ZERO, 0);
        assert_eq!(record.gas_price, 3);
        assert_eq!(record.gas_tip_cap, None);
        assert_eq!(record.gas_fee_cap, None);
    }

    #[test]
    fn test_requests_do_not_share_gas_info() {
        let mut first = TxJoinPointRequest::from_raw_bytes(Bytes::new());
        let second = TxJoinPointRequest::from_raw_bytes(Bytes::new());
        first.gas_info.gas_used = 21_000;
        assert!(second.gas_info.is_zero());
    }
}
