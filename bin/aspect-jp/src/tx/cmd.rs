use alloy_primitives::Address;
use aspect_provider::{
    should_route, JoinPointError, MsgEthereumTx, SignerScheme, TxJoinPointRequest,
};
use clap::Parser;
use serde::Serialize;
use tracing::{debug, info};

use crate::common::{load_hex, print_json, EnvArgs, JpError, Result};

/// Output of the tx command
#[derive(Debug, Serialize)]
struct TxOutput<'a> {
    routed: bool,
    request: &'a TxJoinPointRequest,
}

/// Build the join-point request of a signed transaction
#[derive(Parser, Debug)]
pub struct Cmd {
    /// EIP-2718 encoded signed transaction, hex
    #[arg(value_name = "RAW_TX")]
    pub raw: Option<String>,

    /// File holding the encoded transaction. `-` reads from stdin.
    #[arg(long = "tx.file", conflicts_with = "raw")]
    pub raw_file: Option<String>,

    /// Trusted sender. Skips signature recovery.
    #[arg(long = "sender")]
    pub sender: Option<Address>,

    /// Position of the transaction in the block
    #[arg(long = "tx.index", default_value = "0")]
    pub tx_index: u64,

    /// Environment configuration
    #[command(flatten)]
    pub env_args: EnvArgs,
}

impl Cmd {
    /// Execute the tx command
    pub fn run(&self) -> Result<()> {
        let raw = load_hex(self.raw.as_deref(), self.raw_file.as_deref())?
            .ok_or_else(|| JpError::InvalidInput("no transaction provided".to_string()))?;
        let msg = MsgEthereumTx::new(raw);

        let routed = should_route(&msg);
        info!(routed, "Routing decision");

        let request = self.build_request(&msg)?;
        print_json(&TxOutput { routed, request: &request })
    }

    fn build_request(&self, msg: &MsgEthereumTx) -> Result<TxJoinPointRequest> {
        let ctx = self.env_args.create_state_context();
        let base_fee = self.env_args.block_basefee;

        let request = match self.sender {
            Some(sender) => {
                let tx = msg.as_transaction().map_err(JoinPointError::from)?;
                debug!(%sender, tx_hash = %tx.tx_hash(), "Using trusted sender");
                TxJoinPointRequest::from_signed_transaction(
                    &ctx,
                    sender,
                    &tx,
                    self.tx_index,
                    base_fee,
                    None,
                )?
            }
            None => {
                if let Ok(tx) = msg.as_transaction() {
                    let scheme = SignerScheme::for_transaction(&tx);
                    debug!(?scheme, tx_hash = %tx.tx_hash(), "Recovering sender");
                }
                TxJoinPointRequest::from_message(&ctx, msg, self.tx_index, base_fee, None)?
            }
        };
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use alloy_consensus::TxEnvelope;
    use alloy_primitives::{address, hex};
    use aspect_provider::{
        alloy_eips::eip2718::Encodable2718,
        constants::ASPECT_CONTRACT_ADDRESS,
        test_utils::{legacy_tx, sign_tx, test_signer},
    };

    use super::*;

    const RECIPIENT: Address = address!("0000000000000000000000000000000000100001");

    fn cmd(raw: &TxEnvelope, extra: &[&str]) -> Cmd {
        #[derive(Parser, Debug)]
        struct TestCmd {
            #[command(flatten)]
            cmd: Cmd,
        }

        let raw = hex::encode_prefixed(raw.encoded_2718());
        let args = ["test", raw.as_str()].into_iter().chain(extra.iter().copied());
        TestCmd::parse_from(args).cmd
    }

    #[test]
    fn test_recovers_sender() {
        let signer = test_signer(3);
        let tx: TxEnvelope = sign_tx(&signer, legacy_tx(None, RECIPIENT)).into();
        let cmd = cmd(&tx, &["--block.number", "5"]);

        let msg = MsgEthereumTx::new(tx.encoded_2718().into());
        let request = cmd.build_request(&msg).unwrap();
        assert_eq!(request.sender(), Some(signer.address()));
        assert_eq!(request.transaction().unwrap().block_number, 5);
        assert!(should_route(&msg));
    }

    #[test]
    fn test_trusted_sender() {
        let tx: TxEnvelope = sign_tx(&test_signer(3), legacy_tx(None, RECIPIENT)).into();
        let sender = address!("00000000000000000000000000000000000000aa");
        let sender_arg = sender.to_string();
        let cmd = cmd(&tx, &["--sender", sender_arg.as_str(), "--tx.index", "4"]);

        let msg = MsgEthereumTx::new(tx.encoded_2718().into());
        let request = cmd.build_request(&msg).unwrap();
        assert_eq!(request.sender(), Some(sender));
        assert_eq!(request.transaction().unwrap().transaction_index, Some(4));
    }

    #[test]
    fn test_fee_cap_below_base_fee() {
        let tx: TxEnvelope = sign_tx(&test_signer(3), legacy_tx(None, RECIPIENT)).into();
        let cmd = cmd(&tx, &["--block.basefee", "2000000000"]);

        let msg = MsgEthereumTx::new(tx.encoded_2718().into());
        assert!(matches!(
            cmd.build_request(&msg),
            Err(JpError::JoinPoint(JoinPointError::FeeCapTooLow { .. }))
        ));
    }

    #[test]
    fn test_management_call_is_not_routed() {
        let tx: TxEnvelope =
            sign_tx(&test_signer(3), legacy_tx(None, ASPECT_CONTRACT_ADDRESS)).into();
        let msg = MsgEthereumTx::new(tx.encoded_2718().into());
        assert!(!should_route(&msg));
    }
}
