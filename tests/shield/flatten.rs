//! Decoding and flattening of nested Safe calls

use alloy::primitives::{address, Address, Bytes, U256};
use alloy::sol_types::SolCall;
use safe_shield::contracts::ISafe;
use safe_shield::{flatten, ChainAddresses, DecodedTransaction, LocalDecoder, Operation};

use crate::common::{erc20_transfer, multi_send_data, native_transfer};

const R1: Address = address!("0x1111111111111111111111111111111111111111");
const R2: Address = address!("0x2222222222222222222222222222222222222222");
const TOKEN: Address = address!("0x7070707070707070707070707070707070707070");

fn exec_transaction_data(to: Address, data: Bytes, operation: Operation) -> Bytes {
    ISafe::execTransactionCall {
        to,
        value: U256::ZERO,
        data,
        operation: operation.as_u8(),
        safeTxGas: U256::ZERO,
        baseGas: U256::ZERO,
        gasPrice: U256::ZERO,
        gasToken: Address::ZERO,
        refundReceiver: Address::ZERO,
        signatures: Bytes::new(),
    }
    .abi_encode()
    .into()
}

fn decoded(to: Address, data: Bytes) -> DecodedTransaction {
    let data_decoded = LocalDecoder::new().decode_call(&data).unwrap();
    DecodedTransaction::new(to, U256::ZERO, data).with_data_decoded(data_decoded)
}

/// execTransaction wrapping a multiSend flattens to the batch's leaves, in order
#[test]
fn test_exec_transaction_of_multisend() {
    let multi_send = ChainAddresses::default().multi_send;
    let batch = [native_transfer(R1, 10), erc20_transfer(TOKEN, R2, 20)];
    let inner = multi_send_data(&batch);
    let outer = exec_transaction_data(multi_send, inner, Operation::DelegateCall);
    let safe = address!("0x5afe5afe5afe5afe5afe5afe5afe5afe5afe5afe");

    let leaves = flatten(&decoded(safe, outer)).unwrap();

    assert_eq!(leaves.len(), 2);
    assert_eq!(leaves[0].to, R1);
    assert_eq!(leaves[0].value, U256::from(10));
    assert!(leaves[0].is_empty_data());
    assert_eq!(leaves[1].to, TOKEN);
    assert_eq!(
        leaves[1].data_decoded.as_ref().map(|d| d.method.as_str()),
        Some("transfer")
    );
}

/// Flattening already flat output changes nothing
#[test]
fn test_flatten_is_idempotent_on_leaves() {
    let batch = [native_transfer(R1, 1), erc20_transfer(TOKEN, R2, 2)];
    let tx = decoded(ChainAddresses::default().multi_send, multi_send_data(&batch));

    let leaves = flatten(&tx).unwrap();
    let again: Vec<DecodedTransaction> = leaves
        .iter()
        .map(|leaf| flatten(leaf).unwrap())
        .collect::<Vec<_>>()
        .concat();

    assert_eq!(leaves, again);
}

/// Undecodable calldata is its own leaf
#[test]
fn test_unknown_call_is_leaf() {
    let tx = decoded(TOKEN, Bytes::from_static(&[0xca, 0xfe, 0xba, 0xbe, 0x00]));

    let leaves = flatten(&tx).unwrap();

    assert_eq!(leaves, vec![tx]);
}
