//! Identification of the address that ends up receiving value

use std::collections::HashSet;

use alloy::primitives::Address;
use alloy::sol_types::SolCall;

use crate::contracts::IERC20;
use crate::types::{DecodedCallKind, DecodedTransaction};

/// Returns the effective recipient of `tx`.
///
/// Rules, first match wins:
/// 1. `execTransaction` with empty inner data: the inner `to`
/// 2. ERC-20 `transfer(to, amount)`: `to`
/// 3. ERC-20 `transferFrom(from, to, amount)`: `to`
/// 4. empty calldata: `tx.to`
///
/// Any other call has no recipient; its target is a contract counterparty.
pub fn extract_recipient(tx: &DecodedTransaction) -> Option<Address> {
    if let Ok(DecodedCallKind::ExecTransaction(call)) = tx.kind() {
        if call.data.is_empty() {
            return Some(call.to);
        }
    }

    if tx.is_empty_data() {
        Some(tx.to)
    } else {
        erc20_recipient(tx)
    }
}

/// Unique recipients of `txs` in order of first occurrence
pub fn extract_recipients(txs: &[DecodedTransaction]) -> Vec<Address> {
    let mut seen = HashSet::new();
    txs.iter()
        .filter_map(extract_recipient)
        .filter(|recipient| seen.insert(*recipient))
        .collect()
}

fn erc20_recipient(tx: &DecodedTransaction) -> Option<Address> {
    let selector = tx.data.get(..4)?;

    if selector == IERC20::transferCall::SELECTOR {
        IERC20::transferCall::abi_decode(&tx.data)
            .map(|call| call.to)
            .ok()
            .or_else(|| decoded_address(tx, "transfer", 0))
    } else if selector == IERC20::transferFromCall::SELECTOR {
        IERC20::transferFromCall::abi_decode(&tx.data)
            .map(|call| call.to)
            .ok()
            .or_else(|| decoded_address(tx, "transferFrom", 1))
    } else {
        None
    }
}

/// Falls back to the decoder's reading when the raw calldata does not decode
fn decoded_address(tx: &DecodedTransaction, method: &str, index: usize) -> Option<Address> {
    tx.data_decoded
        .as_ref()
        .filter(|decoded| decoded.method == method)?
        .address_at(index)
}
