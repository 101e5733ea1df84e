//! MultiSend transaction encoding
//!
//! The MultiSend contract expects transactions to be encoded in a packed format:
//! - operation: 1 byte (0 = Call, 1 = DelegateCall)
//! - to: 20 bytes
//! - value: 32 bytes
//! - data length: 32 bytes
//! - data: variable length

use alloy::primitives::{Address, Bytes, U256};

use crate::error::{Error, Result};
use crate::types::{DecodedTransaction, Operation};

/// Size of the fixed header preceding each transaction's data
const HEADER_LEN: usize = 1 + 20 + 32 + 32;

/// Encodes a single transaction for MultiSend packed format
///
/// Format: operation (1 byte) | to (20 bytes) | value (32 bytes) | data length (32 bytes) | data
pub fn encode_transaction(tx: &DecodedTransaction) -> Vec<u8> {
    let data_len = tx.data.len();
    let mut encoded = Vec::with_capacity(HEADER_LEN + data_len);

    encoded.push(tx.operation.as_u8());
    encoded.extend_from_slice(tx.to.as_slice());
    encoded.extend_from_slice(&tx.value.to_be_bytes::<32>());

    let mut data_len_bytes = [0u8; 32];
    data_len_bytes[24..].copy_from_slice(&(data_len as u64).to_be_bytes());
    encoded.extend_from_slice(&data_len_bytes);

    encoded.extend_from_slice(&tx.data);

    encoded
}

/// Encodes multiple transactions for MultiSend
pub fn encode_multisend_data(txs: &[DecodedTransaction]) -> Bytes {
    let mut encoded = Vec::new();

    for tx in txs {
        encoded.extend(encode_transaction(tx));
    }

    Bytes::from(encoded)
}

/// Decodes the packed `transactions` argument of a MultiSend call
///
/// The returned transactions carry no decoding; callers decode each inner
/// `data` themselves.
pub fn decode_multisend_data(packed: &[u8]) -> Result<Vec<DecodedTransaction>> {
    let mut txs = Vec::new();
    let mut offset = 0;

    while offset < packed.len() {
        let header = packed
            .get(offset..offset + HEADER_LEN)
            .ok_or_else(|| Error::Encoding(format!("truncated MultiSend header at byte {offset}")))?;

        let operation = Operation::from_u8(header[0])
            .ok_or_else(|| Error::Encoding(format!("invalid operation {} at byte {offset}", header[0])))?;
        let to = Address::from_slice(&header[1..21]);
        let value = U256::from_be_slice(&header[21..53]);

        let data_len = U256::from_be_slice(&header[53..85]).saturating_to::<usize>();

        let data_start = offset + HEADER_LEN;
        let data = data_start
            .checked_add(data_len)
            .and_then(|end| packed.get(data_start..end))
            .ok_or_else(|| {
                Error::Encoding(format!(
                    "MultiSend entry at byte {offset} declares {data_len} data bytes past the end"
                ))
            })?;

        txs.push(
            DecodedTransaction::new(to, value, Bytes::copy_from_slice(data)).with_operation(operation),
        );
        offset = data_start + data_len;
    }

    Ok(txs)
}
