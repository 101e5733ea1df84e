//! Transaction context supplied alongside the calldata

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

/// What the transaction is known to do beyond its calldata
///
/// Bridge-like transactions carry the destination chain and the address that
/// receives funds there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE", rename_all_fields = "camelCase")]
pub enum TxInfo {
    Bridge {
        target_chain_id: u64,
        recipient: Address,
    },
    SwapAndBridge {
        target_chain_id: u64,
        recipient: Address,
    },
    #[serde(other)]
    Other,
}

impl TxInfo {
    /// Destination chain and recipient, for the variants that cross chains
    pub fn bridge_target(&self) -> Option<(u64, Address)> {
        match self {
            TxInfo::Bridge {
                target_chain_id,
                recipient,
            }
            | TxInfo::SwapAndBridge {
                target_chain_id,
                recipient,
            } => Some((*target_chain_id, *recipient)),
            TxInfo::Other => None,
        }
    }
}
