//! Records returned by the ledger API and the contract registry

use alloy::primitives::{Address, Bytes, B256};
use serde::{Deserialize, Serialize};

use crate::types::DataDecoded;

/// A paginated listing; analyzers only read `count`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// A page with the given total count and no records
    pub fn with_count(count: Option<u64>) -> Self {
        Self {
            count,
            next: None,
            previous: None,
            results: Vec::new(),
        }
    }
}

/// An incoming or outgoing transfer of native value or tokens
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transfer {
    #[serde(rename = "type", default)]
    pub transfer_type: Option<String>,
    pub from: Address,
    pub to: Address,
    #[serde(default)]
    pub transaction_hash: Option<B256>,
    #[serde(default)]
    pub token_address: Option<Address>,
}

/// A multisig transaction proposed or executed by a Safe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultisigTransaction {
    pub safe_tx_hash: B256,
    pub to: Address,
    #[serde(default)]
    pub is_executed: bool,
}

/// On-chain configuration of a Safe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafeInfo {
    pub address: Address,
    pub nonce: u64,
    pub threshold: u64,
    pub owners: Vec<Address>,
    #[serde(default)]
    pub master_copy: Option<Address>,
    #[serde(default)]
    pub modules: Vec<Address>,
    #[serde(default)]
    pub fallback_handler: Option<Address>,
    #[serde(default)]
    pub guard: Option<Address>,
    #[serde(default)]
    pub version: Option<String>,
}

impl SafeInfo {
    /// Same owner set (order-insensitive) and same threshold
    pub fn has_same_setup(&self, other: &SafeInfo) -> bool {
        if self.threshold != other.threshold || self.owners.len() != other.owners.len() {
            return false;
        }
        let mut ours = self.owners.clone();
        let mut theirs = other.owners.clone();
        ours.sort_unstable();
        theirs.sort_unstable();
        ours == theirs
    }

    /// True if at least one owner controls both Safes
    pub fn shares_owner_with(&self, other: &SafeInfo) -> bool {
        self.owners.iter().any(|owner| other.owners.contains(owner))
    }
}

/// The transaction that deployed a Safe proxy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreationTransaction {
    #[serde(default)]
    pub created: Option<String>,
    pub creator: Address,
    pub transaction_hash: B256,
    #[serde(default)]
    pub factory_address: Option<Address>,
    #[serde(default)]
    pub master_copy: Option<Address>,
    #[serde(default)]
    pub setup_data: Option<Bytes>,
    #[serde(default)]
    pub data_decoded: Option<DataDecoded>,
}

/// Registry entry for a contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractInfo {
    pub address: Address,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    /// An ABI is only published for verified source code
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub trusted_for_delegate_call: bool,
}

impl ContractInfo {
    /// Best label for display
    pub fn label(&self) -> Option<&str> {
        self.display_name
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(self.name.as_deref().filter(|s| !s.is_empty()))
    }
}
