//! Collaborator interfaces consumed by the analysis core, and their implementations
//!
//! Every collaborator is an object-safe `async_trait` so the orchestrator can
//! be wired with real HTTP clients in production and in-memory doubles in tests.

use std::time::Duration;

use alloy::primitives::{Address, Bytes};
use async_trait::async_trait;
use serde_json::Value;

use crate::chain::ChainInfo;
use crate::error::Result;
use crate::types::DataDecoded;

mod blockaid;
mod cache;
mod ledger;
mod scan;
mod transaction_service;

pub use blockaid::BlockaidClient;
pub use cache::MokaCacheStore;
pub use ledger::{
    ContractInfo, CreationTransaction, MultisigTransaction, Page, SafeInfo, Transfer,
};
pub use scan::{
    AssetDiffEntry, AssetType, ContractManagementChange, Feature, ManagementKind, ResultType,
    ScanAsset, ScanDiff, ScanResponse, ScanStatus, Simulation, Validation,
};
pub use transaction_service::TransactionServiceClient;

/// Turns raw calldata into a method + parameters tree
#[async_trait]
pub trait Decoder: Send + Sync {
    /// Decodes `data` sent to `to`.
    ///
    /// Returns `Ok(None)` for empty calldata or an unknown method.
    async fn decode(&self, chain_id: u64, to: Address, data: &Bytes) -> Result<Option<DataDecoded>>;
}

/// Historical transfers and Safe configuration indexed per chain
#[async_trait]
pub trait LedgerApi: Send + Sync {
    /// Transfers from `safe` to `to`, at most `limit` records
    async fn get_transfers(
        &self,
        chain_id: u64,
        safe: Address,
        to: Address,
        limit: u32,
    ) -> Result<Page<Transfer>>;

    /// Executed multisig transactions from `safe` to `to`, at most `limit` records
    async fn get_multisig_transactions(
        &self,
        chain_id: u64,
        safe: Address,
        to: Address,
        limit: u32,
    ) -> Result<Page<MultisigTransaction>>;

    /// The Safe deployed at `address`, or `None` if there is none
    async fn get_safe(&self, chain_id: u64, address: Address) -> Result<Option<SafeInfo>>;

    /// The transaction that created the Safe at `safe`
    async fn get_creation_transaction(
        &self,
        chain_id: u64,
        safe: Address,
    ) -> Result<CreationTransaction>;
}

/// Known contracts and their verification / trust status
#[async_trait]
pub trait ContractRegistry: Send + Sync {
    /// The registry entry for `address`, or `None` if the contract is unknown
    async fn get_contract(&self, chain_id: u64, address: Address) -> Result<Option<ContractInfo>>;
}

/// Chains the analysis can reach
#[async_trait]
pub trait ChainRegistry: Send + Sync {
    async fn is_supported_chain(&self, chain_id: u64) -> Result<bool>;

    async fn get_chain(&self, chain_id: u64) -> Result<ChainInfo>;
}

/// External threat-intelligence scan
#[async_trait]
pub trait ThreatScanner: Send + Sync {
    /// Scans a typed-data `message` that `wallet` is about to sign for `safe`
    async fn scan(
        &self,
        chain_id: u64,
        safe: Address,
        wallet: Address,
        message: &Value,
        origin: Option<&str>,
    ) -> Result<ScanResponse>;
}

/// Single-key get/set store holding serialized analysis responses
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str, field: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, field: &str, value: String, ttl: Duration) -> Result<()>;
}
