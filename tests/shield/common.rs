//! In-memory collaborators and fixtures shared by the analysis tests

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::{address, Address, Bytes, B256, U256};
use alloy::sol_types::SolCall;
use async_trait::async_trait;
use safe_shield::chain::StaticChainRegistry;
use safe_shield::config::{default_chains, AnalysisSettings, BlockaidConfig, CacheConfig};
use safe_shield::contracts::{IMultiSend, IERC20};
use safe_shield::encoding::encode_multisend_data;
use safe_shield::services::{
    CacheStore, ContractInfo, ContractRegistry, CreationTransaction, Decoder, LedgerApi,
    MultisigTransaction, Page, SafeInfo, ScanResponse, ThreatScanner, Transfer,
};
use safe_shield::{
    ChainAddresses, DataDecoded, DecodedTransaction, Error, LocalDecoder, Result, SafeShield,
    ShieldConfig,
};
use serde_json::Value;
use tokio::sync::RwLock;
use url::Url;

pub const CHAIN_ID: u64 = 1;
pub const SAFE: Address = address!("0x5afe5afe5afe5afe5afe5afe5afe5afe5afe5afe");
pub const OWNER_A: Address = address!("0x00000000000000000000000000000000000000a1");
pub const OWNER_B: Address = address!("0x00000000000000000000000000000000000000b2");
pub const OWNER_C: Address = address!("0x00000000000000000000000000000000000000c3");
pub const WALLET: Address = address!("0x000000000000000000000000000000000000beef");

fn collaborator_error(what: &'static str) -> Error {
    Error::Fetch {
        what,
        reason: "service unavailable".to_string(),
    }
}

/// Ledger double: transfer counts, executed-tx counts, Safes and creations
#[derive(Default)]
pub struct MockLedger {
    transfer_counts: RwLock<HashMap<Address, Option<u64>>>,
    multisig_counts: RwLock<HashMap<Address, u64>>,
    safes: RwLock<HashMap<(u64, Address), SafeInfo>>,
    creations: RwLock<HashMap<(u64, Address), CreationTransaction>>,
    failing: RwLock<HashSet<Address>>,
    pub transfer_calls: AtomicUsize,
    pub multisig_calls: AtomicUsize,
    pub safe_calls: AtomicUsize,
}

impl MockLedger {
    pub async fn set_transfer_count(&self, to: Address, count: Option<u64>) {
        self.transfer_counts.write().await.insert(to, count);
    }

    pub async fn set_multisig_count(&self, to: Address, count: u64) {
        self.multisig_counts.write().await.insert(to, count);
    }

    pub async fn insert_safe(&self, chain_id: u64, info: SafeInfo) {
        self.safes.write().await.insert((chain_id, info.address), info);
    }

    pub async fn set_creation(&self, chain_id: u64, safe: Address, creation: CreationTransaction) {
        self.creations.write().await.insert((chain_id, safe), creation);
    }

    /// Every lookup keyed by `address` fails from now on
    pub async fn fail_for(&self, address: Address) {
        self.failing.write().await.insert(address);
    }

    pub fn transfer_calls(&self) -> usize {
        self.transfer_calls.load(Ordering::SeqCst)
    }

    pub fn multisig_calls(&self) -> usize {
        self.multisig_calls.load(Ordering::SeqCst)
    }

    async fn is_failing(&self, address: Address) -> bool {
        self.failing.read().await.contains(&address)
    }
}

#[async_trait]
impl LedgerApi for MockLedger {
    async fn get_transfers(
        &self,
        _chain_id: u64,
        _safe: Address,
        to: Address,
        _limit: u32,
    ) -> Result<Page<Transfer>> {
        self.transfer_calls.fetch_add(1, Ordering::SeqCst);
        if self.is_failing(to).await {
            return Err(collaborator_error("transfers"));
        }
        let count = self
            .transfer_counts
            .read()
            .await
            .get(&to)
            .copied()
            .unwrap_or(Some(0));
        Ok(Page::with_count(count))
    }

    async fn get_multisig_transactions(
        &self,
        _chain_id: u64,
        _safe: Address,
        to: Address,
        _limit: u32,
    ) -> Result<Page<MultisigTransaction>> {
        self.multisig_calls.fetch_add(1, Ordering::SeqCst);
        if self.is_failing(to).await {
            return Err(collaborator_error("multisig transactions"));
        }
        let count = self.multisig_counts.read().await.get(&to).copied().unwrap_or(0);
        Ok(Page::with_count(Some(count)))
    }

    async fn get_safe(&self, chain_id: u64, address: Address) -> Result<Option<SafeInfo>> {
        self.safe_calls.fetch_add(1, Ordering::SeqCst);
        if self.is_failing(address).await {
            return Err(collaborator_error("safe"));
        }
        Ok(self.safes.read().await.get(&(chain_id, address)).cloned())
    }

    async fn get_creation_transaction(
        &self,
        chain_id: u64,
        safe: Address,
    ) -> Result<CreationTransaction> {
        self.creations
            .read()
            .await
            .get(&(chain_id, safe))
            .cloned()
            .ok_or(Error::UnexpectedStatus {
                what: "creation transaction",
                status: 404,
            })
    }
}

#[derive(Default)]
pub struct MockRegistry {
    contracts: RwLock<HashMap<Address, ContractInfo>>,
    failing: RwLock<HashSet<Address>>,
    pub calls: AtomicUsize,
}

impl MockRegistry {
    pub async fn insert(&self, info: ContractInfo) {
        self.contracts.write().await.insert(info.address, info);
    }

    pub async fn fail_for(&self, address: Address) {
        self.failing.write().await.insert(address);
    }
}

#[async_trait]
impl ContractRegistry for MockRegistry {
    async fn get_contract(&self, _chain_id: u64, address: Address) -> Result<Option<ContractInfo>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.read().await.contains(&address) {
            return Err(collaborator_error("contract"));
        }
        Ok(self.contracts.read().await.get(&address).cloned())
    }
}

/// Scanner double answering with a fixed response, or failing when none is set
#[derive(Default)]
pub struct MockScanner {
    response: RwLock<Option<ScanResponse>>,
    last_message: RwLock<Option<Value>>,
    last_origin: RwLock<Option<String>>,
    pub calls: AtomicUsize,
}

impl MockScanner {
    pub async fn respond_with(&self, response: ScanResponse) {
        *self.response.write().await = Some(response);
    }

    pub async fn last_message(&self) -> Option<Value> {
        self.last_message.read().await.clone()
    }

    pub async fn last_origin(&self) -> Option<String> {
        self.last_origin.read().await.clone()
    }
}

#[async_trait]
impl ThreatScanner for MockScanner {
    async fn scan(
        &self,
        _chain_id: u64,
        _safe: Address,
        _wallet: Address,
        message: &Value,
        origin: Option<&str>,
    ) -> Result<ScanResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_message.write().await = Some(message.clone());
        *self.last_origin.write().await = origin.map(str::to_string);

        self.response
            .read()
            .await
            .clone()
            .ok_or_else(|| Error::Scanner("upstream timeout".to_string()))
    }
}

/// Plain map store; entries never expire
#[derive(Default)]
pub struct MockCache {
    entries: RwLock<HashMap<(String, String), String>>,
    pub get_calls: AtomicUsize,
    pub set_calls: AtomicUsize,
}

impl MockCache {
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Overwrites every stored payload with something that is not JSON
    pub async fn corrupt_all(&self) {
        for payload in self.entries.write().await.values_mut() {
            *payload = "{not json".to_string();
        }
    }

    pub fn set_calls(&self) -> usize {
        self.set_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CacheStore for MockCache {
    async fn get(&self, key: &str, field: &str) -> Result<Option<String>> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .entries
            .read()
            .await
            .get(&(key.to_string(), field.to_string()))
            .cloned())
    }

    async fn set(&self, key: &str, field: &str, value: String, _ttl: Duration) -> Result<()> {
        self.set_calls.fetch_add(1, Ordering::SeqCst);
        self.entries
            .write()
            .await
            .insert((key.to_string(), field.to_string()), value);
        Ok(())
    }
}

/// Decoder that is always down
pub struct FailingDecoder;

#[async_trait]
impl Decoder for FailingDecoder {
    async fn decode(&self, _chain_id: u64, _to: Address, _data: &Bytes) -> Result<Option<DataDecoded>> {
        Err(Error::Http {
            what: "decoder",
            reason: "connection refused".to_string(),
        })
    }
}

pub fn test_config() -> ShieldConfig {
    ShieldConfig {
        cache: CacheConfig::default(),
        analysis: AnalysisSettings::default(),
        blockaid: BlockaidConfig {
            base_url: Url::parse("http://localhost:1").unwrap(),
            api_key: None,
            timeout_ms: 1_000,
        },
        chains: default_chains(),
    }
}

/// Mocks plus the facade wired to them
pub struct TestHarness {
    pub ledger: Arc<MockLedger>,
    pub registry: Arc<MockRegistry>,
    pub scanner: Arc<MockScanner>,
    pub cache: Arc<MockCache>,
    pub config: ShieldConfig,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: ShieldConfig) -> Self {
        Self {
            ledger: Arc::new(MockLedger::default()),
            registry: Arc::new(MockRegistry::default()),
            scanner: Arc::new(MockScanner::default()),
            cache: Arc::new(MockCache::default()),
            config,
        }
    }

    pub fn shield(&self) -> SafeShield {
        self.shield_with_decoder(Arc::new(LocalDecoder::new()))
    }

    pub fn shield_with_decoder(&self, decoder: Arc<dyn Decoder>) -> SafeShield {
        SafeShield::with_collaborators(
            &self.config,
            decoder,
            self.ledger.clone(),
            self.registry.clone(),
            Arc::new(StaticChainRegistry::new(self.config.chains.clone())),
            self.scanner.clone(),
            self.cache.clone(),
        )
    }
}

pub fn safe_info(address: Address, owners: Vec<Address>, threshold: u64, nonce: u64) -> SafeInfo {
    SafeInfo {
        address,
        nonce,
        threshold,
        owners,
        master_copy: None,
        modules: vec![],
        fallback_handler: None,
        guard: None,
        version: Some("1.4.1".to_string()),
    }
}

pub fn contract_info(address: Address, verified: bool) -> ContractInfo {
    ContractInfo {
        address,
        name: Some("TestContract".to_string()),
        display_name: None,
        verified,
        trusted_for_delegate_call: false,
    }
}

/// Creation of a Safe through the given deployment's factory and singleton
pub fn creation_via(deployment: &ChainAddresses, method: &str) -> CreationTransaction {
    CreationTransaction {
        created: None,
        creator: OWNER_A,
        transaction_hash: B256::repeat_byte(0x11),
        factory_address: Some(deployment.proxy_factory),
        master_copy: Some(deployment.safe_singleton),
        setup_data: None,
        data_decoded: Some(DataDecoded::new(method, vec![])),
    }
}

pub fn erc20_transfer_data(to: Address, amount: u64) -> Bytes {
    IERC20::transferCall {
        to,
        amount: U256::from(amount),
    }
    .abi_encode()
    .into()
}

pub fn multi_send_data(txs: &[DecodedTransaction]) -> Bytes {
    IMultiSend::multiSendCall {
        transactions: encode_multisend_data(txs),
    }
    .abi_encode()
    .into()
}

pub fn native_transfer(to: Address, wei: u64) -> DecodedTransaction {
    DecodedTransaction::new(to, U256::from(wei), Bytes::new())
}

pub fn erc20_transfer(token: Address, to: Address, amount: u64) -> DecodedTransaction {
    DecodedTransaction::new(token, U256::ZERO, erc20_transfer_data(to, amount))
}
