//! Contract counterparty analysis: verification, prior interaction and delegatecall trust

use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::Address;
use futures::stream::{self, StreamExt};

use super::cache::{read_cached, write_cached, CacheKey, CONTRACT_FIELD};
use super::result::{AnalysisResponse, AnalysisResult, GroupedResults};
use super::severity::{ContractInteractionStatus, ContractVerificationStatus, DelegatecallStatus};
use crate::chain::ChainAddresses;
use crate::config::{AnalysisSettings, CacheConfig};
use crate::error::Result;
use crate::services::{CacheStore, ContractInfo, ContractRegistry, LedgerApi};
use crate::types::DecodedTransaction;

/// A contract the transaction calls into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContractCounterparty {
    pub address: Address,
    /// Whether any call to this contract is a delegatecall
    pub delegate_call: bool,
}

/// Unique targets of leaves that carry calldata, in order of first occurrence
pub fn extract_contracts(txs: &[DecodedTransaction]) -> Vec<ContractCounterparty> {
    let mut contracts: Vec<ContractCounterparty> = Vec::new();

    for tx in txs.iter().filter(|tx| !tx.is_empty_data()) {
        let delegate_call = tx.operation.is_delegate_call();
        match contracts.iter_mut().find(|c| c.address == tx.to) {
            Some(existing) => existing.delegate_call |= delegate_call,
            None => contracts.push(ContractCounterparty {
                address: tx.to,
                delegate_call,
            }),
        }
    }

    contracts
}

#[derive(Clone)]
pub struct ContractAnalyzer {
    ledger: Arc<dyn LedgerApi>,
    registry: Arc<dyn ContractRegistry>,
    cache: Arc<dyn CacheStore>,
    settings: AnalysisSettings,
    cache_ttl: Duration,
}

impl ContractAnalyzer {
    pub fn new(
        ledger: Arc<dyn LedgerApi>,
        registry: Arc<dyn ContractRegistry>,
        cache: Arc<dyn CacheStore>,
    ) -> Self {
        Self {
            ledger,
            registry,
            cache,
            settings: AnalysisSettings::default(),
            cache_ttl: CacheConfig::default().ttl(),
        }
    }

    pub fn with_settings(mut self, settings: AnalysisSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Analyzes every contract counterparty of `transactions`
    pub async fn analyze(
        &self,
        chain_id: u64,
        safe: Address,
        transactions: &[DecodedTransaction],
    ) -> AnalysisResponse {
        let contracts = extract_contracts(transactions);
        if contracts.is_empty() {
            return AnalysisResponse::new();
        }

        let key = cache_key(chain_id, safe, &contracts);
        if let Some(cached) = read_cached(self.cache.as_ref(), &key, CONTRACT_FIELD).await {
            return cached;
        }

        tracing::debug!(chain_id, %safe, contracts = contracts.len(), "analyzing contracts");

        let response: AnalysisResponse = stream::iter(contracts)
            .map(|contract| async move {
                (
                    contract.address,
                    self.analyze_contract(chain_id, safe, contract).await,
                )
            })
            .buffered(self.settings.concurrency())
            .collect()
            .await;

        write_cached(self.cache.as_ref(), &key, CONTRACT_FIELD, &response, self.cache_ttl).await;
        response
    }

    /// Runs all contract checks; the registry entry is fetched once and shared
    pub async fn analyze_contract(
        &self,
        chain_id: u64,
        safe: Address,
        contract: ContractCounterparty,
    ) -> GroupedResults {
        let (info, interaction) = tokio::join!(
            self.registry.get_contract(chain_id, contract.address),
            self.analyze_interaction(chain_id, safe, contract.address)
        );

        if let Err(e) = &info {
            tracing::warn!(chain_id, contract = %contract.address, error = %e, "contract registry lookup failed");
        }

        GroupedResults {
            contract_verification: vec![verification(&info)],
            contract_interaction: vec![interaction],
            delegatecall: self.delegatecall(contract, &info).into_iter().collect(),
            ..GroupedResults::default()
        }
    }

    /// `KNOWN_CONTRACT` if the Safe executed a transaction against `contract` before
    pub async fn analyze_interaction(
        &self,
        chain_id: u64,
        safe: Address,
        contract: Address,
    ) -> AnalysisResult<ContractInteractionStatus> {
        match self
            .ledger
            .get_multisig_transactions(chain_id, safe, contract, 1)
            .await
        {
            Ok(page) => match page.count {
                Some(count) if count > 0 => AnalysisResult::new(
                    ContractInteractionStatus::KnownContract,
                    format!("This Safe has executed {count} transaction(s) with this contract."),
                ),
                _ => AnalysisResult::new(
                    ContractInteractionStatus::NewContract,
                    "This Safe has never executed a transaction with this contract.",
                ),
            },
            Err(e) => {
                tracing::warn!(chain_id, %safe, %contract, error = %e, "contract history lookup failed");
                AnalysisResult::failed(e)
            }
        }
    }

    fn delegatecall(
        &self,
        contract: ContractCounterparty,
        info: &Result<Option<ContractInfo>>,
    ) -> Option<AnalysisResult<DelegatecallStatus>> {
        if !contract.delegate_call || self.is_trusted_library(contract.address) {
            return None;
        }

        match info {
            Ok(Some(info)) if info.trusted_for_delegate_call => None,
            Ok(_) => Some(AnalysisResult::new(
                DelegatecallStatus::UnexpectedDelegatecall,
                "This transaction delegatecalls a contract that is not trusted for delegatecall. It can take full control of the Safe.",
            )),
            Err(e) => Some(AnalysisResult::failed(e)),
        }
    }

    fn is_trusted_library(&self, address: Address) -> bool {
        self.settings.trusted_delegate_call_targets.contains(&address)
            || ChainAddresses::known_deployments()
                .iter()
                .any(|deployment| deployment.delegate_call_libraries().contains(&address))
    }
}

fn verification(info: &Result<Option<ContractInfo>>) -> AnalysisResult<ContractVerificationStatus> {
    match info {
        Ok(Some(info)) if info.verified => {
            let description = match info.label() {
                Some(name) => format!("This contract ({name}) has verified source code."),
                None => "This contract has verified source code.".to_string(),
            };
            AnalysisResult::new(ContractVerificationStatus::Verified, description)
        }
        Ok(Some(_)) => AnalysisResult::new(
            ContractVerificationStatus::NotVerified,
            "This contract's source code is not verified.",
        ),
        Ok(None) => AnalysisResult::new(
            ContractVerificationStatus::VerificationUnavailable,
            "Verification status for this contract is not available.",
        ),
        Err(e) => AnalysisResult::failed(e),
    }
}

/// Delegate flags are part of the key: the same contracts called with a
/// different operation produce different findings
fn cache_key(chain_id: u64, safe: Address, contracts: &[ContractCounterparty]) -> CacheKey {
    let addresses: Vec<Address> = contracts.iter().map(|c| c.address).collect();

    let mut delegated: Vec<Address> = contracts
        .iter()
        .filter(|c| c.delegate_call)
        .map(|c| c.address)
        .collect();
    delegated.sort_unstable();

    let material: Vec<u8> = delegated
        .iter()
        .flat_map(|address| address.as_slice().iter().copied())
        .collect();
    CacheKey::with_material(chain_id, safe, &addresses, &material)
}
