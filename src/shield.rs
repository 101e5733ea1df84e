//! The analysis facade

use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};

use crate::analysis::{
    flatten, ContractAnalyzer, CounterpartyAnalysis, RecipientAnalyzer, ThreatAnalysisResponse,
    ThreatAnalyzer, ThreatRequest,
};
use crate::chain::StaticChainRegistry;
use crate::config::ShieldConfig;
use crate::decoder::LocalDecoder;
use crate::error::Result;
use crate::services::{
    BlockaidClient, CacheStore, ChainRegistry, ContractRegistry, Decoder, LedgerApi,
    MokaCacheStore, ThreatScanner, TransactionServiceClient,
};
use crate::types::{DecodedTransaction, Operation, TxInfo};

/// Request timeout for transaction service lookups
const LEDGER_TIMEOUT: Duration = Duration::from_secs(10);

/// A transaction proposed for a Safe, before decoding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    pub chain_id: u64,
    pub safe: Address,
    pub to: Address,
    #[serde(default)]
    pub value: U256,
    #[serde(default)]
    pub data: Bytes,
    #[serde(default)]
    pub operation: Operation,
    #[serde(default)]
    pub tx_info: Option<TxInfo>,
}

impl TransactionRequest {
    pub fn new(chain_id: u64, safe: Address, to: Address, data: impl Into<Bytes>) -> Self {
        Self {
            chain_id,
            safe,
            to,
            value: U256::ZERO,
            data: data.into(),
            operation: Operation::Call,
            tx_info: None,
        }
    }

    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    pub fn with_operation(mut self, operation: Operation) -> Self {
        self.operation = operation;
        self
    }

    pub fn with_tx_info(mut self, tx_info: TxInfo) -> Self {
        self.tx_info = Some(tx_info);
        self
    }
}

/// Counterparty findings and threat scan for the same transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombinedAnalysis {
    pub counterparties: CounterpartyAnalysis,
    pub threat: ThreatAnalysisResponse,
}

/// Decodes, flattens and analyzes Safe transactions
#[derive(Clone)]
pub struct SafeShield {
    decoder: Arc<dyn Decoder>,
    recipients: RecipientAnalyzer,
    contracts: ContractAnalyzer,
    threats: ThreatAnalyzer,
}

impl SafeShield {
    pub fn new(
        decoder: Arc<dyn Decoder>,
        recipients: RecipientAnalyzer,
        contracts: ContractAnalyzer,
        threats: ThreatAnalyzer,
    ) -> Self {
        Self {
            decoder,
            recipients,
            contracts,
            threats,
        }
    }

    /// Wires analyzers to the given collaborators with shared settings
    pub fn with_collaborators(
        config: &ShieldConfig,
        decoder: Arc<dyn Decoder>,
        ledger: Arc<dyn LedgerApi>,
        registry: Arc<dyn ContractRegistry>,
        chains: Arc<dyn ChainRegistry>,
        scanner: Arc<dyn ThreatScanner>,
        cache: Arc<dyn CacheStore>,
    ) -> Self {
        let ttl = config.cache.ttl();

        let recipients = RecipientAnalyzer::new(ledger.clone(), chains, cache.clone())
            .with_settings(config.analysis.clone())
            .with_cache_ttl(ttl);
        let contracts = ContractAnalyzer::new(ledger, registry, cache)
            .with_settings(config.analysis.clone())
            .with_cache_ttl(ttl);

        Self::new(decoder, recipients, contracts, ThreatAnalyzer::new(scanner))
    }

    /// Wires the HTTP collaborators, the local decoder and an in-memory cache
    pub fn from_config(config: &ShieldConfig) -> Result<Self> {
        let chains = StaticChainRegistry::new(config.chains.clone());
        let service = Arc::new(TransactionServiceClient::new(chains.clone(), LEDGER_TIMEOUT)?);
        let scanner = Arc::new(BlockaidClient::new(config.blockaid.clone(), chains.clone())?);

        Ok(Self::with_collaborators(
            config,
            Arc::new(LocalDecoder::new()),
            service.clone(),
            service,
            Arc::new(chains),
            scanner,
            MokaCacheStore::shared(&config.cache),
        ))
    }

    /// Decodes `request` and analyzes its counterparties.
    ///
    /// A decoder failure is logged and the transaction is analyzed undecoded.
    pub async fn analyze_transaction(
        &self,
        request: &TransactionRequest,
    ) -> Result<CounterpartyAnalysis> {
        let data_decoded = match self
            .decoder
            .decode(request.chain_id, request.to, &request.data)
            .await
        {
            Ok(decoded) => decoded,
            Err(e) => {
                tracing::warn!(chain_id = request.chain_id, to = %request.to, error = %e, "decoding failed, analyzing raw calldata");
                None
            }
        };

        let tx = DecodedTransaction::new(request.to, request.value, request.data.clone())
            .with_operation(request.operation)
            .with_data_decoded(data_decoded);

        self.analyze_decoded(request.chain_id, request.safe, &tx, request.tx_info.as_ref())
            .await
    }

    /// Flattens an already decoded transaction and runs recipient and
    /// contract analysis on its leaves concurrently
    pub async fn analyze_decoded(
        &self,
        chain_id: u64,
        safe: Address,
        tx: &DecodedTransaction,
        tx_info: Option<&TxInfo>,
    ) -> Result<CounterpartyAnalysis> {
        let leaves = flatten(tx)?;
        tracing::debug!(chain_id, %safe, leaves = leaves.len(), "flattened transaction");

        let (recipient, contract) = tokio::join!(
            self.recipients.analyze(chain_id, safe, &leaves, tx_info),
            self.contracts.analyze(chain_id, safe, &leaves)
        );

        Ok(CounterpartyAnalysis {
            recipient,
            contract,
        })
    }

    /// Runs the threat scan for `request`
    pub async fn analyze_threat(
        &self,
        chain_id: u64,
        safe: Address,
        request: &ThreatRequest,
    ) -> ThreatAnalysisResponse {
        self.threats.analyze(chain_id, safe, request).await
    }

    /// Runs counterparty analysis and the threat scan concurrently
    pub async fn analyze_all(
        &self,
        request: &TransactionRequest,
        threat: &ThreatRequest,
    ) -> Result<CombinedAnalysis> {
        let (counterparties, threat) = tokio::join!(
            self.analyze_transaction(request),
            self.analyze_threat(request.chain_id, request.safe, threat)
        );

        Ok(CombinedAnalysis {
            counterparties: counterparties?,
            threat,
        })
    }
}
