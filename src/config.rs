//! Layered configuration: defaults, optional files, then `SAFE_SHIELD__*` env vars

use std::path::Path;
use std::time::Duration;

use alloy::primitives::Address;
use config::{Config, Environment, File};
use serde::Deserialize;
use url::Url;

use crate::chain::{chain_ids, ChainInfo};
use crate::error::Result;

#[derive(Debug, Deserialize, Clone)]
pub struct ShieldConfig {
    pub cache: CacheConfig,
    pub analysis: AnalysisSettings,
    pub blockaid: BlockaidConfig,
    #[serde(default)]
    pub chains: Vec<ChainInfo>,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    pub ttl_seconds: u64,
    pub max_capacity: u64,
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: 600,
            max_capacity: 10_000,
        }
    }
}

/// Tuning knobs shared by the analyzers
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct AnalysisSettings {
    /// Upper bound on concurrent per-subject lookups inside one analysis
    pub max_concurrency: usize,
    /// Recipient Safes with a nonce below this are flagged as low activity
    pub low_activity_threshold: u64,
    /// Extra delegatecall targets trusted on top of the canonical Safe libraries
    #[serde(default)]
    pub trusted_delegate_call_targets: Vec<Address>,
}

impl AnalysisSettings {
    pub fn concurrency(&self) -> usize {
        self.max_concurrency.max(1)
    }
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            max_concurrency: 5,
            low_activity_threshold: 5,
            trusted_delegate_call_targets: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct BlockaidConfig {
    pub base_url: Url,
    #[serde(default)]
    pub api_key: Option<String>,
    pub timeout_ms: u64,
}

impl BlockaidConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl ShieldConfig {
    /// Loads `config/default`, `config/local` and the environment
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Like [`ShieldConfig::load`], with an explicit file layered over the
    /// optional ones and below the environment
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        Self::load_with(path, environment())
    }

    fn load_with(path: Option<&Path>, env: Environment) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("cache.ttl_seconds", 600)?
            .set_default("cache.max_capacity", 10_000)?
            .set_default("analysis.max_concurrency", 5)?
            .set_default("analysis.low_activity_threshold", 5)?
            .set_default("blockaid.base_url", "https://api.blockaid.io")?
            .set_default("blockaid.timeout_ms", 10_000)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false));

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }

        let config = builder.add_source(env).build()?;

        let mut shield: ShieldConfig = config.try_deserialize()?;
        if shield.chains.is_empty() {
            shield.chains = default_chains();
        }
        Ok(shield)
    }
}

// SAFE_SHIELD__BLOCKAID__API_KEY, SAFE_SHIELD__CACHE__TTL_SECONDS, ...
// List values are comma separated.
fn environment() -> Environment {
    Environment::with_prefix("SAFE_SHIELD")
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("analysis.trusted_delegate_call_targets")
}

/// Safe-hosted transaction services for the most common chains
pub fn default_chains() -> Vec<ChainInfo> {
    [
        (chain_ids::MAINNET, "Ethereum", "mainnet", "ethereum"),
        (chain_ids::GNOSIS, "Gnosis Chain", "gnosis-chain", "gnosis"),
        (chain_ids::POLYGON, "Polygon", "polygon", "polygon"),
        (chain_ids::ARBITRUM, "Arbitrum", "arbitrum", "arbitrum"),
        (chain_ids::OPTIMISM, "Optimism", "optimism", "optimism"),
        (chain_ids::BASE, "Base", "base", "base"),
        (chain_ids::SEPOLIA, "Sepolia", "sepolia", "ethereum-sepolia"),
    ]
    .into_iter()
    .filter_map(|(chain_id, name, service, scanner)| {
        let url = Url::parse(&format!("https://safe-transaction-{service}.safe.global")).ok()?;
        let mut info = ChainInfo::new(chain_id, name, url);
        info.blockaid_chain = Some(scanner.to_string());
        Some(info)
    })
    .collect()
}
