//! Chain registry backed by configuration

use std::collections::BTreeMap;

use async_trait::async_trait;

use super::ChainInfo;
use crate::error::{Error, Result};
use crate::services::ChainRegistry;

/// [`ChainRegistry`] over a fixed set of chains
#[derive(Debug, Clone, Default)]
pub struct StaticChainRegistry {
    chains: BTreeMap<u64, ChainInfo>,
}

impl StaticChainRegistry {
    pub fn new(chains: impl IntoIterator<Item = ChainInfo>) -> Self {
        Self {
            chains: chains.into_iter().map(|c| (c.chain_id, c)).collect(),
        }
    }

    pub fn chain(&self, chain_id: u64) -> Option<&ChainInfo> {
        self.chains.get(&chain_id)
    }
}

#[async_trait]
impl ChainRegistry for StaticChainRegistry {
    async fn is_supported_chain(&self, chain_id: u64) -> Result<bool> {
        Ok(self.chains.contains_key(&chain_id))
    }

    async fn get_chain(&self, chain_id: u64) -> Result<ChainInfo> {
        self.chain(chain_id)
            .cloned()
            .ok_or(Error::UnsupportedChain(chain_id))
    }
}
