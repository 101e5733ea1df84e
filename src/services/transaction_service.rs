//! Safe Transaction Service client
//!
//! Implements [`LedgerApi`] and [`ContractRegistry`] over the service's REST
//! API. Each chain has its own service instance, resolved through the chain
//! registry.

use std::time::Duration;

use alloy::primitives::Address;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use super::{
    ContractInfo, ContractRegistry, CreationTransaction, LedgerApi, MultisigTransaction, Page,
    SafeInfo, Transfer,
};
use crate::chain::StaticChainRegistry;
use crate::error::{Error, Result};

/// HTTP client for the Safe Transaction Service
#[derive(Debug, Clone)]
pub struct TransactionServiceClient {
    http: reqwest::Client,
    chains: StaticChainRegistry,
}

/// Shape of `GET /api/v1/contracts/{address}/`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContractResponse {
    address: Address,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    contract_abi: Option<Value>,
    #[serde(default)]
    trusted_for_delegate_call: bool,
}

impl From<ContractResponse> for ContractInfo {
    fn from(response: ContractResponse) -> Self {
        Self {
            address: response.address,
            name: response.name,
            display_name: response.display_name,
            verified: response.contract_abi.is_some_and(|abi| !abi.is_null()),
            trusted_for_delegate_call: response.trusted_for_delegate_call,
        }
    }
}

impl TransactionServiceClient {
    pub fn new(chains: StaticChainRegistry, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Http {
                what: "transaction service",
                reason: e.to_string(),
            })?;

        Ok(Self { http, chains })
    }

    fn endpoint(&self, chain_id: u64, path: &str) -> Result<Url> {
        let chain = self
            .chains
            .chain(chain_id)
            .ok_or(Error::UnsupportedChain(chain_id))?;
        Ok(chain.transaction_service_url.join(path)?)
    }

    async fn fetch(&self, what: &'static str, url: Url) -> Result<reqwest::Response> {
        tracing::debug!(%url, what, "transaction service request");
        self.http.get(url).send().await.map_err(|e| Error::Http {
            what,
            reason: e.to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, what: &'static str, url: Url) -> Result<T> {
        let response = self.fetch(what, url).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::UnexpectedStatus {
                what,
                status: status.as_u16(),
            });
        }
        response.json::<T>().await.map_err(|e| Error::Fetch {
            what,
            reason: e.to_string(),
        })
    }

    /// Like `get_json`, mapping `404` to `None`
    async fn get_optional<T: DeserializeOwned>(&self, what: &'static str, url: Url) -> Result<Option<T>> {
        let response = self.fetch(what, url).await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                response.json::<T>().await.map(Some).map_err(|e| Error::Fetch {
                    what,
                    reason: e.to_string(),
                })
            }
            status => Err(Error::UnexpectedStatus {
                what,
                status: status.as_u16(),
            }),
        }
    }
}

#[async_trait]
impl LedgerApi for TransactionServiceClient {
    async fn get_transfers(
        &self,
        chain_id: u64,
        safe: Address,
        to: Address,
        limit: u32,
    ) -> Result<Page<Transfer>> {
        let mut url = self.endpoint(chain_id, &format!("api/v1/safes/{safe}/transfers/"))?;
        url.query_pairs_mut()
            .append_pair("to", &to.to_string())
            .append_pair("limit", &limit.to_string());
        self.get_json("transfers", url).await
    }

    async fn get_multisig_transactions(
        &self,
        chain_id: u64,
        safe: Address,
        to: Address,
        limit: u32,
    ) -> Result<Page<MultisigTransaction>> {
        let mut url = self.endpoint(
            chain_id,
            &format!("api/v1/safes/{safe}/multisig-transactions/"),
        )?;
        url.query_pairs_mut()
            .append_pair("to", &to.to_string())
            .append_pair("executed", "true")
            .append_pair("limit", &limit.to_string());
        self.get_json("multisig transactions", url).await
    }

    async fn get_safe(&self, chain_id: u64, address: Address) -> Result<Option<SafeInfo>> {
        let url = self.endpoint(chain_id, &format!("api/v1/safes/{address}/"))?;
        self.get_optional("safe", url).await
    }

    async fn get_creation_transaction(
        &self,
        chain_id: u64,
        safe: Address,
    ) -> Result<CreationTransaction> {
        let url = self.endpoint(chain_id, &format!("api/v1/safes/{safe}/creation/"))?;
        self.get_json("creation transaction", url).await
    }
}

#[async_trait]
impl ContractRegistry for TransactionServiceClient {
    async fn get_contract(&self, chain_id: u64, address: Address) -> Result<Option<ContractInfo>> {
        let url = self.endpoint(chain_id, &format!("api/v1/contracts/{address}/"))?;
        let contract: Option<ContractResponse> = self.get_optional("contract", url).await?;
        Ok(contract.map(ContractInfo::from))
    }
}
