//! Blockaid JSON-RPC scan client

use alloy::primitives::Address;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use super::{ScanResponse, ThreatScanner};
use crate::chain::StaticChainRegistry;
use crate::config::BlockaidConfig;
use crate::error::{Error, Result};

const SCAN_PATH: &str = "v0/evm/json-rpc/scan";
const SIGN_TYPED_DATA: &str = "eth_signTypedData_v4";

/// [`ThreatScanner`] backed by Blockaid's `json-rpc/scan` endpoint
#[derive(Debug, Clone)]
pub struct BlockaidClient {
    http: reqwest::Client,
    config: BlockaidConfig,
    chains: StaticChainRegistry,
}

#[derive(Debug, Serialize)]
struct ScanRequest<'a> {
    chain: String,
    account_address: Address,
    metadata: Value,
    data: RpcRequest<'a>,
    options: [&'static str; 2],
}

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    method: &'a str,
    params: (Address, String),
}

impl BlockaidClient {
    pub fn new(config: BlockaidConfig, chains: StaticChainRegistry) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| Error::Http {
                what: "blockaid",
                reason: e.to_string(),
            })?;

        Ok(Self {
            http,
            config,
            chains,
        })
    }

    fn request_body(
        &self,
        chain_id: u64,
        wallet: Address,
        message: &Value,
        origin: Option<&str>,
    ) -> Result<ScanRequest<'static>> {
        let chain = self
            .chains
            .chain(chain_id)
            .ok_or(Error::UnsupportedChain(chain_id))?;

        let metadata = match origin {
            Some(domain) => serde_json::json!({ "domain": domain }),
            None => serde_json::json!({ "non_dapp": true }),
        };

        Ok(ScanRequest {
            chain: chain.scanner_chain(),
            account_address: wallet,
            metadata,
            data: RpcRequest {
                method: SIGN_TYPED_DATA,
                params: (wallet, serde_json::to_string(message)?),
            },
            options: ["validation", "simulation"],
        })
    }
}

#[async_trait]
impl ThreatScanner for BlockaidClient {
    async fn scan(
        &self,
        chain_id: u64,
        safe: Address,
        wallet: Address,
        message: &Value,
        origin: Option<&str>,
    ) -> Result<ScanResponse> {
        let body = self.request_body(chain_id, wallet, message, origin)?;
        let url = self.config.base_url.join(SCAN_PATH)?;

        tracing::debug!(chain_id, %safe, %wallet, "submitting threat scan");

        let mut request = self.http.post(url).json(&body);
        if let Some(api_key) = &self.config.api_key {
            request = request.header("X-API-KEY", api_key);
        }

        let response = request.send().await.map_err(|e| Error::Http {
            what: "blockaid",
            reason: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::UnexpectedStatus {
                what: "blockaid",
                status: status.as_u16(),
            });
        }

        response
            .json::<ScanResponse>()
            .await
            .map_err(|e| Error::Scanner(e.to_string()))
    }
}
