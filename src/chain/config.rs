//! Canonical Safe deployments and per-chain configuration

use alloy::primitives::{address, Address};
use serde::{Deserialize, Serialize};
use url::Url;

/// Canonical Safe contract addresses for one release
///
/// These addresses are the same across all supported chains (CREATE2 deployment)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainAddresses {
    /// Safe singleton address
    pub safe_singleton: Address,
    /// SafeL2 singleton address (emits events for indexing on L2s)
    pub safe_l2_singleton: Address,
    /// MultiSend contract address
    pub multi_send: Address,
    /// MultiSendCallOnly contract address
    pub multi_send_call_only: Address,
    /// Safe proxy factory address
    pub proxy_factory: Address,
    /// SignMessageLib address
    pub sign_message_lib: Address,
}

impl Default for ChainAddresses {
    fn default() -> Self {
        Self::v1_4_1()
    }
}

impl ChainAddresses {
    /// Returns the canonical Safe v1.4.1 addresses
    pub fn v1_4_1() -> Self {
        Self {
            safe_singleton: address!("41675C099F32341bf84BFc5382aF534df5C7461a"),
            safe_l2_singleton: address!("29fcB43b46531BcA003ddC8FCB67FFE91900C762"),
            multi_send: address!("38869bf66a61cF6bDB996A6aE40D5853Fd43B526"),
            multi_send_call_only: address!("9641d764fc13c8B624c04430C7356C1C7C8102e2"),
            proxy_factory: address!("4e1DCf7AD4e460CfD30791CCC4F9c8a4f820ec67"),
            sign_message_lib: address!("d53cd0aB83D845Ac265BE939c57F53AD838012c9"),
        }
    }

    /// Returns the canonical Safe v1.3.0 addresses
    pub fn v1_3_0() -> Self {
        Self {
            safe_singleton: address!("d9Db270c1B5E3Bd161E8c8503c55cEABeE709552"),
            safe_l2_singleton: address!("3E5c63644E683549055b9Be8653de26E0B4CD36E"),
            multi_send: address!("A238CBeb142c10Ef7Ad8442C6D1f9E89e07e7761"),
            multi_send_call_only: address!("40A2aCCbd92BCA938b02010E17A5b8929b49130D"),
            proxy_factory: address!("a6B71E26C5e0845f74c812102Ca7114b6a896AB2"),
            sign_message_lib: address!("A65387F16B013cf2Af4605Ad8aA5ec25a2cbA3a2"),
        }
    }

    /// Returns the Safe v1.3.0 addresses deployed with the EIP-155 deployer
    pub fn v1_3_0_eip155() -> Self {
        Self {
            safe_singleton: address!("69f4D1788e39c87893C980c06EdF4b7f686e2938"),
            safe_l2_singleton: address!("fb1bffC9d739B8D520DaF37dF666da4C687191EA"),
            multi_send: address!("998739BFdAAdde7C933B942a68053933098f9EDa"),
            multi_send_call_only: address!("A1dabEF33b3B82c7814B6D82A79e50F4AC44102B"),
            proxy_factory: address!("C22834581EbC8527d974F8a1c97E1bEA4EF910BC"),
            sign_message_lib: address!("98FFBBF51bb33A056B08ddf711f289936AafF717"),
        }
    }

    /// Every release whose deployment can be replayed on another chain
    pub fn known_deployments() -> [Self; 3] {
        [Self::v1_4_1(), Self::v1_3_0(), Self::v1_3_0_eip155()]
    }

    /// True if `singleton` is this release's L1 or L2 singleton
    pub fn is_singleton(&self, singleton: Address) -> bool {
        singleton == self.safe_singleton || singleton == self.safe_l2_singleton
    }

    /// Libraries the Safe is expected to delegatecall into
    pub fn delegate_call_libraries(&self) -> [Address; 3] {
        [self.multi_send, self.multi_send_call_only, self.sign_message_lib]
    }
}

/// Static description of a chain the analysis can reach
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainInfo {
    /// Chain ID
    pub chain_id: u64,
    /// Human readable name
    pub name: String,
    /// Base URL of the chain's Safe Transaction Service
    pub transaction_service_url: Url,
    /// Chain slug understood by the threat scanner (falls back to the chain ID)
    #[serde(default)]
    pub blockaid_chain: Option<String>,
}

impl ChainInfo {
    pub fn new(chain_id: u64, name: impl Into<String>, transaction_service_url: Url) -> Self {
        Self {
            chain_id,
            name: name.into(),
            transaction_service_url,
            blockaid_chain: None,
        }
    }

    /// Chain identifier sent to the threat scanner
    pub fn scanner_chain(&self) -> String {
        self.blockaid_chain
            .clone()
            .unwrap_or_else(|| self.chain_id.to_string())
    }
}

/// Well-known chain IDs
pub mod chain_ids {
    pub const MAINNET: u64 = 1;
    pub const SEPOLIA: u64 = 11155111;
    pub const ARBITRUM: u64 = 42161;
    pub const OPTIMISM: u64 = 10;
    pub const BASE: u64 = 8453;
    pub const POLYGON: u64 = 137;
    pub const GNOSIS: u64 = 100;
}
