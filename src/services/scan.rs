//! Response model of the external threat scanner
//!
//! Fields the analysis does not read are kept loose (`serde_json::Value`) and
//! unknown enum variants deserialize into catch-alls, so a scanner adding new
//! categories does not break parsing.

use std::collections::BTreeMap;

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanResponse {
    #[serde(default)]
    pub validation: Option<Validation>,
    #[serde(default)]
    pub simulation: Option<Simulation>,
    #[serde(default)]
    pub request_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanStatus {
    Success,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResultType {
    Benign,
    Warning,
    Malicious,
    Error,
    #[serde(other)]
    Unknown,
}

/// The scanner's verdict on the request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Validation {
    pub status: ScanStatus,
    #[serde(default = "unknown_result")]
    pub result_type: ResultType,
    #[serde(default)]
    pub classification: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub features: Vec<Feature>,
    #[serde(default)]
    pub error: Option<String>,
}

fn unknown_result() -> ResultType {
    ResultType::Unknown
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type", default)]
    pub feature_type: Option<String>,
    #[serde(default)]
    pub feature_id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub address: Option<Address>,
}

/// Simulated effects of the request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Simulation {
    pub status: ScanStatus,
    #[serde(default)]
    pub assets_diffs: BTreeMap<Address, Vec<AssetDiffEntry>>,
    #[serde(default)]
    pub contract_management: BTreeMap<Address, Vec<ContractManagementChange>>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AssetType {
    Native,
    Erc20,
    Erc721,
    Erc1155,
    #[serde(other)]
    Unknown,
}

impl AssetType {
    pub fn is_nft(&self) -> bool {
        matches!(self, AssetType::Erc721 | AssetType::Erc1155)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanAsset {
    #[serde(rename = "type")]
    pub asset_type: AssetType,
    #[serde(default)]
    pub address: Option<Address>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub decimals: Option<u8>,
    #[serde(default)]
    pub logo_url: Option<String>,
}

/// Per-asset movement for one account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetDiffEntry {
    pub asset: ScanAsset,
    #[serde(rename = "in", default)]
    pub incoming: Vec<ScanDiff>,
    #[serde(rename = "out", default)]
    pub outgoing: Vec<ScanDiff>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanDiff {
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default)]
    pub raw_value: Option<String>,
    #[serde(default)]
    pub token_id: Option<Value>,
    #[serde(default)]
    pub usd_price: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ManagementKind {
    ProxyUpgrade,
    OwnershipChange,
    ModulesChange,
    #[serde(other)]
    Other,
}

/// A change to the account's own contract configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractManagementChange {
    #[serde(rename = "type")]
    pub kind: ManagementKind,
    #[serde(default)]
    pub before: Value,
    #[serde(default)]
    pub after: Value,
}

impl ContractManagementChange {
    /// Implementation address on each side of a proxy upgrade
    pub fn proxy_addresses(&self) -> (Option<Address>, Option<Address>) {
        (address_field(&self.before), address_field(&self.after))
    }
}

fn address_field(value: &Value) -> Option<Address> {
    value
        .get("address")
        .and_then(Value::as_str)
        .and_then(|s| s.parse().ok())
}
