//! Threat analysis through the external scanner

use std::sync::Arc;

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::result::{
    sort_by_severity, AnalysisResult, AssetDiff, BalanceChange, ThreatAnalysisResponse,
};
use super::severity::ThreatStatus;
use crate::encoding::{compute_safe_transaction_hash, safe_tx_typed_data, SafeTxParams};
use crate::services::{
    AssetDiffEntry, ContractManagementChange, ManagementKind, ResultType, ScanDiff, ScanResponse,
    ScanStatus, Simulation, ThreatScanner, Validation,
};

/// What the signer is about to approve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ThreatRequest {
    /// A Safe transaction, scanned as its SafeTx typed data
    Transaction {
        wallet: Address,
        params: SafeTxParams,
        #[serde(default)]
        origin: Option<String>,
    },
    /// An arbitrary EIP-712 message
    TypedData {
        wallet: Address,
        data: Value,
        #[serde(default)]
        origin: Option<String>,
    },
}

impl ThreatRequest {
    pub fn wallet(&self) -> Address {
        match self {
            ThreatRequest::Transaction { wallet, .. } | ThreatRequest::TypedData { wallet, .. } => {
                *wallet
            }
        }
    }

    pub fn origin(&self) -> Option<&str> {
        match self {
            ThreatRequest::Transaction { origin, .. } | ThreatRequest::TypedData { origin, .. } => {
                origin.as_deref()
            }
        }
    }
}

#[derive(Clone)]
pub struct ThreatAnalyzer {
    scanner: Arc<dyn ThreatScanner>,
}

impl ThreatAnalyzer {
    pub fn new(scanner: Arc<dyn ThreatScanner>) -> Self {
        Self { scanner }
    }

    /// Scans `request` and maps the verdict and simulated effects on `safe`
    /// into findings. Scanner failures become a single `FAILED` finding.
    pub async fn analyze(
        &self,
        chain_id: u64,
        safe: Address,
        request: &ThreatRequest,
    ) -> ThreatAnalysisResponse {
        let message = match request {
            ThreatRequest::Transaction { params, .. } => {
                let safe_tx_hash = compute_safe_transaction_hash(chain_id, safe, params);
                tracing::info!(chain_id, %safe, %safe_tx_hash, "scanning Safe transaction");
                safe_tx_typed_data(chain_id, safe, params)
            }
            ThreatRequest::TypedData { data, .. } => {
                tracing::info!(chain_id, %safe, "scanning typed data");
                data.clone()
            }
        };

        match self
            .scanner
            .scan(chain_id, safe, request.wallet(), &message, request.origin())
            .await
        {
            Ok(response) => map_scan_response(safe, response),
            Err(e) => {
                tracing::warn!(chain_id, %safe, error = %e, "threat scan failed");
                ThreatAnalysisResponse::failed(e)
            }
        }
    }
}

/// Maps a scanner response into threat findings and balance changes for `safe`
pub fn map_scan_response(safe: Address, response: ScanResponse) -> ThreatAnalysisResponse {
    let mut threat = Vec::new();
    let mut balance_change = Vec::new();

    if let Some(validation) = response.validation {
        threat.push(validation_finding(validation));
    }

    if let Some(simulation) = response.simulation {
        apply_simulation(safe, simulation, &mut threat, &mut balance_change);
    }

    sort_by_severity(&mut threat);

    ThreatAnalysisResponse {
        threat,
        balance_change,
        request_id: response.request_id,
    }
}

fn validation_finding(validation: Validation) -> AnalysisResult<ThreatStatus> {
    let status = match (validation.status, validation.result_type) {
        (ScanStatus::Error, _) | (_, ResultType::Error) => {
            let reason = validation
                .error
                .or(validation.description)
                .unwrap_or_else(|| "validation error".to_string());
            return AnalysisResult::failed(reason);
        }
        (_, ResultType::Benign) => ThreatStatus::NoThreat,
        (_, ResultType::Warning) => ThreatStatus::Moderate,
        (_, ResultType::Malicious) => ThreatStatus::Malicious,
        (_, ResultType::Unknown) => {
            return AnalysisResult::failed("scanner returned an unrecognized verdict");
        }
    };

    let description = validation
        .description
        .or(validation.reason)
        .unwrap_or_else(|| default_description(status).to_string());
    AnalysisResult::new(status, description)
}

fn default_description(status: ThreatStatus) -> &'static str {
    match status {
        ThreatStatus::NoThreat => "Threat analysis found no issues.",
        ThreatStatus::Moderate => "This transaction shows signs of a potential threat. Review it carefully.",
        ThreatStatus::Malicious => "This transaction is flagged as malicious. Do not sign it.",
        _ => "",
    }
}

fn apply_simulation(
    safe: Address,
    mut simulation: Simulation,
    threat: &mut Vec<AnalysisResult<ThreatStatus>>,
    balance_change: &mut Vec<BalanceChange>,
) {
    if simulation.status == ScanStatus::Error {
        let reason = simulation
            .error
            .unwrap_or_else(|| "simulation error".to_string());
        threat.push(AnalysisResult::failed(reason));
        return;
    }

    if let Some(changes) = simulation.contract_management.remove(&safe) {
        threat.extend(changes.iter().filter_map(management_finding));
    }

    if let Some(diffs) = simulation.assets_diffs.remove(&safe) {
        balance_change.extend(diffs.into_iter().map(balance_change_of));
    }
}

fn management_finding(change: &ContractManagementChange) -> Option<AnalysisResult<ThreatStatus>> {
    match change.kind {
        ManagementKind::ProxyUpgrade => {
            let (before, after) = change.proxy_addresses();
            Some(
                AnalysisResult::new(
                    ThreatStatus::MastercopyChange,
                    "This transaction changes the Safe's mastercopy (implementation contract).",
                )
                .with_mastercopy_change(before, after),
            )
        }
        ManagementKind::OwnershipChange => Some(AnalysisResult::new(
            ThreatStatus::OwnershipChange,
            "This transaction changes the Safe's owners or threshold.",
        )),
        ManagementKind::ModulesChange => Some(AnalysisResult::new(
            ThreatStatus::ModuleChange,
            "This transaction changes the Safe's enabled modules.",
        )),
        ManagementKind::Other => None,
    }
}

fn balance_change_of(entry: AssetDiffEntry) -> BalanceChange {
    let nft = entry.asset.asset_type.is_nft();
    let convert = |diffs: Vec<ScanDiff>| -> Vec<AssetDiff> {
        diffs.iter().filter_map(|diff| asset_diff(diff, nft)).collect()
    };

    BalanceChange {
        incoming: convert(entry.incoming),
        outgoing: convert(entry.outgoing),
        asset: entry.asset,
    }
}

fn asset_diff(diff: &ScanDiff, nft: bool) -> Option<AssetDiff> {
    if nft {
        let token_id = diff.token_id.as_ref().and_then(json_scalar)?;
        Some(AssetDiff::Nft { token_id })
    } else {
        let value = diff
            .value
            .as_ref()
            .and_then(json_scalar)
            .or_else(|| diff.raw_value.clone())?;
        Some(AssetDiff::Fungible { value })
    }
}

/// Scanners send numbers either as strings or as JSON numbers
fn json_scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
