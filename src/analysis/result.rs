//! Findings and the response shapes they are grouped into

use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::fmt::Display;

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

use super::severity::{
    BridgeStatus, ContractInteractionStatus, ContractVerificationStatus, DelegatecallStatus,
    RecipientActivityStatus, RecipientInteractionStatus, Severity, Status, StatusGroup,
    ThreatStatus,
};
use crate::services::ScanAsset;

/// A single finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult<S> {
    pub severity: Severity,
    #[serde(rename = "type")]
    pub status: S,
    pub title: String,
    pub description: String,
    /// Destination chain of a bridge finding
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_chain_id: Option<u64>,
    /// Mastercopy before a proxy upgrade
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<Address>,
    /// Mastercopy after a proxy upgrade
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<S: Status> AnalysisResult<S> {
    /// Creates a finding whose severity and title follow from `status`
    pub fn new(status: S, description: impl Into<String>) -> Self {
        Self {
            severity: status.severity(),
            status,
            title: status.title().to_string(),
            description: description.into(),
            target_chain_id: None,
            before: None,
            after: None,
            error: None,
        }
    }

    /// Creates the group's `FAILED` finding for a check that could not complete
    pub fn failed(error: impl Display) -> Self {
        Self::new(
            S::FAILED,
            format!("The {} check could not be completed.", S::GROUP),
        )
        .with_error(error)
    }

    pub fn with_target_chain(mut self, chain_id: u64) -> Self {
        self.target_chain_id = Some(chain_id);
        self
    }

    pub fn with_mastercopy_change(mut self, before: Option<Address>, after: Option<Address>) -> Self {
        self.before = before;
        self.after = after;
        self
    }

    pub fn with_error(mut self, error: impl Display) -> Self {
        self.error = Some(error.to_string());
        self
    }

    pub fn is_failed(&self) -> bool {
        self.status.is_failed()
    }
}

/// Stable sort, most severe first
pub fn sort_by_severity<S>(results: &mut [AnalysisResult<S>]) {
    results.sort_by_key(|result| Reverse(result.severity));
}

/// Every finding recorded for one counterparty, by group
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupedResults {
    #[serde(rename = "RECIPIENT_INTERACTION", default, skip_serializing_if = "Vec::is_empty")]
    pub recipient_interaction: Vec<AnalysisResult<RecipientInteractionStatus>>,
    #[serde(rename = "RECIPIENT_ACTIVITY", default, skip_serializing_if = "Vec::is_empty")]
    pub recipient_activity: Vec<AnalysisResult<RecipientActivityStatus>>,
    #[serde(rename = "BRIDGE", default, skip_serializing_if = "Vec::is_empty")]
    pub bridge: Vec<AnalysisResult<BridgeStatus>>,
    #[serde(rename = "CONTRACT_VERIFICATION", default, skip_serializing_if = "Vec::is_empty")]
    pub contract_verification: Vec<AnalysisResult<ContractVerificationStatus>>,
    #[serde(rename = "CONTRACT_INTERACTION", default, skip_serializing_if = "Vec::is_empty")]
    pub contract_interaction: Vec<AnalysisResult<ContractInteractionStatus>>,
    #[serde(rename = "DELEGATECALL", default, skip_serializing_if = "Vec::is_empty")]
    pub delegatecall: Vec<AnalysisResult<DelegatecallStatus>>,
}

impl GroupedResults {
    pub fn is_empty(&self) -> bool {
        self.recipient_interaction.is_empty()
            && self.recipient_activity.is_empty()
            && self.bridge.is_empty()
            && self.contract_verification.is_empty()
            && self.contract_interaction.is_empty()
            && self.delegatecall.is_empty()
    }

    /// Appends `other`'s findings and restores severity order
    pub fn merge(&mut self, other: GroupedResults) {
        self.recipient_interaction.extend(other.recipient_interaction);
        self.recipient_activity.extend(other.recipient_activity);
        self.bridge.extend(other.bridge);
        self.contract_verification.extend(other.contract_verification);
        self.contract_interaction.extend(other.contract_interaction);
        self.delegatecall.extend(other.delegatecall);
        self.sort();
    }

    pub fn sort(&mut self) {
        sort_by_severity(&mut self.recipient_interaction);
        sort_by_severity(&mut self.recipient_activity);
        sort_by_severity(&mut self.bridge);
        sort_by_severity(&mut self.contract_verification);
        sort_by_severity(&mut self.contract_interaction);
        sort_by_severity(&mut self.delegatecall);
    }

    /// Severities recorded in `group`, in stored order
    pub fn severities(&self, group: StatusGroup) -> Vec<Severity> {
        fn of<S>(results: &[AnalysisResult<S>]) -> Vec<Severity> {
            results.iter().map(|r| r.severity).collect()
        }

        match group {
            StatusGroup::RecipientInteraction => of(&self.recipient_interaction),
            StatusGroup::RecipientActivity => of(&self.recipient_activity),
            StatusGroup::Bridge => of(&self.bridge),
            StatusGroup::ContractVerification => of(&self.contract_verification),
            StatusGroup::ContractInteraction => of(&self.contract_interaction),
            StatusGroup::Delegatecall => of(&self.delegatecall),
            StatusGroup::Threat | StatusGroup::BalanceChange => Vec::new(),
        }
    }

    /// Highest severity recorded in `group`
    pub fn dominant(&self, group: StatusGroup) -> Option<Severity> {
        self.severities(group).into_iter().max()
    }

    /// Highest severity across all groups
    pub fn max_severity(&self) -> Option<Severity> {
        [
            StatusGroup::RecipientInteraction,
            StatusGroup::RecipientActivity,
            StatusGroup::Bridge,
            StatusGroup::ContractVerification,
            StatusGroup::ContractInteraction,
            StatusGroup::Delegatecall,
        ]
        .into_iter()
        .filter_map(|group| self.dominant(group))
        .max()
    }

    pub fn has_failures(&self) -> bool {
        self.recipient_interaction.iter().any(AnalysisResult::is_failed)
            || self.recipient_activity.iter().any(AnalysisResult::is_failed)
            || self.bridge.iter().any(AnalysisResult::is_failed)
            || self.contract_verification.iter().any(AnalysisResult::is_failed)
            || self.contract_interaction.iter().any(AnalysisResult::is_failed)
            || self.delegatecall.iter().any(AnalysisResult::is_failed)
    }
}

/// Findings keyed by counterparty address
pub type AnalysisResponse = BTreeMap<Address, GroupedResults>;

/// Folds `other` into `response`, merging the groups of shared addresses
pub fn merge_responses(response: &mut AnalysisResponse, other: AnalysisResponse) {
    for (address, results) in other {
        response.entry(address).or_default().merge(results);
    }
}

/// Findings for the recipients and for the contracts of one transaction
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterpartyAnalysis {
    #[serde(default)]
    pub recipient: AnalysisResponse,
    #[serde(default)]
    pub contract: AnalysisResponse,
}

impl CounterpartyAnalysis {
    pub fn is_empty(&self) -> bool {
        self.recipient.is_empty() && self.contract.is_empty()
    }

    /// Highest severity across both maps
    pub fn max_severity(&self) -> Option<Severity> {
        self.recipient
            .values()
            .chain(self.contract.values())
            .filter_map(GroupedResults::max_severity)
            .max()
    }
}

/// Transaction-scoped result of a threat scan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreatAnalysisResponse {
    #[serde(rename = "THREAT", default)]
    pub threat: Vec<AnalysisResult<ThreatStatus>>,
    #[serde(rename = "BALANCE_CHANGE", default)]
    pub balance_change: Vec<BalanceChange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl ThreatAnalysisResponse {
    /// A response holding a single `FAILED` threat finding
    pub fn failed(error: impl Display) -> Self {
        Self {
            threat: vec![AnalysisResult::failed(error)],
            ..Self::default()
        }
    }

    pub fn max_severity(&self) -> Option<Severity> {
        self.threat.iter().map(|r| r.severity).max()
    }
}

/// Simulated movement of one asset in and out of the Safe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceChange {
    pub asset: ScanAsset,
    #[serde(rename = "in", default)]
    pub incoming: Vec<AssetDiff>,
    #[serde(rename = "out", default)]
    pub outgoing: Vec<AssetDiff>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AssetDiff {
    Nft {
        #[serde(rename = "tokenId")]
        token_id: String,
    },
    Fungible {
        value: String,
    },
}
