//! Cross-chain compatibility of bridge recipients

use std::sync::Arc;

use alloy::primitives::Address;

use crate::analysis::result::{AnalysisResponse, AnalysisResult, GroupedResults};
use crate::analysis::severity::BridgeStatus;
use crate::chain::ChainAddresses;
use crate::contracts::CHAIN_SPECIFIC_PROXY_METHOD;
use crate::error::Result;
use crate::services::{ChainRegistry, CreationTransaction, LedgerApi};
use crate::types::TxInfo;

/// Checks that funds bridged to another chain land in a Safe the same owners control
#[derive(Clone)]
pub struct BridgeAnalyzer {
    ledger: Arc<dyn LedgerApi>,
    chains: Arc<dyn ChainRegistry>,
}

impl BridgeAnalyzer {
    pub fn new(ledger: Arc<dyn LedgerApi>, chains: Arc<dyn ChainRegistry>) -> Self {
        Self { ledger, chains }
    }

    /// Bridge findings keyed by the bridge recipient.
    ///
    /// Returns an empty response for non-bridge transactions and for a fully
    /// compatible destination. Every finding carries the target chain ID.
    pub async fn analyze(&self, chain_id: u64, safe: Address, tx_info: &TxInfo) -> AnalysisResponse {
        let Some((target_chain_id, recipient)) = tx_info.bridge_target() else {
            return AnalysisResponse::new();
        };

        let findings = match self.evaluate(chain_id, safe, target_chain_id, recipient).await {
            Ok(findings) => findings,
            Err(e) => {
                tracing::warn!(chain_id, %safe, target_chain_id, %recipient, error = %e, "bridge analysis failed");
                vec![AnalysisResult::failed(e)]
            }
        };

        if findings.is_empty() {
            return AnalysisResponse::new();
        }

        let grouped = GroupedResults {
            bridge: findings
                .into_iter()
                .map(|finding| finding.with_target_chain(target_chain_id))
                .collect(),
            ..GroupedResults::default()
        };
        [(recipient, grouped)].into()
    }

    async fn evaluate(
        &self,
        chain_id: u64,
        safe: Address,
        target_chain_id: u64,
        recipient: Address,
    ) -> Result<Vec<AnalysisResult<BridgeStatus>>> {
        if !self.chains.is_supported_chain(target_chain_id).await? {
            return Ok(vec![AnalysisResult::new(
                BridgeStatus::UnsupportedNetwork,
                format!("Chain {target_chain_id} is not supported, so the recipient cannot be checked there."),
            )]);
        }

        let target_chain = self.chains.get_chain(target_chain_id).await?;
        let target_name = target_chain.name.as_str();

        let Some(target) = self.ledger.get_safe(target_chain_id, recipient).await? else {
            let creation = self.ledger.get_creation_transaction(chain_id, safe).await?;
            if is_compatible_deployment(&creation) {
                return Ok(Vec::new());
            }
            return Ok(vec![AnalysisResult::new(
                BridgeStatus::IncompatibleSafe,
                format!(
                    "No Safe exists at the recipient on {target_name} and this Safe's deployment cannot be replayed there."
                ),
            )]);
        };

        let Some(source) = self.ledger.get_safe(chain_id, safe).await? else {
            return Ok(vec![AnalysisResult::new(
                BridgeStatus::MissingOwnership,
                format!(
                    "This Safe was not found on chain {chain_id}, so its owners cannot be matched against the recipient Safe on {target_name}."
                ),
            )]);
        };

        if !source.shares_owner_with(&target) {
            return Ok(vec![AnalysisResult::new(
                BridgeStatus::MissingOwnership,
                format!("The recipient Safe on {target_name} has none of this Safe's owners."),
            )]);
        }

        if !source.has_same_setup(&target) {
            return Ok(vec![AnalysisResult::new(
                BridgeStatus::DifferentSafeSetup,
                format!(
                    "The recipient Safe on {target_name} has a different owner set or threshold ({} of {} vs {} of {}).",
                    target.threshold,
                    target.owners.len(),
                    source.threshold,
                    source.owners.len()
                ),
            )]);
        }

        Ok(Vec::new())
    }
}

/// True if the Safe was created through a canonical factory and singleton pair
/// that exists at the same address on every chain
pub fn is_compatible_deployment(creation: &CreationTransaction) -> bool {
    let (Some(master_copy), Some(factory)) = (creation.master_copy, creation.factory_address) else {
        return false;
    };

    let chain_specific = creation
        .data_decoded
        .as_ref()
        .is_some_and(|decoded| decoded.method == CHAIN_SPECIFIC_PROXY_METHOD);

    !chain_specific
        && ChainAddresses::known_deployments()
            .iter()
            .any(|deployment| deployment.is_singleton(master_copy) && deployment.proxy_factory == factory)
}
