use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::Address;
use futures::stream::{self, StreamExt};

use super::bridge::BridgeAnalyzer;
use super::extract::extract_recipients;
use crate::analysis::cache::{read_cached, write_cached, CacheKey, RECIPIENT_FIELD};
use crate::analysis::result::{merge_responses, AnalysisResponse, AnalysisResult, GroupedResults};
use crate::analysis::severity::{RecipientActivityStatus, RecipientInteractionStatus};
use crate::config::{AnalysisSettings, CacheConfig};
use crate::services::{CacheStore, ChainRegistry, LedgerApi};
use crate::types::{DecodedTransaction, TxInfo};

/// Classifies the recipients of a flattened transaction
#[derive(Clone)]
pub struct RecipientAnalyzer {
    ledger: Arc<dyn LedgerApi>,
    cache: Arc<dyn CacheStore>,
    bridge: BridgeAnalyzer,
    settings: AnalysisSettings,
    cache_ttl: Duration,
}

impl RecipientAnalyzer {
    pub fn new(
        ledger: Arc<dyn LedgerApi>,
        chains: Arc<dyn ChainRegistry>,
        cache: Arc<dyn CacheStore>,
    ) -> Self {
        Self {
            bridge: BridgeAnalyzer::new(ledger.clone(), chains),
            ledger,
            cache,
            settings: AnalysisSettings::default(),
            cache_ttl: CacheConfig::default().ttl(),
        }
    }

    pub fn with_settings(mut self, settings: AnalysisSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Analyzes every unique recipient of `transactions`, plus the bridge
    /// destination when `tx_info` describes one.
    ///
    /// Responses without failed checks are cached per
    /// `(chain_id, safe, recipients, bridge target)`.
    pub async fn analyze(
        &self,
        chain_id: u64,
        safe: Address,
        transactions: &[DecodedTransaction],
        tx_info: Option<&TxInfo>,
    ) -> AnalysisResponse {
        let recipients = extract_recipients(transactions);
        let bridge_target = tx_info.and_then(TxInfo::bridge_target);

        if recipients.is_empty() && bridge_target.is_none() {
            return AnalysisResponse::new();
        }

        let key = cache_key(chain_id, safe, &recipients, bridge_target);
        if let Some(cached) = read_cached(self.cache.as_ref(), &key, RECIPIENT_FIELD).await {
            return cached;
        }

        tracing::debug!(chain_id, %safe, recipients = recipients.len(), "analyzing recipients");

        let bridge = async {
            match tx_info {
                Some(info) => self.bridge.analyze(chain_id, safe, info).await,
                None => AnalysisResponse::new(),
            }
        };
        let (per_recipient, bridge) = tokio::join!(self.analyze_each(chain_id, safe, &recipients), bridge);

        let mut response: AnalysisResponse = per_recipient.into_iter().collect();
        merge_responses(&mut response, bridge);

        write_cached(self.cache.as_ref(), &key, RECIPIENT_FIELD, &response, self.cache_ttl).await;
        response
    }

    async fn analyze_each(
        &self,
        chain_id: u64,
        safe: Address,
        recipients: &[Address],
    ) -> Vec<(Address, GroupedResults)> {
        stream::iter(recipients.iter().copied())
            .map(|recipient| async move {
                let (interaction, activity) = tokio::join!(
                    self.analyze_interactions(chain_id, safe, recipient),
                    self.analyze_activity(chain_id, recipient)
                );

                let grouped = GroupedResults {
                    recipient_interaction: vec![interaction],
                    recipient_activity: activity.into_iter().collect(),
                    ..GroupedResults::default()
                };
                (recipient, grouped)
            })
            .buffered(self.settings.concurrency())
            .collect()
            .await
    }

    /// `RECURRING_RECIPIENT` if the Safe has sent to `recipient` before,
    /// otherwise `NEW_RECIPIENT`
    pub async fn analyze_interactions(
        &self,
        chain_id: u64,
        safe: Address,
        recipient: Address,
    ) -> AnalysisResult<RecipientInteractionStatus> {
        match self.ledger.get_transfers(chain_id, safe, recipient, 1).await {
            Ok(page) => match page.count {
                Some(count) if count > 0 => AnalysisResult::new(
                    RecipientInteractionStatus::RecurringRecipient,
                    format!("You have interacted with this address {count} time(s) before."),
                ),
                _ => AnalysisResult::new(
                    RecipientInteractionStatus::NewRecipient,
                    "You are interacting with this address for the first time.",
                ),
            },
            Err(e) => {
                tracing::warn!(chain_id, %safe, %recipient, error = %e, "transfer history lookup failed");
                AnalysisResult::failed(e)
            }
        }
    }

    /// `LOW_ACTIVITY` when `recipient` is a Safe with few executed transactions
    pub async fn analyze_activity(
        &self,
        chain_id: u64,
        recipient: Address,
    ) -> Option<AnalysisResult<RecipientActivityStatus>> {
        match self.ledger.get_safe(chain_id, recipient).await {
            Ok(Some(info)) if info.nonce < self.settings.low_activity_threshold => {
                Some(AnalysisResult::new(
                    RecipientActivityStatus::LowActivity,
                    format!(
                        "The recipient Safe has executed only {} transaction(s).",
                        info.nonce
                    ),
                ))
            }
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(chain_id, %recipient, error = %e, "recipient Safe lookup failed");
                Some(AnalysisResult::failed(e))
            }
        }
    }
}

fn cache_key(
    chain_id: u64,
    safe: Address,
    recipients: &[Address],
    bridge_target: Option<(u64, Address)>,
) -> CacheKey {
    match bridge_target {
        Some((target_chain_id, recipient)) => {
            let mut material = target_chain_id.to_be_bytes().to_vec();
            material.extend_from_slice(recipient.as_slice());
            CacheKey::with_material(chain_id, safe, recipients, &material)
        }
        None => CacheKey::new(chain_id, safe, recipients),
    }
}
