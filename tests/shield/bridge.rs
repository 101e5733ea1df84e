//! Bridge destination tests

use alloy::primitives::{address, Address, Bytes};
use safe_shield::analysis::BridgeStatus;
use safe_shield::contracts::CHAIN_SPECIFIC_PROXY_METHOD;
use safe_shield::{ChainAddresses, CounterpartyAnalysis, Severity, TransactionRequest, TxInfo};

use crate::common::{creation_via, safe_info, TestHarness, CHAIN_ID, OWNER_A, OWNER_B, OWNER_C, SAFE};

const BRIDGE: Address = address!("0xb71d9eb71d9eb71d9eb71d9eb71d9eb71d9eb71d");
const TARGET_CHAIN: u64 = 100;

async fn analyze_bridge(harness: &TestHarness, target_chain_id: u64, recipient: Address) -> CounterpartyAnalysis {
    let request = TransactionRequest::new(CHAIN_ID, SAFE, BRIDGE, Bytes::from_static(&[0xde, 0xad, 0xbe, 0xef]))
        .with_tx_info(TxInfo::Bridge {
            target_chain_id,
            recipient,
        });

    harness.shield().analyze_transaction(&request).await.unwrap()
}

fn bridge_statuses(response: &CounterpartyAnalysis, recipient: Address) -> Vec<BridgeStatus> {
    response
        .recipient
        .get(&recipient)
        .map(|grouped| grouped.bridge.iter().map(|r| r.status).collect())
        .unwrap_or_default()
}

/// A destination chain outside the registry cannot be checked
#[tokio::test]
async fn test_unsupported_network() {
    let harness = TestHarness::new();

    let response = analyze_bridge(&harness, 999_999, SAFE).await;

    let bridge = &response.recipient[&SAFE].bridge;
    assert_eq!(bridge.len(), 1);
    assert_eq!(bridge[0].status, BridgeStatus::UnsupportedNetwork);
    assert_eq!(bridge[0].severity, Severity::Warn);
    assert_eq!(bridge[0].target_chain_id, Some(999_999));
}

/// Same owners in a different order and the same threshold is a match
#[tokio::test]
async fn test_same_setup_ignores_owner_order() {
    let harness = TestHarness::new();
    harness
        .ledger
        .insert_safe(CHAIN_ID, safe_info(SAFE, vec![OWNER_A, OWNER_B], 2, 50))
        .await;
    harness
        .ledger
        .insert_safe(TARGET_CHAIN, safe_info(SAFE, vec![OWNER_B, OWNER_A], 2, 10))
        .await;

    let response = analyze_bridge(&harness, TARGET_CHAIN, SAFE).await;

    assert!(bridge_statuses(&response, SAFE).is_empty());
}

/// Shared owners with a different threshold is informational
#[tokio::test]
async fn test_different_safe_setup() {
    let harness = TestHarness::new();
    harness
        .ledger
        .insert_safe(CHAIN_ID, safe_info(SAFE, vec![OWNER_A, OWNER_B], 2, 50))
        .await;
    harness
        .ledger
        .insert_safe(TARGET_CHAIN, safe_info(SAFE, vec![OWNER_A, OWNER_B], 1, 10))
        .await;

    let response = analyze_bridge(&harness, TARGET_CHAIN, SAFE).await;

    let bridge = &response.recipient[&SAFE].bridge;
    assert_eq!(bridge[0].status, BridgeStatus::DifferentSafeSetup);
    assert_eq!(bridge[0].severity, Severity::Info);
    assert_eq!(bridge[0].target_chain_id, Some(TARGET_CHAIN));
}

/// A destination Safe without any of our owners is flagged
#[tokio::test]
async fn test_missing_ownership() {
    let harness = TestHarness::new();
    let recipient = address!("0x4444444444444444444444444444444444444444");
    harness
        .ledger
        .insert_safe(CHAIN_ID, safe_info(SAFE, vec![OWNER_A, OWNER_B], 2, 50))
        .await;
    harness
        .ledger
        .insert_safe(TARGET_CHAIN, safe_info(recipient, vec![OWNER_C], 1, 10))
        .await;

    let response = analyze_bridge(&harness, TARGET_CHAIN, recipient).await;

    assert_eq!(bridge_statuses(&response, recipient), vec![BridgeStatus::MissingOwnership]);
    assert_eq!(response.recipient[&recipient].bridge[0].severity, Severity::Warn);
    assert_eq!(
        response.recipient[&recipient].bridge[0].description,
        "The recipient Safe on Gnosis Chain has none of this Safe's owners."
    );
}

/// A source Safe unknown to the ledger cannot prove ownership of the destination
#[tokio::test]
async fn test_missing_ownership_without_source_safe() {
    let harness = TestHarness::new();
    harness
        .ledger
        .insert_safe(TARGET_CHAIN, safe_info(SAFE, vec![OWNER_A, OWNER_B], 2, 10))
        .await;

    let response = analyze_bridge(&harness, TARGET_CHAIN, SAFE).await;

    assert_eq!(bridge_statuses(&response, SAFE), vec![BridgeStatus::MissingOwnership]);
    let finding = &response.recipient[&SAFE].bridge[0];
    assert_eq!(finding.target_chain_id, Some(TARGET_CHAIN));
    assert!(finding.description.contains("not found on chain 1"));
}

/// No destination Safe and a deployment that cannot be replayed there
#[tokio::test]
async fn test_incompatible_safe() {
    let harness = TestHarness::new();
    harness
        .ledger
        .set_creation(
            CHAIN_ID,
            SAFE,
            creation_via(&ChainAddresses::v1_4_1(), CHAIN_SPECIFIC_PROXY_METHOD),
        )
        .await;

    let response = analyze_bridge(&harness, TARGET_CHAIN, SAFE).await;

    let bridge = &response.recipient[&SAFE].bridge;
    assert_eq!(bridge[0].status, BridgeStatus::IncompatibleSafe);
    assert_eq!(bridge[0].severity, Severity::Critical);
}

/// No destination Safe but a canonical deployment is silently fine
#[tokio::test]
async fn test_compatible_deployment_without_target_safe() {
    let harness = TestHarness::new();
    harness
        .ledger
        .set_creation(
            CHAIN_ID,
            SAFE,
            creation_via(&ChainAddresses::v1_3_0(), "createProxyWithNonce"),
        )
        .await;

    let response = analyze_bridge(&harness, TARGET_CHAIN, SAFE).await;

    assert!(bridge_statuses(&response, SAFE).is_empty());
}

/// A failed creation lookup becomes a FAILED bridge finding on the target chain
#[tokio::test]
async fn test_bridge_lookup_failure() {
    let harness = TestHarness::new();

    let response = analyze_bridge(&harness, TARGET_CHAIN, SAFE).await;

    let bridge = &response.recipient[&SAFE].bridge;
    assert_eq!(bridge.len(), 1);
    assert_eq!(bridge[0].status, BridgeStatus::Failed);
    assert_eq!(bridge[0].severity, Severity::Critical);
    assert_eq!(bridge[0].target_chain_id, Some(TARGET_CHAIN));
}
