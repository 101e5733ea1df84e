//! Recipient interaction and activity tests

use alloy::primitives::{address, Address, Bytes, U256};
use safe_shield::analysis::{RecipientActivityStatus, RecipientInteractionStatus};
use safe_shield::{Operation, Severity, TransactionRequest};

use crate::common::{
    erc20_transfer, multi_send_data, native_transfer, safe_info, TestHarness, CHAIN_ID, OWNER_A,
    SAFE,
};

const RECIPIENT: Address = address!("0x1111111111111111111111111111111111111111");
const OTHER: Address = address!("0x2222222222222222222222222222222222222222");
const TOKEN: Address = address!("0x7070707070707070707070707070707070707070");

fn native_request(to: Address) -> TransactionRequest {
    TransactionRequest::new(CHAIN_ID, SAFE, to, Bytes::new()).with_value(U256::from(1_000u64))
}

/// Prior transfers make the recipient recurring
#[tokio::test]
async fn test_recurring_recipient() {
    let harness = TestHarness::new();
    harness.ledger.set_transfer_count(RECIPIENT, Some(5)).await;

    let response = harness
        .shield()
        .analyze_transaction(&native_request(RECIPIENT))
        .await
        .unwrap();

    let findings = &response.recipient[&RECIPIENT];
    assert_eq!(findings.recipient_interaction.len(), 1);
    assert_eq!(
        findings.recipient_interaction[0].status,
        RecipientInteractionStatus::RecurringRecipient
    );
    assert_eq!(findings.recipient_interaction[0].severity, Severity::Ok);
    assert!(findings.recipient_activity.is_empty());
    assert!(response.contract.is_empty(), "native transfers have no contract counterparty");
}

/// Zero and missing counts both mean a new recipient
#[tokio::test]
async fn test_new_recipient_for_zero_or_missing_count() {
    for count in [Some(0), None] {
        let harness = TestHarness::new();
        harness.ledger.set_transfer_count(RECIPIENT, count).await;

        let response = harness
            .shield()
            .analyze_transaction(&native_request(RECIPIENT))
            .await
            .unwrap();

        let finding = &response.recipient[&RECIPIENT].recipient_interaction[0];
        assert_eq!(finding.status, RecipientInteractionStatus::NewRecipient, "count {count:?}");
        assert_eq!(finding.severity, Severity::Info);
    }
}

/// A ledger failure surfaces as a critical FAILED finding
#[tokio::test]
async fn test_transfer_lookup_failure() {
    let harness = TestHarness::new();
    harness.ledger.fail_for(RECIPIENT).await;

    let response = harness
        .shield()
        .analyze_transaction(&native_request(RECIPIENT))
        .await
        .unwrap();

    let findings = &response.recipient[&RECIPIENT];
    let interaction = &findings.recipient_interaction[0];
    assert_eq!(interaction.status, RecipientInteractionStatus::Failed);
    assert_eq!(interaction.severity, Severity::Critical);
    assert!(interaction.error.is_some());

    let activity = &findings.recipient_activity[0];
    assert_eq!(activity.status, RecipientActivityStatus::Failed);
}

/// A recipient Safe with a low nonce is flagged
#[tokio::test]
async fn test_low_activity_recipient_safe() {
    let harness = TestHarness::new();
    harness
        .ledger
        .insert_safe(CHAIN_ID, safe_info(RECIPIENT, vec![OWNER_A], 1, 2))
        .await;

    let response = harness
        .shield()
        .analyze_transaction(&native_request(RECIPIENT))
        .await
        .unwrap();

    let activity = &response.recipient[&RECIPIENT].recipient_activity;
    assert_eq!(activity.len(), 1);
    assert_eq!(activity[0].status, RecipientActivityStatus::LowActivity);
    assert_eq!(activity[0].severity, Severity::Warn);
}

/// An established recipient Safe produces no activity finding
#[tokio::test]
async fn test_active_recipient_safe() {
    let harness = TestHarness::new();
    harness
        .ledger
        .insert_safe(CHAIN_ID, safe_info(RECIPIENT, vec![OWNER_A], 1, 40))
        .await;

    let response = harness
        .shield()
        .analyze_transaction(&native_request(RECIPIENT))
        .await
        .unwrap();

    assert!(response.recipient[&RECIPIENT].recipient_activity.is_empty());
}

/// One recipient's failure leaves the other recipients' findings intact
#[tokio::test]
async fn test_failure_is_isolated_per_recipient() {
    let harness = TestHarness::new();
    harness.ledger.fail_for(RECIPIENT).await;
    harness.ledger.set_transfer_count(OTHER, Some(3)).await;

    let batch = [native_transfer(RECIPIENT, 1), native_transfer(OTHER, 2)];
    let request = TransactionRequest::new(
        CHAIN_ID,
        SAFE,
        safe_shield::ChainAddresses::default().multi_send_call_only,
        multi_send_data(&batch),
    )
    .with_operation(Operation::DelegateCall);

    let response = harness.shield().analyze_transaction(&request).await.unwrap();

    assert!(response.recipient[&RECIPIENT].has_failures());
    assert_eq!(
        response.recipient[&OTHER].recipient_interaction[0].status,
        RecipientInteractionStatus::RecurringRecipient
    );
}

/// The token receiver, not the token contract, is the recipient of an ERC-20 transfer
#[tokio::test]
async fn test_erc20_transfer_recipient() {
    let harness = TestHarness::new();
    let tx = erc20_transfer(TOKEN, RECIPIENT, 500);
    let request = TransactionRequest::new(CHAIN_ID, SAFE, tx.to, tx.data);

    let response = harness.shield().analyze_transaction(&request).await.unwrap();

    assert_eq!(response.recipient.keys().copied().collect::<Vec<_>>(), vec![RECIPIENT]);
    assert!(response.contract.contains_key(&TOKEN));
}

/// Repeated recipients are looked up once
#[tokio::test]
async fn test_duplicate_recipients_deduplicated() {
    let harness = TestHarness::new();
    let batch = [
        native_transfer(RECIPIENT, 1),
        native_transfer(RECIPIENT, 2),
        native_transfer(RECIPIENT, 3),
    ];
    let request = TransactionRequest::new(
        CHAIN_ID,
        SAFE,
        safe_shield::ChainAddresses::default().multi_send,
        multi_send_data(&batch),
    )
    .with_operation(Operation::DelegateCall);

    let response = harness.shield().analyze_transaction(&request).await.unwrap();

    assert_eq!(response.recipient.len(), 1);
    assert_eq!(harness.ledger.transfer_calls(), 1);
}
