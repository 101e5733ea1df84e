//! End-to-end analysis through the facade

use std::sync::Arc;

use alloy::primitives::{address, Address, Bytes, U256};
use safe_shield::analysis::{RecipientInteractionStatus, ThreatStatus};
use safe_shield::services::ScanResponse;
use safe_shield::{
    ChainAddresses, Operation, SafeTxParams, StatusGroup, ThreatRequest, TransactionRequest,
};

use crate::common::{
    erc20_transfer, multi_send_data, native_transfer, FailingDecoder, TestHarness, CHAIN_ID, SAFE,
    WALLET,
};

const R1: Address = address!("0x1111111111111111111111111111111111111111");
const R2: Address = address!("0x2222222222222222222222222222222222222222");
const TOKEN: Address = address!("0x7070707070707070707070707070707070707070");

fn batch_request() -> TransactionRequest {
    let batch = [native_transfer(R1, 1_000), erc20_transfer(TOKEN, R2, 50)];
    TransactionRequest::new(
        CHAIN_ID,
        SAFE,
        ChainAddresses::default().multi_send,
        multi_send_data(&batch),
    )
    .with_operation(Operation::DelegateCall)
}

/// A multiSend of a native and an ERC-20 transfer reports exactly both recipients
#[tokio::test]
async fn test_multisend_recipients() {
    let harness = TestHarness::new();
    harness.ledger.set_transfer_count(R1, Some(4)).await;

    let response = harness
        .shield()
        .analyze_transaction(&batch_request())
        .await
        .unwrap();

    assert_eq!(
        response.recipient.keys().copied().collect::<Vec<_>>(),
        vec![R1, R2]
    );
    for recipient in [R1, R2] {
        assert!(response.recipient[&recipient]
            .dominant(StatusGroup::RecipientInteraction)
            .is_some());
    }
    assert_eq!(
        response.recipient[&R1].recipient_interaction[0].status,
        RecipientInteractionStatus::RecurringRecipient
    );
    assert_eq!(
        response.recipient[&R2].recipient_interaction[0].status,
        RecipientInteractionStatus::NewRecipient
    );

    assert_eq!(
        response.contract.keys().copied().collect::<Vec<_>>(),
        vec![TOKEN],
        "the MultiSend wrapper is not a counterparty"
    );
}

/// A repeated analysis is served from cache
#[tokio::test]
async fn test_repeat_analysis_hits_cache() {
    let harness = TestHarness::new();
    let shield = harness.shield();

    let first = shield.analyze_transaction(&batch_request()).await.unwrap();
    let transfer_calls = harness.ledger.transfer_calls();
    let multisig_calls = harness.ledger.multisig_calls();
    assert_eq!(transfer_calls, 2);
    assert_eq!(harness.cache.len().await, 2, "one entry each for recipients and contracts");

    let second = shield.analyze_transaction(&batch_request()).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(harness.ledger.transfer_calls(), transfer_calls);
    assert_eq!(harness.ledger.multisig_calls(), multisig_calls);
}

/// Corrupt cache payloads are treated as misses and recomputed
#[tokio::test]
async fn test_corrupt_cache_recomputes() {
    let harness = TestHarness::new();
    let shield = harness.shield();

    let first = shield.analyze_transaction(&batch_request()).await.unwrap();
    harness.cache.corrupt_all().await;

    let second = shield.analyze_transaction(&batch_request()).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(harness.ledger.transfer_calls(), 4);
}

/// Responses holding a FAILED finding are never cached
#[tokio::test]
async fn test_failures_are_not_cached() {
    let harness = TestHarness::new();
    harness.ledger.fail_for(R2).await;
    let shield = harness.shield();

    shield.analyze_transaction(&batch_request()).await.unwrap();
    shield.analyze_transaction(&batch_request()).await.unwrap();

    assert_eq!(harness.ledger.transfer_calls(), 4);
}

/// A decoder outage still analyzes the raw call
#[tokio::test]
async fn test_decoder_failure_is_fail_open() {
    let harness = TestHarness::new();
    let shield = harness.shield_with_decoder(Arc::new(FailingDecoder));

    let native = TransactionRequest::new(CHAIN_ID, SAFE, R1, Bytes::new()).with_value(U256::from(1u64));
    let response = shield.analyze_transaction(&native).await.unwrap();
    assert!(response.recipient.contains_key(&R1));

    let response = shield.analyze_transaction(&batch_request()).await.unwrap();
    assert!(response.recipient.is_empty(), "an undecoded multiSend has no readable recipients");
    assert!(response.contract.contains_key(&ChainAddresses::default().multi_send));
}

/// Counterparty analysis and the threat scan run together
#[tokio::test]
async fn test_analyze_all() {
    let harness = TestHarness::new();
    harness
        .scanner
        .respond_with(
            serde_json::from_value::<ScanResponse>(serde_json::json!({
                "validation": { "status": "Success", "result_type": "Benign" }
            }))
            .unwrap(),
        )
        .await;

    let request = batch_request();
    let threat = ThreatRequest::Transaction {
        wallet: WALLET,
        params: SafeTxParams::new(request.to, request.value, request.data.clone(), request.operation),
        origin: None,
    };

    let combined = harness.shield().analyze_all(&request, &threat).await.unwrap();

    assert_eq!(combined.counterparties.recipient.len(), 2);
    assert_eq!(combined.threat.threat[0].status, ThreatStatus::NoThreat);
    assert_eq!(harness.scanner.calls.load(std::sync::atomic::Ordering::SeqCst), 1);
}

/// The wire format keys findings by address and group name
#[tokio::test]
async fn test_response_wire_format() {
    let harness = TestHarness::new();

    let response = harness
        .shield()
        .analyze_transaction(&batch_request())
        .await
        .unwrap();
    let json = serde_json::to_value(&response).unwrap();

    let finding = &json["recipient"][R1.to_string()]["RECIPIENT_INTERACTION"][0];
    assert_eq!(finding["type"], "NEW_RECIPIENT");
    assert_eq!(finding["severity"], "INFO");
    assert!(json["recipient"][R1.to_string()].get("BRIDGE").is_none());
}
