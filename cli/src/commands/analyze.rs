use color_eyre::eyre::{eyre, Result};
use safe_shield::{Operation, SafeShield, ShieldConfig, TransactionRequest, TxInfo};

use crate::bundle::{load_bundle, parse_address, parse_hex_data, parse_operation, parse_value, wrap_in_multisend};
use crate::cli::{AnalyzeArgs, TxArgs};
use crate::output::AnalysisOutput;

pub async fn run(args: AnalyzeArgs, config: &ShieldConfig, json: bool) -> Result<()> {
    let mut request = build_request(&args.tx)?;

    if let (Some(target_chain_id), Some(recipient)) = (args.bridge_chain_id, &args.bridge_recipient) {
        request = request.with_tx_info(TxInfo::Bridge {
            target_chain_id,
            recipient: parse_address(recipient)?,
        });
    }

    let shield = SafeShield::from_config(config)?;
    let response = shield.analyze_transaction(&request).await?;

    AnalysisOutput {
        chain_id: request.chain_id,
        safe: request.safe,
        results: &response,
    }
    .print(json);

    Ok(())
}

/// Builds the request from a single call or a bundle wrapped into a MultiSend
pub fn build_request(args: &TxArgs) -> Result<TransactionRequest> {
    let safe = parse_address(&args.safe)?;

    if let Some(path) = &args.bundle {
        let txs = load_bundle(path)?;
        if txs.is_empty() {
            return Err(eyre!("Bundle contains no transactions"));
        }
        let (multi_send, data) = wrap_in_multisend(&txs, args.call_only);
        return Ok(TransactionRequest::new(args.chain_id, safe, multi_send, data)
            .with_operation(Operation::DelegateCall));
    }

    let to = args
        .to
        .as_deref()
        .ok_or_else(|| eyre!("Either --to or --bundle is required"))?;

    Ok(
        TransactionRequest::new(args.chain_id, safe, parse_address(to)?, parse_hex_data(&args.data)?)
            .with_value(parse_value(&args.value)?)
            .with_operation(parse_operation(args.operation)?),
    )
}
