use std::fs;

use color_eyre::eyre::{eyre, Result};
use safe_shield::{SafeShield, SafeTxParams, ShieldConfig, ThreatRequest};

use crate::bundle::{parse_address, parse_hex_data, parse_operation, parse_value};
use crate::cli::ScanArgs;
use crate::output::ThreatOutput;

pub async fn run(args: ScanArgs, config: &ShieldConfig, json: bool) -> Result<()> {
    let safe = parse_address(&args.safe)?;
    let request = build_request(&args)?;

    let shield = SafeShield::from_config(config)?;
    let response = shield.analyze_threat(args.chain_id, safe, &request).await;

    ThreatOutput {
        chain_id: args.chain_id,
        safe,
        response: &response,
    }
    .print(json);

    Ok(())
}

fn build_request(args: &ScanArgs) -> Result<ThreatRequest> {
    let wallet = parse_address(&args.wallet)?;
    let origin = args.origin.clone();

    if let Some(path) = &args.typed_data {
        let content = fs::read_to_string(path)
            .map_err(|e| eyre!("Cannot read typed data '{}': {}", path, e))?;
        let data = serde_json::from_str(&content).map_err(|e| eyre!("Invalid typed data JSON: {}", e))?;
        return Ok(ThreatRequest::TypedData { wallet, data, origin });
    }

    let to = args
        .to
        .as_deref()
        .ok_or_else(|| eyre!("Either --to or --typed-data is required"))?;

    let params = SafeTxParams::new(
        parse_address(to)?,
        parse_value(&args.value)?,
        parse_hex_data(&args.data)?,
        parse_operation(args.operation)?,
    )
    .with_nonce(parse_value(&args.nonce)?);

    Ok(ThreatRequest::Transaction { wallet, params, origin })
}
