use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "safe-shield")]
#[command(about = "Pre-signing safety analysis for Safe transactions", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Extra configuration file, layered over config/default and config/local
    #[arg(long, global = true, env = "SAFE_SHIELD_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze the recipients and contracts a transaction interacts with
    Analyze(AnalyzeArgs),

    /// Run a threat scan on a transaction or typed-data message
    Scan(ScanArgs),
}

/// The transaction under review: a single call or a bundle wrapped into a MultiSend
#[derive(Args, Clone)]
pub struct TxArgs {
    /// Chain ID the Safe lives on
    #[arg(long, env = "SAFE_CHAIN_ID")]
    pub chain_id: u64,

    /// Safe contract address
    #[arg(long, env = "SAFE_ADDRESS")]
    pub safe: String,

    /// Target address (single call mode)
    #[arg(long)]
    pub to: Option<String>,

    /// ETH value to send (in wei)
    #[arg(long, default_value = "0")]
    pub value: String,

    /// Calldata as hex
    #[arg(long, default_value = "0x")]
    pub data: String,

    /// Operation: 0 for call, 1 for delegatecall
    #[arg(long, default_value = "0")]
    pub operation: u8,

    /// Path to Safe TX Bundler JSON file
    #[arg(long, conflicts_with = "to")]
    pub bundle: Option<String>,

    /// Wrap the bundle with MultiSendCallOnly instead of MultiSend
    #[arg(long, requires = "bundle")]
    pub call_only: bool,
}

#[derive(Parser, Clone)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub tx: TxArgs,

    /// Destination chain, for bridge transactions
    #[arg(long, requires = "bridge_recipient")]
    pub bridge_chain_id: Option<u64>,

    /// Address receiving the funds on the destination chain
    #[arg(long, requires = "bridge_chain_id")]
    pub bridge_recipient: Option<String>,
}

#[derive(Parser, Clone)]
pub struct ScanArgs {
    /// Chain ID the Safe lives on
    #[arg(long, env = "SAFE_CHAIN_ID")]
    pub chain_id: u64,

    /// Safe contract address
    #[arg(long, env = "SAFE_ADDRESS")]
    pub safe: String,

    /// Owner about to sign
    #[arg(long)]
    pub wallet: String,

    /// Target address of the Safe transaction
    #[arg(long, required_unless_present = "typed_data")]
    pub to: Option<String>,

    /// ETH value to send (in wei)
    #[arg(long, default_value = "0")]
    pub value: String,

    /// Calldata as hex
    #[arg(long, default_value = "0x")]
    pub data: String,

    /// Operation: 0 for call, 1 for delegatecall
    #[arg(long, default_value = "0")]
    pub operation: u8,

    /// Safe nonce of the transaction
    #[arg(long, default_value = "0")]
    pub nonce: String,

    /// Path to an EIP-712 typed-data JSON file to scan instead of a transaction
    #[arg(long, conflicts_with = "to")]
    pub typed_data: Option<String>,

    /// Domain of the dApp that requested the signature
    #[arg(long)]
    pub origin: Option<String>,
}
