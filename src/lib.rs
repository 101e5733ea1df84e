//! # safe-shield
//!
//! Pre-signing safety analysis for Safe multisig transactions.
//!
//! ## Features
//!
//! - Flattens `execTransaction` / `multiSend` wrappers into atomic actions
//! - Classifies recipients (new vs recurring, low activity, bridge compatibility)
//! - Classifies contracts (verification, prior interaction, delegatecall trust)
//! - Maps an external threat scan into severity-ranked findings and balance changes
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use safe_shield::{SafeShield, ShieldConfig, TransactionRequest};
//!
//! let config = ShieldConfig::load()?;
//! let shield = SafeShield::from_config(&config)?;
//!
//! let request = TransactionRequest::new(1, safe, multi_send, calldata)
//!     .with_operation(Operation::DelegateCall);
//! let response = shield.analyze_transaction(&request).await?;
//!
//! for (address, findings) in &response.recipient {
//!     println!("{address}: {:?}", findings.max_severity());
//! }
//! ```
//!
//! ## Collaborators
//!
//! The analysis core only talks to the traits in [`services`]. The crate ships
//! HTTP clients for the Safe Transaction Service and Blockaid, a local
//! calldata decoder and an in-memory cache; tests and embedders can swap any
//! of them.

pub mod analysis;
pub mod chain;
pub mod config;
pub mod contracts;
pub mod decoder;
pub mod encoding;
pub mod error;
pub mod services;
pub mod shield;
pub mod types;

// Re-export main types at crate root
pub use analysis::{
    flatten, AnalysisResponse, AnalysisResult, CounterpartyAnalysis, GroupedResults, Severity,
    StatusGroup, ThreatAnalysisResponse, ThreatRequest,
};
pub use chain::{ChainAddresses, ChainInfo, StaticChainRegistry};
pub use config::ShieldConfig;
pub use decoder::LocalDecoder;
pub use encoding::SafeTxParams;
pub use error::{Error, Result};
pub use shield::{CombinedAnalysis, SafeShield, TransactionRequest};
pub use types::{DataDecoded, DecodedTransaction, Operation, TxInfo};

// Re-export alloy types that are commonly used
pub use alloy::primitives::{Address, Bytes, U256};
