//! Recipient extraction and analysis

mod analyzer;
mod bridge;
mod extract;

pub use analyzer::RecipientAnalyzer;
pub use bridge::{is_compatible_deployment, BridgeAnalyzer};
pub use extract::{extract_recipient, extract_recipients};
