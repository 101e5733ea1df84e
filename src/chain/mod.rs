//! Chain configuration and registry

mod config;
mod registry;

pub use config::{chain_ids, ChainAddresses, ChainInfo};
pub use registry::StaticChainRegistry;
