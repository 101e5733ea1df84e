//! Transaction analysis
//!
//! Every analyzer turns collaborator failures into `FAILED` findings scoped to
//! the check that failed, so one counterparty's failure never hides the
//! findings for the rest of the batch.

mod cache;
mod contract;
mod flatten;
mod recipient;
mod result;
mod severity;
mod threat;

pub use cache::{CacheKey, CONTRACT_FIELD, RECIPIENT_FIELD};
pub use contract::{extract_contracts, ContractAnalyzer, ContractCounterparty};
pub use flatten::flatten;
pub use recipient::{
    extract_recipient, extract_recipients, is_compatible_deployment, BridgeAnalyzer,
    RecipientAnalyzer,
};
pub use result::{
    merge_responses, sort_by_severity, AnalysisResponse, AnalysisResult, AssetDiff, BalanceChange,
    CounterpartyAnalysis, GroupedResults, ThreatAnalysisResponse,
};
pub use severity::{
    BridgeStatus, ContractInteractionStatus, ContractVerificationStatus, DelegatecallStatus,
    RecipientActivityStatus, RecipientInteractionStatus, Severity, Status, StatusGroup,
    ThreatStatus,
};
pub use threat::{map_scan_response, ThreatAnalyzer, ThreatRequest};
