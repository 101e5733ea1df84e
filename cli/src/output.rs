use alloy::primitives::Address;
use safe_shield::analysis::{AnalysisResult, Status};
use safe_shield::{AnalysisResponse, CounterpartyAnalysis, GroupedResults, ThreatAnalysisResponse};
use serde::Serialize;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisOutput<'a> {
    pub chain_id: u64,
    pub safe: Address,
    #[serde(flatten)]
    pub results: &'a CounterpartyAnalysis,
}

impl AnalysisOutput<'_> {
    pub fn print(&self, json: bool) {
        if json {
            println!("{}", serde_json::to_string_pretty(self).unwrap());
            return;
        }

        println!("Safe: {} (chain {})", self.safe, self.chain_id);
        if self.results.is_empty() {
            println!("No counterparties to report.");
            return;
        }

        print_section("Recipients", &self.results.recipient);
        print_section("Contracts", &self.results.contract);
    }
}

fn print_section(title: &str, response: &AnalysisResponse) {
    if response.is_empty() {
        return;
    }

    println!();
    println!("{}:", title);
    for (address, grouped) in response {
        match grouped.max_severity() {
            Some(severity) => println!("{} [{}]", address, severity),
            None => println!("{}", address),
        }
        print_grouped(grouped);
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreatOutput<'a> {
    pub chain_id: u64,
    pub safe: Address,
    #[serde(flatten)]
    pub response: &'a ThreatAnalysisResponse,
}

impl ThreatOutput<'_> {
    pub fn print(&self, json: bool) {
        if json {
            println!("{}", serde_json::to_string_pretty(self).unwrap());
            return;
        }

        println!("Safe: {} (chain {})", self.safe, self.chain_id);
        if let Some(request_id) = &self.response.request_id {
            println!("Scan: {}", request_id);
        }

        println!();
        println!("Threats:");
        print_results(&self.response.threat);

        if !self.response.balance_change.is_empty() {
            println!();
            println!("Balance changes:");
            for change in &self.response.balance_change {
                let label = change
                    .asset
                    .symbol
                    .as_deref()
                    .or(change.asset.name.as_deref())
                    .unwrap_or("unknown asset");
                println!("  {}", label);
                for diff in &change.incoming {
                    println!("    + {:?}", diff);
                }
                for diff in &change.outgoing {
                    println!("    - {:?}", diff);
                }
            }
        }
    }
}

fn print_grouped(grouped: &GroupedResults) {
    print_results(&grouped.recipient_interaction);
    print_results(&grouped.recipient_activity);
    print_results(&grouped.bridge);
    print_results(&grouped.contract_verification);
    print_results(&grouped.contract_interaction);
    print_results(&grouped.delegatecall);
}

fn print_results<S: Status>(results: &[AnalysisResult<S>]) {
    for result in results {
        println!("  {:<8} {:<22} {}", result.severity, S::GROUP, result.title);
        println!("  {:<31} {}", "", result.description);
        if let Some(chain_id) = result.target_chain_id {
            println!("  {:<31} Target chain: {}", "", chain_id);
        }
        if let (Some(before), Some(after)) = (result.before, result.after) {
            println!("  {:<31} Mastercopy: {} -> {}", "", before, after);
        }
        if let Some(error) = &result.error {
            println!("  {:<31} Error: {}", "", error);
        }
    }
}
