use clap::Args;
use serde_json::Value;

use fund_model_core::scenario::engine;

use super::ModelArgs;

/// Arguments for a single scenario run
#[derive(Args)]
pub struct ScenarioArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    /// Omit the per-year ledger from the output
    #[arg(long)]
    pub no_ledger: bool,
}

pub fn run_scenario(args: ScenarioArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let input = args.model.to_input()?;
    let mut result = engine::run_scenario(&input)?;
    if args.no_ledger {
        result.result.years.clear();
    }
    Ok(serde_json::to_value(result)?)
}
