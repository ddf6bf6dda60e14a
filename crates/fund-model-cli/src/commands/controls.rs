use clap::Args;
use serde_json::Value;

use fund_model_core::scenario::CONTROL_SPECS;

/// Arguments for listing scenario controls
#[derive(Args)]
pub struct ControlsArgs {
    /// Show a single control by id
    #[arg(long)]
    pub id: Option<String>,
}

pub fn run_controls(args: ControlsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    if let Some(ref id) = args.id {
        let id: fund_model_core::scenario::ControlId = id.parse()?;
        return Ok(serde_json::to_value(id.spec())?);
    }
    Ok(serde_json::to_value(&CONTROL_SPECS)?)
}
