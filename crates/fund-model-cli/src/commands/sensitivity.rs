use clap::Args;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

use fund_model_core::scenario::sensitivity::{
    self, SensitivityInput, SensitivityOutput, SweepDimension,
};
use fund_model_core::types::{ComputationOutput, SensitivityVariable};

use super::ModelArgs;

/// Arguments for a sensitivity sweep
#[derive(Args)]
pub struct SensitivityArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    /// Dimension to sweep: property-value or a control id (e.g. loanRatePct)
    #[arg(long, default_value = "property-value")]
    pub dimension: String,

    /// Sweep start (defaults to the dimension's table range)
    #[arg(long, allow_hyphen_values = true)]
    pub min: Option<Decimal>,

    /// Sweep end
    #[arg(long, allow_hyphen_values = true)]
    pub max: Option<Decimal>,

    /// Sweep increment
    #[arg(long)]
    pub step: Option<Decimal>,
}

#[derive(Debug, Serialize)]
struct SweepTable {
    dimension: String,
    selected_index: Option<usize>,
    results: Vec<SweepTableRow>,
    warnings: Vec<String>,
}

#[derive(Debug, Serialize)]
struct SweepTableRow {
    key: Decimal,
    selected: bool,
    yr10_nav: Decimal,
    gross_irr: Decimal,
    lp_net_irr: Decimal,
    lp_net_moic: Decimal,
    lp_net_profit: Decimal,
    gp_carry: Decimal,
}

pub fn run_sensitivity(args: SensitivityArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let dimension: SweepDimension = args.dimension.parse()?;
    let scenario = args.model.to_input()?;

    let default_range = dimension.default_range();
    let range = SensitivityVariable {
        name: default_range.name,
        min: args.min.unwrap_or(default_range.min),
        max: args.max.unwrap_or(default_range.max),
        step: args.step.unwrap_or(default_range.step),
    };

    let controls = scenario.effective_controls();
    let input = SensitivityInput {
        mode: scenario.mode,
        controls,
        overrides: scenario.overrides,
        terms: scenario.terms,
        dimension,
        range: Some(range),
    };
    let output = sensitivity::run_sensitivity(&input)?;
    Ok(serde_json::to_value(sweep_table(output))?)
}

/// One flat row per swept value, so table and csv output get a column each.
fn sweep_table(output: ComputationOutput<SensitivityOutput>) -> SweepTable {
    let results = output
        .result
        .rows
        .iter()
        .map(|row| SweepTableRow {
            key: row.key,
            selected: row.is_selected,
            yr10_nav: row.result.nav_series.last().copied().unwrap_or_default(),
            gross_irr: row.result.gross_irr.round_dp(6),
            lp_net_irr: row.result.lp_net_irr.round_dp(6),
            lp_net_moic: row.result.lp_net_moic.round_dp(6),
            lp_net_profit: row.result.lp_net_profit.round_dp(6),
            gp_carry: row.result.gp_carry.round_dp(6),
        })
        .collect();

    SweepTable {
        dimension: output.result.dimension.to_string(),
        selected_index: output.result.selected_index,
        results,
        warnings: output.warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fund_model_core::scenario::{ControlId, ScenarioControls, ScenarioMode, ScenarioOverrides};
    use rust_decimal_macros::dec;

    fn run(dimension: SweepDimension) -> SweepTable {
        let input = SensitivityInput {
            mode: ScenarioMode::Detailed,
            controls: ScenarioControls::default(),
            overrides: ScenarioOverrides::default(),
            terms: None,
            dimension,
            range: None,
        };
        sweep_table(sensitivity::run_sensitivity(&input).unwrap())
    }

    #[test]
    fn test_property_sweep_rows() {
        let table = run(SweepDimension::PropertyValue);
        let keys: Vec<Decimal> = table.results.iter().map(|row| row.key).collect();
        assert_eq!(
            keys,
            vec![dec!(10), dec!(15), dec!(20), dec!(25), dec!(30), dec!(35), dec!(40)]
        );
        assert_eq!(table.selected_index, Some(2));
        assert!(table.results[2].selected);
        assert_eq!(table.results.iter().filter(|row| row.selected).count(), 1);
        assert_eq!(table.dimension, "propertyValue");
    }

    #[test]
    fn test_rows_serialize_flat() {
        let table = run(SweepDimension::Control(ControlId::StructuralLongReturnPct));
        let value = serde_json::to_value(&table).unwrap();
        let first = value["results"][0].as_object().unwrap();
        assert!(first.values().all(|v| !v.is_object() && !v.is_array()));
        assert!(first.contains_key("lp_net_irr"));
        assert_eq!(value["selected_index"], 7);
    }
}
