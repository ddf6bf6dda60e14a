pub mod controls;
pub mod debt;
pub mod engine;
pub mod sensitivity;
pub mod terms;
pub mod waterfall;

pub use controls::{ControlId, ControlSpec, ScenarioControls, CONTROL_SPECS};
pub use engine::{
    calculate_scenario, calculate_scenario_with_terms, run_scenario, ScenarioInput, ScenarioMode,
    ScenarioOverrides, ScenarioResult,
};
pub use sensitivity::{build_sensitivity_rows, run_sensitivity, SensitivityRow, SweepDimension};
pub use terms::FundTerms;
