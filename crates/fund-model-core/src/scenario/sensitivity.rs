use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use crate::error::FundModelError;
use crate::types::*;
use crate::FundModelResult;

use super::controls::{ControlId, ScenarioControls};
use super::engine::{
    calculate_scenario_with_terms, ScenarioMode, ScenarioOverrides, ScenarioResult,
};
use super::terms::FundTerms;

/// Internal table sweep over acquisition size ($M).
pub const INTERNAL_PROPERTY_MIN_M: Money = dec!(10);
pub const INTERNAL_PROPERTY_MAX_M: Money = dec!(40);
pub const INTERNAL_PROPERTY_STEP_M: Money = dec!(5);

/// Internal table sweep over the structural-long return (%).
pub const INTERNAL_RETURN_MIN_PCT: Decimal = dec!(-20);
pub const INTERNAL_RETURN_MAX_PCT: Decimal = dec!(50);
pub const INTERNAL_RETURN_STEP_PCT: Decimal = dec!(5);

/// Rate controls sweep their full slider range at this step, which lands on
/// every declared default.
const RATE_SWEEP_STEP_PCT: Decimal = dec!(0.5);
const MAX_SWEEP_POINTS: usize = 1_000;

/// Input dimension varied by a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepDimension {
    PropertyValue,
    Control(ControlId),
}

impl fmt::Display for SweepDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SweepDimension::PropertyValue => f.write_str("propertyValue"),
            SweepDimension::Control(id) => write!(f, "{id}"),
        }
    }
}

impl FromStr for SweepDimension {
    type Err = FundModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['_', '-'], "").as_str() {
            "propertyvalue" | "property" => Ok(SweepDimension::PropertyValue),
            _ => s.parse().map(SweepDimension::Control),
        }
    }
}

impl SweepDimension {
    /// Table range used when the caller does not give one. Each grid
    /// contains the dimension's default so the base case is highlighted.
    pub fn default_range(&self) -> SensitivityVariable {
        match self {
            SweepDimension::PropertyValue => SensitivityVariable {
                name: self.to_string(),
                min: INTERNAL_PROPERTY_MIN_M,
                max: INTERNAL_PROPERTY_MAX_M,
                step: INTERNAL_PROPERTY_STEP_M,
            },
            SweepDimension::Control(ControlId::StructuralLongReturnPct) => SensitivityVariable {
                name: self.to_string(),
                min: INTERNAL_RETURN_MIN_PCT,
                max: INTERNAL_RETURN_MAX_PCT,
                step: INTERNAL_RETURN_STEP_PCT,
            },
            SweepDimension::Control(id) => {
                let spec = id.spec();
                SensitivityVariable {
                    name: self.to_string(),
                    min: spec.min,
                    max: spec.max,
                    step: RATE_SWEEP_STEP_PCT,
                }
            }
        }
    }

    /// Value of this dimension in the current state.
    fn current(
        &self,
        terms: &FundTerms,
        controls: &ScenarioControls,
        overrides: &ScenarioOverrides,
    ) -> Decimal {
        match self {
            SweepDimension::PropertyValue => {
                overrides.property_value.unwrap_or(terms.property_value)
            }
            SweepDimension::Control(ControlId::ExitCapRatePct) => overrides
                .exit_cap_rate_pct
                .unwrap_or(controls.exit_cap_rate_pct),
            SweepDimension::Control(id) => controls.get(*id),
        }
    }
}

/// One row of a sweep table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityRow {
    /// Value of the swept dimension
    pub key: Decimal,
    /// True when `key` equals the current slider/terms value
    pub is_selected: bool,
    pub result: ScenarioResult,
}

/// Input for a validated sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityInput {
    #[serde(default)]
    pub mode: ScenarioMode,
    #[serde(default)]
    pub controls: ScenarioControls,
    #[serde(default)]
    pub overrides: ScenarioOverrides,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terms: Option<FundTerms>,
    pub dimension: SweepDimension,
    /// Defaults to the dimension's table range
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<SensitivityVariable>,
}

/// Output of a validated sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityOutput {
    pub dimension: SweepDimension,
    pub values: Vec<Decimal>,
    pub selected_index: Option<usize>,
    pub rows: Vec<SensitivityRow>,
}

/// Generate the sweep values for a variable from min to max with step.
pub fn sweep_values(var: &SensitivityVariable) -> FundModelResult<Vec<Decimal>> {
    if var.step <= Decimal::ZERO {
        return Err(FundModelError::InvalidInput {
            field: format!("variable:{}", var.name),
            reason: "Step must be positive".into(),
        });
    }
    if var.min > var.max {
        return Err(FundModelError::InvalidInput {
            field: format!("variable:{}", var.name),
            reason: "Min must be <= max".into(),
        });
    }
    let points = ((var.max - var.min) / var.step).floor();
    if points >= Decimal::from(MAX_SWEEP_POINTS) {
        return Err(FundModelError::InvalidInput {
            field: format!("variable:{}", var.name),
            reason: format!("Sweep would exceed {MAX_SWEEP_POINTS} points"),
        });
    }

    // Multiply rather than accumulate so keys stay exact
    let mut values = Vec::new();
    let mut i = 0u32;
    loop {
        let current = var.min + var.step * Decimal::from(i);
        if current > var.max {
            break;
        }
        values.push(current.normalize());
        i += 1;
    }
    // Ensure max is included if step doesn't land exactly on it
    if let Some(&last) = values.last() {
        if last < var.max {
            values.push(var.max.normalize());
        }
    }

    Ok(values)
}

/// Sweep property value across the internal table range with every control
/// held fixed. Each row's `result.property_value` equals its key.
pub fn build_sensitivity_rows(controls: &ScenarioControls) -> Vec<SensitivityRow> {
    let terms = FundTerms::default();
    let mut values = Vec::new();
    let mut current = INTERNAL_PROPERTY_MIN_M;
    while current <= INTERNAL_PROPERTY_MAX_M {
        values.push(current);
        current += INTERNAL_PROPERTY_STEP_M;
    }
    evaluate_rows(
        &terms,
        controls,
        &ScenarioOverrides::default(),
        SweepDimension::PropertyValue,
        &values,
    )
}

/// Sweep any dimension over an explicit range.
pub fn sweep(
    terms: &FundTerms,
    controls: &ScenarioControls,
    overrides: &ScenarioOverrides,
    dimension: SweepDimension,
    range: &SensitivityVariable,
) -> FundModelResult<Vec<SensitivityRow>> {
    let values = sweep_values(range)?;
    Ok(evaluate_rows(terms, controls, overrides, dimension, &values))
}

fn evaluate_rows(
    terms: &FundTerms,
    controls: &ScenarioControls,
    overrides: &ScenarioOverrides,
    dimension: SweepDimension,
    values: &[Decimal],
) -> Vec<SensitivityRow> {
    let selected = dimension.current(terms, controls, overrides);
    values
        .iter()
        .map(|&key| {
            let (row_controls, row_overrides) = match dimension {
                SweepDimension::PropertyValue => (
                    *controls,
                    ScenarioOverrides {
                        property_value: Some(key),
                        ..*overrides
                    },
                ),
                SweepDimension::Control(ControlId::ExitCapRatePct) => (
                    controls.with(ControlId::ExitCapRatePct, key),
                    ScenarioOverrides {
                        exit_cap_rate_pct: None,
                        ..*overrides
                    },
                ),
                SweepDimension::Control(id) => (controls.with(id, key), *overrides),
            };
            SensitivityRow {
                key,
                is_selected: key == selected,
                result: calculate_scenario_with_terms(terms, &row_controls, Some(&row_overrides)),
            }
        })
        .collect()
}

/// Validate and run a sweep, wrapped with metadata.
pub fn run_sensitivity(
    input: &SensitivityInput,
) -> FundModelResult<ComputationOutput<SensitivityOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let terms = input.terms.clone().unwrap_or_else(|| input.mode.terms());
    terms.validate()?;

    let range = input
        .range
        .clone()
        .unwrap_or_else(|| input.dimension.default_range());
    if let SweepDimension::Control(id) = input.dimension {
        let spec = id.spec();
        if range.min < spec.min || range.max > spec.max {
            warnings.push(format!(
                "Sweep range [{}, {}] exceeds {id} bounds [{}, {}]; rows outside are extrapolations",
                range.min, range.max, spec.min, spec.max
            ));
        }
    }
    if input.dimension == SweepDimension::PropertyValue && range.min < Decimal::ZERO {
        return Err(FundModelError::InvalidInput {
            field: "range.min".into(),
            reason: "Property value cannot be negative".into(),
        });
    }

    let rows = sweep(
        &terms,
        &input.controls,
        &input.overrides,
        input.dimension,
        &range,
    )?;
    let values: Vec<Decimal> = rows.iter().map(|row| row.key).collect();
    let selected_index = rows.iter().position(|row| row.is_selected);

    for warning in &warnings {
        tracing::warn!(%warning, "sensitivity warning");
    }
    tracing::debug!(
        dimension = %input.dimension,
        rows = rows.len(),
        "sensitivity sweep evaluated"
    );

    let output = SensitivityOutput {
        dimension: input.dimension,
        values,
        selected_index,
        rows,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Fund Scenario Sensitivity Sweep",
        &serde_json::json!({
            "dimension": input.dimension.to_string(),
            "range": range,
            "mode": input.mode,
        }),
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::engine::calculate_scenario;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_property_sweep_coverage() {
        let rows = build_sensitivity_rows(&ScenarioControls::default());
        let keys: Vec<Decimal> = rows.iter().map(|r| r.key).collect();
        assert_eq!(
            keys,
            vec![dec!(10), dec!(15), dec!(20), dec!(25), dec!(30), dec!(35), dec!(40)]
        );
        for row in &rows {
            assert_eq!(row.result.property_value, row.key);
        }
    }

    #[test]
    fn test_property_sweep_selects_base_value() {
        let rows = build_sensitivity_rows(&ScenarioControls::default());
        let selected: Vec<Decimal> = rows.iter().filter(|r| r.is_selected).map(|r| r.key).collect();
        assert_eq!(selected, vec![dec!(20)]);
        let base = rows.iter().find(|r| r.is_selected).unwrap();
        assert_eq!(base.result, calculate_scenario(&ScenarioControls::default(), None));
    }

    #[test]
    fn test_property_sweep_is_restartable() {
        let controls = ScenarioControls::default();
        assert_eq!(build_sensitivity_rows(&controls), build_sensitivity_rows(&controls));
    }

    #[test]
    fn test_sweep_values() {
        let var = SensitivityVariable {
            name: "test".into(),
            min: dec!(1),
            max: dec!(5),
            step: dec!(1),
        };
        let vals = sweep_values(&var).unwrap();
        assert_eq!(vals, vec![dec!(1), dec!(2), dec!(3), dec!(4), dec!(5)]);
    }

    #[test]
    fn test_sweep_with_non_exact_step() {
        let var = SensitivityVariable {
            name: "test".into(),
            min: dec!(0),
            max: dec!(1),
            step: dec!(0.3),
        };
        let vals = sweep_values(&var).unwrap();
        // 0, 0.3, 0.6, 0.9, 1.0 (max appended)
        assert_eq!(vals.len(), 5);
        assert_eq!(*vals.last().unwrap(), dec!(1));
    }

    #[test]
    fn test_invalid_step() {
        let var = SensitivityVariable {
            name: "bad".into(),
            min: dec!(0),
            max: dec!(1),
            step: dec!(0),
        };
        assert!(sweep_values(&var).is_err());

        let inverted = SensitivityVariable {
            name: "bad".into(),
            min: dec!(2),
            max: dec!(1),
            step: dec!(0.5),
        };
        assert!(sweep_values(&inverted).is_err());
    }

    #[test]
    fn test_too_many_points() {
        let var = SensitivityVariable {
            name: "dense".into(),
            min: dec!(0),
            max: dec!(100),
            step: dec!(0.01),
        };
        assert!(sweep_values(&var).is_err());
    }

    #[test]
    fn test_control_sweep_default_range() {
        let range = SweepDimension::Control(ControlId::StructuralLongReturnPct).default_range();
        let vals = sweep_values(&range).unwrap();
        assert_eq!(vals.len(), 15);
        assert_eq!(vals[0], dec!(-20));
        assert_eq!(vals[7], dec!(15));
        assert_eq!(vals[14], dec!(50));

        let range = SweepDimension::Control(ControlId::EntryCapRatePct).default_range();
        let vals = sweep_values(&range).unwrap();
        assert_eq!(vals.len(), 13);
        assert_eq!(vals[5], dec!(6.5));
    }

    #[test]
    fn test_default_control_sweeps_select_base_case() {
        for id in ControlId::ALL {
            let input = SensitivityInput {
                mode: ScenarioMode::Detailed,
                controls: ScenarioControls::default(),
                overrides: ScenarioOverrides::default(),
                terms: None,
                dimension: SweepDimension::Control(id),
                range: None,
            };
            let output = run_sensitivity(&input).unwrap();
            let index = output
                .result
                .selected_index
                .unwrap_or_else(|| panic!("{id}: no row at the default value"));
            assert_eq!(output.result.values[index], id.spec().default_value);
            assert!(output.warnings.is_empty(), "{id}: {:?}", output.warnings);
        }
    }

    #[test]
    fn test_control_sweep_applies_value() {
        let dimension = SweepDimension::Control(ControlId::StructuralLongReturnPct);
        let rows = sweep(
            &FundTerms::default(),
            &ScenarioControls::default(),
            &ScenarioOverrides::default(),
            dimension,
            &SensitivityVariable {
                name: dimension.to_string(),
                min: dec!(-20),
                max: dec!(50),
                step: dec!(5),
            },
        )
        .unwrap();
        assert_eq!(rows.len(), 15);
        // Higher structural return never lowers terminal value
        assert!(rows
            .windows(2)
            .all(|w| w[1].result.total_value >= w[0].result.total_value));
        let selected: Vec<Decimal> = rows.iter().filter(|r| r.is_selected).map(|r| r.key).collect();
        assert_eq!(selected, vec![dec!(15)]);
    }

    #[test]
    fn test_exit_cap_sweep_ignores_override() {
        let overrides = ScenarioOverrides {
            property_value: None,
            exit_cap_rate_pct: Some(dec!(9)),
        };
        let rows = sweep(
            &FundTerms::default(),
            &ScenarioControls::default(),
            &overrides,
            SweepDimension::Control(ControlId::ExitCapRatePct),
            &SensitivityVariable {
                name: "exit".into(),
                min: dec!(5),
                max: dec!(6),
                step: dec!(1),
            },
        )
        .unwrap();
        assert_eq!(rows[0].result.exit_property_value, rows[0].result.years[9].noi / dec!(0.05));
        assert_ne!(rows[0].result.total_value, rows[1].result.total_value);
    }

    #[test]
    fn test_parse_dimension() {
        assert_eq!(
            "property-value".parse::<SweepDimension>().unwrap(),
            SweepDimension::PropertyValue
        );
        assert_eq!(
            "loanRatePct".parse::<SweepDimension>().unwrap(),
            SweepDimension::Control(ControlId::LoanRatePct)
        );
        assert!("nonsense".parse::<SweepDimension>().is_err());
    }

    #[test]
    fn test_run_sensitivity() {
        let input = SensitivityInput {
            mode: ScenarioMode::Detailed,
            controls: ScenarioControls::default(),
            overrides: ScenarioOverrides::default(),
            terms: None,
            dimension: SweepDimension::PropertyValue,
            range: None,
        };
        let output = run_sensitivity(&input).unwrap();
        assert_eq!(output.result.values.len(), 7);
        assert_eq!(output.result.selected_index, Some(2));
        assert!(output.warnings.is_empty());
    }

    #[test]
    fn test_run_sensitivity_warns_outside_bounds() {
        let input = SensitivityInput {
            mode: ScenarioMode::Simple,
            controls: ScenarioControls::default(),
            overrides: ScenarioOverrides::default(),
            terms: None,
            dimension: SweepDimension::Control(ControlId::StructuralLongReturnPct),
            range: Some(SensitivityVariable {
                name: "ret".into(),
                min: dec!(-40),
                max: dec!(60),
                step: dec!(10),
            }),
        };
        let output = run_sensitivity(&input).unwrap();
        assert_eq!(output.result.rows.len(), 11);
        assert_eq!(output.warnings.len(), 1);
    }
}
