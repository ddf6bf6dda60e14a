use std::str::FromStr;

use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;

use fund_model_core::presentation::{self, DeckView};
use fund_model_core::scenario::{self, ControlId, FundTerms, ScenarioControls, CONTROL_SPECS};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Scenario
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_scenario(input_json: String) -> NapiResult<String> {
    let input: scenario::ScenarioInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = scenario::run_scenario(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn build_sensitivity(input_json: String) -> NapiResult<String> {
    let input: scenario::sensitivity::SensitivityInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = scenario::run_sensitivity(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Controls
// ---------------------------------------------------------------------------

#[napi]
pub fn scenario_controls() -> NapiResult<String> {
    serde_json::to_string(&CONTROL_SPECS).map_err(to_napi_error)
}

/// Slider value as the UI would hold it: clamped and rounded to the step.
#[napi]
pub fn snap_control(id: String, value: String) -> NapiResult<String> {
    let id = ControlId::from_str(&id).map_err(to_napi_error)?;
    let value = Decimal::from_str(&value).map_err(to_napi_error)?;
    Ok(id.spec().snap(value).to_string())
}

// ---------------------------------------------------------------------------
// Presentation
// ---------------------------------------------------------------------------

#[napi]
pub fn deck_view(input_json: String, view: String) -> NapiResult<String> {
    let input: scenario::ScenarioInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let view = match view.as_str() {
        "investor" => DeckView::Investor,
        "internal" => DeckView::Internal,
        other => {
            return Err(napi::Error::from_reason(format!(
                "unknown deck view '{other}' (expected investor or internal)"
            )))
        }
    };
    let slide = presentation::deck_slide(&input, view).map_err(to_napi_error)?;
    serde_json::to_string(&slide).map_err(to_napi_error)
}

#[derive(serde::Deserialize)]
struct ChartBindingInput {
    #[serde(default)]
    controls: ScenarioControls,
    #[serde(default)]
    terms: FundTerms,
}

/// Chart series only, for redrawing while a slider is dragged.
#[napi]
pub fn chart_series(input_json: String) -> NapiResult<String> {
    let input: ChartBindingInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    input.terms.validate().map_err(to_napi_error)?;
    let series = presentation::chart_for(&input.terms, &input.controls);
    serde_json::to_string(&series).map_err(to_napi_error)
}
