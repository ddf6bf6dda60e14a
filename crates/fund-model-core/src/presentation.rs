//! Formatting and chart wiring for the deck's scenario slides.
//!
//! Everything here is a pure view over a [`ScenarioResult`]; the engine never
//! depends on it.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::scenario::engine::{calculate_scenario_with_terms, run_scenario, ScenarioInput};
use crate::scenario::sensitivity::{sweep, SensitivityRow, SweepDimension};
use crate::scenario::terms::{FundTerms, HOLD_YEARS};
use crate::scenario::{ControlId, ScenarioControls, ScenarioResult};
use crate::types::*;
use crate::FundModelResult;

// ---------------------------------------------------------------------------
// Number formatting
// ---------------------------------------------------------------------------

fn fixed(value: Decimal, dp: u32) -> String {
    let rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.*}", dp as usize, rounded)
}

/// 0.1234 -> "12.3%"
pub fn format_percent(rate: Rate) -> String {
    format!("{}%", fixed(rate * dec!(100), 1))
}

/// 2.155 -> "2.16x"
pub fn format_moic(multiple: Multiple) -> String {
    format!("{}x", fixed(multiple, 2))
}

/// -1.234 -> "-$1.23M"
pub fn format_money_millions(value: Money) -> String {
    let sign = if value < Decimal::ZERO { "-" } else { "" };
    format!("{sign}${}M", fixed(value.abs(), 2))
}

/// Slider readout: 5 -> "+5.0%"
pub fn format_control_value(value: Decimal) -> String {
    let sign = if value > Decimal::ZERO { "+" } else { "" };
    format!("{sign}{}%", fixed(value, 1))
}

fn format_ratio(value: Option<Decimal>) -> String {
    value.map_or_else(|| "n/a".to_string(), format_moic)
}

// ---------------------------------------------------------------------------
// Chart and card models
// ---------------------------------------------------------------------------

/// "Yr 0" .. "Yr 10"
pub fn year_labels() -> Vec<String> {
    (0..=HOLD_YEARS).map(|year| format!("Yr {year}")).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub label: String,
    pub data: Vec<Money>,
}

pub fn chart_series(result: &ScenarioResult) -> Vec<ChartSeries> {
    vec![
        ChartSeries {
            label: "Portfolio NAV".into(),
            data: result.nav_series.clone(),
        },
        ChartSeries {
            label: "Real estate".into(),
            data: result.real_estate_series.clone(),
        },
        ChartSeries {
            label: "Structural long + cash".into(),
            data: result.structural_long_series.clone(),
        },
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardTone {
    Primary,
    Secondary,
    Caution,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricCard {
    pub key: String,
    pub label: String,
    pub tone: CardTone,
    pub value: String,
}

fn card(key: &str, label: &str, tone: CardTone, value: String) -> MetricCard {
    MetricCard {
        key: key.into(),
        label: label.into(),
        tone,
        value,
    }
}

/// The six headline cards on the investor slide.
pub fn headline_cards(result: &ScenarioResult) -> Vec<MetricCard> {
    vec![
        card("grossIrr", "Gross IRR", CardTone::Primary, format_percent(result.gross_irr)),
        card("grossMoic", "Gross MOIC", CardTone::Primary, format_moic(result.gross_moic)),
        card("lpNetIrr", "LP Net IRR", CardTone::Secondary, format_percent(result.lp_net_irr)),
        card("lpNetMoic", "LP Net MOIC", CardTone::Secondary, format_moic(result.lp_net_moic)),
        card(
            "lpNetProfit",
            "LP Net Profit",
            CardTone::Secondary,
            format_money_millions(result.lp_net_profit),
        ),
        card("gpCarry", "GP Carry", CardTone::Caution, format_money_millions(result.gp_carry)),
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailRow {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailGroup {
    pub title: String,
    pub rows: Vec<DetailRow>,
}

fn group(title: &str, rows: Vec<(&str, String)>) -> DetailGroup {
    DetailGroup {
        title: title.into(),
        rows: rows
            .into_iter()
            .map(|(label, value)| DetailRow {
                label: label.into(),
                value,
            })
            .collect(),
    }
}

fn with_ratio(amount: Money, ratio: Multiple) -> String {
    format!("{} ({})", format_money_millions(amount), format_percent(ratio))
}

/// GP-only detail panel: capital split, coverage and stress figures.
pub fn internal_detail(
    terms: &FundTerms,
    controls: &ScenarioControls,
    result: &ScenarioResult,
) -> Vec<DetailGroup> {
    vec![
        group(
            "Fund Structure",
            vec![
                ("LP Capital", format_money_millions(terms.lp_capital)),
                ("Property Value", format_money_millions(result.property_value)),
                (
                    "Loan",
                    format!(
                        "{} at {} LTV",
                        format_money_millions(result.loan_principal),
                        format_percent(terms.max_ltv)
                    ),
                ),
                ("Loan Rate", format_control_value(controls.loan_rate_pct)),
                ("Upfront Costs", format_money_millions(result.upfront_costs)),
                ("Management Fee", format_percent(terms.management_fee_rate)),
            ],
        ),
        group(
            "Day-1 Capital",
            vec![
                ("Real Estate Equity", format_money_millions(result.day1_re_equity)),
                ("Structural Long", format_money_millions(result.day1_structural_long)),
                ("Debt Service Reserve", format_money_millions(result.day1_reserve)),
            ],
        ),
        group(
            "Year-1 Operations",
            vec![
                ("NOI", format_money_millions(result.year1_noi)),
                ("Debt Service", format_money_millions(result.annual_debt_service)),
                ("DSCR", format_ratio(result.year1_dscr)),
                ("Management Fee", format_money_millions(result.year1_management_fee)),
                ("Fee Coverage", format_ratio(result.year1_fee_coverage)),
                ("Post-Fee Surplus", format_money_millions(result.year1_post_fee_surplus)),
            ],
        ),
        group(
            "10-Year Returns",
            vec![
                ("Gross IRR", format_percent(result.gross_irr)),
                ("Gross MOIC", format_moic(result.gross_moic)),
                ("LP Net IRR", format_percent(result.lp_net_irr)),
                ("LP Net MOIC", format_moic(result.lp_net_moic)),
                ("LP Net Profit", format_money_millions(result.lp_net_profit)),
                ("GP Carry", format_money_millions(result.gp_carry)),
                ("Exit Property Value", format_money_millions(result.exit_property_value)),
                ("Yr-10 Loan Balance", format_money_millions(result.year10_loan_balance)),
            ],
        ),
        group(
            "Stress",
            vec![
                (
                    "RE Decline to Breach",
                    format!("{}%", fixed(result.re_decline_to_breach_pct, 1)),
                ),
                (
                    "Capital Left if Structural Long -100%",
                    with_ratio(result.sl_wipeout_capital_left, result.sl_wipeout_capital_ratio),
                ),
                (
                    "Capital Left if Structural Long -100% and RE -30%",
                    with_ratio(
                        result.combined_shock_capital_left,
                        result.combined_shock_capital_ratio,
                    ),
                ),
            ],
        ),
    ]
}

/// One formatted row of the internal sensitivity table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityTableRow {
    pub key: String,
    pub yr10_nav: String,
    pub gross_irr: String,
    pub lp_net_irr: String,
    pub lp_moic: String,
    pub lp_net_profit: String,
    pub gp_carry: String,
    pub is_selected: bool,
}

pub fn sensitivity_table(
    dimension: SweepDimension,
    rows: &[SensitivityRow],
) -> Vec<SensitivityTableRow> {
    rows.iter()
        .map(|row| SensitivityTableRow {
            key: match dimension {
                SweepDimension::PropertyValue => format_money_millions(row.key),
                SweepDimension::Control(_) => format_control_value(row.key),
            },
            yr10_nav: format_money_millions(
                row.result.nav_series.last().copied().unwrap_or_default(),
            ),
            gross_irr: format_percent(row.result.gross_irr),
            lp_net_irr: format_percent(row.result.lp_net_irr),
            lp_moic: format_moic(row.result.lp_net_moic),
            lp_net_profit: format_money_millions(row.result.lp_net_profit),
            gp_carry: format_money_millions(row.result.gp_carry),
            is_selected: row.is_selected,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Slide bundles
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeckView {
    /// LP-facing slide: chart and headline cards
    #[default]
    Investor,
    /// GP-only decision lens: adds detail panel and sensitivity table
    Internal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlReadout {
    pub id: ControlId,
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeckSlide {
    pub view: DeckView,
    pub controls: Vec<ControlReadout>,
    pub labels: Vec<String>,
    pub series: Vec<ChartSeries>,
    pub cards: Vec<MetricCard>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<Vec<DetailGroup>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sensitivity: Option<Vec<SensitivityTableRow>>,
    pub warnings: Vec<String>,
}

/// Build everything a scenario slide renders from one input.
pub fn deck_slide(input: &ScenarioInput, view: DeckView) -> FundModelResult<DeckSlide> {
    let output = run_scenario(input)?;
    let terms = input.effective_terms();
    let controls = input.effective_controls();
    let result = &output.result;

    let readouts = ControlId::ALL
        .into_iter()
        .map(|id| ControlReadout {
            id,
            label: id.spec().label.to_string(),
            value: format_control_value(controls.get(id)),
        })
        .collect();

    let (detail, sensitivity) = match view {
        DeckView::Investor => (None, None),
        DeckView::Internal => {
            let dimension = SweepDimension::PropertyValue;
            let rows = sweep(
                &terms,
                &controls,
                &input.overrides,
                dimension,
                &dimension.default_range(),
            )?;
            (
                Some(internal_detail(&terms, &controls, result)),
                Some(sensitivity_table(dimension, &rows)),
            )
        }
    };

    Ok(DeckSlide {
        view,
        controls: readouts,
        labels: year_labels(),
        series: chart_series(result),
        cards: headline_cards(result),
        detail,
        sensitivity,
        warnings: output.warnings,
    })
}

/// Chart-ready series for a bare set of controls under `terms`.
pub fn chart_for(terms: &FundTerms, controls: &ScenarioControls) -> Vec<ChartSeries> {
    chart_series(&calculate_scenario_with_terms(terms, controls, None))
}
