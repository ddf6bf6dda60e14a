use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::FundModelError;
use crate::time_value::{annualized_return, compound_factor, multiple_of};
use crate::types::*;
use crate::FundModelResult;

use super::controls::ScenarioControls;
use super::debt::Amortization;
use super::terms::{FundTerms, HOLD_YEARS};
use super::waterfall::split_terminal_value;

/// Years at which net horizon returns are reported.
pub const HORIZON_YEARS: [u32; 6] = [1, 2, 3, 5, 7, 10];

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// Replacements applied on top of the slider state, used by sweeps to vary
/// the acquisition size independently of the controls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_value: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_cap_rate_pct: Option<Decimal>,
}

/// Which fund the controls drive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioMode {
    /// Leveraged real estate plus structural-long sleeve (GP view)
    #[default]
    Detailed,
    /// Single compounding return with fees and carry only (LP view)
    Simple,
}

impl ScenarioMode {
    pub fn terms(&self) -> FundTerms {
        match self {
            ScenarioMode::Detailed => FundTerms::default(),
            ScenarioMode::Simple => FundTerms::simple(),
        }
    }
}

/// Input for a validated scenario run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScenarioInput {
    #[serde(default)]
    pub mode: ScenarioMode,
    #[serde(default)]
    pub controls: ScenarioControls,
    #[serde(default)]
    pub overrides: ScenarioOverrides,
    /// Replaces the mode's fund terms entirely when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terms: Option<FundTerms>,
    /// Clamp controls to their declared bounds before running
    #[serde(default)]
    pub snap: bool,
}

impl ScenarioInput {
    pub fn effective_terms(&self) -> FundTerms {
        self.terms.clone().unwrap_or_else(|| self.mode.terms())
    }

    pub fn effective_controls(&self) -> ScenarioControls {
        if self.snap {
            self.controls.snapped()
        } else {
            self.controls
        }
    }
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// One simulated year after all cash flows have been applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearLedger {
    pub year: u32,
    pub noi: Money,
    /// NOI less annual debt service (negative when reserves were drawn)
    pub net_property_cash_flow: Money,
    pub management_fee: Money,
    pub reserve_top_up: Money,
    pub real_estate_value: Money,
    pub structural_long: Money,
    pub reserve_cash: Money,
    pub treasury_cash: Money,
    pub loan_balance: Money,
    pub nav: Money,
}

/// Net return to a given horizon, measured off that year's NAV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HorizonReturn {
    pub years: u32,
    pub label: String,
    pub annualized_return: Rate,
    pub cumulative_return: Rate,
    pub ending_value: Money,
}

/// Output of one simulation run. Amounts in $M.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub property_value: Money,
    pub loan_principal: Money,
    pub upfront_costs: Money,

    /// Years 0..=10
    pub nav_series: Vec<Money>,
    /// Gross property value; NAV subtracts the loan balance
    pub real_estate_series: Vec<Money>,
    /// Structural long plus reserve and treasury cash
    pub structural_long_series: Vec<Money>,

    pub day1_re_equity: Money,
    pub day1_structural_long: Money,
    pub day1_reserve: Money,
    /// Capital the Day-1 uses need beyond commitments (zero when funded)
    pub day1_funding_gap: Money,

    pub year1_noi: Money,
    pub monthly_debt_service: Money,
    pub annual_debt_service: Money,
    /// None when there is no debt service
    pub year1_dscr: Option<Decimal>,
    pub year1_management_fee: Money,
    /// (NOI - debt service) / fee, None when no fee is charged
    pub year1_fee_coverage: Option<Decimal>,
    pub year1_post_fee_surplus: Money,

    pub exit_property_value: Money,
    pub year10_loan_balance: Money,
    pub total_value: Money,
    pub gross_profit: Money,
    pub preferred_hurdle: Money,
    pub gross_irr: Rate,
    pub gross_moic: Multiple,
    pub lp_net_irr: Rate,
    pub lp_net_moic: Multiple,
    pub lp_net_profit: Money,
    pub gp_carry: Money,

    /// Property decline that consumes the equity cushion at a fixed loan balance
    pub re_decline_to_breach_pct: Decimal,
    pub sl_wipeout_capital_left: Money,
    pub sl_wipeout_capital_ratio: Multiple,
    pub combined_shock_capital_left: Money,
    pub combined_shock_capital_ratio: Multiple,

    pub horizons: Vec<HorizonReturn>,
    pub years: Vec<YearLedger>,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Running balances threaded through the yearly fold.
#[derive(Debug, Clone, Copy)]
struct Balances {
    structural_long: Money,
    reserve: Money,
    treasury: Money,
    loan_balance: Money,
}

/// Per-run constants derived on Day 1.
struct Schedule<'a> {
    terms: &'a FundTerms,
    entry_cap: Rate,
    exit_cap: Rate,
    structural_long_return: Rate,
    year1_noi: Money,
    annual_debt_service: Money,
    reserve_target: Money,
    loan: Amortization,
}

/// Run the canonical fund for one set of slider values.
pub fn calculate_scenario(
    controls: &ScenarioControls,
    overrides: Option<&ScenarioOverrides>,
) -> ScenarioResult {
    calculate_scenario_with_terms(&FundTerms::default(), controls, overrides)
}

/// Simulate the 10-year fund under `terms`.
///
/// Inputs outside the declared control bounds are extrapolated, never
/// rejected. Balances are floored at zero; the function cannot fail.
pub fn calculate_scenario_with_terms(
    terms: &FundTerms,
    controls: &ScenarioControls,
    overrides: Option<&ScenarioOverrides>,
) -> ScenarioResult {
    let overrides = overrides.copied().unwrap_or_default();
    let pct = dec!(100);

    let entry_cap = controls.entry_cap_rate_pct / pct;
    let exit_cap = overrides
        .exit_cap_rate_pct
        .unwrap_or(controls.exit_cap_rate_pct)
        / pct;
    let loan_rate = controls.loan_rate_pct / pct;
    let structural_long_return = controls.structural_long_return_pct / pct;

    // --- Day-1 capitalization ---
    let property_value = overrides.property_value.unwrap_or(terms.property_value);
    let loan_principal = property_value * terms.max_ltv;
    let year1_noi = property_value * entry_cap;
    let loan = Amortization::new(loan_principal, loan_rate, terms.amortization_months);
    let annual_debt_service = loan.annual_debt_service();
    let reserve_target = annual_debt_service * Decimal::from(terms.reserve_months) / dec!(12);

    let day1_re_equity = (property_value - loan_principal).max(Decimal::ZERO);
    let unallocated = terms.lp_capital - property_value + loan_principal
        - terms.upfront_costs
        - reserve_target;
    let day1_structural_long = unallocated.max(Decimal::ZERO);
    let day1_funding_gap = (-unallocated).max(Decimal::ZERO);

    // --- Year-1 snapshot ---
    let year1_management_fee = terms.lp_capital * terms.management_fee_rate;
    let year1_dscr = if annual_debt_service.is_zero() {
        None
    } else {
        Some(year1_noi / annual_debt_service)
    };
    let year1_fee_coverage = if year1_management_fee.is_zero() {
        None
    } else {
        Some((year1_noi - annual_debt_service) / year1_management_fee)
    };
    let year1_post_fee_surplus = year1_noi - annual_debt_service - year1_management_fee;

    // --- 10-year simulation ---
    let schedule = Schedule {
        terms,
        entry_cap,
        exit_cap,
        structural_long_return,
        year1_noi,
        annual_debt_service,
        reserve_target,
        loan,
    };
    let opening = Balances {
        structural_long: day1_structural_long,
        reserve: reserve_target,
        treasury: Decimal::ZERO,
        loan_balance: loan_principal,
    };
    let (closing, years) = (1..=HOLD_YEARS).fold(
        (opening, Vec::with_capacity(HOLD_YEARS as usize)),
        |(balances, mut rows), year| {
            let (next, row) = schedule.step(balances, year);
            rows.push(row);
            (next, rows)
        },
    );

    let mut nav_series = Vec::with_capacity(HOLD_YEARS as usize + 1);
    let mut real_estate_series = Vec::with_capacity(HOLD_YEARS as usize + 1);
    let mut structural_long_series = Vec::with_capacity(HOLD_YEARS as usize + 1);

    let day0_sleeve = opening
        .structural_long
        .saturating_add(opening.reserve)
        .saturating_add(opening.treasury);
    real_estate_series.push(property_value.max(Decimal::ZERO));
    structural_long_series.push(day0_sleeve);
    nav_series.push(net_asset_value(
        property_value,
        opening.structural_long,
        opening.reserve,
        opening.treasury,
        loan_principal,
    ));
    for row in &years {
        real_estate_series.push(row.real_estate_value);
        structural_long_series.push(
            row.structural_long
                .saturating_add(row.reserve_cash)
                .saturating_add(row.treasury_cash),
        );
        nav_series.push(row.nav);
    }

    // --- Exit & waterfall ---
    let year10_noi = years.last().map(|row| row.noi).unwrap_or(year1_noi);
    let exit_property_value = capitalize(year10_noi, exit_cap);
    let total_value = net_asset_value(
        exit_property_value,
        closing.structural_long,
        closing.reserve,
        closing.treasury,
        closing.loan_balance,
    );
    let split = split_terminal_value(terms, total_value);

    // --- Static stress tests ---
    let re_decline_to_breach_pct = (Decimal::ONE - terms.max_ltv) * pct;
    let shocked_equity = (property_value * (Decimal::ONE - terms.combined_re_shock)
        - loan_principal)
        .max(Decimal::ZERO);

    let horizons = horizon_returns(&nav_series, terms.lp_capital);

    ScenarioResult {
        property_value,
        loan_principal,
        upfront_costs: terms.upfront_costs,
        nav_series,
        real_estate_series,
        structural_long_series,
        day1_re_equity,
        day1_structural_long,
        day1_reserve: reserve_target,
        day1_funding_gap,
        year1_noi,
        monthly_debt_service: loan.monthly_payment,
        annual_debt_service,
        year1_dscr,
        year1_management_fee,
        year1_fee_coverage,
        year1_post_fee_surplus,
        exit_property_value,
        year10_loan_balance: closing.loan_balance,
        total_value: split.total_value,
        gross_profit: split.gross_profit,
        preferred_hurdle: split.preferred_hurdle,
        gross_irr: split.gross_irr,
        gross_moic: split.gross_moic,
        lp_net_irr: split.lp_net_irr,
        lp_net_moic: split.lp_net_moic,
        lp_net_profit: split.lp_net_profit,
        gp_carry: split.gp_carry,
        re_decline_to_breach_pct,
        sl_wipeout_capital_left: day1_re_equity,
        sl_wipeout_capital_ratio: multiple_of(day1_re_equity, terms.lp_capital),
        combined_shock_capital_left: shocked_equity,
        combined_shock_capital_ratio: multiple_of(shocked_equity, terms.lp_capital),
        horizons,
        years,
    }
}

impl Schedule<'_> {
    /// Advance one year. The order is fixed: growth, property cash flow,
    /// amortization, management fee, reserve top-up, then valuation.
    fn step(&self, opening: Balances, year: u32) -> (Balances, YearLedger) {
        let terms = self.terms;

        let noi = grow(self.year1_noi, terms.noi_growth, year - 1);

        let structural_long = grow(opening.structural_long, self.structural_long_return, 1)
            .max(Decimal::ZERO);
        let treasury = grow(opening.treasury, terms.treasury_yield, 1).max(Decimal::ZERO);
        let reserve = grow(opening.reserve, terms.reserve_yield, 1).max(Decimal::ZERO);

        let net_property_cash_flow = noi - self.annual_debt_service;
        let (reserve, treasury, structural_long) = if net_property_cash_flow >= Decimal::ZERO {
            (
                reserve,
                treasury.saturating_add(net_property_cash_flow),
                structural_long,
            )
        } else {
            let (reserve, need) = draw(reserve, -net_property_cash_flow);
            let (treasury, need) = draw(treasury, need);
            let (structural_long, _) = draw(structural_long, need);
            (reserve, treasury, structural_long)
        };

        let loan_balance = self.loan.balance_after(year * 12);

        let management_fee = if year <= terms.committed_fee_years {
            terms.lp_capital * terms.management_fee_rate
        } else {
            let pre_fee_nav = net_asset_value(
                capitalize(noi, self.entry_cap),
                structural_long,
                reserve,
                treasury,
                loan_balance,
            );
            pre_fee_nav * terms.management_fee_rate
        };
        let (treasury, unpaid) = draw(treasury, management_fee);
        let (structural_long, _) = draw(structural_long, unpaid);

        let shortfall = (self.reserve_target - reserve).max(Decimal::ZERO);
        let (treasury, need) = draw(treasury, shortfall);
        let (structural_long, need) = draw(structural_long, need);
        let reserve_top_up = shortfall - need;
        let reserve = reserve + reserve_top_up;

        let cap_rate = if year == HOLD_YEARS {
            self.exit_cap
        } else {
            self.entry_cap
        };
        let real_estate_value = capitalize(noi, cap_rate);
        let nav = net_asset_value(
            real_estate_value,
            structural_long,
            reserve,
            treasury,
            loan_balance,
        );

        let closing = Balances {
            structural_long,
            reserve,
            treasury,
            loan_balance,
        };
        let row = YearLedger {
            year,
            noi,
            net_property_cash_flow,
            management_fee,
            reserve_top_up,
            real_estate_value,
            structural_long,
            reserve_cash: reserve,
            treasury_cash: treasury,
            loan_balance,
            nav,
        };
        (closing, row)
    }
}

/// Take up to `need` out of `balance`. Returns the new balance and the part
/// of `need` that could not be met.
fn draw(balance: Money, need: Money) -> (Money, Money) {
    let taken = need.min(balance).max(Decimal::ZERO);
    (balance - taken, need - taken)
}

/// Property plus sleeve and cash, less the loan, floored at zero. Saturates
/// so extrapolated returns cannot overflow the sum.
fn net_asset_value(
    real_estate: Money,
    structural_long: Money,
    reserve: Money,
    treasury: Money,
    loan_balance: Money,
) -> Money {
    real_estate
        .saturating_add(structural_long)
        .saturating_add(reserve)
        .saturating_add(treasury)
        .saturating_sub(loan_balance)
        .max(Decimal::ZERO)
}

/// value * (1 + rate)^periods, saturating on overflow.
fn grow(value: Money, rate: Rate, periods: u32) -> Money {
    if value.is_zero() {
        return Decimal::ZERO;
    }
    compound_factor(rate, periods)
        .map(|factor| value.saturating_mul(factor))
        .unwrap_or(Decimal::MAX)
}

/// Direct capitalization, zero when the cap rate is not positive.
fn capitalize(noi: Money, cap_rate: Rate) -> Money {
    if cap_rate <= Decimal::ZERO {
        Decimal::ZERO
    } else {
        (noi / cap_rate).max(Decimal::ZERO)
    }
}

fn horizon_returns(nav_series: &[Money], lp_capital: Money) -> Vec<HorizonReturn> {
    HORIZON_YEARS
        .iter()
        .filter_map(|&years| {
            let ending_value = *nav_series.get(years as usize)?;
            Some(HorizonReturn {
                years,
                label: if years == 1 {
                    "1 Year".to_string()
                } else {
                    format!("{years} Years")
                },
                annualized_return: annualized_return(ending_value, lp_capital, years),
                cumulative_return: multiple_of(ending_value - lp_capital, lp_capital),
                ending_value,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Validated entry point
// ---------------------------------------------------------------------------

/// Validate terms, run the scenario, and wrap the result with warnings and
/// metadata.
pub fn run_scenario(input: &ScenarioInput) -> FundModelResult<ComputationOutput<ScenarioResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let terms = input.effective_terms();
    terms.validate()?;
    if let Some(pv) = input.overrides.property_value {
        if pv < Decimal::ZERO {
            return Err(FundModelError::InvalidInput {
                field: "overrides.property_value".into(),
                reason: "Property value cannot be negative".into(),
            });
        }
    }

    let controls = input.effective_controls();
    for id in controls.out_of_range() {
        let spec = id.spec();
        warnings.push(format!(
            "{id} = {} is outside [{}, {}]; result is an extrapolation",
            controls.get(id),
            spec.min,
            spec.max
        ));
    }

    let result = calculate_scenario_with_terms(&terms, &controls, Some(&input.overrides));

    if let Some(dscr) = result.year1_dscr {
        if dscr < Decimal::ONE {
            warnings.push(format!(
                "Year-1 DSCR of {dscr:.2}x is below 1.00x; debt service is drawn from reserves"
            ));
        }
    }
    if result.day1_funding_gap > Decimal::ZERO {
        warnings.push(format!(
            "Day-1 uses exceed committed capital by ${:.2}M; structural-long allocation clamped to zero",
            result.day1_funding_gap
        ));
    }
    for warning in &warnings {
        tracing::warn!(%warning, "scenario warning");
    }

    tracing::debug!(
        mode = ?input.mode,
        property_value = %result.property_value,
        total_value = %result.total_value,
        gross_irr = %result.gross_irr,
        gp_carry = %result.gp_carry,
        "scenario evaluated"
    );

    let methodology = match (input.mode, input.terms.is_some()) {
        (_, true) => "Fund Scenario Model (10-Year Hold, Custom Terms)",
        (ScenarioMode::Detailed, false) => {
            "Leveraged Real Estate + Structural Long Fund Model (10-Year Hold)"
        }
        (ScenarioMode::Simple, false) => "Single-Return Fund Model (10-Year Hold)",
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        methodology,
        &serde_json::json!({
            "mode": input.mode,
            "controls": controls,
            "overrides": input.overrides,
            "terms": terms,
        }),
        warnings,
        elapsed,
        result,
    ))
}
