//! Property tests for the scenario engine.
//!
//! Uses proptest to verify, across the declared slider ranges:
//! 1. Determinism: identical inputs give identical results
//! 2. Shape: every series carries years 0..=10
//! 3. Non-negativity of every balance series
//! 4. Carry floor: no carry unless profit clears the hurdle
//! 5. Conservation: LP net profit + carry + LP capital == terminal value
//! 6. Static stress: covenant breach depends only on LTV

use fund_model_core::scenario::sensitivity::{
    INTERNAL_PROPERTY_MAX_M, INTERNAL_PROPERTY_MIN_M, INTERNAL_PROPERTY_STEP_M,
};
use fund_model_core::scenario::terms::LP_CAPITAL_M;
use fund_model_core::scenario::{
    build_sensitivity_rows, calculate_scenario, calculate_scenario_with_terms, FundTerms,
    ScenarioControls, ScenarioOverrides,
};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ── Strategies ───────────────────────────────────────────────────────

/// Slider values on their declared step grids.
fn arb_controls() -> impl Strategy<Value = ScenarioControls> {
    (0..=24i64, 0..=24i64, 0..=28i64, -30..=50i64).prop_map(|(entry, exit, loan, sl)| {
        ScenarioControls {
            entry_cap_rate_pct: dec!(4) + Decimal::from(entry) * dec!(0.25),
            exit_cap_rate_pct: dec!(4) + Decimal::from(exit) * dec!(0.25),
            loan_rate_pct: dec!(3) + Decimal::from(loan) * dec!(0.25),
            structural_long_return_pct: Decimal::from(sl),
        }
    })
}

fn arb_overrides() -> impl Strategy<Value = ScenarioOverrides> {
    prop::option::of(10..=40i64).prop_map(|pv| ScenarioOverrides {
        property_value: pv.map(Decimal::from),
        exit_cap_rate_pct: None,
    })
}

proptest! {
    #[test]
    fn deterministic(controls in arb_controls(), overrides in arb_overrides()) {
        let first = calculate_scenario(&controls, Some(&overrides));
        let second = calculate_scenario(&controls, Some(&overrides));
        prop_assert_eq!(first, second);
    }

    #[test]
    fn series_have_eleven_points(controls in arb_controls(), overrides in arb_overrides()) {
        let result = calculate_scenario(&controls, Some(&overrides));
        prop_assert_eq!(result.nav_series.len(), 11);
        prop_assert_eq!(result.real_estate_series.len(), 11);
        prop_assert_eq!(result.structural_long_series.len(), 11);
    }

    #[test]
    fn balances_never_negative(controls in arb_controls(), overrides in arb_overrides()) {
        let result = calculate_scenario(&controls, Some(&overrides));
        let series = result
            .nav_series
            .iter()
            .chain(&result.real_estate_series)
            .chain(&result.structural_long_series);
        for value in series {
            prop_assert!(*value >= Decimal::ZERO, "negative series value {}", value);
        }
        for row in &result.years {
            prop_assert!(row.structural_long >= Decimal::ZERO);
            prop_assert!(row.reserve_cash >= Decimal::ZERO);
            prop_assert!(row.treasury_cash >= Decimal::ZERO);
            prop_assert!(row.loan_balance >= Decimal::ZERO);
        }
        prop_assert!(result.total_value >= Decimal::ZERO);
        prop_assert!(result.day1_structural_long >= Decimal::ZERO);
        prop_assert!(result.combined_shock_capital_left >= Decimal::ZERO);
    }

    #[test]
    fn carry_zero_below_hurdle(controls in arb_controls(), overrides in arb_overrides()) {
        let result = calculate_scenario(&controls, Some(&overrides));
        if result.gross_profit <= result.preferred_hurdle {
            prop_assert_eq!(result.gp_carry, Decimal::ZERO);
        } else {
            prop_assert!(result.gp_carry > Decimal::ZERO);
        }
    }

    #[test]
    fn lp_gp_split_conserves_value(controls in arb_controls(), overrides in arb_overrides()) {
        let result = calculate_scenario(&controls, Some(&overrides));
        let rebuilt = result.lp_net_profit + result.gp_carry + LP_CAPITAL_M;
        prop_assert!((rebuilt - result.total_value).abs() < dec!(0.000000001));
        prop_assert_eq!(result.gross_moic, result.total_value / LP_CAPITAL_M);
        prop_assert_eq!(result.total_value, result.nav_series[10]);
    }

    #[test]
    fn breach_depends_only_on_ltv(controls in arb_controls(), overrides in arb_overrides()) {
        let result = calculate_scenario(&controls, Some(&overrides));
        prop_assert_eq!(result.re_decline_to_breach_pct, dec!(45.0));
    }

    #[test]
    fn committed_fee_ignores_nav(controls in arb_controls()) {
        let result = calculate_scenario(&controls, None);
        for row in result.years.iter().take(5) {
            prop_assert_eq!(row.management_fee, dec!(0.4));
        }
    }

    #[test]
    fn zero_leverage_has_no_dscr(controls in arb_controls()) {
        let terms = FundTerms { max_ltv: Decimal::ZERO, ..FundTerms::default() };
        let result = calculate_scenario_with_terms(&terms, &controls, None);
        prop_assert_eq!(result.annual_debt_service, Decimal::ZERO);
        prop_assert_eq!(result.year1_dscr, None);
    }
}

#[test]
fn baseline_capitalization() {
    let result = calculate_scenario(&ScenarioControls::default(), None);
    assert_eq!(result.loan_principal, dec!(11.0));
    assert_eq!(result.day1_re_equity, dec!(9.0));
}

#[test]
fn sweep_covers_internal_range() {
    let rows = build_sensitivity_rows(&ScenarioControls::default());
    let expected_len = ((INTERNAL_PROPERTY_MAX_M - INTERNAL_PROPERTY_MIN_M)
        / INTERNAL_PROPERTY_STEP_M)
        .floor()
        + Decimal::ONE;
    assert_eq!(Decimal::from(rows.len()), expected_len);
    assert_eq!(rows.first().map(|r| r.key), Some(INTERNAL_PROPERTY_MIN_M));
    assert_eq!(rows.last().map(|r| r.key), Some(INTERNAL_PROPERTY_MAX_M));
    for row in &rows {
        assert_eq!(row.result.property_value, row.key);
    }
}

#[test]
fn nav_fee_tracks_nav() {
    let low = calculate_scenario(
        &ScenarioControls {
            structural_long_return_pct: dec!(-10),
            ..ScenarioControls::default()
        },
        None,
    );
    let high = calculate_scenario(
        &ScenarioControls {
            structural_long_return_pct: dec!(25),
            ..ScenarioControls::default()
        },
        None,
    );
    for year in 5..10 {
        assert_ne!(low.years[year].management_fee, high.years[year].management_fee);
    }
}
