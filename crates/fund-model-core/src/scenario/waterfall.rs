use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::time_value::{annualized_return, compound_factor, multiple_of};
use crate::types::*;

use super::terms::{FundTerms, HOLD_YEARS};

/// Terminal split of the fund between LPs and the GP.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarrySplit {
    /// Terminal fund value before carry
    pub total_value: Money,
    /// total_value - LP capital (may be negative)
    pub gross_profit: Money,
    /// LP capital compounded at the preferred return over the hold, less LP capital
    pub preferred_hurdle: Money,
    /// Portion of profit above the hurdle taken 100% by the GP
    pub catch_up: Money,
    /// Carry on profit above the catch-up band
    pub carried_interest: Money,
    /// catch_up + carried_interest
    pub gp_carry: Money,
    /// total_value - gp_carry
    pub lp_distribution: Money,
    pub lp_net_profit: Money,
    pub gross_moic: Multiple,
    pub gross_irr: Rate,
    pub lp_net_moic: Multiple,
    pub lp_net_irr: Rate,
}

/// Preferred hurdle amount: LP * ((1 + pref)^hold - 1).
pub fn preferred_hurdle(terms: &FundTerms) -> Money {
    let growth = compound_factor(terms.preferred_return, HOLD_YEARS).unwrap_or(Decimal::MAX);
    (terms.lp_capital * (growth - Decimal::ONE)).max(Decimal::ZERO)
}

/// Split a terminal value through hurdle, catch-up and carry.
///
/// Carry is zero unless gross profit strictly exceeds the hurdle.
pub fn split_terminal_value(terms: &FundTerms, total_value: Money) -> CarrySplit {
    let lp_capital = terms.lp_capital;
    let gross_profit = total_value - lp_capital;
    let hurdle = preferred_hurdle(terms);

    let (catch_up, carried_interest) = if gross_profit > hurdle {
        let excess = gross_profit - hurdle;
        let catch_up = excess.min(hurdle * terms.catch_up_share);
        let above_band = (excess - catch_up).max(Decimal::ZERO);
        (catch_up, above_band * terms.carry_rate)
    } else {
        (Decimal::ZERO, Decimal::ZERO)
    };
    let gp_carry = catch_up + carried_interest;

    let lp_distribution = total_value - gp_carry;

    CarrySplit {
        total_value,
        gross_profit,
        preferred_hurdle: hurdle,
        catch_up,
        carried_interest,
        gp_carry,
        lp_distribution,
        lp_net_profit: lp_distribution - lp_capital,
        gross_moic: multiple_of(total_value, lp_capital),
        gross_irr: annualized_return(total_value, lp_capital, HOLD_YEARS),
        lp_net_moic: multiple_of(lp_distribution, lp_capital),
        lp_net_irr: annualized_return(lp_distribution, lp_capital, HOLD_YEARS),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_hurdle_amount() {
        // 20 * (1.09^10 - 1) ~= 27.347
        let hurdle = preferred_hurdle(&FundTerms::default());
        assert!((hurdle - dec!(27.3472735)).abs() < dec!(0.000001), "got {hurdle}");
    }

    #[test]
    fn test_no_carry_below_hurdle() {
        let terms = FundTerms::default();
        let split = split_terminal_value(&terms, dec!(40));
        assert_eq!(split.gp_carry, Decimal::ZERO);
        assert_eq!(split.lp_distribution, dec!(40));
        assert_eq!(split.lp_net_profit, dec!(20));
        assert_eq!(split.gross_moic, dec!(2));
        assert_eq!(split.lp_net_moic, split.gross_moic);
    }

    #[test]
    fn test_carry_exactly_at_hurdle_is_zero() {
        let terms = FundTerms::default();
        let at_hurdle = terms.lp_capital + preferred_hurdle(&terms);
        let split = split_terminal_value(&terms, at_hurdle);
        assert_eq!(split.gp_carry, Decimal::ZERO);
    }

    #[test]
    fn test_catch_up_fills_before_carry() {
        let terms = FundTerms::default();
        let hurdle = preferred_hurdle(&terms);
        // Excess of 1 sits wholly inside the catch-up band (25% of ~27.3)
        let split = split_terminal_value(&terms, terms.lp_capital + hurdle + dec!(1));
        assert_eq!(split.catch_up, dec!(1));
        assert_eq!(split.carried_interest, Decimal::ZERO);
        assert_eq!(split.gp_carry, dec!(1));
    }

    #[test]
    fn test_carry_above_catch_up_band() {
        let terms = FundTerms::default();
        let hurdle = preferred_hurdle(&terms);
        let band = hurdle * dec!(0.25);
        let split = split_terminal_value(&terms, terms.lp_capital + hurdle + band + dec!(10));
        assert_eq!(split.catch_up, band);
        assert_eq!(split.carried_interest, dec!(2));
        assert_eq!(split.gp_carry, band + dec!(2));
        assert_eq!(
            split.lp_net_profit + split.gp_carry + terms.lp_capital,
            split.total_value
        );
    }

    #[test]
    fn test_wiped_out_fund() {
        let split = split_terminal_value(&FundTerms::default(), Decimal::ZERO);
        assert_eq!(split.gross_moic, Decimal::ZERO);
        assert_eq!(split.gp_carry, Decimal::ZERO);
        assert_eq!(split.lp_net_profit, dec!(-20));
        // Floored root keeps the rate finite
        assert!(split.gross_irr > dec!(-1) && split.gross_irr < Decimal::ZERO);
    }
}
