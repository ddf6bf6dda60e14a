use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::types::{Money, Multiple, Rate};

/// Terminal values below this are lifted before taking the annualizing root,
/// so a wiped-out fund still yields a finite rate.
pub const RETURN_FLOOR: Money = dec!(0.01);

/// (1 + rate)^periods, or `None` when the power overflows 96-bit precision.
pub fn compound_factor(rate: Rate, periods: u32) -> Option<Decimal> {
    (Decimal::ONE + rate).checked_powi(i64::from(periods))
}

/// value / capital, zero when there is no capital to divide by.
pub fn multiple_of(value: Money, capital: Money) -> Multiple {
    if capital.is_zero() {
        Decimal::ZERO
    } else {
        value / capital
    }
}

/// Annualized point-to-point return: (max(0.01, ending) / capital)^(1/years) - 1.
///
/// This is the closed-form IRR of a single contribution and a single
/// distribution. Degenerate inputs (no capital, zero years) return zero.
pub fn annualized_return(ending_value: Money, capital: Money, years: u32) -> Rate {
    if capital <= Decimal::ZERO || years == 0 {
        return Decimal::ZERO;
    }
    let multiple = ending_value.max(RETURN_FLOOR) / capital;
    let exponent = Decimal::ONE / Decimal::from(years);
    multiple
        .checked_powd(exponent)
        .map(|growth| growth - Decimal::ONE)
        .unwrap_or(Decimal::NEGATIVE_ONE)
}
