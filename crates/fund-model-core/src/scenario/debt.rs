use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::time_value::compound_factor;
use crate::types::{Money, Rate};

/// Fixed-rate, fully amortizing loan with monthly payments.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Amortization {
    pub principal: Money,
    pub monthly_rate: Rate,
    pub term_months: u32,
    pub monthly_payment: Money,
}

impl Amortization {
    /// Build the schedule for `principal` at an annual rate compounded monthly.
    ///
    /// A zero (or negative) principal carries no payment at all rather than
    /// going through the annuity formula.
    pub fn new(principal: Money, annual_rate: Rate, term_months: u32) -> Self {
        let monthly_rate = annual_rate / dec!(12);
        let monthly_payment = monthly_payment(principal, monthly_rate, term_months);
        Amortization {
            principal,
            monthly_rate,
            term_months,
            monthly_payment,
        }
    }

    pub fn annual_debt_service(&self) -> Money {
        self.monthly_payment * dec!(12)
    }

    /// Outstanding balance after `payments` monthly payments, re-derived from
    /// the fixed schedule: P * ((1+r)^n - (1+r)^k) / ((1+r)^n - 1).
    pub fn balance_after(&self, payments: u32) -> Money {
        if self.principal <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        if payments == 0 {
            return self.principal;
        }
        if payments >= self.term_months {
            return Decimal::ZERO;
        }
        let n = Decimal::from(self.term_months);
        let k = Decimal::from(payments);
        if self.monthly_rate.is_zero() {
            return self.principal * (n - k) / n;
        }
        match (
            compound_factor(self.monthly_rate, self.term_months),
            compound_factor(self.monthly_rate, payments),
        ) {
            (Some(full), Some(elapsed)) if full != Decimal::ONE => {
                (self.principal * (full - elapsed) / (full - Decimal::ONE)).max(Decimal::ZERO)
            }
            // Interest-only limit: the payment never reaches principal
            _ => self.principal,
        }
    }
}

/// Standard fixed-rate payment: P * r(1+r)^n / ((1+r)^n - 1)
fn monthly_payment(principal: Money, monthly_rate: Rate, term_months: u32) -> Money {
    if principal <= Decimal::ZERO || term_months == 0 {
        return Decimal::ZERO;
    }
    if monthly_rate.is_zero() {
        return principal / Decimal::from(term_months);
    }
    match compound_factor(monthly_rate, term_months) {
        Some(compound) if compound != Decimal::ONE => {
            principal * monthly_rate * compound / (compound - Decimal::ONE)
        }
        _ => principal * monthly_rate,
    }
}
