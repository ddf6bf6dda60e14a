use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::FundModelError;
use crate::types::{Money, Rate};
use crate::FundModelResult;

/// Fund life in years. The NAV series always carries `HOLD_YEARS + 1` points.
pub const HOLD_YEARS: u32 = 10;

pub const LP_CAPITAL_M: Money = dec!(20);
pub const PROPERTY_BASE_VALUE_M: Money = dec!(20);
pub const MAX_LTV: Rate = dec!(0.55);
pub const UPFRONT_COSTS_M: Money = dec!(0.82);
pub const MANAGEMENT_FEE_RATE: Rate = dec!(0.02);
pub const COMMITTED_FEE_YEARS: u32 = 5;
pub const TREASURY_YIELD: Rate = dec!(0.04);
pub const RESERVE_YIELD: Rate = dec!(0.035);
pub const NOI_GROWTH: Rate = dec!(0.02);
pub const RESERVE_MONTHS: u32 = 6;
pub const AMORTIZATION_MONTHS: u32 = 360;
pub const PREFERRED_RETURN: Rate = dec!(0.09);
pub const CATCH_UP_SHARE: Rate = dec!(0.25);
pub const CARRY_RATE: Rate = dec!(0.20);
pub const COMBINED_RE_SHOCK: Rate = dec!(0.30);

/// Preferred hurdle of the LP-facing single-return model.
pub const SIMPLE_PREFERRED_RETURN: Rate = dec!(0.05);

/// Fund economics that are not user controlled.
///
/// Every field defaults to the canonical fund, so a partial JSON/YAML
/// document only overrides what it names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FundTerms {
    /// LP committed capital ($M)
    pub lp_capital: Money,
    /// Acquisition value of the property ($M)
    pub property_value: Money,
    pub max_ltv: Rate,
    /// Transaction costs paid out of committed capital on Day 1 ($M)
    pub upfront_costs: Money,
    pub management_fee_rate: Rate,
    /// Years charged on committed capital; later years are charged on NAV
    pub committed_fee_years: u32,
    pub treasury_yield: Rate,
    pub reserve_yield: Rate,
    pub noi_growth: Rate,
    /// Debt-service reserve target, in months of annual debt service
    pub reserve_months: u32,
    pub amortization_months: u32,
    pub preferred_return: Rate,
    /// Catch-up band as a share of the hurdle amount
    pub catch_up_share: Rate,
    pub carry_rate: Rate,
    /// Property value decline applied in the combined stress case
    pub combined_re_shock: Rate,
}

impl Default for FundTerms {
    fn default() -> Self {
        FundTerms {
            lp_capital: LP_CAPITAL_M,
            property_value: PROPERTY_BASE_VALUE_M,
            max_ltv: MAX_LTV,
            upfront_costs: UPFRONT_COSTS_M,
            management_fee_rate: MANAGEMENT_FEE_RATE,
            committed_fee_years: COMMITTED_FEE_YEARS,
            treasury_yield: TREASURY_YIELD,
            reserve_yield: RESERVE_YIELD,
            noi_growth: NOI_GROWTH,
            reserve_months: RESERVE_MONTHS,
            amortization_months: AMORTIZATION_MONTHS,
            preferred_return: PREFERRED_RETURN,
            catch_up_share: CATCH_UP_SHARE,
            carry_rate: CARRY_RATE,
            combined_re_shock: COMBINED_RE_SHOCK,
        }
    }
}

impl FundTerms {
    /// The LP-facing model: the whole fund compounds at the structural-long
    /// return, fees are charged on NAV from year 1, and there is no property,
    /// leverage or transaction cost.
    pub fn simple() -> Self {
        FundTerms {
            property_value: Decimal::ZERO,
            max_ltv: Decimal::ZERO,
            upfront_costs: Decimal::ZERO,
            committed_fee_years: 0,
            preferred_return: SIMPLE_PREFERRED_RETURN,
            ..FundTerms::default()
        }
    }

    pub fn validate(&self) -> FundModelResult<()> {
        if self.lp_capital <= Decimal::ZERO {
            return Err(invalid("lp_capital", "LP committed capital must be positive"));
        }
        if self.property_value < Decimal::ZERO {
            return Err(invalid("property_value", "Property value cannot be negative"));
        }
        if self.max_ltv < Decimal::ZERO || self.max_ltv >= Decimal::ONE {
            return Err(invalid("max_ltv", "Loan-to-value must be in [0, 1)"));
        }
        if self.upfront_costs < Decimal::ZERO {
            return Err(invalid("upfront_costs", "Upfront costs cannot be negative"));
        }
        if self.amortization_months == 0 {
            return Err(invalid(
                "amortization_months",
                "Amortization term must be at least one month",
            ));
        }
        let rates = [
            ("management_fee_rate", self.management_fee_rate),
            ("treasury_yield", self.treasury_yield),
            ("reserve_yield", self.reserve_yield),
            ("preferred_return", self.preferred_return),
            ("catch_up_share", self.catch_up_share),
            ("carry_rate", self.carry_rate),
        ];
        if let Some((field, _)) = rates.iter().find(|(_, r)| *r < Decimal::ZERO) {
            return Err(invalid(field, "Rate cannot be negative"));
        }
        if self.carry_rate > Decimal::ONE {
            return Err(invalid("carry_rate", "Carry cannot exceed 100% of profit"));
        }
        if self.combined_re_shock < Decimal::ZERO || self.combined_re_shock > Decimal::ONE {
            return Err(invalid("combined_re_shock", "Shock must be in [0, 1]"));
        }
        Ok(())
    }
}

fn invalid(field: &str, reason: &str) -> FundModelError {
    FundModelError::InvalidInput {
        field: field.into(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_terms_are_valid() {
        assert!(FundTerms::default().validate().is_ok());
        assert!(FundTerms::simple().validate().is_ok());
    }

    #[test]
    fn test_partial_terms_override() {
        let terms: FundTerms =
            serde_json::from_str(r#"{"max_ltv": "0.6", "property_value": "25"}"#).unwrap();
        assert_eq!(terms.max_ltv, dec!(0.6));
        assert_eq!(terms.property_value, dec!(25));
        assert_eq!(terms.lp_capital, LP_CAPITAL_M);
        assert_eq!(terms.amortization_months, 360);
    }

    #[test]
    fn test_simple_terms() {
        let simple = FundTerms::simple();
        assert_eq!(simple.property_value, Decimal::ZERO);
        assert_eq!(simple.max_ltv, Decimal::ZERO);
        assert_eq!(simple.committed_fee_years, 0);
        assert_eq!(simple.preferred_return, dec!(0.05));
        assert_eq!(simple.lp_capital, dec!(20));
    }

    #[test]
    fn test_invalid_terms() {
        let zero_capital = FundTerms {
            lp_capital: Decimal::ZERO,
            ..FundTerms::default()
        };
        assert!(zero_capital.validate().is_err());

        let full_ltv = FundTerms {
            max_ltv: Decimal::ONE,
            ..FundTerms::default()
        };
        assert!(full_ltv.validate().is_err());

        let negative_fee = FundTerms {
            management_fee_rate: dec!(-0.01),
            ..FundTerms::default()
        };
        let err = negative_fee.validate().unwrap_err();
        assert!(err.to_string().contains("management_fee_rate"));

        let no_term = FundTerms {
            amortization_months: 0,
            ..FundTerms::default()
        };
        assert!(no_term.validate().is_err());
    }
}
