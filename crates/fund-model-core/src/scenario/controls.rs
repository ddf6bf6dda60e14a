use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::FundModelError;

/// Identifier of a user-adjustable scenario slider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ControlId {
    EntryCapRatePct,
    ExitCapRatePct,
    LoanRatePct,
    StructuralLongReturnPct,
}

impl ControlId {
    pub const ALL: [ControlId; 4] = [
        ControlId::EntryCapRatePct,
        ControlId::ExitCapRatePct,
        ControlId::LoanRatePct,
        ControlId::StructuralLongReturnPct,
    ];

    /// The identifier the deck front-end uses for this slider.
    pub fn as_str(&self) -> &'static str {
        match self {
            ControlId::EntryCapRatePct => "entryCapRatePct",
            ControlId::ExitCapRatePct => "exitCapRatePct",
            ControlId::LoanRatePct => "loanRatePct",
            ControlId::StructuralLongReturnPct => "structuralLongReturnPct",
        }
    }

    pub fn spec(&self) -> &'static ControlSpec {
        match self {
            ControlId::EntryCapRatePct => &CONTROL_SPECS[0],
            ControlId::ExitCapRatePct => &CONTROL_SPECS[1],
            ControlId::LoanRatePct => &CONTROL_SPECS[2],
            ControlId::StructuralLongReturnPct => &CONTROL_SPECS[3],
        }
    }
}

impl fmt::Display for ControlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ControlId {
    type Err = FundModelError;

    /// Accepts the camelCase identifier or its snake/kebab-case spelling.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalised: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect();
        ControlId::ALL
            .into_iter()
            .find(|id| id.as_str().to_lowercase() == normalised)
            .ok_or_else(|| FundModelError::InvalidInput {
                field: "control".into(),
                reason: format!(
                    "Unknown control '{s}'. Available controls: entryCapRatePct, exitCapRatePct, loanRatePct, structuralLongReturnPct"
                ),
            })
    }
}

/// Declared bounds of a slider. The UI clamps to these; the engine does not.
#[derive(Debug, Clone, Serialize)]
pub struct ControlSpec {
    pub id: ControlId,
    pub label: &'static str,
    pub min: Decimal,
    pub max: Decimal,
    pub step: Decimal,
    pub default_value: Decimal,
}

impl ControlSpec {
    pub fn contains(&self, value: Decimal) -> bool {
        value >= self.min && value <= self.max
    }

    /// Clamp to `[min, max]` and round to the nearest step counted from `min`.
    pub fn snap(&self, value: Decimal) -> Decimal {
        let clamped = value.max(self.min).min(self.max);
        if self.step <= Decimal::ZERO {
            return clamped.normalize();
        }
        let steps = ((clamped - self.min) / self.step).round();
        (self.min + steps * self.step).min(self.max).normalize()
    }
}

pub static CONTROL_SPECS: [ControlSpec; 4] = [
    ControlSpec {
        id: ControlId::EntryCapRatePct,
        label: "Entry Cap Rate",
        min: dec!(4),
        max: dec!(10),
        step: dec!(0.25),
        default_value: dec!(6.5),
    },
    ControlSpec {
        id: ControlId::ExitCapRatePct,
        label: "Exit Cap Rate",
        min: dec!(4),
        max: dec!(10),
        step: dec!(0.25),
        default_value: dec!(7),
    },
    ControlSpec {
        id: ControlId::LoanRatePct,
        label: "Loan Rate",
        min: dec!(3),
        max: dec!(10),
        step: dec!(0.25),
        default_value: dec!(6.5),
    },
    ControlSpec {
        id: ControlId::StructuralLongReturnPct,
        label: "Structural Long Return",
        min: dec!(-30),
        max: dec!(50),
        step: dec!(1),
        default_value: dec!(15),
    },
];

/// Current slider values, whole-number percentages (5.5 = 5.5%).
///
/// Accepts both the snake_case field names and the camelCase control ids the
/// front-end uses; any other key is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScenarioControls {
    #[serde(alias = "entryCapRatePct")]
    pub entry_cap_rate_pct: Decimal,
    #[serde(alias = "exitCapRatePct")]
    pub exit_cap_rate_pct: Decimal,
    #[serde(alias = "loanRatePct")]
    pub loan_rate_pct: Decimal,
    #[serde(alias = "structuralLongReturnPct")]
    pub structural_long_return_pct: Decimal,
}

impl Default for ScenarioControls {
    fn default() -> Self {
        ScenarioControls {
            entry_cap_rate_pct: ControlId::EntryCapRatePct.spec().default_value,
            exit_cap_rate_pct: ControlId::ExitCapRatePct.spec().default_value,
            loan_rate_pct: ControlId::LoanRatePct.spec().default_value,
            structural_long_return_pct: ControlId::StructuralLongReturnPct.spec().default_value,
        }
    }
}

impl ScenarioControls {
    pub fn get(&self, id: ControlId) -> Decimal {
        match id {
            ControlId::EntryCapRatePct => self.entry_cap_rate_pct,
            ControlId::ExitCapRatePct => self.exit_cap_rate_pct,
            ControlId::LoanRatePct => self.loan_rate_pct,
            ControlId::StructuralLongReturnPct => self.structural_long_return_pct,
        }
    }

    pub fn set(&mut self, id: ControlId, value: Decimal) {
        match id {
            ControlId::EntryCapRatePct => self.entry_cap_rate_pct = value,
            ControlId::ExitCapRatePct => self.exit_cap_rate_pct = value,
            ControlId::LoanRatePct => self.loan_rate_pct = value,
            ControlId::StructuralLongReturnPct => self.structural_long_return_pct = value,
        }
    }

    /// Copy with one control replaced.
    pub fn with(mut self, id: ControlId, value: Decimal) -> Self {
        self.set(id, value);
        self
    }

    /// Copy with every control snapped to its declared bounds.
    pub fn snapped(&self) -> Self {
        ControlId::ALL
            .into_iter()
            .fold(*self, |acc, id| acc.with(id, id.spec().snap(self.get(id))))
    }

    pub fn out_of_range(&self) -> Vec<ControlId> {
        ControlId::ALL
            .into_iter()
            .filter(|id| !id.spec().contains(self.get(*id)))
            .collect()
    }
}
