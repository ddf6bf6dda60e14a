pub mod controls;
pub mod deck;
pub mod scenario;
pub mod sensitivity;

use clap::{Args, ValueEnum};
use rust_decimal::Decimal;

use fund_model_core::scenario::{ControlId, FundTerms, ScenarioInput, ScenarioMode};

use crate::input;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ModeArg {
    /// Leveraged real estate plus structural-long sleeve
    Detailed,
    /// Single compounding return, fees and carry only
    Simple,
}

impl From<ModeArg> for ScenarioMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Detailed => ScenarioMode::Detailed,
            ModeArg::Simple => ScenarioMode::Simple,
        }
    }
}

/// Scenario inputs shared by every model command.
///
/// A JSON document (file or piped stdin) is read first; flags override it.
#[derive(Args)]
pub struct ModelArgs {
    /// Path to JSON input file with a scenario input document
    #[arg(long)]
    pub input: Option<String>,

    /// Fund variant to run
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Path to a JSON or YAML file overriding fund terms
    #[arg(long)]
    pub terms: Option<String>,

    /// Entry cap rate, whole-number percent (e.g. 6.5)
    #[arg(long, allow_hyphen_values = true)]
    pub entry_cap_rate_pct: Option<Decimal>,

    /// Exit cap rate, whole-number percent
    #[arg(long, allow_hyphen_values = true)]
    pub exit_cap_rate_pct: Option<Decimal>,

    /// Loan rate, whole-number percent
    #[arg(long, allow_hyphen_values = true)]
    pub loan_rate_pct: Option<Decimal>,

    /// Structural-long annual return, whole-number percent (e.g. -10)
    #[arg(long, allow_hyphen_values = true)]
    pub structural_long_return_pct: Option<Decimal>,

    /// Acquisition value override ($M)
    #[arg(long)]
    pub property_value: Option<Decimal>,

    /// Exit cap rate override, whole-number percent
    #[arg(long)]
    pub exit_cap_override: Option<Decimal>,

    /// Clamp controls to their declared slider bounds
    #[arg(long)]
    pub snap: bool,
}

impl ModelArgs {
    /// Read the base document (`--input` file, else piped stdin, else
    /// defaults) and apply the flags on top of it.
    pub fn to_input(&self) -> Result<ScenarioInput, Box<dyn std::error::Error>> {
        let document: ScenarioInput = if let Some(ref path) = self.input {
            input::file::read_json(path)?
        } else if let Some(document) = input::stdin::read_stdin()? {
            document
        } else {
            ScenarioInput::default()
        };
        self.apply(document)
    }

    /// Flags win over whatever the document set.
    pub fn apply(
        &self,
        mut scenario: ScenarioInput,
    ) -> Result<ScenarioInput, Box<dyn std::error::Error>> {
        if let Some(mode) = self.mode {
            scenario.mode = mode.into();
        }
        if let Some(ref path) = self.terms {
            let terms: FundTerms = input::file::read_config(path)?;
            scenario.terms = Some(terms);
        }

        let flags = [
            (ControlId::EntryCapRatePct, self.entry_cap_rate_pct),
            (ControlId::ExitCapRatePct, self.exit_cap_rate_pct),
            (ControlId::LoanRatePct, self.loan_rate_pct),
            (ControlId::StructuralLongReturnPct, self.structural_long_return_pct),
        ];
        for (id, value) in flags {
            if let Some(value) = value {
                scenario.controls.set(id, value);
            }
        }

        if self.property_value.is_some() {
            scenario.overrides.property_value = self.property_value;
        }
        if self.exit_cap_override.is_some() {
            scenario.overrides.exit_cap_rate_pct = self.exit_cap_override;
        }
        scenario.snap |= self.snap;

        tracing::debug!(
            mode = ?scenario.mode,
            custom_terms = scenario.terms.is_some(),
            snap = scenario.snap,
            "scenario input assembled"
        );
        Ok(scenario)
    }
}
