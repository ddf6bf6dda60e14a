use clap::{Args, ValueEnum};
use serde_json::Value;

use fund_model_core::presentation::{self, DeckView};

use super::ModelArgs;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ViewArg {
    /// LP-facing slide
    Investor,
    /// GP-only decision lens
    Internal,
}

/// Arguments for building a slide bundle
#[derive(Args)]
pub struct DeckArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    /// Which slide to build
    #[arg(long, value_enum, default_value = "investor")]
    pub view: ViewArg,
}

pub fn run_deck(args: DeckArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let input = args.model.to_input()?;
    let view = match args.view {
        ViewArg::Investor => DeckView::Investor,
        ViewArg::Internal => DeckView::Internal,
    };
    let slide = presentation::deck_slide(&input, view)?;
    Ok(serde_json::to_value(slide)?)
}
