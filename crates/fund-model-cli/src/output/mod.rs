pub mod csv_out;
pub mod minimal;
pub mod table;

use clap::ValueEnum;
use serde_json::Value;

/// How command results are written to stdout.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Pretty JSON, decimals as strings
    Json,
    /// Field/value table plus sub-tables for ledgers, horizons and sweep rows
    Table,
    Csv,
    /// Headline number only (LP net IRR), or key/IRR pairs for sweeps
    Minimal,
}

impl OutputFormat {
    pub fn write(&self, value: &Value) {
        match self {
            OutputFormat::Json => print_json(value),
            OutputFormat::Table => table::print_table(value),
            OutputFormat::Csv => csv_out::print_csv(value),
            OutputFormat::Minimal => minimal::print_minimal(value),
        }
    }
}

fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("JSON serialization error: {}", e),
    }
}
