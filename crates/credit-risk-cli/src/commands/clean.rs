use clap::Args;
use serde_json::{json, Value};
use std::fs::File;

use credit_risk_core::cleaning::{clean_loan_data, loan_records};

use crate::input;

/// Arguments for dataset cleaning
#[derive(Args)]
pub struct CleanArgs {
    /// Path to the raw portfolio CSV
    #[arg(long)]
    pub input: String,

    /// Write the full cleaned dataset to this CSV file
    #[arg(long)]
    pub save: Option<String>,

    /// Number of typed preview rows to include in the output
    #[arg(long, default_value_t = 5)]
    pub preview: usize,
}

pub fn run_clean(args: CleanArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let raw = input::file::read_table(&args.input)?;
    let output = clean_loan_data(&raw)?;

    if let Some(ref path) = args.save {
        let file = File::create(path)
            .map_err(|e| format!("Failed to create '{}': {}", path, e))?;
        output.result.write_csv(file)?;
    }

    let preview: Vec<_> = loan_records(&output.result)?
        .into_iter()
        .take(args.preview)
        .collect();

    Ok(json!({
        "result": {
            "rows_in": raw.n_rows(),
            "rows_out": output.result.n_rows(),
            "n_columns": output.result.columns().len(),
            "columns": output.result.columns(),
            "preview": preview,
            "saved_to": args.save,
        },
        "methodology": output.methodology,
        "assumptions": output.assumptions,
        "warnings": output.warnings,
        "metadata": output.metadata,
    }))
}
