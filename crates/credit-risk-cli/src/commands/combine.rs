use clap::Args;
use serde_json::Value;

use credit_risk_core::cleaning::clean_loan_data;
use credit_risk_core::ecl::{calculate_ecl, combine_segments};

use crate::input;

/// Arguments for weighted segment recombination
#[derive(Args)]
pub struct CombineArgs {
    /// Path to the portfolio CSV
    #[arg(long)]
    pub input: String,

    /// Grouping column(s), comma separated
    #[arg(long, value_delimiter = ',', required = true)]
    pub by: Vec<String>,

    /// Segment label to include; repeat for each label
    /// (labels of multi-column groupings contain ", ")
    #[arg(long = "select", required = true)]
    pub select: Vec<String>,

    /// Skip the cleaning pass (input is already canonical)
    #[arg(long)]
    pub no_clean: bool,
}

pub fn run_combine(args: CombineArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let raw = input::file::read_table(&args.input)?;
    let table = if args.no_clean {
        raw
    } else {
        clean_loan_data(&raw)?.result
    };

    // Recombination weights use the unrounded aggregation results.
    let analysis = calculate_ecl(&table, &args.by)?;
    let mut output = combine_segments(&analysis.result.segments, &args.select)?;
    output.result = output.result.rounded();

    Ok(serde_json::to_value(&output)?)
}
