use clap::Args;
use serde_json::{json, Value};

use credit_risk_core::auth::authenticate;
use credit_risk_core::cleaning::clean_loan_data;
use credit_risk_core::ecl::calculate_ecl;
use credit_risk_core::history::HistoryStore;

use crate::input;

/// Arguments for segment ECL aggregation
#[derive(Args)]
pub struct EclArgs {
    /// Path to the portfolio CSV
    #[arg(long)]
    pub input: String,

    /// Grouping column(s), comma separated, e.g. "loan_intent,person_education"
    #[arg(long, value_delimiter = ',', required = true)]
    pub by: Vec<String>,

    /// Skip the cleaning pass (input is already canonical)
    #[arg(long)]
    pub no_clean: bool,

    /// Append the results to the history store (requires sign-in flags)
    #[arg(long)]
    pub save: bool,

    /// History CSV path
    #[arg(long, default_value = "user_ecl_history.csv")]
    pub history: String,

    /// Username for --save
    #[arg(long)]
    pub username: Option<String>,

    /// Password for --save
    #[arg(long)]
    pub password: Option<String>,
}

pub fn run_ecl(args: EclArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let raw = input::file::read_table(&args.input)?;

    let mut carried_warnings = Vec::new();
    let table = if args.no_clean {
        raw
    } else {
        let cleaned = clean_loan_data(&raw)?;
        carried_warnings = cleaned.warnings;
        cleaned.result
    };

    let mut output = calculate_ecl(&table, &args.by)?;
    if !carried_warnings.is_empty() {
        carried_warnings.append(&mut output.warnings);
        output.warnings = carried_warnings;
    }

    let history = if args.save {
        let username = args
            .username
            .as_deref()
            .ok_or("--username is required with --save")?;
        let password = args
            .password
            .as_deref()
            .ok_or("--password is required with --save")?;
        let user = authenticate(username, password)?;

        let store = HistoryStore::open(&args.history);
        let written = store.append(&user, &args.by.join(", "), &output.result.segments)?;
        Some(json!({ "path": args.history, "rows_appended": written }))
    } else {
        None
    };

    // Display rounding happens here, at the output boundary.
    for segment in &mut output.result.segments {
        let rounded = segment.rounded();
        *segment = rounded;
    }

    let mut value = serde_json::to_value(&output)?;
    if let (Some(saved), Some(map)) = (history, value.as_object_mut()) {
        map.insert("history".to_string(), saved);
    }
    Ok(value)
}
