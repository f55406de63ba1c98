use clap::Args;
use serde_json::{json, Value};

use credit_risk_core::history::HistoryStore;

/// Arguments for browsing the history store
#[derive(Args)]
pub struct HistoryArgs {
    /// History CSV path
    #[arg(long, default_value = "user_ecl_history.csv")]
    pub file: String,

    /// Only show this user's rows
    #[arg(long)]
    pub user: Option<String>,
}

pub fn run_history(args: HistoryArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let store = HistoryStore::open(&args.file);
    let records = match args.user.as_deref() {
        Some(username) => store.load_for_user(username)?,
        None => store.load_all()?,
    };

    Ok(json!({
        "count": records.len(),
        "records": records,
    }))
}
