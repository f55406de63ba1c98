use serde::{Deserialize, Serialize};

/// One row of the canonical cleaned loan table.
///
/// Field names follow the upload schema; every value satisfies the cleaning
/// invariants (no missing values, ranges enforced, text normalized).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanRecord {
    pub person_age: f64,
    pub person_gender: String,
    pub person_education: String,
    pub person_income: f64,
    pub person_emp_exp: f64,
    pub person_home_ownership: String,
    pub loan_amnt: f64,
    pub loan_intent: String,
    pub loan_int_rate: f64,
    pub loan_percent_income: f64,
    pub cb_person_cred_hist_length: f64,
    pub credit_score: f64,
    pub previous_loan_defaults_on_file: String,
    /// 0 = defaulted, 1 = performing
    pub loan_status: i64,
    /// 0.4 × loan_amnt when defaulted, else 0
    pub loss_amount: f64,
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "f64".to_string(),
        },
    }
}
