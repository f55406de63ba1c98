use thiserror::Error;

#[derive(Debug, Error)]
pub enum CreditRiskError {
    #[error("Missing columns in dataset: {}", columns.join(", "))]
    Schema { columns: Vec<String> },

    #[error("Column '{column}' cannot be coerced to {expected}: {reason}")]
    TypeCoercion {
        column: String,
        expected: &'static str,
        reason: String,
    },

    #[error("Column '{column}' not found in dataset")]
    UnknownColumn { column: String },

    #[error("Required column '{column}' is missing")]
    RequiredColumnMissing { column: String },

    #[error("Empty input: {0}")]
    EmptyInput(String),

    #[error("Grouping produced no segments")]
    NoSegments,

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Recommendation unavailable: {0}")]
    RecommendationUnavailable(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for CreditRiskError {
    fn from(e: serde_json::Error) -> Self {
        CreditRiskError::Serialization(e.to_string())
    }
}

impl From<csv::Error> for CreditRiskError {
    fn from(e: csv::Error) -> Self {
        CreditRiskError::Storage(e.to_string())
    }
}

impl From<std::io::Error> for CreditRiskError {
    fn from(e: std::io::Error) -> Self {
        CreditRiskError::Storage(e.to_string())
    }
}
