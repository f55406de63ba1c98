pub mod error;
pub mod table;
pub mod types;

pub mod auth;
pub mod cleaning;
pub mod ecl;
pub mod history;
pub mod recommend;

pub use error::CreditRiskError;
pub use table::{Cell, Table};
pub use types::*;

/// Standard result type for all credit-risk operations
pub type CreditRiskResult<T> = Result<T, CreditRiskError>;
