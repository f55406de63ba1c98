//! Schema validation and cleaning for uploaded loan portfolios.
//!
//! Covers:
//! 1. **Schema check** -- the 14 canonical columns must be present after
//!    header trimming and lowercasing.
//! 2. **Imputation** -- column median for numeric gaps, column mode for text
//!    gaps; unparsable numeric text is coerced to missing first, never dropped.
//! 3. **Normalization** -- fixed per-field casing rules.
//! 4. **Derivation** -- `loss_amount` = 40% of `loan_amnt` on default.
//! 5. **Outlier filtering** -- applied last, on the cleaned values.

use std::collections::HashMap;
use std::time::Instant;

use crate::error::CreditRiskError;
use crate::table::{Cell, Table};
use crate::types::{with_metadata, ComputationOutput, LoanRecord};
use crate::CreditRiskResult;

/// Assumed loss fraction on a defaulted loan. Fixed business parameter.
const LOSS_RATE_ON_DEFAULT: f64 = 0.4;

const LOAN_AMNT_MIN: f64 = 1_000.0;
const LOAN_AMNT_MAX: f64 = 1_000_000.0;
const CREDIT_SCORE_MIN: f64 = 300.0;
const CREDIT_SCORE_MAX: f64 = 850.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Float,
    Integer,
    Text,
}

/// The canonical upload schema with declared types.
const REQUIRED_COLUMNS: [(&str, ColumnKind); 14] = [
    ("person_age", ColumnKind::Float),
    ("person_gender", ColumnKind::Text),
    ("person_education", ColumnKind::Text),
    ("person_income", ColumnKind::Float),
    ("person_emp_exp", ColumnKind::Float),
    ("person_home_ownership", ColumnKind::Text),
    ("loan_amnt", ColumnKind::Float),
    ("loan_intent", ColumnKind::Text),
    ("loan_int_rate", ColumnKind::Float),
    ("loan_percent_income", ColumnKind::Float),
    ("cb_person_cred_hist_length", ColumnKind::Float),
    ("credit_score", ColumnKind::Float),
    ("previous_loan_defaults_on_file", ColumnKind::Text),
    ("loan_status", ColumnKind::Integer),
];

/// Derived column appended by the cleaner.
pub const LOSS_AMOUNT_COLUMN: &str = "loss_amount";

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn median(values: &mut Vec<f64>) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let n = values.len();
    Some(if n % 2 == 1 {
        values[n / 2]
    } else {
        (values[n / 2 - 1] + values[n / 2]) / 2.0
    })
}

/// Most frequent value; ties resolve to the lexicographically smallest,
/// matching the upstream `mode()[0]` convention.
fn mode(counts: &HashMap<String, usize>) -> Option<String> {
    counts
        .iter()
        .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
        .map(|(value, _)| value.clone())
}

fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn declared_kind(column: &str) -> Option<ColumnKind> {
    REQUIRED_COLUMNS
        .iter()
        .find(|(name, _)| *name == column)
        .map(|(_, kind)| *kind)
}

/// Passenger columns keep their data but still get filled. Numeric when
/// every present cell is numeric, text otherwise.
fn inferred_kind(table: &Table, idx: usize) -> ColumnKind {
    let mut any_value = false;
    for row in table.rows() {
        match &row[idx] {
            Cell::Null => {}
            Cell::Int(_) | Cell::Number(_) => any_value = true,
            Cell::Text(_) => return ColumnKind::Text,
        }
    }
    if any_value {
        ColumnKind::Float
    } else {
        ColumnKind::Text
    }
}

// ---------------------------------------------------------------------------
// Column passes
// ---------------------------------------------------------------------------

fn coerce_numeric_column(
    table: &mut Table,
    idx: usize,
    name: &str,
    kind: ColumnKind,
    required: bool,
    warnings: &mut Vec<String>,
) -> CreditRiskResult<()> {
    // Coerce first: unparsable text becomes missing, then the median rule
    // applies. Nothing is dropped here.
    let mut present: Vec<f64> = Vec::new();
    for row in table.rows_mut().iter_mut() {
        let cell = &mut row[idx];
        if let Cell::Text(s) = cell {
            let parsed = s.trim().parse::<f64>();
            *cell = match parsed {
                Ok(v) => Cell::Number(v),
                Err(_) => Cell::Null,
            };
        }
        if let Some(v) = cell.as_f64() {
            present.push(v);
        }
    }

    let fill = match median(&mut present) {
        Some(m) => m,
        None if required => {
            return Err(CreditRiskError::TypeCoercion {
                column: name.to_string(),
                expected: "number",
                reason: "no value in the column can be parsed as a number".to_string(),
            });
        }
        None => {
            warnings.push(format!("column '{}' is entirely missing; left as-is", name));
            return Ok(());
        }
    };

    let mut filled = 0usize;
    for row in table.rows_mut().iter_mut() {
        let cell = &mut row[idx];
        if cell.is_null() {
            *cell = Cell::Number(fill);
            filled += 1;
        }
        if kind == ColumnKind::Integer {
            if let Some(v) = cell.as_f64() {
                *cell = Cell::Int(v as i64);
            }
        }
    }
    if filled > 0 {
        warnings.push(format!(
            "column '{}': filled {} missing value(s) with the column median",
            name, filled
        ));
    }
    Ok(())
}

fn fill_text_column(
    table: &mut Table,
    idx: usize,
    name: &str,
    required: bool,
    warnings: &mut Vec<String>,
) -> CreditRiskResult<()> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    if let Some(cells) = table.column(name) {
        for cell in cells {
            if !cell.is_null() {
                *counts.entry(cell.to_string()).or_insert(0) += 1;
            }
        }
    }

    let fill = match mode(&counts) {
        Some(m) => m,
        None if required => {
            return Err(CreditRiskError::TypeCoercion {
                column: name.to_string(),
                expected: "text",
                reason: "no non-missing value to derive a fill from".to_string(),
            });
        }
        None => {
            warnings.push(format!("column '{}' is entirely missing; left as-is", name));
            return Ok(());
        }
    };

    let mut filled = 0usize;
    for row in table.rows_mut().iter_mut() {
        let cell = &mut row[idx];
        if cell.is_null() {
            *cell = Cell::Text(fill.clone());
            filled += 1;
        } else if cell.as_text().is_none() {
            // Stray numeric in a text column: keep its string form.
            let as_text = cell.to_string();
            *cell = Cell::Text(as_text);
        }
    }
    if filled > 0 {
        warnings.push(format!(
            "column '{}': filled {} missing value(s) with the column mode",
            name, filled
        ));
    }
    Ok(())
}

fn normalize_text_column(table: &mut Table, name: &str, f: impl Fn(&str) -> String) {
    if let Some(idx) = table.column_index(name) {
        for row in table.rows_mut().iter_mut() {
            let cell = &mut row[idx];
            if let Cell::Text(s) = cell {
                let normalized = f(s);
                *cell = Cell::Text(normalized);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Cleaning
// ---------------------------------------------------------------------------

/// Clean an uploaded portfolio into the canonical loan table.
///
/// The input is never mutated. Row order is preserved, minus the rows the
/// outlier filter removes at the end.
pub fn clean_loan_data(input: &Table) -> CreditRiskResult<ComputationOutput<Table>> {
    let started = Instant::now();
    let mut warnings = Vec::new();

    let mut table = input.clone();
    let normalized: Vec<String> = table
        .columns()
        .iter()
        .map(|c| c.trim().to_lowercase())
        .collect();
    table.rename_columns(normalized);

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|(name, _)| !table.has_column(name))
        .map(|(name, _)| name.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(CreditRiskError::Schema { columns: missing });
    }

    // Imputation and type coercion, column by column. Fills are computed on
    // the full dataset, before any row is filtered.
    let columns: Vec<String> = table.columns().to_vec();
    for (idx, name) in columns.iter().enumerate() {
        let required = declared_kind(name).is_some();
        let kind = declared_kind(name).unwrap_or_else(|| inferred_kind(&table, idx));
        match kind {
            ColumnKind::Float | ColumnKind::Integer => {
                coerce_numeric_column(&mut table, idx, name, kind, required, &mut warnings)?
            }
            ColumnKind::Text => fill_text_column(&mut table, idx, name, required, &mut warnings)?,
        }
    }

    // Fixed per-field text normalization.
    normalize_text_column(&mut table, "person_gender", |s| s.trim().to_lowercase());
    normalize_text_column(&mut table, "person_home_ownership", |s| {
        s.trim().to_uppercase()
    });
    normalize_text_column(&mut table, "loan_intent", |s| s.trim().to_uppercase());
    normalize_text_column(&mut table, "person_education", title_case);
    normalize_text_column(&mut table, "previous_loan_defaults_on_file", title_case);

    // Derived loss amount, recomputed even when the column already exists so
    // that cleaning a cleaned table is a no-op.
    let status_idx = table.column_index("loan_status").ok_or_else(|| {
        CreditRiskError::RequiredColumnMissing {
            column: "loan_status".to_string(),
        }
    })?;
    let amnt_idx = table.column_index("loan_amnt").ok_or_else(|| {
        CreditRiskError::RequiredColumnMissing {
            column: "loan_amnt".to_string(),
        }
    })?;
    let losses: Vec<Cell> = table
        .rows()
        .iter()
        .map(|row| {
            let defaulted = row[status_idx].as_f64() == Some(0.0);
            let amnt = row[amnt_idx].as_f64().unwrap_or(0.0);
            Cell::Number(if defaulted {
                amnt * LOSS_RATE_ON_DEFAULT
            } else {
                0.0
            })
        })
        .collect();
    if let Some(loss_idx) = table.column_index(LOSS_AMOUNT_COLUMN) {
        for (row, loss) in table.rows_mut().iter_mut().zip(losses) {
            row[loss_idx] = loss;
        }
    } else {
        table.push_column(LOSS_AMOUNT_COLUMN, losses)?;
    }

    // Outlier filtering happens last, on cleaned values. A filled median can
    // itself be filtered out when the column median lies outside range.
    let score_idx = table.column_index("credit_score").ok_or_else(|| {
        CreditRiskError::RequiredColumnMissing {
            column: "credit_score".to_string(),
        }
    })?;
    let before = table.n_rows();
    table.rows_mut().retain(|row| {
        let amnt = row[amnt_idx].as_f64().unwrap_or(f64::NAN);
        let score = row[score_idx].as_f64().unwrap_or(f64::NAN);
        amnt > LOAN_AMNT_MIN && amnt < LOAN_AMNT_MAX && (CREDIT_SCORE_MIN..=CREDIT_SCORE_MAX).contains(&score)
    });
    let dropped = before - table.n_rows();
    if dropped > 0 {
        warnings.push(format!(
            "dropped {} row(s) with loan_amnt outside ({}, {}) or credit_score outside [{}, {}]",
            dropped, LOAN_AMNT_MIN, LOAN_AMNT_MAX, CREDIT_SCORE_MIN, CREDIT_SCORE_MAX
        ));
    }

    log::info!(
        "cleaned dataset: {} rows x {} columns ({} dropped)",
        table.n_rows(),
        table.columns().len(),
        dropped
    );

    let assumptions = serde_json::json!({
        "loss_rate_on_default": LOSS_RATE_ON_DEFAULT,
        "loan_amnt_bounds_exclusive": [LOAN_AMNT_MIN, LOAN_AMNT_MAX],
        "credit_score_bounds_inclusive": [CREDIT_SCORE_MIN, CREDIT_SCORE_MAX],
        "numeric_fill": "column median",
        "text_fill": "column mode",
    });
    let elapsed = started.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Median/mode imputation, fixed text normalization, 40% loss on default, range filtering",
        &assumptions,
        warnings,
        elapsed,
        table,
    ))
}

/// Typed view of a cleaned table.
///
/// Fails if the table does not satisfy the cleaning invariants.
pub fn loan_records(table: &Table) -> CreditRiskResult<Vec<LoanRecord>> {
    let number = |row: usize, column: &str| -> CreditRiskResult<f64> {
        let cell = table
            .cell(row, column)
            .ok_or_else(|| CreditRiskError::RequiredColumnMissing {
                column: column.to_string(),
            })?;
        cell.as_f64().ok_or_else(|| CreditRiskError::TypeCoercion {
            column: column.to_string(),
            expected: "number",
            reason: format!("row {} holds '{}'", row, cell),
        })
    };
    let text = |row: usize, column: &str| -> CreditRiskResult<String> {
        let cell = table
            .cell(row, column)
            .ok_or_else(|| CreditRiskError::RequiredColumnMissing {
                column: column.to_string(),
            })?;
        Ok(cell.to_string())
    };

    let mut records = Vec::with_capacity(table.n_rows());
    for row in 0..table.n_rows() {
        records.push(LoanRecord {
            person_age: number(row, "person_age")?,
            person_gender: text(row, "person_gender")?,
            person_education: text(row, "person_education")?,
            person_income: number(row, "person_income")?,
            person_emp_exp: number(row, "person_emp_exp")?,
            person_home_ownership: text(row, "person_home_ownership")?,
            loan_amnt: number(row, "loan_amnt")?,
            loan_intent: text(row, "loan_intent")?,
            loan_int_rate: number(row, "loan_int_rate")?,
            loan_percent_income: number(row, "loan_percent_income")?,
            cb_person_cred_hist_length: number(row, "cb_person_cred_hist_length")?,
            credit_score: number(row, "credit_score")?,
            previous_loan_defaults_on_file: text(row, "previous_loan_defaults_on_file")?,
            loan_status: number(row, "loan_status")? as i64,
            loss_amount: number(row, LOSS_AMOUNT_COLUMN)?,
        });
    }
    Ok(records)
}
