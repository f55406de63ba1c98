//! Segment aggregation: PD / LGD / EAD / ECL per group.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Instant;

use crate::ecl::round_to;
use crate::error::CreditRiskError;
use crate::table::Table;
use crate::types::{with_metadata, ComputationOutput};
use crate::CreditRiskResult;

/// Base loss-given-default rate.
const LGD_BASE: f64 = 0.35;
/// LGD rises with the segment's mean interest rate: +0.05 per 100% of rate.
const LGD_RATE_SENSITIVITY: f64 = 0.05;
/// `loan_status` encoding for a defaulted loan.
const DEFAULT_STATUS: f64 = 0.0;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Risk metrics for one segment. Values are unrounded; see [`SegmentResult::rounded`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentResult {
    pub segment: String,
    pub total_loans: usize,
    /// Empirical default rate, in [0, 1]
    pub pd: f64,
    /// Heuristic loss given default, in [0, 1]
    pub lgd: f64,
    /// Mean loan amount
    pub ead: f64,
    /// PD × LGD × EAD
    pub ecl: f64,
}

impl SegmentResult {
    /// Display form: PD/LGD to 4 decimal places, EAD/ECL to 2.
    pub fn rounded(&self) -> SegmentResult {
        SegmentResult {
            segment: self.segment.clone(),
            total_loans: self.total_loans,
            pd: round_to(self.pd, 4),
            lgd: round_to(self.lgd, 4),
            ead: round_to(self.ead, 2),
            ecl: round_to(self.ecl, 2),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EclAnalysis {
    /// Grouping columns, in the order given by the caller
    pub grouping: Vec<String>,
    /// Sorted by ECL descending; ties keep first-encountered order
    pub segments: Vec<SegmentResult>,
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let mut sum = 0.0;
    let mut n = 0usize;
    for v in values {
        sum += v;
        n += 1;
    }
    if n == 0 {
        None
    } else {
        Some(sum / n as f64)
    }
}

/// Group a cleaned loan table and compute per-segment credit-loss metrics.
///
/// Multi-column segment labels are the column values joined by `", "` in the
/// order the grouping columns were given.
pub fn calculate_ecl(
    table: &Table,
    group_columns: &[String],
) -> CreditRiskResult<ComputationOutput<EclAnalysis>> {
    let started = Instant::now();
    let mut warnings = Vec::new();

    if group_columns.is_empty() {
        return Err(CreditRiskError::EmptyInput(
            "no grouping columns given".to_string(),
        ));
    }
    if table.is_empty() {
        return Err(CreditRiskError::EmptyInput(
            "dataset has no rows".to_string(),
        ));
    }

    let mut group_idx = Vec::with_capacity(group_columns.len());
    for column in group_columns {
        match table.column_index(column) {
            Some(idx) => group_idx.push(idx),
            None => {
                return Err(CreditRiskError::UnknownColumn {
                    column: column.clone(),
                })
            }
        }
    }
    let status_idx =
        table
            .column_index("loan_status")
            .ok_or_else(|| CreditRiskError::RequiredColumnMissing {
                column: "loan_status".to_string(),
            })?;
    let amnt_idx =
        table
            .column_index("loan_amnt")
            .ok_or_else(|| CreditRiskError::RequiredColumnMissing {
                column: "loan_amnt".to_string(),
            })?;
    let rate_idx = table.column_index("loan_int_rate");
    if rate_idx.is_none() {
        warnings.push(format!(
            "loan_int_rate column not found; LGD uses the {} base rate only",
            LGD_BASE
        ));
    }

    // Stable grouping: segments keep the order they are first encountered.
    let mut order: Vec<(String, Vec<usize>)> = Vec::new();
    let mut seen: HashMap<String, usize> = HashMap::new();
    for (row_idx, row) in table.rows().iter().enumerate() {
        let label = group_idx
            .iter()
            .map(|&i| row[i].to_string())
            .collect::<Vec<_>>()
            .join(", ");
        match seen.get(&label) {
            Some(&pos) => order[pos].1.push(row_idx),
            None => {
                seen.insert(label.clone(), order.len());
                order.push((label, vec![row_idx]));
            }
        }
    }

    let rows = table.rows();
    let mut segments: Vec<SegmentResult> = Vec::with_capacity(order.len());
    for (label, members) in order {
        let total_loans = members.len();
        let defaults = members
            .iter()
            .filter(|&&r| rows[r][status_idx].as_f64() == Some(DEFAULT_STATUS))
            .count();
        let pd = defaults as f64 / total_loans as f64;

        let ead = mean(
            members
                .iter()
                .filter_map(|&r| rows[r][amnt_idx].as_f64()),
        )
        .unwrap_or(0.0);

        let rate_adjustment = match rate_idx {
            Some(idx) => {
                let mean_rate =
                    mean(members.iter().filter_map(|&r| rows[r][idx].as_f64())).unwrap_or(0.0);
                mean_rate / 100.0 * LGD_RATE_SENSITIVITY
            }
            None => 0.0,
        };
        let lgd = LGD_BASE + rate_adjustment;

        let ecl = pd * lgd * ead;
        segments.push(SegmentResult {
            segment: label,
            total_loans,
            pd,
            lgd,
            ead,
            ecl,
        });
    }

    if segments.is_empty() {
        return Err(CreditRiskError::NoSegments);
    }
    // Stable sort, so ECL ties keep scan order.
    segments.sort_by(|a, b| b.ecl.total_cmp(&a.ecl));

    log::debug!(
        "aggregated {} rows into {} segment(s) by [{}]",
        table.n_rows(),
        segments.len(),
        group_columns.join(", ")
    );

    let assumptions = serde_json::json!({
        "lgd_base": LGD_BASE,
        "lgd_rate_sensitivity": LGD_RATE_SENSITIVITY,
        "default_status_value": DEFAULT_STATUS,
    });
    let elapsed = started.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Empirical default-rate PD, rate-adjusted heuristic LGD, mean-exposure EAD, ECL = PD * LGD * EAD",
        &assumptions,
        warnings,
        elapsed,
        EclAnalysis {
            grouping: group_columns.to_vec(),
            segments,
        },
    ))
}
