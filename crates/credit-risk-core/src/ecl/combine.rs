//! Ad-hoc recombination of already-aggregated segments.

use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::ecl::{round_to, SegmentResult};
use crate::error::CreditRiskError;
use crate::types::{with_metadata, ComputationOutput};
use crate::CreditRiskResult;

/// Loan-count-weighted summary of a segment selection.
///
/// EAD is deliberately the unweighted mean of the selected segments' EADs
/// while PD/LGD/ECL are count-weighted; the asymmetry is inherited behavior,
/// not an oversight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedSummary {
    pub segment: String,
    pub total_loans: usize,
    pub pd: f64,
    pub lgd: f64,
    pub avg_ead: f64,
    pub ecl: f64,
}

impl CombinedSummary {
    /// Display form: PD/LGD to 4 decimal places, EAD/ECL to 2.
    pub fn rounded(&self) -> CombinedSummary {
        CombinedSummary {
            segment: self.segment.clone(),
            total_loans: self.total_loans,
            pd: round_to(self.pd, 4),
            lgd: round_to(self.lgd, 4),
            avg_ead: round_to(self.avg_ead, 2),
            ecl: round_to(self.ecl, 2),
        }
    }
}

/// Combine the selected segments into one weighted summary row.
///
/// Labels that do not appear in `segments` are ignored, mirroring
/// pick-from-a-list selection semantics.
pub fn combine_segments(
    segments: &[SegmentResult],
    selected: &[String],
) -> CreditRiskResult<ComputationOutput<CombinedSummary>> {
    let started = Instant::now();
    let mut warnings = Vec::new();

    let matched: Vec<&SegmentResult> = segments
        .iter()
        .filter(|s| selected.iter().any(|label| *label == s.segment))
        .collect();

    let ignored: Vec<&String> = selected
        .iter()
        .filter(|label| !segments.iter().any(|s| s.segment == **label))
        .collect();
    if !ignored.is_empty() {
        warnings.push(format!(
            "ignored {} selected label(s) not present in the result table: {}",
            ignored.len(),
            ignored
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ));
    }

    let total_loans: usize = matched.iter().map(|s| s.total_loans).sum();
    if total_loans == 0 {
        return Err(CreditRiskError::DivisionByZero {
            context: "combined segment selection (no loans selected)".to_string(),
        });
    }
    let total = total_loans as f64;

    let pd = matched
        .iter()
        .map(|s| s.pd * s.total_loans as f64)
        .sum::<f64>()
        / total;
    let lgd = matched
        .iter()
        .map(|s| s.lgd * s.total_loans as f64)
        .sum::<f64>()
        / total;
    let ecl = matched
        .iter()
        .map(|s| s.ecl * s.total_loans as f64)
        .sum::<f64>()
        / total;
    let avg_ead = matched.iter().map(|s| s.ead).sum::<f64>() / matched.len() as f64;

    let segment = matched
        .iter()
        .map(|s| s.segment.as_str())
        .collect::<Vec<_>>()
        .join(" + ");

    let assumptions = serde_json::json!({
        "pd": "loan-count weighted",
        "lgd": "loan-count weighted",
        "ecl": "loan-count weighted",
        "ead": "unweighted mean",
    });
    let elapsed = started.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Loan-count-weighted PD/LGD/ECL with unweighted mean EAD",
        &assumptions,
        warnings,
        elapsed,
        CombinedSummary {
            segment,
            total_loans,
            pd,
            lgd,
            avg_ead,
            ecl,
        },
    ))
}
