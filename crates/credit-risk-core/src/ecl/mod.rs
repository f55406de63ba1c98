//! Expected Credit Loss analytics.
//!
//! [`aggregate`] groups a cleaned loan table into risk segments and computes
//! PD / LGD / EAD / ECL per segment. [`combine`] folds an ad-hoc selection of
//! segments into one loan-count-weighted summary row.

pub mod aggregate;
pub mod combine;

pub use aggregate::{calculate_ecl, EclAnalysis, SegmentResult};
pub use combine::{combine_segments, CombinedSummary};

/// Display rounding. Metrics are kept unrounded internally; this is applied
/// only at the output boundary.
pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
