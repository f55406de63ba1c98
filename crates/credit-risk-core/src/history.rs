//! Append-only CSV history of aggregation results.
//!
//! Each aggregation call appends one row per segment, tagged with the user,
//! their role, the grouping description, and a timestamp. Rows are never
//! overwritten. The store owns its copies; persisting does not alias the
//! in-memory result table.

use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use crate::auth::AuthenticatedUser;
use crate::ecl::SegmentResult;
use crate::CreditRiskResult;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One persisted segment row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub segment: String,
    pub total_loans: usize,
    pub pd: f64,
    pub lgd: f64,
    pub ead: f64,
    pub ecl: f64,
    pub username: String,
    pub role: String,
    pub segment_col: String,
    pub timestamp: String,
}

pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        HistoryStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one row per segment. Returns the number of rows written.
    /// Display-rounded metric values are persisted.
    pub fn append(
        &self,
        user: &AuthenticatedUser,
        grouping: &str,
        segments: &[SegmentResult],
    ) -> CreditRiskResult<usize> {
        if segments.is_empty() {
            return Ok(0);
        }

        let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
        // An empty file still needs its header row, so key on length, not
        // existence.
        let has_rows = std::fs::metadata(&self.path)
            .map(|m| m.len() > 0)
            .unwrap_or(false);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(!has_rows)
            .from_writer(file);

        for segment in segments {
            let rounded = segment.rounded();
            wtr.serialize(HistoryRecord {
                segment: rounded.segment,
                total_loans: rounded.total_loans,
                pd: rounded.pd,
                lgd: rounded.lgd,
                ead: rounded.ead,
                ecl: rounded.ecl,
                username: user.username.clone(),
                role: user.role.to_string(),
                segment_col: grouping.to_string(),
                timestamp: timestamp.clone(),
            })?;
        }
        wtr.flush()?;

        log::info!(
            "history: appended {} row(s) for user '{}' ({})",
            segments.len(),
            user.username,
            grouping
        );
        Ok(segments.len())
    }

    /// Every historical row, in append order. Missing file reads as empty.
    pub fn load_all(&self) -> CreditRiskResult<Vec<HistoryRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut rdr = csv::Reader::from_path(&self.path)?;
        let mut records = Vec::new();
        for record in rdr.deserialize() {
            records.push(record?);
        }
        Ok(records)
    }

    pub fn load_for_user(&self, username: &str) -> CreditRiskResult<Vec<HistoryRecord>> {
        let mut records = self.load_all()?;
        records.retain(|r| r.username == username);
        Ok(records)
    }
}
