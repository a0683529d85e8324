//! Outcome model: what one submission attempt (and one cycle) ended with.
//!
//! Outcomes are data, not errors. A rejected upload or a dropped connection is
//! recorded here and logged; the loop keeps going either way.

use serde::{Deserialize, Serialize};

use super::errors::{ErrorKind, NetworkErrorKind, SyncError};
use super::target::TargetId;

/// Why a cycle did not reach the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Same bytes as the last remembered snapshot.
    Duplicate,
    /// The target is on the local exclusion list.
    Excluded,
}

/// Result of the single upload attempt. Never retried.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum UploadResult {
    Accepted { status: u16 },
    Rejected { status: u16 },
    NetworkError { kind: NetworkErrorKind, cause: String },
}

impl UploadResult {
    /// Classify an HTTP status code (2xx = accepted).
    pub fn from_status(status: u16) -> Self {
        if (200..300).contains(&status) {
            UploadResult::Accepted { status }
        } else {
            UploadResult::Rejected { status }
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, UploadResult::Accepted { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SubmitOutcome {
    Skipped { reason: SkipReason },
    Submitted { target: TargetId, upload: UploadResult },
}

impl SubmitOutcome {
    pub fn skipped(reason: SkipReason) -> Self {
        SubmitOutcome::Skipped { reason }
    }

    pub fn submitted(target: TargetId, upload: UploadResult) -> Self {
        SubmitOutcome::Submitted { target, upload }
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(
            self,
            SubmitOutcome::Skipped {
                reason: SkipReason::Duplicate
            }
        )
    }
}

/// One cycle as reported to callers and logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CycleResult {
    Completed(SubmitOutcome),
    Failed { kind: ErrorKind, message: String },
}

impl From<SyncError> for CycleResult {
    fn from(err: SyncError) -> Self {
        CycleResult::Failed {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleReport {
    pub cycle: u64,
    #[serde(flatten)]
    pub result: CycleResult,
}

impl CycleReport {
    pub fn outcome(&self) -> Option<&SubmitOutcome> {
        match &self.result {
            CycleResult::Completed(outcome) => Some(outcome),
            CycleResult::Failed { .. } => None,
        }
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        match &self.result {
            CycleResult::Completed(_) => None,
            CycleResult::Failed { kind, .. } => Some(*kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification() {
        assert!(UploadResult::from_status(200).is_accepted());
        assert!(UploadResult::from_status(204).is_accepted());
        assert_eq!(
            UploadResult::from_status(500),
            UploadResult::Rejected { status: 500 }
        );
        assert_eq!(
            UploadResult::from_status(302),
            UploadResult::Rejected { status: 302 }
        );
    }

    #[test]
    fn report_serializes_flat() {
        let report = CycleReport {
            cycle: 3,
            result: CycleResult::Completed(SubmitOutcome::submitted(
                TargetId::new("42"),
                UploadResult::Accepted { status: 200 },
            )),
        };
        let v = serde_json::to_value(&report).unwrap();
        assert_eq!(v["cycle"], 3);
        assert_eq!(v["status"], "completed");
    }

    #[test]
    fn failure_keeps_kind() {
        let result = CycleResult::from(SyncError::CaptureUnavailable("gone".into()));
        assert!(matches!(
            result,
            CycleResult::Failed { kind: ErrorKind::Capture, .. }
        ));
    }
}
