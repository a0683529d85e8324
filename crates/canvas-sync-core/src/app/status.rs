//! Status - 同期ループのカウンター
//!
//! 各サイクルの結果を集計する。ループからは watch チャネル経由で公開される。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{CycleReport, CycleResult, ErrorKind, SkipReason, SubmitOutcome, UploadResult};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncStats {
    pub cycles: u64,
    pub accepted: u64,
    pub rejected: u64,
    pub network_errors: u64,
    pub skipped_duplicate: u64,
    pub skipped_excluded: u64,
    pub capture_failures: u64,
    pub other_failures: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_status: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_cycle_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_accepted_at: Option<DateTime<Utc>>,
}

impl SyncStats {
    /// Number of cycles that reached the network.
    pub fn uploads(&self) -> u64 {
        self.accepted + self.rejected + self.network_errors
    }

    pub fn record(&mut self, report: &CycleReport, at: DateTime<Utc>) {
        self.cycles += 1;
        self.last_cycle_at = Some(at);

        match &report.result {
            CycleResult::Completed(SubmitOutcome::Skipped { reason }) => match reason {
                SkipReason::Duplicate => self.skipped_duplicate += 1,
                SkipReason::Excluded => self.skipped_excluded += 1,
            },
            CycleResult::Completed(SubmitOutcome::Submitted { upload, .. }) => match upload {
                UploadResult::Accepted { status } => {
                    self.accepted += 1;
                    self.last_status = Some(*status);
                    self.last_accepted_at = Some(at);
                }
                UploadResult::Rejected { status } => {
                    self.rejected += 1;
                    self.last_status = Some(*status);
                }
                UploadResult::NetworkError { .. } => self.network_errors += 1,
            },
            CycleResult::Failed {
                kind: ErrorKind::Capture,
                ..
            } => self.capture_failures += 1,
            CycleResult::Failed { .. } => self.other_failures += 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NetworkErrorKind, TargetId};
    use chrono::TimeZone;

    fn report(result: CycleResult) -> CycleReport {
        CycleReport { cycle: 1, result }
    }

    #[test]
    fn counts_each_kind_of_cycle() {
        let t = Utc.with_ymd_and_hms(2025, 3, 3, 0, 0, 0).unwrap();
        let id = TargetId::new("42");
        let mut stats = SyncStats::default();

        stats.record(
            &report(CycleResult::Completed(SubmitOutcome::submitted(
                id.clone(),
                UploadResult::Accepted { status: 200 },
            ))),
            t,
        );
        stats.record(
            &report(CycleResult::Completed(SubmitOutcome::skipped(
                SkipReason::Duplicate,
            ))),
            t,
        );
        stats.record(
            &report(CycleResult::Completed(SubmitOutcome::submitted(
                id.clone(),
                UploadResult::Rejected { status: 500 },
            ))),
            t,
        );
        stats.record(
            &report(CycleResult::Completed(SubmitOutcome::submitted(
                id,
                UploadResult::NetworkError {
                    kind: NetworkErrorKind::Timeout,
                    cause: "slow".into(),
                },
            ))),
            t,
        );
        stats.record(
            &report(CycleResult::Failed {
                kind: ErrorKind::Capture,
                message: "gone".into(),
            }),
            t,
        );

        assert_eq!(stats.cycles, 5);
        assert_eq!(stats.uploads(), 3);
        assert_eq!(stats.accepted, 1);
        assert_eq!(stats.skipped_duplicate, 1);
        assert_eq!(stats.capture_failures, 1);
        assert_eq!(stats.last_status, Some(500));
        assert_eq!(stats.last_accepted_at, Some(t));
    }
}
