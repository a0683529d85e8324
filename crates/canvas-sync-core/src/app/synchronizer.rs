//! SnapshotSynchronizer - capture → compare → (skip | upload)
//!
//! # フロー（1 サイクル）
//! 1. CaptureSource から snapshot を取得
//! 2. 前回送信した snapshot と値で比較し、同じなら送信しない
//! 3. LocationProvider の URL から target id を導出
//! 4. Uploader で 1 回だけ送信（リトライしない）
//! 5. 結果をログと SyncStats に記録
//!
//! どのステップで失敗してもサイクル内で完結し、呼び出し側（ループ）には
//! `CycleReport` として返るだけで panic や Err は伝播しない。

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use tracing::{Instrument, debug, error, info, info_span, warn};

use super::config::{BodyEncoding, RememberPolicy, SyncConfig};
use super::status::SyncStats;
use crate::domain::{
    CycleReport, CycleResult, ErrorKind, SkipReason, Snapshot, SubmitOutcome, SyncError,
    TargetId, UploadResult, extract_identifier,
};
use crate::ports::{CaptureSource, Clock, LocationProvider, Uploader};

/// Where a cycle currently is. Only used for tracing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePhase {
    Idle,
    Capturing,
    Comparing,
    Skipping,
    Uploading,
}

impl fmt::Display for CyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CyclePhase::Idle => "idle",
            CyclePhase::Capturing => "capturing",
            CyclePhase::Comparing => "comparing",
            CyclePhase::Skipping => "skipping",
            CyclePhase::Uploading => "uploading",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncOptions {
    pub body_encoding: BodyEncoding,
    pub remember_policy: RememberPolicy,
    pub excluded_ids: HashSet<String>,
}

impl From<&SyncConfig> for SyncOptions {
    fn from(config: &SyncConfig) -> Self {
        Self {
            body_encoding: config.body_encoding,
            remember_policy: config.remember_policy,
            excluded_ids: config.excluded_set(),
        }
    }
}

pub struct SnapshotSynchronizer {
    capture: Arc<dyn CaptureSource>,
    location: Arc<dyn LocationProvider>,
    uploader: Arc<dyn Uploader>,
    clock: Arc<dyn Clock>,
    options: SyncOptions,
    last: Option<Snapshot>,
    cycle: u64,
    stats: SyncStats,
}

impl SnapshotSynchronizer {
    pub fn new(
        capture: Arc<dyn CaptureSource>,
        location: Arc<dyn LocationProvider>,
        uploader: Arc<dyn Uploader>,
        clock: Arc<dyn Clock>,
        options: SyncOptions,
    ) -> Self {
        Self {
            capture,
            location,
            uploader,
            clock,
            options,
            last: None,
            cycle: 0,
            stats: SyncStats::default(),
        }
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    pub fn stats(&self) -> &SyncStats {
        &self.stats
    }

    /// The snapshot future captures are compared against.
    pub fn last_snapshot(&self) -> Option<&Snapshot> {
        self.last.as_ref()
    }

    pub fn capture_snapshot(&self) -> Result<Snapshot, SyncError> {
        let snapshot = self.capture.current_frame()?;
        if snapshot.is_empty() {
            return Err(SyncError::CaptureUnavailable("empty frame".to_string()));
        }
        Ok(snapshot)
    }

    pub fn current_target(&self) -> Result<TargetId, SyncError> {
        let url = self.location.current_url()?;
        extract_identifier(&url)
    }

    pub fn is_duplicate(&self, snapshot: &Snapshot) -> bool {
        self.last.as_ref() == Some(snapshot)
    }

    fn encode_body(&self, snapshot: &Snapshot) -> Result<Vec<u8>, SyncError> {
        match self.options.body_encoding {
            BodyEncoding::Base64 => Ok(snapshot.stripped().into_bytes()),
            BodyEncoding::Binary => snapshot.decode(),
        }
    }

    /// Upload `snapshot` to `target` unless it equals the remembered one.
    ///
    /// Exactly one upload per changed snapshot. Transport failures and
    /// non-2xx statuses come back as `Submitted` outcomes; `Err` is only
    /// returned when the body cannot be built, and then nothing is sent.
    pub async fn submit_if_changed(
        &mut self,
        snapshot: Snapshot,
        target: &TargetId,
    ) -> Result<SubmitOutcome, SyncError> {
        if self.options.excluded_ids.contains(target.as_str()) {
            debug!(phase = %CyclePhase::Skipping, target_id = %target, "target excluded");
            return Ok(SubmitOutcome::skipped(SkipReason::Excluded));
        }
        if self.is_duplicate(&snapshot) {
            debug!(phase = %CyclePhase::Skipping, "unchanged snapshot");
            return Ok(SubmitOutcome::skipped(SkipReason::Duplicate));
        }

        let body = self.encode_body(&snapshot)?;

        let pending = match self.options.remember_policy {
            RememberPolicy::OnAttempt => {
                self.last = Some(snapshot);
                None
            }
            RememberPolicy::OnSuccess => Some(snapshot),
        };

        debug!(phase = %CyclePhase::Uploading, target_id = %target, bytes = body.len());
        let upload = match self.uploader.upload(target, body).await {
            Ok(status) => UploadResult::from_status(status),
            Err(SyncError::Network { kind, message }) => UploadResult::NetworkError {
                kind,
                cause: message,
            },
            Err(other) => return Err(other),
        };

        if let Some(snapshot) = pending
            && upload.is_accepted()
        {
            self.last = Some(snapshot);
        }

        Ok(SubmitOutcome::submitted(target.clone(), upload))
    }

    /// Run one full cycle. Never fails: every error ends up in the report.
    pub async fn run_cycle(&mut self) -> CycleReport {
        self.cycle += 1;
        let cycle = self.cycle;

        let result = match self
            .try_cycle()
            .instrument(info_span!("cycle", n = cycle))
            .await
        {
            Ok(outcome) => CycleResult::Completed(outcome),
            Err(err) => CycleResult::from(err),
        };

        let report = CycleReport { cycle, result };
        log_report(&report);
        self.stats.record(&report, self.clock.now());
        debug!(phase = %CyclePhase::Idle, cycle);
        report
    }

    async fn try_cycle(&mut self) -> Result<SubmitOutcome, SyncError> {
        debug!(phase = %CyclePhase::Capturing);
        let snapshot = self.capture_snapshot()?;

        debug!(phase = %CyclePhase::Comparing, bytes = snapshot.len());
        if self.is_duplicate(&snapshot) {
            debug!(phase = %CyclePhase::Skipping, "unchanged snapshot");
            return Ok(SubmitOutcome::skipped(SkipReason::Duplicate));
        }

        let target = self.current_target()?;
        self.submit_if_changed(snapshot, &target).await
    }
}

fn log_report(report: &CycleReport) {
    let cycle = report.cycle;
    match &report.result {
        CycleResult::Completed(SubmitOutcome::Skipped { reason }) => match reason {
            SkipReason::Duplicate => warn!(cycle, "duplicate snapshot, not sending"),
            SkipReason::Excluded => info!(cycle, "target is excluded, not sending"),
        },
        CycleResult::Completed(SubmitOutcome::Submitted { target, upload }) => match upload {
            UploadResult::Accepted { status } => {
                info!(cycle, target_id = %target, status, "snapshot submitted")
            }
            UploadResult::Rejected { status } => {
                error!(cycle, target_id = %target, status, "snapshot rejected by server")
            }
            UploadResult::NetworkError { kind, cause } => {
                error!(cycle, target_id = %target, %kind, cause = %cause, "snapshot upload failed")
            }
        },
        CycleResult::Failed {
            kind: ErrorKind::Capture,
            message,
        } => warn!(cycle, error = %message, "capture unavailable, waiting for next cycle"),
        CycleResult::Failed { kind, message } => {
            error!(cycle, ?kind, error = %message, "cycle failed")
        }
    }
}
