//! In-memory doubles for the capture source and the uploader.
//!
//! Used by tests and by the CLI's dry-run mode, where uploads are recorded
//! instead of sent.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{NetworkErrorKind, Snapshot, SyncError, TargetId};
use crate::ports::{CaptureSource, Uploader};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Capture source that plays back a fixed script of frames.
///
/// `None` frames simulate a missing canvas. Once the script runs out the
/// last frame repeats forever.
#[derive(Default)]
pub struct ScriptedCapture {
    frames: Mutex<VecDeque<Option<String>>>,
    last: Mutex<Option<Option<String>>>,
}

impl ScriptedCapture {
    pub fn new<I, S>(frames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_script(frames.into_iter().map(|s| Some(s.into())))
    }

    pub fn from_script(frames: impl IntoIterator<Item = Option<String>>) -> Self {
        Self {
            frames: Mutex::new(frames.into_iter().collect()),
            last: Mutex::new(None),
        }
    }

    /// A capture source whose canvas never exists.
    pub fn unavailable() -> Self {
        Self::from_script([None])
    }
}

impl CaptureSource for ScriptedCapture {
    fn current_frame(&self) -> Result<Snapshot, SyncError> {
        let next = lock(&self.frames).pop_front();
        let frame = match next {
            Some(frame) => {
                *lock(&self.last) = Some(frame.clone());
                frame
            }
            None => lock(&self.last).clone().flatten(),
        };
        frame
            .map(Snapshot::new)
            .ok_or_else(|| SyncError::CaptureUnavailable("no canvas element".to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedUpload {
    pub target: TargetId,
    pub body: Vec<u8>,
}

/// Uploader that records every call and answers from a script.
///
/// Without a scripted response it answers 200.
#[derive(Default)]
pub struct RecordingUploader {
    responses: Mutex<VecDeque<Result<u16, (NetworkErrorKind, String)>>>,
    calls: Mutex<Vec<RecordedUpload>>,
    delay: Option<Duration>,
}

impl RecordingUploader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every upload sleeps this long before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn respond_with_status(&self, status: u16) -> &Self {
        lock(&self.responses).push_back(Ok(status));
        self
    }

    pub fn respond_with_network_error(
        &self,
        kind: NetworkErrorKind,
        cause: impl Into<String>,
    ) -> &Self {
        lock(&self.responses).push_back(Err((kind, cause.into())));
        self
    }

    pub fn calls(&self) -> Vec<RecordedUpload> {
        lock(&self.calls).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }
}

#[async_trait]
impl Uploader for RecordingUploader {
    async fn upload(&self, target: &TargetId, body: Vec<u8>) -> Result<u16, SyncError> {
        lock(&self.calls).push(RecordedUpload {
            target: target.clone(),
            body,
        });
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match lock(&self.responses).pop_front() {
            Some(Ok(status)) => Ok(status),
            Some(Err((kind, cause))) => Err(SyncError::network(kind, cause)),
            None => Ok(200),
        }
    }
}
