//! SynchronizerBuilder - ポートのワイヤリング
//!
//! # 学習ポイント
//! - Builder パターンの実装
//! - 起動時検証（Fail-fast 設計）: ポートの差し忘れは build() でエラーにする

use std::sync::Arc;

use super::config::SyncConfig;
use super::synchronizer::{SnapshotSynchronizer, SyncOptions};
use crate::domain::SyncError;
use crate::impls::{FileCaptureSource, HttpUploader, HttpUploaderConfig, StaticLocation};
use crate::ports::{CaptureSource, Clock, LocationProvider, SystemClock, Uploader};

/// BuildError はシンクロナイザー構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("missing port: {0}. Call the matching builder method before build().")]
    MissingPort(&'static str),

    #[error(transparent)]
    Sync(#[from] SyncError),
}

/// # 使用例
/// ```ignore
/// let sync = SynchronizerBuilder::new()
///     .capture(Arc::new(FileCaptureSource::new("canvas.png")))
///     .location(Arc::new(StaticLocation::new("https://pixelplace.io/42-x")))
///     .uploader(Arc::new(uploader))
///     .build()?;
/// ```
///
/// Clock を指定しなければ SystemClock、options を指定しなければ既定値を使う。
#[derive(Default)]
pub struct SynchronizerBuilder {
    capture: Option<Arc<dyn CaptureSource>>,
    location: Option<Arc<dyn LocationProvider>>,
    uploader: Option<Arc<dyn Uploader>>,
    clock: Option<Arc<dyn Clock>>,
    options: SyncOptions,
}

impl SynchronizerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wire the production adapters described by `config`.
    pub fn from_config(config: &SyncConfig) -> Result<Self, BuildError> {
        let mut http = HttpUploaderConfig::new(config.base_url.clone());
        http.token = config.token.clone();
        http.content_type = config.content_type.clone();
        http.timeout = config.request_timeout();
        let uploader = HttpUploader::new(http)?;

        Ok(Self::new()
            .capture(Arc::new(FileCaptureSource::new(&config.capture_path)))
            .location(Arc::new(StaticLocation::new(&config.location_url)))
            .uploader(Arc::new(uploader))
            .options(SyncOptions::from(config)))
    }

    pub fn capture(mut self, capture: Arc<dyn CaptureSource>) -> Self {
        self.capture = Some(capture);
        self
    }

    pub fn location(mut self, location: Arc<dyn LocationProvider>) -> Self {
        self.location = Some(location);
        self
    }

    pub fn uploader(mut self, uploader: Arc<dyn Uploader>) -> Self {
        self.uploader = Some(uploader);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn options(mut self, options: SyncOptions) -> Self {
        self.options = options;
        self
    }

    pub fn build(self) -> Result<SnapshotSynchronizer, BuildError> {
        let capture = self.capture.ok_or(BuildError::MissingPort("capture"))?;
        let location = self.location.ok_or(BuildError::MissingPort("location"))?;
        let uploader = self.uploader.ok_or(BuildError::MissingPort("uploader"))?;
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));

        Ok(SnapshotSynchronizer::new(
            capture,
            location,
            uploader,
            clock,
            self.options,
        ))
    }
}
