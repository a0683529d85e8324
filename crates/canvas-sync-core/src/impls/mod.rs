//! Implementations - ports の実装
//!
//! # 提供する実装
//! - **HttpUploader**: reqwest ベースのアップロード（本番用）
//! - **FileCaptureSource**: ファイルを描画面として読む
//! - **StaticLocation**: 設定値の URL を返す
//! - **ScriptedCapture / RecordingUploader**: テスト・dry-run 用のダブル

pub mod file_capture;
pub mod http_uploader;
pub mod memory;
pub mod static_location;

pub use self::file_capture::FileCaptureSource;
pub use self::http_uploader::{HttpUploader, HttpUploaderConfig};
pub use self::memory::{RecordedUpload, RecordingUploader, ScriptedCapture};
pub use self::static_location::StaticLocation;
