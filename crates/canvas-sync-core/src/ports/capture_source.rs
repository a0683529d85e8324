//! CaptureSource port - 描画面のキャプチャ
//!
//! ブラウザの canvas に相当するもの。同期的に最新フレームを返す。

use crate::domain::{Snapshot, SyncError};

/// CaptureSource は現在のフレームをエンコード済み snapshot として返す
///
/// # 契約
/// - 要素が存在しない / 空のときは `SyncError::CaptureUnavailable` を返す（panic しない）
/// - 呼び出しはブロックしない前提（await を挟まない）
pub trait CaptureSource: Send + Sync {
    fn current_frame(&self) -> Result<Snapshot, SyncError>;
}
