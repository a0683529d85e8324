//! Uploader port - アップロード先（HTTP エンドポイント）
//!
//! Uploader は 1 回だけ送信し、HTTP ステータスを返す。
//! 2xx かどうかの判定やリトライ方針はシンクロナイザー側の責務。

use async_trait::async_trait;

use crate::domain::{SyncError, TargetId};

/// Uploader は body を `{base_url}/{target}` へ送信する
///
/// # 契約
/// - 送信は 1 回のみ（内部でリトライしない）
/// - サーバーが応答した場合はステータスに関わらず `Ok(status)`
/// - 通信レベルの失敗（接続失敗、タイムアウト）は `SyncError::Network`
#[async_trait]
pub trait Uploader: Send + Sync {
    async fn upload(&self, target: &TargetId, body: Vec<u8>) -> Result<u16, SyncError>;
}
