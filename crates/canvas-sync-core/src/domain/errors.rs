//! Errors - エラー型と分類
//!
//! 1 サイクル内で起きた失敗はすべて `SyncError` で表現し、ループには伝播させない。

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// ErrorKind は失敗の運用分類
///
/// - Capture: キャプチャ元が存在しない / 空
/// - Location: location URL が解析できない
/// - Payload: payload を送信用に変換できない
/// - Network: 通信レベルの失敗（リトライしない）
/// - Config: 起動時の設定エラー
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Capture,
    Location,
    Payload,
    Network,
    Config,
}

/// Transport-level failure classes reported by an uploader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkErrorKind {
    Connect,
    Timeout,
    Other,
}

impl std::fmt::Display for NetworkErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            NetworkErrorKind::Connect => "connect",
            NetworkErrorKind::Timeout => "timeout",
            NetworkErrorKind::Other => "other",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("capture unavailable: {0}")]
    CaptureUnavailable(String),

    #[error("invalid location url {0:?}")]
    InvalidLocation(String),

    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    #[error("network error ({kind}): {message}")]
    Network {
        kind: NetworkErrorKind,
        message: String,
    },

    #[error("config error: {0}")]
    Config(String),
}

impl SyncError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SyncError::CaptureUnavailable(_) => ErrorKind::Capture,
            SyncError::InvalidLocation(_) => ErrorKind::Location,
            SyncError::InvalidPayload(_) => ErrorKind::Payload,
            SyncError::Network { .. } => ErrorKind::Network,
            SyncError::Config(_) => ErrorKind::Config,
        }
    }

    pub fn network(kind: NetworkErrorKind, message: impl Into<String>) -> Self {
        SyncError::Network {
            kind,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_follows_variant() {
        assert_eq!(
            SyncError::CaptureUnavailable("no canvas".into()).kind(),
            ErrorKind::Capture
        );
        assert_eq!(
            SyncError::network(NetworkErrorKind::Timeout, "slow").kind(),
            ErrorKind::Network
        );
    }

    #[test]
    fn network_error_message_names_the_kind() {
        let err = SyncError::network(NetworkErrorKind::Connect, "connection refused");
        assert_eq!(
            err.to_string(),
            "network error (connect): connection refused"
        );
    }
}
