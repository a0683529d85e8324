//! LocationProvider port - 現在の location URL

use crate::domain::SyncError;

/// LocationProvider は target id の導出元になる URL を返す
pub trait LocationProvider: Send + Sync {
    fn current_url(&self) -> Result<String, SyncError>;
}
