//! StaticLocation - 設定された URL を返すだけの LocationProvider

use crate::domain::SyncError;
use crate::ports::LocationProvider;

#[derive(Debug, Clone)]
pub struct StaticLocation {
    url: String,
}

impl StaticLocation {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl LocationProvider for StaticLocation {
    fn current_url(&self) -> Result<String, SyncError> {
        Ok(self.url.clone())
    }
}
