//! Target identifier derived from the page location.
//!
//! The remote resource is addressed by the last path segment of the location,
//! cut at the first `-` (`/42-my-place` -> `42`).

use std::fmt;

use reqwest::Url;
use serde::{Deserialize, Serialize};

use super::errors::SyncError;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetId(String);

impl TargetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Extract the target identifier from an absolute URL.
///
/// An empty last segment yields an empty identifier. Only an unparseable URL
/// is an error.
pub fn extract_identifier(location: &str) -> Result<TargetId, SyncError> {
    let url = Url::parse(location).map_err(|_| SyncError::InvalidLocation(location.to_string()))?;
    Ok(identifier_from_path(url.path()))
}

fn identifier_from_path(path: &str) -> TargetId {
    let last = path.rsplit('/').next().unwrap_or("");
    let id = last.split('-').next().unwrap_or("");
    TargetId::new(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("https://host/42-my-place", "42")]
    #[case("https://host/42", "42")]
    #[case("https://host/", "")]
    #[case("https://host", "")]
    #[case("https://pixelplace.io/7-pixels-world-war", "7")]
    #[case("https://host/a/b/13-x-y", "13")]
    #[case("https://host/-lead", "")]
    #[case("https://host/42-x?tab=1#top", "42")]
    fn extracts_last_segment_up_to_dash(#[case] url: &str, #[case] expected: &str) {
        assert_eq!(extract_identifier(url).unwrap().as_str(), expected);
    }

    #[test]
    fn unparseable_location_is_an_error() {
        let err = extract_identifier("not a url").unwrap_err();
        assert!(matches!(err, SyncError::InvalidLocation(s) if s == "not a url"));
    }

    #[test]
    fn display_is_the_raw_id() {
        assert_eq!(TargetId::new("42").to_string(), "42");
    }
}
