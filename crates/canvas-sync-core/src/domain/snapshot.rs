//! Snapshot model: an encoded capture of the canvas at one point in time.
//!
//! A snapshot is kept as the data URL text the rendering surface produces
//! (`data:image/png;base64,...`). Comparison is by value so two captures of an
//! unchanged canvas are equal even though they are different allocations.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use super::errors::SyncError;

/// Media-type envelope prepended by the capture source.
pub const PNG_ENVELOPE: &str = "data:image/png;base64,";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot(String);

impl Snapshot {
    pub fn new(data: impl Into<String>) -> Self {
        Self(data.into())
    }

    /// Build a snapshot from raw PNG bytes, wrapping them in the envelope.
    pub fn from_png_bytes(bytes: &[u8]) -> Self {
        Self(format!("{PNG_ENVELOPE}{}", STANDARD.encode(bytes)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Payload with the envelope removed (base64 text).
    pub fn stripped(&self) -> String {
        strip_envelope(&self.0)
    }

    /// Payload decoded to the binary image.
    pub fn decode(&self) -> Result<Vec<u8>, SyncError> {
        STANDARD
            .decode(self.stripped().trim())
            .map_err(|e| SyncError::InvalidPayload(format!("base64 decode: {e}")))
    }
}

/// Remove the first occurrence of the PNG envelope. No-op if absent.
pub fn strip_envelope(data: &str) -> String {
    data.replacen(PNG_ENVELOPE, "", 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_removes_envelope() {
        assert_eq!(strip_envelope("data:image/png;base64,AAA"), "AAA");
    }

    #[test]
    fn strip_is_noop_without_envelope() {
        assert_eq!(strip_envelope("AAA"), "AAA");
        assert_eq!(strip_envelope(""), "");
        assert_eq!(
            strip_envelope("data:image/jpeg;base64,AAA"),
            "data:image/jpeg;base64,AAA"
        );
    }

    #[test]
    fn snapshots_compare_by_value() {
        let a = Snapshot::new(String::from("data:image/png;base64,AAA"));
        let b = Snapshot::new(format!("{PNG_ENVELOPE}AAA"));
        assert_eq!(a, b);
        assert_ne!(a, Snapshot::new("data:image/png;base64,AAB"));
    }

    #[test]
    fn png_bytes_get_wrapped_and_decode_back() {
        let png = [0x89, b'P', b'N', b'G', 0x0d, 0x0a];
        let snap = Snapshot::from_png_bytes(&png);
        assert!(snap.as_str().starts_with(PNG_ENVELOPE));
        assert_eq!(snap.decode().unwrap(), png.to_vec());
    }

    #[test]
    fn decode_rejects_garbage() {
        let snap = Snapshot::new("data:image/png;base64,***");
        assert!(matches!(snap.decode(), Err(SyncError::InvalidPayload(_))));
    }
}
