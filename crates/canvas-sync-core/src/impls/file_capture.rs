//! FileCaptureSource - ファイルを描画面として扱う CaptureSource
//!
//! 外部のレンダラーが書き出したファイルを毎サイクル読み直す。
//! - `data:` で始まるテキストはそのまま data URL として扱う
//! - それ以外は生の PNG バイト列とみなして envelope を付ける

use std::path::PathBuf;

use crate::domain::{Snapshot, SyncError};
use crate::ports::CaptureSource;

pub struct FileCaptureSource {
    path: PathBuf,
}

impl FileCaptureSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CaptureSource for FileCaptureSource {
    fn current_frame(&self) -> Result<Snapshot, SyncError> {
        let bytes = std::fs::read(&self.path).map_err(|e| {
            SyncError::CaptureUnavailable(format!("{}: {e}", self.path.display()))
        })?;
        if bytes.is_empty() {
            return Err(SyncError::CaptureUnavailable(format!(
                "{}: empty",
                self.path.display()
            )));
        }

        if bytes.starts_with(b"data:") {
            let text = String::from_utf8(bytes).map_err(|_| {
                SyncError::CaptureUnavailable(format!("{}: data url is not utf-8", self.path.display()))
            })?;
            return Ok(Snapshot::new(text.trim_end()));
        }

        Ok(Snapshot::from_png_bytes(&bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PNG_ENVELOPE;
    use std::io::Write;

    #[test]
    fn reads_data_url_text() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "data:image/png;base64,AAA").unwrap();

        let source = FileCaptureSource::new(file.path());
        let snap = source.current_frame().unwrap();
        assert_eq!(snap.as_str(), "data:image/png;base64,AAA");
    }

    #[test]
    fn wraps_raw_png_bytes() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0x89, b'P', b'N', b'G']).unwrap();

        let source = FileCaptureSource::new(file.path());
        let snap = source.current_frame().unwrap();
        assert!(snap.as_str().starts_with(PNG_ENVELOPE));
        assert_eq!(snap.decode().unwrap(), vec![0x89, b'P', b'N', b'G']);
    }

    #[test]
    fn missing_file_is_capture_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileCaptureSource::new(dir.path().join("canvas.png"));
        assert!(matches!(
            source.current_frame(),
            Err(SyncError::CaptureUnavailable(_))
        ));
    }

    #[test]
    fn empty_file_is_capture_unavailable() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let source = FileCaptureSource::new(file.path());
        assert!(matches!(
            source.current_frame(),
            Err(SyncError::CaptureUnavailable(_))
        ));
    }
}
