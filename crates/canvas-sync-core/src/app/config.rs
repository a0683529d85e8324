//! Configuration loading.
//!
//! Sources are merged in this order (later wins):
//! 1. `SyncConfig::default()`
//! 2. TOML file, if one is given (a given path that does not exist is an error)
//! 3. `CANVAS_SYNC_*` environment variables (`CANVAS_SYNC_INTERVAL_MS=60000`)
//!
//! figment parses env values into typed values, so `CANVAS_SYNC_TOKEN=12345`
//! arrives as a number and `CANVAS_SYNC_EXCLUDED_IDS=[7, 9]` as a list of
//! numbers. `token` and `excluded_ids` accept scalars and keep them as text.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::domain::{SyncError, extract_identifier};

pub const ENV_PREFIX: &str = "CANVAS_SYNC_";

/// How the stripped payload goes over the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyEncoding {
    /// Base64 text without the envelope. The backend decodes it.
    #[default]
    Base64,
    /// Decoded image bytes.
    Binary,
}

/// When the last-sent snapshot is remembered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RememberPolicy {
    /// Before the upload. A failed upload is not retried for the same content.
    #[default]
    OnAttempt,
    /// Only after a 2xx. Unchanged content is re-sent until it is accepted.
    OnSuccess,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub base_url: String,
    #[serde(deserialize_with = "lenient::text")]
    pub token: String,
    pub location_url: String,
    pub capture_path: PathBuf,
    pub initial_delay_ms: u64,
    pub interval_ms: u64,
    pub request_timeout_ms: u64,
    pub content_type: String,
    pub body_encoding: BodyEncoding,
    pub remember_policy: RememberPolicy,
    #[serde(deserialize_with = "lenient::text_list")]
    pub excluded_ids: Vec<String>,
    pub debug: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            base_url: "https://pixelplace.codebased.xyz/api/submit".to_string(),
            token: String::new(),
            location_url: String::new(),
            capture_path: PathBuf::from("canvas.png"),
            initial_delay_ms: 5_000,
            interval_ms: 600_000,
            request_timeout_ms: 30_000,
            content_type: "image/png".to_string(),
            body_encoding: BodyEncoding::Base64,
            remember_policy: RememberPolicy::OnAttempt,
            excluded_ids: vec!["7".to_string()],
            debug: false,
        }
    }
}

impl SyncConfig {
    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn excluded_set(&self) -> HashSet<String> {
        self.excluded_ids.iter().cloned().collect()
    }

    pub fn validate(&self) -> Result<(), SyncError> {
        let base = Url::parse(&self.base_url)
            .map_err(|e| SyncError::Config(format!("base_url {:?}: {e}", self.base_url)))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(SyncError::Config(format!(
                "base_url must be http(s), got {:?}",
                base.scheme()
            )));
        }
        if self.location_url.is_empty() {
            return Err(SyncError::Config("location_url is required".to_string()));
        }
        extract_identifier(&self.location_url)
            .map_err(|e| SyncError::Config(e.to_string()))?;
        if self.interval_ms == 0 {
            return Err(SyncError::Config("interval_ms must be > 0".to_string()));
        }
        if self.request_timeout_ms == 0 {
            return Err(SyncError::Config(
                "request_timeout_ms must be > 0".to_string(),
            ));
        }
        if self.content_type.trim().is_empty() {
            return Err(SyncError::Config("content_type is empty".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
    env_prefix: String,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            config_path: None,
            env_prefix: ENV_PREFIX.to_string(),
        }
    }

    pub fn with_config_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn with_env_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    pub fn load(&self) -> Result<SyncConfig, SyncError> {
        let mut figment = Figment::new().merge(Serialized::defaults(SyncConfig::default()));

        // an explicit path must exist; nothing is logged this early
        if let Some(path) = &self.config_path {
            if !path.is_file() {
                return Err(SyncError::Config(format!(
                    "config file {} not found",
                    path.display()
                )));
            }
            figment = figment.merge(Toml::file(path));
        }

        // flat keys, so no `.split("_")`: field names contain underscores
        figment = figment.merge(Env::prefixed(&self.env_prefix));

        let config: SyncConfig = figment
            .extract()
            .map_err(|e| SyncError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Deserializers that take strings, numbers or booleans as text.
mod lenient {
    use std::fmt;

    use serde::de::{self, Deserializer, SeqAccess, Visitor};
    use serde::Deserialize;

    struct Text;

    impl<'de> Visitor<'de> for Text {
        type Value = String;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a string or a number")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_string<E: de::Error>(self, v: String) -> Result<String, E> {
            Ok(v)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> Result<String, E> {
            Ok(v.to_string())
        }
    }

    pub fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        deserializer.deserialize_any(Text)
    }

    #[derive(Deserialize)]
    struct Item(#[serde(deserialize_with = "text")] String);

    struct TextList;

    impl<'de> Visitor<'de> for TextList {
        type Value = Vec<String>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a list of strings or numbers")
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Vec<String>, A::Error> {
            let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
            while let Some(Item(item)) = seq.next_element()? {
                items.push(item);
            }
            Ok(items)
        }

        // a single id: `CANVAS_SYNC_EXCLUDED_IDS=7`
        fn visit_str<E: de::Error>(self, v: &str) -> Result<Vec<String>, E> {
            Ok(vec![v.to_string()])
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Vec<String>, E> {
            Ok(vec![v.to_string()])
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Vec<String>, E> {
            Ok(vec![v.to_string()])
        }
    }

    pub fn text_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
        deserializer.deserialize_any(TextList)
    }
}
