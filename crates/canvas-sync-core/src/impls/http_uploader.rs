//! HttpUploader - reqwest ベースの Uploader
//!
//! # 実装詳細
//! - Client は起動時に 1 度だけ構築し、接続を使い回す
//! - リクエスト全体を `timeout` で打ち切る（タイムアウトは NetworkErrorKind::Timeout）
//! - Authorization ヘッダはトークンをそのまま送る（サーバー側が文字列一致で比較するため）
//! - ヘッダに使えない token / content type は new() で Config エラーにする

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderValue};
use reqwest::{Client, Url};

use crate::domain::{NetworkErrorKind, SyncError, TargetId};
use crate::ports::Uploader;

#[derive(Debug, Clone)]
pub struct HttpUploaderConfig {
    pub base_url: String,
    /// Empty token means no Authorization header.
    pub token: String,
    pub content_type: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl HttpUploaderConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: String::new(),
            content_type: "image/png".to_string(),
            timeout: Duration::from_secs(30),
            user_agent: format!("canvas-sync/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

pub struct HttpUploader {
    client: Client,
    base_url: String,
    token: Option<HeaderValue>,
    content_type: HeaderValue,
}

impl HttpUploader {
    pub fn new(config: HttpUploaderConfig) -> Result<Self, SyncError> {
        Url::parse(&config.base_url)
            .map_err(|e| SyncError::Config(format!("base_url {:?}: {e}", config.base_url)))?;

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| SyncError::Config(format!("http client: {e}")))?;

        let token = match config.token.as_str() {
            "" => None,
            raw => {
                let mut value = HeaderValue::from_str(raw).map_err(|_| {
                    SyncError::Config("token is not a valid header value".to_string())
                })?;
                value.set_sensitive(true);
                Some(value)
            }
        };
        let content_type = HeaderValue::from_str(&config.content_type).map_err(|_| {
            SyncError::Config(format!(
                "content_type {:?} is not a valid header value",
                config.content_type
            ))
        })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token,
            content_type,
        })
    }

    /// `{base_url}/{target}`
    pub fn endpoint(&self, target: &TargetId) -> String {
        format!("{}/{}", self.base_url, target)
    }
}

fn classify(err: &reqwest::Error) -> NetworkErrorKind {
    if err.is_timeout() {
        NetworkErrorKind::Timeout
    } else if err.is_connect() {
        NetworkErrorKind::Connect
    } else {
        NetworkErrorKind::Other
    }
}

#[async_trait]
impl Uploader for HttpUploader {
    async fn upload(&self, target: &TargetId, body: Vec<u8>) -> Result<u16, SyncError> {
        let mut request = self
            .client
            .post(self.endpoint(target))
            .header(CONTENT_TYPE, self.content_type.clone())
            .body(body);
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, token.clone());
        }

        let response = request
            .send()
            .await
            .map_err(|e| SyncError::network(classify(&e), e.to_string()))?;

        Ok(response.status().as_u16())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn uploader_for(server_url: &str, token: &str) -> HttpUploader {
        let mut config = HttpUploaderConfig::new(format!("{server_url}/api/submit"));
        config.token = token.to_string();
        HttpUploader::new(config).unwrap()
    }

    #[test]
    fn endpoint_joins_base_and_target() {
        let uploader = HttpUploader::new(HttpUploaderConfig::new("https://example.com/submit/")).unwrap();
        assert_eq!(
            uploader.endpoint(&TargetId::new("42")),
            "https://example.com/submit/42"
        );
        assert_eq!(
            uploader.endpoint(&TargetId::new("")),
            "https://example.com/submit/"
        );
    }

    #[test]
    fn rejects_unparseable_base_url() {
        let result = HttpUploader::new(HttpUploaderConfig::new("not a url"));
        assert!(matches!(result, Err(SyncError::Config(_))));
    }

    #[test]
    fn rejects_token_that_cannot_be_a_header() {
        let mut config = HttpUploaderConfig::new("https://example.com/submit");
        config.token = "line\nbreak".to_string();
        assert!(matches!(HttpUploader::new(config), Err(SyncError::Config(_))));

        let mut config = HttpUploaderConfig::new("https://example.com/submit");
        config.content_type = "image/png\r\n".to_string();
        assert!(matches!(HttpUploader::new(config), Err(SyncError::Config(_))));
    }

    #[tokio::test]
    async fn posts_body_with_token_and_content_type() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/submit/42")
            .match_header("authorization", "s3cret")
            .match_header("content-type", "image/png")
            .match_body("AAA")
            .with_status(200)
            .create_async()
            .await;

        let uploader = uploader_for(&server.url(), "s3cret");
        let status = uploader
            .upload(&TargetId::new("42"), b"AAA".to_vec())
            .await
            .unwrap();

        assert_eq!(status, 200);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn omits_authorization_without_token() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/submit/7")
            .match_header("authorization", Matcher::Missing)
            .with_status(401)
            .create_async()
            .await;

        let uploader = uploader_for(&server.url(), "");
        let status = uploader
            .upload(&TargetId::new("7"), b"AAA".to_vec())
            .await
            .unwrap();

        assert_eq!(status, 401);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn server_errors_are_statuses_not_errors() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/submit/42")
            .with_status(500)
            .create_async()
            .await;

        let uploader = uploader_for(&server.url(), "t");
        let status = uploader
            .upload(&TargetId::new("42"), Vec::new())
            .await
            .unwrap();
        assert_eq!(status, 500);
    }

    #[tokio::test]
    async fn connection_refused_is_a_network_error() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let uploader = uploader_for(&format!("http://127.0.0.1:{port}"), "t");
        let err = uploader
            .upload(&TargetId::new("42"), Vec::new())
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::Network { .. }));
    }

    #[tokio::test]
    async fn silent_server_times_out() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            // accept and never answer
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(10)).await;
            drop(socket);
        });

        let mut config = HttpUploaderConfig::new(format!("http://{addr}/api/submit"));
        config.timeout = Duration::from_millis(200);
        let uploader = HttpUploader::new(config).unwrap();

        let err = uploader
            .upload(&TargetId::new("42"), b"AAA".to_vec())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            SyncError::Network {
                kind: NetworkErrorKind::Timeout,
                ..
            }
        ));
        server.abort();
    }
}
