//! Remote metadata probe.
//!
//! Learns the content type and size of a remote file with a HEAD request,
//! falling back once to a single-byte ranged GET when the HEAD fails.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE, HeaderMap, RANGE};
use reqwest::{Client, Method, StatusCode, redirect};
use tracing::debug;

use archivehub_core::config::HierarchyConfig;
use archivehub_core::error::{AppError, ErrorKind};
use archivehub_core::result::AppResult;

/// What a probe learned about a remote file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteMetadata {
    /// MIME type without parameters, lower-cased.
    pub mime_type: Option<String>,
    /// Total size in bytes.
    pub size: Option<i64>,
}

/// Source of remote file metadata.
#[async_trait]
pub trait MetadataProbe: Send + Sync + std::fmt::Debug + 'static {
    /// Inspect `url`. Errors are reported to the caller, which treats them
    /// as non-fatal.
    async fn probe(&self, url: &str) -> AppResult<RemoteMetadata>;
}

/// [`MetadataProbe`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpMetadataProbe {
    client: Client,
}

impl HttpMetadataProbe {
    /// Build a probe with a per-request timeout and a redirect cap.
    pub fn new(timeout: Duration, max_redirects: usize) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(redirect::Policy::limited(max_redirects))
            .build()
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Configuration,
                    format!("Failed to build metadata probe client: {e}"),
                    e,
                )
            })?;
        Ok(Self { client })
    }

    /// Build a probe from the hierarchy configuration.
    pub fn from_config(config: &HierarchyConfig) -> AppResult<Self> {
        Self::new(config.probe_timeout(), config.probe_max_redirects)
    }

    async fn attempt(&self, method: Method, url: &str) -> AppResult<RemoteMetadata> {
        let mut request = self.client.request(method.clone(), url);
        if method == Method::GET {
            request = request.header(RANGE, "bytes=0-0");
        }

        let response = request.send().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::ExternalService,
                format!("{method} {url} failed: {e}"),
                e,
            )
        })?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(AppError::external_service(format!(
                "{method} {url} answered {status}"
            )));
        }

        Ok(metadata_from_headers(
            response.headers(),
            status == StatusCode::PARTIAL_CONTENT,
        ))
    }
}

#[async_trait]
impl MetadataProbe for HttpMetadataProbe {
    async fn probe(&self, url: &str) -> AppResult<RemoteMetadata> {
        match self.attempt(Method::HEAD, url).await {
            Ok(metadata) => Ok(metadata),
            Err(e) => {
                debug!(url, error = %e, "HEAD probe failed, retrying with ranged GET");
                self.attempt(Method::GET, url).await
            }
        }
    }
}

/// Extract MIME type and size from response headers.
///
/// For a partial (206) response `Content-Length` only describes the returned
/// slice, so the `Content-Range` total is preferred there. Otherwise
/// `Content-Range` is used only when `Content-Length` is absent or zero.
pub fn metadata_from_headers(headers: &HeaderMap, partial: bool) -> RemoteMetadata {
    let mime_type = header_str(headers, CONTENT_TYPE.as_str())
        .and_then(|v| v.split(';').next())
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty());

    let length = header_str(headers, CONTENT_LENGTH.as_str())
        .and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|n| *n > 0);
    let range_total =
        header_str(headers, CONTENT_RANGE.as_str()).and_then(parse_content_range_total);

    let size = if partial {
        range_total.or(length)
    } else {
        length.or(range_total)
    };

    RemoteMetadata { mime_type, size }
}

/// Total size from a `Content-Range` value such as `bytes 0-0/1234`.
///
/// An unknown total (`*`) yields `None`.
pub fn parse_content_range_total(value: &str) -> Option<i64> {
    let (_, total) = value.trim().rsplit_once('/')?;
    total.trim().parse::<i64>().ok().filter(|n| *n > 0)
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use reqwest::header::HeaderValue;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Method and `Range` header of one request seen by [`serve`].
    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Seen {
        method: String,
        range: Option<String>,
    }

    /// Answer every request on a local port with `respond(method)` and close.
    async fn serve<F>(respond: F) -> (String, Arc<Mutex<Vec<Seen>>>)
    where
        F: Fn(&str) -> &'static str + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = seen.clone();

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = Vec::new();
                let mut chunk = [0u8; 1024];
                while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut chunk).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => buf.extend_from_slice(&chunk[..n]),
                    }
                }

                let request = String::from_utf8_lossy(&buf);
                let method = request
                    .split_whitespace()
                    .next()
                    .unwrap_or_default()
                    .to_string();
                let range = request.lines().find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.trim()
                        .eq_ignore_ascii_case("range")
                        .then(|| value.trim().to_string())
                });

                let response = respond(&method);
                log.lock().unwrap().push(Seen { method, range });
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        (format!("http://{addr}/files/report.pdf"), seen)
    }

    fn probe() -> HttpMetadataProbe {
        HttpMetadataProbe::new(Duration::from_secs(5), 10).unwrap()
    }

    #[tokio::test]
    async fn test_head_answer_is_used_directly() {
        let (url, seen) = serve(|_| {
            "HTTP/1.1 200 OK\r\nContent-Type: application/pdf\r\nContent-Length: 2048\r\nConnection: close\r\n\r\n"
        })
        .await;

        let meta = probe().probe(&url).await.unwrap();
        assert_eq!(meta.mime_type.as_deref(), Some("application/pdf"));
        assert_eq!(meta.size, Some(2048));

        let seen = seen.lock().unwrap().clone();
        assert_eq!(
            seen,
            [Seen {
                method: "HEAD".to_string(),
                range: None
            }]
        );
    }

    #[tokio::test]
    async fn test_rejected_head_falls_back_to_ranged_get() {
        let (url, seen) = serve(|method| match method {
            "HEAD" => {
                "HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
            }
            _ => {
                "HTTP/1.1 206 Partial Content\r\nContent-Type: application/pdf\r\nContent-Range: bytes 0-0/4242\r\nContent-Length: 1\r\nConnection: close\r\n\r\nx"
            }
        })
        .await;

        let meta = probe().probe(&url).await.unwrap();
        assert_eq!(
            meta,
            RemoteMetadata {
                mime_type: Some("application/pdf".to_string()),
                size: Some(4242),
            }
        );

        let seen = seen.lock().unwrap().clone();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].method, "HEAD");
        assert_eq!(seen[1].method, "GET");
        assert_eq!(seen[1].range.as_deref(), Some("bytes=0-0"));
    }

    #[tokio::test]
    async fn test_server_errors_on_both_attempts_fail() {
        let (url, seen) = serve(|_| {
            "HTTP/1.1 503 Service Unavailable\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
        })
        .await;

        let err = probe().probe(&url).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::ExternalService);
        assert_eq!(seen.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_redirect_loop_is_rejected() {
        let (url, seen) = serve(|_| {
            "HTTP/1.1 302 Found\r\nLocation: /files/loop\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
        })
        .await;

        let err = probe().probe(&url).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::ExternalService);

        let seen = seen.lock().unwrap().clone();
        assert!(seen.iter().any(|s| s.method == "GET"));
        // Each attempt stops after the redirect cap instead of looping forever.
        assert!(seen.len() <= 2 * 11);
    }

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for &(name, value) in pairs {
            map.insert(name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn test_content_type_parameters_are_stripped() {
        let meta = metadata_from_headers(
            &headers(&[
                ("content-type", "Text/HTML; charset=UTF-8"),
                ("content-length", "2048"),
            ]),
            false,
        );
        assert_eq!(meta.mime_type.as_deref(), Some("text/html"));
        assert_eq!(meta.size, Some(2048));
    }

    #[test]
    fn test_zero_length_falls_back_to_content_range() {
        let meta = metadata_from_headers(
            &headers(&[("content-length", "0"), ("content-range", "bytes 0-0/5120")]),
            false,
        );
        assert_eq!(meta.size, Some(5120));
        assert_eq!(meta.mime_type, None);
    }

    #[test]
    fn test_partial_response_prefers_range_total() {
        let meta = metadata_from_headers(
            &headers(&[("content-length", "1"), ("content-range", "bytes 0-0/99999")]),
            true,
        );
        assert_eq!(meta.size, Some(99999));
    }

    #[test]
    fn test_parse_content_range_total() {
        assert_eq!(parse_content_range_total("bytes 0-0/1234"), Some(1234));
        assert_eq!(parse_content_range_total("bytes 0-0/*"), None);
        assert_eq!(parse_content_range_total("garbage"), None);
    }

    #[test]
    fn test_from_config() {
        assert!(HttpMetadataProbe::from_config(&HierarchyConfig::default()).is_ok());
    }
}
