//! Page fetching.
//!
//! The extractor never talks to the network directly. It asks a
//! [`Fetcher`] for raw bytes and headers, and turns the answer into a
//! document itself. Tests plug in in-memory fetchers; the default
//! [`HttpFetcher`] (feature `http`) is built on `reqwest`.

use async_trait::async_trait;

/// A fetch that produced no usable response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct FetchError {
    /// Human-readable reason.
    pub message: String,
}

impl FetchError {
    /// Create an error from any message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Raw body and headers of a successful fetch.
#[derive(Debug, Clone, Default)]
pub struct FetchedPage {
    /// Undecoded response body.
    pub body: Vec<u8>,
    /// Response headers, names as sent.
    pub headers: Vec<(String, String)>,
}

impl FetchedPage {
    /// A page with an HTML body, as if served with `content-type: text/html`.
    #[must_use]
    pub fn html(body: impl Into<Vec<u8>>) -> Self {
        Self {
            body: body.into(),
            headers: vec![("content-type".to_string(), "text/html".to_string())],
        }
    }

    /// Case-insensitive header lookup.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// The `content-type` header.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }
}

/// Source of page bodies.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch `url`, sending `headers` in addition to the fetcher's own.
    async fn fetch(&self, url: &str, headers: &[(String, String)])
        -> Result<FetchedPage, FetchError>;
}

#[cfg(feature = "http")]
pub use http::HttpFetcher;

#[cfg(feature = "http")]
mod http {
    use std::time::Duration;

    use async_trait::async_trait;

    use super::{FetchError, FetchedPage, Fetcher};

    const USER_AGENT: &str = "Mozilla/5.0 (compatible; rs-article-parser/0.1)";
    const FETCH_TIMEOUT: Duration = Duration::from_secs(10);
    const MAX_CONTENT_LENGTH: usize = 5 * 1024 * 1024;
    const BAD_CONTENT_TYPES: &[&str] = &["audio/mpeg", "image/gif", "image/jpeg", "image/jpg"];

    /// HTTP fetcher backed by a shared `reqwest::Client`.
    #[derive(Debug, Clone)]
    pub struct HttpFetcher {
        client: reqwest::Client,
    }

    impl HttpFetcher {
        /// Build a fetcher with the default user agent and timeout.
        ///
        /// # Errors
        /// Returns an error when the TLS backend cannot be initialised.
        pub fn new() -> Result<Self, FetchError> {
            let client = reqwest::Client::builder()
                .user_agent(USER_AGENT)
                .timeout(FETCH_TIMEOUT)
                .build()
                .map_err(|err| FetchError::new(format!("failed to build HTTP client: {err}")))?;
            Ok(Self { client })
        }

        /// Use an existing client.
        #[must_use]
        pub fn with_client(client: reqwest::Client) -> Self {
            Self { client }
        }
    }

    #[async_trait]
    impl Fetcher for HttpFetcher {
        async fn fetch(
            &self,
            url: &str,
            headers: &[(String, String)],
        ) -> Result<FetchedPage, FetchError> {
            let mut request = self.client.get(url);
            for (name, value) in headers {
                request = request.header(name.as_str(), value.as_str());
            }

            let response = request
                .send()
                .await
                .map_err(|err| FetchError::new(format!("request to {url} failed: {err}")))?;

            let status = response.status();
            if !status.is_success() {
                return Err(FetchError::new(format!(
                    "resource returned a response status code of {status}"
                )));
            }

            let response_headers: Vec<(String, String)> = response
                .headers()
                .iter()
                .filter_map(|(name, value)| {
                    value
                        .to_str()
                        .ok()
                        .map(|v| (name.as_str().to_string(), v.to_string()))
                })
                .collect();

            let page = FetchedPage {
                body: Vec::new(),
                headers: response_headers,
            };
            if let Some(content_type) = page.content_type() {
                if BAD_CONTENT_TYPES
                    .iter()
                    .any(|bad| content_type.starts_with(bad))
                {
                    return Err(FetchError::new(format!(
                        "content-type for this resource was {content_type}"
                    )));
                }
            }

            let body = response
                .bytes()
                .await
                .map_err(|err| FetchError::new(format!("reading body of {url} failed: {err}")))?;
            if body.len() > MAX_CONTENT_LENGTH {
                return Err(FetchError::new(format!(
                    "content for this resource was too large ({} bytes)",
                    body.len()
                )));
            }

            Ok(FetchedPage {
                body: body.to_vec(),
                ..page
            })
        }
    }
}
