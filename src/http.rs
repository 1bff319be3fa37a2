//! HTTP client shared by every hop of the token pipeline.
//!
//! Wraps `reqwest::Client` to provide:
//! * Consistent keep-alive, timeout and default `User-Agent`
//! * Request builders that carry per-request headers
//! * Mapping of transport errors into [`crate::error::Error`]
//!
//! Every call uses its own short-lived request; no state is kept between
//! calls other than the connection pool.
//!
//! # Example
//!
//! ```rust
//! use spotify_lyrics::http::Client;
//!
//! let client = Client::new(&config)?;
//! let request = client.get(url);
//! let response = client.execute(request).await?;
//! ```

use reqwest::{header::HeaderMap, Method, Url};

use crate::{config::Config, error::Result};

/// HTTP client with consistent configuration.
///
/// Cloning is cheap: clones share the same connection pool.
#[derive(Clone, Debug)]
pub struct Client {
    inner: reqwest::Client,
}

impl Client {
    /// Duration to keep idle connections alive.
    const KEEPALIVE_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(60);

    /// Creates a new client.
    ///
    /// The application user agent is only sent when a request does not set
    /// its own. If `config.timeout` is set, it bounds every request from
    /// connect to the end of the response body.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// * HTTP client creation fails
    /// * The user agent is not a valid header value
    pub fn new(config: &Config) -> Result<Self> {
        let mut http_client = reqwest::Client::builder()
            .tcp_keepalive(Self::KEEPALIVE_TIMEOUT)
            .user_agent(&config.app_user_agent);

        if let Some(timeout) = config.timeout {
            http_client = http_client.timeout(timeout);
        }

        // Stub servers in tests bind to loopback.
        #[cfg(test)]
        {
            http_client = http_client.no_proxy();
        }

        Ok(Self {
            inner: http_client.build()?,
        })
    }

    /// Builds a request with specified method, URL and headers.
    pub fn request<U>(&self, method: Method, url: U, headers: HeaderMap) -> reqwest::Request
    where
        U: Into<Url>,
    {
        let mut request = reqwest::Request::new(method, url.into());
        request.headers_mut().extend(headers);
        request
    }

    /// Builds a GET request without extra headers.
    pub fn get<U>(&self, url: U) -> reqwest::Request
    where
        U: Into<Url>,
    {
        self.request(Method::GET, url, HeaderMap::new())
    }

    /// Executes a request.
    ///
    /// The response is returned regardless of its status code; callers decide
    /// what a non-success status means for their endpoint.
    ///
    /// # Errors
    ///
    /// Returns error if the request could not be sent or timed out.
    pub async fn execute(&self, request: reqwest::Request) -> Result<reqwest::Response> {
        debug!("{} {}", request.method(), redact_query(request.url()));
        let response = self.inner.execute(request).await?;
        debug!("{} from {}", response.status(), redact_query(response.url()));
        Ok(response)
    }

    /// Executes a request and returns the response body as text.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the body cannot be read.
    pub async fn text(&self, request: reqwest::Request) -> Result<(reqwest::StatusCode, String)> {
        let response = self.execute(request).await?;
        let status = response.status();
        let body = response.text().await?;
        Ok((status, body))
    }
}

/// Formats a URL without its query string, which may carry one-time codes.
fn redact_query(url: &Url) -> String {
    let mut url = url.clone();
    if url.query().is_some() {
        url.set_query(Some("..."));
    }
    url.to_string()
}
