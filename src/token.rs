//! Exchange of a session cookie for an access token.
//!
//! One exchange takes three round trips:
//! 1. Spotify's server time, the TOTP time base
//! 2. The current secret and its version, unless the [`SecretCache`] still
//!    holds one
//! 3. The token request itself, carrying the TOTP and the `sp_dc` cookie
//!
//! # Query
//!
//! ```text
//! GET /api/token?reason=transport&productType=web-player&totp=123456&totpVer=61&ts=1759060399123
//! Cookie: sp_dc=...
//! User-Agent: Mozilla/5.0 ...
//! ```
//!
//! `ts` is the local wall clock in milliseconds at submission time. It is a
//! request timestamp, unrelated to the server time the TOTP is based on.

use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, COOKIE, USER_AGENT},
    Method,
};
use url::Url;

use crate::{
    clock::ServerClock,
    config::Config,
    error::{ErrorKind, Result},
    http::Client as HttpClient,
    protocol::token::AccessToken,
    secret::{SecretCache, SecretKey, SecretKeyProvider},
    sp_dc::SpDc,
    totp, util,
};

/// Source of fresh access tokens.
#[async_trait]
pub trait TokenProvider: Send {
    /// Obtains a new access token.
    ///
    /// Never returns an anonymous token.
    async fn access_token(&mut self) -> Result<AccessToken>;
}

#[derive(Debug)]
pub struct TokenExchanger {
    http_client: HttpClient,
    clock: ServerClock,
    secrets: SecretKeyProvider,
    secret_cache: SecretCache,
    token_url: Url,
    user_agent: String,
    sp_dc: SpDc,
}

impl TokenExchanger {
    const REASON: &'static str = "transport";
    const PRODUCT_TYPE: &'static str = "web-player";

    #[must_use]
    pub fn new(config: &Config, http_client: HttpClient) -> Self {
        Self {
            http_client,
            clock: ServerClock::new(config.server_time_url.clone()),
            secrets: SecretKeyProvider::new(config.secret_url.clone()),
            secret_cache: SecretCache::new(config.secret_refresh),
            token_url: config.token_url.clone(),
            user_agent: config.token_user_agent.clone(),
            sp_dc: config.sp_dc.clone(),
        }
    }

    /// Exchanges the session cookie for an access token.
    ///
    /// If the exchange is rejected and the secret came from the cache, the
    /// cached secret is discarded: a rotated secret and an expired cookie look
    /// the same from here.
    ///
    /// # Errors
    ///
    /// * `ClockFetch` if the server time is unavailable
    /// * `UpstreamFormat` if the secret feed or token response is malformed
    /// * `InvalidSession` if the token endpoint does not accept the session
    /// * transport errors from any of the round trips
    pub async fn exchange(&mut self) -> Result<AccessToken> {
        let server_time = self.clock.now(&self.http_client).await?;
        let secret = self.secret_key().await?;
        let totp = totp::generate(server_time, secret.as_bytes())?;

        let url = self.token_request_url(&totp, &secret.version, util::now_millis());
        let request = self
            .http_client
            .request(Method::GET, url, self.headers()?);

        let (status, body) = self.http_client.text(request).await?;
        match AccessToken::from_response(&body) {
            Ok(token) => {
                debug!(
                    "access token valid for {}s",
                    token.time_to_live().as_secs()
                );
                self.secret_cache.store(secret);
                Ok(token)
            }
            Err(e) => {
                if e.kind == ErrorKind::InvalidSession {
                    debug!("token request with secret v{} rejected ({status})", secret.version);
                    self.secret_cache.invalidate();
                }
                Err(e)
            }
        }
    }

    async fn secret_key(&self) -> Result<SecretKey> {
        if let Some(key) = self.secret_cache.get() {
            trace!("reusing secret v{}", key.version);
            return Ok(key.clone());
        }

        let record = self.secrets.fetch_latest(&self.http_client).await?;
        Ok(SecretKey::from(&record))
    }

    fn token_request_url(&self, totp: &str, version: &str, timestamp_ms: u64) -> Url {
        let mut url = self.token_url.clone();
        url.query_pairs_mut()
            .append_pair("reason", Self::REASON)
            .append_pair("productType", Self::PRODUCT_TYPE)
            .append_pair("totp", totp)
            .append_pair("totpVer", version)
            .append_pair("ts", &timestamp_ms.to_string());
        url
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_str(&self.user_agent)?);

        let mut cookie = HeaderValue::from_str(&format!("sp_dc={}", self.sp_dc.as_str()))?;
        cookie.set_sensitive(true);
        headers.insert(COOKIE, cookie);

        Ok(headers)
    }
}

#[async_trait]
impl TokenProvider for TokenExchanger {
    async fn access_token(&mut self) -> Result<AccessToken> {
        self.exchange().await
    }
}
