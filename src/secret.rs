//! Acquisition of the rotating TOTP secret.
//!
//! Spotify's web player derives its TOTP from a shared secret that is
//! rotated from time to time. A community-maintained feed republishes each
//! secret together with its version. The published form is obfuscated with a
//! fixed XOR pattern that [`deobfuscate`] reverses; this is a recovery step
//! dictated by the secret format, not a security measure.
//!
//! # Trust boundary
//!
//! The feed is assumed to be append-only with the newest secret last.
//! No version comparison is done: the last record is the current one.

use std::time::Instant;

use url::Url;
use veil::Redact;

use crate::{
    config::SecretRefresh,
    error::{Error, Result},
    http::Client as HttpClient,
    protocol::{self, secret::SecretRecord},
};

/// Period of the XOR pattern over character positions.
const XOR_PERIOD: usize = 33;

/// Added to the position within the period to form the XOR mask.
const XOR_OFFSET: usize = 9;

/// Reverses the obfuscation of a published secret.
///
/// Each character at position `i` becomes `c ^ ((i % 33) + 9)`, where `c` is
/// its first UTF-16 code unit.
/// The resulting numbers are written out in decimal and concatenated; the
/// bytes of that string are the HMAC key.
///
/// # Example
///
/// ```rust
/// // 'A' (65) ^ 9 = 72, 'B' (66) ^ 10 = 72
/// assert_eq!(deobfuscate("AB"), b"7272");
/// ```
#[must_use]
pub fn deobfuscate(secret: &str) -> Vec<u8> {
    let mut units = [0; 2];
    secret
        .chars()
        .enumerate()
        .map(|(i, chr)| {
            // Outside the BMP only the high surrogate counts.
            let unit = chr.encode_utf16(&mut units)[0];
            // The mask is at most 41, so it always fits.
            let mask = u16::try_from(i % XOR_PERIOD + XOR_OFFSET).unwrap_or_default();
            (unit ^ mask).to_string()
        })
        .collect::<String>()
        .into_bytes()
}

/// A de-obfuscated secret ready to key the HMAC.
#[derive(Clone, PartialEq, Eq, Hash, Redact)]
pub struct SecretKey {
    /// Sent alongside the TOTP so upstream knows which secret to check
    /// against.
    pub version: String,

    #[redact]
    bytes: Vec<u8>,
}

impl SecretKey {
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl From<&SecretRecord> for SecretKey {
    fn from(record: &SecretRecord) -> Self {
        Self {
            version: record.version.clone(),
            bytes: deobfuscate(&record.secret),
        }
    }
}

/// Picks the current record out of a secret feed response.
///
/// # Errors
///
/// Returns `UpstreamFormat` if the body is not a JSON array of records or the
/// array is empty.
pub fn select_latest(body: &str) -> Result<SecretRecord> {
    let feed: serde_json::Value = protocol::json(body, "secret feed")
        .map_err(|e| Error::upstream_format(format!("secret feed is not JSON: {e}")))?;

    if !feed.is_array() {
        return Err(Error::upstream_format("secret feed is not an array"));
    }

    let mut records: Vec<SecretRecord> = serde_json::from_value(feed)
        .map_err(|e| Error::upstream_format(format!("secret feed record malformed: {e}")))?;

    records
        .pop()
        .ok_or_else(|| Error::upstream_format("secret feed is empty"))
}

/// Fetches secrets from the feed.
#[derive(Clone, Debug)]
pub struct SecretKeyProvider {
    url: Url,
}

impl SecretKeyProvider {
    #[must_use]
    pub fn new(url: Url) -> Self {
        Self { url }
    }

    /// Fetches the newest record from the feed.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the feed is malformed.
    pub async fn fetch_latest(&self, http: &HttpClient) -> Result<SecretRecord> {
        let (status, body) = http.text(http.get(self.url.clone())).await?;
        if !status.is_success() {
            return Err(Error::unavailable(format!("secret feed returned {status}")));
        }

        let record = select_latest(&body)?;
        debug!("current secret is {record}");
        Ok(record)
    }
}

/// Remembers the last secret, subject to a [`SecretRefresh`] policy.
#[derive(Debug, Default)]
pub struct SecretCache {
    policy: SecretRefresh,
    cached: Option<(SecretKey, Instant)>,
}

impl SecretCache {
    #[must_use]
    pub fn new(policy: SecretRefresh) -> Self {
        Self {
            policy,
            cached: None,
        }
    }

    /// The secret to reuse for the next derivation, if the policy allows one.
    #[must_use]
    pub fn get(&self) -> Option<&SecretKey> {
        match self.policy {
            SecretRefresh::EveryDerivation => None,
            SecretRefresh::UntilRejected => self.cached.as_ref().map(|(key, _)| key),
        }
    }

    pub fn store(&mut self, key: SecretKey) {
        if self.policy == SecretRefresh::UntilRejected {
            self.cached = Some((key, Instant::now()));
        }
    }

    /// Forgets the cached secret after upstream rejected an exchange.
    pub fn invalidate(&mut self) {
        if let Some((key, since)) = self.cached.take() {
            warn!(
                "discarding secret v{} used for {}s",
                key.version,
                since.elapsed().as_secs()
            );
        }
    }
}
