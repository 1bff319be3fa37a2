//! Access tokens from the web player token endpoint.
//!
//! # Wire Format
//!
//! ```json
//! {
//!     "clientId": "d8a5ed958d274c2e8ee717e6a4b0971d",
//!     "accessToken": "BQD...",
//!     "accessTokenExpirationTimestampMs": 1759063999000,
//!     "isAnonymous": false,
//!     "_notes": "Usage of this endpoint is not permitted under the Spotify Developer Terms and Developer Policy, and applicable law"
//! }
//! ```
//!
//! When the `sp_dc` cookie is missing, invalid or expired, the endpoint
//! still answers, but with `isAnonymous: true` or without the field at all.

use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};
use serde_with::{formats::Flexible, serde_as, TimestampMilliSeconds};
use veil::Redact;

use crate::error::{Error, Result};

#[serde_as]
#[derive(Clone, PartialEq, Eq, Hash, Deserialize, Serialize, Redact)]
#[serde(rename_all = "camelCase")]
pub struct AccessToken {
    #[serde(default)]
    pub client_id: String,

    /// Bearer token for the lyrics endpoint
    #[redact]
    pub access_token: String,

    /// When the token stops being accepted
    #[serde(rename = "accessTokenExpirationTimestampMs")]
    #[serde_as(as = "TimestampMilliSeconds<i64, Flexible>")]
    pub expires_at: SystemTime,

    pub is_anonymous: bool,

    #[serde(rename = "_notes", default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Just enough of a token response to tell whether the session was accepted.
#[derive(Debug, Deserialize)]
struct Anonymity {
    #[serde(rename = "isAnonymous")]
    is_anonymous: Option<bool>,
}

impl AccessToken {
    /// Parses a token endpoint response.
    ///
    /// # Errors
    ///
    /// * `InvalidSession` if `isAnonymous` is `true` or missing
    /// * `UpstreamFormat` if the body is not a JSON object or lacks the token
    ///   fields
    pub fn from_response(body: &str) -> Result<Self> {
        let anonymity: Anonymity = serde_json::from_str(body)
            .map_err(|e| Error::upstream_format(format!("token response is not an object: {e}")))?;

        match anonymity.is_anonymous {
            Some(false) => {}
            Some(true) => {
                return Err(Error::invalid_session(
                    "anonymous token returned: sp_dc is invalid or expired",
                ))
            }
            None => {
                return Err(Error::invalid_session(
                    "token response without isAnonymous: sp_dc is invalid or expired",
                ))
            }
        }

        crate::protocol::json::<Self>(body, "token")
            .map_err(|e| Error::upstream_format(format!("token response malformed: {e}")))
    }

    /// Whether the token has expired at `now`.
    ///
    /// A token expires at its expiration timestamp, not after it.
    #[must_use]
    pub fn is_expired_at(&self, now: SystemTime) -> bool {
        now >= self.expires_at
    }

    /// Whether the token can be sent to the lyrics endpoint at `now`.
    #[must_use]
    pub fn is_usable_at(&self, now: SystemTime) -> bool {
        !self.is_anonymous && !self.is_expired_at(now)
    }

    #[must_use]
    pub fn time_to_live(&self) -> Duration {
        self.expires_at
            .duration_since(SystemTime::now())
            .unwrap_or(Duration::ZERO)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.access_token
    }
}
