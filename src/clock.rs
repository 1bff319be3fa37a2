//! Spotify's server time.
//!
//! The token endpoint only accepts a TOTP computed from a time close to its
//! own. The local clock is never used as a fallback: a drifting client clock
//! would produce codes that are silently rejected.

use url::Url;

use crate::{
    error::{Error, Result},
    http::Client as HttpClient,
    protocol::{self, server_time::ServerTime},
};

#[derive(Clone, Debug)]
pub struct ServerClock {
    url: Url,
}

impl ServerClock {
    #[must_use]
    pub fn new(url: Url) -> Self {
        Self { url }
    }

    /// Fetches the current server time, as reported by the server.
    ///
    /// # Errors
    ///
    /// Returns `ClockFetch` if the response is not JSON or lacks `serverTime`,
    /// or a transport error if the request fails.
    pub async fn now(&self, http: &HttpClient) -> Result<u64> {
        let (status, body) = http.text(http.get(self.url.clone())).await?;

        let time: ServerTime = protocol::json(&body, "server-time")
            .map_err(|e| Error::clock_fetch(format!("{status}: {e}")))?;

        let server_time = time
            .server_time
            .ok_or_else(|| Error::clock_fetch(format!("{status}: response lacks serverTime")))?;

        debug!("server time: {server_time}");
        Ok(server_time)
    }
}
