//! Wire types for the endpoints the token pipeline talks to.
//!
//! # Submodules
//!
//! * [`secret`] - records from the rotating secret feed
//! * [`server_time`] - Spotify's authoritative clock
//! * [`token`] - access tokens from the web player token endpoint
//! * [`lyrics`] - the color-lyrics payload
//!
//! # Shared Functionality
//!
//! [`json`] parses a response body into a wire type and logs it:
//!
//! ```
//! use spotify_lyrics::protocol;
//!
//! let response: protocol::server_time::ServerTime = protocol::json(&body, "server-time")?;
//! ```

pub mod lyrics;
pub mod secret;
pub mod server_time;
pub mod token;

use crate::error::Result;
use serde::Deserialize;
use std::fmt::Debug;

/// Parses and logs JSON responses.
///
/// # Arguments
///
/// * `body` - Response body text to parse
/// * `origin` - Description of API endpoint for logging
///
/// # Errors
///
/// Returns error if:
/// * Response body is not valid JSON
/// * JSON structure doesn't match type `T`
///
/// # Logging
///
/// * Success: Logs parsed structure at TRACE level
/// * Parse Error: Logs raw JSON at TRACE level if valid JSON
/// * Invalid JSON: Logs error and raw text at ERROR level
pub fn json<T>(body: &str, origin: &str) -> Result<T>
where
    T: for<'de> Deserialize<'de> + Debug,
{
    match serde_json::from_str(body) {
        Ok(result) => {
            trace!("{origin}: {result:#?}");
            Ok(result)
        }
        Err(e) => {
            if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
                trace!("{origin}: {json:#?}");
            } else {
                error!("{origin}: failed parsing response ({e:?})");
                trace!("{body}");
            }
            Err(e.into())
        }
    }
}
