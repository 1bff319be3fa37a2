//! Spotify's authoritative clock.
//!
//! # Wire Format
//!
//! ```json
//! { "serverTime": 1759060399 }
//! ```
//!
//! The value is in epoch seconds. It is fed to the TOTP counter unchanged.

use serde::Deserialize;
use serde_with::{serde_as, DisplayFromStr, PickFirst};

#[serde_as]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
pub struct ServerTime {
    /// Absent when the endpoint answers with something other than a time.
    #[serde(rename = "serverTime")]
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub server_time: Option<u64>,
}
