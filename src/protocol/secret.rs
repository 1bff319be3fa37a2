//! Records from the TOTP secret feed.
//!
//! # Wire Format
//!
//! The feed is an append-only JSON array, oldest first:
//!
//! ```json
//! [
//!     { "version": 59, "secret": "{iOFn;4}<1PFYKPV" },
//!     { "version": 60, "secret": "OmE{ZA.J^\":0FG\\Uz?[@WW" }
//! ]
//! ```
//!
//! `version` has been published both as a number and as a string.

use std::fmt;

use serde::{Deserialize, Deserializer};
use veil::Redact;

/// One published secret and the version it is valid for.
///
/// The `secret` is still obfuscated; see [`crate::secret::deobfuscate`].
#[derive(Clone, PartialEq, Eq, Hash, Deserialize, Redact)]
pub struct SecretRecord {
    #[serde(deserialize_with = "version_from_str_or_number")]
    pub version: String,

    #[redact]
    pub secret: String,
}

fn version_from_str_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Version {
        Text(String),
        Number(u64),
    }

    Ok(match Version::deserialize(deserializer)? {
        Version::Text(text) => text,
        Version::Number(number) => number.to_string(),
    })
}

impl fmt::Display for SecretRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.version)
    }
}
