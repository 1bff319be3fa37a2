//! Track identifiers.
//!
//! A track can be referred to by its bare base-62 ID, by its web player URL
//! or by its `spotify:track:` URI:
//!
//! ```text
//! 4gMgiXfqyzZLMhsksGmbQV
//! https://open.spotify.com/track/5jgFfDIR6FR0gvlA56Nakr?si=8d95746b3c694281
//! spotify:track:4gMgiXfqyzZLMhsksGmbQV
//! ```

use std::{fmt, str::FromStr, sync::LazyLock};

use regex_lite::Regex;
use serde_with::{DeserializeFromStr, SerializeDisplay};

use crate::error::{Error, Result};

/// Web player track URL, capturing the path segment after `/track/`.
static TRACK_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:https?://)?open\.spotify\.com/track/([^?/]+)").expect("invalid track url pattern")
});

const URI_PREFIX: &str = "spotify:track:";

/// A Spotify track ID.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, SerializeDisplay, DeserializeFromStr)]
pub struct TrackId(String);

impl TrackId {
    /// Extracts the track ID from a web player track URL.
    ///
    /// # Errors
    ///
    /// Returns `UnparsableUrl` if `url` does not match
    /// `[http[s]://]open.spotify.com/track/<id>`.
    pub fn from_url(url: &str) -> Result<Self> {
        let id = TRACK_URL
            .captures(url.trim())
            .and_then(|captures| captures.get(1))
            .ok_or_else(|| Error::unparsable_url(format!("error in parsing track url {url}")))?;

        Self::from_id(id.as_str())
            .map_err(|e| Error::unparsable_url(format!("error in parsing track url {url}: {e}")))
    }

    /// Validates a bare track ID.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `id` is empty or not ASCII alphanumeric.
    pub fn from_id(id: &str) -> Result<Self> {
        if id.is_empty() {
            return Err(Error::invalid_argument("track id is empty"));
        }

        if !id.chars().all(|chr| chr.is_ascii_alphanumeric()) {
            return Err(Error::invalid_argument(format!(
                "track id {id} is not alphanumeric"
            )));
        }

        Ok(Self(id.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether `input` is meant as a URL rather than a bare ID.
    fn is_url_shaped(input: &str) -> bool {
        input.contains('/') || input.contains("://") || input.starts_with("open.spotify.com")
    }
}

impl FromStr for TrackId {
    type Err = Error;

    /// Parses a track ID, track URL or track URI.
    ///
    /// Anything URL-shaped must match the track URL pattern; anything else is
    /// taken as the ID itself.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let input = s.trim();

        if Self::is_url_shaped(input) {
            return Self::from_url(input);
        }

        match input.strip_prefix(URI_PREFIX) {
            Some(id) => Self::from_id(id),
            None => Self::from_id(input),
        }
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn parses_track_url() {
        let id: TrackId = "https://open.spotify.com/track/49MHCPzvMLXhRjDantBMVH"
            .parse()
            .unwrap();
        assert_eq!(id.as_str(), "49MHCPzvMLXhRjDantBMVH");
    }

    #[test]
    fn parses_track_url_with_query() {
        let id: TrackId = "https://open.spotify.com/track/5jgFfDIR6FR0gvlA56Nakr?si=8d95746b3c694281"
            .parse()
            .unwrap();
        assert_eq!(id.as_str(), "5jgFfDIR6FR0gvlA56Nakr");
    }

    #[test]
    fn parses_track_url_without_scheme() {
        let id: TrackId = "open.spotify.com/track/49MHCPzvMLXhRjDantBMVH/".parse().unwrap();
        assert_eq!(id.as_str(), "49MHCPzvMLXhRjDantBMVH");
    }

    #[test]
    fn bare_id_unchanged() {
        let id: TrackId = "4gMgiXfqyzZLMhsksGmbQV".parse().unwrap();
        assert_eq!(id.as_str(), "4gMgiXfqyzZLMhsksGmbQV");
    }

    #[test]
    fn parses_uri() {
        let id: TrackId = "spotify:track:4gMgiXfqyzZLMhsksGmbQV".parse().unwrap();
        assert_eq!(id.as_str(), "4gMgiXfqyzZLMhsksGmbQV");
    }

    #[test]
    fn album_url_is_unparsable() {
        let err = "https://open.spotify.com/album/xyz".parse::<TrackId>().unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnparsableUrl);
    }

    #[test]
    fn from_url_rejects_bare_id() {
        let err = TrackId::from_url("4gMgiXfqyzZLMhsksGmbQV").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnparsableUrl);
    }

    #[test]
    fn bare_id_must_be_alphanumeric() {
        let err = "4gMgiXfq#yz".parse::<TrackId>().unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArgument);

        let err = "".parse::<TrackId>().unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArgument);
    }

    #[test]
    fn deserializes_from_string() {
        let id: TrackId =
            serde_json::from_str(r#""https://open.spotify.com/track/49MHCPzvMLXhRjDantBMVH""#)
                .unwrap();
        assert_eq!(id.to_string(), "49MHCPzvMLXhRjDantBMVH");
    }
}
