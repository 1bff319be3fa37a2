//! Error handling for spotify-lyrics.
//!
//! Provides a single error type that pairs a category ([`ErrorKind`]) with
//! the underlying error details, and maps third-party errors onto those
//! categories.
//!
//! # Error Categories
//!
//! The token pipeline has its own failure modes:
//! * Secret feed returned something other than a list of records
//! * Server time response lacked its time field
//! * HMAC digest too short to truncate
//! * Session cookie rejected by the token endpoint
//! * Track URL not in the expected shape
//! * Lyrics endpoint answered with a non-success status
//!
//! Everything else (transport failures, timeouts, malformed input) falls into
//! the generic categories.
//!
//! # Example
//!
//! ```rust
//! use spotify_lyrics::error::{Error, ErrorKind, Result};
//!
//! fn check(input: &str) -> Result<()> {
//!     if input.is_empty() {
//!         return Err(Error::invalid_argument("input is empty"));
//!     }
//!     Ok(())
//! }
//! ```

#![allow(clippy::enum_glob_use)]

use std::fmt;
use thiserror::Error;

/// Main error type combining error kind and details.
#[derive(Debug)]
pub struct Error {
    /// Classification of the error
    pub kind: ErrorKind,

    /// Details of the underlying error
    pub error: Box<dyn std::error::Error + Send + Sync>,
}

/// Standard result type for spotify-lyrics operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories.
///
/// The first six variants are the failure modes of the token pipeline and
/// the lyrics fetch. The remainder cover transport and input problems.
#[expect(clippy::module_name_repetitions)]
#[derive(Clone, Copy, Debug, Eq, Error, Hash, Ord, PartialEq, PartialOrd)]
pub enum ErrorKind {
    /// The secret feed did not return a non-empty list of records.
    #[error("unexpected upstream format")]
    UpstreamFormat,

    /// The server time could not be obtained.
    #[error("server time unavailable")]
    ClockFetch,

    /// The HMAC digest was too short for dynamic truncation.
    #[error("digest truncation failed")]
    Truncation,

    /// The session cookie was rejected or an anonymous token was returned.
    #[error("session invalid or expired")]
    InvalidSession,

    /// A URL-shaped track reference did not match the track URL pattern.
    #[error("track url unparsable")]
    UnparsableUrl,

    /// The lyrics endpoint answered with a non-success status.
    #[error("fetching lyrics failed")]
    LyricsFetch,

    #[error("invalid argument specified")]
    InvalidArgument,

    #[error("operation timed out")]
    DeadlineExceeded,

    #[error("service unavailable")]
    Unavailable,

    #[error("unrecoverable data loss or corruption")]
    DataLoss,

    #[error("internal error")]
    Internal,

    #[error("unknown error")]
    Unknown,
}

/// Status line of a failed HTTP response.
///
/// Carried as the details of [`ErrorKind::LyricsFetch`] errors.
#[derive(Clone, Debug, Eq, Error, Hash, PartialEq)]
#[error("status code {status}, status text \"{text}\"")]
pub struct HttpStatus {
    pub status: u16,
    pub text: String,
}

impl From<reqwest::StatusCode> for HttpStatus {
    fn from(status: reqwest::StatusCode) -> Self {
        Self {
            status: status.as_u16(),
            text: status.canonical_reason().unwrap_or_default().to_owned(),
        }
    }
}

impl Error {
    /// Creates a new error with specified kind and details.
    ///
    /// # Examples
    ///
    /// ```rust
    /// let err = Error::new(ErrorKind::Internal, "cache empty after refresh");
    /// assert_eq!(err.kind, ErrorKind::Internal);
    /// ```
    pub fn new<E>(kind: ErrorKind, error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self {
            kind,
            error: error.into(),
        }
    }

    /// Attempts to downcast the underlying error to a concrete type.
    #[must_use]
    pub fn downcast<E>(&self) -> Option<&E>
    where
        E: std::error::Error + 'static,
    {
        self.error.downcast_ref::<E>()
    }

    /// Returns the HTTP status carried by a [`ErrorKind::LyricsFetch`] error.
    #[must_use]
    pub fn http_status(&self) -> Option<&HttpStatus> {
        self.downcast::<HttpStatus>()
    }

    /// Creates an error for secret feed responses of the wrong shape.
    pub fn upstream_format<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::new(ErrorKind::UpstreamFormat, error)
    }

    /// Creates an error for server time responses missing `serverTime`.
    pub fn clock_fetch<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::new(ErrorKind::ClockFetch, error)
    }

    /// Creates an error for digests that cannot be truncated.
    ///
    /// Cannot happen with HMAC-SHA1 output, but keeps the indexing in
    /// [`crate::totp::truncate`] checked.
    pub fn truncation<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::new(ErrorKind::Truncation, error)
    }

    /// Creates an error for a rejected session cookie.
    ///
    /// Use when:
    /// * The token endpoint returns an anonymous token
    /// * The token endpoint omits `isAnonymous`
    ///
    /// A stale secret version produces the same response, so this also
    /// covers that case.
    pub fn invalid_session<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::new(ErrorKind::InvalidSession, error)
    }

    /// Creates an error for track URLs that do not match the track pattern.
    pub fn unparsable_url<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::new(ErrorKind::UnparsableUrl, error)
    }

    /// Creates an error for a non-success lyrics response.
    ///
    /// The status code and text can be retrieved with
    /// [`Error::http_status`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// let err = Error::lyrics_fetch(reqwest::StatusCode::NOT_FOUND);
    /// assert_eq!(err.http_status().map(|s| s.status), Some(404));
    /// ```
    #[must_use]
    pub fn lyrics_fetch(status: reqwest::StatusCode) -> Self {
        Self::new(ErrorKind::LyricsFetch, HttpStatus::from(status))
    }

    pub fn invalid_argument<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::new(ErrorKind::InvalidArgument, error)
    }

    pub fn deadline_exceeded<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::new(ErrorKind::DeadlineExceeded, error)
    }

    /// Creates an error for endpoints that could not be reached.
    pub fn unavailable<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::new(ErrorKind::Unavailable, error)
    }

    pub fn data_loss<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::new(ErrorKind::DataLoss, error)
    }

    /// Creates an error for conditions that should not occur during normal
    /// operation.
    pub fn internal<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::new(ErrorKind::Internal, error)
    }

    pub fn unknown<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::new(ErrorKind::Unknown, error)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.error.source()
    }
}

/// Formats the error as "{kind}: {details}".
impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "{}: ", self.kind)?;
        self.error.fmt(fmt)
    }
}

/// Converts IO errors into appropriate error kinds.
impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        use std::io::ErrorKind::*;
        match err.kind() {
            NotFound | PermissionDenied | InvalidInput | InvalidData => {
                Self::invalid_argument(err)
            }
            AddrNotAvailable | ConnectionRefused | NotConnected => Self::unavailable(err),
            BrokenPipe | ConnectionReset | ConnectionAborted | UnexpectedEof => {
                Self::data_loss(err)
            }
            TimedOut => Self::deadline_exceeded(err),
            _ => Self::unknown(err),
        }
    }
}

/// Converts HTTP client errors into appropriate error kinds.
///
/// * Body errors -> `DataLoss`
/// * Decode errors -> `InvalidArgument`
/// * Builder errors -> `Internal`
/// * Connect and redirect errors -> `Unavailable`
/// * Timeout errors -> `DeadlineExceeded`
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return Self::deadline_exceeded(err);
        }

        if err.is_body() {
            return Self::data_loss(err);
        }

        if err.is_decode() {
            return Self::invalid_argument(err);
        }

        if err.is_builder() {
            return Self::internal(err);
        }

        if err.is_connect() || err.is_redirect() || err.is_status() {
            return Self::unavailable(err);
        }

        Self::unknown(err)
    }
}

/// Converts JSON errors through IO error mapping.
impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        std::io::Error::from(err).into()
    }
}

/// Converts TOML errors to `InvalidArgument`.
impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Self::invalid_argument(e.to_string())
    }
}

/// Converts invalid header errors to `InvalidArgument`.
impl From<http::header::InvalidHeaderValue> for Error {
    fn from(e: http::header::InvalidHeaderValue) -> Self {
        Self::invalid_argument(e.to_string())
    }
}

/// Converts URL parsing errors to `Internal`.
impl From<url::ParseError> for Error {
    fn from(e: url::ParseError) -> Self {
        Self::internal(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_kind_and_details() {
        let err = Error::invalid_session("sp_dc rejected");
        assert_eq!(err.to_string(), "session invalid or expired: sp_dc rejected");
    }

    #[test]
    fn lyrics_fetch_carries_status() {
        let err = Error::lyrics_fetch(reqwest::StatusCode::NOT_FOUND);
        assert_eq!(err.kind, ErrorKind::LyricsFetch);

        let status = err.http_status().expect("status attached");
        assert_eq!(status.status, 404);
        assert_eq!(status.text, "Not Found");
    }

    #[test]
    fn http_status_absent_on_other_kinds() {
        let err = Error::clock_fetch("no serverTime");
        assert!(err.http_status().is_none());
    }

    #[test]
    fn json_errors_map_to_invalid_argument() {
        let err: Error = serde_json::from_str::<u64>("nope").unwrap_err().into();
        assert_eq!(err.kind, ErrorKind::InvalidArgument);
    }
}
