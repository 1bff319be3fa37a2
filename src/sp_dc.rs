//! The `sp_dc` session cookie.
//!
//! Spotify's web player keeps its login in an `sp_dc` cookie. Presenting it to
//! the token endpoint is what makes the returned access token non-anonymous.
//! The value is as sensitive as a password, so [`SpDc`] redacts itself in
//! debug output and has no `Display` implementation.
//!
//! # Secrets file
//!
//! ```toml
//! sp_dc = "AQB..."
//! ```

use std::{fs, ops::Deref, path::Path, str::FromStr};

use serde::Deserialize;
use veil::Redact;

use crate::error::{Error, Result};

/// Validated `sp_dc` cookie value.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Redact)]
#[redact(all)]
pub struct SpDc(String);

/// Layout of the secrets file.
#[derive(Deserialize)]
struct Secrets {
    sp_dc: Option<String>,
}

impl SpDc {
    /// Upper bound on the secrets file size.
    ///
    /// The file holds a single short value; anything larger is not a secrets
    /// file.
    const MAX_FILE_SIZE: u64 = 4 * 1024;

    /// Loads the `sp_dc` from a TOML secrets file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, exceeds
    /// [`Self::MAX_FILE_SIZE`], is not valid TOML, has no `sp_dc` key or holds
    /// an invalid value.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        // Prevent out-of-memory condition: the file should be small.
        let file_size = fs::metadata(path)?.len();
        if file_size > Self::MAX_FILE_SIZE {
            return Err(Error::invalid_argument(format!(
                "{} is too large ({file_size} bytes)",
                path.display()
            )));
        }

        let contents = fs::read_to_string(path)?;
        let secrets: Secrets = toml::from_str(&contents)?;

        secrets
            .sp_dc
            .ok_or_else(|| {
                Error::invalid_argument(format!("{} does not contain an sp_dc", path.display()))
            })?
            .parse()
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether `chr` may not appear in a cookie value.
    fn is_illegal(chr: char) -> bool {
        chr.is_whitespace() || chr.is_control() || matches!(chr, ';' | ',' | '"' | '\\')
    }
}

impl FromStr for SpDc {
    type Err = Error;

    /// Parses an `sp_dc` value, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the value is empty or contains characters
    /// that cannot appear in a `Cookie` header value.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let sp_dc = s.trim();

        if sp_dc.is_empty() {
            return Err(Error::invalid_argument("sp_dc is empty"));
        }

        if let Some(chr) = sp_dc.chars().find(|&chr| Self::is_illegal(chr)) {
            return Err(Error::invalid_argument(format!(
                "sp_dc contains illegal character {chr:?}"
            )));
        }

        Ok(Self(sp_dc.to_owned()))
    }
}

impl Deref for SpDc {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
