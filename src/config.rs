use std::time::Duration;

use url::Url;

use crate::{error::Result, sp_dc::SpDc};

/// When to refetch the rotating TOTP secret.
///
/// The secret feed may rotate at any time and the only sign of a stale secret
/// is a rejected token exchange. Either policy reproduces a behaviour seen
/// in the wild.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "binary", derive(clap::ValueEnum))]
pub enum SecretRefresh {
    /// Fetch the secret feed for every token derivation.
    #[default]
    EveryDerivation,

    /// Keep the secret until a token exchange is rejected.
    UntilRejected,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Config {
    pub sp_dc: SpDc,

    pub secret_url: Url,
    pub server_time_url: Url,
    pub token_url: Url,
    /// Base URL that track IDs are appended to. Must end with a slash.
    pub lyrics_url: Url,

    pub app_user_agent: String,
    pub token_user_agent: String,
    pub lyrics_user_agent: String,

    pub secret_refresh: SecretRefresh,

    /// Per-request timeout. `None` waits as long as the transport allows.
    pub timeout: Option<Duration>,
}

impl Config {
    /// Community-maintained feed of Spotify's TOTP secrets, newest last.
    pub const SECRET_URL: &'static str =
        "https://raw.githubusercontent.com/Thereallo1026/spotify-secrets/refs/heads/main/secrets/secrets.json";

    pub const SERVER_TIME_URL: &'static str = "https://open.spotify.com/api/server-time";

    pub const TOKEN_URL: &'static str = "https://open.spotify.com/api/token";

    pub const LYRICS_URL: &'static str = "https://spclient.wg.spotify.com/color-lyrics/v2/track/";

    /// The token endpoint rejects requests that do not look like they come
    /// from a browser.
    pub const TOKEN_USER_AGENT: &'static str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

    pub const LYRICS_USER_AGENT: &'static str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/101.0.0.0 Safari/537.36";

    /// Creates a configuration for the public Spotify endpoints.
    ///
    /// # Errors
    ///
    /// Will return `Err` if one of the endpoint constants is not a valid URL.
    pub fn with_sp_dc(sp_dc: SpDc) -> Result<Self> {
        let app_name = env!("CARGO_PKG_NAME");
        let app_version = env!("CARGO_PKG_VERSION");
        let app_user_agent = format!("{app_name}/{app_version}");
        trace!("user agent: {app_user_agent}");

        Ok(Self {
            sp_dc,

            secret_url: Url::parse(Self::SECRET_URL)?,
            server_time_url: Url::parse(Self::SERVER_TIME_URL)?,
            token_url: Url::parse(Self::TOKEN_URL)?,
            lyrics_url: Url::parse(Self::LYRICS_URL)?,

            app_user_agent,
            token_user_agent: Self::TOKEN_USER_AGENT.to_owned(),
            lyrics_user_agent: Self::LYRICS_USER_AGENT.to_owned(),

            secret_refresh: SecretRefresh::default(),

            timeout: None,
        })
    }
}
