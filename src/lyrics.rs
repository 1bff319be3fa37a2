//! Lyrics retrieval.
//!
//! [`Client`] is the public entry point. It owns the token pipeline and hands
//! out the lyrics payload for a track:
//!
//! ```rust
//! use spotify_lyrics::{config::Config, lyrics::Client};
//!
//! let client = Client::new(&Config::with_sp_dc(sp_dc)?)?;
//! let lyrics = client
//!     .lyrics_from_url("https://open.spotify.com/track/5jgFfDIR6FR0gvlA56Nakr")
//!     .await?;
//! ```
//!
//! # Request
//!
//! ```text
//! GET /color-lyrics/v2/track/<id>?format=json&market=from_token
//! User-Agent: Mozilla/5.0 ...
//! App-platform: WebPlayer
//! Authorization: Bearer <access token>
//! ```
//!
//! # Concurrency
//!
//! The token cache and the exchanger sit behind one async mutex, so
//! concurrent calls on the same client wait for a single exchange instead of
//! racing to start their own. The lyrics request itself runs outside the
//! lock.

use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, USER_AGENT},
    Method,
};
use tokio::sync::Mutex;
use url::Url;

use crate::{
    cache::TokenCache,
    config::Config,
    error::{Error, Result},
    http::Client as HttpClient,
    protocol::{self, lyrics::SongLyrics, token::AccessToken},
    token::TokenExchanger,
    track::TrackId,
};

/// Token state guarded as one unit.
#[derive(Debug)]
struct Auth {
    cache: TokenCache,
    exchanger: TokenExchanger,
}

#[derive(Debug)]
pub struct Client {
    http_client: HttpClient,
    lyrics_url: Url,
    user_agent: String,
    auth: Mutex<Auth>,
}

impl Client {
    const APP_PLATFORM: &'static str = "app-platform";
    const WEB_PLAYER: &'static str = "WebPlayer";

    /// Creates a client with an empty token cache.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built.
    pub fn new(config: &Config) -> Result<Self> {
        let http_client = HttpClient::new(config)?;
        let exchanger = TokenExchanger::new(config, http_client.clone());

        Ok(Self {
            http_client,
            lyrics_url: config.lyrics_url.clone(),
            user_agent: config.lyrics_user_agent.clone(),
            auth: Mutex::new(Auth {
                cache: TokenCache::default(),
                exchanger,
            }),
        })
    }

    /// Fetches the lyrics of a track.
    ///
    /// Exchanges for an access token first if none is cached or the cached one
    /// has expired.
    ///
    /// # Errors
    ///
    /// * Any token pipeline error, in which case the token cache is unchanged
    /// * `LyricsFetch` carrying the status if the lyrics endpoint answers
    ///   with a non-success status
    /// * `UpstreamFormat` if the lyrics payload is not JSON of the expected
    ///   shape
    pub async fn lyrics_from_id(&self, track_id: &TrackId) -> Result<SongLyrics> {
        let access_token = self.bearer().await?;

        let url = self.lyrics_request_url(track_id)?;
        let request = self
            .http_client
            .request(Method::GET, url, self.headers(&access_token)?);

        let response = self.http_client.execute(request).await?;
        let status = response.status();
        if !status.is_success() {
            debug!("no lyrics for track {track_id} ({status})");
            return Err(Error::lyrics_fetch(status));
        }

        let body = response.text().await?;
        protocol::json(&body, "lyrics")
            .map_err(|e| Error::upstream_format(format!("lyrics for track {track_id}: {e}")))
    }

    /// Fetches the lyrics of the track a web player URL points to.
    ///
    /// # Errors
    ///
    /// Returns `UnparsableUrl` if `url` is not a track URL, and otherwise the
    /// errors of [`Self::lyrics_from_id`].
    pub async fn lyrics_from_url(&self, url: &str) -> Result<SongLyrics> {
        let track_id = TrackId::from_url(url)?;
        self.lyrics_from_id(&track_id).await
    }

    /// Returns the currently cached access token, if any.
    ///
    /// Does not exchange for a new token and may return an expired one.
    pub async fn cached_token(&self) -> Option<AccessToken> {
        self.auth.lock().await.cache.token().cloned()
    }

    /// Returns a usable bearer token, holding the lock only for as long as
    /// the cache check and a possible exchange take.
    async fn bearer(&self) -> Result<String> {
        let mut auth = self.auth.lock().await;
        let Auth { cache, exchanger } = &mut *auth;

        let token = cache.ensure_valid(exchanger).await?;
        Ok(token.as_str().to_owned())
    }

    fn lyrics_request_url(&self, track_id: &TrackId) -> Result<Url> {
        let mut url = self.lyrics_url.join(track_id.as_str())?;
        url.query_pairs_mut()
            .append_pair("format", "json")
            .append_pair("market", "from_token");
        Ok(url)
    }

    fn headers(&self, access_token: &str) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_str(&self.user_agent)?);
        headers.insert(
            HeaderName::from_static(Self::APP_PLATFORM),
            HeaderValue::from_static(Self::WEB_PLAYER),
        );

        let mut authorization = HeaderValue::from_str(&format!("Bearer {access_token}"))?;
        authorization.set_sensitive(true);
        headers.insert(AUTHORIZATION, authorization);

        Ok(headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::ErrorKind,
        testing::{self, StubServer},
    };

    const FEED: &str = r#"[{"version":61,"secret":"{iOFn;4}<1PFYKPV"}]"#;
    const SERVER_TIME: &str = r#"{"serverTime":"1759060399"}"#;
    const TOKEN: &str = r#"{"clientId":"c","accessToken":"BQDtoken","accessTokenExpirationTimestampMs":4102444800000,"isAnonymous":false}"#;
    const LYRICS: &str = r#"{"lyrics":{"syncType":"LINE_SYNCED","lines":[{"startTimeMs":"960","words":"We don't need no education","syllables":[],"endTimeMs":"0"}],"provider":"MusixMatch","language":"en","isRtlLanguage":false,"someNewField":1},"colors":{"background":-9422572,"text":-16777216,"highlightText":-1},"hasVocalRemoval":false}"#;

    const TRACK: &str = "4gMgiXfqyzZLMhsksGmbQV";

    fn builder(token_body: &str) -> crate::testing::Builder {
        StubServer::builder()
            .route(testing::SECRETS_PATH, 200, FEED)
            .route(testing::SERVER_TIME_PATH, 200, SERVER_TIME)
            .route(testing::TOKEN_PATH, 200, token_body)
    }

    fn track() -> TrackId {
        TRACK.parse().unwrap()
    }

    #[tokio::test]
    async fn fetches_lyrics() {
        let server = builder(TOKEN)
            .route(testing::LYRICS_PATH, 200, LYRICS)
            .start()
            .await;
        let client = Client::new(&server.config()).unwrap();

        let song = client.lyrics_from_id(&track()).await.unwrap();
        assert_eq!(song.lyrics().sync_type, "LINE_SYNCED");
        assert_eq!(song.lyrics().lines.len(), 1);
        assert_eq!(song.lyrics().lines[0].words, "We don't need no education");
        assert_eq!(song.colors().map(|colors| colors.highlight_text), Some(-1));

        let json = serde_json::to_value(&song).unwrap();
        assert_eq!(json["lyrics"]["someNewField"], 1);
    }

    #[tokio::test]
    async fn lyrics_request_headers() {
        let server = builder(TOKEN)
            .route(testing::LYRICS_PATH, 200, LYRICS)
            .start()
            .await;
        let client = Client::new(&server.config()).unwrap();
        client.lyrics_from_id(&track()).await.unwrap();

        let requests = server.requests();
        let head = requests
            .iter()
            .find(|head| head.starts_with(&format!("GET {}", testing::LYRICS_PATH)))
            .unwrap()
            .to_lowercase();

        assert!(head.starts_with(&format!(
            "get {}{}?format=json&market=from_token ",
            testing::LYRICS_PATH,
            TRACK.to_lowercase()
        )));
        assert!(head.contains("authorization: bearer bqdtoken"));
        assert!(head.contains("app-platform: webplayer"));
        assert!(head.contains("user-agent: mozilla/5.0 (x11; linux x86_64)"));
    }

    #[tokio::test]
    async fn not_found_is_lyrics_fetch_error() {
        let server = builder(TOKEN).route(testing::LYRICS_PATH, 404, "").start().await;
        let client = Client::new(&server.config()).unwrap();

        let err = client.lyrics_from_id(&track()).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::LyricsFetch);

        let status = err.http_status().unwrap();
        assert_eq!(status.status, 404);
        assert_eq!(status.text, "Not Found");
    }

    #[tokio::test]
    async fn reuses_cached_token() {
        let server = builder(TOKEN)
            .route(testing::LYRICS_PATH, 200, LYRICS)
            .start()
            .await;
        let client = Client::new(&server.config()).unwrap();

        client.lyrics_from_id(&track()).await.unwrap();
        client.lyrics_from_id(&track()).await.unwrap();

        assert_eq!(server.hits(testing::TOKEN_PATH), 1);
        assert_eq!(server.hits(testing::LYRICS_PATH), 2);
        assert_eq!(
            client.cached_token().await.map(|token| token.as_str().to_owned()),
            Some("BQDtoken".to_owned())
        );
    }

    #[tokio::test]
    async fn anonymous_token_leaves_cache_empty() {
        let server = builder(r#"{"accessToken":"anon","isAnonymous":true}"#)
            .route(testing::LYRICS_PATH, 200, LYRICS)
            .start()
            .await;
        let client = Client::new(&server.config()).unwrap();

        let err = client.lyrics_from_id(&track()).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidSession);
        assert!(client.cached_token().await.is_none());
        assert_eq!(server.hits(testing::LYRICS_PATH), 0);
    }

    #[tokio::test]
    async fn concurrent_calls_share_one_exchange() {
        let server = builder(TOKEN)
            .route(testing::LYRICS_PATH, 200, LYRICS)
            .start()
            .await;
        let client = Client::new(&server.config()).unwrap();

        let (a, b) = (track(), track());
        let (first, second) = tokio::join!(client.lyrics_from_id(&a), client.lyrics_from_id(&b));
        first.unwrap();
        second.unwrap();

        assert_eq!(server.hits(testing::TOKEN_PATH), 1);
    }

    #[tokio::test]
    async fn url_entry_point_requires_track_url() {
        let server = builder(TOKEN).start().await;
        let client = Client::new(&server.config()).unwrap();

        let err = client
            .lyrics_from_url("https://open.spotify.com/album/xyz")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnparsableUrl);
        assert_eq!(server.hits(testing::TOKEN_PATH), 0);
    }
}
