//! The color-lyrics payload.
//!
//! [`SongLyrics`] keeps the response exactly as upstream sent it and
//! serializes back to that same JSON, unknown fields and `null`s included.
//! Alongside it sits a typed view for callers that want to read the lines.
//! The view is lenient: missing fields and `null`s take their defaults.
//! Nothing here is validated. Line timings, sync type and language are
//! whatever upstream sent.
//!
//! # Wire Format
//!
//! ```json
//! {
//!     "lyrics": {
//!         "syncType": "LINE_SYNCED",
//!         "lines": [
//!             { "startTimeMs": "960", "words": "We don't need no education", "syllables": [], "endTimeMs": "0" }
//!         ],
//!         "provider": "MusixMatch",
//!         "language": "en",
//!         "isRtlLanguage": false,
//!         "fullscreenAction": "FULLSCREEN_LYRICS"
//!     },
//!     "colors": { "background": -9422572, "text": -16777216, "highlightText": -1 },
//!     "hasVocalRemoval": false
//! }
//! ```

use serde::{de::Error as _, Deserialize, Serialize};
use serde_json::Value;
use serde_with::{serde_as, DefaultOnNull};

/// A lyrics response, passed through untouched.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct SongLyrics {
    raw: Value,
    content: Content,
}

impl SongLyrics {
    #[must_use]
    pub fn lyrics(&self) -> &Lyrics {
        &self.content.lyrics
    }

    #[must_use]
    pub fn colors(&self) -> Option<Colors> {
        self.content.colors
    }

    #[must_use]
    pub fn has_vocal_removal(&self) -> bool {
        self.content.has_vocal_removal
    }

    /// The response as received.
    #[must_use]
    pub fn as_json(&self) -> &Value {
        &self.raw
    }
}

impl TryFrom<Value> for SongLyrics {
    type Error = serde_json::Error;

    fn try_from(raw: Value) -> Result<Self, Self::Error> {
        if !raw.is_object() {
            return Err(serde_json::Error::custom("lyrics payload is not an object"));
        }

        let content = Content::deserialize(&raw)?;
        Ok(Self { raw, content })
    }
}

impl From<SongLyrics> for Value {
    fn from(song: SongLyrics) -> Self {
        song.raw
    }
}

#[serde_as]
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct Content {
    #[serde_as(deserialize_as = "DefaultOnNull")]
    lyrics: Lyrics,
    colors: Option<Colors>,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    has_vocal_removal: bool,
}

#[serde_as]
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Lyrics {
    /// `LINE_SYNCED`, `SYLLABLE_SYNCED` or `UNSYNCED`
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub sync_type: String,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub lines: Vec<LyricsLine>,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub provider: String,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub provider_lyrics_id: String,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub provider_display_name: String,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub sync_lyrics_uri: String,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub is_dense_typeface: bool,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub alternatives: Vec<Value>,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub language: String,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub is_rtl_language: bool,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub cap_status: String,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub preview_lines: Vec<LyricsLine>,
}

/// Timings are decimal strings of milliseconds, as upstream sends them.
#[serde_as]
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LyricsLine {
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub start_time_ms: String,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub words: String,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub syllables: Vec<Value>,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub end_time_ms: String,
    pub transliterated_words: Option<String>,
}

/// ARGB colors as signed 32-bit integers.
#[serde_as]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Colors {
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub background: i64,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub text: i64,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub highlight_text: i64,
}
