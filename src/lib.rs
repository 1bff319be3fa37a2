//! Time-synced lyrics from Spotify's web player API.
//!
//! Fetching lyrics takes a bearer token that the web player derives from a
//! rotating secret, a TOTP over Spotify's server time and the `sp_dc`
//! session cookie. [`lyrics::Client`] runs that pipeline, caches the token
//! until it expires and fetches lyrics by track ID or URL.
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

#[macro_use]
extern crate log;

pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod http;
pub mod lyrics;
pub mod protocol;
pub mod secret;
pub mod sp_dc;
pub mod token;
pub mod totp;
pub mod track;
pub mod util;

#[cfg(test)]
mod testing;

pub use error::{Error, ErrorKind, Result};
pub use lyrics::Client;
pub use track::TrackId;
