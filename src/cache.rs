//! In-memory access token cache.
//!
//! The cache is either empty or holds exactly one token. [`TokenCache::ensure_valid`]
//! exchanges for a new token when the cache is empty or the held token has
//! expired, and otherwise returns the held token without any network call.
//!
//! A failed exchange leaves the cache as it was. Tokens are replaced
//! wholesale and never persisted.

use std::time::SystemTime;

use crate::{
    error::{Error, Result},
    protocol::token::AccessToken,
    token::TokenProvider,
};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum TokenCache {
    #[default]
    Empty,
    Holding(AccessToken),
}

impl TokenCache {
    /// Returns a usable token, exchanging for a new one if needed.
    ///
    /// # Errors
    ///
    /// Returns the provider's error if an exchange was needed and failed.
    pub async fn ensure_valid<P>(&mut self, provider: &mut P) -> Result<&AccessToken>
    where
        P: TokenProvider + ?Sized,
    {
        self.ensure_valid_at(provider, SystemTime::now()).await
    }

    /// Like [`Self::ensure_valid`], judging expiry against `now`.
    ///
    /// # Errors
    ///
    /// Returns the provider's error if an exchange was needed and failed.
    pub async fn ensure_valid_at<P>(
        &mut self,
        provider: &mut P,
        now: SystemTime,
    ) -> Result<&AccessToken>
    where
        P: TokenProvider + ?Sized,
    {
        let refresh = match self {
            Self::Empty => {
                debug!("no access token yet");
                true
            }
            Self::Holding(token) if !token.is_usable_at(now) => {
                debug!("access token expired");
                true
            }
            Self::Holding(_) => false,
        };

        if refresh {
            let token = provider.access_token().await?;
            *self = Self::Holding(token);
        }

        self.token()
            .ok_or_else(|| Error::internal("token cache empty after refresh"))
    }

    #[must_use]
    pub fn token(&self) -> Option<&AccessToken> {
        match self {
            Self::Empty => None,
            Self::Holding(token) => Some(token),
        }
    }
}
