//! Credentials supplied through the environment.
//!
//! There is no built-in fallback for any of these: a missing required
//! variable stops the process at startup.

use crate::error::ConfigError;
use crate::social::{OAuth1Credentials, TwitterAuth};

pub const APTOS_PRIVATE_KEY: &str = "APTOS_PRIVATE_KEY";
pub const GROQ_API_KEY: &str = "GROQ_API_KEY";
pub const TWITTER_API_KEY: &str = "TWITTER_API_KEY";
pub const TWITTER_API_SECRET: &str = "TWITTER_API_SECRET";
pub const TWITTER_ACCESS_TOKEN: &str = "TWITTER_ACCESS_TOKEN";
pub const TWITTER_ACCESS_TOKEN_SECRET: &str = "TWITTER_ACCESS_TOKEN_SECRET";
pub const TWITTER_BEARER_TOKEN: &str = "TWITTER_BEARER_TOKEN";

const TWITTER_OAUTH1: [&str; 4] = [
    TWITTER_API_KEY,
    TWITTER_API_SECRET,
    TWITTER_ACCESS_TOKEN,
    TWITTER_ACCESS_TOKEN_SECRET,
];

#[derive(Clone)]
pub struct Secrets {
    pub aptos_private_key: String,
    pub model_api_key: String,
    /// `None` disables `post_tweet`.
    pub twitter: Option<TwitterAuth>,
}

// Keep key material out of debug logs.
impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("aptos_private_key", &"<redacted>")
            .field("model_api_key", &"<redacted>")
            .field("twitter", &self.twitter)
            .finish()
    }
}

impl Secrets {
    /// Read secrets from the process environment (after `.env` was loaded).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read secrets through an arbitrary lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        Ok(Self {
            aptos_private_key: get(APTOS_PRIVATE_KEY)
                .ok_or(ConfigError::MissingSecret(APTOS_PRIVATE_KEY))?,
            model_api_key: get(GROQ_API_KEY).ok_or(ConfigError::MissingSecret(GROQ_API_KEY))?,
            twitter: twitter_auth(&get)?,
        })
    }
}

/// OAuth 1.0a when any of its four variables is set (then all are required),
/// otherwise the bearer token if present.
fn twitter_auth<G>(get: &G) -> Result<Option<TwitterAuth>, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    let [api_key, api_secret, access_token, access_token_secret] = TWITTER_OAUTH1.map(get);
    let any_set = api_key.is_some()
        || api_secret.is_some()
        || access_token.is_some()
        || access_token_secret.is_some();
    if !any_set {
        return Ok(get(TWITTER_BEARER_TOKEN).map(TwitterAuth::Bearer));
    }

    Ok(Some(TwitterAuth::OAuth1(OAuth1Credentials {
        consumer_key: api_key.ok_or(ConfigError::MissingSecret(TWITTER_API_KEY))?,
        consumer_secret: api_secret.ok_or(ConfigError::MissingSecret(TWITTER_API_SECRET))?,
        access_token: access_token.ok_or(ConfigError::MissingSecret(TWITTER_ACCESS_TOKEN))?,
        access_token_secret: access_token_secret
            .ok_or(ConfigError::MissingSecret(TWITTER_ACCESS_TOKEN_SECRET))?,
    })))
}
