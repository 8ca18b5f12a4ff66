//! Posting to X/Twitter through the v2 API.

use super::oauth::TwitterAuth;
use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::time::Duration;
use tracing::info;

/// Longest tweet the API accepts.
pub const MAX_TWEET_CHARS: usize = 280;

#[derive(Debug, Serialize)]
struct CreateTweetRequest<'a> {
    text: &'a str,
}

/// Client posting on behalf of one user.
#[derive(Clone)]
pub struct TwitterClient {
    api_url: String,
    auth: TwitterAuth,
    http: reqwest::Client,
}

impl std::fmt::Debug for TwitterClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwitterClient")
            .field("api_url", &self.api_url)
            .field("auth", &self.auth.scheme())
            .finish_non_exhaustive()
    }
}

impl TwitterClient {
    pub fn new(api_url: &str, auth: TwitterAuth, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build Twitter HTTP client")?;
        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            auth,
            http,
        })
    }

    /// Publish `text`. Returns the raw response JSON.
    pub async fn post(&self, text: &str) -> Result<String> {
        let chars = text.chars().count();
        if chars == 0 {
            bail!("Tweet text is empty");
        }
        if chars > MAX_TWEET_CHARS {
            bail!("Tweet is {} characters, limit is {}", chars, MAX_TWEET_CHARS);
        }

        let url = format!("{}/2/tweets", self.api_url);
        let authorization = self.auth.header_value("POST", &url)?;
        let resp = self
            .http
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, authorization)
            .json(&CreateTweetRequest { text })
            .send()
            .await
            .context("Failed to post tweet")?;

        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            bail!("Post tweet failed ({}): {}", status, body);
        }

        info!("Tweet posted ({} chars)", chars);
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::social::OAuth1Credentials;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, header_regex, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> TwitterClient {
        TwitterClient::new(
            &server.uri(),
            TwitterAuth::Bearer("tw-token".into()),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn posts_with_oauth1_signature() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/2/tweets"))
            .and(header_regex("authorization", r#"^OAuth oauth_consumer_key="ck", .*oauth_token="at", .*oauth_signature=""#))
            .and(body_json(json!({"text": "gm aptos"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"data": {"id": "2"}})))
            .expect(1)
            .mount(&server)
            .await;

        let auth = TwitterAuth::OAuth1(OAuth1Credentials {
            consumer_key: "ck".into(),
            consumer_secret: "cs".into(),
            access_token: "at".into(),
            access_token_secret: "ats".into(),
        });
        let client = TwitterClient::new(&server.uri(), auth, Duration::from_secs(5)).unwrap();
        let body = client.post("gm aptos").await.unwrap();
        assert!(body.contains("\"2\""), "{body}");
    }

    #[tokio::test]
    async fn posts_with_bearer_auth() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/2/tweets"))
            .and(header("authorization", "Bearer tw-token"))
            .and(body_json(json!({"text": "gm aptos"})))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_json(json!({"data": {"id": "1", "text": "gm aptos"}})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let body = client(&server).post("gm aptos").await.unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed["data"]["id"], "1");
    }

    #[tokio::test]
    async fn rejects_empty_and_oversized_text_locally() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let client = client(&server);
        assert!(client.post("").await.is_err());
        assert!(client.post(&"a".repeat(281)).await.is_err());
    }

    #[tokio::test]
    async fn api_errors_are_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("duplicate content"))
            .mount(&server)
            .await;

        let err = client(&server).post("hello").await.unwrap_err();
        assert!(err.to_string().contains("403"), "{err}");
    }
}
