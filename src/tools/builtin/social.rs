use super::{with_ctx, ToolContext};
use crate::tools::{ParamType, Tool, ToolArgs, ToolDescriptor};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::warn;

pub(super) fn tools(ctx: &Arc<ToolContext>) -> Vec<Arc<dyn Tool>> {
    if ctx.twitter.is_none() {
        warn!("No Twitter credentials configured; post_tweet is disabled");
        return Vec::new();
    }
    vec![with_ctx(
        ctx,
        ToolDescriptor::new("post_tweet", "Post a tweet to the agent's X/Twitter account.")
            .param("tweet_text", ParamType::String, "Text of the tweet, at most 280 characters"),
        execute_post_tweet,
    )]
}

async fn execute_post_tweet(ctx: Arc<ToolContext>, args: ToolArgs) -> Result<String> {
    let twitter = ctx.twitter.as_ref().context("Twitter is not configured")?;
    twitter.post(args.str("tweet_text")?).await
}

#[cfg(test)]
mod tests {
    use super::super::test_support::context;
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn tweets_through_the_configured_client() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/2/tweets"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"data": {"id": "9"}})))
            .expect(1)
            .mount(&server)
            .await;

        let ctx = context(&server.uri(), Some("token"));
        let mut map = serde_json::Map::new();
        map.insert("tweet_text".into(), json!("hello"));
        let out = execute_post_tweet(ctx, ToolArgs::from_map(map)).await.unwrap();
        assert!(out.contains("\"9\""), "{out}");
    }
}
