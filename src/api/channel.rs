use anyhow::{Context, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;

use super::types::{ChannelInfo, JoinDetails};
use crate::core::config::SessionConfig;

/// REST side of the interactive-control service: channel lookup and joining.
pub struct ChannelClient {
    client: Client,
    base_url: String,
    username: String,
    password: String,
}

impl ChannelClient {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            username: config.username.clone(),
            password: config.password.clone(),
        }
    }

    async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let url = format!("{}/{}", self.base_url, endpoint);
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await
            .with_context(|| format!("request to {} failed", url))?
            .error_for_status()
            .with_context(|| format!("{} returned an error status", url))?;

        response
            .json::<T>()
            .await
            .with_context(|| format!("unexpected response body from {}", url))
    }

    /// Numeric channels are used as-is; names are looked up.
    pub async fn resolve_channel_id(&self, channel: &str) -> Result<u64> {
        if let Some(id) = parse_channel_id(channel) {
            return Ok(id);
        }

        let info: ChannelInfo = self
            .get(&format!("channels/{}", channel))
            .await
            .with_context(|| format!("could not resolve channel '{}'", channel))?;
        tracing::info!("🔎 Channel '{}' resolved to id {}", channel, info.id);
        Ok(info.id)
    }

    pub async fn join(&self, channel_id: u64) -> Result<JoinDetails> {
        self.get(&format!("interactive/{}/robot", channel_id))
            .await
            .with_context(|| format!("could not join channel {}", channel_id))
    }
}

pub fn parse_channel_id(channel: &str) -> Option<u64> {
    channel.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_channel() {
        assert_eq!(parse_channel_id("12345"), Some(12345));
        assert_eq!(parse_channel_id(" 7 "), Some(7));
        assert_eq!(parse_channel_id("some_streamer"), None);
    }

    #[tokio::test]
    async fn test_numeric_channel_skips_lookup() {
        let config = SessionConfig {
            api_base_url: "http://127.0.0.1:9".to_string(),
            ..SessionConfig::default()
        };
        let client = ChannelClient::new(&config);
        assert_eq!(tokio_test::assert_ok!(client.resolve_channel_id("42").await), 42);
    }
}
