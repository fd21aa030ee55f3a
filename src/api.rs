use crate::intent;
use crate::random::RandomSource;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

// Trait defining where chat replies come from
#[async_trait]
pub trait ReplyBackend: Send + Sync {
    async fn fetch_reply(&self, message: &str) -> Result<String>;
}

// --- HTTP backend: POST /api/chat ---

#[derive(Serialize, Debug)]
struct ChatRequestBody<'a> {
    message: &'a str,
}

#[derive(Deserialize, Debug)]
struct ChatResponseBody {
    reply: String,
}

pub struct HttpReplyBackend {
    client: Client,
    endpoint: String,
}

impl HttpReplyBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client for reply backend")?;
        Ok(Self {
            client,
            endpoint: format!("{}/api/chat", base_url.trim_end_matches('/')),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ReplyBackend for HttpReplyBackend {
    async fn fetch_reply(&self, message: &str) -> Result<String> {
        log::info!("Sending chat request to {}", self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&ChatRequestBody { message })
            .send()
            .await
            .context("Failed to send chat request")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "<Failed to read error body>".to_string());
            log::error!("Chat request failed with status {}: {}", status, error_body);
            return Err(anyhow::anyhow!("Chat request failed with status {}: {}", status, error_body));
        }

        let body: ChatResponseBody = response
            .json()
            .await
            .context("Malformed chat response body")?;
        Ok(body.reply)
    }
}

// --- Simulated backend: keyword replies after a short delay ---

pub struct KeywordReplyBackend {
    rng: Arc<dyn RandomSource>,
    latency: Duration,
}

impl KeywordReplyBackend {
    pub fn new(rng: Arc<dyn RandomSource>, latency: Duration) -> Self {
        Self { rng, latency }
    }
}

#[async_trait]
impl ReplyBackend for KeywordReplyBackend {
    async fn fetch_reply(&self, message: &str) -> Result<String> {
        tokio::time::sleep(self.latency).await;
        let category = intent::classify(message);
        log::debug!("Simulated reply for category {}", category);
        Ok(intent::reply_for(message, self.rng.as_ref()))
    }
}
