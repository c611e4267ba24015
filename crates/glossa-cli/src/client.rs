use anyhow::{Context, Result, bail};
use glossa_config::Config;
use glossa_engine::prompt::CompletionRequest;
use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use std::time::Duration;

/// Chat completion endpoint of an OpenAI compatible service.
pub struct CompletionClient {
    http: Client,
    url: String,
    api_key: String,
    model: String,
}

impl CompletionClient {
    pub fn new(config: &Config, api_key: String) -> Result<Self> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            url: config.completions_url(),
            api_key,
            model: config.model.clone(),
        })
    }

    /// Sends the generation request and returns the open event stream.
    pub fn stream(&self, topic: &str) -> Result<Response> {
        let request = CompletionRequest::for_topic(&self.model, topic);
        log::info!("requesting {} from {}", self.model, self.url);

        let response = self
            .http
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .header("Accept", "text/event-stream")
            .json(&request)
            .send()
            .with_context(|| format!("Request to {} failed", self.url))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            bail!("Rate limited by the model service, try again later");
        }
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            bail!("HTTP {status}: {}", body.trim());
        }
        Ok(response)
    }
}
