use anyhow::Result;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, instrument};

/// Remote-fetch failures. Non-2xx responses keep their status so callers can
/// tell them apart from transport errors instead of seeing an empty result.
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("request to {url} failed with status {status}")]
    Status { status: StatusCode, url: String },
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("movieflix/0.1.0")
            .build()
            .expect("Failed to create HTTP client");

        Self { client }
    }

    #[instrument(skip(self), fields(url = %url))]
    pub async fn get(&self, url: &str) -> Result<Response> {
        debug!("Making GET request");
        let response =
            self.client.get(url).send().await.map_err(|e| HttpError::Transport {
                url: url.to_string(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            error!("HTTP request failed with status: {}", status);
            return Err(HttpError::Status {
                status,
                url: url.to_string(),
            }
            .into());
        }

        Ok(response)
    }

    #[instrument(skip(self), fields(url = %url))]
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self.get(url).await?;
        let json = response.json::<T>().await?;
        Ok(json)
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}
