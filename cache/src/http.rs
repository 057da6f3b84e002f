//! GET a URL and decode the body as JSON.

use std::time::Duration;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::{FetchError, JsonSource};

#[derive(Debug, Clone)]
pub struct HttpJsonSource {
    client: reqwest::Client,
    url: Url,
}

impl HttpJsonSource {
    pub fn new(url: Url, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("syncspace/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, url })
    }

    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// One GET. Non-2xx statuses and non-JSON bodies are errors.
    pub async fn get_json(&self) -> Result<Value, FetchError> {
        debug!(host = self.url.host_str().unwrap_or_default(), "Fetching");
        let response = self.client.get(self.url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| FetchError::Decode(e.to_string()))
    }
}

impl JsonSource for HttpJsonSource {
    fn fetch(&self) -> BoxFuture<'static, Result<Value, FetchError>> {
        let source = self.clone();
        async move { source.get_json().await }.boxed()
    }
}
