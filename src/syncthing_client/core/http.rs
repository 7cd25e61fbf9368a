use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::config::Config;
use crate::types::MonitorError;

/// Authenticated GET client for the daemon's REST surface. No retries here.
#[derive(Clone)]
pub struct HttpClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl HttpClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, MonitorError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(MonitorError::Transport)?;
        Ok(Self::with_client(http, base_url, api_key))
    }

    pub fn from_config(config: &Config) -> Result<Self, MonitorError> {
        let api_key = config.require_api_key()?;
        Self::new(config.daemon_base_url(), api_key, config.request_timeout())
    }

    pub fn with_client(
        http: Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get_json<T>(&self, path: &str) -> Result<T, MonitorError>
    where
        T: DeserializeOwned,
    {
        self.get_json_with_query(path, &()).await
    }

    pub async fn get_value(&self, path: &str) -> Result<Value, MonitorError> {
        self.get_json(path).await
    }

    pub async fn get_json_with_query<T, Q>(&self, path: &str, query: &Q) -> Result<T, MonitorError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let url = self.endpoint(path, &segments)?;
        self.fetch(path, url, query).await
    }

    /// GET a resource whose path ends in caller-supplied segments, such as a
    /// user-chosen folder ID. Each segment is percent-encoded on its own.
    pub async fn get_json_at<T>(&self, segments: &[&str]) -> Result<T, MonitorError>
    where
        T: DeserializeOwned,
    {
        let label = segments.join("/");
        let url = self.endpoint(&label, segments)?;
        self.fetch(&label, url, &()).await
    }

    fn endpoint(&self, path: &str, segments: &[&str]) -> Result<Url, MonitorError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|err| MonitorError::Config(format!("invalid daemon URL: {err}")))?;
        url.path_segments_mut()
            .map_err(|_| {
                MonitorError::Config(format!("cannot resolve {path} against the daemon URL"))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn fetch<T, Q>(&self, path: &str, url: Url, query: &Q) -> Result<T, MonitorError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        debug!(%url, "GET");

        // Older daemons only honour X-API-Key, newer middleware wants Bearer.
        let response = self
            .http
            .get(url)
            .header(ACCEPT, "application/json")
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header("X-API-Key", &self.api_key)
            .query(query)
            .send()
            .await
            .map_err(|err| MonitorError::from_reqwest(path, err))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MonitorError::from_status(path, status.as_u16(), body));
        }

        response
            .json::<T>()
            .await
            .map_err(|err| MonitorError::from_reqwest(path, err))
    }
}
