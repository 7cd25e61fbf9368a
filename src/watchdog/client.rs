use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::Config;
use crate::types::MonitorError;

use super::checks::{
    CheckResponse, Detection, ScannedApiKey, ScannedBasicAuth, ScannedPort, StartCheck,
};
use super::state::WatchdogState;

pub const STATE_ROUTE: &str = "__decky-watchdog/state";
pub const RELOAD_CONFIG_ROUTE: &str = "__decky-watchdog/reload-config";
pub const START_ROUTE: &str = "__decky-watchdog/start";
pub const STOP_ROUTE: &str = "__decky-watchdog/stop";
pub const CHECK_START_ROUTE: &str = "__decky-watchdog/check/start";
pub const CHECK_SCAN_PORT_ROUTE: &str = "__decky-watchdog/check/scan_port";
pub const CHECK_SCAN_API_KEY_ROUTE: &str = "__decky-watchdog/check/scan_api_key";
pub const CHECK_SCAN_BASIC_AUTH_ROUTE: &str = "__decky-watchdog/check/scan_basic_auth";

/// Client for the supervisor process that owns the daemon's lifecycle.
#[derive(Clone)]
pub struct WatchdogClient {
    http: Client,
    base_url: String,
    retry_delay: Duration,
}

impl WatchdogClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, MonitorError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(MonitorError::Transport)?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            retry_delay: Duration::from_secs(1),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, MonitorError> {
        Ok(Self::new(config.watchdog_url.clone(), config.request_timeout())?
            .with_retry_delay(config.state_retry_delay()))
    }

    /// Delay before the single retry of a failed state request.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    fn url(&self, route: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), route)
    }

    /// Query the daemon's lifecycle state.
    ///
    /// A connection failure is retried exactly once, since the watchdog may
    /// still be binding its listener. HTTP errors are never retried.
    pub async fn get_state(&self) -> Result<WatchdogState, MonitorError> {
        let response = match self.send_get(STATE_ROUTE).await {
            Err(err) if err.is_unreachable() => {
                warn!(error = ?err, "Watchdog unreachable, retrying state request once");
                tokio::time::sleep(self.retry_delay).await;
                self.send_get(STATE_ROUTE).await?
            }
            other => other?,
        };
        let body = ok_text(STATE_ROUTE, response).await?;
        WatchdogState::parse(&body)
    }

    /// Ask the watchdog to re-read its settings file.
    pub async fn reload_config(&self) -> Result<(), MonitorError> {
        self.post_expect_ok(RELOAD_CONFIG_ROUTE).await
    }

    pub async fn start(&self) -> Result<(), MonitorError> {
        self.post_expect_ok(START_ROUTE).await
    }

    pub async fn stop(&self) -> Result<(), MonitorError> {
        self.post_expect_ok(STOP_ROUTE).await
    }

    /// Dry-run start; `StartFailed` carries the watchdog's explanation.
    pub async fn check_start(&self) -> Result<(), MonitorError> {
        let check: StartCheck = self.post_check(CHECK_START_ROUTE).await?;
        check.into_result()
    }

    pub async fn check_scan_port(&self) -> Result<Detection<u16>, MonitorError> {
        let response: CheckResponse<ScannedPort> = self.post_check(CHECK_SCAN_PORT_ROUTE).await?;
        Ok(response.detect(|scan| scan.port))
    }

    pub async fn check_scan_apikey(&self) -> Result<Detection<String>, MonitorError> {
        let response: CheckResponse<ScannedApiKey> =
            self.post_check(CHECK_SCAN_API_KEY_ROUTE).await?;
        Ok(response.detect(|scan| scan.api_key.filter(|key| !key.is_empty())))
    }

    pub async fn check_scan_basic_auth(&self) -> Result<Detection<String>, MonitorError> {
        let response: CheckResponse<ScannedBasicAuth> =
            self.post_check(CHECK_SCAN_BASIC_AUTH_ROUTE).await?;
        Ok(response.detect(|scan| scan.basic_auth_user.filter(|user| !user.is_empty())))
    }

    /// Probe the proxy root: `false` while the daemon is too early to answer,
    /// `true` once it is reachable, an error on any 5xx.
    pub async fn check_if_up(&self) -> Result<bool, MonitorError> {
        let response = self
            .http
            .post(self.url(""))
            .send()
            .await
            .map_err(|err| MonitorError::from_reqwest("/", err))?;

        let status = response.status();
        if status.is_server_error() {
            let body = response.text().await.unwrap_or_default();
            return Err(MonitorError::from_status("/", status.as_u16(), body));
        }
        Ok(status != StatusCode::TOO_EARLY)
    }

    async fn send_get(&self, route: &str) -> Result<Response, MonitorError> {
        self.http
            .get(self.url(route))
            .send()
            .await
            .map_err(|err| MonitorError::from_reqwest(route, err))
    }

    async fn send_post(&self, route: &str) -> Result<Response, MonitorError> {
        debug!(route, "POST");
        self.http
            .post(self.url(route))
            .send()
            .await
            .map_err(|err| MonitorError::from_reqwest(route, err))
    }

    async fn post_expect_ok(&self, route: &str) -> Result<(), MonitorError> {
        let response = self.send_post(route).await?;
        ok_text(route, response).await.map(|_| ())
    }

    /// Check endpoints answer 500 with a JSON body when the check itself fails.
    async fn post_check<T>(&self, route: &str) -> Result<T, MonitorError>
    where
        T: DeserializeOwned,
    {
        let response = self.send_post(route).await?;
        let status = response.status();
        if !status.is_success() && status != StatusCode::INTERNAL_SERVER_ERROR {
            let body = response.text().await.unwrap_or_default();
            return Err(MonitorError::from_status(route, status.as_u16(), body));
        }

        let body = response
            .text()
            .await
            .map_err(|err| MonitorError::from_reqwest(route, err))?;
        serde_json::from_str(&body).map_err(|err| MonitorError::DetectionFailed {
            reason: format!("{route} returned an unreadable body: {err}"),
        })
    }
}

async fn ok_text(route: &str, response: Response) -> Result<String, MonitorError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|err| MonitorError::from_reqwest(route, err))?;
    if !status.is_success() {
        return Err(MonitorError::from_status(route, status.as_u16(), body));
    }
    Ok(body)
}
