use std::time::Duration;

use crate::config::Config;
use crate::types::MonitorError;

use super::api::SyncthingData;
use super::core::rates::SAMPLE_INTERVAL;
use super::core::{DataAggregator, HttpClient};
use super::models::{
    ConnectionsSnapshot, DeviceCompletion, DeviceRecord, FolderRecord, SyncthingOverview,
};

/// Read-only view of a running Syncthing daemon.
///
/// Construct one per polling session and pass it to whoever needs it; every
/// call re-fetches, nothing is cached between calls.
#[derive(Clone)]
pub struct SyncthingClient {
    http: HttpClient,
    sample_interval: Duration,
}

impl SyncthingClient {
    pub fn new(http: HttpClient) -> Self {
        Self {
            http,
            sample_interval: SAMPLE_INTERVAL,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, MonitorError> {
        Ok(Self::new(HttpClient::from_config(config)?))
    }

    /// Override the gap between the two connection samples.
    pub fn with_sample_interval(mut self, interval: Duration) -> Self {
        self.sample_interval = interval;
        self
    }

    fn aggregator(&self) -> DataAggregator<'_> {
        DataAggregator::new(&self.http).with_sample_interval(self.sample_interval)
    }

    pub async fn overview(&self) -> Result<SyncthingOverview, MonitorError> {
        self.aggregator().overview().await
    }

    pub async fn devices(
        &self,
        just_this_id: Option<&str>,
    ) -> Result<Vec<DeviceRecord>, MonitorError> {
        self.aggregator().devices(just_this_id).await
    }

    pub async fn folders(
        &self,
        just_this_id: Option<&str>,
    ) -> Result<Vec<FolderRecord>, MonitorError> {
        self.aggregator().folders(just_this_id).await
    }

    /// Blocks for one sample interval to derive transfer rates.
    pub async fn connections(&self) -> Result<ConnectionsSnapshot, MonitorError> {
        self.aggregator().connections().await
    }

    pub async fn device_completion(
        &self,
        folders: &[FolderRecord],
        device_id: &str,
    ) -> Result<DeviceCompletion, MonitorError> {
        self.aggregator().device_completion(folders, device_id).await
    }

    pub async fn compose_payload(&self) -> Result<SyncthingData, MonitorError> {
        self.aggregator().compose_payload().await
    }
}
