use std::collections::HashMap;
use std::time::Duration;

use chrono::Utc;
use futures_util::future::try_join_all;
use tracing::{debug, info};

use crate::types::MonitorError;

use super::super::api::{
    CompletionQuery, DbStatus, DeviceConfig, DeviceStats, DeviceView, FolderCompletion,
    FolderConfig, FolderStats, FolderStatusQuery, FolderView, SyncthingData, VersionInfo,
};
use super::super::models::{
    ConnectionsSnapshot, DeviceCompletion, DeviceRecord, FolderRecord, SyncthingOverview,
};
use super::classify::{classify_device, classify_folder, watcher_state};
use super::completion::aggregate;
use super::http::HttpClient;
use super::rates::{apply_rates, SAMPLE_INTERVAL};

/// Join device config and stats. Config is authoritative: stats without a
/// config entry are dropped, config without stats still yields a record.
pub fn join_devices(
    configs: &[DeviceConfig],
    stats: &HashMap<String, DeviceStats>,
    just_this_id: Option<&str>,
) -> Vec<DeviceRecord> {
    configs
        .iter()
        .filter(|c| wanted(&c.device_id, just_this_id))
        .map(|c| DeviceRecord::from_parts(c, stats.get(&c.device_id)))
        .collect()
}

/// Join folder config, stats and db status on folder ID.
pub fn join_folders(
    configs: &[FolderConfig],
    stats: &HashMap<String, FolderStats>,
    db_status: &HashMap<String, DbStatus>,
    just_this_id: Option<&str>,
) -> Vec<FolderRecord> {
    configs
        .iter()
        .filter(|c| wanted(&c.id, just_this_id))
        .map(|c| FolderRecord::from_parts(c, stats.get(&c.id), db_status.get(&c.id)))
        .collect()
}

/// A single-entity config lookup; a 404 means the entity is gone.
fn single<T>(result: Result<T, MonitorError>) -> Result<Vec<T>, MonitorError> {
    match result {
        Ok(config) => Ok(vec![config]),
        Err(MonitorError::Http { status: 404, path, .. }) => {
            debug!(%path, "Entity no longer configured");
            Ok(Vec::new())
        }
        Err(err) => Err(err),
    }
}

fn wanted(id: &str, just_this_id: Option<&str>) -> bool {
    !id.is_empty() && just_this_id.map_or(true, |only| only == id)
}

/// Fetches the daemon's independent REST resources and derives one snapshot.
/// Fan-out requests run concurrently; the first failure fails the whole call.
pub struct DataAggregator<'a> {
    http: &'a HttpClient,
    sample_interval: Duration,
}

impl<'a> DataAggregator<'a> {
    pub fn new(http: &'a HttpClient) -> Self {
        Self {
            http,
            sample_interval: SAMPLE_INTERVAL,
        }
    }

    pub fn with_sample_interval(mut self, interval: Duration) -> Self {
        self.sample_interval = interval;
        self
    }

    pub async fn overview(&self) -> Result<SyncthingOverview, MonitorError> {
        let (status, version) = tokio::try_join!(
            self.http.get_value("rest/system/status"),
            self.http.get_json::<VersionInfo>("rest/system/version"),
        )?;
        Ok(SyncthingOverview::from_parts(&status, &version))
    }

    pub async fn devices(
        &self,
        just_this_id: Option<&str>,
    ) -> Result<Vec<DeviceRecord>, MonitorError> {
        let (configs, stats) = tokio::try_join!(
            self.device_configs(just_this_id),
            self.http.get_json::<HashMap<String, DeviceStats>>("rest/stats/device"),
        )?;
        Ok(join_devices(&configs, &stats, just_this_id))
    }

    async fn device_configs(
        &self,
        just_this_id: Option<&str>,
    ) -> Result<Vec<DeviceConfig>, MonitorError> {
        match just_this_id {
            Some(id) => single(self.http.get_json_at(&["rest", "config", "devices", id]).await),
            None => self.http.get_json("rest/config/devices").await,
        }
    }

    pub async fn folders(
        &self,
        just_this_id: Option<&str>,
    ) -> Result<Vec<FolderRecord>, MonitorError> {
        let (configs, stats) = tokio::try_join!(
            self.folder_configs(just_this_id),
            self.http.get_json::<HashMap<String, FolderStats>>("rest/stats/folder"),
        )?;

        let ids: Vec<&str> = configs
            .iter()
            .map(|c| c.id.as_str())
            .filter(|id| wanted(id, just_this_id))
            .collect();
        let statuses = try_join_all(ids.iter().map(|id| self.db_status(id))).await?;
        let db_status: HashMap<String, DbStatus> = ids
            .iter()
            .map(|id| id.to_string())
            .zip(statuses)
            .collect();

        debug!(folders = db_status.len(), "Fetched folder db status");
        Ok(join_folders(&configs, &stats, &db_status, just_this_id))
    }

    async fn folder_configs(
        &self,
        just_this_id: Option<&str>,
    ) -> Result<Vec<FolderConfig>, MonitorError> {
        match just_this_id {
            Some(id) => single(self.http.get_json_at(&["rest", "config", "folders", id]).await),
            None => self.http.get_json("rest/config/folders").await,
        }
    }

    async fn db_status(&self, folder: &str) -> Result<DbStatus, MonitorError> {
        let query = FolderStatusQuery { folder };
        self.http.get_json_with_query("rest/db/status", &query).await
    }

    /// Two reads of the connections resource, one sample interval apart.
    pub async fn connections(&self) -> Result<ConnectionsSnapshot, MonitorError> {
        let before: ConnectionsSnapshot = self.http.get_json("rest/system/connections").await?;
        tokio::time::sleep(self.sample_interval).await;
        let after: ConnectionsSnapshot = self.http.get_json("rest/system/connections").await?;
        Ok(apply_rates(&before, &after, self.sample_interval))
    }

    /// Completion of `device_id` across every unpaused folder it shares.
    pub async fn device_completion(
        &self,
        folders: &[FolderRecord],
        device_id: &str,
    ) -> Result<DeviceCompletion, MonitorError> {
        let shared: Vec<&str> = folders
            .iter()
            .filter(|f| !f.paused && f.is_shared_with(device_id))
            .map(|f| f.id.as_str())
            .collect();

        let completions = try_join_all(shared.iter().map(|&folder| {
            let query = CompletionQuery {
                device: device_id,
                folder,
            };
            async move {
                self.http
                    .get_json_with_query::<FolderCompletion, _>("rest/db/completion", &query)
                    .await
            }
        }))
        .await?;

        Ok(aggregate(
            shared.into_iter().map(str::to_string).zip(completions),
        ))
    }

    /// Composes one fully classified snapshot of the daemon.
    pub async fn compose_payload(&self) -> Result<SyncthingData, MonitorError> {
        let (overview, devices, folders, connections) = tokio::try_join!(
            self.overview(),
            self.devices(None),
            self.folders(None),
            self.connections(),
        )?;

        let my_id = overview.my_id.clone();
        let remote: Vec<DeviceRecord> = devices
            .into_iter()
            .filter(|d| my_id.as_deref() != Some(d.device_id.as_str()))
            .collect();

        let completions = try_join_all(
            remote
                .iter()
                .map(|d| self.device_completion(&folders, &d.device_id)),
        )
        .await?;

        let now = Utc::now();
        let devices: Vec<DeviceView> = remote
            .iter()
            .zip(completions)
            .map(|(device, completion)| {
                let connection = connections.get(&device.device_id);
                DeviceView {
                    record: device.with_connection(connection),
                    status: classify_device(
                        device,
                        &folders,
                        &connections,
                        Some(&completion),
                        now,
                    ),
                    completion,
                    connection: connection.cloned(),
                }
            })
            .collect();

        let folder_views: Vec<FolderView> = folders
            .into_iter()
            .map(|record| {
                let status = classify_folder(&record);
                let watcher = watcher_state(&record, status);
                FolderView {
                    record,
                    status,
                    watcher,
                }
            })
            .collect();

        info!(
            devices = devices.len(),
            folders = folder_views.len(),
            "Composed Syncthing snapshot"
        );

        Ok(SyncthingData {
            overview,
            folders: folder_views,
            devices,
            total: connections.total,
        })
    }
}
