use std::sync::Arc;

use tubepilot_core::{
    Analytics, LogPage, LogQuery, QuotaInfo, RemoteSchedulerConfig, ScraperResult,
    SchedulerStatus, SettingsPatch, UploadProgress, UploadResult,
};

use crate::wire::{
    BatchScrapeRequest, DownloadRequest, DownloadResponse, ProcessRequest, ProcessResponse,
    ScrapeRequest, UploadRequest,
};
use crate::GatewayError;

/// Receives upload progress ticks.
pub trait ProgressSink: Send + Sync {
    fn emit(&self, progress: UploadProgress);
}

impl<F> ProgressSink for F
where
    F: Fn(UploadProgress) + Send + Sync,
{
    fn emit(&self, progress: UploadProgress) {
        self(progress)
    }
}

/// Typed boundary to the remote automation service. One method per capability.
#[async_trait::async_trait]
pub trait RemoteGateway: Send + Sync {
    async fn scrape(&self, request: &ScrapeRequest) -> Result<ScraperResult, GatewayError>;

    async fn scrape_batch(
        &self,
        request: &BatchScrapeRequest,
    ) -> Result<Vec<ScraperResult>, GatewayError>;

    async fn download(&self, request: &DownloadRequest) -> Result<DownloadResponse, GatewayError>;

    async fn process(&self, request: &ProcessRequest) -> Result<ProcessResponse, GatewayError>;

    /// Streams the file and reports progress through `progress` as the transport reads it.
    async fn upload(
        &self,
        request: &UploadRequest,
        progress: Arc<dyn ProgressSink>,
    ) -> Result<UploadResult, GatewayError>;

    async fn scheduler_config(&self) -> Result<RemoteSchedulerConfig, GatewayError>;

    async fn update_scheduler_config(
        &self,
        config: &RemoteSchedulerConfig,
    ) -> Result<(), GatewayError>;

    async fn start_scheduler(&self) -> Result<(), GatewayError>;

    async fn stop_scheduler(&self) -> Result<(), GatewayError>;

    async fn scheduler_status(&self) -> Result<SchedulerStatus, GatewayError>;

    async fn quota(&self) -> Result<QuotaInfo, GatewayError>;

    async fn analytics(&self) -> Result<Analytics, GatewayError>;

    async fn settings(&self) -> Result<SettingsPatch, GatewayError>;

    async fn update_settings(&self, patch: &SettingsPatch) -> Result<(), GatewayError>;

    async fn logs(&self, query: &LogQuery) -> Result<LogPage, GatewayError>;

    async fn clear_logs(&self) -> Result<(), GatewayError>;
}
