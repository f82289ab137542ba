//! Scripted in-process gateway for task tests.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use chrono::{TimeZone, Utc};
use tubepilot_core::{
    Analytics, LogEntry, LogLevel, LogPage, LogQuery, QuotaInfo, RemoteSchedulerConfig,
    ScraperResult, SchedulerStatus, SettingsPatch, UploadProgress, UploadResult, UploadStatus,
};
use tubepilot_gateway::wire::{
    BatchScrapeRequest, DownloadRequest, DownloadResponse, ProcessRequest, ProcessResponse,
    ScrapeRequest, UploadRequest,
};
use tubepilot_gateway::{
    FailureKind, GatewayError, KeyValueStore, MemoryStore, ProgressSink, RemoteGateway,
};
use tubepilot_tasks::{StateStore, TaskContext};

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(tubepilot_logging::initialize_for_tests);
}

/// Queue of replies for one gateway method, each optionally delayed.
pub struct Script<T> {
    replies: Mutex<VecDeque<(Duration, Result<T, GatewayError>)>>,
}

impl<T> Default for Script<T> {
    fn default() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
        }
    }
}

impl<T> Script<T> {
    pub fn ok(&self, value: T) {
        self.push(Duration::ZERO, Ok(value));
    }

    pub fn fail(&self, kind: FailureKind, message: &str) {
        self.push(Duration::ZERO, Err(GatewayError::new(kind, message)));
    }

    pub fn push(&self, delay: Duration, reply: Result<T, GatewayError>) {
        self.replies.lock().unwrap().push_back((delay, reply));
    }

    async fn next(&self) -> Result<T, GatewayError> {
        let reply = self.replies.lock().unwrap().pop_front();
        let (delay, result) = reply.unwrap_or_else(|| {
            (
                Duration::ZERO,
                Err(GatewayError::new(FailureKind::Server, "unscripted call")),
            )
        });
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        result
    }
}

#[derive(Default)]
pub struct FakeGateway {
    pub scrape: Script<ScraperResult>,
    pub scrape_batch: Script<Vec<ScraperResult>>,
    pub upload: Script<UploadResult>,
    /// `(loaded, total)` pairs reported before the upload reply.
    pub upload_ticks: Mutex<Vec<(u64, u64)>>,
    pub scheduler_config: Script<RemoteSchedulerConfig>,
    pub update_scheduler_config: Script<()>,
    pub start_scheduler: Script<()>,
    pub stop_scheduler: Script<()>,
    pub scheduler_status: Script<SchedulerStatus>,
    pub quota: Script<QuotaInfo>,
    pub settings: Script<SettingsPatch>,
    pub update_settings: Script<()>,
    pub logs: Script<LogPage>,
    pub clear_logs: Script<()>,
    pub calls: Mutex<Vec<&'static str>>,
}

impl FakeGateway {
    fn record(&self, name: &'static str) {
        self.calls.lock().unwrap().push(name);
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl RemoteGateway for FakeGateway {
    async fn scrape(&self, _request: &ScrapeRequest) -> Result<ScraperResult, GatewayError> {
        self.record("scrape");
        self.scrape.next().await
    }

    async fn scrape_batch(
        &self,
        _request: &BatchScrapeRequest,
    ) -> Result<Vec<ScraperResult>, GatewayError> {
        self.record("scrape_batch");
        self.scrape_batch.next().await
    }

    async fn download(&self, _request: &DownloadRequest) -> Result<DownloadResponse, GatewayError> {
        self.record("download");
        Err(GatewayError::new(FailureKind::Server, "unscripted call"))
    }

    async fn process(&self, _request: &ProcessRequest) -> Result<ProcessResponse, GatewayError> {
        self.record("process");
        Err(GatewayError::new(FailureKind::Server, "unscripted call"))
    }

    async fn upload(
        &self,
        _request: &UploadRequest,
        progress: Arc<dyn ProgressSink>,
    ) -> Result<UploadResult, GatewayError> {
        self.record("upload");
        let ticks = self.upload_ticks.lock().unwrap().clone();
        for (loaded, total) in ticks {
            if let Some(tick) = UploadProgress::measure(loaded, total, Duration::from_secs(1)) {
                progress.emit(tick);
            }
        }
        self.upload.next().await
    }

    async fn scheduler_config(&self) -> Result<RemoteSchedulerConfig, GatewayError> {
        self.record("scheduler_config");
        self.scheduler_config.next().await
    }

    async fn update_scheduler_config(
        &self,
        _config: &RemoteSchedulerConfig,
    ) -> Result<(), GatewayError> {
        self.record("update_scheduler_config");
        self.update_scheduler_config.next().await
    }

    async fn start_scheduler(&self) -> Result<(), GatewayError> {
        self.record("start_scheduler");
        self.start_scheduler.next().await
    }

    async fn stop_scheduler(&self) -> Result<(), GatewayError> {
        self.record("stop_scheduler");
        self.stop_scheduler.next().await
    }

    async fn scheduler_status(&self) -> Result<SchedulerStatus, GatewayError> {
        self.record("scheduler_status");
        self.scheduler_status.next().await
    }

    async fn quota(&self) -> Result<QuotaInfo, GatewayError> {
        self.record("quota");
        self.quota.next().await
    }

    async fn analytics(&self) -> Result<Analytics, GatewayError> {
        self.record("analytics");
        Err(GatewayError::new(FailureKind::Server, "unscripted call"))
    }

    async fn settings(&self) -> Result<SettingsPatch, GatewayError> {
        self.record("settings");
        self.settings.next().await
    }

    async fn update_settings(&self, _patch: &SettingsPatch) -> Result<(), GatewayError> {
        self.record("update_settings");
        self.update_settings.next().await
    }

    async fn logs(&self, _query: &LogQuery) -> Result<LogPage, GatewayError> {
        self.record("logs");
        self.logs.next().await
    }

    async fn clear_logs(&self) -> Result<(), GatewayError> {
        self.record("clear_logs");
        self.clear_logs.next().await
    }
}

pub struct Fixture {
    pub gateway: Arc<FakeGateway>,
    pub storage: Arc<MemoryStore>,
    pub ctx: TaskContext,
}

pub fn fixture() -> Fixture {
    init_logging();
    let gateway = Arc::new(FakeGateway::default());
    let storage = Arc::new(MemoryStore::new());
    let store = StateStore::open(storage.clone() as Arc<dyn KeyValueStore>);
    let ctx = TaskContext::new(gateway.clone(), store);
    Fixture {
        gateway,
        storage,
        ctx,
    }
}

pub fn scraped(url: &str, title: &str) -> ScraperResult {
    ScraperResult {
        url: url.to_string(),
        title: title.to_string(),
        duration: "PT3M12S".to_string(),
        thumbnail: format!("{url}/thumb.jpg"),
        description: None,
        channel_name: None,
        view_count: None,
        upload_date: None,
        metadata: None,
    }
}

pub fn uploaded(video_id: &str) -> UploadResult {
    UploadResult {
        video_id: video_id.to_string(),
        url: format!("https://youtu.be/{video_id}"),
        status: UploadStatus::Success,
        error: None,
        published_at: None,
    }
}

pub fn quota(daily: u64, used: u64) -> QuotaInfo {
    QuotaInfo {
        daily_quota: daily,
        used_today: used,
        remaining: daily.saturating_sub(used),
        reset_time: Utc.with_ymd_and_hms(2026, 1, 2, 0, 0, 0).unwrap(),
    }
}

pub fn log_page(messages: &[&str], total: u64) -> LogPage {
    LogPage {
        logs: messages
            .iter()
            .enumerate()
            .map(|(index, message)| LogEntry {
                id: format!("log-{index}"),
                timestamp: Utc.with_ymd_and_hms(2026, 1, 1, 9, 0, index as u32).unwrap(),
                level: LogLevel::Info,
                message: message.to_string(),
                details: None,
                source: Some("scheduler".to_string()),
            })
            .collect(),
        total,
    }
}
