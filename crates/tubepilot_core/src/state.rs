use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_MAX_VIDEOS_PER_DAY, DEFAULT_SCHEDULE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Privacy {
    Public,
    #[default]
    Private,
    Unlisted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

/// User-facing settings mirrored to durable storage on every change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub api_key: String,
    pub channel_id: String,
    pub default_privacy: Privacy,
    pub auto_tags: bool,
    pub notifications: bool,
    pub theme: Theme,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            channel_id: String::new(),
            default_privacy: Privacy::Private,
            auto_tags: true,
            notifications: true,
            theme: Theme::System,
        }
    }
}

impl Settings {
    /// Shallow merge: every field present in `patch` replaces the current value.
    pub fn merge(&mut self, patch: &SettingsPatch) {
        if let Some(api_key) = &patch.api_key {
            self.api_key = api_key.clone();
        }
        if let Some(channel_id) = &patch.channel_id {
            self.channel_id = channel_id.clone();
        }
        if let Some(privacy) = patch.default_privacy {
            self.default_privacy = privacy;
        }
        if let Some(auto_tags) = patch.auto_tags {
            self.auto_tags = auto_tags;
        }
        if let Some(notifications) = patch.notifications {
            self.notifications = notifications;
        }
        if let Some(theme) = patch.theme {
            self.theme = theme;
        }
    }
}

/// Partial settings. Also the wire shape of the remote `/settings` resource,
/// which does not know about `theme`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_privacy: Option<Privacy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_tags: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notifications: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<Theme>,
}

impl SettingsPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

impl From<Settings> for SettingsPatch {
    fn from(settings: Settings) -> Self {
        Self {
            api_key: Some(settings.api_key),
            channel_id: Some(settings.channel_id),
            default_privacy: Some(settings.default_privacy),
            auto_tags: Some(settings.auto_tags),
            notifications: Some(settings.notifications),
            theme: Some(settings.theme),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerConfig {
    /// Five-field cron expression.
    pub schedule: String,
    pub max_videos_per_day: u32,
    pub categories: BTreeSet<String>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            schedule: DEFAULT_SCHEDULE.to_string(),
            max_videos_per_day: DEFAULT_MAX_VIDEOS_PER_DAY,
            categories: BTreeSet::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SchedulerState {
    pub enabled: bool,
    pub running: bool,
    /// Advisory; refreshed from the remote status endpoint.
    pub next_run: Option<DateTime<Utc>>,
    pub config: SchedulerConfig,
}

/// Partial scheduler state. `next_run: Some(None)` clears a known next run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SchedulerPatch {
    pub enabled: Option<bool>,
    pub running: Option<bool>,
    pub next_run: Option<Option<DateTime<Utc>>>,
    pub config: Option<SchedulerConfig>,
}

impl SchedulerState {
    pub fn merge(&mut self, patch: &SchedulerPatch) {
        if let Some(enabled) = patch.enabled {
            self.enabled = enabled;
        }
        if let Some(running) = patch.running {
            self.running = running;
        }
        if let Some(next_run) = patch.next_run {
            self.next_run = next_run;
        }
        if let Some(config) = &patch.config {
            self.config = config.clone();
        }
    }
}

/// Daily quota as reported by the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaInfo {
    pub daily_quota: u64,
    pub used_today: u64,
    pub remaining: u64,
    pub reset_time: DateTime<Utc>,
}

impl QuotaInfo {
    /// Whether the service-reported `remaining` agrees with the other two counters.
    pub fn is_consistent(&self) -> bool {
        self.remaining == self.daily_quota.saturating_sub(self.used_today)
    }

    /// Read-only admission check; never adjusts the counters.
    pub fn admits(&self, cost: u64) -> bool {
        self.remaining >= cost
    }
}

/// Aggregate root. Exactly one lives inside the state store of a running client.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    settings: Settings,
    scheduler: SchedulerState,
    quota: Option<QuotaInfo>,
    is_authenticated: bool,
    loading: bool,
    error: Option<String>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn scheduler(&self) -> &SchedulerState {
        &self.scheduler
    }

    pub fn quota(&self) -> Option<&QuotaInfo> {
        self.quota.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub(crate) fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    pub(crate) fn set_error(&mut self, error: Option<String>) {
        self.error = error;
        self.loading = false;
    }

    pub(crate) fn set_authenticated(&mut self, authenticated: bool) {
        self.is_authenticated = authenticated;
    }

    pub(crate) fn merge_settings(&mut self, patch: &SettingsPatch) {
        self.settings.merge(patch);
    }

    pub(crate) fn merge_scheduler(&mut self, patch: &SchedulerPatch) {
        self.scheduler.merge(patch);
    }

    pub(crate) fn replace_quota(&mut self, quota: QuotaInfo) {
        self.quota = Some(quota);
    }
}
