use crate::{QuotaInfo, SchedulerPatch, SettingsPatch};

/// Every named mutation the state store accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    SetLoading(bool),
    /// Setting an error also forces `loading` off.
    SetError(Option<String>),
    SetAuthenticated(bool),
    /// Shallow merge into the current settings.
    UpdateSettings(SettingsPatch),
    /// Shallow merge into the scheduler state; `config` replaces wholesale.
    UpdateScheduler(SchedulerPatch),
    /// Full replacement of the quota snapshot.
    UpdateQuota(QuotaInfo),
    /// Back to fresh defaults.
    ResetState,
}
