//! TubePilot core: data model, named transitions and the pure update function.
pub mod constants;
mod effect;
mod ledger;
mod model;
mod progress;
mod state;
mod transition;
mod update;
mod validate;

pub use effect::Effect;
pub use ledger::{AuthEdge, CallId, CallLedger, Phase, Settlement, TaskTransient};
pub use model::{
    Analytics, LogEntry, LogLevel, LogPage, LogQuery, RemoteSchedulerConfig, ScraperResult,
    SchedulerStatus, UploadResult, UploadStatus, VideoMetadata,
};
pub use progress::UploadProgress;
pub use state::{
    AppState, Privacy, QuotaInfo, SchedulerConfig, SchedulerPatch, SchedulerState, Settings,
    SettingsPatch, Theme,
};
pub use transition::Transition;
pub use update::update;
pub use validate::{validate_schedule, ValidationError};
