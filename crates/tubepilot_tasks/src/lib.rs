//! Client-side orchestration: the state store controller, the task context,
//! and one task per remote capability.
mod cell;
mod context;
mod logs;
mod quota;
mod retry;
mod scheduler;
mod scraper;
mod settings;
mod store;
mod upload;

pub use context::TaskContext;
pub use logs::LogsTask;
pub use quota::QuotaTask;
pub use retry::{retry_with_backoff, RetryPolicy};
pub use scheduler::SchedulerTask;
pub use scraper::ScraperTask;
pub use settings::SettingsTask;
pub use store::{load_persisted_settings, StateStore};
pub use upload::UploadTask;
