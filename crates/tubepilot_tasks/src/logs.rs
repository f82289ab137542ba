use tubepilot_core::{LogEntry, LogPage, LogQuery, Phase};
use tubepilot_gateway::GatewayError;
use tubepilot_logging::pilot_warn;

use crate::cell::TaskCell;
use crate::TaskContext;

/// Holds one page of service logs at a time.
pub struct LogsTask {
    ctx: TaskContext,
    cell: TaskCell<LogPage>,
}

impl LogsTask {
    pub fn new(ctx: TaskContext) -> Self {
        Self {
            ctx,
            cell: TaskCell::new("logs"),
        }
    }

    /// Creates the task and loads the first page with the default page size.
    pub async fn mount(ctx: TaskContext) -> Self {
        let task = Self::new(ctx);
        if let Err(err) = task.load(LogQuery::default()).await {
            pilot_warn!("Initial log page unavailable: {}", err);
        }
        task
    }

    /// Replaces the held page and total with the requested page.
    pub async fn load(&self, query: LogQuery) -> Result<LogPage, GatewayError> {
        let call = self.cell.begin();
        let outcome = self.ctx.gateway().logs(&query).await;
        self.cell.settle(call, &outcome, |page, outcome| {
            if let Ok(loaded) = outcome {
                *page = loaded.clone();
            }
        });
        outcome
    }

    /// Clears the service logs; the local page is emptied only after the service accepted.
    pub async fn clear(&self) -> Result<(), GatewayError> {
        let call = self.cell.begin();
        let outcome = self.ctx.gateway().clear_logs().await;
        self.cell.settle(call, &outcome, |page, outcome| {
            if outcome.is_ok() {
                *page = LogPage::default();
            }
        });
        outcome
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.cell.read(|_, page| page.logs.clone())
    }

    pub fn total(&self) -> u64 {
        self.cell.read(|_, page| page.total)
    }

    pub fn reset(&self) {
        self.cell.reset();
    }

    pub fn loading(&self) -> bool {
        self.cell.loading()
    }

    pub fn error(&self) -> Option<String> {
        self.cell.error()
    }

    pub fn phase(&self) -> Phase {
        self.cell.phase()
    }
}
