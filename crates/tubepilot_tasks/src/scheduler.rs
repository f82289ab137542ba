use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tubepilot_core::{Phase, RemoteSchedulerConfig, SchedulerPatch, SchedulerState, SchedulerStatus};
use tubepilot_gateway::GatewayError;
use tubepilot_logging::{pilot_debug, pilot_info, pilot_warn};

use crate::cell::TaskCell;
use crate::TaskContext;

/// Drives the remote scheduler. The store's scheduler slice is only touched
/// after the service confirmed a command.
pub struct SchedulerTask {
    ctx: TaskContext,
    cell: TaskCell<()>,
}

impl SchedulerTask {
    pub fn new(ctx: TaskContext) -> Self {
        Self {
            ctx,
            cell: TaskCell::new("scheduler"),
        }
    }

    /// Creates the task and fetches the status once. A failed fetch is
    /// recorded on the task instead of failing construction.
    pub async fn mount(ctx: TaskContext) -> Self {
        let task = Self::new(ctx);
        if let Err(err) = task.refresh_status().await {
            pilot_warn!("Initial scheduler status unavailable: {}", err);
        }
        task
    }

    pub async fn refresh_status(&self) -> Result<SchedulerStatus, GatewayError> {
        let call = self.cell.begin();
        let outcome = self.ctx.gateway().scheduler_status().await;
        if let Ok(status) = &outcome {
            self.ctx.store().update_scheduler(status.to_patch());
        }
        self.cell.settle(call, &outcome, |_, _| {});
        outcome
    }

    pub async fn start(&self) -> Result<(), GatewayError> {
        self.set_running(true).await
    }

    pub async fn stop(&self) -> Result<(), GatewayError> {
        self.set_running(false).await
    }

    async fn set_running(&self, running: bool) -> Result<(), GatewayError> {
        let call = self.cell.begin();
        let gateway = self.ctx.gateway();
        let outcome = if running {
            gateway.start_scheduler().await
        } else {
            gateway.stop_scheduler().await
        };
        if outcome.is_ok() {
            pilot_info!("Scheduler {}", if running { "started" } else { "stopped" });
            self.ctx.store().update_scheduler(SchedulerPatch {
                running: Some(running),
                ..SchedulerPatch::default()
            });
        }
        self.cell.settle(call, &outcome, |_, _| {});
        outcome
    }

    /// Validates locally, sends the configuration, then mirrors it.
    pub async fn update_config(&self, config: RemoteSchedulerConfig) -> Result<(), GatewayError> {
        let call = self.cell.begin();
        let outcome = match config.validate() {
            Ok(()) => self.ctx.gateway().update_scheduler_config(&config).await,
            Err(err) => Err(err.into()),
        };
        if outcome.is_ok() {
            self.ctx.store().update_scheduler(config.to_patch());
        }
        self.cell.settle(call, &outcome, |_, _| {});
        outcome
    }

    pub async fn load_config(&self) -> Result<RemoteSchedulerConfig, GatewayError> {
        let call = self.cell.begin();
        let outcome = self.ctx.gateway().scheduler_config().await;
        if let Ok(config) = &outcome {
            self.ctx.store().update_scheduler(config.to_patch());
        }
        self.cell.settle(call, &outcome, |_, _| {});
        outcome
    }

    /// Refreshes the status every `every` until `cancel` fires. Failures are
    /// logged and polling continues. Returns the number of successful refreshes.
    pub async fn poll(&self, every: Duration, cancel: CancellationToken) -> usize {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        let mut refreshed = 0;
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    match self.refresh_status().await {
                        Ok(_) => refreshed += 1,
                        Err(err) => pilot_warn!("Scheduler poll failed: {}", err),
                    }
                }
            }
        }
        pilot_debug!("Scheduler polling stopped after {} refreshes", refreshed);
        refreshed
    }

    pub fn state(&self) -> SchedulerState {
        self.ctx.store().read(|state| state.scheduler().clone())
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
