use tubepilot_core::{AuthEdge, Phase, QuotaInfo, Transition};
use tubepilot_gateway::GatewayError;
use tubepilot_logging::pilot_warn;

use crate::cell::TaskCell;
use crate::TaskContext;

/// Mirrors the service's daily upload quota into the store.
pub struct QuotaTask {
    ctx: TaskContext,
    cell: TaskCell<AuthEdge>,
}

impl QuotaTask {
    pub fn new(ctx: TaskContext) -> Self {
        Self {
            ctx,
            cell: TaskCell::new("quota"),
        }
    }

    /// Loads the quota when the session has just become authenticated.
    pub async fn sync_with_auth(&self) -> Option<Result<QuotaInfo, GatewayError>> {
        let authenticated = self.ctx.store().read(|state| state.is_authenticated());
        let rising = self.cell.write(|_, edge| edge.observe(authenticated));
        if rising {
            Some(self.load().await)
        } else {
            None
        }
    }

    pub async fn load(&self) -> Result<QuotaInfo, GatewayError> {
        let call = self.cell.begin();
        let outcome = self.ctx.gateway().quota().await;
        if let Ok(quota) = &outcome {
            if !quota.is_consistent() {
                pilot_warn!(
                    "Quota counters disagree: daily {} used {} remaining {}",
                    quota.daily_quota,
                    quota.used_today,
                    quota.remaining
                );
            }
            self.ctx
                .store()
                .dispatch(Transition::UpdateQuota(quota.clone()));
        }
        self.cell.settle(call, &outcome, |_, _| {});
        outcome
    }

    pub fn quota(&self) -> Option<QuotaInfo> {
        self.ctx.store().read(|state| state.quota().cloned())
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
