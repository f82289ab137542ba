use std::sync::{Mutex, MutexGuard, PoisonError};

use tubepilot_core::{AuthEdge, CallId, CallLedger, Settings, SettingsPatch, Transition};
use tubepilot_gateway::GatewayError;
use tubepilot_logging::{pilot_debug, pilot_warn};

use crate::TaskContext;

/// Keeps local settings in step with the service.
///
/// Loading and error live on the store itself rather than on the task.
pub struct SettingsTask {
    ctx: TaskContext,
    ledger: Mutex<CallLedger>,
    auth: Mutex<AuthEdge>,
}

impl SettingsTask {
    pub fn new(ctx: TaskContext) -> Self {
        Self {
            ctx,
            ledger: Mutex::new(CallLedger::default()),
            auth: Mutex::new(AuthEdge::new()),
        }
    }

    /// Loads settings when the session has just become authenticated.
    /// Returns `None` when there was no such edge.
    pub async fn sync_with_auth(&self) -> Option<Result<SettingsPatch, GatewayError>> {
        let authenticated = self.ctx.store().read(|state| state.is_authenticated());
        let rising = self
            .auth
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .observe(authenticated);
        if rising {
            Some(self.load().await)
        } else {
            None
        }
    }

    pub async fn load(&self) -> Result<SettingsPatch, GatewayError> {
        let call = self.begin();
        let outcome = self.ctx.gateway().settings().await;
        if let Ok(patch) = &outcome {
            self.ctx.store().update_settings(patch.clone());
        }
        self.settle(call, &outcome);
        outcome
    }

    /// Sends `patch` to the service and mirrors it locally once accepted.
    pub async fn save(&self, patch: SettingsPatch) -> Result<(), GatewayError> {
        let call = self.begin();
        let outcome = self.ctx.gateway().update_settings(&patch).await;
        if outcome.is_ok() {
            self.ctx.store().update_settings(patch);
        }
        self.settle(call, &outcome);
        outcome
    }

    pub fn settings(&self) -> Settings {
        self.ctx.store().read(|state| state.settings().clone())
    }

    pub fn loading(&self) -> bool {
        self.ctx.store().read(|state| state.loading())
    }

    pub fn error(&self) -> Option<String> {
        self.ctx.store().read(|state| state.error().map(str::to_string))
    }

    pub fn in_flight(&self) -> usize {
        self.ledger().in_flight()
    }

    fn begin(&self) -> CallId {
        let store = self.ctx.store();
        store.dispatch_all([Transition::SetError(None), Transition::SetLoading(true)]);
        self.ledger().begin()
    }

    fn settle<T>(&self, call: CallId, outcome: &Result<T, GatewayError>) {
        let store = self.ctx.store();
        match outcome {
            // Clearing the error also turns loading off.
            Ok(_) => store.dispatch(Transition::SetError(None)),
            Err(err) => {
                pilot_warn!("settings call {} failed: {}", call, err);
                store.dispatch(Transition::SetError(Some(err.to_string())));
            }
        }
        let settlement = self.ledger().settle(call);
        if settlement.superseded {
            pilot_debug!("settings call {} settled after newer calls started", call);
        }
    }

    fn ledger(&self) -> MutexGuard<'_, CallLedger> {
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
