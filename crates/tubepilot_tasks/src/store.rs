//! Operation state store: the one mutable `AppState` of a running client.
//!
//! Every change goes through [`tubepilot_core::update`]; the effects it returns
//! (settings persistence, forgetting stored values) are executed here.
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use ron::extensions::Extensions;
use ron::ser::PrettyConfig;
use tokio::sync::watch;
use tubepilot_core::{
    update, AppState, Effect, SchedulerPatch, Settings, SettingsPatch, Transition,
};
use tubepilot_gateway::{
    CredentialStore, KeyValueStore, SessionObserver, StoreError, SETTINGS_KEY,
};
use tubepilot_logging::{pilot_debug, pilot_error, pilot_info, pilot_warn};

pub struct StateStore {
    state: Mutex<AppState>,
    storage: Arc<dyn KeyValueStore>,
    credentials: CredentialStore,
    changes: watch::Sender<AppState>,
}

impl StateStore {
    /// Creates the store, then performs the single start-up load of persisted
    /// settings before anything else is dispatched. A stored token marks the
    /// session as authenticated.
    pub fn open(storage: Arc<dyn KeyValueStore>) -> Arc<Self> {
        let (changes, _) = watch::channel(AppState::new());
        let store = Self {
            state: Mutex::new(AppState::new()),
            credentials: CredentialStore::new(storage.clone()),
            storage,
            changes,
        };

        match load_persisted_settings(store.storage.as_ref()) {
            Ok(Some(patch)) => {
                pilot_info!("Restored persisted settings");
                store.dispatch(Transition::UpdateSettings(patch));
            }
            Ok(None) => {}
            Err(err) => pilot_warn!("Ignoring persisted settings: {}", err),
        }

        let authenticated = store.credentials.token().is_some();
        store.dispatch(Transition::SetAuthenticated(authenticated));
        Arc::new(store)
    }

    /// Applies one transition atomically and runs the effects it produced.
    pub fn dispatch(&self, transition: Transition) {
        self.dispatch_all([transition]);
    }

    /// Applies `transitions` in order under one lock. Subscribers only see
    /// the state after the last one.
    pub fn dispatch_all(&self, transitions: impl IntoIterator<Item = Transition>) {
        let mut guard = self.lock();
        let mut effects = Vec::new();
        for transition in transitions {
            pilot_debug!("dispatch {:?}", transition);
            let current = std::mem::take(&mut *guard);
            let (next, produced) = update(current, transition);
            *guard = next;
            effects.extend(produced);
        }
        self.changes.send_replace(guard.clone());
        for effect in effects {
            self.run_effect(effect);
        }
    }

    pub fn snapshot(&self) -> AppState {
        self.lock().clone()
    }

    /// Reads from the current state without cloning it.
    pub fn read<R>(&self, f: impl FnOnce(&AppState) -> R) -> R {
        f(&self.lock())
    }

    /// Every dispatched transition publishes a fresh snapshot here.
    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.changes.subscribe()
    }

    pub fn update_settings(&self, patch: SettingsPatch) {
        self.dispatch(Transition::UpdateSettings(patch));
    }

    pub fn update_scheduler(&self, patch: SchedulerPatch) {
        self.dispatch(Transition::UpdateScheduler(patch));
    }

    pub fn set_loading(&self, loading: bool) {
        self.dispatch(Transition::SetLoading(loading));
    }

    pub fn set_error(&self, error: Option<String>) {
        self.dispatch(Transition::SetError(error));
    }

    /// Stores the bearer token used by the gateway and marks the session authenticated.
    pub fn sign_in(&self, token: &str) -> Result<(), StoreError> {
        self.credentials.store(token)?;
        self.dispatch(Transition::SetAuthenticated(true));
        Ok(())
    }

    /// Back to defaults; stored settings and the stored token are dropped.
    pub fn sign_out(&self) {
        self.dispatch(Transition::ResetState);
    }

    fn lock(&self) -> MutexGuard<'_, AppState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn run_effect(&self, effect: Effect) {
        match effect {
            Effect::PersistSettings(settings) => {
                if let Err(err) = persist_settings(self.storage.as_ref(), &settings) {
                    pilot_error!("Failed to persist settings: {}", err);
                }
            }
            Effect::ForgetPersisted => {
                if let Err(err) = self.storage.remove(SETTINGS_KEY) {
                    pilot_error!("Failed to remove persisted settings: {}", err);
                }
                if let Err(err) = self.credentials.clear() {
                    pilot_error!("Failed to remove stored credential: {}", err);
                }
            }
        }
    }
}

impl SessionObserver for StateStore {
    fn session_ended(&self) {
        self.dispatch(Transition::SetAuthenticated(false));
    }
}

/// Reads stored settings as a patch so fields missing from older files keep
/// their defaults. Values are written as plain `Settings`, hence implicit `Some`.
pub fn load_persisted_settings(
    storage: &dyn KeyValueStore,
) -> Result<Option<SettingsPatch>, StoreError> {
    let Some(text) = storage.get(SETTINGS_KEY)? else {
        return Ok(None);
    };
    ron::Options::default()
        .with_default_extension(Extensions::IMPLICIT_SOME)
        .from_str::<SettingsPatch>(&text)
        .map(Some)
        .map_err(|err| StoreError::Parse {
            key: SETTINGS_KEY.to_string(),
            message: err.to_string(),
        })
}

fn persist_settings(storage: &dyn KeyValueStore, settings: &Settings) -> Result<(), StoreError> {
    let content = ron::ser::to_string_pretty(settings, PrettyConfig::new()).map_err(|err| {
        StoreError::Parse {
            key: SETTINGS_KEY.to_string(),
            message: err.to_string(),
        }
    })?;
    storage.set(SETTINGS_KEY, &content)
}
