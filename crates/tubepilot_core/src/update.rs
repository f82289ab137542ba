use crate::{AppState, Effect, Transition};

/// Pure update function: applies a transition to state and returns any effects.
pub fn update(mut state: AppState, transition: Transition) -> (AppState, Vec<Effect>) {
    let effects = match transition {
        Transition::SetLoading(loading) => {
            state.set_loading(loading);
            Vec::new()
        }
        Transition::SetError(error) => {
            state.set_error(error);
            Vec::new()
        }
        Transition::SetAuthenticated(authenticated) => {
            state.set_authenticated(authenticated);
            Vec::new()
        }
        Transition::UpdateSettings(patch) => {
            state.merge_settings(&patch);
            vec![Effect::PersistSettings(state.settings().clone())]
        }
        Transition::UpdateScheduler(patch) => {
            state.merge_scheduler(&patch);
            Vec::new()
        }
        Transition::UpdateQuota(quota) => {
            state.replace_quota(quota);
            Vec::new()
        }
        Transition::ResetState => {
            state = AppState::new();
            vec![Effect::ForgetPersisted]
        }
    };

    (state, effects)
}
