use std::sync::{Mutex, MutexGuard, PoisonError};

use tubepilot_core::{CallId, Phase, TaskTransient};
use tubepilot_gateway::GatewayError;
use tubepilot_logging::{pilot_debug, pilot_warn};

/// Transient state of one task plus whatever the task accumulates.
///
/// The mutex is only held inside synchronous sections, never across an await.
pub(crate) struct TaskCell<S> {
    name: &'static str,
    inner: Mutex<Inner<S>>,
}

struct Inner<S> {
    transient: TaskTransient,
    data: S,
}

impl<S: Default> TaskCell<S> {
    pub(crate) fn new(name: &'static str) -> Self {
        Self {
            name,
            inner: Mutex::new(Inner {
                transient: TaskTransient::new(),
                data: S::default(),
            }),
        }
    }
}

impl<S> TaskCell<S> {
    pub(crate) fn begin(&self) -> CallId {
        self.begin_with(|_| {})
    }

    pub(crate) fn begin_with(&self, prepare: impl FnOnce(&mut S)) -> CallId {
        let mut inner = self.lock();
        prepare(&mut inner.data);
        let call = inner.transient.begin();
        pilot_debug!("{} call {} started", self.name, call);
        call
    }

    /// Records the settlement of `call`; the last call to settle owns the transient view.
    pub(crate) fn settle<T>(
        &self,
        call: CallId,
        outcome: &Result<T, GatewayError>,
        apply: impl FnOnce(&mut S, Result<&T, &GatewayError>),
    ) {
        let mut inner = self.lock();
        apply(&mut inner.data, outcome.as_ref());
        let settlement = match outcome {
            Ok(_) => inner.transient.succeed(call),
            Err(err) => {
                pilot_warn!("{} call {} failed: {}", self.name, call, err);
                inner.transient.fail(call, err.to_string())
            }
        };
        if settlement.superseded {
            pilot_debug!(
                "{} call {} settled after newer calls started ({} still in flight)",
                self.name,
                call,
                inner.transient.ledger().in_flight()
            );
        }
    }

    pub(crate) fn read<R>(&self, f: impl FnOnce(&TaskTransient, &S) -> R) -> R {
        let inner = self.lock();
        f(&inner.transient, &inner.data)
    }

    pub(crate) fn write<R>(&self, f: impl FnOnce(&mut TaskTransient, &mut S) -> R) -> R {
        let mut inner = self.lock();
        let Inner { transient, data } = &mut *inner;
        f(transient, data)
    }

    pub(crate) fn loading(&self) -> bool {
        self.read(|transient, _| transient.loading())
    }

    pub(crate) fn error(&self) -> Option<String> {
        self.read(|transient, _| transient.error().map(str::to_string))
    }

    pub(crate) fn phase(&self) -> Phase {
        self.read(|transient, _| transient.phase())
    }

    pub(crate) fn in_flight(&self) -> usize {
        self.read(|transient, _| transient.ledger().in_flight())
    }

    pub(crate) fn reset(&self) {
        self.write(|transient, _| transient.reset());
    }

    fn lock(&self) -> MutexGuard<'_, Inner<S>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
