//! Bookkeeping for overlapping invocations of one task.
//!
//! Calls are never serialized. Each call gets an id from a monotonically
//! increasing counter when it starts; whichever call settles last owns the
//! transient `loading`/`error`/`phase` view, independent of start order.

pub type CallId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    InFlight,
    Succeeded,
    Failed,
}

/// Outcome of recording a settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settlement {
    pub call: CallId,
    /// A newer call had already been started when this one settled.
    pub superseded: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CallLedger {
    issued: CallId,
    in_flight: usize,
    last_settled: Option<CallId>,
}

impl CallLedger {
    pub fn begin(&mut self) -> CallId {
        self.issued += 1;
        self.in_flight += 1;
        self.issued
    }

    pub fn settle(&mut self, call: CallId) -> Settlement {
        self.in_flight = self.in_flight.saturating_sub(1);
        self.last_settled = Some(call);
        Settlement {
            call,
            superseded: call < self.issued,
        }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn last_settled(&self) -> Option<CallId> {
        self.last_settled
    }

    pub fn latest_started(&self) -> Option<CallId> {
        (self.issued > 0).then_some(self.issued)
    }
}

/// Transient per-task view: Idle -> InFlight -> {Succeeded | Failed} -> Idle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskTransient {
    phase: Phase,
    loading: bool,
    error: Option<String>,
    ledger: CallLedger,
}

impl TaskTransient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self) -> CallId {
        self.phase = Phase::InFlight;
        self.loading = true;
        self.error = None;
        self.ledger.begin()
    }

    pub fn succeed(&mut self, call: CallId) -> Settlement {
        self.phase = Phase::Succeeded;
        self.loading = false;
        self.error = None;
        self.ledger.settle(call)
    }

    pub fn fail(&mut self, call: CallId, message: impl Into<String>) -> Settlement {
        self.phase = Phase::Failed;
        self.loading = false;
        self.error = Some(message.into());
        self.ledger.settle(call)
    }

    /// Back to Idle. Calls still in flight keep their ids and will settle normally.
    pub fn reset(&mut self) {
        self.phase = Phase::Idle;
        self.loading = false;
        self.error = None;
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn ledger(&self) -> &CallLedger {
        &self.ledger
    }
}

/// Detects the `false -> true` edge of the authentication flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AuthEdge {
    last_seen: bool,
}

impl AuthEdge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the current flag and reports whether it just became true.
    pub fn observe(&mut self, authenticated: bool) -> bool {
        let rising = authenticated && !self.last_seen;
        self.last_seen = authenticated;
        rising
    }
}
