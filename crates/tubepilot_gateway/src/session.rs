/// Receives the process-wide "session ended" signal raised on a 401.
///
/// Called synchronously from the gateway after the stored credential has been removed.
pub trait SessionObserver: Send + Sync {
    fn session_ended(&self);
}
