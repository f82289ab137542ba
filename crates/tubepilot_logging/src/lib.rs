#![deny(missing_docs)]
//! Logging front door for TubePilot.
//!
//! The gateway, the task layer and the CLI all log through the `pilot_*`
//! macros so that one simplelog setup in the binary decides where records go
//! (file, terminal, both or nowhere). Typical records: one debug line per
//! state transition, a warn line per failed remote call, and a trace line per
//! upload progress tick.
//!
//! The macros expand through a re-export of `log`, so crates using them do
//! not need their own `log` dependency.

#[doc(hidden)]
pub use log as __log;

/// Per-chunk chatter such as upload progress ticks.
#[macro_export]
macro_rules! pilot_trace {
    ($($arg:tt)*) => {{
        $crate::__log::trace!($($arg)*);
    }};
}

/// State transitions and superseded calls.
#[macro_export]
macro_rules! pilot_debug {
    ($($arg:tt)*) => {{
        $crate::__log::debug!($($arg)*);
    }};
}

/// Session and persistence milestones.
#[macro_export]
macro_rules! pilot_info {
    ($($arg:tt)*) => {{
        $crate::__log::info!($($arg)*);
    }};
}

/// Failed remote calls and recoverable storage problems.
#[macro_export]
macro_rules! pilot_warn {
    ($($arg:tt)*) => {{
        $crate::__log::warn!($($arg)*);
    }};
}

/// Failures the client cannot carry on from.
#[macro_export]
macro_rules! pilot_error {
    ($($arg:tt)*) => {{
        $crate::__log::error!($($arg)*);
    }};
}

/// Routes records to the terminal for the duration of a test binary.
///
/// Debug level in debug builds, info otherwise. Later calls are no-ops once a
/// logger is installed.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    let _ = TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    );
}

#[cfg(test)]
mod tests {
    #[test]
    fn macros_expand_without_a_direct_log_dependency() {
        super::initialize_for_tests();
        super::initialize_for_tests();
        crate::pilot_trace!("tick {} of {}", 1, 2);
        crate::pilot_debug!("dispatch {:?}", Some(3));
        crate::pilot_info!("restored");
        crate::pilot_warn!("call {} failed", 7);
        crate::pilot_error!("fatal");
    }
}
