//! Leveled logging facade for the Tidal crates.
//!
//! Provides [`klog!`] and the convenience macros (`kinfo!`, `kdebug!`, etc.)
//! for leveled logging without allocation. The crate owns no output device:
//! the embedding application registers a sink with [`set_log_fn`]. Before a
//! sink is registered, output is silently discarded.
//!
//! Messages above the global maximum level ([`set_max_level`]) are filtered
//! before their arguments are formatted.

#![cfg_attr(not(test), no_std)]

use core::fmt;
use core::sync::atomic::{AtomicPtr, AtomicU8, Ordering};

// ---------------------------------------------------------------------------
// Log levels: lower is more severe
// ---------------------------------------------------------------------------

/// Log severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    /// Fatal: unrecoverable error, the application will stop.
    Fatal = 0,
    /// Error: something failed but the application may continue.
    Error = 1,
    /// Warning: unexpected condition, not necessarily an error.
    Warn = 2,
    /// Informational: high-level progress messages.
    Info = 3,
    /// Debug: detailed diagnostic information.
    Debug = 4,
    /// Trace: very verbose, low-level tracing.
    Trace = 5,
}

impl LogLevel {
    /// Returns the human-readable name (fixed-width for aligned output).
    pub const fn name(self) -> &'static str {
        match self {
            Self::Fatal => "FATAL",
            Self::Error => "ERROR",
            Self::Warn => "WARN ",
            Self::Info => "INFO ",
            Self::Debug => "DEBUG",
            Self::Trace => "TRACE",
        }
    }

    /// Parses a lowercase level name as used in configuration files.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "fatal" => Some(Self::Fatal),
            "error" => Some(Self::Error),
            "warn" => Some(Self::Warn),
            "info" => Some(Self::Info),
            "debug" => Some(Self::Debug),
            "trace" => Some(Self::Trace),
            _ => None,
        }
    }

    const fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Fatal,
            1 => Self::Error,
            2 => Self::Warn,
            3 => Self::Info,
            4 => Self::Debug,
            _ => Self::Trace,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name().trim_end())
    }
}

// ---------------------------------------------------------------------------
// Level filter
// ---------------------------------------------------------------------------

static MAX_LEVEL: AtomicU8 = AtomicU8::new(LogLevel::Info as u8);

/// Sets the most verbose level that will reach the sink.
pub fn set_max_level(level: LogLevel) {
    MAX_LEVEL.store(level as u8, Ordering::Relaxed);
}

/// Returns the current maximum level.
pub fn max_level() -> LogLevel {
    LogLevel::from_u8(MAX_LEVEL.load(Ordering::Relaxed))
}

/// Returns `true` if messages at `level` pass the global filter.
#[inline]
pub fn enabled(level: LogLevel) -> bool {
    level as u8 <= MAX_LEVEL.load(Ordering::Relaxed)
}

// ---------------------------------------------------------------------------
// Leveled log function (klog! and convenience macros)
// ---------------------------------------------------------------------------

/// The signature of the global leveled log function.
pub type LogFn = fn(LogLevel, fmt::Arguments<'_>);

fn null_log(_level: LogLevel, _args: fmt::Arguments<'_>) {}

static LOG_FN: AtomicPtr<()> = AtomicPtr::new(null_log as *mut ());

/// Registers the global leveled log function.
///
/// # Safety
///
/// The provided function must be safe to call from any context that logs,
/// including the producer and consumer sides of a ring. May be called more
/// than once. Uses `Release` ordering so subsequent loads see the new function.
pub unsafe fn set_log_fn(f: LogFn) {
    LOG_FN.store(f as *mut (), Ordering::Release);
}

/// Loads the current log function from the atomic pointer.
#[inline]
fn load_log_fn() -> LogFn {
    let ptr = LOG_FN.load(Ordering::Acquire);
    // SAFETY: We only ever store valid `LogFn` function pointers into LOG_FN.
    unsafe { core::mem::transmute::<*mut (), LogFn>(ptr) }
}

/// Implementation detail for [`klog!`]. Not public API.
#[doc(hidden)]
pub fn _log(level: LogLevel, args: fmt::Arguments<'_>) {
    load_log_fn()(level, args);
}

/// Logs a message at the given level.
#[macro_export]
macro_rules! klog {
    ($level:expr, $($arg:tt)*) => {{
        let level = $level;
        if $crate::enabled(level) {
            $crate::_log(level, format_args!($($arg)*));
        }
    }};
}

/// Logs a fatal-level message (level 0).
#[macro_export]
macro_rules! kfatal {
    ($($arg:tt)*) => { $crate::klog!($crate::LogLevel::Fatal, $($arg)*) };
}

/// Logs an error-level message (level 1).
#[macro_export]
macro_rules! kerr {
    ($($arg:tt)*) => { $crate::klog!($crate::LogLevel::Error, $($arg)*) };
}

/// Logs a warning-level message (level 2).
#[macro_export]
macro_rules! kwarn {
    ($($arg:tt)*) => { $crate::klog!($crate::LogLevel::Warn, $($arg)*) };
}

/// Logs an info-level message (level 3).
#[macro_export]
macro_rules! kinfo {
    ($($arg:tt)*) => { $crate::klog!($crate::LogLevel::Info, $($arg)*) };
}

/// Logs a debug-level message (level 4).
#[macro_export]
macro_rules! kdebug {
    ($($arg:tt)*) => { $crate::klog!($crate::LogLevel::Debug, $($arg)*) };
}

/// Logs a trace-level message (level 5).
#[macro_export]
macro_rules! ktrace {
    ($($arg:tt)*) => { $crate::klog!($crate::LogLevel::Trace, $($arg)*) };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::string::{String, ToString};
    use std::sync::Mutex;
    use std::vec::Vec;

    static CAPTURED: Mutex<Vec<(LogLevel, String)>> = Mutex::new(Vec::new());

    fn capture(level: LogLevel, args: fmt::Arguments<'_>) {
        CAPTURED.lock().unwrap().push((level, args.to_string()));
    }

    #[test]
    fn level_names_are_fixed_width() {
        for level in [
            LogLevel::Fatal,
            LogLevel::Error,
            LogLevel::Warn,
            LogLevel::Info,
            LogLevel::Debug,
            LogLevel::Trace,
        ] {
            assert_eq!(level.name().len(), 5);
            assert_eq!(LogLevel::from_u8(level as u8), level);
        }
    }

    #[test]
    fn from_name_round_trips_display() {
        assert_eq!(LogLevel::from_name("warn"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::from_name("trace"), Some(LogLevel::Trace));
        assert_eq!(LogLevel::from_name("WARN"), None);
        assert_eq!(LogLevel::from_name(""), None);
        assert_eq!(LogLevel::Info.to_string(), "INFO");
    }

    #[test]
    fn severity_ordering() {
        assert!(LogLevel::Fatal < LogLevel::Error);
        assert!(LogLevel::Debug < LogLevel::Trace);
    }

    // Single test touches the global sink and filter so parallel tests
    // cannot observe each other's state.
    #[test]
    fn sink_receives_filtered_messages() {
        // SAFETY: `capture` only locks a std mutex.
        unsafe { set_log_fn(capture) };
        set_max_level(LogLevel::Info);
        assert_eq!(max_level(), LogLevel::Info);

        kinfo!("ring ready: {} slots", 8);
        kdebug!("not shown");
        kerr!("evicted {}", 3);

        set_max_level(LogLevel::Trace);
        ktrace!("now shown");

        let captured = CAPTURED.lock().unwrap().clone();
        assert_eq!(
            captured,
            vec![
                (LogLevel::Info, "ring ready: 8 slots".to_string()),
                (LogLevel::Error, "evicted 3".to_string()),
                (LogLevel::Trace, "now shown".to_string()),
            ]
        );
        set_max_level(LogLevel::Info);
    }
}
