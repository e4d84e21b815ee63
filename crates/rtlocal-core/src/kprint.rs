//! Kernel-style leveled logging to stderr
//!
//! Every line is tagged with the emitting thread, since almost everything
//! this workspace logs is about a per-thread binding:
//!
//! ```text
//! [WARN ] rtlocal[worker-1] kernel probe failed (uname failed: errno 14), using offset 0x60
//! ```
//!
//! Settings come from [`LogConfig::from_env`] on first use and can be
//! overridden with [`set_log_level`] and [`set_flush_enabled`]. The resolver
//! never logs from `current()`.
//!
//! ```ignore
//! use rtlocal_core::{kdebug, kwarn};
//!
//! kdebug!("registered context {:p}", ptr);
//! kwarn!("falling back to offset {:#x}", offset);
//! ```

use crate::config::LogConfig;
use std::io::Write;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Once;

/// Log levels, lower is more severe
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Off = 0,
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
    Trace = 5,
}

impl LogLevel {
    const ALL: [LogLevel; 6] = [
        LogLevel::Off,
        LogLevel::Error,
        LogLevel::Warn,
        LogLevel::Info,
        LogLevel::Debug,
        LogLevel::Trace,
    ];

    /// Saturates to `Trace` for out-of-range values
    pub fn from_u8(v: u8) -> Self {
        Self::ALL[usize::from(v.min(5))]
    }

    pub fn label(self) -> &'static str {
        match self {
            LogLevel::Off => "OFF  ",
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN ",
            LogLevel::Info => "INFO ",
            LogLevel::Debug => "DEBUG",
            LogLevel::Trace => "TRACE",
        }
    }
}

impl FromStr for LogLevel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        if let Ok(n) = s.parse::<u8>() {
            return if n <= 5 { Ok(Self::from_u8(n)) } else { Err(()) };
        }
        Self::ALL
            .iter()
            .copied()
            .find(|level| level.label().trim().eq_ignore_ascii_case(&s))
            .ok_or(())
    }
}

static INIT: Once = Once::new();
static LEVEL: AtomicU8 = AtomicU8::new(LogLevel::Warn as u8);
static FLUSH: AtomicBool = AtomicBool::new(false);

/// Load settings from the environment. Runs once; later calls are no-ops.
pub fn init() {
    INIT.call_once(|| {
        let config = LogConfig::from_env();
        LEVEL.store(config.level as u8, Ordering::Relaxed);
        FLUSH.store(config.flush, Ordering::Relaxed);
    });
}

#[inline]
pub fn log_level() -> LogLevel {
    init();
    LogLevel::from_u8(LEVEL.load(Ordering::Relaxed))
}

/// Override the level, taking precedence over the environment
pub fn set_log_level(level: LogLevel) {
    init();
    LEVEL.store(level as u8, Ordering::Relaxed);
}

pub fn set_flush_enabled(enabled: bool) {
    init();
    FLUSH.store(enabled, Ordering::Relaxed);
}

#[inline]
pub fn level_enabled(level: LogLevel) -> bool {
    level != LogLevel::Off && level <= log_level()
}

#[doc(hidden)]
pub fn _klog_impl(level: LogLevel, args: std::fmt::Arguments<'_>) {
    if !level_enabled(level) {
        return;
    }
    let thread = std::thread::current();
    let stderr = std::io::stderr();
    let mut out = stderr.lock();
    let _ = match thread.name() {
        Some(name) => write!(out, "[{}] rtlocal[{}] ", level.label(), name),
        None => write!(out, "[{}] rtlocal[{:?}] ", level.label(), thread.id()),
    };
    let _ = out.write_fmt(args);
    let _ = out.write_all(b"\n");
    if FLUSH.load(Ordering::Relaxed) {
        let _ = out.flush();
    }
}

#[macro_export]
macro_rules! kerror {
    ($($arg:tt)*) => {
        $crate::kprint::_klog_impl($crate::kprint::LogLevel::Error, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! kwarn {
    ($($arg:tt)*) => {
        $crate::kprint::_klog_impl($crate::kprint::LogLevel::Warn, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! kinfo {
    ($($arg:tt)*) => {
        $crate::kprint::_klog_impl($crate::kprint::LogLevel::Info, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! kdebug {
    ($($arg:tt)*) => {
        $crate::kprint::_klog_impl($crate::kprint::LogLevel::Debug, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! ktrace {
    ($($arg:tt)*) => {
        $crate::kprint::_klog_impl($crate::kprint::LogLevel::Trace, format_args!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_order() {
        assert!(LogLevel::Error < LogLevel::Warn);
        assert!(LogLevel::Info < LogLevel::Debug);
        assert!(LogLevel::Debug < LogLevel::Trace);
    }

    #[test]
    fn test_level_from_u8() {
        assert_eq!(LogLevel::from_u8(0), LogLevel::Off);
        assert_eq!(LogLevel::from_u8(2), LogLevel::Warn);
        assert_eq!(LogLevel::from_u8(200), LogLevel::Trace);
    }

    #[test]
    fn test_level_from_str() {
        assert_eq!("warn".parse(), Ok(LogLevel::Warn));
        assert_eq!(" TRACE ".parse(), Ok(LogLevel::Trace));
        assert_eq!("off".parse(), Ok(LogLevel::Off));
        assert_eq!("3".parse(), Ok(LogLevel::Info));
        assert_eq!("9".parse::<LogLevel>(), Err(()));
        assert_eq!("verbose".parse::<LogLevel>(), Err(()));
    }

    #[test]
    fn test_macros_compile() {
        set_log_level(LogLevel::Off);
        assert!(!level_enabled(LogLevel::Error));

        kerror!("error {}", 1);
        kwarn!("warn");
        kinfo!("info");
        kdebug!("debug {:?}", Some(2));
        ktrace!("trace");
    }
}
