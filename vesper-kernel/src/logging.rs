//! `log` backend that writes to the kernel console.

use core::str::FromStr;

use log::{LevelFilter, Log, Metadata, Record};

use crate::arch;

/// Max level baked in from `build-config` (`LOG_LEVEL`).
pub const LOG_LEVEL: &str = env!("LOG_LEVEL");

struct KernelLogger;

static LOGGER: KernelLogger = KernelLogger;

impl Log for KernelLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        arch::console_print(format_args!(
            "[{:>5}] {}: {}\n",
            record.level(),
            record.target(),
            record.args()
        ));
    }

    fn flush(&self) {}
}

/// Parse a configured level name. Unknown names yield `None`.
pub fn parse_level(level: &str) -> Option<LevelFilter> {
    LevelFilter::from_str(level.trim()).ok()
}

/// Install the console logger. Later calls are ignored.
pub fn init() {
    if log::set_logger(&LOGGER).is_err() {
        return;
    }

    let level = parse_level(LOG_LEVEL).unwrap_or(LevelFilter::Info);
    log::set_max_level(level);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("debug"), Some(LevelFilter::Debug));
        assert_eq!(parse_level("TRACE"), Some(LevelFilter::Trace));
        assert_eq!(parse_level(" warn "), Some(LevelFilter::Warn));
        assert_eq!(parse_level("off"), Some(LevelFilter::Off));
        assert_eq!(parse_level("loud"), None);
    }

    #[test]
    fn test_configured_level_is_valid() {
        assert!(parse_level(LOG_LEVEL).is_some());
    }
}
