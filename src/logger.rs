//! Stderr backend for the `log` facade.

use colored::Colorize;
use log::{Level, LevelFilter, Metadata, Record};

static LOGGER: Logger = Logger;

/// Install the logger and set the maximum level. A second call only adjusts
/// the level, so tests and the binary can both call it.
pub fn init(level: LevelFilter) {
    if log::set_logger(&LOGGER).is_err() {
        log::debug!("logger already installed");
    }
    log::set_max_level(level);
}

struct Logger;

impl log::Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let prefix = match record.level() {
            Level::Error => "ERROR".red().bold(),
            Level::Warn => "WARN ".yellow().bold(),
            Level::Info => "INFO ".green(),
            Level::Debug => "DEBUG".blue(),
            Level::Trace => "TRACE".dimmed(),
        };
        let thread = std::thread::current();
        eprintln!(
            "{} [{}] {}",
            prefix,
            thread.name().unwrap_or("unnamed"),
            record.args()
        );
    }

    fn flush(&self) {}
}
