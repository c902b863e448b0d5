use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::{self, Write};

/// Writes `[LEVEL] target: message` lines to standard error.
pub struct StderrLogger {
    max_level: LevelFilter,
}

impl StderrLogger {
    #[must_use]
    pub const fn new(max_level: LevelFilter) -> Self {
        Self { max_level }
    }

    /// Install as the global logger. Call once at startup.
    ///
    /// # Errors
    /// Fails if a logger is already installed.
    pub fn init(self) -> Result<(), SetLoggerError> {
        let max_level = self.max_level;
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(max_level);
        Ok(())
    }

    fn write_record(out: &mut impl Write, record: &Record) -> io::Result<()> {
        writeln!(
            out,
            "[{}] {}: {}",
            record.level(),
            record.target(),
            record.args()
        )
    }
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.max_level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        // Best effort; there is nowhere left to report a broken stderr.
        let _ = Self::write_record(&mut io::stderr().lock(), record);
    }

    fn flush(&self) {
        let _ = io::stderr().flush();
    }
}
