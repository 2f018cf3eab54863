//! Diagnostic messages from the pipeline.
//!
//! The library never configures logging itself. Callers pass a
//! [`DiagnosticSink`]; the CLI uses [`LogSink`] on top of `env_logger`.

use log::Level;

pub trait DiagnosticSink {
    fn log(&self, level: Level, message: &str);
}

/// Discards every message.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl DiagnosticSink for NoopSink {
    fn log(&self, _level: Level, _message: &str) {}
}

/// Forwards messages to the `log` facade under the `qrlogo` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn log(&self, level: Level, message: &str) {
        log::log!(target: "qrlogo", level, "{message}");
    }
}

impl<F> DiagnosticSink for F
where
    F: Fn(Level, &str),
{
    fn log(&self, level: Level, message: &str) {
        self(level, message)
    }
}
