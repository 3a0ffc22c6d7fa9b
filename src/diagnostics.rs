//! Human-readable progress output.
//!
//! The resolver reports what it is doing through a [`DiagnosticSink`] rather
//! than printing directly. Sinks are best-effort: they must not fail, and a
//! write error is dropped.

use std::io::Write;
use std::sync::Mutex;

/// Receives one line of diagnostic text at a time.
pub trait DiagnosticSink: Send + Sync {
    fn line(&self, text: &str);
}

impl<F> DiagnosticSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn line(&self, text: &str) {
        self(text)
    }
}

/// Writes lines to standard output.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutSink;

impl DiagnosticSink for StdoutSink {
    fn line(&self, text: &str) {
        let _ = writeln!(std::io::stdout().lock(), "{text}");
    }
}

/// Forwards lines to `tracing` at `INFO`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn line(&self, text: &str) {
        tracing::info!(target: "appsettings_host::diagnostics", "{text}");
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn line(&self, _text: &str) {}
}

/// Keeps lines in memory, mostly useful in tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        match self.lines.lock() {
            Ok(lines) => lines.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl DiagnosticSink for MemorySink {
    fn line(&self, text: &str) {
        let mut lines = match self.lines.lock() {
            Ok(lines) => lines,
            Err(poisoned) => poisoned.into_inner(),
        };
        lines.push(text.to_string());
    }
}
