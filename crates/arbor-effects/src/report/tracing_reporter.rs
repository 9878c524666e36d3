//! Neutral reporter that forwards lines to `tracing`
//!
//! Used whenever no styled sink is supplied. Emphasis is dropped, and
//! partial lines are buffered until the next full line completes them.

use arbor_core::effects::ReportEffects;
use parking_lot::Mutex;

/// Reporter writing through the tracing subscriber
#[derive(Debug, Default)]
pub struct TracingReporter {
    pending: Mutex<String>,
}

impl TracingReporter {
    /// Create a reporter
    pub fn new() -> Self {
        Self::default()
    }

    fn complete(&self, text: &str) -> String {
        let mut pending = self.pending.lock();
        let mut line = std::mem::take(&mut *pending);
        line.push_str(text);
        line
    }
}

impl ReportEffects for TracingReporter {
    fn print(&self, text: &str) {
        tracing::info!("{}", self.complete(text));
    }

    fn error(&self, text: &str) {
        tracing::warn!("{}", self.complete(text));
    }

    fn success(&self, text: &str) {
        tracing::info!("{}", self.complete(text));
    }

    fn bold(&self, text: &str) -> String {
        text.to_string()
    }

    fn write(&self, text: &str) {
        self.pending.lock().push_str(text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_lines_are_joined() {
        let reporter = TracingReporter::new();
        reporter.write("  ");
        assert_eq!(reporter.complete("lft: 1 (ok)"), "  lft: 1 (ok)");
        assert_eq!(reporter.complete("next"), "next");
    }

    #[test]
    fn test_bold_is_plain() {
        assert_eq!(TracingReporter::new().bold("7"), "7");
    }
}
