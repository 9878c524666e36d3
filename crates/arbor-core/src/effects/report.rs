//! Reporting effect interface for human-readable progress output
//!
//! Used by repair runs to describe, per node and field, what was kept and
//! what was corrected. Implementations decide how styling is rendered.

/// Sink for progress and diagnostic lines.
pub trait ReportEffects: Send + Sync {
    /// Neutral progress line
    fn print(&self, text: &str);

    /// Line describing a problem or correction
    fn error(&self, text: &str);

    /// Line describing a healthy outcome
    fn success(&self, text: &str);

    /// Emphasis markup for embedding inside another line
    fn bold(&self, text: &str) -> String;

    /// Output without a trailing line break
    fn write(&self, text: &str);
}

impl<T: ReportEffects + ?Sized> ReportEffects for std::sync::Arc<T> {
    fn print(&self, text: &str) {
        (**self).print(text);
    }

    fn error(&self, text: &str) {
        (**self).error(text);
    }

    fn success(&self, text: &str) {
        (**self).success(text);
    }

    fn bold(&self, text: &str) -> String {
        (**self).bold(text)
    }

    fn write(&self, text: &str) {
        (**self).write(text);
    }
}
