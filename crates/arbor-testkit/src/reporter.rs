//! Reporter that keeps every line for later assertions

use arbor_core::effects::ReportEffects;
use parking_lot::Mutex;

/// One call made against a [`RecordingReporter`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportLine {
    Print(String),
    Error(String),
    Success(String),
    Write(String),
}

impl ReportLine {
    pub fn text(&self) -> &str {
        match self {
            Self::Print(text) | Self::Error(text) | Self::Success(text) | Self::Write(text) => {
                text
            }
        }
    }
}

/// Records report output in call order. `bold` wraps text in `**`.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    lines: Mutex<Vec<ReportLine>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<ReportLine> {
        self.lines.lock().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.collect(|line| matches!(line, ReportLine::Error(_)))
    }

    pub fn successes(&self) -> Vec<String> {
        self.collect(|line| matches!(line, ReportLine::Success(_)))
    }

    pub fn prints(&self) -> Vec<String> {
        self.collect(|line| matches!(line, ReportLine::Print(_)))
    }

    /// Everything as it would appear on a terminal
    pub fn transcript(&self) -> String {
        let mut out = String::new();
        for line in self.lines.lock().iter() {
            out.push_str(line.text());
            if !matches!(line, ReportLine::Write(_)) {
                out.push('\n');
            }
        }
        out
    }

    pub fn clear(&self) {
        self.lines.lock().clear();
    }

    fn collect(&self, keep: impl Fn(&ReportLine) -> bool) -> Vec<String> {
        self.lines
            .lock()
            .iter()
            .filter(|line| keep(line))
            .map(|line| line.text().to_string())
            .collect()
    }

    fn push(&self, line: ReportLine) {
        self.lines.lock().push(line);
    }
}

impl ReportEffects for RecordingReporter {
    fn print(&self, text: &str) {
        self.push(ReportLine::Print(text.to_string()));
    }

    fn error(&self, text: &str) {
        self.push(ReportLine::Error(text.to_string()));
    }

    fn success(&self, text: &str) {
        self.push(ReportLine::Success(text.to_string()));
    }

    fn bold(&self, text: &str) -> String {
        format!("**{text}**")
    }

    fn write(&self, text: &str) {
        self.push(ReportLine::Write(text.to_string()));
    }
}
