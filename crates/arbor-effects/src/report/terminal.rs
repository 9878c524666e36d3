//! Styled terminal reporter

use arbor_core::effects::ReportEffects;
use crossterm::style::Stylize;
use std::io::Write;

/// Reporter writing ANSI-styled lines to stdout
#[derive(Debug, Clone, Copy)]
pub struct TerminalReporter {
    styled: bool,
}

impl Default for TerminalReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalReporter {
    /// Styled output
    pub fn new() -> Self {
        Self { styled: true }
    }

    /// Same layout without escape codes, for pipes and logs
    pub fn plain() -> Self {
        Self { styled: false }
    }

    fn emit(&self, line: String) {
        let mut stdout = std::io::stdout().lock();
        let _ = writeln!(stdout, "{line}");
    }
}

impl ReportEffects for TerminalReporter {
    fn print(&self, text: &str) {
        self.emit(text.to_string());
    }

    fn error(&self, text: &str) {
        if self.styled {
            self.emit(text.red().to_string());
        } else {
            self.emit(text.to_string());
        }
    }

    fn success(&self, text: &str) {
        if self.styled {
            self.emit(text.green().to_string());
        } else {
            self.emit(text.to_string());
        }
    }

    fn bold(&self, text: &str) -> String {
        if self.styled {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn write(&self, text: &str) {
        let mut stdout = std::io::stdout().lock();
        let _ = write!(stdout, "{text}");
        let _ = stdout.flush();
    }
}
