//! Reporter handlers

mod terminal;
mod tracing_reporter;

pub use terminal::TerminalReporter;
pub use tracing_reporter::TracingReporter;
