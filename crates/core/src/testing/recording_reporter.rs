//! Reporter that keeps every status line in memory.

use std::sync::Mutex;

use crate::report::{Reporter, Severity};

/// Records reported lines for assertions.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    lines: Mutex<Vec<(Severity, String)>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded lines, in order.
    pub fn lines(&self) -> Vec<(Severity, String)> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    /// Whether any line of `severity` contains `needle`.
    pub fn contains(&self, severity: Severity, needle: &str) -> bool {
        self.lines()
            .iter()
            .any(|(s, message)| *s == severity && message.contains(needle))
    }
}

impl Reporter for RecordingReporter {
    fn report(&self, severity: Severity, message: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push((severity, message.to_string()));
        }
    }
}
