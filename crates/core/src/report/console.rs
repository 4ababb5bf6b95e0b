//! Color-coded console reporter.

use std::io::Write;

use tracing::{error, info, warn};

use super::{Reporter, Severity};

const BLUE: &str = "\x1b[0;34m";
const GREEN: &str = "\x1b[0;32m";
const YELLOW: &str = "\x1b[1;33m";
const RED: &str = "\x1b[0;31m";
const RESET: &str = "\x1b[0m";

/// Writes status lines to stdout, colored by severity.
#[derive(Debug, Clone)]
pub struct ConsoleReporter {
    color: bool,
}

impl ConsoleReporter {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    /// Render one line without the trailing newline.
    pub fn format_line(&self, severity: Severity, message: &str) -> String {
        if !self.color {
            return format!("[{}] {}", severity.label(), message);
        }

        let color = match severity {
            Severity::Info => BLUE,
            Severity::Success => GREEN,
            Severity::Warning => YELLOW,
            Severity::Error => RED,
        };
        format!("{}[{}]{} {}", color, severity.label(), RESET, message)
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Reporter for ConsoleReporter {
    fn report(&self, severity: Severity, message: &str) {
        match severity {
            Severity::Info | Severity::Success => info!(severity = severity.label(), "{}", message),
            Severity::Warning => warn!("{}", message),
            Severity::Error => error!("{}", message),
        }

        let line = self.format_line(severity, message);
        let mut stdout = std::io::stdout().lock();
        let _ = writeln!(stdout, "{}", line);
    }
}
