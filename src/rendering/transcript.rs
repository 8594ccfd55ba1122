//! Instant display that records everything it is shown.

use super::{Display, LineId};

/// Display for headless runs and tests.
///
/// Every line completes as soon as it is shown. Lines and status messages are
/// kept in order, and can be echoed to stdout as they arrive.
#[derive(Debug, Clone, Default)]
pub struct TranscriptDisplay {
    lines: Vec<String>,
    statuses: Vec<String>,
    echo: bool,
    next_id: u64,
}

impl TranscriptDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a display that also prints every line to stdout.
    pub fn echoing() -> Self {
        Self {
            echo: true,
            ..Self::default()
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn statuses(&self) -> &[String] {
        &self.statuses
    }

    /// Whether any shown line contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|line| line.contains(needle))
    }

    /// Number of shown lines equal to `line`.
    pub fn count(&self, line: &str) -> usize {
        self.lines.iter().filter(|shown| shown.as_str() == line).count()
    }
}

impl Display for TranscriptDisplay {
    fn show_line(&mut self, text: &str) -> LineId {
        if self.echo {
            println!("{}", text);
        }
        self.lines.push(text.to_string());
        self.next_id += 1;
        LineId(self.next_id)
    }

    fn is_complete(&self, _id: LineId) -> bool {
        true
    }

    fn skip(&mut self, _id: LineId) {}

    fn show_status(&mut self, text: &str) {
        if self.echo {
            println!("[{}]", text);
        }
        self.statuses.push(text.to_string());
    }
}
