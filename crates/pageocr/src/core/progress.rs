//! Status and timing output.

use parking_lot::Mutex;

/// Receives human-facing status while a run is in progress.
pub trait ProgressSink {
    /// Short description of the work currently underway, e.g. `⚙️ a (Invoices)`.
    fn describe(&self, description: &str);

    /// A result line that must reach the user, such as a timing report.
    fn report(&self, line: &str);
}

/// Descriptions go to stderr, reports to stdout.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleProgress {
    descriptions: bool,
}

impl ConsoleProgress {
    pub fn new() -> Self {
        Self { descriptions: true }
    }

    /// Only reports are printed.
    pub fn quiet() -> Self {
        Self { descriptions: false }
    }
}

impl Default for ConsoleProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for ConsoleProgress {
    fn describe(&self, description: &str) {
        if self.descriptions {
            eprintln!("{}", description);
        }
    }

    fn report(&self, line: &str) {
        println!("{}", line);
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn describe(&self, _description: &str) {}

    fn report(&self, _line: &str) {}
}

/// Keeps every message in memory, in arrival order.
#[derive(Debug, Default)]
pub struct CollectProgress {
    descriptions: Mutex<Vec<String>>,
    reports: Mutex<Vec<String>>,
}

impl CollectProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn descriptions(&self) -> Vec<String> {
        self.descriptions.lock().clone()
    }

    pub fn reports(&self) -> Vec<String> {
        self.reports.lock().clone()
    }
}

impl ProgressSink for CollectProgress {
    fn describe(&self, description: &str) {
        self.descriptions.lock().push(description.to_string());
    }

    fn report(&self, line: &str) {
        self.reports.lock().push(line.to_string());
    }
}
