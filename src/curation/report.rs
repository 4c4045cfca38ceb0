use parking_lot::Mutex;

use crate::curation::Curator;

/// Report lines accumulated during one task invocation
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ResultLog {
    lines: Vec<String>,
}

impl ResultLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// `header` followed by every line, each terminated by a newline
    pub fn render(&self, header: &str) -> String {
        let mut text = String::from(header);
        for line in &self.lines {
            text.push_str(line);
            text.push('\n');
        }
        text
    }

    /// Send the rendered log to the curator as both report and result
    pub fn flush(&self, curator: &dyn Curator, task_id: &str, header: &str) -> String {
        let text = self.render(header);
        curator.set_result(task_id, &text);
        curator.report(&text);
        text
    }
}

/// A `Curator` that keeps everything it is given
#[derive(Debug, Default)]
pub struct ReportCollector {
    reports: Mutex<Vec<String>>,
    results: Mutex<Vec<(String, String)>>,
}

impl ReportCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> Vec<String> {
        self.reports.lock().clone()
    }

    /// Every (task id, result text) pair in the order they were set
    pub fn results(&self) -> Vec<(String, String)> {
        self.results.lock().clone()
    }

    pub fn last_result(&self) -> Option<String> {
        self.results.lock().last().map(|(_, text)| text.clone())
    }

    /// Reports handed over so far, leaving the collector empty
    pub fn drain_reports(&self) -> Vec<String> {
        std::mem::take(&mut *self.reports.lock())
    }

    /// Results set so far, leaving the collector empty
    pub fn drain_results(&self) -> Vec<(String, String)> {
        std::mem::take(&mut *self.results.lock())
    }
}

impl Curator for ReportCollector {
    fn report(&self, text: &str) {
        self.reports.lock().push(text.to_string());
    }

    fn set_result(&self, task_id: &str, text: &str) {
        self.results.lock().push((task_id.to_string(), text.to_string()));
    }
}
