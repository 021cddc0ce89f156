//! MemorySink - 受け取った RunReport を保持するだけの ResultSink

use async_trait::async_trait;

use crate::domain::RunReport;
use crate::ports::{ResultSink, SinkError};

/// Keeps every delivered report, mostly for tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    reports: Vec<RunReport>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> &[RunReport] {
        &self.reports
    }

    pub fn last(&self) -> Option<&RunReport> {
        self.reports.last()
    }
}

#[async_trait]
impl ResultSink for MemorySink {
    async fn deliver(&mut self, report: &RunReport) -> Result<(), SinkError> {
        self.reports.push(report.clone());
        Ok(())
    }
}
