//! stdout 向けの ResultSink
//!
//! - TextSink: `Errors:` / `Done tasks:` の見出しの後に 1 行ずつ。空の集合は見出しごと省く
//! - JsonSink: RunReport をそのまま JSON で出す

use std::fmt::Display;
use std::io::{self, Write};

use async_trait::async_trait;
use sieve_core::RunReport;
use sieve_core::ports::{ResultSink, SinkError};

pub struct TextSink<W> {
    out: W,
}

impl<W: Write + Send> TextSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }
}

fn write_section<W: Write, T: Display>(out: &mut W, header: &str, items: &[T]) -> io::Result<()> {
    if items.is_empty() {
        return Ok(());
    }
    writeln!(out, "{header}")?;
    for item in items {
        writeln!(out, "{item}")?;
    }
    Ok(())
}

#[async_trait]
impl<W: Write + Send> ResultSink for TextSink<W> {
    async fn deliver(&mut self, report: &RunReport) -> Result<(), SinkError> {
        write_section(&mut self.out, "Errors:", &report.failed)?;
        write_section(&mut self.out, "Done tasks:", &report.completed)?;
        self.out.flush()?;
        Ok(())
    }
}

pub struct JsonSink<W> {
    out: W,
}

impl<W: Write + Send> JsonSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

#[async_trait]
impl<W: Write + Send> ResultSink for JsonSink<W> {
    async fn deliver(&mut self, report: &RunReport) -> Result<(), SinkError> {
        serde_json::to_writer_pretty(&mut self.out, report)
            .map_err(|e| SinkError::Other(format!("json encode: {e}")))?;
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }
}
