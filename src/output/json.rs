//! JSON output formatter for machine processing
//!
//! The command result types serialize directly; this formatter just
//! pretty-prints them with a trailing newline.

use crate::command::CommandOutput;
use crate::output::OutputFormatter;
use std::io::Write;

/// JSON formatter for machine-readable output
#[derive(Default)]
pub struct JsonFormatter;

impl JsonFormatter {
    /// Create a new JSON formatter
    pub fn new() -> Self {
        Self
    }
}

impl OutputFormatter for JsonFormatter {
    fn format(&self, output: &CommandOutput, writer: &mut dyn Write) -> std::io::Result<()> {
        serde_json::to_writer_pretty(&mut *writer, output)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        writeln!(writer)
    }
}
