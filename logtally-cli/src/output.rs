//! Output formatting abstraction for text vs JSON rendering
//!
//! The run summary flows through [`OutputWriter`] which handles format switching.

use std::io::Write;

use serde::Serialize;

use logtally_log_pipeline::RunSummary;

use crate::cli::OutputFormat;
use crate::error::CliError;

/// Writes CLI output in the selected format.
pub struct OutputWriter {
    format: OutputFormat,
}

impl OutputWriter {
    /// Create a new output writer with the specified format.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Render a payload to stdout.
    pub fn render<T: Render + Serialize>(&self, payload: &T) -> Result<(), CliError> {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        self.render_to(&mut handle, payload)
    }

    /// Render a payload to an arbitrary writer.
    ///
    /// For `Text` format, delegates to `Render::render_text()`.
    /// For `Json` format, serialises via `serde_json`.
    pub fn render_to<T: Render + Serialize>(
        &self,
        w: &mut dyn Write,
        payload: &T,
    ) -> Result<(), CliError> {
        match self.format {
            OutputFormat::Text => payload.render_text(w)?,
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut *w, payload)?;
                writeln!(w)?;
            }
        }
        Ok(())
    }
}

/// Human-readable text rendering, implemented alongside `serde::Serialize`.
pub trait Render {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()>;
}

impl Render for RunSummary {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "run {}", self.run_id)?;
        writeln!(w, "  sources:    {}", self.sources)?;
        writeln!(w, "  lines read: {}", self.lines_read)?;
        writeln!(w, "  parsed:     {}", self.parsed)?;
        writeln!(w, "  trapped:    {}", self.trapped)?;
        writeln!(w, "  processes:  {}", self.groups)?;
        writeln!(w, "  elapsed:    {} ms", self.elapsed_ms)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> RunSummary {
        RunSummary {
            run_id: "67e55044-10b1-426f-9247-bb680e5fe0c8".parse().expect("valid uuid"),
            sources: 2,
            lines_read: 6,
            parsed: 5,
            trapped: 1,
            groups: 4,
            elapsed_ms: 12,
        }
    }

    fn render(format: OutputFormat) -> String {
        let mut buffer = Vec::new();
        OutputWriter::new(format)
            .render_to(&mut buffer, &summary())
            .expect("rendering should succeed");
        String::from_utf8(buffer).expect("valid UTF-8")
    }

    #[test]
    fn test_text_summary() {
        let output = render(OutputFormat::Text);
        assert!(output.starts_with("run 67e55044-10b1-426f-9247-bb680e5fe0c8"));
        assert!(output.contains("parsed:     5"));
        assert!(output.contains("trapped:    1"));
        assert!(output.contains("processes:  4"));
    }

    #[test]
    fn test_json_summary_structure() {
        let output = render(OutputFormat::Json);
        let parsed: serde_json::Value =
            serde_json::from_str(&output).expect("should parse back to JSON");

        assert_eq!(
            parsed["run_id"].as_str(),
            Some("67e55044-10b1-426f-9247-bb680e5fe0c8")
        );
        assert_eq!(parsed["lines_read"].as_u64(), Some(6));
        assert_eq!(parsed["trapped"].as_u64(), Some(1));
        assert_eq!(parsed["groups"].as_u64(), Some(4));
        assert!(output.ends_with('\n'));
    }
}
