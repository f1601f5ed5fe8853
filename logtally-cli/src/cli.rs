//! CLI argument parsing using clap derive API
//!
//! Purely declarative: no side effects or I/O.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// logtally -- split syslog files into parsed records, unparseable lines,
/// and a per-process event count report.
///
/// The four positional arguments are always sufficient; every flag is optional.
#[derive(Parser, Debug)]
#[command(name = "logtally", version, about, long_about = None)]
pub struct Cli {
    /// Input: a log file, a directory of log files, or a wildcard such as `/var/log/messages*`.
    pub input: String,

    /// Destination for normalized records (one tab-separated line per record).
    pub parsed_out: PathBuf,

    /// Destination for lines that failed to parse (`offset<TAB>text`).
    pub trap_out: PathBuf,

    /// Destination for the per-process count report, written only on success.
    pub report_out: PathBuf,

    /// Optional logtally.toml configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Number of parsing workers (0 = available parallelism).
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Run summary format.
    #[arg(long, default_value = "text")]
    pub output: OutputFormat,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_four_positionals_without_flags() {
        let cli = Cli::try_parse_from([
            "logtally",
            "/var/log/messages",
            "parsed.tsv",
            "trap.tsv",
            "report.csv",
        ])
        .expect("four positionals should parse");

        assert_eq!(cli.input, "/var/log/messages");
        assert_eq!(cli.parsed_out, PathBuf::from("parsed.tsv"));
        assert_eq!(cli.trap_out, PathBuf::from("trap.tsv"));
        assert_eq!(cli.report_out, PathBuf::from("report.csv"));
        assert!(cli.config.is_none());
        assert!(cli.workers.is_none());
        assert_eq!(cli.output, OutputFormat::Text);
    }

    #[test]
    fn test_missing_positional_is_rejected() {
        let result = Cli::try_parse_from(["logtally", "in.log", "parsed.tsv", "trap.tsv"]);
        assert!(result.is_err(), "three positionals should be rejected");
    }

    #[test]
    fn test_optional_flags() {
        let cli = Cli::try_parse_from([
            "logtally",
            "--config",
            "logtally.toml",
            "--log-level",
            "debug",
            "-w",
            "4",
            "--output",
            "json",
            "in.log",
            "p",
            "t",
            "r",
        ])
        .expect("flags should parse");

        assert_eq!(cli.config, Some(PathBuf::from("logtally.toml")));
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        assert_eq!(cli.workers, Some(4));
        assert_eq!(cli.output, OutputFormat::Json);
    }

    #[test]
    fn test_invalid_output_format_is_rejected() {
        let result = Cli::try_parse_from(["logtally", "--output", "xml", "i", "p", "t", "r"]);
        assert!(result.is_err());
    }
}
