//! CLI-specific error types and exit code mapping

use logtally_core::error::{LogTallyError, PipelineError};
use logtally_log_pipeline::LogPipelineError;

/// CLI-specific error type.
///
/// The `exit_code()` method maps errors to process exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// Input could not be resolved or read.
    #[error("input error: {0}")]
    Input(String),

    /// An output destination could not be created, written or committed.
    #[error("output error: {0}")]
    Output(String),

    /// The run was interrupted before the report was committed.
    #[error("run cancelled, report not written")]
    Cancelled,

    /// Any other pipeline failure.
    #[error("{0}")]
    Run(String),

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                              |
    /// |------|--------------------------------------|
    /// | 0    | Success                              |
    /// | 1    | General pipeline error               |
    /// | 2    | Configuration error                  |
    /// | 3    | Input missing or unreadable          |
    /// | 10   | Output or IO error                   |
    /// | 130  | Cancelled (interrupt)                |
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) => 2,
            Self::Input(_) => 3,
            Self::Output(_) | Self::Io(_) => 10,
            Self::Cancelled => 130,
            Self::Run(_) | Self::JsonSerialize(_) => 1,
        }
    }
}

impl From<LogTallyError> for CliError {
    fn from(e: LogTallyError) -> Self {
        match e {
            LogTallyError::Config(inner) => Self::Config(inner.to_string()),
            LogTallyError::Source(inner) => Self::Input(inner.to_string()),
            LogTallyError::Sink(inner) => Self::Output(inner.to_string()),
            LogTallyError::Pipeline(PipelineError::Cancelled) => Self::Cancelled,
            LogTallyError::Pipeline(inner) => Self::Run(inner.to_string()),
            LogTallyError::Io(inner) => Self::Io(inner),
        }
    }
}

impl From<LogPipelineError> for CliError {
    fn from(e: LogPipelineError) -> Self {
        LogTallyError::from(e).into()
    }
}
