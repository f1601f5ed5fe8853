//! 로그 파이프라인 실행 설정
//!
//! [`PipelineConfig`]는 한 번의 실행을 완전히 기술합니다. 입력/출력 경로와
//! core의 [`PipelineSection`](logtally_core::config::PipelineSection)에서 온
//! 튜닝 값을 함께 담으며, 전역 상태 없이 [`LogPipelineBuilder`](crate::LogPipelineBuilder)에 전달됩니다.
//!
//! # 사용 예시
//! ```ignore
//! use logtally_core::config::LogTallyConfig;
//! use logtally_log_pipeline::config::PipelineConfig;
//!
//! let core_config = LogTallyConfig::default();
//! let config = PipelineConfig::from_core(&core_config.pipeline)
//!     .with_paths("/var/log/messages", "parsed.tsv", "trap.tsv", "report.csv");
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use logtally_core::config::PipelineSection;

use crate::error::LogPipelineError;
use crate::parser::syslog::DEFAULT_MAX_LINE_LENGTH;

const MAX_WORKERS: usize = 1024;
const MAX_LINE_LENGTH_LIMIT: usize = 16 * 1024 * 1024;

/// 로그 파이프라인 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// 입력 경로 (파일, 디렉토리, 와일드카드)
    pub input: String,
    /// 정규화된 레코드 출력 경로
    pub parsed_output: PathBuf,
    /// 파싱 실패 라인 출력 경로
    pub trap_output: PathBuf,
    /// 프로세스별 집계 리포트 출력 경로
    pub report_output: PathBuf,
    /// 파싱 워커 수 (0이면 가용 병렬성)
    pub workers: usize,
    /// 워커 -> writer 채널 용량
    pub channel_capacity: usize,
    /// 최대 라인 길이 (바이트)
    pub max_line_length: usize,
    /// parsed/trap 필드 구분자
    pub record_delimiter: String,
    /// report 필드 구분자
    pub report_delimiter: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input: String::new(),
            parsed_output: PathBuf::new(),
            trap_output: PathBuf::new(),
            report_output: PathBuf::new(),
            workers: 0,
            channel_capacity: 1024,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            record_delimiter: "\t".to_owned(),
            report_delimiter: ",".to_owned(),
        }
    }
}

impl PipelineConfig {
    /// core의 `[pipeline]` 섹션에서 튜닝 값을 가져옵니다.
    ///
    /// 경로는 비어 있으므로 [`with_paths`](Self::with_paths)로 채워야 합니다.
    pub fn from_core(section: &PipelineSection) -> Self {
        Self {
            workers: section.workers,
            channel_capacity: section.channel_capacity,
            max_line_length: section.max_line_length,
            record_delimiter: section.record_delimiter.clone(),
            report_delimiter: section.report_delimiter.clone(),
            ..Self::default()
        }
    }

    /// 입력/출력 경로를 설정합니다.
    pub fn with_paths(
        mut self,
        input: impl Into<String>,
        parsed_output: impl Into<PathBuf>,
        trap_output: impl Into<PathBuf>,
        report_output: impl Into<PathBuf>,
    ) -> Self {
        self.input = input.into();
        self.parsed_output = parsed_output.into();
        self.trap_output = trap_output.into();
        self.report_output = report_output.into();
        self
    }

    /// 실제로 사용할 워커 수를 반환합니다. 항상 1 이상입니다.
    pub fn effective_workers(&self) -> usize {
        if self.workers > 0 {
            return self.workers;
        }
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    }

    /// 실행 파라미터만 검증합니다 (경로 제외).
    ///
    /// 소스/싱크를 직접 주입하는 경우 경로 필드는 사용되지 않습니다.
    pub fn validate_tuning(&self) -> Result<(), LogPipelineError> {
        if self.workers > MAX_WORKERS {
            return Err(invalid("workers", format!("must be 0-{MAX_WORKERS}")));
        }

        if self.channel_capacity == 0 {
            return Err(invalid("channel_capacity", "must be greater than 0"));
        }

        if self.max_line_length == 0 || self.max_line_length > MAX_LINE_LENGTH_LIMIT {
            return Err(invalid(
                "max_line_length",
                format!("must be 1-{MAX_LINE_LENGTH_LIMIT}"),
            ));
        }

        validate_delimiter("record_delimiter", &self.record_delimiter)?;
        validate_delimiter("report_delimiter", &self.report_delimiter)?;

        Ok(())
    }

    /// 경로를 포함한 전체 설정을 검증합니다.
    pub fn validate(&self) -> Result<(), LogPipelineError> {
        self.validate_tuning()?;

        if self.input.is_empty() {
            return Err(invalid("input", "must not be empty"));
        }

        let outputs = [
            ("parsed_output", &self.parsed_output),
            ("trap_output", &self.trap_output),
            ("report_output", &self.report_output),
        ];
        for (field, path) in outputs {
            if path.as_os_str().is_empty() {
                return Err(invalid(field, "must not be empty"));
            }
            if path.as_os_str() == self.input.as_str() {
                return Err(invalid(field, "must differ from the input path"));
            }
        }

        for (i, (field, path)) in outputs.iter().enumerate() {
            if outputs[..i].iter().any(|(_, other)| other == path) {
                return Err(invalid(
                    field,
                    format!("'{}' is already used by another output", path.display()),
                ));
            }
        }

        Ok(())
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> LogPipelineError {
    LogPipelineError::Config {
        field: field.to_owned(),
        reason: reason.into(),
    }
}

fn validate_delimiter(field: &str, value: &str) -> Result<(), LogPipelineError> {
    if value.is_empty() {
        return Err(invalid(field, "must not be empty"));
    }
    if value.contains(['\n', '\r']) {
        return Err(invalid(field, "must not contain line breaks"));
    }
    Ok(())
}

/// 파이프라인 설정 빌더
#[derive(Default)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 입력 경로를 설정합니다.
    pub fn input(mut self, input: impl Into<String>) -> Self {
        self.config.input = input.into();
        self
    }

    /// parsed 출력 경로를 설정합니다.
    pub fn parsed_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.parsed_output = path.into();
        self
    }

    /// trap 출력 경로를 설정합니다.
    pub fn trap_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.trap_output = path.into();
        self
    }

    /// report 출력 경로를 설정합니다.
    pub fn report_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.report_output = path.into();
        self
    }

    /// 워커 수를 설정합니다 (0 = 가용 병렬성).
    pub fn workers(mut self, workers: usize) -> Self {
        self.config.workers = workers;
        self
    }

    /// 채널 용량을 설정합니다.
    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.config.channel_capacity = capacity;
        self
    }

    /// 최대 라인 길이를 설정합니다.
    pub fn max_line_length(mut self, max: usize) -> Self {
        self.config.max_line_length = max;
        self
    }

    /// parsed/trap 구분자를 설정합니다.
    pub fn record_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.config.record_delimiter = delimiter.into();
        self
    }

    /// report 구분자를 설정합니다.
    pub fn report_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.config.report_delimiter = delimiter.into();
        self
    }

    /// 설정을 검증하고 `PipelineConfig`를 생성합니다.
    pub fn build(self) -> Result<PipelineConfig, LogPipelineError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_paths() -> PipelineConfig {
        PipelineConfig::default().with_paths("in.log", "parsed.tsv", "trap.tsv", "report.csv")
    }

    #[test]
    fn default_tuning_is_valid() {
        PipelineConfig::default().validate_tuning().unwrap();
    }

    #[test]
    fn default_config_without_paths_is_invalid() {
        let err = PipelineConfig::default().validate().unwrap_err();
        assert!(err.to_string().contains("input"));
    }

    #[test]
    fn config_with_paths_is_valid() {
        with_paths().validate().unwrap();
    }

    #[test]
    fn from_core_preserves_values() {
        let section = PipelineSection {
            workers: 4,
            channel_capacity: 16,
            max_line_length: 512,
            record_delimiter: "|".to_owned(),
            report_delimiter: ";".to_owned(),
        };
        let config = PipelineConfig::from_core(&section);
        assert_eq!(config.workers, 4);
        assert_eq!(config.channel_capacity, 16);
        assert_eq!(config.max_line_length, 512);
        assert_eq!(config.record_delimiter, "|");
        assert_eq!(config.report_delimiter, ";");
        // 경로는 비어 있음
        assert!(config.input.is_empty());
    }

    #[test]
    fn effective_workers_is_at_least_one() {
        assert!(PipelineConfig::default().effective_workers() >= 1);
        let config = PipelineConfig {
            workers: 3,
            ..Default::default()
        };
        assert_eq!(config.effective_workers(), 3);
    }

    #[test]
    fn validate_rejects_zero_channel_capacity() {
        let config = PipelineConfig {
            channel_capacity: 0,
            ..with_paths()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_too_many_workers() {
        let config = PipelineConfig {
            workers: MAX_WORKERS + 1,
            ..with_paths()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_delimiters() {
        let empty = PipelineConfig {
            record_delimiter: String::new(),
            ..with_paths()
        };
        assert!(empty.validate().is_err());

        let newline = PipelineConfig {
            report_delimiter: "\n".to_owned(),
            ..with_paths()
        };
        assert!(newline.validate().is_err());
    }

    #[test]
    fn validate_rejects_shared_output_path() {
        let config = PipelineConfig::default().with_paths("in.log", "out.txt", "trap.txt", "out.txt");
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("report_output"));
    }

    #[test]
    fn validate_rejects_output_equal_to_input() {
        let config = PipelineConfig::default().with_paths("in.log", "in.log", "t", "r");
        assert!(config.validate().is_err());
    }

    #[test]
    fn builder_creates_valid_config() {
        let config = PipelineConfigBuilder::new()
            .input("/var/log/messages")
            .parsed_output("/tmp/parsed")
            .trap_output("/tmp/trap")
            .report_output("/tmp/report")
            .workers(2)
            .channel_capacity(8)
            .report_delimiter("\t")
            .build()
            .unwrap();
        assert_eq!(config.workers, 2);
        assert_eq!(config.channel_capacity, 8);
        assert_eq!(config.report_delimiter, "\t");
    }

    #[test]
    fn builder_rejects_invalid_config() {
        let result = PipelineConfigBuilder::new()
            .input("in")
            .parsed_output("p")
            .trap_output("t")
            .report_output("r")
            .max_line_length(0)
            .build();
        assert!(result.is_err());
    }
}
