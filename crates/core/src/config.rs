//! 설정 관리: logtally.toml 파싱 및 런타임 설정
//!
//! [`LogTallyConfig`]는 실행 환경 설정을 담는 최상위 구조체입니다.
//! 입력/출력 경로는 실행마다 달라지므로 설정 파일이 아니라 CLI 인자로 받습니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`LOGTALLY_PIPELINE_WORKERS=8` 형식)
//! 3. 설정 파일 (`logtally.toml`, 선택)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), logtally_core::error::LogTallyError> {
//! use logtally_core::config::LogTallyConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = LogTallyConfig::load("logtally.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = LogTallyConfig::parse("[general]\nlog_level = \"debug\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, LogTallyError};

/// 단일 라인 최대 길이의 상한 (16MB)
const MAX_LINE_LENGTH_LIMIT: usize = 16 * 1024 * 1024;

/// 워커 수 상한
const MAX_WORKERS: usize = 1024;

/// logtally 통합 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogTallyConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 파이프라인 실행 설정
    #[serde(default)]
    pub pipeline: PipelineSection,
}

impl LogTallyConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, LogTallyError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// 설정 파일 없이 기본값 + 환경변수 오버라이드로 설정을 만듭니다.
    pub fn from_env() -> Result<Self, LogTallyError> {
        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, LogTallyError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                LogTallyError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                LogTallyError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, LogTallyError> {
        toml::from_str(toml_str).map_err(|e| {
            LogTallyError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `LOGTALLY_{SECTION}_{FIELD}`
    pub fn apply_env_overrides(&mut self) {
        override_string(&mut self.general.log_level, "LOGTALLY_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "LOGTALLY_GENERAL_LOG_FORMAT");

        override_usize(&mut self.pipeline.workers, "LOGTALLY_PIPELINE_WORKERS");
        override_usize(
            &mut self.pipeline.channel_capacity,
            "LOGTALLY_PIPELINE_CHANNEL_CAPACITY",
        );
        override_usize(
            &mut self.pipeline.max_line_length,
            "LOGTALLY_PIPELINE_MAX_LINE_LENGTH",
        );
        override_string(
            &mut self.pipeline.record_delimiter,
            "LOGTALLY_PIPELINE_RECORD_DELIMITER",
        );
        override_string(
            &mut self.pipeline.report_delimiter,
            "LOGTALLY_PIPELINE_REPORT_DELIMITER",
        );
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), LogTallyError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        // 0은 "가용 병렬성 사용"을 의미
        if self.pipeline.workers > MAX_WORKERS {
            return Err(ConfigError::InvalidValue {
                field: "pipeline.workers".to_owned(),
                reason: format!("must be 0-{MAX_WORKERS}"),
            }
            .into());
        }

        if self.pipeline.channel_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "pipeline.channel_capacity".to_owned(),
                reason: "must be greater than 0".to_owned(),
            }
            .into());
        }

        if self.pipeline.max_line_length == 0
            || self.pipeline.max_line_length > MAX_LINE_LENGTH_LIMIT
        {
            return Err(ConfigError::InvalidValue {
                field: "pipeline.max_line_length".to_owned(),
                reason: format!("must be 1-{MAX_LINE_LENGTH_LIMIT}"),
            }
            .into());
        }

        for (field, value) in [
            ("pipeline.record_delimiter", &self.pipeline.record_delimiter),
            ("pipeline.report_delimiter", &self.pipeline.report_delimiter),
        ] {
            if value.is_empty() || value.contains('\n') {
                return Err(ConfigError::InvalidValue {
                    field: field.to_owned(),
                    reason: "must be non-empty and must not contain a newline".to_owned(),
                }
                .into());
            }
        }

        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "pretty".to_owned(),
        }
    }
}

/// 파이프라인 실행 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSection {
    /// 파싱 워커 수 (0이면 가용 병렬성)
    pub workers: usize,
    /// 워커 -> 출력 writer 채널 용량
    pub channel_capacity: usize,
    /// 최대 라인 길이 (바이트). 초과 라인은 trap으로 보냅니다.
    pub max_line_length: usize,
    /// parsed/trap 스트림 필드 구분자
    pub record_delimiter: String,
    /// report 스트림 필드 구분자
    pub report_delimiter: String,
}

impl Default for PipelineSection {
    fn default() -> Self {
        Self {
            workers: 0,
            channel_capacity: 1024,
            max_line_length: 64 * 1024, // 64KB
            record_delimiter: "\t".to_owned(),
            report_delimiter: ",".to_owned(),
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}
