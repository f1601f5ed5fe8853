//! 로그 파이프라인 에러 타입
//!
//! [`LogPipelineError`]는 파이프라인 실행 중 발생하는 치명적 에러를 표현합니다.
//! 라인 단위 파싱 실패는 에러가 아니라 [`ParseFailure`](crate::parser::ParseFailure)
//! 값으로 trap 스트림에 전달되며, 여기에 포함되지 않습니다.
//!
//! `From<LogPipelineError> for LogTallyError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 자연스럽게 전파할 수 있습니다.

use logtally_core::error::{ConfigError, LogTallyError, PipelineError, SourceError};

/// 로그 파이프라인 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum LogPipelineError {
    /// 입력 소스 에러 (매칭 파일 없음, 읽기 실패 등)
    #[error("source error: {source_id}: {reason}")]
    Source {
        /// 소스 식별자 (경로 또는 패턴)
        source_id: String,
        /// 에러 사유
        reason: String,
    },

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// 채널 통신 에러
    #[error("channel error: {0}")]
    Channel(String),

    /// 워커 태스크 실패 (패닉 등)
    #[error("worker error: {0}")]
    Worker(String),

    /// 실행 취소
    #[error("run cancelled")]
    Cancelled,

    /// 외부 협력자(소스/싱크 구현)가 반환한 에러. 싱크 에러는 모두 이 경로로 전달됩니다.
    #[error(transparent)]
    Collaborator(#[from] LogTallyError),

    /// 정규식 컴파일 에러
    #[error("regex error: {0}")]
    Regex(#[from] regex::Error),
}

impl From<LogPipelineError> for LogTallyError {
    fn from(err: LogPipelineError) -> Self {
        match err {
            LogPipelineError::Source { source_id, reason } => {
                LogTallyError::Source(SourceError::Unreadable {
                    path: source_id,
                    reason,
                })
            }
            LogPipelineError::Config { field, reason } => {
                LogTallyError::Config(ConfigError::InvalidValue { field, reason })
            }
            LogPipelineError::Channel(msg) => {
                LogTallyError::Pipeline(PipelineError::ChannelSend(msg))
            }
            LogPipelineError::Worker(msg) => LogTallyError::Pipeline(PipelineError::Worker(msg)),
            LogPipelineError::Cancelled => LogTallyError::Pipeline(PipelineError::Cancelled),
            LogPipelineError::Collaborator(inner) => inner,
            LogPipelineError::Regex(e) => {
                LogTallyError::Pipeline(PipelineError::InitFailed(e.to_string()))
            }
        }
    }
}
