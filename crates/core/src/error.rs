//! 에러 타입: 도메인별 에러 정의

/// logtally 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum LogTallyError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 입력 소스 에러
    #[error("source error: {0}")]
    Source(#[from] SourceError),

    /// 출력 싱크 에러
    #[error("sink error: {0}")]
    Sink(#[from] SinkError),

    /// 파이프라인 실행 에러
    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 입력 소스 에러. 모두 실행 시작 전 설정 실패(fatal)로 취급합니다.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// 입력 경로가 파일을 하나도 가리키지 않음
    #[error("no input files matched '{pattern}'")]
    NoMatch { pattern: String },

    /// 입력 경로를 읽을 수 없음
    #[error("cannot read input '{path}': {reason}")]
    Unreadable { path: String, reason: String },
}

/// 출력 싱크 에러
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// 출력 대상을 생성할 수 없음
    #[error("cannot create {stream} output '{path}': {reason}")]
    Create {
        stream: String,
        path: String,
        reason: String,
    },

    /// 출력 쓰기 실패
    #[error("failed to write {stream} output: {reason}")]
    Write { stream: String, reason: String },

    /// 리포트 커밋 실패
    #[error("failed to commit {stream} output: {reason}")]
    Commit { stream: String, reason: String },
}

/// 파이프라인 실행 에러
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// 채널 전송 실패
    #[error("channel send failed: {0}")]
    ChannelSend(String),

    /// 워커 태스크 실패
    #[error("worker failed: {0}")]
    Worker(String),

    /// 실행 취소됨
    #[error("run cancelled before completion")]
    Cancelled,

    /// 파이프라인 초기화 실패
    #[error("pipeline init failed: {0}")]
    InitFailed(String),
}
