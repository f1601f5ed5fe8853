//! logtally 공통 크레이트
//!
//! 모든 logtally 크레이트가 공유하는 도메인 타입, 소스/싱크 trait,
//! 에러 타입, 설정, 메트릭 이름을 정의합니다.

pub mod config;
pub mod error;
pub mod metrics;
pub mod pipeline;
pub mod types;

// --- 주요 타입 re-export ---
// 각 모듈의 핵심 타입을 크레이트 루트에서 바로 사용할 수 있도록 합니다.

// 에러
pub use error::{ConfigError, LogTallyError, PipelineError, SinkError, SourceError};

// 설정
pub use config::LogTallyConfig;

// 소스/싱크 trait
pub use pipeline::{LineReader, LineSource, OutputSink, SinkProvider};

// 도메인 타입
pub use types::{ParsedRecord, ProcessCount, RawLine, StreamKind, TrapRecord};
