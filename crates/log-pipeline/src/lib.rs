//! logtally 로그 파이프라인
//!
//! BSD syslog 라인을 읽어 구조화 레코드로 파싱하고, 프로세스명을 정규화하고,
//! 파싱 실패 라인을 trap 스트림으로 분리하고, 프로세스별 건수를 집계합니다.
//!
//! # 모듈 구성
//!
//! - [`collector`]: 라인 소스 (로컬 파일, 메모리)
//! - [`parser`]: 정규식 기반 syslog 레코드 파서
//! - [`normalize`]: process 필드 정규화
//! - [`trap`]: 파싱 성공/실패 라우팅
//! - [`aggregate`]: 프로세스별 집계
//! - [`sink`]: 출력 싱크 (로컬 파일, 메모리)
//! - [`pipeline`]: 전체 실행 오케스트레이션
//! - [`config`]: 실행 설정
//! - [`error`]: 도메인 에러 타입
//!
//! # 아키텍처
//!
//! ```text
//! LineSource -> SyslogParser -> TrapRouter -+-> normalize -> parsed sink
//!                                           |       |
//!                                           |       +-> Aggregator -(barrier)-> report sink
//!                                           +-> trap sink
//! ```

pub mod aggregate;
pub mod collector;
pub mod config;
pub mod error;
pub mod normalize;
pub mod parser;
pub mod pipeline;
pub mod sink;
pub mod trap;

// --- 주요 타입 re-export ---

// 파이프라인
pub use pipeline::{LogPipeline, LogPipelineBuilder, RunSummary};

// 설정
pub use config::{PipelineConfig, PipelineConfigBuilder};

// 에러
pub use error::LogPipelineError;

// 파서 / 정규화 / 라우팅 / 집계
pub use aggregate::{Aggregator, aggregate};
pub use normalize::{NormalizedRecord, normalize};
pub use parser::{FailureReason, ParseFailure, SyslogParser};
pub use trap::{Route, TrapRouter};

// 소스 / 싱크
pub use collector::{FileSource, MemorySource};
pub use sink::{FileSinkProvider, MemorySinkProvider};
