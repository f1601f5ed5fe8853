//! 레코드 파싱 모듈 -- syslog 라인에서 구조화 필드 추출
//!
//! [`SyslogParser`]는 고정된 정규식으로 라인 전체를 매칭하여
//! [`ParsedRecord`](logtally_core::types::ParsedRecord)를 만들거나,
//! 매칭에 실패하면 원본 오프셋/텍스트를 그대로 담은 [`ParseFailure`]를 반환합니다.
//!
//! # 사용 예시
//! ```ignore
//! use logtally_core::types::RawLine;
//! use logtally_log_pipeline::parser::SyslogParser;
//!
//! let parser = SyslogParser::new()?;
//! let record = parser.parse(RawLine::new("mem", 0, "Jun 14 15:16:01 combo sshd[1233]: ok"))?;
//! assert_eq!(record.process, "sshd[1233]:");
//! ```

pub mod syslog;

pub use syslog::SyslogParser;

use std::fmt;

use logtally_core::types::{RawLine, TrapRecord};

/// 파싱 실패 사유
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// 정규식이 라인 전체와 매칭되지 않음
    NoMatch,
    /// 라인이 최대 길이를 초과함
    TooLong {
        /// 라인 길이 (바이트)
        len: usize,
        /// 허용 최대 길이 (바이트)
        max: usize,
    },
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoMatch => f.write_str("line does not match the syslog pattern"),
            Self::TooLong { len, max } => write!(f, "line too long: {len} bytes (max: {max})"),
        }
    }
}

/// 라인 파싱 실패
///
/// 복구 가능한 실패이며, 원본 라인을 손대지 않고 보존합니다.
/// [`into_trap`](Self::into_trap)으로 trap 레코드로 변환합니다.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("parse failure at offset {}: {reason}", line.offset)]
pub struct ParseFailure {
    /// 원본 라인
    pub line: RawLine,
    /// 실패 사유
    pub reason: FailureReason,
}

impl ParseFailure {
    pub(crate) fn no_match(line: RawLine) -> Self {
        Self {
            line,
            reason: FailureReason::NoMatch,
        }
    }

    pub(crate) fn too_long(line: RawLine, max: usize) -> Self {
        let len = line.text.len();
        Self {
            line,
            reason: FailureReason::TooLong { len, max },
        }
    }

    /// 원본 오프셋/텍스트를 담은 trap 레코드로 변환합니다.
    pub fn into_trap(self) -> TrapRecord {
        TrapRecord::from(self.line)
    }
}
