//! BSD syslog 라인 파서
//!
//! `/var/log/messages` 형식의 라인을 여섯 필드로 분해합니다.
//!
//! # 라인 형식
//! ```text
//! MONTH DAY HH:MM:SS NODE PROCESS: MESSAGE
//! Jun 14 15:16:01 combo sshd[1233]: reverse mapping failed
//! ```
//!
//! `process` 필드는 끝의 `:`를 포함한 채로 추출됩니다 (`"sshd[1233]:"`).
//! 콜론 제거와 PID 제거는 [`normalize`](crate::normalize) 단계가 전담합니다.

use regex::{Captures, Regex};

use logtally_core::types::{ParsedRecord, RawLine};

use super::ParseFailure;
use crate::error::LogPipelineError;

/// 레코드 추출 정규식 (라인 전체 매칭)
///
/// 1. month, 2. day, 3. time, 4. node, 5. process (콜론 포함), 6. message
///
/// 단어/숫자/공백 클래스는 ASCII로 한정합니다. `regex`의 `\w`, `\d`, `\s`는
/// 유니코드 문자까지 매칭하므로 명시적 클래스로 풀어 씁니다.
const SYSLOG_PATTERN: &str = concat!(
    r"^([A-Za-z0-9_]+)",
    r"[ \t\n\x0B\f\r]+([0-9]+)",
    r"[ \t\n\x0B\f\r]+([0-9]+:[0-9]+:[0-9]+)",
    r"[ \t\n\x0B\f\r]+([A-Za-z0-9_]+[^A-Za-z0-9_]*[A-Za-z0-9_]*)",
    r"[ \t\n\x0B\f\r]+(.*?:)",
    r"[ \t\n\x0B\f\r](.+)$",
);

/// 기본 최대 라인 길이 (64KB)
pub const DEFAULT_MAX_LINE_LENGTH: usize = 64 * 1024;

/// syslog 레코드 파서
///
/// 순수 함수처럼 동작하며 내부 상태를 바꾸지 않습니다.
/// 정규식은 내부적으로 공유되므로 워커마다 `clone()`해도 비용이 작습니다.
#[derive(Debug, Clone)]
pub struct SyslogParser {
    pattern: Regex,
    /// 최대 허용 라인 길이 (바이트)
    max_line_length: usize,
}

impl SyslogParser {
    /// 기본 설정으로 새 파서를 생성합니다.
    pub fn new() -> Result<Self, LogPipelineError> {
        Ok(Self {
            pattern: Regex::new(SYSLOG_PATTERN)?,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
        })
    }

    /// 최대 라인 길이를 설정합니다.
    pub fn with_max_line_length(mut self, max: usize) -> Self {
        self.max_line_length = max;
        self
    }

    /// 최대 라인 길이를 반환합니다.
    pub fn max_line_length(&self) -> usize {
        self.max_line_length
    }

    /// 라인을 파싱합니다.
    ///
    /// 부분 추출이나 최선 노력 복구는 하지 않습니다. 정규식이 라인 전체와
    /// 매칭되지 않으면 원본 라인을 담은 [`ParseFailure`]를 반환합니다.
    pub fn parse(&self, line: RawLine) -> Result<ParsedRecord, ParseFailure> {
        if line.text.len() > self.max_line_length {
            return Err(ParseFailure::too_long(line, self.max_line_length));
        }

        let record = self
            .pattern
            .captures(&line.text)
            .map(|caps| Self::record_from(&caps));

        record.ok_or_else(|| ParseFailure::no_match(line))
    }

    fn record_from(caps: &Captures<'_>) -> ParsedRecord {
        let group = |idx: usize| {
            caps.get(idx)
                .map(|m| m.as_str().to_owned())
                .unwrap_or_default()
        };

        ParsedRecord {
            month: group(1),
            day: group(2),
            time: group(3),
            node: group(4),
            process: group(5),
            message: group(6),
        }
    }
}
