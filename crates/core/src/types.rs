//! 도메인 타입: 파이프라인 전 구간에서 사용되는 공통 타입
//!
//! 소스가 만들어내는 [`RawLine`], 파서가 만들어내는 [`ParsedRecord`] /
//! [`TrapRecord`], 집계 결과인 [`ProcessCount`]를 정의합니다.

use std::fmt;

use serde::{Deserialize, Serialize};

/// 원시 입력 라인
///
/// 소스 파일 안에서의 바이트 오프셋과 라인 텍스트(개행 문자 제외)를 담습니다.
/// 한 파일 안의 순서는 보존되지만, 파일 간 순서는 보장되지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLine {
    /// 소스 식별자 (예: "/var/log/messages")
    pub source: String,
    /// 라인 시작 위치 (파일 시작 기준 바이트 오프셋)
    pub offset: u64,
    /// 라인 텍스트
    pub text: String,
}

impl RawLine {
    /// 새 RawLine을 생성합니다.
    pub fn new(source: impl Into<String>, offset: u64, text: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            offset,
            text: text.into(),
        }
    }
}

/// syslog 라인에서 추출한 구조화 레코드
///
/// 여섯 필드 모두 파서가 정규식 전체 매칭에 성공했을 때만 채워집니다.
/// `process` 필드는 파서 단계에서 끝의 `:`를 포함한 채로 보관됩니다
/// (예: `"sshd[1233]:"`, `"ntpd:"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedRecord {
    pub month: String,
    pub day: String,
    pub time: String,
    pub node: String,
    pub process: String,
    pub message: String,
}

impl ParsedRecord {
    /// 필드를 출력 순서(month, day, time, node, process, message)대로 반환합니다.
    pub fn fields(&self) -> [&str; 6] {
        [
            &self.month,
            &self.day,
            &self.time,
            &self.node,
            &self.process,
            &self.message,
        ]
    }

    /// 필드를 구분자로 이어 한 줄로 직렬화합니다.
    pub fn to_line(&self, delimiter: &str) -> String {
        self.fields().join(delimiter)
    }
}

/// 파싱에 실패한 라인
///
/// 원본 오프셋과 텍스트를 그대로 보존하며, trap 스트림으로만 흘러갑니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrapRecord {
    /// 라인 시작 위치 (바이트 오프셋)
    pub offset: u64,
    /// 원본 라인 텍스트
    pub text: String,
}

impl TrapRecord {
    /// `offset`, `text` 순서로 구분자를 넣어 직렬화합니다.
    pub fn to_line(&self, delimiter: &str) -> String {
        format!("{}{}{}", self.offset, delimiter, self.text)
    }
}

impl From<RawLine> for TrapRecord {
    fn from(line: RawLine) -> Self {
        Self {
            offset: line.offset,
            text: line.text,
        }
    }
}

/// 프로세스별 이벤트 수
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessCount {
    /// 정규화된 프로세스명
    pub process: String,
    /// 해당 프로세스의 레코드 수
    pub count: u64,
}

impl ProcessCount {
    /// `process`, `count` 순서로 구분자를 넣어 직렬화합니다.
    pub fn to_line(&self, delimiter: &str) -> String {
        format!("{}{}{}", self.process, delimiter, self.count)
    }
}

impl fmt::Display for ProcessCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.process, self.count)
    }
}

/// 출력 스트림 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    /// 정규화된 레코드
    Parsed,
    /// 프로세스별 집계 리포트
    Report,
    /// 파싱 실패 라인
    Trap,
}

impl StreamKind {
    /// 스트림 이름을 반환합니다.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Parsed => "parsed",
            Self::Report => "report",
            Self::Trap => "trap",
        }
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
