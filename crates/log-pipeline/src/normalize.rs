//! process 필드 정규화
//!
//! 파서가 넘겨준 `process` 값(`"name:"` 또는 `"name[pid]:"`)을
//! 리포트용 논리 프로세스명으로 바꿉니다.
//!
//! - `[`가 있으면 그 앞까지만 남깁니다: `"ntpd[1302]:"` -> `"ntpd"`
//! - 없으면 마지막 한 글자(콜론)를 버립니다: `"sshd:"` -> `"sshd"`
//! - 결과는 소문자로 바꿉니다.
//!
//! 이 규칙은 콜론이 남아 있다는 전제를 깔고 있어 두 번 적용하면 안 됩니다.
//! [`NormalizedRecord`]는 정규화를 거친 레코드만 표현하는 타입으로,
//! 한 레코드에 정확히 한 번 적용되도록 보장합니다.

use std::ops::Deref;

use serde::Serialize;

use logtally_core::types::ParsedRecord;

/// 정규화를 정확히 한 번 거친 레코드
///
/// [`normalize`]로만 만들 수 있습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct NormalizedRecord(ParsedRecord);

impl NormalizedRecord {
    /// 정규화된 프로세스명을 반환합니다.
    pub fn process(&self) -> &str {
        &self.0.process
    }

    /// 내부 레코드를 꺼냅니다.
    pub fn into_inner(self) -> ParsedRecord {
        self.0
    }
}

impl Deref for NormalizedRecord {
    type Target = ParsedRecord;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// 레코드의 `process` 필드를 정규화합니다. 다른 필드는 그대로 둡니다.
pub fn normalize(record: ParsedRecord) -> NormalizedRecord {
    let process = normalize_process(&record.process);
    NormalizedRecord(ParsedRecord { process, ..record })
}

/// 원시 process 값을 정규화합니다.
///
/// 실패하지 않으며, 한 글자짜리 입력은 빈 문자열이 됩니다.
pub fn normalize_process(raw: &str) -> String {
    let name = match raw.find('[') {
        Some(idx) => &raw[..idx],
        None => {
            let mut chars = raw.chars();
            chars.next_back();
            chars.as_str()
        }
    };
    name.to_lowercase()
}
