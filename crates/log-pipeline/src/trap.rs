//! trap 라우팅 -- 파싱 성공/실패를 서로 다른 경로로 분리합니다.
//!
//! 모든 입력 라인은 정확히 하나의 [`Route`]가 되며,
//! 성공 경로(parsed)와 실패 경로(trap) 중 한쪽에만 나타납니다.

use logtally_core::types::{ParsedRecord, TrapRecord};

use crate::parser::ParseFailure;

/// 라인 한 줄의 라우팅 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// 파싱 성공 -> 정규화 후 parsed 스트림과 집계기로
    Parsed(ParsedRecord),
    /// 파싱 실패 -> trap 스트림으로
    Trapped(TrapRecord),
}

impl Route {
    /// trap 경로인지 확인합니다.
    pub fn is_trapped(&self) -> bool {
        matches!(self, Self::Trapped(_))
    }
}

/// 상태 없는 trap 라우터
#[derive(Debug, Clone, Copy, Default)]
pub struct TrapRouter;

impl TrapRouter {
    /// 새 라우터를 생성합니다.
    pub fn new() -> Self {
        Self
    }

    /// 파서 결과를 경로로 변환합니다.
    pub fn route(&self, outcome: Result<ParsedRecord, ParseFailure>) -> Route {
        match outcome {
            Ok(record) => Route::Parsed(record),
            Err(failure) => {
                tracing::trace!(
                    source = %failure.line.source,
                    offset = failure.line.offset,
                    reason = %failure.reason,
                    "line routed to trap"
                );
                Route::Trapped(failure.into_trap())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::SyslogParser;
    use logtally_core::types::RawLine;
    use proptest::prelude::*;

    fn route_text(text: &str) -> Route {
        let parser = SyslogParser::new().unwrap();
        TrapRouter::new().route(parser.parse(RawLine::new("test", 3, text)))
    }

    #[test]
    fn parsed_record_goes_to_parsed_path() {
        let route = route_text("Jun 14 15:16:01 combo sshd[1233]: reverse mapping failed");
        assert!(matches!(route, Route::Parsed(ref r) if r.process == "sshd[1233]:"));
        assert!(!route.is_trapped());
    }

    #[test]
    fn failure_goes_to_trap_with_verbatim_text() {
        let route = route_text("garbage text with no structure");
        assert_eq!(
            route,
            Route::Trapped(TrapRecord {
                offset: 3,
                text: "garbage text with no structure".to_owned(),
            })
        );
    }

    proptest! {
        #[test]
        fn every_line_lands_on_exactly_one_path(lines in prop::collection::vec(".{0,80}", 0..50)) {
            let parser = SyslogParser::new().unwrap();
            let router = TrapRouter::new();
            let mut parsed = 0usize;
            let mut trapped = 0usize;
            for (idx, text) in lines.iter().enumerate() {
                match router.route(parser.parse(RawLine::new("prop", idx as u64, text.as_str()))) {
                    Route::Parsed(_) => parsed += 1,
                    Route::Trapped(trap) => {
                        prop_assert_eq!(&trap.text, text);
                        trapped += 1;
                    }
                }
            }
            prop_assert_eq!(parsed + trapped, lines.len());
        }
    }
}
